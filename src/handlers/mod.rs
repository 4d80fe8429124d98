pub mod employee;
pub mod form;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(employee::get_employees)))
        .service(web::resource("/employees").route(web::get().to(employee::get_employees)))
        .service(
            web::resource("/employees/create")
                .route(web::get().to(employee::new_employee_form))
                .route(web::post().to(employee::create_employee)),
        )
        .service(
            web::resource("/employees/{id}/edit")
                .route(web::get().to(employee::edit_employee_form))
                .route(web::post().to(employee::update_employee)),
        )
        .service(
            web::resource("/employees/{id}/delete")
                .route(web::get().to(employee::delete_employee_confirmation))
                .route(web::post().to(employee::delete_employee)),
        );
}
