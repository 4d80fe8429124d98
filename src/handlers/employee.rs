use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::config::AppConfig;
use crate::db::{EmployeeStore, StoreQuery};
use crate::errors::{AppError, AppResult};
use crate::handlers::form::{read_submission, Submission};
use crate::models::employee::Employee;
use crate::models::query::ListingParams;
use crate::utils::pagination::{paginate, Page};
use crate::utils::upload::UploadManager;
use crate::utils::validation::{validate_form, EmployeeForm};

pub const LISTING_PATH: &str = "/employees";

#[derive(Serialize)]
struct EmployeeListing {
    current_sort: String,
    search_name: Option<String>,
    search_email: Option<String>,
    search_mobile: Option<String>,
    search_dob: Option<String>,
    page: Page<Employee>,
}

fn redirect_to_listing() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, LISTING_PATH))
        .finish()
}

fn not_found() -> AppError {
    AppError::NotFound("Employee not found".to_string())
}

/// Drops a blob written for a save that did not go through.
async fn discard_photo(uploads: &UploadManager, photo_path: Option<&str>) {
    if let Some(path) = photo_path {
        log::warn!("Removing photo {} after failed save", path);
        uploads.delete(path).await;
    }
}

async fn find_or_404(store: &dyn EmployeeStore, id: i32) -> AppResult<Employee> {
    store.find(id).await?.ok_or_else(not_found)
}

pub async fn get_employees(
    store: web::Data<dyn EmployeeStore>,
    config: web::Data<AppConfig>,
    query: web::Query<ListingParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let employee_query = params.to_query();
    let current_sort = employee_query.sort.key().to_string();

    let source = StoreQuery::new(store.get_ref(), employee_query);
    let page = paginate::<Employee, _>(&source, params.page(), config.page_size).await?;

    Ok(HttpResponse::Ok().json(EmployeeListing {
        current_sort,
        search_name: params.search_name,
        search_email: params.search_email,
        search_mobile: params.search_mobile,
        search_dob: params.search_dob,
        page,
    }))
}

pub async fn new_employee_form() -> HttpResponse {
    HttpResponse::Ok().json(EmployeeForm::default())
}

pub async fn create_employee(
    store: web::Data<dyn EmployeeStore>,
    uploads: web::Data<UploadManager>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let Submission { form, photo } = read_submission(payload, config.max_upload_bytes).await?;

    let mut employee = validate_form(&form).map_err(|errors| AppError::Validation {
        errors,
        form: Box::new(form.clone()),
    })?;

    if let Some(photo) = &photo {
        employee.photo_path = Some(uploads.save(photo).await?);
    }

    match store.insert(&employee).await {
        Ok(created) => {
            log::info!("Created employee {}", created.id);
            Ok(redirect_to_listing())
        }
        Err(err) => {
            discard_photo(&uploads, employee.photo_path.as_deref()).await;
            Err(err)
        }
    }
}

pub async fn edit_employee_form(
    store: web::Data<dyn EmployeeStore>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let employee = find_or_404(store.get_ref(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

pub async fn update_employee(
    store: web::Data<dyn EmployeeStore>,
    uploads: web::Data<UploadManager>,
    config: web::Data<AppConfig>,
    id: web::Path<i32>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let Submission { form, photo } = read_submission(payload, config.max_upload_bytes).await?;

    if form.id != Some(id) {
        return Err(not_found());
    }

    let mut employee = validate_form(&form)
        .map_err(|errors| AppError::Validation {
            errors,
            form: Box::new(form.clone()),
        })?
        .with_id(id);

    // The photo path comes from the stored row, never from the hidden form field.
    let existing = find_or_404(store.get_ref(), id).await?;

    // A new photo replaces the stored path; the previous blob stays on disk.
    let new_photo = match &photo {
        Some(photo) => Some(uploads.save(photo).await?),
        None => None,
    };
    employee.photo_path = new_photo.clone().or(existing.photo_path);

    match store.update(&employee).await {
        Ok(true) => {
            log::info!("Updated employee {}", id);
            Ok(redirect_to_listing())
        }
        Ok(false) => {
            discard_photo(&uploads, new_photo.as_deref()).await;
            if store.exists(id).await? {
                log::error!("Update of employee {} matched no rows although it exists", id);
                Err(AppError::InternalServerError("Update failed".to_string()))
            } else {
                Err(not_found())
            }
        }
        Err(err) => {
            discard_photo(&uploads, new_photo.as_deref()).await;
            Err(err)
        }
    }
}

pub async fn delete_employee_confirmation(
    store: web::Data<dyn EmployeeStore>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let employee = find_or_404(store.get_ref(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

pub async fn delete_employee(
    store: web::Data<dyn EmployeeStore>,
    uploads: web::Data<UploadManager>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();

    let Some(employee) = store.find(id).await? else {
        log::warn!("Delete requested for missing employee {}", id);
        return Ok(redirect_to_listing());
    };

    if let Some(photo_path) = &employee.photo_path {
        uploads.delete(photo_path).await;
    }

    if store.delete(id).await? {
        log::info!("Deleted employee {}", id);
    }
    Ok(redirect_to_listing())
}
