use std::sync::Arc;

use actix_web::{middleware, App, HttpServer};
use log::{info, warn};

use employee_registry::config::AppConfig;
use employee_registry::db::{self, EmployeeStore, MemoryEmployeeStore, PgEmployeeStore};
use employee_registry::AppState;

fn to_io(err: employee_registry::errors::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(to_io)?;

    let store: Arc<dyn EmployeeStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await.map_err(to_io)?;
            info!("Connected to database and applied migrations");
            Arc::new(PgEmployeeStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, employees are kept in memory only");
            Arc::new(MemoryEmployeeStore::new())
        }
    };

    let state = AppState::new(store, config.clone());
    info!(
        "Storing photos under {}",
        state.uploads.upload_dir().display()
    );
    info!("Starting server at {}", config.bind_address);

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
