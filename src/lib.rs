pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod utils;

use std::sync::Arc;

use actix_web::web;

use crate::config::{AppConfig, IMAGES_DIR};
use crate::db::EmployeeStore;
use crate::utils::upload::UploadManager;

/// Shared per-app state, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EmployeeStore>,
    pub uploads: UploadManager,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn EmployeeStore>, config: AppConfig) -> Self {
        let uploads = UploadManager::new(config.public_root.clone(), IMAGES_DIR);
        Self { store, uploads, config }
    }

    /// Registers app data and routes; used by the server and by tests.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::from(self.store.clone()))
            .app_data(web::Data::new(self.uploads.clone()))
            .app_data(web::Data::new(self.config.clone()));
        handlers::configure_routes(cfg);
    }
}
