pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::errors::AppResult;
use crate::models::employee::{Employee, NewEmployee};
use crate::models::query::EmployeeQuery;
use crate::utils::pagination::PageSource;

pub use memory::MemoryEmployeeStore;
pub use postgres::PgEmployeeStore;

/// Persistent collection of employees.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn count(&self, query: &EmployeeQuery) -> AppResult<i64>;

    async fn fetch(&self, query: &EmployeeQuery, offset: i64, limit: i64) -> AppResult<Vec<Employee>>;

    async fn find(&self, id: i32) -> AppResult<Option<Employee>>;

    async fn insert(&self, employee: &NewEmployee) -> AppResult<Employee>;

    /// Returns `false` when no row with the employee's id exists any more.
    async fn update(&self, employee: &Employee) -> AppResult<bool>;

    async fn delete(&self, id: i32) -> AppResult<bool>;

    async fn exists(&self, id: i32) -> AppResult<bool> {
        Ok(self.find(id).await?.is_some())
    }
}

/// A store bound to one query, ready to be paginated.
pub struct StoreQuery<'a, S: ?Sized> {
    store: &'a S,
    query: EmployeeQuery,
}

impl<'a, S: EmployeeStore + ?Sized> StoreQuery<'a, S> {
    pub fn new(store: &'a S, query: EmployeeQuery) -> Self {
        Self { store, query }
    }
}

#[async_trait]
impl<'a, S: EmployeeStore + ?Sized> PageSource<Employee> for StoreQuery<'a, S> {
    async fn count(&self) -> AppResult<i64> {
        self.store.count(&self.query).await
    }

    async fn fetch(&self, offset: i64, limit: i64) -> AppResult<Vec<Employee>> {
        self.store.fetch(&self.query, offset, limit).await
    }
}

pub async fn create_pool(database_url: &str) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
