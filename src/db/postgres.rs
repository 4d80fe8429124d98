use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::EmployeeStore;
use crate::errors::AppResult;
use crate::models::employee::{Employee, NewEmployee};
use crate::models::query::{EmployeeFilter, EmployeeQuery, SortOrder};

const COLUMNS: &str = "id, first_name, last_name, email, mobile, date_of_birth, photo_path";

#[derive(Clone)]
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so the needle matches literally.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a EmployeeFilter) {
    let mut has_where = false;
    let mut clause = |builder: &mut QueryBuilder<'a, Postgres>| {
        builder.push(if has_where { " AND " } else { " WHERE " });
        has_where = true;
    };

    if let Some(first_name) = &filter.first_name {
        clause(builder);
        builder.push("first_name LIKE ").push_bind(contains_pattern(first_name));
    }
    if let Some(email) = &filter.email {
        clause(builder);
        builder.push("email LIKE ").push_bind(contains_pattern(email));
    }
    if let Some(mobile) = &filter.mobile {
        clause(builder);
        builder.push("mobile LIKE ").push_bind(contains_pattern(mobile));
    }
    if let Some(date_of_birth) = filter.date_of_birth {
        clause(builder);
        builder.push("date_of_birth = ").push_bind(date_of_birth);
    }
}

fn order_by(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::NameAsc => " ORDER BY first_name ASC, id ASC",
        SortOrder::NameDesc => " ORDER BY first_name DESC, id ASC",
        SortOrder::EmailAsc => " ORDER BY email ASC, id ASC",
        SortOrder::EmailDesc => " ORDER BY email DESC, id ASC",
        SortOrder::DobAsc => " ORDER BY date_of_birth ASC, id ASC",
        SortOrder::DobDesc => " ORDER BY date_of_birth DESC, id ASC",
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn count(&self, query: &EmployeeQuery) -> AppResult<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM employees");
        push_filter(&mut builder, &query.filter);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn fetch(&self, query: &EmployeeQuery, offset: i64, limit: i64) -> AppResult<Vec<Employee>> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM employees", COLUMNS));
        push_filter(&mut builder, &query.filter);
        builder.push(order_by(query.sort));
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let employees = builder
            .build_query_as::<Employee>()
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn find(&self, id: i32) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn insert(&self, employee: &NewEmployee) -> AppResult<Employee> {
        let created = sqlx::query_as::<_, Employee>(&format!(
            "INSERT INTO employees (first_name, last_name, email, mobile, date_of_birth, photo_path) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            COLUMNS
        ))
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.mobile)
        .bind(employee.date_of_birth)
        .bind(&employee.photo_path)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, employee: &Employee) -> AppResult<bool> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE employees SET ");
        let mut separated = query.separated(", ");
        separated.push("first_name = ");
        separated.push_bind_unseparated(&employee.first_name);
        separated.push("last_name = ");
        separated.push_bind_unseparated(&employee.last_name);
        separated.push("email = ");
        separated.push_bind_unseparated(&employee.email);
        separated.push("mobile = ");
        separated.push_bind_unseparated(&employee.mobile);
        separated.push("date_of_birth = ");
        separated.push_bind_unseparated(employee.date_of_birth);
        separated.push("photo_path = ");
        separated.push_bind_unseparated(&employee.photo_path);
        query.push(" WHERE id = ");
        query.push_bind(employee.id);

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
