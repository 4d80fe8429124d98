use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::EmployeeStore;
use crate::errors::AppResult;
use crate::models::employee::{Employee, NewEmployee};
use crate::models::query::{EmployeeFilter, EmployeeQuery, SortOrder};

/// Process-local store used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryEmployeeStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    rows: BTreeMap<i32, Employee>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(employee: &Employee, filter: &EmployeeFilter) -> bool {
    let contains = |value: &str, needle: &Option<String>| {
        needle.as_deref().map_or(true, |n| value.contains(n))
    };
    contains(&employee.first_name, &filter.first_name)
        && contains(&employee.email, &filter.email)
        && contains(&employee.mobile, &filter.mobile)
        && filter
            .date_of_birth
            .map_or(true, |dob| employee.date_of_birth == dob)
}

fn compare(a: &Employee, b: &Employee, sort: SortOrder) -> Ordering {
    match sort {
        SortOrder::NameAsc => a.first_name.cmp(&b.first_name),
        SortOrder::NameDesc => b.first_name.cmp(&a.first_name),
        SortOrder::EmailAsc => a.email.cmp(&b.email),
        SortOrder::EmailDesc => b.email.cmp(&a.email),
        SortOrder::DobAsc => a.date_of_birth.cmp(&b.date_of_birth),
        SortOrder::DobDesc => b.date_of_birth.cmp(&a.date_of_birth),
    }
}

impl Inner {
    /// Rows come out of the map in id order, so the stable sort breaks ties by id.
    fn select(&self, query: &EmployeeQuery) -> Vec<&Employee> {
        let mut selected: Vec<&Employee> = self
            .rows
            .values()
            .filter(|e| matches_filter(e, &query.filter))
            .collect();
        selected.sort_by(|a, b| compare(a, b, query.sort));
        selected
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn count(&self, query: &EmployeeQuery) -> AppResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .filter(|e| matches_filter(e, &query.filter))
            .count() as i64)
    }

    async fn fetch(&self, query: &EmployeeQuery, offset: i64, limit: i64) -> AppResult<Vec<Employee>> {
        let inner = self.inner.read().await;
        Ok(inner
            .select(query)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find(&self, id: i32) -> AppResult<Option<Employee>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, employee: &NewEmployee) -> AppResult<Employee> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let created = employee.clone().with_id(inner.next_id);
        inner.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, employee: &Employee) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.rows.get_mut(&employee.id) {
            Some(row) => {
                *row = employee.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        Ok(self.inner.read().await.rows.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_employee(first: &str, email: &str, dob: (i32, u32, u32)) -> NewEmployee {
        NewEmployee {
            first_name: first.to_string(),
            last_name: "Lee".to_string(),
            email: email.to_string(),
            mobile: "12345".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(dob.0, dob.1, dob.2).unwrap(),
            photo_path: None,
        }
    }

    async fn seeded() -> MemoryEmployeeStore {
        let store = MemoryEmployeeStore::new();
        store.insert(&new_employee("Ann", "ann@x.com", (2000, 1, 1))).await.unwrap();
        store.insert(&new_employee("Bob", "bob@x.com", (1990, 5, 5))).await.unwrap();
        store.insert(&new_employee("Anna", "zed@x.com", (1995, 3, 3))).await.unwrap();
        store.insert(&new_employee("Ann", "amy@x.com", (1980, 2, 2))).await.unwrap();
        store
    }

    fn names(rows: &[Employee]) -> Vec<(&str, i32)> {
        rows.iter().map(|e| (e.first_name.as_str(), e.id)).collect()
    }

    #[tokio::test]
    async fn substring_filter_is_case_sensitive() {
        let store = seeded().await;
        let query = EmployeeQuery {
            filter: EmployeeFilter {
                first_name: Some("Ann".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(store.count(&query).await.unwrap(), 3);

        let lower = EmployeeQuery {
            filter: EmployeeFilter {
                first_name: Some("ann".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(store.count(&lower).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sorting_breaks_ties_by_id() {
        let store = seeded().await;
        let asc = EmployeeQuery::default();
        let rows = store.fetch(&asc, 0, 10).await.unwrap();
        assert_eq!(names(&rows), [("Ann", 1), ("Ann", 4), ("Anna", 3), ("Bob", 2)]);

        let desc = EmployeeQuery {
            sort: SortOrder::NameDesc,
            ..Default::default()
        };
        let rows = store.fetch(&desc, 0, 10).await.unwrap();
        assert_eq!(names(&rows), [("Bob", 2), ("Anna", 3), ("Ann", 1), ("Ann", 4)]);
    }

    #[tokio::test]
    async fn sorts_by_email_and_dob() {
        let store = seeded().await;
        let by_email = EmployeeQuery {
            sort: SortOrder::EmailDesc,
            ..Default::default()
        };
        let rows = store.fetch(&by_email, 0, 10).await.unwrap();
        let emails: Vec<_> = rows.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(emails, ["zed@x.com", "bob@x.com", "ann@x.com", "amy@x.com"]);

        let by_dob = EmployeeQuery {
            sort: SortOrder::DobAsc,
            ..Default::default()
        };
        let rows = store.fetch(&by_dob, 1, 2).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|e| e.id).collect();
        assert_eq!(ids, [2, 3]);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = seeded().await;
        let mut ann = store.find(1).await.unwrap().unwrap();
        ann.mobile = "999".to_string();
        assert!(store.update(&ann).await.unwrap());
        assert_eq!(store.find(1).await.unwrap().unwrap().mobile, "999");

        assert!(store.delete(1).await.unwrap());
        assert!(!store.exists(1).await.unwrap());
        assert!(!store.update(&ann).await.unwrap());
        assert!(!store.delete(1).await.unwrap());
    }
}
