use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub date_of_birth: NaiveDate,
    pub photo_path: Option<String>,
}

/// A validated employee that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub date_of_birth: NaiveDate,
    pub photo_path: Option<String>,
}

impl NewEmployee {
    pub fn with_id(self, id: i32) -> Employee {
        Employee {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            mobile: self.mobile,
            date_of_birth: self.date_of_birth,
            photo_path: self.photo_path,
        }
    }
}
