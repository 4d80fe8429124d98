use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::validation::DATE_FORMAT;

/// Listing order. Unknown keys fall back to first name ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    EmailAsc,
    EmailDesc,
    DobAsc,
    DobDesc,
}

impl SortOrder {
    pub fn parse(key: Option<&str>) -> Self {
        match key.unwrap_or_default() {
            "name_desc" => SortOrder::NameDesc,
            "email" => SortOrder::EmailAsc,
            "email_desc" => SortOrder::EmailDesc,
            "dob" => SortOrder::DobAsc,
            "dob_desc" => SortOrder::DobDesc,
            _ => SortOrder::NameAsc,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "",
            SortOrder::NameDesc => "name_desc",
            SortOrder::EmailAsc => "email",
            SortOrder::EmailDesc => "email_desc",
            SortOrder::DobAsc => "dob",
            SortOrder::DobDesc => "dob_desc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFilter {
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeQuery {
    pub filter: EmployeeFilter,
    pub sort: SortOrder,
}

/// Query string of the listing page.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub sort_order: Option<String>,
    pub search_name: Option<String>,
    pub search_email: Option<String>,
    pub search_mobile: Option<String>,
    #[serde(rename = "searchDOB")]
    pub search_dob: Option<String>,
    pub page_number: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

impl ListingParams {
    /// Requested page; blank or non-numeric values fall back to the first page.
    pub fn page(&self) -> Option<i64> {
        self.page_number.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn to_query(&self) -> EmployeeQuery {
        let date_of_birth = self
            .search_dob
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| match NaiveDate::parse_from_str(v, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    log::debug!("Ignoring unparseable searchDOB {:?}", v);
                    None
                }
            });

        EmployeeQuery {
            filter: EmployeeFilter {
                first_name: non_empty(&self.search_name),
                email: non_empty(&self.search_email),
                mobile: non_empty(&self.search_mobile),
                date_of_birth,
            },
            sort: SortOrder::parse(self.sort_order.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_round_trip() {
        for order in [
            SortOrder::NameAsc,
            SortOrder::NameDesc,
            SortOrder::EmailAsc,
            SortOrder::EmailDesc,
            SortOrder::DobAsc,
            SortOrder::DobDesc,
        ] {
            assert_eq!(SortOrder::parse(Some(order.key())), order);
        }
        assert_eq!(SortOrder::parse(Some("salary")), SortOrder::NameAsc);
        assert_eq!(SortOrder::parse(None), SortOrder::NameAsc);
    }

    #[test]
    fn blank_filters_are_ignored() {
        let params = ListingParams {
            search_name: Some(String::new()),
            search_email: Some("x.com".to_string()),
            search_dob: Some("not a date".to_string()),
            ..Default::default()
        };
        let query = params.to_query();
        assert_eq!(query.filter.first_name, None);
        assert_eq!(query.filter.email.as_deref(), Some("x.com"));
        assert_eq!(query.filter.date_of_birth, None);
    }

    #[test]
    fn parses_dob_filter() {
        let params = ListingParams {
            search_dob: Some("1999-12-31".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.to_query().filter.date_of_birth,
            NaiveDate::from_ymd_opt(1999, 12, 31)
        );
    }

    #[test]
    fn page_number_is_parsed_leniently() {
        let page = |value: Option<&str>| {
            ListingParams {
                page_number: value.map(str::to_string),
                ..Default::default()
            }
            .page()
        };
        assert_eq!(page(Some("3")), Some(3));
        assert_eq!(page(Some(" 2 ")), Some(2));
        assert_eq!(page(Some("-1")), Some(-1));
        assert_eq!(page(Some("")), None);
        assert_eq!(page(Some("abc")), None);
        assert_eq!(page(None), None);
    }
}
