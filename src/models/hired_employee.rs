use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::datetime::deserialize_timestamp;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HiredEmployee {
    pub id: i32,
    pub name: String,
    pub hired_at: DateTime<Utc>,
    pub department_id: i32,
    pub job_id: i32,
}

/// One item of a JSON batch. Field types are enforced by deserialization.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HiredEmployeeIn {
    pub id: i32,
    pub name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub datetime: DateTime<Utc>,
    pub department_id: i32,
    pub job_id: i32,
}

#[derive(Deserialize, Validate, Debug)]
pub struct BatchEmployeesIn {
    #[validate(length(min = 1, max = 1000, message = "items length must be between 1 and 1000"))]
    pub items: Vec<HiredEmployeeIn>,
}

impl From<HiredEmployeeIn> for HiredEmployee {
    fn from(item: HiredEmployeeIn) -> Self {
        HiredEmployee {
            id: item.id,
            name: item.name,
            hired_at: item.datetime,
            department_id: item.department_id,
            job_id: item.job_id,
        }
    }
}

impl BatchEmployeesIn {
    pub fn into_rows(self) -> Vec<HiredEmployee> {
        self.items.into_iter().map(HiredEmployee::from).collect()
    }
}
