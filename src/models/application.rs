use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review state of an application. Any status may follow any other.
///
/// Statuses outside the four known ones are kept verbatim in `Other` so a
/// record written by another client still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Other(String),
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::UnderReview => "Under Review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Other(name) => name,
        }
    }
}

impl From<String> for ApplicationStatus {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Pending" => ApplicationStatus::Pending,
            "Under Review" => ApplicationStatus::UnderReview,
            "Approved" => ApplicationStatus::Approved,
            "Rejected" => ApplicationStatus::Rejected,
            _ => ApplicationStatus::Other(name),
        }
    }
}

impl From<ApplicationStatus> for String {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// An applicant record as persisted under the `applications` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: u64,
    pub applicant_name: String,
    pub program: String,
    pub submission_date: NaiveDate,
    pub status: ApplicationStatus,
    pub priority: Priority,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}
