use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A downloadable resource as persisted under the `resources` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub is_premium: bool,
    #[serde(default)]
    pub download_url: String,
    pub uploaded_by: String,
    pub upload_date: DateTime<Utc>,
    pub approved: bool,
}

/// Caller-supplied fields for a new resource.
///
/// `approved` is accepted so uploads can be deserialized from arbitrary input,
/// but the catalog always ignores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub approved: bool,
}
