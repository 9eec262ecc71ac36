use std::collections::HashMap;

use crate::DatasetReference;
use crate::util::int64;

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_reference: Option<DatasetReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Box<str>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub default_table_expiration_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<Box<str>, Box<str>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access: Vec<Access>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub creation_time: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub last_modified_time: Option<i64>,
}

/// A single access control entry. Exactly one of the grantee fields is expected
/// to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_by_email: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by_email: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_group: Option<Box<str>>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub datasets: Vec<DatasetListItem>,
}

/// Datasets returned by `datasets.list` are a reduced view of [`Dataset`].
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<str>>,
    pub dataset_reference: DatasetReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<Box<str>, Box<str>>,
}

impl From<DatasetListItem> for Dataset {
    fn from(item: DatasetListItem) -> Self {
        Dataset {
            id: item.id,
            dataset_reference: Some(item.dataset_reference),
            friendly_name: item.friendly_name,
            location: item.location,
            labels: item.labels,
            ..Default::default()
        }
    }
}
