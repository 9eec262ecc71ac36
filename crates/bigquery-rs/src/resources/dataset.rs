use std::borrow::Cow;
use std::collections::BTreeMap;

use bigquery_resources_rs::dataset::{Access, Dataset as WireDataset};

use crate::id::DatasetId;

/// Who an [`Acl`] entry grants access to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AclEntity {
    User(Box<str>),
    Group(Box<str>),
    Domain(Box<str>),
    /// `projectOwners`, `projectReaders`, `projectWriters` or `allAuthenticatedUsers`.
    SpecialGroup(Box<str>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Acl {
    pub role: Option<Box<str>>,
    pub entity: AclEntity,
}

impl Acl {
    pub fn new(role: impl Into<Box<str>>, entity: AclEntity) -> Self {
        Self {
            role: Some(role.into()),
            entity,
        }
    }

    /// Entries with no recognised grantee (i.e views) are skipped.
    fn from_wire(access: Access) -> Option<Self> {
        let entity = if let Some(user) = access.user_by_email {
            AclEntity::User(user)
        } else if let Some(group) = access.group_by_email {
            AclEntity::Group(group)
        } else if let Some(domain) = access.domain {
            AclEntity::Domain(domain)
        } else {
            AclEntity::SpecialGroup(access.special_group?)
        };

        Some(Self {
            role: access.role,
            entity,
        })
    }

    fn to_wire(&self) -> Access {
        let mut access = Access {
            role: self.role.clone(),
            ..Default::default()
        };

        match self.entity {
            AclEntity::User(ref user) => access.user_by_email = Some(user.clone()),
            AclEntity::Group(ref group) => access.group_by_email = Some(group.clone()),
            AclEntity::Domain(ref domain) => access.domain = Some(domain.clone()),
            AclEntity::SpecialGroup(ref group) => access.special_group = Some(group.clone()),
        }

        access
    }
}

/// A dataset, either as described by the caller for a create/update, or as
/// returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dataset {
    dataset_id: DatasetId,
    etag: Option<Box<str>>,
    generated_id: Option<Box<str>>,
    self_link: Option<Box<str>>,
    friendly_name: Option<Box<str>>,
    description: Option<Box<str>>,
    location: Option<Box<str>>,
    default_table_lifetime_ms: Option<i64>,
    labels: BTreeMap<Box<str>, Box<str>>,
    acl: Vec<Acl>,
    creation_time: Option<i64>,
    last_modified: Option<i64>,
}

impl Dataset {
    pub fn new(dataset_id: DatasetId) -> Self {
        Self {
            dataset_id,
            etag: None,
            generated_id: None,
            self_link: None,
            friendly_name: None,
            description: None,
            location: None,
            default_table_lifetime_ms: None,
            labels: BTreeMap::new(),
            acl: Vec::new(),
            creation_time: None,
            last_modified: None,
        }
    }

    pub fn with_friendly_name(mut self, friendly_name: impl Into<Box<str>>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<Box<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<Box<str>>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_default_table_lifetime_ms(mut self, lifetime_ms: i64) -> Self {
        self.default_table_lifetime_ms = Some(lifetime_ms);
        self
    }

    pub fn with_label(mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_acl(mut self, acl: impl IntoIterator<Item = Acl>) -> Self {
        self.acl = acl.into_iter().collect();
        self
    }

    /// Used by updates to guard against concurrent modification.
    pub fn with_etag(mut self, etag: impl Into<Box<str>>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Completes the dataset id with `project`, returning `self` untouched if it
    /// already had one.
    pub fn set_project_id(&self, project: &str) -> Cow<'_, Self> {
        match self.dataset_id.set_project_id(project) {
            Cow::Borrowed(_) => Cow::Borrowed(self),
            Cow::Owned(dataset_id) => Cow::Owned(Self {
                dataset_id,
                ..self.clone()
            }),
        }
    }

    pub fn dataset_id(&self) -> &DatasetId {
        &self.dataset_id
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// The service generated `project:dataset` id.
    pub fn generated_id(&self) -> Option<&str> {
        self.generated_id.as_deref()
    }

    pub fn self_link(&self) -> Option<&str> {
        self.self_link.as_deref()
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn default_table_lifetime_ms(&self) -> Option<i64> {
        self.default_table_lifetime_ms
    }

    pub fn labels(&self) -> &BTreeMap<Box<str>, Box<str>> {
        &self.labels
    }

    pub fn acl(&self) -> &[Acl] {
        &self.acl
    }

    /// Milliseconds since the epoch.
    pub fn creation_time(&self) -> Option<i64> {
        self.creation_time
    }

    pub fn last_modified(&self) -> Option<i64> {
        self.last_modified
    }

    pub fn from_wire(dataset: WireDataset) -> Self {
        let dataset_id = match dataset.dataset_reference {
            Some(reference) => DatasetId::from_wire(reference),
            None => DatasetId::of(""),
        };

        Self {
            dataset_id,
            etag: dataset.etag,
            generated_id: dataset.id,
            self_link: dataset.self_link,
            friendly_name: dataset.friendly_name,
            description: dataset.description,
            location: dataset.location,
            default_table_lifetime_ms: dataset.default_table_expiration_ms,
            labels: dataset.labels.into_iter().collect(),
            acl: dataset.access.into_iter().filter_map(Acl::from_wire).collect(),
            creation_time: dataset.creation_time,
            last_modified: dataset.last_modified_time,
        }
    }

    pub fn to_wire(&self) -> WireDataset {
        WireDataset {
            etag: self.etag.clone(),
            id: self.generated_id.clone(),
            self_link: self.self_link.clone(),
            dataset_reference: Some(self.dataset_id.to_wire()),
            friendly_name: self.friendly_name.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            default_table_expiration_ms: self.default_table_lifetime_ms,
            labels: self
                .labels
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            access: self.acl.iter().map(Acl::to_wire).collect(),
            creation_time: self.creation_time,
            last_modified_time: self.last_modified,
            ..Default::default()
        }
    }
}
