use std::borrow::Cow;

use crate::region::RegionId;
use crate::{BASE_URL, GLOBAL_ADDRESS_URL, REGION_ADDRESS_URL, parse_url};

/// A global address, not tied to a region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalAddressId {
    project: Option<Box<str>>,
    address: Box<str>,
}

impl GlobalAddressId {
    pub fn of(address: impl Into<Box<str>>) -> Self {
        Self {
            project: None,
            address: address.into(),
        }
    }

    pub fn new(project: impl Into<Box<str>>, address: impl Into<Box<str>>) -> Self {
        Self {
            project: Some(project.into()),
            address: address.into(),
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_complete(&self) -> bool {
        self.project.is_some()
    }

    pub fn set_project_id(&self, project: &str) -> Cow<'_, Self> {
        if self.is_complete() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self::new(project, self.address.clone()))
        }
    }

    pub fn self_link(&self) -> Option<String> {
        let project = self.project.as_deref()?;
        Some(format!("{BASE_URL}{project}/global/addresses/{}", self.address))
    }

    pub fn from_url(url: &str) -> crate::Result<Self> {
        let [project, address] = parse_url(&GLOBAL_ADDRESS_URL, url, "global address")?;
        Ok(Self::new(project, address))
    }

    pub fn matches_url(url: &str) -> bool {
        GLOBAL_ADDRESS_URL.is_match(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionAddressId {
    region: RegionId,
    address: Box<str>,
}

impl RegionAddressId {
    pub fn of(region: impl Into<Box<str>>, address: impl Into<Box<str>>) -> Self {
        Self::in_region(RegionId::of(region), address)
    }

    pub fn new(
        project: impl Into<Box<str>>,
        region: impl Into<Box<str>>,
        address: impl Into<Box<str>>,
    ) -> Self {
        Self::in_region(RegionId::new(project, region), address)
    }

    pub fn in_region(region: RegionId, address: impl Into<Box<str>>) -> Self {
        Self {
            region,
            address: address.into(),
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.region.project()
    }

    pub fn region(&self) -> &str {
        self.region.region()
    }

    pub fn region_id(&self) -> &RegionId {
        &self.region
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_complete(&self) -> bool {
        self.region.is_complete()
    }

    pub fn set_project_id(&self, project: &str) -> Cow<'_, Self> {
        match self.region.set_project_id(project) {
            Cow::Borrowed(_) => Cow::Borrowed(self),
            Cow::Owned(region) => Cow::Owned(Self::in_region(region, self.address.clone())),
        }
    }

    pub fn self_link(&self) -> Option<String> {
        let region = self.region.self_link()?;
        Some(format!("{region}/addresses/{}", self.address))
    }

    pub fn from_url(url: &str) -> crate::Result<Self> {
        let [project, region, address] = parse_url(&REGION_ADDRESS_URL, url, "region address")?;
        Ok(Self::new(project, region, address))
    }

    pub fn matches_url(url: &str) -> bool {
        REGION_ADDRESS_URL.is_match(url)
    }
}
