use std::borrow::Cow;
use std::fmt;

use crate::{BASE_URL, REGION_URL, parse_url};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId {
    project: Option<Box<str>>,
    region: Box<str>,
}

impl RegionId {
    pub fn of(region: impl Into<Box<str>>) -> Self {
        Self {
            project: None,
            region: region.into(),
        }
    }

    pub fn new(project: impl Into<Box<str>>, region: impl Into<Box<str>>) -> Self {
        Self {
            project: Some(project.into()),
            region: region.into(),
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn is_complete(&self) -> bool {
        self.project.is_some()
    }

    /// Returns `self` if it already has a project, otherwise a copy with
    /// `project` filled in.
    pub fn set_project_id(&self, project: &str) -> Cow<'_, Self> {
        if self.is_complete() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self::new(project, self.region.clone()))
        }
    }

    /// `None` until the id is complete.
    pub fn self_link(&self) -> Option<String> {
        let project = self.project.as_deref()?;
        Some(format!("{BASE_URL}{project}/regions/{}", self.region))
    }

    pub fn from_url(url: &str) -> crate::Result<Self> {
        let [project, region] = parse_url(&REGION_URL, url, "region")?;
        Ok(Self::new(project, region))
    }

    pub fn matches_url(url: &str) -> bool {
        REGION_URL.is_match(url)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.project {
            Some(ref project) => write!(f, "{project}/{}", self.region),
            None => f.write_str(&self.region),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const URL: &str = "https://www.googleapis.com/compute/v1/projects/project/regions/region";

    #[test]
    fn test_region_id() {
        let region = RegionId::new("project", "region");
        assert_eq!(region.project(), Some("project"));
        assert_eq!(region.region(), "region");
        assert_eq!(region.self_link().as_deref(), Some(URL));
        assert_eq!(RegionId::from_url(URL).unwrap(), region);
        assert!(RegionId::matches_url(URL));

        let incomplete = RegionId::of("region");
        assert!(incomplete.self_link().is_none());
        assert_eq!(*incomplete.set_project_id("project"), region);
        assert!(std::ptr::eq(&*region.set_project_id("other"), &region));
    }

    #[test]
    fn test_invalid_region_url() {
        let error = RegionId::from_url("notMatchingUrl").unwrap_err();
        assert_eq!(error, Error::InvalidUrl {
            url: "notMatchingUrl".into(),
            kind: "region",
        });
        assert_eq!(error.to_string(), "notMatchingUrl is not a valid region URL");
    }
}
