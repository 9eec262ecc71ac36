//! Identifiers for Compute Engine regions and addresses.
//!
//! Like the BigQuery identifiers, an id without a project is incomplete until
//! [`set_project_id`](RegionId::set_project_id) fills one in.

use std::sync::LazyLock;

use regex::Regex;

mod address;
mod region;

pub use address::{GlobalAddressId, RegionAddressId};
pub use region::RegionId;

/// Prefix shared by every resource URL.
pub const BASE_URL: &str = "https://www.googleapis.com/compute/v1/projects/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{url} is not a valid {kind} URL")]
    InvalidUrl { url: Box<str>, kind: &'static str },
}

pub type Result<T> = core::result::Result<T, Error>;

fn url_regex(path: &str) -> Regex {
    let pattern = format!(r"^https://www\.googleapis\.com/compute/v1/projects/([^/]+)/{path}$");
    Regex::new(&pattern).expect("resource url regex is valid")
}

static REGION_URL: LazyLock<Regex> = LazyLock::new(|| url_regex("regions/([^/]+)"));

static GLOBAL_ADDRESS_URL: LazyLock<Regex> =
    LazyLock::new(|| url_regex("global/addresses/([^/]+)"));

static REGION_ADDRESS_URL: LazyLock<Regex> =
    LazyLock::new(|| url_regex("regions/([^/]+)/addresses/([^/]+)"));

fn parse_url<'a, const N: usize>(
    regex: &Regex,
    url: &'a str,
    kind: &'static str,
) -> Result<[&'a str; N]> {
    let invalid = || Error::InvalidUrl {
        url: url.into(),
        kind,
    };

    let captures = regex.captures(url).ok_or_else(invalid)?;

    let mut parts = [""; N];
    for (idx, part) in parts.iter_mut().enumerate() {
        *part = captures.get(idx + 1).ok_or_else(invalid)?.as_str();
    }

    Ok(parts)
}
