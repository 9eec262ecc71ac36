use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use bigquery_resources_rs::job::JobState;

use crate::Error;

/// The request parameters understood by the transport. Each kind appears at most
/// once in an [`OptionMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RpcOption {
    Fields,
    PageToken,
    MaxResults,
    AllDatasets,
    DeleteContents,
    AllUsers,
    StateFilter,
    StartIndex,
    Timeout,
}

impl RpcOption {
    /// The name of the matching query string parameter.
    pub const fn param(&self) -> &'static str {
        match self {
            Self::Fields => "fields",
            Self::PageToken => "pageToken",
            Self::MaxResults => "maxResults",
            Self::AllDatasets => "all",
            Self::DeleteContents => "deleteContents",
            Self::AllUsers => "allUsers",
            Self::StateFilter => "stateFilter",
            Self::StartIndex => "startIndex",
            Self::Timeout => "timeoutMs",
        }
    }
}

impl fmt::Display for RpcOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    Str(Box<str>),
    U64(u64),
    Bool(bool),
    States(Vec<JobState>),
    Duration(Duration),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(n) => Some(*n),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_states(&self) -> Option<&[JobState]> {
        match self {
            Self::States(states) => Some(states),
            _ => None,
        }
    }

    pub const fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(duration) => Some(*duration),
            _ => None,
        }
    }

    fn push_query_values(&self, param: &'static str, dst: &mut Vec<(&'static str, String)>) {
        match self {
            Self::Str(s) => dst.push((param, s.to_string())),
            Self::U64(n) => dst.push((param, n.to_string())),
            Self::Bool(b) => dst.push((param, b.to_string())),
            Self::States(states) => dst.extend(
                states
                    .iter()
                    .map(|state| (param, state.as_filter().to_owned())),
            ),
            Self::Duration(duration) => dst.push((param, duration.as_millis().to_string())),
        }
    }
}

/// Implemented by the typed option wrappers, see [`crate::options`].
pub trait ToRpcOption {
    fn to_rpc_option(&self) -> (RpcOption, OptionValue);
}

impl ToRpcOption for (RpcOption, OptionValue) {
    fn to_rpc_option(&self) -> (RpcOption, OptionValue) {
        self.clone()
    }
}

/// An ordered, duplicate free mapping of request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    map: BTreeMap<RpcOption, OptionValue>,
}

impl OptionMap {
    pub const fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Folds `options` into a map, failing on the first kind that appears twice.
    pub fn from_options<O: ToRpcOption>(options: &[O]) -> crate::Result<Self> {
        let mut map = BTreeMap::new();

        for option in options {
            let (kind, value) = option.to_rpc_option();
            if map.insert(kind, value).is_some() {
                return Err(Error::invalid_argument(format!("Duplicate option {kind}")));
            }
        }

        Ok(Self { map })
    }

    pub(crate) fn insert(&mut self, kind: RpcOption, value: OptionValue) -> Option<OptionValue> {
        self.map.insert(kind, value)
    }

    /// Copies the map, replacing only the page token.
    pub fn with_page_token(&self, cursor: &str) -> Self {
        let mut map = self.map.clone();
        map.insert(RpcOption::PageToken, OptionValue::Str(cursor.into()));
        Self { map }
    }

    pub fn get(&self, kind: RpcOption) -> Option<&OptionValue> {
        self.map.get(&kind)
    }

    pub fn contains(&self, kind: RpcOption) -> bool {
        self.map.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RpcOption, &OptionValue)> + '_ {
        self.map.iter().map(|(kind, value)| (*kind, value))
    }

    pub fn page_token(&self) -> Option<&str> {
        self.get(RpcOption::PageToken).and_then(OptionValue::as_str)
    }

    pub fn max_results(&self) -> Option<u64> {
        self.get(RpcOption::MaxResults).and_then(OptionValue::as_u64)
    }

    pub fn fields(&self) -> Option<&str> {
        self.get(RpcOption::Fields).and_then(OptionValue::as_str)
    }

    pub fn start_index(&self) -> Option<u64> {
        self.get(RpcOption::StartIndex).and_then(OptionValue::as_u64)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.get(RpcOption::Timeout).and_then(OptionValue::as_duration)
    }

    pub fn state_filter(&self) -> Option<&[JobState]> {
        self.get(RpcOption::StateFilter).and_then(OptionValue::as_states)
    }

    /// Whether a boolean option is present and set.
    pub fn flag(&self, kind: RpcOption) -> bool {
        self.get(kind)
            .and_then(OptionValue::as_bool)
            .unwrap_or(false)
    }

    /// Flattens the map into query string pairs. Job state filters expand into one
    /// pair per state.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(self.map.len());
        for (kind, value) in self.map.iter() {
            value.push_query_values(kind.param(), &mut pairs);
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_options_rejects_duplicates() {
        let error = OptionMap::from_options(&[
            (RpcOption::MaxResults, OptionValue::U64(10)),
            (RpcOption::PageToken, OptionValue::Str("a".into())),
            (RpcOption::MaxResults, OptionValue::U64(20)),
        ])
        .unwrap_err();

        assert!(matches!(error, Error::InvalidArgument(_)));
        assert_eq!(error.to_string(), "Duplicate option maxResults");
    }

    #[test]
    fn test_from_options_keeps_every_value() {
        let map = OptionMap::from_options(&[
            (RpcOption::MaxResults, OptionValue::U64(10)),
            (RpcOption::PageToken, OptionValue::Str("cursor".into())),
            (RpcOption::AllDatasets, OptionValue::Bool(true)),
        ])
        .unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.max_results(), Some(10));
        assert_eq!(map.page_token(), Some("cursor"));
        assert!(map.flag(RpcOption::AllDatasets));
        assert!(!map.flag(RpcOption::DeleteContents));
    }

    #[test]
    fn test_with_page_token_replaces_only_the_token() {
        let map = OptionMap::from_options(&[
            (RpcOption::MaxResults, OptionValue::U64(5)),
            (RpcOption::PageToken, OptionValue::Str("first".into())),
            (RpcOption::Fields, OptionValue::Str("datasets(id)".into())),
        ])
        .unwrap();

        let next = map.with_page_token("second");

        assert_eq!(next.page_token(), Some("second"));
        assert_eq!(next.max_results(), Some(5));
        assert_eq!(next.fields(), Some("datasets(id)"));
        // the source map is untouched
        assert_eq!(map.page_token(), Some("first"));

        let from_empty = OptionMap::new().with_page_token("cursor");
        assert_eq!(from_empty.len(), 1);
    }

    #[test]
    fn test_to_query_pairs() {
        let map = OptionMap::from_options(&[
            (
                RpcOption::StateFilter,
                OptionValue::States(vec![JobState::Running, JobState::Done]),
            ),
            (RpcOption::Timeout, OptionValue::Duration(Duration::from_secs(2))),
            (RpcOption::AllUsers, OptionValue::Bool(true)),
        ])
        .unwrap();

        assert_eq!(map.to_query_pairs(), vec![
            ("allUsers", "true".to_owned()),
            ("stateFilter", "running".to_owned()),
            ("stateFilter", "done".to_owned()),
            ("timeoutMs", "2000".to_owned()),
        ]);
    }
}
