use std::collections::btree_set::{self, BTreeSet};

/// Deduplicated set of absolute endpoint URLs
///
/// Membership is the only contract. The set iterates in sorted order so that
/// printed and persisted output is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSet {
    urls: BTreeSet<String>,
}

impl EndpointSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint, returning true if it was not present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    /// Moves every endpoint of `other` into this set
    pub fn merge(&mut self, mut other: EndpointSet) {
        self.urls.append(&mut other.urls);
    }

    /// Returns true if the exact URL string is present
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Iterates endpoints in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Consumes the set into a sorted vector
    pub fn into_vec(self) -> Vec<String> {
        self.urls.into_iter().collect()
    }
}

impl Extend<String> for EndpointSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.urls.extend(iter);
    }
}

impl FromIterator<String> for EndpointSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EndpointSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}
