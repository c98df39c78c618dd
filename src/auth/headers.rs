use reqwest::RequestBuilder;
use std::collections::BTreeMap;

use crate::secrets::Secret;

pub const API_KEY_HEADER: &str = "apikey";
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Headers that authenticate one request. Values whose secret could not be
/// found stay in the map as `Secret::Missing` and are left off the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeaders {
    headers: BTreeMap<String, Secret>,
}

impl AuthHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Secret) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Secret) {
        self.headers.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Secret> {
        self.headers.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.headers
            .iter()
            .filter(|(_, value)| value.is_missing())
            .map(|(name, _)| name.as_str())
    }

    pub fn apply(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (name, value) in &self.headers {
            match value.as_deref() {
                Some(value) => request = request.header(name.as_str(), value),
                None => tracing::debug!("Omitting header {} with missing secret", name),
            }
        }
        request
    }
}
