use serde::{Deserialize, Serialize};
use std::fmt;

/// How requests to a source are authenticated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    None,
    Key,
    Bearer,
    #[serde(rename = "oauth2")]
    OAuth2,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthType::None => "none",
            AuthType::Key => "key",
            AuthType::Bearer => "bearer",
            AuthType::OAuth2 => "oauth2",
        };
        f.write_str(label)
    }
}

/// A deal API queried once per search term on every run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub endpoint: String,
    pub auth_type: AuthType,
}

impl Source {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, auth_type: AuthType) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            auth_type,
        }
    }

    /// Prefix of every environment variable holding this source's secrets.
    pub fn env_prefix(&self) -> String {
        self.name.to_uppercase()
    }

    pub fn env_var(&self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix(), suffix)
    }

    /// Request URL for a term. The term is interpolated verbatim.
    pub fn query_url(&self, term: &str) -> String {
        format!("{}?q={}", self.endpoint, term)
    }
}

/// Search terms are used verbatim as the `q` query parameter.
pub type SearchTerm = String;
