use std::collections::HashMap;
use std::fmt;

/// Source of secret values such as API keys and SMTP passwords.
pub trait SecretStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads secrets from the process environment. `.env` is loaded into the
/// environment by the binary before this is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl SecretStore for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// A secret that may not have been configured.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    Present(String),
    Missing,
}

impl Secret {
    pub fn lookup(store: &dyn SecretStore, name: &str) -> Self {
        match store.get(name) {
            Some(value) => Secret::Present(value),
            None => Secret::Missing,
        }
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Secret::Present(value) => Some(value),
            Secret::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Secret::Missing)
    }

    pub fn map(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            Secret::Present(value) => Secret::Present(f(value)),
            Secret::Missing => Secret::Missing,
        }
    }
}

impl From<Option<String>> for Secret {
    fn from(value: Option<String>) -> Self {
        value.map_or(Secret::Missing, Secret::Present)
    }
}

// Never print secret values into logs.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Present(_) => f.write_str("Present(***)"),
            Secret::Missing => f.write_str("Missing"),
        }
    }
}
