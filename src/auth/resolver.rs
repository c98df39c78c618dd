use std::collections::HashMap;
use std::sync::Arc;

use super::headers::AuthHeaders;
use super::oauth2::TokenAcquirer;
use super::strategy::{
    ApiKeyAuth, BearerAuth, CredentialStrategy, NoAuth, OAuth2Auth, OAuth2EnvVars,
};
use crate::models::{AuthType, Source};
use crate::secrets::SecretStore;

pub type CredentialStrategyBox = Arc<dyn CredentialStrategy>;

/// OAuth2 clients known ahead of time, by source name.
const KNOWN_OAUTH2_CLIENTS: &[(&str, &str)] = &[("Amazon", "AMAZON"), ("Target", "TARGET")];

/// Resolves the headers for a source. Strategies are looked up by
/// `(auth_type, source name)`; sources without an entry get the strategy
/// derived from their auth type and uppercased name.
pub struct CredentialResolver {
    secrets: Arc<dyn SecretStore>,
    acquirer: TokenAcquirer,
    strategies: HashMap<(AuthType, String), CredentialStrategyBox>,
}

impl CredentialResolver {
    pub fn new(secrets: Arc<dyn SecretStore>, acquirer: TokenAcquirer) -> Self {
        Self {
            secrets,
            acquirer,
            strategies: HashMap::new(),
        }
    }

    /// Resolver seeded with the known OAuth2 clients.
    pub fn with_defaults(secrets: Arc<dyn SecretStore>, acquirer: TokenAcquirer) -> Self {
        let mut resolver = Self::new(secrets, acquirer);
        for (name, prefix) in KNOWN_OAUTH2_CLIENTS {
            let strategy = OAuth2Auth::new(
                OAuth2EnvVars::with_prefix(prefix),
                resolver.acquirer.clone(),
            );
            resolver.register(*name, Arc::new(strategy));
        }
        resolver
    }

    /// Register a strategy for the named source, replacing any earlier one
    /// for the same auth type.
    pub fn register(&mut self, source_name: impl Into<String>, strategy: CredentialStrategyBox) {
        let source_name = source_name.into();
        tracing::debug!(
            "Registered {} credential strategy for {}",
            strategy.auth_type(),
            source_name
        );
        self.strategies
            .insert((strategy.auth_type(), source_name), strategy);
    }

    pub fn has_strategy(&self, auth_type: AuthType, source_name: &str) -> bool {
        self.strategies
            .contains_key(&(auth_type, source_name.to_string()))
    }

    pub fn strategy_for(&self, source: &Source) -> CredentialStrategyBox {
        match self
            .strategies
            .get(&(source.auth_type, source.name.clone()))
        {
            Some(strategy) => Arc::clone(strategy),
            None => self.derived_strategy(source),
        }
    }

    pub async fn resolve(&self, source: &Source) -> AuthHeaders {
        let strategy = self.strategy_for(source);
        let headers = strategy.resolve(source, self.secrets.as_ref()).await;

        let missing: Vec<&str> = headers.missing().collect();
        if !missing.is_empty() {
            tracing::debug!(
                "Credentials for {} incomplete, missing: {}",
                source.name,
                missing.join(", ")
            );
        }
        headers
    }

    fn derived_strategy(&self, source: &Source) -> CredentialStrategyBox {
        match source.auth_type {
            AuthType::None => Arc::new(NoAuth),
            AuthType::Key => Arc::new(ApiKeyAuth::for_source(source)),
            AuthType::Bearer => Arc::new(BearerAuth::for_source(source)),
            AuthType::OAuth2 => Arc::new(OAuth2Auth::for_source(source, self.acquirer.clone())),
        }
    }
}
