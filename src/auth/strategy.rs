use async_trait::async_trait;

use super::headers::{AuthHeaders, API_KEY_HEADER, AUTHORIZATION_HEADER};
use super::oauth2::TokenAcquirer;
use crate::models::{AuthType, Source};
use crate::secrets::{Secret, SecretStore};

/// Produces the authentication headers for a request to one source.
/// Implementations never fail: an unavailable secret becomes `Secret::Missing`.
#[async_trait]
pub trait CredentialStrategy: Send + Sync {
    fn auth_type(&self) -> AuthType;

    async fn resolve(&self, source: &Source, secrets: &dyn SecretStore) -> AuthHeaders;
}

pub struct NoAuth;

#[async_trait]
impl CredentialStrategy for NoAuth {
    fn auth_type(&self) -> AuthType {
        AuthType::None
    }

    async fn resolve(&self, _source: &Source, _secrets: &dyn SecretStore) -> AuthHeaders {
        AuthHeaders::new()
    }
}

/// `apikey: <NAME>_API_KEY`
pub struct ApiKeyAuth {
    env_var: String,
}

impl ApiKeyAuth {
    pub fn new(env_var: impl Into<String>) -> Self {
        Self { env_var: env_var.into() }
    }

    pub fn for_source(source: &Source) -> Self {
        Self::new(source.env_var("API_KEY"))
    }
}

#[async_trait]
impl CredentialStrategy for ApiKeyAuth {
    fn auth_type(&self) -> AuthType {
        AuthType::Key
    }

    async fn resolve(&self, source: &Source, secrets: &dyn SecretStore) -> AuthHeaders {
        let key = Secret::lookup(secrets, &self.env_var);
        if key.is_missing() {
            tracing::warn!("No API key configured for {} ({} is not set)", source.name, self.env_var);
        }
        AuthHeaders::new().with(API_KEY_HEADER, key)
    }
}

/// `Authorization: Bearer <NAME>_TOKEN`
pub struct BearerAuth {
    env_var: String,
}

impl BearerAuth {
    pub fn new(env_var: impl Into<String>) -> Self {
        Self { env_var: env_var.into() }
    }

    pub fn for_source(source: &Source) -> Self {
        Self::new(source.env_var("TOKEN"))
    }
}

#[async_trait]
impl CredentialStrategy for BearerAuth {
    fn auth_type(&self) -> AuthType {
        AuthType::Bearer
    }

    async fn resolve(&self, source: &Source, secrets: &dyn SecretStore) -> AuthHeaders {
        let token = Secret::lookup(secrets, &self.env_var);
        if token.is_missing() {
            tracing::warn!("No bearer token configured for {} ({} is not set)", source.name, self.env_var);
        }
        AuthHeaders::new().with(AUTHORIZATION_HEADER, token.map(bearer))
    }
}

/// Names of the environment variables holding one OAuth2 client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2EnvVars {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

impl OAuth2EnvVars {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            client_id: format!("{}_CLIENT_ID", prefix),
            client_secret: format!("{}_CLIENT_SECRET", prefix),
            token_url: format!("{}_TOKEN_URL", prefix),
        }
    }
}

/// Fetches a fresh client-credentials token for every request.
pub struct OAuth2Auth {
    vars: OAuth2EnvVars,
    acquirer: TokenAcquirer,
}

impl OAuth2Auth {
    pub fn new(vars: OAuth2EnvVars, acquirer: TokenAcquirer) -> Self {
        Self { vars, acquirer }
    }

    pub fn for_source(source: &Source, acquirer: TokenAcquirer) -> Self {
        Self::new(OAuth2EnvVars::with_prefix(&source.env_prefix()), acquirer)
    }

    pub fn vars(&self) -> &OAuth2EnvVars {
        &self.vars
    }

    async fn token(&self, source: &Source, secrets: &dyn SecretStore) -> Secret {
        let client_id = secrets.get(&self.vars.client_id);
        let client_secret = secrets.get(&self.vars.client_secret);
        let token_url = secrets.get(&self.vars.token_url);

        let (Some(client_id), Some(client_secret), Some(token_url)) =
            (client_id, client_secret, token_url)
        else {
            tracing::error!(
                "Failed to retrieve OAuth2 token for {}: {}, {} and {} must all be set",
                source.name,
                self.vars.client_id,
                self.vars.client_secret,
                self.vars.token_url
            );
            metrics::counter!("dealbot_oauth2_token_failures_total").increment(1);
            return Secret::Missing;
        };

        match self.acquirer.acquire(&client_id, &client_secret, &token_url).await {
            Ok(token) => Secret::Present(token.into_secret()),
            Err(e) => {
                tracing::error!("Failed to retrieve OAuth2 token for {}: {}", source.name, e);
                metrics::counter!("dealbot_oauth2_token_failures_total").increment(1);
                Secret::Missing
            }
        }
    }
}

#[async_trait]
impl CredentialStrategy for OAuth2Auth {
    fn auth_type(&self) -> AuthType {
        AuthType::OAuth2
    }

    async fn resolve(&self, source: &Source, secrets: &dyn SecretStore) -> AuthHeaders {
        let token = self.token(source, secrets).await;
        AuthHeaders::new().with(AUTHORIZATION_HEADER, token.map(bearer))
    }
}

fn bearer(token: String) -> String {
    format!("Bearer {}", token)
}
