pub mod headers;
pub mod oauth2;
pub mod resolver;
pub mod strategy;

pub use headers::AuthHeaders;
pub use oauth2::{AccessToken, TokenAcquirer};
pub use resolver::CredentialResolver;
pub use strategy::{ApiKeyAuth, BearerAuth, CredentialStrategy, NoAuth, OAuth2Auth, OAuth2EnvVars};
