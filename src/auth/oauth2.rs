use reqwest::Client;
use serde::Deserialize;
use std::fmt;

use crate::utils::error::{AppError, Result};

/// Bearer token from a client-credentials exchange. Valid for one query only.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn into_secret(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Performs the OAuth2 client-credentials grant. The client authenticates as
/// itself, so there is no user consent step.
#[derive(Debug, Clone)]
pub struct TokenAcquirer {
    client: Client,
}

impl TokenAcquirer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn acquire(
        &self,
        client_id: &str,
        client_secret: &str,
        token_url: &str,
    ) -> Result<AccessToken> {
        let response = self
            .client
            .post(token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        let token: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            if status.is_success() {
                AppError::Serialization(e)
            } else {
                AppError::OAuth2 {
                    message: format!("token endpoint returned {}", status),
                }
            }
        })?;

        if let Some(error) = token.error {
            let message = match token.error_description {
                Some(description) => format!("{} ({}): {}", error, status, description),
                None => format!("{} ({})", error, status),
            };
            return Err(AppError::OAuth2 { message });
        }

        if !status.is_success() {
            return Err(AppError::OAuth2 {
                message: format!("token endpoint returned {}", status),
            });
        }

        let access_token = token.access_token.ok_or_else(|| AppError::OAuth2 {
            message: "token response missing access_token".to_string(),
        })?;

        tracing::info!(
            "OAuth2 token retrieved successfully (type: {}, expires in: {:?}s)",
            token.token_type.as_deref().unwrap_or("unspecified"),
            token.expires_in
        );

        Ok(AccessToken::new(access_token))
    }
}
