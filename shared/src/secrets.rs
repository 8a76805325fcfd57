//! AWS Secrets Manager integration.
//!
//! Secrets are fetched fresh on every call so rotated credentials take effect
//! without waiting for a cold start.

use aws_sdk_secretsmanager::Client as SecretsClient;

use crate::zendesk::ZendeskCredentials;
use crate::{Error, Result};

/// Get a secret value from Secrets Manager.
pub async fn get_secret(client: &SecretsClient, secret_id: &str) -> Result<String> {
    let response = client
        .get_secret_value()
        .secret_id(secret_id)
        .send()
        .await
        .map_err(|e| Error::aws("Failed to get secret", e))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Internal("Secret has no string value".to_string()))?
        .to_string();

    Ok(secret_string)
}

/// Get Zendesk API credentials from Secrets Manager.
pub async fn get_zendesk_credentials(
    client: &SecretsClient,
    secret_id: &str,
) -> Result<ZendeskCredentials> {
    let secret_string = get_secret(client, secret_id).await?;

    serde_json::from_str(&secret_string)
        .map_err(|e| Error::Internal(format!("Failed to parse Zendesk credentials: {}", e)))
}
