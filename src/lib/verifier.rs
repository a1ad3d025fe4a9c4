use anyhow::{Result, bail};
use serde::Deserialize;
use tracing::debug;

use crate::utils::CONFIG;

/// Identity claim returned by the provider for a verified token.
#[derive(Clone, Debug)]
pub struct VerifiedUser {
    pub email: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
}

#[derive(Clone)]
pub struct TokenVerifier {
    client: reqwest::Client,
    verify_url: String,
    api_key: String,
}

impl TokenVerifier {
    pub fn new(verify_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_url,
            api_key,
        }
    }

    pub fn from_env() -> Self {
        Self::new(CONFIG.verify_url.clone(), CONFIG.verify_api_key.clone())
    }

    /// Asks the identity provider whether `token` belongs to a live account.
    /// Every failure mode (network error, non-2xx, unparseable body, no
    /// account) collapses to an error; callers reject on any error.
    pub async fn verify(&self, token: &str) -> Result<VerifiedUser> {
        let response = self
            .client
            .post(&self.verify_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("identity provider rejected token ({})", response.status());
        }

        let lookup: LookupResponse = response.json().await?;
        let user = match lookup.users.into_iter().next() {
            Some(user) => user,
            None => bail!("identity provider returned no account for token"),
        };

        debug!("Verified token for account {}", user.local_id);

        Ok(VerifiedUser {
            email: user.email.unwrap_or(user.local_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TokenVerifier;

    #[tokio::test]
    async fn unreachable_provider_means_invalid() {
        let verifier =
            TokenVerifier::new("http://127.0.0.1:1/verify".to_string(), "key".to_string());

        assert!(verifier.verify("some-token").await.is_err());
    }
}
