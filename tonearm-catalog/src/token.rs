use serde::{Deserialize, Serialize};

use crate::{Client, ClientResult};

/// The response of the client-credentials token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The bearer token.
    pub access_token: String,
    /// The token type; always `Bearer` in practice.
    pub token_type: String,
    /// The lifetime of the token, in seconds.
    pub expires_in: u64,
}

/// Token-related endpoints.
impl Client {
    /// Request a new bearer token using the client-credentials grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the credentials are rejected,
    /// or the response is not valid.
    pub async fn request_token(&self) -> ClientResult<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!(
                    "Basic {}",
                    basic_credentials(&self.client_id, &self.client_secret)
                ),
            )
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let bytes = Self::check_status(response).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Encode a client id/secret pair for a `Basic` authorization header.
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
    data_encoding::BASE64.encode(format!("{client_id}:{client_secret}").as_bytes())
}
