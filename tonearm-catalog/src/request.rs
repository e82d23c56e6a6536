use serde::{Deserialize, de::DeserializeOwned};

use crate::{Client, ClientError, ClientResult};

/// Making requests to the catalog API.
impl Client {
    /// Make an authenticated `GET` request to the catalog API and deserialize
    /// the JSON body into `T`. `path` is relative to the API base URL, e.g.
    /// `albums/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the response is not valid.
    pub async fn request<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        parameters: &[(&str, String)],
    ) -> ClientResult<T> {
        let bytes = self.request_raw(token, path, parameters).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(crate) async fn request_raw(
        &self,
        token: &str,
        path: &str,
        parameters: &[(&str, String)],
    ) -> ClientResult<Vec<u8>> {
        let response = self
            .client
            .get(format!("{}/{path}", self.api_url.trim_end_matches('/')))
            .bearer_auth(token)
            .query(parameters)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Reads the body of `response`, turning a non-success status into a
    /// [`ClientError::StatusError`] carrying the server's message.
    pub(crate) async fn check_status(response: reqwest::Response) -> ClientResult<Vec<u8>> {
        let status = response.status();
        let bytes: Vec<u8> = response.bytes().await?.into();
        if status.is_success() {
            return Ok(bytes);
        }

        Err(ClientError::StatusError {
            status: status.as_u16(),
            message: parse_error_message(&bytes),
        })
    }
}

/// Extract the human-readable message from an error body.
///
/// The catalog API answers with `{"error": {"status": .., "message": ..}}`,
/// while the token endpoint uses the OAuth shape
/// `{"error": "..", "error_description": ".."}`.
pub fn parse_error_message(bytes: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct ApiError {
        message: Option<String>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorBody {
        Api {
            error: ApiError,
        },
        OAuth {
            error: String,
            error_description: Option<String>,
        },
    }

    match serde_json::from_slice::<ErrorBody>(bytes).ok()? {
        ErrorBody::Api { error } => error.message,
        ErrorBody::OAuth {
            error,
            error_description,
        } => Some(error_description.unwrap_or(error)),
    }
}
