//! HTTP client for the dicebox server.

use dicebox_protocol::{
    Codec, CreateSessionRequest, ErrorBody, JsonCodec, PlayerId, RollResponse, SessionId,
    SessionInfo,
};
use reqwest::RequestBuilder;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::CliError;

/// Talks to one dicebox server.
#[derive(Debug, Clone)]
pub struct DiceboxClient {
    http: reqwest::Client,
    base_url: String,
}

impl DiceboxClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a session and returns its id and size.
    pub async fn create_session(
        &self,
        num_players: i64,
        duration_seconds: i64,
    ) -> Result<SessionInfo, CliError> {
        let body = JsonCodec.encode(&CreateSessionRequest {
            num_players,
            duration_seconds,
        })?;
        let request = self
            .http
            .post(format!("{}/sessions", self.base_url))
            .header(CONTENT_TYPE, JsonCodec.content_type())
            .body(body);

        self.send(request).await
    }

    /// Rolls for `player_id`. Resolves only once the session has closed.
    pub async fn roll(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
    ) -> Result<RollResponse, CliError> {
        let request = self.http.post(format!(
            "{}/sessions/{session_id}/{player_id}",
            self.base_url
        ));

        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CliError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            // Prefer the server's message; fall back to the raw body.
            let msg = JsonCodec
                .decode::<ErrorBody>(&body)
                .map(|error| error.msg)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(CliError::Server {
                status: status.as_u16(),
                msg,
            });
        }

        Ok(JsonCodec.decode(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = DiceboxClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
    }
}
