//! VOICEVOX engine HTTP client

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use super::{AudioQueryResponse, ClientError, ClientResult, SpeakerSource, SynthesisBackend};

/// Default engine location
pub const DEFAULT_API_URL: &str = "http://localhost:50021";

const AUDIO_QUERY: &str = "audio_query";
const SYNTHESIS: &str = "synthesis";
const SPEAKERS: &str = "speakers";

/// HTTP client for a VOICEVOX engine
#[derive(Debug, Clone)]
pub struct VoicevoxClient {
    http: reqwest::Client,
    base_url: Url,
}

impl VoicevoxClient {
    /// Create a client for `api_url` with a per-request timeout
    pub fn new(api_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = Url::parse(api_url)
            .map_err(|e| ClientError::Build(format!("invalid API URL {api_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Build(format!(
                "API URL {api_url} cannot be used as a base"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, name: &str, query: &[(&str, &str)]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Build(format!("cannot append path to {}", self.base_url)))?
            .pop_if_empty()
            .push(name);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// Return the body of a 200 response, or map the failure
    async fn read_success(response: reqwest::Response, endpoint: &str) -> ClientResult<Bytes> {
        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(ClientError::Response {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.bytes().await.map_err(|e| network_error(endpoint, e))
    }
}

fn network_error(endpoint: &str, err: reqwest::Error) -> ClientError {
    ClientError::Network {
        endpoint: endpoint.to_string(),
        details: err.to_string(),
    }
}

#[async_trait]
impl SynthesisBackend for VoicevoxClient {
    async fn generate_query(&self, text: &str, voice_id: u32) -> ClientResult<Bytes> {
        let endpoint = "/audio_query";
        let speaker = voice_id.to_string();
        let url = self.endpoint(AUDIO_QUERY, &[("text", text), ("speaker", &speaker)])?;

        debug!(text_len = text.chars().count(), voice_id, "Requesting audio query");

        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| network_error(endpoint, e))?;
        let body = Self::read_success(response, endpoint).await?;

        serde_json::from_slice::<AudioQueryResponse>(&body).map_err(|e| {
            ClientError::InvalidJson {
                context: "/audio_query response".to_string(),
                details: e.to_string(),
            }
        })?;

        Ok(body)
    }

    async fn render_audio(&self, query: Bytes, voice_id: u32) -> ClientResult<Bytes> {
        let endpoint = "/synthesis";
        let speaker = voice_id.to_string();
        let url = self.endpoint(SYNTHESIS, &[("speaker", &speaker)])?;

        debug!(query_bytes = query.len(), voice_id, "Requesting synthesis");

        let response = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "audio/wav")
            .body(query)
            .send()
            .await
            .map_err(|e| network_error(endpoint, e))?;
        let audio = Self::read_success(response, endpoint).await?;

        debug!(audio_bytes = audio.len(), voice_id, "Synthesis complete");
        Ok(audio)
    }
}

#[async_trait]
impl SpeakerSource for VoicevoxClient {
    async fn fetch_speakers(&self) -> ClientResult<Bytes> {
        let endpoint = "/speakers";
        let url = self.endpoint(SPEAKERS, &[])?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(endpoint, e))?;

        Self::read_success(response, endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> VoicevoxClient {
        VoicevoxClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_path_and_query() {
        let url = client("http://localhost:50021")
            .endpoint(AUDIO_QUERY, &[("text", "こんにちは"), ("speaker", "3")])
            .unwrap();

        assert_eq!(url.path(), "/audio_query");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("text".to_string(), "こんにちは".to_string()),
                ("speaker".to_string(), "3".to_string())
            ]
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = client("http://engine.local/voicevox/")
            .endpoint(SPEAKERS, &[])
            .unwrap();
        assert_eq!(url.as_str(), "http://engine.local/voicevox/speakers");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err = VoicevoxClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ClientError::Build(_)));

        let err = VoicevoxClient::new("mailto:someone@example.com", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ClientError::Build(_)));
    }

    #[tokio::test]
    async fn test_unreadable_error_body_is_reported() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            // promise 100 bytes, send 7, then hang up
            let head = b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\n";
            socket.write_all(head).await.unwrap();
            socket.write_all(b"partial").await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let err = client(&format!("http://{addr}"))
            .fetch_speakers()
            .await
            .unwrap_err();

        match err {
            ClientError::Response { status, body, .. } => {
                assert_eq!(status, 500);
                assert!(body.starts_with("<unreadable body: "), "body was {body:?}");
            }
            other => panic!("expected response error, got {other:?}"),
        }
    }
}
