//! Client for the third-party video metadata endpoint.

use reqwest::Client;
use tracing::{debug, info};

use crate::{config::ApiConfig, error::FetchError, model::QueryResult};

const KEY_HEADER: &str = "x-rapidapi-key";
const HOST_HEADER: &str = "x-rapidapi-host";

#[derive(Clone)]
pub struct MetadataClient {
    http: Client,
    config: ApiConfig,
}

impl MetadataClient {
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Request)?;
        Ok(Self { http, config })
    }

    /// Issues the single GET for `video_id`; an empty id is sent as-is.
    pub async fn fetch(&self, video_id: &str) -> Result<QueryResult, FetchError> {
        info!(video_id, endpoint = %self.config.endpoint_url, "fetching video metadata");

        let resp = self
            .http
            .get(&self.config.endpoint_url)
            .query(&[("videoId", video_id)])
            .header(KEY_HEADER, &self.config.credential_key)
            .header(HOST_HEADER, &self.config.credential_host)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let result: QueryResult = resp.json().await.map_err(FetchError::Decode)?;
        debug!(
            title = %result.title,
            videos = result.videos.items.len(),
            audios = result.audios.items.len(),
            "metadata received"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dead_url, sample_result, serve_json};

    fn client_for(endpoint: String) -> MetadataClient {
        MetadataClient::new(ApiConfig::new(endpoint, "k-123", "api.example.com")).unwrap()
    }

    #[tokio::test]
    async fn sends_video_id_and_credentials() {
        let (base, requests) = serve_json(200, &sample_result());
        let client = client_for(format!("{}/v2/video/details", base));

        let result = client.fetch("abc123").await.unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), sample_result());

        let raw = requests.recv().unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("get /v2/video/details?videoid=abc123 "));
        assert!(raw.contains("x-rapidapi-key: k-123"));
        assert!(raw.contains("x-rapidapi-host: api.example.com"));
    }

    #[tokio::test]
    async fn empty_id_is_still_sent() {
        let (base, requests) = serve_json(200, &sample_result());
        client_for(base).fetch("").await.unwrap();
        assert!(requests.recv().unwrap().starts_with("GET /?videoId= "));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _requests) = serve_json(403, &serde_json::json!({ "message": "nope" }));
        let err = client_for(base).fetch("abc").await.unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 403));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let (base, _requests) = serve_json(200, &serde_json::json!({ "unexpected": 1 }));
        let err = client_for(base).fetch("abc").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_a_request_error() {
        let err = client_for(dead_url()).fetch("abc").await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}
