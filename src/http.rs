//! Blocking HTTP client for the metadata and health endpoints.

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use tracing::debug;

use crate::api::{ErrorBody, HealthStatus, VideoMetadataResponse};
use crate::controller::MetadataSource;
use crate::error::ControllerError;
use crate::links::Endpoints;

/// Talks to the backend with a shared `ureq` agent. No timeout is configured;
/// a hung backend keeps the request open.
#[derive(Clone)]
pub struct HttpMetadataSource {
    agent: ureq::Agent,
    endpoints: Endpoints,
}

impl HttpMetadataSource {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            endpoints,
        }
    }

    /// Performs the GET and returns the status with the body parsed as JSON,
    /// whatever the status was.
    fn get_json(&self, url: &str) -> Result<(u16, Value), ControllerError> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(ControllerError::transport(err.to_string()));
            }
        };
        let status = response.status();
        let body = response
            .into_json::<Value>()
            .map_err(|err| ControllerError::transport(format!("decoding body: {err}")))?;
        Ok((status, body))
    }

    pub fn check_health(&self) -> Result<HealthStatus> {
        let url = self.endpoints.health();
        let (status, body) = self
            .get_json(&url)
            .map_err(|err| match err {
                ControllerError::Transport { detail } => anyhow!(detail),
                other => anyhow!(other),
            })
            .with_context(|| format!("requesting {url}"))?;
        if !(200..300).contains(&status) {
            bail!("health check returned HTTP {status}");
        }
        serde_json::from_value(body).context("parsing health response")
    }
}

impl MetadataSource for HttpMetadataSource {
    fn fetch_video_info(&self, source_url: &str) -> Result<VideoMetadataResponse, ControllerError> {
        let url = self.endpoints.video_info(source_url);
        let (status, body) = self.get_json(&url)?;
        debug!(%url, status, "video info response");

        if !(200..300).contains(&status) {
            let error_body: ErrorBody = serde_json::from_value(body).unwrap_or_default();
            return Err(ControllerError::backend(status, error_body.message()));
        }

        serde_json::from_value(body)
            .map_err(|err| ControllerError::transport(format!("unexpected payload: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Query,
        http::StatusCode,
        routing::get,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_backend(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn fetch(
        base: String,
        source_url: &'static str,
    ) -> Result<VideoMetadataResponse, ControllerError> {
        tokio::task::spawn_blocking(move || {
            HttpMetadataSource::new(Endpoints::new(base)).fetch_video_info(source_url)
        })
        .await
        .unwrap()
    }

    async fn echo_video_info(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        Json(json!({
            "videoDetails": {
                "videoId": "abc123",
                "title": params.get("url").cloned().unwrap_or_default(),
                "author": {"name": "Channel"},
                "lengthSeconds": 125,
                "viewCount": 10,
                "thumbnails": [{"url": "t.jpg"}]
            },
            "formats": [
                {"itag": 22, "qualityLabel": "720p", "container": "mp4", "hasVideo": true, "hasAudio": true}
            ]
        }))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fetch_sends_encoded_source_url() {
        let base = spawn_backend(Router::new().route("/api/videoInfo", get(echo_video_info))).await;
        let response = fetch(base, "https://www.youtube.com/watch?v=abc123&t=42")
            .await
            .unwrap();
        assert_eq!(
            response.raw_title(),
            "https://www.youtube.com/watch?v=abc123&t=42"
        );
        assert_eq!(response.formats().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn backend_error_uses_body_message() {
        let app = Router::new().route(
            "/api/videoInfo",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "YouTube rejected the request: private video"})),
                )
            }),
        );
        let base = spawn_backend(app).await;
        let err = fetch(base, "https://youtu.be/x").await.unwrap_err();
        match err {
            ControllerError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "YouTube rejected the request: private video");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn backend_error_without_message_uses_fallback() {
        let app = Router::new().route(
            "/api/videoInfo",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))) }),
        );
        let base = spawn_backend(app).await;
        let err = fetch(base, "https://youtu.be/x").await.unwrap_err();
        assert!(matches!(err, ControllerError::Backend { status: 500, .. }));
        assert_eq!(err.to_string(), "Failed to fetch info");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_json_body_is_transport_error() {
        let app = Router::new().route(
            "/api/videoInfo",
            get(|| async { (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") }),
        );
        let base = spawn_backend(app).await;
        let err = fetch(base, "https://youtu.be/x").await.unwrap_err();
        assert!(matches!(err, ControllerError::Transport { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn success_without_video_details_is_transport_error() {
        let app = Router::new().route(
            "/api/videoInfo",
            get(|| async { Json(json!({"formats": []})) }),
        );
        let base = spawn_backend(app).await;
        let err = fetch(base, "https://youtu.be/x").await.unwrap_err();
        assert!(matches!(err, ControllerError::Transport { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_backend_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = fetch(format!("http://{addr}"), "https://youtu.be/x")
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::Transport { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn health_check_reads_status() {
        let app = Router::new().route(
            "/api/health",
            get(|| async { Json(json!({"status": "ok"})) }),
        );
        let base = spawn_backend(app).await;
        let health = tokio::task::spawn_blocking(move || {
            HttpMetadataSource::new(Endpoints::new(base)).check_health()
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(health.status, "ok");
    }
}
