//! Cover image relay for embedded videos.
//!
//! The browser cannot load the video site's cover images directly (referer
//! checks, mixed content), so the proxy looks the cover up in the video
//! metadata and streams the image back. Two sequential upstream requests,
//! no retries, no caching beyond the `Cache-Control` hint.

use crate::db::CoverProxySettings;
use std::future::Future;
use thiserror::Error;

const ERROR_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";
const FALLBACK_IMAGE_TYPE: &str = "image/jpeg";

#[derive(Debug, Error, PartialEq)]
pub enum CoverError {
    #[error("Missing bvid")]
    MissingId,
    #[error("Upstream API error")]
    UpstreamApi,
    #[error("No pic")]
    NoImage,
    #[error("Upstream image error")]
    UpstreamImage,
    /// The detail is logged, never sent to the client.
    #[error("Internal error")]
    Internal(String),
}

impl CoverError {
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingId => 400,
            Self::UpstreamApi | Self::UpstreamImage => 502,
            Self::NoImage => 404,
            Self::Internal(_) => 500,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP used by the proxy.
pub trait Upstream: Send + Sync {
    fn get(
        &self,
        url: &str,
        user_agent: &str,
        referer: &str,
    ) -> impl Future<Output = Result<UpstreamReply, TransportError>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverResponse {
    pub status: u16,
    pub content_type: String,
    pub cache_control: Option<String>,
    pub body: Vec<u8>,
}

impl CoverResponse {
    fn from_error(err: &CoverError) -> Self {
        Self {
            status: err.status(),
            content_type: ERROR_CONTENT_TYPE.to_string(),
            cache_control: None,
            body: err.to_string().into_bytes(),
        }
    }
}

/// Rewrite an insecure image reference to https.
pub fn secure_image_url(pic: &str) -> String {
    match pic.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => pic.to_string(),
    }
}

pub struct CoverProxy<U> {
    upstream: U,
    settings: CoverProxySettings,
}

impl<U: Upstream> CoverProxy<U> {
    pub fn new(upstream: U, settings: CoverProxySettings) -> Self {
        Self { upstream, settings }
    }

    pub async fn respond(&self, bvid: Option<&str>) -> CoverResponse {
        match self.fetch_cover(bvid).await {
            Ok(image) => CoverResponse {
                status: 200,
                content_type: image
                    .content_type
                    .unwrap_or_else(|| FALLBACK_IMAGE_TYPE.to_string()),
                cache_control: Some(format!(
                    "public, max-age={}",
                    self.settings.cache_max_age_secs
                )),
                body: image.body,
            },
            Err(err) => {
                match &err {
                    CoverError::Internal(detail) => {
                        tracing::error!(detail = %detail, "cover proxy error")
                    }
                    other => {
                        tracing::debug!(status = other.status(), "cover proxy rejected: {other}")
                    }
                }
                CoverResponse::from_error(&err)
            }
        }
    }

    pub async fn fetch_cover(&self, bvid: Option<&str>) -> Result<UpstreamReply, CoverError> {
        let bvid = bvid.filter(|id| !id.is_empty()).ok_or(CoverError::MissingId)?;
        let settings = &self.settings;

        let metadata_url = format!(
            "{}?bvid={}",
            settings.metadata_endpoint,
            urlencoding::encode(bvid)
        );
        let metadata = match self
            .upstream
            .get(&metadata_url, &settings.user_agent, &settings.referer)
            .await
        {
            Ok(reply) if reply.is_success() => reply,
            Ok(reply) => {
                tracing::warn!(status = reply.status, %bvid, "metadata request rejected");
                return Err(CoverError::UpstreamApi);
            }
            Err(err) => {
                tracing::warn!(error = %err, %bvid, "metadata request failed");
                return Err(CoverError::UpstreamApi);
            }
        };

        let json: serde_json::Value = serde_json::from_slice(&metadata.body)
            .map_err(|e| CoverError::Internal(format!("metadata is not JSON: {e}")))?;
        let pic = json
            .pointer("/data/pic")
            .and_then(|value| value.as_str())
            .filter(|pic| !pic.is_empty())
            .ok_or(CoverError::NoImage)?;

        let image_url = secure_image_url(pic);
        match self
            .upstream
            .get(&image_url, &settings.user_agent, &settings.referer)
            .await
        {
            Ok(reply) if reply.is_success() => Ok(reply),
            Ok(reply) => {
                tracing::warn!(status = reply.status, %image_url, "image request rejected");
                Err(CoverError::UpstreamImage)
            }
            Err(err) => {
                tracing::warn!(error = %err, %image_url, "image request failed");
                Err(CoverError::UpstreamImage)
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestUpstream {
    pub fn new() -> Self {
        Self {
            client: super::HTTP_CLIENT.clone(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Upstream for ReqwestUpstream {
    async fn get(
        &self,
        url: &str,
        user_agent: &str,
        referer: &str,
    ) -> Result<UpstreamReply, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(reqwest::header::REFERER, referer)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?
            .to_vec();

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeUpstream {
        replies: HashMap<String, Result<UpstreamReply, TransportError>>,
        requests: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeUpstream {
        fn reply(
            mut self,
            url: &str,
            status: u16,
            content_type: Option<&str>,
            body: &[u8],
        ) -> Self {
            self.replies.insert(
                url.to_string(),
                Ok(UpstreamReply {
                    status,
                    content_type: content_type.map(str::to_string),
                    body: body.to_vec(),
                }),
            );
            self
        }

        fn fail(mut self, url: &str) -> Self {
            self.replies
                .insert(url.to_string(), Err(TransportError("connection reset".to_string())));
            self
        }

        fn requested_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _, _)| url.clone())
                .collect()
        }
    }

    impl Upstream for FakeUpstream {
        async fn get(
            &self,
            url: &str,
            user_agent: &str,
            referer: &str,
        ) -> Result<UpstreamReply, TransportError> {
            self.requests.lock().unwrap().push((
                url.to_string(),
                user_agent.to_string(),
                referer.to_string(),
            ));
            self.replies
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(TransportError(format!("unexpected url {url}"))))
        }
    }

    const META: &str = "https://api.bilibili.com/x/web-interface/view?bvid=BV1xx411c7mD";

    fn proxy(upstream: FakeUpstream) -> CoverProxy<FakeUpstream> {
        CoverProxy::new(upstream, CoverProxySettings::default())
    }

    #[tokio::test]
    async fn missing_id_is_bad_request() {
        let proxy = proxy(FakeUpstream::default());
        for bvid in [None, Some("")] {
            let response = proxy.respond(bvid).await;
            assert_eq!(response.status, 400);
            assert_eq!(response.body, b"Missing bvid");
            assert_eq!(response.content_type, "text/plain;charset=UTF-8");
        }
        assert!(proxy.upstream.requested_urls().is_empty());
    }

    #[tokio::test]
    async fn relays_image_with_day_long_cache() {
        let upstream = FakeUpstream::default()
            .reply(
                META,
                200,
                Some("application/json"),
                br#"{"data":{"pic":"http://i0.hdslb.com/a.jpg"}}"#,
            )
            .reply(
                "https://i0.hdslb.com/a.jpg",
                200,
                Some("image/webp"),
                b"\x52\x49\x46\x46",
            );
        let proxy = proxy(upstream);

        let response = proxy.respond(Some("BV1xx411c7mD")).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "image/webp");
        assert_eq!(response.cache_control.as_deref(), Some("public, max-age=86400"));
        assert_eq!(response.body, b"\x52\x49\x46\x46");
        assert_eq!(
            proxy.upstream.requested_urls(),
            vec![META.to_string(), "https://i0.hdslb.com/a.jpg".to_string()]
        );
        let requests = proxy.upstream.requests.lock().unwrap();
        assert!(requests.iter().all(|(_, ua, referer)| {
            ua.starts_with("Mozilla/5.0") && referer == "https://www.bilibili.com"
        }));
    }

    #[tokio::test]
    async fn defaults_image_content_type() {
        let upstream = FakeUpstream::default()
            .reply(META, 200, None, br#"{"data":{"pic":"https://i0.hdslb.com/b.jpg"}}"#)
            .reply("https://i0.hdslb.com/b.jpg", 200, None, b"jpeg");
        let response = proxy(upstream).respond(Some("BV1xx411c7mD")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn metadata_failures_are_bad_gateway() {
        let rejected = FakeUpstream::default().reply(META, 503, None, b"busy");
        let response = proxy(rejected).respond(Some("BV1xx411c7mD")).await;
        assert_eq!(
            (response.status, response.body.as_slice()),
            (502, &b"Upstream API error"[..])
        );

        let unreachable = FakeUpstream::default().fail(META);
        let response = proxy(unreachable).respond(Some("BV1xx411c7mD")).await;
        assert_eq!(response.status, 502);
    }

    #[tokio::test]
    async fn missing_pic_is_not_found() {
        let bodies: [&[u8]; 3] = [
            br#"{"data":{}}"#,
            br#"{"code":-404}"#,
            br#"{"data":{"pic":""}}"#,
        ];
        for body in bodies {
            let upstream = FakeUpstream::default().reply(META, 200, None, body);
            let response = proxy(upstream).respond(Some("BV1xx411c7mD")).await;
            assert_eq!(response.status, 404);
            assert_eq!(response.body, b"No pic");
        }
    }

    #[tokio::test]
    async fn unparseable_metadata_is_internal_error() {
        let upstream = FakeUpstream::default().reply(META, 200, None, b"<html>");
        let proxy = proxy(upstream);
        assert!(matches!(
            proxy.fetch_cover(Some("BV1xx411c7mD")).await,
            Err(CoverError::Internal(_))
        ));
        let response = proxy.respond(Some("BV1xx411c7mD")).await;
        assert_eq!(response.status, 500);
        assert_eq!(response.body, b"Internal error");
    }

    #[tokio::test]
    async fn image_failures_are_bad_gateway() {
        let upstream = FakeUpstream::default()
            .reply(META, 200, None, br#"{"data":{"pic":"https://i0.hdslb.com/c.jpg"}}"#)
            .reply("https://i0.hdslb.com/c.jpg", 403, None, b"");
        let response = proxy(upstream).respond(Some("BV1xx411c7mD")).await;
        assert_eq!(response.status, 502);
        assert_eq!(response.body, b"Upstream image error");

        let upstream = FakeUpstream::default()
            .reply(META, 200, None, br#"{"data":{"pic":"https://i0.hdslb.com/c.jpg"}}"#)
            .fail("https://i0.hdslb.com/c.jpg");
        assert_eq!(proxy(upstream).respond(Some("BV1xx411c7mD")).await.status, 502);
    }

    #[tokio::test]
    async fn encodes_id_in_metadata_request() {
        let upstream = FakeUpstream::default();
        let proxy = proxy(upstream);
        let _ = proxy.respond(Some("a&b c")).await;
        assert_eq!(
            proxy.upstream.requested_urls(),
            vec!["https://api.bilibili.com/x/web-interface/view?bvid=a%26b%20c".to_string()]
        );
    }

    #[test]
    fn only_plain_http_is_upgraded() {
        assert_eq!(secure_image_url("http://x/y.jpg"), "https://x/y.jpg");
        assert_eq!(secure_image_url("https://x/y.jpg"), "https://x/y.jpg");
        assert_eq!(secure_image_url("//x/y.jpg"), "//x/y.jpg");
    }
}
