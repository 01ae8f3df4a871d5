//! cover-proxy: serves video cover images for the site.
//!
//! `GET /api/bilibili/cover?bvid=<id>` looks the cover up in the video
//! metadata and relays the image. Listens on `PAGECAST_PROXY_ADDR`
//! (default `127.0.0.1:8787`); other settings come from the site store.

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use pagecast::api::{CoverProxy, CoverResponse, ReqwestUpstream};
use pagecast::db::{load_site_config, SiteConfig, COVER_PROXY_ROUTE};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_ADDR: &str = "127.0.0.1:8787";

type SharedProxy = Arc<CoverProxy<ReqwestUpstream>>;

async fn cover(
    State(proxy): State<SharedProxy>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let reply = proxy.respond(first_param(&params, "bvid")).await;
    into_http(reply)
}

/// First value given for `key`; repeats later in the query are ignored.
fn first_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

fn into_http(reply: CoverResponse) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, reply.body).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&reply.content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Some(value) = reply
        .cache_control
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
    {
        headers.insert(header::CACHE_CONTROL, value);
    }
    response
}

fn build_router(proxy: SharedProxy) -> Router {
    Router::new()
        .route(COVER_PROXY_ROUTE, get(cover))
        .with_state(proxy)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting pagecast cover proxy v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_site_config().await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load site config, using defaults: {}", e);
            SiteConfig::default()
        }
    };

    let proxy = Arc::new(CoverProxy::new(ReqwestUpstream::new(), config.cover_proxy));
    let app = build_router(proxy);

    let addr = std::env::var("PAGECAST_PROXY_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("cover proxy listening on http://{}{}", addr, COVER_PROXY_ROUTE);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Uri};
    use pagecast::db::CoverProxySettings;
    use tower::ServiceExt;

    fn router() -> Router {
        build_router(Arc::new(CoverProxy::new(
            ReqwestUpstream::new(),
            CoverProxySettings::default(),
        )))
    }

    async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn parse(uri: &'static str) -> Vec<(String, String)> {
        let uri = Uri::from_static(uri);
        let Query(params) = Query::<Vec<(String, String)>>::try_from_uri(&uri).unwrap();
        params
    }

    #[test]
    fn repeated_bvid_keeps_the_first_value() {
        let params = parse("/api/bilibili/cover?bvid=&bvid=BV1xx411c7mD");
        assert_eq!(first_param(&params, "bvid"), Some(""));

        let params = parse("/api/bilibili/cover?page=2&bvid=BV1xx411c7mD&bvid=BV1other");
        assert_eq!(first_param(&params, "bvid"), Some("BV1xx411c7mD"));

        let params = parse("/api/bilibili/cover?page=2");
        assert_eq!(first_param(&params, "bvid"), None);
    }

    #[tokio::test]
    async fn empty_first_bvid_is_rejected_before_any_upstream_call() {
        let (status, body) = get("/api/bilibili/cover?bvid=&bvid=BV1xx411c7mD").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Missing bvid");
    }

    #[tokio::test]
    async fn missing_bvid_is_rejected() {
        let (status, body) = get("/api/bilibili/cover").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Missing bvid");
    }

    #[test]
    fn error_replies_keep_plain_text_and_skip_caching() {
        let response = into_http(CoverResponse {
            status: 404,
            content_type: "text/plain;charset=UTF-8".to_string(),
            cache_control: None,
            body: b"No pic".to_vec(),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain;charset=UTF-8"
        );
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[test]
    fn images_carry_upstream_type_and_cache_hint() {
        let response = into_http(CoverResponse {
            status: 200,
            content_type: "image/webp".to_string(),
            cache_control: Some("public, max-age=86400".to_string()),
            body: vec![1, 2, 3],
        });
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/webp");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=86400"
        );
    }
}
