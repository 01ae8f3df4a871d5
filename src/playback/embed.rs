use serde::{Deserialize, Serialize};
use std::fmt;

/// What a player wants to embed: a content id plus playback options.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedRequest {
    pub content_id: String,
    pub track: Option<u32>,
    pub autoplay: bool,
}

impl EmbedRequest {
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            track: None,
            autoplay: true,
        }
    }

    pub fn with_track(mut self, track: u32) -> Self {
        self.track = Some(track);
        self
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
}

/// Fully built embed locator. Two sources are the same embed iff equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmbedSource(String);

impl EmbedSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmbedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locator template for the third-party player page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedTemplate {
    pub base_url: String,
    pub id_param: String,
    pub track_param: String,
    pub autoplay_param: String,
    /// Appended verbatim after the generated parameters.
    pub extra_query: String,
}

impl Default for EmbedTemplate {
    fn default() -> Self {
        Self {
            base_url: "https://player.bilibili.com/player.html".to_string(),
            id_param: "bvid".to_string(),
            track_param: "page".to_string(),
            autoplay_param: "autoplay".to_string(),
            extra_query: "danmaku=0&high_quality=1".to_string(),
        }
    }
}

impl EmbedTemplate {
    /// Build the locator, or `None` when the request has no usable content id.
    pub fn build(&self, request: &EmbedRequest) -> Option<EmbedSource> {
        let content_id = request.content_id.trim();
        if content_id.is_empty() {
            return None;
        }

        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{}{}{}={}&{}={}&{}={}",
            self.base_url,
            separator,
            self.id_param,
            urlencoding::encode(content_id),
            self.track_param,
            request.track.unwrap_or(1),
            self.autoplay_param,
            if request.autoplay { 1 } else { 0 },
        );

        let extra = self.extra_query.trim().trim_start_matches('&');
        if !extra.is_empty() {
            url.push('&');
            url.push_str(extra);
        }

        Some(EmbedSource(url))
    }
}
