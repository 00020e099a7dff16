//! Source Builder - iframe URL and trusted origin
//!
//! The player reads its configuration from the URL fragment, so every
//! parameter is appended after `#` instead of as a query string:
//!
//! ```text
//! <baseURL>#apikey=<enc>&videoid=<enc>[&<normalized-config>][&baseurl=<enc-host-origin>]
//! ```

use crate::config::{EmbedDefaults, PlayerConfig, WILDCARD_ORIGIN};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use url::{Origin, Url};

/// Characters left untouched by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Features the player frame is allowed to use
pub const IFRAME_ALLOW: &str = "autoplay; fullscreen";

/// Output of the source builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IframeSource {
    /// Full iframe `src`
    pub url: String,
    /// Parameters after `#`
    pub fragment: String,
    /// Origin outbound messages are restricted to, or `*`
    pub target_origin: String,
}

impl IframeSource {
    /// True when outbound messages may be delivered to any origin
    pub fn is_unrestricted(&self) -> bool {
        self.target_origin == WILDCARD_ORIGIN
    }
}

/// Build the iframe URL and target origin for a config
///
/// `host_origin` is the origin of the embedding page; it is forwarded to the
/// player as `baseurl` when resolvable. The target origin falls back to
/// `defaults.target_origin`.
pub fn build_iframe_source(
    config: &PlayerConfig,
    host_origin: Option<&str>,
    defaults: &EmbedDefaults,
) -> IframeSource {
    let mut params = vec![
        format!("apikey={}", encode_component(&config.api_key)),
        format!("videoid={}", encode_component(&config.video_id)),
    ];

    if let Some(raw) = config.raw_config.as_deref() {
        let normalized = normalize_config(raw);
        if !normalized.is_empty() {
            params.push(normalized.to_string());
        }
    }

    if let Some(origin) = host_origin.filter(|o| is_resolvable_origin(o)) {
        params.push(format!("baseurl={}", encode_component(origin)));
    }

    let fragment = params.join("&");

    IframeSource {
        url: format!("{}#{}", config.base_url, fragment),
        fragment,
        target_origin: resolve_target_origin(&config.base_url, defaults),
    }
}

/// Resolve the postMessage target origin for a base URL
///
/// A base URL that fails to parse, or that only has an opaque origin, falls
/// back to `defaults.target_origin`, which is `*` unless overridden. With the
/// wildcard, malformed overrides keep working at the cost of unrestricted
/// delivery of outbound commands.
pub fn resolve_target_origin(base_url: &str, defaults: &EmbedDefaults) -> String {
    tuple_origin(base_url).unwrap_or_else(|| defaults.target_origin.to_string())
}

/// Origins the host may preconnect to before layout
pub fn preconnect_origins(config: &PlayerConfig) -> Vec<String> {
    tuple_origin(&config.base_url).into_iter().collect()
}

/// Strip surrounding whitespace and any leading `#`, `?` or `&`
///
/// Normalizing an already normalized string returns it unchanged.
pub fn normalize_config(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '#' | '?' | '&'))
        .trim_end()
}

/// Percent-encode a value the way `encodeURIComponent` does
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

fn tuple_origin(url: &str) -> Option<String> {
    match Url::parse(url).ok()?.origin() {
        origin @ Origin::Tuple(..) => Some(origin.ascii_serialization()),
        Origin::Opaque(_) => None,
    }
}

fn is_resolvable_origin(origin: &str) -> bool {
    !origin.is_empty() && origin != "null"
}

/// Attributes of the player iframe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IframeSpec {
    pub src: String,
    pub allow: &'static str,
    pub allow_fullscreen: bool,
    pub title: Option<String>,
}

impl IframeSpec {
    pub fn new(source: &IframeSource, aria_label: Option<&str>) -> Self {
        Self {
            src: source.url.clone(),
            allow: IFRAME_ALLOW,
            allow_fullscreen: true,
            title: aria_label.filter(|l| !l.is_empty()).map(str::to_string),
        }
    }
}
