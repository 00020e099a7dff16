//! Embed configuration
//!
//! Initialization attributes are read once from the host element and turned
//! into an immutable [`PlayerConfig`]. The fallbacks for the base URL, the
//! target origin and the reported duration travel together in
//! [`EmbedDefaults`], which the config, the source builder and the bridge all
//! read from.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default player location used when `data-iframe-src` is absent
pub const DEFAULT_BASE_URL: &str = "https://kino-player.pages.dev/embed/";

/// Unrestricted postMessage target origin
pub const WILDCARD_ORIGIN: &str = "*";

/// Duration reported to the host; the player never reports a real one
pub const DEFAULT_DURATION: f64 = 1.0;

/// Key of the autoplay threshold inside `data-config`
pub const VIEWPORT_PARAM: &str = "viewport";

/// Host element attribute names
pub mod attr {
    pub const API_KEY: &str = "data-apikey";
    pub const VIDEO_ID: &str = "data-videoid";
    pub const IFRAME_SRC: &str = "data-iframe-src";
    pub const CONFIG: &str = "data-config";
    pub const POSTER: &str = "poster";
    pub const ARIA_LABEL: &str = "aria-label";
}

/// Fallback values consumed by the config, the source builder and the bridge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbedDefaults {
    /// Player URL when no override is given
    pub base_url: &'static str,
    /// Target origin used when the base URL has no resolvable origin
    pub target_origin: &'static str,
    /// Duration reported through the video interface
    pub duration: f64,
}

impl Default for EmbedDefaults {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL,
            target_origin: WILDCARD_ORIGIN,
            duration: DEFAULT_DURATION,
        }
    }
}

/// Raw initialization attributes as found on the host element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedAttributes {
    pub api_key: Option<String>,
    pub video_id: Option<String>,
    pub iframe_src: Option<String>,
    pub config: Option<String>,
    pub poster: Option<String>,
    pub aria_label: Option<String>,
}

impl EmbedAttributes {
    /// Collect attributes through an attribute lookup such as
    /// `Element::get_attribute`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: lookup(attr::API_KEY),
            video_id: lookup(attr::VIDEO_ID),
            iframe_src: lookup(attr::IFRAME_SRC),
            config: lookup(attr::CONFIG),
            poster: lookup(attr::POSTER),
            aria_label: lookup(attr::ARIA_LABEL),
        }
    }
}

/// Validated, immutable player configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    pub api_key: String,
    pub video_id: String,
    pub base_url: String,
    pub raw_config: Option<String>,
    pub poster: Option<String>,
}

impl PlayerConfig {
    /// Create a config with the default base URL
    pub fn new(api_key: impl Into<String>, video_id: impl Into<String>) -> Result<Self> {
        let api_key = require(Some(api_key.into()), attr::API_KEY)?;
        let video_id = require(Some(video_id.into()), attr::VIDEO_ID)?;

        Ok(Self {
            api_key,
            video_id,
            base_url: EmbedDefaults::default().base_url.to_string(),
            raw_config: None,
            poster: None,
        })
    }

    /// Validate host attributes into a config
    ///
    /// Fails with [`Error::MissingAttribute`] when the api key or video id is
    /// absent or empty. Empty optional attributes count as absent.
    pub fn from_attributes(attrs: &EmbedAttributes) -> Result<Self> {
        Self::from_attributes_with(attrs, &EmbedDefaults::default())
    }

    /// Like [`PlayerConfig::from_attributes`], taking the base URL fallback
    /// from `defaults`
    pub fn from_attributes_with(attrs: &EmbedAttributes, defaults: &EmbedDefaults) -> Result<Self> {
        let api_key = require(attrs.api_key.clone(), attr::API_KEY)?;
        let video_id = require(attrs.video_id.clone(), attr::VIDEO_ID)?;

        Ok(Self {
            api_key,
            video_id,
            base_url: non_empty(&attrs.iframe_src).unwrap_or_else(|| defaults.base_url.to_string()),
            raw_config: non_empty(&attrs.config),
            poster: non_empty(&attrs.poster),
        })
    }

    /// Override the player base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the raw `data-config` string
    pub fn with_raw_config(mut self, raw_config: impl Into<String>) -> Self {
        self.raw_config = Some(raw_config.into());
        self
    }

    /// Set the poster image URL
    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }
}

fn require(value: Option<String>, name: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::MissingAttribute { name }),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
