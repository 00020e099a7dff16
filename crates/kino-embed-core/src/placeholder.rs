//! Poster placeholder shown until the player frame loads

use crate::config::PlayerConfig;
use serde::Serialize;

const ALT_PREFIX: &str = "Loading video";

/// Image element standing in for the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderImage {
    pub src: String,
    pub alt: String,
    pub layout: &'static str,
    pub referrer_policy: &'static str,
}

impl PlaceholderImage {
    /// Placeholder for the configured poster, if there is one
    pub fn for_config(config: &PlayerConfig, aria_label: Option<&str>) -> Option<Self> {
        let src = config.poster.clone()?;

        let alt = match aria_label.filter(|l| !l.is_empty()) {
            Some(label) => format!("{ALT_PREFIX} - {label}"),
            None => ALT_PREFIX.to_string(),
        };

        Some(Self {
            src,
            alt,
            layout: "fill",
            referrer_policy: "origin",
        })
    }

    /// Attributes in the order they are set on the element
    ///
    /// `placeholder` is a boolean marker and carries an empty value.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("src", self.src.clone()),
            ("layout", self.layout.to_string()),
            ("placeholder", String::new()),
            ("referrerpolicy", self.referrer_policy.to_string()),
            ("alt", self.alt.clone()),
        ]
    }

    /// Render as an HTML `img` tag
    pub fn to_html(&self) -> String {
        let attrs: Vec<String> = self
            .attributes()
            .into_iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    name.to_string()
                } else {
                    format!("{}=\"{}\"", name, escape_attr(&value))
                }
            })
            .collect();
        format!("<img {}>", attrs.join(" "))
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
