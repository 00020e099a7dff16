//! CLI command implementations

use crate::output::{print_report, OutputFormat};
use anyhow::Context;
use kino_embed_core::{
    build_iframe_source, normalize_config, source::preconnect_origins, Command, EmbedAttributes,
    EmbedDefaults, EventKind, InboundMessage, OutboundMessage, PlaceholderImage, PlayerConfig, RawPayload,
    ViewportPolicy,
};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceReport {
    url: String,
    fragment: String,
    target_origin: String,
    unrestricted: bool,
    preconnect: Vec<String>,
}

/// Build the iframe source for a set of attributes
pub fn source(attrs: &EmbedAttributes, host_origin: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    let defaults = EmbedDefaults::default();
    let config = PlayerConfig::from_attributes_with(attrs, &defaults).context("invalid embed attributes")?;
    let source = build_iframe_source(&config, host_origin, &defaults);

    if source.is_unrestricted() {
        tracing::warn!(base_url = %config.base_url, "Base URL has no origin, commands will be posted to '*'");
    }

    print_report(
        &SourceReport {
            preconnect: preconnect_origins(&config),
            unrestricted: source.is_unrestricted(),
            url: source.url,
            fragment: source.fragment,
            target_origin: source.target_origin,
        },
        format,
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewportReport {
    normalized_config: String,
    threshold: f64,
    enabled: bool,
    in_view: Option<bool>,
}

/// Parse a viewport threshold, optionally checking a visibility ratio against it
pub fn viewport(config: &str, ratio: Option<f64>, format: OutputFormat) -> anyhow::Result<()> {
    let policy = ViewportPolicy::from_raw_config(Some(config));

    print_report(
        &ViewportReport {
            normalized_config: normalize_config(config).to_string(),
            threshold: policy.threshold(),
            enabled: policy.is_enabled(),
            in_view: ratio.map(|r| policy.is_in_view(&kino_embed_core::ViewportEntry::with_ratio(r))),
        },
        format,
    )
}

/// Render the poster placeholder markup
pub fn placeholder(poster: &str, aria_label: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    // The ids only need to be present for the config to validate
    let config = PlayerConfig::new("-", "-")?.with_poster(poster);
    let image = PlaceholderImage::for_config(&config, aria_label)
        .context("a poster URL is required")?;

    match format {
        OutputFormat::Json => print_report(&image, format),
        OutputFormat::Text => {
            println!("{}", image.to_html());
            Ok(())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyReport {
    event: String,
    kind: String,
    position: Option<f64>,
    forwarded: bool,
}

/// Classify an inbound protocol message
pub fn classify(message: &str, format: OutputFormat) -> anyhow::Result<()> {
    let raw = RawPayload::from(message);
    let inbound = InboundMessage::decode(&raw)
        .context("not a protocol message: expected a JSON object with a string `event` field")?;

    let (kind, position) = match inbound.classify() {
        EventKind::Ready => ("ready", None),
        EventKind::EmptyReady => ("ignored", None),
        EventKind::TimeUpdate(p) => ("time_update", Some(p)),
        EventKind::AdProgress(p) => ("ad_progress", Some(p)),
        EventKind::Other => ("passthrough", None),
    };

    print_report(
        &ClassifyReport {
            forwarded: !matches!(kind, "ready" | "ignored"),
            event: inbound.event,
            kind: kind.to_string(),
            position,
        },
        format,
    )
}

/// Print the wire form of a control command
pub fn command(
    name: &str,
    value: Option<f64>,
    in_view: Option<bool>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let message = OutboundMessage::from(parse_command(name, value, in_view)?);

    match format {
        OutputFormat::Json => print_report(&message, format),
        OutputFormat::Text => {
            println!("{}", message.to_json()?);
            Ok(())
        }
    }
}

fn parse_command(name: &str, value: Option<f64>, in_view: Option<bool>) -> anyhow::Result<Command> {
    Ok(match name {
        "play" => Command::Play,
        "pause" => Command::Pause,
        "mute" => Command::Mute,
        "unmute" => Command::Unmute,
        "seek" => Command::SeekTo(value.context("seek needs --value <seconds>")?),
        "viewport" => Command::HandleViewport(in_view.context("viewport needs --in-view <true|false>")?),
        other => anyhow::bail!("unknown command: {other}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport_command() {
        assert_eq!(
            parse_command("viewport", None, Some(true)).unwrap(),
            Command::HandleViewport(true)
        );
        assert_eq!(
            parse_command("viewport", None, Some(false)).unwrap(),
            Command::HandleViewport(false)
        );
        assert!(parse_command("viewport", Some(1.0), None).is_err());
    }

    #[test]
    fn test_parse_seek_command() {
        assert_eq!(parse_command("seek", Some(12.5), None).unwrap(), Command::SeekTo(12.5));
        assert!(parse_command("seek", None, Some(true)).is_err());
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(parse_command("mute", None, None).unwrap(), Command::Mute);
        assert!(parse_command("rewind", None, None).is_err());
    }
}
