//! Kino Embed Core - Third-party player embed adapter for Kino
//!
//! This crate provides the host-agnostic side of an iframe player embed:
//! - Iframe source URL and trusted target origin construction
//! - The postMessage protocol spoken with the embedded player
//! - A readiness-gated bridge forwarding commands and re-emitting events
//! - Viewport-driven autoplay policy
//! - Poster placeholder markup and the host video control surface
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Kino Embed Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Source    │  │   Viewport   │  │    Video     │           │
//! │  │   Builder    │  │    Policy    │  │  Interface   │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │   Message   │◄──── Platform (web-sys/mock) │
//! │                    │   Bridge    │                              │
//! │                    └─────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod placeholder;
pub mod player;
pub mod protocol;
pub mod source;
pub mod types;
pub mod video;
pub mod viewport;

pub use bridge::{BridgeState, FrameHandle, HostEvent, MessageBridge};
pub use config::{EmbedAttributes, EmbedDefaults, PlayerConfig};
pub use error::{Error, Result};
pub use placeholder::PlaceholderImage;
pub use player::{EmbedPlayer, MessageHandler, Platform, ViewportHandler};
pub use protocol::{Command, EventKind, InboundMessage, OutboundMessage, RawPayload};
pub use source::{build_iframe_source, normalize_config, IframeSource, IframeSpec};
pub use types::{EmbedId, Layout, Subscription};
pub use video::VideoInterface;
pub use viewport::{ViewportEntry, ViewportPolicy, ViewportTracker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the embed library
pub fn init() {
    tracing::info!(version = VERSION, "Kino Embed Core initialized");
}
