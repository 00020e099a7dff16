//! Core types for Kino Embed

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one layout cycle of an embed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbedId(pub Uuid);

impl EmbedId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EmbedId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EmbedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a listener or observer registered with the platform
///
/// Cancelling runs the unsubscribe action at most once; dropping the handle
/// cancels it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Host layouts the embed can be sized with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    Fixed,
    FixedHeight,
    Responsive,
    Fill,
    FlexItem,
    Intrinsic,
    Container,
    Nodisplay,
}

impl Layout {
    /// Whether the layout gives the element a size the iframe can fill
    pub fn is_size_defined(&self) -> bool {
        !matches!(self, Layout::Container | Layout::Nodisplay)
    }
}

impl std::str::FromStr for Layout {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "fixed" => Ok(Layout::Fixed),
            "fixed-height" => Ok(Layout::FixedHeight),
            "responsive" => Ok(Layout::Responsive),
            "fill" => Ok(Layout::Fill),
            "flex-item" => Ok(Layout::FlexItem),
            "intrinsic" => Ok(Layout::Intrinsic),
            "container" => Ok(Layout::Container),
            "nodisplay" => Ok(Layout::Nodisplay),
            other => Err(crate::Error::InvalidConfig(format!("unknown layout: {other}"))),
        }
    }
}
