//! Viewport Policy - visibility driven play/pause
//!
//! A threshold is read from the `viewport` key of `data-config`. Values above
//! 1 are percentages. A threshold of 0 disables automatic play/pause.

use crate::config::VIEWPORT_PARAM;
use crate::source::normalize_config;
use url::form_urlencoded;

/// Visibility threshold for automatic play/pause
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportPolicy {
    threshold: f64,
}

impl ViewportPolicy {
    /// A policy that never triggers
    pub fn disabled() -> Self {
        Self { threshold: 0.0 }
    }

    /// Build from a ratio or percentage, clamped to [0, 1]
    pub fn from_threshold(value: f64) -> Self {
        if value.is_nan() {
            return Self::disabled();
        }
        let ratio = if value > 1.0 { value / 100.0 } else { value };
        Self {
            threshold: ratio.clamp(0.0, 1.0),
        }
    }

    /// Parse the threshold out of a raw `data-config` string
    ///
    /// Absent or malformed values leave the policy disabled.
    pub fn from_raw_config(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::disabled();
        };

        form_urlencoded::parse(normalize_config(raw).as_bytes())
            .find(|(key, _)| key == VIEWPORT_PARAM)
            .and_then(|(_, value)| value.trim().parse::<f64>().ok())
            .map(Self::from_threshold)
            .unwrap_or_default()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold > 0.0
    }

    /// Whether an observation counts as in view
    pub fn is_in_view(&self, entry: &ViewportEntry) -> bool {
        entry.ratio() >= self.threshold
    }
}

/// One visibility observation of the host element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportEntry {
    /// Visible fraction of the element, when the observer reports one
    pub intersection_ratio: Option<f64>,
    pub is_intersecting: bool,
}

impl ViewportEntry {
    pub fn with_ratio(ratio: f64) -> Self {
        Self {
            intersection_ratio: Some(ratio),
            is_intersecting: ratio > 0.0,
        }
    }

    pub fn intersecting(is_intersecting: bool) -> Self {
        Self {
            intersection_ratio: None,
            is_intersecting,
        }
    }

    fn ratio(&self) -> f64 {
        match self.intersection_ratio {
            Some(ratio) if !ratio.is_nan() => ratio,
            _ if self.is_intersecting => 1.0,
            _ => 0.0,
        }
    }
}

/// Turns observations into in-view transitions
#[derive(Debug, Clone)]
pub struct ViewportTracker {
    policy: ViewportPolicy,
    last: Option<bool>,
}

impl ViewportTracker {
    pub fn new(policy: ViewportPolicy) -> Self {
        Self { policy, last: None }
    }

    /// Returns the new in-view state when it differs from the last one seen
    pub fn observe(&mut self, entry: &ViewportEntry) -> Option<bool> {
        let in_view = self.policy.is_in_view(entry);
        if self.last == Some(in_view) {
            return None;
        }
        self.last = Some(in_view);
        Some(in_view)
    }
}
