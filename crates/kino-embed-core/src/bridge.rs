//! Message Bridge - the only channel between host and player frame
//!
//! State machine:
//!
//! ```text
//! Uninitialized --attach--> AwaitingReady --first "ready"--> Ready
//! ```
//!
//! Commands sent while awaiting readiness are queued and flushed in issue
//! order when the player signals readiness. Tearing the bridge down discards
//! the queue; nothing is ever retried.

use crate::config::EmbedDefaults;
use crate::protocol::{Command, EventKind, InboundMessage, OutboundMessage, RawPayload};
use crate::types::EmbedId;
use crate::Result;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, info, trace};

/// The embedded player frame as seen by the bridge
pub trait FrameHandle {
    /// Window identity used to match message senders and post commands
    type Window: PartialEq;

    /// The frame's content window, if it is still live
    fn content_window(&self) -> Option<Self::Window>;

    /// Post a serialized command to the frame's window
    fn post_message(&self, window: &Self::Window, message: &str, target_origin: &str) -> Result<()>;

    /// Remove the frame from the document
    fn remove(self)
    where
        Self: Sized;
}

/// Bridge lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    AwaitingReady,
    Ready,
}

impl std::fmt::Display for BridgeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeState::Uninitialized => write!(f, "uninitialized"),
            BridgeState::AwaitingReady => write!(f, "awaiting_ready"),
            BridgeState::Ready => write!(f, "ready"),
        }
    }
}

/// Notification for the host page
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The player signalled readiness
    Load,
    /// A player event re-emitted verbatim
    Custom { name: String, detail: Value },
}

impl HostEvent {
    pub fn name(&self) -> &str {
        match self {
            HostEvent::Load => crate::protocol::LOAD_EVENT,
            HostEvent::Custom { name, .. } => name,
        }
    }

    pub fn detail(&self) -> Option<&Value> {
        match self {
            HostEvent::Load => None,
            HostEvent::Custom { detail, .. } => Some(detail),
        }
    }
}

/// Per-layout bridge state
pub struct MessageBridge<F: FrameHandle> {
    id: EmbedId,
    state: BridgeState,
    frame: Option<F>,
    target_origin: String,
    pending: VecDeque<OutboundMessage>,
    ready_detail: Option<Value>,
    position: f64,
    duration: f64,
}

impl<F: FrameHandle> MessageBridge<F> {
    /// Create an unattached bridge; the reported duration comes from `defaults`
    pub fn new(id: EmbedId, target_origin: impl Into<String>, defaults: &EmbedDefaults) -> Self {
        Self {
            id,
            state: BridgeState::Uninitialized,
            frame: None,
            target_origin: target_origin.into(),
            pending: VecDeque::new(),
            ready_detail: None,
            position: 0.0,
            duration: defaults.duration,
        }
    }

    pub fn id(&self) -> EmbedId {
        self.id
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == BridgeState::Ready
    }

    pub fn target_origin(&self) -> &str {
        &self.target_origin
    }

    /// Detail of the `ready` message that resolved readiness
    pub fn ready_detail(&self) -> Option<&Value> {
        self.ready_detail.as_ref()
    }

    /// Last known playback position in seconds
    pub fn current_time(&self) -> f64 {
        self.position
    }

    /// Duration reported to the host
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Number of commands waiting for readiness
    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    /// Hand the live frame to the bridge and start awaiting readiness
    ///
    /// Only the first call takes effect; a bridge is never re-attached.
    pub fn attach(&mut self, frame: F) -> bool {
        if self.state != BridgeState::Uninitialized {
            debug!(embed_id = %self.id, state = %self.state, "Frame already attached, ignoring");
            frame.remove();
            return false;
        }
        self.frame = Some(frame);
        self.state = BridgeState::AwaitingReady;
        debug!(embed_id = %self.id, "Awaiting player readiness");
        true
    }

    /// Handle an inbound message event
    ///
    /// `source` is the window that sent the message. Returns the events to
    /// re-emit on the host element; dropped messages produce none.
    pub fn handle_message(&mut self, source: Option<&F::Window>, raw: &RawPayload) -> Vec<HostEvent> {
        let Some(window) = self.frame.as_ref().and_then(|frame| frame.content_window()) else {
            trace!(embed_id = %self.id, "No frame attached, dropping message");
            return Vec::new();
        };
        if source != Some(&window) {
            trace!(embed_id = %self.id, "Message from foreign window, dropping");
            return Vec::new();
        }
        let Some(message) = InboundMessage::decode(raw) else {
            trace!(embed_id = %self.id, "Unstructured message, dropping");
            return Vec::new();
        };

        match message.classify() {
            EventKind::Ready => return self.on_ready(message.detail).into_iter().collect(),
            EventKind::EmptyReady => {
                debug!(embed_id = %self.id, "Ready message without detail, ignoring");
                return Vec::new();
            }
            EventKind::TimeUpdate(position) | EventKind::AdProgress(position) => {
                self.position = position;
            }
            EventKind::Other => {}
        }

        trace!(embed_id = %self.id, event = %message.event, "Forwarding player event");
        vec![HostEvent::Custom {
            name: message.event,
            detail: message.detail,
        }]
    }

    fn on_ready(&mut self, detail: Value) -> Option<HostEvent> {
        if self.state != BridgeState::AwaitingReady {
            debug!(embed_id = %self.id, "Duplicate ready message, ignoring");
            return None;
        }

        self.state = BridgeState::Ready;
        self.ready_detail = Some(detail);
        info!(embed_id = %self.id, queued = self.pending.len(), "Player ready");

        while let Some(message) = self.pending.pop_front() {
            self.post(&message);
        }
        Some(HostEvent::Load)
    }

    /// Send a control command to the player
    pub fn send(&mut self, command: Command) {
        self.send_command(command.into());
    }

    /// Send a raw method call, deferred until the player is ready
    pub fn send_command(&mut self, message: OutboundMessage) {
        if self.frame.is_none() {
            debug!(embed_id = %self.id, method = %message.method, "No frame attached, dropping command");
            return;
        }
        match self.state {
            BridgeState::Ready => self.post(&message),
            BridgeState::AwaitingReady => {
                trace!(embed_id = %self.id, method = %message.method, "Queueing command until ready");
                self.pending.push_back(message);
            }
            BridgeState::Uninitialized => {
                debug!(embed_id = %self.id, method = %message.method, "Bridge not initialized, dropping command");
            }
        }
    }

    fn post(&self, message: &OutboundMessage) {
        let Some(frame) = self.frame.as_ref() else {
            return;
        };
        let Some(window) = frame.content_window() else {
            debug!(embed_id = %self.id, method = %message.method, "Frame window gone, dropping command");
            return;
        };

        let result = message
            .to_json()
            .and_then(|json| frame.post_message(&window, &json, &self.target_origin));

        match result {
            Ok(()) => trace!(embed_id = %self.id, method = %message.method, "Command posted"),
            Err(e) => debug!(embed_id = %self.id, method = %message.method, error = %e, "Command dropped"),
        }
    }

    /// Detach and return the frame, discarding queued commands
    pub fn teardown(&mut self) -> Option<F> {
        if !self.pending.is_empty() {
            debug!(embed_id = %self.id, dropped = self.pending.len(), "Discarding queued commands");
        }
        self.pending.clear();
        self.frame.take()
    }
}
