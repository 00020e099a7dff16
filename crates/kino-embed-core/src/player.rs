//! Embed Player - component lifecycle over a host platform
//!
//! ```text
//! build ──> layout ──> unlayout ──> layout ──> ...
//!   │         │            │
//!   │         │            └─ cancel listeners, destroy frame, drop bridge
//!   │         └─ create frame, listen for messages, observe viewport
//!   └─ validate attributes, build iframe source, parse viewport policy
//! ```
//!
//! Each layout creates a fresh [`MessageBridge`]. Listener closures only hold
//! weak references to it, so a torn down bridge is never reached again.

use crate::bridge::{BridgeState, FrameHandle, HostEvent, MessageBridge};
use crate::config::{EmbedAttributes, EmbedDefaults, PlayerConfig};
use crate::placeholder::PlaceholderImage;
use crate::protocol::{Command, RawPayload};
use crate::source::{build_iframe_source, preconnect_origins, IframeSource, IframeSpec};
use crate::types::{EmbedId, Layout, Subscription};
use crate::video::VideoInterface;
use crate::viewport::{ViewportEntry, ViewportPolicy, ViewportTracker};
use crate::Result;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, instrument};

/// Callback receiving `(sender window, message data)` for each message event
pub type MessageHandler<W> = Box<dyn FnMut(Option<W>, RawPayload)>;

/// Callback receiving visibility observations of the host element
pub type ViewportHandler = Box<dyn FnMut(ViewportEntry)>;

/// Host environment the embed runs in
///
/// Implemented over `web-sys` in the browser and by recording mocks in tests.
pub trait Platform: Clone + 'static {
    type Frame: FrameHandle + 'static;

    /// Origin of the embedding page, if resolvable
    fn host_origin(&self) -> Option<String>;

    /// Create the player iframe inside the host element
    fn create_frame(&self, spec: &IframeSpec) -> Result<Self::Frame>;

    /// Subscribe to cross-document messages delivered to the host window
    fn listen_messages(
        &self,
        handler: MessageHandler<<Self::Frame as FrameHandle>::Window>,
    ) -> Subscription;

    /// Subscribe to visibility changes of the host element
    fn observe_viewport(&self, threshold: f64, handler: ViewportHandler) -> Subscription;

    /// Emit an event on the host element
    fn dispatch(&self, event: &HostEvent);
}

struct Session<F: FrameHandle> {
    bridge: Rc<RefCell<MessageBridge<F>>>,
    message_sub: Option<Subscription>,
    viewport_sub: Option<Subscription>,
}

/// An embedded third-party player
pub struct EmbedPlayer<P: Platform> {
    platform: P,
    defaults: EmbedDefaults,
    config: PlayerConfig,
    viewport: ViewportPolicy,
    source: IframeSource,
    aria_label: Option<String>,
    session: Option<Session<P::Frame>>,
}

impl<P: Platform> EmbedPlayer<P> {
    /// Validate attributes and prepare everything that stays fixed for the
    /// lifetime of the element
    pub fn build(platform: P, attrs: &EmbedAttributes) -> Result<Self> {
        Self::build_with_defaults(platform, attrs, EmbedDefaults::default())
    }

    /// Build with custom fallbacks for the base URL, target origin and
    /// reported duration
    pub fn build_with_defaults(platform: P, attrs: &EmbedAttributes, defaults: EmbedDefaults) -> Result<Self> {
        let config = PlayerConfig::from_attributes_with(attrs, &defaults)?;
        let viewport = ViewportPolicy::from_raw_config(config.raw_config.as_deref());
        let source = build_iframe_source(&config, platform.host_origin().as_deref(), &defaults);

        info!(
            video_id = %config.video_id,
            target_origin = %source.target_origin,
            viewport_threshold = viewport.threshold(),
            "Embed built"
        );

        Ok(Self {
            platform,
            defaults,
            config,
            viewport,
            source,
            aria_label: attrs.aria_label.clone(),
            session: None,
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn viewport_policy(&self) -> ViewportPolicy {
        self.viewport
    }

    pub fn source(&self) -> &IframeSource {
        &self.source
    }

    pub fn placeholder(&self) -> Option<PlaceholderImage> {
        PlaceholderImage::for_config(&self.config, self.aria_label.as_deref())
    }

    pub fn preconnect_origins(&self) -> Vec<String> {
        preconnect_origins(&self.config)
    }

    pub fn is_layout_supported(layout: Layout) -> bool {
        layout.is_size_defined()
    }

    pub fn is_laid_out(&self) -> bool {
        self.session.is_some()
    }

    /// Id of the current layout cycle
    pub fn embed_id(&self) -> Option<EmbedId> {
        self.session.as_ref().map(|s| s.bridge.borrow().id())
    }

    pub fn bridge_state(&self) -> Option<BridgeState> {
        self.session.as_ref().map(|s| s.bridge.borrow().state())
    }

    pub fn is_ready(&self) -> bool {
        self.bridge_state() == Some(BridgeState::Ready)
    }

    /// Create the frame and start listening to it
    #[instrument(skip(self), fields(video_id = %self.config.video_id))]
    pub fn layout(&mut self) -> Result<()> {
        if self.session.is_some() {
            debug!("Already laid out, recreating frame");
            self.unlayout();
        }

        let id = EmbedId::new();
        let spec = IframeSpec::new(&self.source, self.aria_label.as_deref());
        let frame = self.platform.create_frame(&spec)?;

        let bridge = Rc::new(RefCell::new(MessageBridge::new(
            id,
            self.source.target_origin.clone(),
            &self.defaults,
        )));

        let message_sub = self
            .platform
            .listen_messages(message_handler(Rc::downgrade(&bridge), self.platform.clone()));
        bridge.borrow_mut().attach(frame);

        let viewport_sub = self.viewport.is_enabled().then(|| {
            self.platform.observe_viewport(
                self.viewport.threshold(),
                viewport_handler(Rc::downgrade(&bridge), self.viewport),
            )
        });

        info!(embed_id = %id, src = %self.source.url, "Player frame created");

        self.session = Some(Session {
            bridge,
            message_sub: Some(message_sub),
            viewport_sub,
        });
        Ok(())
    }

    /// Tear down the current layout
    ///
    /// Safe to call repeatedly and before any layout. Returns true so the host
    /// lays the element out again when it comes back.
    pub fn unlayout(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return true;
        };

        if let Some(mut sub) = session.message_sub.take() {
            sub.cancel();
        }
        if let Some(mut sub) = session.viewport_sub.take() {
            sub.cancel();
        }

        let mut bridge = session.bridge.borrow_mut();
        let id = bridge.id();
        let frame = bridge.teardown();
        drop(bridge);

        if let Some(frame) = frame {
            frame.remove();
        }

        info!(embed_id = %id, "Player frame destroyed");
        true
    }

    /// Host visibility callback, independent of the viewport policy
    pub fn viewport_callback(&mut self, in_viewport: bool) {
        self.send(Command::HandleViewport(in_viewport));
    }

    /// Host request to pause, e.g. when the element leaves the document
    pub fn pause_callback(&mut self) {
        self.pause();
    }

    fn send(&self, command: Command) {
        match &self.session {
            Some(session) => session.bridge.borrow_mut().send(command),
            None => debug!(method = command.method(), "Not laid out, dropping command"),
        }
    }
}

impl<P: Platform> VideoInterface for EmbedPlayer<P> {
    fn play(&mut self) {
        self.send(Command::Play);
    }

    fn pause(&mut self) {
        self.send(Command::Pause);
    }

    fn mute(&mut self) {
        self.send(Command::Mute);
    }

    fn unmute(&mut self) {
        self.send(Command::Unmute);
    }

    fn seek_to(&mut self, seconds: f64) {
        self.send(Command::SeekTo(seconds));
    }

    fn current_time(&self) -> f64 {
        self.session
            .as_ref()
            .map(|s| s.bridge.borrow().current_time())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> f64 {
        self.session
            .as_ref()
            .map(|s| s.bridge.borrow().duration())
            .unwrap_or(self.defaults.duration)
    }
}

impl<P: Platform> Drop for EmbedPlayer<P> {
    fn drop(&mut self) {
        self.unlayout();
    }
}

fn message_handler<P: Platform>(
    bridge: Weak<RefCell<MessageBridge<P::Frame>>>,
    platform: P,
) -> MessageHandler<<P::Frame as FrameHandle>::Window> {
    Box::new(move |source, raw| {
        let Some(bridge) = bridge.upgrade() else {
            return;
        };
        let events = bridge.borrow_mut().handle_message(source.as_ref(), &raw);
        for event in &events {
            platform.dispatch(event);
        }
    })
}

fn viewport_handler<F: FrameHandle + 'static>(
    bridge: Weak<RefCell<MessageBridge<F>>>,
    policy: ViewportPolicy,
) -> ViewportHandler {
    let mut tracker = ViewportTracker::new(policy);
    Box::new(move |entry| {
        let Some(in_view) = tracker.observe(&entry) else {
            return;
        };
        if let Some(bridge) = bridge.upgrade() {
            bridge.borrow_mut().send(Command::HandleViewport(in_view));
        }
    })
}
