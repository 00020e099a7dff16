//! Integration tests for Kino Embed Core

use kino_embed_core::{
    BridgeState, EmbedAttributes, EmbedDefaults, EmbedPlayer, Error, FrameHandle, HostEvent, IframeSpec, Layout,
    MessageHandler, Platform, RawPayload, Result, Subscription, VideoInterface, ViewportEntry,
    ViewportHandler,
};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

// =============================================================================
// Mock Platform
// =============================================================================

struct Slot<H> {
    active: bool,
    handler: Option<H>,
}

#[derive(Default)]
struct MockState {
    host_origin: Option<String>,
    fail_frames: Cell<bool>,
    frames: RefCell<Vec<FrameRecord>>,
    message_slots: RefCell<Vec<Slot<MessageHandler<u32>>>>,
    viewport_slots: RefCell<Vec<Slot<ViewportHandler>>>,
    thresholds: RefCell<Vec<f64>>,
    dispatched: RefCell<Vec<HostEvent>>,
}

#[derive(Clone)]
struct FrameRecord {
    window: u32,
    spec: IframeSpec,
    /// `(target origin, message)` per post
    posted: Rc<RefCell<Vec<(String, String)>>>,
    removed: Rc<Cell<bool>>,
}

#[derive(Clone, Default)]
struct MockPlatform {
    state: Rc<MockState>,
}

struct MockFrame {
    record: FrameRecord,
}

impl FrameHandle for MockFrame {
    type Window = u32;

    fn content_window(&self) -> Option<u32> {
        (!self.record.removed.get()).then_some(self.record.window)
    }

    fn post_message(&self, window: &u32, message: &str, target_origin: &str) -> Result<()> {
        assert_eq!(*window, self.record.window);
        self.record
            .posted
            .borrow_mut()
            .push((target_origin.to_string(), message.to_string()));
        Ok(())
    }

    fn remove(self) {
        self.record.removed.set(true);
    }
}

impl MockPlatform {
    fn with_host_origin(origin: &str) -> Self {
        Self {
            state: Rc::new(MockState {
                host_origin: Some(origin.to_string()),
                ..Default::default()
            }),
        }
    }

    fn frame(&self, index: usize) -> FrameRecord {
        self.state.frames.borrow()[index].clone()
    }

    fn posted(&self, index: usize) -> Vec<Value> {
        self.frame(index)
            .posted
            .borrow()
            .iter()
            .map(|(_, m)| serde_json::from_str(m).unwrap())
            .collect()
    }

    fn posted_origins(&self, index: usize) -> Vec<String> {
        self.frame(index)
            .posted
            .borrow()
            .iter()
            .map(|(origin, _)| origin.clone())
            .collect()
    }

    fn source_contains(&self, needle: &str) -> bool {
        self.frame(0).spec.src.contains(needle)
    }

    fn dispatched(&self) -> Vec<HostEvent> {
        self.state.dispatched.borrow().clone()
    }

    fn active_message_listeners(&self) -> usize {
        self.state.message_slots.borrow().iter().filter(|s| s.active).count()
    }

    fn active_viewport_observers(&self) -> usize {
        self.state.viewport_slots.borrow().iter().filter(|s| s.active).count()
    }

    fn deliver(&self, source: Option<u32>, raw: impl Into<RawPayload>) {
        let raw = raw.into();
        let count = self.state.message_slots.borrow().len();
        for i in 0..count {
            let handler = self.state.message_slots.borrow_mut()[i].handler.take();
            if let Some(mut handler) = handler {
                handler(source, raw.clone());
                let mut slots = self.state.message_slots.borrow_mut();
                if slots[i].active {
                    slots[i].handler = Some(handler);
                }
            }
        }
    }

    fn intersect(&self, ratio: f64) {
        let count = self.state.viewport_slots.borrow().len();
        for i in 0..count {
            let handler = self.state.viewport_slots.borrow_mut()[i].handler.take();
            if let Some(mut handler) = handler {
                handler(ViewportEntry::with_ratio(ratio));
                let mut slots = self.state.viewport_slots.borrow_mut();
                if slots[i].active {
                    slots[i].handler = Some(handler);
                }
            }
        }
    }
}

impl Platform for MockPlatform {
    type Frame = MockFrame;

    fn host_origin(&self) -> Option<String> {
        self.state.host_origin.clone()
    }

    fn create_frame(&self, spec: &IframeSpec) -> Result<MockFrame> {
        if self.state.fail_frames.get() {
            return Err(Error::FrameCreation("document detached".into()));
        }
        let mut frames = self.state.frames.borrow_mut();
        let record = FrameRecord {
            window: 100 + frames.len() as u32,
            spec: spec.clone(),
            posted: Rc::default(),
            removed: Rc::default(),
        };
        frames.push(record.clone());
        Ok(MockFrame { record })
    }

    fn listen_messages(&self, handler: MessageHandler<u32>) -> Subscription {
        let mut slots = self.state.message_slots.borrow_mut();
        let index = slots.len();
        slots.push(Slot { active: true, handler: Some(handler) });

        let state = self.state.clone();
        Subscription::new(move || {
            let mut slots = state.message_slots.borrow_mut();
            slots[index].active = false;
            slots[index].handler = None;
        })
    }

    fn observe_viewport(&self, threshold: f64, handler: ViewportHandler) -> Subscription {
        self.state.thresholds.borrow_mut().push(threshold);
        let mut slots = self.state.viewport_slots.borrow_mut();
        let index = slots.len();
        slots.push(Slot { active: true, handler: Some(handler) });

        let state = self.state.clone();
        Subscription::new(move || {
            let mut slots = state.viewport_slots.borrow_mut();
            slots[index].active = false;
            slots[index].handler = None;
        })
    }

    fn dispatch(&self, event: &HostEvent) {
        self.state.dispatched.borrow_mut().push(event.clone());
    }
}

fn attrs(pairs: &[(&str, &str)]) -> EmbedAttributes {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    EmbedAttributes::from_lookup(|name| map.get(name).map(|v| v.to_string()))
}

fn player_with(platform: &MockPlatform, extra: &[(&str, &str)]) -> EmbedPlayer<MockPlatform> {
    let mut pairs = vec![("data-apikey", "K1"), ("data-videoid", "V1")];
    pairs.extend_from_slice(extra);
    EmbedPlayer::build(platform.clone(), &attrs(&pairs)).unwrap()
}

fn ready_message() -> Value {
    json!({"event": "ready", "detail": {"playerId": "p1"}})
}

fn methods(posted: &[Value]) -> Vec<(String, Value)> {
    posted
        .iter()
        .map(|m| (m["method"].as_str().unwrap().to_string(), m["optParams"].clone()))
        .collect()
}

// =============================================================================
// Build Tests
// =============================================================================

#[test]
fn test_build_requires_api_key() {
    let platform = MockPlatform::default();
    let result = EmbedPlayer::build(platform, &attrs(&[("data-videoid", "V1")]));
    assert!(matches!(result, Err(Error::MissingAttribute { name: "data-apikey" })));
}

#[test]
fn test_build_requires_video_id() {
    let platform = MockPlatform::default();
    let result = EmbedPlayer::build(platform, &attrs(&[("data-apikey", "K1")]));
    assert!(matches!(result, Err(Error::MissingAttribute { name: "data-videoid" })));
}

#[test]
fn test_default_source_fragment() {
    let platform = MockPlatform::with_host_origin("https://news.example.com");
    let player = player_with(&platform, &[]);

    assert_eq!(
        player.source().fragment,
        "apikey=K1&videoid=V1&baseurl=https%3A%2F%2Fnews.example.com"
    );
    assert_eq!(player.source().target_origin, "https://kino-player.pages.dev");
    assert_eq!(player.preconnect_origins(), vec!["https://kino-player.pages.dev"]);
    assert!(!player.viewport_policy().is_enabled());
}

#[test]
fn test_placeholder_from_attributes() {
    let platform = MockPlatform::default();
    let player = player_with(
        &platform,
        &[("poster", "https://img.example.com/p.jpg"), ("aria-label", "Match highlights")],
    );

    let image = player.placeholder().unwrap();
    assert_eq!(image.src, "https://img.example.com/p.jpg");
    assert_eq!(image.alt, "Loading video - Match highlights");
    assert_eq!(image.layout, "fill");
    assert_eq!(image.referrer_policy, "origin");
}

#[test]
fn test_layout_support() {
    assert!(EmbedPlayer::<MockPlatform>::is_layout_supported(Layout::Responsive));
    assert!(!EmbedPlayer::<MockPlatform>::is_layout_supported(Layout::Container));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_layout_creates_frame_and_listener() {
    let platform = MockPlatform::with_host_origin("https://news.example.com");
    let mut player = player_with(&platform, &[("aria-label", "Highlights")]);
    assert_eq!(player.bridge_state(), None);

    player.layout().unwrap();

    let frame = platform.frame(0);
    assert_eq!(frame.spec.src, player.source().url);
    assert_eq!(frame.spec.title.as_deref(), Some("Highlights"));
    assert_eq!(platform.active_message_listeners(), 1);
    assert_eq!(platform.active_viewport_observers(), 0);
    assert_eq!(player.bridge_state(), Some(BridgeState::AwaitingReady));
}

#[test]
fn test_layout_failure_propagates() {
    let platform = MockPlatform::default();
    platform.state.fail_frames.set(true);
    let mut player = player_with(&platform, &[]);

    assert!(matches!(player.layout(), Err(Error::FrameCreation(_))));
    assert!(!player.is_laid_out());
    assert_eq!(platform.active_message_listeners(), 0);
}

#[test]
fn test_unlayout_is_idempotent() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[("data-config", "viewport=50")]);

    assert!(player.unlayout());
    player.layout().unwrap();
    assert!(player.unlayout());
    assert!(player.unlayout());

    assert!(platform.frame(0).removed.get());
    assert_eq!(platform.active_message_listeners(), 0);
    assert_eq!(platform.active_viewport_observers(), 0);
}

#[test]
fn test_relayout_leaves_no_dangling_listeners() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[("data-config", "viewport=0.5")]);

    for _ in 0..3 {
        player.layout().unwrap();
        player.unlayout();
    }
    player.layout().unwrap();

    assert_eq!(platform.active_message_listeners(), 1);
    assert_eq!(platform.active_viewport_observers(), 1);
    assert_eq!(platform.state.frames.borrow().len(), 4);

    // Messages from a destroyed frame's window are ignored
    let old_window = platform.frame(0).window;
    platform.deliver(Some(old_window), ready_message());
    assert_eq!(player.bridge_state(), Some(BridgeState::AwaitingReady));

    let new_window = platform.frame(3).window;
    platform.deliver(Some(new_window), ready_message());
    assert!(player.is_ready());
}

#[test]
fn test_drop_tears_down() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);
    player.layout().unwrap();
    drop(player);

    assert!(platform.frame(0).removed.get());
    assert_eq!(platform.active_message_listeners(), 0);
}

// =============================================================================
// Message Bridge Tests
// =============================================================================

#[test]
fn test_ready_is_one_shot() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);
    player.layout().unwrap();
    let window = platform.frame(0).window;

    platform.deliver(Some(window), json!({"event": "ready", "detail": {"n": 1}}));
    platform.deliver(Some(window), json!({"event": "ready", "detail": {"n": 2}}));

    assert_eq!(platform.dispatched(), vec![HostEvent::Load]);
    assert!(player.is_ready());
}

#[test]
fn test_json_string_messages_accepted() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);
    player.layout().unwrap();
    let window = platform.frame(0).window;

    platform.deliver(Some(window), r#"{"event":"ready","detail":true}"#);
    assert!(player.is_ready());
}

#[test]
fn test_commands_before_ready_flush_in_order() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);
    player.layout().unwrap();
    let window = platform.frame(0).window;

    player.play();
    player.mute();
    player.seek_to(42.0);
    assert!(platform.posted(0).is_empty());

    platform.deliver(Some(window), ready_message());
    platform.deliver(Some(window), ready_message());
    player.pause();

    assert_eq!(
        methods(&platform.posted(0)),
        vec![
            ("play".to_string(), json!("")),
            ("mute".to_string(), json!("")),
            ("seekTo".to_string(), json!(42.0)),
            ("pause".to_string(), json!("")),
        ]
    );
    assert!(platform
        .posted_origins(0)
        .iter()
        .all(|origin| origin == "https://kino-player.pages.dev"));
}

#[test]
fn test_malformed_iframe_src_posts_to_wildcard() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[("data-iframe-src", "not a url")]);
    assert_eq!(player.source().target_origin, "*");
    assert!(player.preconnect_origins().is_empty());

    player.layout().unwrap();
    let window = platform.frame(0).window;
    assert!(platform.frame(0).spec.src.starts_with("not a url#apikey=K1"));

    player.play();
    platform.deliver(Some(window), ready_message());

    assert_eq!(methods(&platform.posted(0)), vec![("play".to_string(), json!(""))]);
    assert_eq!(platform.posted_origins(0), vec!["*"]);
}

#[test]
fn test_commands_dropped_when_torn_down_before_ready() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);
    player.layout().unwrap();
    let window = platform.frame(0).window;

    player.play();
    player.unmute();
    player.unlayout();
    platform.deliver(Some(window), ready_message());
    player.play();

    assert!(platform.posted(0).is_empty());
    assert!(platform.dispatched().is_empty());
}

#[test]
fn test_foreign_sender_ignored() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);
    player.layout().unwrap();
    let window = platform.frame(0).window;

    let update = json!({"event": "cplVideoTimeUpdate", "detail": {"currentTime": 9.0}});
    platform.deliver(Some(window + 1), update.clone());
    platform.deliver(None, update);
    platform.deliver(Some(window + 1), ready_message());

    assert_eq!(player.current_time(), 0.0);
    assert!(platform.dispatched().is_empty());
    assert_eq!(player.bridge_state(), Some(BridgeState::AwaitingReady));
}

#[test]
fn test_time_update_forwarded() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);
    player.layout().unwrap();
    let window = platform.frame(0).window;

    platform.deliver(
        Some(window),
        json!({"event": "cplVideoTimeUpdate", "detail": {"currentTime": 12.5}}),
    );

    assert_eq!(player.current_time(), 12.5);
    assert_eq!(
        platform.dispatched(),
        vec![HostEvent::Custom {
            name: "cplVideoTimeUpdate".into(),
            detail: json!({"currentTime": 12.5}),
        }]
    );
}

#[test]
fn test_ad_progress_and_unknown_events() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);
    player.layout().unwrap();
    let window = platform.frame(0).window;

    platform.deliver(Some(window), json!({"event": "cplAdProgress", "detail": {"position": 3.25}}));
    assert_eq!(player.current_time(), 3.25);

    platform.deliver(Some(window), json!({"event": "cplVideoEnded", "detail": null}));
    platform.deliver(Some(window), "not json at all");
    platform.deliver(Some(window), json!(["event", "ready"]));

    let names: Vec<String> = platform.dispatched().iter().map(|e| e.name().to_string()).collect();
    assert_eq!(names, vec!["cplAdProgress", "cplVideoEnded"]);
}

#[test]
fn test_control_surface_defaults() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);

    assert_eq!(player.duration(), 1.0);
    assert!(player.played_ranges().is_empty());
    assert!(player.supports_platform());
    assert!(player.is_interactive());
    assert!(!player.is_fullscreen());
    assert!(!player.preimplements_media_session());

    // Commands without a frame are dropped quietly
    player.play();
    player.fullscreen_enter();
    assert_eq!(player.current_time(), 0.0);
}

#[test]
fn test_custom_defaults_reach_source_and_bridge() {
    let platform = MockPlatform::default();
    let defaults = EmbedDefaults {
        base_url: "https://staging.example.com/embed/",
        duration: 90.0,
        ..Default::default()
    };
    let mut player = EmbedPlayer::build_with_defaults(
        platform.clone(),
        &attrs(&[("data-apikey", "K1"), ("data-videoid", "V1")]),
        defaults,
    )
    .unwrap();

    assert_eq!(player.source().target_origin, "https://staging.example.com");
    assert_eq!(player.duration(), 90.0);

    player.layout().unwrap();
    assert!(platform.frame(0).spec.src.starts_with("https://staging.example.com/embed/#"));
    assert_eq!(player.duration(), 90.0);

    player.unlayout();
    assert_eq!(player.duration(), 90.0);
}

// =============================================================================
// Viewport Policy Tests
// =============================================================================

#[test]
fn test_viewport_crossings_send_single_commands() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[("data-config", "viewport=50")]);
    player.layout().unwrap();
    let window = platform.frame(0).window;
    platform.deliver(Some(window), ready_message());

    assert_eq!(*platform.state.thresholds.borrow(), vec![0.5]);

    let count = |value: bool| {
        methods(&platform.posted(0))
            .iter()
            .filter(|(m, p)| m == "handleViewport" && *p == json!(value))
            .count()
    };

    platform.intersect(0.1);
    platform.intersect(0.6);
    assert_eq!(count(true), 1);
    let falses = count(false);

    platform.intersect(0.4);
    assert_eq!(count(true), 1);
    assert_eq!(count(false), falses + 1);
}

#[test]
fn test_viewport_disabled_without_threshold() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[("data-config", "autoplay=1")]);
    player.layout().unwrap();

    assert_eq!(platform.active_viewport_observers(), 0);
    assert!(platform.source_contains("autoplay=1"));
}

#[test]
fn test_visibility_callback_drives_viewport_command() {
    let platform = MockPlatform::default();
    let mut player = player_with(&platform, &[]);
    player.layout().unwrap();
    let window = platform.frame(0).window;

    player.viewport_callback(false);
    platform.deliver(Some(window), ready_message());
    player.viewport_callback(true);
    player.pause_callback();

    assert_eq!(
        methods(&platform.posted(0)),
        vec![
            ("handleViewport".to_string(), json!(false)),
            ("handleViewport".to_string(), json!(true)),
            ("pause".to_string(), json!("")),
        ]
    );
}
