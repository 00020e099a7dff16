//! Kino Embed WASM - Third-party iframe player embed for the browser
//!
//! Wraps a host element, renders the player iframe into it and exposes a
//! uniform control surface. Player events are re-emitted on the host element
//! as DOM events of the same name.
//!
//! ## Usage
//!
//! ```javascript
//! import init, { KinoEmbedPlayer } from '@kino/embed-wasm';
//!
//! await init();
//! const el = document.querySelector('#player'); // data-apikey, data-videoid, ...
//! const player = new KinoEmbedPlayer(el);
//! el.addEventListener('load', () => player.play());
//! player.layout();
//! ```

use kino_embed_core::{EmbedAttributes, EmbedPlayer, Layout, VideoInterface};
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};

mod platform;

pub use platform::{BrowserFrame, BrowserPlatform};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"[Kino Embed] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Embedded player bound to a host element
#[wasm_bindgen]
pub struct KinoEmbedPlayer {
    inner: EmbedPlayer<BrowserPlatform>,
}

#[wasm_bindgen]
impl KinoEmbedPlayer {
    /// Read the element's attributes and prepare the embed
    ///
    /// Throws when `data-apikey` or `data-videoid` is missing.
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement) -> Result<KinoEmbedPlayer, JsValue> {
        let attrs = EmbedAttributes::from_lookup(|name| element.get_attribute(name));
        let platform = BrowserPlatform::new(element)?;
        let inner = EmbedPlayer::build(platform, &attrs).map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Create the player iframe
    #[wasm_bindgen]
    pub fn layout(&mut self) -> Result<(), JsValue> {
        self.inner.layout().map_err(to_js_error)
    }

    /// Destroy the player iframe and release listeners
    #[wasm_bindgen]
    pub fn unlayout(&mut self) -> bool {
        self.inner.unlayout()
    }

    #[wasm_bindgen]
    pub fn play(&mut self) {
        self.inner.play();
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.inner.pause();
    }

    #[wasm_bindgen]
    pub fn mute(&mut self) {
        self.inner.mute();
    }

    #[wasm_bindgen]
    pub fn unmute(&mut self) {
        self.inner.unmute();
    }

    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&mut self, seconds: f64) {
        self.inner.seek_to(seconds);
    }

    #[wasm_bindgen(js_name = getCurrentTime)]
    pub fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    #[wasm_bindgen(js_name = getDuration)]
    pub fn duration(&self) -> f64 {
        self.inner.duration()
    }

    /// Played ranges as `[start, end]` pairs
    #[wasm_bindgen(js_name = getPlayedRanges)]
    pub fn played_ranges(&self) -> js_sys::Array {
        self.inner
            .played_ranges()
            .into_iter()
            .map(|(start, end)| {
                js_sys::Array::of2(&JsValue::from_f64(start), &JsValue::from_f64(end))
            })
            .collect()
    }

    /// Host visibility change
    #[wasm_bindgen(js_name = viewportCallback)]
    pub fn viewport_callback(&mut self, in_viewport: bool) {
        self.inner.viewport_callback(in_viewport);
    }

    #[wasm_bindgen(js_name = pauseCallback)]
    pub fn pause_callback(&mut self) {
        self.inner.pause_callback();
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    #[wasm_bindgen(getter, js_name = iframeSrc)]
    pub fn iframe_src(&self) -> String {
        self.inner.source().url.clone()
    }

    #[wasm_bindgen(getter, js_name = targetOrigin)]
    pub fn target_origin(&self) -> String {
        self.inner.source().target_origin.clone()
    }

    #[wasm_bindgen(getter, js_name = viewportThreshold)]
    pub fn viewport_threshold(&self) -> f64 {
        self.inner.viewport_policy().threshold()
    }

    /// Origins worth preconnecting to before layout
    #[wasm_bindgen(js_name = preconnectOrigins)]
    pub fn preconnect_origins(&self) -> js_sys::Array {
        self.inner
            .preconnect_origins()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }

    /// Build the poster placeholder image, if a poster is configured
    #[wasm_bindgen(js_name = createPlaceholder)]
    pub fn create_placeholder(&self) -> Result<Option<Element>, JsValue> {
        let Some(image) = self.inner.placeholder() else {
            return Ok(None);
        };
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let img = document.create_element("img")?;
        for (name, value) in image.attributes() {
            img.set_attribute(name, &value)?;
        }
        Ok(Some(img))
    }

    #[wasm_bindgen(js_name = isLayoutSupported)]
    pub fn is_layout_supported(layout: &str) -> bool {
        layout
            .parse::<Layout>()
            .map(EmbedPlayer::<BrowserPlatform>::is_layout_supported)
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = supportsPlatform)]
    pub fn supports_platform(&self) -> bool {
        self.inner.supports_platform()
    }

    #[wasm_bindgen(js_name = isInteractive)]
    pub fn is_interactive(&self) -> bool {
        self.inner.is_interactive()
    }

    #[wasm_bindgen(js_name = isFullscreen)]
    pub fn is_fullscreen(&self) -> bool {
        self.inner.is_fullscreen()
    }
}

fn to_js_error(e: kino_embed_core::Error) -> JsValue {
    JsError::new(&format!("[{}] {}", e.error_code(), e)).into()
}
