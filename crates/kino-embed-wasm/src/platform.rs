//! Browser platform - web-sys implementation of the embed platform
//!
//! Listeners and observers are kept alive by the `Closure` moved into their
//! `Subscription`; cancelling unregisters them and drops the closure.

use kino_embed_core::{
    Error, FrameHandle, HostEvent, IframeSpec, MessageHandler, Platform, RawPayload, Result,
    Subscription, ViewportEntry, ViewportHandler,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, CustomEventInit, Event, HtmlElement, HtmlIFrameElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, MessageEvent, Window,
};

const FRAME_STYLE: &str = "border: 0; width: 100%; height: 100%;";

/// The host element and its window
#[derive(Clone)]
pub struct BrowserPlatform {
    window: Window,
    element: HtmlElement,
}

impl BrowserPlatform {
    pub fn new(element: HtmlElement) -> std::result::Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        Ok(Self { window, element })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

/// The player iframe
pub struct BrowserFrame {
    iframe: HtmlIFrameElement,
}

impl FrameHandle for BrowserFrame {
    type Window = Window;

    fn content_window(&self) -> Option<Window> {
        self.iframe.content_window()
    }

    fn post_message(&self, window: &Window, message: &str, target_origin: &str) -> Result<()> {
        window
            .post_message(&JsValue::from_str(message), target_origin)
            .map_err(|e| Error::PostMessage(format!("{e:?}")))
    }

    fn remove(self) {
        self.iframe.remove();
    }
}

impl Platform for BrowserPlatform {
    type Frame = BrowserFrame;

    fn host_origin(&self) -> Option<String> {
        self.window.location().origin().ok()
    }

    fn create_frame(&self, spec: &IframeSpec) -> Result<BrowserFrame> {
        let document = self
            .window
            .document()
            .ok_or_else(|| Error::FrameCreation("window has no document".into()))?;

        let iframe = document
            .create_element("iframe")
            .map_err(js_frame_error)?
            .dyn_into::<HtmlIFrameElement>()
            .map_err(|_| Error::FrameCreation("created element is not an iframe".into()))?;

        iframe.set_src(&spec.src);
        iframe.set_allow_fullscreen(spec.allow_fullscreen);
        iframe.set_attribute("allow", spec.allow).map_err(js_frame_error)?;
        iframe.set_attribute("style", FRAME_STYLE).map_err(js_frame_error)?;
        if let Some(title) = spec.title.as_deref() {
            iframe.set_title(title);
        }

        self.element.append_child(&iframe).map_err(js_frame_error)?;
        Ok(BrowserFrame { iframe })
    }

    fn listen_messages(&self, mut handler: MessageHandler<Window>) -> Subscription {
        let callback = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let Some(raw) = raw_payload(event.data()) else {
                return;
            };
            let source = event.source().map(|s| s.unchecked_into::<Window>());
            handler(source, raw);
        });

        if let Err(e) = self
            .window
            .add_event_listener_with_callback("message", callback.as_ref().unchecked_ref())
        {
            tracing::warn!(error = ?e, "Failed to listen for player messages");
            return Subscription::empty();
        }

        let window = self.window.clone();
        Subscription::new(move || {
            let _ = window
                .remove_event_listener_with_callback("message", callback.as_ref().unchecked_ref());
            drop(callback);
        })
    }

    fn observe_viewport(&self, threshold: f64, mut handler: ViewportHandler) -> Subscription {
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    handler(ViewportEntry {
                        intersection_ratio: Some(entry.intersection_ratio()),
                        is_intersecting: entry.is_intersecting(),
                    });
                }
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));

        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
                Ok(observer) => observer,
                Err(e) => {
                    tracing::warn!(error = ?e, "IntersectionObserver unavailable");
                    return Subscription::empty();
                }
            };
        observer.observe(&self.element);

        Subscription::new(move || {
            observer.disconnect();
            drop(callback);
        })
    }

    fn dispatch(&self, event: &HostEvent) {
        let result = match event.detail() {
            None => Event::new(event.name()),
            Some(detail) => custom_event(event.name(), detail),
        }
        .and_then(|e| self.element.dispatch_event(&e));

        if let Err(e) = result {
            tracing::warn!(event = event.name(), error = ?e, "Failed to dispatch host event");
        }
    }
}

fn custom_event(name: &str, detail: &serde_json::Value) -> std::result::Result<Event, JsValue> {
    let detail = detail
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)?;

    let init = CustomEventInit::new();
    init.set_detail(&detail);
    CustomEvent::new_with_event_init_dict(name, &init).map(Into::into)
}

/// Convert message data into a payload, skipping values that cannot carry one
fn raw_payload(data: JsValue) -> Option<RawPayload> {
    if let Some(text) = data.as_string() {
        return Some(RawPayload::Text(text));
    }
    if !data.is_object() {
        return None;
    }
    serde_wasm_bindgen::from_value::<serde_json::Value>(data)
        .ok()
        .map(RawPayload::Object)
}

fn js_frame_error(e: JsValue) -> Error {
    Error::FrameCreation(format!("{e:?}"))
}
