//! Player SDK binding over the browser-global `IVSPlayer` package

use cuecast_core::{
    Error, EventHandler, PlaybackErrorInfo, PlayerBackend, PlayerEvent, PlayerEventKind,
    PlayerSdk, Result, SurfaceSpec,
};
use js_sys::{Array, Function, Reflect};
use tracing::{debug, warn};
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Event names used when the package does not expose its enums
pub(crate) fn fallback_event_name(kind: PlayerEventKind) -> &'static str {
    match kind {
        PlayerEventKind::Playing => "Playing",
        PlayerEventKind::Ended => "Ended",
        PlayerEventKind::Ready => "Ready",
        PlayerEventKind::Error => "PlayerError",
        PlayerEventKind::TextMetadataCue => "PlayerTextMetadataCue",
    }
}

/// (enum object, key) under which the package publishes an event name
fn event_enum_key(kind: PlayerEventKind) -> (&'static str, &'static str) {
    match kind {
        PlayerEventKind::Playing => ("PlayerState", "PLAYING"),
        PlayerEventKind::Ended => ("PlayerState", "ENDED"),
        PlayerEventKind::Ready => ("PlayerState", "READY"),
        PlayerEventKind::Error => ("PlayerEventType", "ERROR"),
        PlayerEventKind::TextMetadataCue => ("PlayerEventType", "TEXT_METADATA_CUE"),
    }
}

fn event_name(package: &JsValue, kind: PlayerEventKind) -> String {
    let (group, key) = event_enum_key(kind);
    Reflect::get(package, &JsValue::from_str(group))
        .and_then(|enum_object| Reflect::get(&enum_object, &JsValue::from_str(key)))
        .ok()
        .and_then(|name| name.as_string())
        .unwrap_or_else(|| fallback_event_name(kind).to_string())
}

/// Best-effort text for a thrown or reported JS value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

fn sdk_error(context: &str, err: JsValue) -> Error {
    Error::sdk(format!("{context}: {}", describe(&err)))
}

fn call_method(target: &JsValue, name: &str, args: &[JsValue]) -> std::result::Result<JsValue, JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    let args: Array = args.iter().collect();
    Reflect::apply(&method, target, &args)
}

fn get_string(target: &JsValue, key: &str) -> Option<String> {
    Reflect::get(target, &JsValue::from_str(key)).ok()?.as_string()
}

fn get_number(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key)).ok()?.as_f64()
}

fn to_event(kind: PlayerEventKind, payload: &JsValue) -> PlayerEvent {
    match kind {
        PlayerEventKind::Playing => PlayerEvent::Playing,
        PlayerEventKind::Ended => PlayerEvent::Ended,
        PlayerEventKind::Ready => PlayerEvent::Ready,
        PlayerEventKind::Error => PlayerEvent::Error(PlaybackErrorInfo {
            code: get_number(payload, "code").map(|c| c as i64),
            kind: get_string(payload, "type"),
            message: get_string(payload, "message").unwrap_or_else(|| describe(payload)),
        }),
        PlayerEventKind::TextMetadataCue => {
            PlayerEvent::cue(get_string(payload, "text").unwrap_or_default())
        }
    }
}

/// The loaded SDK package object
pub struct IvsSdk {
    package: JsValue,
}

impl IvsSdk {
    pub fn new(package: JsValue) -> Self {
        Self { package }
    }
}

impl PlayerSdk for IvsSdk {
    fn is_player_supported(&self) -> bool {
        Reflect::get(&self.package, &JsValue::from_str("isPlayerSupported"))
            .ok()
            .and_then(|supported| supported.as_bool())
            .unwrap_or(false)
    }

    fn create(&self) -> Result<Box<dyn PlayerBackend>> {
        let player = call_method(&self.package, "create", &[])
            .map_err(|e| sdk_error("create", e))?;
        Ok(Box::new(IvsPlayer {
            player,
            package: self.package.clone(),
            listeners: Vec::new(),
        }))
    }
}

/// A player created by the SDK package
pub struct IvsPlayer {
    player: JsValue,
    package: JsValue,
    /// Registered closures, kept alive until removal
    listeners: Vec<(String, Closure<dyn FnMut(JsValue)>)>,
}

impl PlayerBackend for IvsPlayer {
    fn attach_to_surface(&mut self, surface: &SurfaceSpec) -> Result<()> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| Error::sdk("no document available"))?;
        let video: web_sys::HtmlVideoElement = document
            .get_element_by_id(&surface.id)
            .ok_or_else(|| Error::sdk(format!("surface {} not found", surface.surface_ref())))?
            .dyn_into()
            .map_err(|_| Error::sdk(format!("surface {} is not a video element", surface.surface_ref())))?;

        video.set_muted(surface.muted);
        if surface.plays_inline {
            video
                .set_attribute("playsinline", "")
                .map_err(|e| sdk_error("playsinline", e))?;
        }

        call_method(&self.player, "attachHTMLVideoElement", &[video.into()])
            .map_err(|e| sdk_error("attachHTMLVideoElement", e))?;
        Ok(())
    }

    fn add_event_listener(&mut self, kind: PlayerEventKind, mut handler: EventHandler) -> Result<()> {
        let name = event_name(&self.package, kind);
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            handler(to_event(kind, &payload));
        });

        call_method(
            &self.player,
            "addEventListener",
            &[JsValue::from_str(&name), closure.as_ref().clone()],
        )
        .map_err(|e| sdk_error("addEventListener", e))?;

        debug!(kind = %kind, name = %name, "Listener registered");
        self.listeners.push((name, closure));
        Ok(())
    }

    fn remove_event_listeners(&mut self) {
        for (name, closure) in self.listeners.drain(..) {
            if let Err(e) = call_method(
                &self.player,
                "removeEventListener",
                &[JsValue::from_str(&name), closure.as_ref().clone()],
            ) {
                warn!(name = %name, error = %describe(&e), "Failed to remove listener");
            }
        }
    }

    fn set_autoplay(&mut self, enabled: bool) -> Result<()> {
        call_method(&self.player, "setAutoplay", &[JsValue::from_bool(enabled)])
            .map(|_| ())
            .map_err(|e| sdk_error("setAutoplay", e))
    }

    fn load(&mut self, url: &Url) -> Result<()> {
        call_method(&self.player, "load", &[JsValue::from_str(url.as_str())])
            .map(|_| ())
            .map_err(|e| sdk_error("load", e))
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        call_method(&self.player, "setVolume", &[JsValue::from_f64(volume as f64)])
            .map(|_| ())
            .map_err(|e| sdk_error("setVolume", e))
    }

    fn position(&self) -> f64 {
        call_method(&self.player, "getPosition", &[])
            .ok()
            .and_then(|p| p.as_f64())
            .unwrap_or(0.0)
    }

    fn delete(&mut self) {
        if let Err(e) = call_method(&self.player, "delete", &[]) {
            warn!(error = %describe(&e), "Player delete failed");
        }
    }
}
