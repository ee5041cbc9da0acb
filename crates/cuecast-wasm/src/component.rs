//! The player component exported to JavaScript

use crate::loader::DomScriptLoader;
use cuecast_core::{
    MetadataView, PlayerConfig, PlayerLifecycleManager, Result, SdkLoader, VisibilityGate,
};
use js_sys::Function;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{error, warn};
use url::Url;
use wasm_bindgen::prelude::*;

thread_local! {
    /// Page-wide loaders keyed by script URL. Every component on the page
    /// shares one, so the SDK script is appended at most once per URL.
    static PAGE_LOADERS: RefCell<HashMap<Url, Rc<SdkLoader>>> = RefCell::new(HashMap::new());
}

pub(crate) fn page_loader(script_url: &Url) -> Rc<SdkLoader> {
    PAGE_LOADERS.with(|loaders| {
        let mut loaders = loaders.borrow_mut();
        let loader = loaders.entry(script_url.clone()).or_insert_with(|| {
            Rc::new(SdkLoader::new(DomScriptLoader::new(script_url.clone())))
        });
        Rc::clone(loader)
    })
}

fn to_js(err: cuecast_core::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Config for a `videoStream` argument. An empty argument keeps the
/// configured default stream.
pub(crate) fn config_for_stream(video_stream: &str) -> Result<PlayerConfig> {
    let config = PlayerConfig::default();
    if video_stream.trim().is_empty() {
        return Ok(config);
    }
    config.with_stream_url(video_stream)
}

fn metadata_id_forwarder(set_metadata_id: Option<Function>) -> impl Fn(&str) + 'static {
    move |product_id: &str| {
        let Some(callback) = &set_metadata_id else {
            return;
        };
        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(product_id)) {
            warn!(error = %crate::ivs::describe(&e), "setMetadataId callback threw");
        }
    }
}

/// Embedded player with a hover-revealed metadata overlay
#[wasm_bindgen]
pub struct CuecastPlayer {
    manager: Rc<PlayerLifecycleManager>,
    loader: Rc<SdkLoader>,
    gate: VisibilityGate,
}

#[wasm_bindgen]
impl CuecastPlayer {
    /// Create the component for `video_stream`; `set_metadata_id` receives
    /// the product id of every accepted cue
    #[wasm_bindgen(constructor)]
    pub fn new(video_stream: String, set_metadata_id: Option<Function>) -> std::result::Result<CuecastPlayer, JsValue> {
        let config = config_for_stream(&video_stream).map_err(to_js)?;
        Self::build(config, set_metadata_id).map_err(to_js)
    }

    /// Create the component from a JSON configuration document
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config_json: &str, set_metadata_id: Option<Function>) -> std::result::Result<CuecastPlayer, JsValue> {
        let config = PlayerConfig::from_json(config_json).map_err(to_js)?;
        Self::build(config, set_metadata_id).map_err(to_js)
    }

    /// Start loading the SDK and bring the player up. Call once after the
    /// surface element is in the document.
    pub fn mount(&self) {
        let manager = Rc::clone(&self.manager);
        let loader = Rc::clone(&self.loader);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = manager.initialize(&loader).await {
                error!(error = %err, code = err.error_code(), "Player initialization failed");
            }
        });
    }

    /// Detach handlers and release the player
    pub fn unmount(&self) {
        self.manager.teardown();
    }

    #[wasm_bindgen(js_name = pointerEnter)]
    pub fn pointer_enter(&mut self) {
        self.gate.activate();
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.gate.deactivate();
    }

    #[wasm_bindgen(getter)]
    pub fn hovered(&self) -> bool {
        self.gate.is_active()
    }

    /// Lifecycle state name
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.manager.state().to_string()
    }

    /// Element id of the display surface
    #[wasm_bindgen(getter, js_name = surfaceId)]
    pub fn surface_id(&self) -> String {
        self.manager.config().surface.id.clone()
    }

    /// Overlay lines to render, newest first; empty while not hovered
    #[wasm_bindgen(js_name = metadataItems)]
    pub fn metadata_items(&self) -> js_sys::Array {
        self.manager
            .with_log(|log| MetadataView::render(&self.gate, log))
            .unwrap_or_default()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }

    /// Metadata entries as `{ productId, offsetSeconds }` objects
    pub fn snapshot(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.manager.snapshot()).map_err(JsValue::from)
    }

    /// Event counters
    pub fn stats(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.manager.stats()).map_err(JsValue::from)
    }
}

impl CuecastPlayer {
    fn build(config: PlayerConfig, set_metadata_id: Option<Function>) -> Result<Self> {
        let loader = page_loader(&config.script_url);
        let manager = PlayerLifecycleManager::new(config, metadata_id_forwarder(set_metadata_id))?;
        Ok(Self {
            manager: Rc::new(manager),
            loader,
            gate: VisibilityGate::new(),
        })
    }
}

impl Drop for CuecastPlayer {
    fn drop(&mut self) {
        self.manager.teardown();
    }
}
