//! Script-tag loader for the player SDK

use crate::ivs::{describe, IvsSdk};
use async_trait::async_trait;
use cuecast_core::{Error, PlayerSdk, Result, ScriptLoader};
use js_sys::Reflect;
use std::rc::Rc;
use tracing::{debug, info};
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Global under which the SDK script publishes its package
pub const SDK_GLOBAL: &str = "IVSPlayer";

/// Appends the SDK `<script>` to the page and resolves its global package.
///
/// Wrap it in a [`cuecast_core::SdkLoader`] so the tag is appended once.
pub struct DomScriptLoader {
    script_url: Url,
}

impl DomScriptLoader {
    pub fn new(script_url: Url) -> Self {
        Self { script_url }
    }
}

fn resolve_global(window: &web_sys::Window) -> Option<JsValue> {
    Reflect::get(window, &JsValue::from_str(SDK_GLOBAL))
        .ok()
        .filter(|package| !package.is_undefined() && !package.is_null())
}

fn load_error(message: impl Into<String>) -> Error {
    Error::LoadFailure(message.into())
}

#[async_trait(?Send)]
impl ScriptLoader for DomScriptLoader {
    async fn load(&self) -> Result<Rc<dyn PlayerSdk>> {
        let window = web_sys::window().ok_or_else(|| load_error("no window available"))?;

        // Page already included the script
        if let Some(package) = resolve_global(&window) {
            debug!("Player SDK already present");
            return Ok(Rc::new(IvsSdk::new(package)));
        }

        let document = window
            .document()
            .ok_or_else(|| load_error("no document available"))?;
        let body = document.body().ok_or_else(|| load_error("document has no body"))?;
        let script: web_sys::HtmlScriptElement = document
            .create_element("script")
            .map_err(|e| load_error(describe(&e)))?
            .dyn_into()
            .map_err(|_| load_error("created element is not a script"))?;
        script.set_src(self.script_url.as_str());
        script.set_async(true);

        let loaded = js_sys::Promise::new(&mut |resolve, reject| {
            script.set_onload(Some(&resolve));
            script.set_onerror(Some(&reject));
        });
        body.append_child(&script)
            .map_err(|e| load_error(describe(&e)))?;
        info!(src = %self.script_url, "Player SDK script appended");

        JsFuture::from(loaded)
            .await
            .map_err(|_| load_error(format!("script {} failed to load", self.script_url)))?;

        let package = resolve_global(&window)
            .ok_or_else(|| load_error(format!("script loaded but window.{SDK_GLOBAL} is missing")))?;
        Ok(Rc::new(IvsSdk::new(package)))
    }
}
