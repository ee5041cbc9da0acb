//! Cuecast WASM - browser binding of the Cuecast player component
//!
//! Implements the player SDK contract of `cuecast-core` on top of the
//! script-loaded browser SDK (`window.IVSPlayer`) and exports the component
//! to JavaScript:
//!
//! ```javascript
//! import init, { CuecastPlayer } from '@cuecast/wasm';
//!
//! await init();
//! const player = new CuecastPlayer(streamUrl, (productId) => showProduct(productId));
//! player.mount();
//! container.onmouseenter = () => player.pointerEnter();
//! container.onmouseleave = () => player.pointerLeave();
//! ```

use tracing::info;
use wasm_bindgen::prelude::*;

mod component;
mod ivs;
mod loader;

pub use component::CuecastPlayer;
pub use ivs::{IvsPlayer, IvsSdk};
pub use loader::DomScriptLoader;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    info!(version = cuecast_core::VERSION, "[Cuecast WASM] Initialized");
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
