//! Player SDK capability contract
//!
//! The streaming SDK is an external, late-loaded capability. The lifecycle
//! manager only sees it through these traits; the browser binding lives in
//! `cuecast-wasm`, and [`ScriptedSdk`] provides an in-memory implementation.

mod loader;
mod scripted;

pub use loader::{ScriptLoader, SdkLoader};
pub use scripted::{PlayerRecord, ScriptedLoader, ScriptedPlayer, ScriptedSdk};

use crate::{types::*, Result};
use url::Url;

/// Callback invoked by the SDK for one subscribed event kind
pub type EventHandler = Box<dyn FnMut(PlayerEvent)>;

/// Entry point of a loaded SDK
pub trait PlayerSdk {
    /// Whether the current environment can play at all
    fn is_player_supported(&self) -> bool;

    /// Create a new player instance
    fn create(&self) -> Result<Box<dyn PlayerBackend>>;
}

/// A player instance created by the SDK.
///
/// Implementations must deliver events asynchronously: handlers are never
/// invoked from inside one of these calls.
pub trait PlayerBackend {
    /// Bind the player to the display surface
    fn attach_to_surface(&mut self, surface: &SurfaceSpec) -> Result<()>;

    /// Subscribe `handler` to events of `kind`
    fn add_event_listener(&mut self, kind: PlayerEventKind, handler: EventHandler) -> Result<()>;

    /// Drop every handler registered through `add_event_listener`
    fn remove_event_listeners(&mut self);

    fn set_autoplay(&mut self, enabled: bool) -> Result<()>;

    /// Load a media source
    fn load(&mut self, url: &Url) -> Result<()>;

    /// Set output volume (0.0 - 1.0)
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Current playback position in seconds
    fn position(&self) -> f64;

    /// Release SDK resources held by this instance
    fn delete(&mut self);
}
