//! In-memory SDK driven by the caller
//!
//! Records every command the lifecycle manager issues and lets the caller
//! emit player events and move the playback position. Used by the test
//! suites and for headless embedding.

use super::{EventHandler, PlayerBackend, PlayerSdk, ScriptLoader};
use crate::{types::*, Error, Result};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use url::Url;

/// Commands received by a scripted player
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub attached_to: Option<SurfaceRef>,
    pub autoplay: Option<bool>,
    pub loaded: Vec<Url>,
    pub volume: Option<f32>,
    pub deleted: bool,
    /// Command names in call order
    pub commands: Vec<&'static str>,
}

#[derive(Default)]
struct Listeners {
    handlers: HashMap<PlayerEventKind, Vec<EventHandler>>,
    /// Bumped on every removal so handlers taken out for dispatch are not
    /// put back after a teardown that happened during dispatch
    generation: u64,
}

/// Scripted player instance. Clones share the same underlying player.
#[derive(Clone, Default)]
pub struct ScriptedPlayer {
    record: Rc<RefCell<PlayerRecord>>,
    listeners: Rc<RefCell<Listeners>>,
    position: Rc<Cell<f64>>,
    fail_load: Rc<Cell<bool>>,
}

impl ScriptedPlayer {
    /// Snapshot of the commands received so far
    pub fn record(&self) -> PlayerRecord {
        self.record.borrow().clone()
    }

    /// Move the playback position reported by `position()`
    pub fn set_position(&self, seconds: f64) {
        self.position.set(seconds);
    }

    /// Number of handlers currently subscribed to `kind`
    pub fn listener_count(&self, kind: PlayerEventKind) -> usize {
        self.listeners
            .borrow()
            .handlers
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Deliver an event to the handlers subscribed to its kind
    pub fn emit(&self, event: PlayerEvent) {
        let kind = event.kind();
        let (mut handlers, generation) = {
            let mut listeners = self.listeners.borrow_mut();
            let taken = listeners.handlers.remove(&kind).unwrap_or_default();
            (taken, listeners.generation)
        };

        for handler in handlers.iter_mut() {
            handler(event.clone());
        }

        let mut listeners = self.listeners.borrow_mut();
        if listeners.generation == generation {
            let added_during_dispatch = listeners.handlers.remove(&kind).unwrap_or_default();
            handlers.extend(added_during_dispatch);
            listeners.handlers.insert(kind, handlers);
        }
    }

    fn push_command(&self, name: &'static str) {
        self.record.borrow_mut().commands.push(name);
    }
}

impl PlayerBackend for ScriptedPlayer {
    fn attach_to_surface(&mut self, surface: &SurfaceSpec) -> Result<()> {
        self.push_command("attach");
        self.record.borrow_mut().attached_to = Some(surface.surface_ref());
        Ok(())
    }

    fn add_event_listener(&mut self, kind: PlayerEventKind, handler: EventHandler) -> Result<()> {
        self.push_command("add_event_listener");
        self.listeners
            .borrow_mut()
            .handlers
            .entry(kind)
            .or_default()
            .push(handler);
        Ok(())
    }

    fn remove_event_listeners(&mut self) {
        self.push_command("remove_event_listeners");
        let mut listeners = self.listeners.borrow_mut();
        listeners.handlers.clear();
        listeners.generation += 1;
    }

    fn set_autoplay(&mut self, enabled: bool) -> Result<()> {
        self.push_command("set_autoplay");
        self.record.borrow_mut().autoplay = Some(enabled);
        Ok(())
    }

    fn load(&mut self, url: &Url) -> Result<()> {
        self.push_command("load");
        if self.fail_load.get() {
            return Err(Error::sdk(format!("cannot load {url}")));
        }
        self.record.borrow_mut().loaded.push(url.clone());
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.push_command("set_volume");
        self.record.borrow_mut().volume = Some(volume);
        Ok(())
    }

    fn position(&self) -> f64 {
        self.position.get()
    }

    fn delete(&mut self) {
        self.push_command("delete");
        self.record.borrow_mut().deleted = true;
    }
}

/// Scripted SDK. Clones share the same created players.
#[derive(Clone)]
pub struct ScriptedSdk {
    supported: bool,
    fail_load: bool,
    players: Rc<RefCell<Vec<ScriptedPlayer>>>,
}

impl ScriptedSdk {
    /// SDK that supports playback
    pub fn new() -> Self {
        Self {
            supported: true,
            fail_load: false,
            players: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// SDK whose support check fails
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Players created by this SDK reject `load`
    pub fn with_failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Number of `create` calls
    pub fn created(&self) -> usize {
        self.players.borrow().len()
    }

    /// The most recently created player
    pub fn last_player(&self) -> Option<ScriptedPlayer> {
        self.players.borrow().last().cloned()
    }
}

impl Default for ScriptedSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerSdk for ScriptedSdk {
    fn is_player_supported(&self) -> bool {
        self.supported
    }

    fn create(&self) -> Result<Box<dyn PlayerBackend>> {
        let player = ScriptedPlayer::default();
        player.fail_load.set(self.fail_load);
        self.players.borrow_mut().push(player.clone());
        Ok(Box::new(player))
    }
}

/// Loader resolving to a [`ScriptedSdk`] or failing with a fixed reason
pub struct ScriptedLoader {
    outcome: std::result::Result<ScriptedSdk, String>,
    loads: Rc<Cell<usize>>,
}

impl ScriptedLoader {
    pub fn new(sdk: ScriptedSdk) -> Self {
        Self {
            outcome: Ok(sdk),
            loads: Rc::new(Cell::new(0)),
        }
    }

    /// Loader whose script never becomes available
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            loads: Rc::new(Cell::new(0)),
        }
    }

    /// Shared counter of `load` calls
    pub fn load_count(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.loads)
    }
}

#[async_trait(?Send)]
impl ScriptLoader for ScriptedLoader {
    async fn load(&self) -> Result<Rc<dyn PlayerSdk>> {
        self.loads.set(self.loads.get() + 1);
        match &self.outcome {
            Ok(sdk) => Ok(Rc::new(sdk.clone())),
            Err(reason) => Err(Error::LoadFailure(reason.clone())),
        }
    }
}
