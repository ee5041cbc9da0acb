//! Player lifecycle manager
//!
//! Coordinates:
//! - One-shot SDK loading and the support check
//! - Player creation, surface binding and event subscription
//! - The initial playback command sequence
//! - Routing of timed-metadata cues into the [`MetadataLog`]
//! - Teardown, after which late events are ignored
//!
//! Everything runs on a single thread. SDK events arrive as callbacks, each of
//! which runs to completion before the next one, so plain `RefCell`s are
//! enough for the shared state.

use crate::{
    config::PlayerConfig,
    metadata::{parse_cue_payload, MetadataLog},
    sdk::{PlayerBackend, PlayerSdk, SdkLoader},
    types::*,
    Error, Result,
};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, instrument, warn};

/// Receives the product id of every accepted metadata cue
pub type MetadataIdCallback = Rc<dyn Fn(&str)>;

type PlayerSlot = RefCell<Option<Box<dyn PlayerBackend>>>;

/// Counters stop at `u32::MAX`
fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}

/// State shared with the registered event handlers
struct Shared {
    state: LifecycleState,
    mounted: bool,
    log: MetadataLog,
    stats: LifecycleStats,
}

/// Everything an event handler needs. Holds weak references so handlers
/// outliving the manager do nothing.
#[derive(Clone)]
struct EventContext {
    shared: Weak<RefCell<Shared>>,
    player: Weak<PlayerSlot>,
    on_metadata_id: MetadataIdCallback,
}

/// Drives the player SDK for one mounted component
pub struct PlayerLifecycleManager {
    config: PlayerConfig,
    shared: Rc<RefCell<Shared>>,
    /// The only handle to the player instance
    player: Rc<PlayerSlot>,
    on_metadata_id: MetadataIdCallback,
    initialize_started: Cell<bool>,
}

impl PlayerLifecycleManager {
    /// Create a manager for a freshly mounted component
    pub fn new(config: PlayerConfig, on_metadata_id: impl Fn(&str) + 'static) -> Result<Self> {
        config.validate()?;

        let shared = Shared {
            state: LifecycleState::Unloaded,
            mounted: true,
            log: MetadataLog::new(config.metadata_capacity),
            stats: LifecycleStats::default(),
        };

        Ok(Self {
            config,
            shared: Rc::new(RefCell::new(shared)),
            player: Rc::new(RefCell::new(None)),
            on_metadata_id: Rc::new(on_metadata_id),
            initialize_started: Cell::new(false),
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Get current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.shared.borrow().state
    }

    /// Event counters
    pub fn stats(&self) -> LifecycleStats {
        self.shared.borrow().stats
    }

    /// Metadata entries, newest first
    pub fn snapshot(&self) -> Vec<MetadataEntry> {
        self.shared.borrow().log.snapshot()
    }

    /// Run `f` against the metadata log without copying it
    pub fn with_log<R>(&self, f: impl FnOnce(&MetadataLog) -> R) -> R {
        f(&self.shared.borrow().log)
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.borrow().mounted
    }

    /// Whether a player instance is currently held
    pub fn player_created(&self) -> bool {
        self.player.borrow().is_some()
    }

    /// Load the SDK through `loader` and bring the player up.
    ///
    /// Only the first call per manager has an effect. An unsupported
    /// environment is not an error: the manager settles in
    /// [`LifecycleState::Unsupported`] and returns `Ok`.
    #[instrument(skip(self, loader))]
    pub async fn initialize(&self, loader: &SdkLoader) -> Result<()> {
        if !self.claim_initialize() {
            return Ok(());
        }

        let loaded = loader.ensure_loaded().await;

        if !self.is_mounted() {
            debug!("Component unmounted while the SDK was loading; skipping player setup");
            return Ok(());
        }

        match loaded {
            Ok(sdk) => self.bring_up(sdk.as_ref()),
            Err(err) => {
                error!(error = %err, code = err.error_code(), "Player SDK unavailable");
                self.transition(LifecycleState::LoadFailed)?;
                Err(err)
            }
        }
    }

    /// Bring the player up with an SDK that is already loaded.
    ///
    /// Shares the one-shot guard with [`initialize`](Self::initialize).
    pub fn initialize_with_sdk(&self, sdk: &dyn PlayerSdk) -> Result<()> {
        if !self.claim_initialize() {
            return Ok(());
        }
        if !self.is_mounted() {
            debug!("Component unmounted before initialization; skipping player setup");
            return Ok(());
        }
        self.bring_up(sdk)
    }

    fn claim_initialize(&self) -> bool {
        if self.initialize_started.replace(true) {
            warn!("Player initialization requested more than once; ignoring");
            return false;
        }
        true
    }

    fn bring_up(&self, sdk: &dyn PlayerSdk) -> Result<()> {
        self.transition(LifecycleState::Loaded)?;

        if !sdk.is_player_supported() {
            warn!(
                code = Error::UnsupportedCapability.error_code(),
                "{}",
                Error::UnsupportedCapability
            );
            self.transition(LifecycleState::Unsupported)?;
            return Ok(());
        }

        let mut backend = sdk.create().inspect_err(|err| {
            error!(error = %err, "Failed to create player");
        })?;

        let result = self.configure(backend.as_mut());

        // Keep the instance even when a later step failed so teardown can release it
        *self.player.borrow_mut() = Some(backend);

        if let Err(ref err) = result {
            error!(error = %err, state = %self.state(), "Player setup failed");
        }
        result
    }

    fn configure(&self, backend: &mut dyn PlayerBackend) -> Result<()> {
        self.transition(LifecycleState::Initializing)?;
        backend.attach_to_surface(&self.config.surface)?;
        info!(surface = %self.config.surface.surface_ref(), "Player attached");

        let context = self.context();
        for kind in PlayerEventKind::ALL {
            let ctx = context.clone();
            backend.add_event_listener(kind, Box::new(move |event| ctx.dispatch(event)))?;
        }
        self.transition(LifecycleState::Bound)?;

        backend.set_autoplay(self.config.autoplay)?;
        backend.load(&self.config.stream_url)?;
        backend.set_volume(self.config.initial_volume)?;
        info!(
            url = %self.config.stream_url,
            volume = self.config.initial_volume,
            autoplay = self.config.autoplay,
            "Stream loaded"
        );
        self.transition(LifecycleState::Playing)
    }

    /// Transition to new state
    fn transition(&self, to: LifecycleState) -> Result<()> {
        let mut shared = self.shared.borrow_mut();
        let from = shared.state;

        if !from.can_transition_to(to) {
            return Err(Error::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        shared.state = to;
        info!(from = %from, to = %to, "Lifecycle transition");
        Ok(())
    }

    /// Feed one player event through the same path the registered handlers use
    pub fn handle_event(&self, event: PlayerEvent) {
        self.context().dispatch(event);
    }

    /// Process a timed-metadata cue payload.
    ///
    /// On success the product id is forwarded to the metadata-id callback and
    /// then logged with the current playback position. A malformed payload
    /// leaves the log untouched and the callback uncalled.
    pub fn on_metadata_cue(&self, raw: &str) -> Result<MetadataEntry> {
        self.context().metadata_cue(raw)
    }

    fn context(&self) -> EventContext {
        EventContext {
            shared: Rc::downgrade(&self.shared),
            player: Rc::downgrade(&self.player),
            on_metadata_id: Rc::clone(&self.on_metadata_id),
        }
    }

    /// Unmount: detach handlers, release the player and drop the metadata.
    ///
    /// Safe to call more than once.
    #[instrument(skip(self))]
    pub fn teardown(&self) {
        {
            let mut shared = self.shared.borrow_mut();
            if !shared.mounted {
                return;
            }
            shared.mounted = false;
            shared.log.clear();
        }

        let player = self.player.borrow_mut().take();
        if let Some(mut player) = player {
            player.remove_event_listeners();
            player.delete();
            debug!("Player released");
        }

        if let Err(err) = self.transition(LifecycleState::TornDown) {
            warn!(error = %err, "Unexpected state at teardown");
        }
    }
}

impl Drop for PlayerLifecycleManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl EventContext {
    /// Handle one event; never panics or propagates errors to the SDK
    fn dispatch(&self, event: PlayerEvent) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        if !shared.borrow().mounted {
            bump(&mut shared.borrow_mut().stats.late_events);
            debug!(kind = %event.kind(), "Ignoring event after teardown");
            return;
        }

        match event {
            PlayerEvent::Playing => {
                bump(&mut shared.borrow_mut().stats.playing);
                info!("Player State - PLAYING");
            }
            PlayerEvent::Ended => {
                bump(&mut shared.borrow_mut().stats.ended);
                info!("Player State - ENDED");
            }
            PlayerEvent::Ready => {
                bump(&mut shared.borrow_mut().stats.ready);
                info!("Player State - READY");
            }
            PlayerEvent::Error(details) => {
                bump(&mut shared.borrow_mut().stats.errors);
                let err = Error::Playback {
                    code: details.code,
                    message: details.message,
                };
                warn!(error = %err, kind = ?details.kind, "Player Event - ERROR");
            }
            PlayerEvent::TextMetadataCue(cue) => {
                if let Err(err) = self.metadata_cue(&cue.text) {
                    warn!(error = %err, code = err.error_code(), "Dropping metadata cue");
                }
            }
        }
    }

    fn metadata_cue(&self, raw: &str) -> Result<MetadataEntry> {
        let shared = self.shared.upgrade().ok_or(Error::NotMounted)?;
        if !shared.borrow().mounted {
            bump(&mut shared.borrow_mut().stats.late_events);
            return Err(Error::NotMounted);
        }

        debug!(text = raw, "Timed metadata");
        let product_id = match parse_cue_payload(raw) {
            Ok(id) => id,
            Err(err) => {
                bump(&mut shared.borrow_mut().stats.cues_rejected);
                return Err(err);
            }
        };

        // No borrow is held while the consumer runs; it may call back into the manager
        (self.on_metadata_id)(&product_id);

        let entry = MetadataEntry::new(product_id, self.current_position());

        let mut state = shared.borrow_mut();
        if !state.mounted {
            bump(&mut state.stats.late_events);
            return Err(Error::NotMounted);
        }
        state.log.insert(entry.clone());
        bump(&mut state.stats.cues_accepted);
        info!(product_id = %entry.product_id, offset = entry.offset_seconds, "Metadata cue recorded");

        Ok(entry)
    }

    /// Playback position of the held player, or zero when there is none
    fn current_position(&self) -> f64 {
        let Some(slot) = self.player.upgrade() else {
            return 0.0;
        };
        let Ok(player) = slot.try_borrow() else {
            return 0.0;
        };
        let position = player.as_ref().map_or(0.0, |p| p.position());
        position
    }
}
