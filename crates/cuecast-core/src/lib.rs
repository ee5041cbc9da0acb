//! Cuecast Core - embedded live-stream player with timed-metadata tracking
//!
//! This crate drives a third-party streaming player SDK through its lifecycle
//! and keeps a short, newest-first log of the timed-metadata cues it emits:
//! - One-shot SDK loading behind an async loader seam
//! - Player lifecycle state machine (load, support check, bind, play, teardown)
//! - Bounded metadata log fed by TEXT_METADATA_CUE events
//! - Hover-gated render model for the metadata overlay
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Cuecast Core                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────┐      ┌─────────────────────────┐           │
//! │  │  SdkLoader   │─────▶│ PlayerLifecycleManager  │           │
//! │  │  (one-shot)  │      │   state machine + guard │           │
//! │  └──────────────┘      └───────────┬─────────────┘           │
//! │                                    │ events                  │
//! │                     ┌──────────────┼──────────────┐          │
//! │                     ▼              ▼              ▼          │
//! │              ┌────────────┐  ┌──────────┐  ┌────────────┐    │
//! │              │ lifecycle  │  │ Metadata │  │ setMetadata│    │
//! │              │  logging   │  │   Log    │  │ Id callback│    │
//! │              └────────────┘  └────┬─────┘  └────────────┘    │
//! │                                   │                          │
//! │               ┌────────────────┐  │  ┌────────────────┐      │
//! │               │ VisibilityGate │──┴─▶│  MetadataView  │      │
//! │               └────────────────┘     └────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod metadata;
pub mod sdk;
pub mod types;
pub mod view;
pub mod visibility;

pub use config::{PlayerConfig, DEFAULT_SCRIPT_URL, DEFAULT_STREAM_URL};
pub use error::{Error, Result};
pub use lifecycle::{MetadataIdCallback, PlayerLifecycleManager};
pub use metadata::{
    parse_cue_payload, MetadataLog, DEFAULT_METADATA_CAPACITY, MAX_METADATA_CAPACITY,
};
pub use sdk::{
    EventHandler, PlayerBackend, PlayerSdk, ScriptLoader, ScriptedLoader, ScriptedPlayer,
    ScriptedSdk, SdkLoader,
};
pub use types::*;
pub use view::MetadataView;
pub use visibility::VisibilityGate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
