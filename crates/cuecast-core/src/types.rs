//! Core types for Cuecast

use serde::{Deserialize, Serialize};

/// A single observed metadata cue, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEntry {
    /// Product identifier carried by the cue payload
    pub product_id: String,
    /// Playback position when the cue arrived, rounded to 2 decimals
    pub offset_seconds: f64,
}

impl MetadataEntry {
    pub fn new(product_id: impl Into<String>, offset_seconds: f64) -> Self {
        Self {
            product_id: product_id.into(),
            offset_seconds: round_offset(offset_seconds),
        }
    }
}

impl std::fmt::Display for MetadataEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "productId: {} ({:.2}s)", self.product_id, self.offset_seconds)
    }
}

/// Round a playback position to centiseconds. Negative or non-finite
/// positions become zero.
fn round_offset(seconds: f64) -> f64 {
    if !seconds.is_finite() || seconds < 0.0 {
        return 0.0;
    }
    (seconds * 100.0).round() / 100.0
}

/// Lifecycle state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Waiting for the SDK script
    Unloaded,
    /// SDK available, support not yet checked
    Loaded,
    /// SDK reports the environment cannot play
    Unsupported,
    /// Player created and attached to the display surface
    Initializing,
    /// Event handlers registered
    Bound,
    /// Autoplay, source and volume issued
    Playing,
    /// The SDK script could not be loaded
    LoadFailed,
    /// Component unmounted
    TornDown,
}

impl LifecycleState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, target),
            (Unloaded, Loaded) | (Unloaded, LoadFailed) |
            (Loaded, Unsupported) | (Loaded, Initializing) |
            (Initializing, Bound) |
            (Bound, Playing) |
            (Unloaded | Loaded | Unsupported | Initializing | Bound | Playing | LoadFailed, TornDown)
        )
    }

    /// States after which the manager never touches the SDK again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Unsupported | LifecycleState::LoadFailed | LifecycleState::TornDown
        )
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Unloaded => write!(f, "unloaded"),
            LifecycleState::Loaded => write!(f, "loaded"),
            LifecycleState::Unsupported => write!(f, "unsupported"),
            LifecycleState::Initializing => write!(f, "initializing"),
            LifecycleState::Bound => write!(f, "bound"),
            LifecycleState::Playing => write!(f, "playing"),
            LifecycleState::LoadFailed => write!(f, "load_failed"),
            LifecycleState::TornDown => write!(f, "torn_down"),
        }
    }
}

/// Event kinds the manager subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerEventKind {
    Playing,
    Ended,
    Ready,
    Error,
    TextMetadataCue,
}

impl PlayerEventKind {
    /// Every kind registered during binding, in registration order
    pub const ALL: [PlayerEventKind; 5] = [
        PlayerEventKind::Playing,
        PlayerEventKind::Ended,
        PlayerEventKind::Ready,
        PlayerEventKind::Error,
        PlayerEventKind::TextMetadataCue,
    ];

    /// Lifecycle kinds are logged only
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            PlayerEventKind::Playing | PlayerEventKind::Ended | PlayerEventKind::Ready
        )
    }
}

impl std::fmt::Display for PlayerEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerEventKind::Playing => write!(f, "PLAYING"),
            PlayerEventKind::Ended => write!(f, "ENDED"),
            PlayerEventKind::Ready => write!(f, "READY"),
            PlayerEventKind::Error => write!(f, "ERROR"),
            PlayerEventKind::TextMetadataCue => write!(f, "TEXT_METADATA_CUE"),
        }
    }
}

/// Timed text metadata as delivered by the SDK
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCue {
    pub text: String,
}

impl TextCue {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Error details reported by the SDK
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackErrorInfo {
    pub code: Option<i64>,
    pub kind: Option<String>,
    pub message: String,
}

/// Event emitted by the player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Playing,
    Ended,
    Ready,
    Error(PlaybackErrorInfo),
    TextMetadataCue(TextCue),
}

impl PlayerEvent {
    pub fn kind(&self) -> PlayerEventKind {
        match self {
            PlayerEvent::Playing => PlayerEventKind::Playing,
            PlayerEvent::Ended => PlayerEventKind::Ended,
            PlayerEvent::Ready => PlayerEventKind::Ready,
            PlayerEvent::Error(_) => PlayerEventKind::Error,
            PlayerEvent::TextMetadataCue(_) => PlayerEventKind::TextMetadataCue,
        }
    }

    /// Shorthand for a text metadata cue event
    pub fn cue(text: impl Into<String>) -> Self {
        PlayerEvent::TextMetadataCue(TextCue::new(text))
    }
}

/// Stable reference to the display surface the player renders into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceRef(pub String);

impl std::fmt::Display for SurfaceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rendering attributes of the display surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceSpec {
    /// Element id
    pub id: String,
    pub muted: bool,
    pub plays_inline: bool,
    /// Aspect ratio as (width, height)
    pub aspect: (u32, u32),
}

impl SurfaceSpec {
    pub fn surface_ref(&self) -> SurfaceRef {
        SurfaceRef(self.id.clone())
    }

    /// Padding-top percentage that keeps the container at the aspect ratio
    pub fn aspect_padding_percent(&self) -> f64 {
        let (w, h) = self.aspect;
        if w == 0 {
            return 0.0;
        }
        h as f64 / w as f64 * 100.0
    }
}

impl Default for SurfaceSpec {
    fn default() -> Self {
        Self {
            id: "video-player".to_string(),
            muted: true,
            plays_inline: true,
            aspect: (16, 9),
        }
    }
}

/// Counters of events observed by the lifecycle manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleStats {
    pub playing: u32,
    pub ended: u32,
    pub ready: u32,
    pub errors: u32,
    pub cues_accepted: u32,
    pub cues_rejected: u32,
    /// Events delivered after teardown
    pub late_events: u32,
}
