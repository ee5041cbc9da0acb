//! Player configuration
//!
//! `PlayerConfig` is the single source of truth for what the component plays
//! and how the player is set up. The stream URL handed to the component is
//! written here; nothing else is consulted.

use crate::{
    metadata::{DEFAULT_METADATA_CAPACITY, MAX_METADATA_CAPACITY},
    types::SurfaceSpec,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use url::Url;

/// Playback URL used when no stream is supplied
pub const DEFAULT_STREAM_URL: &str = "https://fcc3ddae59ed.us-west-2.playback.live-video.net/api/video/v1/us-west-2.893648527354.channel.DmumNckWFTqz.m3u8";

/// CDN location of the player SDK script
pub const DEFAULT_SCRIPT_URL: &str = "https://player.live-video.net/1.1.2/amazon-ivs-player.min.js";

/// Initial volume issued after loading the source
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Media source loaded into the player
    pub stream_url: Url,
    /// Script that provides the player SDK
    pub script_url: Url,
    /// Volume set after loading (0.0 - 1.0)
    pub initial_volume: f32,
    /// Start playback as soon as the source is ready
    pub autoplay: bool,
    /// Maximum number of metadata entries kept for display
    pub metadata_capacity: usize,
    /// Display surface attributes
    pub surface: SurfaceSpec,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            stream_url: Url::parse(DEFAULT_STREAM_URL).expect("default stream URL is valid"),
            script_url: Url::parse(DEFAULT_SCRIPT_URL).expect("default script URL is valid"),
            initial_volume: DEFAULT_VOLUME,
            autoplay: true,
            metadata_capacity: DEFAULT_METADATA_CAPACITY,
            surface: SurfaceSpec::default(),
        }
    }
}

impl PlayerConfig {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the stream URL
    pub fn with_stream_url(mut self, url: &str) -> Result<Self> {
        self.stream_url = Url::parse(url.trim())?;
        Ok(self)
    }

    /// Replace the metadata capacity
    pub fn with_metadata_capacity(mut self, capacity: usize) -> Self {
        self.metadata_capacity = capacity;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !self.initial_volume.is_finite() || !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(Error::InvalidConfig(format!(
                "initial volume must be within 0.0..=1.0, got {}",
                self.initial_volume
            )));
        }
        if !(1..=MAX_METADATA_CAPACITY).contains(&self.metadata_capacity) {
            return Err(Error::InvalidConfig(format!(
                "metadata capacity must be within 1..={MAX_METADATA_CAPACITY}, got {}",
                self.metadata_capacity
            )));
        }
        if self.surface.id.trim().is_empty() {
            return Err(Error::InvalidConfig("surface id is empty".to_string()));
        }
        Ok(())
    }
}
