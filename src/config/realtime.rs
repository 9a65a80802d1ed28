//! Live notification configuration

use serde::Deserialize;

use super::error::ValidationError;

const MAX_CHANNEL_CAPACITY: usize = 65_536;

/// Settings for the WebSocket change feed.
///
/// The identity query key on `/ws` is always `from`.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Messages buffered per connection before a slow client starts
    /// skipping notifications
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl RealtimeConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::within(
            "realtime.channel_capacity",
            self.channel_capacity as u64,
            1,
            MAX_CHANNEL_CAPACITY as u64,
        )
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}
