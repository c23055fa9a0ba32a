use cc_logs_core::proto::{InstanceId, StreamRange};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const DEFAULT_OVERFLOW_LIMIT: u64 = 10_000;
pub const DEFAULT_BUFFER_CAPACITY: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct StreamConfig {
    /// Records accepted per connection before the stream pauses for overflow.
    pub overflow_limit: u64,
    /// Records kept visible; the oldest are evicted beyond this.
    pub buffer_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            overflow_limit: DEFAULT_OVERFLOW_LIMIT,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.overflow_limit == 0 {
            return Err(ConfigError::ZeroOverflowLimit);
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ZeroBufferCapacity);
        }
        Ok(())
    }
}

/// What one `connect()` subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRequest {
    pub range: StreamRange,
    /// Instances to multiplex. Empty means every instance of the application.
    #[serde(default)]
    pub instances: Vec<InstanceId>,
}

impl StreamRequest {
    pub fn new(range: StreamRange) -> Self {
        Self {
            range,
            instances: Vec::new(),
        }
    }

    pub fn with_instances(mut self, instances: impl IntoIterator<Item = InstanceId>) -> Self {
        self.instances = instances.into_iter().collect();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.range.until {
            Some(until) if until <= self.range.since => Err(ConfigError::InvertedRange {
                since: self.range.since,
                until,
            }),
            _ => Ok(()),
        }
    }
}
