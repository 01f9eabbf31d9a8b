//! Configurable limits for a slot table

use serde::Deserialize;

use crate::MAX_CHANNELS;

/// Bounds applied to every slot of a [`SlotTable`](crate::SlotTable)
///
/// Message capacity and slot count are fixed. The per-slot channel bound
/// can only be lowered from [`MAX_CHANNELS`] (2^20), never raised above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLimits")]
pub struct Limits {
    max_channels: usize,
}

/// Limits as written in a config file, before validation
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawLimits {
    max_channels: usize,
}

impl Default for RawLimits {
    fn default() -> Self {
        Self {
            max_channels: MAX_CHANNELS,
        }
    }
}

impl TryFrom<RawLimits> for Limits {
    type Error = String;

    fn try_from(raw: RawLimits) -> Result<Self, Self::Error> {
        if raw.max_channels > MAX_CHANNELS {
            return Err(format!(
                "max_channels {} exceeds the per-slot limit of {}",
                raw.max_channels, MAX_CHANNELS
            ));
        }
        Ok(Self {
            max_channels: raw.max_channels,
        })
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_channels: MAX_CHANNELS,
        }
    }
}

impl Limits {
    /// Limits with a lower per-slot channel bound
    ///
    /// Values above [`MAX_CHANNELS`] are clamped to it.
    pub fn with_max_channels(max_channels: usize) -> Self {
        if max_channels > MAX_CHANNELS {
            log::warn!(
                "Channel bound {} clamped to {}",
                max_channels,
                MAX_CHANNELS
            );
        }
        Self {
            max_channels: max_channels.min(MAX_CHANNELS),
        }
    }

    /// Maximum number of distinct channel ids a single slot may create
    pub fn max_channels(&self) -> usize {
        self.max_channels
    }
}
