//! Channel Store - per-slot arena of channels with find-or-create lookup
//!
//! Channels live in an append-only arena and are never removed
//! individually; an id → arena index map provides lookup. The whole store
//! sits behind one mutex so find-or-create is a single critical section.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::channel::{Channel, ChannelId};
use crate::{Result, SlotError, MAX_CHANNELS};

#[derive(Default)]
struct StoreInner {
    /// Channel id → position in `arena`
    index: HashMap<ChannelId, usize>,
    /// Channels in creation order
    arena: Vec<Arc<Channel>>,
}

/// Collection of channels belonging to one slot
pub struct ChannelStore {
    max_channels: usize,
    inner: Mutex<StoreInner>,
}

impl ChannelStore {
    /// Create an empty store bounded to `max_channels` distinct ids
    ///
    /// The bound never exceeds [`MAX_CHANNELS`].
    pub fn new(max_channels: usize) -> Self {
        Self {
            max_channels: max_channels.min(MAX_CHANNELS),
            inner: Mutex::new(StoreInner::default()),
        }
    }

    /// Find the channel keyed by `id`, creating it if it does not exist yet
    ///
    /// # Arguments
    /// * `id` - Channel id (must be non-zero)
    ///
    /// # Returns
    /// Shared reference to the channel
    ///
    /// # Errors
    /// - `InvalidArgument` if `id` is zero
    /// - `CapacityExceeded` if `id` is new and the store is already full
    /// - `OutOfMemory` if growing the store failed
    ///
    /// # Implementation Notes
    /// Existing ids are looked up before the capacity check, so a full store
    /// still re-selects every id it already holds.
    pub fn select_or_create(&self, id: ChannelId) -> Result<Arc<Channel>> {
        if id == 0 {
            log::error!("Invalid channel id 0");
            return Err(SlotError::InvalidArgument);
        }

        let mut inner = self.inner.lock();

        if let Some(&pos) = inner.index.get(&id) {
            return Ok(Arc::clone(&inner.arena[pos]));
        }

        if inner.arena.len() >= self.max_channels {
            log::error!("Reached maximum channels ({})", self.max_channels);
            return Err(SlotError::CapacityExceeded {
                max: self.max_channels,
            });
        }

        if inner.arena.try_reserve(1).is_err() || inner.index.try_reserve(1).is_err() {
            log::error!("Channel allocation failed for id {}", id);
            return Err(SlotError::OutOfMemory);
        }

        let channel = Arc::new(Channel::new(id));
        let pos = inner.arena.len();
        inner.arena.push(Arc::clone(&channel));
        inner.index.insert(id, pos);

        log::debug!("Created channel {} ({} in slot)", id, pos + 1);
        Ok(channel)
    }

    /// Number of channels created so far
    pub fn len(&self) -> usize {
        self.inner.lock().arena.len()
    }

    /// Whether no channel has been created yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a channel keyed by `id` exists
    pub fn contains(&self, id: ChannelId) -> bool {
        self.inner.lock().index.contains_key(&id)
    }

    /// Per-slot channel bound
    pub fn max_channels(&self) -> usize {
        self.max_channels
    }
}

impl core::fmt::Debug for ChannelStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChannelStore")
            .field("channels", &self.len())
            .field("max_channels", &self.max_channels)
            .finish()
    }
}
