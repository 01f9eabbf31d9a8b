//! Slot Table - fixed array of channel stores indexed by slot
//!
//! Every index in `[0, MAX_SLOTS)` always has a valid (possibly empty)
//! store; there is no separate "unallocated slot" state. Dropping the
//! table releases every channel of every slot at once.

use std::sync::OnceLock;

use crate::handle::SlotHandle;
use crate::limits::Limits;
use crate::store::ChannelStore;
use crate::{Result, SlotError, MAX_SLOTS};

/// Index of a slot in the table (the device minor number)
///
/// Backed by `u8`, so every value is a valid index into a table of
/// [`MAX_SLOTS`] entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Slot index for device minor `index`
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Position of this slot in the table
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for SlotIndex {
    fn from(index: u8) -> Self {
        Self(index)
    }
}

impl TryFrom<usize> for SlotIndex {
    type Error = SlotError;

    fn try_from(index: usize) -> Result<Self> {
        u8::try_from(index)
            .map(SlotIndex)
            .map_err(|_| SlotError::InvalidSlot { index })
    }
}

impl core::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-size table of per-slot channel stores
pub struct SlotTable {
    stores: Box<[ChannelStore]>,
    limits: Limits,
}

impl SlotTable {
    /// Create a table with default limits
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create a table whose slots are bounded by `limits`
    pub fn with_limits(limits: Limits) -> Self {
        let stores = (0..MAX_SLOTS)
            .map(|_| ChannelStore::new(limits.max_channels()))
            .collect();

        Self { stores, limits }
    }

    /// Process-wide table, initialized on first use with default limits
    pub fn global() -> &'static SlotTable {
        static GLOBAL: OnceLock<SlotTable> = OnceLock::new();
        GLOBAL.get_or_init(SlotTable::new)
    }

    /// Open a new session bound to `slot`
    ///
    /// The returned handle starts with no channel selected.
    pub fn open(&self, slot: SlotIndex) -> SlotHandle<'_> {
        log::trace!("Opened handle on slot {}", slot);
        SlotHandle::new(self, slot)
    }

    /// Channel store backing `slot`
    pub fn store(&self, slot: SlotIndex) -> &ChannelStore {
        &self.stores[slot.get()]
    }

    /// Number of channels created in `slot`
    pub fn channel_count(&self, slot: SlotIndex) -> usize {
        self.store(slot).len()
    }

    /// Limits applied to every slot
    pub fn limits(&self) -> Limits {
        self.limits
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SlotTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let used = self.stores.iter().filter(|s| !s.is_empty()).count();
        f.debug_struct("SlotTable")
            .field("slots", &self.stores.len())
            .field("slots_in_use", &used)
            .field("limits", &self.limits)
            .finish()
    }
}
