//! Slot Handle - per-session cursor and session protocol
//!
//! # State Machine
//! ```text
//!              select ok                 select ok
//! Unselected ────────────> Selected ──────────────┐
//!     ^                     │  ^  │               │
//!     │       release       │  │  └───────────────┘
//!     └─────────────────────┘  └── read / write
//! ```
//! A failed select leaves the handle in its current state. Read and write
//! fail with `NoChannelSelected` from `Unselected`.

use std::sync::Arc;

use crate::channel::{Channel, ChannelId};
use crate::table::{SlotIndex, SlotTable};
use crate::user::{UserSink, UserSource};
use crate::{Result, SlotError, MESSAGE_CAPACITY, MSG_SLOT_CHANNEL};

/// A caller's session against one slot
///
/// Each open produces its own handle; handles on the same slot select
/// channels independently of each other.
pub struct SlotHandle<'t> {
    table: &'t SlotTable,
    slot: SlotIndex,
    selected: Option<Arc<Channel>>,
}

impl<'t> SlotHandle<'t> {
    pub(crate) fn new(table: &'t SlotTable, slot: SlotIndex) -> Self {
        Self {
            table,
            slot,
            selected: None,
        }
    }

    /// Slot this handle is bound to
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Id of the currently selected channel, if any
    pub fn selected_channel(&self) -> Option<ChannelId> {
        self.selected.as_ref().map(|channel| channel.id())
    }

    /// Select channel `id` in this handle's slot, creating it on first use
    ///
    /// # Errors
    /// See [`ChannelStore::select_or_create`](crate::ChannelStore::select_or_create).
    /// On failure the previous selection (if any) is kept.
    pub fn select(&mut self, id: ChannelId) -> Result<()> {
        let channel = self.table.store(self.slot).select_or_create(id)?;
        self.selected = Some(channel);
        Ok(())
    }

    /// Device control entry point
    ///
    /// Only [`MSG_SLOT_CHANNEL`] is understood; its parameter is truncated
    /// to a 32-bit channel id and forwarded to [`select`](Self::select).
    pub fn control(&mut self, cmd: u32, param: u64) -> Result<()> {
        if cmd != MSG_SLOT_CHANNEL {
            log::error!("Invalid control command {:#x}", cmd);
            return Err(SlotError::UnknownCommand { cmd });
        }

        self.select(param as ChannelId)
    }

    /// Replace the selected channel's message with the caller's bytes
    ///
    /// # Arguments
    /// * `src` - Caller memory holding 1..=[`MESSAGE_CAPACITY`] bytes
    ///
    /// # Returns
    /// Number of bytes written (always `src.len()`)
    ///
    /// # Errors
    /// - `NoChannelSelected` if no channel is selected
    /// - `InvalidSize` if `src` is empty or longer than the capacity
    /// - `TransferFault` if caller memory faulted; the stored message is untouched
    ///
    /// # Implementation Notes
    /// Every byte is staged locally before the channel is locked, so the
    /// commit either replaces the whole message or nothing.
    pub fn write<S>(&self, src: &S) -> Result<usize>
    where
        S: UserSource + ?Sized,
    {
        let channel = self.selected_or_err()?;

        let len = src.len();
        if len == 0 || len > MESSAGE_CAPACITY {
            log::error!("Invalid message length {} for write", len);
            return Err(SlotError::InvalidSize {
                len,
                max: MESSAGE_CAPACITY,
            });
        }

        let mut staged = [0u8; MESSAGE_CAPACITY];
        for (offset, byte) in staged[..len].iter_mut().enumerate() {
            *byte = src.load(offset).map_err(|_| {
                log::error!("Fault reading caller message at offset {}", offset);
                SlotError::TransferFault { offset }
            })?;
        }

        channel.commit(&staged[..len]);

        log::trace!(
            "Wrote {} bytes to channel {} in slot {}",
            len,
            channel.id(),
            self.slot
        );
        Ok(len)
    }

    /// Copy the selected channel's message into the caller's buffer
    ///
    /// # Arguments
    /// * `dst` - Caller buffer; only its first `message_len` bytes are touched
    ///
    /// # Returns
    /// Number of bytes delivered (the stored message length)
    ///
    /// # Errors
    /// - `NoChannelSelected` if no channel is selected
    /// - `NoMessage` if the channel has never been written
    /// - `BufferTooSmall` if `dst` cannot hold the whole message
    /// - `TransferFault` if caller memory faulted; `dst` is restored
    ///
    /// The stored message is left in place and can be read again.
    pub fn read<D>(&self, dst: &mut D) -> Result<usize>
    where
        D: UserSink + ?Sized,
    {
        let channel = self.selected_or_err()?;

        let message = channel.copy_out();
        let bytes = message.as_bytes();
        let len = bytes.len();

        if len == 0 {
            log::error!("Channel {} holds no message", channel.id());
            return Err(SlotError::NoMessage);
        }

        let capacity = dst.capacity();
        if len > capacity {
            log::error!("Buffer of {} bytes too small for {} byte message", capacity, len);
            return Err(SlotError::BufferTooSmall {
                needed: len,
                capacity,
            });
        }

        let mut snapshot = [0u8; MESSAGE_CAPACITY];
        for (offset, saved) in snapshot[..len].iter_mut().enumerate() {
            *saved = dst.load(offset).map_err(|_| {
                log::error!("Fault snapshotting caller buffer at offset {}", offset);
                SlotError::TransferFault { offset }
            })?;
        }

        for (offset, &byte) in bytes.iter().enumerate() {
            if dst.store(offset, byte).is_err() {
                for (restore, &saved) in snapshot[..offset].iter().enumerate() {
                    if dst.store(restore, saved).is_err() {
                        log::error!("Fault restoring caller buffer at offset {}", restore);
                    }
                }
                log::error!("Fault delivering message at offset {}", offset);
                return Err(SlotError::TransferFault { offset });
            }
        }

        log::trace!(
            "Read {} bytes from channel {} in slot {}",
            len,
            channel.id(),
            self.slot
        );
        Ok(len)
    }

    /// Drop the current selection
    ///
    /// Channel contents are untouched and stay readable through other handles.
    pub fn release(&mut self) {
        self.selected = None;
    }

    fn selected_or_err(&self) -> Result<&Arc<Channel>> {
        self.selected.as_ref().ok_or_else(|| {
            log::error!("No channel selected on slot {}", self.slot);
            SlotError::NoChannelSelected
        })
    }
}

impl core::fmt::Debug for SlotHandle<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotHandle")
            .field("slot", &self.slot)
            .field("selected", &self.selected_channel())
            .finish()
    }
}
