//! Message Slot - Multi-channel, fixed-capacity message relay
//!
//! # Purpose
//! Provides a fixed table of addressable slots, each hosting any number of
//! independently keyed channels. A channel holds exactly one pending message
//! which every write replaces in full.
//!
//! # Integration Points
//! - Depends on: nothing beyond the host allocator
//! - Provides to: device front ends and the `msgslot-relay` tool
//! - Session contract: open → select channel → read/write → release
//!
//! # Architecture
//! ```text
//! SlotTable ──[SlotIndex]──> ChannelStore ──[ChannelId]──> Channel
//!     ^                            ^                           ^
//!     └──────── SlotHandle ────────┴──── selected (Arc) ───────┘
//! ```
//! Each [`ChannelStore`] is guarded by its own mutex so concurrent selection
//! of a new id never double-allocates. Each [`Channel`] guards its
//! `(message, length)` pair with a reader/writer lock so a write commits
//! both fields at once.
//!
//! Caller memory is reached only through the [`UserSource`] / [`UserSink`]
//! traits. Writes stage into a local buffer before committing; reads
//! snapshot the destination region and restore it if delivery faults.
//!
//! # Testing Strategy
//! - Unit tests: per-module `#[cfg(test)]` blocks
//! - Integration tests: session protocol properties and concurrent access
//! - Benchmarks: select/write/read hot paths (criterion)

mod channel;
mod error;
mod handle;
mod limits;
mod store;
mod table;

pub mod client;
pub mod user;

pub use channel::{Channel, ChannelId};
pub use error::{Result, SlotError};
pub use handle::SlotHandle;
pub use limits::Limits;
pub use store::ChannelStore;
pub use table::{SlotIndex, SlotTable};
pub use user::{Fault, UserSink, UserSource};

use static_assertions::{const_assert, const_assert_eq};

/// Maximum size in bytes of the single message a channel holds
pub const MESSAGE_CAPACITY: usize = 128;

/// Default bound on distinct channels created within one slot (2^20)
pub const MAX_CHANNELS: usize = 0x10_0000;

/// Number of slots in the table
pub const MAX_SLOTS: usize = 256;

/// Device major number used by the character-device front end
pub const MAJOR_NUM: u32 = 235;

/// Device range name registered by the character-device front end
pub const DEVICE_RANGE_NAME: &str = "message_slot";

/// Control command selecting a channel: `_IOW(MAJOR_NUM, 0, u32)`
pub const MSG_SLOT_CHANNEL: u32 = ioc_write(MAJOR_NUM, 0, core::mem::size_of::<u32>() as u32);

/// Encode a write-direction control command the way Linux `_IOW` does
const fn ioc_write(ty: u32, nr: u32, size: u32) -> u32 {
    const IOC_WRITE: u32 = 1;
    (IOC_WRITE << 30) | (size << 16) | (ty << 8) | nr
}

// Slot indices are `u8`, so every representable index is in range.
const_assert_eq!(MAX_SLOTS, u8::MAX as usize + 1);
const_assert!(MESSAGE_CAPACITY > 0);
const_assert!(MAX_CHANNELS > 0);
const_assert_eq!(MSG_SLOT_CHANNEL, 0x4004_EB00);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_command_encoding() {
        assert_eq!(MSG_SLOT_CHANNEL >> 30, 1);
        assert_eq!((MSG_SLOT_CHANNEL >> 16) & 0x3FFF, 4);
        assert_eq!((MSG_SLOT_CHANNEL >> 8) & 0xFF, MAJOR_NUM);
        assert_eq!(MSG_SLOT_CHANNEL & 0xFF, 0);
    }
}
