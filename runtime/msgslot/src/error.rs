//! Error taxonomy for slot, channel, and session operations

use thiserror::Error;

/// Error types for message slot operations
///
/// Every error is returned synchronously to the caller of the failing
/// operation. None is fatal: the table stays valid and usable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("Invalid channel id 0")]
    InvalidArgument,

    #[error("Reached maximum channels ({max}) in slot")]
    CapacityExceeded { max: usize },

    #[error("Channel allocation failed")]
    OutOfMemory,

    #[error("No channel selected on this handle")]
    NoChannelSelected,

    #[error("Invalid message length {len} (must be 1..={max})")]
    InvalidSize { len: usize, max: usize },

    #[error("Channel holds no message")]
    NoMessage,

    #[error("Buffer too small: message is {needed} bytes, buffer holds {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    #[error("Fault copying caller memory at offset {offset}")]
    TransferFault { offset: usize },

    #[error("Slot index {index} out of range")]
    InvalidSlot { index: usize },

    #[error("Unknown control command {cmd:#x}")]
    UnknownCommand { cmd: u32 },
}

pub type Result<T> = core::result::Result<T, SlotError>;

const EPERM: i32 = 1;
const EAGAIN: i32 = 11;
const ENOMEM: i32 = 12;
const EFAULT: i32 = 14;
const EINVAL: i32 = 22;
const ENOSPC: i32 = 28;
const EMSGSIZE: i32 = 90;

impl SlotError {
    /// POSIX errno a character-device front end reports for this error
    ///
    /// `NoMessage` maps to `EWOULDBLOCK`, which shares its value with `EAGAIN`.
    pub fn errno(&self) -> i32 {
        match self {
            SlotError::InvalidArgument
            | SlotError::NoChannelSelected
            | SlotError::InvalidSlot { .. }
            | SlotError::UnknownCommand { .. } => EINVAL,
            SlotError::CapacityExceeded { .. } => EPERM,
            SlotError::OutOfMemory => ENOMEM,
            SlotError::InvalidSize { .. } => EMSGSIZE,
            SlotError::NoMessage => EAGAIN,
            SlotError::BufferTooSmall { .. } => ENOSPC,
            SlotError::TransferFault { .. } => EFAULT,
        }
    }
}
