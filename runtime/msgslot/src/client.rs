//! Client flows - one-shot sender and reader sessions
//!
//! Each flow performs exactly: open → select channel → one write or one
//! read → release. Arguments are validated before the table is touched, and
//! every failure names the step that failed.

use std::io::Write;

use thiserror::Error;

use crate::{ChannelId, SlotError, SlotIndex, SlotTable, MESSAGE_CAPACITY};

/// Failure of a client session, tagged with the failing step
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid channel id '{0}': expected a decimal number")]
    InvalidChannel(String),

    #[error("Message of {len} bytes exceeds the {max} byte limit")]
    MessageTooLong { len: usize, max: usize },

    #[error("Error setting channel: {0}")]
    SetChannel(#[source] SlotError),

    #[error("Error writing message: {0}")]
    Write(#[source] SlotError),

    #[error("Error reading message: {0}")]
    Read(#[source] SlotError),

    #[error("Error printing message: {0}")]
    Output(#[source] std::io::Error),
}

impl ClientError {
    /// Core error behind this failure, if the core rejected the operation
    pub fn slot_error(&self) -> Option<SlotError> {
        match self {
            ClientError::SetChannel(e) | ClientError::Write(e) | ClientError::Read(e) => Some(*e),
            _ => None,
        }
    }
}

/// Parse a channel argument as a strict decimal `u32`
///
/// Zero parses successfully; the core rejects it at selection time.
pub fn parse_channel(arg: &str) -> Result<ChannelId, ClientError> {
    arg.trim()
        .parse::<ChannelId>()
        .map_err(|_| ClientError::InvalidChannel(arg.to_string()))
}

/// Write `message` to channel `channel_arg` of `slot`
///
/// # Returns
/// Number of bytes written
pub fn send(
    table: &SlotTable,
    slot: SlotIndex,
    channel_arg: &str,
    message: &[u8],
) -> Result<usize, ClientError> {
    let channel = parse_channel(channel_arg)?;
    if message.len() > MESSAGE_CAPACITY {
        return Err(ClientError::MessageTooLong {
            len: message.len(),
            max: MESSAGE_CAPACITY,
        });
    }

    let mut handle = table.open(slot);
    handle.select(channel).map_err(ClientError::SetChannel)?;
    let written = handle.write(message).map_err(ClientError::Write)?;
    handle.release();

    log::debug!("Sent {} bytes on slot {} channel {}", written, slot, channel);
    Ok(written)
}

/// Read channel `channel_arg` of `slot` and emit the message to `out`
///
/// Nothing is written to `out` unless the whole message was read.
///
/// # Returns
/// Number of bytes emitted
pub fn receive<W: Write>(
    table: &SlotTable,
    slot: SlotIndex,
    channel_arg: &str,
    out: &mut W,
) -> Result<usize, ClientError> {
    let channel = parse_channel(channel_arg)?;

    let mut handle = table.open(slot);
    handle.select(channel).map_err(ClientError::SetChannel)?;

    let mut buffer = [0u8; MESSAGE_CAPACITY];
    let len = handle
        .read(buffer.as_mut_slice())
        .map_err(ClientError::Read)?;
    handle.release();

    out.write_all(&buffer[..len]).map_err(ClientError::Output)?;

    log::debug!("Received {} bytes on slot {} channel {}", len, slot, channel);
    Ok(len)
}
