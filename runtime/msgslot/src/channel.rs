//! Channel - keyed, single-message cell
//!
//! A channel stores at most one message of up to [`MESSAGE_CAPACITY`] bytes.
//! The `(bytes, len)` pair lives behind one reader/writer lock, so a write
//! replaces both fields in a single critical section and a reader always
//! sees a whole message.

use parking_lot::RwLock;

use crate::MESSAGE_CAPACITY;

/// Channel identifier; zero is reserved as "no selection"
pub type ChannelId = u32;

/// Stored message: `len == 0` means nothing has ever been written
#[derive(Clone, Copy)]
pub(crate) struct Message {
    bytes: [u8; MESSAGE_CAPACITY],
    len: usize,
}

impl Message {
    const EMPTY: Self = Self {
        bytes: [0; MESSAGE_CAPACITY],
        len: 0,
    };

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// A keyed message cell owned by exactly one [`ChannelStore`](crate::ChannelStore)
pub struct Channel {
    id: ChannelId,
    message: RwLock<Message>,
}

impl Channel {
    pub(crate) fn new(id: ChannelId) -> Self {
        Self {
            id,
            message: RwLock::new(Message::EMPTY),
        }
    }

    /// Channel id within its slot
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Length of the stored message (0 if never written)
    pub fn message_len(&self) -> usize {
        self.message.read().len
    }

    /// Whether a message has ever been written
    pub fn has_message(&self) -> bool {
        self.message_len() != 0
    }

    /// Replace the stored message with `staged`
    ///
    /// Caller guarantees `1 <= staged.len() <= MESSAGE_CAPACITY`; the bytes
    /// have already been fully obtained from caller memory.
    pub(crate) fn commit(&self, staged: &[u8]) {
        debug_assert!(!staged.is_empty() && staged.len() <= MESSAGE_CAPACITY);

        let mut message = self.message.write();
        message.bytes[..staged.len()].copy_from_slice(staged);
        message.len = staged.len();
    }

    /// Consistent copy of the current message
    pub(crate) fn copy_out(&self) -> Message {
        *self.message.read()
    }
}

impl core::fmt::Debug for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("message_len", &self.message_len())
            .finish()
    }
}
