//! Caller memory access across the trust boundary
//!
//! The store never touches caller buffers directly. Every byte moves through
//! [`UserSource::load`] or [`UserSink::store`], either of which may fault
//! part way through a transfer (the caller's memory became inaccessible).
//! Plain slices and vectors implement both traits and never fault.

/// A single-byte access into caller memory failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault;

/// Caller-owned bytes the store copies *from* (write path)
pub trait UserSource {
    /// Number of bytes the caller offers
    fn len(&self) -> usize;

    /// Whether the caller offers no bytes at all
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the byte at `offset` (`offset < len()`)
    fn load(&self, offset: usize) -> Result<u8, Fault>;
}

/// Caller-owned buffer the store copies *into* (read path)
pub trait UserSink {
    /// Number of bytes the caller's buffer can hold
    fn capacity(&self) -> usize;

    /// Fetch the current byte at `offset`, used to snapshot before delivery
    fn load(&self, offset: usize) -> Result<u8, Fault>;

    /// Store `byte` at `offset` (`offset < capacity()`)
    fn store(&mut self, offset: usize, byte: u8) -> Result<(), Fault>;
}

impl UserSource for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn load(&self, offset: usize) -> Result<u8, Fault> {
        self.get(offset).copied().ok_or(Fault)
    }
}

impl UserSource for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn load(&self, offset: usize) -> Result<u8, Fault> {
        UserSource::load(self.as_slice(), offset)
    }
}

impl UserSink for [u8] {
    fn capacity(&self) -> usize {
        self.len()
    }

    fn load(&self, offset: usize) -> Result<u8, Fault> {
        self.get(offset).copied().ok_or(Fault)
    }

    fn store(&mut self, offset: usize, byte: u8) -> Result<(), Fault> {
        let slot = self.get_mut(offset).ok_or(Fault)?;
        *slot = byte;
        Ok(())
    }
}

impl UserSink for Vec<u8> {
    fn capacity(&self) -> usize {
        self.len()
    }

    fn load(&self, offset: usize) -> Result<u8, Fault> {
        UserSink::load(self.as_slice(), offset)
    }

    fn store(&mut self, offset: usize, byte: u8) -> Result<(), Fault> {
        self.as_mut_slice().store(offset, byte)
    }
}
