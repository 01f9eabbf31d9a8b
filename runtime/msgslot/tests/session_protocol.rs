//! Session protocol tests
//!
//! End-to-end properties of select/read/write/release across handles,
//! channels, and slots, including faults in caller memory.

use msgslot::{
    Fault, Limits, Result, SlotError, SlotHandle, SlotIndex, SlotTable, UserSink, UserSource,
    MESSAGE_CAPACITY, MSG_SLOT_CHANNEL,
};

/// Caller message whose memory becomes inaccessible at `fault_at`
struct FaultingSource {
    bytes: Vec<u8>,
    fault_at: usize,
}

impl UserSource for FaultingSource {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn load(&self, offset: usize) -> std::result::Result<u8, Fault> {
        if offset >= self.fault_at {
            return Err(Fault);
        }
        Ok(self.bytes[offset])
    }
}

/// Caller buffer whose stores fault from `fault_at` onward
struct FaultingSink {
    buf: Vec<u8>,
    fault_at: usize,
}

impl UserSink for FaultingSink {
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn load(&self, offset: usize) -> std::result::Result<u8, Fault> {
        self.buf.get(offset).copied().ok_or(Fault)
    }

    fn store(&mut self, offset: usize, byte: u8) -> std::result::Result<(), Fault> {
        if offset >= self.fault_at {
            return Err(Fault);
        }
        self.buf[offset] = byte;
        Ok(())
    }
}

/// Caller buffer that cannot be read back, so no snapshot can be taken
struct UnreadableSink {
    buf: Vec<u8>,
}

impl UserSink for UnreadableSink {
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn load(&self, _offset: usize) -> std::result::Result<u8, Fault> {
        Err(Fault)
    }

    fn store(&mut self, offset: usize, byte: u8) -> std::result::Result<(), Fault> {
        self.buf[offset] = byte;
        Ok(())
    }
}

/// Caller buffer that accepts `budget` stores in total, then faults forever
struct ExhaustingSink {
    buf: Vec<u8>,
    budget: usize,
}

impl UserSink for ExhaustingSink {
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn load(&self, offset: usize) -> std::result::Result<u8, Fault> {
        self.buf.get(offset).copied().ok_or(Fault)
    }

    fn store(&mut self, offset: usize, byte: u8) -> std::result::Result<(), Fault> {
        if self.budget == 0 {
            return Err(Fault);
        }
        self.budget -= 1;
        self.buf[offset] = byte;
        Ok(())
    }
}

fn small_table() -> SlotTable {
    SlotTable::with_limits(Limits::with_max_channels(16))
}

fn read_vec(handle: &SlotHandle<'_>) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; MESSAGE_CAPACITY];
    let len = handle.read(&mut buf)?;
    buf.truncate(len);
    Ok(buf)
}

#[test]
fn test_end_to_end_scenario() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(3));

    handle.select(42).expect("select channel 42");
    assert_eq!(handle.write(b"hello".as_slice()), Ok(5));
    assert_eq!(read_vec(&handle).unwrap(), b"hello");

    assert_eq!(handle.write(b"hi".as_slice()), Ok(2));
    assert_eq!(read_vec(&handle).unwrap(), b"hi");

    handle.release();
}

#[test]
fn test_selection_determinism_across_handles() {
    let table = small_table();
    let slot = SlotIndex::new(0);

    let mut writer = table.open(slot);
    let mut reader = table.open(slot);
    writer.select(7).unwrap();
    reader.select(7).unwrap();

    writer.write(b"shared".as_slice()).unwrap();
    assert_eq!(read_vec(&reader).unwrap(), b"shared");
    assert_eq!(table.channel_count(slot), 1);
}

#[test]
fn test_isolation_across_ids() {
    let table = small_table();
    let mut a = table.open(SlotIndex::new(1));
    let mut b = table.open(SlotIndex::new(1));
    a.select(1).unwrap();
    b.select(2).unwrap();

    b.write(b"bravo".as_slice()).unwrap();
    a.write(b"alpha-long-message".as_slice()).unwrap();

    assert_eq!(read_vec(&b).unwrap(), b"bravo");
    assert_eq!(read_vec(&a).unwrap(), b"alpha-long-message");
}

#[test]
fn test_isolation_across_slots() {
    let table = small_table();
    let mut first = table.open(SlotIndex::new(10));
    let mut second = table.open(SlotIndex::new(11));
    first.select(5).unwrap();
    second.select(5).unwrap();

    first.write(b"slot ten".as_slice()).unwrap();

    assert_eq!(read_vec(&second), Err(SlotError::NoMessage));
    assert_eq!(read_vec(&first).unwrap(), b"slot ten");
}

#[test]
fn test_last_write_wins() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(1).unwrap();

    handle.write(b"first message".as_slice()).unwrap();
    handle.write(b"M2".as_slice()).unwrap();

    assert_eq!(read_vec(&handle).unwrap(), b"M2");
}

#[test]
fn test_write_size_boundary() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(1).unwrap();

    assert_eq!(
        handle.write(b"".as_slice()),
        Err(SlotError::InvalidSize { len: 0, max: 128 })
    );
    assert_eq!(handle.write(vec![b'x'; 128].as_slice()), Ok(128));
    assert_eq!(
        handle.write(vec![b'y'; 129].as_slice()),
        Err(SlotError::InvalidSize { len: 129, max: 128 })
    );
    assert_eq!(read_vec(&handle).unwrap(), vec![b'x'; 128]);
}

#[test]
fn test_fresh_channel_has_no_message() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(99).unwrap();

    assert_eq!(read_vec(&handle), Err(SlotError::NoMessage));
}

#[test]
fn test_read_capacity_boundary() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(1).unwrap();
    handle.write(b"0123456789".as_slice()).unwrap();

    let mut short = [0xAAu8; 9];
    assert_eq!(
        handle.read(short.as_mut_slice()),
        Err(SlotError::BufferTooSmall { needed: 10, capacity: 9 })
    );
    assert_eq!(short, [0xAA; 9]);

    let mut exact = [0u8; 10];
    assert_eq!(handle.read(exact.as_mut_slice()), Ok(10));
    assert_eq!(&exact, b"0123456789");

    let mut large = [0u8; 64];
    assert_eq!(handle.read(large.as_mut_slice()), Ok(10));
    assert_eq!(&large[..10], b"0123456789");
    assert!(large[10..].iter().all(|&b| b == 0));
}

#[test]
fn test_read_is_not_destructive() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(1).unwrap();
    handle.write(b"again".as_slice()).unwrap();

    assert_eq!(read_vec(&handle).unwrap(), b"again");
    assert_eq!(read_vec(&handle).unwrap(), b"again");
}

#[test]
fn test_selection_precondition() {
    let table = small_table();
    let handle = table.open(SlotIndex::new(4));

    assert_eq!(handle.write(b"x".as_slice()), Err(SlotError::NoChannelSelected));
    assert_eq!(read_vec(&handle), Err(SlotError::NoChannelSelected));
}

#[test]
fn test_release_resets_selection() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(4));
    handle.select(8).unwrap();
    handle.write(b"persist".as_slice()).unwrap();

    handle.release();
    assert_eq!(read_vec(&handle), Err(SlotError::NoChannelSelected));
    assert_eq!(handle.write(b"x".as_slice()), Err(SlotError::NoChannelSelected));

    handle.select(8).unwrap();
    assert_eq!(read_vec(&handle).unwrap(), b"persist");
}

#[test]
fn test_data_outlives_handle() {
    let table = small_table();
    {
        let mut handle = table.open(SlotIndex::new(9));
        handle.select(3).unwrap();
        handle.write(b"left behind".as_slice()).unwrap();
    }

    let mut later = table.open(SlotIndex::new(9));
    later.select(3).unwrap();
    assert_eq!(read_vec(&later).unwrap(), b"left behind");
}

#[test]
fn test_capacity_exhaustion() {
    let table = SlotTable::with_limits(Limits::with_max_channels(3));
    let slot = SlotIndex::new(0);
    let mut handle = table.open(slot);

    for id in 1..=3 {
        handle.select(id).unwrap();
    }
    assert_eq!(handle.select(4), Err(SlotError::CapacityExceeded { max: 3 }));
    assert_eq!(handle.selected_channel(), Some(3));

    for id in 1..=3 {
        handle.select(id).unwrap();
    }
    assert_eq!(table.channel_count(slot), 3);

    // Other slots have their own bound.
    let mut other = table.open(SlotIndex::new(1));
    other.select(4).unwrap();
}

#[test]
fn test_write_fault_leaves_message_intact() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(1).unwrap();
    handle.write(b"original".as_slice()).unwrap();

    let source = FaultingSource {
        bytes: b"replacement".to_vec(),
        fault_at: 4,
    };
    assert_eq!(handle.write(&source), Err(SlotError::TransferFault { offset: 4 }));
    assert_eq!(read_vec(&handle).unwrap(), b"original");
}

#[test]
fn test_write_fault_on_fresh_channel_keeps_it_empty() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(2).unwrap();

    let source = FaultingSource {
        bytes: b"lost".to_vec(),
        fault_at: 0,
    };
    assert_eq!(handle.write(&source), Err(SlotError::TransferFault { offset: 0 }));
    assert_eq!(read_vec(&handle), Err(SlotError::NoMessage));
}

#[test]
fn test_read_fault_restores_destination() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(1).unwrap();
    handle.write(b"0123456789".as_slice()).unwrap();

    let mut sink = FaultingSink {
        buf: vec![0x55; 32],
        fault_at: 6,
    };
    assert_eq!(handle.read(&mut sink), Err(SlotError::TransferFault { offset: 6 }));
    assert_eq!(sink.buf, vec![0x55; 32]);

    // The stored message is unaffected and readable through a healthy buffer.
    assert_eq!(read_vec(&handle).unwrap(), b"0123456789");
}

#[test]
fn test_snapshot_fault_leaves_destination_untouched() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(1).unwrap();
    handle.write(b"0123456789".as_slice()).unwrap();

    let mut sink = UnreadableSink {
        buf: vec![0x33; 16],
    };
    assert_eq!(handle.read(&mut sink), Err(SlotError::TransferFault { offset: 0 }));
    assert_eq!(sink.buf, vec![0x33; 16]);
    assert_eq!(read_vec(&handle).unwrap(), b"0123456789");
}

#[test]
fn test_restore_fault_still_reports_transfer_fault() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));
    handle.select(1).unwrap();
    handle.write(b"0123456789".as_slice()).unwrap();

    // Four bytes land, the fifth faults, and every restore store faults too.
    let mut sink = ExhaustingSink {
        buf: vec![0x55; 16],
        budget: 4,
    };
    assert_eq!(handle.read(&mut sink), Err(SlotError::TransferFault { offset: 4 }));
    assert_eq!(&sink.buf[4..], &[0x55; 12]);

    // The channel itself is unaffected.
    assert_eq!(read_vec(&handle).unwrap(), b"0123456789");
}

#[test]
fn test_control_command_flow() {
    let table = small_table();
    let mut handle = table.open(SlotIndex::new(0));

    handle.control(MSG_SLOT_CHANNEL, 42).unwrap();
    handle.write(b"via control".as_slice()).unwrap();

    let mut reader = table.open(SlotIndex::new(0));
    reader.select(42).unwrap();
    assert_eq!(read_vec(&reader).unwrap(), b"via control");
}

#[test]
fn test_errors_leave_table_usable() {
    let table = SlotTable::with_limits(Limits::with_max_channels(1));
    let mut handle = table.open(SlotIndex::new(0));

    assert!(handle.select(0).is_err());
    assert!(handle.write(b"x".as_slice()).is_err());
    handle.select(1).unwrap();
    assert!(handle.select(2).is_err());
    assert!(read_vec(&handle).is_err());

    handle.write(b"ok".as_slice()).unwrap();
    assert_eq!(read_vec(&handle).unwrap(), b"ok");
}
