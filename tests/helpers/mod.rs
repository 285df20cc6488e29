//! Test helpers and fixtures for quaver integration tests
//!
//! Blocks are driven by hand: fill an input buffer, run a "process" step,
//! then inspect or swap buffers the way an audio callback would.

use quaver::prelude::*;

/// Standard block size for deterministic testing
pub const TEST_BLOCK_SIZE: i32 = 512;

/// Create a buffer sized for one test block.
pub fn test_buffer() -> MidiBuffer {
    let config = MidiBufferConfig {
        initial_capacity: 4096,
        ..Default::default()
    };
    MidiBuffer::from_config(&config).expect("Failed to create test buffer")
}

/// Collect `(time, bytes)` pairs in traversal order.
pub fn collect_events(buffer: &MidiBuffer) -> Vec<(i32, Vec<u8>)> {
    buffer.iter().map(|e| (e.time, e.data.to_vec())).collect()
}

/// Collect just the timestamps.
pub fn collect_times(buffer: &MidiBuffer) -> Vec<i32> {
    buffer.iter().map(|e| e.time).collect()
}

/// Raw bytes as a hardware driver would deliver them, several messages per packet.
pub fn driver_packet() -> Vec<u8> {
    vec![
        0x90, 60, 100, // note on
        0xB0, 1, 64, // mod wheel
        0xF0, 0x7E, 0x7F, 0x06, 0x01, 0xF7, // identity request
        0xF8, // clock
        0x80, 60, 0, // note off
    ]
}
