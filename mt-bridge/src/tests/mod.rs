// Location: mt-bridge/src/tests/mod.rs
// Purpose: Test module setup for the wire protocol
// Why: Organizes tests by message family

mod envelope_tests;
