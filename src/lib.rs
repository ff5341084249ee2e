//! Wire codec for RTCP payload-specific feedback messages.
//!
//! Parses FIR, RPSI and PLI blocks out of (compound) RTCP datagrams and
//! writes them into size-limited buffers, flushing completed datagrams
//! through a caller-supplied continuation when the buffer runs out.

/// Handles configuration loading and management.
pub mod config;
/// Logging utilities: sinks, leveled macros and a background file logger.
pub mod log;
/// RTCP (RTP Control Protocol) feedback packet parsing and building.
pub mod rtcp;
