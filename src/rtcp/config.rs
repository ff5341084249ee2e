use crate::config::Config;

pub const RTCP_VERSION: u8 = 2;

/// Size in bytes of the common header (V/P/FMT, PT, length).
pub const HEADER_LENGTH: usize = 4;

/// Sender SSRC + media SSRC shared by every feedback message.
pub const COMMON_FEEDBACK_LENGTH: usize = 8;

/// Default upper bound for one outgoing RTCP datagram.
pub const IP_PACKET_SIZE: usize = 1500;

/// Largest block the 16-bit length field can describe.
pub const MAX_BLOCK_LENGTH: usize = (u16::MAX as usize + 1) * 4;

/// Runtime knobs for building packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcpSettings {
    pub max_packet_size: usize,
}

impl Default for RtcpSettings {
    fn default() -> Self {
        Self {
            max_packet_size: IP_PACKET_SIZE,
        }
    }
}

impl RtcpSettings {
    /// Reads `[Rtcp] max_packet_size`, falling back to [`IP_PACKET_SIZE`]
    /// when the key is missing or not a number.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let max_packet_size = config
            .get_non_empty("Rtcp", "max_packet_size")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(IP_PACKET_SIZE)
            .max(HEADER_LENGTH);
        Self { max_packet_size }
    }
}
