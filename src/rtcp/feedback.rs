use super::{
    byte_io, config::COMMON_FEEDBACK_LENGTH, packet_builder::PacketWriter,
    rtcp_error::RtcpError,
};

// RFC 4585 common feedback fields, right after the header.
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                  SSRC of packet sender                        |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                  SSRC of media source                         |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedbackCommon {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
}

impl FeedbackCommon {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        Self {
            sender_ssrc,
            media_ssrc,
        }
    }

    pub fn parse(payload: &[u8]) -> Result<Self, RtcpError> {
        if payload.len() < COMMON_FEEDBACK_LENGTH {
            return Err(RtcpError::TooShort);
        }
        Ok(Self {
            sender_ssrc: byte_io::read_u32(payload, 0),
            media_ssrc: byte_io::read_u32(payload, 4),
        })
    }

    pub fn write(&self, writer: &mut PacketWriter<'_>) {
        writer.put_u32(self.sender_ssrc);
        writer.put_u32(self.media_ssrc);
    }
}
