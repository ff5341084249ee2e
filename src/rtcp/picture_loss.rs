use crate::rtcp::{
    common_header::CommonHeader,
    config::{COMMON_FEEDBACK_LENGTH, HEADER_LENGTH},
    feedback::FeedbackCommon,
    packet_builder::{PacketReadyCallback, PacketWriter},
    packet_type::{FMT_PLI, PT_PSFB, RtcpPacketType},
    rtcp_error::RtcpError,
};

// Feedback: PLI (PSFB, FMT=1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureLossIndication {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
}

impl RtcpPacketType for PictureLossIndication {
    fn block_length(&self) -> usize {
        // no FCI for PLI
        HEADER_LENGTH + COMMON_FEEDBACK_LENGTH
    }

    fn create(
        &self,
        writer: &mut PacketWriter<'_>,
        on_ready: &mut PacketReadyCallback<'_>,
    ) -> Result<(), RtcpError> {
        let block_length = self.block_length();
        let index_end = writer.reserve(block_length, on_ready)?;
        CommonHeader::write(
            writer,
            FMT_PLI,
            PT_PSFB,
            CommonHeader::length_field(block_length),
        );
        FeedbackCommon::new(self.sender_ssrc, self.media_ssrc).write(writer);
        writer.finish_block(index_end);
        Ok(())
    }

    fn parse(hdr: &CommonHeader, payload: &[u8]) -> Result<Self, RtcpError> {
        assert_eq!(hdr.pt(), PT_PSFB);
        assert_eq!(hdr.rc_or_fmt(), FMT_PLI);
        let common = FeedbackCommon::parse(hdr.payload(payload)?)?;
        Ok(Self::new(common.sender_ssrc, common.media_ssrc))
    }
}

impl PictureLossIndication {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        Self {
            sender_ssrc,
            media_ssrc,
        }
    }
}
