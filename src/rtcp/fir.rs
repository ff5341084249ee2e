use crate::rtcp::{
    byte_io,
    common_header::CommonHeader,
    config::{COMMON_FEEDBACK_LENGTH, HEADER_LENGTH},
    feedback::FeedbackCommon,
    packet_builder::{PacketReadyCallback, PacketWriter},
    packet_type::{FMT_FIR, PT_PSFB, RtcpPacketType},
    rtcp_error::RtcpError,
};

// Full intra request (FIR) (RFC 5104), PSFB FMT=4.
// The media source SSRC of the common feedback block is unused and always 0;
// targets are named per FCI entry:
//   0                   1                   2                   3
//   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                              SSRC                             |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  | Seq nr.       |    Reserved = 0                               |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
const FCI_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirRequest {
    pub ssrc: u32,
    pub seq_nr: u8,
}

impl FirRequest {
    pub fn new(ssrc: u32, seq_nr: u8) -> Self {
        Self { ssrc, seq_nr }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fir {
    pub sender_ssrc: u32,
    /// Wire order; duplicates are kept.
    pub requests: Vec<FirRequest>,
}

impl Fir {
    pub fn new(sender_ssrc: u32) -> Self {
        Self {
            sender_ssrc,
            requests: Vec::new(),
        }
    }

    pub fn with_request(mut self, ssrc: u32, seq_nr: u8) -> Self {
        self.requests.push(FirRequest::new(ssrc, seq_nr));
        self
    }

    pub fn requests(&self) -> &[FirRequest] {
        &self.requests
    }
}

impl RtcpPacketType for Fir {
    fn block_length(&self) -> usize {
        HEADER_LENGTH + COMMON_FEEDBACK_LENGTH + FCI_LENGTH * self.requests.len()
    }

    fn create(
        &self,
        writer: &mut PacketWriter<'_>,
        on_ready: &mut PacketReadyCallback<'_>,
    ) -> Result<(), RtcpError> {
        assert!(!self.requests.is_empty(), "FIR needs at least one request");
        let block_length = self.block_length();
        let index_end = writer.reserve(block_length, on_ready)?;

        CommonHeader::write(
            writer,
            FMT_FIR,
            PT_PSFB,
            CommonHeader::length_field(block_length),
        );
        FeedbackCommon::new(self.sender_ssrc, 0).write(writer);
        for request in &self.requests {
            writer.put_u32(request.ssrc);
            writer.put_u8(request.seq_nr);
            writer.put_u24(0);
        }
        writer.finish_block(index_end);
        Ok(())
    }

    fn parse(hdr: &CommonHeader, payload: &[u8]) -> Result<Self, RtcpError> {
        assert_eq!(hdr.pt(), PT_PSFB);
        assert_eq!(hdr.rc_or_fmt(), FMT_FIR);

        let payload = hdr.payload(payload)?;
        // The FCI field must contain one or more FIR entries.
        if payload.len() < COMMON_FEEDBACK_LENGTH + FCI_LENGTH {
            return Err(RtcpError::TooShort);
        }
        if (payload.len() - COMMON_FEEDBACK_LENGTH) % FCI_LENGTH != 0 {
            return Err(RtcpError::BadAlignment);
        }

        let common = FeedbackCommon::parse(payload)?;
        let requests = payload[COMMON_FEEDBACK_LENGTH..]
            .chunks_exact(FCI_LENGTH)
            .map(|fci| FirRequest {
                ssrc: byte_io::read_u32(fci, 0),
                seq_nr: byte_io::read_u8(fci, 4),
            })
            .collect();

        Ok(Fir {
            sender_ssrc: common.sender_ssrc,
            requests,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::rtcp::config::RtcpSettings;

    const SENDER_SSRC: u32 = 0x1234_5678;
    const REMOTE_SSRC: u32 = 0x2345_6789;
    const SEQ_NR: u8 = 24;
    // Manually created FIR packet matching the constants above.
    const PACKET: [u8; 20] = [
        0x84, 206, 0x00, 0x04, //
        0x12, 0x34, 0x56, 0x78, //
        0x00, 0x00, 0x00, 0x00, //
        0x23, 0x45, 0x67, 0x89, //
        0x18, 0x00, 0x00, 0x00,
    ];

    fn parse_fir(buf: &[u8]) -> Result<Fir, RtcpError> {
        let hdr = CommonHeader::parse(buf).unwrap();
        assert_eq!(buf.len(), hdr.block_size());
        Fir::parse(&hdr, &buf[HEADER_LENGTH..])
    }

    #[test]
    fn parse_golden_packet() {
        let fir = parse_fir(&PACKET).unwrap();
        assert_eq!(fir.sender_ssrc, SENDER_SSRC);
        assert_eq!(fir.requests(), &[FirRequest::new(REMOTE_SSRC, SEQ_NR)]);
    }

    #[test]
    fn build_matches_golden_packet() {
        let fir = Fir::new(SENDER_SSRC).with_request(REMOTE_SSRC, SEQ_NR);
        let packet = fir.build().unwrap();
        assert_eq!(packet.buffer(), &PACKET);
    }

    #[test]
    fn two_requests_round_trip_in_order() {
        let fir = Fir::new(SENDER_SSRC)
            .with_request(REMOTE_SSRC, SEQ_NR)
            .with_request(REMOTE_SSRC + 1, SEQ_NR + 1);
        let packet = fir.build().unwrap();
        assert_eq!(packet.len(), 28);
        let parsed = parse_fir(packet.buffer()).unwrap();
        assert_eq!(parsed, fir);
    }

    #[test]
    fn reserved_bytes_are_ignored_on_read() {
        let mut packet = PACKET;
        packet[17] = 0xAB;
        packet[19] = 0xCD;
        let fir = parse_fir(&packet).unwrap();
        assert_eq!(fir.requests(), &[FirRequest::new(REMOTE_SSRC, SEQ_NR)]);
    }

    #[test]
    fn media_ssrc_is_not_carried() {
        let mut packet = PACKET;
        packet[8..12].copy_from_slice(&[1, 2, 3, 4]);
        let fir = parse_fir(&packet).unwrap();
        assert_eq!(fir.sender_ssrc, SENDER_SSRC);
    }

    #[test]
    fn parse_fails_without_fci() {
        let packet = [0x84, 206, 0x00, 0x02, 0x12, 0x34, 0x56, 0x78, 0, 0, 0, 0];
        assert_eq!(parse_fir(&packet), Err(RtcpError::TooShort));
    }

    #[test]
    fn short_payload_is_too_short_before_misaligned() {
        // 12 byte payload: no whole entry and not a multiple of the entry size.
        let packet = [
            0x84, 206, 0x00, 0x03, //
            0x01, 0x02, 0x03, 0x04, //
            0x00, 0x00, 0x00, 0x00, //
            0x09, 0x09, 0x09, 0x09,
        ];
        assert_eq!(parse_fir(&packet), Err(RtcpError::TooShort));
    }

    #[test]
    fn build_with_honours_max_packet_size() {
        let fir = Fir::new(SENDER_SSRC).with_request(REMOTE_SSRC, SEQ_NR);
        let tight = RtcpSettings { max_packet_size: 16 };
        assert_eq!(fir.build_with(&tight), Err(RtcpError::BufferExhausted));

        let exact = RtcpSettings { max_packet_size: 20 };
        assert_eq!(fir.build_with(&exact).unwrap().buffer(), &PACKET);
    }

    #[test]
    fn parse_fails_on_fractional_entry() {
        let mut packet = PACKET.to_vec();
        packet.extend_from_slice(&[0x11, 0x22, 0x33, 0x44]);
        packet[3] = 5;
        assert_eq!(parse_fir(&packet), Err(RtcpError::BadAlignment));
    }

    #[test]
    fn duplicate_requests_are_kept() {
        let fir = Fir::new(1).with_request(7, 1).with_request(7, 1);
        let parsed = parse_fir(fir.build().unwrap().buffer()).unwrap();
        assert_eq!(parsed.requests().len(), 2);
    }

    #[test]
    #[should_panic(expected = "at least one request")]
    fn build_without_requests_panics() {
        let _ = Fir::new(SENDER_SSRC).build();
    }

    #[test]
    #[should_panic]
    fn parse_with_wrong_format_panics() {
        let mut packet = PACKET;
        packet[0] = 0x81;
        let _ = parse_fir(&packet);
    }

    #[test]
    fn create_flushes_when_block_does_not_fit() {
        let mut buf = [0u8; 32];
        let mut flushed: Vec<Vec<u8>> = Vec::new();
        let mut cb = |b: &[u8]| {
            flushed.push(b.to_vec());
            true
        };
        let fir = Fir::new(SENDER_SSRC).with_request(REMOTE_SSRC, SEQ_NR);

        let mut w = PacketWriter::new(&mut buf, 32);
        fir.create(&mut w, &mut cb).unwrap();
        assert_eq!(w.index(), 20);
        // 20 + 20 > 32, so the first copy goes out before the second is written.
        fir.create(&mut w, &mut cb).unwrap();
        assert_eq!(w.index(), 20);
        assert_eq!(w.written(), &PACKET);
        drop(w);
        assert_eq!(flushed, vec![PACKET.to_vec()]);
    }

    #[test]
    fn create_fails_when_buffer_too_small() {
        let mut buf = [0u8; 16];
        let mut w = PacketWriter::new(&mut buf, 16);
        let fir = Fir::new(SENDER_SSRC).with_request(REMOTE_SSRC, SEQ_NR);
        let mut cb = |_: &[u8]| true;
        assert_eq!(fir.create(&mut w, &mut cb), Err(RtcpError::BufferExhausted));
        assert_eq!(w.index(), 0);
    }
}
