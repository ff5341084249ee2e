use bytes::Bytes;

use super::{
    common_header::CommonHeader,
    config::{HEADER_LENGTH, RtcpSettings},
    fir::Fir,
    packet_builder::{self, PacketReadyCallback, PacketWriter, RawPacket},
    packet_type::{FMT_FIR, FMT_PLI, FMT_RPSI, PT_PSFB, RtcpPacketType},
    picture_loss::PictureLossIndication,
    rpsi::Rpsi,
    rtcp_error::RtcpError,
};

/// Which codec a block belongs to, decided from its header alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Pli,
    Rpsi,
    Fir,
    Unknown,
}

impl FeedbackKind {
    pub fn classify(hdr: &CommonHeader) -> Self {
        match (hdr.pt(), hdr.rc_or_fmt()) {
            (PT_PSFB, FMT_PLI) => FeedbackKind::Pli,
            (PT_PSFB, FMT_RPSI) => FeedbackKind::Rpsi,
            (PT_PSFB, FMT_FIR) => FeedbackKind::Fir,
            _ => FeedbackKind::Unknown,
        }
    }
}

/// A block this crate does not decode, kept byte for byte (header included)
/// so it can be forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBlock {
    raw: Bytes,
}

impl UnknownBlock {
    /// `block` is exactly one header-validated block.
    pub fn from_block(block: &[u8]) -> Result<Self, RtcpError> {
        if block.len() < HEADER_LENGTH {
            return Err(RtcpError::TooShort);
        }
        Ok(Self {
            raw: Bytes::copy_from_slice(block),
        })
    }

    pub fn pt(&self) -> u8 {
        self.raw[1]
    }

    pub fn rc_or_fmt(&self) -> u8 {
        self.raw[0] & 0x1F
    }

    /// Bytes after the common header, padding included.
    pub fn body(&self) -> &[u8] {
        &self.raw[HEADER_LENGTH..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

/// The union of supported RTCP packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtcpPacket {
    Pli(PictureLossIndication), // Payload FB (206/FMT=1)
    Rpsi(Rpsi),                 // Payload FB (206/FMT=3)
    Fir(Fir),                   // Payload FB (206/FMT=4)
    Unknown(UnknownBlock),
}

impl RtcpPacket {
    /// Decodes one block. `block` starts at the header and spans exactly
    /// `hdr.block_size()` bytes.
    pub fn decode(hdr: &CommonHeader, block: &[u8]) -> Result<RtcpPacket, RtcpError> {
        let payload = block.get(HEADER_LENGTH..).ok_or(RtcpError::TooShort)?;
        let pkt = match FeedbackKind::classify(hdr) {
            FeedbackKind::Pli => RtcpPacket::Pli(PictureLossIndication::parse(hdr, payload)?),
            FeedbackKind::Rpsi => RtcpPacket::Rpsi(Rpsi::parse(hdr, payload)?),
            FeedbackKind::Fir => RtcpPacket::Fir(Fir::parse(hdr, payload)?),
            FeedbackKind::Unknown => RtcpPacket::Unknown(UnknownBlock::from_block(block)?),
        };
        Ok(pkt)
    }

    /// Decode a *compound* RTCP buffer into individual packets.
    pub fn decode_compound(buf: &[u8]) -> Result<Vec<RtcpPacket>, RtcpError> {
        let mut out = Vec::new();
        let mut idx = 0usize;
        while idx + HEADER_LENGTH <= buf.len() {
            let hdr = CommonHeader::parse(&buf[idx..])?;
            let total = hdr.block_size();
            out.push(Self::decode(&hdr, &buf[idx..idx + total])?);
            idx += total;
        }
        if idx != buf.len() {
            // trailing garbage / partial packet
            return Err(RtcpError::Truncated);
        }
        Ok(out)
    }

    pub fn kind(&self) -> FeedbackKind {
        match self {
            RtcpPacket::Pli(_) => FeedbackKind::Pli,
            RtcpPacket::Rpsi(_) => FeedbackKind::Rpsi,
            RtcpPacket::Fir(_) => FeedbackKind::Fir,
            RtcpPacket::Unknown(_) => FeedbackKind::Unknown,
        }
    }

    pub fn block_length(&self) -> usize {
        match self {
            RtcpPacket::Pli(pli) => pli.block_length(),
            RtcpPacket::Rpsi(rpsi) => rpsi.block_length(),
            RtcpPacket::Fir(fir) => fir.block_length(),
            RtcpPacket::Unknown(unknown) => unknown.raw.len(),
        }
    }

    pub fn create(
        &self,
        writer: &mut PacketWriter<'_>,
        on_ready: &mut PacketReadyCallback<'_>,
    ) -> Result<(), RtcpError> {
        match self {
            RtcpPacket::Pli(pli) => pli.create(writer, on_ready),
            RtcpPacket::Rpsi(rpsi) => rpsi.create(writer, on_ready),
            RtcpPacket::Fir(fir) => fir.create(writer, on_ready),
            RtcpPacket::Unknown(unknown) => {
                let index_end = writer.reserve(unknown.raw.len(), on_ready)?;
                writer.put_slice(&unknown.raw);
                writer.finish_block(index_end);
                Ok(())
            }
        }
    }

    /// Writes `pkts` back to back into `buffer`. Whenever the next packet does
    /// not fit, the bytes so far are handed to `on_ready`; whatever is left at
    /// the end is handed over too.
    pub fn build_external_buffer(
        pkts: &[RtcpPacket],
        buffer: &mut [u8],
        max_length: usize,
        on_ready: &mut PacketReadyCallback<'_>,
    ) -> Result<(), RtcpError> {
        let mut writer = PacketWriter::new(buffer, max_length);
        for pkt in pkts {
            pkt.create(&mut writer, on_ready)?;
        }
        writer.flush(on_ready)
    }

    /// Encode a compound RTCP packet that must fit in one datagram.
    pub fn build_compound(
        pkts: &[RtcpPacket],
        settings: &RtcpSettings,
    ) -> Result<RawPacket, RtcpError> {
        packet_builder::build_single(settings.max_packet_size, |writer, on_ready| {
            for pkt in pkts {
                pkt.create(writer, on_ready)?;
            }
            Ok(())
        })
    }
}

impl From<PictureLossIndication> for RtcpPacket {
    fn from(pli: PictureLossIndication) -> Self {
        RtcpPacket::Pli(pli)
    }
}

impl From<Rpsi> for RtcpPacket {
    fn from(rpsi: Rpsi) -> Self {
        RtcpPacket::Rpsi(rpsi)
    }
}

impl From<Fir> for RtcpPacket {
    fn from(fir: Fir) -> Self {
        RtcpPacket::Fir(fir)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn sample() -> Vec<RtcpPacket> {
        vec![
            Fir::new(0x1234_5678).with_request(0x2345_6789, 24).into(),
            Rpsi::new(0x1234_5678, 0x2345_6789)
                .with_payload_type(100)
                .with_picture_id(0x10_6143)
                .into(),
            PictureLossIndication::new(1, 2).into(),
        ]
    }

    #[test]
    fn compound_round_trip_keeps_order() {
        let pkts = sample();
        let raw = RtcpPacket::build_compound(&pkts, &RtcpSettings::default()).unwrap();
        assert_eq!(raw.len(), 20 + 20 + 12);
        let decoded = RtcpPacket::decode_compound(raw.buffer()).unwrap();
        assert_eq!(decoded, pkts);
        let kinds: Vec<_> = decoded.iter().map(RtcpPacket::kind).collect();
        assert_eq!(kinds, [FeedbackKind::Fir, FeedbackKind::Rpsi, FeedbackKind::Pli]);
    }

    #[test]
    fn unknown_blocks_are_preserved() {
        // Receiver report with no report blocks, then a PLI.
        let mut buf = vec![0x80, 201, 0x00, 0x01, 0xAA, 0xBB, 0xCC, 0xDD];
        buf.extend_from_slice(PictureLossIndication::new(1, 2).build().unwrap().buffer());

        let decoded = RtcpPacket::decode_compound(&buf).unwrap();
        assert_eq!(decoded.len(), 2);
        match &decoded[0] {
            RtcpPacket::Unknown(u) => {
                assert_eq!(u.pt(), 201);
                assert_eq!(u.rc_or_fmt(), 0);
                assert_eq!(u.body(), &[0xAA, 0xBB, 0xCC, 0xDD]);
            }
            other => panic!("expected Unknown, got {other:?}"),
        }

        let rebuilt = RtcpPacket::build_compound(&decoded, &RtcpSettings::default()).unwrap();
        assert_eq!(rebuilt.buffer(), buf.as_slice());
    }

    #[test]
    fn unknown_psfb_format_falls_back() {
        // PSFB FMT=15 (application layer feedback) is not decoded here.
        let buf = [0x8F, 206, 0x00, 0x02, 0, 0, 0, 1, 0, 0, 0, 2];
        let decoded = RtcpPacket::decode_compound(&buf).unwrap();
        assert_eq!(decoded[0].kind(), FeedbackKind::Unknown);
    }

    #[test]
    fn block_shorter_than_header_is_too_short() {
        let hdr = CommonHeader::parse(&[0x80, 201, 0x00, 0x00]).unwrap();
        assert_eq!(RtcpPacket::decode(&hdr, &[0x80, 201]), Err(RtcpError::TooShort));
        assert_eq!(UnknownBlock::from_block(&[0x80]), Err(RtcpError::TooShort));
    }

    #[test]
    fn trailing_bytes_are_truncated() {
        let mut buf = PictureLossIndication::new(1, 2).build().unwrap().buffer().to_vec();
        buf.extend_from_slice(&[0x81, 206]);
        assert_eq!(RtcpPacket::decode_compound(&buf), Err(RtcpError::Truncated));
    }

    #[test]
    fn first_bad_block_fails_compound_decode() {
        let mut buf = Fir::new(1).with_request(2, 3).build().unwrap().buffer().to_vec();
        // Chop the FIR entry: header now claims 2 words, payload only holds the
        // common feedback.
        buf[3] = 2;
        buf.truncate(12);
        assert_eq!(RtcpPacket::decode_compound(&buf), Err(RtcpError::TooShort));
    }

    #[test]
    fn external_buffer_splits_across_datagrams() {
        let pkts = sample();
        let mut buffer = [0u8; 40];
        let mut datagrams: Vec<Vec<u8>> = Vec::new();
        let mut on_ready = |b: &[u8]| {
            datagrams.push(b.to_vec());
            true
        };
        RtcpPacket::build_external_buffer(&pkts, &mut buffer, 40, &mut on_ready).unwrap();

        // FIR + RPSI fill 40 bytes, PLI goes into a second datagram.
        assert_eq!(datagrams.len(), 2);
        assert_eq!(datagrams[0].len(), 40);
        assert_eq!(datagrams[1].len(), 12);

        let mut decoded = RtcpPacket::decode_compound(&datagrams[0]).unwrap();
        decoded.extend(RtcpPacket::decode_compound(&datagrams[1]).unwrap());
        assert_eq!(decoded, pkts);
    }

    #[test]
    fn build_compound_reports_fragmentation() {
        let settings = RtcpSettings {
            max_packet_size: 24,
        };
        assert_eq!(
            RtcpPacket::build_compound(&sample(), &settings),
            Err(RtcpError::Fragmented)
        );
    }

    #[test]
    fn build_of_nothing_is_an_error() {
        let mut buffer = [0u8; 16];
        let mut on_ready = |_: &[u8]| true;
        assert_eq!(
            RtcpPacket::build_external_buffer(&[], &mut buffer, 16, &mut on_ready),
            Err(RtcpError::BufferExhausted)
        );
    }
}
