use crate::rtcp::{
    byte_io,
    common_header::CommonHeader,
    config::{COMMON_FEEDBACK_LENGTH, HEADER_LENGTH},
    feedback::FeedbackCommon,
    packet_builder::{PacketReadyCallback, PacketWriter},
    packet_type::{FMT_RPSI, PT_PSFB, RtcpPacketType},
    rtcp_error::RtcpError,
};

// Reference picture selection indication (RPSI) (RFC 4585), PSFB FMT=3.
// FCI:
//   0                   1                   2                   3
//   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |      PB       |0| Payload Type|    Native RPSI bit string     |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |   defined per codec          ...                | Padding (0) |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// PB counts padding bits; padding is always whole zero octets up to the next
// 32-bit word. The native string holds the picture id in 7-bit groups, most
// significant group first, with the top bit set on every byte but the last.

/// PB and payload type bytes.
const FCI_PREFIX_LENGTH: usize = 2;
const NATIVE_START: usize = COMMON_FEEDBACK_LENGTH + FCI_PREFIX_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rpsi {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    payload_type: u8,
    picture_id: u64,
}

impl Rpsi {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        Self {
            sender_ssrc,
            media_ssrc,
            payload_type: 0,
            picture_id: 0,
        }
    }

    /// # Panics
    /// If `payload_type` does not fit in 7 bits.
    pub fn with_payload_type(mut self, payload_type: u8) -> Self {
        assert!(payload_type <= 0x7F, "payload type {payload_type} exceeds 7 bits");
        self.payload_type = payload_type;
        self
    }

    pub fn with_picture_id(mut self, picture_id: u64) -> Self {
        self.picture_id = picture_id;
        self
    }

    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    pub fn picture_id(&self) -> u64 {
        self.picture_id
    }

    fn native_length(&self) -> usize {
        native_bytes(self.picture_id)
    }

    fn padding_length(&self) -> usize {
        let fci = FCI_PREFIX_LENGTH + self.native_length();
        fci.next_multiple_of(4) - fci
    }
}

/// Number of 7-bit groups needed for `value`; zero still takes one.
fn native_bytes(value: u64) -> usize {
    let mut bytes = 1;
    let mut rest = value >> 7;
    while rest > 0 {
        bytes += 1;
        rest >>= 7;
    }
    bytes
}

impl RtcpPacketType for Rpsi {
    fn block_length(&self) -> usize {
        HEADER_LENGTH
            + COMMON_FEEDBACK_LENGTH
            + FCI_PREFIX_LENGTH
            + self.native_length()
            + self.padding_length()
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
            FMT_RPSI,
            PT_PSFB,
            CommonHeader::length_field(block_length),
        );
        FeedbackCommon::new(self.sender_ssrc, self.media_ssrc).write(writer);

        let padding = self.padding_length();
        writer.put_u8((padding * 8) as u8);
        writer.put_u8(self.payload_type & 0x7F);

        let native = self.native_length();
        for group in (1..native).rev() {
            writer.put_u8(0x80 | ((self.picture_id >> (group * 7)) & 0x7F) as u8);
        }
        writer.put_u8((self.picture_id & 0x7F) as u8);
        writer.put_zeros(padding);

        writer.finish_block(index_end);
        Ok(())
    }

    fn parse(hdr: &CommonHeader, payload: &[u8]) -> Result<Self, RtcpError> {
        assert_eq!(hdr.pt(), PT_PSFB);
        assert_eq!(hdr.rc_or_fmt(), FMT_RPSI);

        let payload = hdr.payload(payload)?;
        if payload.len() < NATIVE_START + 1 {
            return Err(RtcpError::TooShort);
        }
        let common = FeedbackCommon::parse(payload)?;

        let padding_bits = byte_io::read_u8(payload, COMMON_FEEDBACK_LENGTH);
        if padding_bits % 8 != 0 {
            return Err(RtcpError::BadPadding);
        }
        let padding_bytes = usize::from(padding_bits / 8);
        if NATIVE_START + padding_bytes >= payload.len() {
            return Err(RtcpError::BadPadding);
        }
        let native_end = payload.len() - padding_bytes;
        if payload[native_end..].iter().any(|&b| b != 0) {
            return Err(RtcpError::BadPadding);
        }

        let payload_type = byte_io::read_u8(payload, COMMON_FEEDBACK_LENGTH + 1) & 0x7F;

        let mut picture_id: u64 = 0;
        // Continuation bits are not checked; only the low 7 bits of each byte count.
        for &byte in &payload[NATIVE_START..native_end] {
            if picture_id > (u64::MAX >> 7) {
                return Err(RtcpError::PictureIdOverflow);
            }
            picture_id = (picture_id << 7) | u64::from(byte & 0x7F);
        }

        Ok(Rpsi {
            sender_ssrc: common.sender_ssrc,
            media_ssrc: common.media_ssrc,
            payload_type,
            picture_id,
        })
    }
}
