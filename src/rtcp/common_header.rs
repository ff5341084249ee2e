use super::{
    byte_io,
    config::{HEADER_LENGTH, RTCP_VERSION},
    packet_builder::PacketWriter,
    rtcp_error::RtcpError,
};

//   0                   1                   2                   3
//   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |V=2|P| RC/FMT  |      PT       |             length            |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonHeader {
    version: u8,        // 2
    padding: bool,      // P
    rc_or_fmt: u8,      // 5 bits (report count or FMT)
    pt: u8,             // packet type
    length_words: u16,  // number of 32-bit words minus one
    padding_bytes: u8,  // trailing octets to drop when P is set
}

impl CommonHeader {
    /// Parses the header at the start of `buf` and validates that the whole
    /// block it describes is present.
    pub fn parse(buf: &[u8]) -> Result<Self, RtcpError> {
        if buf.len() < HEADER_LENGTH {
            return Err(RtcpError::MalformedHeader("fewer than 4 bytes"));
        }
        let vprc = byte_io::read_u8(buf, 0);
        let version = vprc >> 6;
        if version != RTCP_VERSION {
            return Err(RtcpError::MalformedHeader("version is not 2"));
        }
        let padding = ((vprc >> 5) & 1) != 0;
        let rc_or_fmt = vprc & 0x1F;
        let pt = byte_io::read_u8(buf, 1);
        let length_words = byte_io::read_u16(buf, 2);

        let mut hdr = Self {
            version,
            padding,
            rc_or_fmt,
            pt,
            length_words,
            padding_bytes: 0,
        };
        let total = hdr.block_size();
        if buf.len() < total {
            return Err(RtcpError::MalformedHeader("length exceeds buffer"));
        }

        if padding {
            if total == HEADER_LENGTH {
                return Err(RtcpError::MalformedHeader("padding bit set on empty payload"));
            }
            let pad = byte_io::read_u8(buf, total - 1);
            if pad == 0 {
                return Err(RtcpError::MalformedHeader("padding bit set but zero padding"));
            }
            if usize::from(pad) > total - HEADER_LENGTH {
                return Err(RtcpError::MalformedHeader("padding larger than payload"));
            }
            hdr.padding_bytes = pad;
        }
        Ok(hdr)
    }

    /// Writes a header with the padding bit cleared.
    pub fn write(writer: &mut PacketWriter<'_>, rc_or_fmt: u8, pt: u8, length_words: u16) {
        debug_assert!(rc_or_fmt <= 0x1F);
        writer.put_u8((RTCP_VERSION << 6) | (rc_or_fmt & 0x1F));
        writer.put_u8(pt);
        writer.put_u16(length_words);
    }

    /// Value of the length field for a block of `block_length` bytes,
    /// rounding up to a whole word.
    pub fn length_field(block_length: usize) -> u16 {
        assert!(block_length > 0);
        let words = block_length.div_ceil(4) - 1;
        assert!(words <= usize::from(u16::MAX), "RTCP block too long");
        words as u16
    }

    /// Total bytes of this block, header and padding included.
    pub fn block_size(&self) -> usize {
        HEADER_LENGTH + usize::from(self.length_words) * 4
    }

    /// Bytes after the header, without trailing padding.
    pub fn payload_size_bytes(&self) -> usize {
        self.block_size() - HEADER_LENGTH - usize::from(self.padding_bytes)
    }

    /// Trims the bytes following the header down to this block's payload.
    pub fn payload<'p>(&self, after_header: &'p [u8]) -> Result<&'p [u8], RtcpError> {
        after_header
            .get(..self.payload_size_bytes())
            .ok_or(RtcpError::TooShort)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn padding(&self) -> bool {
        self.padding
    }

    pub fn padding_bytes(&self) -> u8 {
        self.padding_bytes
    }

    pub fn rc_or_fmt(&self) -> u8 {
        self.rc_or_fmt
    }

    pub fn pt(&self) -> u8 {
        self.pt
    }

    pub fn length_words(&self) -> u16 {
        self.length_words
    }
}
