use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtcpError {
    /// Common header is unusable; the payload names the reason.
    MalformedHeader(&'static str),
    TooShort,
    /// Control info is not a whole number of entries.
    BadAlignment,
    BadPadding,
    PictureIdOverflow,
    /// Bytes left over after the last complete block.
    Truncated,
    /// The block does not fit even in an empty buffer.
    BufferExhausted,
    /// The flush continuation refused to take the pending bytes.
    FlushRejected,
    /// A single-datagram build needed more than one flush.
    Fragmented,
}

impl fmt::Display for RtcpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RtcpError::*;
        match self {
            MalformedHeader(why) => write!(f, "malformed RTCP header: {why}"),
            TooShort => write!(f, "buffer too short"),
            BadAlignment => write!(f, "control info is not a multiple of the entry size"),
            BadPadding => write!(f, "invalid padding in feedback control info"),
            PictureIdOverflow => write!(f, "picture id does not fit in 64 bits"),
            Truncated => write!(f, "truncated RTCP structure"),
            BufferExhausted => write!(f, "block does not fit in the output buffer"),
            FlushRejected => write!(f, "packet-ready callback rejected the flush"),
            Fragmented => write!(f, "packet does not fit in a single datagram"),
        }
    }
}
impl std::error::Error for RtcpError {}
