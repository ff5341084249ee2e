use super::{
    common_header::CommonHeader,
    config::RtcpSettings,
    packet_builder::{self, PacketReadyCallback, PacketWriter, RawPacket},
    rtcp_error::RtcpError,
};

// RTCP feedback packet type (RFC4585/5104)
pub const PT_PSFB: u8 = 206; // Payload-specific FB (e.g., PLI, FIR)

// Payload-specific feedback message types (FMT field of PT_PSFB).
pub const FMT_PLI: u8 = 1;
pub const FMT_RPSI: u8 = 3;
pub const FMT_FIR: u8 = 4;

pub trait RtcpPacketType: Sized {
    /// Total bytes the packet occupies on the wire, header included.
    fn block_length(&self) -> usize;

    /// Writes the complete packet (including `CommonHeader`) at the writer's
    /// cursor, flushing through `on_ready` when it does not fit.
    fn create(
        &self,
        writer: &mut PacketWriter<'_>,
        on_ready: &mut PacketReadyCallback<'_>,
    ) -> Result<(), RtcpError>;

    /// Decodes the packet from its `CommonHeader` and the bytes that follow it.
    ///
    /// The caller must already have matched the header to this type.
    fn parse(hdr: &CommonHeader, payload: &[u8]) -> Result<Self, RtcpError>;

    /// Serializes into a fresh single-datagram buffer of the default
    /// [`IP_PACKET_SIZE`](super::config::IP_PACKET_SIZE) bytes.
    fn build(&self) -> Result<RawPacket, RtcpError> {
        self.build_with(&RtcpSettings::default())
    }

    /// Like [`build`](Self::build), bounded by `settings.max_packet_size`.
    fn build_with(&self, settings: &RtcpSettings) -> Result<RawPacket, RtcpError> {
        packet_builder::build_single(settings.max_packet_size, |w, cb| self.create(w, cb))
    }

    /// Serializes into `buffer`, handing every completed chunk to `on_ready`.
    fn build_external_buffer(
        &self,
        buffer: &mut [u8],
        max_length: usize,
        on_ready: &mut PacketReadyCallback<'_>,
    ) -> Result<(), RtcpError> {
        let mut writer = PacketWriter::new(buffer, max_length);
        self.create(&mut writer, on_ready)?;
        writer.flush(on_ready)
    }
}
