use bytes::{Bytes, BytesMut};

use super::{byte_io, config::MAX_BLOCK_LENGTH, rtcp_error::RtcpError};

/// Continuation invoked when the output buffer cannot hold the next block.
///
/// Receives every byte written so far; returns `false` to abort the build.
pub type PacketReadyCallback<'c> = dyn FnMut(&[u8]) -> bool + 'c;

/// Cursor over a caller-owned, size-limited output buffer.
///
/// Blocks are written whole: [`reserve`](Self::reserve) makes room for the
/// entire block (flushing earlier bytes through the continuation if needed)
/// before the first byte of it is written, so a failed build never leaves a
/// half-written block behind.
pub struct PacketWriter<'a> {
    buf: &'a mut [u8],
    index: usize,
    max_length: usize,
}

impl<'a> PacketWriter<'a> {
    /// `max_length` is clamped to the buffer length.
    pub fn new(buf: &'a mut [u8], max_length: usize) -> Self {
        let max_length = max_length.min(buf.len());
        Self {
            buf,
            index: 0,
            max_length,
        }
    }

    /// Resumes writing at `index` in a buffer that already holds data.
    pub fn with_index(buf: &'a mut [u8], index: usize, max_length: usize) -> Self {
        let mut w = Self::new(buf, max_length);
        w.index = index.min(w.max_length);
        w
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn remaining(&self) -> usize {
        self.max_length - self.index
    }

    /// Bytes written since the last flush.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.index]
    }

    /// Guarantees `block_length` free bytes at the cursor and returns the
    /// offset the cursor must reach once the block is written.
    pub fn reserve(
        &mut self,
        block_length: usize,
        on_ready: &mut PacketReadyCallback<'_>,
    ) -> Result<usize, RtcpError> {
        assert!(
            block_length <= MAX_BLOCK_LENGTH,
            "RTCP block of {block_length} bytes exceeds the length field"
        );
        while self.index + block_length > self.max_length {
            self.flush(on_ready)?;
        }
        Ok(self.index + block_length)
    }

    /// Hands everything written so far to `on_ready` and rewinds the cursor.
    pub fn flush(&mut self, on_ready: &mut PacketReadyCallback<'_>) -> Result<(), RtcpError> {
        if self.index == 0 {
            return Err(RtcpError::BufferExhausted);
        }
        if !on_ready(&self.buf[..self.index]) {
            return Err(RtcpError::FlushRejected);
        }
        self.index = 0;
        Ok(())
    }

    /// Checks the cursor landed exactly where [`reserve`](Self::reserve) said.
    pub fn finish_block(&self, index_end: usize) {
        assert_eq!(
            self.index, index_end,
            "RTCP block size accounting is off"
        );
    }

    pub fn put_u8(&mut self, value: u8) {
        byte_io::write_u8(self.buf, self.index, value);
        self.index += 1;
    }

    pub fn put_u16(&mut self, value: u16) {
        byte_io::write_u16(self.buf, self.index, value);
        self.index += 2;
    }

    pub fn put_u24(&mut self, value: u32) {
        byte_io::write_u24(self.buf, self.index, value);
        self.index += 3;
    }

    pub fn put_u32(&mut self, value: u32) {
        byte_io::write_u32(self.buf, self.index, value);
        self.index += 4;
    }

    pub fn put_slice(&mut self, data: &[u8]) {
        self.buf[self.index..self.index + data.len()].copy_from_slice(data);
        self.index += data.len();
    }

    pub fn put_zeros(&mut self, count: usize) {
        self.buf[self.index..self.index + count].fill(0);
        self.index += count;
    }
}

/// One serialized RTCP datagram.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawPacket {
    data: BytesMut,
}

impl RawPacket {
    pub fn from_slice(packet: &[u8]) -> Self {
        Self {
            data: BytesMut::from(packet),
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access, mostly for tests that corrupt packets on purpose.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }
}

/// Runs `create` against a scratch buffer of `max_packet_size` bytes and
/// collects the result, which must fit in a single flush.
pub(crate) fn build_single<F>(max_packet_size: usize, create: F) -> Result<RawPacket, RtcpError>
where
    F: FnOnce(&mut PacketWriter<'_>, &mut PacketReadyCallback<'_>) -> Result<(), RtcpError>,
{
    let mut scratch = vec![0u8; max_packet_size];
    let mut out = BytesMut::new();
    let mut flushes = 0usize;

    let result = {
        let mut collect = |bytes: &[u8]| {
            flushes += 1;
            if flushes > 1 {
                return false;
            }
            out.extend_from_slice(bytes);
            true
        };
        let on_ready: &mut PacketReadyCallback<'_> = &mut collect;
        let mut writer = PacketWriter::new(&mut scratch, max_packet_size);
        create(&mut writer, &mut *on_ready).and_then(|()| writer.flush(on_ready))
    };

    match result {
        Ok(()) => Ok(RawPacket { data: out }),
        Err(RtcpError::FlushRejected) if flushes > 1 => Err(RtcpError::Fragmented),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn reserve_without_pressure_does_not_flush() {
        let mut buf = [0u8; 16];
        let mut w = PacketWriter::new(&mut buf, 16);
        let mut calls = 0;
        let mut cb = |_: &[u8]| {
            calls += 1;
            true
        };
        let end = w.reserve(8, &mut cb).unwrap();
        assert_eq!(end, 8);
        w.put_u32(0xAABB_CCDD);
        w.put_u24(0x11_2233);
        w.put_u8(0x44);
        w.finish_block(end);
        assert_eq!(w.written(), &[0xAA, 0xBB, 0xCC, 0xDD, 0x11, 0x22, 0x33, 0x44]);
        drop(w);
        assert_eq!(calls, 0);
    }

    #[test]
    fn reserve_flushes_pending_bytes_and_rewinds() {
        let mut buf = [0u8; 12];
        let mut w = PacketWriter::new(&mut buf, 12);
        let mut flushed: Vec<Vec<u8>> = Vec::new();
        let mut cb = |b: &[u8]| {
            flushed.push(b.to_vec());
            true
        };

        let end = w.reserve(8, &mut cb).unwrap();
        w.put_u32(1);
        w.put_u32(2);
        w.finish_block(end);

        let end = w.reserve(8, &mut cb).unwrap();
        assert_eq!(end, 8, "second block starts again at the front");
        assert_eq!(w.index(), 0);
        drop(w);
        assert_eq!(flushed, vec![vec![0, 0, 0, 1, 0, 0, 0, 2]]);
    }

    #[test]
    fn block_larger_than_buffer_is_exhausted() {
        let mut buf = [0u8; 8];
        let mut w = PacketWriter::new(&mut buf, 8);
        let mut cb = |_: &[u8]| true;
        assert_eq!(w.reserve(12, &mut cb), Err(RtcpError::BufferExhausted));
    }

    #[test]
    fn rejecting_callback_keeps_cursor() {
        let mut buf = [0u8; 8];
        let mut w = PacketWriter::with_index(&mut buf, 4, 8);
        let mut cb = |_: &[u8]| false;
        assert_eq!(w.reserve(8, &mut cb), Err(RtcpError::FlushRejected));
        assert_eq!(w.index(), 4);
    }

    #[test]
    fn max_length_is_clamped_to_buffer() {
        let mut buf = [0u8; 4];
        let w = PacketWriter::new(&mut buf, 1500);
        assert_eq!(w.max_length(), 4);
        assert_eq!(w.remaining(), 4);
    }

    #[test]
    #[should_panic(expected = "size accounting")]
    fn finish_block_panics_on_mismatch() {
        let mut buf = [0u8; 8];
        let mut w = PacketWriter::new(&mut buf, 8);
        w.put_u16(7);
        w.finish_block(4);
    }

    #[test]
    fn build_single_reports_fragmentation() {
        let res = build_single(8, |w, cb| {
            for _ in 0..2 {
                let end = w.reserve(8, cb)?;
                w.put_zeros(8);
                w.finish_block(end);
            }
            Ok(())
        });
        // The first block is flushed to make room for the second one, and the
        // final flush is a second datagram.
        assert_eq!(res, Err(RtcpError::Fragmented));
    }

    #[test]
    fn build_single_of_nothing_is_exhausted() {
        let res = build_single(8, |_, _| Ok(()));
        assert_eq!(res, Err(RtcpError::BufferExhausted));
    }
}
