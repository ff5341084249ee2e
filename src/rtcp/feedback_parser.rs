use std::sync::Arc;

use crate::{
    log::log_sink::LogSink,
    rtcp::{common_header::CommonHeader, config::HEADER_LENGTH, rtcp::RtcpPacket},
    sink_debug, sink_warn,
};

/// Receive-side front end: walks a compound datagram and keeps every block
/// that decodes, logging and dropping the rest.
///
/// A bad header ends the walk since the next block boundary is unknown; a bad
/// block body only costs that block.
#[derive(Clone)]
pub struct FeedbackParser {
    log: Arc<dyn LogSink>,
}

impl FeedbackParser {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }

    pub fn parse(&self, buf: &[u8]) -> Vec<RtcpPacket> {
        let mut out = Vec::new();
        let mut idx = 0usize;
        while idx < buf.len() {
            if buf.len() - idx < HEADER_LENGTH {
                sink_warn!(
                    self.log,
                    "[RTCP] dropping {} trailing bytes at offset {}",
                    buf.len() - idx,
                    idx
                );
                break;
            }
            let hdr = match CommonHeader::parse(&buf[idx..]) {
                Ok(hdr) => hdr,
                Err(e) => {
                    sink_warn!(self.log, "[RTCP] {} at offset {}, dropping rest", e, idx);
                    break;
                }
            };
            let total = hdr.block_size();
            match RtcpPacket::decode(&hdr, &buf[idx..idx + total]) {
                Ok(pkt) => {
                    sink_debug!(
                        self.log,
                        "[RTCP] decoded {:?} ({} bytes) at offset {}",
                        pkt.kind(),
                        total,
                        idx
                    );
                    out.push(pkt);
                }
                Err(e) => {
                    sink_warn!(
                        self.log,
                        "[RTCP] dropping pt={} fmt={} block: {}",
                        hdr.pt(),
                        hdr.rc_or_fmt(),
                        e
                    );
                }
            }
            idx += total;
        }
        out
    }
}
