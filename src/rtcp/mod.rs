pub mod byte_io;
pub mod common_header;
pub mod config;
pub mod feedback;
pub mod feedback_parser;
pub mod fir;
pub mod packet_builder;
pub mod packet_type;
pub mod picture_loss;
pub mod rpsi;
#[allow(clippy::module_inception)]
pub mod rtcp;
pub mod rtcp_error;

pub use common_header::CommonHeader;
pub use config::RtcpSettings;
pub use feedback::FeedbackCommon;
pub use feedback_parser::FeedbackParser;
pub use fir::{Fir, FirRequest};
pub use packet_builder::{PacketReadyCallback, PacketWriter, RawPacket};
pub use packet_type::RtcpPacketType;
pub use picture_loss::PictureLossIndication;
pub use rpsi::Rpsi;
pub use rtcp::{FeedbackKind, RtcpPacket, UnknownBlock};
pub use rtcp_error::RtcpError;
