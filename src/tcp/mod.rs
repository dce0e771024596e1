//! The transport layer: segmenting a byte stream into sized, windowed,
//! retransmitted wire segments (`sender`) and reassembling inbound
//! segments back into a byte stream while producing ACKs (`receiver`).

pub mod receiver;
pub mod segment;
pub mod sender;
pub mod timer;

pub use receiver::TcpReceiver;
pub use segment::{TcpFlags, TcpReceiverMessage, TcpSenderMessage};
pub use sender::TcpSender;
