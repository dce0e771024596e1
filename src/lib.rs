//! A user-space TCP/IP stack assembled from independently testable
//! components: a bounded byte buffer, an out-of-order reassembler, a
//! windowed/retransmitting TCP sender and receiver, and an ARP-resolving
//! network interface feeding a longest-prefix-match router. Nothing here
//! spawns a thread or blocks; every component advances only when its
//! caller calls into it — `recv_frame`, `send_datagram`, `push`, `tick`,
//! `route` — and each call runs to completion before returning.

mod byte_stream;
mod config;
mod reassembler;
pub mod net;
pub mod router;
pub mod tcp;
mod wrap32;

pub use byte_stream::ByteStream;
pub use config::{NetworkInterfaceConfig, TcpConfig, ARP_ENTRY_VALID_MS, ARP_PENDING_COOLDOWN_MS, MAX_WINDOW_SIZE};
pub use net::{ArpMessage, EtherType, EthernetAddress, EthernetFrame, Ipv4Datagram, NetworkInterface, OutputPort, RecordingPort};
pub use reassembler::Reassembler;
pub use router::Router;
pub use tcp::{TcpFlags, TcpReceiver, TcpReceiverMessage, TcpSender, TcpSenderMessage};
pub use wrap32::Wrap32;
