//! The link/network-layer boundary: wire types, the ARP-resolving
//! `NetworkInterface`, and the `OutputPort` abstraction over the physical
//! link.

pub mod arp;
pub mod interface;
pub mod output_port;
pub mod wire;

pub use interface::NetworkInterface;
pub use output_port::{OutputPort, RecordingPort};
pub use wire::{ArpMessage, EtherType, EthernetAddress, EthernetFrame, Ipv4Datagram};
