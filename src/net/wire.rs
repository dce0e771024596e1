//! Thin Ethernet/ARP/IPv4 representations. These types carry no
//! reassembly/routing logic of their own — just enough encode/decode to
//! let `NetworkInterface` and `Router` exchange real bytes. IPv4 header
//! handling reuses `etherparse::Ipv4Header`.

use std::net::Ipv4Addr;

use etherparse::{IpNumber, Ipv4Header, Ipv4HeaderSlice};

pub type EthernetAddress = [u8; 6];

pub const ETHERNET_BROADCAST: EthernetAddress = [0xff; 6];
pub const ZERO_ETHERNET_ADDRESS: EthernetAddress = [0; 6];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    Ipv4,
    Arp,
}

impl EtherType {
    pub const IPV4_RAW: u16 = 0x0800;
    pub const ARP_RAW: u16 = 0x0806;

    pub fn from_raw(raw: u16) -> Option<EtherType> {
        match raw {
            Self::IPV4_RAW => Some(EtherType::Ipv4),
            Self::ARP_RAW => Some(EtherType::Arp),
            _ => None,
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            EtherType::Ipv4 => Self::IPV4_RAW,
            EtherType::Arp => Self::ARP_RAW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    pub dst: EthernetAddress,
    pub src: EthernetAddress,
    pub ethertype: u16,
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    pub fn new(dst: EthernetAddress, src: EthernetAddress, ethertype: EtherType, payload: Vec<u8>) -> Self {
        EthernetFrame {
            dst,
            src,
            ethertype: ethertype.raw(),
            payload,
        }
    }
}

pub const ARP_OPCODE_REQUEST: u16 = 1;
pub const ARP_OPCODE_REPLY: u16 = 2;
const ARP_HARDWARE_TYPE_ETHERNET: u16 = 1;
const ARP_PROTOCOL_TYPE_IPV4: u16 = EtherType::IPV4_RAW;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpMessage {
    pub opcode: u16,
    pub sender_eth: EthernetAddress,
    pub sender_ip: Ipv4Addr,
    pub target_eth: EthernetAddress,
    pub target_ip: Ipv4Addr,
}

impl ArpMessage {
    pub const WIRE_LEN: usize = 28;

    pub fn to_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.extend_from_slice(&ARP_HARDWARE_TYPE_ETHERNET.to_be_bytes());
        out.extend_from_slice(&ARP_PROTOCOL_TYPE_IPV4.to_be_bytes());
        out.push(6); // hardware address length
        out.push(4); // protocol address length
        out.extend_from_slice(&self.opcode.to_be_bytes());
        out.extend_from_slice(&self.sender_eth);
        out.extend_from_slice(&self.sender_ip.octets());
        out.extend_from_slice(&self.target_eth);
        out.extend_from_slice(&self.target_ip.octets());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<ArpMessage> {
        if bytes.len() < Self::WIRE_LEN {
            return None;
        }
        let hw_type = u16::from_be_bytes([bytes[0], bytes[1]]);
        let proto_type = u16::from_be_bytes([bytes[2], bytes[3]]);
        if hw_type != ARP_HARDWARE_TYPE_ETHERNET || proto_type != ARP_PROTOCOL_TYPE_IPV4 {
            return None;
        }
        let opcode = u16::from_be_bytes([bytes[6], bytes[7]]);
        let mut sender_eth = [0u8; 6];
        sender_eth.copy_from_slice(&bytes[8..14]);
        let sender_ip = Ipv4Addr::new(bytes[14], bytes[15], bytes[16], bytes[17]);
        let mut target_eth = [0u8; 6];
        target_eth.copy_from_slice(&bytes[18..24]);
        let target_ip = Ipv4Addr::new(bytes[24], bytes[25], bytes[26], bytes[27]);
        Some(ArpMessage {
            opcode,
            sender_eth,
            sender_ip,
            target_eth,
            target_ip,
        })
    }
}

/// An IPv4 datagram: a header (owned, mutable so `Router` can decrement TTL
/// and recompute the checksum) plus an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Datagram {
    pub header: Ipv4Header,
    pub payload: Vec<u8>,
}

impl Ipv4Datagram {
    pub fn new(source: Ipv4Addr, destination: Ipv4Addr, ttl: u8, payload: Vec<u8>) -> Self {
        let header = Ipv4Header::new(payload.len() as u16, ttl, IpNumber::TCP, source.octets(), destination.octets())
            .expect("payload length fits in an IPv4 header");
        Ipv4Datagram { header, payload }
    }

    pub fn source(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.header.source)
    }

    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.header.destination)
    }

    pub fn ttl(&self) -> u8 {
        self.header.time_to_live
    }

    /// Decrements TTL by one and recomputes the header checksum. Returns
    /// `false` (and leaves TTL at zero) if the datagram expired and should
    /// be dropped rather than forwarded.
    pub fn decrement_ttl_and_recompute_checksum(&mut self) -> bool {
        if self.header.time_to_live == 0 {
            return false;
        }
        self.header.time_to_live -= 1;
        if self.header.time_to_live == 0 {
            return false;
        }
        self.header.header_checksum = self.header.calc_header_checksum();
        true
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header.header_len() + self.payload.len());
        self.header
            .write(&mut out)
            .expect("writing to a Vec<u8> cannot fail");
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Ipv4Datagram> {
        let slice = Ipv4HeaderSlice::from_slice(bytes).ok()?;
        let header_len = slice.slice().len();
        let header = slice.to_header();
        let payload = bytes[header_len..].to_vec();
        Some(Ipv4Datagram { header, payload })
    }
}
