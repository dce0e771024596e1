//! Converts between an attached IP address (used for sending/receiving IP
//! datagrams) and an Ethernet address (used to get the datagram across a
//! link by sending an Ethernet frame). Resolves the mapping via ARP,
//! queuing datagrams that cannot yet be sent until a reply arrives.

use std::collections::VecDeque;
use std::net::Ipv4Addr;

use log::{debug, trace};

use crate::config::NetworkInterfaceConfig;
use crate::net::arp::ArpCache;
use crate::net::output_port::OutputPort;
use crate::net::wire::{
    ArpMessage, EtherType, EthernetAddress, EthernetFrame, Ipv4Datagram, ARP_OPCODE_REPLY, ARP_OPCODE_REQUEST,
    ETHERNET_BROADCAST,
};

struct PendingDatagram {
    next_hop: Ipv4Addr,
    datagram: Ipv4Datagram,
}

pub struct NetworkInterface {
    ethernet_address: EthernetAddress,
    ip_address: Ipv4Addr,
    arp_cache: ArpCache,
    pending: Vec<PendingDatagram>,
    datagrams_received: VecDeque<Ipv4Datagram>,
    now_ms: u64,
}

impl NetworkInterface {
    pub fn new(ethernet_address: EthernetAddress, ip_address: Ipv4Addr, config: NetworkInterfaceConfig) -> Self {
        assert!(
            ethernet_address != ETHERNET_BROADCAST,
            "an interface's own Ethernet address cannot be the broadcast address"
        );
        NetworkInterface {
            ethernet_address,
            ip_address,
            arp_cache: ArpCache::new(config),
            pending: Vec::new(),
            datagrams_received: VecDeque::new(),
            now_ms: 0,
        }
    }

    pub fn ethernet_address(&self) -> EthernetAddress {
        self.ethernet_address
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.ip_address
    }

    /// Sends `datagram` to `next_hop`, resolving its Ethernet address via
    /// ARP first if necessary. If the mapping isn't known yet, the
    /// datagram is queued and an ARP request is broadcast, unless a
    /// request for the same next hop was sent too recently.
    pub fn send_datagram(&mut self, datagram: Ipv4Datagram, next_hop: Ipv4Addr, port: &mut impl OutputPort) {
        if let Some(eth) = self.arp_cache.lookup(next_hop, self.now_ms) {
            let frame = EthernetFrame::new(eth, self.ethernet_address, EtherType::Ipv4, datagram.to_bytes());
            port.transmit(frame);
            return;
        }

        trace!(target: "net::interface", "queuing datagram for unresolved next hop {next_hop}");
        self.pending.push(PendingDatagram { next_hop, datagram });

        if self.arp_cache.may_request(next_hop, self.now_ms) {
            let request = ArpMessage {
                opcode: ARP_OPCODE_REQUEST,
                sender_eth: self.ethernet_address,
                sender_ip: self.ip_address,
                target_eth: [0; 6],
                target_ip: next_hop,
            };
            let frame = EthernetFrame::new(ETHERNET_BROADCAST, self.ethernet_address, EtherType::Arp, request.to_bytes());
            port.transmit(frame);
            self.arp_cache.record_request_sent(next_hop, self.now_ms);
        }
    }

    /// Handles an inbound frame, dispatching disjointly on ethertype so an
    /// IPv4 frame is never mistaken for an ARP message or vice versa.
    pub fn recv_frame(&mut self, frame: EthernetFrame, port: &mut impl OutputPort) {
        let addressed_to_us = frame.dst == self.ethernet_address;
        let addressed_to_broadcast = frame.dst == ETHERNET_BROADCAST;
        if !addressed_to_us && !addressed_to_broadcast {
            return;
        }

        match EtherType::from_raw(frame.ethertype) {
            Some(EtherType::Ipv4) => {
                if let Some(datagram) = Ipv4Datagram::from_bytes(&frame.payload) {
                    self.datagrams_received.push_back(datagram);
                }
            }
            Some(EtherType::Arp) => {
                let Some(arp) = ArpMessage::from_bytes(&frame.payload) else {
                    return;
                };
                self.arp_cache.record_resolved(arp.sender_ip, arp.sender_eth, self.now_ms);
                self.flush_pending_for(arp.sender_ip, port);

                if arp.opcode == ARP_OPCODE_REQUEST && arp.target_ip == self.ip_address {
                    let reply = ArpMessage {
                        opcode: ARP_OPCODE_REPLY,
                        sender_eth: self.ethernet_address,
                        sender_ip: self.ip_address,
                        target_eth: arp.sender_eth,
                        target_ip: arp.sender_ip,
                    };
                    let frame = EthernetFrame::new(arp.sender_eth, self.ethernet_address, EtherType::Arp, reply.to_bytes());
                    port.transmit(frame);
                }
            }
            None => {
                debug!(target: "net::interface", "dropping frame with unknown ethertype {:#06x}", frame.ethertype);
            }
        }
    }

    /// Advances this interface's clock, used only for ARP cache aging.
    pub fn tick(&mut self, dt_ms: u64) {
        self.now_ms += dt_ms;
    }

    /// Drains all datagrams received and not yet consumed by the caller.
    pub fn pop_received_datagram(&mut self) -> Option<Ipv4Datagram> {
        self.datagrams_received.pop_front()
    }

    fn flush_pending_for(&mut self, next_hop: Ipv4Addr, port: &mut impl OutputPort) {
        let Some(eth) = self.arp_cache.lookup(next_hop, self.now_ms) else {
            return;
        };
        let (ready, rest): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.next_hop == next_hop);
        self.pending = rest;
        for p in ready {
            let frame = EthernetFrame::new(eth, self.ethernet_address, EtherType::Ipv4, p.datagram.to_bytes());
            port.transmit(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::output_port::RecordingPort;

    fn eth(n: u8) -> EthernetAddress {
        [n; 6]
    }

    fn new_interface(ethernet_address: EthernetAddress, ip_address: Ipv4Addr) -> NetworkInterface {
        NetworkInterface::new(ethernet_address, ip_address, NetworkInterfaceConfig::default())
    }

    #[test]
    fn unresolved_next_hop_triggers_single_arp_request_and_queues_datagram() {
        let mut iface = new_interface(eth(1), Ipv4Addr::new(10, 0, 0, 1));
        let mut port = RecordingPort::new();
        let dgram = Ipv4Datagram::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2), 64, b"hi".to_vec());

        iface.send_datagram(dgram, Ipv4Addr::new(10, 0, 0, 2), &mut port);
        assert_eq!(port.frames.len(), 1);
        assert_eq!(port.frames[0].ethertype, EtherType::Arp.raw());
        assert_eq!(port.frames[0].dst, ETHERNET_BROADCAST);

        // A second send before the cooldown elapses must not re-request.
        let dgram2 = Ipv4Datagram::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2), 64, b"again".to_vec());
        iface.send_datagram(dgram2, Ipv4Addr::new(10, 0, 0, 2), &mut port);
        assert_eq!(port.frames.len(), 1);
    }

    #[test]
    fn arp_reply_resolves_and_flushes_queued_datagrams() {
        let mut iface = new_interface(eth(1), Ipv4Addr::new(10, 0, 0, 1));
        let mut port = RecordingPort::new();
        let dgram = Ipv4Datagram::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2), 64, b"hi".to_vec());
        iface.send_datagram(dgram, Ipv4Addr::new(10, 0, 0, 2), &mut port);
        port.frames.clear();

        let reply = ArpMessage {
            opcode: ARP_OPCODE_REPLY,
            sender_eth: eth(2),
            sender_ip: Ipv4Addr::new(10, 0, 0, 2),
            target_eth: eth(1),
            target_ip: Ipv4Addr::new(10, 0, 0, 1),
        };
        let frame = EthernetFrame::new(eth(1), eth(2), EtherType::Arp, reply.to_bytes());
        iface.recv_frame(frame, &mut port);

        assert_eq!(port.frames.len(), 1);
        assert_eq!(port.frames[0].dst, eth(2));
        assert_eq!(port.frames[0].ethertype, EtherType::Ipv4.raw());

        // Now resolved, a new datagram to the same next hop goes out immediately.
        let dgram2 = Ipv4Datagram::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2), 64, b"now".to_vec());
        iface.send_datagram(dgram2, Ipv4Addr::new(10, 0, 0, 2), &mut port);
        assert_eq!(port.frames.len(), 2);
    }

    #[test]
    fn arp_request_for_us_gets_a_reply_and_learns_the_requester() {
        let mut iface = new_interface(eth(1), Ipv4Addr::new(10, 0, 0, 1));
        let mut port = RecordingPort::new();
        let request = ArpMessage {
            opcode: ARP_OPCODE_REQUEST,
            sender_eth: eth(9),
            sender_ip: Ipv4Addr::new(10, 0, 0, 9),
            target_eth: [0; 6],
            target_ip: Ipv4Addr::new(10, 0, 0, 1),
        };
        let frame = EthernetFrame::new(ETHERNET_BROADCAST, eth(9), EtherType::Arp, request.to_bytes());
        iface.recv_frame(frame, &mut port);

        assert_eq!(port.frames.len(), 1);
        let reply = ArpMessage::from_bytes(&port.frames[0].payload).unwrap();
        assert_eq!(reply.opcode, ARP_OPCODE_REPLY);
        assert_eq!(reply.sender_eth, eth(1));
        assert_eq!(reply.target_eth, eth(9));
    }

    #[test]
    fn ipv4_frame_not_addressed_to_us_is_dropped() {
        let mut iface = new_interface(eth(1), Ipv4Addr::new(10, 0, 0, 1));
        let mut port = RecordingPort::new();
        let dgram = Ipv4Datagram::new(Ipv4Addr::new(10, 0, 0, 9), Ipv4Addr::new(10, 0, 0, 1), 64, b"x".to_vec());
        let frame = EthernetFrame::new(eth(2), eth(9), EtherType::Ipv4, dgram.to_bytes());
        iface.recv_frame(frame, &mut port);
        assert!(iface.pop_received_datagram().is_none());
    }

    #[test]
    fn ipv4_frame_addressed_to_broadcast_is_accepted() {
        let mut iface = new_interface(eth(1), Ipv4Addr::new(10, 0, 0, 1));
        let mut port = RecordingPort::new();
        let dgram = Ipv4Datagram::new(Ipv4Addr::new(10, 0, 0, 9), Ipv4Addr::new(255, 255, 255, 255), 64, b"x".to_vec());
        let frame = EthernetFrame::new(ETHERNET_BROADCAST, eth(9), EtherType::Ipv4, dgram.to_bytes());
        iface.recv_frame(frame, &mut port);
        assert!(iface.pop_received_datagram().is_some());
    }

    #[test]
    #[should_panic]
    fn constructing_with_broadcast_as_own_address_panics() {
        new_interface(ETHERNET_BROADCAST, Ipv4Addr::new(10, 0, 0, 1));
    }
}
