//! Longest-prefix-match IP forwarding across a fixed set of attached
//! interfaces.

use std::net::Ipv4Addr;

use log::{trace, warn};

use crate::net::output_port::OutputPort;
use crate::net::{Ipv4Datagram, NetworkInterface};

struct Route {
    route_prefix: Ipv4Addr,
    prefix_length: u8,
    next_hop: Option<Ipv4Addr>,
    interface_num: usize,
}

impl Route {
    fn matches(&self, destination: Ipv4Addr) -> bool {
        if self.prefix_length == 0 {
            return true;
        }
        let mask = !0u32 << (32 - self.prefix_length as u32);
        let dest_bits = u32::from(destination) & mask;
        let route_bits = u32::from(self.route_prefix) & mask;
        dest_bits == route_bits
    }
}

pub struct Router<P: OutputPort> {
    interfaces: Vec<(NetworkInterface, P)>,
    routes: Vec<Route>,
}

impl<P: OutputPort> Router<P> {
    pub fn new() -> Self {
        Router {
            interfaces: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn add_interface(&mut self, interface: NetworkInterface, port: P) -> usize {
        self.interfaces.push((interface, port));
        self.interfaces.len() - 1
    }

    pub fn interface(&self, interface_num: usize) -> &NetworkInterface {
        &self.interfaces[interface_num].0
    }

    pub fn interface_mut(&mut self, interface_num: usize) -> &mut NetworkInterface {
        &mut self.interfaces[interface_num].0
    }

    pub fn add_route(&mut self, route_prefix: Ipv4Addr, prefix_length: u8, next_hop: Option<Ipv4Addr>, interface_num: usize) {
        assert!(prefix_length <= 32, "route prefix length {prefix_length} exceeds 32 bits");
        self.routes.push(Route {
            route_prefix,
            prefix_length,
            next_hop,
            interface_num,
        });
    }

    /// The first route of maximal `prefix_length` matching `destination`,
    /// preferring earlier-added routes among ties.
    fn longest_prefix_match(&self, destination: Ipv4Addr) -> Option<&Route> {
        let mut best: Option<&Route> = None;
        for route in &self.routes {
            if !route.matches(destination) {
                continue;
            }
            let replace = match best {
                None => true,
                Some(b) => route.prefix_length > b.prefix_length,
            };
            if replace {
                best = Some(route);
            }
        }
        best
    }

    /// Pops one received datagram from every attached interface and
    /// forwards it according to the longest matching route, decrementing
    /// TTL and recomputing the checksum. Datagrams with no matching route,
    /// or whose TTL reaches zero, are dropped.
    pub fn route(&mut self) {
        for i in 0..self.interfaces.len() {
            while let Some(datagram) = self.interfaces[i].0.pop_received_datagram() {
                self.forward(datagram);
            }
        }
    }

    fn forward(&mut self, mut datagram: Ipv4Datagram) {
        let Some(route) = self.longest_prefix_match(datagram.destination()) else {
            warn!(target: "router", "no route for {}", datagram.destination());
            return;
        };
        let next_hop = route.next_hop.unwrap_or_else(|| datagram.destination());
        let interface_num = route.interface_num;

        if !datagram.decrement_ttl_and_recompute_checksum() {
            trace!(target: "router", "dropping expired datagram to {}", datagram.destination());
            return;
        }

        let (interface, port) = &mut self.interfaces[interface_num];
        interface.send_datagram(datagram, next_hop, port);
    }
}

impl<P: OutputPort> Default for Router<P> {
    fn default() -> Self {
        Router::new()
    }
}
