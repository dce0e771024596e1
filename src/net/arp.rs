//! The ARP cache kept by a `NetworkInterface`: resolved address entries that
//! expire after a validity window, plus a cooldown that suppresses repeated
//! ARP requests for the same unresolved next hop.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use crate::config::NetworkInterfaceConfig;
use crate::net::wire::EthernetAddress;

enum CacheEntry {
    Resolved { eth: EthernetAddress, resolved_at_ms: u64 },
    RequestSent { at_ms: u64 },
}

pub struct ArpCache {
    config: NetworkInterfaceConfig,
    entries: HashMap<Ipv4Addr, CacheEntry>,
}

impl ArpCache {
    pub fn new(config: NetworkInterfaceConfig) -> Self {
        ArpCache {
            config,
            entries: HashMap::new(),
        }
    }

    /// Looks up a resolved, unexpired hardware address for `ip`.
    pub fn lookup(&self, ip: Ipv4Addr, now_ms: u64) -> Option<EthernetAddress> {
        match self.entries.get(&ip)? {
            CacheEntry::Resolved { eth, resolved_at_ms } if now_ms - resolved_at_ms < self.config.arp_valid_ms => {
                Some(*eth)
            }
            _ => None,
        }
    }

    /// Whether a request for `ip` may be sent right now: true if there is no
    /// entry, or the existing request/resolution has aged past its window.
    pub fn may_request(&self, ip: Ipv4Addr, now_ms: u64) -> bool {
        match self.entries.get(&ip) {
            None => true,
            Some(CacheEntry::Resolved { resolved_at_ms, .. }) => now_ms - resolved_at_ms >= self.config.arp_valid_ms,
            Some(CacheEntry::RequestSent { at_ms }) => now_ms - at_ms >= self.config.arp_pending_cooldown_ms,
        }
    }

    pub fn record_request_sent(&mut self, ip: Ipv4Addr, now_ms: u64) {
        self.entries.insert(ip, CacheEntry::RequestSent { at_ms: now_ms });
    }

    pub fn record_resolved(&mut self, ip: Ipv4Addr, eth: EthernetAddress, now_ms: u64) {
        self.entries.insert(
            ip,
            CacheEntry::Resolved {
                eth,
                resolved_at_ms: now_ms,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETH: EthernetAddress = [1, 2, 3, 4, 5, 6];
    const IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

    #[test]
    fn unresolved_entry_is_not_looked_up() {
        let config = NetworkInterfaceConfig::default();
        let mut cache = ArpCache::new(config);
        assert!(cache.lookup(IP, 0).is_none());
        assert!(cache.may_request(IP, 0));
        cache.record_request_sent(IP, 0);
        assert!(!cache.may_request(IP, 100));
        assert!(cache.may_request(IP, config.arp_pending_cooldown_ms));
    }

    #[test]
    fn resolved_entry_expires_after_validity_window() {
        let config = NetworkInterfaceConfig::default();
        let mut cache = ArpCache::new(config);
        cache.record_resolved(IP, ETH, 1_000);
        assert_eq!(cache.lookup(IP, 1_000), Some(ETH));
        assert_eq!(cache.lookup(IP, 1_000 + config.arp_valid_ms - 1), Some(ETH));
        assert_eq!(cache.lookup(IP, 1_000 + config.arp_valid_ms), None);
        assert!(cache.may_request(IP, 1_000 + config.arp_valid_ms));
    }
}
