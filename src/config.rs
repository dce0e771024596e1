//! Per-instance tunables, passed as constructor parameters rather than
//! baked in as process-wide constants, since a library hosts many
//! concurrent senders and interfaces each of which may want its own
//! timeouts.

/// Window advertisement ceiling (§6): a 16-bit window can never exceed this
/// regardless of how much capacity the receive buffer actually has left.
pub const MAX_WINDOW_SIZE: u16 = u16::MAX;

/// Default ARP cache lifetime for a resolved (valid) entry.
pub const ARP_ENTRY_VALID_MS: u64 = 30_000;

/// Default ARP cache lifetime for a pending (unresolved) entry; doubles as
/// the re-request pacing cooldown.
pub const ARP_PENDING_COOLDOWN_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy)]
pub struct TcpConfig {
    /// Initial retransmission timeout, in milliseconds.
    pub initial_rto_ms: u64,
    /// Largest payload a single outgoing segment will carry.
    pub max_payload_size: usize,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            initial_rto_ms: 1000,
            max_payload_size: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NetworkInterfaceConfig {
    /// How long a resolved ARP cache entry stays valid, in milliseconds.
    pub arp_valid_ms: u64,
    /// How long to wait before re-requesting an unresolved next hop.
    pub arp_pending_cooldown_ms: u64,
}

impl Default for NetworkInterfaceConfig {
    fn default() -> Self {
        NetworkInterfaceConfig {
            arp_valid_ms: ARP_ENTRY_VALID_MS,
            arp_pending_cooldown_ms: ARP_PENDING_COOLDOWN_MS,
        }
    }
}
