//! Wire types exchanged between a `TCPSender` and a `TCPReceiver`: the
//! sender-to-receiver segment and the receiver-to-sender acknowledgment.

use crate::wrap32::Wrap32;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TcpFlags: u8 {
        const SYN = 0b001;
        const FIN = 0b010;
        const RST = 0b100;
    }
}

/// A segment sent from a `TCPSender` towards its peer's `TCPReceiver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpSenderMessage {
    pub seqno: Wrap32,
    pub payload: Vec<u8>,
    pub flags: TcpFlags,
}

impl TcpSenderMessage {
    pub fn syn(&self) -> bool {
        self.flags.contains(TcpFlags::SYN)
    }

    pub fn fin(&self) -> bool {
        self.flags.contains(TcpFlags::FIN)
    }

    pub fn rst(&self) -> bool {
        self.flags.contains(TcpFlags::RST)
    }

    /// SYN and FIN each occupy one sequence number, in addition to the payload.
    pub fn sequence_length(&self) -> u64 {
        self.payload.len() as u64 + self.syn() as u64 + self.fin() as u64
    }
}

/// The symmetric message a `TCPReceiver` sends back: an optional cumulative
/// ack, the advertised window, and whether the stream has errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpReceiverMessage {
    pub ackno: Option<Wrap32>,
    pub window_size: u16,
    pub rst: bool,
}
