//! Segments an outbound [`ByteStream`] into wire segments that respect the
//! receiver's advertised window, tracks outstanding (sent, unacked) bytes,
//! and drives a single retransmission timer with exponential backoff.
//!
//! An acknowledgment drops every outstanding segment whose exclusive end
//! falls at or before the acked sequence number; zero-window probing never
//! counts toward the retransmission counter or backoff.

use std::collections::VecDeque;

use crate::byte_stream::ByteStream;
use crate::config::TcpConfig;
use crate::tcp::segment::{TcpFlags, TcpReceiverMessage, TcpSenderMessage};
use crate::tcp::timer::RetransmitTimer;
use crate::wrap32::Wrap32;

pub struct TcpSender {
    input: ByteStream,
    isn: Wrap32,
    config: TcpConfig,
    next_seqno: Wrap32,
    window_size: u16,
    outstanding: VecDeque<TcpSenderMessage>,
    bytes_in_flight: u64,
    consecutive_retransmissions: u32,
    timer: RetransmitTimer,
    syn_sent: bool,
    fin_sent: bool,
    fin_acked: bool,
}

impl TcpSender {
    pub fn new(input: ByteStream, isn: Wrap32, config: TcpConfig) -> Self {
        TcpSender {
            input,
            isn,
            timer: RetransmitTimer::new(config.initial_rto_ms),
            config,
            next_seqno: isn,
            window_size: 1,
            outstanding: VecDeque::new(),
            bytes_in_flight: 0,
            consecutive_retransmissions: 0,
            syn_sent: false,
            fin_sent: false,
            fin_acked: false,
        }
    }

    pub fn input_mut(&mut self) -> &mut ByteStream {
        &mut self.input
    }

    pub fn input(&self) -> &ByteStream {
        &self.input
    }

    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    pub fn consecutive_retransmissions(&self) -> u32 {
        self.consecutive_retransmissions
    }

    pub fn make_empty_message(&self) -> TcpSenderMessage {
        let mut flags = TcpFlags::empty();
        if !self.syn_sent {
            flags |= TcpFlags::SYN;
        }
        if self.input.has_error() {
            flags |= TcpFlags::RST;
        }
        TcpSenderMessage {
            seqno: self.next_seqno,
            payload: Vec::new(),
            flags,
        }
    }

    /// Builds and transmits as many segments as currently fit, calling
    /// `transmit` once per segment in send order.
    pub fn push(&mut self, mut transmit: impl FnMut(&TcpSenderMessage)) {
        loop {
            let syn = !self.syn_sent;
            let window = self.window_size.max(1) as u64;
            let syn_cost = syn as u64;

            let budget_for_payload = window.saturating_sub(self.bytes_in_flight + syn_cost);
            let payload_limit = budget_for_payload.min(self.config.max_payload_size as u64) as usize;

            let available = self.input.peek().len().min(payload_limit);
            let payload = self.input.peek()[..available].to_vec();
            self.input.pop(available);

            let room_left = window.saturating_sub(self.bytes_in_flight);
            let mut flags = TcpFlags::empty();
            if syn {
                flags |= TcpFlags::SYN;
            }
            if self.input.has_error() {
                flags |= TcpFlags::RST;
            }

            let mut sequence_length = payload.len() as u64 + syn_cost;
            let wants_fin = self.input.is_finished() && !self.fin_sent;
            if wants_fin && sequence_length + 1 <= room_left {
                flags |= TcpFlags::FIN;
                sequence_length += 1;
            }

            if sequence_length == 0 {
                break;
            }
            if sequence_length > room_left {
                break;
            }

            let message = TcpSenderMessage {
                seqno: self.next_seqno,
                payload,
                flags,
            };
            transmit(&message);

            self.bytes_in_flight += sequence_length;
            self.next_seqno += sequence_length;
            if syn {
                self.syn_sent = true;
            }
            if flags.contains(TcpFlags::FIN) {
                self.fin_sent = true;
            }
            self.outstanding.push_back(message);
            self.timer.start();

            let more_payload_buffered = self.input.bytes_buffered() > 0;
            let fin_still_pending_with_room =
                self.input.is_finished() && !self.fin_sent && self.bytes_in_flight < window;
            if !more_payload_buffered && !fin_still_pending_with_room {
                break;
            }
        }
    }

    pub fn receive(&mut self, msg: TcpReceiverMessage) {
        self.window_size = msg.window_size;
        if msg.rst {
            self.input.set_error();
        }

        let Some(ackno) = msg.ackno else { return };
        let bytes_popped = self.input.bytes_popped();
        let a = ackno.unwrap(self.isn, bytes_popped);
        let s_abs = self.next_seqno.unwrap(self.isn, bytes_popped);
        if a > s_abs {
            // Cannot ack data that hasn't been sent yet; ignore.
            return;
        }

        let mut dropped_any = false;
        while let Some(front) = self.outstanding.front() {
            let front_abs = front.seqno.unwrap(self.isn, bytes_popped);
            let exclusive_end = front_abs + front.sequence_length();
            if exclusive_end <= a {
                if front.fin() {
                    self.fin_acked = true;
                }
                self.bytes_in_flight -= front.sequence_length();
                self.outstanding.pop_front();
                dropped_any = true;
            } else {
                break;
            }
        }

        if dropped_any {
            self.timer.set_threshold_ms(self.config.initial_rto_ms);
            self.consecutive_retransmissions = 0;
            if self.outstanding.is_empty() {
                self.timer.stop();
            } else {
                self.timer.reset();
            }
        }
    }

    pub fn tick(&mut self, dt_ms: u64, mut transmit: impl FnMut(&TcpSenderMessage)) {
        if self.fin_acked {
            return;
        }
        self.timer.tick(dt_ms);
        if self.timer.is_expired() {
            if let Some(front) = self.outstanding.front() {
                transmit(front);
            }
            if self.window_size > 0 {
                self.consecutive_retransmissions += 1;
                self.timer.double_threshold();
            }
            self.timer.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender_with_isn(isn: u32) -> TcpSender {
        TcpSender::new(ByteStream::new(1 << 16), Wrap32::new(isn), TcpConfig::default())
    }

    #[test]
    fn syn_data_and_fin_respect_a_tight_window() {
        let mut s = sender_with_isn(0);
        s.input_mut().push(b"hello");
        s.input_mut().close();

        // Window starts at 4: enough for SYN + 3 payload bytes.
        s.receive(TcpReceiverMessage {
            ackno: None,
            window_size: 4,
            rst: false,
        });

        let mut sent = Vec::new();
        s.push(|m| sent.push(m.clone()));
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].seqno, Wrap32::new(0));
        assert!(sent[0].syn());
        assert_eq!(sent[0].payload, b"hel");
        assert_eq!(sent[0].sequence_length(), 4);

        // Ack the SYN+"hel" segment; window narrows to 2 so FIN can't ride
        // along with the remaining 2 bytes.
        s.receive(TcpReceiverMessage {
            ackno: Some(Wrap32::new(4)),
            window_size: 2,
            rst: false,
        });
        sent.clear();
        s.push(|m| sent.push(m.clone()));
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].seqno, Wrap32::new(4));
        assert_eq!(sent[0].payload, b"lo");
        assert!(!sent[0].fin());

        // Ack that segment too, with room to spare; the held-back FIN goes out alone.
        s.receive(TcpReceiverMessage {
            ackno: Some(Wrap32::new(6)),
            window_size: 4,
            rst: false,
        });
        sent.clear();
        s.push(|m| sent.push(m.clone()));
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].seqno, Wrap32::new(6));
        assert!(sent[0].fin());
        assert!(sent[0].payload.is_empty());
    }

    #[test]
    fn retransmission_backs_off_exponentially() {
        let mut s = sender_with_isn(0);
        s.input_mut().push(b"x");
        s.receive(TcpReceiverMessage {
            ackno: None,
            window_size: 10,
            rst: false,
        });

        let mut transmits = 0;
        s.push(|_| transmits += 1);
        assert_eq!(transmits, 1);

        let mut retransmits = Vec::new();
        s.tick(999, |m| retransmits.push(m.clone()));
        assert!(retransmits.is_empty());
        assert_eq!(s.consecutive_retransmissions(), 0);

        s.tick(1, |m| retransmits.push(m.clone()));
        assert_eq!(retransmits.len(), 1);
        assert_eq!(s.consecutive_retransmissions(), 1);

        s.tick(2000, |m| retransmits.push(m.clone()));
        assert_eq!(retransmits.len(), 2);
        assert_eq!(s.consecutive_retransmissions(), 2);

        // Ack the outstanding segment (SYN + 1 byte): timer stops, counters reset.
        s.receive(TcpReceiverMessage {
            ackno: Some(Wrap32::new(2)),
            window_size: 10,
            rst: false,
        });
        assert_eq!(s.consecutive_retransmissions(), 0);
        assert_eq!(s.sequence_numbers_in_flight(), 0);

        retransmits.clear();
        s.tick(10_000, |m| retransmits.push(m.clone()));
        assert!(retransmits.is_empty());
    }

    #[test]
    fn zero_window_probes_without_backoff() {
        let mut s = sender_with_isn(0);
        s.input_mut().push(b"z");
        s.receive(TcpReceiverMessage {
            ackno: None,
            window_size: 0,
            rst: false,
        });
        s.push(|_| {});
        assert_eq!(s.sequence_numbers_in_flight(), 1);

        s.tick(1000, |_| {});
        assert_eq!(s.consecutive_retransmissions(), 0);
    }

    #[test]
    fn peer_rst_sets_input_error() {
        let mut s = sender_with_isn(0);
        s.receive(TcpReceiverMessage {
            ackno: None,
            window_size: 10,
            rst: true,
        });
        assert!(s.input().has_error());
    }
}
