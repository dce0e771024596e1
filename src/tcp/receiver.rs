//! Translates inbound wire segments into `(index, data, FIN)` triples fed
//! to a `Reassembler`, and produces the ACK/window/RST advertisement sent
//! back to the peer.

use crate::config::MAX_WINDOW_SIZE;
use crate::reassembler::Reassembler;
use crate::tcp::segment::{TcpReceiverMessage, TcpSenderMessage};
use crate::wrap32::Wrap32;

pub struct TcpReceiver {
    reassembler: Reassembler,
    isn: Option<Wrap32>,
}

impl TcpReceiver {
    pub fn new(reassembler: Reassembler) -> Self {
        TcpReceiver {
            reassembler,
            isn: None,
        }
    }

    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    pub fn reassembler_mut(&mut self) -> &mut Reassembler {
        &mut self.reassembler
    }

    pub fn receive(&mut self, message: TcpSenderMessage) {
        if message.rst() {
            self.reassembler.output_mut().set_error();
            return;
        }
        if message.syn() && self.isn.is_none() {
            self.isn = Some(message.seqno);
        }
        let Some(isn) = self.isn else {
            // No SYN observed yet: nothing can be acked or reassembled.
            return;
        };

        let stream_index = if message.syn() {
            0
        } else {
            let bytes_pushed = self.reassembler.output().bytes_pushed();
            message.seqno.unwrap(isn, bytes_pushed) - 1
        };

        self.reassembler
            .insert(stream_index, &message.payload, message.fin());
    }

    pub fn send(&self) -> TcpReceiverMessage {
        let output = self.reassembler.output();
        let ackno = self.isn.map(|isn| {
            isn + (1 + output.bytes_pushed() + output.is_closed() as u64)
        });
        let window_size = output.available_capacity().min(MAX_WINDOW_SIZE as usize) as u16;
        TcpReceiverMessage {
            ackno,
            window_size,
            rst: output.has_error(),
        }
    }
}
