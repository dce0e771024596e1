//! The physical transmit side of a `NetworkInterface`, abstracted as a
//! trait so `NetworkInterface`/`Router` can be exercised without a real
//! network device.

use crate::net::wire::EthernetFrame;

pub trait OutputPort {
    fn transmit(&mut self, frame: EthernetFrame);
}

/// A test double that records every frame handed to it instead of sending
/// it anywhere.
#[derive(Debug, Default)]
pub struct RecordingPort {
    pub frames: Vec<EthernetFrame>,
}

impl RecordingPort {
    pub fn new() -> Self {
        RecordingPort::default()
    }
}

impl OutputPort for RecordingPort {
    fn transmit(&mut self, frame: EthernetFrame) {
        self.frames.push(frame);
    }
}
