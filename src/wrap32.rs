//! Bijective mapping between 64-bit absolute stream indices and the 32-bit
//! sequence numbers that actually travel on the wire.
//!
//! TCP sequence numbers wrap around every 2^32 bytes, but the rest of the
//! stack (ByteStream, Reassembler) wants to reason about an absolute 64-bit
//! index that never wraps. `Wrap32` is the type that lives on the wire;
//! `unwrap` recovers the absolute index nearest a known checkpoint.

use std::fmt;

/// A 32-bit value interpreted modulo 2^32, e.g. a raw TCP sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wrap32 {
    raw: u32,
}

impl Wrap32 {
    pub const fn new(raw: u32) -> Self {
        Wrap32 { raw }
    }

    pub const fn raw_value(self) -> u32 {
        self.raw
    }

    /// `zero_point + (n mod 2^32)`.
    pub fn wrap(n: u64, zero_point: Wrap32) -> Wrap32 {
        Wrap32::new(zero_point.raw.wrapping_add(n as u32))
    }

    /// The absolute 64-bit index `x` such that `Wrap32::wrap(x, zero_point) ==
    /// self` and `|x - checkpoint|` is minimized. Ties favor the smaller `x`.
    pub fn unwrap(self, zero_point: Wrap32, checkpoint: u64) -> u64 {
        let offset = self.raw.wrapping_sub(zero_point.raw) as u64;
        let checkpoint_head = checkpoint & !(u32::MAX as u64);

        let mut best: Option<u64> = None;
        for k in [-1i64, 0, 1] {
            let candidate = match k {
                -1 => checkpoint_head.checked_sub(1u64 << 32),
                0 => Some(checkpoint_head),
                1 => checkpoint_head.checked_add(1u64 << 32),
                _ => unreachable!(),
            };
            let Some(base) = candidate else { continue };
            let candidate = base + offset;
            let diff = checkpoint.abs_diff(candidate);
            best = match best {
                None => Some(candidate),
                Some(b) => {
                    let best_diff = checkpoint.abs_diff(b);
                    if diff < best_diff || (diff == best_diff && candidate < b) {
                        Some(candidate)
                    } else {
                        Some(b)
                    }
                }
            };
        }
        best.expect("at least the k=0 candidate is always present")
    }
}

impl fmt::Display for Wrap32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl std::ops::Add<u64> for Wrap32 {
    type Output = Wrap32;
    fn add(self, rhs: u64) -> Wrap32 {
        Wrap32::new(self.raw.wrapping_add(rhs as u32))
    }
}

impl std::ops::AddAssign<u64> for Wrap32 {
    fn add_assign(&mut self, rhs: u64) {
        *self = *self + rhs;
    }
}
