//! CRC-8 used to check each frame body.
//!
//! Parameters: polynomial `0x07`, initial value `0x00`, MSB-first, no
//! reflection, no final XOR (the CRC-8/SMBUS variant). The firmware runs the
//! same bitwise loop when it verifies a received packet.

/// Generator polynomial (x^8 + x^2 + x + 1, top bit implied).
pub const POLY: u8 = 0x07;

/// Register value before the first byte.
pub const INIT: u8 = 0x00;

/// Incremental CRC-8 over data fed in pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc8 {
    register: u8,
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc8 {
    pub const fn new() -> Self {
        Self { register: INIT }
    }

    /// Feed `data` into the register.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.register = step(self.register ^ byte);
        }
    }

    /// Current CRC value. Feeding more data afterwards continues from here.
    pub const fn finish(&self) -> u8 {
        self.register
    }
}

/// Compute the CRC-8 of `data` in one call.
pub fn checksum(data: &[u8]) -> u8 {
    let mut crc = Crc8::new();
    crc.update(data);
    crc.finish()
}

#[inline]
fn step(mut register: u8) -> u8 {
    for _ in 0..8 {
        register = if register & 0x80 != 0 {
            (register << 1) ^ POLY
        } else {
            register << 1
        };
    }
    register
}
