// Variable-length integers used by the VCDIFF file header.
//
// Base-128, big-endian: most-significant group first. Every byte except the
// last has bit 7 set. Same layout as xdelta3's `xd3_emit_size` /
// `xd3_read_size`, so lengths written by xdelta3 decode here unchanged.

use std::io::{self, Read, Write};

/// Maximum encoded length for a 64-bit value (ceil(64/7) = 10).
pub const MAX_VARINT_LEN: usize = 10;

/// If any of these bits are set before a shift, the next `<< 7` overflows.
const U64_OVERFLOW_MASK: u64 = 0xFE00_0000_0000_0000;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `num` into the tail of `buf`, returning the number of bytes used.
///
/// The encoded bytes are `buf[MAX_VARINT_LEN - len..]`.
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = MAX_VARINT_LEN;
    loop {
        i -= 1;
        buf[i] = (num as u8 & 0x7F) | 0x80;
        num >>= 7;
        if num == 0 {
            break;
        }
    }
    buf[MAX_VARINT_LEN - 1] &= 0x7F;
    MAX_VARINT_LEN - i
}

/// Encode a `u64` and write it to `w`.
pub fn write_u64<W: Write>(w: &mut W, num: u64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    w.write_all(&buf[MAX_VARINT_LEN - len..])
}

/// Encode a `usize` and write it to `w`.
pub fn write_usize<W: Write>(w: &mut W, num: usize) -> io::Result<()> {
    write_u64(w, num as u64)
}

/// Encoded byte-length of `num`.
#[inline]
pub fn sizeof_u64(num: u64) -> usize {
    let bits = 64 - num.leading_zeros();
    (bits.max(1).div_ceil(7) as usize).min(MAX_VARINT_LEN)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a `u64` from the front of `data`.
/// Returns `(value, bytes_consumed)`.
pub fn read_u64(data: &[u8]) -> Result<(u64, usize), VarIntError> {
    let mut val: u64 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if val & U64_OVERFLOW_MASK != 0 {
            return Err(VarIntError::Overflow);
        }
        val = (val << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((val, i + 1));
        }
    }
    Err(VarIntError::Underflow)
}

/// Read a `u64` one byte at a time from a streaming source.
///
/// A stream that ends mid-integer fails with `UnexpectedEof`.
pub fn stream_read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut val: u64 = 0;
    let mut buf = [0u8; 1];
    loop {
        r.read_exact(&mut buf)?;
        let byte = buf[0];
        if val & U64_OVERFLOW_MASK != 0 {
            return Err(VarIntError::Overflow.into());
        }
        val = (val << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok(val);
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VarIntError {
    /// Not enough input bytes to complete the integer.
    #[error("varint underflow (truncated input)")]
    Underflow,
    /// Value does not fit the target integer type.
    #[error("varint overflow")]
    Overflow,
}

impl From<VarIntError> for io::Error {
    fn from(e: VarIntError) -> io::Error {
        match e {
            VarIntError::Underflow => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            VarIntError::Overflow => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
