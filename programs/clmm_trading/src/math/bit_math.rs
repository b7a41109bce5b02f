//! Bit Math
//!
//! Bit scans over the 64-bit initialized-tick word of a tick array.

/// Position of the highest set bit, None for 0
#[inline]
pub fn most_significant_bit(x: u64) -> Option<u8> {
    if x == 0 {
        None
    } else {
        Some(63 - x.leading_zeros() as u8)
    }
}

/// Position of the lowest set bit, None for 0
#[inline]
pub fn least_significant_bit(x: u64) -> Option<u8> {
    if x == 0 {
        None
    } else {
        Some(x.trailing_zeros() as u8)
    }
}

/// Find position of next set bit at or after position
pub fn next_bit_position(bitmap: u64, position: u8) -> Option<u8> {
    if position >= 64 {
        return None;
    }
    least_significant_bit(bitmap & (u64::MAX << position))
}

/// Find position of previous set bit at or before position
pub fn prev_bit_position(bitmap: u64, position: u8) -> Option<u8> {
    let position = position.min(63);
    let mask = if position == 63 {
        u64::MAX
    } else {
        (1u64 << (position + 1)) - 1
    };
    most_significant_bit(bitmap & mask)
}

/// Check if a specific bit is set
#[inline]
pub fn is_bit_set(bitmap: u64, position: u8) -> bool {
    position < 64 && (bitmap >> position) & 1 == 1
}

/// Toggle a specific bit
#[inline]
pub fn toggle_bit(bitmap: u64, position: u8) -> u64 {
    if position >= 64 {
        return bitmap;
    }
    bitmap ^ (1u64 << position)
}
