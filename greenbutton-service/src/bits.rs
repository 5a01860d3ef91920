/// Extracts the inclusive bit range `from..=to` of `value` (bit 0 is the
/// least significant), shifted down to bit 0.
///
/// `10` is `0b1010`, so bits 1..=2 are `0b01`:
///
/// ```
/// assert_eq!(greenbutton_service::bits::extract_bits(10, 1, 2), 1);
/// ```
pub fn extract_bits(value: u32, from: u32, to: u32) -> u32 {
    debug_assert!(from <= to && to < u32::BITS, "invalid bit range {from}..={to}");
    let width = to - from + 1;
    let shifted = value >> from;
    if width >= u32::BITS {
        shifted
    } else {
        shifted & ((1u32 << width) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_low_middle_and_high_ranges() {
        assert_eq!(extract_bits(0b1010, 1, 2), 0b01);
        assert_eq!(extract_bits(0x380A_1A8C, 0, 11), 2700);
        assert_eq!(extract_bits(0x380A_1A8C, 28, 31), 3);
        assert_eq!(extract_bits(0xFFFF_FFFF, 17, 19), 7);
    }

    #[test]
    fn full_width_range_returns_value() {
        assert_eq!(extract_bits(0xDEAD_BEEF, 0, 31), 0xDEAD_BEEF);
    }
}
