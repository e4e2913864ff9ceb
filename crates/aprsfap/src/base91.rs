//! Base-91 digits
//!
//! APRS packs integers into printable characters `!` (33)
//! through `{` (123), most significant digit first.

/// Decode base-91 digits to an integer
///
/// Every byte must be in the printable base-91 range. Callers
/// validate this with a regex before decoding.
pub fn decode(digits: &str) -> u64 {
    digits
        .bytes()
        .fold(0u64, |acc, b| acc * 91 + u64::from(b.saturating_sub(33)))
}

/// Encode `value` as exactly `width` base-91 digits
///
/// Values too large for `width` digits are truncated to the
/// low-order digits.
pub fn encode(value: u64, width: usize) -> String {
    let mut out = vec![b'!'; width];
    let mut v = value;
    for slot in out.iter_mut().rev() {
        *slot = (v % 91) as u8 + 33;
        v /= 91;
    }
    out.into_iter().map(char::from).collect()
}
