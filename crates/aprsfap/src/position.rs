//! Position decoders
//!
//! APRS carries positions in three encodings: human-readable
//! uncompressed `DDMM.mmN/DDDMM.mmW`, base-91 compressed, and
//! Mic-E, which hides the latitude in the destination callsign.
//! NMEA sentences are handled in [`nmea`](crate::nmea).

mod compressed;
mod mice;
mod uncompressed;

pub(crate) use compressed::{decode_compressed, COMPRESSED_LEN};
pub(crate) use mice::{decode_mice, mice_message_text};
pub(crate) use uncompressed::{decode_uncompressed, UNCOMPRESSED_LEN};

/// Resolution of a compressed position, metres
pub(crate) const COMPRESSED_RESOLUTION: f64 = 0.291;

/// How the position which starts with `first` is encoded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PositionKind {
    /// Begins with the latitude degrees
    Uncompressed,

    /// Begins with a symbol table identifier
    Compressed,

    /// Peet Bros logging-mode weather (`!!`)
    PeetLogging,

    /// Something else
    Unrecognized,
}

impl PositionKind {
    pub(crate) fn classify(first: Option<u8>) -> Self {
        match first {
            Some(b'0'..=b'9') => PositionKind::Uncompressed,
            Some(b'/' | b'\\' | b'A'..=b'Z' | b'a'..=b'j') => PositionKind::Compressed,
            Some(b'!') => PositionKind::PeetLogging,
            _ => PositionKind::Unrecognized,
        }
    }
}

/// Position resolution in metres for a number of minute decimals
///
/// `decimals` is the count of significant digits after the
/// decimal point of the minutes. Negative values mean whole
/// minutes are blanked as well.
pub(crate) fn resolution(decimals: i32) -> f64 {
    let base = if decimals <= -2 { 600.0 } else { 1000.0 };
    1.852 * base * 10f64.powi(-decimals)
}

/// True if `c` may be a symbol table identifier or overlay
pub(crate) fn is_symbol_table(c: char) -> bool {
    matches!(c, '/' | '\\' | 'A'..='Z' | '0'..='9')
}
