use lazy_static::lazy_static;
use regex::Regex;

use super::{is_symbol_table, resolution};
use crate::packet::{Packet, PositionFormat};
use crate::resultcode::{Outcome, Rejection, ResultCode};

/// Length of an uncompressed position, in bytes
pub(crate) const UNCOMPRESSED_LEN: usize = 19;

/// Decode an uncompressed position
///
/// `pos` begins with the latitude degrees and must hold at least
/// the 19 bytes of latitude, symbol table, longitude and symbol
/// code. Position ambiguity is inferred from trailing blanks in
/// the latitude minutes and applied to both coordinates.
pub(crate) fn decode_uncompressed(pos: &str, pkt: &mut Packet) -> Outcome {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"^(\d{2})([0-7 ][0-9 ]\.[0-9 ]{2})([NnSs])(.)(\d{3})([0-7 ][0-9 ]\.[0-9 ]{2})([EeWw])([\x21-\x7b\x7d])"
        )
        .expect("bad uncompressed position regexp");
        static ref AMBIGUITY: Regex =
            Regex::new(r"^(\d{0,4})( {0,4})$").expect("bad ambiguity regexp");
    }

    let caps = RE.captures(pos).ok_or(ResultCode::LocationInvalid)?;

    let table = first_char(&caps[4]);
    if !is_symbol_table(table) {
        return Err(ResultCode::SymbolTableInvalid.with_detail(table.to_string()));
    }

    let lat_deg: u32 = caps[1].parse().map_err(|_| ResultCode::LocationInvalid)?;
    let lon_deg: u32 = caps[5].parse().map_err(|_| ResultCode::LocationInvalid)?;
    if lat_deg > 89 || lon_deg > 179 {
        return Err(ResultCode::LocationLarge.into());
    }

    let lat_min = &caps[2];
    let lon_min = &caps[6];
    let blanks = lat_min.replace('.', "");
    let ambiguity = AMBIGUITY
        .captures(&blanks)
        .map(|c| c[2].len() as u8)
        .ok_or(ResultCode::LocationAmbiguityInvalid)?;

    let mut lat = f64::from(lat_deg) + ambiguous_minutes(lat_min, ambiguity)? / 60.0;
    let mut lon = f64::from(lon_deg) + ambiguous_minutes(lon_min, ambiguity)? / 60.0;
    if matches!(&caps[3], "S" | "s") {
        lat = -lat;
    }
    if matches!(&caps[7], "W" | "w") {
        lon = -lon;
    }

    pkt.format = Some(PositionFormat::Uncompressed);
    pkt.latitude = Some(lat);
    pkt.longitude = Some(lon);
    pkt.pos_ambiguity = Some(ambiguity);
    pkt.pos_resolution = Some(resolution(2 - i32::from(ambiguity)));
    pkt.set_symbol(table, first_char(&caps[8]));
    Ok(())
}

// Minutes from an `MM.mm` field, centered in the ambiguity window
fn ambiguous_minutes(field: &str, ambiguity: u8) -> Result<f64, Rejection> {
    let (digits, center) = match ambiguity {
        0 => (field.to_owned(), 0.0),
        1 => (field[0..4].to_owned(), 0.05),
        2 => (field[0..2].to_owned(), 0.5),
        3 => (format!("{}5", &field[0..1]), 0.0),
        _ => return Ok(30.0),
    };
    if digits.contains(' ') {
        return Err(ResultCode::LocationAmbiguityInvalid.into());
    }
    digits
        .parse::<f64>()
        .map(|m| m + center)
        .map_err(|_| ResultCode::LocationAmbiguityInvalid.into())
}

fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or(' ')
}
