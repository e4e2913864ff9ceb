use lazy_static::lazy_static;
use regex::Regex;

use super::COMPRESSED_RESOLUTION;
use crate::base91;
use crate::packet::{Packet, PositionFormat};
use crate::resultcode::{Outcome, ResultCode};
use crate::units::{FEET_TO_METERS, KNOT_TO_KMH, MPH_TO_KMH};

/// Length of a compressed position, in bytes
pub(crate) const COMPRESSED_LEN: usize = 13;

/// Decode a compressed position
///
/// `pos` holds the 13-byte compressed block: symbol table,
/// four bytes each of base-91 latitude and longitude, symbol
/// code, and the `cs` and compression-type bytes. The `cs`
/// bytes carry course and speed, altitude or radio range.
pub(crate) fn decode_compressed(pos: &str, pkt: &mut Packet) -> Outcome {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^[/\\A-Za-j][\x21-\x7b]{8}[\x21-\x7b\x7d][\x20-\x7b]{3}")
                .expect("bad compressed position regexp");
    }

    if !RE.is_match(pos) {
        return Err(ResultCode::CompressedInvalid.into());
    }
    let b = pos.as_bytes();

    let table = match b[0] {
        t @ b'a'..=b'j' => char::from(t - b'a' + b'0'),
        t => char::from(t),
    };
    let lat = 90.0 - base91::decode(&pos[1..5]) as f64 / 380926.0;
    let lon = -180.0 + base91::decode(&pos[5..9]) as f64 / 190463.0;

    pkt.format = Some(PositionFormat::Compressed);
    pkt.latitude = Some(lat);
    pkt.longitude = Some(lon);
    pkt.pos_resolution = Some(COMPRESSED_RESOLUTION);
    pkt.set_symbol(table, char::from(b[9]));

    let c = i32::from(b[10]) - 33;
    let s = i32::from(b[11]) - 33;
    let t = i32::from(b[12]) - 33;

    if c != -1 && t >= 0 {
        pkt.gps_fix_status = Some(t & 0x20 != 0);
    }

    if c == -1 || s == -1 {
        // no course/speed, altitude or range
    } else if t >= 0 && (t & 0x18) == 0x10 {
        let feet = 1.002f64.powi(c * 91 + s);
        pkt.altitude = Some(feet * FEET_TO_METERS);
    } else if (0..=89).contains(&c) {
        pkt.course = Some(if c == 0 { 360 } else { (c * 4) as u16 });
        pkt.speed = Some((1.08f64.powi(s) - 1.0) * KNOT_TO_KMH);
    } else if c == 90 {
        pkt.radio_range = Some(2.0 * 1.08f64.powi(s) * MPH_TO_KMH);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_position() {
        let mut pkt = Packet::default();
        decode_compressed("/5L!!<*e7>7P[", &mut pkt).unwrap();
        assert_approx_eq!(49.5, pkt.latitude.unwrap(), 1.0e-4);
        assert_approx_eq!(-72.75, pkt.longitude.unwrap(), 1.0e-4);
        assert_eq!(Some('/'), pkt.symbol_table);
        assert_eq!(Some('>'), pkt.symbol_code);
        assert_eq!(Some(88), pkt.course);
        assert_approx_eq!(36.2 * KNOT_TO_KMH, pkt.speed.unwrap(), 0.2);
        assert_eq!(Some(true), pkt.gps_fix_status);
        assert_approx_eq!(COMPRESSED_RESOLUTION, pkt.pos_resolution.unwrap());
        assert_eq!(Some(PositionFormat::Compressed), pkt.format);
    }

    #[test]
    fn test_altitude() {
        let mut pkt = Packet::default();
        decode_compressed("/5L!!<*e7OS]S", &mut pkt).unwrap();
        assert_approx_eq!(10004.0 * FEET_TO_METERS, pkt.altitude.unwrap(), 2.0);
        assert_eq!(None, pkt.course);
        assert_eq!(None, pkt.speed);
    }

    #[test]
    fn test_range() {
        let mut pkt = Packet::default();
        decode_compressed("/5L!!<*e7>{?", &mut pkt).unwrap_err();
        decode_compressed("/5L!!<*e7>{?!", &mut pkt).unwrap();
        assert_approx_eq!(20.1253 * MPH_TO_KMH, pkt.radio_range.unwrap(), 0.01);
    }

    #[test]
    fn test_overlay_and_blank_cs() {
        let mut pkt = Packet::default();
        decode_compressed("c5L!!<*e7>  A", &mut pkt).unwrap();
        assert_eq!(Some('2'), pkt.symbol_table);
        assert_eq!(None, pkt.course);
        assert_eq!(None, pkt.gps_fix_status);
    }

    #[test]
    fn test_invalid() {
        let mut pkt = Packet::default();
        assert_eq!(
            ResultCode::CompressedInvalid,
            decode_compressed("k5L!!<*e7>7P[", &mut pkt).unwrap_err().code
        );
        assert_eq!(
            ResultCode::CompressedInvalid,
            decode_compressed("/5L!", &mut pkt).unwrap_err().code
        );
    }
}
