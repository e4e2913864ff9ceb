//! Position comment extensions
//!
//! The text following a position may begin with a seven-byte
//! data extension (course/speed, PHG or RNG) and may contain an
//! altitude, base-91 telemetry and a `!DAO!` precision extension
//! anywhere in the comment.

use lazy_static::lazy_static;
use regex::Regex;

use crate::base91;
use crate::packet::{Packet, Telemetry};
use crate::position::resolution;
use crate::units::{FEET_TO_METERS, KNOT_TO_KMH, MPH_TO_KMH};

/// Parse the comment following a position
///
/// Extracted values are stored in `pkt`. Whatever text remains
/// becomes the comment.
pub(crate) fn parse_comment(rest: &str, pkt: &mut Packet) {
    lazy_static! {
        static ref COURSE_SPEED: Regex =
            Regex::new(r"^([0-9. ]{3})/([0-9. ]{3})").expect("bad course/speed regexp");
        static ref PHG_RANGE: Regex =
            Regex::new(r"^PHG(\d[\x30-\x7e]\d\d[0-9A-Z])/").expect("bad PHG regexp");
        static ref PHG: Regex = Regex::new(r"^PHG(\d[\x30-\x7e]\d\d)").expect("bad PHG regexp");
        static ref RNG: Regex = Regex::new(r"^RNG(\d{4})").expect("bad RNG regexp");
        static ref ALTITUDE: Regex =
            Regex::new(r"(?s)^(.*?)/A=(-\d{5}|\d{6})(.*)$").expect("bad altitude regexp");
    }

    let mut rest = rest;
    if rest.len() >= 7 {
        if let Some(caps) = COURSE_SPEED.captures(rest) {
            let course = &caps[1];
            let speed = &caps[2];
            pkt.course = Some(match course.parse::<u16>() {
                Ok(c) if is_digits(course) && (1..=360).contains(&c) => c,
                _ => 0,
            });
            if is_digits(speed) {
                if let Ok(knots) = speed.parse::<f64>() {
                    pkt.speed = Some(knots * KNOT_TO_KMH);
                }
            }
            rest = &rest[7..];
        } else if let Some(caps) = PHG_RANGE.captures(rest) {
            pkt.phg = Some(caps[1].to_owned());
            rest = &rest[8..];
        } else if let Some(caps) = PHG.captures(rest) {
            pkt.phg = Some(caps[1].to_owned());
            rest = &rest[7..];
        } else if let Some(caps) = RNG.captures(rest) {
            if let Ok(miles) = caps[1].parse::<f64>() {
                pkt.radio_range = Some(miles * MPH_TO_KMH);
            }
            rest = &rest[7..];
        }
    }

    let mut rest = rest.to_owned();
    if let Some(caps) = ALTITUDE.captures(&rest) {
        if let Ok(feet) = caps[2].parse::<f64>() {
            pkt.altitude = Some(feet * FEET_TO_METERS);
        }
        rest = format!("{}{}", &caps[1], &caps[3]);
    }

    let rest = comment_telemetry(&rest, pkt);
    let rest = extract_dao(&rest, pkt);

    let rest = rest
        .strip_prefix(|c: char| c == '/' || c.is_whitespace())
        .unwrap_or(&rest);
    let comment = cleanup_comment(rest);
    if !comment.is_empty() {
        pkt.comment = Some(comment);
    }
}

/// Extract base-91 comment telemetry `|ss11223344556677|`
///
/// The block holds a sequence number, one to five analog
/// channels and an optional digital channel byte, each two
/// base-91 digits. Returns the comment with the block removed.
pub(crate) fn comment_telemetry(rest: &str, pkt: &mut Packet) -> String {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?s)^(.*)\|([!-{]{2})([!-{]{2})([!-{]{2}|)([!-{]{2}|)([!-{]{2}|)([!-{]{2}|)([!-{]{2}|)\|(.*)$"
        )
        .expect("bad comment telemetry regexp");
    }

    let caps = match RE.captures(rest) {
        Some(caps) => caps,
        None => return rest.to_owned(),
    };

    let mut values = [None; 5];
    for (i, slot) in values.iter_mut().enumerate() {
        let digits = &caps[i + 3];
        if !digits.is_empty() {
            *slot = Some(base91::decode(digits) as f64);
        }
    }
    let bits = match &caps[8] {
        "" => None,
        digits => {
            let v = base91::decode(digits);
            Some((0..8).map(|i| if v >> i & 1 == 1 { '1' } else { '0' }).collect())
        }
    };
    pkt.telemetry = Some(Telemetry {
        sequence: Some(base91::decode(&caps[2]) as u32),
        values,
        bits,
    });

    format!("{}{}", &caps[1], &caps[9])
}

/// Extract the last `!DAO!` extension
///
/// If the extension is valid, the position is refined and the
/// extension is removed from the returned comment. Otherwise the
/// comment is returned as-is.
pub(crate) fn extract_dao(rest: &str, pkt: &mut Packet) -> String {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?s)^(.*)!([\x21-\x7b][\x20-\x7b]{2})!(.*?)$")
            .expect("bad DAO regexp");
    }

    match RE.captures(rest) {
        Some(caps) if apply_dao(caps[2].as_bytes(), pkt) => format!("{}{}", &caps[1], &caps[3]),
        _ => rest.to_owned(),
    }
}

// Apply the three DAO bytes. False if they are not a DAO.
fn apply_dao(dao: &[u8], pkt: &mut Packet) -> bool {
    let (datum, lat_off, lon_off, decimals) = match dao {
        [d @ b'A'..=b'Z', a @ b'0'..=b'9', o @ b'0'..=b'9'] => {
            let scale = 0.001 / 60.0;
            (
                *d,
                f64::from(a - b'0') * scale,
                f64::from(o - b'0') * scale,
                Some(3),
            )
        }
        [d @ b'a'..=b'z', a @ 0x21..=0x7b, o @ 0x21..=0x7b] => {
            let scale = 0.01 / 60.0 / 91.0;
            (
                d.to_ascii_uppercase(),
                f64::from(a - 33) * scale,
                f64::from(o - 33) * scale,
                Some(4),
            )
        }
        [d @ 0x21..=0x7b, b' ', b' '] => (d.to_ascii_uppercase(), 0.0, 0.0, None),
        _ => return false,
    };

    pkt.dao_datum_byte = Some(char::from(datum));
    if let Some(decimals) = decimals {
        if let (Some(lat), Some(lon)) = (pkt.latitude, pkt.longitude) {
            pkt.latitude = Some(away_from_zero(lat, lat_off));
            pkt.longitude = Some(away_from_zero(lon, lon_off));
            pkt.pos_resolution = Some(resolution(decimals));
        }
    }
    true
}

// Negative zero counts as south or west
fn away_from_zero(value: f64, offset: f64) -> f64 {
    if value.is_sign_negative() {
        value - offset
    } else {
        value + offset
    }
}

/// Remove unprintable characters and surrounding whitespace
pub(crate) fn cleanup_comment(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_owned()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
