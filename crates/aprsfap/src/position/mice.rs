use std::borrow::Cow;

use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;

use super::{is_symbol_table, resolution};
use crate::base91;
use crate::extension::{cleanup_comment, comment_telemetry, extract_dao};
use crate::options::Context;
use crate::packet::{Packet, PositionFormat, Telemetry};
use crate::resultcode::{Outcome, ResultCode};
use crate::units::KNOT_TO_KMH;

/// Mic-E message types, indexed by message bits
///
/// `1` is a standard bit, `2` is a custom bit. Mixed
/// standard/custom combinations are undefined.
static MICE_MESSAGES: phf::Map<&'static str, &'static str> = phf_map! {
    "111" => "Off Duty",
    "110" => "En Route",
    "101" => "In Service",
    "100" => "Returning",
    "011" => "Committed",
    "010" => "Special",
    "001" => "Priority",
    "000" => "Emergency",
    "222" => "Custom 0",
    "220" => "Custom 1",
    "202" => "Custom 2",
    "200" => "Custom 3",
    "022" => "Custom 4",
    "020" => "Custom 5",
    "002" => "Custom 6",
};

/// Mic-E message type for the given message bits
pub(crate) fn mice_message_text(mbits: &str) -> Option<&'static str> {
    MICE_MESSAGES.get(mbits).copied()
}

/// Decode a Mic-E position report
///
/// `info` is the information field after the `'` or `` ` ``
/// type byte. `dstcall` is the AX.25 destination, which carries
/// the latitude, message bits and hemisphere flags.
pub(crate) fn decode_mice(info: &str, dstcall: &str, pkt: &mut Packet, ctx: &Context) -> Outcome {
    lazy_static! {
        static ref DEST: Regex =
            Regex::new(r"^[0-9A-LP-Z]{3}[0-9LP-Z]{3}$").expect("bad mic-e destination regexp");
        static ref INFO: Regex = Regex::new(
            r"^[\x26-\x7f][\x26-\x61][\x1c-\x7f]{2}[\x1c-\x7d][\x1c-\x7f][\x21-\x7b\x7d][/\\A-Z0-9]"
        )
        .expect("bad mic-e info regexp");
        static ref BROKEN: Regex = Regex::new(
            r"(?s)^([\x26-\x7f][\x26-\x61][\x1c-\x7f]{2})\x20([\x21-\x7b\x7d][/\\A-Z0-9])(.*)$"
        )
        .expect("bad mic-e repair regexp");
        static ref LAT_DIGITS: Regex =
            Regex::new(r"^(\d+)(_*)$").expect("bad mic-e latitude regexp");
    }

    let dst = dstcall.split('-').next().unwrap_or(dstcall);
    if info.len() < 8 || dst.len() != 6 {
        return Err(ResultCode::MicEShort.into());
    }
    if !DEST.is_match(dst) {
        return Err(ResultCode::MicEInvalid.with_detail(dst));
    }

    let mut mangled = false;
    let info: Cow<str> = if INFO.is_match(info) {
        Cow::Borrowed(info)
    } else if let Some(caps) = BROKEN
        .captures(info)
        .filter(|_| ctx.options.accept_broken_mice())
    {
        mangled = true;
        Cow::Owned(format!("{}  {}{}", &caps[1], &caps[2], &caps[3]))
    } else {
        let table = info.get(7..).and_then(|s| s.chars().next()).unwrap_or(' ');
        return Err(if is_symbol_table(table) {
            ResultCode::MicEInvalidInfo.into()
        } else {
            ResultCode::SymbolTableInvalid.with_detail(table.to_string())
        });
    };
    let d = dst.as_bytes();
    let b = info.as_bytes();

    // latitude digits, with K/L/Z as ambiguity blanks
    let lat_digits: String = d
        .iter()
        .map(|&c| match c {
            b'0'..=b'9' => char::from(c),
            b'A'..=b'J' => char::from(c - b'A' + b'0'),
            b'P'..=b'Y' => char::from(c - b'P' + b'0'),
            _ => '_',
        })
        .collect();
    let ambiguity = match LAT_DIGITS.captures(&lat_digits) {
        Some(caps) => 6 - caps[1].len(),
        None => return Err(ResultCode::MicEAmbiguityInvalid.with_detail(lat_digits.clone())),
    };
    if ambiguity > 4 {
        return Err(ResultCode::MicEAmbiguityLarge.into());
    }
    let fill = if ambiguity >= 4 { '3' } else { '5' };
    let lat_digits = lat_digits.replacen('_', &fill.to_string(), 1).replace('_', "0");
    let lat_min: f64 = format!("{}.{}", &lat_digits[2..4], &lat_digits[4..6])
        .parse()
        .map_err(|_| ResultCode::MicEInvalid)?;
    let lat_deg: f64 = lat_digits[0..2]
        .parse()
        .map_err(|_| ResultCode::MicEInvalid)?;
    let mut lat = lat_deg + lat_min / 60.0;
    if d[3] <= b'L' {
        lat = -lat;
    }

    let mbits: String = d[0..3]
        .iter()
        .map(|&c| match c {
            b'0'..=b'9' | b'L' => '0',
            b'P'..=b'Z' => '1',
            _ => '2',
        })
        .collect();

    let mut lon_deg = i32::from(b[0]) - 28;
    if d[4] >= b'P' {
        lon_deg += 100;
    }
    if (180..=189).contains(&lon_deg) {
        lon_deg -= 80;
    } else if (190..=199).contains(&lon_deg) {
        lon_deg -= 190;
    }
    let mut lon_min = i32::from(b[1]) - 28;
    if lon_min >= 60 {
        lon_min -= 60;
    }
    let lon_hundredths = i32::from(b[2]) - 28;
    let lon_min = format!("{:02}.{:02}", lon_min, lon_hundredths);
    let lon_min: f64 = match ambiguity {
        4 => Ok(30.0),
        3 => format!("{}5", &lon_min[0..1]).parse(),
        2 => format!("{}.5", &lon_min[0..2]).parse(),
        1 => format!("{}5", &lon_min[0..4]).parse(),
        _ => lon_min.parse(),
    }
    .map_err(|_| ResultCode::MicEInvalidInfo)?;
    let mut lon = f64::from(lon_deg) + lon_min / 60.0;
    if d[5] >= b'P' {
        lon = -lon;
    }

    pkt.format = Some(PositionFormat::MicE);
    pkt.latitude = Some(lat);
    pkt.longitude = Some(lon);
    pkt.pos_ambiguity = Some(ambiguity as u8);
    pkt.pos_resolution = Some(resolution(2 - ambiguity as i32));
    pkt.mbits = Some(mbits);
    pkt.mice_mangled = mangled;

    if !mangled {
        let dc = i32::from(b[4]) - 28;
        let mut speed = (i32::from(b[3]) - 28) * 10 + dc / 10;
        let mut course = (dc % 10) * 100 + i32::from(b[5]) - 28;
        if speed >= 800 {
            speed -= 800;
        }
        if course >= 400 {
            course -= 400;
        }
        pkt.speed = Some(f64::from(speed) * KNOT_TO_KMH);
        pkt.course = Some(course as u16);
    }
    pkt.set_symbol(char::from(b[7]), char::from(b[6]));

    let rest = mice_extras(&info[8..], pkt);
    let rest = comment_telemetry(&rest, pkt);
    let rest = extract_dao(&rest, pkt);
    let comment = cleanup_comment(&rest);
    if !comment.is_empty() {
        pkt.comment = Some(comment);
    }
    Ok(())
}

// Mic-E telemetry and base-91 altitude, returning what is left
fn mice_extras(rest: &str, pkt: &mut Packet) -> String {
    lazy_static! {
        static ref TLM2: Regex =
            Regex::new(r"(?is)^'([0-9a-f]{2})([0-9a-f]{2})(.*)$").expect("bad mic-e telemetry regexp");
        static ref TLM5: Regex =
            Regex::new(r"(?is)^\x{2018}([0-9a-f]{10})(.*)$").expect("bad mic-e telemetry regexp");
        static ref ALTITUDE: Regex =
            Regex::new(r"(?s)^(.*?)([\x21-\x7b])([\x21-\x7b])([\x21-\x7b])\}(.*)$")
                .expect("bad mic-e altitude regexp");
    }

    let mut rest = rest.to_owned();
    if let Some(caps) = TLM2.captures(&rest) {
        let a = hex_channel(&caps[1]);
        let b = hex_channel(&caps[2]);
        pkt.telemetry = Some(Telemetry {
            values: [a, Some(0.0), b, None, None],
            ..Default::default()
        });
        rest = caps[3].to_owned();
    } else if let Some(caps) = TLM5.captures(&rest) {
        let hex = &caps[1];
        let mut values = [None; 5];
        for (i, slot) in values.iter_mut().enumerate() {
            *slot = hex_channel(&hex[i * 2..i * 2 + 2]);
        }
        pkt.telemetry = Some(Telemetry {
            values,
            ..Default::default()
        });
        rest = caps[2].to_owned();
    }

    if let Some(caps) = ALTITUDE.captures(&rest) {
        let encoded = format!("{}{}{}", &caps[2], &caps[3], &caps[4]);
        pkt.altitude = Some(base91::decode(&encoded) as f64 - 10000.0);
        rest = format!("{}{}", &caps[1], &caps[5]);
    }
    rest
}

fn hex_channel(hex: &str) -> Option<f64> {
    u8::from_str_radix(hex, 16).ok().map(f64::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;
    use chrono::Utc;

    use crate::options::ParserOptions;

    fn ctx(broken: bool) -> Context {
        Context {
            options: ParserOptions::new().with_broken_mice(broken),
            now: Utc::now(),
        }
    }

    fn decode(info: &str, dst: &str) -> Result<Packet, ResultCode> {
        let mut pkt = Packet::default();
        decode_mice(info, dst, &mut pkt, &ctx(false)).map_err(|e| e.code)?;
        Ok(pkt)
    }

    #[test]
    fn test_mice() {
        let pkt = decode("I]\"4V<-/]\"4-}=", "TQ4W2V").unwrap();
        assert_approx_eq!(41.0 + 47.26 / 60.0, pkt.latitude.unwrap(), 1.0e-6);
        assert_approx_eq!(-(45.0 + 5.06 / 60.0), pkt.longitude.unwrap(), 1.0e-6);
        assert_eq!(Some(PositionFormat::MicE), pkt.format);
        assert_eq!(Some('/'), pkt.symbol_table);
        assert_eq!(Some('-'), pkt.symbol_code);
        assert_eq!(Some(0), pkt.pos_ambiguity);
        assert_eq!(Some("110"), pkt.mbits.as_deref());
        assert_approx_eq!(22.0, pkt.altitude.unwrap());
        assert_eq!(Some("]="), pkt.comment.as_deref());
        assert!(!pkt.mice_mangled);
    }

    #[test]
    fn test_mice_speed_course_altitude() {
        let pkt = decode("(_fn\"Oj/\"4T}", "S32UVT").unwrap();
        assert_approx_eq!(33.0 + 25.64 / 60.0, pkt.latitude.unwrap(), 1.0e-6);
        assert_approx_eq!(-(112.0 + 7.74 / 60.0), pkt.longitude.unwrap(), 1.0e-6);
        assert_approx_eq!(20.0 * KNOT_TO_KMH, pkt.speed.unwrap());
        assert_eq!(Some(251), pkt.course);
        assert_approx_eq!(61.0, pkt.altitude.unwrap());
        assert_eq!(Some('j'), pkt.symbol_code);
        assert_eq!(None, pkt.comment);
    }

    #[test]
    fn test_mice_message() {
        assert_eq!(Some("En Route"), mice_message_text("110"));
        assert_eq!(Some("Custom 3"), mice_message_text("200"));
        assert_eq!(None, mice_message_text("210"));
    }

    #[test]
    fn test_mice_ambiguity() {
        let pkt = decode("(_fn\"Oj/", "S32ULZ").unwrap();
        assert_eq!(Some(2), pkt.pos_ambiguity);
        assert_approx_eq!(33.0 + 25.5 / 60.0, pkt.latitude.unwrap(), 1.0e-6);
        assert_approx_eq!(1852.0, pkt.pos_resolution.unwrap());

        assert_eq!(
            ResultCode::MicEAmbiguityInvalid,
            decode("(_fn\"Oj/", "S3KU6T").unwrap_err()
        );
        assert_eq!(
            ResultCode::MicEAmbiguityLarge,
            decode("(_fn\"Oj/", "SLLZZZ").unwrap_err()
        );
    }

    #[test]
    fn test_mice_telemetry() {
        let pkt = decode("(_fn\"Oj/'1a2b comment", "S32UVT").unwrap();
        let tlm = pkt.telemetry.unwrap();
        assert_eq!([Some(26.0), Some(0.0), Some(43.0), None, None], tlm.values);
        assert_eq!(Some("comment"), pkt.comment.as_deref());

        let pkt = decode("(_fn\"Oj/\u{2018}0102030405", "S32UVT").unwrap();
        let tlm = pkt.telemetry.unwrap();
        assert_eq!(
            [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
            tlm.values
        );

        let pkt = decode("(_fn\"Oj/`0102030405", "S32UVT").unwrap();
        assert_eq!(None, pkt.telemetry);
    }

    #[test]
    fn test_mice_errors() {
        assert_eq!(ResultCode::MicEShort, decode("(_fn\"Oj", "S32UVT").unwrap_err());
        assert_eq!(ResultCode::MicEShort, decode("(_fn\"Oj/", "S32U6").unwrap_err());
        assert_eq!(ResultCode::MicEInvalid, decode("(_fn\"Oj/", "S32M6T").unwrap_err());
        assert_eq!(
            ResultCode::SymbolTableInvalid,
            decode("(_fn\"Ojx", "S32UVT").unwrap_err()
        );
        assert_eq!(
            ResultCode::MicEInvalidInfo,
            decode("(_f\x01\"Oj/", "S32UVT").unwrap_err()
        );
    }

    #[test]
    fn test_mice_broken() {
        let info = "(_fn j/comment";
        let mut pkt = Packet::default();
        let err = decode_mice(info, "S32UVT-2", &mut pkt, &ctx(false)).unwrap_err();
        assert_eq!(ResultCode::SymbolTableInvalid, err.code);

        let mut pkt = Packet::default();
        decode_mice(info, "S32UVT-2", &mut pkt, &ctx(true)).unwrap();
        assert!(pkt.mice_mangled);
        assert_eq!(None, pkt.speed);
        assert_eq!(None, pkt.course);
        assert_eq!(Some('j'), pkt.symbol_code);
        assert_eq!(Some("comment"), pkt.comment.as_deref());
        assert_approx_eq!(33.0 + 25.64 / 60.0, pkt.latitude.unwrap(), 1.0e-6);
    }
}
