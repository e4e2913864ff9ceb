//! Raw NMEA position reports
//!
//! Trackers may transmit GPS sentences verbatim. Only `GPRMC`
//! carries everything a position report needs, so other
//! sentence types are rejected.

use chrono::{NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::packet::{Packet, PacketType, PositionFormat};
use crate::position::resolution;
use crate::resultcode::{Outcome, Rejection, ResultCode};
use crate::timestamp::Timestamp;
use crate::units::KNOT_TO_KMH;

/// Decode an NMEA sentence
///
/// `sentence` follows the leading `$`. If a `*HH` checksum is
/// present it must be correct.
pub(crate) fn decode_nmea(sentence: &str, pkt: &mut Packet) -> Outcome {
    lazy_static! {
        static ref CHECKSUM: Regex =
            Regex::new(r"^([\x20-\x7e]+)\*([0-9A-Fa-f]{2})$").expect("bad NMEA checksum regexp");
    }

    let sentence = sentence.trim();
    let covered = match CHECKSUM.captures(sentence) {
        Some(caps) => {
            let covered = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let given = u8::from_str_radix(&caps[2], 16)
                .map_err(|_| ResultCode::NmeaInvalidChecksum)?;
            let computed = covered.bytes().fold(0u8, |acc, b| acc ^ b);
            if given != computed {
                return Err(ResultCode::NmeaInvalidChecksum
                    .with_detail(format!("given {:02X}, computed {:02X}", given, computed)));
            }
            pkt.checksum_ok = Some(true);
            covered
        }
        None => sentence,
    };

    pkt.packet_type = Some(PacketType::Location);
    pkt.format = Some(PositionFormat::Nmea);
    pkt.set_symbol('/', '/');

    let fields: Vec<&str> = covered.split(',').collect();
    match fields[0] {
        "GPRMC" => decode_gprmc(&fields, pkt),
        other => Err(ResultCode::NmeaUnsupported.with_detail(other)),
    }
}

// $GPRMC,hhmmss.ss,A,llll.ll,a,yyyyy.yy,a,x.x,x.x,ddmmyy,x.x,a*hh
fn decode_gprmc(fields: &[&str], pkt: &mut Packet) -> Outcome {
    lazy_static! {
        static ref TIME: Regex =
            Regex::new(r"^\s*(\d{2})(\d{2})(\d{2})(|\.\d+)\s*$").expect("bad NMEA time regexp");
        static ref DATE: Regex =
            Regex::new(r"^\s*(\d{2})(\d{2})(\d{2})\s*$").expect("bad NMEA date regexp");
        static ref NUMBER: Regex =
            Regex::new(r"^\s*(\d+(|\.\d+))\s*$").expect("bad NMEA number regexp");
    }

    if fields.len() < 10 {
        return Err(ResultCode::GprmcFewFields.into());
    }
    if fields[2] != "A" {
        return Err(ResultCode::GprmcNoFix.into());
    }

    let time = TIME
        .captures(fields[1])
        .ok_or(ResultCode::GprmcInvalidTime)?;
    let (hour, minute, second) = (
        time[1].parse::<u32>().unwrap_or(99),
        time[2].parse::<u32>().unwrap_or(99),
        time[3].parse::<u32>().unwrap_or(99),
    );
    if hour > 23 || minute > 59 || second > 59 {
        return Err(ResultCode::GprmcInvalidTime.into());
    }

    let date = DATE
        .captures(fields[9])
        .ok_or(ResultCode::GprmcInvalidDate)?;
    let day = date[1].parse::<u32>().unwrap_or(0);
    let month = date[2].parse::<u32>().unwrap_or(0);
    let year = date[3].parse::<i32>().unwrap_or(0);
    let year = if year >= 70 { 1900 + year } else { 2000 + year };
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or(ResultCode::GprmcInvalidDate)?;
    if !(1970..2038).contains(&year) {
        return Err(ResultCode::GprmcDateOutOfRange.into());
    }
    pkt.timestamp = Some(Timestamp::Resolved(Utc.from_utc_datetime(&naive)));

    if let Some(caps) = NUMBER.captures(fields[7]) {
        if let Ok(knots) = caps[1].parse::<f64>() {
            pkt.speed = Some(knots * KNOT_TO_KMH);
        }
    }
    if let Some(caps) = NUMBER.captures(fields[8]) {
        if let Ok(course) = caps[1].parse::<f64>() {
            pkt.course = Some(match course.round() as u32 {
                0 => 360,
                c if c > 360 => 0,
                c => c as u16,
            });
        }
    }

    let (lat, lat_res) = nmea_coordinate(fields[3], fields[4])?;
    let (lon, lon_res) = nmea_coordinate(fields[5], fields[6])?;
    pkt.latitude = Some(lat);
    pkt.longitude = Some(lon);
    pkt.pos_resolution = Some(lat_res.max(lon_res));
    Ok(())
}

// DDMM.mmmm or DDDMM.mmmm and a hemisphere letter
fn nmea_coordinate(value: &str, sign: &str) -> Result<(f64, f64), Rejection> {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^\s*(\d{1,3})([0-5][0-9])\.(\d+)\s*$").expect("bad NMEA coordinate regexp");
    }

    let caps = RE
        .captures(value)
        .ok_or_else(|| ResultCode::NmeaInvalidCoordinate.with_detail(value))?;
    let degrees: f64 = caps[1]
        .parse()
        .map_err(|_| ResultCode::NmeaInvalidCoordinate.with_detail(value))?;
    let minutes: f64 = format!("{}.{}", &caps[2], &caps[3])
        .parse()
        .map_err(|_| ResultCode::NmeaInvalidCoordinate.with_detail(value))?;
    let res = resolution(caps[3].len() as i32);
    let coord = degrees + minutes / 60.0;

    match sign.trim() {
        "E" | "e" | "W" | "w" => {
            if coord > 179.999999 {
                return Err(ResultCode::NmeaLargeEastWest.into());
            }
            let neg = matches!(sign.trim(), "W" | "w");
            Ok((if neg { -coord } else { coord }, res))
        }
        "N" | "n" | "S" | "s" => {
            if coord > 89.999999 {
                return Err(ResultCode::NmeaLargeNorthSouth.into());
            }
            let neg = matches!(sign.trim(), "S" | "s");
            Ok((if neg { -coord } else { coord }, res))
        }
        other => Err(ResultCode::NmeaInvalidSign.with_detail(other)),
    }
}
