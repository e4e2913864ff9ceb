//! Header validation and body dispatch
//!
//! A TNC-2 packet is `SRC>DST,DIGI1,DIGI2*:BODY`. The first
//! byte of the body selects the packet type.

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

use crate::extension::parse_comment;
use crate::message::decode_message;
use crate::nmea::decode_nmea;
use crate::object::{decode_item, decode_object};
use crate::options::Context;
use crate::packet::{Digipeater, Packet, PacketType};
use crate::position::{
    decode_compressed, decode_mice, decode_uncompressed, PositionKind, COMPRESSED_LEN,
    UNCOMPRESSED_LEN,
};
use crate::resultcode::{Outcome, ResultCode};
use crate::status::{decode_capabilities, decode_status};
use crate::telemetry::decode_telemetry;
use crate::weather::{parse_peet_logging, parse_peet_packet, parse_weather};

/// Maximum number of path components (destination plus digipeaters) in AX.25
pub(crate) const AX25_MAX_PATH: usize = 9;

// Minimum body lengths, including the type byte
const MICE_MIN_LEN: usize = 9;
const LOCATION_MIN_LEN: usize = 14;

// The last-resort position search only looks this far into the body
const FALLBACK_SEARCH_LIMIT: usize = 39;

/// What the body's leading bytes say it is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyKind {
    MicE,
    Location { timestamped: bool, messaging: bool },
    PositionlessWeather,
    Object,
    Nmea,
    PeetPacket,
    Item,
    Message,
    Capabilities,
    Status,
    Telemetry,
    Experimental,
    Unsupported,
    Other,
}

impl BodyKind {
    fn classify(body: &str) -> Self {
        match body.as_bytes().first() {
            Some(b'\'' | b'`') => BodyKind::MicE,
            Some(b'!') => BodyKind::Location {
                timestamped: false,
                messaging: false,
            },
            Some(b'=') => BodyKind::Location {
                timestamped: false,
                messaging: true,
            },
            Some(b'/') => BodyKind::Location {
                timestamped: true,
                messaging: false,
            },
            Some(b'@') => BodyKind::Location {
                timestamped: true,
                messaging: true,
            },
            Some(b'_') => BodyKind::PositionlessWeather,
            Some(b';') => BodyKind::Object,
            Some(b'$') if body.starts_with("$GP") => BodyKind::Nmea,
            Some(b'$') if body.starts_with("$ULTW") => BodyKind::PeetPacket,
            Some(b'$') => BodyKind::Unsupported,
            Some(b')') => BodyKind::Item,
            Some(b':') => BodyKind::Message,
            Some(b'<') => BodyKind::Capabilities,
            Some(b'>') => BodyKind::Status,
            Some(b'T') if body.starts_with("T#") && body[2..].contains(',') => {
                BodyKind::Telemetry
            }
            Some(b'{') if body.starts_with("{{") => BodyKind::Experimental,
            _ => BodyKind::Other,
        }
    }
}

/// Decode a TNC-2 packet
///
/// Never fails: errors are reported in the returned packet.
pub(crate) fn decode(packet: &str, ctx: &Context) -> Packet {
    let mut pkt = Packet::new(packet);
    if let Err(rej) = decode_into(packet, &mut pkt, ctx) {
        debug!("rejected ({}): {}", rej.code.as_str(), packet);
        pkt.reject(rej);
    }
    pkt
}

fn decode_into(packet: &str, pkt: &mut Packet, ctx: &Context) -> Outcome {
    if packet.is_empty() {
        return Err(ResultCode::PacketNo.into());
    }
    if packet.trim().is_empty() {
        return Err(ResultCode::PacketShort.into());
    }

    let (header, body) = packet
        .split_once(':')
        .ok_or(ResultCode::PacketNoBody)?;
    pkt.header = Some(header.to_owned());
    pkt.body = Some(body.to_owned());

    decode_header(header, pkt, ctx)?;
    if body.is_empty() {
        return Err(ResultCode::PacketNoBody.into());
    }
    decode_body(body, pkt, ctx)
}

// SRC>DST,DIGI,...
fn decode_header(header: &str, pkt: &mut Packet, ctx: &Context) -> Outcome {
    lazy_static! {
        static ref SOURCE: Regex =
            Regex::new(r"^([A-Za-z0-9-]{1,9})>(.*)$").expect("bad header regexp");
        static ref AX25_DIGI: Regex =
            Regex::new(r"^([A-Z0-9-]+)(\*?)$").expect("bad digipeater regexp");
        static ref IS_DIGI: Regex =
            Regex::new(r"^([A-Za-z0-9-]{1,9})(\*?)$").expect("bad digipeater regexp");
        static ref Q_CONSTRUCT: Regex = Regex::new(r"^q..$").expect("bad q-construct regexp");
        static ref HEX_ID: Regex = Regex::new(r"^[0-9A-F]{32}$").expect("bad digipeater regexp");
    }

    let ax25 = ctx.options.treat_as_ax25();

    let caps = SOURCE
        .captures(header)
        .ok_or_else(|| ResultCode::SrcCallBadChars.with_detail(header))?;
    let src = &caps[1];
    let path = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    pkt.src_callsign = Some(if ax25 {
        check_ax25_call(src).ok_or_else(|| ResultCode::SrcCallNotAx25.with_detail(src))?
    } else {
        src.to_owned()
    });

    if path.is_empty() {
        return Err(ResultCode::DstCallNone.into());
    }
    let parts: Vec<&str> = path.split(',').collect();
    if ax25 && parts.len() > AX25_MAX_PATH {
        return Err(ResultCode::DstPathTooMany.into());
    }

    let dst = parts[0];
    pkt.dst_callsign =
        Some(check_ax25_call(dst).ok_or_else(|| ResultCode::DstCallNotAx25.with_detail(dst))?);

    let mut seen_q = false;
    for part in &parts[1..] {
        let digi = if ax25 {
            let caps = AX25_DIGI
                .captures(part)
                .ok_or_else(|| ResultCode::DigiCallBadChars.with_detail(*part))?;
            Digipeater {
                callsign: check_ax25_call(&caps[1])
                    .ok_or_else(|| ResultCode::DigiCallNotAx25.with_detail(*part))?,
                was_digipeated: &caps[2] == "*",
            }
        } else if let Some(caps) = IS_DIGI.captures(part) {
            if Q_CONSTRUCT.is_match(&caps[1]) {
                seen_q = true;
            }
            Digipeater {
                callsign: caps[1].to_owned(),
                was_digipeated: &caps[2] == "*",
            }
        } else if seen_q && HEX_ID.is_match(part) {
            // APRS-IS server identifiers follow the q-construct
            Digipeater {
                callsign: (*part).to_owned(),
                was_digipeated: false,
            }
        } else {
            return Err(ResultCode::DigiCallBadChars.with_detail(*part));
        };
        pkt.digipeaters.push(digi);
    }
    Ok(())
}

/// Validate a strict AX.25 callsign
///
/// One to six upper-case letters or digits, with an optional
/// numeric SSID from 0 to 15. Returns the normalized callsign,
/// without leading zeros in the SSID.
///
/// ```
/// use aprsfap::check_ax25_call;
///
/// assert_eq!(Some("OH2RDP-1".to_owned()), check_ax25_call("OH2RDP-01"));
/// assert_eq!(None, check_ax25_call("OH2RDP-16"));
/// assert_eq!(None, check_ax25_call("oh2rdp"));
/// ```
pub fn check_ax25_call(call: &str) -> Option<String> {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^([A-Z0-9]{1,6})(?:-(\d{1,2}))?$").expect("bad callsign regexp");
    }

    let caps = RE.captures(call)?;
    match caps.get(2) {
        None => Some(caps[1].to_owned()),
        Some(ssid) => {
            let ssid: u8 = ssid.as_str().parse().ok()?;
            if ssid > 15 {
                None
            } else {
                Some(format!("{}-{}", &caps[1], ssid))
            }
        }
    }
}

fn decode_body(body: &str, pkt: &mut Packet, ctx: &Context) -> Outcome {
    let kind = BodyKind::classify(body);
    trace!("body kind: {:?}", kind);
    match kind {
        BodyKind::MicE => {
            if body.len() < MICE_MIN_LEN {
                return Err(ResultCode::MicEShort.into());
            }
            pkt.packet_type = Some(PacketType::Location);
            let dst = pkt.dst_callsign.clone().unwrap_or_default();
            decode_mice(&body[1..], &dst, pkt, ctx)
        }
        BodyKind::Location {
            timestamped,
            messaging,
        } => decode_location(body, timestamped, messaging, pkt, ctx),
        BodyKind::PositionlessWeather => decode_positionless_weather(body, pkt),
        BodyKind::Object => decode_object(body, pkt, ctx),
        BodyKind::Nmea => {
            pkt.packet_type = Some(PacketType::Location);
            decode_nmea(&body[1..], pkt)
        }
        BodyKind::PeetPacket => {
            let wx = parse_peet_packet(&body[5..]).ok_or(ResultCode::WeatherUnsupported)?;
            pkt.packet_type = Some(PacketType::Weather);
            pkt.weather = Some(wx);
            Ok(())
        }
        BodyKind::Item => decode_item(body, pkt),
        BodyKind::Message => decode_message(body, pkt),
        BodyKind::Capabilities => {
            decode_capabilities(&body[1..], pkt);
            Ok(())
        }
        BodyKind::Status => {
            decode_status(&body[1..], pkt, ctx);
            Ok(())
        }
        BodyKind::Telemetry => decode_telemetry(&body[2..], pkt),
        BodyKind::Experimental => Err(ResultCode::ExperimentalUnsupported.into()),
        BodyKind::Unsupported => Err(ResultCode::TypeNotSupported.into()),
        BodyKind::Other => decode_fallback(body, pkt),
    }
}

// ! = / @ position reports
fn decode_location(
    body: &str,
    timestamped: bool,
    messaging: bool,
    pkt: &mut Packet,
    ctx: &Context,
) -> Outcome {
    if body.len() < LOCATION_MIN_LEN {
        return Err(ResultCode::PacketShort.into());
    }
    pkt.packet_type = Some(PacketType::Location);
    pkt.messaging = Some(messaging);

    let pos = if timestamped {
        match body.get(1..8).and_then(|stamp| ctx.timestamp(stamp)) {
            Some(ts) => pkt.timestamp = Some(ts),
            None => pkt.warn(ResultCode::TimestampInvalidLocation),
        }
        body.get(8..).ok_or(ResultCode::PacketInvalid)?
    } else {
        &body[1..]
    };

    if PositionKind::classify(pos.bytes().next()) == PositionKind::PeetLogging {
        let wx = parse_peet_logging(&pos[1..]).ok_or(ResultCode::WeatherUnsupported)?;
        pkt.packet_type = Some(PacketType::Weather);
        pkt.weather = Some(wx);
        return Ok(());
    }
    decode_position_and_comment(pos, pkt, ResultCode::PacketInvalid)
}

/// Decode a position and everything after it
///
/// `pos` begins with the first byte of a compressed or
/// uncompressed position. If the position carries the weather
/// symbol, the trailing text is parsed as weather. Otherwise it
/// is parsed for comment extensions. `unrecognized` is the error
/// for a position in neither encoding.
pub(crate) fn decode_position_and_comment(
    pos: &str,
    pkt: &mut Packet,
    unrecognized: ResultCode,
) -> Outcome {
    let rest = match PositionKind::classify(pos.bytes().next()) {
        PositionKind::Compressed => {
            let block = pos
                .get(..COMPRESSED_LEN)
                .ok_or(ResultCode::PacketInvalid)?;
            decode_compressed(block, pkt)?;
            &pos[COMPRESSED_LEN..]
        }
        PositionKind::Uncompressed => {
            if pos.len() < UNCOMPRESSED_LEN {
                // too short to hold a position
                return Ok(());
            }
            decode_uncompressed(pos, pkt)?;
            &pos[UNCOMPRESSED_LEN..]
        }
        _ => return Err(unrecognized.into()),
    };

    if pkt.symbol_code == Some('_') {
        if let Some((wx, comment)) = parse_weather(rest) {
            pkt.weather = Some(wx);
            pkt.comment = comment;
            return Ok(());
        }
    }
    parse_comment(rest, pkt);
    Ok(())
}

// _MMDDHHMMc...s...
fn decode_positionless_weather(body: &str, pkt: &mut Packet) -> Outcome {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^_(\d{8})c[\- .\d]{1,3}s[\- .\d]{1,3}").expect("bad weather regexp");
    }

    if !RE.is_match(body) {
        return Err(ResultCode::WeatherUnsupported.into());
    }
    let (wx, comment) = parse_weather(&body[9..]).ok_or(ResultCode::WeatherUnsupported)?;
    pkt.packet_type = Some(PacketType::Weather);
    pkt.weather = Some(wx);
    pkt.comment = comment;
    Ok(())
}

// A position may hide after a `!` within the first 40 bytes
fn decode_fallback(body: &str, pkt: &mut Packet) -> Outcome {
    let idx = body
        .find('!')
        .filter(|idx| *idx <= FALLBACK_SEARCH_LIMIT)
        .ok_or(ResultCode::TypeNotSupported)?;
    let pos = &body[idx + 1..];
    let long_enough = match PositionKind::classify(pos.bytes().next()) {
        PositionKind::Compressed => pos.len() >= COMPRESSED_LEN,
        PositionKind::Uncompressed => pos.len() >= UNCOMPRESSED_LEN,
        _ => false,
    };
    if !long_enough {
        return Err(ResultCode::TypeNotSupported.into());
    }

    pkt.packet_type = Some(PacketType::Location);
    pkt.messaging = Some(false);
    decode_position_and_comment(pos, pkt, ResultCode::TypeNotSupported)
}
