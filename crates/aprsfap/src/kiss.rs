//! KISS frames to and from TNC-2 text
//!
//! A KISS data frame is a command byte (zero for "data on port
//! 0") followed by an AX.25 UI frame, delimited by `FEND` and
//! byte-stuffed so that `FEND` never appears inside.
//!
//! The AX.25 frame is a list of seven-byte addresses
//! (destination, source, then up to eight digipeaters), a
//! control byte, a protocol ID and the information field.

use std::fmt;

use arrayvec::ArrayVec;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

/// Frame end
pub const FEND: u8 = 0xC0;

/// Frame escape
pub const FESC: u8 = 0xDB;

/// Transposed frame end
pub const TFEND: u8 = 0xDC;

/// Transposed frame escape
pub const TFESC: u8 = 0xDD;

const MIN_FRAME_LEN: usize = 16;
const ADDRESS_LEN: usize = 7;
const MAX_DIGIPEATERS: usize = 8;
const MAX_ADDRESSES: usize = MAX_DIGIPEATERS + 2;

const KISS_DATA: u8 = 0x00;
const CONTROL_UI: u8 = 0x03;
const PID_NO_LAYER3: u8 = 0xF0;

const SSID_LAST: u8 = 0x01;
const SSID_RESERVED: u8 = 0x60;
const SSID_H_BIT: u8 = 0x80;

/// Convert a KISS frame to a TNC-2 text packet
///
/// `frame` is one KISS frame, with or without its `FEND`
/// delimiters, still byte-stuffed. Returns `None` if the frame
/// is not an AX.25 UI frame with no layer 3 protocol.
///
/// ```
/// use aprsfap::{frame_to_text, text_to_frame};
///
/// let frame = text_to_frame("N0CALL>APRS,WIDE1-1*:>hello").expect("valid packet");
/// assert_eq!(
///     Some("N0CALL>APRS,WIDE1-1*:>hello".to_owned()),
///     frame_to_text(&frame)
/// );
/// ```
pub fn frame_to_text(frame: &[u8]) -> Option<String> {
    let frame = match unstuff(trim_fend(frame)) {
        Some(frame) => frame,
        None => {
            debug!("kiss: invalid escape sequence");
            return None;
        }
    };
    if frame.len() < MIN_FRAME_LEN || frame[0] != KISS_DATA {
        debug!("kiss: not a data frame ({} bytes)", frame.len());
        return None;
    }

    let mut addresses: ArrayVec<Address, MAX_ADDRESSES> = ArrayVec::new();
    let mut rest = &frame[1..];
    loop {
        if rest.len() < ADDRESS_LEN {
            debug!("kiss: address field truncated");
            return None;
        }
        let (field, tail) = rest.split_at(ADDRESS_LEN);
        let addr = Address::from_bytes(field)?;
        let last = field[ADDRESS_LEN - 1] & SSID_LAST != 0;
        if addresses.try_push(addr).is_err() {
            debug!("kiss: too many digipeaters");
            return None;
        }
        rest = tail;
        if last {
            break;
        }
    }
    if addresses.len() < 2 {
        debug!("kiss: address field ends after the destination");
        return None;
    }

    let body = match rest {
        [CONTROL_UI, PID_NO_LAYER3, body @ ..] => body,
        _ => {
            debug!("kiss: not a UI frame");
            return None;
        }
    };

    let mut out = format!("{}>{}", addresses[1].plain(), addresses[0].plain());
    for digi in &addresses[2..] {
        out.push(',');
        out.push_str(&digi.to_string());
    }
    out.push(':');
    out.push_str(&String::from_utf8_lossy(body));
    Some(out)
}

/// Convert a TNC-2 text packet to a KISS frame
///
/// All callsigns must be valid AX.25 callsigns, and there may
/// be at most eight digipeaters. The returned frame is
/// byte-stuffed and delimited by `FEND`.
///
/// An explicit `-0` SSID is the same AX.25 address as no SSID
/// at all. [`frame_to_text()`] prints it without the suffix.
pub fn text_to_frame(text: &str) -> Option<Vec<u8>> {
    let (header, body) = text.split_once(':')?;
    let (src, path) = header.split_once('>')?;
    let mut path = path.split(',');
    let dst = Address::from_text(path.next()?)?;
    let src = Address::from_text(src)?;
    if dst.h_bit || src.h_bit {
        return None;
    }

    let mut digis: ArrayVec<Address, MAX_DIGIPEATERS> = ArrayVec::new();
    for digi in path {
        digis.try_push(Address::from_text(digi)?).ok()?;
    }

    let mut frame = Vec::with_capacity(1 + ADDRESS_LEN * (2 + digis.len()) + 2 + body.len());
    frame.push(KISS_DATA);
    dst.write(&mut frame, false);
    src.write(&mut frame, digis.is_empty());
    for (i, digi) in digis.iter().enumerate() {
        digi.write(&mut frame, i + 1 == digis.len());
    }
    frame.push(CONTROL_UI);
    frame.push(PID_NO_LAYER3);
    frame.extend_from_slice(body.as_bytes());

    Some(stuff(&frame))
}

// One AX.25 address
#[derive(Clone, Debug, PartialEq, Eq)]
struct Address {
    callsign: String,
    ssid: u8,
    h_bit: bool,
}

impl Address {
    fn from_bytes(field: &[u8]) -> Option<Self> {
        let (call, ssid) = field.split_at(ADDRESS_LEN - 1);
        let call: String = call.iter().map(|b| char::from(b >> 1)).collect();
        let call = call.trim_end_matches(' ');
        if call.is_empty() || !call.chars().all(|c| c.is_ascii_alphanumeric()) {
            debug!("kiss: invalid callsign \"{}\"", call);
            return None;
        }
        Some(Self {
            callsign: call.to_owned(),
            ssid: (ssid[0] >> 1) & 0x0f,
            h_bit: ssid[0] & SSID_H_BIT != 0,
        })
    }

    fn from_text(text: &str) -> Option<Self> {
        lazy_static! {
            static ref RE: Regex =
                Regex::new(r"^([A-Z0-9]{1,6})(?:-(\d{1,2}))?(\*?)$").expect("bad callsign regexp");
        }

        let caps = RE.captures(text)?;
        let ssid = match caps.get(2) {
            Some(ssid) => ssid.as_str().parse::<u8>().ok().filter(|s| *s <= 15)?,
            None => 0,
        };
        Some(Self {
            callsign: caps[1].to_owned(),
            ssid,
            h_bit: &caps[3] == "*",
        })
    }

    fn write(&self, out: &mut Vec<u8>, last: bool) {
        let padded = format!("{:<6}", self.callsign);
        out.extend(padded.bytes().map(|b| b << 1));

        let mut ssid = SSID_RESERVED | (self.ssid << 1);
        if self.h_bit {
            ssid |= SSID_H_BIT;
        }
        if last {
            ssid |= SSID_LAST;
        }
        out.push(ssid);
    }

    // Callsign and SSID, without the digipeated flag
    fn plain(&self) -> String {
        if self.ssid == 0 {
            self.callsign.clone()
        } else {
            format!("{}-{}", self.callsign, self.ssid)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plain())?;
        if self.h_bit {
            write!(f, "*")?;
        }
        Ok(())
    }
}

fn trim_fend(frame: &[u8]) -> &[u8] {
    let start = frame.iter().position(|b| *b != FEND).unwrap_or(frame.len());
    let end = frame.iter().rposition(|b| *b != FEND).map_or(start, |i| i + 1);
    &frame[start..end]
}

// Undo byte stuffing. None on a dangling or unknown escape.
fn unstuff(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut bytes = data.iter();
    while let Some(b) = bytes.next() {
        match *b {
            FESC => out.push(match bytes.next()? {
                &TFEND => FEND,
                &TFESC => FESC,
                _ => return None,
            }),
            b => out.push(b),
        }
    }
    Some(out)
}

fn stuff(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    out.push(FEND);
    for b in data {
        match *b {
            FEND => out.extend_from_slice(&[FESC, TFEND]),
            FESC => out.extend_from_slice(&[FESC, TFESC]),
            b => out.push(b),
        }
    }
    out.push(FEND);
    out
}
