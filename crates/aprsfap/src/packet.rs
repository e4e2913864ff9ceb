//! Decoded packet records

use std::fmt;

use strum::EnumMessage;

use crate::position::mice_message_text;
use crate::resultcode::{Rejection, ResultCode};
use crate::timestamp::Timestamp;

/// Kind of APRS packet
///
/// The packet type is determined by the first byte of the
/// body and, for some types, by the decoded content.
///
/// ```
/// use aprsfap::PacketType;
///
/// assert_eq!("telemetry-message", PacketType::TelemetryMessage.as_str());
/// assert_eq!("Weather report", PacketType::Weather.as_display_str());
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage, strum_macros::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PacketType {
    /// Position report, including Mic-E and NMEA
    #[strum(serialize = "location", detailed_message = "Position report")]
    Location,

    /// Object report
    #[strum(serialize = "object", detailed_message = "Object")]
    Object,

    /// Item report
    #[strum(serialize = "item", detailed_message = "Item")]
    Item,

    /// Message, acknowledgement or rejection
    #[strum(serialize = "message", detailed_message = "Message")]
    Message,

    /// Message carrying telemetry `BITS.`/`PARM.`/`UNIT.`/`EQNS.`
    #[strum(
        serialize = "telemetry-message",
        detailed_message = "Telemetry definition message"
    )]
    TelemetryMessage,

    /// Status report
    #[strum(serialize = "status", detailed_message = "Status report")]
    Status,

    /// Station capabilities
    #[strum(serialize = "capabilities", detailed_message = "Station capabilities")]
    Capabilities,

    /// `T#` telemetry
    #[strum(serialize = "telemetry", detailed_message = "Telemetry")]
    Telemetry,

    /// Weather report without a position
    #[strum(serialize = "wx", detailed_message = "Weather report")]
    #[cfg_attr(feature = "serde", serde(rename = "wx"))]
    Weather,
}

impl PacketType {
    /// Human-readable string representation
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// Short identifier, like `location`
    pub fn as_str(&self) -> &'static str {
        self.get_serializations()[0]
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Encoding of the decoded position
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage, strum_macros::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PositionFormat {
    /// Human-readable `DDMM.mmN/DDDMM.mmW`
    #[strum(serialize = "uncompressed", detailed_message = "Uncompressed")]
    Uncompressed,

    /// Base-91 compressed
    #[strum(serialize = "compressed", detailed_message = "Compressed")]
    Compressed,

    /// Mic-E, with latitude in the destination callsign
    #[strum(serialize = "mice", detailed_message = "Mic-E")]
    #[cfg_attr(feature = "serde", serde(rename = "mice"))]
    MicE,

    /// Raw NMEA sentence from a GPS
    #[strum(serialize = "nmea", detailed_message = "NMEA")]
    Nmea,
}

impl PositionFormat {
    /// Short identifier, like `compressed`
    pub fn as_str(&self) -> &'static str {
        self.get_serializations()[0]
    }
}

impl fmt::Display for PositionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// One hop of the digipeater path
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Digipeater {
    /// Callsign, with SSID if any
    pub callsign: String,

    /// True if the hop was marked used with `*`
    pub was_digipeated: bool,
}

impl fmt::Display for Digipeater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.was_digipeated {
            write!(f, "{}*", self.callsign)
        } else {
            self.callsign.fmt(f)
        }
    }
}

/// Telemetry channel values
///
/// Both `T#` packets and base-91 comment telemetry decode to
/// this record. Absent channels are `None`.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Telemetry {
    /// Sequence number, if numeric
    pub sequence: Option<u32>,

    /// Up to five analog channels
    pub values: [Option<f64>; 5],

    /// Eight digital channels as a string of `0` and `1`
    pub bits: Option<String>,
}

/// Weather observations
///
/// All values are converted to metric units. Fields the station
/// did not report are `None`.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Weather {
    /// Wind direction, degrees
    pub wind_direction: Option<f64>,

    /// Sustained wind speed, m/s
    pub wind_speed: Option<f64>,

    /// Peak wind gust, m/s
    pub wind_gust: Option<f64>,

    /// Outdoor temperature, °C
    pub temp: Option<f64>,

    /// Indoor temperature, °C
    pub temp_in: Option<f64>,

    /// Rain in the past hour, mm
    pub rain_1h: Option<f64>,

    /// Rain in the past 24 hours, mm
    pub rain_24h: Option<f64>,

    /// Rain since local midnight, mm
    pub rain_midnight: Option<f64>,

    /// Relative humidity, percent
    pub humidity: Option<u8>,

    /// Indoor relative humidity, percent
    pub humidity_in: Option<u8>,

    /// Barometric pressure, millibar/hPa
    pub pressure: Option<f64>,

    /// Luminosity, W/m²
    pub luminosity: Option<u16>,

    /// Snowfall in the past 24 hours, mm
    pub snow_24h: Option<f64>,

    /// Weather station software/hardware identifier
    pub soft: Option<String>,
}

impl Weather {
    /// True if no observation was decoded
    pub fn is_empty(&self) -> bool {
        self.wind_direction.is_none()
            && self.wind_speed.is_none()
            && self.wind_gust.is_none()
            && self.temp.is_none()
            && self.temp_in.is_none()
            && self.rain_1h.is_none()
            && self.rain_24h.is_none()
            && self.rain_midnight.is_none()
            && self.humidity.is_none()
            && self.humidity_in.is_none()
            && self.pressure.is_none()
            && self.luminosity.is_none()
            && self.snow_24h.is_none()
    }
}

/// A decoded APRS packet
///
/// Produced by [`ParserOptions::decode()`](crate::ParserOptions::decode).
/// A `Packet` is returned even when decoding fails: check
/// [`result_code`](Packet::result_code) or [`is_ok()`](Packet::is_ok).
/// Fields the decoder could fill before failing remain set, so a
/// packet with a valid header and an undecodable body still reports
/// its source and destination.
///
/// Distances are in metres, speeds in km/h, coordinates in
/// signed decimal degrees (north and east positive).
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Packet {
    /// Input text, verbatim
    pub orig_packet: String,

    /// Everything before the first `:`
    pub header: Option<String>,

    /// Everything after the first `:`
    pub body: Option<String>,

    /// Source callsign
    pub src_callsign: Option<String>,

    /// Destination callsign
    pub dst_callsign: Option<String>,

    /// Digipeater path, in order
    pub digipeaters: Vec<Digipeater>,

    /// Decoded packet type
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub packet_type: Option<PacketType>,

    /// How the position was encoded
    pub format: Option<PositionFormat>,

    /// True if the station is capable of messaging
    pub messaging: Option<bool>,

    /// Report timestamp
    pub timestamp: Option<Timestamp>,

    /// Latitude, decimal degrees
    pub latitude: Option<f64>,

    /// Longitude, decimal degrees
    pub longitude: Option<f64>,

    /// Position resolution, metres
    pub pos_resolution: Option<f64>,

    /// Number of blanked minute digits, 0 to 4
    pub pos_ambiguity: Option<u8>,

    /// Datum byte from a `!DAO!` extension
    pub dao_datum_byte: Option<char>,

    /// Symbol table or overlay character
    pub symbol_table: Option<char>,

    /// Symbol code character
    pub symbol_code: Option<char>,

    /// Altitude, metres
    pub altitude: Option<f64>,

    /// Speed, km/h
    pub speed: Option<f64>,

    /// Course, degrees. 360 means north; 0 means unknown.
    pub course: Option<u16>,

    /// Power-height-gain-directivity digits
    pub phg: Option<String>,

    /// Radio range, km
    pub radio_range: Option<f64>,

    /// Compressed position GPS fix flag
    pub gps_fix_status: Option<bool>,

    /// True if an NMEA checksum was present and verified
    pub checksum_ok: Option<bool>,

    /// Mic-E message bits, three characters of `0`/`1`/`2`
    pub mbits: Option<String>,

    /// The Mic-E information field was repaired before decoding
    pub mice_mangled: bool,

    /// Free-form comment
    pub comment: Option<String>,

    /// Status text
    pub status: Option<String>,

    /// Message addressee
    pub destination: Option<String>,

    /// Message text
    pub message: Option<String>,

    /// Message identifier
    pub message_id: Option<String>,

    /// Acknowledged message identifier
    pub message_ack: Option<String>,

    /// Rejected message identifier
    pub message_rej: Option<String>,

    /// Reply-ack identifier carried in a `{MM}AA` trailer
    pub message_reply_ack: Option<String>,

    /// Object name, verbatim nine characters
    pub object_name: Option<String>,

    /// Item name
    pub item_name: Option<String>,

    /// Object/item is live (`*` or `!`) rather than killed (`_`)
    pub alive: Option<bool>,

    /// Capabilities, in order of appearance
    pub capabilities: Option<Vec<(String, Option<String>)>>,

    /// Telemetry values
    pub telemetry: Option<Telemetry>,

    /// Weather observations
    pub weather: Option<Weather>,

    /// Failure reason, if decoding failed
    pub result_code: Option<ResultCode>,

    /// Failure text, with detail when available
    pub result_message: Option<String>,

    /// Non-fatal problems
    pub warnings: Vec<ResultCode>,
}

impl Packet {
    /// True if the packet decoded without a fatal error
    pub fn is_ok(&self) -> bool {
        self.result_code.is_none()
    }

    /// Mic-E message type, like "En Route"
    ///
    /// Available when the packet is a Mic-E position report.
    pub fn mice_message(&self) -> Option<&'static str> {
        self.mbits.as_deref().and_then(mice_message_text)
    }

    pub(crate) fn new(orig: &str) -> Self {
        Self {
            orig_packet: orig.to_owned(),
            ..Default::default()
        }
    }

    pub(crate) fn reject(&mut self, rej: Rejection) {
        self.result_message = Some(match &rej.detail {
            Some(detail) => format!("{}: {}", rej.code, detail),
            None => rej.code.to_string(),
        });
        self.result_code = Some(rej.code);
    }

    pub(crate) fn warn(&mut self, code: ResultCode) {
        self.warnings.push(code);
    }

    pub(crate) fn set_symbol(&mut self, table: char, code: char) {
        self.symbol_table = Some(table);
        self.symbol_code = Some(code);
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.src_callsign, &self.dst_callsign) {
            (Some(src), Some(dst)) => write!(f, "{}>{}", src, dst)?,
            _ => write!(f, "?")?,
        }
        if let Some(code) = &self.result_code {
            return write!(f, " error {}: {}", code.as_str(), code);
        }
        if let Some(kind) = &self.packet_type {
            write!(f, " {}", kind)?;
        }
        if let Some(name) = self.object_name.as_ref().or(self.item_name.as_ref()) {
            write!(f, " \"{}\"", name.trim_end())?;
        }
        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            write!(f, " {:.5},{:.5}", lat, lon)?;
        }
        if let Some(msg) = &self.message {
            write!(f, " to {}: {}", self.destination.as_deref().unwrap_or("?"), msg)?;
        }
        if let Some(status) = &self.status {
            write!(f, " {}", status)?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " {}", comment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    #[test]
    fn test_packet_type_str() {
        assert_eq!(PacketType::Weather, PacketType::from_str("wx").unwrap());
        assert_eq!("location", PacketType::Location.to_string());
        assert_eq!("mice", PositionFormat::MicE.to_string());
    }

    #[test]
    fn test_reject() {
        let mut pkt = Packet::new("N0CALL>APRS:?");
        assert!(pkt.is_ok());
        pkt.reject(ResultCode::MessageInvalid.with_detail("no addressee"));
        assert!(!pkt.is_ok());
        assert_eq!(
            Some("Invalid message packet: no addressee"),
            pkt.result_message.as_deref()
        );
        assert_eq!("? error msg_inv: Invalid message packet", &format!("{}", pkt));
    }

    #[test]
    fn test_display() {
        let mut pkt = Packet::new("");
        pkt.src_callsign = Some("N0CALL".to_owned());
        pkt.dst_callsign = Some("APRS".to_owned());
        pkt.packet_type = Some(PacketType::Location);
        pkt.latitude = Some(60.4752);
        pkt.longitude = Some(25.0947);
        pkt.comment = Some("hi".to_owned());
        assert_eq!(
            "N0CALL>APRS location 60.47520,25.09470 hi",
            &format!("{}", pkt)
        );
    }

    #[test]
    fn test_digipeater_display() {
        let digi = Digipeater {
            callsign: "WIDE1-1".to_owned(),
            was_digipeated: true,
        };
        assert_eq!("WIDE1-1*", &digi.to_string());
    }

    #[test]
    fn test_weather_empty() {
        let mut wx = Weather::default();
        assert!(wx.is_empty());
        wx.soft = Some("wRSW".to_owned());
        assert!(wx.is_empty());
        wx.humidity = Some(50);
        assert!(!wx.is_empty());
    }
}
