//! # aprsfap: APRS Packet Decoding
//!
//! This crate decodes
//! [Automatic Packet Reporting System](https://en.wikipedia.org/wiki/Automatic_Packet_Reporting_System)
//! (APRS) packets in the TNC-2 text format used by APRS-IS and
//! most terminal node controllers. It also encodes position
//! reports and converts between TNC-2 text and KISS frames.
//!
//! ## Disclaimer
//!
//! This crate is dual-licensed MIT and Apache 2.0. Read these licenses
//! carefully as they may affect your rights.
//!
//! APRS is a best-effort amateur radio network. Do not rely on it,
//! or on this crate, for anything safety-critical.
//!
//! ## Example
//!
//! A TNC-2 packet is a header and a body separated by a colon:
//!
//! ```txt
//! OH2RDP-1>BEACON-15,OH2RDG*,WIDE:!6028.51N/02505.68E#PHG7220/RELAY,WIDE, OH2AP Jarvenpaa
//! ```
//!
//! The header names the source station, the destination and the
//! digipeaters which relayed the packet. The body is one of a
//! dozen packet types, identified by its first character.
//!
//! ```
//! use aprsfap::{PacketType, ParserOptions, PositionFormat};
//!
//! let pkt = ParserOptions::new().decode(
//!     "OH2RDP-1>BEACON-15,OH2RDG*,WIDE:!6028.51N/02505.68E#PHG7220/RELAY,WIDE, OH2AP Jarvenpaa"
//! );
//!
//! assert!(pkt.is_ok());
//! assert_eq!(Some(PacketType::Location), pkt.packet_type);
//! assert_eq!(Some(PositionFormat::Uncompressed), pkt.format);
//! assert_eq!(Some("7220"), pkt.phg.as_deref());
//! assert_eq!(2, pkt.digipeaters.len());
//!
//! let lat = pkt.latitude.expect("has latitude");
//! assert!((lat - 60.4752).abs() < 1.0e-4);
//! ```
//!
//! Decoding never fails outright. Malformed packets are common on a
//! noisy radio channel, so the returned [`Packet`] reports what went
//! wrong instead:
//!
//! ```
//! use aprsfap::{ParserOptions, ResultCode};
//!
//! let pkt = ParserOptions::new().decode("N0CALL>APRS:{{experimental");
//! assert!(!pkt.is_ok());
//! assert_eq!(Some(ResultCode::ExperimentalUnsupported), pkt.result_code);
//! assert_eq!("exp_unsupp", ResultCode::ExperimentalUnsupported.as_str());
//! ```
//!
//! Some problems are not fatal. An object with an unreadable
//! timestamp still has a position, and the problem is recorded
//! in [`Packet::warnings`].
//!
//! ## Decoding options
//!
//! Packets heard directly over the air obey the AX.25 callsign
//! rules. Packets from APRS-IS may carry Internet-only callsigns
//! and path elements like `qAC`. The [`ParserOptions`] builder
//! selects between these and a few other behaviors. Timestamps
//! in packets carry no year and often no month, so they are
//! resolved against the current time. Use
//! [`ParserOptions::decode_at()`] to choose a different time,
//! such as when replaying a log.
//!
//! ## Encoding
//!
//! [`PositionBuilder`] creates position report bodies, either
//! uncompressed or base-91 compressed.
//!
//! ## KISS
//!
//! [`frame_to_text()`] and [`text_to_frame()`] convert between
//! TNC-2 text and the binary KISS frames spoken by most TNCs and
//! software modems.
//!
//! ## Crate features
//!
//! * `serde`: derive `Serialize` for [`Packet`] and everything
//!   in it

mod base91;
mod dispatch;
mod encoder;
mod extension;
mod kiss;
mod message;
mod nmea;
mod object;
mod options;
mod packet;
mod position;
mod resultcode;
mod status;
mod telemetry;
mod timestamp;
mod units;
mod weather;

pub use dispatch::check_ax25_call;
pub use encoder::{EncodeError, PositionBuilder};
pub use kiss::{frame_to_text, text_to_frame, FEND, FESC, TFEND, TFESC};
pub use options::ParserOptions;
pub use packet::{Digipeater, Packet, PacketType, PositionFormat, Telemetry, Weather};
pub use resultcode::ResultCode;
pub use timestamp::Timestamp;

/// Decode one TNC-2 packet with default options
///
/// Equivalent to `ParserOptions::new().decode(packet)`.
pub fn decode(packet: &str) -> Packet {
    ParserOptions::new().decode(packet)
}
