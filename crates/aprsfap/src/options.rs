use chrono::{DateTime, Utc};

use crate::dispatch;
use crate::packet::Packet;
use crate::timestamp::{parse_timestamp, Timestamp};

/// Configures and runs the APRS decoder
///
/// The defaults suit packets received from APRS-IS: callsigns
/// are validated loosely, broken Mic-E packets are rejected and
/// timestamps are resolved to absolute times.
///
/// ```
/// use aprsfap::{PacketType, ParserOptions};
///
/// let pkt = ParserOptions::new()
///     .with_ax25(true)
///     .decode("OH2RDP-1>BEACON-15,OH2RDG*,WIDE:!6028.51N/02505.68E#PHG7220/RELAY,WIDE, OH2AP Jarvenpaa");
/// assert!(pkt.is_ok());
/// assert_eq!(Some(PacketType::Location), pkt.packet_type);
/// assert_eq!(Some("OH2RDP-1"), pkt.src_callsign.as_deref());
/// ```
///
/// The API specified by the builder is part of this crate's
/// API. The defaults are *not*, however, and are subject to
/// revision in any minor release. If you care very strongly
/// about a setting, be sure to configure it here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParserOptions {
    treat_as_ax25: bool,
    accept_broken_mice: bool,
    raw_timestamp: bool,
}

impl ParserOptions {
    /// New decoder options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the header as a radio (AX.25) packet
    ///
    /// When enabled, source, destination and digipeater callsigns
    /// must be strict AX.25 callsigns: one to six upper-case
    /// letters or digits, with an optional SSID from 0 to 15.
    /// The path may hold at most eight digipeaters. APRS-IS
    /// q-constructs are not recognized.
    pub fn with_ax25(mut self, enable: bool) -> Self {
        self.treat_as_ax25 = enable;
        self
    }

    /// Repair a known Mic-E corruption
    ///
    /// Some digipeaters strip a trailing space from the Mic-E
    /// information field, shifting the symbol bytes. When enabled,
    /// the decoder re-inserts the missing byte and decodes the
    /// position without speed and course. Repaired packets are
    /// flagged with [`mice_mangled`](crate::Packet::mice_mangled).
    pub fn with_broken_mice(mut self, enable: bool) -> Self {
        self.accept_broken_mice = enable;
        self
    }

    /// Report timestamps as raw digits
    ///
    /// Return the six digits of each timestamp verbatim instead of
    /// resolving them to an absolute time.
    pub fn with_raw_timestamp(mut self, enable: bool) -> Self {
        self.raw_timestamp = enable;
        self
    }

    /// True if headers are validated as AX.25
    pub fn treat_as_ax25(&self) -> bool {
        self.treat_as_ax25
    }

    /// True if broken Mic-E packets are repaired
    pub fn accept_broken_mice(&self) -> bool {
        self.accept_broken_mice
    }

    /// True if timestamps are reported raw
    pub fn raw_timestamp(&self) -> bool {
        self.raw_timestamp
    }

    /// Decode one TNC-2 formatted packet
    ///
    /// Timestamps are resolved against the current system time.
    pub fn decode(&self, packet: &str) -> Packet {
        self.decode_at(packet, Utc::now())
    }

    /// Decode one TNC-2 formatted packet at a given time
    ///
    /// Timestamps in the packet are resolved against `now`.
    /// This is useful for replaying logs.
    pub fn decode_at(&self, packet: &str, now: DateTime<Utc>) -> Packet {
        let ctx = Context { options: *self, now };
        dispatch::decode(packet, &ctx)
    }
}

/// Per-call decoding state
#[derive(Clone, Copy, Debug)]
pub(crate) struct Context {
    pub(crate) options: ParserOptions,
    pub(crate) now: DateTime<Utc>,
}

impl Context {
    /// Resolve a timestamp according to the options
    pub(crate) fn timestamp(&self, stamp: &str) -> Option<Timestamp> {
        parse_timestamp(stamp, self.options.raw_timestamp, &self.now)
    }
}
