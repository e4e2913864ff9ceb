//! Decoder result and warning codes

use std::fmt;
use std::str::FromStr;

use strum::EnumMessage;

/// Reason a packet could not be (fully) decoded
///
/// Every failure the decoder reports, and every non-fatal
/// warning it attaches to an otherwise successful
/// [`Packet`](crate::Packet), is one of these codes. Each code
/// has a stable machine-readable identifier, like
/// `srccall_badchars`, and a human-readable message.
///
/// ```
/// use aprsfap::ResultCode;
///
/// let code = ResultCode::from("loc_large");
/// assert_eq!(ResultCode::LocationLarge, code);
/// assert_eq!("loc_large", code.as_str());
/// assert_eq!("Degree value too large", code.as_display_str());
/// assert_eq!("Degree value too large", &format!("{}", code));
///
/// assert_eq!(ResultCode::TypeNotSupported, ResultCode::from("huh"));
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
pub enum ResultCode {
    /// The packet type is not one the decoder understands
    #[strum(
        serialize = "type_not_supported",
        detailed_message = "Unsupported packet format"
    )]
    TypeNotSupported,

    /// Empty input
    #[strum(serialize = "packet_no", detailed_message = "No packet given to parse")]
    PacketNo,

    /// Input too short to hold a header
    #[strum(serialize = "packet_short", detailed_message = "Too short packet")]
    PacketShort,

    /// No `:` separating header from body, or an empty body
    #[strum(serialize = "packet_nobody", detailed_message = "No body in packet")]
    PacketNoBody,

    /// Position data in an unrecognized layout
    #[strum(serialize = "packet_invalid", detailed_message = "Invalid packet")]
    PacketInvalid,

    /// Experimental `{{` packets
    #[strum(
        serialize = "exp_unsupp",
        detailed_message = "Unsupported experimental"
    )]
    ExperimentalUnsupported,

    /// Symbol table identifier out of range
    #[strum(
        serialize = "sym_inv_table",
        detailed_message = "Invalid symbol table or overlay"
    )]
    SymbolTableInvalid,

    /// Source callsign fails strict AX.25 validation
    #[strum(
        serialize = "srccall_noax25",
        detailed_message = "Source callsign is not a valid AX.25 call"
    )]
    SrcCallNotAx25,

    /// Source callsign has characters outside `[A-Za-z0-9-]`
    #[strum(
        serialize = "srccall_badchars",
        detailed_message = "Source callsign contains bad characters"
    )]
    SrcCallBadChars,

    /// More than nine path components in AX.25 mode
    #[strum(
        serialize = "dstpath_toomany",
        detailed_message = "Too many destination path components to be AX.25"
    )]
    DstPathTooMany,

    /// No destination after the `>`
    #[strum(
        serialize = "dstcall_none",
        detailed_message = "No destination field in packet"
    )]
    DstCallNone,

    /// Destination callsign fails strict AX.25 validation
    #[strum(
        serialize = "dstcall_noax25",
        detailed_message = "Destination callsign is not a valid AX.25 call"
    )]
    DstCallNotAx25,

    /// A digipeater fails strict AX.25 validation
    #[strum(
        serialize = "digicall_noax25",
        detailed_message = "Digipeater callsign is not a valid AX.25 call"
    )]
    DigiCallNotAx25,

    /// A digipeater has unexpected characters
    #[strum(
        serialize = "digicall_badchars",
        detailed_message = "Digipeater callsign contains bad characters"
    )]
    DigiCallBadChars,

    /// Position report timestamp could not be resolved
    #[strum(
        serialize = "timestamp_inv_loc",
        detailed_message = "Invalid timestamp in location"
    )]
    TimestampInvalidLocation,

    /// Object timestamp could not be resolved
    #[strum(
        serialize = "timestamp_inv_obj",
        detailed_message = "Invalid timestamp in object"
    )]
    TimestampInvalidObject,

    /// Status timestamp could not be resolved
    #[strum(
        serialize = "timestamp_inv_sta",
        detailed_message = "Invalid timestamp in status"
    )]
    TimestampInvalidStatus,

    /// NMEA coordinate field is malformed
    #[strum(
        serialize = "nmea_inv_cval",
        detailed_message = "Invalid coordinate value in NMEA sentence"
    )]
    NmeaInvalidCoordinate,

    /// NMEA longitude is out of range
    #[strum(
        serialize = "nmea_large_ew",
        detailed_message = "Too large value in NMEA sentence (east/west)"
    )]
    NmeaLargeEastWest,

    /// NMEA latitude is out of range
    #[strum(
        serialize = "nmea_large_ns",
        detailed_message = "Too large value in NMEA sentence (north/south)"
    )]
    NmeaLargeNorthSouth,

    /// NMEA hemisphere is not one of `NSEW`
    #[strum(
        serialize = "nmea_inv_sign",
        detailed_message = "Invalid lat/long sign in NMEA sentence"
    )]
    NmeaInvalidSign,

    /// NMEA checksum mismatch
    #[strum(
        serialize = "nmea_inv_cksum",
        detailed_message = "Invalid checksum in NMEA sentence"
    )]
    NmeaInvalidChecksum,

    /// NMEA sentence other than `GPRMC`
    #[strum(
        serialize = "nmea_unsupp",
        detailed_message = "Unsupported NMEA sentence type"
    )]
    NmeaUnsupported,

    /// `GPRMC` with fewer than ten fields
    #[strum(
        serialize = "gprmc_fewfields",
        detailed_message = "Less than ten fields in GPRMC sentence"
    )]
    GprmcFewFields,

    /// `GPRMC` without a valid fix
    #[strum(
        serialize = "gprmc_nofix",
        detailed_message = "No GPS fix in GPRMC sentence"
    )]
    GprmcNoFix,

    /// `GPRMC` time of day is malformed
    #[strum(
        serialize = "gprmc_inv_time",
        detailed_message = "Invalid timestamp in GPRMC sentence"
    )]
    GprmcInvalidTime,

    /// `GPRMC` date is malformed or not a calendar date
    #[strum(
        serialize = "gprmc_inv_date",
        detailed_message = "Invalid date in GPRMC sentence"
    )]
    GprmcInvalidDate,

    /// `GPRMC` date outside the representable range
    #[strum(
        serialize = "gprmc_date_out",
        detailed_message = "GPRMC date does not fit in an Unix timestamp"
    )]
    GprmcDateOutOfRange,

    /// Object too short
    #[strum(serialize = "obj_short", detailed_message = "Too short object")]
    ObjectShort,

    /// Object header is malformed
    #[strum(serialize = "obj_inv", detailed_message = "Invalid object")]
    ObjectInvalid,

    /// Object position could not be decoded
    #[strum(
        serialize = "obj_dec_err",
        detailed_message = "Error in object location decoding"
    )]
    ObjectDecodeError,

    /// Item too short
    #[strum(serialize = "item_short", detailed_message = "Too short item")]
    ItemShort,

    /// Item header is malformed
    #[strum(serialize = "item_inv", detailed_message = "Invalid item")]
    ItemInvalid,

    /// Item position could not be decoded
    #[strum(
        serialize = "item_dec_err",
        detailed_message = "Error in item location decoding"
    )]
    ItemDecodeError,

    /// Uncompressed position too short
    #[strum(serialize = "loc_short", detailed_message = "Too short uncompressed location")]
    LocationShort,

    /// Uncompressed position is malformed
    #[strum(serialize = "loc_inv", detailed_message = "Invalid uncompressed location")]
    LocationInvalid,

    /// Latitude or longitude degrees out of range
    #[strum(serialize = "loc_large", detailed_message = "Degree value too large")]
    LocationLarge,

    /// Ambiguity blanks are inconsistent
    #[strum(serialize = "loc_amb_inv", detailed_message = "Invalid position ambiguity")]
    LocationAmbiguityInvalid,

    /// Mic-E packet or destination too short
    #[strum(serialize = "mice_short", detailed_message = "Too short mic-e packet")]
    MicEShort,

    /// Mic-E destination has characters outside the encoding
    #[strum(
        serialize = "mice_inv",
        detailed_message = "Invalid characters in mic-e packet"
    )]
    MicEInvalid,

    /// Mic-E information field is malformed
    #[strum(
        serialize = "mice_inv_info",
        detailed_message = "Invalid characters in mic-e information field"
    )]
    MicEInvalidInfo,

    /// Mic-E ambiguity would blank more than four digits
    #[strum(
        serialize = "mice_amb_large",
        detailed_message = "Too much position ambiguity in mic-e packet"
    )]
    MicEAmbiguityLarge,

    /// Mic-E ambiguity digits are not contiguous
    #[strum(
        serialize = "mice_amb_inv",
        detailed_message = "Invalid position ambiguity in mic-e packet"
    )]
    MicEAmbiguityInvalid,

    /// Compressed position is malformed
    #[strum(serialize = "comp_inv", detailed_message = "Invalid compressed packet")]
    CompressedInvalid,

    /// Message is malformed
    #[strum(serialize = "msg_inv", detailed_message = "Invalid message packet")]
    MessageInvalid,

    /// Weather report in an unrecognized layout
    #[strum(
        serialize = "wx_unsupp",
        detailed_message = "Unsupported weather format"
    )]
    WeatherUnsupported,

    /// Telemetry value is malformed
    #[strum(serialize = "tlm_inv", detailed_message = "Invalid telemetry packet")]
    TelemetryInvalid,

    /// Telemetry value exceeds the 32-bit range
    #[strum(
        serialize = "tlm_large",
        detailed_message = "Too large telemetry value"
    )]
    TelemetryLarge,
}

impl ResultCode {
    /// Human-readable string representation
    ///
    /// Converts to a human-readable string, like
    /// "`Invalid symbol table or overlay`."
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// Machine-readable identifier, like `sym_inv_table`
    pub fn as_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// True for codes which may accompany an otherwise successful decode
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ResultCode::TimestampInvalidLocation
                | ResultCode::TimestampInvalidObject
                | ResultCode::TimestampInvalidStatus
        )
    }

    /// Attach free-form detail to this code
    pub(crate) fn with_detail<S: Into<String>>(self, detail: S) -> Rejection {
        Rejection {
            code: self,
            detail: Some(detail.into()),
        }
    }
}

impl From<&str> for ResultCode {
    fn from(s: &str) -> ResultCode {
        match ResultCode::from_str(s) {
            Ok(code) => code,
            Err(_e) => ResultCode::TypeNotSupported,
        }
    }
}

impl AsRef<str> for ResultCode {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}

impl std::error::Error for ResultCode {}

#[cfg(feature = "serde")]
impl serde::Serialize for ResultCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A decoder failure with optional detail
///
/// Sub-decoders return this through `?`. The top-level
/// dispatcher folds it into the packet's result fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Rejection {
    pub(crate) code: ResultCode,
    pub(crate) detail: Option<String>,
}

impl From<ResultCode> for Rejection {
    fn from(code: ResultCode) -> Self {
        Self { code, detail: None }
    }
}

/// Outcome of a sub-decoder
pub(crate) type Outcome = Result<(), Rejection>;
