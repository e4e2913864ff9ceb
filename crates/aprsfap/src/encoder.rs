//! Position report encoder

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::base91;
use crate::timestamp::format_timestamp;
use crate::units::{FEET_TO_METERS, KNOT_TO_KMH};

const MAX_LATITUDE: f64 = 89.99999;
const MAX_LONGITUDE: f64 = 179.99999;
const MAX_AMBIGUITY: u8 = 4;

// compression type: current GPS fix, other source
const COMPRESSION_TYPE: char = 'A';

/// Error encoding a position report
#[derive(Error, Clone, Debug, PartialEq)]
pub enum EncodeError {
    /// Latitude is not within ±89.99999°
    #[error("latitude {0} out of range")]
    InvalidLatitude(f64),

    /// Longitude is not within ±179.99999°
    #[error("longitude {0} out of range")]
    InvalidLongitude(f64),

    /// Symbol is not a table or overlay character followed by a symbol code
    #[error("invalid symbol \"{0}\"")]
    InvalidSymbol(String),

    /// Position ambiguity is greater than four digits
    #[error("position ambiguity {0} out of range")]
    InvalidAmbiguity(u8),

    /// Timestamp is more than an hour ahead or 28 days behind
    #[error("timestamp {0} too far from the current time")]
    TimestampOutOfRange(DateTime<Utc>),
}

/// Builds an APRS position report
///
/// The builder produces the *body* of a position packet. Prepend
/// your own `SRC>DST,PATH:` header to transmit it.
///
/// ```
/// use aprsfap::PositionBuilder;
///
/// let body = PositionBuilder::new(49.0583333, -72.0291666)
///     .with_symbol("/>")
///     .with_course(88)
///     .with_speed(66.7)
///     .with_comment("mobile")
///     .encode()
///     .expect("valid position");
/// assert_eq!("!4903.50N/07201.75W>088/036mobile", body);
/// ```
///
/// Positions are uncompressed by default. Speed is in km/h and
/// altitude is in metres, as in decoded [`Packet`](crate::Packet)s.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionBuilder {
    latitude: f64,
    longitude: f64,
    symbol: String,
    speed: Option<f64>,
    course: Option<u16>,
    altitude: Option<f64>,
    comment: String,
    timestamp: Option<DateTime<Utc>>,
    ambiguity: u8,
    dao: bool,
    compression: bool,
    messaging: bool,
}

impl PositionBuilder {
    /// New position report at the given coordinates
    ///
    /// Latitude and longitude are in decimal degrees, positive
    /// north and east. The default symbol is `//`, a red dot.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            symbol: "//".to_owned(),
            speed: None,
            course: None,
            altitude: None,
            comment: String::new(),
            timestamp: None,
            ambiguity: 0,
            dao: false,
            compression: false,
            messaging: false,
        }
    }

    /// Symbol table (or overlay) and symbol code
    ///
    /// Two characters, like `/>` for a car. The table may be
    /// `/`, `\`, or an overlay letter or digit.
    pub fn with_symbol(&mut self, symbol: &str) -> &mut Self {
        self.symbol = symbol.to_owned();
        self
    }

    /// Speed over ground, km/h
    pub fn with_speed(&mut self, speed: f64) -> &mut Self {
        self.speed = Some(speed);
        self
    }

    /// Course over ground, degrees true
    pub fn with_course(&mut self, course: u16) -> &mut Self {
        self.course = Some(course);
        self
    }

    /// Altitude, metres
    pub fn with_altitude(&mut self, altitude: f64) -> &mut Self {
        self.altitude = Some(altitude);
        self
    }

    /// Free-text comment
    pub fn with_comment(&mut self, comment: &str) -> &mut Self {
        self.comment = comment.to_owned();
        self
    }

    /// Time of the report
    ///
    /// The timestamp may be at most one hour in the future and
    /// at most 28 days in the past, relative to the encoding time.
    pub fn with_timestamp(&mut self, timestamp: DateTime<Utc>) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Blank the last `digits` digits of the minutes
    ///
    /// Ambiguity from 0 (exact) to 4 (whole degrees). Applies to
    /// uncompressed positions only.
    pub fn with_ambiguity(&mut self, digits: u8) -> &mut Self {
        self.ambiguity = digits;
        self
    }

    /// Append a `!DAO!` extension for extra precision
    ///
    /// Applies to uncompressed, unambiguous positions only.
    pub fn with_dao(&mut self, enable: bool) -> &mut Self {
        self.dao = enable;
        self
    }

    /// Use base-91 compressed encoding
    pub fn with_compression(&mut self, enable: bool) -> &mut Self {
        self.compression = enable;
        self
    }

    /// Advertise that this station can receive messages
    pub fn with_messaging(&mut self, enable: bool) -> &mut Self {
        self.messaging = enable;
        self
    }

    /// Encode the report
    ///
    /// Timestamps are checked and formatted against the current
    /// system time.
    pub fn encode(&self) -> Result<String, EncodeError> {
        self.encode_at(Utc::now())
    }

    /// Encode the report at a given time
    pub fn encode_at(&self, now: DateTime<Utc>) -> Result<String, EncodeError> {
        if !self.latitude.is_finite() || self.latitude.abs() > MAX_LATITUDE {
            return Err(EncodeError::InvalidLatitude(self.latitude));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > MAX_LONGITUDE {
            return Err(EncodeError::InvalidLongitude(self.longitude));
        }
        let (table, code) = self.symbol()?;
        if self.ambiguity > MAX_AMBIGUITY {
            return Err(EncodeError::InvalidAmbiguity(self.ambiguity));
        }

        let mut out = String::new();
        out.push(match (self.timestamp.is_some(), self.messaging) {
            (false, false) => '!',
            (false, true) => '=',
            (true, false) => '/',
            (true, true) => '@',
        });
        if let Some(stamp) = &self.timestamp {
            if *stamp - now > Duration::hours(1) || now - *stamp > Duration::days(28) {
                return Err(EncodeError::TimestampOutOfRange(*stamp));
            }
            out.push_str(&format_timestamp(stamp, &now));
        }

        let dao = if self.compression {
            self.push_compressed(&mut out, table, code);
            None
        } else {
            self.push_uncompressed(&mut out, table, code)
        };

        if let Some(altitude) = self.altitude {
            let feet = (altitude / FEET_TO_METERS).round().clamp(-99999.0, 999999.0) as i64;
            if feet < 0 {
                out.push_str(&format!("/A=-{:05}", -feet));
            } else {
                out.push_str(&format!("/A={:06}", feet));
            }
        }
        out.push_str(&self.comment);
        if let Some(dao) = dao {
            out.push_str(&dao);
        }
        Ok(out)
    }

    fn symbol(&self) -> Result<(char, char), EncodeError> {
        lazy_static! {
            static ref RE: Regex =
                Regex::new(r"^[/\\A-Z0-9][\x21-\x7b\x7d]$").expect("bad symbol regexp");
        }

        let mut chars = self.symbol.chars();
        match (RE.is_match(&self.symbol), chars.next(), chars.next()) {
            (true, Some(table), Some(code)) => Ok((table, code)),
            _ => Err(EncodeError::InvalidSymbol(self.symbol.clone())),
        }
    }

    // Returns the DAO extension, if one is wanted
    fn push_uncompressed(&self, out: &mut String, table: char, code: char) -> Option<String> {
        let dao = self.dao && self.ambiguity == 0;
        let scale = if dao { 10000 } else { 100 };

        let (lat_deg, lat_min, lat_frac) = split_minutes(self.latitude, 90, scale);
        let (lon_deg, lon_min, lon_frac) = split_minutes(self.longitude, 180, scale);
        let (lat_hund, lon_hund) = if dao {
            (lat_frac / 100, lon_frac / 100)
        } else {
            (lat_frac, lon_frac)
        };

        let lat = format!("{:02}{:02}.{:02}", lat_deg, lat_min, lat_hund);
        let lon = format!("{:03}{:02}.{:02}", lon_deg, lon_min, lon_hund);
        out.push_str(&blank_digits(&lat, self.ambiguity));
        out.push(if self.latitude < 0.0 { 'S' } else { 'N' });
        out.push(table);
        out.push_str(&blank_digits(&lon, self.ambiguity));
        out.push(if self.longitude < 0.0 { 'W' } else { 'E' });
        out.push(code);

        if self.speed.is_some() || self.course.is_some() {
            let course = match self.course.map(|c| c % 360) {
                Some(0) => 360,
                Some(c) => c,
                None => 0,
            };
            let knots = self
                .speed
                .map(|kmh| (kmh / KNOT_TO_KMH).round().clamp(0.0, 999.0) as u16)
                .unwrap_or(0);
            out.push_str(&format!("{:03}/{:03}", course, knots));
        }

        if dao {
            Some(format!(
                "!w{}{}!",
                dao_digit(lat_frac % 100),
                dao_digit(lon_frac % 100)
            ))
        } else {
            None
        }
    }

    fn push_compressed(&self, out: &mut String, table: char, code: char) {
        let lat = (380926.0 * (90.0 - self.latitude)).round() as u64;
        let lon = (190463.0 * (180.0 + self.longitude)).round() as u64;

        // numeric overlays are sent as a-j
        out.push(match table {
            '0'..='9' => char::from(table as u8 - b'0' + b'a'),
            t => t,
        });
        out.push_str(&base91::encode(lat, 4));
        out.push_str(&base91::encode(lon, 4));
        out.push(code);

        if self.speed.is_none() && self.course.is_none() {
            out.push_str("  ");
        } else {
            let course = self
                .course
                .map(|c| (f64::from(c) / 4.0).round() as u8)
                .filter(|c| *c <= 89)
                .unwrap_or(0);
            let speed = self
                .speed
                .map(|kmh| {
                    ((kmh / KNOT_TO_KMH + 1.0).ln() / 1.08f64.ln())
                        .round()
                        .clamp(0.0, 89.0) as u8
                })
                .unwrap_or(0);
            out.push(char::from(course + 33));
            out.push(char::from(speed + 33));
        }
        out.push(COMPRESSION_TYPE);
    }
}

// Degrees, whole minutes and minute fraction in units of 1/scale
fn split_minutes(value: f64, max_deg: u64, scale: u64) -> (u64, u64, u64) {
    let per_degree = 60 * scale;
    let units = ((value.abs() * per_degree as f64).round() as u64).min(max_deg * per_degree - 1);
    (
        units / per_degree,
        units % per_degree / scale,
        units % scale,
    )
}

// Replace the last `count` digits with spaces
fn blank_digits(text: &str, count: u8) -> String {
    let mut remaining = count;
    let mut chars: Vec<char> = text.chars().collect();
    for c in chars.iter_mut().rev() {
        if remaining == 0 {
            break;
        }
        if c.is_ascii_digit() {
            *c = ' ';
            remaining -= 1;
        }
    }
    chars.into_iter().collect()
}

// Two decimal digits as one base-91 character
fn dao_digit(digits: u64) -> char {
    char::from((digits as f64 / 1.1 + 0.5).floor() as u8 + 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_uncompressed() {
        let body = PositionBuilder::new(60.4752, 25.0947)
            .with_symbol("/#")
            .encode_at(now())
            .unwrap();
        assert_eq!("!6028.51N/02505.68E#", body);

        let body = PositionBuilder::new(-33.5, -70.25)
            .encode_at(now())
            .unwrap();
        assert_eq!("!3330.00S/07015.00W/", body);
    }

    #[test]
    fn test_extensions() {
        let body = PositionBuilder::new(49.0583333, -72.0291666)
            .with_symbol("/>")
            .with_course(88)
            .with_speed(36.0 * KNOT_TO_KMH)
            .with_altitude(1234.0 * FEET_TO_METERS)
            .with_comment("hello")
            .encode_at(now())
            .unwrap();
        assert_eq!("!4903.50N/07201.75W>088/036/A=001234hello", body);

        let body = PositionBuilder::new(49.0583333, -72.0291666)
            .with_course(0)
            .with_altitude(-10.0)
            .encode_at(now())
            .unwrap();
        assert_eq!("!4903.50N/07201.75W/360/000/A=-00033", body);
    }

    #[test]
    fn test_ambiguity() {
        let mut builder = PositionBuilder::new(49.0583333, -72.0291666);
        builder.with_symbol("/>").with_ambiguity(2).with_dao(true);
        assert_eq!("!4903.  N/07201.  W>", builder.encode_at(now()).unwrap());

        builder.with_ambiguity(4);
        assert_eq!("!49  .  N/072  .  W>", builder.encode_at(now()).unwrap());

        builder.with_ambiguity(5);
        assert_eq!(
            Err(EncodeError::InvalidAmbiguity(5)),
            builder.encode_at(now())
        );
    }

    #[test]
    fn test_dao() {
        let body = PositionBuilder::new(60.475206, 25.094699)
            .with_symbol("/#")
            .with_comment("precise")
            .with_dao(true)
            .encode_at(now())
            .unwrap();
        assert_eq!("!6028.51N/02505.68E#precise!w72!", body);
    }

    #[test]
    fn test_timestamp() {
        let body = PositionBuilder::new(49.0583333, -72.0291666)
            .with_symbol("/>")
            .with_messaging(true)
            .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 15, 11, 30, 0).unwrap())
            .encode_at(now())
            .unwrap();
        assert_eq!("@113000h4903.50N/07201.75W>", body);

        let body = PositionBuilder::new(49.0583333, -72.0291666)
            .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 13, 9, 30, 0).unwrap())
            .encode_at(now())
            .unwrap();
        assert_eq!("/130930z4903.50N/07201.75W/", body);

        let body = PositionBuilder::new(49.0583333, -72.0291666)
            .with_messaging(true)
            .encode_at(now())
            .unwrap();
        assert!(body.starts_with('='));
    }

    #[test]
    fn test_timestamp_range() {
        let future = now() + Duration::hours(2);
        assert_eq!(
            Err(EncodeError::TimestampOutOfRange(future)),
            PositionBuilder::new(0.0, 0.0)
                .with_timestamp(future)
                .encode_at(now())
        );

        let past = now() - Duration::days(30);
        assert_eq!(
            Err(EncodeError::TimestampOutOfRange(past)),
            PositionBuilder::new(0.0, 0.0)
                .with_timestamp(past)
                .encode_at(now())
        );
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            Err(EncodeError::InvalidLatitude(90.0)),
            PositionBuilder::new(90.0, 0.0).encode_at(now())
        );
        assert_eq!(
            Err(EncodeError::InvalidLongitude(-180.0)),
            PositionBuilder::new(0.0, -180.0).encode_at(now())
        );
        assert!(matches!(
            PositionBuilder::new(f64::NAN, 0.0).encode_at(now()),
            Err(EncodeError::InvalidLatitude(_))
        ));
        for symbol in ["", "/", "a>", "//x", "/|"] {
            assert_eq!(
                Err(EncodeError::InvalidSymbol(symbol.to_owned())),
                PositionBuilder::new(0.0, 0.0)
                    .with_symbol(symbol)
                    .encode_at(now())
            );
        }
    }

    #[test]
    fn test_compressed() {
        let body = PositionBuilder::new(49.5, -72.75)
            .with_symbol("/>")
            .with_compression(true)
            .with_course(88)
            .with_speed(36.2 * KNOT_TO_KMH)
            .encode_at(now())
            .unwrap();
        assert_eq!("!/5L!!<*e8>7PA", body);

        let body = PositionBuilder::new(49.5, -72.75)
            .with_symbol("3#")
            .with_compression(true)
            .with_ambiguity(3)
            .with_dao(true)
            .encode_at(now())
            .unwrap();
        assert_eq!("!d5L!!<*e8#  A", body);
    }

    #[test]
    fn test_helpers() {
        assert_eq!((60, 28, 51), split_minutes(60.4752, 90, 100));
        assert_eq!((89, 59, 99), split_minutes(89.99999, 90, 100));
        assert_eq!("123 .  ", blank_digits("1234.56", 3));
        assert_eq!('!', dao_digit(0));
        assert_eq!('{', dao_digit(99));
    }
}
