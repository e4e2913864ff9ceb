//! Unit conversion factors
//!
//! Decoded values are always SI-flavored: kilometres per hour for
//! speed, metres for altitude, metres per second for wind and
//! degrees Celsius for temperature.

/// Knots to km/h
pub const KNOT_TO_KMH: f64 = 1.852;

/// Statute miles to kilometres
pub const MPH_TO_KMH: f64 = 1.609344;

/// km/h to m/s
pub const KMH_TO_MS: f64 = 10.0 / 36.0;

/// Miles per hour to m/s
pub const MPH_TO_MS: f64 = MPH_TO_KMH * KMH_TO_MS;

/// Feet to metres
pub const FEET_TO_METERS: f64 = 0.3048;

/// Hundredths of an inch to millimetres
pub const HINCH_TO_MM: f64 = 0.254;

/// Inches to millimetres
pub const INCH_TO_MM: f64 = 25.4;

/// Fahrenheit to Celsius
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) / 1.8
}

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
