//! Weather reports
//!
//! Weather data arrives in three shapes: the text fields which
//! follow a position with the `_` weather symbol, positionless
//! `_MMDDHHMM` reports, and Peet Bros Ultimeter hexadecimal
//! records (`$ULTW` packet mode and `!!` logging mode).

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

use crate::packet::Weather;
use crate::units::{
    fahrenheit_to_celsius, round_to, HINCH_TO_MM, INCH_TO_MM, KMH_TO_MS, MPH_TO_MS,
};

/// Parse textual weather fields
///
/// The report should begin with wind direction and speed, either
/// `DDD/SSS` or `cDDDsSSS`. Gust, temperature, rain, humidity,
/// pressure, luminosity and snow fields may follow in any order.
/// Any unrecognized tail becomes the station software token, if
/// short, or a comment. Returns `None` if nothing was decoded.
pub(crate) fn parse_weather(report: &str) -> Option<(Weather, Option<String>)> {
    lazy_static! {
        static ref LEADERS: Vec<(Regex, bool, bool)> = [
            (r"^_?([\d .\-]{3})/([\d .]{3})g([\d .]+)t(-?[\d .]+)", true, true),
            (r"^_?c([\d .\-]{3})s([\d .]{3})g([\d .]+)t(-?[\d .]+)", true, true),
            (r"^_?([\d .\-]{3})/([\d .]{3})t(-?[\d .]+)", false, true),
            (r"^_?([\d .\-]{3})/([\d .]{3})g([\d .]+)", true, false),
            (r"^_?c([\d .\-]{3})s([\d .]{3})g([\d .]+)", true, false),
            (r"^_?c([\d .\-]{3})s([\d .]{3})t(-?[\d .]+)", false, true),
            (r"^_?c([\d .\-]{3})s([\d .]{3})", false, false),
            (r"^_?([\d .\-]{3})/([\d .]{3})", false, false),
        ]
        .iter()
        .map(|(re, gust, temp)| (Regex::new(re).expect("bad weather regexp"), *gust, *temp))
        .collect();
        static ref GUST: Regex = Regex::new(r"g(\d{1,3})").expect("bad weather regexp");
        static ref TEMP: Regex = Regex::new(r"t(-?\d{1,3})").expect("bad weather regexp");
        static ref RAIN_1H: Regex = Regex::new(r"r(\d{1,3})").expect("bad weather regexp");
        static ref RAIN_24H: Regex = Regex::new(r"p(\d{1,3})").expect("bad weather regexp");
        static ref RAIN_MIDNIGHT: Regex = Regex::new(r"P(\d{1,3})").expect("bad weather regexp");
        static ref HUMIDITY: Regex = Regex::new(r"h(\d{1,3})").expect("bad weather regexp");
        static ref PRESSURE: Regex = Regex::new(r"b(\d{4,5})").expect("bad weather regexp");
        static ref LUMINOSITY: Regex = Regex::new(r"([lL])(\d{1,3})").expect("bad weather regexp");
        static ref SNOW: Regex = Regex::new(r"s(\d{1,3})").expect("bad weather regexp");
        static ref SOFT: Regex = Regex::new(r"^[a-zA-Z0-9\-_]{3,5}$").expect("bad weather regexp");
    }

    let mut wx = Weather::default();
    let mut rest = report.to_owned();

    // the leading wind block, with optional gust and temperature
    if let Some((caps, has_gust, has_temp)) = LEADERS
        .iter()
        .find_map(|(re, gust, temp)| re.captures(report).map(|caps| (caps, *gust, *temp)))
    {
        let dir = caps.get(1).map(|m| m.as_str());
        let speed = caps.get(2).map(|m| m.as_str());
        let gust = caps.get(3).filter(|_| has_gust);
        let temp = caps
            .get(if has_gust { 4 } else { 3 })
            .filter(|_| has_temp);

        wx.wind_direction = dir.and_then(parse_int).map(|d| d as f64);
        wx.wind_speed = speed
            .and_then(parse_int)
            .map(|mph| round_to(mph as f64 * MPH_TO_MS, 1));
        wx.wind_gust = gust
            .and_then(|m| parse_int(m.as_str()))
            .map(|mph| round_to(mph as f64 * MPH_TO_MS, 1));
        wx.temp = temp
            .and_then(|m| parse_int(m.as_str()))
            .map(|f| round_to(fahrenheit_to_celsius(f as f64), 1));

        rest = report[caps[0].len()..].to_owned();
    }

    if wx.wind_gust.is_none() {
        if let Some(v) = take(&GUST, &mut rest) {
            wx.wind_gust = parse_int(&v).map(|mph| round_to(mph as f64 * MPH_TO_MS, 1));
        }
    }
    if wx.temp.is_none() {
        if let Some(v) = take(&TEMP, &mut rest) {
            wx.temp = parse_int(&v).map(|f| round_to(fahrenheit_to_celsius(f as f64), 1));
        }
    }
    if let Some(v) = take(&RAIN_1H, &mut rest) {
        wx.rain_1h = parse_int(&v).map(|r| round_to(r as f64 * HINCH_TO_MM, 1));
    }
    if let Some(v) = take(&RAIN_24H, &mut rest) {
        wx.rain_24h = parse_int(&v).map(|r| round_to(r as f64 * HINCH_TO_MM, 1));
    }
    if let Some(v) = take(&RAIN_MIDNIGHT, &mut rest) {
        wx.rain_midnight = parse_int(&v).map(|r| round_to(r as f64 * HINCH_TO_MM, 1));
    }
    if let Some(v) = take(&HUMIDITY, &mut rest) {
        wx.humidity = parse_int(&v).and_then(humidity);
    }
    if let Some(v) = take(&PRESSURE, &mut rest) {
        wx.pressure = parse_int(&v).map(|p| round_to(p as f64 / 10.0, 1));
    }
    let lum = LUMINOSITY
        .captures(&rest)
        .and_then(|caps| Some((caps.get(0)?.range(), caps[1].to_owned(), caps[2].to_owned())));
    if let Some((span, unit, value)) = lum {
        let lum = parse_int(&value).map(|l| if unit == "l" { l + 1000 } else { l });
        wx.luminosity = lum.and_then(|l| u16::try_from(l).ok());
        rest.replace_range(span, "");
    }
    if let Some(v) = take(&SNOW, &mut rest) {
        wx.snow_24h = parse_int(&v).map(|s| round_to(s as f64 * INCH_TO_MM, 1));
    }

    if wx.is_empty() {
        trace!("no weather fields in \"{}\"", report);
        return None;
    }

    let rest = rest.trim();
    let mut comment = None;
    if SOFT.is_match(rest) {
        wx.soft = Some(rest.to_owned());
    } else if !rest.is_empty() {
        comment = Some(rest.to_owned());
    }
    Some((wx, comment))
}

/// Decode Peet Bros Ultimeter `$ULTW` packet-mode data
///
/// `data` follows the `$ULTW` prefix. Each field is four hex
/// digits or `----` for "no data".
pub(crate) fn parse_peet_packet(data: &str) -> Option<Weather> {
    let vals = peet_fields(data);
    if vals.is_empty() {
        return None;
    }

    let mut wx = Weather::default();
    let mut vals = vals.into_iter();
    let mut next = || vals.next().flatten();

    wx.wind_gust = next().map(|t| round_to(f64::from(t) * KMH_TO_MS / 10.0, 1));
    wx.wind_direction = next().map(|t| (f64::from(t & 0xff) * 1.41176).round());
    wx.temp = next().map(|t| round_to(fahrenheit_to_celsius(f64::from(t) / 10.0), 1));
    wx.rain_midnight = next().map(|t| round_to(f64::from(t) * HINCH_TO_MM, 1));
    wx.pressure = next()
        .filter(|t| *t >= 10)
        .map(|t| round_to(f64::from(t) / 10.0, 1));
    for _ in 0..3 {
        next();
    }
    wx.humidity = next().and_then(|t| humidity(i64::from(t) / 10));
    next();
    next();
    if let Some(t) = next() {
        wx.rain_midnight = Some(round_to(f64::from(t) * HINCH_TO_MM, 1));
    }
    wx.wind_speed = next().map(|t| round_to(f64::from(t) * KMH_TO_MS / 10.0, 1));

    Some(wx)
}

/// Decode Peet Bros Ultimeter `!!` logging-mode data
pub(crate) fn parse_peet_logging(data: &str) -> Option<Weather> {
    let vals = peet_fields(data);
    if vals.is_empty() {
        return None;
    }

    let mut wx = Weather::default();
    let mut vals = vals.into_iter();
    let mut next = || vals.next().flatten();

    wx.wind_speed = next().map(|t| round_to(f64::from(t) * KMH_TO_MS / 10.0, 1));
    wx.wind_direction = next().map(|t| (f64::from(t & 0xff) * 1.41176).round());
    wx.temp = next().map(|t| round_to(fahrenheit_to_celsius(f64::from(t) / 10.0), 1));
    wx.rain_midnight = next().map(|t| round_to(f64::from(t) * HINCH_TO_MM, 1));
    wx.pressure = next()
        .filter(|t| *t >= 10)
        .map(|t| round_to(f64::from(t) / 10.0, 1));
    wx.temp_in = next().map(|t| round_to(fahrenheit_to_celsius(f64::from(t) / 10.0), 1));
    wx.humidity = next().and_then(|t| humidity(i64::from(t) / 10));
    wx.humidity_in = next().and_then(|t| humidity(i64::from(t) / 10));
    next();
    next();
    if let Some(t) = next() {
        wx.rain_midnight = Some(round_to(f64::from(t) * HINCH_TO_MM, 1));
    }
    if let Some(t) = next() {
        wx.wind_speed = Some(round_to(f64::from(t) * KMH_TO_MS / 10.0, 1));
    }

    if wx.temp.is_none() {
        wx.temp = wx.temp_in;
    }
    if wx.humidity.is_none() {
        wx.humidity = wx.humidity_in;
    }
    Some(wx)
}

// Leading run of 4-digit signed hex fields; `----` is no data
fn peet_fields(data: &str) -> Vec<Option<i16>> {
    data.as_bytes()
        .chunks_exact(4)
        .map_while(|chunk| {
            if chunk == b"----" {
                Some(None)
            } else if chunk.iter().all(u8::is_ascii_hexdigit) {
                let text = std::str::from_utf8(chunk).ok()?;
                u16::from_str_radix(text, 16).ok().map(|v| Some(v as i16))
            } else {
                None
            }
        })
        .collect()
}

// Remove the first match of `re` from `rest`, returning group 1
fn take(re: &Regex, rest: &mut String) -> Option<String> {
    let (span, value) = {
        let caps = re.captures(rest)?;
        (caps.get(0)?.range(), caps.get(1)?.as_str().to_owned())
    };
    rest.replace_range(span, "");
    Some(value)
}

fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

// Humidity 0 means 100%
fn humidity(h: i64) -> Option<u8> {
    let h = if h == 0 { 100 } else { h };
    if (1..=100).contains(&h) {
        Some(h as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_full_report() {
        let (wx, comment) =
            parse_weather("220/004g005t077r000p000P000h50b09900wRSW").unwrap();
        assert_approx_eq!(220.0, wx.wind_direction.unwrap());
        assert_approx_eq!(1.8, wx.wind_speed.unwrap());
        assert_approx_eq!(2.2, wx.wind_gust.unwrap());
        assert_approx_eq!(25.0, wx.temp.unwrap());
        assert_approx_eq!(0.0, wx.rain_1h.unwrap());
        assert_approx_eq!(0.0, wx.rain_24h.unwrap());
        assert_approx_eq!(0.0, wx.rain_midnight.unwrap());
        assert_eq!(Some(50), wx.humidity);
        assert_approx_eq!(990.0, wx.pressure.unwrap());
        assert_eq!(Some("wRSW"), wx.soft.as_deref());
        assert_eq!(None, comment);
    }

    #[test]
    fn test_positionless_fields() {
        let (wx, _) = parse_weather("c220s004g005t-05r010h00b10132L123").unwrap();
        assert_approx_eq!(220.0, wx.wind_direction.unwrap());
        assert_approx_eq!(-20.6, wx.temp.unwrap());
        assert_approx_eq!(2.5, wx.rain_1h.unwrap());
        assert_eq!(Some(100), wx.humidity);
        assert_approx_eq!(1013.2, wx.pressure.unwrap());
        assert_eq!(Some(123), wx.luminosity);
    }

    #[test]
    fn test_missing_values_and_comment() {
        let (wx, comment) = parse_weather(".../...g...t050 Sunny and warm today").unwrap();
        assert_eq!(None, wx.wind_direction);
        assert_eq!(None, wx.wind_speed);
        assert_eq!(None, wx.wind_gust);
        assert_approx_eq!(10.0, wx.temp.unwrap());
        assert_eq!(Some("Sunny and warm today"), comment.as_deref());
    }

    #[test]
    fn test_order_independent() {
        let (wx, _) = parse_weather("090/010h99t032l050").unwrap();
        assert_approx_eq!(0.0, wx.temp.unwrap());
        assert_eq!(Some(99), wx.humidity);
        assert_eq!(Some(1050), wx.luminosity);
    }

    #[test]
    fn test_not_weather() {
        assert!(parse_weather("just a comment").is_none());
        assert!(parse_weather("").is_none());
    }

    #[test]
    fn test_peet_packet() {
        let wx =
            parse_peet_packet("0042004E02A800000000----0000----006800000000----001A").unwrap();
        assert_approx_eq!(1.8, wx.wind_gust.unwrap());
        assert_approx_eq!(110.0, wx.wind_direction.unwrap());
        assert_approx_eq!(20.0, wx.temp.unwrap());
        assert_approx_eq!(0.0, wx.rain_midnight.unwrap());
        assert_eq!(None, wx.pressure);
        assert_eq!(Some(10), wx.humidity);
        assert_approx_eq!(0.7, wx.wind_speed.unwrap());
    }

    #[test]
    fn test_peet_logging() {
        let wx = parse_peet_logging("0022007E01EA----2710----0258----").unwrap();
        assert_approx_eq!(0.9, wx.wind_speed.unwrap());
        assert_approx_eq!(178.0, wx.wind_direction.unwrap());
        assert_approx_eq!(9.4, wx.temp.unwrap());
        assert_eq!(None, wx.rain_midnight);
        assert_approx_eq!(1000.0, wx.pressure.unwrap());
        assert_eq!(Some(60), wx.humidity);
        assert!(parse_peet_logging("zzzz").is_none());
    }

    #[test]
    fn test_peet_fields() {
        assert_eq!(
            vec![Some(1), None, Some(-1)],
            peet_fields("0001----FFFFxyz")
        );
    }
}
