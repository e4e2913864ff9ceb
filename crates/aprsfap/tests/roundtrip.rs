use aprsfap::{frame_to_text, text_to_frame, ParserOptions, PositionBuilder, PositionFormat};

use assert_approx_eq::assert_approx_eq;
use chrono::{DateTime, TimeZone, Utc};

const POSITIONS: &[(f64, f64)] = &[
    (60.4752, 25.0947),
    (-33.8688, 151.2093),
    (49.0583333, -72.0291666),
    (-0.0001, -0.0001),
    (89.99999, 179.99999),
    (-89.99999, -179.99999),
];

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

fn decode_body(body: &str) -> aprsfap::Packet {
    let pkt = ParserOptions::new().decode_at(&format!("N0CALL>APRS:{}", body), now());
    assert!(pkt.is_ok(), "{}: {:?}", body, pkt.result_message);
    pkt
}

#[test]
fn test_uncompressed_round_trip() {
    for (lat, lon) in POSITIONS {
        let body = PositionBuilder::new(*lat, *lon)
            .with_symbol("/>")
            .encode_at(now())
            .unwrap();
        let pkt = decode_body(&body);
        assert_eq!(Some(PositionFormat::Uncompressed), pkt.format);
        assert_approx_eq!(*lat, pkt.latitude.unwrap(), 0.01 / 60.0);
        assert_approx_eq!(*lon, pkt.longitude.unwrap(), 0.01 / 60.0);
    }
}

#[test]
fn test_dao_round_trip() {
    for (lat, lon) in POSITIONS {
        let body = PositionBuilder::new(*lat, *lon)
            .with_symbol("/>")
            .with_dao(true)
            .encode_at(now())
            .unwrap();
        let pkt = decode_body(&body);
        assert_eq!(Some('W'), pkt.dao_datum_byte);
        assert_approx_eq!(0.1852, pkt.pos_resolution.unwrap());
        assert_approx_eq!(*lat, pkt.latitude.unwrap(), 0.0002 / 60.0);
        assert_approx_eq!(*lon, pkt.longitude.unwrap(), 0.0002 / 60.0);
        assert_eq!(None, pkt.comment);
    }
}

#[test]
fn test_compressed_round_trip() {
    for (lat, lon) in POSITIONS {
        let body = PositionBuilder::new(*lat, *lon)
            .with_symbol("\\k")
            .with_compression(true)
            .encode_at(now())
            .unwrap();
        let pkt = decode_body(&body);
        assert_eq!(Some(PositionFormat::Compressed), pkt.format);
        assert_eq!(Some('\\'), pkt.symbol_table);
        assert_eq!(Some('k'), pkt.symbol_code);
        assert_approx_eq!(*lat, pkt.latitude.unwrap(), 3.0e-6);
        assert_approx_eq!(*lon, pkt.longitude.unwrap(), 3.0e-6);
    }
}

#[test]
fn test_extensions_round_trip() {
    let stamp = Utc.with_ymd_and_hms(2024, 3, 15, 11, 30, 0).unwrap();
    let body = PositionBuilder::new(49.0583333, -72.0291666)
        .with_symbol("/>")
        .with_course(88)
        .with_speed(36.0 * 1.852)
        .with_altitude(1000.0)
        .with_comment("Test drive")
        .with_timestamp(stamp)
        .with_messaging(true)
        .encode_at(now())
        .unwrap();

    let pkt = decode_body(&body);
    assert_eq!(Some(true), pkt.messaging);
    assert_eq!(Some(stamp), pkt.timestamp.and_then(|t| t.datetime().cloned()));
    assert_eq!(Some(88), pkt.course);
    assert_approx_eq!(36.0 * 1.852, pkt.speed.unwrap(), 1.0e-6);
    assert_approx_eq!(1000.0, pkt.altitude.unwrap(), 0.2);
    assert_eq!(Some("Test drive"), pkt.comment.as_deref());

    let body = PositionBuilder::new(49.0583333, -72.0291666)
        .with_symbol("/>")
        .with_course(88)
        .with_speed(36.2 * 1.852)
        .with_altitude(1000.0)
        .with_compression(true)
        .encode_at(now())
        .unwrap();
    let pkt = decode_body(&body);
    assert_eq!(Some(88), pkt.course);
    assert_approx_eq!(36.2 * 1.852, pkt.speed.unwrap(), 0.5);
    assert_approx_eq!(1000.0, pkt.altitude.unwrap(), 0.2);
}

#[test]
fn test_ambiguity_round_trip() {
    for ambiguity in 0..=4u8 {
        let body = PositionBuilder::new(49.0583333, -72.0291666)
            .with_ambiguity(ambiguity)
            .encode_at(now())
            .unwrap();
        let pkt = decode_body(&body);
        assert_eq!(Some(ambiguity), pkt.pos_ambiguity);
    }
}

#[test]
fn test_kiss_round_trip() {
    let packets = [
        "N0CALL>APRS:>status",
        "N0CALL-15>APRS-1,WIDE1-1*:!4903.50N/07201.75W>",
        "OH2RDP-1>BEACON-15,OH2RDG*,WIDE:!6028.51N/02505.68E#PHG7220/RELAY,WIDE, OH2AP Jarvenpaa",
        "W1AW>APRS,A*,B*,C*,D,E,F,G,H-15:>eight digipeaters",
    ];
    for text in packets {
        let frame = text_to_frame(text).unwrap();
        assert_eq!(Some(text.to_owned()), frame_to_text(&frame));

        // the decoded frame is a valid AX.25 packet
        let pkt = ParserOptions::new().with_ax25(true).decode_at(text, now());
        assert!(pkt.is_ok(), "{}: {:?}", text, pkt.result_message);
    }
}

#[test]
fn test_kiss_zero_ssid() {
    let frame = text_to_frame("N0CALL-0>APRS-0,WIDE1-0*:>zero").unwrap();
    assert_eq!(
        Some("N0CALL>APRS,WIDE1*:>zero".to_owned()),
        frame_to_text(&frame)
    );
    assert_eq!(text_to_frame("N0CALL>APRS,WIDE1*:>zero"), Some(frame));
}
