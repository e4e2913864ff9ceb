use aprsfap::{
    decode, Packet, PacketType, ParserOptions, PositionFormat, ResultCode, Timestamp,
};

use assert_approx_eq::assert_approx_eq;
use chrono::{DateTime, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

fn decode_now(packet: &str) -> Packet {
    ParserOptions::new().decode_at(packet, now())
}

#[test]
fn test_uncompressed_beacon() {
    let pkt = ParserOptions::new().with_ax25(true).decode_at(
        "OH2RDP-1>BEACON-15,OH2RDG*,WIDE:!6028.51N/02505.68E#PHG7220/RELAY,WIDE, OH2AP Jarvenpaa",
        now(),
    );
    assert!(pkt.is_ok());
    assert_eq!(Some(PositionFormat::Uncompressed), pkt.format);
    assert_approx_eq!(60.4752, pkt.latitude.unwrap(), 1.0e-4);
    assert_approx_eq!(25.0947, pkt.longitude.unwrap(), 1.0e-4);
    assert_approx_eq!(18.52, pkt.pos_resolution.unwrap());
    assert_eq!(Some(0), pkt.pos_ambiguity);
    assert_eq!(Some('/'), pkt.symbol_table);
    assert_eq!(Some('#'), pkt.symbol_code);
    assert_eq!(Some("7220"), pkt.phg.as_deref());
    assert_eq!(Some("RELAY,WIDE, OH2AP Jarvenpaa"), pkt.comment.as_deref());
    assert_eq!(2, pkt.digipeaters.len());
    assert_eq!("OH2RDG*", pkt.digipeaters[0].to_string());
}

#[test]
fn test_compressed_igate() {
    let pkt = decode_now("OH2KKU-15>APRS,TCPIP*,qAC,FOURTH:!I0-X;T_Wv&{-Aigate testing");
    assert!(pkt.is_ok());
    assert_eq!(Some(PositionFormat::Compressed), pkt.format);
    assert_eq!(Some('I'), pkt.symbol_table);
    assert_eq!(Some('&'), pkt.symbol_code);
    assert_approx_eq!(60.0520, pkt.latitude.unwrap(), 1.0e-4);
    assert_approx_eq!(24.5045, pkt.longitude.unwrap(), 1.0e-4);
    assert_eq!(Some("igate testing"), pkt.comment.as_deref());
    assert!(pkt.radio_range.is_some());
}

#[test]
fn test_mice() {
    let pkt = decode_now("N0CALL-9>S32UVT,WIDE1-1:`(_fn\"Oj/\"4T}Mobile");
    assert!(pkt.is_ok(), "{:?}", pkt.result_message);
    assert_eq!(Some(PacketType::Location), pkt.packet_type);
    assert_eq!(Some(PositionFormat::MicE), pkt.format);
    assert_approx_eq!(33.0 + 25.64 / 60.0, pkt.latitude.unwrap(), 1.0e-6);
    assert_approx_eq!(-(112.0 + 7.74 / 60.0), pkt.longitude.unwrap(), 1.0e-6);
    assert_eq!(Some(251), pkt.course);
    assert_eq!(Some("Returning"), pkt.mice_message());
    assert_eq!(Some("Mobile"), pkt.comment.as_deref());
}

#[test]
fn test_telemetry() {
    let pkt = decode_now("SRCCALL>APRS:T#324,000,038,257,255,50.12,01000001");
    assert!(pkt.is_ok());
    assert_eq!(Some(PacketType::Telemetry), pkt.packet_type);
    let tlm = pkt.telemetry.unwrap();
    assert_eq!(Some(324), tlm.sequence);
    assert_eq!(
        [Some(0.0), Some(38.0), Some(257.0), Some(255.0), Some(50.12)],
        tlm.values
    );
    assert_eq!(Some("01000001"), tlm.bits.as_deref());
}

#[test]
fn test_message_and_ack() {
    let pkt = decode_now("OH7LZB>APRS,TCPIP*,qAC,FOURTH::OH2RDP   :Hello there{001");
    assert!(pkt.is_ok());
    assert_eq!(Some(PacketType::Message), pkt.packet_type);
    assert_eq!(Some("OH2RDP"), pkt.destination.as_deref());
    assert_eq!(Some("Hello there"), pkt.message.as_deref());
    assert_eq!(Some("001"), pkt.message_id.as_deref());

    let pkt = decode_now("OH2RDP>APRS::OH7LZB   :ack001");
    assert_eq!(Some("001"), pkt.message_ack.as_deref());
}

#[test]
fn test_object_with_bad_timestamp() {
    let pkt = decode_now("N0CALL>APRS:;LEADER   *999999z4903.50N/07201.75W>088/036");
    assert!(pkt.is_ok());
    assert_eq!(Some(PacketType::Object), pkt.packet_type);
    assert_eq!(vec![ResultCode::TimestampInvalidObject], pkt.warnings);
    assert_eq!(None, pkt.timestamp);
    assert_approx_eq!(49.0583333, pkt.latitude.unwrap(), 1.0e-6);
    assert_eq!(Some(88), pkt.course);
}

#[test]
fn test_item() {
    let pkt = decode_now("N0CALL>APRS:)AID #2!4903.50N/07201.75WA");
    assert!(pkt.is_ok());
    assert_eq!(Some(PacketType::Item), pkt.packet_type);
    assert_eq!(Some("AID #2"), pkt.item_name.as_deref());
}

#[test]
fn test_status_and_capabilities() {
    let pkt = decode_now("N0CALL>APRS:>151130zNet Control Center");
    assert_eq!(Some(PacketType::Status), pkt.packet_type);
    assert_eq!(Some("Net Control Center"), pkt.status.as_deref());
    assert_eq!(
        Some(Timestamp::Resolved(
            Utc.with_ymd_and_hms(2024, 3, 15, 11, 30, 0).unwrap()
        )),
        pkt.timestamp
    );

    let pkt = decode_now("N0CALL>APRS:<IGATE,MSG_CNT=30,LOC_CNT=61");
    assert_eq!(Some(PacketType::Capabilities), pkt.packet_type);
    assert_eq!(3, pkt.capabilities.unwrap().len());
}

#[test]
fn test_raw_timestamp() {
    let pkt = ParserOptions::new()
        .with_raw_timestamp(true)
        .decode_at("N0CALL>APRS:@151130z4903.50N/07201.75W>", now());
    assert_eq!(Some(Timestamp::Raw("151130".to_owned())), pkt.timestamp);
}

#[test]
fn test_weather_station() {
    let pkt = decode_now(
        "N0CALL>APRS,TCPIP*:@151130z4903.50N/07201.75W_220/004g005t-07r000p000P000h50b09900wRSW",
    );
    assert!(pkt.is_ok());
    let wx = pkt.weather.unwrap();
    assert_approx_eq!(220.0, wx.wind_direction.unwrap());
    assert_approx_eq!(-21.7, wx.temp.unwrap());
    assert_approx_eq!(990.0, wx.pressure.unwrap());
}

#[test]
fn test_nmea() {
    let pkt = decode_now(
        "N0CALL>APRS:$GPRMC,145526,A,3349.0378,N,08406.2617,W,23.726,27.9,121207,4.9,W",
    );
    assert!(pkt.is_ok(), "{:?}", pkt.result_message);
    assert_eq!(Some(PositionFormat::Nmea), pkt.format);
    assert_approx_eq!(33.0 + 49.0378 / 60.0, pkt.latitude.unwrap());
}

#[test]
fn test_errors() {
    let pkt = decode("None>None,qAR,N0CALL:>Hi");
    assert_eq!(Some(ResultCode::DstCallNotAx25), pkt.result_code);
    assert_eq!("dstcall_noax25", pkt.result_code.unwrap().as_str());
    assert!(pkt.result_message.is_some());

    let pkt = decode("");
    assert_eq!(Some(ResultCode::PacketNo), pkt.result_code);

    let pkt = decode("N0CALL>APRS:T#hello");
    assert_eq!(Some(ResultCode::TypeNotSupported), pkt.result_code);
}

#[test]
fn test_position_too_short() {
    let pkt = decode_now("N0CALL>APRS:!4903.50N/0720");
    assert_eq!(None, pkt.result_code);
    assert_eq!(Some(PacketType::Location), pkt.packet_type);
    assert_eq!(None, pkt.latitude);
    assert_eq!(None, pkt.longitude);
}

#[test]
fn test_result_code_round_trip() {
    let code: ResultCode = "mice_amb_large".parse().unwrap();
    assert_eq!(ResultCode::MicEAmbiguityLarge, code);
    assert_eq!("mice_amb_large", code.as_str());
}
