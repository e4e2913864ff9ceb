//! APRS messages, acknowledgements and rejections

use lazy_static::lazy_static;
use regex::Regex;

use crate::packet::{Packet, PacketType};
use crate::resultcode::{Outcome, ResultCode};

/// Decode a `:ADDRESSEE:text{id` message body
///
/// `body` includes the leading `:`. The addressee is padded to
/// nine characters on the wire and trimmed here. Acknowledgements
/// and rejections set [`message_ack`](Packet::message_ack) or
/// [`message_rej`](Packet::message_rej) instead of the message
/// text.
pub(crate) fn decode_message(body: &str, pkt: &mut Packet) -> Outcome {
    lazy_static! {
        static ref MESSAGE: Regex = Regex::new(r"^:([A-Za-z0-9_ -]{9}):([^\x00-\x1f\x7f]+)$")
            .expect("bad message regexp");
        static ref ACK: Regex =
            Regex::new(r"^ack([A-Za-z0-9}]{1,5})\s*$").expect("bad message ack regexp");
        static ref REJ: Regex =
            Regex::new(r"^rej([A-Za-z0-9}]{1,5})\s*$").expect("bad message rej regexp");
        static ref WITH_ID: Regex =
            Regex::new(r"^([^{]*)\{([A-Za-z0-9]{1,5})(\}[A-Za-z0-9]{1,5}|\}|)\s*$")
                .expect("bad message id regexp");
        static ref TELEMETRY: Regex =
            Regex::new(r"^(BITS|PARM|UNIT|EQNS)\.").expect("bad telemetry message regexp");
    }

    let body = body.trim_end_matches(|c: char| c == '\r' || c == '\n');
    let caps = MESSAGE
        .captures(body)
        .ok_or(ResultCode::MessageInvalid)?;
    let destination = caps[1].trim().to_owned();
    let text = &caps[2];

    pkt.packet_type = Some(PacketType::Message);
    pkt.destination = Some(destination);

    if let Some(ack) = ACK.captures(text) {
        pkt.message_ack = Some(ack[1].to_owned());
        return Ok(());
    }
    if let Some(rej) = REJ.captures(text) {
        pkt.message_rej = Some(rej[1].to_owned());
        return Ok(());
    }

    let message = match WITH_ID.captures(text) {
        Some(id) => {
            pkt.message_id = Some(id[2].to_owned());
            let reply_ack = id[3].trim_start_matches('}');
            if !reply_ack.is_empty() {
                pkt.message_reply_ack = Some(reply_ack.to_owned());
            }
            id[1].to_owned()
        }
        None => text.to_owned(),
    };

    if message.contains(|c: char| matches!(c, '|' | '~' | '{')) {
        return Err(ResultCode::MessageInvalid.with_detail("reserved character in message text"));
    }
    if TELEMETRY.is_match(&message) {
        pkt.packet_type = Some(PacketType::TelemetryMessage);
    }
    pkt.message = Some(message);
    Ok(())
}
