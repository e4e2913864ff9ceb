//! Objects and items
//!
//! Objects and items are positions reported on behalf of
//! something other than the transmitting station. Objects carry
//! a timestamp; items do not.

use lazy_static::lazy_static;
use regex::Regex;

use crate::dispatch::decode_position_and_comment;
use crate::options::Context;
use crate::packet::{Packet, PacketType};
use crate::resultcode::{Outcome, ResultCode};

/// Minimum object length: header, timestamp and compressed position
pub(crate) const OBJECT_MIN_LEN: usize = 31;

/// Minimum item length
pub(crate) const ITEM_MIN_LEN: usize = 18;

/// Decode a `;NAME_____*DDHHMMz...` object body
pub(crate) fn decode_object(body: &str, pkt: &mut Packet, ctx: &Context) -> Outcome {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^;([\x20-\x7e]{9})(\*|_)(\d{6})(z|h|/)").expect("bad object regexp");
    }

    if body.len() < OBJECT_MIN_LEN {
        return Err(ResultCode::ObjectShort.into());
    }
    let caps = RE.captures(body).ok_or(ResultCode::ObjectInvalid)?;

    pkt.packet_type = Some(PacketType::Object);
    pkt.object_name = Some(caps[1].to_owned());
    pkt.alive = Some(&caps[2] == "*");

    let stamp = format!("{}{}", &caps[3], &caps[4]);
    match ctx.timestamp(&stamp) {
        Some(ts) => pkt.timestamp = Some(ts),
        None => pkt.warn(ResultCode::TimestampInvalidObject),
    }

    // the position follows the 18-byte header
    decode_position_and_comment(&body[18..], pkt, ResultCode::ObjectDecodeError)
}

/// Decode a `)NAME!...` item body
pub(crate) fn decode_item(body: &str, pkt: &mut Packet) -> Outcome {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^\)([\x20\x22-\x5e\x60-\x7e]{3,9})(!|_)")
            .expect("bad item regexp");
    }

    if body.len() < ITEM_MIN_LEN {
        return Err(ResultCode::ItemShort.into());
    }
    let caps = RE.captures(body).ok_or(ResultCode::ItemInvalid)?;
    let name = &caps[1];

    pkt.packet_type = Some(PacketType::Item);
    pkt.item_name = Some(name.to_owned());
    pkt.alive = Some(&caps[2] == "!");

    let offset = 2 + name.len();
    decode_position_and_comment(&body[offset..], pkt, ResultCode::ItemDecodeError)
}
