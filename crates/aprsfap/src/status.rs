//! Status reports and station capabilities

use lazy_static::lazy_static;
use regex::Regex;

use crate::options::Context;
use crate::packet::{Packet, PacketType};
use crate::resultcode::ResultCode;

/// Decode a `>` status report
///
/// `text` follows the `>`. A leading `DDHHMMz` timestamp is
/// parsed and removed; the rest is the status text.
pub(crate) fn decode_status(text: &str, pkt: &mut Packet, ctx: &Context) {
    lazy_static! {
        static ref STAMP: Regex = Regex::new(r"^(\d{6}z)").expect("bad status regexp");
    }

    pkt.packet_type = Some(PacketType::Status);
    let mut text = text;
    if let Some(m) = STAMP.find(text) {
        match ctx.timestamp(m.as_str()) {
            Some(ts) => pkt.timestamp = Some(ts),
            None => pkt.warn(ResultCode::TimestampInvalidStatus),
        }
        text = &text[m.end()..];
    }
    pkt.status = Some(text.trim().to_owned());
}

/// Decode a `<` capabilities report
///
/// `text` follows the `<`. Capabilities are comma-separated
/// tokens, either `KEY=VALUE` or a bare `KEY`.
pub(crate) fn decode_capabilities(text: &str, pkt: &mut Packet) {
    let caps: Vec<(String, Option<String>)> = text
        .trim_end()
        .split(',')
        .filter_map(|token| {
            let (key, value) = match token.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim().to_owned())),
                None => (token.trim(), None),
            };
            if key.is_empty() {
                None
            } else {
                Some((key.to_owned(), value))
            }
        })
        .collect();

    pkt.packet_type = Some(PacketType::Capabilities);
    if !caps.is_empty() {
        pkt.capabilities = Some(caps);
    }
}
