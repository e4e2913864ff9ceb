//! `T#` telemetry reports

use lazy_static::lazy_static;
use regex::Regex;

use crate::packet::{Packet, PacketType, Telemetry};
use crate::resultcode::{Outcome, ResultCode};

/// Decode a `T#sss,a1,a2,a3,a4,a5,bbbbbbbb` telemetry body
///
/// `data` follows the `T#` prefix. Missing analog channels are
/// `None`. A non-numeric sequence, like `MIC`, is accepted and
/// reported as no sequence number.
pub(crate) fn decode_telemetry(data: &str, pkt: &mut Packet) -> Outcome {
    lazy_static! {
        static ref VALUE: Regex =
            Regex::new(r"^-?(\d+|\d+\.\d+|\.\d+)$").expect("bad telemetry regexp");
        static ref BITS: Regex = Regex::new(r"^[01]{0,8}$").expect("bad telemetry regexp");
    }

    let mut fields = data.trim_end().split(',');
    let sequence = fields.next().and_then(|s| s.trim().parse::<u32>().ok());

    let mut tlm = Telemetry {
        sequence,
        ..Default::default()
    };
    for slot in tlm.values.iter_mut() {
        let field = match fields.next() {
            Some(f) => f.trim(),
            None => break,
        };
        if field.is_empty() {
            continue;
        }
        if !VALUE.is_match(field) {
            return Err(ResultCode::TelemetryInvalid.with_detail(field));
        }
        let value: f64 = field
            .parse()
            .map_err(|_| ResultCode::TelemetryInvalid.with_detail(field))?;
        if value.abs() > 2147483647.0 {
            return Err(ResultCode::TelemetryLarge.with_detail(field));
        }
        *slot = Some(value);
    }

    if let Some(bits) = fields.next().map(str::trim) {
        if !BITS.is_match(bits) {
            return Err(ResultCode::TelemetryInvalid.with_detail(bits));
        }
        tlm.bits = Some(format!("{:0<8}", bits));
    }

    pkt.packet_type = Some(PacketType::Telemetry);
    pkt.telemetry = Some(tlm);
    Ok(())
}
