//! Packet decoding loop
//!
//! Input is split into packets: lines of TNC-2 text or, in KISS
//! mode, `FEND`-delimited frames. Each packet is decoded and
//! written to the output as a one-line summary or as JSON.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use log::{debug, warn};

use aprsfap::{frame_to_text, Packet, ParserOptions, FEND};

use crate::cli::Args;

/// Configuration
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub options: ParserOptions,
    pub kiss: bool,
    pub json: bool,
    pub quiet: bool,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            options: ParserOptions::new()
                .with_ax25(args.ax25)
                .with_broken_mice(args.accept_broken_mice)
                .with_raw_timestamp(args.raw_timestamp),
            kiss: args.kiss,
            json: args.json,
            quiet: args.quiet,
        }
    }
}

/// Packet counts for one run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Packets decoded successfully
    pub decoded: usize,

    /// Packets with an error
    pub rejected: usize,

    /// KISS frames which were not APRS
    pub skipped: usize,
}

/// Run the application
///
/// Reads packets from `input` until it is exhausted and writes
/// each decoded packet to `output`.
pub fn run<R, W>(config: &Config, input: R, output: &mut W) -> anyhow::Result<Summary>
where
    R: BufRead,
    W: Write,
{
    let mut summary = Summary::default();
    let delimiter = if config.kiss { FEND } else { b'\n' };

    for chunk in input.split(delimiter) {
        let chunk = chunk.context("unable to read input")?;
        let text = if config.kiss {
            if chunk.is_empty() {
                continue;
            }
            match frame_to_text(&chunk) {
                Some(text) => text,
                None => {
                    debug!("skipping {}-byte KISS frame", chunk.len());
                    summary.skipped += 1;
                    continue;
                }
            }
        } else {
            let line = String::from_utf8_lossy(&chunk);
            let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
            if line.is_empty() || line.starts_with('#') {
                // blank lines and APRS-IS server comments
                continue;
            }
            line.to_owned()
        };

        let pkt = config.options.decode(&text);
        if pkt.is_ok() {
            summary.decoded += 1;
        } else {
            summary.rejected += 1;
            warn!(
                "{}: {}",
                pkt.result_message.as_deref().unwrap_or_default(),
                pkt.orig_packet
            );
        }

        if !config.quiet {
            write_packet(config, &pkt, output).context("unable to write output")?;
        }
    }

    Ok(summary)
}

fn write_packet<W: Write>(config: &Config, pkt: &Packet, output: &mut W) -> io::Result<()> {
    if config.json {
        serde_json::to_writer(&mut *output, pkt)?;
        writeln!(output)
    } else {
        writeln!(output, "{}", pkt)
    }
}
