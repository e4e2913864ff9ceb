use std::fmt::Display;

use clap::{error::ErrorKind, CommandFactory, Parser};

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program reads APRS packets in TNC-2 text format, one per line, and prints a summary of each decoded packet.

See --help for more details.
"#;

const USAGE_LONG: &str = r#"
This program reads APRS packets in TNC-2 text format, one per line, and prints a summary of each decoded packet. Packets which cannot be decoded are reported with the reason.

    N0CALL>APRS,WIDE1-1:!4903.50N/07201.75W>Mobile

You can decode a live APRS-IS feed with

    (echo "user N0CALL pass -1 filter r/60/25/100"; cat) \
        | nc rotate.aprs2.net 14580 \
        | aprsdec

With --kiss, the input is a binary stream of KISS frames instead, as produced by a TNC or software modem:

    nc localhost 8001 | aprsdec --kiss --ax25

Use --json to emit one JSON object per packet. Use --ax25 for packets heard over the air; APRS-IS packets may carry callsigns which are not valid on the air.
"#;

const DECODER: &str = "Decoder Options";

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING, not even packets
    #[arg(short, long)]
    pub quiet: bool,

    /// Input file (or "-" for stdin)
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Input is a binary stream of KISS frames
    #[arg(long)]
    pub kiss: bool,

    /// Print packets as JSON, one object per line
    #[arg(long)]
    pub json: bool,

    /// Require valid AX.25 callsigns
    ///
    /// Use for packets heard directly over the air. APRS-IS packets
    /// may carry longer Internet-only callsigns and q-constructs.
    #[arg(long)]
    #[arg(help_heading = DECODER)]
    pub ax25: bool,

    /// Repair Mic-E packets damaged by some digipeaters
    #[arg(long)]
    #[arg(help_heading = DECODER)]
    pub accept_broken_mice: bool,

    /// Report timestamps as raw digits instead of resolving them
    #[arg(long)]
    #[arg(help_heading = DECODER)]
    pub raw_timestamp: bool,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clap() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse() {
        let args = Args::try_parse_from(["aprsdec", "--kiss", "--ax25", "-vv"]).unwrap();
        assert!(args.kiss);
        assert!(args.ax25);
        assert!(!args.json);
        assert_eq!(2, args.verbose);
        assert!(args.input_is_stdin());

        let args = Args::try_parse_from(["aprsdec", "--file", "log.txt"]).unwrap();
        assert!(!args.input_is_stdin());
    }
}
