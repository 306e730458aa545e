use clap::{Args, Subcommand};
use hidframe_frame::{FrameConfig, COMM_REPORT_SIZE};
use std::fs;
use std::path::PathBuf;

use crate::exit::{frame_error, io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod checksum;
pub mod decode;
pub mod doctor;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a payload into frames and print the reports.
    Encode(EncodeArgs),
    /// Verify and reassemble hex-encoded reports.
    Decode(DecodeArgs),
    /// Print the CRC-8 of some data.
    Checksum(ChecksumArgs),
    /// Run framing self-checks over the in-memory backend.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Checksum(args) => checksum::run(args, format),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Frame layout options shared by every command that builds or parses frames.
#[derive(Args, Debug, Clone)]
pub struct FrameArgs {
    /// Report ID of the comms collection (decimal or 0x-prefixed hex).
    #[arg(long, env = "HIDFRAME_REPORT_ID", default_value = "0x03", value_parser = parse_byte)]
    pub report_id: u8,
    /// Report size in bytes, excluding the report ID.
    #[arg(long, env = "HIDFRAME_REPORT_SIZE", default_value_t = COMM_REPORT_SIZE)]
    pub report_size: usize,
    /// Data bytes per frame. Default: as many as fit one report.
    #[arg(long, env = "HIDFRAME_CHUNK_CAPACITY")]
    pub chunk_capacity: Option<usize>,
    /// Do not zero-pad reports to the report size.
    #[arg(long)]
    pub no_pad: bool,
}

impl FrameArgs {
    pub fn to_config(&self) -> CliResult<FrameConfig> {
        let mut config = FrameConfig::for_report_size(self.report_id, self.report_size)
            .map_err(|err| frame_error("invalid frame options", err))?;
        if let Some(capacity) = self.chunk_capacity {
            config.chunk_capacity = capacity;
        }
        if self.no_pad {
            config.report_size = None;
        }
        config
            .validate()
            .map_err(|err| frame_error("invalid frame options", err))?;
        Ok(config)
    }
}

/// Where a payload comes from. At most one source; none means empty.
#[derive(Args, Debug)]
pub struct PayloadArgs {
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex-encoded payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        if let Some(text) = &self.hex {
            return decode_hex(text)
                .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")));
        }
        if let Some(path) = &self.file {
            return fs::read(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
        }
        Ok(Vec::new())
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File with one hex-encoded report per line. Default: stdin.
    pub input: Option<PathBuf>,
    /// Report ID every report must carry (decimal or 0x-prefixed hex).
    #[arg(long, env = "HIDFRAME_REPORT_ID", default_value = "0x03", value_parser = parse_byte)]
    pub report_id: u8,
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a byte given as decimal or `0x`-prefixed hex.
fn parse_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("{input} is not a byte (0-255 or 0x00-0xff)"))
}

/// Decode hex text, ignoring whitespace between digits.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_args() -> FrameArgs {
        FrameArgs {
            report_id: 0x03,
            report_size: COMM_REPORT_SIZE,
            chunk_capacity: None,
            no_pad: false,
        }
    }

    #[test]
    fn parse_byte_accepts_decimal_and_hex() {
        assert_eq!(parse_byte("3"), Ok(3));
        assert_eq!(parse_byte("0x03"), Ok(3));
        assert_eq!(parse_byte("0XFF"), Ok(255));
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("0x100").is_err());
        assert!(parse_byte("x").is_err());
    }

    #[test]
    fn default_frame_args_fill_comm_report() {
        let config = frame_args().to_config().unwrap();
        assert_eq!(config.chunk_capacity, 43);
        assert_eq!(config.report_size, Some(48));
    }

    #[test]
    fn chunk_capacity_override_and_no_pad() {
        let mut args = frame_args();
        args.chunk_capacity = Some(200);
        assert_eq!(args.to_config().unwrap_err().code, USAGE);

        args.no_pad = true;
        let config = args.to_config().unwrap();
        assert_eq!(config.chunk_capacity, 200);
        assert_eq!(config.report_size, None);

        args.chunk_capacity = Some(0);
        assert_eq!(args.to_config().unwrap_err().code, USAGE);
    }

    #[test]
    fn decode_hex_ignores_whitespace() {
        assert_eq!(decode_hex("03 20\t00").unwrap(), vec![0x03, 0x20, 0x00]);
        assert!(decode_hex("0g").is_err());
    }

    #[test]
    fn empty_payload_when_no_source() {
        let args = PayloadArgs {
            data: None,
            hex: None,
            file: None,
        };
        assert!(args.resolve().unwrap().is_empty());
    }
}
