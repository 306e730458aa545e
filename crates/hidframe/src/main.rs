mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "hidframe",
    version,
    about = "Chunked, CRC-8 checked transfers over HID reports"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from([
            "hidframe",
            "encode",
            "--data",
            "hello",
            "--chunk-capacity",
            "4",
            "--report-id",
            "0x05",
        ])
        .expect("encode args should parse");

        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.frame.report_id, 5);
        assert_eq!(args.frame.chunk_capacity, Some(4));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "hidframe",
            "encode",
            "--hex",
            "4142",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_report_id_out_of_range() {
        let err = Cli::try_parse_from(["hidframe", "encode", "--report-id", "256"])
            .expect_err("report id should be a byte");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from(["hidframe", "decode", "reports.txt", "--report-id", "7"])
            .expect("decode args should parse");
        let Command::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(args.report_id, 7);
    }

    #[test]
    fn decode_takes_no_chunk_options() {
        let err = Cli::try_parse_from(["hidframe", "decode", "--chunk-capacity", "100"])
            .expect_err("decode has no chunk capacity");
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
