use hidframe_frame::checksum;
use serde::Serialize;

use crate::cmd::ChecksumArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct ChecksumOutput {
    algorithm: &'static str,
    length: usize,
    crc8: String,
}

pub fn run(args: ChecksumArgs, format: OutputFormat) -> CliResult<i32> {
    let data = args.payload.resolve()?;
    let crc = checksum(&data);

    match format {
        OutputFormat::Json => {
            let out = ChecksumOutput {
                algorithm: "crc-8/smbus",
                length: data.len(),
                crc8: format!("{crc:#04x}"),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("crc8={crc:#04x} len={}", data.len());
        }
        OutputFormat::Raw => println!("{crc:02x}"),
    }

    Ok(SUCCESS)
}
