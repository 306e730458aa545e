use std::fs;
use std::io::Read;

use bytes::Bytes;
use hidframe_frame::{decode_frame, FrameError, Reassembler};
use tracing::debug;

use crate::cmd::{decode_hex, DecodeArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_transfers, OutputFormat, TransferRow};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(&args)?;

    let (rows, payloads) = decode_reports(&input, args.report_id)?;
    print_transfers(&rows, &payloads, format);
    Ok(SUCCESS)
}

fn read_input(args: &DecodeArgs) -> CliResult<String> {
    match &args.input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(text)
        }
    }
}

/// Decode one hex report per line. Blank lines and `#` comments are skipped.
fn decode_reports(input: &str, report_id: u8) -> CliResult<(Vec<TransferRow>, Vec<Bytes>)> {
    let mut reassembler = Reassembler::new();
    let mut rows = Vec::new();
    let mut payloads = Vec::new();
    let mut frames = 0usize;
    let mut seen = 0usize;

    for (line_no, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        seen += 1;

        let report = decode_hex(line).map_err(|err| {
            CliError::new(DATA_INVALID, format!("line {}: not valid hex: {err}", line_no + 1))
        })?;
        let frame = decode_frame(&report, report_id)
            .map_err(|err| frame_error(&format!("line {}", line_no + 1), err))?;
        frames += 1;

        if let Some(payload) = reassembler
            .push(frame)
            .map_err(|err| frame_error(&format!("line {}", line_no + 1), err))?
        {
            debug!(frames, len = payload.len(), "transfer reassembled");
            rows.push(TransferRow::new(frames, &payload));
            payloads.push(payload);
            frames = 0;
        }
    }

    if seen == 0 {
        return Err(CliError::new(USAGE, "no reports in input"));
    }
    if !reassembler.is_idle() {
        return Err(frame_error(
            "end of input",
            FrameError::Incomplete {
                remaining: reassembler.remaining(),
            },
        ));
    }

    Ok((rows, payloads))
}
