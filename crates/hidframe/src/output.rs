use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use hidframe_frame::Frame;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One written report, as shown by `encode`.
#[derive(Debug, Serialize)]
pub struct FrameRow {
    pub index: usize,
    pub position: &'static str,
    pub remaining: u16,
    pub length: u8,
    pub checksum: String,
    pub report: String,
}

impl FrameRow {
    pub fn new(index: usize, frame: &Frame, report: &[u8]) -> Self {
        Self {
            index,
            position: frame.position.name(),
            remaining: frame.remaining,
            length: frame.length(),
            checksum: format!("{:#04x}", frame.checksum()),
            report: hex::encode(report),
        }
    }
}

#[derive(Serialize)]
struct EncodeOutput<'a> {
    report_id: u8,
    chunk_capacity: usize,
    payload_size: usize,
    frame_count: usize,
    frames: &'a [FrameRow],
}

pub fn print_frames(
    rows: &[FrameRow],
    report_id: u8,
    chunk_capacity: usize,
    payload_size: usize,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = EncodeOutput {
                report_id,
                chunk_capacity,
                payload_size,
                frame_count: rows.len(),
                frames: rows,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "FLAG", "REMAINING", "LEN", "CRC", "REPORT"]);
            for row in rows {
                table.add_row(vec![
                    row.index.to_string(),
                    row.position.to_string(),
                    row.remaining.to_string(),
                    row.length.to_string(),
                    row.checksum.clone(),
                    row.report.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!(
                    "frame={} flag={} remaining={} len={} crc={} report={}",
                    row.index, row.position, row.remaining, row.length, row.checksum, row.report
                );
            }
        }
        OutputFormat::Raw => {
            for row in rows {
                println!("{}", row.report);
            }
        }
    }
}

/// One reassembled payload, as shown by `decode`.
#[derive(Debug, Serialize)]
pub struct TransferRow {
    pub frames: usize,
    pub payload_size: usize,
    pub payload: String,
}

impl TransferRow {
    pub fn new(frames: usize, payload: &[u8]) -> Self {
        Self {
            frames,
            payload_size: payload.len(),
            payload: payload_preview(payload),
        }
    }
}

#[derive(Serialize)]
struct DecodeOutput<'a> {
    transfers: &'a [TransferRow],
}

pub fn print_transfers(rows: &[TransferRow], payloads: &[bytes::Bytes], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = DecodeOutput {
                transfers: rows,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FRAMES", "SIZE", "PAYLOAD"]);
            for row in rows {
                table.add_row(vec![
                    row.frames.to_string(),
                    row.payload_size.to_string(),
                    row.payload.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!(
                    "frames={} size={} payload={}",
                    row.frames, row.payload_size, row.payload
                );
            }
        }
        OutputFormat::Raw => {
            for payload in payloads {
                print_raw(payload);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes: {}>", payload.len(), hex::encode(payload)),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use hidframe_frame::Position;

    use super::*;

    #[test]
    fn frame_row_formats_checksum_and_report() {
        let frame = Frame::new(0x03, Position::Last, 0, Bytes::from_static(b"AB")).unwrap();
        let row = FrameRow::new(0, &frame, &frame.to_bytes());
        assert_eq!(row.position, "LAST");
        assert_eq!(row.checksum, "0x6a");
        assert_eq!(row.report, "032000000241426a");
    }

    #[test]
    fn binary_payload_preview_is_hex() {
        assert_eq!(payload_preview(b"hi"), "hi");
        assert_eq!(payload_preview(&[0xFF, 0x00]), "<binary 2 bytes: ff00>");
    }
}
