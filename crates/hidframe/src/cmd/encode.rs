use hidframe_frame::{decode_frame, FrameWriter};
use hidframe_transport::{DeviceInfo, MemoryDevice};
use tracing::debug;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frames, FrameRow, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.frame.to_config()?;
    let payload = args.payload.resolve()?;
    let payload_size = payload.len();

    // Capture the reports exactly as a writer would emit them, padding included.
    let capture = MemoryDevice::new(capture_info());
    let mut writer = FrameWriter::with_config(capture.session(), config.clone());
    writer
        .send(payload)
        .map_err(|err| frame_error("encode failed", err))?;
    writer
        .close()
        .map_err(|err| frame_error("encode failed", err))?;

    let rows = capture
        .written()
        .iter()
        .enumerate()
        .map(|(index, report)| {
            let frame = decode_frame(report, config.report_id)
                .map_err(|err| frame_error("encoded report failed verification", err))?;
            Ok(FrameRow::new(index, &frame, report))
        })
        .collect::<CliResult<Vec<_>>>()?;

    debug!(frames = rows.len(), payload_size, "encoded payload");
    print_frames(
        &rows,
        config.report_id,
        config.chunk_capacity,
        payload_size,
        format,
    );
    Ok(SUCCESS)
}

fn capture_info() -> DeviceInfo {
    DeviceInfo {
        vendor_id: 0,
        product_id: 0,
        path: "mem:encode".to_string(),
        interface_number: -1,
        usage_page: 0,
        usage: 0,
    }
}
