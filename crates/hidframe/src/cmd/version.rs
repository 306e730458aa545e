use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("hidframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: hidframe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("HIDFRAME_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "frame: report_id={:#04x} report_size={} chunk_capacity={}",
        hidframe_frame::REPORT_ID_COMM,
        hidframe_frame::COMM_REPORT_SIZE,
        hidframe_frame::DEFAULT_CHUNK_CAPACITY
    );
    println!(
        "device: {:04x}:{:04x} interface {}",
        hidframe_transport::VENDOR_ID,
        hidframe_transport::PRODUCT_ID,
        hidframe_transport::COMM_INTERFACE
    );

    Ok(SUCCESS)
}
