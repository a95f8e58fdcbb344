//! Lists phones attached over USB.

use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, info};
use usbmobile::{DeviceFamily, DeviceRecord, DeviceReport, ScanOptions};

#[derive(Parser, Debug)]
#[command(name = "usbmobile", version, about = "List Android, iOS and HarmonyOS devices attached over USB")]
struct Args {
    /// Stop after this many devices
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print a JSON array instead of a table
    #[arg(long)]
    json: bool,

    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    Builder::new().filter_level(level).parse_default_env().init();

    let options = ScanOptions { limit: args.limit };
    let records = usbmobile::scan(&options);
    info!("found {} device(s)", records.len());

    if args.json {
        let reports: Vec<DeviceReport> = records.iter().map(DeviceRecord::report).collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No mobile devices found.");
        return Ok(());
    }

    for record in &records {
        println!("{}", summary_line(record));
    }
    Ok(())
}

fn summary_line(record: &DeviceRecord) -> String {
    let flag = match record.family {
        DeviceFamily::Ios if record.trusted => "trusted",
        DeviceFamily::Ios => "untrusted",
        _ if record.debug_bridge_exposed => "debugging on",
        _ => "debugging off",
    };
    format!(
        "{:<8} {}:{} {:<12} {:<24} {:<24} {}",
        record.family,
        record.vendor_id_hex(),
        record.product_id_hex(),
        record.display_brand(),
        record.display_name(),
        record.display_serial(),
        flag
    )
}
