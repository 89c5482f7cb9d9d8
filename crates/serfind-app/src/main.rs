use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serfind_core::{device_info, DeviceInfo, FinderConfig, SerialPortFinder};
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

#[derive(Parser, Debug)]
#[command(name = "serfind", version, about = "List serial device nodes known to the kernel")]
struct Cli {
    /// Driver table to read
    #[arg(long, default_value = "/proc/tty/drivers")]
    driver_table: PathBuf,

    /// Directory holding the device nodes
    #[arg(long, default_value = "/dev")]
    device_dir: PathBuf,

    /// Print JSON instead of plain lines
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Display names, e.g. "ttyUSB0 (usbserial)" (default)
    Devices,
    /// Absolute device paths
    Paths,
    /// Serial drivers found in the driver table
    Drivers,
    /// Metadata of one device path
    Info { path: PathBuf },
}

#[derive(Serialize)]
struct DriverView<'a> {
    name: &'a str,
    device_root: &'a str,
}

#[derive(Serialize)]
struct InfoView<'a> {
    path: &'a PathBuf,
    name: &'a str,
    exists: bool,
    readable: bool,
    writable: bool,
    size: u64,
    modified_ms: Option<u128>,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> From<&'a DeviceInfo> for InfoView<'a> {
    fn from(info: &'a DeviceInfo) -> Self {
        Self {
            path: &info.path,
            name: &info.name,
            exists: true,
            readable: info.readable,
            writable: info.writable,
            size: info.size,
            modified_ms: info
                .modified
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis()),
            kind: info.kind.as_str(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let finder = SerialPortFinder::with_config(FinderConfig {
        driver_table: cli.driver_table,
        device_dir: cli.device_dir,
    });

    match cli.command.unwrap_or(Command::Devices) {
        Command::Devices => print_lines(cli.json, &finder.all_devices())?,
        Command::Paths => {
            let paths: Vec<String> = finder
                .all_devices_path()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            print_lines(cli.json, &paths)?;
        }
        Command::Drivers => {
            // The registry error is surfaced here, unlike the device listings.
            let drivers = finder.drivers()?;
            if cli.json {
                let views: Vec<DriverView> = drivers
                    .iter()
                    .map(|d| DriverView { name: d.name(), device_root: d.device_root() })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                for d in drivers.iter() {
                    println!("{}\t{}", d.name(), d.device_root());
                }
            }
        }
        Command::Info { path } => {
            let Some(info) = device_info(&path) else {
                bail!("{} does not exist", path.display());
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&InfoView::from(&info))?);
            } else {
                println!("path:     {}", info.path.display());
                println!("name:     {}", info.name);
                println!("type:     {}", info.kind.as_str());
                println!("readable: {}", info.readable);
                println!("writable: {}", info.writable);
                println!("size:     {}", info.size);
            }
        }
    }

    Ok(())
}

fn print_lines(json: bool, lines: &[String]) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(lines)?);
    } else {
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}
