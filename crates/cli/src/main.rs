//! skiller-ctl: command-line keyboard configuration tool.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use skiller_core::comm::{self, ApplyReport};
use skiller_core::device::{self, MatchedDevice};
use skiller_core::error::Error;
use skiller_core::protocol::{self, Brightness};
use skiller_core::request::{LedRequest, Request};
use skiller_core::transport::{ControlTransport, TRANSFER_TIMEOUT};
use skiller_core::{power, safety};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, warn};

struct CliUsbTransport {
    handle: rusb::DeviceHandle<rusb::Context>,
}

impl CliUsbTransport {
    fn open(device: &rusb::Device<rusb::Context>) -> Result<Self> {
        let handle = device.open().map_err(|e| {
            anyhow::anyhow!(
                "error opening device (bus {:03} device {:03}): {e}",
                device.bus_number(),
                device.address()
            )
        })?;
        Ok(Self { handle })
    }
}

impl ControlTransport for CliUsbTransport {
    fn claim(&mut self) -> skiller_core::error::Result<()> {
        match self.handle.set_auto_detach_kernel_driver(true) {
            Ok(()) => {}
            Err(rusb::Error::NotSupported) => {
                debug!("kernel driver auto-detach not supported on this platform");
            }
            Err(e) => return Err(e.into()),
        }
        self.handle.claim_interface(protocol::INTERFACE)?;
        Ok(())
    }

    fn release(&mut self) -> skiller_core::error::Result<()> {
        self.handle.release_interface(protocol::INTERFACE)?;
        Ok(())
    }

    fn write_control(&mut self, payload: &[u8]) -> skiller_core::error::Result<usize> {
        let written = self.handle.write_control(
            protocol::REQUEST_TYPE,
            protocol::REQUEST,
            protocol::VALUE,
            protocol::INDEX,
            payload,
            TRANSFER_TIMEOUT,
        )?;
        Ok(written)
    }
}

fn parse_brightness(s: &str) -> Result<Brightness, String> {
    let level: u8 = s
        .parse()
        .map_err(|_| format!("cannot parse \"{s}\" for brightness"))?;
    Brightness::level(level).map_err(|_| "choose a brightness between 0 and 10".into())
}

fn parse_profile(s: &str) -> Result<u8, String> {
    let profile: u8 = s
        .parse()
        .map_err(|_| format!("cannot parse \"{s}\" for profile selection"))?;
    safety::validate_profile(profile).map_err(|_| "choose a profile between 1 and 3".into())
}

fn parse_windows_key(s: &str) -> Result<bool, String> {
    let state: u8 = s
        .parse()
        .map_err(|_| format!("cannot parse \"{s}\" for windows key state"))?;
    safety::validate_windows_key(state).map_err(|_| "value for -w must be either 0 or 1".into())
}

#[derive(Parser, Debug)]
#[command(
    name = "skiller-ctl",
    version,
    about = "Control the LEDs, profiles and polling rate of Sharkoon Skiller keyboards"
)]
struct Cli {
    /// Always power on the device (root privileges required).
    #[arg(short = 'a')]
    always_on: bool,

    /// Brightness between 0 and 10 (default: 10).
    #[arg(
        short = 'b',
        value_name = "0-10",
        value_parser = parse_brightness,
        requires = "color",
        conflicts_with_all = ["pulsing", "disco"]
    )]
    brightness: Option<Brightness>,

    /// Pulsing brightness.
    #[arg(short = 'B', requires = "color", conflicts_with = "disco")]
    pulsing: bool,

    /// Set color (query possible values with -C).
    #[arg(short = 'c', value_name = "COLOR")]
    color: Option<String>,

    /// List supported colors.
    #[arg(short = 'C')]
    list_colors: bool,

    /// Select device.
    #[arg(short = 'd', value_name = "N", default_value_t = 0)]
    device: usize,

    /// Disco mode: pulsing brightness with changing color.
    #[arg(short = 'i', requires = "color")]
    disco: bool,

    /// List available devices.
    #[arg(short = 'l')]
    list_devices: bool,

    /// Change profile (1-3).
    #[arg(short = 'p', value_name = "1-3", value_parser = parse_profile)]
    profile: Option<u8>,

    /// Change polling rate to 125, 250, 500 or 1000 Hz.
    #[arg(short = 'r', value_name = "HZ")]
    polling_rate: Option<u16>,

    /// Windows key on (1) or off (0).
    #[arg(short = 'w', value_name = "0|1", value_parser = parse_windows_key)]
    windows_key: Option<bool>,

    /// Print device and color listings as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_request(self) -> Request {
        let brightness = if self.pulsing {
            Brightness::Pulsing
        } else if self.disco {
            Brightness::Disco
        } else {
            self.brightness.unwrap_or_default()
        };

        Request {
            device: self.device,
            profile: self.profile.unwrap_or(safety::PROFILE_MIN),
            change_profile: self.profile.is_some(),
            windows_key: self.windows_key,
            led: self.color.map(|color| LedRequest { brightness, color }),
            polling_rate: self.polling_rate,
            list_devices: self.list_devices,
            list_colors: self.list_colors,
            always_on: self.always_on,
        }
    }
}

fn print_devices(matched: &[MatchedDevice], json: bool) -> Result<()> {
    if json {
        let summaries: Vec<_> = matched.iter().map(MatchedDevice::summary).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for dev in matched {
            println!("{}", dev.listing_line());
        }
    }
    Ok(())
}

fn print_colors(target: &MatchedDevice, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(target.model.colors)?);
    } else {
        println!("{}", target.model.colors.join(" "));
    }
    Ok(())
}

fn report_failures(report: &ApplyReport) {
    if let Some(e) = &report.claim_error {
        eprintln!("error while claiming interface: {e}");
    }
    for failure in &report.failures {
        eprintln!(
            "error sending control URB ({}): {}",
            failure.kind, failure.error
        );
    }
    if let Some(e) = &report.release_error {
        eprintln!("error while releasing interface: {e}");
    }
}

/// Message for an input error that is only detectable once the model is
/// known. Other errors are not the user's input and get no usage text.
fn usage_error(err: &Error) -> Option<String> {
    match err {
        Error::UnknownColor { .. }
        | Error::UnsupportedPollingRate { .. }
        | Error::OutOfRange { .. } => {
            Some(format!("error: {err}\n\n{}", Cli::command().render_usage()))
        }
        _ => None,
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            // Printing can only fail if the stream is gone; the exit code still matters.
            let _ = e.print();
            std::process::exit(code);
        }
    };
    let json = cli.json;
    let request = cli.into_request();

    if !request.has_action() {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    }
    debug!(?request, "parsed request");

    let context = rusb::Context::new().context("error initializing libusb")?;
    let connected =
        device::discover_devices(&context).context("error retrieving list of devices")?;
    let matched = device::match_devices(connected.iter().map(|c| &c.info));

    if request.list_devices {
        print_devices(&matched, json)?;
    }

    let target = device::select(&matched, request.device)?;
    let plan = match request.plan(target.model) {
        Ok(plan) => plan,
        Err(e) => match usage_error(&e) {
            Some(message) => {
                eprintln!("{message}");
                return Ok(ExitCode::FAILURE);
            }
            None => return Err(e.into()),
        },
    };

    if request.always_on {
        if let Err(e) = target.force_always_on(Path::new(power::SYSFS_USB_DEVICES)) {
            warn!(
                bus = target.info.bus,
                address = target.info.address,
                "setting power policy failed: {}",
                e
            );
            eprintln!("{e}");
        }
    }

    let mut transport = CliUsbTransport::open(&connected[target.index].device)?;

    if request.list_colors {
        print_colors(target, json)?;
    }

    if !plan.is_empty() {
        let report = comm::apply_commands(&mut transport, &plan, comm::INTER_COMMAND_DELAY);
        report_failures(&report);
    }

    Ok(ExitCode::SUCCESS)
}
