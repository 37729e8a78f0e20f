use clap::{Args, Parser, Subcommand};
use dut_probe::config::{Config, ConfigLoader, ConfigResult};
use dut_probe::port::list_ports;
use dut_probe::{
    acquire_address, logging, ConsoleReader, DutAddress, DutClient, Endpoint, FirmwareProfile,
    ProbeError, ProbeResult, ProbeRunner,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Console lines echoed to the log when the address cannot be found.
const TRANSCRIPT_TAIL: usize = 15;

#[derive(Parser, Debug)]
#[command(
    name = "dut-probe",
    version,
    about = "Validate the HTTP endpoints of an ESP32 web-server DUT.",
    long_about = "Attaches to the DUT's serial console, waits for the firmware to announce \
                  its IPv4 address, then checks the root page, /status, /info and the LED routes."
)]
struct Cli {
    /// Configuration file (skips the standard search path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List serial ports on this host
    Ports {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Wait for the DUT to announce its address and print it
    Address(ConsoleArgs),
    /// Probe the DUT's HTTP endpoints
    Run(RunArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug)]
struct ConsoleArgs {
    /// Console port (name or configured alias)
    #[arg(short, long)]
    port: Option<String>,

    /// Console baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Seconds to wait for each console marker
    #[arg(long)]
    timeout: Option<u64>,

    /// Pulse DTR/RTS after opening so the DUT reboots while we listen
    #[arg(long)]
    reset: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    console: ConsoleArgs,

    /// Probe this address directly instead of reading the console
    #[arg(short, long, conflicts_with = "port")]
    address: Option<DutAddress>,

    /// Port of the DUT's web server
    #[arg(long)]
    http_port: Option<u16>,

    /// Firmware variant on the DUT
    #[arg(long, value_enum)]
    profile: Option<FirmwareProfile>,

    /// Endpoint to probe; repeat for several (default: all of the profile)
    #[arg(short, long = "endpoint", value_enum)]
    endpoints: Vec<Endpoint>,

    /// GET each endpoint this many times in succession
    #[arg(long)]
    repeat: Option<u32>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl ConsoleArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(ref port) = self.port {
            config.console.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.console.baud = baud;
        }
        if let Some(secs) = self.timeout {
            config.console.timeout_ms = secs.saturating_mul(1000);
        }
        if self.reset {
            config.console.reset_on_open = true;
        }
    }
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        self.console.apply(config);
        if let Some(port) = self.http_port {
            config.http.port = port;
        }
        if let Some(profile) = self.profile {
            config.probe.profile = profile;
        }
        if !self.endpoints.is_empty() {
            config.probe.endpoints = self.endpoints.clone();
        }
        if let Some(repeat) = self.repeat {
            config.probe.repeat = repeat;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    match &cli.command {
        Command::Address(args) => args.apply(&mut config),
        Command::Run(args) => args.apply(&mut config),
        Command::Ports { .. } | Command::Config => {}
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        return ExitCode::from(2);
    }

    logging::init(&config.logging, cli.verbose);

    match execute(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            error!(kind = e.kind(), "{e}");
            match e {
                ProbeError::Config(_) | ProbeError::Port(_) | ProbeError::Client(_) => {
                    ExitCode::from(2)
                }
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> ConfigResult<Config> {
    match path {
        Some(path) => ConfigLoader::load_from(path).map(ConfigLoader::into_config),
        None => ConfigLoader::load().map(ConfigLoader::into_config),
    }
}

fn execute(command: Command, config: &Config) -> ProbeResult<ExitCode> {
    match command {
        Command::Ports { json } => {
            let ports = list_ports()?;
            if json {
                println!("{}", to_json(&ports));
            } else if ports.is_empty() {
                println!("No serial ports detected on this system");
            } else {
                for port in &ports {
                    let detail = [port.vid_pid.as_deref(), port.product.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" ");
                    println!("{:<24} {:<10} {detail}", port.name, port.kind);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Address(_) => {
            let address = console_address(config)?;
            println!("{address}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Run(args) => {
            let address = match args.address {
                Some(address) => address,
                None => console_address(config)?,
            };

            let runner = ProbeRunner::new(DutClient::new(&config.http)?, config.probe.profile);
            let endpoints = config.probe.selected_endpoints();
            info!(%address, profile = %runner.profile(), count = endpoints.len(), "probing DUT");

            let report = runner.run_suite(&address, &endpoints, config.probe.repeat);
            if args.json {
                println!("{}", to_json(&report));
            } else {
                println!("{report}");
            }

            Ok(if report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Config => {
            let loader = ConfigLoader {
                config_path: None,
                config: config.clone(),
            };
            print!("{}", loader.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn console_address(config: &Config) -> ProbeResult<DutAddress> {
    let mut console = ConsoleReader::open(&config.console, None)?;
    acquire_address(&mut console, config.console.timeout()).map_err(|e| {
        let transcript = console.transcript();
        let tail = transcript.len().saturating_sub(TRANSCRIPT_TAIL);
        for line in &transcript[tail..] {
            warn!(target: "dut_console", "{line}");
        }
        e
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}
