use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, Subcommand, ValueEnum};
use lifxlan_client::{Client, ClientConfig, RunResult, MAX_MESSAGES_PER_SECOND};
use lifxlan_frame::Target;
use lifxlan_transport::{Transport, TransportConfig, LIFX_PORT};

use crate::exit::{CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod discover;
pub mod echo;
pub mod power;
pub mod version;

/// Longest single wait inside the drive loop, so Ctrl-C and deadlines are
/// noticed promptly.
const POLL_SLICE: Duration = Duration::from_millis(100);

/// Back-off after the engine reports the transmit ceiling.
const LIMIT_BACKOFF: Duration = Duration::from_millis(50);

pub type CliClient = Client<Box<dyn Transport>>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Broadcast a discovery request and list responding devices.
    Discover(DiscoverArgs),
    /// Send an echo request and wait for the reply.
    Echo(EchoArgs),
    /// Switch lights on or off.
    Power(PowerArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Discover(args) => discover::run(args, format),
        Command::Echo(args) => echo::run(args, format),
        Command::Power(args) => power::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Socket and identity options shared by every network command.
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// Local interface address to bind.
    #[arg(long, default_value_t = Ipv4Addr::UNSPECIFIED)]
    pub bind: Ipv4Addr,
    /// UDP port used for both sending and receiving.
    #[arg(long, default_value_t = LIFX_PORT)]
    pub port: u16,
    /// Destination address for every datagram.
    #[arg(long, default_value_t = Ipv4Addr::BROADCAST)]
    pub broadcast: Ipv4Addr,
    /// Source id stamped into requests. Default: the process id.
    #[arg(long)]
    pub source: Option<u32>,
}

impl NetworkArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            source: self.source.unwrap_or_else(std::process::id),
            max_messages_per_second: MAX_MESSAGES_PER_SECOND,
            transport: TransportConfig {
                bind_addr: self.bind,
                port: self.port,
                broadcast_addr: self.broadcast,
                reuse_address: true,
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    #[command(flatten)]
    pub network: NetworkArgs,
    /// How long to collect replies (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    #[command(flatten)]
    pub network: NetworkArgs,
    /// Device address (e.g. d0:73:d5:01:02:03). Default: every device.
    #[arg(long)]
    pub target: Option<String>,
    /// Value the device should echo back.
    #[arg(long, default_value_t = 0x4C49_4658)]
    pub payload: u64,
    /// How long to wait for a reply (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub timeout: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn level(self) -> u16 {
        match self {
            PowerState::On => u16::MAX,
            PowerState::Off => 0,
        }
    }
}

#[derive(Args, Debug)]
pub struct PowerArgs {
    #[command(flatten)]
    pub network: NetworkArgs,
    /// Requested power state.
    #[arg(value_enum)]
    pub state: PowerState,
    /// Device address (e.g. d0:73:d5:01:02:03). Default: every light.
    #[arg(long)]
    pub target: Option<String>,
    /// Fade time (e.g. 1s, 250ms).
    #[arg(long)]
    pub duration: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[cfg(unix)]
pub fn open_client(network: &NetworkArgs) -> CliResult<CliClient> {
    let config = network.client_config();
    let transport = lifxlan_transport::UdpTransport::bind(&config.transport)
        .map_err(|err| crate::exit::transport_error("bind failed", err))?;
    tracing::debug!(
        transport = transport.transport_name(),
        source = config.source,
        "client ready"
    );
    Ok(Client::with_transport(Box::new(transport), config))
}

#[cfg(not(unix))]
pub fn open_client(_network: &NetworkArgs) -> CliResult<CliClient> {
    Err(CliError::new(
        INTERNAL,
        "the UDP transport is only available on Unix platforms",
    ))
}

/// Drive `client` until `done` reports true with nothing left to send,
/// the deadline passes, or Ctrl-C is pressed. Returns whether `done` was
/// reached.
pub fn drive_until(
    client: &mut CliClient,
    timeout: Duration,
    mut done: impl FnMut() -> bool,
) -> CliResult<bool> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let deadline = Instant::now() + timeout;
    while running.load(Ordering::SeqCst) {
        if !client.has_pending_sends() && done() {
            return Ok(true);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }
        let wait = if client.has_pending_sends() {
            Duration::ZERO
        } else {
            (deadline - now).min(POLL_SLICE)
        };
        if client.run_once(wait) == RunResult::SentLimit {
            std::thread::sleep(LIMIT_BACKOFF);
        }
    }
    tracing::info!("interrupted");
    Ok(false)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

/// Parse `d0:73:d5:01:02:03` (or the same twelve hex digits without
/// separators) into a frame target.
pub fn parse_target(input: &str) -> CliResult<Target> {
    let digits: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-'))
        .collect();
    if digits.len() != 12 || !digits.is_ascii() {
        return Err(CliError::new(
            USAGE,
            format!("invalid target (expected 6 hex bytes): {input}"),
        ));
    }

    let mut target = [0u8; 8];
    for (slot, pair) in target.iter_mut().zip(digits.as_bytes().chunks(2)) {
        let pair = std::str::from_utf8(pair).unwrap_or_default();
        *slot = u8::from_str_radix(pair, 16)
            .map_err(|_| CliError::new(USAGE, format!("invalid target byte {pair:?} in {input}")))?;
    }
    Ok(target)
}

pub fn parse_optional_target(input: Option<&str>) -> CliResult<Option<Target>> {
    input.map(parse_target).transpose()
}

/// Parse `2s`, `150ms` or a bare number of seconds. Zero is rejected unless
/// `allow_zero` is set.
pub fn parse_duration(input: &str, allow_zero: bool) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 && !allow_zero {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_target_accepts_colons_and_plain_hex() {
        let expected = [0xD0, 0x73, 0xD5, 0x01, 0x02, 0x03, 0, 0];
        assert_eq!(parse_target("d0:73:d5:01:02:03").unwrap(), expected);
        assert_eq!(parse_target("D073D5010203").unwrap(), expected);
        assert_eq!(parse_target("d0-73-d5-01-02-03").unwrap(), expected);
    }

    #[test]
    fn parse_target_rejects_bad_input() {
        assert_eq!(parse_target("d0:73:d5").unwrap_err().code, USAGE);
        assert_eq!(parse_target("zz:73:d5:01:02:03").unwrap_err().code, USAGE);
        assert_eq!(parse_target("é0:73:d5:01:02:0").unwrap_err().code, USAGE);
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s", false).unwrap(), Duration::from_secs(2));
        assert_eq!(
            parse_duration("150ms", false).unwrap(),
            Duration::from_millis(150)
        );
        assert_eq!(parse_duration("3", false).unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_zero_handling() {
        assert!(parse_duration("0s", false).is_err());
        assert_eq!(parse_duration("0ms", true).unwrap(), Duration::ZERO);
        assert!(parse_duration("bad", true).is_err());
    }

    #[test]
    fn network_args_build_transport_config() {
        let args = NetworkArgs {
            bind: Ipv4Addr::LOCALHOST,
            port: 56800,
            broadcast: Ipv4Addr::new(192, 168, 1, 255),
            source: Some(7),
        };
        let config = args.client_config();
        assert_eq!(config.source, 7);
        assert_eq!(config.transport.port, 56800);
        assert_eq!(config.transport.broadcast_addr, Ipv4Addr::new(192, 168, 1, 255));
    }

    #[test]
    fn power_levels() {
        assert_eq!(PowerState::On.level(), 0xFFFF);
        assert_eq!(PowerState::Off.level(), 0);
    }
}
