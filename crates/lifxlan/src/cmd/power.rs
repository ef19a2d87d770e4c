use std::time::Duration;

use lifxlan_message::light::SetPower;
use serde::Serialize;

use crate::cmd::{
    drive_until, open_client, parse_duration, parse_optional_target, PowerArgs, PowerState,
};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, TIMEOUT, USAGE};
use crate::output::{format_target, print_records, OutputFormat, Record};

/// Time allowed for the request to leave the queue.
const SEND_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
pub struct PowerRecord {
    pub target: String,
    pub level: u16,
    pub duration_ms: u32,
    pub sequence: u8,
}

impl Record for PowerRecord {
    fn headers() -> &'static [&'static str] {
        &["TARGET", "LEVEL", "DURATION_MS", "SEQUENCE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.target.clone(),
            self.level.to_string(),
            self.duration_ms.to_string(),
            self.sequence.to_string(),
        ]
    }
}

pub fn run(args: PowerArgs, format: OutputFormat) -> CliResult<i32> {
    let target = parse_optional_target(args.target.as_deref())?;
    let duration_ms = match args.duration.as_deref() {
        Some(input) => fade_millis(parse_duration(input, true)?)?,
        None => 0,
    };
    let message = SetPower {
        level: args.state.level(),
        duration: duration_ms,
    };

    let mut client = open_client(&args.network)?;
    let sequence = client
        .send(&message, target)
        .map_err(|err| client_error("power request failed", err))?;

    if !drive_until(&mut client, SEND_TIMEOUT, || true)? {
        return Err(CliError::new(TIMEOUT, "power request was not sent"));
    }

    let record = PowerRecord {
        target: target.map_or_else(|| "broadcast".to_string(), |t| format_target(&t)),
        level: message.level,
        duration_ms,
        sequence,
    };
    tracing::info!(
        on = args.state == PowerState::On,
        target = %record.target,
        "power request sent"
    );
    print_records(&[record], format);
    Ok(SUCCESS)
}

fn fade_millis(duration: Duration) -> CliResult<u32> {
    u32::try_from(duration.as_millis())
        .map_err(|_| CliError::new(USAGE, format!("fade duration too long: {duration:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_fits_in_u32_millis() {
        assert_eq!(fade_millis(Duration::from_millis(1500)).unwrap(), 1500);
        assert_eq!(
            fade_millis(Duration::from_secs(u64::from(u32::MAX))).unwrap_err().code,
            USAGE
        );
    }
}
