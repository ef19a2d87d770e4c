use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use lifxlan_frame::Header;
use lifxlan_message::device::{EchoRequest, EchoResponse};
use serde::Serialize;

use crate::cmd::{drive_until, open_client, parse_duration, parse_optional_target, EchoArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::{format_target, print_records, OutputFormat, Record};

#[derive(Debug, Serialize)]
pub struct EchoRecord {
    pub target: String,
    pub payload: u64,
    pub round_trip_ms: f64,
}

impl Record for EchoRecord {
    fn headers() -> &'static [&'static str] {
        &["TARGET", "PAYLOAD", "RTT_MS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.target.clone(),
            self.payload.to_string(),
            format!("{:.2}", self.round_trip_ms),
        ]
    }
}

pub fn run(args: EchoArgs, format: OutputFormat) -> CliResult<i32> {
    let target = parse_optional_target(args.target.as_deref())?;
    let timeout = parse_duration(&args.timeout, false)?;
    let mut client = open_client(&args.network)?;

    let started = Instant::now();
    let replies: Rc<RefCell<Vec<EchoRecord>>> = Rc::default();
    let sink = Rc::clone(&replies);
    let expected = args.payload;
    client.register_callback(move |header: &Header, reply: &EchoResponse| {
        if reply.payload == expected {
            sink.borrow_mut().push(EchoRecord {
                target: format_target(&header.target),
                payload: reply.payload,
                round_trip_ms: millis(started.elapsed()),
            });
        }
    });

    let sequence = client
        .send(&EchoRequest { payload: expected }, target)
        .map_err(|err| client_error("echo request failed", err))?;
    tracing::debug!(sequence, payload = expected, "echo request queued");

    let answered = drive_until(&mut client, timeout, || !replies.borrow().is_empty())?;
    if !answered {
        return Err(CliError::new(
            TIMEOUT,
            format!("no echo reply within {timeout:?}"),
        ));
    }

    print_records(replies.borrow().as_slice(), format);
    Ok(SUCCESS)
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_micros() as f64 / 1000.0
}
