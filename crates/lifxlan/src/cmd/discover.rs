use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use lifxlan_frame::{Header, Target, SERVICE_UDP};
use lifxlan_message::device::{GetService, StateService};
use serde::Serialize;

use crate::cmd::{drive_until, open_client, parse_duration, DiscoverArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{format_target, print_records, OutputFormat, Record};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DeviceRecord {
    pub target: String,
    pub service: u8,
    pub port: u32,
}

impl Record for DeviceRecord {
    fn headers() -> &'static [&'static str] {
        &["TARGET", "SERVICE", "PORT"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.target.clone(),
            self.service.to_string(),
            self.port.to_string(),
        ]
    }
}

pub fn run(args: DiscoverArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout, false)?;
    let mut client = open_client(&args.network)?;

    let found: Rc<RefCell<BTreeMap<Target, StateService>>> = Rc::default();
    let sink = Rc::clone(&found);
    client.register_callback(move |header: &Header, reply: &StateService| {
        if reply.service == SERVICE_UDP {
            sink.borrow_mut().insert(header.target, *reply);
        }
    });

    client
        .broadcast(&GetService {})
        .map_err(|err| client_error("discovery request failed", err))?;
    drive_until(&mut client, timeout, || false)?;

    let records = device_records(&found.borrow());
    tracing::info!(devices = records.len(), "discovery finished");
    print_records(&records, format);
    Ok(SUCCESS)
}

fn device_records(found: &BTreeMap<Target, StateService>) -> Vec<DeviceRecord> {
    found
        .iter()
        .map(|(target, service)| DeviceRecord {
            target: format_target(target),
            service: service.service,
            port: service.port,
        })
        .collect()
}
