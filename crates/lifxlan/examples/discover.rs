//! Broadcast a discovery request and print every device that answers.
//!
//! Run with:
//!   cargo run --example discover
//!
//! Add a source id as the first argument to tag requests from this run.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use lifxlan::frame::Header;
use lifxlan::message::device::{GetLabel, GetService, StateLabel, StateService};
use lifxlan::{Client, ClientConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(0x1F1F_0001);

    let mut client = Client::bind(ClientConfig::with_source(source))?;

    let targets = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&targets);
    client.register_callback(move |header: &Header, reply: &StateService| {
        eprintln!(
            "Device {:02x?} offers service {} on port {}",
            &header.target[..6],
            reply.service,
            reply.port
        );
        sink.borrow_mut().push(header.target);
    });
    client.register_callback(|header: &Header, reply: &StateLabel| {
        eprintln!("Device {:02x?} is called {:?}", &header.target[..6], reply.label.to_string());
    });

    client.broadcast(&GetService {})?;

    let mut asked = 0;
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        client.run_once(Duration::from_millis(50));

        // Ask each newly found device for its label.
        let found: Vec<_> = targets.borrow()[asked..].to_vec();
        for target in found {
            client.send(&GetLabel {}, Some(target))?;
            asked += 1;
        }
    }

    eprintln!("{} device(s) answered", targets.borrow().len());
    Ok(())
}
