//! Messages specific to colour lights.

use crate::field::{Hsbk, Label, Reserved};
use crate::message::define_messages;
use crate::Family;

define_messages! {
    family: Family::Light;

    /// Request the full light state.
    Get = 101, response: true {}

    /// Fade to `color` over `duration` milliseconds.
    SetColor = 102, response: false {
        reserved: Reserved<1>,
        color: Hsbk,
        duration: u32,
    }

    /// Light state reply.
    State = 107, response: false {
        color: Hsbk,
        reserved: Reserved<2>,
        power: u16,
        label: Label,
        reserved_tail: Reserved<8>,
    }

    GetPower = 116, response: true {}

    /// Set power with a transition time in milliseconds.
    SetPower = 117, response: false {
        level: u16,
        duration: u32,
    }

    StatePower = 118, response: false {
        level: u16,
    }
}
