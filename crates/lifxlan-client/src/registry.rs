use std::collections::HashMap;
use std::fmt;

use lifxlan_frame::Header;
use lifxlan_message::{lookup, Message};
use tracing::{debug, trace};

type Handler = Box<dyn FnMut(&Header, &[u8]) -> bool>;

/// Maps message type ids to a single handler each.
///
/// Handlers receive the decoded header and the typed payload. A payload
/// shorter than the registered type's size is dropped without calling the
/// handler.
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<u16, Handler>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `M`, replacing any earlier handler for the
    /// same type id.
    pub fn register<M, F>(&mut self, mut handler: F)
    where
        M: Message + 'static,
        F: FnMut(&Header, &M) + 'static,
    {
        let wrapped: Handler = Box::new(move |header: &Header, payload: &[u8]| {
            match M::from_payload(payload) {
                Some(message) => {
                    handler(header, &message);
                    true
                }
                None => false,
            }
        });
        let replaced = self.handlers.insert(M::TYPE, wrapped).is_some();
        debug!(msg_type = M::TYPE, name = M::NAME, replaced, "registered handler");
    }

    /// Decode `payload` as the type named in `header` and run its handler.
    ///
    /// Returns whether a handler ran.
    pub fn dispatch(&mut self, header: &Header, payload: &[u8]) -> bool {
        let Some(handler) = self.handlers.get_mut(&header.msg_type) else {
            match lookup(header.msg_type) {
                Some(entry) => trace!(
                    msg_type = header.msg_type,
                    message = %entry,
                    "no handler registered"
                ),
                None => trace!(msg_type = header.msg_type, "unknown message type"),
            }
            return false;
        };
        let ran = handler(header, payload);
        if !ran {
            trace!(
                msg_type = header.msg_type,
                len = payload.len(),
                "payload too short for registered type"
            );
        }
        ran
    }

    /// Whether a handler exists for `type_id`.
    pub fn is_registered(&self, type_id: u16) -> bool {
        self.handlers.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.handlers.keys().copied().collect();
        types.sort_unstable();
        f.debug_struct("Registry").field("types", &types).finish()
    }
}
