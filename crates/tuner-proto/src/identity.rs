//! Content-derived ids for servers, receivers and radios.
//!
//! The relay server keys its own maps with the same formats, so an id
//! computed here is also a valid command target.  None of these functions can
//! fail: missing fields deserialize as empty strings and still produce a
//! deterministic id.

use sha1::{Digest, Sha1};

use crate::model::{Radio, Receiver, Server};

/// `server-<host>:<port>`
pub fn server_id(server: &Server) -> String {
    format!("server-{}:{}", server.host, server.port)
}

/// `receiver-<name>`, using the host when the name is empty.
pub fn receiver_id(receiver: &Receiver) -> String {
    format!("receiver-{}", receiver.label())
}

/// `radio-<sha1(uri) as hex>`.  Renaming a radio keeps its id; two radios
/// with the same uri share one.
pub fn radio_id(radio: &Radio) -> String {
    radio_id_for_uri(&radio.uri)
}

pub fn radio_id_for_uri(uri: &str) -> String {
    format!("radio-{:x}", Sha1::digest(uri.as_bytes()))
}
