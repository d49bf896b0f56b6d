//! Commands that mutate the relay's state.
//!
//! Commands are one-way: the relay's response is never read back into the
//! mirror.  Whether a command took effect shows up in the next snapshot.

use std::fmt;

use crate::model::{clamp_volume, Radio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Point a receiver at a server (or `off`).
    TuneReceiverServer { receiver: String, server: String },
    /// Let the relay find or spawn a server playing `radio`.
    TuneReceiverRadio { receiver: String, radio: String },
    TuneServerRadio { server: String, radio: String },
    SetVolume { receiver: String, volume: i32 },
    /// Create (`id == None`) or replace a radio.
    SaveRadio { id: Option<String>, radio: Radio },
    DeleteRadio { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// Transport-neutral description of the HTTP request for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Relative to the API base url.
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Radio>,
}

impl Command {
    /// Volume command with the value clamped into the relay's range.
    pub fn set_volume(receiver: impl Into<String>, volume: i32) -> Self {
        Command::SetVolume {
            receiver: receiver.into(),
            volume: clamp_volume(volume as i64),
        }
    }

    pub fn request(&self) -> Request {
        match self {
            Command::TuneReceiverServer { receiver, server } => Request {
                method: Method::Get,
                path: "api/receiver",
                query: vec![("id", receiver.clone()), ("server", server.clone())],
                body: None,
            },
            Command::TuneReceiverRadio { receiver, radio } => Request {
                method: Method::Get,
                path: "api/receiver",
                query: vec![("id", receiver.clone()), ("radio", radio.clone())],
                body: None,
            },
            Command::TuneServerRadio { server, radio } => Request {
                method: Method::Get,
                path: "api/server",
                query: vec![("id", server.clone()), ("radio", radio.clone())],
                body: None,
            },
            Command::SetVolume { receiver, volume } => Request {
                method: Method::Get,
                path: "api/receiver",
                query: vec![("id", receiver.clone()), ("volume", volume.to_string())],
                body: None,
            },
            Command::SaveRadio { id, radio } => Request {
                method: Method::Post,
                path: "api/radio",
                query: vec![("id", id.clone().unwrap_or_default())],
                body: Some(radio.clone()),
            },
            Command::DeleteRadio { id } => Request {
                method: Method::Delete,
                path: "api/radio",
                query: vec![("id", id.clone())],
                body: None,
            },
        }
    }

    /// Only creating a radio without an id is unsafe to repeat.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Command::SaveRadio { id: None, .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::TuneReceiverServer { receiver, server } => {
                write!(f, "tune {receiver} → {server}")
            }
            Command::TuneReceiverRadio { receiver, radio } => {
                write!(f, "tune {receiver} → {radio}")
            }
            Command::TuneServerRadio { server, radio } => write!(f, "tune {server} → {radio}"),
            Command::SetVolume { receiver, volume } => write!(f, "volume {receiver} = {volume}"),
            Command::SaveRadio { id: Some(id), radio } => {
                write!(f, "update {id} ({})", radio.name)
            }
            Command::SaveRadio { id: None, radio } => write!(f, "create radio {}", radio.name),
            Command::DeleteRadio { id } => write!(f, "delete {id}"),
        }
    }
}
