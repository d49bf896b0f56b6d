pub mod client;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod model;
pub mod platform;
pub mod push;
pub mod resolve;
pub mod sync;
pub mod view;
pub mod wire;

pub use error::{Result, TunerError};
