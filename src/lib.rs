//! vcr-handler - record and replay HTTP responses through cassette files
//!
//! The first run against a cassette path sends real requests and writes
//! every response to a JSON cassette; later runs serve those responses back
//! in order without touching the network.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::multiple_crate_versions
)]

pub mod client;
pub mod config;
pub mod error;
pub mod network;
pub mod recording;
pub mod replay;
pub mod storage;
pub mod vcr;

pub use client::Client;
pub use config::{Mode, VcrConfig};
pub use error::{Result, VcrError};
pub use network::HandlerStack;
pub use vcr::{turn_on, turn_on_with_transport};
