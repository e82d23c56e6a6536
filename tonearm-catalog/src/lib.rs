//! A barebones client for the music catalog Web API and its client-credentials token endpoint.
#![deny(missing_docs)]

mod client;
pub use client::*;

mod common;
pub use common::*;

mod album;
pub use album::*;

mod artist;
pub use artist::*;

mod track;
pub use track::*;

mod search;
pub use search::*;

mod token;
pub use token::*;

mod request;
pub use request::parse_error_message;
