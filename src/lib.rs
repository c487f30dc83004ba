//! Category time tracker. A small HTTP server stores completed entries and forwards summary
//! requests to a local generation service; the terminal client runs the timer, saves each
//! stopped entry and asks for a summary of its category.
//!

pub mod cli;
pub mod client;
pub mod server;
pub mod tracker;
pub mod utils;
