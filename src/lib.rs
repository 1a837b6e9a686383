#![doc = include_str!("RUSTDOC.md")]

pub mod app;
pub mod logger;
pub mod messaging;
pub mod platform;
pub mod sw;
