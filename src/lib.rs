//! voicerec: a terminal voice memo recorder.
//!
//! The [`amplitude`] module holds the metering and waveform pipeline and has
//! no terminal or device dependencies. Everything else wires it to cpal,
//! ratatui and the filesystem.

pub mod amplitude;
pub mod app;
pub mod commands;
pub mod config;
pub mod library;
pub mod logging;
pub mod recording;
pub mod scheduler;
pub mod ui;
