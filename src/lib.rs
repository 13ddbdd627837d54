// Transitive dependency version mismatches we can't control.
#![allow(clippy::multiple_crate_versions)]

//! # Termdeck
//!
//! A terminal slide-presentation player.
//!
//! Termdeck plays a deck of Markdown slides, optionally mixed with
//! asciinema recordings, in the terminal with:
//! - Syntax-highlighted code blocks
//! - Half-block inline images
//! - Step-wise fragment reveal
//! - Live reload while slides are edited
//! - A browser speaker console with notes and a timer
//!
//! ## Architecture
//!
//! Termdeck uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`deck`]: Slide discovery and parsing
//! - [`render`]: Markdown-to-styled-lines conversion, off the input thread
//! - [`ui`]: Terminal UI components
//! - [`cast`]: Recording header tooling
//! - [`playback`]: External-player sub-loop for recordings
//! - [`presenter`]: Speaker console server
//! - [`watcher`]: File watching for live reload
//! - [`term`]: Presentation-mode terminal escapes

pub mod app;
pub mod cast;
pub mod deck;
pub mod playback;
pub mod presenter;
pub mod render;
pub mod term;
pub mod ui;
pub mod watcher;
