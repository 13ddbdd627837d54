//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{ExitAction, Mode, Model};
pub use update::{Message, update};

use crate::deck::DeckSource;
use crate::presenter::Presenter;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    source: DeckSource,
    start_index: usize,
    presenter: Option<Presenter>,
}

impl App {
    /// Create a new application for the given deck source.
    pub const fn new(source: DeckSource) -> Self {
        Self {
            source,
            start_index: 0,
            presenter: None,
        }
    }

    /// Start at the given slide instead of the first one.
    pub const fn with_start_index(mut self, index: usize) -> Self {
        self.start_index = index;
        self
    }

    /// Attach a presenter console; slide changes are pushed to it.
    pub fn with_presenter(mut self, presenter: Option<Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    /// Set the slide the next [`App::run`] starts at. Used when playback
    /// hands control back with a resume position.
    pub fn set_start_index(&mut self, index: usize) {
        self.start_index = index;
    }
}

#[cfg(test)]
mod tests;
