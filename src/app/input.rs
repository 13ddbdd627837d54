use crossterm::event::{self, Event, KeyCode, KeyModifiers};

use crate::app::model::Mode;
use crate::app::{App, Message, Model};
use crate::deck::Slide;

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        &self,
        event: Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => self.handle_key(key, model),
            Event::Resize(width, height) => {
                resize_debouncer.queue(width, height, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(&self, key: event::KeyEvent, model: &Model) -> Option<Message> {
        let _ = self;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Message::Quit);
        }

        // The theme picker pauses every other input map while open.
        if model.mode == Mode::ThemeSelect {
            return match key.code {
                KeyCode::Up => Some(Message::ThemeCursorUp),
                KeyCode::Down => Some(Message::ThemeCursorDown),
                KeyCode::Enter => Some(Message::ThemeConfirm),
                KeyCode::Esc | KeyCode::Char('t') => Some(Message::ThemeCancel),
                _ => None,
            };
        }

        if model.mode == Mode::Overview {
            return match key.code {
                KeyCode::Left => Some(Message::OverviewLeft),
                KeyCode::Right => Some(Message::OverviewRight),
                KeyCode::Up => Some(Message::OverviewUp),
                KeyCode::Down => Some(Message::OverviewDown),
                KeyCode::Enter => Some(Message::OverviewConfirm),
                KeyCode::Esc | KeyCode::Tab | KeyCode::Char('g') => Some(Message::OverviewCancel),
                _ => None,
            };
        }

        // Presentation mode
        match key.code {
            // Navigation
            KeyCode::Right => Some(Message::Advance),
            KeyCode::Left => Some(Message::Retreat),
            KeyCode::Tab | KeyCode::Char('g') => Some(Message::ToggleOverview),

            // Body scrolling
            KeyCode::Up => {
                if model.can_scroll_up() {
                    Some(Message::ScrollUp(1))
                } else {
                    None
                }
            }
            KeyCode::Down => {
                if model.can_scroll_down() {
                    Some(Message::ScrollDown(1))
                } else {
                    None
                }
            }

            // Space plays a cast slide; on markdown it page-scrolls.
            KeyCode::Char(' ') => {
                if model.current_slide().is_some_and(Slide::is_cast) {
                    Some(Message::Play)
                } else if model.can_scroll_down() {
                    Some(Message::ScrollDown(5))
                } else {
                    None
                }
            }
            KeyCode::Enter => {
                if model.current_slide().is_some_and(Slide::is_cast) {
                    Some(Message::Play)
                } else {
                    None
                }
            }

            KeyCode::Char('t') => Some(Message::OpenThemeSelect),
            KeyCode::Esc | KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        }
    }
}
