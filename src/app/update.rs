use crate::app::Model;
use crate::app::model::{ExitAction, Mode};
use crate::deck::{Slide, ThemeId};
use crate::render::RenderResult;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Reveal the next fragment, or move to the next slide
    Advance,
    /// Hide the last fragment, or move to the previous slide
    Retreat,
    /// Jump straight to a slide
    JumpTo(usize),

    // Body scrolling
    /// Scroll up by n lines
    ScrollUp(usize),
    /// Scroll down by n lines
    ScrollDown(usize),

    // Overview
    /// Enter the overview grid, or leave it when already open
    ToggleOverview,
    /// Move the overview cursor left
    OverviewLeft,
    /// Move the overview cursor right
    OverviewRight,
    /// Move the overview cursor up one grid row
    OverviewUp,
    /// Move the overview cursor down one grid row
    OverviewDown,
    /// Jump to the selected slide and return to presentation
    OverviewConfirm,
    /// Return to presentation without jumping
    OverviewCancel,

    // Theme picker
    /// Open the theme picker
    OpenThemeSelect,
    /// Move the theme cursor up (wraps)
    ThemeCursorUp,
    /// Move the theme cursor down (wraps)
    ThemeCursorDown,
    /// Apply the highlighted theme and close the picker
    ThemeConfirm,
    /// Close the picker without applying
    ThemeCancel,

    // Session
    /// Hand off to the external player for the current cast slide
    Play,
    /// End the interactive session
    Quit,

    // System
    /// Terminal was resized (debounced)
    Resize(u16, u16),
    /// The deck source changed on disk (debounced)
    DeckChanged,
    /// The render worker finished a request
    RenderReady(RenderResult),
}

/// Pure state transition function.
///
/// Takes the current model and a message, returns the new model.
/// No side effects - all I/O happens in `App::handle_message_side_effects`.
pub fn update(mut model: Model, message: Message) -> Model {
    match message {
        Message::Advance => advance(&mut model),
        Message::Retreat => retreat(&mut model),
        Message::JumpTo(index) => jump_to(&mut model, index),

        Message::ScrollUp(lines) => {
            model.scroll = model.scroll.saturating_sub(lines);
        }
        Message::ScrollDown(lines) => {
            model.scroll = (model.scroll + lines).min(model.max_scroll());
        }

        Message::ToggleOverview => match model.mode {
            Mode::Presentation => {
                model.overview_selected = model.index;
                model.mode = Mode::Overview;
            }
            Mode::Overview => model.mode = Mode::Presentation,
            Mode::ThemeSelect => {}
        },
        Message::OverviewLeft => {
            model.overview_selected = model.overview_selected.saturating_sub(1);
        }
        Message::OverviewRight => {
            model.overview_selected = clamp_to_deck(&model, model.overview_selected + 1);
        }
        Message::OverviewUp => {
            model.overview_selected = model
                .overview_selected
                .saturating_sub(model.overview_columns());
        }
        Message::OverviewDown => {
            model.overview_selected =
                clamp_to_deck(&model, model.overview_selected + model.overview_columns());
        }
        Message::OverviewConfirm => {
            let selected = model.overview_selected;
            jump_to(&mut model, selected);
        }
        Message::OverviewCancel => model.mode = Mode::Presentation,

        Message::OpenThemeSelect => {
            model.theme_cursor = ThemeId::ALL
                .iter()
                .position(|&theme| theme == model.theme)
                .unwrap_or(0);
            model.mode = Mode::ThemeSelect;
        }
        Message::ThemeCursorUp => {
            model.theme_cursor = if model.theme_cursor == 0 {
                ThemeId::ALL.len() - 1
            } else {
                model.theme_cursor - 1
            };
        }
        Message::ThemeCursorDown => {
            model.theme_cursor = if model.theme_cursor + 1 >= ThemeId::ALL.len() {
                0
            } else {
                model.theme_cursor + 1
            };
        }
        Message::ThemeConfirm => {
            model.theme = ThemeId::ALL
                .get(model.theme_cursor)
                .copied()
                .unwrap_or_default();
            model.mode = Mode::Presentation;
        }
        Message::ThemeCancel => model.mode = Mode::Presentation,

        Message::Play => {
            let cast_path = match model.current_slide() {
                Some(Slide::Cast { path, .. }) => Some(path.clone()),
                _ => None,
            };
            if let Some(path) = cast_path {
                model.exit = Some(ExitAction::Play {
                    path,
                    slide_index: model.index,
                });
            }
        }
        Message::Quit => model.exit = Some(ExitAction::Quit),

        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.scroll = model.scroll.min(model.max_scroll());
        }
        Message::RenderReady(result) => {
            // A result older than the newest issued request is stale;
            // last request wins.
            if result.seq == model.render_seq {
                model.rendered = Some(result);
                model.scroll = model.scroll.min(model.max_scroll());
            }
        }

        // Handled entirely by side effects in App::handle_message_side_effects.
        Message::DeckChanged => {}
    }

    model
}

/// Reveal the next fragment; past the last fragment, move to the next
/// slide starting at its first step.
fn advance(model: &mut Model) {
    if model.step + 1 < model.total_steps() {
        model.step += 1;
    } else if model.index + 1 < model.slides.len() {
        model.index += 1;
        model.step = 0;
        model.scroll = 0;
    }
}

/// Hide the last fragment; before the first, move to the previous slide
/// landing on its *last* fragment (asymmetric with `advance` so stepping
/// back re-traces what was on screen).
fn retreat(model: &mut Model) {
    if model.step > 0 {
        model.step -= 1;
    } else if model.index > 0 {
        model.index -= 1;
        model.step = model.total_steps().saturating_sub(1);
        model.scroll = 0;
    }
}

fn jump_to(model: &mut Model, index: usize) {
    if model.slides.is_empty() {
        model.mode = Mode::Presentation;
        return;
    }
    let index = clamp_to_deck(model, index);
    if index != model.index {
        model.scroll = 0;
    }
    model.index = index;
    model.step = 0;
    model.mode = Mode::Presentation;
}

fn clamp_to_deck(model: &Model, index: usize) -> usize {
    index.min(model.slides.len().saturating_sub(1))
}
