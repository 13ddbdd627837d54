use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::DefaultTerminal;

use crate::app::model::ExitAction;
use crate::app::{App, Message, Model, update};
use crate::deck;
use crate::render::RenderWorker;
use crate::watcher::DeckWatcher;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run one interactive session: load the deck, own the terminal until
    /// an exit action, restore the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization, deck loading, or the
    /// event loop encounters an I/O failure.
    pub fn run(&mut self) -> Result<ExitAction> {
        let slides = deck::load(&self.source).context("Failed to load slides")?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal (termdeck needs an interactive terminal)")?;
        let size = terminal.size()?;

        let mut model = Model::new(slides, self.source.clone(), (size.width, size.height));
        model.index = self.start_index.min(model.slides.len().saturating_sub(1));
        model.overview_selected = model.index;

        let worker = RenderWorker::spawn();
        self.request_render(&mut model, &worker);
        self.notify_presenter(&mut model);

        let result = self.event_loop(&mut terminal, &mut model, &worker);

        ratatui::restore();
        result?;
        Ok(model.exit.take().unwrap_or(ExitAction::Quit))
    }

    fn event_loop(
        &self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        worker: &RenderWorker,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut deck_watcher = match self.make_deck_watcher() {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                // Live reload is best-effort; the session works without it.
                tracing::warn!(
                    "live reload disabled for {}: {err}",
                    model.source.watch_dir().display()
                );
                None
            }
        };
        let mut needs_render = true;

        loop {
            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                let msg = Message::Resize(width, height);
                *model = update(std::mem::take(model), msg.clone());
                self.handle_message_side_effects(model, worker, &msg);
                needs_render = true;
            }

            if deck_watcher
                .as_mut()
                .is_some_and(DeckWatcher::take_reload_ready)
            {
                *model = update(std::mem::take(model), Message::DeckChanged);
                self.handle_message_side_effects(model, worker, &Message::DeckChanged);
                needs_render = true;
            }

            while let Some(result) = worker.try_recv() {
                *model = update(std::mem::take(model), Message::RenderReady(result));
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() || model.awaiting_render() {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so the debouncer uses
                // accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                let msg = self.handle_event(event::read()?, model, event_ms, &mut resize_debouncer);
                if let Some(msg) = msg {
                    let side_msg = msg.clone();
                    *model = update(std::mem::take(model), msg);
                    self.handle_message_side_effects(model, worker, &side_msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let msg =
                        self.handle_event(event::read()?, model, drain_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        let side_msg = msg.clone();
                        *model = update(std::mem::take(model), msg);
                        self.handle_message_side_effects(model, worker, &side_msg);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.exit.is_some() {
                break;
            }
        }
        Ok(())
    }
}
