use std::time::Duration;

use crate::app::{App, Message, Model};
use crate::deck::{self, Slide};
use crate::render::{RenderLayout, RenderRequest, RenderWorker, supports_truecolor};
use crate::watcher::DeckWatcher;

impl App {
    pub(super) fn make_deck_watcher(&self) -> notify::Result<DeckWatcher> {
        DeckWatcher::new(&self.source, Duration::from_millis(100))
    }

    pub(super) fn handle_message_side_effects(
        &self,
        model: &mut Model,
        worker: &RenderWorker,
        msg: &Message,
    ) {
        match msg {
            Message::Advance
            | Message::Retreat
            | Message::JumpTo(_)
            | Message::OverviewConfirm => {
                self.request_render(model, worker);
                self.notify_presenter(model);
            }
            Message::Resize(..) => {
                self.request_render(model, worker);
            }
            Message::DeckChanged => {
                Self::reload_deck(model);
                self.request_render(model, worker);
                self.notify_presenter(model);
            }
            _ => {}
        }
    }

    /// Queue a render of the current slide at the current step and size.
    /// Cast slides have nothing to render; the view draws their
    /// placeholder screen directly.
    pub(super) fn request_render(&self, model: &mut Model, worker: &RenderWorker) {
        let _ = self;
        let job = match model.current_slide() {
            Some(slide @ Slide::Markdown { slide_dir, .. }) => {
                Some((slide.visible_body(model.step), slide_dir.clone()))
            }
            _ => None,
        };
        let Some((body, slide_dir)) = job else {
            model.rendered = None;
            return;
        };

        let (width, height) = model.terminal_size;
        model.render_seq += 1;
        worker.request(RenderRequest {
            seq: model.render_seq,
            slide_index: model.index,
            step: model.step,
            body,
            slide_dir,
            layout: RenderLayout::for_viewport(width, height),
            truecolor: supports_truecolor(),
        });
    }

    /// Push the current slide to the presenter console, once per index
    /// change. Fire-and-forget.
    pub(super) fn notify_presenter(&self, model: &mut Model) {
        let Some(presenter) = &self.presenter else {
            return;
        };
        if model.last_notified_index == Some(model.index) {
            return;
        }
        model.last_notified_index = Some(model.index);
        presenter.notify_slide_change(&model.slides, model.index);
    }

    /// Re-read the deck from its source. On success the slide list is
    /// replaced and navigation state reconciled against the new length;
    /// on failure the previous list stays and the session keeps running.
    pub(super) fn reload_deck(model: &mut Model) {
        match deck::load(&model.source) {
            // An empty scan is indistinguishable from a slide file caught
            // mid-write; never wipe a live deck over it.
            Ok(slides) if slides.is_empty() => {
                tracing::warn!("deck reload found no slides, keeping previous slides");
            }
            Ok(slides) => {
                model.slides = slides;
                let last = model.slides.len().saturating_sub(1);
                model.index = model.index.min(last);
                model.overview_selected = model.overview_selected.min(last);
                model.step = model.step.min(model.total_steps().saturating_sub(1));
                model.reload_count += 1;
                // The old render may describe content that no longer
                // exists; show the loading placeholder until the fresh
                // one lands.
                model.rendered = None;
            }
            Err(err) => {
                tracing::warn!("deck reload failed, keeping previous slides: {err:#}");
            }
        }
    }
}
