use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use tempfile::tempdir;

use crate::deck::{DeckSource, Slide, SlideId, SlideMetadata, ThemeId, title_from_filename};
use crate::render::{LineKind, RenderResult, RenderWorker, StyledLine};

use super::event_loop::ResizeDebouncer;
use super::{App, ExitAction, Message, Mode, Model, update};

fn markdown_slide(filename: &str, content: &str) -> Slide {
    Slide::Markdown {
        id: SlideId::new(filename),
        title: title_from_filename(filename),
        metadata: SlideMetadata::default(),
        notes: String::new(),
        content: content.to_string(),
        slide_dir: PathBuf::from("."),
    }
}

fn cast_slide(filename: &str) -> Slide {
    Slide::Cast {
        id: SlideId::new(filename),
        title: title_from_filename(filename),
        metadata: SlideMetadata::default(),
        notes: String::new(),
        path: PathBuf::from(filename),
    }
}

fn test_model(slides: Vec<Slide>) -> Model {
    let source = DeckSource::Directory(PathBuf::from("slides"));
    Model::new(slides, source, (80, 24))
}

fn three_slide_model() -> Model {
    test_model(vec![
        markdown_slide("01_intro.md", "# Intro\n\nWelcome."),
        markdown_slide("02_middle.md", "# Middle\n\nBody."),
        markdown_slide("03_end.md", "# End\n\nBye."),
    ])
}

/// First slide has three reveal steps, second has two.
fn fragmented_model() -> Model {
    test_model(vec![
        markdown_slide(
            "01_first.md",
            "# First\n\nOne\n\n<!-- fragment -->\n\nTwo\n\n<!-- fragment -->\n\nThree",
        ),
        markdown_slide("02_second.md", "# Second\n\nAlpha\n\n<!-- fragment -->\n\nBeta"),
    ])
}

fn mixed_model() -> Model {
    test_model(vec![
        markdown_slide("01_intro.md", "# Intro\n\nWelcome."),
        cast_slide("02_demo.cast"),
        markdown_slide("03_end.md", "# End\n\nBye."),
    ])
}

fn test_app() -> App {
    App::new(DeckSource::Directory(PathBuf::from("slides")))
}

/// Install a completed render for the model's current position with the
/// given number of body lines.
fn with_rendered_lines(mut model: Model, count: usize) -> Model {
    let lines = (0..count)
        .map(|i| StyledLine::new(format!("line {i}"), LineKind::Paragraph))
        .collect();
    model.rendered = Some(RenderResult {
        seq: model.render_seq,
        slide_index: model.index,
        step: model.step,
        lines,
    });
    model
}

fn key(code: KeyCode) -> event::KeyEvent {
    event::KeyEvent::new(code, KeyModifiers::NONE)
}

// --- Navigation ---

#[test]
fn test_advance_moves_to_next_slide() {
    let model = three_slide_model();
    let model = update(model, Message::Advance);
    assert_eq!(model.index, 1);
    assert_eq!(model.step, 0);
}

#[test]
fn test_advance_reveals_fragment_before_moving() {
    let model = fragmented_model();
    let model = update(model, Message::Advance);
    assert_eq!(model.index, 0);
    assert_eq!(model.step, 1);
}

#[test]
fn test_advance_past_last_fragment_moves_to_next_slide() {
    let mut model = fragmented_model();
    model.step = 2;
    let model = update(model, Message::Advance);
    assert_eq!(model.index, 1);
    assert_eq!(model.step, 0);
}

#[test]
fn test_advance_at_deck_end_is_noop() {
    let mut model = three_slide_model();
    model.index = 2;
    let model = update(model, Message::Advance);
    assert_eq!(model.index, 2);
    assert_eq!(model.step, 0);
}

#[test]
fn test_retreat_hides_fragment_first() {
    let mut model = fragmented_model();
    model.step = 2;
    let model = update(model, Message::Retreat);
    assert_eq!(model.index, 0);
    assert_eq!(model.step, 1);
}

#[test]
fn test_retreat_lands_on_previous_slides_last_fragment() {
    // Stepping back re-traces what was on screen, so the previous slide
    // comes back fully revealed rather than at step zero.
    let mut model = fragmented_model();
    model.index = 1;
    model.step = 0;
    let model = update(model, Message::Retreat);
    assert_eq!(model.index, 0);
    assert_eq!(model.step, 2);
}

#[test]
fn test_retreat_at_deck_start_is_noop() {
    let model = three_slide_model();
    let model = update(model, Message::Retreat);
    assert_eq!(model.index, 0);
    assert_eq!(model.step, 0);
}

#[test]
fn test_slide_change_resets_scroll() {
    let mut model = with_rendered_lines(three_slide_model(), 40);
    model.scroll = 7;
    let model = update(model, Message::Advance);
    assert_eq!(model.scroll, 0);
}

#[test]
fn test_jump_to_clamps_out_of_range() {
    let model = three_slide_model();
    let model = update(model, Message::JumpTo(99));
    assert_eq!(model.index, 2);
}

#[test]
fn test_jump_to_same_slide_keeps_scroll() {
    let mut model = with_rendered_lines(three_slide_model(), 40);
    model.scroll = 7;
    let model = update(model, Message::JumpTo(0));
    assert_eq!(model.scroll, 7);
}

// --- Overview ---

#[test]
fn test_toggle_overview_snapshots_current_slide() {
    let mut model = three_slide_model();
    model.index = 2;
    let model = update(model, Message::ToggleOverview);
    assert_eq!(model.mode, Mode::Overview);
    assert_eq!(model.overview_selected, 2);
}

#[test]
fn test_toggle_overview_again_returns_to_presentation() {
    let model = three_slide_model();
    let model = update(model, Message::ToggleOverview);
    let model = update(model, Message::ToggleOverview);
    assert_eq!(model.mode, Mode::Presentation);
}

#[test]
fn test_overview_right_stops_at_last_slide() {
    let mut model = three_slide_model();
    model.mode = Mode::Overview;
    model.overview_selected = 2;
    let model = update(model, Message::OverviewRight);
    assert_eq!(model.overview_selected, 2);
}

#[test]
fn test_overview_left_stops_at_first_slide() {
    let mut model = three_slide_model();
    model.mode = Mode::Overview;
    let model = update(model, Message::OverviewLeft);
    assert_eq!(model.overview_selected, 0);
}

#[test]
fn test_overview_vertical_moves_by_one_row() {
    // 80 columns fits two overview cells per row.
    let mut model = test_model(
        (1..=6)
            .map(|i| markdown_slide(&format!("{i:02}_slide.md"), "# S\n\nBody."))
            .collect(),
    );
    assert_eq!(model.overview_columns(), 2);
    model.mode = Mode::Overview;

    let model = update(model, Message::OverviewDown);
    assert_eq!(model.overview_selected, 2);
    let model = update(model, Message::OverviewDown);
    assert_eq!(model.overview_selected, 4);
    let model = update(model, Message::OverviewUp);
    assert_eq!(model.overview_selected, 2);
}

#[test]
fn test_overview_down_clamps_to_last_slide() {
    let mut model = three_slide_model();
    model.mode = Mode::Overview;
    model.overview_selected = 2;
    let model = update(model, Message::OverviewDown);
    assert_eq!(model.overview_selected, 2);
}

#[test]
fn test_overview_confirm_jumps_and_closes() {
    let mut model = three_slide_model();
    model.mode = Mode::Overview;
    model.overview_selected = 2;
    let model = update(model, Message::OverviewConfirm);
    assert_eq!(model.mode, Mode::Presentation);
    assert_eq!(model.index, 2);
    assert_eq!(model.step, 0);
}

#[test]
fn test_overview_cancel_keeps_current_slide() {
    let mut model = three_slide_model();
    model.index = 1;
    model.mode = Mode::Overview;
    model.overview_selected = 2;
    let model = update(model, Message::OverviewCancel);
    assert_eq!(model.mode, Mode::Presentation);
    assert_eq!(model.index, 1);
}

// --- Theme selection ---

#[test]
fn test_open_theme_select_positions_cursor_on_active() {
    let mut model = three_slide_model();
    model.theme = ThemeId::Neon;
    let model = update(model, Message::OpenThemeSelect);
    assert_eq!(model.mode, Mode::ThemeSelect);
    assert_eq!(model.theme_cursor, 1);
}

#[test]
fn test_theme_cursor_wraps_both_directions() {
    let mut model = three_slide_model();
    model.mode = Mode::ThemeSelect;
    model.theme_cursor = 0;

    let model = update(model, Message::ThemeCursorUp);
    assert_eq!(model.theme_cursor, ThemeId::ALL.len() - 1);
    let model = update(model, Message::ThemeCursorDown);
    assert_eq!(model.theme_cursor, 0);
}

#[test]
fn test_theme_confirm_applies_selection() {
    let mut model = three_slide_model();
    model.mode = Mode::ThemeSelect;
    model.theme_cursor = 2;
    let model = update(model, Message::ThemeConfirm);
    assert_eq!(model.theme, ThemeId::Minimal);
    assert_eq!(model.mode, Mode::Presentation);
}

#[test]
fn test_theme_cancel_keeps_previous_theme() {
    let mut model = three_slide_model();
    model.theme = ThemeId::Neon;
    model.mode = Mode::ThemeSelect;
    model.theme_cursor = 2;
    let model = update(model, Message::ThemeCancel);
    assert_eq!(model.theme, ThemeId::Neon);
    assert_eq!(model.mode, Mode::Presentation);
}

#[test]
fn test_front_matter_theme_overrides_session_theme() {
    let mut slide = markdown_slide("01_intro.md", "# Intro\n\nWelcome.");
    if let Slide::Markdown { metadata, .. } = &mut slide {
        metadata.theme = Some(ThemeId::Neon);
    }
    let model = test_model(vec![slide]);
    assert_eq!(model.theme, ThemeId::Default);
    assert_eq!(model.active_theme(), ThemeId::Neon);
}

// --- Scrolling ---

#[test]
fn test_scroll_down_clamps_to_content() {
    // 30 rendered lines in an 18-row body leaves 12 lines below the fold.
    let model = with_rendered_lines(three_slide_model(), 30);
    assert_eq!(model.max_scroll(), 12);

    let model = update(model, Message::ScrollDown(100));
    assert_eq!(model.scroll, 12);
}

#[test]
fn test_scroll_up_stops_at_zero() {
    let mut model = with_rendered_lines(three_slide_model(), 30);
    model.scroll = 3;
    let model = update(model, Message::ScrollUp(10));
    assert_eq!(model.scroll, 0);
}

#[test]
fn test_resize_clamps_scroll_to_new_height() {
    let mut model = with_rendered_lines(three_slide_model(), 30);
    model.scroll = 12;
    let model = update(model, Message::Resize(80, 60));
    assert_eq!(model.terminal_size, (80, 60));
    assert_eq!(model.scroll, 0);
}

// --- Render freshness ---

#[test]
fn test_render_ready_with_current_seq_is_displayed() {
    let mut model = three_slide_model();
    model.render_seq = 1;
    let result = RenderResult {
        seq: 1,
        slide_index: 0,
        step: 0,
        lines: vec![StyledLine::new("Welcome.".into(), LineKind::Paragraph)],
    };
    let model = update(model, Message::RenderReady(result));
    assert!(model.current_render().is_some());
}

#[test]
fn test_stale_render_result_is_discarded() {
    // Two requests went out; the first result must never be displayed.
    let mut model = three_slide_model();
    model.render_seq = 2;

    let stale = RenderResult {
        seq: 1,
        slide_index: 0,
        step: 0,
        lines: vec![StyledLine::new("old".into(), LineKind::Paragraph)],
    };
    let model = update(model, Message::RenderReady(stale));
    assert!(model.rendered.is_none());

    let fresh = RenderResult {
        seq: 2,
        slide_index: 0,
        step: 0,
        lines: vec![StyledLine::new("new".into(), LineKind::Paragraph)],
    };
    let model = update(model, Message::RenderReady(fresh));
    let render = model.current_render().unwrap();
    assert_eq!(render.lines[0].content(), "new");
}

#[test]
fn test_stale_result_cannot_overwrite_fresh_one() {
    let mut model = three_slide_model();
    model.render_seq = 2;

    let fresh = RenderResult {
        seq: 2,
        slide_index: 0,
        step: 0,
        lines: vec![StyledLine::new("new".into(), LineKind::Paragraph)],
    };
    let model = update(model, Message::RenderReady(fresh));

    let stale = RenderResult {
        seq: 1,
        slide_index: 0,
        step: 0,
        lines: vec![StyledLine::new("old".into(), LineKind::Paragraph)],
    };
    let model = update(model, Message::RenderReady(stale));
    assert_eq!(model.current_render().unwrap().lines[0].content(), "new");
}

#[test]
fn test_current_render_requires_matching_position() {
    let model = with_rendered_lines(three_slide_model(), 5);
    assert!(model.current_render().is_some());

    let model = update(model, Message::Advance);
    assert!(model.current_render().is_none());
    assert!(model.awaiting_render());
}

// --- Exit actions ---

#[test]
fn test_quit_message_sets_exit() {
    let model = three_slide_model();
    let model = update(model, Message::Quit);
    assert_eq!(model.exit, Some(ExitAction::Quit));
}

#[test]
fn test_play_on_cast_slide_requests_playback() {
    let mut model = mixed_model();
    model.index = 1;
    let model = update(model, Message::Play);
    assert_eq!(
        model.exit,
        Some(ExitAction::Play {
            path: PathBuf::from("02_demo.cast"),
            slide_index: 1,
        })
    );
}

#[test]
fn test_play_on_markdown_slide_is_ignored() {
    let model = three_slide_model();
    let model = update(model, Message::Play);
    assert!(model.exit.is_none());
}

// --- Empty deck ---

#[test]
fn test_empty_deck_navigation_is_safe() {
    let model = test_model(Vec::new());
    let model = update(model, Message::Advance);
    let model = update(model, Message::Retreat);
    let model = update(model, Message::JumpTo(5));
    assert_eq!(model.index, 0);
    assert_eq!(model.step, 0);
    assert_eq!(model.total_steps(), 1);
}

// --- Key handling ---

#[test]
fn test_right_arrow_advances() {
    let app = test_app();
    let model = three_slide_model();
    let msg = app.handle_key(key(KeyCode::Right), &model);
    assert_eq!(msg, Some(Message::Advance));
}

#[test]
fn test_q_and_esc_quit_presentation() {
    let app = test_app();
    let model = three_slide_model();
    assert_eq!(app.handle_key(key(KeyCode::Char('q')), &model), Some(Message::Quit));
    assert_eq!(app.handle_key(key(KeyCode::Esc), &model), Some(Message::Quit));
}

#[test]
fn test_ctrl_c_quits_in_any_mode() {
    let app = test_app();
    let mut model = three_slide_model();
    model.mode = Mode::ThemeSelect;
    let msg = app.handle_key(
        event::KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        &model,
    );
    assert_eq!(msg, Some(Message::Quit));
}

#[test]
fn test_up_arrow_ignored_when_not_scrolled() {
    let app = test_app();
    let model = three_slide_model();
    assert_eq!(app.handle_key(key(KeyCode::Up), &model), None);
}

#[test]
fn test_down_arrow_scrolls_when_content_overflows() {
    let app = test_app();
    let model = with_rendered_lines(three_slide_model(), 30);
    let msg = app.handle_key(key(KeyCode::Down), &model);
    assert_eq!(msg, Some(Message::ScrollDown(1)));
}

#[test]
fn test_down_arrow_ignored_at_bottom() {
    let app = test_app();
    let mut model = with_rendered_lines(three_slide_model(), 30);
    model.scroll = model.max_scroll();
    assert_eq!(app.handle_key(key(KeyCode::Down), &model), None);
}

#[test]
fn test_space_plays_cast_slide() {
    let app = test_app();
    let mut model = mixed_model();
    model.index = 1;
    let msg = app.handle_key(key(KeyCode::Char(' ')), &model);
    assert_eq!(msg, Some(Message::Play));
}

#[test]
fn test_space_page_scrolls_long_markdown() {
    let app = test_app();
    let model = with_rendered_lines(three_slide_model(), 30);
    let msg = app.handle_key(key(KeyCode::Char(' ')), &model);
    assert_eq!(msg, Some(Message::ScrollDown(5)));
}

#[test]
fn test_enter_ignored_on_markdown_slide() {
    let app = test_app();
    let model = three_slide_model();
    assert_eq!(app.handle_key(key(KeyCode::Enter), &model), None);
}

#[test]
fn test_tab_toggles_overview() {
    let app = test_app();
    let model = three_slide_model();
    assert_eq!(
        app.handle_key(key(KeyCode::Tab), &model),
        Some(Message::ToggleOverview)
    );
}

#[test]
fn test_overview_mode_routes_arrows_to_grid() {
    let app = test_app();
    let mut model = three_slide_model();
    model.mode = Mode::Overview;
    assert_eq!(
        app.handle_key(key(KeyCode::Right), &model),
        Some(Message::OverviewRight)
    );
    assert_eq!(
        app.handle_key(key(KeyCode::Enter), &model),
        Some(Message::OverviewConfirm)
    );
    assert_eq!(
        app.handle_key(key(KeyCode::Esc), &model),
        Some(Message::OverviewCancel)
    );
}

#[test]
fn test_theme_select_captures_other_keys() {
    let app = test_app();
    let mut model = three_slide_model();
    model.mode = Mode::ThemeSelect;
    // Slide navigation is suspended while the picker is open.
    assert_eq!(app.handle_key(key(KeyCode::Right), &model), None);
    assert_eq!(app.handle_key(key(KeyCode::Char('q')), &model), None);
    assert_eq!(
        app.handle_key(key(KeyCode::Up), &model),
        Some(Message::ThemeCursorUp)
    );
    assert_eq!(
        app.handle_key(key(KeyCode::Char('t')), &model),
        Some(Message::ThemeCancel)
    );
}

#[test]
fn test_t_opens_theme_select() {
    let app = test_app();
    let model = three_slide_model();
    assert_eq!(
        app.handle_key(key(KeyCode::Char('t')), &model),
        Some(Message::OpenThemeSelect)
    );
}

#[test]
fn test_resize_event_queues_debounce() {
    let app = test_app();
    let model = three_slide_model();
    let mut debouncer = ResizeDebouncer::new(100);

    let msg = app.handle_event(Event::Resize(100, 40), &model, 0, &mut debouncer);
    assert!(msg.is_none());
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.take_ready(100), Some((100, 40)));
}

// --- Resize debouncing ---

#[test]
fn test_resize_debouncer_waits_for_quiet_period() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 0);

    assert!(debouncer.take_ready(50).is_none());
    assert_eq!(debouncer.take_ready(100), Some((120, 40)));
}

#[test]
fn test_resize_debouncer_uses_latest_size() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 0);
    debouncer.queue(140, 50, 20);

    assert!(debouncer.take_ready(80).is_none());
    assert_eq!(debouncer.take_ready(120), Some((140, 50)));
}

// --- Side effects ---

#[test]
fn test_request_render_round_trip() {
    let app = test_app();
    let mut model = three_slide_model();
    let worker = RenderWorker::spawn();

    app.request_render(&mut model, &worker);
    assert_eq!(model.render_seq, 1);

    let deadline = Instant::now() + Duration::from_secs(2);
    let result = loop {
        if let Some(result) = worker.try_recv() {
            break result;
        }
        assert!(Instant::now() < deadline, "render worker did not respond");
        std::thread::sleep(Duration::from_millis(10));
    };

    let model = update(model, Message::RenderReady(result));
    let render = model.current_render().expect("render should be current");
    assert!(render.lines.iter().any(|line| line.content().contains("Welcome")));
}

#[test]
fn test_request_render_on_cast_slide_clears_stale_render() {
    let app = test_app();
    let mut model = with_rendered_lines(mixed_model(), 5);
    let worker = RenderWorker::spawn();

    model.index = 1;
    app.request_render(&mut model, &worker);

    assert!(model.rendered.is_none());
    assert_eq!(model.render_seq, 0);
}

#[test]
fn test_deck_changed_reloads_from_disk() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("01_one.md"), "# One\n\nalpha").unwrap();
    std::fs::write(dir.path().join("02_two.md"), "# Two\n\nbeta").unwrap();

    let source = DeckSource::Directory(dir.path().to_path_buf());
    let slides = crate::deck::load(&source).unwrap();
    let mut model = Model::new(slides, source.clone(), (80, 24));
    let app = App::new(source);
    let worker = RenderWorker::spawn();

    std::fs::write(dir.path().join("03_three.md"), "# Three\n\ngamma").unwrap();
    model = update(model, Message::DeckChanged);
    app.handle_message_side_effects(&mut model, &worker, &Message::DeckChanged);

    assert_eq!(model.slides.len(), 3);
    assert_eq!(model.reload_count, 1);
}

#[test]
fn test_reload_clamps_position_when_deck_shrinks() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("01_one.md"), "# One\n\nalpha").unwrap();
    std::fs::write(dir.path().join("02_two.md"), "# Two\n\nbeta").unwrap();
    std::fs::write(dir.path().join("03_three.md"), "# Three\n\ngamma").unwrap();

    let source = DeckSource::Directory(dir.path().to_path_buf());
    let slides = crate::deck::load(&source).unwrap();
    let mut model = Model::new(slides, source, (80, 24));
    model.index = 2;
    model.overview_selected = 2;

    std::fs::remove_file(dir.path().join("03_three.md")).unwrap();
    App::reload_deck(&mut model);

    assert_eq!(model.slides.len(), 2);
    assert_eq!(model.index, 1);
    assert_eq!(model.overview_selected, 1);
    assert!(model.rendered.is_none());
}

#[test]
fn test_reload_ignores_empty_scan() {
    // A scan that finds nothing may be a slide file caught mid-write.
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("01_one.md"), "# One\n\nalpha").unwrap();

    let source = DeckSource::Directory(dir.path().to_path_buf());
    let slides = crate::deck::load(&source).unwrap();
    let mut model = Model::new(slides, source, (80, 24));

    std::fs::remove_file(dir.path().join("01_one.md")).unwrap();
    App::reload_deck(&mut model);

    assert_eq!(model.slides.len(), 1);
    assert_eq!(model.reload_count, 0);
}

#[test]
fn test_reload_failure_keeps_previous_slides() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("deck.md");
    std::fs::write(&doc, "# One\n\nalpha\n\n---\n\n# Two\n\nbeta").unwrap();

    let source = DeckSource::Document(doc.clone());
    let slides = crate::deck::load(&source).unwrap();
    let mut model = Model::new(slides, source, (80, 24));

    std::fs::remove_file(&doc).unwrap();
    App::reload_deck(&mut model);

    assert_eq!(model.slides.len(), 2);
    assert_eq!(model.reload_count, 0);
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn nav_message(choice: u8) -> Message {
        match choice % 6 {
            0 => Message::Advance,
            1 => Message::Retreat,
            2 => Message::OverviewRight,
            3 => Message::OverviewDown,
            4 => Message::OverviewUp,
            _ => Message::OverviewLeft,
        }
    }

    proptest! {
        #[test]
        fn navigation_stays_in_bounds(choices in prop::collection::vec(0..6u8, 0..64)) {
            let mut model = fragmented_model();
            for choice in choices {
                model = update(model, nav_message(choice));
                prop_assert!(model.index < model.slides.len());
                prop_assert!(model.step < model.total_steps());
                prop_assert!(model.overview_selected < model.slides.len());
            }
        }

        #[test]
        fn jump_always_lands_on_a_slide(target in 0..1000usize) {
            let model = three_slide_model();
            let model = update(model, Message::JumpTo(target));
            prop_assert!(model.index < model.slides.len());
            prop_assert_eq!(model.step, 0);
        }

        #[test]
        fn scroll_never_exceeds_content(
            downs in 0..10000usize,
            ups in 0..10000usize,
            lines in 0..200usize,
        ) {
            let model = with_rendered_lines(three_slide_model(), lines);
            let model = update(model, Message::ScrollDown(downs));
            let model = update(model, Message::ScrollUp(ups));
            prop_assert!(model.scroll <= model.max_scroll());
        }
    }
}
