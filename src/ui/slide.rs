//! Presentation view: slide header, rendered body window, scroll indicator.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::app::Model;
use crate::deck::{Layout, Slide};
use crate::render::{RenderLayout, StyledLine};
use crate::ui::Theme;

/// Rows above the body: one padding row, the title, and the subtitle.
const HEADER_ROWS: u16 = 3;

pub(super) fn render(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let Some(slide) = model.current_slide() else {
        return;
    };
    if slide.is_cast() {
        render_cast(slide, frame, area, theme);
    } else {
        render_markdown(model, slide, frame, area, theme);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn render_markdown(model: &Model, slide: &Slide, frame: &mut Frame, area: Rect, theme: &Theme) {
    if area.height <= HEADER_ROWS {
        return;
    }

    let title_row = Rect {
        y: area.y + 1,
        height: 1,
        ..area
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(slide.display_title(), theme.title)))
            .alignment(Alignment::Center),
        title_row,
    );
    if let Some(subtitle) = slide.metadata().subtitle.as_deref() {
        let subtitle_row = Rect {
            y: area.y + 2,
            height: 1,
            ..area
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(subtitle, theme.subtitle)))
                .alignment(Alignment::Center),
            subtitle_row,
        );
    }

    // The content column uses the same wrap width the renderer was given,
    // so lines never re-wrap at draw time.
    let layout = slide.metadata().layout.unwrap_or_default();
    let content_width =
        RenderLayout::for_viewport(model.terminal_size.0, model.terminal_size.1).content_width;
    let content_x = match layout {
        Layout::Split => area.x + 2.min(area.width),
        Layout::Default | Layout::Center => area.x + area.width.saturating_sub(content_width) / 2,
    };
    let width = content_width.min(area.right().saturating_sub(content_x));
    let body_rows = usize::from(model.body_rows());

    if let Some(result) = model.current_render() {
        let lines: Vec<Line> = result
            .lines
            .iter()
            .skip(model.scroll)
            .take(body_rows)
            .map(|line| to_line(line, theme))
            .collect();
        let shown = lines.len();
        let y_offset = match layout {
            Layout::Center => (body_rows.saturating_sub(shown) / 2) as u16,
            Layout::Default | Layout::Split => 0,
        };
        let body_area = Rect {
            x: content_x,
            y: area.y + HEADER_ROWS + y_offset,
            width,
            height: shown as u16,
        };
        frame.render_widget(Paragraph::new(lines), body_area);
    } else {
        let body_area = Rect {
            x: content_x,
            y: area.y + HEADER_ROWS,
            width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled("Loading…", Style::default().fg(theme.dim))),
            body_area,
        );
    }

    render_scroll_row(model, frame, area, content_x, width, theme);
}

/// Bottom row of the slide area: scroll arrows on the left, the reveal
/// step counter on the right.
fn render_scroll_row(
    model: &Model,
    frame: &mut Frame,
    area: Rect,
    content_x: u16,
    width: u16,
    theme: &Theme,
) {
    let row = Rect {
        x: content_x,
        y: area.y + area.height - 1,
        width,
        height: 1,
    };
    let dim = Style::default().fg(theme.dim);

    let up = if model.can_scroll_up() { "↑" } else { " " };
    let down = if model.can_scroll_down() { "↓" } else { " " };
    let mut left = format!("{up}{down}");
    if model.awaiting_render() {
        left.push_str(" …");
    }
    frame.render_widget(Paragraph::new(Span::styled(left, dim)), row);

    let total = model.total_steps();
    if total > 1 {
        let steps = format!("Step {}/{total}", model.step + 1);
        frame.render_widget(
            Paragraph::new(Span::styled(steps, dim)).alignment(Alignment::Right),
            row,
        );
    }
}

fn render_cast(slide: &Slide, frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 8 || inner.width == 0 {
        return;
    }

    let top = inner.y + inner.height.saturating_sub(8) / 2;
    let row = |y: u16| Rect { y, height: 1, ..inner };

    frame.render_widget(
        Paragraph::new(Span::styled(
            "DEMO",
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        row(top),
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            slide.display_title(),
            Style::default()
                .fg(theme.text)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        row(top + 1),
    );

    let box_width = 35.min(inner.width);
    let box_area = Rect {
        x: inner.x + inner.width.saturating_sub(box_width) / 2,
        y: top + 3,
        width: box_width,
        height: 3,
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            "PRESS [SPACE] TO PLAY RECORDING",
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.highlight)),
        ),
        box_area,
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Space: pause/resume · Ctrl+C: exit early",
            Style::default().fg(theme.dim),
        ))
        .alignment(Alignment::Center),
        row(top + 7),
    );
}

/// Convert one rendered line to a ratatui line, merging span styles over
/// the theme's base style for the line kind.
fn to_line<'a>(line: &'a StyledLine, theme: &Theme) -> Line<'a> {
    let base = theme.line_style(line.kind());
    match line.spans() {
        Some(spans) => Line::from(
            spans
                .iter()
                .map(|span| Span::styled(span.text(), theme.inline_style(base, span.style())))
                .collect::<Vec<_>>(),
        ),
        None => Line::from(Span::styled(line.content(), base)),
    }
}
