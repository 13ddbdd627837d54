//! Two-row footer: a horizontal rule, key hints, and the slide counter.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;

use crate::app::Model;
use crate::ui::Theme;

const HINTS: &str = "←→ nav  ↑↓ scroll  t theme  Tab overview  q quit";

pub(super) fn render(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    if area.height == 0 {
        return;
    }
    let dim = Style::default().fg(theme.dim);
    let inner = Rect {
        x: area.x + 2.min(area.width),
        width: area.width.saturating_sub(4),
        ..area
    };

    let rule = "─".repeat(usize::from(inner.width));
    frame.render_widget(
        Paragraph::new(Span::styled(rule, dim)),
        Rect { height: 1, ..inner },
    );

    if area.height < 2 {
        return;
    }
    let second = Rect {
        y: inner.y + 1,
        height: 1,
        ..inner
    };
    frame.render_widget(Paragraph::new(Span::styled(HINTS, dim)), second);

    // The dot marks a deck that changed on disk since startup.
    let marker = if model.reload_count > 0 { "● " } else { "" };
    let counter = format!("{marker}{}/{}", model.index + 1, model.slides.len());
    frame.render_widget(
        Paragraph::new(Span::styled(counter, dim)).alignment(Alignment::Right),
        second,
    );
}
