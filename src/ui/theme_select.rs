//! Centered theme picker. Replaces the slide view while open; selection
//! state lives in the model so drawing stays pure.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};

use crate::app::Model;
use crate::deck::ThemeId;
use crate::ui::Theme;

const POPUP_WIDTH: u16 = 40;

#[allow(clippy::cast_possible_truncation)]
pub(super) fn render(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup = centered_popup_rect(POPUP_WIDTH, ThemeId::ALL.len() as u16 + 8, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme.border))
        .padding(Padding::new(2, 2, 1, 1));
    let inner = block.inner(popup);

    let dim = Style::default().fg(theme.dim);
    let mut lines = vec![
        Line::from(Span::styled(
            "SELECT THEME",
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ))
        .alignment(Alignment::Center),
        Line::default(),
    ];

    for (row, id) in ThemeId::ALL.into_iter().enumerate() {
        let under_cursor = row == model.theme_cursor;
        let cursor = if under_cursor { "> " } else { "  " };
        let name_style = if under_cursor {
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        let mut spans = vec![Span::styled(format!("{cursor}{}", id.name()), name_style)];
        if id == model.theme {
            let used = 2 + id.name().chars().count() + "[Active]".len();
            let filler = usize::from(inner.width).saturating_sub(used);
            spans.push(Span::raw(" ".repeat(filler)));
            spans.push(Span::styled("[Active]", dim));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::default());
    lines.push(
        Line::from(Span::styled("Enter to select | Esc to cancel", dim))
            .alignment(Alignment::Center),
    );

    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
