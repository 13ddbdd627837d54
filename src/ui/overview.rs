//! Overview mode: a grid of numbered slide cells with a key-hint bar.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::app::Model;
use crate::deck::Slide;
use crate::ui::{OVERVIEW_CELL_HEIGHT, OVERVIEW_CELL_WIDTH, Theme};

#[allow(clippy::cast_possible_truncation)]
pub(super) fn render(model: &Model, frame: &mut Frame, area: Rect, theme: &Theme) {
    if area.height < 3 {
        return;
    }
    let grid_area = Rect {
        height: area.height - 3,
        ..area
    };
    let bar = Rect {
        y: area.y + area.height - 3,
        height: 3,
        ..area
    };

    let len = model.slides.len();
    let columns = model.overview_columns();
    let max_rows = usize::from(grid_area.height.saturating_sub(5) / OVERVIEW_CELL_HEIGHT).max(1);
    let total_rows = len.div_ceil(columns);

    // Keep the selection's row near the middle of the window.
    let selected_row = model.overview_selected / columns;
    let start_row = selected_row
        .saturating_sub(max_rows / 2)
        .min(total_rows.saturating_sub(max_rows));
    let start_index = start_row * columns;
    let visible = max_rows * columns;
    let end_index = (start_index + visible).min(len);

    let header = Line::from(vec![
        Span::styled(
            "SLIDE OVERVIEW",
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({len} slides)"),
            Style::default().fg(theme.dim),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(header).alignment(Alignment::Center),
        Rect {
            y: grid_area.y + 1,
            height: 1,
            ..grid_area
        },
    );

    for (offset, slide) in model.slides[start_index..end_index].iter().enumerate() {
        let index = start_index + offset;
        let cell = Rect {
            x: area.x + 2 + (offset % columns) as u16 * (OVERVIEW_CELL_WIDTH + 2),
            y: grid_area.y + 3 + (offset / columns) as u16 * OVERVIEW_CELL_HEIGHT,
            width: OVERVIEW_CELL_WIDTH,
            height: OVERVIEW_CELL_HEIGHT,
        };
        render_cell(model, slide, index, cell, frame, theme);
    }

    if len > visible {
        let showing = format!("Showing {}-{} of {len}", start_index + 1, end_index);
        frame.render_widget(
            Paragraph::new(Span::styled(showing, Style::default().fg(theme.dim)))
                .alignment(Alignment::Center),
            Rect {
                y: grid_area.y + 3 + max_rows as u16 * OVERVIEW_CELL_HEIGHT,
                height: 1,
                ..grid_area
            },
        );
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(bar);
    frame.render_widget(block, bar);
    frame.render_widget(
        Paragraph::new(Span::styled(
            "↑/↓/←/→ Navigate | Enter: Jump | Tab/Esc: Exit Overview",
            Style::default().fg(theme.text),
        )),
        inner,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("Selected: {}/{len}", model.overview_selected + 1),
            Style::default().fg(theme.dim),
        ))
        .alignment(Alignment::Right),
        inner,
    );
}

fn render_cell(
    model: &Model,
    slide: &Slide,
    index: usize,
    cell: Rect,
    frame: &mut Frame,
    theme: &Theme,
) {
    let selected = index == model.overview_selected;
    let current = index == model.index;

    let border_style = if selected {
        Style::default().fg(theme.border)
    } else if current {
        Style::default().fg(theme.highlight)
    } else {
        Style::default().fg(theme.dim)
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    if selected {
        block = block.border_type(BorderType::Thick);
    }
    let inner = block.inner(cell);
    frame.render_widget(block, cell);

    let number_style = if selected {
        Style::default()
            .fg(theme.border)
            .add_modifier(Modifier::BOLD)
    } else if current {
        Style::default().fg(theme.highlight)
    } else {
        Style::default().fg(theme.text)
    };
    let title_style = if selected {
        Style::default()
            .fg(theme.border)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };

    let mut spans = vec![Span::styled(format!("{:02} ", index + 1), number_style)];
    let mut avail = usize::from(inner.width).saturating_sub(3);
    if slide.is_cast() {
        spans.push(Span::styled("[DEMO] ", Style::default().fg(theme.dim)));
        avail = avail.saturating_sub(7);
    }
    spans.push(Span::styled(
        truncate(slide.display_title(), avail),
        title_style,
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn test_truncate_short_title_unchanged() {
        assert_eq!(truncate("Intro", 25), "Intro");
    }

    #[test]
    fn test_truncate_long_title_gets_ellipsis() {
        let long = "A very long slide title that cannot fit";
        let cut = truncate(long, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_exact_fit_unchanged() {
        assert_eq!(truncate("1234567890", 10), "1234567890");
    }
}
