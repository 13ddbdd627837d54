//! Markdown to styled lines with comrak.

use std::sync::OnceLock;

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{InlineColor, InlineSpan, InlineStyle, LineKind, StyledLine};

const CODE_RIGHT_PADDING: usize = 3;

/// Convert a slide body to styled display lines wrapped at `width` cells.
pub fn to_styled_lines(source: &str, width: u16) -> Vec<StyledLine> {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut lines = Vec::new();
    walk(root, &mut lines, 0, usize::from(width.max(1)), None);
    lines
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.shortcodes = true;
    options
}

fn walk<'a>(
    node: &'a AstNode<'a>,
    lines: &mut Vec<StyledLine>,
    depth: usize,
    wrap_width: usize,
    list_marker: Option<String>,
) {
    match &node.data.borrow().value {
        NodeValue::Document => {
            for child in node.children() {
                walk(child, lines, depth, wrap_width, list_marker.clone());
            }
        }

        NodeValue::Heading(heading) => {
            ensure_trailing_empty(lines, 1);
            lines.push(StyledLine::new(
                extract_text(node),
                LineKind::Heading(heading.level),
            ));
            lines.push(StyledLine::new(String::new(), LineKind::Empty));
        }

        NodeValue::Paragraph => {
            let spans = collect_inline_spans(node);
            for line_spans in wrap_spans(&spans, wrap_width, "", "") {
                let content = spans_to_string(&line_spans);
                lines.push(StyledLine::with_spans(
                    content,
                    LineKind::Paragraph,
                    line_spans,
                ));
            }
            lines.push(StyledLine::new(String::new(), LineKind::Empty));
        }

        NodeValue::CodeBlock(code_block) => {
            let language = code_block
                .info
                .split_whitespace()
                .next()
                .filter(|s| !s.is_empty());
            let content_width = code_block
                .literal
                .lines()
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0)
                .min(wrap_width.saturating_sub(4).max(1));

            let label = format!(" {} ", language.unwrap_or("code"));
            let frame_inner_width = content_width + 2 + CODE_RIGHT_PADDING;
            let visible_label: String = label.chars().take(frame_inner_width).collect();
            lines.push(StyledLine::new(
                format!(
                    "┌{visible_label}{}┐",
                    "─".repeat(frame_inner_width.saturating_sub(visible_label.chars().count()))
                ),
                LineKind::CodeBlock,
            ));

            for row_spans in highlight_code(language, &code_block.literal) {
                let trimmed = truncate_spans(&row_spans, content_width);
                let trimmed_len = spans_char_len(&trimmed);
                let padding =
                    " ".repeat(content_width.saturating_sub(trimmed_len) + CODE_RIGHT_PADDING);

                let mut line_spans = vec![InlineSpan::new("│ ".to_string(), InlineStyle::default())];
                line_spans.extend(trimmed);
                line_spans.push(InlineSpan::new(format!("{padding} │"), InlineStyle::default()));
                let content = spans_to_string(&line_spans);
                lines.push(StyledLine::with_spans(content, LineKind::CodeBlock, line_spans));
            }

            lines.push(StyledLine::new(
                format!("└{}┘", "─".repeat(frame_inner_width)),
                LineKind::CodeBlock,
            ));
            lines.push(StyledLine::new(String::new(), LineKind::Empty));
        }

        NodeValue::List(list) => {
            let list_depth = depth + 1;
            let delimiter = match list.delimiter {
                ListDelimType::Paren => ')',
                ListDelimType::Period => '.',
            };
            let list_len = node.children().count();
            let max_number = list.start + list_len.saturating_sub(1);
            let number_width = max_number.to_string().len();

            for (index, child) in node.children().enumerate() {
                let base_marker = match list.list_type {
                    ListType::Bullet => "•".to_string(),
                    ListType::Ordered => {
                        let number = list.start + index;
                        format!("{number:>number_width$}{delimiter}")
                    }
                };
                walk(
                    child,
                    lines,
                    list_depth,
                    wrap_width,
                    Some(format!("{base_marker} ")),
                );
            }
        }

        NodeValue::TaskItem(symbol) => {
            let indent = "  ".repeat(depth.saturating_sub(1));
            let marker = if symbol.is_some() { "✓ " } else { "□ " };
            let prefix_first = format!("{indent}{marker}");
            let prefix_next = format!("{indent}{}", " ".repeat(marker.chars().count()));

            let spans = collect_inline_spans(node);
            for line_spans in wrap_spans(&spans, wrap_width, &prefix_first, &prefix_next) {
                let content = spans_to_string(&line_spans);
                lines.push(StyledLine::with_spans(
                    content,
                    LineKind::ListItem(depth),
                    line_spans,
                ));
            }

            for child in node.children() {
                if matches!(child.data.borrow().value, NodeValue::List(_)) {
                    walk(child, lines, depth, wrap_width, None);
                }
            }
        }

        NodeValue::Item(_) => {
            let indent = "  ".repeat(depth.saturating_sub(1));
            let marker = list_marker.unwrap_or_else(|| "- ".to_string());
            let prefix_first = format!("{indent}{marker}");
            let prefix_next = format!("{indent}{}", " ".repeat(marker.chars().count()));
            let mut rendered_any = false;

            for child in node.children() {
                match &child.data.borrow().value {
                    NodeValue::Paragraph => {
                        if rendered_any {
                            lines.push(StyledLine::new(String::new(), LineKind::ListItem(depth)));
                        }
                        let spans = collect_inline_spans(child);
                        let prefix = if rendered_any { &prefix_next } else { &prefix_first };
                        for line_spans in wrap_spans(&spans, wrap_width, prefix, &prefix_next) {
                            let content = spans_to_string(&line_spans);
                            lines.push(StyledLine::with_spans(
                                content,
                                LineKind::ListItem(depth),
                                line_spans,
                            ));
                        }
                        rendered_any = true;
                    }
                    _ => {
                        walk(child, lines, depth, wrap_width, None);
                    }
                }
            }

            if !rendered_any {
                let spans = collect_inline_spans(node);
                for line_spans in wrap_spans(&spans, wrap_width, &prefix_first, &prefix_next) {
                    let content = spans_to_string(&line_spans);
                    lines.push(StyledLine::with_spans(
                        content,
                        LineKind::ListItem(depth),
                        line_spans,
                    ));
                }
            }
        }

        NodeValue::BlockQuote => {
            render_blockquote(node, lines, wrap_width, 1);
            lines.push(StyledLine::new(String::new(), LineKind::Empty));
        }

        NodeValue::ThematicBreak => {
            lines.push(StyledLine::new(String::new(), LineKind::HorizontalRule));
            lines.push(StyledLine::new(String::new(), LineKind::Empty));
        }

        NodeValue::Table(_) => {
            for line in render_table(node, wrap_width) {
                lines.push(StyledLine::new(line, LineKind::Table));
            }
            lines.push(StyledLine::new(String::new(), LineKind::Empty));
        }

        _ => {
            for child in node.children() {
                walk(child, lines, depth, wrap_width, list_marker.clone());
            }
        }
    }
}

fn ensure_trailing_empty(lines: &mut Vec<StyledLine>, count: usize) {
    if lines.is_empty() {
        return;
    }
    let existing = lines
        .iter()
        .rev()
        .take_while(|line| line.kind() == LineKind::Empty)
        .count();
    for _ in existing..count {
        lines.push(StyledLine::new(String::new(), LineKind::Empty));
    }
}

fn render_blockquote<'a>(
    node: &'a AstNode<'a>,
    lines: &mut Vec<StyledLine>,
    wrap_width: usize,
    quote_depth: usize,
) {
    let prefix = quote_prefix(quote_depth);

    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Paragraph => {
                let spans = collect_inline_spans(child);
                for line_spans in wrap_spans(&spans, wrap_width, &prefix, &prefix) {
                    let content = spans_to_string(&line_spans);
                    lines.push(StyledLine::with_spans(
                        content,
                        LineKind::BlockQuote,
                        line_spans,
                    ));
                }
            }
            NodeValue::BlockQuote => {
                render_blockquote(child, lines, wrap_width, quote_depth + 1);
            }
            _ => {
                for raw_line in extract_text(child).lines() {
                    let spans = vec![InlineSpan::new(raw_line.to_string(), InlineStyle::default())];
                    for line_spans in wrap_spans(&spans, wrap_width, &prefix, &prefix) {
                        let content = spans_to_string(&line_spans);
                        lines.push(StyledLine::with_spans(
                            content,
                            LineKind::BlockQuote,
                            line_spans,
                        ));
                    }
                }
            }
        }
    }
}

fn quote_prefix(depth: usize) -> String {
    let mut prefix = String::from("  ");
    for _ in 0..depth {
        prefix.push('│');
        prefix.push(' ');
    }
    prefix
}

fn render_table<'a>(table_node: &'a AstNode<'a>, wrap_width: usize) -> Vec<String> {
    let (alignments, mut rows, has_header) = collect_table_rows(table_node);
    if rows.is_empty() {
        return Vec::new();
    }

    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return Vec::new();
    }

    for row in &mut rows {
        while row.len() < num_cols {
            row.push(String::new());
        }
    }

    let mut col_widths = vec![1_usize; num_cols];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            col_widths[idx] = col_widths[idx].max(display_width(cell));
        }
    }

    // Shrink the widest column until the table fits the wrap width.
    let max_table_width = wrap_width.max(4);
    while 1 + col_widths.iter().sum::<usize>() + (3 * num_cols) > max_table_width {
        if let Some((widest_idx, _)) = col_widths.iter().enumerate().max_by_key(|(_, w)| *w) {
            if col_widths[widest_idx] > 1 {
                col_widths[widest_idx] -= 1;
            } else {
                break;
            }
        }
    }

    let top = render_table_border(&col_widths, '┌', '┬', '┐');
    let mid = render_table_border(&col_widths, '├', '┼', '┤');
    let bottom = render_table_border(&col_widths, '└', '┴', '┘');

    let mut lines = vec![top];
    for (idx, row) in rows.iter().enumerate() {
        lines.push(render_table_row(row, &col_widths, &alignments));
        if has_header && idx == 0 {
            lines.push(mid.clone());
        }
    }
    lines.push(bottom);
    lines
}

fn collect_table_rows<'a>(
    table_node: &'a AstNode<'a>,
) -> (Vec<TableAlignment>, Vec<Vec<String>>, bool) {
    let alignments = match &table_node.data.borrow().value {
        NodeValue::Table(table) => table.alignments.clone(),
        _ => Vec::new(),
    };

    let mut rows = Vec::new();
    let mut has_header = false;
    for row_node in table_node.children() {
        if matches!(row_node.data.borrow().value, NodeValue::TableRow(true)) {
            has_header = true;
        }
        if !matches!(row_node.data.borrow().value, NodeValue::TableRow(_)) {
            continue;
        }

        let mut row_cells = Vec::new();
        for cell_node in row_node.children() {
            if !matches!(cell_node.data.borrow().value, NodeValue::TableCell) {
                continue;
            }
            let cell = extract_text(cell_node)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            row_cells.push(cell);
        }
        rows.push(row_cells);
    }

    (alignments, rows, has_header)
}

fn render_table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let mut out = String::new();
    out.push(left);
    for (idx, width) in widths.iter().enumerate() {
        out.push_str(&"─".repeat(width + 2));
        if idx + 1 < widths.len() {
            out.push(middle);
        }
    }
    out.push(right);
    out
}

fn render_table_row(cells: &[String], widths: &[usize], alignments: &[TableAlignment]) -> String {
    let mut out = String::new();
    out.push('│');
    for idx in 0..widths.len() {
        let content = cells.get(idx).map_or("", String::as_str);
        let content = truncate_text(content, widths[idx]);
        let padding = widths[idx].saturating_sub(display_width(&content));

        out.push(' ');
        match alignments.get(idx).copied().unwrap_or(TableAlignment::None) {
            TableAlignment::Right => {
                out.push_str(&" ".repeat(padding));
                out.push_str(&content);
            }
            TableAlignment::Center => {
                let left = padding / 2;
                out.push_str(&" ".repeat(left));
                out.push_str(&content);
                out.push_str(&" ".repeat(padding - left));
            }
            TableAlignment::Left | TableAlignment::None => {
                out.push_str(&content);
                out.push_str(&" ".repeat(padding));
            }
        }
        out.push(' ');
        out.push('│');
    }
    out
}

fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(code) => text.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    collect_inline_spans_recursive(node, InlineStyle::default(), &mut spans);
    spans
}

fn collect_inline_spans_recursive<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    spans: &mut Vec<InlineSpan>,
) {
    match &node.data.borrow().value {
        // Nested list content renders through its own items.
        NodeValue::List(_) | NodeValue::Item(_) => {}
        NodeValue::Text(t) => {
            spans.push(InlineSpan::new(t.clone(), style));
        }
        NodeValue::Code(code) => {
            let mut code_style = style;
            code_style.code = true;
            code_style.emphasis = false;
            code_style.strong = false;
            code_style.strikethrough = false;
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
        }
        NodeValue::Emph => {
            let mut next = style;
            next.emphasis = true;
            for child in node.children() {
                collect_inline_spans_recursive(child, next, spans);
            }
        }
        NodeValue::Strong => {
            let mut next = style;
            next.strong = true;
            for child in node.children() {
                collect_inline_spans_recursive(child, next, spans);
            }
        }
        NodeValue::Strikethrough => {
            let mut next = style;
            next.strikethrough = true;
            for child in node.children() {
                collect_inline_spans_recursive(child, next, spans);
            }
        }
        NodeValue::Link(_) => {
            let mut next = style;
            next.link = true;
            for child in node.children() {
                collect_inline_spans_recursive(child, next, spans);
            }
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new(" ".to_string(), style));
        }
        _ => {
            for child in node.children() {
                collect_inline_spans_recursive(child, style, spans);
            }
        }
    }
}

fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let mut tokens: Vec<InlineSpan> = Vec::new();
    for span in spans {
        tokens.extend(split_inline_tokens(span));
    }

    let mut lines: Vec<Vec<InlineSpan>> = Vec::new();
    let mut current: Vec<InlineSpan> = Vec::new();
    let mut current_len = 0usize;
    let mut has_word = false;

    let start_new_line = |prefix: &str,
                          current: &mut Vec<InlineSpan>,
                          current_len: &mut usize,
                          has_word: &mut bool| {
        current.clear();
        if prefix.is_empty() {
            *current_len = 0;
        } else {
            current.push(InlineSpan::new(prefix.to_string(), InlineStyle::default()));
            *current_len = prefix.chars().count();
        }
        *has_word = false;
    };

    start_new_line(prefix_first, &mut current, &mut current_len, &mut has_word);

    for token in tokens {
        let token_len = token.text().chars().count();
        let token_is_ws = token.text().chars().all(char::is_whitespace);

        if current_len + token_len > width && has_word {
            lines.push(current.clone());
            start_new_line(prefix_next, &mut current, &mut current_len, &mut has_word);
        }

        if token_is_ws && !has_word {
            // Drop leading whitespace at wrapped line starts.
            continue;
        }

        current_len += token_len;
        current.push(token);
        if !token_is_ws {
            has_word = true;
        }
    }

    if current.is_empty() && !prefix_first.is_empty() {
        current.push(InlineSpan::new(
            prefix_first.to_string(),
            InlineStyle::default(),
        ));
    }

    lines.push(current);
    lines
}

fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;

    for ch in span.text().chars() {
        let is_ws = ch.is_whitespace();
        match ws_state {
            Some(state) if state == is_ws => {
                buf.push(ch);
            }
            Some(_) => {
                out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
                buf.push(ch);
                ws_state = Some(is_ws);
            }
            None => {
                buf.push(ch);
                ws_state = Some(is_ws);
            }
        }
    }

    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }

    out
}

fn spans_to_string(spans: &[InlineSpan]) -> String {
    let mut content = String::new();
    for span in spans {
        content.push_str(span.text());
    }
    content
}

fn spans_char_len(spans: &[InlineSpan]) -> usize {
    spans.iter().map(|s| s.text().chars().count()).sum()
}

fn truncate_spans(spans: &[InlineSpan], max_len: usize) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut remaining = max_len;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let taken: String = span.text().chars().take(remaining).collect();
        let count = taken.chars().count();
        if count > 0 {
            out.push(InlineSpan::new(taken, span.style()));
            remaining -= count;
        }
    }
    out
}

fn highlight_code(language: Option<&str>, code: &str) -> Vec<Vec<InlineSpan>> {
    let syntax_set = syntax_set();
    let syntax = language
        .and_then(|lang| syntax_set.find_syntax_by_token(lang))
        .or_else(|| language.and_then(|lang| syntax_set.find_syntax_by_name(lang)));

    let Some(syntax) = syntax else {
        return code
            .lines()
            .map(|line| {
                let style = InlineStyle {
                    code: true,
                    ..InlineStyle::default()
                };
                vec![InlineSpan::new(line.to_string(), style)]
            })
            .collect();
    };

    let mut highlighter = HighlightLines::new(syntax, code_theme());
    let mut lines = Vec::new();
    for line in code.lines() {
        let ranges = highlighter
            .highlight_line(line, syntax_set)
            .unwrap_or_default();
        let mut spans = Vec::new();
        for (style, text) in ranges {
            let inline_style = InlineStyle {
                code: true,
                fg: Some(InlineColor {
                    r: style.foreground.r,
                    g: style.foreground.g,
                    b: style.foreground.b,
                }),
                ..InlineStyle::default()
            };
            spans.push(InlineSpan::new(text.to_string(), inline_style));
        }
        lines.push(spans);
    }
    lines
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn code_theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        let theme_set = ThemeSet::load_defaults();
        for name in ["Monokai Extended", "Dracula", "base16-ocean.dark"] {
            if let Some(theme) = theme_set.themes.get(name) {
                return theme.clone();
            }
        }
        theme_set
            .themes
            .values()
            .next()
            .cloned()
            .unwrap_or_default()
    })
}
