//! Form widgets shared by the pages

use ratatui::{
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::auth::code_input::CodeInput;
use crate::theme::Palette;

/// Single-line labelled input. The focused field gets the accent border.
pub fn text_field(f: &mut Frame, p: &Palette, area: Rect, label: &str, value: &str, focused: bool) {
    let border = if focused { p.accent } else { p.inactive };
    let title_style = if focused {
        Style::default().fg(p.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(p.text_dim)
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", label), title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let content = if focused {
        format!("{}▏", value)
    } else {
        value.to_string()
    };

    let field = Paragraph::new(content)
        .style(Style::default().fg(p.text))
        .block(block);
    f.render_widget(field, area);
}

/// Row of boxed single-digit cells
pub fn code_cells(f: &mut Frame, p: &Palette, area: Rect, code: &CodeInput) {
    let constraints = vec![Constraint::Length(5); code.len()];
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .flex(Flex::Center)
        .spacing(1)
        .constraints(constraints)
        .split(area);

    for (i, (cell, rect)) in code.cells().iter().zip(cells.iter()).enumerate() {
        let focused = i == code.focus();
        let border = if focused {
            p.accent
        } else if cell.is_filled() {
            p.filled
        } else {
            p.inactive
        };

        let digit = cell.value().map(String::from).unwrap_or_else(|| " ".to_string());
        let mut style = Style::default().fg(p.filled);
        if focused {
            style = style.add_modifier(Modifier::BOLD);
        }

        let widget = Paragraph::new(Span::styled(digit, style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            );
        f.render_widget(widget, *rect);
    }
}
