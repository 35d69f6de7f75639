mod components;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tokio::time::Instant;

use crate::app::{App, LoginStep, Page, Popup, SignupField};
use crate::auth::countdown::CountdownTarget;
use crate::theme::Palette;

use components::{code_cells, text_field};

pub fn draw(f: &mut Frame, app: &App) {
    let p = app.theme.palette();
    let area = f.area();

    f.render_widget(Block::default().style(Style::default().bg(p.bg)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // Card
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_header(f, app, p, chunks[0]);

    let card_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        chunks[1],
    );
    match app.page {
        Page::Signup => draw_signup(f, app, p, card_area),
        Page::Verify => draw_verify(f, app, p, card_area),
        Page::Login => draw_login(f, app, p, card_area),
    }

    draw_footer(f, app, p, chunks[2]);
    draw_messages(f, app, p, area);

    if app.popup == Popup::Help {
        draw_help_popup(f, p);
    }
}

fn draw_header(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let title = match app.page {
        Page::Signup => "Sign up",
        Page::Verify => "Verify phone",
        Page::Login => "Log in",
    };
    let line = Line::from(vec![
        Span::styled(" otpgate ", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
        Span::styled("│ ", Style::default().fg(p.inactive)),
        Span::styled(title, Style::default().fg(p.text)),
        Span::styled("  │ ", Style::default().fg(p.inactive)),
        Span::styled(app.theme.icon(), Style::default().fg(p.warning)),
        Span::styled(" ^T", Style::default().fg(p.text_dim)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Bordered card; dims while loading or sliding out
fn card<'a>(title: &'a str, app: &App, p: &Palette) -> Block<'a> {
    let settled = app.loaded && !app.leaving;
    let border = if settled { p.accent } else { p.inactive };
    let title_style = if settled {
        Style::default().fg(p.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(p.text_dim)
    };
    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(p.surface))
}

fn draw_signup(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = card(" 📝 Create Account ", app, p);
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    text_field(
        f,
        p,
        rows[0],
        "Full name",
        &app.fullname,
        app.signup_field == SignupField::Fullname,
    );
    text_field(
        f,
        p,
        rows[1],
        "Phone (09xxxxxxxxx)",
        &app.signup_phone,
        app.signup_field == SignupField::Phone,
    );

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("Enter", Style::default().fg(p.accent)),
        Span::styled(" send code  ", Style::default().fg(p.text_dim)),
        Span::styled("^N", Style::default().fg(p.accent)),
        Span::styled(" already have an account? log in", Style::default().fg(p.text_dim)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(hint, rows[2]);
}

fn draw_verify(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = card(" 🔑 Verify Phone ", app, p);
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    let phone = app.phone_display.as_deref().unwrap_or("-");
    let intro = Paragraph::new(vec![
        Line::from(Span::styled("Code sent to", Style::default().fg(p.text_dim))),
        Line::from(Span::styled(phone, Style::default().fg(p.text).add_modifier(Modifier::BOLD))),
    ])
    .alignment(Alignment::Center);
    f.render_widget(intro, rows[0]);

    code_cells(f, p, rows[1], &app.code);

    draw_countdown(f, app, p, rows[2], CountdownTarget::Verify);

    let submit = if app.code.is_complete() { p.success } else { p.text_dim };
    let hint = Paragraph::new(Line::from(vec![
        Span::styled("Enter", Style::default().fg(p.accent)),
        Span::styled(" verify  ", Style::default().fg(submit)),
        Span::styled("←/→", Style::default().fg(p.accent)),
        Span::styled(" move", Style::default().fg(p.text_dim)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(hint, rows[3]);
}

fn draw_login(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = card(" 🔐 Log In ", app, p);
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    if app.signed_in {
        let done = Paragraph::new(Span::styled(
            "✓ Signed in",
            Style::default().fg(p.success).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        f.render_widget(done, rows[0]);
        return;
    }

    let on_phone = app.login_step == LoginStep::Phone;
    text_field(f, p, rows[0], "Phone (09xxxxxxxxx)", &app.login_phone, on_phone);

    if on_phone {
        let hint = Paragraph::new(Line::from(vec![
            Span::styled("Enter", Style::default().fg(p.accent)),
            Span::styled(" send code  ", Style::default().fg(p.text_dim)),
            Span::styled("^N", Style::default().fg(p.accent)),
            Span::styled(" create an account", Style::default().fg(p.text_dim)),
        ]))
        .alignment(Alignment::Center);
        f.render_widget(hint, rows[2]);
        return;
    }

    text_field(f, p, rows[1], "6-digit code", &app.login_code, app.login_code_focused);
    draw_countdown(f, app, p, rows[2], CountdownTarget::Login);

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("Enter", Style::default().fg(p.accent)),
        Span::styled(" log in", Style::default().fg(p.text_dim)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(hint, rows[3]);
}

/// Remaining time, or the resend action once the countdown has ended
fn draw_countdown(f: &mut Frame, app: &App, p: &Palette, area: Rect, target: CountdownTarget) {
    let Some(view) = app.displays.get(target) else {
        return;
    };

    let line = if view.resend_enabled() {
        Line::from(vec![
            Span::styled("^R", Style::default().fg(p.accent)),
            Span::styled(" resend code", Style::default().fg(p.text)),
        ])
    } else {
        Line::from(vec![
            Span::styled("󰔟 ", Style::default().fg(p.warning)),
            Span::styled(view.text.as_str(), Style::default().fg(p.warning)),
            Span::styled("  │ ", Style::default().fg(p.inactive)),
            Span::styled("resend", Style::default().fg(p.inactive)),
        ])
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_messages(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    if app.messages.is_empty() {
        return;
    }
    let now = Instant::now();
    let width = area.width.min(48);
    let x = area.x + area.width - width;

    for (i, message) in app.messages.iter().enumerate() {
        let y = area.y + 1 + (i as u16) * 3;
        if y + 3 > area.y + area.height {
            break;
        }
        let rect = Rect::new(x, y, width, 3);

        let color = match message.kind {
            crate::messages::MessageKind::Success => p.success,
            crate::messages::MessageKind::Error => p.danger,
            crate::messages::MessageKind::Warning => p.warning,
            crate::messages::MessageKind::Info => p.accent,
        };
        let color = if message.is_leaving(now) { p.text_dim } else { color };

        let toast = Paragraph::new(Line::from(vec![
            Span::raw(message.kind.icon()),
            Span::raw(" "),
            Span::styled(message.text.as_str(), Style::default().fg(p.text)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(p.surface)),
        );

        f.render_widget(Clear, rect);
        f.render_widget(toast, rect);
    }
}

fn draw_footer(f: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let mut hints = vec![
        ("F1", "help"),
        ("^T", "theme"),
        ("^N", if app.page == Page::Login { "sign up" } else { "log in" }),
    ];
    if matches!(app.page, Page::Verify) || (app.page == Page::Login && app.login_step == LoginStep::Code) {
        hints.push(("^R", "resend"));
    }
    hints.push(("^Q", "quit"));

    let mut spans = Vec::new();
    for (i, (k, label)) in hints.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(p.inactive)));
        }
        spans.push(Span::styled(k, Style::default().fg(p.accent)));
        spans.push(Span::styled(format!(" {}", label), Style::default().fg(p.text_dim)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn draw_help_popup(f: &mut Frame, p: &Palette) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(p.accent).add_modifier(Modifier::BOLD)))
    };
    let entry = |key: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(key, Style::default().fg(p.accent)),
            Span::styled(text, Style::default().fg(p.text)),
        ])
    };

    let help_text = vec![
        section("═══ Forms ═══"),
        entry("  Tab       ", "Next field"),
        entry("  Enter     ", "Submit"),
        entry("  ^N        ", "Switch between sign up and log in"),
        Line::from(""),
        section("═══ Verification Code ═══"),
        entry("  0-9       ", "Fill the focused cell and move on"),
        entry("  Backspace ", "Clear the cell, or step back when empty"),
        entry("  ←/→       ", "Move between cells"),
        entry("  Paste     ", "Spread the pasted digits across the cells"),
        entry("  ^R        ", "Resend the code once the countdown ends"),
        Line::from(""),
        section("═══ General ═══"),
        entry("  ^T        ", "Toggle light/dark theme (saved)"),
        entry("  ^Q / ^C   ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(p.text_dim)),
            Span::styled("F1", Style::default().fg(p.accent)),
            Span::styled("/", Style::default().fg(p.text_dim)),
            Span::styled("Esc", Style::default().fg(p.accent)),
            Span::styled(" to close", Style::default().fg(p.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 otpgate Help ", Style::default().fg(p.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.accent))
                .style(Style::default().bg(p.surface)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::app::Overrides;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_draws_signup_page() {
        let app = App::new(AppConfig::default(), Overrides::default(), Page::Signup).unwrap();
        let screen = render(&app);
        assert!(screen.contains("Full name"));
        assert!(screen.contains("otpgate"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_draws_verify_countdown() {
        let mut app = App::new(AppConfig::default(), Overrides::default(), Page::Signup).unwrap();
        app.session
            .set(crate::auth::session::SessionKey::SignupPhone, "09123456789");
        app.navigate_with_animation(Page::Verify, std::time::Duration::ZERO);
        app.tick().unwrap();

        let screen = render(&app);
        assert!(screen.contains("0912 345 6789"));
        assert!(screen.contains("2:00 remaining"));
    }
}
