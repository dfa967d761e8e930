//! Top-level UI layout — form, progress, banners, saved files, status bar.

pub mod form;
pub mod status_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};

use crate::app::AppState;
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form::HEIGHT),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(saved_height(app)),
            Constraint::Length(1),
        ])
        .split(f.area());

    form::render(f, chunks[0], app);
    render_progress(f, chunks[1], app);
    render_banners(f, chunks[2], app);
    render_saved(f, chunks[3], app);
    status_bar::render(f, chunks[4], app);
}

fn saved_height(app: &AppState) -> u16 {
    if app.saved.is_empty() {
        0
    } else {
        app.saved.len() as u16 + 2
    }
}

fn render_progress(f: &mut Frame, area: Rect, app: &AppState) {
    let fetch = &app.fetch;
    let label = match (&fetch.current, fetch.in_progress) {
        (Some(sym), true) => format!("Fetching {sym} [{}/{}]", fetch.done + 1, fetch.total),
        _ if fetch.total > 0 => format!("{}/{} symbols", fetch.done, fetch.total),
        _ => "idle".to_string(),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::panel_border(fetch.in_progress))
                .title(" Progress ")
                .title_style(theme::panel_title(fetch.in_progress)),
        )
        .gauge_style(theme::accent())
        .ratio(fetch.fraction.clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

fn render_banners(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Messages ")
        .title_style(theme::panel_title(false));

    // Keep the newest banners visible.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.banners.len().saturating_sub(visible);
    let lines: Vec<Line> = app.banners[skip..]
        .iter()
        .map(|b| Line::from(Span::styled(b.message.as_str(), theme::banner(b.level))))
        .collect();

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn render_saved(f: &mut Frame, area: Rect, app: &AppState) {
    if app.saved.is_empty() {
        return;
    }
    let lines: Vec<Line> = app
        .saved
        .iter()
        .map(|p| Line::from(Span::styled(p.display().to_string(), theme::positive())))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Saved files ")
        .title_style(theme::panel_title(false));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
