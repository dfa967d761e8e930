//! Login and download form.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use stockdata_core::Exchange;

use crate::app::{AppState, Field};
use crate::theme;

/// Rows taken by the form, borders included.
pub const HEIGHT: u16 = 9;

const LABEL_WIDTH: usize = 28;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let masked = "*".repeat(app.password.chars().count());

    let lines = vec![
        text_line(app, Field::Username, &app.username),
        text_line(app, Field::Password, &masked),
        text_line(app, Field::Symbols, &app.symbols),
        exchange_line(app),
        Line::from(""),
        buttons_line(app),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(" Stock Data Downloader ")
        .title_style(theme::panel_title(true));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn label(field: Field, focused: bool) -> Span<'static> {
    let style = if focused { theme::accent() } else { theme::muted() };
    Span::styled(format!("{:<LABEL_WIDTH$}", field.label()), style)
}

fn text_line<'a>(app: &AppState, field: Field, value: &'a str) -> Line<'a> {
    let focused = app.focus == field;
    let mut spans = vec![label(field, focused), Span::styled(value, theme::text())];
    if focused {
        spans.push(Span::styled("_", theme::focused()));
    }
    Line::from(spans)
}

fn exchange_line(app: &AppState) -> Line<'static> {
    let focused = app.focus == Field::Exchange;
    let mut spans = vec![label(Field::Exchange, focused)];
    for exchange in Exchange::ALL {
        let mark = if exchange == app.exchange { "(•)" } else { "( )" };
        let style = if exchange == app.exchange && focused {
            theme::focused()
        } else if exchange == app.exchange {
            theme::accent()
        } else {
            theme::muted()
        };
        spans.push(Span::styled(format!("{mark} {exchange}"), style));
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}

fn buttons_line(app: &AppState) -> Line<'static> {
    let button = |field: Field| {
        let style = if app.focus == field {
            theme::focused()
        } else {
            theme::accent()
        };
        Span::styled(format!("[ {} ]", field.label()), style)
    };
    Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH)),
        button(Field::Login),
        Span::raw("  "),
        button(Field::Download),
    ])
}
