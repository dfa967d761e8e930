//! Bottom status bar — session state and key hints.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let session = if app.logged_in {
        Span::styled(" Logged in ", theme::positive())
    } else {
        Span::styled(" Not logged in ", theme::warning())
    };

    let line = Line::from(vec![
        session,
        Span::raw(" | "),
        Span::styled(
            "Tab:focus  ←/→:exchange  Enter:activate  Ctrl-L:login  Ctrl-D:download  Esc:quit",
            theme::muted(),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
