use ratatui::{prelude::*, widgets::*};

use crate::viz::app::Tab;

/// Key binding popup, centered over `area`
pub fn render_help(area: Rect, buf: &mut Buffer, tab: Tab) {
    let key = |k: &'static str, what: &'static str| {
        vec![Span::from(k).light_cyan().bold(), Span::raw(what)]
    };

    let lines = vec![
        key("  q  ", " : Quit"),
        key("Space", " : Toggle speed for the current mode"),
        key("  v  ", " : Show / leave the best path learned so far"),
        key("  r  ", " : Restart the current episode"),
        key("  h  ", " : Toggle help popup"),
        key(" Tab ", " : Switch tabs"),
    ];

    let additional_lines = match tab {
        Tab::Maze => vec![],
        Tab::Logs => vec![
            key("  s  ", " : Toggles target selector widget hidden/visible"),
            key("  f  ", " : Toggle focus on the selected target only"),
            key("⬆ / ⬇", " : Switch log target"),
            key("⬅ / ➡", " : Reduce/increase shown log messages by one level"),
            key("- / +", " : Reduce/increase captured log messages by one level"),
            key("PgUp ", " : Enter Page Mode and scroll approx. half page up in log history"),
            key("PgDn ", " : Only in page mode, scroll 10 events down in log history"),
        ],
    };

    let lines = [lines, additional_lines]
        .concat()
        .into_iter()
        .map(Line::from)
        .collect::<Vec<_>>();

    let [_, center_vert, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length((lines.len() + 4) as u16),
        Constraint::Fill(1),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(80),
        Constraint::Fill(1),
    ])
    .areas(center_vert);

    Clear.render(center, buf);

    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .padding(Padding::proportional(1))
                .title("Help"),
        )
        .wrap(Wrap { trim: false })
        .render(center, buf);
}
