use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode, Role};
use crate::preset;
use crate::toast::Severity;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, disclaimer, footer
    let [header_area, body_area, disclaimer_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    // Body: conversation + input on the left, preset sidebar on the right
    let [left_area, preset_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(34)]).areas(body_area);
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(5)]).areas(left_area);

    render_conversation(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_presets(app, frame, preset_area);

    render_disclaimer(frame, disclaimer_area);
    render_footer(app, frame, footer_area);

    if app.active_toast.is_some() {
        render_toast(app, frame, body_area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let loading_indicator = if app.is_loading { " [getting help…]" } else { "" };

    let title = Line::from(vec![
        Span::styled(
            " Emergency Assistant ",
            Style::default().fg(Color::Red).bold(),
        ),
        Span::styled(loading_indicator, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_conversation(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Conversation;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Guidance ");

    let inner = block.inner(area);
    // Remember dimensions for scroll-to-bottom calculations
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let mut lines: Vec<Line> = Vec::new();

    if app.messages.is_empty() && !app.is_loading {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            " Describe your symptoms below, or pick a common emergency",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            " from the list on the right.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for msg in &app.messages {
        let (name, style) = match msg.role {
            Role::User => ("You", Style::default().fg(Color::Green).bold()),
            Role::Assistant => ("Assistant", Style::default().fg(Color::Blue).bold()),
        };
        lines.push(Line::from(vec![
            Span::styled(name, style),
            Span::styled(
                format!("  {}", msg.timestamp.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for content_line in msg.content.lines() {
            lines.push(Line::from(Span::raw(content_line.to_string())));
        }
        lines.push(Line::default());
    }

    if app.is_loading {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            "Assistant",
            Style::default().fg(Color::Blue).bold(),
        )));
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let conversation = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(conversation, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else if app.focus == FocusPane::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = if app.is_loading {
        " Symptoms (waiting for guidance…) "
    } else {
        " Symptoms — Enter to submit "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner = block.inner(area);

    let input = Paragraph::new(app.input.as_str())
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(input, area);

    if editing && inner.width > 0 {
        let (line, col) = cursor_line_col(&app.input, app.input_cursor, inner.width as usize);
        if (line as u16) < inner.height {
            frame.set_cursor_position((inner.x + col as u16, inner.y + line as u16));
        }
    }
}

/// Where the cursor lands after soft-wrapping the input at `width` columns.
fn cursor_line_col(input: &str, cursor: usize, width: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for c in input.chars().take(cursor) {
        if c == '\n' || col + 1 >= width {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn render_presets(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Presets;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let items: Vec<ListItem> = preset::catalog()
        .iter()
        .map(|p| {
            let chosen = app.selected_preset.as_deref() == Some(p.label);
            let marker = if chosen { "✓ " } else { "  " };
            let label_style = if chosen {
                Style::default().fg(Color::Red).bold()
            } else {
                Style::default()
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(format!("{}{} ", marker, p.icon)),
                    Span::styled(p.label, label_style),
                ]),
                Line::from(Span::styled(
                    format!("    {}", p.description),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Common Emergencies "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    frame.render_stateful_widget(list, area, &mut app.preset_state);
}

fn render_disclaimer(frame: &mut Frame, area: Rect) {
    let disclaimer = Paragraph::new(Line::from(Span::styled(
        " If this is a medical emergency, call emergency services immediately. This tool gives preliminary guidance only.",
        Style::default().fg(Color::Red),
    )));
    frame.render_widget(disclaimer, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" submit ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" conversation ", label_style),
        ],
        InputMode::Normal => {
            let mut hints = vec![
                Span::styled(" Tab ", key_style),
                Span::styled(" focus ", label_style),
            ];
            match app.focus {
                FocusPane::Presets => {
                    hints.extend(vec![
                        Span::styled(" j/k ", key_style),
                        Span::styled(" nav ", label_style),
                        Span::styled(" Enter ", key_style),
                        Span::styled(" use preset ", label_style),
                    ]);
                }
                FocusPane::Conversation => {
                    hints.extend(vec![
                        Span::styled(" j/k ", key_style),
                        Span::styled(" scroll ", label_style),
                        Span::styled(" g/G ", key_style),
                        Span::styled(" top/bottom ", label_style),
                    ]);
                }
                FocusPane::Input => {
                    hints.extend(vec![
                        Span::styled(" i ", key_style),
                        Span::styled(" edit ", label_style),
                    ]);
                }
            }
            hints.extend(vec![
                Span::styled(" p ", key_style),
                Span::styled(" presets ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
    };

    let footer = Paragraph::new(Line::from(hints));
    frame.render_widget(footer, area);
}

fn render_toast(app: &App, frame: &mut Frame, body_area: Rect) {
    let Some(toast) = &app.active_toast else {
        return;
    };

    let accent = match toast.severity {
        Severity::Normal => Color::Blue,
        Severity::Destructive => Color::Red,
    };

    let mut lines = vec![Line::from(Span::styled(
        toast.title.clone(),
        Style::default().fg(accent).bold(),
    ))];
    if let Some(description) = &toast.description {
        lines.push(Line::from(Span::raw(description.clone())));
    }

    let height = (lines.len() as u16 + 2).min(body_area.height);
    let width = 40.min(body_area.width);
    let toast_area = Rect {
        x: body_area.x + body_area.width.saturating_sub(width + 1),
        y: body_area.y + body_area.height.saturating_sub(height),
        width,
        height,
    };

    frame.render_widget(Clear, toast_area);
    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent)),
        );
    frame.render_widget(popup, toast_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_line_col_single_line() {
        assert_eq!(cursor_line_col("chest pain", 5, 40), (0, 5));
    }

    #[test]
    fn test_cursor_line_col_wraps_at_width() {
        // 10 chars at width 4: wraps after every 3rd column
        let (line, col) = cursor_line_col("abcdefghij", 10, 4);
        assert!(line > 0);
        assert!(col < 4);
    }

    #[test]
    fn test_cursor_line_col_follows_newlines() {
        let input = "Chest Pain\n\nAdditional symptoms: dizzy";
        let (line, _) = cursor_line_col(input, input.chars().count(), 80);
        assert_eq!(line, 2);
    }
}
