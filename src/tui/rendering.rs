use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap,
};

use super::app::{MessageType, Overlay, ResultView, StatusMessage};
use super::events::help_rows;
use super::form::{ConversionForm, Field, Tab};
use super::layout::{AppLayout, MIN_HEIGHT, MIN_WIDTH, centered};
use super::theme::Palette;
use crate::history::{DownloadAction, EMPTY_HISTORY_MESSAGE, HistoryItemView, PreviewAction};
use crate::models::PrimaryResult;
use crate::preview::PreviewContent;
use crate::utils::{first_line, format_age, format_stamp, sanitize_for_terminal};

/// Lines of inline output shown in the result pane
const RESULT_PREVIEW_LINES: usize = 12;

/// Server-provided text must not carry escape sequences into the buffer.
fn clean(text: &str) -> String {
    sanitize_for_terminal(text)
}

fn content_lines(text: &str) -> impl Iterator<Item = Line<'static>> {
    clean(text)
        .lines()
        .take(RESULT_PREVIEW_LINES)
        .map(|line| Line::from(line.to_string()))
        .collect::<Vec<_>>()
        .into_iter()
}

/// Everything one frame needs, borrowed from the app.
pub struct RenderState<'a> {
    pub tab: Tab,
    pub form: Option<&'a ConversionForm>,
    pub history_items: &'a [HistoryItemView],
    pub selected_idx: usize,
    pub result: Option<&'a ResultView>,
    pub progress: Option<u16>,
    pub busy_label: Option<&'static str>,
    pub overlay: Overlay,
    pub preview: Option<&'a PreviewContent>,
    pub preview_scroll: u16,
    pub palette: Palette,
    pub status_message: Option<&'a StatusMessage>,
    pub submitting: bool,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();
    let palette = &state.palette;
    frame.render_widget(Block::default().style(palette.base()), area);

    if !AppLayout::fits(area) {
        let message = format!("Terminal too small (need at least {}x{})", MIN_WIDTH, MIN_HEIGHT);
        frame.render_widget(
            Paragraph::new(message).style(palette.error()).wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let layout = AppLayout::new(area, state.progress.is_some());

    render_tabs(frame, layout.tabs_area, state);
    match state.form {
        Some(form) => render_form(frame, layout.main_area, form, state),
        None => render_history_list(frame, layout.main_area, state),
    }
    if state.tab == Tab::History {
        let item = state.history_items.get(state.selected_idx);
        render_history_details(frame, layout.side_area, item, palette);
    } else {
        render_result(frame, layout.side_area, state);
    }
    if let (Some(area), Some(percent)) = (layout.progress_area, state.progress) {
        render_progress(frame, area, percent, palette);
    }
    render_status_bar(frame, layout.status_area, state);

    match state.overlay {
        Overlay::None => {}
        Overlay::Help => render_help(frame, area, palette),
        Overlay::ConfirmClear => render_confirm_clear(frame, area, palette),
        Overlay::Preview => {
            if let Some(preview) = state.preview {
                render_preview(frame, area, preview, state.preview_scroll, palette);
            }
        }
    }
}

fn bordered<'a>(title: impl Into<Line<'a>>, palette: &Palette, focused: bool) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(focused))
        .style(palette.base())
        .title(title)
}

fn render_tabs(frame: &mut Frame, area: Rect, state: &RenderState) {
    let palette = &state.palette;
    let titles: Vec<Line> = Tab::ALL.iter().map(|tab| Line::from(tab.title())).collect();
    let tabs = Tabs::new(titles)
        .block(bordered(" convert-desk ", palette, false))
        .style(palette.muted())
        .highlight_style(palette.highlight())
        .select(state.tab.index())
        .divider("|");
    frame.render_widget(tabs, area);
}

fn field_label(form: &ConversionForm, field: Field) -> &'static str {
    match field {
        Field::Input => form.input_label(),
        Field::From => "From",
        Field::To => "To",
        Field::Options => "Options",
        Field::Quality => "Quality",
        Field::Resize => "Resize",
    }
}

fn render_form(frame: &mut Frame, area: Rect, form: &ConversionForm, state: &RenderState) {
    let palette = &state.palette;
    let mut lines: Vec<Line> = Vec::new();

    for &field in form.fields() {
        let focused = form.focused() == field;
        let label_style = if focused {
            palette.success().add_modifier(Modifier::BOLD)
        } else {
            palette.muted()
        };
        let cursor = if focused && !field.is_picker() { "▏" } else { "" };
        let label = Span::styled(format!("{:>10}: ", field_label(form, field)), label_style);

        match field {
            Field::Input if form.has_body_input() => {
                lines.push(Line::from(label));
                let body = format!("{}{}", form.input, cursor);
                for text_line in body.lines() {
                    lines.push(Line::from(format!("  {}", text_line)));
                }
                if form.input.is_empty() && !focused {
                    lines.push(Line::styled("  (empty)", palette.muted()));
                }
            }
            Field::Input => {
                let value = Span::raw(format!("{}{}", form.input, cursor));
                lines.push(Line::from(vec![label, value]));
                if let Some(info) = form.file_info() {
                    lines.push(Line::styled(format!("{:>12}{}", "", info), palette.muted()));
                }
            }
            Field::From | Field::To => {
                let picker = if field == Field::From { &form.from } else { &form.to };
                let value = if focused {
                    format!("◀ {} ▶", picker.value())
                } else {
                    picker.value().to_string()
                };
                lines.push(Line::from(vec![label, Span::raw(value)]));
            }
            Field::Options => {
                let mut spans = vec![label];
                for tag in form.options.iter() {
                    spans.push(Span::styled(format!("[{}]", tag), palette.success()));
                    spans.push(Span::raw(" "));
                }
                spans.push(Span::raw(format!("{}{}", form.option_input, cursor)));
                lines.push(Line::from(spans));
            }
            Field::Quality | Field::Resize => {
                let value = if field == Field::Quality { &form.quality } else { &form.resize };
                lines.push(Line::from(vec![label, Span::raw(format!("{}{}", value, cursor))]));
            }
        }
    }

    lines.push(Line::from(""));
    let hint = if state.submitting { "Converting…" } else { "Alt+c: convert | Alt+p: preview" };
    lines.push(Line::styled(hint, palette.muted()));

    let title = format!(" {} ", form.kind.default_record_name());
    let paragraph = Paragraph::new(Text::from(lines))
        .block(bordered(title, palette, true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_history_list(frame: &mut Frame, area: Rect, state: &RenderState) {
    let palette = &state.palette;
    let block = bordered(format!(" History ({}) ", state.history_items.len()), palette, true);

    if state.history_items.is_empty() {
        let paragraph = Paragraph::new(EMPTY_HISTORY_MESSAGE).style(palette.muted()).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = state
        .history_items
        .iter()
        .map(|item| {
            let mut badges = String::new();
            if item.download.is_some() {
                badges.push('⬇');
            }
            if item.preview.is_some() {
                badges.push('◉');
            }
            let content = format!(
                "{} | {} | {} {}",
                first_line(&clean(&item.title), 32),
                clean(&item.formats_label()),
                format_age(&item.created_at, &now),
                badges
            );
            ListItem::new(content).style(palette.muted())
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(palette.highlight());
    let mut list_state = ListState::default().with_selected(Some(state.selected_idx));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn detail_line<'a>(label: &'a str, value: impl Into<String>, palette: &Palette) -> Line<'a> {
    Line::from(vec![Span::styled(label, palette.muted()), Span::raw(value.into())])
}

fn render_history_details(
    frame: &mut Frame,
    area: Rect,
    item: Option<&HistoryItemView>,
    palette: &Palette,
) {
    let content = if let Some(item) = item {
        let mut lines = vec![
            detail_line("Name: ", clean(&item.title), palette),
            detail_line("Formats: ", clean(&item.formats_label()), palette),
            detail_line("Created: ", format_stamp(&item.created_at), palette),
            Line::from(""),
        ];

        match &item.download {
            Some(DownloadAction::Navigate { url }) => {
                lines.push(detail_line("Download: ", clean(url), palette));
            }
            Some(DownloadAction::SaveBlob { file_name, .. }) => {
                lines.push(detail_line("Save as: ", clean(file_name), palette));
            }
            None => lines.push(Line::styled("No stored result", palette.muted())),
        }
        if let Some(PreviewAction::ShowText { content, .. }) = &item.preview {
            lines.push(Line::from(""));
            lines.extend(content_lines(content));
        }

        Text::from(lines)
    } else {
        Text::from("No entry selected")
    };

    let paragraph = Paragraph::new(content)
        .block(bordered(" Details ", palette, false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_result(frame: &mut Frame, area: Rect, state: &RenderState) {
    let palette = &state.palette;
    let content = match state.result {
        Some(ResultView::Converted { record, outcome }) => {
            let mut lines = vec![
                Line::styled("✓ Conversion completed", palette.success()),
                detail_line("Name: ", clean(&record.name), palette),
                detail_line(
                    "Formats: ",
                    clean(&format!("{} → {}", record.from_format, record.to_format)),
                    palette,
                ),
                Line::from(""),
            ];
            match outcome.primary() {
                PrimaryResult::Download(url) => {
                    lines.push(detail_line("Download: ", clean(url), palette));
                    lines.push(Line::styled("Ctrl+s: save | Ctrl+y: copy link", palette.muted()));
                }
                PrimaryResult::Inline(text) => {
                    lines.extend(content_lines(text));
                    lines.push(Line::styled("Ctrl+y: copy | Ctrl+s: save", palette.muted()));
                }
                PrimaryResult::Nothing => {
                    lines.push(Line::styled("Server returned no content", palette.muted()));
                }
            }
            if outcome.base64.is_some() {
                lines.push(Line::styled("Base64 payload available (Ctrl+y)", palette.muted()));
            }
            Text::from(lines)
        }
        Some(ResultView::Failed { kind, message }) => Text::from(vec![
            Line::styled(format!("✗ {} conversion failed", kind), palette.error()),
            Line::from(""),
            Line::styled(clean(message), palette.error()),
        ]),
        None => Text::styled("Fill in the form and press Alt+c", palette.muted()),
    };

    let paragraph = Paragraph::new(content)
        .block(bordered(" Result ", palette, false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_progress(frame: &mut Frame, area: Rect, percent: u16, palette: &Palette) {
    let gauge = Gauge::default()
        .gauge_style(palette.success())
        .percent(percent.min(100))
        .label(format!("{}%", percent));
    frame.render_widget(gauge, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let palette = &state.palette;
    let (text, style) = if let Some(msg) = state.status_message {
        let style = match msg.message_type {
            MessageType::Error => palette.error(),
            MessageType::Success => palette.success(),
            MessageType::Info => palette.base(),
        };
        (format!(" {} ", clean(&msg.text)), style)
    } else if let Some(label) = state.busy_label {
        (format!(" {}… ", label), palette.base())
    } else if state.tab == Tab::History {
        (
            " d: download | p: preview | x: delete | e: export | Alt+k: help | Ctrl+C: quit "
                .to_string(),
            palette.muted(),
        )
    } else {
        (
            " Tab: next field | Alt+c: convert | Alt+k: help | Ctrl+C: quit ".to_string(),
            palette.muted(),
        )
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_help(frame: &mut Frame, area: Rect, palette: &Palette) {
    let popup = centered(area, 70, 80);
    let mut lines = Vec::new();
    let mut section = "";
    for (row_section, chord, help) in help_rows() {
        if row_section != section {
            if !section.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::styled(row_section, palette.success().add_modifier(Modifier::BOLD)));
            section = row_section;
        }
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", chord), palette.base()),
            Span::styled(help, palette.muted()),
        ]));
    }

    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines).block(bordered(" Keyboard shortcuts ", palette, true));
    frame.render_widget(paragraph, popup);
}

fn render_confirm_clear(frame: &mut Frame, area: Rect, palette: &Palette) {
    let popup = centered(area, 50, 30);
    let lines = vec![
        Line::from("Are you sure you want to clear all conversion history?"),
        Line::from(""),
        Line::styled("y: yes | n: no", palette.muted()),
    ];
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines)
        .block(bordered(" Clear history ", palette, true))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

fn render_preview(
    frame: &mut Frame,
    area: Rect,
    preview: &PreviewContent,
    scroll: u16,
    palette: &Palette,
) {
    let popup = centered(area, 80, 80);
    let lines: Vec<Line> = preview.lines().iter().map(|line| Line::from(clean(line))).collect();
    let title = format!(" {} [{}] ", clean(&preview.title), preview.category.label());

    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines)
        .block(bordered(title, palette, true))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, popup);
}
