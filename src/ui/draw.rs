use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};
use ratatui::{Frame, Terminal};
// Use Popup from tui-widgets to render modals
use tui_widgets::popup::Popup;

use crate::collate;
use crate::config::RgbColor;
use crate::contact::{Contact, DraftField};
use crate::phone;

use super::app::App;

const NOTICE_HELP: &str = "Press any key";
const HELP_MODAL_FOOTER: &str = "j/k: scroll  Esc/q: close";
const EMPTY_LIST: &str = "No contacts yet!";

pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    let size = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, layout[0], app);
    draw_list(frame, layout[1], app);
    draw_footer(frame, layout[2], app);
    draw_form_modal(frame, size, app);
    draw_confirm_modal(frame, size, app);
    draw_notice_modal(frame, size, app);
    draw_help_modal(frame, size, app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let count = app.contacts().len();
    let label = match count {
        1 => "1 contact".to_string(),
        n => format!("{} contacts", n),
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(label.len() as u16 + 1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled("AGENDA", header_text_style(app).add_modifier(Modifier::BOLD))),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(label, header_text_style(app))).alignment(Alignment::Right),
        chunks[1],
    );
}

fn draw_list(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true))
        .title("Contacts");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if app.contacts().is_empty() {
        render_centered_words(frame, inner, EMPTY_LIST);
        return;
    }

    let items: Vec<ListItem> = app
        .contacts()
        .iter()
        .map(|contact| build_contact_item(contact, app))
        .collect();

    let list = List::new(items)
        .highlight_style(selection_style(app))
        .highlight_symbol("▌");

    let selected = app.selected;
    app.list_state.select(Some(selected));
    frame.render_stateful_widget(list, inner, &mut app.list_state);
}

fn build_contact_item(contact: &Contact, app: &App) -> ListItem<'static> {
    let categories = app.controller.categories();
    let icon = categories.icon(&contact.category);
    let number = phone::display_number(&contact.number, app.phone_region());

    let mut name = vec![];
    if !icon.is_empty() {
        name.push(Span::raw(format!("{} ", icon)));
    }
    name.push(Span::styled(
        contact.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    if collate::needs_transliteration(&contact.name) {
        name.push(Span::styled(
            format!("  {}", collate::transliterate(&contact.name)),
            Style::default().fg(color(app.ui_colors().status_fg)),
        ));
    }

    let details = Line::from(Span::styled(
        format!("   {} - {}", number, contact.category),
        Style::default().fg(color(app.ui_colors().status_fg)),
    ));

    ListItem::new(vec![Line::from(name), details])
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let message: String = if app.help_scroll.is_some() {
        HELP_MODAL_FOOTER.to_string()
    } else if app.notice.is_some() {
        NOTICE_HELP.to_string()
    } else if app.pending_delete().is_some() {
        app.confirm_hint()
    } else if app.controller.is_form_open() {
        app.form_hint()
    } else {
        app.status.clone().unwrap_or_else(|| app.list_hint())
    };

    let colors = app.ui_colors();
    let style = Style::default()
        .fg(color(colors.status_fg))
        .bg(color(colors.status_bg));
    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn draw_form_modal(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(mode) = app.controller.form_mode() else {
        return;
    };

    let categories = app.controller.categories();
    let category_rows = categories.len() as u16;

    let width = area
        .width
        .saturating_mul(3)
        .saturating_div(5)
        .max(40)
        .min(area.width);
    // name (3) + number (3) + picker (rows + 2) + borders (2)
    let height = (3 + 3 + category_rows + 2 + 2).min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let modal_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true))
        .title(Span::styled(format!(" {} ", mode.title()), header_text_style(app)))
        .title_alignment(Alignment::Center);
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    draw_text_field(frame, rows[0], app, DraftField::Name);
    draw_text_field(frame, rows[1], app, DraftField::Number);
    draw_category_picker(frame, rows[2], app);
}

fn draw_text_field(frame: &mut Frame<'_>, area: Rect, app: &App, field: DraftField) {
    let focused = app.form.focus() == field;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(field_border_style(app, focused))
        .title(field.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let value = app.form.value(field);
    frame.render_widget(Paragraph::new(value.to_string()), inner);

    if focused {
        if let Some(cursor) = app.form.visual_cursor() {
            let cursor_x = inner
                .x
                .saturating_add(cursor as u16)
                .min(inner.x + inner.width.saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }
}

fn draw_category_picker(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let focused = app.form.focus() == DraftField::Category;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(field_border_style(app, focused))
        .title(DraftField::Category.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chosen = app.controller.draft().category.as_str();
    let cursor = app.form.category_cursor();

    let lines: Vec<Line> = app
        .controller
        .categories()
        .options()
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let marker = if option.category.as_str() == chosen {
                "(•)"
            } else {
                "( )"
            };
            let text = format!("{} {} {}", marker, option.icon, option.category);
            let style = if focused && cursor == Some(idx) {
                selection_style(app)
            } else {
                Style::default()
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(request) = app.pending_delete() else {
        return;
    };

    let body_text = Text::from(vec![
        Line::from(request.message.clone()),
        Line::from(""),
        Line::from(app.confirm_hint()),
    ]);
    let title_line = Line::from(Span::styled(request.title.clone(), header_text_style(app)));
    let popup = Popup::new(body_text)
        .title(title_line)
        .border_style(border_style(app, true));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn draw_notice_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(notice) = app.notice.as_ref() else {
        return;
    };

    let mut lines: Vec<Line> = notice
        .lines
        .iter()
        .map(|l| Line::from(l.clone()))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(NOTICE_HELP));

    let title_line = Line::from(Span::styled(notice.title.clone(), header_text_style(app)));
    let popup = Popup::new(Text::from(lines))
        .title(title_line)
        .border_style(border_style(app, true));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn draw_help_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(scroll) = app.help_scroll else {
        return;
    };

    let width = (area.width.saturating_mul(2) / 3).max(40).min(area.width);
    let height = (area.height.saturating_mul(4) / 5).max(10).min(area.height);
    let modal_area = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, modal_area);

    let header_style = header_text_style(app);
    let mut lines: Vec<Line> = Vec::new();
    for section in app.help_entries() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            section.title,
            header_style.add_modifier(Modifier::BOLD),
        )));
        for entry in section.entries {
            lines.push(Line::from(vec![
                Span::raw(format!("  {:<20}", entry.action)),
                Span::styled(entry.keys, header_style),
            ]));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true))
        .title(Span::styled(" HELP ", header_style))
        .title_bottom(Line::from(Span::styled(
            format!(" {} ", HELP_MODAL_FOOTER),
            header_style,
        )))
        .title_alignment(Alignment::Center);
    let inner = block.inner(modal_area);

    let max_scroll = lines.len().saturating_sub(inner.height as usize);
    let scroll = scroll.min(u16::try_from(max_scroll).unwrap_or(u16::MAX));
    app.help_scroll = Some(scroll);

    frame.render_widget(block, modal_area);
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn render_centered_words(frame: &mut Frame<'_>, area: Rect, text: &str) {
    if area.height == 0 {
        return;
    }
    let y = area.y + area.height.saturating_sub(1) / 2;
    let target = Rect {
        x: area.x,
        y,
        width: area.width,
        height: 1,
    };
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), target);
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn border_style(app: &App, _active: bool) -> Style {
    Style::default().fg(color(app.ui_colors().border))
}

fn field_border_style(app: &App, focused: bool) -> Style {
    if focused {
        border_style(app, true).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color(app.ui_colors().separator))
    }
}

fn header_text_style(app: &App) -> Style {
    Style::default().fg(color(app.ui_colors().border))
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}
