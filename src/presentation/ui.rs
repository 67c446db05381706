use std::rc::Rc;

use crate::application::InteractionController;
use crate::domain::{
    Bounds, ButtonAction, CounterWidget, Emphasis, Field, FieldKind, Form, Notification, Page,
    Severity, Theme, VisualState, NAVBAR_ID,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use super::view::{submit_bounds, FocusTarget, PageView, ViewMode};

const HERO_HEIGHT: f64 = 6.0;
const TOAST_WIDTH: u16 = 46;

struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            background: Color::White,
            text: Color::Black,
            muted: Color::Gray,
            accent: Color::Blue,
        },
        Theme::Dark => Palette {
            background: Color::Black,
            text: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
        },
    }
}

fn page_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area)
}

/// Rows of page content visible inside the body frame for a terminal of `area`.
pub fn body_height(area: Rect) -> u16 {
    page_layout(area)[1].height.saturating_sub(2)
}

pub fn render_ui(f: &mut Frame, controller: &InteractionController, view: &PageView) {
    let colors = palette(controller.theme());
    f.render_widget(
        Block::default().style(Style::default().bg(colors.background).fg(colors.text)),
        f.area(),
    );

    let chunks = page_layout(f.area());
    render_navbar(f, controller, view, &colors, chunks[0]);
    render_page(f, controller, view, &colors, chunks[1]);
    render_status_bar(f, view, chunks[2]);
    render_notifications(f, controller.notifications(), f.area());

    match &view.mode {
        ViewMode::Confirm { message, .. } => render_confirm_popup(f, message),
        ViewMode::Help => render_help_popup(f, view.help_scroll),
        ViewMode::Browse => {}
    }
}

fn render_navbar(f: &mut Frame, controller: &InteractionController, view: &PageView, colors: &Palette, area: Rect) {
    let page = controller.page();
    let scrolled = page.has_class(&NAVBAR_ID.into(), "scrolled");

    let mut spans = vec![Span::styled(
        format!(" {} ", page.title),
        Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
    )];
    for button in &page.buttons {
        let label = match button.action {
            ButtonAction::ThemeToggle => format!("{} {}", icon_glyph(controller.theme().toggle_icon()), button.label.trim()),
            _ => button.label.trim().to_string(),
        };
        let mut style = Style::default().fg(colors.text);
        if view.is_focused(&FocusTarget::Button(button.id.clone())) {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("[{label}]"), style));
    }

    let border_style = if scrolled {
        Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.muted)
    };
    let navbar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(if scrolled { "VetCheck ▾" } else { "VetCheck" }),
    );
    f.render_widget(navbar, area);
}

fn render_page(f: &mut Frame, controller: &InteractionController, view: &PageView, colors: &Palette, area: Rect) {
    let page = controller.page();
    let viewport = controller.viewport();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.muted))
        .title(format!(
            "Row {}/{}",
            viewport.scroll_top.round() as i64,
            page.height.round() as i64
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);
    let scroll_top = viewport.scroll_top;

    let hero = Bounds::new(controller.hero_offset(), HERO_HEIGHT);
    if let Some(rect) = element_rect(inner, scroll_top, hero) {
        render_hero(f, page, colors, rect);
    }

    for card in &page.cards {
        let Some(rect) = element_rect(inner, scroll_top, card.bounds) else {
            continue;
        };
        let revealed = page.has_class(&card.id, "animate-in");
        let focused = view.is_focused(&FocusTarget::Card(card.id.clone()));
        let body_style = if revealed {
            Style::default().fg(colors.text)
        } else {
            Style::default().fg(colors.muted).add_modifier(Modifier::DIM)
        };
        let widget = Paragraph::new(card.body.as_str())
            .style(body_style)
            .wrap(Wrap { trim: true })
            .block(focus_block(card.title.as_str(), focused, if revealed { colors.accent } else { colors.muted }));
        f.render_widget(widget, rect);
    }

    render_counters(f, &page.counters, inner, scroll_top, colors);

    for form in &page.forms {
        render_form(f, page, form, view, inner, scroll_top, colors);
    }

    for image in &page.images {
        let Some(rect) = element_rect(inner, scroll_top, image.bounds) else {
            continue;
        };
        let content = match &image.src {
            Some(src) => Line::from(vec![
                Span::styled("▣ ", Style::default().fg(colors.accent)),
                Span::raw(src.as_str()),
            ]),
            None => Line::styled("░ loading…", Style::default().fg(colors.muted)),
        };
        let widget = Paragraph::new(content)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(image.alt.as_str()));
        f.render_widget(widget, rect);
    }

    if let Some(results) = &page.results {
        if let Some(rect) = element_rect(inner, scroll_top, results.bounds) {
            let lines: Vec<Line> = results
                .entries
                .iter()
                .map(|entry| {
                    Line::from(vec![
                        Span::styled(format!("{}: ", entry.label), Style::default().add_modifier(Modifier::BOLD)),
                        Span::raw(entry.value.as_str()),
                    ])
                })
                .collect();
            let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(colors.accent))
                    .title(results.title.as_str()),
            );
            f.render_widget(widget, rect);
        }
    }
}

fn render_hero(f: &mut Frame, page: &Page, colors: &Palette, rect: Rect) {
    let lines = vec![
        Line::raw(""),
        Line::styled(
            page.title.as_str(),
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            "Answer a few questions to assess your animal's health",
            Style::default().fg(colors.muted),
        ),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
}

fn render_counters(f: &mut Frame, counters: &[CounterWidget], inner: Rect, scroll_top: f64, colors: &Palette) {
    for counter in counters {
        let Some(row) = element_rect(inner, scroll_top, counter.bounds) else {
            continue;
        };
        // counters sharing a row split it evenly
        let peers: Vec<&CounterWidget> = counters
            .iter()
            .filter(|other| other.bounds.top == counter.bounds.top)
            .collect();
        let index = peers.iter().position(|other| other.id == counter.id).unwrap_or(0);
        let width = row.width / peers.len().max(1) as u16;
        let rect = Rect {
            x: row.x + width * index as u16,
            width,
            ..row
        };
        let lines = vec![
            Line::styled(
                format!("{}{}", counter.displayed, counter.suffix),
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
            ),
            Line::styled(counter.label.as_str(), Style::default().fg(colors.muted)),
        ];
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
    }
}

fn render_form(
    f: &mut Frame,
    page: &Page,
    form: &Form,
    view: &PageView,
    inner: Rect,
    scroll_top: f64,
    colors: &Palette,
) {
    let first_top = page
        .fields_of(form)
        .map(|field| field.bounds.top)
        .fold(f64::INFINITY, f64::min);
    if first_top.is_finite() {
        if let Some(rect) = element_rect(inner, scroll_top, Bounds::new(first_top - 2.0, 2.0)) {
            render_form_header(f, form, colors, rect);
        }
    }

    for field in page.fields_of(form) {
        if let Some(rect) = element_rect(inner, scroll_top, field.bounds) {
            let focused = view.is_focused(&FocusTarget::Field(field.id.clone()));
            render_field(f, page, field, focused, colors, rect);
        }
    }

    let Some(submit) = &form.submit else {
        return;
    };
    let Some(rect) = submit_bounds(page, &form.id).and_then(|bounds| element_rect(inner, scroll_top, bounds)) else {
        return;
    };
    let mut style = match submit.state.emphasis {
        Emphasis::Primary => Style::default().bg(colors.accent).fg(colors.background).add_modifier(Modifier::BOLD),
        Emphasis::Outline => Style::default().fg(colors.accent),
    };
    if submit.state.disabled {
        style = style.add_modifier(Modifier::DIM);
    }
    if view.is_focused(&FocusTarget::Submit { form: form.id.clone() }) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    let widget = Paragraph::new(Span::styled(format!("[ {} ]", submit.display_label()), style))
        .alignment(Alignment::Center);
    f.render_widget(widget, rect);
}

fn render_form_header(f: &mut Frame, form: &Form, colors: &Palette, rect: Rect) {
    let title = Paragraph::new(Span::styled(
        form.title.as_str(),
        Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(title, Rect { height: 1, ..rect });

    if form.progress_bar && rect.height > 1 {
        let percent = form.progress.percentage().round() as u16;
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(colors.accent).bg(colors.muted))
            .percent(percent.min(100))
            .label(format!("{percent}% complete"));
        f.render_widget(
            gauge,
            Rect {
                y: rect.y + 1,
                height: 1,
                ..rect
            },
        );
    }
}

fn render_field(f: &mut Frame, page: &Page, field: &Field, focused: bool, colors: &Palette, rect: Rect) {
    let border_color = match field.visual {
        VisualState::Valid => Color::Green,
        VisualState::Invalid => Color::Red,
        VisualState::Pristine => colors.muted,
    };
    let title = if field.constraints.required {
        format!("{} *", field.label)
    } else {
        field.label.clone()
    };

    let mut spans = match &field.kind {
        FieldKind::Text { placeholder } => {
            let mut spans = if field.value.is_empty() {
                vec![Span::styled(
                    placeholder.as_str(),
                    Style::default().fg(colors.muted).add_modifier(Modifier::ITALIC),
                )]
            } else {
                vec![Span::raw(field.value.as_str())]
            };
            if focused {
                spans.push(Span::styled("▏", Style::default().fg(colors.accent)));
            }
            spans
        }
        FieldKind::Select { .. } => {
            let shown = if field.value.is_empty() { "Select..." } else { field.value.as_str() };
            let style = if page.has_class(&field.id, "has-value") {
                Style::default().fg(colors.text).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.muted)
            };
            vec![
                Span::raw("◀ "),
                Span::styled(shown, style),
                Span::raw(" ▶"),
            ]
        }
    };
    match field.visual {
        VisualState::Valid => spans.push(Span::styled("  ✓", Style::default().fg(Color::Green))),
        VisualState::Invalid => spans.push(Span::styled(
            "  ✗ please provide a valid value",
            Style::default().fg(Color::Red),
        )),
        VisualState::Pristine => {}
    }

    let widget = Paragraph::new(Line::from(spans)).block(focus_block(&title, focused, border_color));
    f.render_widget(widget, rect);
}

fn focus_block(title: &str, focused: bool, color: Color) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(Color::Yellow))
    } else {
        block.border_style(Style::default().fg(color))
    }
}

fn render_status_bar(f: &mut Frame, view: &PageView, area: Rect) {
    let text = match &view.mode {
        ViewMode::Browse => view.status_message.clone().unwrap_or_else(|| {
            "Tab/↑↓: focus | ←→/Space: choose | Enter: activate | PgUp/PgDn: scroll | Ctrl+P: print | Ctrl+D: dismiss | F1: help | Ctrl+Q: quit".to_string()
        }),
        ViewMode::Confirm { .. } => "y/Enter: confirm | n/Esc: cancel".to_string(),
        ViewMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/F1: close help".to_string(),
    };
    let style = match view.mode {
        ViewMode::Browse => Style::default(),
        ViewMode::Confirm { .. } => Style::default().fg(Color::Yellow),
        ViewMode::Help => Style::default().fg(Color::Cyan),
    };
    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "fa-check-circle" => "✔",
        "fa-exclamation-triangle" => "⚠",
        "fa-exclamation-circle" => "✖",
        "fa-moon" => "☾",
        "fa-sun" => "☀",
        _ => "ℹ",
    }
}

/// Toasts stack from the top-right corner, oldest first.
fn render_notifications(f: &mut Frame, notifications: &[Notification], area: Rect) {
    let width = TOAST_WIDTH.min(area.width);
    for (index, notification) in notifications.iter().enumerate() {
        let y = area.y + 1 + index as u16 * 3;
        if y + 3 > area.y + area.height {
            break;
        }
        let rect = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height: 3,
        };
        let color = severity_color(notification.severity);
        let toast = Paragraph::new(format!("{} {}", icon_glyph(notification.icon), notification.message))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(notification.severity.class()),
            );
        f.render_widget(Clear, rect);
        f.render_widget(toast, rect);
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_confirm_popup(f: &mut Frame, message: &str) {
    let popup_area = centered_rect(f.area(), 60, 7);
    f.render_widget(Clear, popup_area);
    let text = vec![
        Line::raw(message),
        Line::raw(""),
        Line::styled("[y] Yes    [n] No", Style::default().add_modifier(Modifier::BOLD)),
    ];
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title("Confirm"),
        );
    f.render_widget(popup, popup_area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;
    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let help_widget = Paragraph::new(help_lines[start_line..end_line].join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("VetCheck Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"VETCHECK KEYBOARD REFERENCE

=== MOVING AROUND ===
Tab / ↓         Focus next element (toolbar first, then the page)
Shift+Tab / ↑   Focus previous element
PgUp / PgDn     Scroll the page

=== FORMS ===
← → / Space     Choose an option in a select
Typing          Edit the focused text field
Backspace       Delete a character / clear a select
Enter           Submit the form from any of its fields
                Fields are checked when you leave them; after the first
                submission attempt they are checked as you type.
                The submit button lights up when every question is answered.

=== BUTTONS AND CARDS ===
Enter / Space   Activate the focused button or feature card
Ctrl+P          Print the latest assessment to an HTML report
Ctrl+D          Dismiss the newest notification

=== OTHER ===
F1              Show this help
Esc             Clear the status message
Ctrl+Q / Ctrl+C Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/q        Close this help window"#;

/// Screen area of a page element inside the body, clipped to it.
/// `None` when the element is entirely out of view.
pub fn element_rect(inner: Rect, scroll_top: f64, bounds: Bounds) -> Option<Rect> {
    let top = (bounds.top - scroll_top).floor() as i32;
    let bottom = (bounds.bottom() - scroll_top).ceil() as i32;
    let visible_top = top.max(0);
    let visible_bottom = bottom.min(inner.height as i32);
    if visible_bottom <= visible_top {
        return None;
    }
    Some(Rect {
        x: inner.x,
        y: inner.y + visible_top as u16,
        width: inner.width,
        height: (visible_bottom - visible_top) as u16,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Capabilities, InteractionConfig};
    use crate::domain::Viewport;
    use crate::infrastructure::PageRepository;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn controller(height: u16) -> InteractionController {
        let page = PageRepository::demo_page().expect("demo page");
        let area = Rect::new(0, 0, 100, height);
        let mut controller = InteractionController::new(
            page,
            InteractionConfig::default(),
            Capabilities::default(),
            Viewport::new(0.0, body_height(area) as f64),
        )
        .expect("controller");
        controller.start(0);
        controller
    }

    #[test]
    fn test_element_rect_clipping() {
        let inner = Rect::new(1, 4, 50, 10);
        assert_eq!(element_rect(inner, 0.0, Bounds::new(2.0, 3.0)), Some(Rect::new(1, 6, 50, 3)));
        assert_eq!(element_rect(inner, 3.0, Bounds::new(2.0, 3.0)), Some(Rect::new(1, 4, 50, 2)));
        assert_eq!(element_rect(inner, 0.0, Bounds::new(9.0, 3.0)), Some(Rect::new(1, 13, 50, 1)));
        assert_eq!(element_rect(inner, 0.0, Bounds::new(10.0, 3.0)), None);
        assert_eq!(element_rect(inner, 20.0, Bounds::new(2.0, 3.0)), None);
    }

    #[test]
    fn test_body_height_excludes_chrome() {
        assert_eq!(body_height(Rect::new(0, 0, 80, 30)), 22);
    }

    #[test]
    fn test_renders_navbar_and_hero() {
        let controller = controller(30);
        let view = PageView::new(controller.page());
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal
            .draw(|f| render_ui(f, &controller, &view))
            .expect("draw");

        let text = screen_text(&terminal);
        assert!(text.contains("VetCheck"));
        assert!(text.contains("Accurate Diagnosis"));
        assert!(text.contains("[Reset]"));
    }

    #[test]
    fn test_renders_toast_and_confirm_popup() {
        let mut controller = controller(30);
        controller.show_toast("Saved draft", "success", 0);
        let mut view = PageView::new(controller.page());
        view.mode = ViewMode::Confirm {
            form: "health-check".into(),
            message: "Reset?".to_string(),
        };

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal
            .draw(|f| render_ui(f, &controller, &view))
            .expect("draw");

        let text = screen_text(&terminal);
        assert!(text.contains("Saved draft"));
        assert!(text.contains("[y] Yes"));
    }
}
