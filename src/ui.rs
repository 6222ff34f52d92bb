//! Terminal UI rendering.
//!
//! Drawing lives here, apart from application state ([`App`]), screen logic
//! ([`crate::screen`]) and input handling ([`crate::input`]).  Screens call
//! the helpers below from their own `draw`.
//!
//! ## Layout
//!
//! ```text
//! ┌ tab bar ─────────────────────────────┐
//! │ Home │ Market │ + │ Messages │ Me    │
//! ├──────────────────────────────────────┤
//! │ current tab            ┌ modal ┐     │
//! │                        │       │     │
//! │                        └───────┘     │
//! ├──────────────────────────────────────┤
//! status bar
//! ```

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::App;
use crate::binding::ListBinding;
use crate::source::{
    ChatMessage, FeedItem, MessageItem, NoteItem, ProductItem, ProfileOption, UserProfile,
};
use crate::tabs::{TabBar, PUBLISH_SLOT};

/// How one item renders as a list row.
pub trait ListRow {
    fn row(&self) -> Line<'static>;
}

impl ListRow for FeedItem {
    fn row(&self) -> Line<'static> {
        let marker = if self.is_video { "▶ " } else { "  " };
        Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Magenta)),
            Span::styled(self.title.clone(), Style::default().fg(Color::White)),
            Span::raw("  "),
            Span::styled(format!("@{}", self.username), Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("  ♥ {}  ✎ {}", self.likes, self.comments),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }
}

impl ListRow for ProductItem {
    fn row(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>8.2}", self.price), Style::default().fg(Color::Red)),
            Span::raw("  "),
            Span::styled(self.name.clone(), Style::default().fg(Color::White)),
            Span::raw("  "),
            Span::styled(format!("[{}]", self.shop_name), Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("  {} sold", self.sales),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }
}

impl ListRow for MessageItem {
    fn row(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(
                format!("{:<16}", self.time.format("%Y-%m-%d %H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(" "),
            Span::styled(
                format!("{:<8}", self.kind.label()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(self.sender_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::raw(self.content.clone()),
        ];
        if self.unread_count > 0 {
            spans.push(Span::styled(
                format!("  ({})", self.unread_count),
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    }
}

impl ListRow for NoteItem {
    fn row(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("{:<10}", self.published.format("%Y-%m-%d")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(" "),
            Span::styled(self.title.clone(), Style::default().fg(Color::White)),
            Span::styled(format!("  ♥ {}", self.likes), Style::default().fg(Color::DarkGray)),
        ])
    }
}

impl ListRow for ChatMessage {
    fn row(&self) -> Line<'static> {
        let (who, colour) = if self.is_from_current_user {
            ("me".to_string(), Color::Green)
        } else {
            (self.sender_id.clone(), Color::Cyan)
        };
        Line::from(vec![
            Span::styled(
                self.timestamp.format("%H:%M ").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!("{who}: "), Style::default().fg(colour)),
            Span::raw(self.content.clone()),
        ])
    }
}

impl ListRow for ProfileOption {
    fn row(&self) -> Line<'static> {
        Line::from(vec![
            Span::raw(format!("{:<12}", self.title)),
            Span::styled(self.subtitle.clone(), Style::default().fg(Color::DarkGray)),
            Span::styled("  ›", Style::default().fg(Color::DarkGray)),
        ])
    }
}

/// Draw the complete UI for one frame.
///
/// Called once per tick from the main loop.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [tabs_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_tab_bar(app.tabs().selected().slot(), frame, tabs_area);
    app.screen_mut().draw(frame, main_area);
    let modal_open = match app.modal_mut() {
        Some(modal) => {
            let area = centered(main_area, 80, 80);
            frame.render_widget(Clear, area);
            modal.draw(frame, area);
            true
        }
        None => false,
    };
    draw_status_bar(app.status(), modal_open, frame, status_area);
}

fn draw_tab_bar(selected_slot: usize, frame: &mut Frame, area: Rect) {
    let titles = TabBar::titles().into_iter().enumerate().map(|(slot, title)| {
        if slot == PUBLISH_SLOT {
            Line::styled(
                format!(" {title} "),
                Style::default().fg(Color::Black).bg(Color::Red),
            )
        } else {
            Line::from(title)
        }
    });
    let tabs = Tabs::new(titles)
        .select(selected_slot)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn draw_status_bar(status: &str, modal_open: bool, frame: &mut Frame, area: Rect) {
    let help = if modal_open {
        "Esc: close"
    } else {
        "q: quit  Tab/1-5: tabs  +: publish  ↑/↓: scroll  Enter: open  r: refresh"
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(status.to_string(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(status, area);
}

/// Render a bound list and record how many rows fit, for the load-more check.
pub fn draw_list<T: ListRow + Clone>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    binding: &mut ListBinding<T>,
    footer: &str,
) {
    binding.set_viewport_rows(area.height.saturating_sub(2) as usize);
    let list_items: Vec<ListItem> = binding
        .rows()
        .iter()
        .map(|item| ListItem::new(item.row()))
        .collect();

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(format!(" {title} "))
                .title_bottom(Line::from(footer.to_string()).right_aligned())
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut binding.list_state);
}

pub fn list_footer(is_loading: bool, has_more: bool) -> &'static str {
    match (is_loading, has_more) {
        (true, _) => " loading… ",
        (false, true) => " ↓ more ",
        (false, false) => " end of list ",
    }
}

/// A screen that has not been shown yet.
pub fn draw_placeholder(frame: &mut Frame, area: Rect, title: &str) {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new("not loaded").block(block), area);
}

pub fn draw_profile_header(frame: &mut Frame, area: Rect, profile: &UserProfile) {
    let lines = vec![
        Line::from(vec![
            Span::styled(
                profile.username.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(profile.bio.clone(), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(format!(
            "{} following  {} followers  {} likes",
            profile.following, profile.followers, profile.likes
        )),
    ];
    let block = Block::default().title(" Me ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// A bordered text field; the focused one gets a highlighted border.
pub fn draw_text_input(frame: &mut Frame, area: Rect, label: &str, text: &str, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(border);
    let para = Paragraph::new(text.to_string())
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(para, area);
}

pub fn draw_publish_button(frame: &mut Frame, area: Rect, enabled: bool, publishing: bool) {
    let (label, style) = if publishing {
        ("[ publishing… ]", Style::default().fg(Color::Yellow))
    } else if enabled {
        (
            "[ Ctrl+S: publish ]",
            Style::default().fg(Color::Black).bg(Color::Red),
        )
    } else {
        ("[ fill in title and content ]", Style::default().fg(Color::DarkGray))
    };
    let line = Line::from(vec![
        Span::styled(label, style),
        Span::raw("  Tab: switch field  Esc: cancel"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// A rectangle `percent_x` by `percent_y` of `area`, centred in it.
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn footer_reflects_paging_state() {
        assert_eq!(list_footer(true, true), " loading… ");
        assert_eq!(list_footer(true, false), " loading… ");
        assert_eq!(list_footer(false, true), " ↓ more ");
        assert_eq!(list_footer(false, false), " end of list ");
    }

    #[test]
    fn chat_row_labels_own_messages() {
        let mut msg = ChatMessage {
            id: "m1".into(),
            sender_id: "friend2".into(),
            content: "hello".into(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            is_from_current_user: false,
        };
        assert_eq!(text(&msg.row()), "09:30 friend2: hello");

        msg.is_from_current_user = true;
        assert_eq!(text(&msg.row()), "09:30 me: hello");
    }

    #[test]
    fn product_row_shows_price() {
        let product = ProductItem {
            id: "product_0".into(),
            name: "Lamp".into(),
            price: 59.5,
            image_url: String::new(),
            shop_name: "Shop 1".into(),
            sales: 12,
        };
        let row = text(&product.row());
        assert!(row.starts_with("   59.50"), "{row}");
        assert!(row.contains("[Shop 1]"));
    }

    #[test]
    fn option_row_shows_subtitle() {
        let about = crate::source::mock_profile_options().pop().unwrap();
        assert_eq!(text(&about.row()), "About       v9.9.0  ›");
    }

    #[test]
    fn centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let inner = centered(area, 80, 80);
        assert_eq!((inner.width, inner.height), (80, 40));
        assert_eq!((inner.x, inner.y), (10, 5));
    }
}
