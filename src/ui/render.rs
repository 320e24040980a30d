//! 界面渲染
//!
//! 根据 UiState 与当前视图绘制：标题栏显示阶段与购物篮件数，主体为菜单 / 附近美食 / 购物篮 / 收藏之一，
//! 底部为提示行与输入框。

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::core::{AppPhase, NoticeLevel, UiState};
use crate::models::{format_money, RecommendationEntry};

/// 主体视图
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Menu,
    Food,
    Basket,
    Favorites,
}

impl View {
    pub const ALL: [View; 4] = [View::Menu, View::Food, View::Basket, View::Favorites];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "menu" => Some(View::Menu),
            "food" | "nearby" => Some(View::Food),
            "basket" => Some(View::Basket),
            "fav" | "favs" | "favorites" | "favourites" => Some(View::Favorites),
            _ => None,
        }
    }

    fn index(self) -> usize {
        View::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    pub fn prev(self) -> Self {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }
}

fn phase_label(phase: &AppPhase) -> &'static str {
    match phase {
        AppPhase::Idle => "Ready",
        AppPhase::Scanning => "Scanning menu…",
        AppPhase::Searching => "Finding food…",
        AppPhase::Narrating => "Writing description…",
        AppPhase::Speaking => "Speaking…",
        AppPhase::Error => "Error",
    }
}

/// 绘制一帧
pub fn draw(
    f: &mut Frame,
    state: &UiState,
    view: View,
    input_buffer: &str,
    local_notice: Option<&str>,
    scroll: u16,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    let titles = vec![
        "Menu".to_string(),
        "Nearby".to_string(),
        format!("Basket ({})", state.basket_count),
        format!("Favourites ({})", state.favorites.len()),
    ];
    let tabs = Tabs::new(titles)
        .select(view.index())
        .block(
            Block::default()
                .title(format!(" ForkCast │ {} ", phase_label(&state.phase)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    let body = match view {
        View::Menu => menu_lines(state),
        View::Food => place_lines(&state.recommendations, state, "No results yet. /find <craving> @ <postcode>"),
        View::Basket => basket_lines(state),
        View::Favorites => place_lines(&state.favorites, state, "No favourites yet. /fav <n> on the Nearby tab"),
    };
    let paragraph = Paragraph::new(Text::from(body))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(paragraph, chunks[1]);

    // 本地解析错误优先于编排器提示
    let notice = match (local_notice, &state.notice) {
        (Some(text), _) => Span::styled(text.to_string(), Style::default().fg(Color::Red)),
        (None, Some(n)) => {
            let color = match n.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Warning => Color::Yellow,
                NoticeLevel::Error => Color::Red,
            };
            Span::styled(n.text.clone(), Style::default().fg(color))
        }
        (None, None) => Span::styled(
            "Type /help for commands",
            Style::default().fg(Color::DarkGray),
        ),
    };
    f.render_widget(Paragraph::new(Line::from(notice)), chunks[2]);

    let input_title = if state.input_locked {
        " Working… "
    } else {
        " Command "
    };
    let hint = " Enter send │ Tab switch view │ ↑↓ scroll │ Ctrl+L clear │ Ctrl+Q quit ";
    let input = Paragraph::new(input_buffer)
        .block(
            Block::default()
                .title(input_title)
                .title_bottom(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .style(if state.input_locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        });
    f.render_widget(input, chunks[3]);
}

fn menu_lines(state: &UiState) -> Vec<Line<'static>> {
    if state.menu.is_empty() {
        return vec![Line::from("No menu yet. /scan <photo>")];
    }
    let mut lines = Vec::new();
    for (i, item) in state.menu.iter().enumerate() {
        let in_basket = state
            .basket
            .iter()
            .find(|l| l.item.id == item.id)
            .map(|l| l.quantity)
            .unwrap_or(0);
        let mut head = vec![
            Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(item.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            // 未标价的菜品不显示价格
            Span::styled(
                if item.effective_price() > 0.0 {
                    format_money(&state.currency, item.price)
                } else {
                    String::new()
                },
                Style::default().fg(Color::Green),
            ),
        ];
        if in_basket > 0 {
            head.push(Span::styled(
                format!("  [x{}]", in_basket),
                Style::default().fg(Color::Cyan),
            ));
        }
        lines.push(Line::from(head));
        if !item.description.is_empty() {
            lines.push(Line::from(format!("    {}", item.description)));
        }
    }
    if let Some(narrative) = &state.narrative {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            narrative.clone(),
            Style::default().fg(Color::Magenta),
        )));
    }
    lines
}

fn place_lines(
    entries: &[RecommendationEntry],
    state: &UiState,
    empty_hint: &'static str,
) -> Vec<Line<'static>> {
    if entries.is_empty() {
        return vec![Line::from(empty_hint)];
    }
    let mut lines = Vec::new();
    for (i, e) in entries.iter().enumerate() {
        let star = if state.is_favorite(&e.place_id) { "♥ " } else { "" };
        let open = match e.is_open {
            Some(true) => "open now",
            Some(false) => "closed",
            None => "",
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{}{}", star, e.name), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  ★ {:.1} ({})", e.rating, e.review_count)),
            Span::styled(format!("  {}", open), Style::default().fg(Color::Green)),
        ]));
        lines.push(Line::from(format!(
            "    {} │ {} │ {}",
            e.short_address, e.distance_text, e.travel_time_text
        )));
        lines.push(Line::from(Span::styled(
            format!("    {}", e.maps_url()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

fn basket_lines(state: &UiState) -> Vec<Line<'static>> {
    if state.basket.is_empty() {
        return vec![Line::from("Your basket is empty. /add <n> on the Menu tab")];
    }
    let mut lines: Vec<Line> = state
        .basket
        .iter()
        .enumerate()
        .map(|(i, l)| {
            Line::from(format!(
                "{:>2}. {} x{}  {}",
                i + 1,
                l.item.name,
                l.quantity,
                format_money(&state.currency, l.subtotal())
            ))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Total: {}   (/checkout to order)", format_money(&state.currency, state.basket_total)),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Menu.next(), View::Food);
        assert_eq!(View::Favorites.next(), View::Menu);
        assert_eq!(View::Menu.prev(), View::Favorites);
        assert_eq!(View::from_name("Favourites"), Some(View::Favorites));
        assert_eq!(View::from_name("nope"), None);
    }
}
