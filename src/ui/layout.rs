use {
    crate::stats::Snapshot,
    crate::ui::renderer::{format_avg, format_share},
    ratatui::{
        layout::{Constraint, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{BarChart, Block, Borders, Paragraph, Row, Table},
        Frame,
    },
};

/// Render the main UI layout
pub fn render_layout(f: &mut Frame, area: Rect, snapshot: Option<&Snapshot>) {
    let chunks = RatLayout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(10),    // Bar chart
            Constraint::Length(14), // Category table
            Constraint::Length(3),  // Footer/Status
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_score_chart(f, chunks[1], snapshot);
    render_category_table(f, chunks[2], snapshot);
    render_footer(f, chunks[3], snapshot);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Block::default().borders(Borders::ALL);

    let text = vec![Line::from(vec![
        Span::styled(
            "ScoreFlow",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - Live Review Score Monitor  |  Press 'q' or Esc to quit"),
    ])];

    f.render_widget(Paragraph::new(text).block(header), area);
}

fn render_score_chart(f: &mut Frame, area: Rect, snapshot: Option<&Snapshot>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Average Review Score by Category");

    let Some(snapshot) = snapshot else {
        f.render_widget(
            Paragraph::new("Waiting for the first message...").block(block),
            area,
        );
        return;
    };

    let data: Vec<(&str, u64)> = snapshot
        .categories
        .iter()
        .map(|c| (c.category.as_str(), c.average_score.max(0.0).round() as u64))
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(9)
        .bar_gap(2)
        .max(100)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    f.render_widget(chart, area);
}

fn render_category_table(f: &mut Frame, area: Rect, snapshot: Option<&Snapshot>) {
    let header = Row::new(vec!["Category", "Events", "Avg Score", "Share"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = snapshot
        .map(|s| {
            s.categories
                .iter()
                .map(|c| {
                    Row::new(vec![
                        c.category.clone(),
                        c.count.to_string(),
                        format_avg(c.average_score),
                        format_share(c.share_pct),
                    ])
                })
                .collect()
        })
        .unwrap_or_default();

    let widths = [
        Constraint::Length(16), // Category
        Constraint::Length(8),  // Events
        Constraint::Length(10), // Avg Score
        Constraint::Length(8),  // Share
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Categories"));

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect, snapshot: Option<&Snapshot>) {
    let (total, categories) = snapshot
        .map(|s| (s.total_events, s.categories.len()))
        .unwrap_or((0, 0));

    let text = vec![Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Green)),
        Span::raw(if snapshot.is_some() {
            "Consuming"
        } else {
            "Waiting"
        }),
        Span::raw(" | "),
        Span::styled("Events: ", Style::default().fg(Color::Cyan)),
        Span::raw(total.to_string()),
        Span::raw(" | "),
        Span::styled("Categories: ", Style::default().fg(Color::Cyan)),
        Span::raw(categories.to_string()),
    ])];

    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        area,
    );
}
