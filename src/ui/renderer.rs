// Renderer module - formatting utilities shared by the layout widgets

/// Format an average score for display
pub fn format_avg(average: f64) -> String {
    format!("{:.2}", average)
}

/// Format a percentage share for display
pub fn format_share(pct: f64) -> String {
    format!("{:.1}%", pct)
}
