//! Presentation adapters
//!
//! Pure functions from panel state to markup or chart configuration. The
//! host inserts the output into its page; nothing here keeps state or
//! touches the backend.

pub mod certification;
pub mod dashboard;
pub mod header;
pub mod transcript;

pub use certification::{badge_html, detail_html};
pub use dashboard::{
    format_avg_time, leaderboard_html, response_time_chart_config, win_distribution_chart_config,
};
pub use header::selection_header_html;
pub use transcript::{render_entry, render_transcript};

/// Converts reply text (markdown) into HTML.
///
/// Implementations must escape any raw HTML they do not deliberately emit.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// Fallback renderer: escapes everything and keeps line breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapingRenderer;

impl MarkdownRenderer for EscapingRenderer {
    fn render(&self, markdown: &str) -> String {
        markdown
            .split("\n\n")
            .filter(|para| !para.trim().is_empty())
            .map(|para| format!("<p>{}</p>", escape_html(para.trim()).replace('\n', "<br>")))
            .collect()
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
