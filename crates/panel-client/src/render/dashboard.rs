//! Competition dashboard: leaderboard table and chart configurations
//!
//! Chart configs are plain JSON for the host's charting library; the
//! agent colour order matches declaration order.

use coordination::{ChartPoint, LeaderboardRow};
use serde_json::{json, Value};

use super::escape_html;

const AGENT_COLOURS: [&str; 6] = [
    "rgba(54, 162, 235, 0.7)",
    "rgba(255, 99, 132, 0.7)",
    "rgba(255, 206, 86, 0.7)",
    "rgba(75, 192, 192, 0.7)",
    "rgba(153, 102, 255, 0.7)",
    "rgba(255, 159, 64, 0.7)",
];

/// `"x.xxs"`, or `"N/A"` for an agent without wins
pub fn format_avg_time(avg: Option<f64>) -> String {
    avg.map_or_else(|| "N/A".to_string(), |t| format!("{:.2}s", t))
}

pub fn leaderboard_html(rows: &[LeaderboardRow]) -> String {
    let mut lines = vec![
        r#"<table class="table table-sm">"#.to_string(),
        "<thead><tr><th>Rank</th><th>Agent</th><th>Wins</th><th>Corrections</th><th>Avg Time</th></tr></thead>"
            .to_string(),
        "<tbody>".to_string(),
    ];
    for row in rows {
        lines.push(format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.rank,
            escape_html(row.agent.display_name()),
            row.wins,
            row.corrections,
            format_avg_time(row.avg_response_time)
        ));
    }
    lines.push("</tbody></table>".to_string());
    lines.join("")
}

fn labels(points: &[ChartPoint]) -> Vec<&'static str> {
    points.iter().map(|p| p.agent.display_name()).collect()
}

fn values(points: &[ChartPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

/// Bar chart of mean winning time per agent
pub fn response_time_chart_config(points: &[ChartPoint]) -> Value {
    json!({
        "type": "bar",
        "data": {
            "labels": labels(points),
            "datasets": [{
                "label": "Average Response Time (s)",
                "data": values(points),
                "backgroundColor": AGENT_COLOURS,
            }]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": {
                "y": { "beginAtZero": true, "title": { "display": true, "text": "Seconds" } }
            },
            "plugins": { "title": { "display": true, "text": "Average Response Times" } }
        }
    })
}

/// Doughnut chart of wins per agent
pub fn win_distribution_chart_config(points: &[ChartPoint]) -> Value {
    json!({
        "type": "doughnut",
        "data": {
            "labels": labels(points),
            "datasets": [{
                "label": "Win Rate",
                "data": values(points),
                "backgroundColor": AGENT_COLOURS,
            }]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "title": { "display": true, "text": "Win Distribution" } }
        }
    })
}
