//! Certification badge and detail panel markup

use chrono::{DateTime, Utc};
use coordination::{AgentId, BadgeState, CertificationDetail, TrainingAction};

use super::escape_html;

fn format_date(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "N/A".to_string(), |s| format!("{}%", s))
}

/// Badge shown next to an agent in the sidebar, with its tooltip.
pub fn badge_html(badge: &BadgeState) -> String {
    let (class, icon, tooltip) = match badge {
        BadgeState::Certified { score, date } => {
            let mut tooltip = format!(
                "<strong>Certified Agent</strong><br>Score: {}",
                format_score(*score)
            );
            if let Some(date) = format_date(*date) {
                tooltip.push_str(&format!("<br>Certified on: {}", date));
            }
            ("", "bi-check-lg", tooltip)
        }
        BadgeState::Pending { progress } => (
            " pending",
            "bi-hourglass-split",
            format!(
                "<strong>Training in Progress</strong><br>Current progress: {}%",
                progress
            ),
        ),
        BadgeState::NotCertified => (
            " not-certified",
            "bi-x-lg",
            "<strong>Not Certified</strong><br>This agent has not completed required training"
                .to_string(),
        ),
    };
    format!(
        r#"<div class="certification-badge certification-tooltip{}"><i class="bi {}"></i><span class="tooltip-content">{}</span></div>"#,
        class, icon, tooltip
    )
}

fn action_button(agent: AgentId, action: TrainingAction) -> String {
    let (icon, label) = match action {
        TrainingAction::StartTraining => ("bi-mortarboard", "Start Training"),
        TrainingAction::Retry => ("bi-arrow-clockwise", "Retry"),
    };
    format!(
        r#"<button class="btn btn-sm btn-outline-primary mt-2 start-training-btn" data-agent="{}"><i class="bi {}"></i> {}</button>"#,
        agent, icon, label
    )
}

/// Certification panel for the selected agent.
pub fn detail_html(agent: AgentId, detail: &CertificationDetail) -> String {
    let inner = match detail {
        CertificationDetail::Initiating => {
            r#"<span><i class="bi bi-arrow-repeat text-primary spinning"></i> Initiating training...</span>"#
                .to_string()
        }
        CertificationDetail::Failed { reason, action } => format!(
            r#"<span title="{}"><i class="bi bi-exclamation-triangle text-danger"></i> Training failed</span>{}"#,
            escape_html(reason),
            action_button(agent, *action)
        ),
        CertificationDetail::Certified { score, date } => {
            let mut html = format!(
                r#"<span><i class="bi bi-award text-success"></i> Certified</span><span class="certification-score">{}</span>"#,
                format_score(*score)
            );
            if let Some(date) = format_date(*date) {
                html.push_str(&format!(
                    r#"<div class="certification-date">Certified on: {}</div>"#,
                    date
                ));
            }
            html
        }
        CertificationDetail::Pending { progress } => format!(
            r#"<span><i class="bi bi-hourglass-split text-warning"></i> Training in Progress</span><span class="certification-score">{}%</span>"#,
            progress
        ),
        CertificationDetail::NotCertified { action } => format!(
            r#"<span><i class="bi bi-x-circle text-danger"></i> Not Certified</span>{}"#,
            action_button(agent, *action)
        ),
    };
    format!(r#"<div class="certification-details">{}</div>"#, inner)
}
