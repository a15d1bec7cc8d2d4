//! Header for the currently selected agent

use coordination::{AgentId, CertificationDetail};

use super::certification::detail_html;
use super::escape_html;

/// Avatar, name, description and (for real agents) certification panel.
///
/// `provider` comes from the roster; `detail` is `None` for the panel.
pub fn selection_header_html(
    agent: AgentId,
    provider: Option<&str>,
    detail: Option<&CertificationDetail>,
) -> String {
    let profile = agent.profile();
    let provider = provider
        .map(|p| {
            format!(
                r#"<span class="selected-agent-provider">Powered by {}</span>"#,
                escape_html(p)
            )
        })
        .unwrap_or_default();
    let certification = detail
        .map(|d| {
            format!(
                r#"<div class="selected-agent-certification">{}</div>"#,
                detail_html(agent, d)
            )
        })
        .unwrap_or_default();

    format!(
        concat!(
            r#"<div class="selected-agent-avatar"><i class="bi {}"></i></div>"#,
            r#"<div class="selected-agent-info"><h5>{}</h5><p>{}</p>{}{}</div>"#
        ),
        profile.icon,
        escape_html(profile.display_name),
        escape_html(profile.description),
        provider,
        certification
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordination::TrainingAction;

    #[test]
    fn test_panel_header_has_no_certification() {
        let html = selection_header_html(AgentId::All, None, None);
        assert!(html.contains("All Experts"));
        assert!(html.contains("bi-people-fill"));
        assert!(!html.contains("selected-agent-certification"));
    }

    #[test]
    fn test_agent_header_with_provider() {
        let detail = CertificationDetail::NotCertified {
            action: TrainingAction::StartTraining,
        };
        let html = selection_header_html(AgentId::Compliance, Some("anthropic"), Some(&detail));
        assert!(html.contains("Dr. Compliance &amp; Policy"));
        assert!(html.contains("Powered by anthropic"));
        assert!(html.contains("Start Training"));
    }
}
