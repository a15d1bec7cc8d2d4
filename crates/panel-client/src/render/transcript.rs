//! Conversation log → HTML blocks, one per log entry.

use coordination::{AgentId, AgentReply, CompetitionExchange, Exchange, LogEntry, Slot};

use super::{escape_html, MarkdownRenderer};

/// Accuracy shown on competition replies; the backend scores them itself.
const COMPETITION_ACCURACY: &str = "100%";

/// Render every entry in log order.
pub fn render_transcript(entries: &[LogEntry], markdown: &dyn MarkdownRenderer) -> Vec<String> {
    entries
        .iter()
        .map(|entry| render_entry(entry, markdown))
        .collect()
}

/// Render a single log entry.
pub fn render_entry(entry: &LogEntry, markdown: &dyn MarkdownRenderer) -> String {
    match &entry.slot {
        Slot::Pending { agent } => typing_indicator(*agent),
        Slot::Resolved { exchange } => match exchange {
            Exchange::UserQuery { text } => format!(
                r#"<div class="user-message"><div class="user-message-content">{}</div></div>"#,
                escape_html(text)
            ),
            Exchange::SingleAgentReply(reply) => agent_message(reply, markdown, ""),
            Exchange::PanelReply { replies } => panel_reply(replies, markdown),
            Exchange::CompetitionResult(result) => {
                competition_result(result, entry.analyses_visible, markdown)
            }
            Exchange::SystemNotice { title, message } => format!(
                r#"<div class="system-message"><h4>{}</h4><p>{}</p></div>"#,
                escape_html(title),
                escape_html(message)
            ),
        },
    }
}

fn typing_indicator(agent: AgentId) -> String {
    format!(
        concat!(
            r#"<div class="typing-indicator">"#,
            r#"<div class="typing-indicator-avatar"><i class="bi {}"></i></div>"#,
            r#"<div class="typing-indicator-content"><div class="typing-dots">"#,
            r#"<div class="typing-dot"></div><div class="typing-dot"></div><div class="typing-dot"></div>"#,
            r#"</div></div></div>"#
        ),
        agent.profile().icon
    )
}

fn provider_tag(provider: Option<&str>) -> String {
    provider
        .map(|p| format!(r#" <span class="provider-tag">{}</span>"#, escape_html(p)))
        .unwrap_or_default()
}

/// `badge` is extra header markup (winner or correction badge).
fn agent_message(reply: &AgentReply, markdown: &dyn MarkdownRenderer, badge: &str) -> String {
    let profile = reply.agent.profile();
    let body = match &reply.error {
        Some(error) => format!(r#"<div class="agent-error">{}</div>"#, escape_html(error)),
        None => markdown.render(&reply.body),
    };
    format!(
        concat!(
            r#"<div class="agent-message">"#,
            r#"<div class="agent-message-avatar"><i class="bi {icon}"></i></div>"#,
            r#"<div class="agent-message-content">"#,
            r#"<div class="message-header"><h5>{name}{provider}</h5>{badge}</div>"#,
            r#"<div>{body}</div>"#,
            r#"<div class="accuracy-rating">Accuracy Rating: {accuracy}</div>"#,
            r#"</div></div>"#
        ),
        icon = profile.icon,
        name = escape_html(profile.display_name),
        provider = provider_tag(reply.provider.as_deref()),
        badge = badge,
        body = body,
        accuracy = escape_html(&reply.accuracy),
    )
}

fn panel_reply(replies: &[AgentReply], markdown: &dyn MarkdownRenderer) -> String {
    let mut html = String::from(r#"<div class="multi-agent-response"><h4>Expert Panel Response</h4>"#);
    for reply in replies {
        let body = match &reply.error {
            Some(error) => format!(r#"<div class="agent-error">{}</div>"#, escape_html(error)),
            None => markdown.render(&reply.body),
        };
        html.push_str(&format!(
            r#"<div class="multi-agent-item"><h5>{}{}</h5><div>{}</div><div class="accuracy-rating">Accuracy Rating: {}</div></div>"#,
            escape_html(reply.agent.display_name()),
            provider_tag(reply.provider.as_deref()),
            body,
            escape_html(&reply.accuracy)
        ));
    }
    html.push_str("</div>");
    html
}

fn competition_result(
    result: &CompetitionExchange,
    analyses_visible: bool,
    markdown: &dyn MarkdownRenderer,
) -> String {
    let mut winning = AgentReply::new(
        result.winner,
        result.winning_response.clone(),
        COMPETITION_ACCURACY,
    );
    winning.provider = result.winning_provider.clone();
    let badge = format!(
        r#"<div class="competition-metadata"><span class="winner-badge"><i class="bi bi-trophy"></i> Fastest Response ({:.2}s)</span></div>"#,
        result.winning_time
    );

    let mut html = String::from(r#"<div class="competition-result"><div class="winning-response">"#);
    html.push_str(&agent_message(&winning, markdown, &badge));

    if !result.analyses.is_empty() {
        let (label, display) = if analyses_visible {
            ("Hide Analyses", "block")
        } else {
            ("Show Analyses", "none")
        };
        html.push_str(r#"<div class="analyses-container"><h4>Other Agents' Analyses</h4>"#);
        html.push_str(&format!(
            r#"<button class="toggle-analyses-button">{}</button><div class="analyses-content" style="display: {}">"#,
            label, display
        ));
        for analysis in &result.analyses {
            html.push_str(&format!(
                r#"<div class="analysis-item"><div class="analysis-header">{}</div><div class="analysis-content">{}</div></div>"#,
                escape_html(analysis.agent.display_name()),
                escape_html(&analysis.text)
            ));
        }
        html.push_str("</div></div>");
    }
    html.push_str("</div>");

    if let Some(correction) = &result.correction {
        let reply = AgentReply::new(
            correction.agent,
            correction.response.clone(),
            COMPETITION_ACCURACY,
        );
        let badge = r#"<div class="competition-metadata correction"><span class="correction-badge"><i class="bi bi-exclamation-triangle"></i> Correction</span></div>"#;
        html.push_str(r#"<div class="correction-response">"#);
        html.push_str(&agent_message(&reply, markdown, badge));
        html.push_str("</div>");
    }

    html.push_str("</div>");
    html
}
