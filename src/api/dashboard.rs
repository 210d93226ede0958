//! HTML dashboard for the master server
//!
//! Renders every agent's history newest first, its parsed trades, and a form
//! that broadcasts a prompt to all agents. Agent text is untrusted and always
//! escaped.

use std::fmt::Write;

use crate::domain::{ChainCatalog, RecordKind, Roster};
use crate::services::StoreSnapshot;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 20px; line-height: 1.6; }
        .container { max-width: 1200px; margin: 0 auto; }
        .card { border: 1px solid #ddd; border-radius: 8px; padding: 15px; margin-bottom: 20px; }
        .card h2 { margin-top: 0; color: #333; }
        .response { background-color: #f9f9f9; padding: 10px; border-radius: 4px; margin-top: 10px; }
        .response.broadcast { background-color: #eef4fb; }
        .prompt { color: #0066cc; font-weight: bold; }
        .timestamp { color: #666; font-size: 0.8em; }
        .trades { margin-top: 10px; }
        .banner { background-color: #e6f6e6; border: 1px solid #9c9; padding: 10px; border-radius: 4px; }
        textarea { width: 100%; height: 100px; padding: 10px; margin-bottom: 10px; }
        button { padding: 10px 15px; background-color: #0066cc; color: white; border: none;
                 border-radius: 4px; cursor: pointer; }
        button:hover { background-color: #0052a3; }
"#;

/// Escape text for use in HTML element content and attribute values
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

/// Escape and keep line breaks visible
fn multiline(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

pub fn render_dashboard(
    roster: &Roster,
    snapshot: &StoreSnapshot,
    chains: &ChainCatalog,
    banner: Option<&str>,
) -> String {
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Multi-Agent Dashboard</title>
    <meta http-equiv="refresh" content="5">
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <h1>Multi-Agent Blockchain Dashboard</h1>
"#
    );

    if let Some(banner) = banner {
        let _ = writeln!(html, r#"        <div class="banner">{}</div>"#, escape_html(banner));
    }

    html.push_str(
        r#"        <div class="form-container">
            <h2>Send Command to All Agents</h2>
            <form action="/broadcast" method="post">
                <textarea name="prompt" placeholder="Enter your command here..."></textarea>
                <select name="chain">
                    <option value="">Agent default chain</option>
"#,
    );
    for (id, name) in chains.iter() {
        let _ = writeln!(
            html,
            r#"                    <option value="{}">{} ({})</option>"#,
            escape_html(id),
            escape_html(name),
            escape_html(id)
        );
    }
    html.push_str(
        r#"                </select>
                <button type="submit">Send to All Agents</button>
            </form>
        </div>
"#,
    );

    for agent in roster.iter() {
        let _ = write!(
            html,
            r#"        <div class="card">
            <div class="header"><h2>{} ({})</h2></div>
"#,
            escape_html(agent.display_name()),
            escape_html(&agent.id)
        );

        if let Some(trades) = snapshot.parsed_responses.get(&agent.id) {
            if !trades.is_empty() {
                html.push_str("            <ul class=\"trades\">\n");
                for trade in trades {
                    let _ = writeln!(
                        html,
                        r#"                <li>{} ETH: <a href="{}">{}</a></li>"#,
                        escape_html(&trade.amount_key()),
                        escape_html(&trade.link),
                        escape_html(&trade.link)
                    );
                }
                html.push_str("            </ul>\n");
            }
        }

        if let Some(history) = snapshot.raw_responses.get(&agent.id) {
            for record in history.iter().rev() {
                let class = match record.kind {
                    RecordKind::Agent => "response",
                    RecordKind::Broadcast => "response broadcast",
                };
                let _ = write!(
                    html,
                    r#"            <div class="{}">
                <div class="prompt">Prompt: {}</div>
                <div>{}</div>
                <div class="timestamp">{}</div>
            </div>
"#,
                    class,
                    escape_html(&record.prompt),
                    multiline(&record.message),
                    record.timestamp.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }

        html.push_str("        </div>\n");
    }

    html.push_str("    </div>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AgentIdentity, ParsedTrade, ResponseRecord};
    use std::collections::BTreeMap;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn renders_newest_first_with_escaped_text() {
        let roster = Roster::new(vec![AgentIdentity::new("agent_8000", "Agent 1", "http://a")])
            .unwrap();
        let history = vec![
            ResponseRecord::agent_reply("agent_8000", "first", "older"),
            ResponseRecord::agent_reply("agent_8000", "second", "line1\n<b>line2</b>"),
        ];
        let snapshot = StoreSnapshot {
            raw_responses: BTreeMap::from([("agent_8000".to_string(), history)]),
            parsed_responses: BTreeMap::from([(
                "agent_8000".to_string(),
                vec![ParsedTrade {
                    amount_eth: 0.5,
                    link: "https://x.example/tx/1".to_string(),
                }],
            )]),
        };
        let chains = ChainCatalog::new(BTreeMap::from([(
            "8453".to_string(),
            "Base Mainnet".to_string(),
        )]));

        let html = render_dashboard(&roster, &snapshot, &chains, Some("sent"));

        assert!(html.contains("Agent 1 (agent_8000)"));
        assert!(html.contains("line1<br>&lt;b&gt;line2&lt;/b&gt;"));
        assert!(html.contains(r#"<option value="8453">Base Mainnet (8453)</option>"#));
        assert!(html.contains("0.5 ETH"));
        assert!(html.contains(r#"<div class="banner">sent</div>"#));
        let newer = html.find("Prompt: second").unwrap();
        let older = html.find("Prompt: first").unwrap();
        assert!(newer < older);
    }
}
