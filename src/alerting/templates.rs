//! Alert content templates
//!
//! Subjects and bodies are chosen by `(trigger_type, severity)` and
//! interpolated with fields of the triggering event.

use super::channels::Message;
use super::events::MonitorEvent;
use super::types::{AlertRule, Severity, TriggerType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rendered content of one alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertContent {
    pub subject: String,
    pub body: String,
    pub html_body: String,
}

impl AlertContent {
    pub fn into_message(self, recipients: Vec<String>) -> Message {
        Message::new(self.subject, recipients)
            .with_body(self.body)
            .with_html_body(self.html_body)
    }
}

/// One line of a digest
#[derive(Debug, Clone, PartialEq)]
pub struct DigestLine<'a> {
    pub occurred_at: DateTime<Utc>,
    pub resource_id: &'a str,
    pub content: &'a AlertContent,
}

/// Render the alert for a single rule match
pub fn render(rule: &AlertRule, event: &MonitorEvent) -> AlertContent {
    let name = event.resource_name();
    let headline = headline(rule.trigger_type, event, name);
    let subject = format!("[{}] {}", rule.severity.label(), headline);

    let mut details = detail_lines(event);
    details.push(("Rule".to_string(), rule.name.clone()));
    details.push(("Severity".to_string(), rule.severity.label().to_string()));
    details.push((
        "Time".to_string(),
        event.timestamp().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    ));

    let mut body = format!("{}\n\n", headline);
    for (label, value) in &details {
        body.push_str(&format!("{}: {}\n", label, value));
    }
    if let Some(footer) = footer(rule.severity) {
        body.push_str(&format!("\n{}\n", footer));
    }

    let mut html_body = format!(
        "<h2 style=\"color:{}\">{}</h2><table>",
        severity_color(rule.severity),
        escape_html(&headline)
    );
    for (label, value) in &details {
        html_body.push_str(&format!(
            "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
            escape_html(label),
            escape_html(value)
        ));
    }
    html_body.push_str("</table>");
    if let Some(footer) = footer(rule.severity) {
        html_body.push_str(&format!("<p>{}</p>", escape_html(footer)));
    }

    AlertContent {
        subject,
        body,
        html_body,
    }
}

/// Render one digest aggregating every queued alert of a rule
pub fn render_digest(rule_name: &str, severity: Severity, lines: &[DigestLine<'_>]) -> AlertContent {
    let subject = format!(
        "[{}] {}: {} alert{}",
        severity.label(),
        rule_name,
        lines.len(),
        if lines.len() == 1 { "" } else { "s" }
    );

    let mut body = format!("{} alerts since the last digest for rule \"{}\":\n\n", lines.len(), rule_name);
    let mut html_body = format!(
        "<h2>{}</h2><p>{} alerts since the last digest.</p><ul>",
        escape_html(rule_name),
        lines.len()
    );

    for line in lines {
        let when = line.occurred_at.format("%Y-%m-%d %H:%M:%S UTC");
        body.push_str(&format!("- {} [{}] {}\n", when, line.resource_id, line.content.subject));
        html_body.push_str(&format!(
            "<li>{} <code>{}</code> {}</li>",
            when,
            escape_html(line.resource_id),
            escape_html(&line.content.subject)
        ));
    }
    html_body.push_str("</ul>");

    AlertContent {
        subject,
        body,
        html_body,
    }
}

fn headline(trigger_type: TriggerType, event: &MonitorEvent, name: &str) -> String {
    match (trigger_type, event) {
        (TriggerType::StatusChange, MonitorEvent::BotStatus(e)) => {
            format!("{} changed status: {} -> {}", name, e.old_status, e.new_status)
        }
        (TriggerType::LargeProfitLoss, MonitorEvent::Trade(e)) => {
            let kind = if e.profit_percent < 0.0 { "loss" } else { "profit" };
            format!("{}: large {} of {:+.2}% on {}", name, kind, e.profit_percent, e.pair)
        }
        (TriggerType::DailyLossLimit, MonitorEvent::Trade(e)) => format!(
            "{}: daily P/L {:+.2}% reached the configured limit",
            name,
            e.daily_profit_percent.unwrap_or(e.profit_percent)
        ),
        (TriggerType::DrawdownThreshold, MonitorEvent::Trade(e)) => format!(
            "{}: drawdown at {:.2}%",
            name,
            e.drawdown_percent.unwrap_or_default()
        ),
        (TriggerType::TradeClosed, MonitorEvent::Trade(e)) => {
            format!("{}: trade closed on {} ({:+.2}%)", name, e.pair, e.profit_percent)
        }
        (TriggerType::BacktestCompleted, MonitorEvent::Backtest(e)) => {
            format!("Backtest {} for {} {}", e.backtest_id, name, e.status)
        }
        (trigger_type, event) => format!("{}: {} ({})", name, trigger_type, event.kind()),
    }
}

fn detail_lines(event: &MonitorEvent) -> Vec<(String, String)> {
    let mut lines = vec![("Resource".to_string(), event.resource_id().to_string())];
    match event {
        MonitorEvent::BotStatus(e) => {
            lines.push(("Previous status".to_string(), e.old_status.clone()));
            lines.push(("New status".to_string(), e.new_status.clone()));
        }
        MonitorEvent::Trade(e) => {
            lines.push(("Pair".to_string(), e.pair.clone()));
            lines.push(("Profit".to_string(), format!("{:+.2}%", e.profit_percent)));
            if let Some(abs) = e.profit_abs {
                lines.push(("Profit (abs)".to_string(), format!("{:+.4}", abs)));
            }
            if let Some(daily) = e.daily_profit_percent {
                lines.push(("Daily P/L".to_string(), format!("{:+.2}%", daily)));
            }
            if let Some(dd) = e.drawdown_percent {
                lines.push(("Drawdown".to_string(), format!("{:.2}%", dd)));
            }
        }
        MonitorEvent::Backtest(e) => {
            lines.push(("Backtest".to_string(), e.backtest_id.clone()));
            lines.push(("Status".to_string(), e.status.clone()));
            if let Some(profit) = e.profit_percent {
                lines.push(("Profit".to_string(), format!("{:+.2}%", profit)));
            }
        }
    }
    lines
}

fn footer(severity: Severity) -> Option<&'static str> {
    match severity {
        Severity::Critical => Some("Immediate attention required."),
        Severity::Warning => Some("Please review when possible."),
        Severity::Info => None,
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "#36a64f",
        Severity::Warning => "#ff9500",
        Severity::Critical => "#ff0000",
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
