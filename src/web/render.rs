//! HTML fragments for the dashboard pages.

use crate::monitor::{AggregationResult, LagRecord, ServiceRecord, StatusTier};

use serde::Deserialize;

/// How the service list is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Card,
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Substitute `{{name}}` placeholders in one left-to-right pass.
///
/// Inserted values are never rescanned, so placeholder-shaped text coming from
/// monitored endpoints stays literal. Unknown placeholders are kept as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Overall status heading plus the "Last Updated" line.
pub fn render_overall(result: &AggregationResult) -> String {
    let p = result.overall_tier.presentation();
    let mut html = format!(
        "<h2>Overall System Status: <span style=\"color: {};\">{} {}</span></h2>",
        p.color,
        p.glyph,
        escape_html(&result.overall_status.to_uppercase())
    );
    if let Some(ts) = &result.timestamp {
        html.push_str(&format!("<p class=\"muted\">Last Updated: {}</p>", escape_html(ts)));
    }
    html
}

/// One glyph-and-label chip per tier.
pub fn render_legend() -> String {
    StatusTier::ALL
        .iter()
        .map(|tier| {
            let p = tier.presentation();
            format!("<span style=\"color: {};\">{} {}</span>", p.color, p.glyph, tier.label())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_view_toggle(view: ViewMode) -> String {
    let link = |mode: ViewMode, label: &str, query: &str| {
        let class = if mode == view { "toggle active" } else { "toggle" };
        format!("<a class=\"{}\" href=\"/?view={}\">{}</a>", class, query, label)
    };
    format!(
        "<nav class=\"view-toggle\">{}{}</nav>",
        link(ViewMode::Table, "Table view", "table"),
        link(ViewMode::Card, "Card view", "card")
    )
}

/// Service section body for the selected view.
pub fn render_services(result: &AggregationResult, view: ViewMode) -> String {
    if result.primary_fetch_failed {
        return "<p class=\"error\">Failed to fetch monitor data. Please try again later.</p>".to_string();
    }
    if result.services.is_empty() {
        return "<p>No service details found in the monitor data.</p>".to_string();
    }
    match view {
        ViewMode::Table => render_services_table(&result.services),
        ViewMode::Card => result.services.iter().map(render_service_card).collect(),
    }
}

pub fn render_services_table(services: &[ServiceRecord]) -> String {
    let rows: String = services
        .iter()
        .map(|s| {
            format!(
                "<tr><td>{}</td><td>{} {}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&s.name),
                s.tier.presentation().glyph,
                escape_html(&s.raw_status),
                escape_html(s.table_description()),
                escape_html(&s.tags.join(", "))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<table><thead><tr><th>Name</th><th>Status</th><th>Description</th><th>Tags</th></tr></thead><tbody>\n{}\n</tbody></table>",
        rows
    )
}

pub fn render_service_card(service: &ServiceRecord) -> String {
    let tags = if service.tags.is_empty() {
        "None".to_string()
    } else {
        escape_html(&service.tags.join(", "))
    };

    format!(
        r#"<div class="card">
    <h3>{}</h3>
    <p><strong>Status:</strong> <span style="color: {};">{}</span></p>
    <p><strong>Description:</strong> {}</p>
    <p><strong>Tags:</strong> {}</p>
</div>
"#,
        escape_html(&service.name),
        service.tier.presentation().color,
        escape_html(&service.raw_status.to_uppercase()),
        escape_html(service.card_description()),
        tags
    )
}

/// Completion bar for the lag endpoints of one cycle.
pub fn render_lag_progress(result: &AggregationResult) -> String {
    let total = result.lag_entries.len();
    let ok = result.lag_success_count();
    let failed = total - ok;

    let mut html = format!(
        "<progress value=\"{}\" max=\"{}\"></progress> <span class=\"muted\">{}/{} endpoints responded</span>",
        ok,
        total.max(1),
        ok,
        total
    );
    if failed > 0 {
        html.push_str(&format!(
            " <span style=\"color: {};\">{} failed</span>",
            StatusTier::Critical.presentation().color,
            failed
        ));
    }
    html
}

pub fn render_lag_table(entries: &[LagRecord]) -> String {
    let rows: String = entries
        .iter()
        .map(|e| {
            let class = if e.succeeded { "" } else { " class=\"failed\"" };
            format!(
                "<tr{}><td>{}</td><td>{}</td><td>{}</td></tr>",
                class,
                e.endpoint_index,
                escape_html(&e.topic),
                escape_html(&e.lag.to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<table><thead><tr><th>#</th><th>Topic</th><th>Lag</th></tr></thead><tbody>\n{}\n</tbody></table>",
        rows
    )
}

/// Pretty-printed primary payload, or the failure text.
pub fn render_primary_debug(result: &AggregationResult) -> String {
    match (&result.primary_raw, &result.primary_error) {
        (Some(raw), _) => escape_html(&serde_json::to_string_pretty(raw).unwrap_or_default()),
        (None, Some(err)) => escape_html(&format!("Error: {}", err)),
        (None, None) => String::new(),
    }
}

pub fn render_diagnostics_debug(result: &AggregationResult) -> String {
    escape_html(&serde_json::to_string_pretty(&result.diagnostics).unwrap_or_else(|_| "[]".to_string()))
}
