//! Confluence publish integration.
//!
//! An approved weekly report is appended as one table row to a configured
//! wiki page: fetch the page storage body, check for an existing
//! (week, project) entry, splice the row in, and PUT the page back with an
//! incremented version. Fails closed on duplicates; any upstream failure is
//! passed through with the upstream's error text. No retries.

use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfluenceConfig;
use crate::db::{DbWeeklyReport, RagStatus};

#[derive(Debug, Error)]
pub enum ConfluenceError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Duplicate entry for this week and project")]
    Duplicate,

    #[error("Confluence API error {status}: {message}")]
    Api { status: u16, message: String },
}

// ============================================================================
// Page payloads (Confluence storage format)
// ============================================================================

#[derive(Debug, Deserialize)]
struct PageResponse {
    title: String,
    version: PageVersion,
    #[serde(default)]
    body: Option<PageBody>,
}

#[derive(Debug, Deserialize)]
struct PageVersion {
    number: i64,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    #[serde(default)]
    storage: Option<PageStorage>,
}

#[derive(Debug, Deserialize)]
struct PageStorage {
    #[serde(default)]
    value: String,
}

const TABLE_HEADER: &str = "<table><thead><tr><th>Week</th><th>Project</th><th>RAG</th>\
<th>Accomplishments</th><th>Next Week Plan</th><th>Risks &amp; Mitigation</th>\
<th>Blockers</th><th>Prepared By</th><th>Approved By</th><th>Updated</th></tr></thead>";

// ============================================================================
// Row construction
// ============================================================================

/// Escape text for the storage body; newlines become `<br/>`.
pub fn esc_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "<br/>")
}

/// Build the status-table row for an approved report.
pub fn build_report_row(
    report: &DbWeeklyReport,
    project_name: &str,
    project_code: &str,
    today: &str,
) -> String {
    let (rag_color, rag_icon) = match report.rag_status {
        RagStatus::Green => ("#00875a", "\u{1F7E2}"),
        RagStatus::Amber => ("#ff991f", "\u{1F7E1}"),
        RagStatus::Red => ("#de350b", "\u{1F534}"),
    };
    let blockers = esc_html(&report.blockers);
    let blockers = if blockers.is_empty() {
        "<em>None</em>".to_string()
    } else {
        blockers
    };

    format!(
        "<tr>\n  <td><strong>{week}</strong></td>\n  <td>[{code}] {name}</td>\n  \
         <td><span style=\"color:{color};font-weight:bold;\">{icon} {rag}</span></td>\n  \
         <td>{accomplishments}</td>\n  <td>{plan}</td>\n  <td>{risks}</td>\n  \
         <td>{blockers}</td>\n  <td>{prepared}</td>\n  <td>{approved}</td>\n  <td>{today}</td>\n</tr>",
        week = report.week,
        code = project_code,
        name = project_name,
        color = rag_color,
        icon = rag_icon,
        rag = report.rag_status.as_str().to_uppercase(),
        accomplishments = esc_html(&report.accomplishments),
        plan = esc_html(&report.next_week_plan),
        risks = esc_html(&report.risks_mitigation),
        blockers = blockers,
        prepared = report.prepared_by,
        approved = report.approved_by.as_deref().unwrap_or("\u{2014}"),
        today = today,
    )
}

/// Duplicate check: the page already carries a cell for both this week and
/// this project.
pub fn page_has_entry(storage: &str, week: &str, project_id: &str) -> bool {
    storage.contains(&format!(">{week}<")) && storage.contains(&format!(">{project_id}<"))
}

/// Splice a row into the page body: before the final `</tbody>` when the
/// table exists, wrapped in a tbody before a bare `</table>`, or as a whole
/// new table appended to the page.
pub fn splice_row(content: &str, row_html: &str) -> String {
    if let Some(idx) = content.rfind("</tbody>") {
        let mut out = String::with_capacity(content.len() + row_html.len());
        out.push_str(&content[..idx]);
        out.push_str(row_html);
        out.push_str(&content[idx..]);
        return out;
    }
    if let Some(idx) = content.rfind("</table>") {
        let mut out = String::with_capacity(content.len() + row_html.len() + 16);
        out.push_str(&content[..idx]);
        out.push_str("<tbody>");
        out.push_str(row_html);
        out.push_str("</tbody>");
        out.push_str(&content[idx..]);
        return out;
    }
    format!("{content}{TABLE_HEADER}<tbody>{row_html}</tbody></table>")
}

// ============================================================================
// Publish
// ============================================================================

fn basic_auth(config: &ConfluenceConfig) -> String {
    let raw = format!("{}:{}", config.username, config.api_token);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(raw)
    )
}

/// Publish one pre-rendered report row to the configured wiki page.
///
/// Idempotent against duplicates: a second publish of the same
/// (week, project) pair returns `ConfluenceError::Duplicate` without
/// touching the page.
pub async fn publish_row(
    config: &ConfluenceConfig,
    report_row_html: &str,
    week: &str,
    project_id: &str,
) -> Result<(), ConfluenceError> {
    let client = reqwest::Client::new();
    let auth = basic_auth(config);
    let page_url = format!(
        "{}/rest/api/content/{}",
        config.base_url, config.target_page_id
    );

    let resp = client
        .get(format!("{page_url}?expand=body.storage,version"))
        .header(reqwest::header::AUTHORIZATION, auth.as_str())
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ConfluenceError::Api {
            status: status.as_u16(),
            message: format!("Failed to fetch Confluence page: {body}"),
        });
    }
    let page: PageResponse = resp.json().await?;

    let storage = page
        .body
        .and_then(|b| b.storage)
        .map(|s| s.value)
        .unwrap_or_default();

    if page_has_entry(&storage, week, project_id) {
        return Err(ConfluenceError::Duplicate);
    }

    let content = splice_row(&storage, report_row_html);
    let payload = serde_json::json!({
        "version": { "number": page.version.number + 1 },
        "title": page.title,
        "type": "page",
        "body": { "storage": { "value": content, "representation": "storage" } },
    });

    let resp = client
        .put(&page_url)
        .header(reqwest::header::AUTHORIZATION, auth.as_str())
        .json(&payload)
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ConfluenceError::Api {
            status: status.as_u16(),
            message: format!("Confluence API update failed: {body}"),
        });
    }

    log::info!("Published report row for {project_id} {week} to Confluence");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ReportStatus;

    fn approved_report() -> DbWeeklyReport {
        DbWeeklyReport {
            id: "wr1".into(),
            project_id: "proj1".into(),
            week: "2026-W08".into(),
            rag_status: RagStatus::Amber,
            accomplishments: "Shipped A & B\nFixed <nav> bug".into(),
            next_week_plan: "Ship C".into(),
            risks_mitigation: "Vendor risk -> escalate".into(),
            blockers: String::new(),
            prepared_by: "Kavita Singh".into(),
            approved_by: Some("David Park".into()),
            status: ReportStatus::Approved,
            approval_comment: None,
            created_at: "2026-02-23T10:00:00Z".into(),
            updated_at: "2026-02-23T10:00:00Z".into(),
            is_mock: false,
        }
    }

    #[test]
    fn esc_html_escapes_markup_and_newlines() {
        assert_eq!(
            esc_html("a & b <tag>\nnext"),
            "a &amp; b &lt;tag&gt;<br/>next"
        );
    }

    #[test]
    fn report_row_contains_escaped_fields() {
        let row = build_report_row(&approved_report(), "Customer Portal", "CPR", "2026-02-24");
        assert!(row.contains("<strong>2026-W08</strong>"));
        assert!(row.contains("[CPR] Customer Portal"));
        assert!(row.contains("Shipped A &amp; B<br/>Fixed &lt;nav&gt; bug"));
        assert!(row.contains("AMBER"));
        assert!(row.contains("David Park"));
        assert!(row.contains("<em>None</em>"), "empty blockers render as None");
    }

    #[test]
    fn duplicate_detection_needs_both_markers() {
        let page = "<td>2026-W08</td><td>proj1</td>";
        assert!(page_has_entry(page, "2026-W08", "proj1"));
        assert!(!page_has_entry(page, "2026-W09", "proj1"));
        assert!(!page_has_entry(page, "2026-W08", "proj2"));

        // The week marker also matches inside an emphasized cell.
        let page = "<td><strong>2026-W08</strong></td><td>proj1</td>";
        assert!(page_has_entry(page, "2026-W08", "proj1"));
    }

    #[test]
    fn splice_inserts_before_last_tbody() {
        let page = "<table><tbody><tr><td>old</td></tr></tbody></table>";
        let spliced = splice_row(page, "<tr><td>new</td></tr>");
        assert_eq!(
            spliced,
            "<table><tbody><tr><td>old</td></tr><tr><td>new</td></tr></tbody></table>"
        );
    }

    #[test]
    fn splice_wraps_tbody_when_table_has_none() {
        let page = "<table><tr><td>old</td></tr></table>";
        let spliced = splice_row(page, "<tr><td>new</td></tr>");
        assert_eq!(
            spliced,
            "<table><tr><td>old</td></tr><tbody><tr><td>new</td></tr></tbody></table>"
        );
    }

    #[test]
    fn splice_appends_fresh_table_to_bare_page() {
        let spliced = splice_row("<p>Status reports</p>", "<tr><td>new</td></tr>");
        assert!(spliced.starts_with("<p>Status reports</p><table>"));
        assert!(spliced.contains("<tbody><tr><td>new</td></tr></tbody></table>"));
        assert!(spliced.contains("<th>Week</th>"));
    }

    #[test]
    fn spliced_row_carries_the_week_marker() {
        let row = build_report_row(&approved_report(), "Customer Portal", "CPR", "2026-02-24");
        let page = splice_row("<table><tbody></tbody></table>", &row);
        assert!(page.contains(">2026-W08<"));
    }
}
