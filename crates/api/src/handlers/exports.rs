//! Admin export of day states (`/admin/exports/day-states`).
//!
//! Accepts the same filters as the list surfaces (`program`, `from`, `to`)
//! plus a `format` selector, and answers with a downloadable attachment.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use parcours_core::error::CoreError;
use parcours_core::export::ExportFormat;
use parcours_db::models::day_state::DayStateExportRow;
use parcours_db::repositories::day_state_repo::DayStateExportFilter;
use parcours_db::repositories::DayStateRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the export endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    /// Restrict to one program by slug.
    pub program: Option<String>,
    /// RFC 3339 lower bound on the row's last touch.
    pub from: Option<String>,
    /// RFC 3339 upper bound (exclusive).
    pub to: Option<String>,
    /// `json` (default) or `csv`.
    pub format: Option<String>,
}

/// GET /api/v1/admin/exports/day-states
pub async fn export_day_states(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> AppResult<axum::response::Response> {
    let format: ExportFormat = params
        .format
        .as_deref()
        .unwrap_or("json")
        .parse()
        .map_err(AppError::Core)?;

    let filter = DayStateExportFilter {
        program_slug: params.program.clone(),
        from: parse_timestamp(params.from.as_deref())?,
        to: parse_timestamp(params.to.as_deref())?,
    };
    let rows = DayStateRepo::export(&state.pool, &filter).await?;

    tracing::info!(
        rows = rows.len(),
        format = format.file_extension(),
        admin_id = admin.user_id,
        "Day states exported",
    );

    match format {
        ExportFormat::Json => Ok(Json(DataResponse { data: rows }).into_response()),
        ExportFormat::Csv => {
            let csv_output = build_csv(&rows);
            Ok(axum::response::Response::builder()
                .status(200)
                .header("Content-Type", format.content_type())
                .header(
                    "Content-Disposition",
                    "attachment; filename=\"day-states.csv\"",
                )
                .body(axum::body::Body::from(csv_output))
                .unwrap()
                .into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an optional RFC 3339 timestamp query parameter.
fn parse_timestamp(raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    match raw {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| {
                AppError::Core(CoreError::Validation(format!(
                    "Date invalide : « {s} ». Format attendu : RFC 3339."
                )))
            }),
    }
}

/// Build the CSV payload. The answers column is a JSON document and gets
/// standard double-quote escaping.
fn build_csv(rows: &[DayStateExportRow]) -> String {
    let mut out = String::from(
        "user_email,program_slug,day,completed,completed_at,slider_before,slider_after,answers\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            csv_escape(&row.user_email),
            row.program_slug,
            row.day,
            row.completed,
            row.completed_at.map_or(String::new(), |t| t.to_rfc3339()),
            row.slider_before.map_or(String::new(), |v| v.to_string()),
            row.slider_after.map_or(String::new(), |v| v.to_string()),
            csv_escape(&row.answers.to_string()),
        ));
    }
    out
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(day: i32, answers: serde_json::Value) -> DayStateExportRow {
        DayStateExportRow {
            user_id: 1,
            user_email: "u1@example.com".to_string(),
            program_slug: "reset-7".to_string(),
            day,
            answers,
            slider_before: Some(3),
            slider_after: None,
            completed: true,
            completed_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let csv = build_csv(&[row(1, json!({})), row(2, json!({}))]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("user_email,program_slug,day"));
        assert!(lines[1].starts_with("u1@example.com,reset-7,1,true"));
    }

    #[test]
    fn answers_json_is_quoted() {
        let csv = build_csv(&[row(1, json!({"ex.breathing.duration": 8}))]);
        // The JSON contains commas and quotes, so the field must be quoted
        // with doubled inner quotes.
        assert!(csv.contains("\"{\"\"ex.breathing.duration\"\":8}\""));
    }

    #[test]
    fn timestamps_must_be_rfc3339() {
        assert!(parse_timestamp(Some("2026-06-01T00:00:00Z")).unwrap().is_some());
        assert!(parse_timestamp(None).unwrap().is_none());
        assert!(parse_timestamp(Some("hier")).is_err());
    }
}
