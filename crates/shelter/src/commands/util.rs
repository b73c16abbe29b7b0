//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use shelter_core::{
    ControllerOptions, ListController, ListView, MemoryClient, ResourceClient, TableView,
};
use shelter_core::model::SectionRow;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

/// Client for this invocation plus the options a live view should use.
pub fn connect(global: &GlobalOpts) -> Result<(Arc<dyn ResourceClient>, ControllerOptions), CliError> {
    if global.offline {
        tracing::info!("using in-memory backend");
        return Ok((Arc::new(MemoryClient::new()), ControllerOptions::default()));
    }
    let backend = config::resolve_backend(global)?;
    let client = shelter_core::connect(&backend)?;
    Ok((client, ControllerOptions::from(&backend)))
}

/// Load a list once. No change feed: each write reloads on its own.
pub async fn mount<V: ListView>(global: &GlobalOpts, view: V) -> Result<ListController<V>, CliError> {
    let (client, options) = connect(global)?;
    let list = ListController::new(
        client,
        view,
        ControllerOptions {
            realtime: false,
            ..options
        },
    );
    let spinner = spinner(global, &format!("Loading {}", list.view().name()));
    let loaded = list.mount().await;
    spinner.finish_and_clear();
    loaded?;
    Ok(list)
}

/// [`mount`] for a single-collection section.
pub async fn mount_table<T: SectionRow>(
    global: &GlobalOpts,
) -> Result<ListController<TableView<T>>, CliError> {
    mount(global, TableView::<T>::new()).await
}

fn spinner(global: &GlobalOpts, message: &str) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.to_owned(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

pub fn opt(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}

pub fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.into()
}

pub fn date<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

/// Parse an optional YYYY-MM-DD flag.
pub fn parse_date(field: &str, value: Option<&str>) -> Result<Option<chrono::NaiveDate>, CliError> {
    value
        .map(|v| {
            chrono::NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                CliError::Validation {
                    field: field.into(),
                    reason: "expected YYYY-MM-DD".into(),
                }
            })
        })
        .transpose()
}

/// Day part of a timestamp, in local time.
pub fn day(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value.map_or_else(
        || "-".into(),
        |t| t.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string(),
    )
}

/// Shorten long free text for a table cell.
pub fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= max {
        return line.to_owned();
    }
    let cut: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("Found near the station", 40), "Found near the station");
    }

    #[test]
    fn truncate_uses_first_line_and_ellipsis() {
        assert_eq!(truncate("\nSubject: Hello there\n\nBody", 10), "Subject: …");
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(opt(None), "-");
        assert_eq!(date::<u32>(None), "-");
        assert_eq!(day(None), "-");
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("date_lost", Some("2026-03-01")).unwrap().is_some());
        assert!(matches!(
            parse_date("date_lost", Some("01/03/2026")),
            Err(CliError::Validation { .. })
        ));
    }
}
