//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Status labels are colored and server dates shown in pt-BR form.

use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use despacho_core::{Notice, NoticeKind, NoticeReceiver, Pagination};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// "Finalizado" green, "Rejeitado" red, anything else yellow.
pub fn paint_status(label: &str, color: bool) -> String {
    if label.is_empty() {
        return "-".into();
    }
    if !color {
        return label.to_owned();
    }
    match label {
        "Finalizado" => label.green().to_string(),
        "Rejeitado" => label.red().to_string(),
        _ => label.yellow().to_string(),
    }
}

// ── Dates ────────────────────────────────────────────────────────────

enum Parsed {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

fn parse_server_date(raw: &str) -> Option<Parsed> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Parsed::DateTime(dt.with_timezone(&Local).naive_local()));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Parsed::DateTime(dt));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(Parsed::Date)
}

/// `dd/mm/yyyy`, or the raw text when it is not a date.
pub fn format_date(raw: &str) -> String {
    match parse_server_date(raw) {
        Some(Parsed::DateTime(dt)) => dt.format("%d/%m/%Y").to_string(),
        Some(Parsed::Date(d)) => d.format("%d/%m/%Y").to_string(),
        None => raw.to_owned(),
    }
}

/// `dd/mm/yyyy hh:mm:ss`, or the raw text when it is not a date.
pub fn format_datetime(raw: &str) -> String {
    match parse_server_date(raw) {
        Some(Parsed::DateTime(dt)) => dt.format("%d/%m/%Y %H:%M:%S").to_string(),
        Some(Parsed::Date(d)) => d.format("%d/%m/%Y").to_string(),
        None => raw.to_owned(),
    }
}

/// Optional text with a placeholder for missing or blank values.
pub fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_owned(),
        _ => placeholder.to_owned(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the source data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                return "Nenhum registro encontrado.".into();
            }
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item detail views don't use the `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Pager line for table output, on stderr so piped data stays clean.
pub fn print_pager(format: OutputFormat, pager: Pagination, quiet: bool) {
    if quiet || !matches!(format, OutputFormat::Table) || !pager.is_visible() {
        return;
    }
    eprintln!("{}", pager.label());
}

// ── Notices ──────────────────────────────────────────────────────────

pub fn render_notice(notice: &Notice, color: bool) -> String {
    let (marker, message) = match notice.kind {
        NoticeKind::Alert => ("!", notice.message.as_str()),
        NoticeKind::Success => ("✓", notice.message.as_str()),
    };
    if !color {
        return format!("{marker} {message}");
    }
    match notice.kind {
        NoticeKind::Alert => format!("{} {message}", marker.red().bold()),
        NoticeKind::Success => format!("{} {message}", marker.green().bold()),
    }
}

/// Print every queued notice to stderr. Alerts are shown even in quiet mode.
pub fn drain_notices(notices: &mut NoticeReceiver, color: bool, quiet: bool) {
    while let Ok(notice) = notices.try_recv() {
        if quiet && notice.kind == NoticeKind::Success {
            continue;
        }
        eprintln!("{}", render_notice(&notice, color));
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.expect("serialization should not fail")
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_render_in_pt_br() {
        assert_eq!(format_date("2024-03-07T14:05:09"), "07/03/2024");
        assert_eq!(
            format_datetime("2024-03-07T14:05:09.123"),
            "07/03/2024 14:05:09"
        );
        assert_eq!(format_date("2024-03-07"), "07/03/2024");
        assert_eq!(format_date("ontem"), "ontem");
    }

    #[test]
    fn status_colors_follow_label() {
        assert_eq!(paint_status("Finalizado", false), "Finalizado");
        assert_eq!(paint_status("", true), "-");
        assert!(paint_status("Finalizado", true).contains("\u{1b}[32m"));
        assert!(paint_status("Rejeitado", true).contains("\u{1b}[31m"));
        assert!(paint_status("Em andamento", true).contains("\u{1b}[33m"));
    }

    #[test]
    fn placeholders_cover_blank_values() {
        assert_eq!(or_placeholder(None, "N/A"), "N/A");
        assert_eq!(or_placeholder(Some("  "), "N/A"), "N/A");
        assert_eq!(or_placeholder(Some("Centro"), "N/A"), "Centro");
    }

    #[test]
    fn notices_render_without_color() {
        let notice = Notice {
            kind: NoticeKind::Alert,
            message: "Email ou senha incorretos!".into(),
        };
        insta::assert_snapshot!(render_notice(&notice, false), @"! Email ou senha incorretos!");
    }
}
