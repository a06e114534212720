//! Output renderers and formatting helpers for CLI commands.
//!
//! Renderers return the text instead of printing so the interactive session
//! and tests can capture it.

use std::fmt::Write as _;

use anyhow::anyhow;
use homed_api_models::PropertySummary;
use homed_search::filters::format_pounds;
use homed_search::{
    FilterChip, ListState, Phase, QueryDescriptor, Suggestion, SuggestionKind, SuggestionState,
};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

#[derive(Serialize)]
struct ListingsView<'a> {
    phase: Phase,
    link: &'a str,
    descriptor: &'a QueryDescriptor,
    total_count: u64,
    total_pages: u32,
    current_page: u32,
    items: &'a [PropertySummary],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct SuggestionsView<'a> {
    input: &'a str,
    kind: SuggestionKind,
    suggestions: &'a [Suggestion],
}

#[derive(Serialize)]
struct LinkView<'a> {
    link: &'a str,
    descriptor: &'a QueryDescriptor,
    filters: &'a [FilterChip],
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn render_listings(
    state: &ListState<PropertySummary>,
    phase: Phase,
    link: &str,
    format: OutputFormat,
) -> CliResult<String> {
    let page = &state.results;
    let error = state.error.as_ref().map(|failure| failure.error.to_string());
    match format {
        OutputFormat::Json => to_json(&ListingsView {
            phase,
            link,
            descriptor: &state.descriptor,
            total_count: page.total_count,
            total_pages: page.total_pages,
            current_page: page.current_page,
            items: &page.items,
            error,
        }),
        OutputFormat::Table => {
            let mut out = String::new();
            if page.is_empty() {
                out.push_str("no listings\n");
            } else {
                let _ = writeln!(
                    out,
                    "{:<10} {:>12} {:>4} {:<10} {:<28} ADDRESS",
                    "ID", "PRICE", "BEDS", "TYPE", "TITLE"
                );
                for row in &page.items {
                    let _ = writeln!(
                        out,
                        "{:<10} {:>12} {:>4} {:<10} {:<28} {}",
                        row.id,
                        format_price(row.price),
                        row.bedrooms.map_or_else(|| "-".to_string(), |beds| beds.to_string()),
                        row.property_type.as_deref().unwrap_or("-"),
                        truncate(&row.title, 28),
                        row.address_line()
                    );
                }
            }
            let _ = writeln!(
                out,
                "page {} of {} ({} results)",
                page.current_page.max(1),
                page.total_pages.max(1),
                page.total_count
            );
            if let Some(message) = error {
                let _ = writeln!(out, "error: {message} (showing previous results)");
            }
            let _ = write!(out, "link: ?{link}");
            Ok(out)
        }
    }
}

pub(crate) fn render_suggestions(
    input: &str,
    kind: SuggestionKind,
    suggestions: &[Suggestion],
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&SuggestionsView {
            input,
            kind,
            suggestions,
        }),
        OutputFormat::Table => {
            let mut out = format!("{} suggestions for '{}'", kind.as_str(), input.trim());
            if suggestions.is_empty() {
                out.push_str(": none");
            }
            for (index, suggestion) in suggestions.iter().enumerate() {
                let _ = write!(out, "\n{:>3}. {}", index + 1, suggestion.label);
            }
            Ok(out)
        }
    }
}

pub(crate) fn render_link(
    descriptor: &QueryDescriptor,
    link: &str,
    chips: &[FilterChip],
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&LinkView {
            link,
            descriptor,
            filters: chips,
        }),
        OutputFormat::Table => {
            let mut out = format!("?{link}");
            if !chips.is_empty() {
                let labels: Vec<&str> = chips.iter().map(|chip| chip.label.as_str()).collect();
                let _ = write!(out, "\nfilters: {}", labels.join(" | "));
            }
            Ok(out)
        }
    }
}

/// Compact suggestion dropdown for the interactive session.
pub(crate) fn render_dropdown(state: &SuggestionState) -> Option<String> {
    if !state.visible {
        return None;
    }
    let mut out = String::from("suggestions:");
    for (index, suggestion) in state.suggestions.iter().enumerate() {
        let _ = write!(out, "\n  [{}] {}", index + 1, suggestion.label);
    }
    Some(out)
}

fn format_price(price: Option<f64>) -> String {
    price
        .and_then(|value| format!("{value:.0}").parse::<u64>().ok())
        .map_or_else(|| "-".to_string(), format_pounds)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('~');
    short
}
