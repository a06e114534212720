//! Interactive session driving one search controller from line input.
//!
//! Plain text is typed into the search box (suggestions follow, and an idle
//! pause commits it). A blank line presses Enter. Lines starting with `:` are
//! commands; see [`HELP`].

use std::io::Write;
use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::anyhow;
use homed_api_models::PropertySummary;
use homed_search::input::{parse_filter, parse_page, parse_page_size};
use homed_search::{FilterChange, FilterKey, MemoryUrl, PageSize, SearchController, SearchSources};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::cli::BrowseArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_dropdown, render_listings};

const HELP: &str = "\
commands:
  <text>            type into the search box
  <blank line>      press Enter
  :pick N           choose suggestion N
  :page N           jump to page N
  :next / :prev     move one page
  :per-page N       change the page size
  :filter KEY=VAL   set a filter (type, minPrice, maxPrice, price, bedrooms,
                    passportRating, propertyType)
  :unfilter KEY     remove a filter
  :clear            clear text and filters
  :retry            re-run the current search
  :dismiss          hide the error banner
  :link             print the shareable query
  :quit             leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BrowseCommand {
    Type(String),
    Enter,
    Pick(usize),
    Page(NonZeroU32),
    Next,
    Previous,
    PerPage(PageSize),
    Filter(FilterChange),
    Unfilter(FilterKey),
    Clear,
    Retry,
    Dismiss,
    Link,
    Help,
    Quit,
}

/// Parse one line of session input.
pub(crate) fn parse_browse_line(line: &str) -> CliResult<BrowseCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(BrowseCommand::Enter);
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return Ok(BrowseCommand::Type(line.trim_end_matches(['\r', '\n']).to_string()));
    };
    let (word, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(word, rest)| (word, rest.trim()));
    let parsed = match word {
        "pick" => BrowseCommand::Pick(parse_pick(rest)?),
        "page" => BrowseCommand::Page(parse_page(rest)?),
        "next" => BrowseCommand::Next,
        "prev" | "previous" => BrowseCommand::Previous,
        "per-page" | "per_page" => BrowseCommand::PerPage(parse_page_size(rest)?),
        "filter" => {
            let (name, value) = rest
                .split_once('=')
                .ok_or_else(|| CliError::validation("usage: :filter KEY=VALUE"))?;
            BrowseCommand::Filter(parse_filter(name.trim(), value.trim())?)
        }
        "unfilter" => BrowseCommand::Unfilter(rest.parse()?),
        "clear" => BrowseCommand::Clear,
        "retry" => BrowseCommand::Retry,
        "dismiss" => BrowseCommand::Dismiss,
        "link" => BrowseCommand::Link,
        "help" | "?" => BrowseCommand::Help,
        "quit" | "q" | "exit" => BrowseCommand::Quit,
        other => {
            return Err(CliError::validation(format!(
                "unknown command ':{other}' (try :help)"
            )));
        }
    };
    Ok(parsed)
}

fn parse_pick(raw: &str) -> CliResult<usize> {
    raw.parse::<usize>()
        .ok()
        .filter(|index| *index > 0)
        .ok_or_else(|| CliError::validation("usage: :pick N (N starts at 1)"))
}

pub(crate) async fn handle_browse(ctx: &AppContext, args: BrowseArgs) -> CliResult<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(
        ctx,
        args.from.as_deref().unwrap_or_default(),
        stdin,
        &mut stdout,
    )
    .await
}

/// Run a session until `:quit` or end of input; the controller is torn down
/// on the way out.
pub(crate) async fn run_session<R, W>(
    ctx: &AppContext,
    initial_query: &str,
    reader: R,
    out: &mut W,
) -> CliResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let api = Arc::new(ctx.api.clone());
    let controller = SearchController::<PropertySummary>::mount(
        "cli-browse",
        ctx.config.search.clone(),
        SearchSources {
            suggestions: Arc::clone(&api) as _,
            results: api as _,
            url: Arc::new(MemoryUrl::default()),
        },
        initial_query,
    );
    controller.focus();
    let mut results = controller.subscribe_results();
    let mut suggestions = controller.subscribe_suggestions();
    let mut lines = reader.lines();
    emit(out, "type a location, or :help for commands")?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line
                    .map_err(|err| CliError::failure(anyhow!("failed to read input: {err}")))?;
                let Some(line) = line else { break };
                let outcome = parse_browse_line(&line).and_then(|command| match command {
                    BrowseCommand::Quit => Ok(None),
                    command => apply(&controller, command).map(Some),
                });
                match outcome {
                    Ok(None) => break,
                    Ok(Some(Some(text))) => emit(out, &text)?,
                    Ok(Some(None)) => {}
                    Err(err) => emit(out, &format!("error: {}", err.display_message()))?,
                }
            }
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = results.borrow_and_update().clone();
                if state.loading {
                    emit(out, "searching...")?;
                } else {
                    let text = render_listings(
                        &state,
                        controller.phase(),
                        &controller.share_query(),
                        ctx.output,
                    )?;
                    emit(out, &text)?;
                }
            }
            changed = suggestions.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = suggestions.borrow_and_update().clone();
                if let Some(text) = render_dropdown(&state) {
                    emit(out, &text)?;
                }
            }
        }
    }

    controller.teardown();
    Ok(())
}

fn apply(
    controller: &SearchController<PropertySummary>,
    command: BrowseCommand,
) -> CliResult<Option<String>> {
    let note = match command {
        BrowseCommand::Type(text) => {
            controller.input(&text);
            None
        }
        BrowseCommand::Enter => {
            controller.press_enter();
            None
        }
        BrowseCommand::Pick(index) => controller
            .select_suggestion(index - 1)
            .is_none()
            .then(|| format!("no suggestion {index}")),
        BrowseCommand::Page(page) => {
            controller.set_page(page);
            None
        }
        BrowseCommand::Next => {
            (!controller.next_page()).then(|| "no later page for the current results".to_string())
        }
        BrowseCommand::Previous => {
            (!controller.previous_page()).then(|| "already on the first page".to_string())
        }
        BrowseCommand::PerPage(size) => {
            controller.set_page_size(size);
            None
        }
        BrowseCommand::Filter(change) => {
            controller.apply_filter(change)?;
            None
        }
        BrowseCommand::Unfilter(key) => {
            controller.remove_filter(key);
            None
        }
        BrowseCommand::Clear => {
            controller.clear_all();
            None
        }
        BrowseCommand::Retry => {
            controller.retry();
            None
        }
        BrowseCommand::Dismiss => {
            controller.dismiss_error();
            None
        }
        BrowseCommand::Link => Some(format!("?{}", controller.share_query())),
        BrowseCommand::Help => Some(HELP.to_string()),
        BrowseCommand::Quit => None,
    };
    Ok(note)
}

fn emit<W: Write>(out: &mut W, text: &str) -> CliResult<()> {
    writeln!(out, "{text}")
        .and_then(|()| out.flush())
        .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use homed_config::{AppConfig, ClientSettings};
    use homed_search::ListingType;
    use homed_test_support::fixtures::{listing_json, listings_envelope};
    use httpmock::MockServer;
    use httpmock::prelude::*;

    fn parse(line: &str) -> BrowseCommand {
        parse_browse_line(line).expect("line should parse")
    }

    #[test]
    fn plain_lines_type_and_blank_lines_commit() {
        assert_eq!(parse("St Alb"), BrowseCommand::Type("St Alb".into()));
        assert_eq!(parse("   "), BrowseCommand::Enter);
        assert_eq!(parse(""), BrowseCommand::Enter);
    }

    #[test]
    fn commands_parse_their_arguments() {
        assert_eq!(parse(":pick 2"), BrowseCommand::Pick(2));
        assert_eq!(parse(":page 3"), BrowseCommand::Page(NonZeroU32::new(3).expect("non-zero")));
        assert_eq!(parse(":prev"), BrowseCommand::Previous);
        assert_eq!(
            parse(":per-page 25"),
            BrowseCommand::PerPage(PageSize::new(25).expect("valid size"))
        );
        assert_eq!(
            parse(":filter type = rent"),
            BrowseCommand::Filter(FilterChange::ListingType(ListingType::Rent))
        );
        assert_eq!(parse(":unfilter bedrooms"), BrowseCommand::Unfilter(FilterKey::Bedrooms));
        assert_eq!(parse(":quit"), BrowseCommand::Quit);
    }

    #[test]
    fn malformed_commands_are_validation_errors() {
        for line in [
            ":pick 0",
            ":pick two",
            ":page 0",
            ":per-page 500",
            ":filter bedrooms",
            ":filter beds=lots",
            ":unfilter garden",
            ":jump",
        ] {
            let err = parse_browse_line(line).expect_err(line);
            assert_eq!(err.exit_code(), 2, "{line}");
        }
    }

    #[tokio::test]
    async fn session_applies_commands_and_reports_errors() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/properties");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(listings_envelope(
                    vec![listing_json(3, "Mews house", "Bath")],
                    1,
                    1,
                    1,
                ));
        });
        let config = AppConfig {
            client: ClientSettings {
                api_url: server.base_url(),
                ..ClientSettings::default()
            },
            ..AppConfig::default()
        };
        let ctx = AppContext::new(config, OutputFormat::Table, "trace-browse")
            .expect("context builds");

        let script = ":filter bedrooms=3\n:link\n:pick 4\n:bogus\n:quit\n:link\n";
        let mut out = Vec::new();
        run_session(&ctx, "q=Bath", BufReader::new(script.as_bytes()), &mut out)
            .await
            .expect("session runs");
        let text = String::from_utf8(out).expect("utf-8 output");

        assert!(text.starts_with("type a location"));
        assert!(text.contains("\n?q=Bath&bedrooms=3\n"));
        assert!(text.contains("no suggestion 4"));
        assert!(text.contains("error: unknown command ':bogus' (try :help)"));
        let links = text.lines().filter(|line| *line == "?q=Bath&bedrooms=3").count();
        assert_eq!(links, 1, "input after :quit must be ignored");
    }
}
