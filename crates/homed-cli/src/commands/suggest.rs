use std::sync::Arc;

use homed_search::{SuggestionFetcher, classify};

use crate::cli::SuggestArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_suggestions;

pub(crate) async fn handle_suggest(ctx: &AppContext, args: SuggestArgs) -> CliResult<()> {
    let text = args.text.trim();
    if text.is_empty() {
        return Err(CliError::validation("suggestion input must not be empty"));
    }
    let kind = classify(text);
    let fetcher = SuggestionFetcher::new(
        "cli-suggest",
        Arc::new(ctx.api.clone()),
        &ctx.config.search,
    );
    let suggestions = fetcher.fetch_now(text).await;
    fetcher.teardown();
    println!(
        "{}",
        render_suggestions(text, kind, &suggestions, ctx.output)?
    );
    Ok(())
}
