use std::sync::Arc;

use homed_api_models::PropertySummary;
use homed_search::{ListState, MemoryUrl, Phase, SearchController, SearchSources};

use crate::cli::SearchArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::{build_descriptor, codec_for};
use crate::output::render_listings;

/// Settled result of a one-shot search.
pub(crate) struct SearchOutcome {
    pub(crate) state: ListState<PropertySummary>,
    pub(crate) phase: Phase,
    pub(crate) link: String,
}

pub(crate) async fn handle_search(ctx: &AppContext, args: SearchArgs) -> CliResult<()> {
    let outcome = run_search(ctx, &args).await?;
    println!(
        "{}",
        render_listings(&outcome.state, outcome.phase, &outcome.link, ctx.output)?
    );
    Ok(())
}

/// Mount a controller on the requested descriptor and wait for its fetch.
pub(crate) async fn run_search(ctx: &AppContext, args: &SearchArgs) -> CliResult<SearchOutcome> {
    let codec = codec_for(&ctx.config.search)?;
    let descriptor = build_descriptor(&codec, &args.query)?;
    let api = Arc::new(ctx.api.clone());
    let controller = SearchController::<PropertySummary>::mount(
        "cli-search",
        ctx.config.search.clone(),
        SearchSources {
            suggestions: Arc::clone(&api) as _,
            results: api as _,
            url: Arc::new(MemoryUrl::default()),
        },
        &codec.encode(&descriptor),
    );
    controller.wait_until_settled().await;
    let outcome = SearchOutcome {
        state: controller.list_state(),
        phase: controller.phase(),
        link: controller.share_query(),
    };
    controller.teardown();

    if let Some(failure) = &outcome.state.error {
        return Err(CliError::from(failure.error.clone()));
    }
    Ok(outcome)
}
