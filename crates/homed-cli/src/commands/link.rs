use crate::cli::LinkArgs;
use crate::client::{AppContext, CliResult};
use crate::commands::{build_descriptor, codec_for};
use crate::output::render_link;

pub(crate) fn handle_link(ctx: &AppContext, args: &LinkArgs) -> CliResult<()> {
    println!("{}", link_text(ctx, args)?);
    Ok(())
}

/// Canonical query string for the arguments, rendered in the chosen format.
pub(crate) fn link_text(ctx: &AppContext, args: &LinkArgs) -> CliResult<String> {
    let codec = codec_for(&ctx.config.search)?;
    let descriptor = build_descriptor(&codec, &args.query)?;
    let link = codec.encode(&descriptor);
    render_link(
        &descriptor,
        &link,
        &descriptor.filters().chips(),
        ctx.output,
    )
}
