//! Argument parsing, configuration layering and command dispatch.

use clap::{Args, Parser, Subcommand, ValueEnum};
use homed_config::AppConfig;
use homed_telemetry::{LogFormat, LoggingConfig, init_logging};
use serde_json::{Map, Value, json};
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::client::{AppContext, CliResult};
use crate::commands::browse::handle_browse;
use crate::commands::link::handle_link;
use crate::commands::search::handle_search;
use crate::commands::suggest::handle_suggest;

/// Parses CLI arguments, executes the requested command and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let trace_id = Uuid::new_v4().to_string();
    let span = info_span!("homed", trace_id = %trace_id, command = cli.command.label());

    let result = async move {
        let config = load_config(&cli)?;
        install_logging(&config);
        debug!(api_url = %config.client.api_url, "configuration loaded");
        let ctx = AppContext::new(config, cli.output, &trace_id)?;
        dispatch(cli.command, &ctx).await
    }
    .instrument(span)
    .await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Search(args) => handle_search(ctx, args).await,
        Command::Suggest(args) => handle_suggest(ctx, args).await,
        Command::Link(args) => handle_link(ctx, &args),
        Command::Browse(args) => handle_browse(ctx, args).await,
    }
}

/// Layer flag overrides on top of `HOMED_*` environment configuration.
pub(crate) fn load_config(cli: &Cli) -> CliResult<AppConfig> {
    let mut config = AppConfig::from_env()?;
    config.apply_patch(&cli.config_patch())?;
    Ok(config)
}

fn install_logging(config: &AppConfig) {
    let logging = LoggingConfig {
        level: &config.logging.level,
        format: LogFormat::from_setting(config.logging.format.as_deref()),
        build_sha: env!("CARGO_PKG_VERSION"),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }
}

#[derive(Parser)]
#[command(name = "homed", about = "Search Homed property listings from the terminal")]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "HOMED_API_URL", help = "Marketplace API base URL")]
    pub(crate) api_url: Option<String>,
    #[arg(
        long,
        global = true,
        env = "HOMED_HTTP_TIMEOUT_SECS",
        help = "Per-request timeout in seconds"
    )]
    pub(crate) timeout: Option<u64>,
    #[arg(
        long,
        global = true,
        env = "HOMED_LOG_LEVEL",
        help = "Default log filter, overridden by RUST_LOG"
    )]
    pub(crate) log_level: Option<String>,
    #[arg(
        long,
        global = true,
        env = "HOMED_LOG_FORMAT",
        help = "Log output format: json or pretty"
    )]
    pub(crate) log_format: Option<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    /// JSON patch holding only the flags that were given.
    fn config_patch(&self) -> Value {
        let mut client = Map::new();
        if let Some(url) = &self.api_url {
            client.insert("api_url".into(), json!(url));
        }
        if let Some(timeout) = self.timeout {
            client.insert("timeout_secs".into(), json!(timeout));
        }
        let mut logging = Map::new();
        if let Some(level) = &self.log_level {
            logging.insert("level".into(), json!(level));
        }
        if let Some(format) = &self.log_format {
            logging.insert("format".into(), json!(format));
        }

        let mut patch = Map::new();
        if !client.is_empty() {
            patch.insert("client".into(), Value::Object(client));
        }
        if !logging.is_empty() {
            patch.insert("logging".into(), Value::Object(logging));
        }
        Value::Object(patch)
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run one search and print the page.
    Search(SearchArgs),
    /// Classify input and list location suggestions.
    Suggest(SuggestArgs),
    /// Normalise a shareable query string without contacting the API.
    Link(LinkArgs),
    /// Drive a search interactively from standard input.
    Browse(BrowseArgs),
}

impl Command {
    const fn label(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::Suggest(_) => "suggest",
            Self::Link(_) => "link",
            Self::Browse(_) => "browse",
        }
    }
}

/// Structured filter flags shared by `search` and `link`.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct FilterArgs {
    #[arg(long = "type", help = "Listing type: sale or rent")]
    pub(crate) listing_type: Option<String>,
    #[arg(long, help = "Minimum price in pounds")]
    pub(crate) min_price: Option<String>,
    #[arg(long, help = "Maximum price in pounds")]
    pub(crate) max_price: Option<String>,
    #[arg(long, help = "Price band such as 300000-500000 or 1000000+")]
    pub(crate) price: Option<String>,
    #[arg(long, help = "Minimum bedrooms")]
    pub(crate) bedrooms: Option<String>,
    #[arg(long, help = "Minimum passport rating (1-10)")]
    pub(crate) passport_rating: Option<String>,
    #[arg(long = "property-type", help = "Property types, comma separated or repeated")]
    pub(crate) property_types: Vec<String>,
}

impl FilterArgs {
    /// Flag values paired with the filter names they set, in application order.
    pub(crate) fn named_values(&self) -> Vec<(&'static str, String)> {
        let mut values = Vec::new();
        if let Some(band) = &self.price {
            values.push(("priceRange", band.clone()));
        }
        let singles = [
            ("type", &self.listing_type),
            ("minPrice", &self.min_price),
            ("maxPrice", &self.max_price),
            ("bedrooms", &self.bedrooms),
            ("passportRating", &self.passport_rating),
        ];
        values.extend(
            singles
                .into_iter()
                .filter_map(|(name, value)| value.as_ref().map(|value| (name, value.clone()))),
        );
        if !self.property_types.is_empty() {
            values.push(("propertyType", self.property_types.join(",")));
        }
        values
    }
}

/// Descriptor inputs shared by `search` and `link`.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct QueryArgs {
    #[arg(help = "Free-text location, e.g. \"St Albans\" or \"SW1A\"")]
    pub(crate) text: Option<String>,
    #[arg(long, help = "Start from a shared query string such as 'q=Leeds&page=2'")]
    pub(crate) from: Option<String>,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    #[arg(long, help = "Page number (1-based)")]
    pub(crate) page: Option<String>,
    #[arg(long, help = "Results per page")]
    pub(crate) per_page: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct SearchArgs {
    #[command(flatten)]
    pub(crate) query: QueryArgs,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SuggestArgs {
    #[arg(help = "Partial postcode or place name")]
    pub(crate) text: String,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct LinkArgs {
    #[command(flatten)]
    pub(crate) query: QueryArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct BrowseArgs {
    #[arg(long, help = "Start from a shared query string")]
    pub(crate) from: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn global_flags_become_a_config_patch() {
        let cli = parse(&[
            "homed",
            "--api-url",
            "https://homes.example/api",
            "--timeout",
            "20",
            "--log-level",
            "debug",
            "link",
        ]);
        assert_eq!(
            cli.config_patch(),
            json!({
                "client": {"api_url": "https://homes.example/api", "timeout_secs": 20},
                "logging": {"level": "debug"}
            })
        );
    }

    #[test]
    fn absent_flags_leave_the_patch_empty() {
        let cli = parse(&["homed", "suggest", "SW1A"]);
        assert_eq!(cli.config_patch(), json!({}));
        assert_eq!(cli.output, OutputFormat::Table);
        assert_eq!(cli.command.label(), "suggest");
    }

    #[test]
    fn invalid_flag_values_fail_validation() {
        let cli = parse(&["homed", "--api-url", "ftp://nope", "link"]);
        let err = load_config(&cli).expect_err("ftp URL should be rejected");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn search_filters_are_named_for_the_parser() {
        let cli = parse(&[
            "homed",
            "--format",
            "json",
            "search",
            "St Albans",
            "--type",
            "sale",
            "--price",
            "300000-500000",
            "--max-price",
            "450000",
            "--property-type",
            "house",
            "--property-type",
            "flat",
        ]);
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.query.text.as_deref(), Some("St Albans"));
        assert_eq!(
            args.query.filters.named_values(),
            vec![
                ("priceRange", "300000-500000".to_string()),
                ("type", "sale".to_string()),
                ("maxPrice", "450000".to_string()),
                ("propertyType", "house,flat".to_string()),
            ]
        );
    }
}
