//! Command handlers grouped by subcommand.

pub(crate) mod browse;
pub(crate) mod link;
pub(crate) mod search;
pub(crate) mod suggest;

use homed_config::SearchSettings;
use homed_search::input::{parse_filter, parse_page, parse_page_size};
use homed_search::{PageSize, QueryDescriptor, UrlCodec};

use crate::cli::{FilterArgs, QueryArgs};
use crate::client::CliResult;

/// URL codec using the configured default page size.
pub(crate) fn codec_for(settings: &SearchSettings) -> CliResult<UrlCodec> {
    let default_size = PageSize::try_from(settings.default_page_size)?;
    Ok(UrlCodec::new(default_size))
}

/// Resolve command-line query arguments into a descriptor.
///
/// The shared query string (if any) is the base; free text, filters, page
/// size and page are layered on top in that order so an explicit `--page`
/// survives the page reset caused by the other changes.
pub(crate) fn build_descriptor(codec: &UrlCodec, args: &QueryArgs) -> CliResult<QueryDescriptor> {
    let mut descriptor = codec.decode(args.from.as_deref().unwrap_or_default());
    if let Some(text) = &args.text {
        descriptor = descriptor.with_free_text(text);
    }
    descriptor = apply_filters(descriptor, &args.filters)?;
    if let Some(raw) = &args.per_page {
        descriptor = descriptor.with_page_size(parse_page_size(raw)?);
    }
    if let Some(raw) = &args.page {
        descriptor = descriptor.with_page(parse_page(raw)?);
    }
    Ok(descriptor)
}

fn apply_filters(
    mut descriptor: QueryDescriptor,
    filters: &FilterArgs,
) -> CliResult<QueryDescriptor> {
    for (name, raw) in filters.named_values() {
        descriptor = descriptor.with_filter(parse_filter(name, &raw)?)?;
    }
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> UrlCodec {
        codec_for(&SearchSettings::default()).expect("default settings are valid")
    }

    #[test]
    fn flags_layer_over_a_shared_link() {
        let args = QueryArgs {
            text: Some("York".into()),
            from: Some("?q=Leeds&bedrooms=2&page=4&per_page=25".into()),
            filters: FilterArgs {
                min_price: Some("£150,000".into()),
                ..FilterArgs::default()
            },
            page: Some("2".into()),
            per_page: None,
        };
        let descriptor = build_descriptor(&codec(), &args).expect("valid arguments");
        assert_eq!(
            codec().encode(&descriptor),
            "q=York&minPrice=150000&bedrooms=2&page=2&per_page=25"
        );
    }

    #[test]
    fn changing_the_page_size_resets_to_page_one() {
        let args = QueryArgs {
            from: Some("q=Leeds&page=3".into()),
            per_page: Some("50".into()),
            ..QueryArgs::default()
        };
        let descriptor = build_descriptor(&codec(), &args).expect("valid arguments");
        assert_eq!(descriptor.page().get(), 1);
        assert_eq!(descriptor.page_size().get(), 50);
    }

    #[test]
    fn malformed_values_are_validation_errors() {
        let args = QueryArgs {
            filters: FilterArgs {
                bedrooms: Some("lots".into()),
                ..FilterArgs::default()
            },
            ..QueryArgs::default()
        };
        let err = build_descriptor(&codec(), &args).expect_err("bedrooms must be numeric");
        assert_eq!(err.exit_code(), 2);

        let args = QueryArgs {
            filters: FilterArgs {
                min_price: Some("500000".into()),
                max_price: Some("100000".into()),
                ..FilterArgs::default()
            },
            ..QueryArgs::default()
        };
        assert!(build_descriptor(&codec(), &args).is_err());
    }
}
