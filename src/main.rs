//! CLI entry point for the Giant Bomb API mirror.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gb_mirror_core::{
    Endpoints, Mirror, MirrorOptions, MirrorReport, ResourceKind, Verbosity, init_tracing,
    parse_include_list,
};
use tracing::{debug, error, info, warn};

mod cli;

use cli::Args;

const API_KEY_VAR: &str = "GB_API_KEY";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let verbosity = match Verbosity::from_flags(args.quiet, args.verbose) {
        Ok(verbosity) => verbosity,
        Err(e) => {
            init_tracing(Verbosity::Normal);
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(verbosity);
    debug!(?args, "CLI arguments parsed");

    match run(args).await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            let failed: Vec<&str> = report.failed_kinds().map(ResourceKind::as_str).collect();
            error!(failed = %failed.join(","), "mirror finished with failed resources");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<MirrorReport> {
    dotenv::dotenv().ok();

    let api_key = match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => bail!("{API_KEY_VAR} is not set; export it or add it to a .env file"),
    };

    let kinds = match args.include.as_deref() {
        Some(list) => parse_include_list(list).context("invalid --include value")?,
        None => Vec::new(),
    };

    let mut options = MirrorOptions::new(&args.target_dir, api_key);
    options.kinds = kinds;
    options.download_images = args.images;
    options.skip_existing = args.skip_existing;
    options.overwrite_images = args.overwrite_images;
    options.request_delay = Duration::from_millis(args.request_delay);
    options.max_identifier = args.max_identifier;
    options.endpoints = endpoints_from_env();

    if options.overwrite_images && !options.download_images {
        warn!("--overwrite-images has no effect without --images");
    }

    info!(
        target = %options.target_dir.display(),
        images = options.download_images,
        skip_existing = options.skip_existing,
        "Mirror starting"
    );

    Ok(Mirror::new(options).run().await)
}

/// Applies base URL overrides from the environment.
fn endpoints_from_env() -> Endpoints {
    let mut endpoints = Endpoints::default();
    let overrides = [
        ("GB_API_BASE_URL", &mut endpoints.api_base_url),
        ("GB_SITE_BASE_URL", &mut endpoints.site_base_url),
        ("GB_IMAGE_DATA_BASE_URL", &mut endpoints.image_data_base_url),
    ];
    for (var, slot) in overrides {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => {
                debug!(var, value = %value, "endpoint override");
                *slot = value;
            }
            _ => {}
        }
    }
    endpoints
}
