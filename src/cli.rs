//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Mirror the Giant Bomb API and its images to local disk.
///
/// The API key is read from `GB_API_KEY` (a `.env` file in the working
/// directory is loaded first if present).
#[derive(Parser, Debug)]
#[command(name = "gb-api-mirror")]
#[command(author, version, about)]
pub struct Args {
    /// Directory to write the mirror into
    #[arg(value_name = "TARGET_DIR")]
    pub target_dir: PathBuf,

    /// Download images referenced by mirrored resources
    #[arg(short = 'd', long)]
    pub images: bool,

    /// Comma-separated resource kinds to mirror (default: all)
    #[arg(short = 'i', long, value_name = "KINDS")]
    pub include: Option<String>,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Skip resources whose files already exist
    #[arg(short, long)]
    pub skip_existing: bool,

    /// Show debug output, including every request
    #[arg(short, long)]
    pub verbose: bool,

    /// Re-download images that already exist on disk
    #[arg(short = 'o', long)]
    pub overwrite_images: bool,

    /// Delay between API requests in milliseconds (0 to disable, max 60000)
    #[arg(short = 'l', long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub request_delay: u64,

    /// Highest identifier to walk for per-identifier resources
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_identifier: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["gb-api-mirror", "/tmp/mirror"]).unwrap();
        assert_eq!(args.target_dir, PathBuf::from("/tmp/mirror"));
        assert!(!args.images);
        assert!(args.include.is_none());
        assert!(!args.quiet);
        assert!(!args.verbose);
        assert!(!args.skip_existing);
        assert!(!args.overwrite_images);
        assert_eq!(args.request_delay, 1000);
        assert!(args.max_identifier.is_none());
    }

    #[test]
    fn test_cli_target_dir_required() {
        let err = Args::try_parse_from(["gb-api-mirror"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["gb-api-mirror", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["gb-api-mirror", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["gb-api-mirror", "out", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    // ==================== Flag Tests ====================

    #[test]
    fn test_cli_short_flags() {
        let args =
            Args::try_parse_from(["gb-api-mirror", "out", "-d", "-s", "-o", "-i", "games,people"])
                .unwrap();
        assert!(args.images);
        assert!(args.skip_existing);
        assert!(args.overwrite_images);
        assert_eq!(args.include.as_deref(), Some("games,people"));
    }

    #[test]
    fn test_cli_long_flags() {
        let args = Args::try_parse_from([
            "gb-api-mirror",
            "out",
            "--images",
            "--skip-existing",
            "--overwrite-images",
            "--include",
            "reviews",
            "--max-identifier",
            "250",
        ])
        .unwrap();
        assert!(args.images);
        assert!(args.skip_existing);
        assert!(args.overwrite_images);
        assert_eq!(args.include.as_deref(), Some("reviews"));
        assert_eq!(args.max_identifier, Some(250));
    }

    #[test]
    fn test_cli_quiet_and_verbose_conflict() {
        let err = Args::try_parse_from(["gb-api-mirror", "out", "-q", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_quiet_alone() {
        let args = Args::try_parse_from(["gb-api-mirror", "out", "--quiet"]).unwrap();
        assert!(args.quiet);
        assert!(!args.verbose);
    }

    #[test]
    fn test_cli_max_identifier_zero_rejected() {
        let err = Args::try_parse_from(["gb-api-mirror", "out", "-m", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    // ==================== Request Delay Tests ====================

    #[test]
    fn test_cli_request_delay_zero_disables() {
        let args = Args::try_parse_from(["gb-api-mirror", "out", "-l", "0"]).unwrap();
        assert_eq!(args.request_delay, 0);
    }

    #[test]
    fn test_cli_request_delay_max_value() {
        let args = Args::try_parse_from(["gb-api-mirror", "out", "--request-delay", "60000"])
            .unwrap();
        assert_eq!(args.request_delay, 60000);
    }

    #[test]
    fn test_cli_request_delay_over_max_rejected() {
        let err = Args::try_parse_from(["gb-api-mirror", "out", "-l", "60001"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
