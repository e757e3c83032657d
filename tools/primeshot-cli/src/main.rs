//! primeshot CLI: capture the primary monitor to a PNG file.
//!
//! Usage:
//!   primeshot <OUTPUT>                 Capture silently
//!   primeshot --verbose <OUTPUT>       Capture with logs on stderr
//!   primeshot --show-border <OUTPUT>   Keep the capture border visible
//!   primeshot --show-cursor <OUTPUT>   Include the mouse cursor
//!   primeshot --list-monitors          List connected monitors
//!
//! Exit status is 0 on success, 1 on invalid arguments, the capture result
//! code when a capture fails and 99 on any other error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;
use primeshot_capture_engine::{CaptureOptions, CaptureRequest};
use primeshot_common::config::{config_file_path, AppConfig, LoggingConfig};
use primeshot_common::error::{CaptureError, ErrorCode};
use primeshot_common::timing::WaitPolicy;

mod commands;

const EXIT_INVALID_ARGS: u8 = 1;

#[derive(Parser, Debug)]
#[command(
    name = "primeshot",
    about = "Capture the primary monitor to a PNG file",
    version,
    author
)]
struct Cli {
    /// Where to write the PNG
    #[arg(required_unless_present = "list_monitors")]
    output: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Keep the capture border visible
    #[arg(long)]
    show_border: bool,

    /// Include the mouse cursor
    #[arg(long)]
    show_cursor: bool,

    /// How long to wait for a frame (milliseconds)
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// List connected monitors and exit
    #[arg(long)]
    list_monitors: bool,
}

/// Capture settings after config file defaults and flags are merged.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    options: CaptureOptions,
    policy: WaitPolicy,
    logging: LoggingConfig,
}

impl Settings {
    /// Merge flags over the config file. `file` is `None` when no config
    /// file exists.
    fn resolve(cli: &Cli, file: Option<&AppConfig>) -> Self {
        let config = file.cloned().unwrap_or_default();
        let defaults = &config.capture;
        let mut policy = defaults.wait_policy();
        if let Some(ms) = cli.timeout_ms {
            policy = WaitPolicy::new(Duration::from_millis(ms), policy.poll_interval);
        }

        // Silent unless the flag or a config file asks otherwise.
        let level = match (cli.verbose, file) {
            (true, _) => "debug".to_string(),
            (false, Some(file)) => file.logging.level.clone(),
            (false, None) => "off".to_string(),
        };
        let logging = LoggingConfig {
            level,
            json: cli.json_logs || config.logging.json,
            file: config.logging.file.clone(),
        };

        Self {
            options: CaptureOptions {
                hide_border: defaults.hide_border && !cli.show_border,
                hide_cursor: defaults.hide_cursor && !cli.show_cursor,
            },
            policy,
            logging,
        }
    }
}

/// Build and check the file request before anything touches the GPU.
fn capture_request(
    output: Option<PathBuf>,
    options: CaptureOptions,
) -> Result<CaptureRequest, CaptureError> {
    let output = output.ok_or_else(|| CaptureError::invalid_parameter("output path required"))?;
    let request = CaptureRequest::to_file(output, options);
    request.validate()?;
    Ok(request)
}

fn exit_status(result: &anyhow::Result<ErrorCode>) -> u8 {
    match result {
        Ok(code) => code.as_i32() as u8,
        Err(_) => ErrorCode::UnknownError.as_i32() as u8,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_INVALID_ARGS),
            };
        }
    };

    let (file_config, config_error) = match AppConfig::try_load() {
        Ok(config) => (config, None),
        Err(e) => (None, Some(e)),
    };
    let settings = Settings::resolve(&cli, file_config.as_ref());
    primeshot_common::logging::init_logging(&settings.logging);
    if let Some(e) = config_error {
        tracing::warn!(
            "ignoring config file {}: {e}",
            config_file_path().display()
        );
    }

    let result = if cli.list_monitors {
        commands::monitors::run().map(|()| ErrorCode::Success)
    } else {
        match capture_request(cli.output, settings.options) {
            Ok(request) => commands::capture::run(request, settings.policy).await,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    };

    if let Err(e) = &result {
        tracing::error!("fatal: {e:#}");
    }
    ExitCode::from(exit_status(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("primeshot").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_may_follow_the_path() {
        let cli = parse(&["shot.png", "--verbose", "--show-cursor"]).unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("shot.png")));
        assert!(cli.verbose);
        assert!(cli.show_cursor);
        assert!(!cli.show_border);
    }

    #[test]
    fn test_missing_path_is_an_argument_error() {
        let err = parse(&["--verbose"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(parse(&["--list-monitors"]).is_ok());
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_flags_override_config_defaults() {
        let cli = parse(&["-v", "--show-border", "--timeout-ms", "250", "out.png"]).unwrap();
        let settings = Settings::resolve(&cli, None);

        assert!(!settings.options.hide_border);
        assert!(settings.options.hide_cursor);
        assert_eq!(settings.policy.timeout, Duration::from_millis(250));
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn test_silent_without_config_file() {
        let cli = parse(&["out.png"]).unwrap();
        let mut config = AppConfig::default();
        config.capture.hide_cursor = false;
        let settings = Settings::resolve(&cli, None);
        assert_eq!(settings.logging.level, "off");

        let settings = Settings::resolve(&cli, Some(&config));
        assert_eq!(settings.logging.level, "info");
        assert!(settings.options.hide_border);
        assert!(!settings.options.hide_cursor);
        assert_eq!(settings.policy, config.capture.wait_policy());
    }

    #[test]
    fn test_config_level_yields_to_verbose() {
        let mut config = AppConfig::default();
        config.logging.level = "warn".to_string();

        let quiet = parse(&["out.png"]).unwrap();
        assert_eq!(Settings::resolve(&quiet, Some(&config)).logging.level, "warn");

        let verbose = parse(&["-v", "out.png"]).unwrap();
        assert_eq!(Settings::resolve(&verbose, Some(&config)).logging.level, "debug");
    }

    #[test]
    fn test_output_naming_no_file_is_rejected_up_front() {
        let options = CaptureOptions::default();
        for output in ["shots/..", ""] {
            let err = capture_request(Some(PathBuf::from(output)), options).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidParameter, "{output:?}");
        }
        assert!(capture_request(None, options).is_err());
        assert!(capture_request(Some(PathBuf::from("shots/a.png")), options).is_ok());
    }

    #[test]
    fn test_exit_status_mapping() {
        assert_eq!(exit_status(&Ok(ErrorCode::Success)), 0);
        assert_eq!(exit_status(&Ok(ErrorCode::TimeoutError)), 6);
        assert_eq!(exit_status(&Ok(ErrorCode::InvalidParameter)), 97);
        assert_eq!(exit_status(&Err(anyhow::anyhow!("boom"))), 99);
    }
}
