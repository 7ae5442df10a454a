//! CLI argument definitions for `ctg-cli`.

use std::str::FromStr;
use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches, Command};
use ctg_lib::source::DEFAULT_BASE_URL;
use ctg_lib::ControllerSettings;

use super::CliError;

/// Environment variable consulted when `--url` is absent.
pub const API_URL_ENV: &str = "CTG_API_URL";

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("CTG Monitor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stream and review CTG waveforms from a remote analysis service")
        .arg(
            Arg::new("url")
                .long("url")
                .short('u')
                .value_name("URL")
                .global(true)
                .help("Base URL of the CTG service API (falls back to $CTG_API_URL)"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .value_name("MS")
                .default_value("5000")
                .global(true)
                .help("Per-request timeout in milliseconds"),
        )
        .arg(
            Arg::new("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .default_value("150")
                .help("Delay between stream polls in milliseconds"),
        )
        .arg(
            Arg::new("capacity")
                .long("capacity")
                .value_name("SAMPLES")
                .default_value("400")
                .help("Number of samples kept in the sliding window"),
        )
        .arg(
            Arg::new("analysis-probability")
                .long("analysis-probability")
                .value_name("P")
                .default_value("0.3")
                .help("Chance that a non-empty tick also refreshes the analysis (0.0-1.0)"),
        )
        .arg(
            Arg::new("analysis-seed")
                .long("analysis-seed")
                .value_name("SEED")
                .help("Seed for the analysis throttle, for reproducible runs"),
        )
        .arg(
            Arg::new("analysis-every")
                .long("analysis-every")
                .value_name("TICKS")
                .conflicts_with("analysis-seed")
                .help("Refresh the analysis on every Nth non-empty tick instead of at random"),
        )
        .arg(
            Arg::new("seek")
                .long("seek")
                .short('s')
                .value_name("SECONDS")
                .help("Jump to the given time before streaming"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Run without the terminal UI until the stream ends"),
        )
        .subcommand(
            Command::new("export")
                .about("Write the validated-warnings report as CSV")
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("PATH")
                        .help("Destination file, or - for stdout (default: CTG_Report_<date>.csv)"),
                ),
        )
        .subcommand(
            Command::new("flags")
                .about("Print the recording's flags and total duration as JSON")
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print the JSON output"),
                ),
        )
}

fn parse_value<T: FromStr>(args: &ArgMatches, name: &'static str) -> Result<Option<T>, CliError> {
    match args.get_one::<String>(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| CliError::InvalidArgument {
                name,
                value: raw.clone(),
            }),
        None => Ok(None),
    }
}

/// Resolve the service URL from `--url`, then `$CTG_API_URL`, then the default.
pub fn api_url(args: &ArgMatches) -> String {
    args.get_one::<String>("url")
        .cloned()
        .or_else(|| std::env::var(API_URL_ENV).ok())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn request_timeout(args: &ArgMatches) -> Result<Duration, CliError> {
    let millis = parse_value::<u64>(args, "timeout-ms")?.unwrap_or(5000);
    Ok(Duration::from_millis(millis))
}

pub fn seek_target(args: &ArgMatches) -> Result<Option<f64>, CliError> {
    parse_value::<f64>(args, "seek")
}

/// Build controller settings from the streaming flags.
pub fn controller_settings(args: &ArgMatches) -> Result<ControllerSettings, CliError> {
    let mut settings = ControllerSettings::default();

    if let Some(tick_ms) = parse_value::<u64>(args, "tick-ms")? {
        settings = settings.with_tick_interval(Duration::from_millis(tick_ms));
    }
    if let Some(capacity) = parse_value::<usize>(args, "capacity")? {
        settings = settings.with_window_capacity(capacity);
    }
    if let Some(probability) = parse_value::<f64>(args, "analysis-probability")? {
        if !(0.0..=1.0).contains(&probability) {
            return Err(CliError::InvalidArgument {
                name: "analysis-probability",
                value: probability.to_string(),
            });
        }
        settings = settings.with_analysis_probability(probability);
    }
    if let Some(seed) = parse_value::<u64>(args, "analysis-seed")? {
        settings = settings.with_analysis_seed(seed);
    }
    if let Some(every) = parse_value::<u32>(args, "analysis-every")? {
        settings = settings.with_analysis_every(every);
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(argv: &[&str]) -> ArgMatches {
        build_cli().try_get_matches_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_controller_defaults() {
        let settings = controller_settings(&matches(&["ctg"])).unwrap();
        let defaults = ControllerSettings::default();
        assert_eq!(settings.tick_interval, defaults.tick_interval);
        assert_eq!(settings.window_capacity, defaults.window_capacity);
        assert_eq!(settings.analysis_probability, defaults.analysis_probability);
        assert_eq!(settings.analysis_every, None);
    }

    #[test]
    fn streaming_flags_are_applied() {
        let args = matches(&[
            "ctg",
            "--tick-ms",
            "20",
            "--capacity",
            "50",
            "--analysis-every",
            "4",
        ]);
        let settings = controller_settings(&args).unwrap();
        assert_eq!(settings.tick_interval, Duration::from_millis(20));
        assert_eq!(settings.window_capacity, 50);
        assert_eq!(settings.analysis_every, Some(4));
    }

    #[test]
    fn bad_numbers_are_reported_by_name() {
        let err = controller_settings(&matches(&["ctg", "--tick-ms", "soon"])).unwrap_err();
        assert!(err.to_string().contains("--tick-ms"));

        let err =
            controller_settings(&matches(&["ctg", "--analysis-probability", "1.5"])).unwrap_err();
        assert!(err.to_string().contains("--analysis-probability"));
    }

    #[test]
    fn url_is_global_to_subcommands() {
        let args = matches(&["ctg", "export", "--url", "http://monitor:9000/api"]);
        let (_, export) = args.subcommand().unwrap();
        assert_eq!(api_url(export), "http://monitor:9000/api");
    }

    #[test]
    fn seed_and_interval_policy_conflict() {
        let result = build_cli().try_get_matches_from([
            "ctg",
            "--analysis-seed",
            "7",
            "--analysis-every",
            "3",
        ]);
        assert!(result.is_err());
    }
}
