use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "abscore - Metric aggregation and scoring for computationally designed antibodies.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to score designs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a CSV of raw design metrics and write the ranked report.
    Score(ScoreArgs),
    /// Inspect, export, or validate weight profiles.
    Profile(ProfileArgs),
}

/// Layout of the raw metrics file.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One row per (team, challenge, design, metric, value).
    Long,
    /// One row per design, one column per metric.
    Wide,
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    // --- Core Arguments ---
    /// Path to the raw metrics CSV file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output score report (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Weight profile file in TOML format. Defaults to the built-in hackathon profiles.
    #[arg(short, long, value_name = "PATH")]
    pub profiles: Option<PathBuf>,

    // --- Input Overrides ---
    /// Layout of the input file.
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub format: Option<InputFormat>,

    /// Challenge used for wide-format rows that do not name one.
    #[arg(short, long, value_name = "CHALLENGE")]
    pub challenge: Option<String>,

    // --- Output Overrides ---
    /// Order report rows by final score instead of input order.
    #[arg(short, long)]
    pub rank: bool,

    /// Override a profile parameter. Can be used multiple times.
    /// Example: -S challenge1.ipsae.floor=0.5 or -S challenge1.binding.weight=40
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `profile` subcommand.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

/// Available commands for weight profile management.
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Print the resolved profiles with their effective weights.
    Show {
        /// Only show this challenge.
        #[arg(short, long, value_name = "CHALLENGE")]
        challenge: Option<String>,
        /// Profile file to show instead of the built-in profiles.
        #[arg(short, long, value_name = "PATH")]
        profiles: Option<PathBuf>,
    },
    /// Write the built-in profiles as an editable TOML file.
    Export {
        /// Destination file. Prints to stdout when omitted.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Validate a profile file without scoring anything.
    Check {
        /// The profile file to validate.
        #[arg(required = true)]
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn score_arguments_parse() {
        let cli = Cli::try_parse_from([
            "abscore", "-vv", "score", "-i", "in.csv", "-o", "out.csv", "--format", "wide",
            "--challenge", "challenge2", "--rank", "-S", "challenge1.ipsae.floor=0.5",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Score(args) = cli.command else {
            panic!("expected score command");
        };
        assert_eq!(args.format, Some(InputFormat::Wide));
        assert_eq!(args.challenge.as_deref(), Some("challenge2"));
        assert!(args.rank);
        assert_eq!(args.set_values, ["challenge1.ipsae.floor=0.5"]);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["abscore", "-q", "-v", "profile", "export"]);
        assert!(result.is_err());
    }

    #[test]
    fn profile_check_requires_a_path() {
        assert!(Cli::try_parse_from(["abscore", "profile", "check"]).is_err());
    }
}
