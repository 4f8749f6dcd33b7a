use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate, generate_to};

use crate::data::BomboData;
use crate::formatting::{format_currency, format_grouped, format_number, format_percentage};

pub const DEFAULT_HTML_PATH: &str = "data/output/dashboard.html";
pub const DEFAULT_SERIES_PATH: &str = "data/output/monthly_metrics.csv";
pub const DEFAULT_JSON_PATH: &str = "data/output/bombo_data.json";

pub const SAVE_HTML_HELP: &str = "Render the dashboard to the given HTML file (defaults to data/output/dashboard.html when no path is provided).";
pub const SAVE_SERIES_HELP: &str = "Save the monthly metrics series to the given CSV file (defaults to data/output/monthly_metrics.csv when no path is provided). Use --archive-csv to store a .gz instead.";
pub const SAVE_JSON_HELP: &str = "Dump the dashboard data table as JSON (defaults to data/output/bombo_data.json when no path is provided).";
pub const ARCHIVE_CSV_HELP: &str = "Archive the saved CSV as a .gz file.";

#[derive(Debug, Parser)]
#[command(
    name = "bombo-dash",
    about = "Render the Bombo investor dashboard and export its metrics.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_HTML_PATH,
        help = SAVE_HTML_HELP
    )]
    pub save_html: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_SERIES_PATH,
        help = SAVE_SERIES_HELP
    )]
    pub save_series: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_JSON_PATH,
        help = SAVE_JSON_HELP
    )]
    pub save_json: Option<PathBuf>,
    #[arg(long, help = ARCHIVE_CSV_HELP)]
    pub archive_csv: bool,
    #[arg(long, help = "Write the HTML dashboard without minification.")]
    pub no_minify: bool,
    #[arg(
        long,
        help = "Print every month in the terminal summary instead of the most recent six."
    )]
    pub full_output: bool,
    #[arg(long, help = "Disable progress spinner output.")]
    pub no_progress: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print a single headline metric.
    Metric {
        #[arg(value_enum, help = "Metric to print.")]
        key: MetricKey,
        #[arg(long, help = "Print the unformatted value with full precision.")]
        raw: bool,
    },
    /// Generate shell completion scripts, optionally installing them for the current user.
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for.")]
        shell: Shell,
        #[arg(
            long,
            value_name = "DIR",
            help = "Directory to write the completion script to."
        )]
        output_dir: Option<PathBuf>,
        #[arg(
            long,
            help = "Install the completion script into the default location for the selected shell."
        )]
        install: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricKey {
    TotalUsers,
    ActiveUsers,
    TotalGtv,
    MonthlyGtv,
    Retention,
    GtvGrowth,
    Transactions,
    AvgTransaction,
}

enum MetricKind {
    Count,
    Currency,
    Percentage,
}

impl MetricKey {
    fn value(self, data: &BomboData) -> (f64, MetricKind) {
        let key = &data.key_metrics;
        match self {
            Self::TotalUsers => (f64::from(key.total_users), MetricKind::Count),
            Self::ActiveUsers => (f64::from(key.monthly_active_users), MetricKind::Count),
            Self::TotalGtv => (key.total_gtv, MetricKind::Currency),
            Self::MonthlyGtv => (key.monthly_gtv, MetricKind::Currency),
            Self::Retention => (key.retention_rate, MetricKind::Percentage),
            Self::GtvGrowth => (key.gtv_growth, MetricKind::Percentage),
            Self::Transactions => (f64::from(key.total_transactions), MetricKind::Count),
            Self::AvgTransaction => (key.avg_transaction_value, MetricKind::Currency),
        }
    }

    /// The metric as it appears on the dashboard, or at full precision when `raw`.
    #[must_use]
    pub fn render(self, data: &BomboData, raw: bool) -> String {
        let (value, kind) = self.value(data);
        if raw {
            return format_grouped(value);
        }
        match kind {
            MetricKind::Count => format_number(Some(value)),
            MetricKind::Currency => format_currency(value),
            MetricKind::Percentage => format_percentage(value),
        }
    }
}

pub fn handle_command(command: Commands, data: &BomboData) -> Result<()> {
    match command {
        Commands::Metric { key, raw } => {
            println!("{}", key.render(data, raw));
            Ok(())
        }
        Commands::Completions {
            shell,
            output_dir,
            install,
        } => generate_completions(shell, output_dir, install),
    }
}

fn generate_completions(shell: Shell, output_dir: Option<PathBuf>, install: bool) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    let target_dir = match (output_dir, install) {
        (Some(dir), _) => Some(dir),
        (None, true) => Some(default_install_dir(shell)?),
        (None, false) => None,
    };

    if let Some(dir) = target_dir {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create completion directory {}", dir.display()))?;
        let path = generate_to(shell, &mut command, bin_name, &dir)
            .context("failed to write completion file")?;
        println!("Installed {shell:?} completions to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        generate(shell, &mut command, bin_name, &mut stdout);
        stdout
            .flush()
            .context("failed to flush completion output")?;
    }

    Ok(())
}

fn default_install_dir(shell: Shell) -> Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| {
        anyhow!("HOME environment variable is not set; use --output-dir to specify a path")
    })?;
    let relative = match shell {
        Shell::Bash => ".local/share/bash-completion/completions",
        Shell::Elvish => ".elvish/lib/completions",
        Shell::Fish => ".config/fish/completions",
        Shell::PowerShell => ".local/share/powershell/Scripts",
        Shell::Zsh => ".local/share/zsh/site-functions",
        other => {
            return Err(anyhow!(
                "no default install location for {other:?}; specify --output-dir"
            ));
        }
    };
    Ok(PathBuf::from(home).join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bombo_data;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn save_flags_fall_back_to_defaults() {
        let cli = Cli::try_parse_from(["bombo-dash", "--save-html", "--save-series", "out.csv"])
            .expect("parse");
        assert_eq!(cli.save_html, Some(PathBuf::from(DEFAULT_HTML_PATH)));
        assert_eq!(cli.save_series, Some(PathBuf::from("out.csv")));
        assert_eq!(cli.save_json, None);
    }

    #[test]
    fn metric_subcommand_parses_kebab_keys() {
        let cli = Cli::try_parse_from(["bombo-dash", "metric", "monthly-gtv", "--raw"])
            .expect("parse");
        match cli.command {
            Some(Commands::Metric { key, raw }) => {
                assert_eq!(key, MetricKey::MonthlyGtv);
                assert!(raw);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn metric_rendering_matches_dashboard() {
        let data = bombo_data();
        assert_eq!(MetricKey::TotalGtv.render(data, false), "$70.0M");
        assert_eq!(MetricKey::TotalGtv.render(data, true), "70,045,672");
        assert_eq!(MetricKey::TotalUsers.render(data, false), "801K");
        assert_eq!(MetricKey::Retention.render(data, false), "56.9%");
        assert_eq!(MetricKey::GtvGrowth.render(data, false), "25.3%");
    }
}
