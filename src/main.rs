use anyhow::Result;
use bombo_dash::cli::{self, Cli};
use bombo_dash::data::bombo_data;
use bombo_dash::export::{save_json, save_series_csv};
use bombo_dash::metrics::DashboardMetrics;
use bombo_dash::progress::{Output, RunProgress, plan_outputs};
use bombo_dash::report::{DashboardContext, DownloadPaths, save_html_report};
use bombo_dash::summary::{SummaryContext, SummaryPaths, print_summary};
use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    colored::control::set_override(true);

    let mut cli = Cli::parse();
    let data = bombo_data();

    if let Some(command) = cli.command.take() {
        cli::handle_command(command, data)?;
        return Ok(());
    }

    let Cli {
        save_html,
        save_series,
        save_json: json_path,
        archive_csv,
        no_minify,
        full_output,
        no_progress,
        ..
    } = cli;

    let run_started_at = Local::now();
    let plan = plan_outputs(save_series.is_some(), json_path.is_some(), save_html.is_some());
    let mut progress = RunProgress::new(&plan, !no_progress);
    let metrics = DashboardMetrics::from_data(data);
    info!(
        company = data.company.name,
        as_of = data.company.as_of,
        "building dashboard"
    );

    let series_written = match save_series.as_deref() {
        Some(path) => Some(
            progress
                .run(
                    Output::Series,
                    save_series_csv(path, data, &metrics, archive_csv),
                )
                .await?,
        ),
        None => None,
    };

    if let Some(path) = json_path.as_deref() {
        progress.run(Output::Json, save_json(path, data)).await?;
    }

    if let Some(path) = save_html.as_deref() {
        let context = DashboardContext {
            data,
            metrics: &metrics,
            generated_at: &run_started_at,
            downloads: DownloadPaths {
                series: series_written.as_deref(),
                json: json_path.as_deref(),
            },
            output_path: path,
        };
        progress
            .run(
                Output::Dashboard,
                save_html_report(path, &context, !no_minify),
            )
            .await?;
    }

    progress.finish();

    print_summary(&SummaryContext {
        data,
        metrics: &metrics,
        run_started_at: &run_started_at,
        paths: SummaryPaths {
            html: save_html.as_deref(),
            series: series_written.as_deref(),
            json: json_path.as_deref(),
        },
        full_output,
    });

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
