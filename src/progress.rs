use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// A file the run was asked to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Series,
    Json,
    Dashboard,
}

impl Output {
    const fn label(self) -> &'static str {
        match self {
            Self::Series => "monthly series CSV",
            Self::Json => "data table JSON",
            Self::Dashboard => "dashboard HTML",
        }
    }
}

/// Outputs in the order they are written; the dashboard goes last so it can link the others.
#[must_use]
pub fn plan_outputs(series: bool, json: bool, dashboard: bool) -> Vec<Output> {
    [
        (series, Output::Series),
        (json, Output::Json),
        (dashboard, Output::Dashboard),
    ]
    .into_iter()
    .filter_map(|(requested, output)| requested.then_some(output))
    .collect()
}

/// One spinner line stepping through the planned outputs.
pub struct RunProgress {
    bar: Option<ProgressBar>,
    total: usize,
    completed: usize,
}

impl RunProgress {
    #[must_use]
    pub fn new(plan: &[Output], enabled: bool) -> Self {
        let bar = (enabled && !plan.is_empty()).then(spinner);
        Self {
            bar,
            total: plan.len(),
            completed: 0,
        }
    }

    /// Awaits `fut`, then prints a done/failed line for `output` above the spinner.
    pub async fn run<T>(
        &mut self,
        output: Output,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        self.completed += 1;
        let message = step_message(self.completed, self.total, output);
        let Some(bar) = &self.bar else {
            return fut.await;
        };
        bar.set_message(message.clone());
        let result = fut.await;
        let status = if result.is_ok() {
            "done".green().bold()
        } else {
            "failed".red().bold()
        };
        bar.println(format!("{message} {status}"));
        result
    }

    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

fn spinner() -> ProgressBar {
    let ticks = if is_dumb_term() { "|/-\\ " } else { "◐◓◑◒ " };
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(ticks);
    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr_with_hz(12));
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn is_dumb_term() -> bool {
    std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}

fn step_message(step: usize, total: usize, output: Output) -> String {
    format!(
        "{} {}",
        format!("[{step}/{total}]").yellow(),
        output.label().bold()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn plan_keeps_dashboard_last() {
        assert_eq!(
            plan_outputs(true, true, true),
            vec![Output::Series, Output::Json, Output::Dashboard]
        );
        assert_eq!(plan_outputs(false, true, true), vec![Output::Json, Output::Dashboard]);
        assert!(plan_outputs(false, false, false).is_empty());
    }

    #[test]
    fn step_message_counts_requested_outputs() {
        colored::control::set_override(false);
        assert_eq!(
            step_message(1, 2, Output::Series),
            "[1/2] monthly series CSV"
        );
        assert_eq!(step_message(2, 2, Output::Dashboard), "[2/2] dashboard HTML");
    }

    #[tokio::test]
    async fn passes_results_through_when_disabled() {
        let plan = plan_outputs(true, false, true);
        let mut progress = RunProgress::new(&plan, false);
        let ok = progress.run(Output::Series, async { Ok(7) }).await;
        assert_eq!(ok.ok(), Some(7));
        let err: Result<()> = progress
            .run(Output::Dashboard, async { Err(anyhow!("disk full")) })
            .await;
        assert!(err.is_err());
        assert_eq!(progress.completed, progress.total);
        progress.finish();
    }
}
