//! Progress bar and summary reporting for CLI downloads.

use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    DownloadProgress, Error, FetchedDocument, Route, RunOutcome, format_bytes, format_duration,
    layout,
};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Drives a single indicatif bar bound to (completed, total) documents.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Starts as a spinner: the total is unknown until routes are resolved.
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}").expect("spinner template is valid"),
        );
        bar.set_message("Looking up routes...");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Removes the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadProgress for BarProgress {
    fn on_routes_resolved(&self, routes: usize, documents: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:40.green/white}] {pos}/{len} documents - {msg}",
            )
            .expect("progress template is valid")
            .progress_chars("━━╌"),
        );
        self.bar.set_length(documents as u64);
        self.bar.set_position(0);
        self.bar
            .println(format!("Found {routes} route(s) with {documents} document(s)"));
    }

    fn on_route_start(&self, route: &Route, _dir: &Path) {
        self.bar.set_message(layout::route_label(route));
    }

    fn on_document_complete(&self, document: &FetchedDocument) {
        self.bar.println(format!(
            "  {} ({})",
            document.path.display(),
            format_bytes(document.bytes)
        ));
    }

    fn on_progress(&self, completed: usize, _total: usize) {
        self.bar.set_position(completed as u64);
    }

    fn on_error(&self, error: &Error) {
        self.bar.abandon_with_message(format!("failed: {error}"));
    }
}

/// Prints a summary of how a run ended.
pub fn print_summary(outcome: &RunOutcome) {
    let stats = outcome.stats();

    println!("\n{SEPARATOR}");
    match outcome {
        RunOutcome::Completed(_) => println!("{}", style("Download complete").green().bold()),
        RunOutcome::Cancelled(_) => println!("{}", style("Download cancelled").yellow().bold()),
        RunOutcome::Failed { error, .. } => {
            println!("{} {error}", style("Download failed:").red().bold());
        }
    }
    println!("{SEPARATOR}");
    println!("  Routes finished:   {}", stats.routes_completed);
    println!("  Documents:         {}", stats.documents);
    println!("  Total size:        {}", format_bytes(stats.total_bytes));
    println!("  Total time:        {}", format_duration(stats.elapsed));
    if stats.documents > 0 {
        println!(
            "  Average speed:     {}/s",
            format_bytes(stats.average_speed())
        );
    }
    println!("{SEPARATOR}");
}
