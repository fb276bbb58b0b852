//! Progress UI (byte bar) for download runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bookdl::ProgressCounters;
use indicatif::{ProgressBar, ProgressStyle};

/// Spawns the progress UI (aggregate byte bar) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_bar` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_bar: bool,
    counters: Arc<ProgressCounters>,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_bar {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_bar_inner(counters, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_bar_inner(
    counters: Arc<ProgressCounters>,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(100));

        let mut styled = false;
        while !stop.load(Ordering::SeqCst) {
            let (transferred, total) = counters.snapshot();
            if total > 0 {
                // Total grows as each resource's size becomes known; keep the
                // bar length in step so the percentage stays meaningful.
                if !styled {
                    bar.set_style(
                        ProgressStyle::with_template(
                            "{bytes}/{total_bytes} [{bar:40}] {percent}%",
                        )
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                    );
                    styled = true;
                }
                bar.set_length(total);
                bar.set_position(transferred.min(total));
            } else {
                // No declared sizes yet; only absolute bytes are meaningful.
                bar.set_message(format!("{transferred} bytes downloaded"));
            }
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        bar.finish_and_clear();
    })
}
