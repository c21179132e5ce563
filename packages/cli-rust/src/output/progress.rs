//! Progress bar fed by probe batch events
//!
//! The batch sends [`ProbeEvent`]s into a channel; a single task drains it
//! and owns the progress bar, so the status line is only ever touched from
//! one place.

use indicatif::{ProgressBar, ProgressStyle};
use sshconfig_core::{ProbeEvent, ProbeSink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Outcome counts of a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeTally {
    pub ok: usize,
    pub failed: usize,
}

/// Drains probe events into a progress bar
///
/// In quiet mode events are still counted but nothing is drawn.
pub struct ProbeProgress {
    sink: ProbeSink,
    drain: JoinHandle<ProbeTally>,
}

impl ProbeProgress {
    /// Start draining events; must be called inside a tokio runtime
    pub fn start(label: &str, quiet: bool) -> Self {
        let (sink, rx) = mpsc::unbounded_channel();
        let bar = (!quiet).then(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} {prefix} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}",
                )
                .expect("invalid progress template")
                .progress_chars("=> "),
            );
            bar.set_prefix(label.to_string());
            bar
        });
        let drain = tokio::spawn(drain_events(rx, bar));
        Self { sink, drain }
    }

    /// Sender to hand to the batch
    pub fn sink(&self) -> &ProbeSink {
        &self.sink
    }

    /// Close the channel and wait for the remaining events
    pub async fn finish(self) -> ProbeTally {
        drop(self.sink);
        self.drain.await.unwrap_or_default()
    }
}

async fn drain_events(
    mut rx: mpsc::UnboundedReceiver<ProbeEvent>,
    bar: Option<ProgressBar>,
) -> ProbeTally {
    let mut tally = ProbeTally::default();

    while let Some(event) = rx.recv().await {
        let message = match event {
            ProbeEvent::Started { total } => {
                if let Some(bar) = &bar {
                    bar.set_length(total as u64);
                }
                continue;
            }
            ProbeEvent::Discovered { input, ips } => {
                tally.ok += 1;
                let ips: Vec<String> = ips.iter().map(ToString::to_string).collect();
                format!("{input} -> [{}]", ips.join(", "))
            }
            ProbeEvent::Unresolved { input, reason } => {
                tally.failed += 1;
                format!("{input}: {reason}")
            }
            ProbeEvent::Reachable { name, banner } => {
                tally.ok += 1;
                format!("{name} -> {banner}")
            }
            ProbeEvent::Unreachable { name, reason } => {
                tally.failed += 1;
                format!("{name}: {reason}")
            }
        };

        if let Some(bar) = &bar {
            bar.inc(1);
            bar.set_message(message);
        }
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn progress_counts_outcomes() {
        let progress = ProbeProgress::start("Probing", true);
        let sink = progress.sink().clone();
        sink.send(ProbeEvent::Started { total: 3 }).unwrap();
        sink.send(ProbeEvent::Reachable {
            name: "a".into(),
            banner: "SSH-2.0-x".into(),
        })
        .unwrap();
        sink.send(ProbeEvent::Unreachable {
            name: "b".into(),
            reason: "timed out".into(),
        })
        .unwrap();
        sink.send(ProbeEvent::Discovered {
            input: "c".into(),
            ips: vec!["10.0.0.3".parse().unwrap()],
        })
        .unwrap();
        drop(sink);

        let tally = progress.finish().await;
        assert_eq!(tally, ProbeTally { ok: 2, failed: 1 });
    }

    #[tokio::test]
    async fn progress_with_bar_does_not_panic() {
        let progress = ProbeProgress::start("Probing", false);
        progress
            .sink()
            .send(ProbeEvent::Unresolved {
                input: "nowhere".into(),
                reason: "no addresses".into(),
            })
            .unwrap();
        let tally = progress.finish().await;
        assert_eq!(tally.failed, 1);
    }
}
