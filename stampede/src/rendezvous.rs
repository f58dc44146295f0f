//! Two-phase start rendezvous: a counting wait-group for "ready" reports
//! and a one-shot broadcast latch for the release signal. No worker's
//! measured window starts before the latch fires, and a late arrival
//! observes an already-fired latch without re-waiting.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Roster {
    arrived: usize,
    withdrawn: usize,
}

pub(crate) struct StartCoordinator {
    expected: usize,
    roster: watch::Sender<Roster>,
    release: watch::Sender<bool>,
}

/// Per-worker side of the rendezvous.
pub(crate) struct RendezvousHandle {
    roster: watch::Sender<Roster>,
    release: watch::Receiver<bool>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ReleaseOutcome {
    /// The instant the latch fired; start of the measured window.
    pub released_at: Instant,
    pub ready: usize,
    pub withdrawn: usize,
    pub timed_out: bool,
}

impl StartCoordinator {
    pub fn new(expected: usize) -> Self {
        let (roster, _) = watch::channel(Roster::default());
        let (release, _) = watch::channel(false);
        Self {
            expected,
            roster,
            release,
        }
    }

    pub fn handle(&self) -> RendezvousHandle {
        RendezvousHandle {
            roster: self.roster.clone(),
            release: self.release.subscribe(),
        }
    }

    /// Wait until every expected worker has either arrived or withdrawn,
    /// bounded by `ready_timeout`, then fire the latch exactly once.
    ///
    /// On timeout the latch fires anyway and the run proceeds with the
    /// subset that is ready; absent workers have already recorded their
    /// zero-contribution failures.
    pub async fn release_when_ready(&self, ready_timeout: Duration) -> ReleaseOutcome {
        let mut roster_rx = self.roster.subscribe();
        let expected = self.expected;
        let accounted =
            roster_rx.wait_for(|roster| roster.arrived + roster.withdrawn >= expected);

        let timed_out = tokio::time::timeout(ready_timeout, accounted)
            .await
            .is_err();

        let roster = *self.roster.borrow();
        if timed_out {
            warn!(
                "rendezvous timed out after {:?}: {}/{} ready, {} withdrawn",
                ready_timeout, roster.arrived, expected, roster.withdrawn
            );
        }

        let released_at = Instant::now();
        self.release.send_replace(true);

        ReleaseOutcome {
            released_at,
            ready: roster.arrived,
            withdrawn: roster.withdrawn,
            timed_out,
        }
    }
}

impl RendezvousHandle {
    /// Phase one and two: report ready, then park until the release latch
    /// fires. Returns immediately if it already has.
    pub async fn arrive(mut self) {
        self.roster.send_modify(|roster| roster.arrived += 1);
        // An error here means the coordinator is gone; the run is being
        // torn down and there is nothing left to wait for.
        let _ = self.release.wait_for(|released| *released).await;
    }

    /// A worker whose setup failed steps out of the rendezvous so the rest
    /// of the field is released without waiting out the ready timeout.
    pub fn withdraw(self) {
        self.roster.send_modify(|roster| roster.withdrawn += 1);
    }
}
