//! User-facing degradation messaging for session errors.
//!
//! During a run of recoverable errors the agent speaks a short holding
//! message at most once; a terminal error always gets its own spoken apology
//! and starts a fresh episode. Recovery and retry are the backend's concern —
//! this module only decides what, if anything, to say.

use crate::agent::{SessionErrorEvent, SessionHandle};
use tokio::sync::Mutex;

/// Spoken once per episode while the pipeline is degraded but recovering.
pub const HOLDING_MESSAGE: &str = "Hang on a sec.";
/// Spoken on every terminal failure.
pub const FAILURE_MESSAGE: &str = "Sorry, I can't answer that right now.";

/// What the controller decided to say for one error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    Holding,
    Silent,
    Failure,
}

impl Announcement {
    #[must_use]
    pub const fn text(self) -> Option<&'static str> {
        match self {
            Self::Holding => Some(HOLDING_MESSAGE),
            Self::Silent => None,
            Self::Failure => Some(FAILURE_MESSAGE),
        }
    }
}

/// Tracks one session's error episode.
///
/// An episode is a run of recoverable errors; it ends at the next terminal
/// error. The tracker holds a single flag: whether the holding message has
/// already been spoken this episode.
#[derive(Debug, Default)]
pub struct EpisodeTracker {
    holding_spoken: bool,
}

impl EpisodeTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            holding_spoken: false,
        }
    }

    /// Record one error and decide what to announce.
    pub const fn observe(&mut self, recoverable: bool) -> Announcement {
        if recoverable {
            if self.holding_spoken {
                Announcement::Silent
            } else {
                self.holding_spoken = true;
                Announcement::Holding
            }
        } else {
            // The terminal apology ends the episode; the next recoverable
            // error may speak the holding message again.
            self.holding_spoken = false;
            Announcement::Failure
        }
    }
}

/// Session error handler that logs every error and speaks the episode's
/// degradation messages.
///
/// Handlers are invoked serially by the session loop, but the flag update is
/// guarded anyway so overlapping delivery cannot double-speak an episode.
#[derive(Debug, Default)]
pub struct SpokenRecovery {
    tracker: Mutex<EpisodeTracker>,
}

impl SpokenRecovery {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tracker: Mutex::const_new(EpisodeTracker::new()),
        }
    }

    /// Handle one session error: log it, then speak at most one message.
    ///
    /// Speech is fire-and-forget; a failed enqueue is logged and dropped.
    pub async fn handle(&self, session: &SessionHandle, event: SessionErrorEvent) {
        let SessionErrorEvent { error, source } = event;
        tracing::error!(
            recoverable = error.recoverable,
            source = %source,
            error = %error,
            "session error"
        );

        let announcement = self.tracker.lock().await.observe(error.recoverable);
        if let Some(text) = announcement.text() {
            if let Err(err) = session.say(text).await {
                tracing::warn!(%err, "failed to enqueue recovery message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spoken(tracker: &mut EpisodeTracker, events: &[bool]) -> Vec<Option<&'static str>> {
        events
            .iter()
            .map(|&recoverable| tracker.observe(recoverable).text())
            .collect()
    }

    #[test]
    fn recoverable_run_speaks_once() {
        let mut tracker = EpisodeTracker::new();
        let announcements = spoken(&mut tracker, &[true, true, true]);
        assert_eq!(
            announcements,
            vec![Some(HOLDING_MESSAGE), None, None]
        );
    }

    #[test]
    fn terminal_error_always_speaks_and_resets() {
        let mut tracker = EpisodeTracker::new();
        let announcements = spoken(&mut tracker, &[true, false, true]);
        assert_eq!(
            announcements,
            vec![
                Some(HOLDING_MESSAGE),
                Some(FAILURE_MESSAGE),
                Some(HOLDING_MESSAGE)
            ]
        );
    }

    #[test]
    fn lone_terminal_error_leaves_flag_clear() {
        let mut tracker = EpisodeTracker::new();
        assert_eq!(tracker.observe(false), Announcement::Failure);
        assert!(!tracker.holding_spoken);
    }

    #[test]
    fn consecutive_terminal_errors_each_speak() {
        let mut tracker = EpisodeTracker::new();
        let announcements = spoken(&mut tracker, &[false, false]);
        assert_eq!(
            announcements,
            vec![Some(FAILURE_MESSAGE), Some(FAILURE_MESSAGE)]
        );
    }
}
