//! Debounced autosave, driven by explicit timestamps.

use std::time::{Duration, Instant};

use crate::config::AutosaveConfig;

/// Identifies one opened session. Never reused, so work queued for an
/// earlier session can always be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSave {
    token: SessionToken,
    due: Instant,
}

/// Holds at most one pending save. Every mutation pushes it back by the quiet
/// period; a save that comes due for a session that is no longer current is
/// dropped.
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    enabled: bool,
    quiet_period: Duration,
    cooldown: Duration,
    next_token: u64,
    current: Option<SessionToken>,
    pending: Option<PendingSave>,
    cooldown_until: Option<Instant>,
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(&AutosaveConfig::default())
    }
}

impl AutosaveScheduler {
    pub fn new(config: &AutosaveConfig) -> Self {
        Self {
            enabled: config.enabled,
            quiet_period: config.quiet_period(),
            cooldown: config.cooldown(),
            next_token: 1,
            current: None,
            pending: None,
            cooldown_until: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending = None;
        }
    }

    /// Hands out the token for a newly opened session and makes it current.
    pub fn begin_session(&mut self) -> SessionToken {
        let token = SessionToken(self.next_token);
        self.next_token += 1;
        self.current = Some(token);
        token
    }

    pub fn end_session(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<SessionToken> {
        self.current
    }

    /// Records a mutation of the current session at `now`.
    ///
    /// During a cooldown the save is pushed back to the end of it.
    pub fn mark_dirty(&mut self, now: Instant) {
        let Some(token) = self.current.filter(|_| self.enabled) else {
            return;
        };
        let mut due = now + self.quiet_period;
        if let Some(until) = self.cooldown_until {
            due = due.max(until);
        }
        self.pending = Some(PendingSave { token, due });
    }

    /// Cancels pending work and blocks new saves for the cooldown window.
    pub fn start_cooldown(&mut self, now: Instant) {
        self.pending = None;
        self.cooldown_until = Some(now + self.cooldown);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Returns the session to save if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<SessionToken> {
        let pending = self.pending?;
        if now < pending.due {
            return None;
        }
        self.pending = None;
        if Some(pending.token) != self.current {
            log::warn!("Discarding autosave queued for a session that is no longer open");
            return None;
        }
        Some(pending.token)
    }
}
