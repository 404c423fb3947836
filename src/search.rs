//! Search-box debouncing on the presentation side.
//!
//! Keystrokes are fed in with their timestamps; the settled term only changes
//! once input has been quiet for the configured delay. A newer keystroke
//! supersedes any pending one. Time is passed in, never read here.

use crate::model::Timestamp;

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    pending: Option<(String, Timestamp)>,
    settled: String,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
            settled: String::new(),
        }
    }

    /// Record raw input at `at_ms`; replaces whatever was pending.
    pub fn input(&mut self, term: impl Into<String>, at_ms: Timestamp) {
        self.pending = Some((term.into(), at_ms));
    }

    /// Promote the pending term if the quiet period has elapsed and return
    /// the settled term.
    pub fn poll(&mut self, now_ms: Timestamp) -> &str {
        let ready = matches!(&self.pending, Some((_, at)) if now_ms.saturating_sub(*at) >= self.delay_ms);
        if ready {
            if let Some((term, _)) = self.pending.take() {
                self.settled = term;
            }
        }
        &self.settled
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop pending input and settle on the empty term ("clear filters").
    pub fn clear(&mut self) {
        self.pending = None;
        self.settled.clear();
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(300)
    }
}
