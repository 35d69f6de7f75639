//! Resend countdowns.
//!
//! Each running countdown is a tokio task that sleeps one second, sends a
//! [`TickEvent`] and reschedules itself until it reaches zero. The task never
//! touches view state: the UI loop drains the events and applies them to the
//! mounted [`Displays`]. Restarting a countdown aborts the previous task and
//! bumps the generation, so ticks that were already queued are dropped.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default time before a code may be resent
pub const DEFAULT_RESEND_SECONDS: u32 = 120;

/// Default text shown after the remaining time
pub const DEFAULT_SUFFIX: &str = "remaining";

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountdownTarget {
    Verify,
    Login,
}

impl CountdownTarget {
    /// Identifier of the display element
    pub fn display_id(self) -> &'static str {
        match self {
            CountdownTarget::Verify => "countdown",
            CountdownTarget::Login => "loginCountdown",
        }
    }

    /// Identifier of the resend control paired with the display
    pub fn resend_id(self) -> &'static str {
        match self {
            CountdownTarget::Verify => "resendCode",
            CountdownTarget::Login => "resendLoginCode",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CountdownError {
    #[error("countdown duration must be positive")]
    InvalidDuration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResendControl {
    pub disabled: bool,
}

/// Text display plus optional resend control for one countdown target
#[derive(Debug, Clone, Default)]
pub struct CountdownView {
    pub text: String,
    pub resend: Option<ResendControl>,
    /// Number of times the display has been rendered since mount
    #[cfg(test)]
    pub renders: usize,
}

impl CountdownView {
    fn render(&mut self, text: String) {
        self.text = text;
        #[cfg(test)]
        {
            self.renders += 1;
        }
    }

    fn set_resend_disabled(&mut self, disabled: bool) {
        if let Some(control) = self.resend.as_mut() {
            control.disabled = disabled;
        }
    }

    /// Whether the resend action is currently allowed
    pub fn resend_enabled(&self) -> bool {
        self.resend.as_ref().map(|c| !c.disabled).unwrap_or(false)
    }
}

/// Views that are currently on screen, keyed by target
#[derive(Debug, Default)]
pub struct Displays {
    views: HashMap<CountdownTarget, CountdownView>,
}

impl Displays {
    pub fn mount(&mut self, target: CountdownTarget, with_resend: bool) {
        let view = CountdownView {
            resend: with_resend.then(ResendControl::default),
            ..Default::default()
        };
        self.views.insert(target, view);
    }

    pub fn unmount(&mut self, target: CountdownTarget) {
        self.views.remove(&target);
    }

    pub fn get(&self, target: CountdownTarget) -> Option<&CountdownView> {
        self.views.get(&target)
    }

    fn get_mut(&mut self, target: CountdownTarget) -> Option<&mut CountdownView> {
        self.views.get_mut(&target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub target: CountdownTarget,
    pub generation: u64,
    pub remaining: u32,
}

struct Running {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owner of all countdown tasks
pub struct Countdowns {
    suffix: String,
    tx: mpsc::UnboundedSender<TickEvent>,
    rx: mpsc::UnboundedReceiver<TickEvent>,
    running: HashMap<CountdownTarget, Running>,
    next_generation: u64,
}

impl Countdowns {
    pub fn new(suffix: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            suffix: suffix.into(),
            tx,
            rx,
            running: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Start (or restart) the countdown bound to `target`.
    ///
    /// Returns `Ok(false)` without doing anything when the target is not
    /// mounted. Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        target: CountdownTarget,
        total_seconds: u32,
        displays: &mut Displays,
    ) -> Result<bool, CountdownError> {
        if total_seconds == 0 {
            return Err(CountdownError::InvalidDuration);
        }
        let Some(view) = displays.get_mut(target) else {
            tracing::debug!("countdown target {} not mounted", target.display_id());
            return Ok(false);
        };

        self.cancel(target);

        view.set_resend_disabled(true);
        view.render(format_remaining(total_seconds, &self.suffix));

        self.next_generation += 1;
        let generation = self.next_generation;
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut remaining = total_seconds;
            while remaining > 0 {
                tokio::time::sleep(TICK).await;
                remaining -= 1;
                let event = TickEvent { target, generation, remaining };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(
            "countdown {} started: {}s, {} disabled (generation {})",
            target.display_id(),
            total_seconds,
            target.resend_id(),
            generation
        );
        self.running.insert(target, Running { generation, handle });
        Ok(true)
    }

    /// Stop the countdown for `target`, if any. The display is left as is.
    pub fn cancel(&mut self, target: CountdownTarget) {
        if let Some(prev) = self.running.remove(&target) {
            prev.handle.abort();
            tracing::debug!(
                "countdown {} cancelled (generation {})",
                target.display_id(),
                prev.generation
            );
        }
    }

    pub fn is_running(&self, target: CountdownTarget) -> bool {
        self.running.contains_key(&target)
    }

    /// Apply one tick to the displays. Stale ticks are ignored and return false.
    pub fn apply(&mut self, event: TickEvent, displays: &mut Displays) -> bool {
        match self.running.get(&event.target) {
            Some(r) if r.generation == event.generation => {}
            _ => return false,
        }

        if event.remaining == 0 {
            self.running.remove(&event.target);
        }

        let Some(view) = displays.get_mut(event.target) else {
            return false;
        };
        if event.remaining > 0 {
            view.render(format_remaining(event.remaining, &self.suffix));
        } else {
            view.render(String::new());
            view.set_resend_disabled(false);
        }
        true
    }

    /// Apply every tick that has already arrived. Returns how many were applied.
    pub fn drain(&mut self, displays: &mut Displays) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            if self.apply(event, displays) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next tick from any countdown
    #[cfg(test)]
    pub async fn next_event(&mut self) -> Option<TickEvent> {
        self.rx.recv().await
    }
}

impl Drop for Countdowns {
    fn drop(&mut self) {
        for (_, running) in self.running.drain() {
            running.handle.abort();
        }
    }
}

/// Render remaining time as `M:SS <suffix>`
pub fn format_remaining(seconds: u32, suffix: &str) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    if suffix.is_empty() {
        format!("{}:{:02}", minutes, secs)
    } else {
        format!("{}:{:02} {}", minutes, secs, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted(target: CountdownTarget) -> Displays {
        let mut displays = Displays::default();
        displays.mount(target, true);
        displays
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(120, "remaining"), "2:00 remaining");
        assert_eq!(format_remaining(65, "left"), "1:05 left");
        assert_eq!(format_remaining(9, ""), "0:09");
    }

    #[tokio::test]
    async fn test_zero_duration_rejected() {
        let mut countdowns = Countdowns::new(DEFAULT_SUFFIX);
        let mut displays = mounted(CountdownTarget::Verify);
        assert_eq!(
            countdowns.start(CountdownTarget::Verify, 0, &mut displays),
            Err(CountdownError::InvalidDuration)
        );
        assert!(!countdowns.is_running(CountdownTarget::Verify));
    }

    #[tokio::test]
    async fn test_missing_target_is_noop() {
        let mut countdowns = Countdowns::new(DEFAULT_SUFFIX);
        let mut displays = Displays::default();
        assert_eq!(countdowns.start(CountdownTarget::Login, 5, &mut displays), Ok(false));
        assert!(!countdowns.is_running(CountdownTarget::Login));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_runs_to_completion() {
        let target = CountdownTarget::Verify;
        let mut countdowns = Countdowns::new("remaining");
        let mut displays = mounted(target);

        assert_eq!(countdowns.start(target, 3, &mut displays), Ok(true));
        let view = displays.get(target).unwrap();
        assert_eq!(view.text, "0:03 remaining");
        assert!(!view.resend_enabled());

        let mut seen = Vec::new();
        while countdowns.is_running(target) {
            let event = countdowns.next_event().await.unwrap();
            assert!(countdowns.apply(event, &mut displays));
            seen.push(displays.get(target).unwrap().text.clone());
        }

        assert_eq!(seen, vec!["0:02 remaining", "0:01 remaining", ""]);
        let view = displays.get(target).unwrap();
        assert_eq!(view.renders, 4);
        assert!(view.text.is_empty());
        assert!(view.resend_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_supersedes_previous_countdown() {
        let target = CountdownTarget::Login;
        let mut countdowns = Countdowns::new("remaining");
        let mut displays = mounted(target);

        countdowns.start(target, 5, &mut displays).unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        // Two ticks from the first run are queued but not yet applied
        countdowns.start(target, 5, &mut displays).unwrap();
        assert_eq!(displays.get(target).unwrap().text, "0:05 remaining");

        let mut remaining = Vec::new();
        let mut stale = 0;
        while countdowns.is_running(target) {
            let event = countdowns.next_event().await.unwrap();
            if countdowns.apply(event, &mut displays) {
                remaining.push(event.remaining);
            } else {
                stale += 1;
            }
        }

        assert_eq!(stale, 2);
        assert_eq!(remaining, vec![4, 3, 2, 1, 0]);
        assert!(displays.get(target).unwrap().resend_enabled());

        // Nothing else is ticking once the restarted countdown ends
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(countdowns.drain(&mut displays), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let target = CountdownTarget::Verify;
        let mut countdowns = Countdowns::new("remaining");
        let mut displays = mounted(target);

        countdowns.start(target, 10, &mut displays).unwrap();
        countdowns.cancel(target);
        tokio::time::sleep(Duration::from_secs(12)).await;

        assert_eq!(countdowns.drain(&mut displays), 0);
        assert_eq!(displays.get(target).unwrap().text, "0:10 remaining");
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_without_resend_control() {
        let target = CountdownTarget::Verify;
        let mut countdowns = Countdowns::new("");
        let mut displays = Displays::default();
        displays.mount(target, false);

        countdowns.start(target, 1, &mut displays).unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(countdowns.drain(&mut displays), 1);

        // Initial render plus the final tick
        let view = displays.get(target).unwrap();
        assert_eq!(view.renders, 2);
        assert!(view.text.is_empty());
        assert!(view.resend.is_none());
        assert!(!view.resend_enabled());
    }
}
