//! Toast messages shown in the corner of the screen.
//! Each one stays for five seconds, slides out for 300 ms, then disappears.

use std::time::Duration;
use tokio::time::Instant;

/// How long a message stays fully visible
pub const MESSAGE_LIFETIME: Duration = Duration::from_secs(5);

/// Length of the slide-out phase after the lifetime ends
pub const SLIDE_OUT: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl MessageKind {
    pub fn icon(self) -> &'static str {
        match self {
            MessageKind::Success => "✅",
            MessageKind::Error => "❌",
            MessageKind::Warning => "⚠️",
            MessageKind::Info => "ℹ️",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
    pub shown_at: Instant,
}

impl Message {
    /// True once the message has started sliding out
    pub fn is_leaving(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= MESSAGE_LIFETIME
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= MESSAGE_LIFETIME + SLIDE_OUT
    }
}

#[derive(Debug, Default)]
pub struct Messages {
    items: Vec<Message>,
}

impl Messages {
    pub fn show(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.show_at(text, kind, Instant::now());
    }

    fn show_at(&mut self, text: impl Into<String>, kind: MessageKind, now: Instant) {
        let text = text.into();
        match kind {
            MessageKind::Error => tracing::warn!("{}", text),
            _ => tracing::info!("{}", text),
        }
        self.items.push(Message { text, kind, shown_at: now });
    }

    /// Drop messages whose slide-out has finished
    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|m| !m.is_expired(now));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.items.iter()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Message> {
        self.items.last()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_lifecycle() {
        let start = Instant::now();
        let mut messages = Messages::default();
        messages.show_at("Code resent!", MessageKind::Success, start);

        let msg = messages.last().unwrap();
        assert_eq!(msg.kind.icon(), "✅");
        assert!(!msg.is_leaving(start + Duration::from_secs(4)));
        assert!(msg.is_leaving(start + Duration::from_millis(5100)));

        messages.expire(start + Duration::from_millis(5200));
        assert!(!messages.is_empty());

        messages.expire(start + Duration::from_millis(5300));
        assert!(messages.is_empty());
    }

    #[test]
    fn test_default_kind_is_info() {
        assert_eq!(MessageKind::default().icon(), "ℹ️");
    }
}
