//! Response simulator — canned replies standing in for an inference backend.
//!
//! Reply policy, matched case-insensitively against the user text, first
//! match wins:
//! 1. contains "hello" or "hi" → greeting
//! 2. contains "help" → capability description
//! 3. otherwise → one of six acknowledgements plus the demo disclaimer
//!
//! The random source is a type parameter so tests can pin it with a seeded
//! `StdRng`.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const GREETING_REPLY: &str = "Hello there! It's great to meet you. What would you like to chat about?";

pub const HELP_REPLY: &str = "I'm Veritas Query, designed to help you discover truth and insights! I can assist with research, data analysis, fact-checking, answering complex questions, or exploring topics in depth. What kind of inquiry can I help you with?";

pub const ACKNOWLEDGEMENTS: [&str; 6] = [
    "That's an interesting question! Let me think about that...",
    "I understand what you're asking. Here's my perspective on that topic...",
    "Great point! I'd be happy to help you with that.",
    "That's a thoughtful question. Based on what I know...",
    "I see what you mean. Let me provide some insights on that...",
    "Thanks for asking! Here's what I think about that...",
];

pub const DEMO_DISCLAIMER: &str = "This is a demo response to show how the chat interface works. In a real implementation, this would connect to an actual AI service.";

pub const DEFAULT_MIN_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 3000;

// =============================================================================
// DELAY
// =============================================================================

/// Half-open range `[min_ms, max_ms)` of simulated thinking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for ReplyDelay {
    fn default() -> Self {
        Self { min_ms: DEFAULT_MIN_DELAY_MS, max_ms: DEFAULT_MAX_DELAY_MS }
    }
}

// =============================================================================
// SIMULATOR
// =============================================================================

pub struct ResponseSimulator<R = StdRng> {
    rng: R,
    delay: ReplyDelay,
}

impl ResponseSimulator<StdRng> {
    /// Simulator backed by an OS-seeded generator.
    #[must_use]
    pub fn new(delay: ReplyDelay) -> Self {
        Self::with_rng(StdRng::from_os_rng(), delay)
    }

    /// Simulator with a fixed seed; identical seeds give identical replies.
    #[cfg(test)]
    #[must_use]
    pub fn seeded(seed: u64, delay: ReplyDelay) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), delay)
    }
}

impl<R: Rng> ResponseSimulator<R> {
    pub fn with_rng(rng: R, delay: ReplyDelay) -> Self {
        Self { rng, delay }
    }

    /// Pick the reply for `user_text`.
    pub fn generate(&mut self, user_text: &str) -> String {
        match classify(user_text) {
            ReplyKind::Greeting => GREETING_REPLY.to_string(),
            ReplyKind::Help => HELP_REPLY.to_string(),
            ReplyKind::Generic => {
                let ack = ACKNOWLEDGEMENTS[self.rng.random_range(0..ACKNOWLEDGEMENTS.len())];
                format!("{ack} {DEMO_DISCLAIMER}")
            }
        }
    }

    /// Draw the thinking time for the next reply.
    pub fn schedule_delay(&mut self) -> Duration {
        let ReplyDelay { min_ms, max_ms } = self.delay;
        if max_ms <= min_ms {
            return Duration::from_millis(min_ms);
        }
        Duration::from_millis(self.rng.random_range(min_ms..max_ms))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyKind {
    Greeting,
    Help,
    Generic,
}

fn classify(user_text: &str) -> ReplyKind {
    let lower = user_text.to_lowercase();
    if lower.contains("hello") || lower.contains("hi") {
        ReplyKind::Greeting
    } else if lower.contains("help") {
        ReplyKind::Help
    } else {
        ReplyKind::Generic
    }
}

#[cfg(test)]
#[path = "simulator_test.rs"]
mod tests;
