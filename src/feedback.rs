// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Spoken and textual feedback to the subject.
//!
//! Messages come in two classes. Status messages (rule corrections, the welcome,
//! the terminal notice) are dropped by the sequencer while the sink is still
//! delivering a previous message, so corrections never pile up. Urgent messages
//! (countdown numbers and stage transitions) are always delivered and cut off
//! whatever is playing.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// Delivery class of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Skipped while the sink is busy.
    Status,
    /// Always delivered, preempting queued speech.
    Urgent,
}

impl Priority {
    /// Returns the string representation of the priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One message for the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    pub priority: Priority,
    /// When the sequencer emitted the message.
    pub at: Instant,
}

impl Feedback {
    #[must_use]
    pub fn status(message: impl Into<String>, at: Instant) -> Self {
        Self {
            message: message.into(),
            priority: Priority::Status,
            at,
        }
    }

    #[must_use]
    pub fn urgent(message: impl Into<String>, at: Instant) -> Self {
        Self {
            message: message.into(),
            priority: Priority::Urgent,
            at,
        }
    }

    #[must_use]
    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::Urgent
    }
}

/// Destination for subject feedback, typically a text-to-speech engine.
pub trait FeedbackSink {
    /// Deliver one message.
    fn deliver(&mut self, feedback: Feedback);

    /// Whether a previous message is still being delivered at `now`.
    fn is_busy(&self, _now: Instant) -> bool {
        false
    }
}

impl<T: FeedbackSink + ?Sized> FeedbackSink for Box<T> {
    fn deliver(&mut self, feedback: Feedback) {
        (**self).deliver(feedback);
    }

    fn is_busy(&self, now: Instant) -> bool {
        (**self).is_busy(now)
    }
}

/// Estimates how long speech output stays busy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechPacer {
    words_per_minute: f64,
    busy_until: Option<Instant>,
}

impl Default for SpeechPacer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WORDS_PER_MINUTE)
    }
}

impl SpeechPacer {
    /// Typical synthesized speech rate.
    pub const DEFAULT_WORDS_PER_MINUTE: f64 = 150.0;

    /// Longest time a single message keeps the pacer busy.
    pub const MAX_UTTERANCE: Duration = Duration::from_secs(3600);

    /// Create a pacer speaking at `words_per_minute`.
    #[must_use]
    pub const fn new(words_per_minute: f64) -> Self {
        Self {
            words_per_minute,
            busy_until: None,
        }
    }

    /// Time needed to speak `message`, capped at [`Self::MAX_UTTERANCE`].
    #[must_use]
    pub fn duration_of(&self, message: &str) -> Duration {
        if self.words_per_minute <= 0.0 || !self.words_per_minute.is_finite() {
            return Duration::ZERO;
        }
        #[allow(clippy::cast_precision_loss)]
        let words = message.split_whitespace().count() as f64;
        Duration::try_from_secs_f64(words * 60.0 / self.words_per_minute)
            .map_or(Self::MAX_UTTERANCE, |d| d.min(Self::MAX_UTTERANCE))
    }

    /// Whether speech is still playing at `now`.
    #[must_use]
    pub fn is_busy(&self, now: Instant) -> bool {
        self.busy_until.is_some_and(|until| now < until)
    }

    /// Account for a delivered message and return when it finishes.
    ///
    /// Urgent messages flush the queue and start immediately; status messages
    /// start after whatever is already playing.
    pub fn speak(&mut self, feedback: &Feedback) -> Instant {
        let start = match (feedback.priority, self.busy_until) {
            (Priority::Status, Some(until)) if until > feedback.at => until,
            _ => feedback.at,
        };
        let end = start + self.duration_of(&feedback.message);
        self.busy_until = Some(end);
        end
    }
}

/// Prints feedback to the console.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink {
    pacer: SpeechPacer,
}

impl ConsoleSink {
    #[must_use]
    pub const fn new(pacer: SpeechPacer) -> Self {
        Self { pacer }
    }
}

impl FeedbackSink for ConsoleSink {
    fn deliver(&mut self, feedback: Feedback) {
        use colored::Colorize;

        self.pacer.speak(&feedback);
        match feedback.priority {
            Priority::Urgent => println!("{} {}", "🔊".cyan(), feedback.message.bold()),
            Priority::Status => println!("{} {}", "💬".dimmed(), feedback.message),
        }
    }

    fn is_busy(&self, now: Instant) -> bool {
        self.pacer.is_busy(now)
    }
}

/// Records every delivered message.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    deliveries: Vec<Feedback>,
    pacer: Option<SpeechPacer>,
}

impl MemorySink {
    /// A sink that is never busy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that reports itself busy while `pacer` says speech is playing.
    #[must_use]
    pub const fn paced(pacer: SpeechPacer) -> Self {
        Self {
            deliveries: Vec::new(),
            pacer: Some(pacer),
        }
    }

    /// Delivered messages, oldest first.
    #[must_use]
    pub fn deliveries(&self) -> &[Feedback] {
        &self.deliveries
    }

    /// Delivered message texts, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.deliveries.iter().map(|f| f.message.as_str()).collect()
    }

    /// Remove and return everything delivered so far.
    pub fn take(&mut self) -> Vec<Feedback> {
        std::mem::take(&mut self.deliveries)
    }
}

impl FeedbackSink for MemorySink {
    fn deliver(&mut self, feedback: Feedback) {
        if let Some(pacer) = self.pacer.as_mut() {
            pacer.speak(&feedback);
        }
        self.deliveries.push(feedback);
    }

    fn is_busy(&self, now: Instant) -> bool {
        self.pacer.is_some_and(|pacer| pacer.is_busy(now))
    }
}
