//! Conversation state: the transcript, survey progress, and response ingestion.
//!
//! The controller owns an append-only transcript of immutable turns and the
//! survey-side state the service reports (`competency_status`, `level`,
//! `score`, accumulated answers). Raw responses flow through the message core
//! exactly once on their way into the transcript.

use chrono::{DateTime, Local};
use serde_json::Value;
use uuid::Uuid;

use crate::core::message::{self, CompetencyStatus, ImageRef, Payload};

/// Synthesized bot reply when the initial connection fails.
pub const CONNECTION_APOLOGY: &str =
    "Sorry, there was an error connecting to the chat service. Please try again later.";

/// Synthesized bot reply when a message round-trip fails.
pub const PROCESSING_APOLOGY: &str =
    "Sorry, there was an error processing your message. Please try again.";

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry. Immutable once appended; insertion order is display
/// order, and turns are never removed.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl ChatTurn {
    /// Display-formatted time, e.g. "14:05".
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Survey progress as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SurveyPhase {
    #[default]
    NotStarted,
    InProgress,
    Complete {
        level: Option<String>,
        score: Option<String>,
    },
}

/// Per-turn view data derived for display. Purely derived, never stored.
#[derive(Debug, Clone)]
pub struct RenderedTurn {
    pub text: String,
    pub options: Vec<String>,
    pub image: Option<ImageRef>,
}

#[derive(Debug, Default)]
pub struct Conversation {
    transcript: Vec<ChatTurn>,
    answers: Vec<String>,
    phase: SurveyPhase,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn phase(&self) -> &SurveyPhase {
        &self.phase
    }

    /// Ordered answers given so far; the request body carries the full list.
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn push_user(&mut self, text: &str) {
        self.push(Sender::User, text);
    }

    pub fn push_bot(&mut self, text: &str) {
        self.push(Sender::Bot, text);
    }

    fn push(&mut self, sender: Sender, text: &str) {
        let turn = ChatTurn {
            id: Uuid::new_v4(),
            text: text.to_string(),
            sender,
            timestamp: Local::now(),
        };
        log::trace!("append turn {} ({:?})", turn.id, sender);
        self.transcript.push(turn);
    }

    /// Record a user submission as a survey answer. Only applies while the
    /// survey is in progress; outside of it the input is plain chat.
    pub fn record_answer(&mut self, text: &str) {
        if self.phase == SurveyPhase::InProgress {
            self.answers.push(text.to_string());
        }
    }

    /// Fold a raw response into the conversation: update the survey phase
    /// from `competency_status` and append a bot turn when the response
    /// carries displayable prose.
    pub fn ingest_response(&mut self, response: &Value) {
        if let Payload::Survey(survey) = Payload::classify(response) {
            match survey.status {
                CompetencyStatus::InProgress => self.phase = SurveyPhase::InProgress,
                CompetencyStatus::Complete => {
                    self.phase = SurveyPhase::Complete {
                        level: survey.level.map(str::to_string),
                        score: survey.score.map(str::to_string),
                    };
                }
                CompetencyStatus::Unknown => {
                    log::warn!("unrecognized competency_status in response");
                }
            }
        }
        if message::has_displayable_message(response) {
            let text = message::extract_message(response);
            if message::contains_image(&text) {
                log::debug!("bot turn embeds an image reference");
            }
            self.push_bot(&text);
        } else {
            log::debug!("response carried state metadata only, no prose");
        }
    }

    /// Resolve a selected option into the next input value (leading letter,
    /// lower-cased). Invalid selections are logged and rejected with no state
    /// change.
    pub fn resolve_option_selection(&self, option: &str) -> Option<String> {
        match message::option_input_value(option) {
            Some(value) => Some(value),
            None => {
                log::warn!("ignoring invalid option selection: {:?}", option);
                None
            }
        }
    }

    /// Derive display data for a turn. Options are offered only on bot turns
    /// while the survey is in progress; images only on bot turns. Derivations
    /// are total, so rendering can never reject a stored turn.
    pub fn render(&self, turn: &ChatTurn) -> RenderedTurn {
        let is_bot = turn.sender == Sender::Bot;
        let options = if is_bot && self.phase == SurveyPhase::InProgress {
            message::parse_options(&turn.text)
        } else {
            Vec::new()
        };
        let image = if is_bot {
            message::extract_image(&turn.text)
        } else {
            None
        };
        RenderedTurn {
            text: turn.text.clone(),
            options,
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transcript_preserves_order_and_senders() {
        let mut conv = Conversation::new();
        conv.push_user("hello");
        conv.push_bot("hi there");
        let turns = conv.transcript();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].sender, Sender::User);
        assert_eq!(turns[0].text, "hello");
        assert_eq!(turns[1].sender, Sender::Bot);
        assert_ne!(turns[0].id, turns[1].id);
    }

    #[test]
    fn ingest_moves_phase_to_in_progress() {
        let mut conv = Conversation::new();
        conv.ingest_response(&json!({
            "competency_status": "in progress",
            "message": "Q1: pick one\nA. Cat\nB. Dog"
        }));
        assert_eq!(*conv.phase(), SurveyPhase::InProgress);
        let turns = conv.transcript();
        assert_eq!(turns.len(), 1);
        assert!(turns[0].text.contains("Q1"));
    }

    #[test]
    fn ingest_completion_captures_level_and_score() {
        let mut conv = Conversation::new();
        conv.ingest_response(&json!({"competency_status": "in progress", "message": "Q1"}));
        conv.ingest_response(&json!({
            "competency_status": "complete",
            "level": "AI Competent",
            "score": "9/10",
            "message": "Great job!"
        }));
        match conv.phase() {
            SurveyPhase::Complete { level, score } => {
                assert_eq!(level.as_deref(), Some("AI Competent"));
                assert_eq!(score.as_deref(), Some("9/10"));
            }
            other => panic!("expected Complete, got {:?}", other),
        }
        assert_eq!(conv.transcript().len(), 2);
    }

    #[test]
    fn ingest_metadata_only_adds_no_turn() {
        let mut conv = Conversation::new();
        conv.ingest_response(&json!({"competency_status": "in progress"}));
        assert_eq!(*conv.phase(), SurveyPhase::InProgress);
        assert!(conv.transcript().is_empty());
    }

    #[test]
    fn answers_recorded_only_while_in_progress() {
        let mut conv = Conversation::new();
        conv.record_answer("ignored before survey");
        assert!(conv.answers().is_empty());

        conv.ingest_response(&json!({"competency_status": "in progress", "message": "Q1"}));
        conv.record_answer("a");
        conv.record_answer("b");
        assert_eq!(conv.answers(), ["a", "b"]);
    }

    #[test]
    fn option_selection_resolves_or_rejects() {
        let conv = Conversation::new();
        assert_eq!(conv.resolve_option_selection("A. Cat").as_deref(), Some("a"));
        assert_eq!(conv.resolve_option_selection(""), None);
        assert_eq!(conv.resolve_option_selection("not an option"), None);
    }

    #[test]
    fn render_gates_options_on_phase_and_sender() {
        let mut conv = Conversation::new();
        conv.ingest_response(&json!({
            "competency_status": "in progress",
            "message": "Pick:\nA. Cat\nB. Dog"
        }));
        conv.push_user("A. Cat");

        let turns: Vec<ChatTurn> = conv.transcript().to_vec();
        let bot = conv.render(&turns[0]);
        assert_eq!(bot.options, vec!["A. Cat", "B. Dog"]);
        // User turns never offer options
        let user = conv.render(&turns[1]);
        assert!(user.options.is_empty());

        // After completion, options are no longer offered
        conv.ingest_response(&json!({"competency_status": "complete", "message": "done"}));
        let bot_after = conv.render(&turns[0]);
        assert!(bot_after.options.is_empty());
    }

    #[test]
    fn render_splits_image_from_caption() {
        let mut conv = Conversation::new();
        conv.push_bot("Great job! https://drive.google.com/uc?id=XYZ");
        let rendered = conv.render(&conv.transcript()[0]);
        let image = rendered.image.expect("image reference");
        assert_eq!(image.url, "https://drive.google.com/uc?id=XYZ");
        assert_eq!(image.remaining_text, "Great job!");
    }

    #[test]
    fn apology_turn_is_a_bot_turn() {
        let mut conv = Conversation::new();
        conv.push_bot(CONNECTION_APOLOGY);
        assert_eq!(conv.transcript()[0].sender, Sender::Bot);
        assert!(conv.transcript()[0].text.contains("error connecting"));
    }
}
