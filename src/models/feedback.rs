use serde::Serialize;

pub const EMPTY_FLAG_MESSAGE: &str = "Please enter a flag";
pub const CORRECT_FLAG_MESSAGE: &str = "Correct flag! Challenge completed!";
pub const INCORRECT_FLAG_MESSAGE: &str = "Incorrect flag. Try again!";
pub const ALREADY_SOLVED_MESSAGE: &str = "You've already solved this challenge!";
pub const CHALLENGE_NOT_FOUND_MESSAGE: &str = "Challenge not found";
pub const VERIFIER_UNAVAILABLE_MESSAGE: &str = "Flag verification is unavailable. Try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Success,
    Error,
}

impl FeedbackKind {
    /// CSS class used by the flag feedback element.
    pub fn css_class(self) -> &'static str {
        match self {
            FeedbackKind::Success => "success",
            FeedbackKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Feedback {
            kind: FeedbackKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Feedback {
            kind: FeedbackKind::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == FeedbackKind::Success
    }
}
