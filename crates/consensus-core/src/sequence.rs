//! Deterministic sequence rule.
//!
//! **Question**: Did the submitter answer the two categorical questions in
//! the expected order?
//!
//! This is the gate in front of semantic judgment. It is pure and total:
//! every input maps to a verdict and nothing here can fail.

use crate::types::Outcome;

/// Number of categorical answers a submission must carry.
pub const SEQUENCE_LENGTH: usize = 2;

/// Why a sequence was accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceVerdict {
    /// Both answers match the expected tokens
    Accepted,

    /// The sequence did not have exactly two entries
    WrongLength { actual: usize },

    /// Two entries, but not the expected tokens in order
    WrongSequence,
}

impl SequenceVerdict {
    pub fn outcome(&self) -> Outcome {
        match self {
            SequenceVerdict::Accepted => Outcome::Pass,
            SequenceVerdict::WrongLength { .. } | SequenceVerdict::WrongSequence => Outcome::Fail,
        }
    }
}

/// The sequence rule: exactly `["yes", "no"]`, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct SequenceRule {
    expected: [String; SEQUENCE_LENGTH],
}

impl SequenceRule {
    /// Build a rule for a custom pair of tokens.
    ///
    /// Tokens are stored lower-cased so comparison stays case-insensitive.
    pub fn new(first: &str, second: &str) -> Self {
        Self {
            expected: [first.to_lowercase(), second.to_lowercase()],
        }
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Classify a sequence without logging.
    pub fn verdict<S: AsRef<str>>(&self, answers: &[S]) -> SequenceVerdict {
        if answers.len() != SEQUENCE_LENGTH {
            return SequenceVerdict::WrongLength {
                actual: answers.len(),
            };
        }

        let matches = answers
            .iter()
            .zip(self.expected.iter())
            .all(|(answer, expected)| answer.as_ref().to_lowercase() == *expected);

        if matches {
            SequenceVerdict::Accepted
        } else {
            SequenceVerdict::WrongSequence
        }
    }

    /// Check a sequence and log the rejection reason, if any.
    pub fn check<S: AsRef<str>>(&self, answers: &[S]) -> Outcome {
        let verdict = self.verdict(answers);
        match &verdict {
            SequenceVerdict::Accepted => {}
            SequenceVerdict::WrongLength { actual } => {
                tracing::info!(
                    actual = *actual,
                    expected = SEQUENCE_LENGTH,
                    "Invalid answer sequence length"
                );
            }
            SequenceVerdict::WrongSequence => {
                let received: Vec<&str> = answers.iter().map(AsRef::as_ref).collect();
                tracing::info!(
                    received = ?received,
                    expected = ?self.expected,
                    "Invalid answer sequence"
                );
            }
        }
        verdict.outcome()
    }
}

impl Default for SequenceRule {
    fn default() -> Self {
        Self::new("yes", "no")
    }
}
