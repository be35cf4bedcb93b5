//! Core data types for answer validation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in ground truth used when no reference is configured.
pub const DEFAULT_EXPECTED_REFERENCE: &str = "A black BMW car convertible with orange seat covers";

/// The binary result of validating a submission.
///
/// Both the deterministic gate and the semantic judgment collapse into this
/// type; there is no third state visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    /// Parse an already-normalized token. Only exact `pass` / `fail` match.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "pass" => Some(Outcome::Pass),
            "fail" => Some(Outcome::Fail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured answer submission.
///
/// Wire names follow the public API (`answerType`, `answer`); the
/// descriptive names are accepted as aliases. The sequence is decoded at any
/// length so that a wrong length is a `fail` outcome rather than a decode
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Ordered categorical answers, expected to be `["yes", "no"]`
    #[serde(rename = "answerType", alias = "sequenceAnswers")]
    pub sequence_answers: Vec<String>,

    /// Free-text answer compared against the expected reference
    #[serde(rename = "answer", alias = "descriptiveAnswer")]
    pub descriptive_answer: String,
}

impl Submission {
    pub fn new<I, S>(sequence_answers: I, descriptive_answer: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sequence_answers: sequence_answers.into_iter().map(Into::into).collect(),
            descriptive_answer: descriptive_answer.into(),
        }
    }
}

/// Ground-truth description the descriptive answer is judged against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedReference(String);

impl ExpectedReference {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ExpectedReference {
    fn default() -> Self {
        Self::new(DEFAULT_EXPECTED_REFERENCE)
    }
}

impl fmt::Display for ExpectedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response body returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub result: Outcome,
}

impl From<Outcome> for ValidationResponse {
    fn from(result: Outcome) -> Self {
        Self { result }
    }
}
