//! Judge prompts and template rendering.
//!
//! The judge sees two messages:
//! 1. [`SYSTEM_PROMPT`] - fixed framing that restricts the reply to one word
//! 2. The rendered [`JUDGMENT_TEMPLATE`] - reference and answer, verbatim
//!
//! Rendering is a single pass over the template. Text substituted into a
//! placeholder is never scanned again, so an answer that itself contains
//! `{expected_answer}` is passed through literally.

use thiserror::Error;

/// Placeholder replaced with the expected reference.
pub const EXPECTED_ANSWER_PLACEHOLDER: &str = "{expected_answer}";

/// Placeholder replaced with the submitter's descriptive answer.
pub const USER_ANSWER_PLACEHOLDER: &str = "{user_answer}";

/// System instruction for every judgment.
pub const SYSTEM_PROMPT: &str = "You are a precise validator. Respond only with 'pass' or 'fail'.";

/// Instruction template for semantic-equivalence judgments.
pub const JUDGMENT_TEMPLATE: &str = r#"
You are a validator that checks if a user's answer matches an expected answer.
Expected answer: "{expected_answer}"
User's answer: "{user_answer}"
Determine if the user's answer is semantically equivalent to or correctly describes the expected answer.
Respond with exactly one word: either "pass" or "fail"
"#;

/// Errors from prompt construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("Prompt template is missing placeholder {0}")]
    MissingPlaceholder(&'static str),
}

/// Check that a template carries both placeholders.
pub fn check_template(template: &str) -> Result<(), PromptError> {
    for placeholder in [EXPECTED_ANSWER_PLACEHOLDER, USER_ANSWER_PLACEHOLDER] {
        if !template.contains(placeholder) {
            return Err(PromptError::MissingPlaceholder(placeholder));
        }
    }
    Ok(())
}

/// Render a judgment template.
pub fn render_judgment(
    template: &str,
    expected_answer: &str,
    user_answer: &str,
) -> Result<String, PromptError> {
    check_template(template)?;

    let mut rendered =
        String::with_capacity(template.len() + expected_answer.len() + user_answer.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(after) = tail.strip_prefix(EXPECTED_ANSWER_PLACEHOLDER) {
            rendered.push_str(expected_answer);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(USER_ANSWER_PLACEHOLDER) {
            rendered.push_str(user_answer);
            rest = after;
        } else {
            rendered.push('{');
            rest = &tail[1..];
        }
    }
    rendered.push_str(rest);

    Ok(rendered)
}
