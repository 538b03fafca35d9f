//! Per-field answer validation.
//!
//! Every `FieldKind` except `Other` has a local rule. `Other` is judged by the
//! classifier: the answer is accepted when the top label equals the accept label.

use regex::Regex;
use std::sync::LazyLock;

use crate::classifier::{Classifier, ClassifierError};
use crate::models::FieldKind;

/// One digit, optionally followed by a point and one or two digits. "10" does not match.
static CGPA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9](\.[0-9]{1,2})?$").expect("valid cgpa pattern"));

static SKILLS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z, ]+$").expect("valid skills pattern"));

const GENDERS: [&str; 3] = ["male", "female", "other"];

/// Apply the local rule for `kind`. Returns `None` for `FieldKind::Other`,
/// which has no local rule.
pub fn validate_rule(answer: &str, kind: FieldKind) -> Option<bool> {
    let accepted = match kind {
        FieldKind::Age => digits_in_range(answer, 18, 100),
        FieldKind::Gender => GENDERS.contains(&answer.to_lowercase().as_str()),
        FieldKind::College | FieldKind::Name => is_letters_and_spaces(answer),
        FieldKind::Cgpa => {
            CGPA_PATTERN.is_match(answer)
                && answer
                    .parse::<f64>()
                    .map(|v| (0.0..=10.0).contains(&v))
                    .unwrap_or(false)
        }
        FieldKind::Experience => is_digits(answer),
        FieldKind::Year => digits_in_range(answer, 1, 4),
        FieldKind::Skills => SKILLS_PATTERN.is_match(answer),
        FieldKind::Reason => answer.trim().chars().count() > 5,
        FieldKind::Other => return None,
    };
    Some(accepted)
}

/// Validate an answer, calling the classifier for free-text fields.
///
/// Classifier failures are returned unchanged; there is no local fallback.
pub async fn validate(
    answer: &str,
    kind: FieldKind,
    classifier: &dyn Classifier,
    accept_label: &str,
) -> Result<bool, ClassifierError> {
    if let Some(accepted) = validate_rule(answer, kind) {
        return Ok(accepted);
    }

    let top = classifier.classify(answer).await?;
    tracing::debug!(
        backend = classifier.name(),
        label = %top.label,
        score = top.score,
        "Classified free-text answer"
    );
    Ok(top.label == accept_label)
}

fn is_digits(answer: &str) -> bool {
    !answer.is_empty() && answer.chars().all(|c| c.is_ascii_digit())
}

fn digits_in_range(answer: &str, min: u64, max: u64) -> bool {
    is_digits(answer)
        && answer
            .parse::<u64>()
            .map(|n| (min..=max).contains(&n))
            .unwrap_or(false)
}

fn is_letters_and_spaces(answer: &str) -> bool {
    let trimmed = answer.trim();
    trimmed.chars().count() > 2 && trimmed.chars().all(|c| c.is_alphabetic() || c.is_whitespace())
}
