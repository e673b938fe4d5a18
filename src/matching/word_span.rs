use std::ops::Range;

use crate::error::GradingError;

/// Word index range of `matched_text` inside `recognized_text`.
///
/// The match is a literal substring search. When it lands inside a word (for
/// example on the "t" of "don't") the start is moved back to the beginning of
/// that word so the fragment is counted as the whole word.
pub fn matched_word_range(
    recognized_text: &str,
    matched_text: &str,
) -> Result<Range<usize>, GradingError> {
    if matched_text.trim().is_empty() {
        return Err(GradingError::no_match(matched_text));
    }
    let Some(mut position) = recognized_text.find(matched_text) else {
        return Err(GradingError::no_match(matched_text));
    };

    while let Some(previous) = recognized_text[..position].chars().next_back() {
        if previous.is_whitespace() {
            break;
        }
        position -= previous.len_utf8();
    }

    let lower = recognized_text[..position].split_whitespace().count();
    let upper = lower + matched_text.split_whitespace().count();
    Ok(lower..upper)
}
