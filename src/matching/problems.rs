use super::{ProblemKind, PronunciationProblem, SentenceMatch};
use crate::error::GradingError;
use crate::pipeline::traits::ReferenceAligner;
use crate::quality::PhonemeQuality;

/// Walks words, phonemes and reference characters in lockstep.
///
/// Phones of accepted words are reported when their score and history both
/// fall short; every scoreable phone of a rejected word is reported.
///
/// Extension over the per-phone policy: a rejected word without any scoreable
/// phone is reported as a whole word (`ProblemKind::Word`), since it would
/// otherwise leave no trace in the problem list.
///
/// Every word record must own exactly one run of non-boundary phonemes.
pub(super) fn scan(
    sentence: &mut SentenceMatch,
    reference: &str,
    history: &[PhonemeQuality],
    aligner: &dyn ReferenceAligner,
) -> Result<Vec<PronunciationProblem>, GradingError> {
    let segments = count_segments(&sentence.quality.phonemes);
    if segments != sentence.quality.words.len() {
        return Err(GradingError::shape_mismatch(
            "phoneme word segments vs word records",
            sentence.quality.words.len(),
            segments,
        ));
    }
    if history.is_empty() {
        return Ok(Vec::new());
    }

    let reference: Vec<char> = reference.chars().collect();
    let spoken: Vec<String> = sentence
        .recognized_text
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let quality = &mut sentence.quality;
    let phoneme_count = quality.phonemes.len();

    let mut problems = Vec::new();
    let mut phoneme_idx = 0usize;
    let mut cursor = 0usize;

    for word_idx in 0..quality.words.len() {
        let accepted = quality.words[word_idx].accepted;

        while phoneme_idx < phoneme_count && quality.phonemes[phoneme_idx].is_empty() {
            phoneme_idx += 1;
        }
        // whitespace is only skipped between words
        if word_idx > 0 {
            cursor = aligner.next_word_start(&reference, cursor);
        }
        let word_start = cursor;
        let mut scoreable = 0usize;

        while phoneme_idx < phoneme_count && !quality.phonemes[phoneme_idx].is_empty() {
            let included = quality.phonemes[phoneme_idx].is_included();
            let flagged = if accepted {
                quality.phonemes[phoneme_idx].update_average(history);
                included && !quality.accepts(&quality.phonemes[phoneme_idx])
            } else {
                included
            };

            let phoneme = &quality.phonemes[phoneme_idx];
            if included {
                scoreable += 1;
            }
            if flagged {
                tracing::debug!(
                    word = word_idx,
                    accepted,
                    phone = phoneme.phone_name.as_str(),
                    grapheme = phoneme.grapheme.as_str(),
                    score = phoneme.score,
                    average = phoneme.average,
                    offset = cursor,
                    "problems: grapheme flagged"
                );
                problems.push(PronunciationProblem {
                    kind: ProblemKind::Grapheme,
                    grapheme: phoneme.grapheme.clone(),
                    phoneme: phoneme.phone_name.clone(),
                    offset: cursor,
                });
            }
            cursor = aligner.advance_grapheme(&reference, cursor, &phoneme.grapheme);
            phoneme_idx += 1;
        }

        if !accepted && scoreable == 0 {
            let word_end = aligner.word_end(&reference, word_start);
            let grapheme: String = reference
                .get(word_start..word_end)
                .map(|chars| chars.iter().collect())
                .unwrap_or_default();
            tracing::debug!(
                word = word_idx,
                grapheme = grapheme.as_str(),
                offset = word_start,
                "problems: rejected word without scoreable phones"
            );
            problems.push(PronunciationProblem {
                kind: ProblemKind::Word,
                grapheme,
                phoneme: spoken.get(word_idx).cloned().unwrap_or_default(),
                offset: word_start,
            });
            cursor = cursor.max(word_end);
        }
    }

    if cursor > reference.len() {
        tracing::warn!(
            cursor,
            reference_len = reference.len(),
            "problems: graphemes run past the reference sentence"
        );
    }

    Ok(problems)
}

/// Runs of non-boundary phonemes; repeated boundaries count once.
fn count_segments(phonemes: &[PhonemeQuality]) -> usize {
    let mut segments = 0;
    let mut in_word = false;
    for phoneme in phonemes {
        match (phoneme.is_empty(), in_word) {
            (false, false) => {
                segments += 1;
                in_word = true;
            }
            (true, true) => in_word = false,
            _ => {}
        }
    }
    segments
}
