use serde::{Deserialize, Serialize};

/// Phone name the engine emits for silence inside a word.
pub const SILENCE_PHONE: &str = "-";
/// Phone name the engine emits when it could not score a slot.
pub const ERROR_PHONE: &str = "error";

/// One scored phone and the grapheme span it was read from.
///
/// A blank `phone_name` marks a word boundary in the phoneme stream; those
/// records are never scored and never reported.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhonemeQuality {
    pub phone_name: String,
    pub grapheme: String,
    #[serde(default)]
    pub average: f32,
    pub score: i32,
}

impl PhonemeQuality {
    pub fn new(phone_name: impl Into<String>, grapheme: impl Into<String>, score: i32) -> Self {
        Self {
            phone_name: phone_name.into(),
            grapheme: grapheme.into(),
            average: 0.0,
            score,
        }
    }

    /// Word-boundary marker between two words of the phoneme stream.
    pub fn boundary() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.phone_name.trim().is_empty()
    }

    pub fn is_silent(&self) -> bool {
        self.phone_name == SILENCE_PHONE
    }

    /// Whether the phone takes part in averaging and problem detection.
    pub fn is_included(&self) -> bool {
        let name = self.phone_name.trim();
        !(name.is_empty() || name == SILENCE_PHONE || name == ERROR_PHONE)
    }

    /// Sets `average` from the scores of same-named phones in `history`.
    ///
    /// Leaves `average` untouched for excluded phones or an empty history.
    pub fn update_average(&mut self, history: &[PhonemeQuality]) {
        if !self.is_included() || history.is_empty() {
            return;
        }
        self.average = average_score(&self.phone_name, history);
    }

    pub fn format_measures(&self) -> String {
        if self.score > 0 {
            format!(
                "[{},{},{},{}]",
                self.phone_name, self.grapheme, self.score, self.average
            )
        } else {
            format!("[{},{}]", self.phone_name, self.grapheme)
        }
    }
}

/// Mean historical score of `phone_name`, 0 when the history never saw it.
pub fn average_score(phone_name: &str, history: &[PhonemeQuality]) -> f32 {
    let (sum, count) = history
        .iter()
        .filter(|entry| entry.phone_name == phone_name)
        .fold((0i64, 0usize), |(sum, count), entry| {
            (sum + i64::from(entry.score), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        (sum as f64 / count as f64) as f32
    }
}
