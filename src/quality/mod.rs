mod phoneme;
mod sentence;
mod word;

pub use phoneme::{average_score, PhonemeQuality, ERROR_PHONE, SILENCE_PHONE};
pub use sentence::SentenceQuality;
pub use word::WordQuality;
