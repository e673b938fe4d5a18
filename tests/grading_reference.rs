use pronunciation_grader::{
    average_score, evaluate_confidence, GraderBuilder, GradingConfig, GradingRequest,
    PhonemeQuality, PhonemeScore, PositionalAligner, ProblemKind, RecognitionOutput,
    RecognitionResult, ResultDetailKind, ResultKind, SentenceMatch, SentenceQuality, WordQuality,
    WordScore,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 42;
const ROUNDS: usize = 200;
const PHONE_POOL: [&str; 10] = ["k", "ae", "t", "s", "dh", "ax", "iy", "-", "error", "ng"];

fn config() -> GradingConfig {
    GradingConfig {
        phoneme_acceptance_threshold: 50,
        phoneme_experience_threshold: 60.0,
        phrase_acceptance_threshold: 50,
        sentence_acceptance_threshold: 40,
        word_confidence_thresholds: vec![0, 60],
        ..GradingConfig::default()
    }
}

fn word(confidence: i32) -> WordScore {
    WordScore {
        confidence,
        score: confidence,
        start_frame: 0,
        frame_count: 10,
    }
}

fn the_cat_sat(cat_confidence: i32) -> RecognitionOutput {
    RecognitionOutput::builder("the cat sat")
        .with_words([word(80), word(cat_confidence), word(85)])
        .with_phonemes([
            PhonemeScore::new("dh", "th", 80),
            PhonemeScore::new("ax", "e", 80),
            PhonemeScore::boundary(),
            PhonemeScore::new("k", "c", 40),
            PhonemeScore::new("ae", "a", 90),
            PhonemeScore::boundary(),
            PhonemeScore::new("s", "s", 85),
            PhonemeScore::new("ae", "a", 88),
            PhonemeScore::new("t", "t", 90),
        ])
        .with_sentence_scores(90, 70, 70)
        .build()
        .expect("shapes agree")
}

fn problem_summary(result: &RecognitionResult) -> Vec<(String, usize)> {
    result
        .sentence
        .problems
        .iter()
        .map(|problem| (problem.phoneme.clone(), problem.offset))
        .collect()
}

#[test]
fn rejected_cat_reports_both_phones_at_their_offsets() {
    let grader = GraderBuilder::new(config()).build().unwrap();
    let request = GradingRequest::new(the_cat_sat(20), vec!["the cat sat".to_string()]);
    let history = vec![PhonemeQuality::new("iy", "ee", 70)];
    let result = grader.grade(&request, &history);
    assert!(!result.sentence.quality.words[1].accepted);
    assert_eq!(
        problem_summary(&result),
        vec![("k".to_string(), 4), ("ae".to_string(), 5)]
    );
    assert!(result
        .sentence
        .problems
        .iter()
        .all(|problem| problem.kind == ProblemKind::Grapheme));
}

#[test]
fn accepted_cat_reports_only_weak_phone() {
    let grader = GraderBuilder::new(config()).build().unwrap();
    let request = GradingRequest::new(the_cat_sat(85), vec!["the cat sat".to_string()]);
    let history = vec![
        PhonemeQuality::new("k", "c", 30),
        PhonemeQuality::new("ae", "a", 45),
    ];
    let result = grader.grade(&request, &history);
    assert_eq!(result.kind, ResultKind::Succeeded);
    assert!(result.sentence.quality.words[1].accepted);
    assert_eq!(problem_summary(&result), vec![("k".to_string(), 4)]);
}

#[test]
fn find_matched_words_returns_middle_span() {
    let grader = GraderBuilder::new(config()).build().unwrap();
    let quality = grader.build_quality(&the_cat_sat(20));
    let sentence = SentenceMatch::new("the cat sat", "cat sat", quality);
    let words = sentence.find_matched_words("cat sat").unwrap();
    assert_eq!(words, &sentence.quality.words[1..3]);
}

#[test]
fn single_full_confidence_word_blends_to_full_confidence() {
    let words = [WordQuality {
        confidence: 100,
        phone_count: 4,
        ..WordQuality::default()
    }];
    assert_eq!(
        evaluate_confidence(&words, GradingConfig::DEFAULT_CONFIDENCE_SCALE).unwrap(),
        100
    );
}

#[test]
fn unknown_phone_average_is_zero_for_random_histories() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..ROUNDS {
        let len = rng.gen_range(0..20);
        let history: Vec<PhonemeQuality> = (0..len)
            .map(|_| {
                let phone = PHONE_POOL[rng.gen_range(0..PHONE_POOL.len())];
                PhonemeQuality::new(phone, "x", rng.gen_range(-10..110))
            })
            .collect();
        assert_eq!(average_score("zh", &history), 0.0);
    }
}

#[test]
fn phones_without_history_are_always_accepted() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..ROUNDS {
        let quality = SentenceQuality::new(&GradingConfig {
            phoneme_acceptance_threshold: rng.gen_range(-50..150),
            phoneme_experience_threshold: rng.gen_range(-50.0..150.0),
            ..GradingConfig::default()
        });
        let phoneme = PhonemeQuality::new("k", "c", rng.gen_range(-100..200));
        assert!(quality.accepts(&phoneme));
    }
}

#[test]
fn low_sentence_confidence_is_never_accepted() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..ROUNDS {
        let threshold = rng.gen_range(-20..120);
        let mut quality = SentenceQuality::new(&GradingConfig {
            sentence_acceptance_threshold: threshold,
            phrase_acceptance_threshold: rng.gen_range(-20..120),
            ..GradingConfig::default()
        });
        quality.confidence = threshold - rng.gen_range(1..50);
        quality.phrase_confidence = rng.gen_range(-20..200);
        assert!(!quality.recognition_accepted());
    }
}

#[test]
fn blended_confidence_stays_within_word_range() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..ROUNDS {
        let words: Vec<WordQuality> = (0..rng.gen_range(1..6))
            .map(|_| WordQuality {
                confidence: rng.gen_range(1..=100),
                phone_count: rng.gen_range(1..6),
                ..WordQuality::default()
            })
            .collect();
        let blended = evaluate_confidence(&words, GradingConfig::DEFAULT_CONFIDENCE_SCALE).unwrap();
        let min = words.iter().map(|w| w.confidence).min().unwrap();
        let max = words.iter().map(|w| w.confidence).max().unwrap();
        assert!(
            (min..=max).contains(&blended),
            "blend {blended} outside [{min}, {max}]"
        );
    }
}

#[test]
fn boundary_phonemes_never_become_problems() {
    let grader = GraderBuilder::new(config()).build().unwrap();
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..ROUNDS {
        let word_count = rng.gen_range(1..6);
        let mut words = Vec::new();
        let mut phonemes = Vec::new();
        let mut text = Vec::new();
        for word_idx in 0..word_count {
            for _ in 0..rng.gen_range(1..3) {
                phonemes.push(PhonemeScore::boundary());
            }
            let mut spelled = String::new();
            for _ in 0..rng.gen_range(1..5) {
                let phone = PHONE_POOL[rng.gen_range(0..PHONE_POOL.len())];
                let grapheme = if phone == "-" { "" } else { "a" };
                spelled.push_str(grapheme);
                phonemes.push(PhonemeScore::new(phone, grapheme, rng.gen_range(0..100)));
            }
            if spelled.is_empty() {
                spelled.push('w');
            }
            text.push(format!("{spelled}{word_idx}"));
            words.push(word(rng.gen_range(0..100)));
        }
        let recognized = text.join(" ");
        let output = RecognitionOutput::builder(recognized.clone())
            .with_words(words)
            .with_phonemes(phonemes)
            .with_sentence_scores(50, rng.gen_range(0..100), 50)
            .build()
            .expect("generated shapes agree");
        let history = vec![
            PhonemeQuality::new("k", "c", rng.gen_range(0..100)),
            PhonemeQuality::new("ae", "a", rng.gen_range(0..100)),
        ];
        let result = grader.grade(&GradingRequest::new(output, vec![recognized]), &history);
        for problem in &result.sentence.problems {
            assert!(!problem.phoneme.trim().is_empty());
            if problem.kind == ProblemKind::Grapheme {
                assert_ne!(problem.phoneme, "-");
                assert_ne!(problem.phoneme, "error");
            }
        }
    }
}

#[test]
fn requests_deserialize_and_grade_from_json() {
    let json = r#"[
        {
            "id": "utt-1",
            "expected": ["the cat sat", "a cat sat"],
            "output": {
                "recognized_text": "the cat sat",
                "words": [
                    { "confidence": 80, "score": 80, "start_frame": 0, "frame_count": 10 },
                    { "confidence": 20, "score": 20, "start_frame": 10, "frame_count": 12 },
                    { "confidence": 85, "score": 85, "start_frame": 22, "frame_count": 9 }
                ],
                "phonemes": [
                    { "phone_name": "dh", "grapheme": "th", "score": 80 },
                    { "phone_name": "ax", "grapheme": "e", "score": 80 },
                    { "phone_name": "" },
                    { "phone_name": "k", "grapheme": "c", "score": 40 },
                    { "phone_name": "ae", "grapheme": "a", "score": 90 },
                    { "phone_name": "" },
                    { "phone_name": "s", "grapheme": "s", "score": 85 }
                ],
                "frame_count": 31,
                "confidence": 70,
                "score": 70,
                "recognition_time_ms": 140
            }
        }
    ]"#;
    let requests: Vec<GradingRequest> = serde_json::from_str(json).expect("valid requests");
    let history: Vec<PhonemeQuality> =
        serde_json::from_str(r#"[{ "PhoneName": "iy", "Grapheme": "ee", "Score": 70 }]"#)
            .expect("valid history");
    let grader = GraderBuilder::new(config()).build().unwrap();
    let result = grader.grade(&requests[0], &history);
    assert_eq!(result.sentence.matched_index, Some(0));
    assert_eq!(result.recognition_time_ms, 140);
    assert_eq!(
        problem_summary(&result),
        vec![("k".to_string(), 4), ("ae".to_string(), 5)]
    );
}

#[test]
fn mismatched_shapes_are_rejected_before_grading() {
    let err = RecognitionOutput::builder("the cat sat")
        .with_words([word(80), word(80)])
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("shape mismatch"));
}

#[test]
fn custom_aligner_is_used_for_offsets() {
    struct FixedStartAligner;

    impl pronunciation_grader::ReferenceAligner for FixedStartAligner {
        fn next_word_start(&self, _reference: &[char], _cursor: usize) -> usize {
            100
        }

        fn advance_grapheme(&self, reference: &[char], cursor: usize, grapheme: &str) -> usize {
            PositionalAligner.advance_grapheme(reference, cursor, grapheme)
        }

        fn word_end(&self, reference: &[char], start: usize) -> usize {
            PositionalAligner.word_end(reference, start)
        }
    }

    let grader = GraderBuilder::new(config())
        .with_reference_aligner(Box::new(FixedStartAligner))
        .build()
        .unwrap();
    let request = GradingRequest::new(the_cat_sat(20), vec!["the cat sat".to_string()]);
    let result = grader.grade(&request, &[PhonemeQuality::new("iy", "ee", 70)]);
    assert_eq!(
        problem_summary(&result),
        vec![("k".to_string(), 100), ("ae".to_string(), 101)]
    );
}

#[test]
fn cancelled_failure_keeps_cancellation_first() {
    let mut result = RecognitionResult::with_failure(true);
    result.add_detail(ResultDetailKind::SpeechTruncated);
    assert!(result.was_cancelled());
    assert!(result.needs_save());
}
