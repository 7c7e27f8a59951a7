use akshar_tokenizer::{
    NormalizationForm, SpecialTokenKind, StopReason, Tokenizer, TokenizerError,
};
use std::fs;
use tempfile::TempDir;

const SENTENCES: [&str; 5] = [
    "नमस्ते भारत",
    "मैं हिंदी सीख रहा हूं",
    "यह एक परीक्षण वाक्य है",
    "भारत एक विशाल देश है",
    "मुझे हिंदी भाषा बहुत पसंद है",
];

fn temp_workspace() -> TempDir {
    tempfile::tempdir().expect("create tempdir")
}

fn corpus() -> Vec<&'static str> {
    SENTENCES
        .iter()
        .cycle()
        .take(SENTENCES.len() * 3)
        .copied()
        .collect()
}

fn trained() -> Tokenizer {
    let mut tokenizer = Tokenizer::builder()
        .max_vocab_size(4_999)
        .min_pair_frequency(2)
        .show_progress(false)
        .build()
        .expect("valid config");
    tokenizer.train(corpus()).expect("training succeeds");
    tokenizer
}

#[test]
fn round_trip_on_training_text() {
    let tokenizer = trained();
    for sentence in SENTENCES {
        let encoding = tokenizer.encode(sentence);
        assert_eq!(tokenizer.decode(&encoding.ids), sentence);
    }

    // Words recombined into new sentences still round-trip
    let mixed = "भारत हिंदी भाषा एक देश है";
    assert_eq!(tokenizer.decode(&tokenizer.encode(mixed).ids), mixed);
}

#[test]
fn compression_ratio_meets_target() {
    let tokenizer = trained();
    let evaluation = SENTENCES.join(" ");

    let ratio = tokenizer.compression_ratio(&evaluation);
    assert!(ratio >= 3.2, "compression ratio {ratio:.2} below 3.2");
    assert!(tokenizer.vocab_size() < 5_000);
    assert!(tokenizer.byte_compression_ratio(&evaluation) > ratio);
}

#[test]
fn decode_of_each_id_matches_its_text() {
    let tokenizer = trained();
    let vocab = tokenizer.vocab();

    for (id, entry) in vocab.iter().skip(5) {
        let expected = entry.text.trim_start_matches('▁');
        assert_eq!(tokenizer.decode(&[id]), expected, "token {id}");
    }
}

#[test]
fn combining_marks_stay_with_their_base() {
    let tokenizer = trained();
    let encoding = tokenizer.encode("मैं");

    for id in &encoding.ids {
        let leaves: Vec<_> = tokenizer.vocab().leaves(*id).collect();
        for leaf in leaves {
            let text = tokenizer.id_to_token(leaf).expect("leaf exists");
            let first = text.chars().next().expect("non-empty");
            assert!(
                !('\u{0900}'..='\u{0903}').contains(&first)
                    && !('\u{093A}'..='\u{094F}').contains(&first),
                "leaf {text:?} starts with a combining mark"
            );
        }
    }
    assert_eq!(tokenizer.decode(&encoding.ids), "मैं");
}

#[test]
fn repeated_word_is_merged_before_convergence() {
    let mut tokenizer = Tokenizer::builder()
        .max_vocab_size(300)
        .min_pair_frequency(2)
        .show_progress(false)
        .build()
        .expect("valid config");
    let metrics = tokenizer
        .train(["नमस्ते भारत", "नमस्ते दुनिया"])
        .expect("training succeeds");
    assert_eq!(metrics.stop_reason, StopReason::Converged);

    let word = tokenizer.token_to_id("▁नमस्ते").expect("merged token");
    assert_eq!(tokenizer.encode("नमस्ते").ids, vec![word]);
}

#[test]
fn unknown_symbol_maps_to_unk() {
    let tokenizer = trained();
    let unk = tokenizer.vocab().special_token_id(SpecialTokenKind::Unk);

    let encoding = tokenizer.encode("😀");
    assert!(encoding.ids.contains(&unk));
    assert_eq!(tokenizer.decode(&encoding.ids), "<UNK>");

    let mixed = tokenizer.encode("नमस्ते 😀");
    assert_eq!(tokenizer.decode(&mixed.ids), "नमस्ते <UNK>");
}

#[test]
fn save_and_load_preserve_encodings() {
    let workspace = temp_workspace();
    let model_dir = workspace.path().join("model");
    let tokenizer = trained();

    tokenizer.save(&model_dir).expect("save");
    assert!(model_dir.join("tokenizer.json").is_file());

    let loaded = Tokenizer::load(&model_dir).expect("load");
    assert_eq!(loaded.vocab_size(), tokenizer.vocab_size());
    assert_eq!(
        loaded.vocab().merge_rules(),
        tokenizer.vocab().merge_rules()
    );
    for sentence in SENTENCES {
        assert_eq!(loaded.encode(sentence), tokenizer.encode(sentence));
    }
}

#[test]
fn saved_config_is_restored() {
    let workspace = temp_workspace();
    let mut tokenizer = Tokenizer::builder()
        .max_vocab_size(1_000)
        .min_pair_frequency(3)
        .wrap_with_bos_eos(true)
        .normalization(NormalizationForm::NFC)
        .show_progress(false)
        .build()
        .expect("valid config");
    tokenizer.train(corpus()).expect("training succeeds");
    tokenizer.save(workspace.path()).expect("save");

    let loaded = Tokenizer::load(workspace.path()).expect("load");
    let config = loaded.config();
    assert_eq!(config.training.max_vocab_size, 1_000);
    assert_eq!(config.training.min_pair_frequency, 3);
    assert!(config.wrap_with_bos_eos);
    assert_eq!(config.normalization, NormalizationForm::NFC);

    let bos = loaded.vocab().special_token_id(SpecialTokenKind::Bos);
    assert_eq!(loaded.encode("भारत").ids.first(), Some(&bos));
}

#[test]
fn corrupt_file_fails_to_load() {
    let workspace = temp_workspace();
    fs::write(workspace.path().join("tokenizer.json"), "{ not json").expect("write");

    assert!(matches!(
        Tokenizer::load(workspace.path()),
        Err(TokenizerError::Load(_))
    ));
}

#[test]
fn training_is_deterministic_across_runs() {
    let a = trained();
    let b = trained();
    assert_eq!(a.to_json().expect("json"), b.to_json().expect("json"));
}

#[test]
fn empty_corpus_is_rejected() {
    let mut tokenizer = Tokenizer::builder().build().expect("valid config");
    let lines: Vec<String> = vec![String::new(), "   ".to_string()];

    assert!(matches!(
        tokenizer.train(lines),
        Err(TokenizerError::EmptyCorpus(_))
    ));
}
