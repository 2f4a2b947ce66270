use hmmtag::{
    BigramTagger, Corpus, DecoderConfig, Error, Format, Guesser, Lexicon, Model, Tag, TagSet,
    Tagger, Variant,
};

fn corpus() -> Corpus {
    Corpus::open("tests/data/sample.pos", Format::Slash).unwrap()
}

fn words(s: &str) -> Vec<String> {
    s.split_whitespace().map(String::from).collect()
}

#[test]
fn test_read_sample_corpus() {
    let corpus = corpus();
    assert_eq!(30, corpus.len());
    assert_eq!(219, corpus.total_items());
    let tags = TagSet::from_sentences(&corpus.sentences);
    // 20 corpus tags, the sentence start and the rare tags
    assert_eq!(23, tags.len());
    assert_eq!(Tag::Determiner, tags.get(0));
    assert!(tags.contains(Tag::SentenceStart));
    assert!(tags.contains(Tag::Unknown));
}

#[test]
fn test_model_tables_are_normalized() {
    let corpus = corpus();
    let model = Model::from_sentences(&corpus.sentences);
    for tag in model.tags().iter() {
        for variant in [Variant::Folded, Variant::Preserved] {
            let sum: f64 = model.emissions(tag, variant).map(|(_, p)| p).sum();
            if sum > 0.0 {
                assert!((sum - 1.0).abs() < 1e-9, "{tag} {variant:?}: {sum}");
            }
        }
        let sum: f64 = model.transitions_from(tag).iter().sum();
        if sum > 0.0 {
            assert!((sum - 1.0).abs() < 1e-9, "{tag}: {sum}");
        }
    }
    assert_eq!(30, model.num_sentences());
    assert!(model.emission("the", Tag::Determiner, Variant::Folded) > 0.0);
    assert_eq!(0.0, model.emission("The", Tag::Determiner, Variant::Folded));
}

#[test]
fn test_tag_known_sentence() {
    let corpus = corpus();
    let model = Model::from_sentences(&corpus.sentences);
    let tagger = BigramTagger::new(&model, Guesser::default(), DecoderConfig::default());
    let decoded = tagger.tag(&words("The dog sleeps .")).unwrap();
    assert_eq!(
        vec![Tag::Determiner, Tag::Noun, Tag::ThirdPersonVerb, Tag::Terminal],
        decoded.tagged.tags
    );
    assert_eq!(0, decoded.unknown_count);
    assert_eq!(0, decoded.guess_count);
}

#[test]
fn test_tag_unknown_words() {
    let corpus = corpus();
    let model = Model::from_sentences(&corpus.sentences);
    let tagger = BigramTagger::new(&model, Guesser::default(), DecoderConfig::default());
    let input = words("The horses jumped over 42 fences , quickly .");
    let a = tagger.tag(&input).unwrap();
    let b = tagger.tag(&input).unwrap();
    assert_eq!(input, a.tagged.words);
    assert_eq!(a, b);
    assert!(a.unknown_count >= 4);
    assert_eq!(Tag::Cardinal, a.tagged.tags[4]);
    assert!(a.guessed[4]);
    assert!(!a.tagged.tags.contains(&Tag::Unknown));
}

#[test]
fn test_tag_empty_sentence() {
    let corpus = corpus();
    let model = Model::from_sentences(&corpus.sentences);
    let tagger = BigramTagger::new(&model, Guesser::default(), DecoderConfig::default());
    match tagger.tag(&[]) {
        Err(Error::EmptySentence) => {}
        _ => panic!("test fail"),
    }
}

#[test]
fn test_custom_lexicon() {
    let json = r#"{"punctuation": [["SYM", ["@"]]]}"#;
    let lexicon = Lexicon::from_reader(json.as_bytes()).unwrap();
    assert!(lexicon.punctuation.iter().any(|(tag, _)| *tag == Tag::Symbol));
    // absent lists keep their defaults
    assert_eq!(Lexicon::default().determiners, lexicon.determiners);

    let corpus = corpus();
    let model = Model::from_sentences(&corpus.sentences);
    let tags = TagSet::new(&[Tag::Symbol, Tag::Noun]);
    assert_eq!(Some(Tag::Symbol), Guesser::new(lexicon).guess(&model, &tags, "@", &[0.0, 0.0]));
}

#[test]
fn test_invalid_tag_in_corpus() {
    match Corpus::read("The/DT dog/XYZ".as_bytes(), Format::Slash) {
        Err(Error::InvalidTag { line: 1, tag }) => assert_eq!("XYZ", tag),
        other => panic!("test fail: {other:?}"),
    }
}
