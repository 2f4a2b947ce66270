use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use clap::{Args, Parser, Subcommand};
use hmmtag::{
    harness, BigramTagger, Corpus, DecoderConfig, Format, Guesser, HarnessConfig, Lexicon, Model,
    RewriteOrder, Search, TagSet, Tagger,
};

#[derive(Debug, Parser)]
#[command(version, about)]
#[command(propagate_version = true)]
struct Argv {
    /// raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cross-validate the tagger on tagged corpora
    Evaluate(EvaluateArgs),
    /// Train on tagged corpora and tag sentences read from INPUT (or STDIN)
    Tag(TagArgs),
}

#[derive(Debug, Args)]
struct DecoderArgs {
    /// predecessor search of the decoder
    #[arg(long, value_enum, default_value_t = Search::Frontier)]
    search: Search,
    /// when UNK is rewritten to NN relative to the context rules
    #[arg(long, value_enum, default_value_t = RewriteOrder::ContextFirst)]
    fix_order: RewriteOrder,
    /// skip the consistency pass over guessed tags
    #[arg(long)]
    no_fix: bool,
    /// read determiner, preposition and punctuation lists from a JSON file
    #[arg(long, value_name = "JSON")]
    lexicon: Option<PathBuf>,
}

impl DecoderArgs {
    fn config(&self) -> DecoderConfig {
        DecoderConfig {
            search: self.search,
            fix_order: self.fix_order,
            no_fix: self.no_fix,
        }
    }

    fn lexicon(&self) -> hmmtag::Result<Lexicon> {
        match &self.lexicon {
            Some(path) => Lexicon::from_reader(BufReader::new(File::open(path)?)),
            None => Ok(Lexicon::default()),
        }
    }
}

#[derive(Debug, Args)]
struct EvaluateArgs {
    /// corpus file format
    #[arg(short, long, value_enum, default_value_t = Format::Slash)]
    format: Format,
    /// number of cross-validation folds
    #[arg(short = 'k', long, default_value_t = 10)]
    folds: u32,
    /// report mistake types occurring more often than this
    #[arg(long, default_value_t = 50)]
    mistake_threshold: usize,
    /// maximum number of example sentences in the report
    #[arg(long, default_value_t = 20)]
    examples: usize,
    /// print the summary as JSON
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    decoder: DecoderArgs,
    #[arg(required = true, value_name = "CORPUS")]
    corpora: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct TagArgs {
    /// corpus file format
    #[arg(short, long, value_enum, default_value_t = Format::Slash)]
    format: Format,
    /// tagged corpora to train on
    #[arg(short, long = "corpus", required = true, value_name = "CORPUS")]
    corpora: Vec<PathBuf>,
    #[command(flatten)]
    decoder: DecoderArgs,
    /// one whitespace-tokenized sentence per line; '-' or omitted reads STDIN
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
}

fn read_corpora(paths: &[PathBuf], format: Format) -> hmmtag::Result<Corpus> {
    let mut corpus = Corpus::default();
    for path in paths {
        log::info!("reading corpus from: {}", path.display());
        corpus.read_more(BufReader::new(File::open(path)?), format)?;
    }
    log::info!(
        "{} sentences, {} items, longest sentence: {}",
        corpus.len(),
        corpus.total_items(),
        corpus.max_length()
    );
    Ok(corpus)
}

fn evaluate(args: EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let corpus = read_corpora(&args.corpora, args.format)?;
    let config = HarnessConfig {
        folds: args.folds,
        mistake_threshold: args.mistake_threshold,
        max_examples: args.examples,
        decoder: args.decoder.config(),
    };
    log::info!("config: {:?}", config);
    let cv = harness::cross_validate(&corpus, &config, args.decoder.lexicon()?)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if args.json {
        serde_json::to_writer_pretty(&mut out, &harness::Summary::new(&cv, &config))?;
        writeln!(out)?;
    } else {
        harness::write_report(&mut out, &cv, &config)?;
    }
    out.flush()?;
    Ok(())
}

fn open_input(input: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match input {
        Some(path) if path != Path::new("-") => Ok(Box::new(BufReader::new(File::open(path)?))),
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn tag(args: TagArgs) -> Result<(), Box<dyn std::error::Error>> {
    let corpus = read_corpora(&args.corpora, args.format)?;
    if corpus.is_empty() {
        return Err(hmmtag::Error::EmptyCorpus.into());
    }
    let begin = Instant::now();
    let model = Model::train(TagSet::from_sentences(&corpus.sentences), &corpus.sentences);
    log::info!("training took: {:?}", begin.elapsed());

    let tagger = BigramTagger::new(&model, Guesser::new(args.decoder.lexicon()?), args.decoder.config());
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in open_input(args.input.as_deref())?.lines() {
        let line = line?;
        let words: Vec<String> = line.split_whitespace().map(String::from).collect();
        if words.is_empty() {
            writeln!(out)?;
            continue;
        }
        let decoded = tagger.tag(&words)?;
        writeln!(out, "{}", decoded.tagged)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let argv = Argv::parse();
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match argv.verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.init();
    log::debug!("argv: {:?}", argv);

    match argv.command {
        Command::Evaluate(args) => evaluate(args),
        Command::Tag(args) => tag(args),
    }
}
