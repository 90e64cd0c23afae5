use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use sentiscope_lib::models::{ContentType, Decision};
use sentiscope_lib::services::input_records::{
    format_decision, format_decision_json, parse_content_record, parse_section_record,
};
use sentiscope_lib::services::{load_config_file, ClassifierConfig, ClassifyError, SentimentClassifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Classify tab-separated text records with a phrase dictionary.
///
/// Reads one record per line from stdin (or --classify) and prints one decision per line.
#[derive(Parser, Debug)]
#[command(name = "sentiscope", version)]
struct Cli {
    /// Features file to use
    #[arg(short = 'f', long = "features")]
    features: PathBuf,

    /// Stopwords file to use [currently ignored]
    #[arg(short = 's', long = "stopwords")]
    stopwords: Option<PathBuf>,

    /// Input file (one text per line, tab-separated); stdin when absent
    #[arg(short = 'c', long = "classify")]
    input: Option<PathBuf>,

    /// Level of debug info to produce [default: 1]
    #[arg(short = 'd', long = "debug")]
    debug: Option<u32>,

    /// Max number of tokens in any feature [default: 3]
    #[arg(short = 'm', long = "max-feature-size")]
    max_feature_size: Option<usize>,

    /// Relevance cutoff of feature set [default: 1.0]
    #[arg(short = 'r', long = "relevance-cutoff")]
    relevance_cutoff: Option<f32>,

    /// Neutral cutoff for classifier [default: 1.0]
    #[arg(short = 'n', long = "neutral-cutoff")]
    neutral_cutoff: Option<f32>,

    /// Classify by title, body, and URL
    #[arg(short = 't', long = "title-body-url")]
    title_body_url: bool,

    /// Use question marks to classify
    #[arg(short = 'q', long = "question-marks")]
    question_marks: bool,

    /// Content type of the input records
    #[arg(long = "content-type", default_value = "regular", value_parser = parse_content_type)]
    content_type: ContentType,

    /// JSON classifier config; command-line flags take precedence
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn parse_content_type(s: &str) -> Result<ContentType, String> {
    s.parse()
}

impl Cli {
    /// Build the classifier config: the config file (or command-line defaults)
    /// overridden by any flags given explicitly.
    fn classifier_config(&self) -> Result<ClassifierConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ClassifierConfig {
                use_question_marks: false,
                relevance_cutoff: Some(1.0),
                neutral_cutoff: Some(1.0),
                max_feature_size: 3,
                debug_level: 1,
                ..Default::default()
            },
        };

        if let Some(debug) = self.debug {
            config.debug_level = debug;
        }
        if let Some(size) = self.max_feature_size {
            config.max_feature_size = size;
        }
        if let Some(rc) = self.relevance_cutoff {
            config.relevance_cutoff = Some(rc);
        }
        if let Some(nc) = self.neutral_cutoff {
            config.neutral_cutoff = Some(nc);
        }
        if self.question_marks {
            config.use_question_marks = true;
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let level = match cli.debug {
        Some(d) if d > 1 => "debug",
        _ => "warn",
    };
    sentiscope_lib::init_logging(level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.classifier_config()?;
    let debug_level = config.debug_level;

    if let Some(stopwords) = &cli.stopwords {
        info!(path = %stopwords.display(), "stopwords file accepted but not used");
    }

    let classifier = SentimentClassifier::open(&cli.features, config);
    if !classifier.inited() {
        anyhow::bail!(
            "Classifier failed to initialize! ({})",
            classifier.last_error().unwrap_or("unknown error")
        );
    }

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening input {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in reader.lines() {
        let line = line.context("reading input")?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }

        let outcome = if cli.title_body_url {
            let Some(record) = parse_section_record(line) else {
                eprintln!("Error parsing title, body and url! (\"{}\")", line);
                continue;
            };
            let result = classifier.classify_sections(record.title, record.body, record.url, cli.content_type);
            (record.label(), result)
        } else {
            let Some(content) = parse_content_record(line) else {
                eprintln!("Error parsing content! (\"{}\")", line);
                continue;
            };
            (content.to_string(), classifier.classify(content, cli.content_type))
        };

        let (label, result) = outcome;
        let decision = match result {
            Ok(decision) => decision,
            Err(ClassifyError::NoDecisionReached(decision)) => *decision,
            Err(e) => {
                warn!(error = %e, "classification failed");
                eprintln!("Error classifying \"{}\": {}", label, e);
                continue;
            }
        };

        write_decision(&mut out, cli.format, &label, &decision, debug_level)?;
        if debug_level > 1 {
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn write_decision(
    out: &mut impl Write,
    format: OutputFormat,
    label: &str,
    decision: &Decision,
    debug_level: u32,
) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", format_decision(label, decision, debug_level))?,
        OutputFormat::Json => writeln!(out, "{}", format_decision_json(label, decision)?)?,
    }
    Ok(())
}
