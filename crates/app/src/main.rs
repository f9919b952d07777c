use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use medquiz_core::model::{Priority, Question, QuizConfig, QuizConfigError, TopicId};
use medquiz_core::recommend::{ProgressReport, Trend};
use medquiz_core::{Catalog, format_topic_name};
use services::{
    Clock, FileQuestionProvider, ProgressError, ProgressService, QuestionProvider, QuizSession,
    QuizWorkflow, SessionError,
};
use storage::SqliteInitError;
use storage::repository::Storage;
use thiserror::Error;
use tracing::warn;

const DEFAULT_DB_URL: &str = "sqlite://medquiz.sqlite3";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_QUESTION_COUNT: usize = 10;
const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Error)]
enum ArgsError {
    #[error("{flag} requires a value")]
    MissingValue { flag: &'static str },
    #[error("unknown argument: {0}")]
    UnknownArg(String),
    #[error("unknown subcommand: {0}")]
    UnknownCommand(String),
    #[error("invalid --count value: {raw}")]
    InvalidCount { raw: String },
    #[error("invalid --seed value: {raw}")]
    InvalidSeed { raw: String },
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("quiz requires --topics")]
    MissingTopics,
}

#[derive(Debug, Error)]
#[non_exhaustive]
enum AppError {
    #[error(transparent)]
    Args(#[from] ArgsError),
    #[error(transparent)]
    Config(#[from] QuizConfigError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  medquiz quiz   --topics <a,b,...> [--count <n>] [--seed <n>] [--db <sqlite_url>] [--data-dir <dir>]");
    eprintln!("  medquiz report [--json] [--db <sqlite_url>]");
    eprintln!("  medquiz reset  [--db <sqlite_url>]");
    eprintln!("  medquiz topics");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --data-dir {DEFAULT_DATA_DIR}");
    eprintln!("  --count {DEFAULT_QUESTION_COUNT}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MEDQUIZ_DB_URL, MEDQUIZ_DATA_DIR, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Report,
    Reset,
    Topics,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "report" => Some(Self::Report),
            "reset" => Some(Self::Reset),
            "topics" => Some(Self::Topics),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    data_dir: PathBuf,
    topics: Vec<TopicId>,
    count: usize,
    seed: Option<u64>,
    json: bool,
}

impl Args {
    fn parse(
        command: Command,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("MEDQUIZ_DB_URL")
                .ok()
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            data_dir: std::env::var_os("MEDQUIZ_DATA_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
            topics: Vec::new(),
            count: DEFAULT_QUESTION_COUNT,
            seed: None,
            json: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--data-dir" => {
                    parsed.data_dir = PathBuf::from(require_value(args, "--data-dir")?);
                }
                "--topics" => {
                    let value = require_value(args, "--topics")?;
                    parsed.topics = split_topics(&value);
                }
                "--count" => {
                    let value = require_value(args, "--count")?;
                    parsed.count = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCount { raw: value.clone() })?;
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let seed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    parsed.seed = Some(seed);
                }
                "--json" => parsed.json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if command == Command::Quiz && parsed.topics.is_empty() {
            return Err(ArgsError::MissingTopics);
        }
        Ok(parsed)
    }
}

fn split_topics(raw: &str) -> Vec<TopicId> {
    raw.split(',')
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .map(TopicId::from)
        .collect()
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), AppError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

//
// ─── INTERACTIVE QUIZ ──────────────────────────────────────────────────────────
//

/// One line of quiz input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Answer(u8),
    Next,
    Previous,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_ascii_lowercase().as_str() {
        "n" => Some(Input::Next),
        "p" => Some(Input::Previous),
        "q" => Some(Input::Quit),
        "a" | "1" => Some(Input::Answer(0)),
        "b" | "2" => Some(Input::Answer(1)),
        "c" | "3" => Some(Input::Answer(2)),
        "d" | "4" => Some(Input::Answer(3)),
        _ => None,
    }
}

fn print_question(session: &QuizSession, question: &Question) {
    let progress = session.progress();
    println!();
    println!(
        "Question {}/{} [{}] ({} answered)",
        progress.current,
        progress.total,
        format_topic_name(question.topic().as_str()),
        progress.answered
    );
    println!("{}", question.prompt());
    let chosen = session
        .answer(session.current_index())
        .and_then(|slot| slot.option());
    for (label, (index, option)) in OPTION_LABELS.iter().zip(question.options().iter().enumerate())
    {
        let marker = if chosen == u8::try_from(index).ok() { '*' } else { ' ' };
        println!(" {marker}{label}) {option}");
    }
}

fn run_interactive(session: &mut QuizSession) -> Result<(), AppError> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(question) = session.current_question().cloned() else {
            break;
        };
        print_question(session, &question);
        print!("answer (a-d), n, p, q> ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        match parse_input(&line) {
            Some(Input::Quit) => break,
            Some(Input::Next) => {
                if !session.next() {
                    println!("Already at the last question.");
                }
            }
            Some(Input::Previous) => {
                if !session.previous() {
                    println!("Already at the first question.");
                }
            }
            Some(Input::Answer(option)) => {
                let index = session.current_index();
                if session.record_answer(index, option)? {
                    println!("Correct.");
                } else {
                    let answer = usize::from(question.correct_answer());
                    println!("Incorrect. The answer is {}.", OPTION_LABELS[answer]);
                }
                if !question.explanation().is_empty() {
                    println!("{}", question.explanation());
                }
                if !session.next() {
                    if session.is_complete() {
                        break;
                    }
                    println!("Unanswered: {:?}", session.unanswered());
                }
            }
            None => println!("Enter a-d or 1-4 to answer, n/p to move, q to finish."),
        }
    }

    let unanswered = session.unanswered();
    if !unanswered.is_empty() {
        println!("Finishing with {} unanswered question(s).", unanswered.len());
    }
    Ok(())
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

async fn run_quiz(args: Args, storage: Storage, catalog: Arc<Catalog>) -> Result<(), AppError> {
    for topic in &args.topics {
        if catalog.subject_of(topic.as_str()).is_none() {
            warn!(%topic, "topic is not in the catalog and will be skipped");
        }
    }

    let clock = Clock::default();
    let progress = ProgressService::new(clock, storage.clone(), Arc::clone(&catalog));
    let provider: Arc<dyn QuestionProvider> =
        Arc::new(FileQuestionProvider::new(&args.data_dir, Arc::clone(&catalog)));
    let mut workflow = QuizWorkflow::new(clock, provider, storage, progress);
    if let Some(seed) = args.seed {
        workflow = workflow.with_seed(seed);
    }

    let config = QuizConfig::new(args.topics, args.count)?;
    let mut session = workflow.start(config).await?;
    if session.total_questions() == 0 {
        println!("No questions available for the selected topics.");
        return Ok(());
    }
    let requested = session.config().question_count();
    if session.total_questions() < requested {
        println!(
            "Only {} of {requested} requested questions are available.",
            session.total_questions()
        );
    }

    run_interactive(&mut session)?;
    let finished = workflow.finish(session).await?;

    let result = &finished.result;
    println!();
    println!(
        "Score: {}% ({}/{}) in {}s",
        result.score, result.correct_answers, result.total_questions, result.time_spent
    );
    for (topic, tally) in &result.topic_performance {
        println!(
            "  {}: {}/{}",
            format_topic_name(topic.as_str()),
            tally.correct,
            tally.total
        );
    }
    for recommendation in workflow.progress().recommendations().await? {
        println!("- {}", recommendation.message);
    }
    Ok(())
}

fn print_report(report: &ProgressReport, catalog: &Catalog) {
    let overall = &report.overall;
    println!("Quizzes taken:      {}", overall.total_quizzes);
    println!("Questions answered: {}", overall.total_questions);
    println!("Overall accuracy:   {}%", overall.overall_accuracy);

    let recent = &report.recent;
    let trend = match recent.trend {
        Trend::Improving => "improving",
        Trend::Declining => "declining",
        Trend::Stable => "stable",
    };
    println!(
        "Last {} quizzes:     average {}% ({trend})",
        recent.quizzes, recent.average_score
    );
    if let Some(subject) = recent.best_subject {
        println!("Strongest subject:  {}", subject.display_name());
    }

    if !overall.weak_areas.is_empty() {
        println!();
        println!("Weak areas:");
        for area in &overall.weak_areas {
            let priority = match area.priority {
                Priority::High => "high",
                Priority::Medium => "medium",
            };
            println!(
                "  {} {}% ({priority})",
                catalog.topic_name(area.topic.as_str()),
                area.accuracy
            );
        }
    }

    if !report.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for recommendation in &report.recommendations {
            println!("  - {}", recommendation.message);
        }
    }

    if !report.goals.is_empty() {
        println!();
        println!("Goals:");
        for goal in &report.goals {
            println!("  - {} ({}/{})", goal.message, goal.current, goal.target);
        }
    }
}

fn print_topics(catalog: &Catalog) {
    for entry in catalog.subjects() {
        println!("{}", entry.subject.display_name());
        for group in &entry.groups {
            println!("  {} ({})", group.name, group.id);
            for topic in &group.topics {
                println!("    {} ({})", topic.name, topic.id);
            }
        }
    }
}

async fn run() -> Result<(), AppError> {
    let mut argv = std::env::args().skip(1);

    let command = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or(ArgsError::UnknownCommand(first))?,
    };

    let args = Args::parse(command, &mut argv).inspect_err(|_| print_usage())?;
    let catalog = Arc::new(Catalog::medical());

    if command == Command::Topics {
        print_topics(&catalog);
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    match command {
        Command::Quiz => run_quiz(args, storage, catalog).await,
        Command::Report => {
            let service = ProgressService::new(Clock::default(), storage, Arc::clone(&catalog));
            let report = service.report().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, &catalog);
            }
            Ok(())
        }
        Command::Reset => {
            let service = ProgressService::new(Clock::default(), storage, catalog);
            service.reset().await?;
            println!("All quiz data cleared.");
            Ok(())
        }
        Command::Topics => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,medquiz=info,services=info,storage=info")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_accepts_letters_and_numbers() {
        assert_eq!(parse_input("a"), Some(Input::Answer(0)));
        assert_eq!(parse_input(" D \n"), Some(Input::Answer(3)));
        assert_eq!(parse_input("2"), Some(Input::Answer(1)));
        assert_eq!(parse_input("N"), Some(Input::Next));
        assert_eq!(parse_input("q"), Some(Input::Quit));
        assert_eq!(parse_input("5"), None);
        assert_eq!(parse_input(""), None);
    }

    #[test]
    fn topics_are_split_and_trimmed() {
        let topics = split_topics("thorax, renal,,  lab-values ");
        assert_eq!(
            topics,
            vec![
                TopicId::new("thorax"),
                TopicId::new("renal"),
                TopicId::new("lab-values")
            ]
        );
    }

    #[test]
    fn quiz_flags_are_parsed() {
        let mut argv = ["--topics", "thorax,renal", "--count", "5", "--seed", "3", "--db", "sqlite::memory:"]
            .into_iter()
            .map(String::from);
        let args = Args::parse(Command::Quiz, &mut argv).unwrap();
        assert_eq!(args.topics.len(), 2);
        assert_eq!(args.count, 5);
        assert_eq!(args.seed, Some(3));
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn quiz_without_topics_is_rejected() {
        let mut argv = std::iter::empty::<String>();
        assert!(matches!(
            Args::parse(Command::Quiz, &mut argv),
            Err(ArgsError::MissingTopics)
        ));
    }

    #[test]
    fn bad_flags_are_reported() {
        let mut argv = ["--count", "many"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(Command::Report, &mut argv),
            Err(ArgsError::InvalidCount { .. })
        ));
        let mut argv = ["--db"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(Command::Report, &mut argv),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/quiz.db".into()),
            "sqlite:///tmp/quiz.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/quiz.db".into()), "sqlite:///tmp/quiz.db");
    }
}
