use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::IdentityDraft;
use services::{
    COMMUNITY_LINKS, Clock, CountdownTick, QuizSessionService, REDIRECT_DELAY_MS, SubmitOutcome,
    SurveyPhase, SurveySubmissionService,
};
use storage::repository::Storage;
use storage::session::{InMemorySessionStore, SessionStore};
use tokio::sync::mpsc;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url })
    }
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
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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

/// Bridge blocking stdin onto a channel the select loop can poll.
fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut buf = String::new();
        loop {
            buf.clear();
            match stdin.read_line(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.blocking_send(buf.trim().to_string()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

async fn prompt(lines: &mut mpsc::Receiver<String>, label: &str) -> Option<String> {
    println!("{label}");
    lines.recv().await
}

async fn collect_identity(lines: &mut mpsc::Receiver<String>) -> Option<IdentityDraft> {
    let email = prompt(lines, "Email:").await?;
    let twitter = prompt(lines, "Twitter handle:").await?;
    let whatsapp = prompt(lines, "WhatsApp number:").await?;
    Some(IdentityDraft::new(email, twitter, whatsapp))
}

fn print_question(service: &QuizSessionService) {
    let Some(question) = service.current_question() else {
        return;
    };
    println!();
    println!(
        "Question {}/{} ({}s left)",
        service.current_index() + 1,
        service.questions().len(),
        service.remaining_seconds()
    );
    println!("{}", question.prompt());
    for (i, option) in question.options().iter().enumerate() {
        let marker = if service.responses().get(service.current_index()) == Some(option.as_str()) {
            "*"
        } else {
            " "
        };
        println!(" {marker}{}. {option}", i + 1);
    }
    println!("[1-4] answer, [n]ext, [p]revious, [s]ubmit");
}

async fn run_quiz(
    service: &mut QuizSessionService,
    lines: &mut mpsc::Receiver<String>,
) -> Result<Option<SubmitOutcome>, Box<dyn std::error::Error>> {
    let stored = service.stored_identity();
    if !stored.email.is_empty() {
        println!("Welcome back, {}.", stored.email);
    }

    loop {
        let Some(draft) = collect_identity(lines).await else {
            return Ok(None);
        };
        match service.start_quiz(draft) {
            Ok(()) => break,
            Err(e) => println!("{}", e.user_message()),
        }
    }

    print_question(service);
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // the first tick fires immediately

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if service.tick() == CountdownTick::Expired {
                    println!("\nTime is up, submitting your answers.");
                    match service.submit().await {
                        Ok(outcome) => return Ok(Some(outcome)),
                        Err(e) => {
                            println!("{}", e.user_message());
                            return Ok(None);
                        }
                    }
                }
            }
            line = lines.recv() => {
                let Some(line) = line else { return Ok(None) };
                match line.as_str() {
                    "1" | "2" | "3" | "4" => {
                        let idx = line.parse::<usize>()? - 1;
                        let option = service
                            .current_question()
                            .and_then(|q| q.options().get(idx).cloned());
                        if let Some(option) = option {
                            service.select_option(&option)?;
                        }
                        print_question(service);
                    }
                    "n" | "next" => {
                        service.advance();
                        print_question(service);
                    }
                    "p" | "prev" | "previous" => {
                        service.retreat();
                        print_question(service);
                    }
                    "s" | "submit" => match service.submit().await {
                        Ok(outcome) => return Ok(Some(outcome)),
                        Err(e) => println!("{}", e.user_message()),
                    },
                    "" => print_question(service),
                    other => println!("unrecognized input: {other}"),
                }
            }
        }
    }
}

async fn collect_rating(lines: &mut mpsc::Receiver<String>, label: &str) -> Option<Option<u8>> {
    let raw = prompt(lines, label).await?;
    if raw.is_empty() {
        return Some(None);
    }
    Some(raw.parse::<u8>().ok())
}

async fn run_survey(
    service: &mut SurveySubmissionService,
    lines: &mut mpsc::Receiver<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if service.phase() == SurveyPhase::AwaitingResult {
        println!("User data not found! Please complete the quiz first.");
        return Ok(());
    }

    println!();
    println!("One last thing: a short survey.");
    loop {
        let Some(recommendation) = prompt(lines, "Who told you about the community?").await else {
            return Ok(());
        };
        let Some(time_in_community) =
            prompt(lines, "How long have you been in the community?").await
        else {
            return Ok(());
        };
        let Some(earnings) = prompt(lines, "What have you earned so far?").await else {
            return Ok(());
        };
        let Some(passion_rating) =
            collect_rating(lines, "How passionate are you, 1-10? (enter to skip)").await
        else {
            return Ok(());
        };
        let Some(recommend_rating) =
            collect_rating(lines, "Would you recommend us, 1-10? (enter to skip)").await
        else {
            return Ok(());
        };

        let draft = quiz_core::model::SurveyDraft {
            recommendation,
            time_in_community,
            earnings,
            passion_rating,
            recommend_rating,
        };

        match service.submit_survey(draft).await {
            Ok(confirmation) => {
                println!("{}", confirmation.message);
                tokio::time::sleep(confirmation.visible_for).await;
                println!();
                println!("Join the community:");
                for link in COMMUNITY_LINKS {
                    println!("  {} - {}", link.label, link.url);
                }
                return Ok(());
            }
            Err(e) => {
                println!("{}", e.user_message());
                if service.phase() != SurveyPhase::FormVisible {
                    return Ok(());
                }
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    log::info!("using database {}", parsed.db_url);

    let session: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let mut lines = stdin_lines();

    let mut quiz = QuizSessionService::new(
        Clock::default_clock(),
        Arc::clone(&storage.records),
        Arc::clone(&session),
    );
    let Some(outcome) = run_quiz(&mut quiz, &mut lines).await? else {
        return Ok(());
    };

    println!();
    println!(
        "You scored {}/{}.",
        outcome.result.score(),
        quiz.questions().len()
    );
    tokio::time::sleep(Duration::from_millis(REDIRECT_DELAY_MS)).await;

    let mut survey = SurveySubmissionService::new(Arc::clone(&storage.records), session);
    run_survey(&mut survey, &mut lines).await
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
