use std::fmt;
use std::path::PathBuf;

use quiz_core::model::RANDOM_QUIZ_SIZE;
use services::{AppServices, Clock};
use tokio::io::BufReader;
use tracing::info;

mod play;
mod telemetry;

use play::{Console, PlayOptions};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidRandomSize { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidRandomSize { raw } => {
                write!(f, "invalid --random-size value: {raw}")
            }
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

#[derive(Debug, Clone)]
struct Args {
    questions_dir: PathBuf,
    db_url: String,
    random_size: usize,
    play: PlayOptions,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --questions <dir>        directory of <subject>.json files");
    eprintln!("  --db <sqlite_url>        preference database");
    eprintln!("  --random-size <n>        questions drawn by a random quiz");
    eprintln!("  --asset-base-url <url>   prefix for question image paths");
    eprintln!("  --shuffle-answers        randomize answer order per question");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --questions public/questions");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --random-size {RANDOM_QUIZ_SIZE}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_QUESTIONS_DIR, QUIZ_DB_URL, QUIZ_RANDOM_SIZE, QUIZ_ASSET_BASE_URL");
    eprintln!("  LOG_LEVEL (tracing filter), LOG_FORMAT=json");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut questions_dir = std::env::var("QUIZ_QUESTIONS_DIR")
            .map_or_else(|_| PathBuf::from("public/questions"), PathBuf::from);
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut random_size = std::env::var("QUIZ_RANDOM_SIZE")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(RANDOM_QUIZ_SIZE);
        let mut play = PlayOptions {
            shuffle_answers: false,
            asset_base_url: std::env::var("QUIZ_ASSET_BASE_URL").ok(),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--questions" => {
                    questions_dir = PathBuf::from(require_value(args, "--questions")?);
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--random-size" => {
                    let value = require_value(args, "--random-size")?;
                    random_size = value
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidRandomSize { raw: value })?;
                }
                "--asset-base-url" => {
                    play.asset_base_url = Some(require_value(args, "--asset-base-url")?);
                }
                "--shuffle-answers" => play.shuffle_answers = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            questions_dir,
            db_url,
            random_size,
            play,
        })
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
            .unwrap_or_else(|_| PathBuf::from("."))
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    telemetry::init_tracing();

    // Open + migrate SQLite before the first prompt.
    prepare_sqlite_file(&args.db_url)?;
    let app = AppServices::open(&args.questions_dir, &args.db_url, Clock::system())
        .await?
        .with_random_sample_size(args.random_size);
    info!(
        questions = %args.questions_dir.display(),
        db = %args.db_url,
        random_size = args.random_size,
        "quiz ready"
    );

    let mut console = Console::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    play::run(&app, &args.play, &mut console).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(&mut args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--questions",
            "data/q",
            "--db",
            "sqlite::memory:",
            "--random-size",
            "10",
            "--asset-base-url",
            "https://cdn.example/",
            "--shuffle-answers",
        ])
        .unwrap();
        assert_eq!(args.questions_dir, PathBuf::from("data/q"));
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.random_size, 10);
        assert_eq!(args.play.asset_base_url.as_deref(), Some("https://cdn.example/"));
        assert!(args.play.shuffle_answers);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(&["--random-size", "0"]),
            Err(ArgsError::InvalidRandomSize { .. })
        ));
        assert!(matches!(
            parse(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(parse(&["--bogus"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite://already/there.db".into()),
            "sqlite://already/there.db"
        );
    }
}
