use std::fmt;
use std::path::PathBuf;

use quiz_core::SubjectCatalog;
use quiz_core::model::Question;
use storage::repository::QuestionRecord;

#[derive(Debug, Clone)]
struct Args {
    out_dir: PathBuf,
    per_subject: usize,
    overwrite: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCount { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCount { raw } => write!(f, "invalid --per-subject value: {raw}"),
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut out_dir = std::env::var("QUIZ_QUESTIONS_DIR")
            .map_or_else(|_| PathBuf::from("public/questions"), PathBuf::from);
        let mut per_subject = 5;
        let mut overwrite = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out" => {
                    out_dir = PathBuf::from(require_value(&mut args, "--out")?);
                }
                "--per-subject" => {
                    let value = require_value(&mut args, "--per-subject")?;
                    per_subject = value
                        .parse::<usize>()
                        .map_err(|_| ArgsError::InvalidCount { raw: value.clone() })?;
                }
                "--overwrite" => overwrite = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            out_dir,
            per_subject,
            overwrite,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Writes placeholder <subject>.json files for every catalog subject.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --out <dir>               Output directory (default: public/questions)");
    eprintln!("  --per-subject <n>         Questions per subject (default: 5)");
    eprintln!("  --overwrite               Replace existing subject files");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_QUESTIONS_DIR");
}

fn sample_question(display_name: &str, n: usize) -> Result<Question, Box<dyn std::error::Error>> {
    let answers = (0..4)
        .map(|i| format!("{display_name}: option {}", i + 1))
        .collect();
    Ok(Question::new(
        format!("{display_name}, sample question {}", n + 1),
        answers,
        n % 4,
    )?)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    std::fs::create_dir_all(&args.out_dir)?;
    let catalog = SubjectCatalog::default();

    let mut written = 0;
    for subject in catalog.subjects_in_order() {
        let path = args.out_dir.join(format!("{}.json", subject.name));
        if path.exists() && !args.overwrite {
            println!("skip {} (exists)", path.display());
            continue;
        }

        let records = (0..args.per_subject)
            .map(|n| sample_question(&subject.display_name, n).map(|q| QuestionRecord::from_question(&q)))
            .collect::<Result<Vec<_>, _>>()?;
        std::fs::write(&path, serde_json::to_string_pretty(&records)?)?;
        written += 1;
    }

    println!(
        "Seeded {written} subject files into {} ({} questions each).",
        args.out_dir.display(),
        args.per_subject
    );
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
