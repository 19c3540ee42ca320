use std::fmt;

use chrono::{DateTime, Duration, Utc};
use storage::repository::Storage;
use track_core::model::{CertificateKind, Course, CourseId, RoleId, UserId};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    courses: u32,
    completed: u32,
    certificates: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidCount { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user-id value: {raw}"),
            ArgsError::InvalidCount { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
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

fn parse_count(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<u32, ArgsError> {
    let value = require_value(args, flag)?;
    value
        .parse::<u32>()
        .map_err(|_| ArgsError::InvalidCount { flag, raw: value })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("TRACK_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user_id = std::env::var("TRACK_USER_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| UserId::new(1), UserId::new);
        let mut courses = std::env::var("TRACK_COURSES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(4);
        let mut completed = std::env::var("TRACK_COMPLETED")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut certificates = std::env::var("TRACK_CERTIFICATES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(2);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user-id" => {
                    let value = require_value(&mut args, "--user-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = UserId::new(parsed);
                }
                "--courses" => courses = parse_count(&mut args, "--courses")?,
                "--completed" => completed = parse_count(&mut args, "--completed")?,
                "--certificates" => certificates = parse_count(&mut args, "--certificates")?,
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            courses,
            completed,
            certificates,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>      SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --user-id <id>         User to enroll (default: 1)");
    eprintln!("  --courses <n>          Courses to create and enroll into (default: 4)");
    eprintln!("  --completed <n>        Courses to mark completed (default: 3)");
    eprintln!("  --certificates <n>     Courses to issue certificates for (default: 2)");
    eprintln!("  --now <rfc3339>        Fixed current time for deterministic seeding");
    eprintln!("  -h, --help             Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  TRACK_DB_URL, TRACK_USER_ID, TRACK_COURSES, TRACK_COMPLETED, TRACK_CERTIFICATES");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let samples = [
        "Workplace Safety",
        "First Aid Basics",
        "Data Protection",
        "Fire Awareness",
        "Manual Handling",
    ];

    for i in 0..args.courses {
        let idx = (i as usize) % samples.len();
        let course_id = CourseId::new(u64::from(i + 1));
        let course = Course::new(course_id, samples[idx], true)?;
        storage.enrollments.upsert_course(&course).await?;
        storage
            .enrollments
            .assign_role(args.user_id, course_id, RoleId::STUDENT)
            .await?;

        // Enrollment creates a tracking row; only completed courses get a timestamp.
        let completed_at = if i < args.completed {
            Some(now - Duration::days(i64::from(args.courses - i)))
        } else {
            None
        };
        storage
            .completions
            .mark_completed(args.user_id, course_id, completed_at)
            .await?;

        if i < args.certificates {
            storage
                .completions
                .issue_certificate(args.user_id, course_id, CertificateKind::Standard, now)
                .await?;
        }
    }

    println!(
        "Seeded {} courses for user {} ({} completed, {} with certificates) into {}",
        args.courses,
        args.user_id.value(),
        args.completed.min(args.courses),
        args.certificates.min(args.courses),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
