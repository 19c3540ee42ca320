use std::fmt;

use services::WidgetServices;
use track_core::model::{EvidenceSource, RoleId, UserId, WidgetConfig};
use url::Url;
use widget::{CompletionWidget, Widget};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidRoleId { raw: String },
    InvalidEvidence { raw: String },
    InvalidSiteRoot { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user-id value: {raw}"),
            ArgsError::InvalidRoleId { raw } => write!(f, "invalid --role-id value: {raw}"),
            ArgsError::InvalidEvidence { raw } => {
                write!(
                    f,
                    "invalid --evidence value: {raw} (expected completion or certificates)"
                )
            }
            ArgsError::InvalidSiteRoot { raw } => write!(f, "invalid --site-root value: {raw}"),
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

fn parse_evidence(raw: &str) -> Option<EvidenceSource> {
    match raw {
        "completion" | "completion-tracking" => Some(EvidenceSource::CompletionTracking),
        "certificates" | "certs" => Some(EvidenceSource::Certificates),
        _ => None,
    }
}

struct Args {
    db_url: String,
    user_id: UserId,
    role: RoleId,
    evidence: EvidenceSource,
    site_root: Url,
    locale: String,
    title: Option<String>,
    text: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TRACK_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut user_id = std::env::var("TRACK_USER_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| UserId::new(1), UserId::new);
        let mut site_root = std::env::var("TRACK_SITE_ROOT")
            .ok()
            .and_then(|value| Url::parse(&value).ok())
            .unwrap_or_else(|| {
                Url::parse("http://localhost").expect("static site root should parse")
            });
        let mut role = RoleId::STUDENT;
        let mut evidence = EvidenceSource::default();
        let mut locale = "en".to_owned();
        let mut title: Option<String> = None;
        let mut text: Option<String> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user-id" => {
                    let value = require_value(args, "--user-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = UserId::new(parsed);
                }
                "--role-id" => {
                    let value = require_value(args, "--role-id")?;
                    let parsed: u32 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidRoleId { raw: value.clone() })?;
                    role = RoleId::new(parsed);
                }
                "--evidence" => {
                    let value = require_value(args, "--evidence")?;
                    evidence = parse_evidence(&value)
                        .ok_or(ArgsError::InvalidEvidence { raw: value.clone() })?;
                }
                "--site-root" => {
                    let value = require_value(args, "--site-root")?;
                    site_root = Url::parse(&value)
                        .map_err(|_| ArgsError::InvalidSiteRoot { raw: value.clone() })?;
                }
                "--locale" => {
                    locale = require_value(args, "--locale")?;
                }
                "--title" => {
                    title = Some(require_value(args, "--title")?);
                }
                "--text" => {
                    text = Some(require_value(args, "--text")?);
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
            role,
            evidence,
            site_root,
            locale,
            title,
            text,
        })
    }

    fn into_config(self) -> (String, UserId, WidgetConfig) {
        let mut config = WidgetConfig::new(self.site_root)
            .with_role(self.role)
            .with_evidence(self.evidence)
            .with_locale(self.locale);
        if let Some(title) = self.title {
            config = config.with_title(title);
        }
        if let Some(text) = self.text {
            config = config.with_text(text);
        }
        (self.db_url, self.user_id, config)
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>        SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --user-id <id>           User to render for (default: 1)");
    eprintln!("  --role-id <id>           Role the count filters on (default: 5)");
    eprintln!("  --evidence <source>      completion | certificates (default: completion)");
    eprintln!("  --site-root <url>        Site root for the report link (default: http://localhost)");
    eprintln!("  --locale <code>          Display language (default: en)");
    eprintln!("  --title <text>           Per-instance title override");
    eprintln!("  --text <html>            Per-instance content override");
    eprintln!("  -h, --help               Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACK_DB_URL, TRACK_USER_ID, TRACK_SITE_ROOT");
    eprintln!();
    eprintln!("Seed sample data with: cargo run -p storage --bin seed");
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let (db_url, user_id, config) = args.into_config();

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&db_url)?;
    let services = WidgetServices::new_sqlite(&db_url).await?;

    let mut widget = CompletionWidget::new(user_id, config, services.completion());
    widget.init();
    widget.specialization();
    let content = widget.content().await?;

    println!("{}", widget.title());
    println!("{}", content.text);

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
