//! Doctor command - verify system requirements and configuration.

use super::init::install_hint_ytdlp;
use crate::cli::Output;
use crate::config::Settings;
use crate::source::read_video_ids;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, api_key: Option<&str>) -> anyhow::Result<()> {
    Output::header("Codee Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    let tools = vec![check_ytdlp(settings)];
    print_section("External Tools", &tools);
    checks.extend(tools);

    let api = vec![check_api_key(api_key), check_access(settings)];
    print_section("API Configuration", &api);
    checks.extend(api);

    let corpus = check_corpus(settings);
    print_section("Course Corpus", &corpus);
    checks.extend(corpus);

    let storage = check_storage(settings);
    print_section("Storage", &storage);
    checks.extend(storage);

    let config = vec![check_config_file()];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Codee.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Codee is ready to use.");
    }

    Ok(())
}

fn check_ytdlp(settings: &Settings) -> CheckResult {
    if let Some(dir) = settings.transcript_dir() {
        return CheckResult::ok(
            "yt-dlp",
            &format!("not needed (transcripts from {})", dir.display()),
        );
    }

    match Command::new("yt-dlp").arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();
            CheckResult::ok("yt-dlp", &version)
        }
        Ok(_) => CheckResult::error("yt-dlp", "installed but not working", install_hint_ytdlp()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error("yt-dlp", "not found", install_hint_ytdlp())
        }
        Err(e) => CheckResult::error("yt-dlp", &format!("error: {}", e), install_hint_ytdlp()),
    }
}

/// Check the supplied OpenAI API key.
fn check_api_key(api_key: Option<&str>) -> CheckResult {
    match api_key.map(str::trim) {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            CheckResult::ok("OpenAI API key", &format!("supplied ({})", mask_key(key)))
        }
        Some(key) if !key.is_empty() => CheckResult::warning(
            "OpenAI API key",
            "supplied but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        _ => CheckResult::error(
            "OpenAI API key",
            "not supplied",
            "Pass --api-key or set OPENAI_API_KEY",
        ),
    }
}

fn check_access(settings: &Settings) -> CheckResult {
    match &settings.access.expected_api_key {
        Some(key) if !key.trim().is_empty() => CheckResult::ok(
            "Access gate",
            &format!("only {} is accepted", mask_key(key.trim())),
        ),
        _ => CheckResult::warning(
            "Access gate",
            "any non-empty key is accepted",
            "Set access.expected_api_key to restrict the tutor to one key",
        ),
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_corpus(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let slides_dir = settings.slides_dir();
    match std::fs::read_dir(&slides_dir) {
        Ok(entries) => {
            let decks = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "pptx"))
                .count();
            if decks > 0 {
                results.push(CheckResult::ok(
                    "Slides",
                    &format!("{} decks in {}", decks, slides_dir.display()),
                ));
            } else {
                results.push(CheckResult::warning(
                    "Slides",
                    &format!("no .pptx files in {}", slides_dir.display()),
                    "Copy the course slide decks there",
                ));
            }
        }
        Err(_) => results.push(CheckResult::warning(
            "Slides",
            &format!("{} not found", slides_dir.display()),
            "Set sources.slides_dir or pass --slides to ingest",
        )),
    }

    let ids_path = settings.video_ids_file();
    match read_video_ids(&ids_path) {
        Ok(ids) => results.push(CheckResult::ok(
            "Videos",
            &format!("{} ids in {}", ids.len(), ids_path.display()),
        )),
        Err(e) => results.push(CheckResult::warning(
            "Videos",
            &e.to_string(),
            "Set sources.video_ids_file or pass --videos to ingest",
        )),
    }

    results
}

fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let db_path = settings.sqlite_path();
    if db_path.exists() {
        let size = std::fs::metadata(&db_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        results.push(CheckResult::ok(
            "Index",
            &format!("{} ({})", db_path.display(), size),
        ));
    } else {
        results.push(CheckResult::warning(
            "Index",
            &format!("{} (not created yet)", db_path.display()),
            "Run: codee ingest",
        ));
    }

    match &settings.feedback.endpoint {
        Some(endpoint) => results.push(CheckResult::ok(
            "Feedback",
            &format!("{} (project {})", endpoint, settings.feedback.project),
        )),
        None => results.push(CheckResult::ok(
            "Feedback",
            &format!("logged to {}", settings.feedback_log_path().display()),
        )),
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: codee init (or codee config edit)",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
