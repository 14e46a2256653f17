use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use deepsite_core::assistant::canonical_root;
use deepsite_core::crawl::{crawl_spinner, generate_crawl_report, with_progress};
use deepsite_core::{
    AnswerEngine, Assistant, InMemorySessionStore, OllamaEngine, SessionStore, Settings,
    SummaryReport,
};
use deepsite_scanner::Crawler;
use indicatif::ProgressBar;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Log to stderr, filtered by `RUST_LOG` (defaults to warnings only).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Try to parse as-is ("localhost:8080" parses with a "localhost" scheme)
    if Url::parse(line).is_ok_and(|url| matches!(url.scheme(), "http" | "https")) {
        return Some(line.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("⚠️  Skipping invalid URL '{}'", line);
    None
}

/// Load questions from a file, one per line. Blank lines and lines starting
/// with `#` are ignored.
pub fn load_questions_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read questions file {}: {}", path.display(), e))?;

    let questions: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();

    if questions.is_empty() {
        return Err(format!("No questions found in {}", path.display()));
    }

    Ok(questions)
}

/// Crawl settings given on the command line. Each one set replaces the value
/// read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOverrides {
    pub max_pages: Option<usize>,
    pub max_depth: Option<usize>,
    pub parallel_fetches: Option<usize>,
    pub no_sitemap: bool,
}

impl CrawlOverrides {
    pub fn from_matches(args: &ArgMatches) -> Self {
        Self {
            max_pages: args.get_one::<usize>("max-pages").copied(),
            max_depth: args.get_one::<usize>("max-depth").copied(),
            parallel_fetches: args.get_one::<usize>("parallel").copied(),
            no_sitemap: args.get_flag("no-sitemap"),
        }
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(max_pages) = self.max_pages {
            settings.crawl.max_pages = max_pages;
        }
        if let Some(max_depth) = self.max_depth {
            settings.crawl.max_depth = max_depth;
        }
        if let Some(parallel) = self.parallel_fetches {
            settings.crawl.parallel_fetches = parallel.max(1);
        }
        if self.no_sitemap {
            settings.crawl.use_sitemap = false;
        }
    }
}

/// Format a summary report for the terminal
pub fn render_summary(report: &SummaryReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "═".repeat(60).bright_blue().bold()));
    out.push_str(&format!(
        "  {} ({} pages)\n",
        "SITE SUMMARY".bright_white().bold(),
        report.pages_crawled
    ));
    out.push_str(&format!("{}\n\n", "═".repeat(60).bright_blue().bold()));
    out.push_str(report.summary.trim());
    out.push_str("\n\n");
    out.push_str(&format!(
        "{} {}\n",
        "Session:".bright_black(),
        report.session_id.bright_black()
    ));
    out
}

fn load_settings(args: &ArgMatches) -> Result<Settings> {
    let mut settings = Settings::from_env().context("Failed to load settings")?;
    CrawlOverrides::from_matches(args).apply(&mut settings);
    debug!("Using settings {:?}", settings);
    Ok(settings)
}

fn root_url(args: &ArgMatches) -> Result<String> {
    let raw = args
        .get_one::<String>("url")
        .context("--url must be provided")?;
    let Some(url) = parse_url_line(raw) else {
        bail!("'{}' is not a valid URL", raw);
    };
    Ok(canonical_root(&url)?)
}

fn build_assistant(settings: &Settings, spinner: Option<Arc<ProgressBar>>) -> Result<Assistant> {
    let crawler = Crawler::new(settings.crawl.clone()).context("Failed to build HTTP client")?;
    let crawler = with_progress(crawler, spinner);
    let engine: Arc<dyn AnswerEngine> = Arc::new(
        OllamaEngine::new(settings.ollama.clone()).context("Failed to build answer engine")?,
    );
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    Ok(Assistant::new(crawler, store, engine))
}

fn finish_spinner(spinner: &Option<Arc<ProgressBar>>) {
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> Result<()> {
    let settings = load_settings(args)?;
    let root = root_url(args)?;

    if !quiet {
        println!("\n🕷️  Crawling {}", root);
        println!("Max pages: {}", settings.crawl.max_pages);
        println!("Max depth: {}", settings.crawl.max_depth);
        println!("Parallel fetches: {}\n", settings.crawl.parallel_fetches);
    }

    let spinner = crawl_spinner(!quiet);
    let crawler = Crawler::new(settings.crawl.clone()).context("Failed to build HTTP client")?;
    let crawler = with_progress(crawler, spinner.clone());

    let result = crawler.crawl_site(&root).await;
    finish_spinner(&spinner);
    let session = result?;

    if !quiet {
        println!("✓ Crawl complete!\n");
    }
    print!("{}", generate_crawl_report(&session));
    Ok(())
}

pub async fn handle_summarize(args: &ArgMatches, quiet: bool) -> Result<()> {
    let settings = load_settings(args)?;
    let root = root_url(args)?;
    let as_json = args.get_flag("json");

    let spinner = crawl_spinner(!quiet && !as_json);
    let assistant = build_assistant(&settings, spinner.clone())?;

    let result = assistant.summarize(&root).await;
    finish_spinner(&spinner);
    let report = result?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_summary(&report));
    }
    Ok(())
}

pub async fn handle_ask(args: &ArgMatches, quiet: bool) -> Result<()> {
    let settings = load_settings(args)?;
    let root = root_url(args)?;

    let mut questions: Vec<String> = args
        .get_many::<String>("question")
        .map(|values| {
            values
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if let Some(path) = args.get_one::<std::path::PathBuf>("questions-file") {
        questions.extend(load_questions_from_file(path).map_err(anyhow::Error::msg)?);
    }

    let spinner = crawl_spinner(!quiet);
    let assistant = build_assistant(&settings, spinner.clone())?;

    let result = assistant.summarize(&root).await;
    finish_spinner(&spinner);
    let report = result?;

    if !args.get_flag("no-summary") {
        print!("{}", render_summary(&report));
    }

    if questions.is_empty() {
        return interactive_questions(&assistant, &report.session_id, quiet).await;
    }

    for question in &questions {
        answer_question(&assistant, &report.session_id, question).await;
    }
    Ok(())
}

async fn answer_question(assistant: &Assistant, session_id: &str, question: &str) {
    println!("\n{} {}", "?".bright_cyan().bold(), question.bright_white().bold());
    match assistant.ask(session_id, question).await {
        Ok(answer) => println!("{}\n", answer),
        // One failed question does not end the session
        Err(e) => eprintln!("{} {}\n", "✗".red().bold(), e),
    }
}

/// Read the next interactive question. `None` on end of input or an empty line.
pub async fn next_question<R>(lines: &mut Lines<R>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let Some(line) = lines.next_line().await? else {
        return Ok(None);
    };
    let question = line.trim();
    if question.is_empty() {
        return Ok(None);
    }
    Ok(Some(question.to_string()))
}

async fn interactive_questions(
    assistant: &Assistant,
    session_id: &str,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        println!(
            "{}",
            "Ask a question about the site (empty line or Ctrl-D to quit)".bright_black()
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".bright_cyan().bold());
        io::stdout().flush()?;

        let Some(question) = next_question(&mut lines).await? else {
            break;
        };
        answer_question(assistant, session_id, &question).await;
    }
    Ok(())
}
