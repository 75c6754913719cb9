mod db;
mod fetcher;
mod llm;
mod parser;
mod server;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use crate::parser::extract::CardReport;

#[derive(Parser)]
#[command(name = "card_grader", about = "AI card grader: template-filling review + markdown extraction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a card URL, fill the review template via the LLM, extract a report
    Grade {
        /// URL of the model/dataset card
        #[arg(long)]
        url: String,
        /// Path to the Markdown review template
        #[arg(long, default_value = llm::DEFAULT_TEMPLATE)]
        template: String,
        /// Output folder for the filled evaluation markdown
        #[arg(long, default_value = "evaluations")]
        outdir: String,
        /// Do not fetch page text; only send URL + template
        #[arg(long)]
        no_fetch: bool,
    },
    /// Serve the grading HTTP API
    Serve {
        #[arg(short, long, default_value = "8000")]
        port: u16,
        /// Path to the Markdown review template
        #[arg(long, default_value = llm::DEFAULT_TEMPLATE)]
        template: String,
    },
    /// Re-extract reports for stored evaluations that lack one
    Process {
        /// Max evaluations to process (default: all unprocessed)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Graded cards overview table
    Overview {
        /// Filter by label (Excellent, Good, Fair, Poor)
        #[arg(short, long)]
        label: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show store statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade { url, template, outdir, no_fetch } => {
            grade(&url, &template, &outdir, no_fetch).await
        }
        Commands::Serve { port, template } => serve(port, &template).await,
        Commands::Process { limit } => process(limit),
        Commands::Overview { label, limit } => overview(label.as_deref(), limit),
        Commands::Stats => stats(),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

async fn grade(url: &str, template_path: &str, outdir: &str, no_fetch: bool) -> Result<()> {
    let conn = db::connect()?;
    db::init_schema(&conn)?;

    let template_md = llm::load_template(template_path)?;
    let client = llm::LlmClient::from_env()?;

    let page_text = if no_fetch {
        String::new()
    } else {
        let http = reqwest::Client::new();
        match fetcher::fetch_page_text(&http, url).await {
            Ok(text) => text,
            Err(e) => {
                warn!("failed to fetch URL text ({e}), continuing with URL only");
                String::new()
            }
        }
    };

    println!("Filling template with {}...", client.model);
    let prompt = llm::build_prompt(&template_md, url, &page_text);
    let filled_md = client.fill_template(&prompt).await?;

    let report = parser::process_markdown(&filled_md);
    let id = db::insert_evaluation(&conn, url, &client.model, &filled_md)?;
    db::save_report(&conn, id, &report)?;

    let outpath = write_output(outdir, url, &filled_md)?;
    println!("Wrote {}", outpath);
    print_report(&report);
    Ok(())
}

async fn serve(port: u16, template_path: &str) -> Result<()> {
    let conn = db::connect()?;
    db::init_schema(&conn)?;

    let state = server::AppState {
        llm: Arc::new(llm::LlmClient::from_env()?),
        http: reqwest::Client::new(),
        template: Arc::new(llm::load_template(template_path)?),
        db: Arc::new(Mutex::new(conn)),
    };
    server::run(port, state).await
}

fn process(limit: Option<usize>) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let conn = db::connect()?;
    db::init_schema(&conn)?;

    let pending = db::fetch_unprocessed(&conn, limit)?;
    if pending.is_empty() {
        println!("No unprocessed evaluations. Run 'grade' first.");
        return Ok(());
    }
    println!("Processing {} evaluations...", pending.len());

    let pb = ProgressBar::new(pending.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut scored = 0usize;
    for chunk in pending.chunks(500) {
        let results: Vec<(i64, CardReport)> = chunk
            .par_iter()
            .map(|e| {
                let report = parser::process_markdown(&e.markdown);
                if report.score.value.is_none() {
                    debug!("no score parsed for {}", e.url);
                }
                (e.id, report)
            })
            .collect();

        scored += results.iter().filter(|(_, r)| r.score.value.is_some()).count();
        db::save_reports(&conn, &results)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    println!("Saved {} reports ({} with a parsed score).", pending.len(), scored);
    Ok(())
}

fn overview(label: Option<&str>, limit: usize) -> Result<()> {
    let conn = db::connect()?;
    db::init_schema(&conn)?;

    let rows = db::fetch_overview(&conn, label, limit)?;
    if rows.is_empty() {
        println!("No graded cards found.");
        return Ok(());
    }

    println!(
        "{:>3} | {:<44} | {:>6} | {:<9} | {:>5} | {:>7}",
        "#", "Card", "Score", "Label", "Items", "Missing"
    );
    println!("{}", "-".repeat(90));

    for (i, r) in rows.iter().enumerate() {
        let card = if r.title.is_empty() { &r.url } else { &r.title };
        let score = r.score.map(|s| format!("{:.1}", s)).unwrap_or_else(|| "-".into());
        println!(
            "{:>3} | {:<44} | {:>6} | {:<9} | {:>5} | {:>7}",
            i + 1,
            truncate(card, 44),
            score,
            r.label,
            r.total_items,
            r.missing
        );
    }

    println!("\n{} cards", rows.len());
    Ok(())
}

fn stats() -> Result<()> {
    let conn = db::connect()?;
    db::init_schema(&conn)?;
    let s = db::get_stats(&conn)?;
    println!("Evaluations: {}", s.evaluations);
    println!("Processed:   {}", s.processed);
    println!("Unprocessed: {}", s.unprocessed);
    println!("Scored:      {}", s.scored);
    Ok(())
}

fn print_report(report: &CardReport) {
    match (report.score.value, report.score.label) {
        (Some(value), Some(label)) => println!("Score: {:.1}/100 ({})", value, label),
        _ => println!("Score: -"),
    }
    println!(
        "Categories: {} | Standards: {} present, {} partial, {} missing",
        report.categories.len(),
        report.standards.present,
        report.standards.partial,
        report.standards.missing
    );
    println!("{}", report.details);
}

fn write_output(outdir: &str, url: &str, markdown: &str) -> Result<String> {
    std::fs::create_dir_all(outdir)?;
    let path = std::path::Path::new(outdir).join(format!("{}.md", sanitize_filename(url)));
    std::fs::write(&path, markdown)?;
    Ok(path.display().to_string())
}

fn sanitize_filename(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    let stripped = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    let mut out = String::new();
    for c in stripped.chars() {
        match c {
            'a'..='z' | '0'..='9' | '.' | '_' | '-' => out.push(c),
            '/' => out.push('_'),
            _ if out.ends_with('-') => {}
            _ => out.push('-'),
        }
    }
    let out = out.trim_matches('-').to_string();
    if out.is_empty() {
        "card".to_string()
    } else {
        out.chars().take(120).collect()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
