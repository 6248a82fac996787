use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use quickwatch_core::{
    ChatClient, HighlightMode, LlmHighlightSelector, LlmSummaryGenerator, Orchestrator, Provider,
    QuickWatch, YoutubeTranscriptSource, format_quick_watch_readable, resolve_video_id,
};

mod reel;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    Grok,
    Openai,
    #[default]
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

/// CLI wrapper for HighlightMode
#[derive(Clone, Default, ValueEnum)]
enum CliMode {
    /// Keep the essential transcript lines
    Prune,
    /// Key moments with their own time ranges
    #[default]
    Moments,
}

impl From<CliMode> for HighlightMode {
    fn from(cli: CliMode) -> Self {
        match cli {
            CliMode::Prune => HighlightMode::Prune,
            CliMode::Moments => HighlightMode::KeyMoments,
        }
    }
}

#[derive(Parser)]
#[command(name = "quickwatch", version)]
#[command(about = "Summarize YouTube videos and play their key moments as a highlight reel")]
struct Cli {
    /// Video URL or 11-character video ID
    url: String,

    /// AI provider for summary and highlights
    #[arg(short, long, env = "QUICKWATCH_PROVIDER", default_value = "gemini")]
    provider: CliProvider,

    /// Model override (defaults to the provider's model)
    #[arg(short, long, env = "QUICKWATCH_MODEL")]
    model: Option<String>,

    /// How highlights are picked
    #[arg(long, env = "QUICKWATCH_HIGHLIGHT_MODE", default_value = "moments")]
    mode: CliMode,

    /// Caption language to prefer
    #[arg(short, long, env = "QUICKWATCH_LANG", default_value = "en")]
    lang: String,

    /// Also print the full transcript
    #[arg(short, long)]
    transcript: bool,

    /// Print the raw result as JSON
    #[arg(long, conflicts_with = "play")]
    json: bool,

    /// Play the key moments as an interactive highlight reel
    #[arg(long)]
    play: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .expect("spinner template is valid"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let provider: Provider = cli.provider.into();

    // Validate API key early
    let api_key = match provider.validate_api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let video_id = resolve_video_id(&cli.url)
        .ok_or_else(|| anyhow!("not a YouTube video URL or ID: {}", cli.url))?;

    let mut client = ChatClient::new(provider, api_key);
    if let Some(model) = cli.model {
        client = client.with_model(model);
    }
    let model = client.model().to_string();
    let orchestrator = Orchestrator::new(
        Arc::new(YoutubeTranscriptSource::new(&cli.lang)),
        Arc::new(LlmSummaryGenerator::new(client.clone())),
        Arc::new(LlmHighlightSelector::new(client, cli.mode.into())),
    );

    if !cli.json {
        println!(
            "\n{}  {}\n",
            style("quickwatch").cyan().bold(),
            style(video_id.watch_url()).dim()
        );
    }

    let started = Instant::now();

    let spinner = create_spinner("Fetching transcript...");
    let transcript = match orchestrator.fetch_transcript(&video_id).await {
        Ok(transcript) => transcript,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    let duration_mins = transcript.last().map(|item| item.end() / 60.0).unwrap_or(0.0);
    spinner.finish_with_message(format!(
        "{} Transcript: {} lines, {:.1} min",
        style("✓").green().bold(),
        transcript.len(),
        duration_mins
    ));

    let spinner = create_spinner(&format!(
        "Summarizing and picking key moments with {} ({})...",
        provider.name(),
        model
    ));
    let (summary, key_moments) = match orchestrator.analyze(&transcript).await {
        Ok(analysis) => analysis,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    spinner.finish_with_message(format!(
        "{} Analyzed: {} key moments {}",
        style("✓").green().bold(),
        key_moments.len(),
        style(format!("in {}", format_duration(started.elapsed()))).dim()
    ));

    let quick_watch = QuickWatch {
        transcript,
        summary,
        key_moments,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&quick_watch)?);
        return Ok(());
    }

    println!("\n{}\n", style("─".repeat(60)).dim());
    println!("{}", format_quick_watch_readable(&quick_watch, cli.transcript));

    if cli.play {
        reel::run(&quick_watch).await?;
    }

    Ok(())
}
