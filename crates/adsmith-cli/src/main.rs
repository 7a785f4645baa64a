use std::path::PathBuf;

use adsmith_core::adapters::http;
use adsmith_core::app::{GenerationStatus, OrchestratorBuilder, RequestOrchestrator};
use adsmith_core::config::Settings;
use adsmith_core::domain::{
    ArtifactId, AspectRatio, Brief, Generation, MediaClass, ServiceId, brief::DEFAULT_SIZE,
};
use adsmith_core::ports::{ArtifactExport, default_filename};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

mod capture;
mod export;

use export::HttpArtifactExport;

const DEFAULT_VIDEO_SERVICE: &str = "veo-3-quality";

#[derive(Debug, Parser)]
#[command(name = "adsmith", version, about = "Generate ad creatives with generative AI providers")]
struct Cli {
    /// Config file (default: <config dir>/adsmith/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate image ads
    Image(ImageArgs),
    /// Generate video ads
    Video(VideoArgs),
    /// Generate one more artifact from an earlier artifact's brief
    Regenerate { artifact_id: String },
    /// Show or clear the generation history
    History {
        media: MediaArg,
        #[arg(long)]
        clear: bool,
    },
    /// Save an artifact's content to a file
    Export {
        artifact_id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the registered services
    Services,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MediaArg {
    Image,
    Video,
}

impl From<MediaArg> for MediaClass {
    fn from(arg: MediaArg) -> Self {
        match arg {
            MediaArg::Image => MediaClass::Image,
            MediaArg::Video => MediaClass::Video,
        }
    }
}

#[derive(Debug, Args)]
struct BriefArgs {
    #[arg(long, default_value = "")]
    headline: String,
    #[arg(long, default_value = "")]
    secondary: String,
    #[arg(long, default_value = "")]
    cta: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "modern-marketing")]
    style: String,
    #[arg(long, default_value_t = 1)]
    count: u32,
    /// Service id; see `adsmith services`
    #[arg(long)]
    service: Option<String>,
    /// Reference image for contextual generation
    #[arg(long, requires = "context")]
    reference: Option<PathBuf>,
    /// How the reference image should be used
    #[arg(long)]
    context: Option<String>,
}

impl BriefArgs {
    async fn into_brief(self, default_service: &str) -> Result<Brief> {
        let service = self.service.unwrap_or_else(|| default_service.to_string());
        let mut brief = Brief::new(service.as_str())
            .with_headline(self.headline)
            .with_secondary_text(self.secondary)
            .with_cta(self.cta)
            .with_description(self.description)
            .with_style(self.style)
            .with_count(self.count);
        if let Some(path) = &self.reference {
            let context = self.context.as_deref().unwrap_or_default();
            brief = brief.with_reference(capture::capture(path, context).await?);
        }
        Ok(brief)
    }
}

#[derive(Debug, Args)]
struct ImageArgs {
    #[command(flatten)]
    brief: BriefArgs,
    /// 1024x1024, 1792x1024 or 1024x1792
    #[arg(long, default_value = DEFAULT_SIZE)]
    size: String,
}

#[derive(Debug, Args)]
struct VideoArgs {
    #[command(flatten)]
    brief: BriefArgs,
    /// 16:9 or 9:16
    #[arg(long, default_value = "16:9", value_parser = parse_aspect)]
    aspect: AspectRatio,
}

fn parse_aspect(s: &str) -> Result<AspectRatio, String> {
    AspectRatio::parse(s).ok_or_else(|| format!("unsupported aspect ratio '{s}'"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    let orchestrator = OrchestratorBuilder::from_settings(&settings)
        .context("failed to set up providers")?
        .build()
        .await
        .context("failed to start orchestrator")?;

    match cli.command {
        Command::Image(args) => {
            let brief = args
                .brief
                .into_brief(&settings.general.primary_service)
                .await?
                .with_size(args.size);
            ensure_media(&brief.service, MediaClass::Image, orchestrator.media_class(&brief.service))?;
            run(&orchestrator, MediaClass::Image, Request::Generate(brief)).await
        }
        Command::Video(args) => {
            let brief = args
                .brief
                .into_brief(DEFAULT_VIDEO_SERVICE)
                .await?
                .with_aspect(args.aspect);
            ensure_media(&brief.service, MediaClass::Video, orchestrator.media_class(&brief.service))?;
            run(&orchestrator, MediaClass::Video, Request::Generate(brief)).await
        }
        Command::Regenerate { artifact_id } => {
            let id = parse_artifact_id(&artifact_id)?;
            let Some(artifact) = orchestrator.find_artifact(id).await else {
                bail!("artifact {id} not found in history");
            };
            let media = artifact.media_class;
            run(&orchestrator, media, Request::Regenerate(Box::new(artifact))).await
        }
        Command::History { media, clear } => {
            let media = MediaClass::from(media);
            if clear {
                orchestrator.clear_history(media).await;
                eprintln!("cleared {media} history");
                return Ok(());
            }
            let entries = orchestrator.history(media).await;
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(())
        }
        Command::Export { artifact_id, out } => {
            let id = parse_artifact_id(&artifact_id)?;
            let Some(artifact) = orchestrator.find_artifact(id).await else {
                bail!("artifact {id} not found in history");
            };
            let target = out.unwrap_or_else(|| PathBuf::from(default_filename(artifact.media_class)));
            let client = http::build_client(settings.http.timeout())?;
            let written = HttpArtifactExport::new(client)
                .export(&artifact.content, &target)
                .await
                .with_context(|| format!("failed to export {id}"))?;
            println!("{}", written.display());
            Ok(())
        }
        Command::Services => {
            for service in orchestrator.services() {
                let marker = if &service == orchestrator.primary() { " (primary)" } else { "" };
                match orchestrator.media_class(&service) {
                    Some(media) => println!("{service}\t{media}{marker}"),
                    None => println!("{service}{marker}"),
                }
            }
            Ok(())
        }
    }
}

/// Rejects a service that produces the other media class. Unknown services
/// are left to the orchestrator.
fn ensure_media(service: &ServiceId, expected: MediaClass, actual: Option<MediaClass>) -> Result<()> {
    match actual {
        Some(actual) if actual != expected => {
            bail!("service {service} generates {actual}, use `adsmith {actual}` instead")
        }
        _ => Ok(()),
    }
}

fn parse_artifact_id(raw: &str) -> Result<ArtifactId> {
    raw.parse::<ArtifactId>()
        .with_context(|| format!("'{raw}' is not an artifact id"))
}

enum Request {
    Generate(Brief),
    Regenerate(Box<adsmith_core::domain::Artifact>),
}

async fn run(orchestrator: &RequestOrchestrator, media: MediaClass, request: Request) -> Result<()> {
    let progress = show_progress(orchestrator.subscribe(media));
    let generation = match request {
        Request::Generate(brief) => orchestrator.generate(brief).await,
        Request::Regenerate(artifact) => orchestrator.regenerate(&artifact).await,
    };
    progress.abort();

    match generation.context("generation failed")? {
        Generation::Completed(artifacts) => {
            println!("{}", serde_json::to_string_pretty(&artifacts)?);
        }
        Generation::StillProcessing(handle) => {
            eprintln!(
                "task {} on {} is still processing; it may still finish on the provider side",
                handle.task_id, handle.service
            );
        }
        Generation::Superseded => eprintln!("superseded by a newer request"),
    }
    Ok(())
}

fn show_progress(mut status: watch::Receiver<GenerationStatus>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            match current {
                GenerationStatus::Submitting { service } => eprintln!("submitting to {service}..."),
                GenerationStatus::Polling {
                    task_id,
                    attempt,
                    max_attempts,
                } => eprintln!("task {task_id}: processing ({attempt}/{max_attempts})"),
                _ => {}
            }
        }
    })
}
