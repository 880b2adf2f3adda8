//! VOT client (vot-client) - command-line entry point
//!
//! Subcommands:
//! - `translate`: request an on-demand translation and print the audio URL
//! - `stream`: start a live stream translation and keep it alive until Ctrl+C
//! - `subtitles`: list subtitle tracks, optionally download and convert them
//! - `session`: create a backend session and print its lifetime

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vot_client::models::{SharedVideoId, TranslationRequest, VideoDescriptor};
use vot_client::orchestrator::TranslationOrchestrator;
use vot_client::settings::UserSettings;
use vot_client::subtitles::{self, SubtitleFormat, SubtitleProcessor};
use vot_client::{ClientConfig, SignedRequestClient};
use vot_common::config::{default_data_dir, ConfigResolver, CONFIG_ENV_VAR};
use vot_common::events::{EventBus, VotEvent};
use vot_common::localization::EnglishLocalizer;
use vot_common::storage::JsonFileStorage;

/// Command-line arguments for vot-client
#[derive(Parser, Debug)]
#[command(name = "vot-client")]
#[command(about = "Voice-over translation client")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Settings file (JSON) holding user preferences
    #[arg(long, env = "VOT_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct VideoArgs {
    /// Video page URL
    url: String,

    /// Site-scoped video id (defaults to the URL)
    #[arg(long)]
    video_id: Option<String>,

    /// Language spoken in the video
    #[arg(long, default_value = "en")]
    from: String,

    /// Target language (defaults to the stored preference)
    #[arg(long)]
    to: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a video and print the translated audio URL
    Translate {
        #[command(flatten)]
        video: VideoArgs,

        /// Video length in seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Video title sent as a hint
        #[arg(long)]
        title: Option<String>,

        /// Use the newer voice model
        #[arg(long)]
        new_model: bool,

        /// Ask the backend to ignore its own cache
        #[arg(long)]
        bypass_cache: bool,
    },

    /// Translate a live stream and keep it alive until interrupted
    Stream {
        #[command(flatten)]
        video: VideoArgs,
    },

    /// List subtitle tracks, optionally saving them
    Subtitles {
        #[command(flatten)]
        video: VideoArgs,

        /// Convert downloaded tracks to this format (srt, vtt, json)
        #[arg(long)]
        format: Option<SubtitleFormat>,

        /// Directory to write converted tracks to
        #[arg(long, requires = "format")]
        output: Option<PathBuf>,
    },

    /// Create a backend session
    Session {
        #[arg(long, default_value = "video-translation")]
        module: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;

    // Initialize tracing
    let default_filter = format!(
        "vot_client={level},vot_common={level}",
        level = toml_config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_toml(&toml_config).context("Invalid configuration")?;
    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(|| default_data_dir().join("settings.json"));
    let storage = JsonFileStorage::open(&settings_path)
        .with_context(|| format!("Failed to open settings {}", settings_path.display()))?;
    let settings = UserSettings::load(&storage);

    info!(host = %config.api.host, "Starting vot-client");

    let client = Arc::new(
        SignedRequestClient::from_config(&config).context("Failed to initialize HTTP client")?,
    );

    match args.command {
        Command::Translate {
            video,
            duration,
            title,
            new_model,
            bypass_cache,
        } => {
            let (mut descriptor, resolver) = describe(&video, &settings);
            descriptor.duration_secs = duration;
            descriptor.title = title;

            let events = EventBus::new(100);
            let orchestrator = TranslationOrchestrator::new(
                client.clone(),
                resolver,
                Arc::new(EnglishLocalizer),
                events.clone(),
                config.translation.clone(),
            );
            let printer = tokio::spawn(print_events(events.subscribe()));

            if let Err(e) = orchestrator.refresh_subtitles(&descriptor, &[]).await {
                warn!(error = %e, "Could not list subtitles, using the longer retry interval");
            }

            let mut request =
                TranslationRequest::for_video(descriptor, new_model || settings.model_variant);
            request.bypass_cache = bypass_cache;

            let outcome = tokio::select! {
                result = orchestrator.translate_cached(&request) => result,
                _ = shutdown_signal() => {
                    orchestrator.cancel();
                    Ok(None)
                }
            };
            printer.abort();

            match outcome.context("Translation failed")? {
                Some(result) => match result.url {
                    Some(url) => println!("{}", url),
                    None => bail!("Translation finished without an audio URL"),
                },
                None => info!("Translation aborted"),
            }
        }

        Command::Stream { video } => {
            let (descriptor, resolver) = describe(&video, &settings);
            let events = EventBus::new(100);
            let orchestrator = TranslationOrchestrator::new(
                client.clone(),
                resolver,
                Arc::new(EnglishLocalizer),
                events.clone(),
                config.translation.clone(),
            );
            let printer = tokio::spawn(print_events(events.subscribe()));

            let started = tokio::select! {
                result = orchestrator.translate_stream(
                    &descriptor,
                    &descriptor.detected_language,
                    &descriptor.response_language,
                ) => result.context("Stream translation failed")?,
                _ = shutdown_signal() => None,
            };

            if let Some(result) = started {
                if let Some(url) = &result.url {
                    println!("{}", url);
                }
                info!(ping_id = result.ping_id, "Keeping stream translation alive, press Ctrl+C to stop");
                shutdown_signal().await;
            }

            orchestrator.release();
            printer.abort();
        }

        Command::Subtitles {
            video,
            format,
            output,
        } => {
            let (descriptor, _) = describe(&video, &settings);
            let processor = SubtitleProcessor::new(client.clone());
            let tracks = processor
                .get_subtitles(&descriptor, &[])
                .await
                .context("Failed to list subtitles")?;

            if tracks.is_empty() {
                println!("No subtitles available");
            }
            for (i, track) in tracks.iter().enumerate() {
                match &track.translated_from_language {
                    Some(from) => println!("{:>2}. {} (from {})  {}", i + 1, track.language, from, track.url),
                    None => println!("{:>2}. {}  {}", i + 1, track.language, track.url),
                }
            }

            if let Some(format) = format {
                let documents =
                    futures::future::join_all(tracks.iter().map(|t| processor.fetch_subtitles(t)))
                        .await;
                let dir = output.unwrap_or_else(|| PathBuf::from("."));
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;

                for (i, (track, document)) in tracks.iter().zip(documents).enumerate() {
                    let document = match document {
                        Ok(document) => document,
                        Err(e) => {
                            warn!(language = %track.language, error = %e, "Skipping track");
                            continue;
                        }
                    };
                    let rendered = subtitles::convert(&document, format)?;
                    let path = dir.join(format!(
                        "{}-{}-{}.{}",
                        descriptor.video_id.replace(['/', ':', '?'], "_"),
                        i + 1,
                        track.language,
                        format.extension()
                    ));
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Saved {}", path.display());
                }
            }
        }

        Command::Session { module } => {
            let session = client
                .create_session(&module)
                .await
                .context("Failed to create session")?;
            println!("uuid: {}", session.uuid);
            println!("expires: {}", session.expires_at.to_rfc3339());
        }
    }

    settings
        .save(&storage)
        .with_context(|| format!("Failed to save settings {}", settings_path.display()))?;
    Ok(())
}

/// Descriptor and identity resolver for a CLI-specified video
fn describe(
    args: &VideoArgs,
    settings: &UserSettings,
) -> (VideoDescriptor, Arc<SharedVideoId>) {
    let video_id = args.video_id.clone().unwrap_or_else(|| args.url.clone());
    let response = args
        .to
        .clone()
        .unwrap_or_else(|| settings.response_language.clone());
    let descriptor =
        VideoDescriptor::new(video_id.clone(), args.url.clone()).with_languages(&args.from, response);
    (descriptor, Arc::new(SharedVideoId::new(video_id)))
}

/// Print progress events to stderr
async fn print_events(mut rx: tokio::sync::broadcast::Receiver<VotEvent>) {
    loop {
        match rx.recv().await {
            Ok(VotEvent::TranslationRetryScheduled { message, retry_in_ms, .. }) => {
                eprintln!("{} (retrying in {}s)", message, retry_in_ms / 1000);
            }
            Ok(VotEvent::StreamPing { ping_id, success, .. }) if !success => {
                eprintln!("Keepalive ping {} failed", ping_id);
            }
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "Event printer lagged");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
