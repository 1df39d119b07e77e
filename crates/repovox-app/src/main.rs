//! Repovox application binary - composition root.
//!
//! Ties the Repovox crates together into a single executable:
//! 1. Load configuration from TOML
//! 2. Build the backend HTTP client
//! 3. Wire speech synthesis + playback into the detached speaker task
//!    (degrading to text-only when no API key or audio device is present)
//! 4. Drive one chat session through a line-oriented interactive loop

mod cli;

use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;

use repovox_client::HttpBackend;
use repovox_core::config::RepovoxConfig;
use repovox_session::{ChatSession, SessionError, SUGGESTED_QUESTIONS};
use repovox_speech::{
    spawn_speaker, HttpSynthesizer, NullPlayer, RodioPlayer, SpeakerCommand,
    SpeechInputController, SpeechOutputController, UnavailableRecognizer,
};

use cli::CliArgs;

const HELP: &str = "\
Commands:
  /repo <url>   ingest a repository and start a conversation about it
  /ask <n>      submit suggested question n (see /suggest)
  /suggest      list the suggested questions
  /voice        toggle voice capture
  /stop         stop audio playback
  /quit         exit
Anything else is sent as a chat message.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first so the log level fallback is available.
    let config_file = args.resolve_config_path();
    let config = RepovoxConfig::load_or_default(&config_file);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    args.resolve_log_level(&config.general.log_level),
                )
            }),
        )
        .init();

    tracing::info!("Starting Repovox v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Backend client.
    let base_url = args.resolve_backend_url(&config.backend.base_url);
    let backend = HttpBackend::new(
        &base_url,
        Duration::from_secs(config.backend.request_timeout_secs),
    )?;
    tracing::info!(base_url = %base_url, "Backend client ready");

    // Speech output: synthesizer + player behind the detached speaker task.
    // Keeps the audio output stream alive for the whole session; playback
    // dies with it.
    let mut _audio_stream = None;
    let speaker: Option<UnboundedSender<SpeakerCommand>> =
        if config.speech.enabled && !args.no_speech {
            match std::env::var(&config.speech.api_key_env) {
                Ok(key) if !key.is_empty() => {
                    let synthesizer = HttpSynthesizer::new(
                        &config.speech.synthesis_url,
                        &config.speech.model_id,
                        &key,
                    )?;
                    match RodioPlayer::try_default() {
                        Ok((stream, player)) => {
                            _audio_stream = Some(stream);
                            let (tx, _task) =
                                spawn_speaker(SpeechOutputController::new(synthesizer, player));
                            tracing::info!("Speech output ready");
                            Some(tx)
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "No audio output device; replies will be text-only");
                            let (tx, _task) = spawn_speaker(SpeechOutputController::new(
                                synthesizer,
                                NullPlayer,
                            ));
                            Some(tx)
                        }
                    }
                }
                _ => {
                    tracing::warn!(
                        var = %config.speech.api_key_env,
                        "Synthesis API key not set; replies will be text-only"
                    );
                    None
                }
            }
        } else {
            tracing::info!("Speech output disabled");
            None
        };

    // Speech input: no platform recognition engine is wired into the
    // terminal harness, so the capture affordance reports unavailable.
    let mut capture = SpeechInputController::new(UnavailableRecognizer);

    let mut session = ChatSession::new(backend);
    if let Some(tx) = speaker.clone() {
        session = session.with_speaker(tx);
    }

    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    // Index of the next transcript entry to print.
    let mut printed = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ') {
            _ if line == "/quit" => break,
            _ if line == "/help" => {
                println!("{}", HELP);
                continue;
            }
            _ if line == "/suggest" => {
                for (i, q) in SUGGESTED_QUESTIONS.iter().enumerate() {
                    println!("  {}: {}", i, q);
                }
                continue;
            }
            _ if line == "/stop" => {
                if let Some(tx) = &speaker {
                    let _ = tx.send(SpeakerCommand::Stop);
                }
                continue;
            }
            _ if line == "/voice" => {
                let result = if capture.is_listening() {
                    capture.stop()
                } else {
                    capture.start()
                };
                if let Err(e) = result {
                    println!("voice: {}", e);
                }
                continue;
            }
            Some(("/repo", url)) => {
                println!("ingesting {} ...", url);
                match session.ingest(url).await {
                    // A successful ingestion starts a fresh conversation.
                    Ok(()) => printed = 0,
                    Err(e) => println!("ingestion failed: {}", e),
                }
            }
            Some(("/ask", index)) => match index.trim().parse::<usize>() {
                Ok(i) => report(session.submit_suggestion(i).await),
                Err(_) => println!("usage: /ask <n>"),
            },
            _ => report(session.submit(&line).await),
        }

        // Print transcript entries appended since the last command.
        for message in &session.transcript().messages()[printed..] {
            println!("[{:?}] {}", message.role, message.content);
        }
        printed = session.transcript().len();
    }

    if let Some(tx) = &speaker {
        let _ = tx.send(SpeakerCommand::Shutdown);
    }
    tracing::info!("Repovox shutting down");
    Ok(())
}

/// Print guard rejections; backend failures already land in the transcript.
fn report(result: Result<(), SessionError>) {
    if let Err(e) = result {
        println!("rejected: {}", e);
    }
}
