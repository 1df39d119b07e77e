//! Speech output controller.
//!
//! Converts assistant text to audio through a remote synthesis endpoint and
//! manages playback. At most one playback handle exists at a time; starting
//! a new playback retires the previous one first. Synthesis failures are
//! logged and swallowed: voice output is an enhancement, and its failure
//! must never block or corrupt the text conversation.

use std::future::Future;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;

use repovox_core::error::RepovoxError;

/// Current state of audio playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// No audio playing; no playback handle held.
    Idle,
    /// Synthesized audio is playing.
    Playing,
}

// =============================================================================
// Synthesis
// =============================================================================

/// Request body for the text-to-speech endpoint.
#[derive(Debug, Clone, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Service that converts text into a playable audio payload.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into raw audio bytes.
    fn synthesize(&self, text: &str)
        -> impl Future<Output = Result<Vec<u8>, RepovoxError>> + Send;
}

/// `reqwest`-backed synthesizer for an ElevenLabs-style endpoint.
///
/// POSTs `{text, model_id}` with the API key header and receives a raw
/// audio payload on success.
#[derive(Debug, Clone)]
pub struct HttpSynthesizer {
    client: reqwest::Client,
    url: String,
    model_id: String,
    api_key: String,
}

impl HttpSynthesizer {
    pub fn new(url: &str, model_id: &str, api_key: &str) -> Result<Self, RepovoxError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RepovoxError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
            model_id: model_id.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, RepovoxError> {
        tracing::debug!(len = text.len(), "Sending synthesis request");

        let response = self
            .client
            .post(&self.url)
            .header("xi-api-key", &self.api_key)
            .json(&SynthesisRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await
            .map_err(|e| RepovoxError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RepovoxError::Synthesis(format!(
                "synthesis endpoint returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RepovoxError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Mock synthesizer for testing. Records synthesized texts and can be
/// switched into a failing mode.
#[derive(Debug, Clone, Default)]
pub struct MockSynthesizer {
    texts: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `synthesize` call fail.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().expect("mock lock poisoned") = fail;
    }

    /// Texts passed to `synthesize`, in call order.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().expect("mock lock poisoned").clone()
    }
}

impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, RepovoxError> {
        self.texts
            .lock()
            .expect("mock lock poisoned")
            .push(text.to_string());
        if *self.fail.lock().expect("mock lock poisoned") {
            return Err(RepovoxError::Synthesis("mock synthesis failure".to_string()));
        }
        Ok(text.as_bytes().to_vec())
    }
}

// =============================================================================
// Playback
// =============================================================================

/// An audio playback primitive: construct-from-bytes, play, stop, and a
/// completion query.
pub trait AudioPlayer: Send {
    /// Begin playing the given audio payload, replacing any prior playback.
    fn play(&mut self, audio: Vec<u8>) -> Result<(), RepovoxError>;

    /// Halt playback immediately and release the playback resource.
    /// Must be a no-op when nothing is playing.
    fn stop(&mut self);

    /// Whether playback has run to completion (or nothing is playing).
    fn is_finished(&self) -> bool;
}

/// `rodio`-backed player. Holds the `Send` output-stream handle; the
/// `OutputStream` itself must be kept alive by the caller (it is not `Send`
/// and stays on the thread that created it).
pub struct RodioPlayer {
    handle: rodio::OutputStreamHandle,
    sink: Option<rodio::Sink>,
}

impl RodioPlayer {
    /// Open the default audio output device.
    ///
    /// Returns the stream alongside the player; drop the stream and all
    /// playback stops.
    pub fn try_default() -> Result<(rodio::OutputStream, Self), RepovoxError> {
        let (stream, handle) = rodio::OutputStream::try_default()
            .map_err(|e| RepovoxError::Playback(e.to_string()))?;
        Ok((
            stream,
            Self {
                handle,
                sink: None,
            },
        ))
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&mut self, audio: Vec<u8>) -> Result<(), RepovoxError> {
        self.stop();

        let source = rodio::Decoder::new(Cursor::new(audio))
            .map_err(|e| RepovoxError::Playback(format!("undecodable audio payload: {}", e)))?;
        let sink = rodio::Sink::try_new(&self.handle)
            .map_err(|e| RepovoxError::Playback(e.to_string()))?;
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().map(|s| s.empty()).unwrap_or(true)
    }
}

/// Player for headless or degraded runs: accepts and discards all audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPlayer;

impl AudioPlayer for NullPlayer {
    fn play(&mut self, _audio: Vec<u8>) -> Result<(), RepovoxError> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn is_finished(&self) -> bool {
        true
    }
}

/// Mock player for testing the playback lifecycle. Completion is driven
/// manually via `finish_current`.
#[derive(Debug, Clone, Default)]
pub struct MockPlayer {
    inner: Arc<Mutex<MockPlayerState>>,
}

#[derive(Debug, Default)]
struct MockPlayerState {
    plays: Vec<usize>,
    stops: u32,
    playing: bool,
    fail_play: bool,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload sizes passed to `play`, in call order.
    pub fn play_sizes(&self) -> Vec<usize> {
        self.inner.lock().expect("mock lock poisoned").plays.clone()
    }

    pub fn stop_count(&self) -> u32 {
        self.inner.lock().expect("mock lock poisoned").stops
    }

    /// Simulate natural completion of the current playback.
    pub fn finish_current(&self) {
        self.inner.lock().expect("mock lock poisoned").playing = false;
    }

    /// Make every subsequent `play` call fail.
    pub fn set_fail_play(&self, fail: bool) {
        self.inner.lock().expect("mock lock poisoned").fail_play = fail;
    }
}

impl AudioPlayer for MockPlayer {
    fn play(&mut self, audio: Vec<u8>) -> Result<(), RepovoxError> {
        let mut state = self.inner.lock().expect("mock lock poisoned");
        if state.fail_play {
            return Err(RepovoxError::Playback("mock play failure".to_string()));
        }
        state.plays.push(audio.len());
        state.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.inner.lock().expect("mock lock poisoned");
        if state.playing {
            state.stops += 1;
            state.playing = false;
        }
    }

    fn is_finished(&self) -> bool {
        !self.inner.lock().expect("mock lock poisoned").playing
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Converts assistant text to audio and manages the single playback handle.
#[derive(Debug)]
pub struct SpeechOutputController<S, P> {
    synthesizer: S,
    player: P,
    state: PlaybackState,
}

impl<S: SpeechSynthesizer, P: AudioPlayer> SpeechOutputController<S, P> {
    pub fn new(synthesizer: S, player: P) -> Self {
        Self {
            synthesizer,
            player,
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Synthesize `text` and begin playback.
    ///
    /// Any active playback is retired first. Synthesis and playback
    /// failures are logged and swallowed; either way the controller ends up
    /// in a well-defined state.
    pub async fn speak(&mut self, text: &str) {
        if self.state == PlaybackState::Playing {
            self.stop();
        }

        let audio = match self.synthesizer.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(error = %e, "Speech synthesis failed; reply remains text-only");
                self.state = PlaybackState::Idle;
                return;
            }
        };

        match self.player.play(audio) {
            Ok(()) => {
                self.state = PlaybackState::Playing;
                tracing::debug!("Playback started");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Audio playback failed; reply remains text-only");
                self.state = PlaybackState::Idle;
            }
        }
    }

    /// Move to `Idle` if the current playback has run to completion,
    /// releasing the playback resource.
    pub fn poll_playback(&mut self) {
        if self.state == PlaybackState::Playing && self.player.is_finished() {
            self.player.stop();
            self.state = PlaybackState::Idle;
            tracing::debug!("Playback complete");
        }
    }

    /// Halt playback immediately. Idempotent: calling while idle is a no-op.
    pub fn stop(&mut self) {
        match self.state {
            PlaybackState::Playing => {
                self.player.stop();
                self.state = PlaybackState::Idle;
                tracing::debug!("Playback stopped");
            }
            PlaybackState::Idle => {}
        }
    }
}

// =============================================================================
// Speaker task
// =============================================================================

/// Commands accepted by the detached speaker task.
#[derive(Debug, Clone)]
pub enum SpeakerCommand {
    /// Synthesize and play the given text, superseding any active playback.
    Speak(String),
    /// Halt playback immediately.
    Stop,
    /// Stop playback and exit the task.
    Shutdown,
}

/// Spawn the speaker worker that owns the output controller.
///
/// The chat flow sends [`SpeakerCommand::Speak`] into the returned sender
/// and never awaits completion, so a slow or failing synthesis call cannot
/// delay subsequent chat interaction. The task polls playback on an
/// interval to observe natural completion.
pub fn spawn_speaker<S, P>(
    mut controller: SpeechOutputController<S, P>,
) -> (UnboundedSender<SpeakerCommand>, JoinHandle<()>)
where
    S: SpeechSynthesizer + Send + 'static,
    P: AudioPlayer + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut poll = tokio::time::interval(Duration::from_millis(200));
        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(SpeakerCommand::Speak(text)) => controller.speak(&text).await,
                    Some(SpeakerCommand::Stop) => controller.stop(),
                    Some(SpeakerCommand::Shutdown) | None => {
                        controller.stop();
                        break;
                    }
                },
                _ = poll.tick() => controller.poll_playback(),
            }
        }
        tracing::debug!("Speaker task stopped");
    });

    (tx, handle)
}

// =============================================================================
// Tests
// =============================================================================
