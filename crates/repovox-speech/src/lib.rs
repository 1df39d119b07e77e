//! Speech input and output for Repovox.
//!
//! Speech input wraps a platform recognition capability as a small state
//! machine that turns the engine's result/error/end callbacks into named
//! transitions and a single end-of-capture completion value. Speech output
//! synthesizes assistant text through a remote endpoint and plays the audio
//! back, enforcing a single active playback handle at a time.

pub mod input;
pub mod output;
pub mod state;

pub use input::{
    MockRecognizer, RecognizerEvent, SpeechInputController, SpeechRecognizer,
    UnavailableRecognizer,
};
pub use output::{
    spawn_speaker, AudioPlayer, HttpSynthesizer, MockPlayer, MockSynthesizer, NullPlayer,
    PlaybackState, RodioPlayer, SpeakerCommand, SpeechOutputController, SpeechSynthesizer,
};
pub use state::CaptureState;
