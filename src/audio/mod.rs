//! Procedural techno engine
//!
//! `sequencer` decides when notes happen against the audio clock,
//! `patterns` says which notes, and `synth` (wasm only) makes the sound.

pub mod patterns;
pub mod sequencer;
#[cfg(target_arch = "wasm32")]
pub mod synth;

pub use sequencer::{NoteSink, Sequencer};
