//! Audio assets
//!
//! Built on top of the rodio decoders.
//! Supports WAV, MP3, OGG, and FLAC formats.

mod effect;
mod stream;

pub use effect::SoundEffect;
pub use stream::MusicStream;
