//! Streamed music tracks

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, Source};

use crate::assets::AssetError;

/// A music track that is probed once and decoded on demand while playing
#[derive(Debug, Clone)]
pub struct MusicStream {
    /// File the track streams from
    path: PathBuf,
    /// Interleaved channel count
    channels: u16,
    /// Samples per second per channel
    sample_rate: u32,
    /// Track length if the container reports it
    duration: Option<Duration>,
}

impl MusicStream {
    /// Check that a music file decodes and record its format
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a supported format
    pub fn probe(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref().to_path_buf();
        let decoder = Self::open_decoder(&path)?;

        let stream = Self {
            channels: u16::from(decoder.channels()),
            sample_rate: u32::from(decoder.sample_rate()),
            duration: decoder.total_duration(),
            path,
        };

        log::debug!(
            "Probed music {}: {} channels, {} Hz, {:?}",
            stream.path.display(),
            stream.channels,
            stream.sample_rate,
            stream.duration
        );

        Ok(stream)
    }

    fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, AssetError> {
        let file = File::open(path).map_err(|e| AssetError::io(path, &e))?;
        Decoder::new(BufReader::new(file)).map_err(|e| AssetError::decode(path, e))
    }

    /// Open a fresh decoder positioned at the start of the track
    ///
    /// # Errors
    ///
    /// Returns an error if the file vanished or changed since it was probed
    pub fn open(&self) -> Result<Decoder<BufReader<File>>, AssetError> {
        Self::open_decoder(&self.path)
    }

    /// File the track streams from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Interleaved channel count
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples per second per channel
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Track length if known
    #[must_use]
    pub const fn duration(&self) -> Option<Duration> {
        self.duration
    }
}
