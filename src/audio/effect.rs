//! Fully decoded sound effects

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, Source};

use crate::assets::AssetError;

/// A short sound decoded up front into interleaved samples
#[derive(Clone)]
pub struct SoundEffect {
    /// Sound name for debugging
    name: String,
    /// Interleaved channel count
    channels: u16,
    /// Samples per second per channel
    sample_rate: u32,
    /// Interleaved samples in `[-1.0, 1.0]`
    samples: Arc<[f32]>,
}

impl SoundEffect {
    /// Decode a sound file completely
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let file = File::open(path).map_err(|e| AssetError::io(path, &e))?;
        Self::decode(BufReader::new(file), name, path)
    }

    /// Decode a sound held in memory
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a supported audio format
    pub fn from_bytes(bytes: Arc<[u8]>, name: impl Into<String>) -> Result<Self, AssetError> {
        let name = name.into();
        let label = Path::new(&name).to_path_buf();
        Self::decode(Cursor::new(bytes), name, &label)
    }

    /// Wrap samples that are already decoded
    #[must_use]
    pub fn from_samples(
        name: impl Into<String>,
        channels: u16,
        sample_rate: u32,
        samples: Vec<f32>,
    ) -> Self {
        Self {
            name: name.into(),
            channels,
            sample_rate,
            samples: samples.into(),
        }
    }

    fn decode<R>(reader: R, name: String, path: &Path) -> Result<Self, AssetError>
    where
        R: Read + Seek + Send + Sync + 'static,
    {
        let decoder = Decoder::new(reader).map_err(|e| AssetError::decode(path, e))?;
        let channels = u16::from(decoder.channels());
        let sample_rate = u32::from(decoder.sample_rate());
        let samples: Vec<f32> = decoder.collect();

        if channels == 0 || sample_rate == 0 {
            return Err(AssetError::malformed(
                path,
                format!("{channels} channels at {sample_rate} Hz"),
            ));
        }

        log::debug!(
            "Decoded sound {name}: {} samples, {channels} channels, {sample_rate} Hz",
            samples.len()
        );

        Ok(Self::from_samples(name, channels, sample_rate, samples))
    }

    /// Get the sound name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
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

    /// Interleaved samples, shareable with a playback sink
    #[must_use]
    pub fn samples(&self) -> &Arc<[f32]> {
        &self.samples
    }

    /// Playback length
    #[must_use]
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as f64 / f64::from(self.channels.max(1));
        Duration::from_secs_f64(frames / f64::from(self.sample_rate.max(1)))
    }
}

impl std::fmt::Debug for SoundEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEffect")
            .field("name", &self.name)
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("samples", &self.samples.len())
            .finish()
    }
}
