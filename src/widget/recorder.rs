use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

#[derive(Debug, Error)]
#[error("WAV encoding failed: {0}")]
pub struct RecorderError(#[from] hound::Error);

#[derive(Debug, Default)]
enum RecorderState {
    #[default]
    Idle,
    Recording { samples: Vec<f32> },
}

/// A finished recording packaged as 16-bit mono WAV.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    pub wav: Vec<u8>,
    pub duration_secs: f32,
}

#[derive(Debug)]
pub enum Toggle {
    Started,
    /// `None` when nothing was captured between start and stop.
    Stopped(Option<RecordedAudio>),
}

#[derive(Debug, Serialize)]
pub struct RecorderStatus {
    pub is_recording: bool,
    pub buffer_duration_secs: f32,
    pub sample_rate: u32,
}

/// Microphone capture state owned by one widget instance.
///
/// The host feeds captured frames through `push_samples`; frames arriving while
/// idle are dropped.
#[derive(Debug)]
pub struct AudioRecorder {
    state: RecorderState,
    sample_rate: u32,
}

impl Default for AudioRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl AudioRecorder {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            state: RecorderState::Idle,
            sample_rate,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording { .. })
    }

    pub fn push_samples(&mut self, data: &[f32]) {
        if let RecorderState::Recording { samples } = &mut self.state {
            samples.extend_from_slice(data);
        }
    }

    pub fn push_i16_samples(&mut self, data: &[i16]) {
        if let RecorderState::Recording { samples } = &mut self.state {
            samples.extend(data.iter().map(|&s| s as f32 / 32768.0));
        }
    }

    pub fn status(&self) -> RecorderStatus {
        let buffered = match &self.state {
            RecorderState::Recording { samples } => samples.len(),
            RecorderState::Idle => 0,
        };
        RecorderStatus {
            is_recording: self.is_recording(),
            buffer_duration_secs: buffered as f32 / self.sample_rate as f32,
            sample_rate: self.sample_rate,
        }
    }

    /// Single control: start when idle, stop and package when recording.
    pub fn toggle(&mut self) -> Result<Toggle, RecorderError> {
        match std::mem::take(&mut self.state) {
            RecorderState::Idle => {
                self.state = RecorderState::Recording {
                    samples: Vec::new(),
                };
                Ok(Toggle::Started)
            }
            RecorderState::Recording { samples } => {
                if samples.is_empty() {
                    return Ok(Toggle::Stopped(None));
                }
                let wav = encode_wav(&samples, self.sample_rate)?;
                Ok(Toggle::Stopped(Some(RecordedAudio {
                    wav,
                    duration_secs: samples.len() as f32 / self.sample_rate as f32,
                })))
            }
        }
    }
}

fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in samples {
        let s = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(s)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}
