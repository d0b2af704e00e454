//! Offline renderer: runs a fresh mixer over a list of frames and encodes WAV.

use super::mixer::{MixerCv, MixerInput, MixerOutput};
use crate::config::MixerConfig;
use crate::error::MixerError;

/// Voltage that maps to digital full scale.
pub const FULL_SCALE_VOLTS: f32 = 10.0;

/// Render frames through a new mixer, returning the stereo output per frame.
///
/// Manual controls are clamped into their configured ranges first.
pub fn render(config: &MixerConfig, frames: &[MixerInput]) -> Result<Vec<(f32, f32)>, MixerError> {
    let mut mixer = MixerCv::new(config.clone())?;
    let mut output = MixerOutput::default();
    let mut frame = MixerInput::default();
    let mut rendered = Vec::with_capacity(frames.len());

    for input in frames {
        frame.clone_from(input);
        config.clamp_controls(&mut frame);
        mixer.process_into(&frame, &mut output)?;
        rendered.push(output.stereo());
    }
    Ok(rendered)
}

/// Render frames to a WAV file as bytes (16-bit stereo PCM).
pub fn render_wav(
    config: &MixerConfig,
    frames: &[MixerInput],
    sample_rate: u32,
) -> Result<Vec<u8>, MixerError> {
    let stereo = render(config, frames)?;
    let pcm: Vec<i16> = stereo
        .iter()
        .flat_map(|&(l, r)| [volts_to_i16(l), volts_to_i16(r)])
        .collect();
    Ok(encode_wav(&pcm, sample_rate, 2))
}

/// Map ±10 V to the i16 range, hard-limiting beyond it.
fn volts_to_i16(v: f32) -> i16 {
    let normalized = (v / FULL_SCALE_VOLTS).clamp(-1.0, 1.0);
    (normalized * i16::MAX as f32) as i16
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
