//! In-memory WAV encoding of captured PCM.
//!
//! The capture controller finalizes recordings by concatenating the raw
//! `f32` chunks and encoding them as a 16-bit PCM WAV container so the
//! resulting artifact is a playable, transmittable file rather than bare
//! samples.

use std::io::Cursor;

/// MIME type of the containers produced by [`encode_wav`].
pub const WAV_MIME: &str = "audio/wav";

/// Encode interleaved `f32` samples as a 16-bit PCM WAV container.
///
/// Samples outside `[-1.0, 1.0]` are clamped before quantisation.
///
/// # Errors
///
/// Propagates `hound` errors (invalid spec, write failure); with an
/// in-memory cursor these only occur for degenerate specs such as zero
/// channels.
pub fn encode_wav(
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let quantised = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(quantised)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
