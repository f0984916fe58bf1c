//! RIFF/WAVE chunk scanning and concatenation
//!
//! Payloads are never decoded. Each one is scanned for its `data` chunk,
//! the sample bytes are copied out in order, and the first payload's
//! leading bytes are reused as the header of the combined file.

use std::io::Cursor;

use super::AudioError;

/// `RIFF` + size + `WAVE`
pub const RIFF_HEADER_LEN: usize = 12;

/// Chunk id + little-endian size
pub const CHUNK_HEADER_LEN: usize = 8;

const RIFF_ID: &[u8; 4] = b"RIFF";
const WAVE_ID: &[u8; 4] = b"WAVE";
const FMT_ID: &[u8; 4] = b"fmt ";
const DATA_ID: &[u8; 4] = b"data";

/// A payload split at its sample-data chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavParts<'a> {
    /// Every byte before the `data` chunk header
    pub format_region: &'a [u8],
    /// Exactly the declared number of sample bytes
    pub samples: &'a [u8],
}

/// Basic properties of a decoded WAV file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSummary {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub duration_secs: f64,
}

fn read_u32_le(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn invalid(index: usize, details: impl Into<String>) -> AudioError {
    AudioError::InvalidHeader {
        index,
        details: details.into(),
    }
}

/// Locate the format region and sample bytes of one payload
///
/// `index` is the payload's position in the run and is carried in errors.
pub fn extract_audio_data(index: usize, data: &[u8]) -> Result<WavParts<'_>, AudioError> {
    if data.len() < RIFF_HEADER_LEN {
        return Err(invalid(
            index,
            format!("payload is {} bytes, shorter than the RIFF header", data.len()),
        ));
    }
    if &data[0..4] != RIFF_ID || &data[8..12] != WAVE_ID {
        return Err(invalid(index, "missing RIFF/WAVE signature"));
    }

    let mut offset = RIFF_HEADER_LEN;
    let mut saw_fmt = false;

    while offset + CHUNK_HEADER_LEN <= data.len() {
        let id = &data[offset..offset + 4];
        let size = read_u32_le(data, offset + 4) as usize;
        let body_start = offset + CHUNK_HEADER_LEN;

        if id == DATA_ID {
            if !saw_fmt {
                return Err(invalid(index, "data chunk appears before fmt chunk"));
            }

            let remaining = data.len() - body_start;
            if size > remaining {
                return Err(invalid(
                    index,
                    format!("data chunk declares {size} bytes but only {remaining} remain"),
                ));
            }

            return Ok(WavParts {
                format_region: &data[..offset],
                samples: &data[body_start..body_start + size],
            });
        }

        if id == FMT_ID {
            saw_fmt = true;
        }

        // odd-sized chunks carry one pad byte
        offset = body_start.saturating_add(size).saturating_add(size & 1);
    }

    if saw_fmt {
        Err(invalid(index, "data chunk not found"))
    } else {
        Err(invalid(index, "fmt chunk not found"))
    }
}

/// Concatenate the sample data of every payload into one WAV file
///
/// The output reuses the first payload's format region verbatim, writes one
/// `data` chunk holding all samples in input order and patches the RIFF size.
/// Payloads are assumed to share a format.
pub fn combine_wav_data<T: AsRef<[u8]>>(payloads: &[T]) -> Result<Vec<u8>, AudioError> {
    if payloads.is_empty() {
        return Err(AudioError::NoAudioData);
    }

    let parts = payloads
        .iter()
        .enumerate()
        .map(|(index, payload)| extract_audio_data(index, payload.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let format_region = parts[0].format_region;
    let total: usize = parts.iter().map(|part| part.samples.len()).sum();

    let mut output = Vec::with_capacity(format_region.len() + CHUNK_HEADER_LEN + total);
    output.extend_from_slice(format_region);
    output.extend_from_slice(DATA_ID);
    output.extend_from_slice(&to_u32(total)?.to_le_bytes());
    for part in &parts {
        output.extend_from_slice(part.samples);
    }

    let riff_size = to_u32(output.len() - 8)?;
    output[4..8].copy_from_slice(&riff_size.to_le_bytes());

    Ok(output)
}

fn to_u32(bytes: usize) -> Result<u32, AudioError> {
    u32::try_from(bytes).map_err(|_| AudioError::TooLarge { bytes })
}

/// Read channel layout and duration from a complete WAV file
pub fn summarize_wav(data: &[u8]) -> Result<AudioSummary, AudioError> {
    let reader =
        hound::WavReader::new(Cursor::new(data)).map_err(|e| AudioError::Decode(e.to_string()))?;
    let spec = reader.spec();
    let frames = reader.duration();

    Ok(AudioSummary {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        duration_secs: if spec.sample_rate == 0 {
            0.0
        } else {
            f64::from(frames) / f64::from(spec.sample_rate)
        },
    })
}
