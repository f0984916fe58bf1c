//! WAV Test Fixtures
//!
//! Payloads are generated with `hound` in the format VOICEVOX returns:
//! 24 kHz, 16-bit signed PCM, mono.

use std::io::Cursor;

/// VOICEVOX output sample rate
pub const SAMPLE_RATE: u32 = 24_000;

/// 100 ms at 24 kHz
pub const MS_100: usize = 2_400;

/// Build a mono 16-bit WAV holding `samples`
pub fn wav_from_samples(samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// WAV of `len` samples all equal to `value`
pub fn constant_wav(len: usize, value: i16) -> Vec<u8> {
    wav_from_samples(&vec![value; len])
}

/// Read every sample back from a WAV
pub fn read_samples(data: &[u8]) -> Vec<i16> {
    let reader = hound::WavReader::new(Cursor::new(data)).unwrap();
    reader.into_samples::<i16>().map(|s| s.unwrap()).collect()
}

/// Read the stream parameters of a WAV
pub fn read_spec(data: &[u8]) -> hound::WavSpec {
    hound::WavReader::new(Cursor::new(data)).unwrap().spec()
}
