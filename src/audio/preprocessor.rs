use super::AudioData;
use crate::Result;
use tracing::debug;

/// Sample rate Whisper expects
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Average interleaved channels down to mono
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Normalize audio to have peak amplitude of 0.95
pub fn normalize_audio(samples: &[f32]) -> Vec<f32> {
    let peak = samples
        .iter()
        .map(|&s| s.abs())
        .fold(0.0f32, |max, val| max.max(val));

    if peak == 0.0 || peak.is_nan() {
        return samples.to_vec();
    }

    let gain = 0.95 / peak;
    samples.iter().map(|&s| s * gain).collect()
}

/// Subtract the mean to remove DC offset
pub fn remove_dc_offset(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mean: f32 = samples.iter().sum::<f32>() / samples.len() as f32;
    samples.iter().map(|&s| s - mean).collect()
}

/// Mono, DC-free, peak-normalized 16kHz samples ready for Whisper
pub fn prepare_for_whisper(audio: &AudioData) -> Result<Vec<f32>> {
    debug!(
        "Preprocessing audio: {} samples, {}Hz, {} channels",
        audio.samples.len(),
        audio.sample_rate,
        audio.channels
    );

    let mono = remove_dc_offset(&to_mono(&audio.samples, audio.channels));
    let resampled = if audio.sample_rate != WHISPER_SAMPLE_RATE {
        resample(&mono, audio.sample_rate, WHISPER_SAMPLE_RATE)?
    } else {
        mono
    };

    Ok(normalize_audio(&resampled))
}

/// One-shot sinc resampling of a complete mono buffer
#[cfg(feature = "audio-io")]
pub fn resample(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    use crate::ScholarError;
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
        WindowFunction,
    };

    if input_rate == 0 || output_rate == 0 {
        return Err(ScholarError::ConfigError(
            "Sample rates must be greater than 0".into(),
        ));
    }
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0,
        params,
        input.len(),
        1,
    )
    .map_err(|e| ScholarError::AudioDeviceError(format!("Failed to create resampler: {}", e)))?;

    let output = resampler
        .process(&[input.to_vec()], None)
        .map_err(|e| ScholarError::AudioDeviceError(format!("Resampling failed: {}", e)))?;

    let resampled = output.into_iter().next().unwrap_or_default();
    debug!("Resampled {} -> {} samples", input.len(), resampled.len());
    Ok(resampled)
}

#[cfg(not(feature = "audio-io"))]
pub fn resample(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate || input.is_empty() {
        return Ok(input.to_vec());
    }
    Err(crate::ScholarError::ConfigError(format!(
        "Resampling {}Hz -> {}Hz requires the audio-io feature",
        input_rate, output_rate
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_audio() {
        let input = vec![0.5, -0.3, 0.8, -0.2];
        let output = normalize_audio(&input);
        let peak = output.iter().map(|&s| s.abs()).fold(0.0, f32::max);
        assert!((peak - 0.95).abs() < 0.01);
    }

    #[test]
    fn test_normalize_silence_unchanged() {
        assert_eq!(normalize_audio(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_to_mono() {
        let input = vec![1.0, -1.0, 0.5, -0.5, 0.8, 0.4];
        let output = to_mono(&input, 2);
        assert_eq!(output.len(), 3);
        assert_eq!(output[0], 0.0);
        assert!((output[2] - 0.6).abs() < 1e-6);
        assert_eq!(to_mono(&input, 1), input);
    }

    #[test]
    fn test_remove_dc_offset() {
        let input = vec![1.0, 1.1, 0.9, 1.0];
        let output = remove_dc_offset(&input);
        let mean: f32 = output.iter().sum::<f32>() / output.len() as f32;
        assert!(mean.abs() < 0.0001);
    }

    #[test]
    fn test_prepare_at_native_rate() {
        let audio = AudioData::new(vec![0.1, 0.3, 0.1, 0.3], WHISPER_SAMPLE_RATE, 1);
        let prepared = prepare_for_whisper(&audio).unwrap();
        assert_eq!(prepared.len(), 4);
        let peak = prepared.iter().map(|s| s.abs()).fold(0.0, f32::max);
        assert!((peak - 0.95).abs() < 0.01);
    }

    #[cfg(feature = "audio-io")]
    #[test]
    fn test_resample_length() {
        let input: Vec<f32> = (0..48000).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resample(&input, 48000, 16000).unwrap();
        assert!((output.len() as i64 - 16000).abs() < 200);
    }
}
