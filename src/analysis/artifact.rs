//! Serializable analysis artifact for inspection and reuse.

use crate::error::RepetError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Analysis results produced before separation: the spectral layout, the
/// chosen repeating period, and the beat spectrum that led to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisArtifact {
    /// Sample rate used during analysis.
    pub sample_rate: u32,
    /// STFT window length in samples.
    pub window_size: usize,
    /// STFT hop length in samples.
    pub hop_size: usize,
    /// Selected repeating period in frames.
    pub period_frames: usize,
    /// Selected repeating period in seconds.
    pub period_secs: f64,
    /// Channel-averaged beat spectrum, one value per frame lag.
    #[serde(default)]
    pub beat_spectrum: Vec<f32>,
}

/// Writes an analysis artifact as JSON.
pub fn write_analysis_json(path: &Path, artifact: &AnalysisArtifact) -> Result<(), RepetError> {
    let json = serde_json::to_string_pretty(artifact).map_err(|e| {
        RepetError::InvalidInput(format!("failed to serialize analysis artifact: {}", e))
    })?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Reads an analysis artifact from JSON.
pub fn read_analysis_json(path: &Path) -> Result<AnalysisArtifact, RepetError> {
    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| {
        RepetError::InvalidInput(format!(
            "failed to parse analysis artifact from {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_json_roundtrip() {
        let artifact = AnalysisArtifact {
            sample_rate: 44100,
            window_size: 2048,
            hop_size: 1024,
            period_frames: 43,
            period_secs: 43.0 * 1024.0 / 44100.0,
            beat_spectrum: vec![1.0, 0.4, 0.8],
        };
        let json = serde_json::to_string(&artifact).unwrap();
        let back: AnalysisArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sample_rate, 44100);
        assert_eq!(back.period_frames, 43);
        assert_eq!(back.beat_spectrum.len(), 3);
    }

    #[test]
    fn test_missing_beat_spectrum_defaults_empty() {
        let json = r#"{
            "sample_rate": 22050,
            "window_size": 1024,
            "hop_size": 512,
            "period_frames": 20,
            "period_secs": 0.46
        }"#;
        let artifact: AnalysisArtifact = serde_json::from_str(json).unwrap();
        assert!(artifact.beat_spectrum.is_empty());
    }
}
