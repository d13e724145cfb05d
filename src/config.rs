//! Pipeline configuration.
//!
//! [`DejitterConfig`] holds the parameters of a single timestamp dejitter
//! run.  [`PrepConfig`] holds every tunable parameter of the full recording
//! preparation pipeline; its defaults match the OpenBCI Cyton → LSL setup the
//! dejitter step was written for.
use crate::error::{PrepError, Result};

/// Default gap (seconds) that separates two consecutive chunks.
pub const DEFAULT_CHUNK_GAP_SEC: f64 = 0.02;

/// Default fraction of `chunk_size` below which a chunk counts as short.
pub const DEFAULT_CHUNK_SIZE_THRESHOLD: f64 = 0.95;

/// Parameters for one call to [`crate::dejitter::dejitter`].
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use xdfprep::DejitterConfig;
///
/// let cfg = DejitterConfig {
///     chunk_gap_sec: 0.01,   // tighter boundary detection
///     ..DejitterConfig::new(250.0, 8)
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DejitterConfig {
    /// Sampling rate of the amplifier in Hz.  Within a chunk consecutive
    /// samples are placed exactly `1 / sampling_freq` seconds apart.
    pub sampling_freq: f64,

    /// Nominal number of samples per delivered packet (chunk).
    pub chunk_size: usize,

    /// A timestamp step strictly greater than this many seconds starts a new
    /// chunk.
    ///
    /// Default: `0.02` s.
    pub chunk_gap_sec: f64,

    /// A chunk with strictly fewer than `chunk_size · chunk_size_threshold`
    /// samples is short.  Short chunks (except the first) are moved so they
    /// start one sample period after their predecessor.
    ///
    /// Default: `0.95`.
    pub chunk_size_threshold: f64,
}

impl DejitterConfig {
    /// Config with the given rate and chunk size and default thresholds.
    pub fn new(sampling_freq: f64, chunk_size: usize) -> Self {
        Self {
            sampling_freq,
            chunk_size,
            chunk_gap_sec: DEFAULT_CHUNK_GAP_SEC,
            chunk_size_threshold: DEFAULT_CHUNK_SIZE_THRESHOLD,
        }
    }

    /// Reject parameters the dejitter step cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.sampling_freq.is_finite() || self.sampling_freq <= 0.0 {
            return Err(PrepError::InvalidParameter(format!(
                "sampling_freq must be positive, got {}",
                self.sampling_freq
            )));
        }
        if self.chunk_size == 0 {
            return Err(PrepError::InvalidParameter("chunk_size must be positive".into()));
        }
        if !self.chunk_gap_sec.is_finite() || self.chunk_gap_sec < 0.0 {
            return Err(PrepError::InvalidParameter(format!(
                "chunk_gap_sec must be a non-negative number, got {}",
                self.chunk_gap_sec
            )));
        }
        if !(self.chunk_size_threshold > 0.0 && self.chunk_size_threshold <= 1.0) {
            return Err(PrepError::InvalidParameter(format!(
                "chunk_size_threshold must lie in (0, 1], got {}",
                self.chunk_size_threshold
            )));
        }
        Ok(())
    }

    /// One sample period in seconds.
    pub fn period(&self) -> f64 {
        1.0 / self.sampling_freq
    }

    /// Sample count below which a chunk is short.
    ///
    /// ```
    /// use xdfprep::DejitterConfig;
    /// let cfg = DejitterConfig::new(250.0, 8);
    /// assert!((cfg.short_chunk_limit() - 7.6).abs() < 1e-12);
    /// ```
    pub fn short_chunk_limit(&self) -> f64 {
        self.chunk_size as f64 * self.chunk_size_threshold
    }
}

/// Configuration for the full recording preparation pipeline
/// ([`crate::preprocess`]).
#[derive(Debug, Clone)]
pub struct PrepConfig {
    /// Declared type of the amplifier stream.
    ///
    /// Default: `"EEG"`.
    pub eeg_stream_type: String,

    /// Nominal packet size of the amplifier.  `None` skips dejittering and
    /// keeps the recorded timestamps.
    ///
    /// Default: `None`.
    pub chunk_size: Option<usize>,

    /// Sampling rate used for dejittering.  `None` takes the stream's
    /// declared nominal rate.
    ///
    /// Default: `None`.
    pub sampling_freq: Option<f64>,

    /// See [`DejitterConfig::chunk_gap_sec`].
    pub chunk_gap_sec: f64,

    /// See [`DejitterConfig::chunk_size_threshold`].
    pub chunk_size_threshold: f64,

    /// Name signal columns after the channel labels stored in the stream
    /// description.  Falls back to `"0".."C-1"` when the stream has none.
    ///
    /// Default: `true`.
    pub use_channel_labels: bool,

    /// Name of the experiment-phase marker stream, if any.
    pub marker_stream_name: Option<String>,

    /// Name of the stimulus presentation stream carrying `<ecode>` events,
    /// if any.
    pub presentation_stream_name: Option<String>,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            eeg_stream_type: "EEG".into(),
            chunk_size: None,
            sampling_freq: None,
            chunk_gap_sec: DEFAULT_CHUNK_GAP_SEC,
            chunk_size_threshold: DEFAULT_CHUNK_SIZE_THRESHOLD,
            use_channel_labels: true,
            marker_stream_name: None,
            presentation_stream_name: None,
        }
    }
}

impl PrepConfig {
    /// Dejitter parameters for a stream declaring `nominal_srate`, or `None`
    /// when dejittering is disabled.
    pub fn dejitter_config(&self, nominal_srate: f64) -> Option<DejitterConfig> {
        let chunk_size = self.chunk_size?;
        Some(DejitterConfig {
            sampling_freq: self.sampling_freq.unwrap_or(nominal_srate),
            chunk_size,
            chunk_gap_sec: self.chunk_gap_sec,
            chunk_size_threshold: self.chunk_size_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_thresholds() {
        let cfg = DejitterConfig::new(250.0, 8);
        assert_eq!(cfg.chunk_gap_sec, 0.02);
        assert_eq!(cfg.chunk_size_threshold, 0.95);
        approx::assert_abs_diff_eq!(cfg.period(), 0.004, epsilon = 1e-15);
    }

    #[test]
    fn rejects_non_positive_rate_and_chunk_size() {
        for sf in [0.0, -250.0, f64::NAN, f64::INFINITY] {
            let err = DejitterConfig::new(sf, 8).validate().unwrap_err();
            assert!(matches!(err, PrepError::InvalidParameter(_)), "sf={sf}");
        }
        let err = DejitterConfig::new(250.0, 0).validate().unwrap_err();
        assert!(matches!(err, PrepError::InvalidParameter(_)));
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        let bad_gap = DejitterConfig { chunk_gap_sec: -0.1, ..DejitterConfig::new(250.0, 8) };
        assert!(bad_gap.validate().is_err());
        let bad_frac = DejitterConfig { chunk_size_threshold: 1.5, ..DejitterConfig::new(250.0, 8) };
        assert!(bad_frac.validate().is_err());
        let zero_frac = DejitterConfig { chunk_size_threshold: 0.0, ..DejitterConfig::new(250.0, 8) };
        assert!(zero_frac.validate().is_err());
        let full = DejitterConfig { chunk_size_threshold: 1.0, ..DejitterConfig::new(250.0, 8) };
        assert!(full.validate().is_ok());
    }

    #[test]
    fn prep_config_uses_nominal_rate_unless_overridden() {
        let mut cfg = PrepConfig::default();
        assert!(cfg.dejitter_config(250.0).is_none());

        cfg.chunk_size = Some(8);
        assert_eq!(cfg.dejitter_config(250.0).unwrap().sampling_freq, 250.0);

        cfg.sampling_freq = Some(125.0);
        let d = cfg.dejitter_config(250.0).unwrap();
        assert_eq!(d.sampling_freq, 125.0);
        assert_eq!(d.chunk_size, 8);
    }
}
