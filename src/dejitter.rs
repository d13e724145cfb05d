//! Chunk-aware timestamp dejittering.
//!
//! Amplifiers that push samples in packets (e.g. the OpenBCI Cyton through
//! `OpenBCI_LSL`) stamp only the first sample of each packet correctly; the
//! remaining samples of the packet are squeezed together right behind it.
//! This module rebuilds a plausible time axis:
//!
//! ```text
//! raw       |....      |....      |..   |....          (. = sample)
//!            └ chunk 0  └ chunk 1  └ short chunk 2
//!
//! 1. segment      diff[i] > chunk_gap_sec  → boundary between i and i+1
//! 2. extrapolate  chunk[k] = first_ts + k / sfreq
//! 3. reposition   short chunk (not the first) → starts 1/sfreq after the
//!                 last corrected sample of its predecessor
//! ```
//!
//! Chunks are corrected strictly left to right; each correction only reads
//! the last finalized timestamp of the previous chunk.
use crate::config::DejitterConfig;
use crate::error::{PrepError, Result};
use crate::stream::Stream;

/// Inclusive sample range `[start, stop]` delivered as one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: usize,
    pub stop: usize,
}

#[allow(clippy::len_without_is_empty)]
impl Chunk {
    /// Number of samples; never zero.
    pub fn len(&self) -> usize {
        self.stop - self.start + 1
    }
}

/// Outcome of correcting one chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkReport {
    pub chunk: Chunk,
    /// Fewer samples than `chunk_size · chunk_size_threshold`.
    pub short: bool,
    /// Offset (seconds) added to the extrapolated chunk; `0` unless the
    /// chunk was repositioned.
    pub shift: f64,
}

/// Corrected timestamps plus per-chunk diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Dejittered {
    pub time_stamps: Vec<f64>,
    pub n_short_chunks: usize,
    pub chunks: Vec<ChunkReport>,
}

/// Split `time_stamps` into chunks at every step strictly larger than
/// `chunk_gap_sec`.
///
/// The first chunk starts at 0 and the last ends at `n - 1`.  Empty input
/// yields no chunks.
pub fn segment_chunks(time_stamps: &[f64], chunk_gap_sec: f64) -> Vec<Chunk> {
    if time_stamps.is_empty() {
        return vec![];
    }
    let mut chunks = Vec::new();
    let mut start = 0;
    for (i, pair) in time_stamps.windows(2).enumerate() {
        if pair[1] - pair[0] > chunk_gap_sec {
            chunks.push(Chunk { start, stop: i });
            start = i + 1;
        }
    }
    chunks.push(Chunk { start, stop: time_stamps.len() - 1 });
    chunks
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
///
/// Same arithmetic as `numpy.linspace`: `start + k * step`, with the last
/// value pinned to `stop`.
fn linspace(start: f64, stop: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (stop - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |k| if n > 1 && k == n - 1 { stop } else { start + k as f64 * step })
}

/// Correct the timestamps of a single chunk in place.
///
/// `prev_last` is the last corrected timestamp of the preceding chunk, or
/// `None` for the first chunk of the recording (which is never shifted).
/// Returns `(short, shift)`.
pub fn correct_chunk(chunk_ts: &mut [f64], prev_last: Option<f64>, cfg: &DejitterConfig) -> (bool, f64) {
    let m = chunk_ts.len();
    if m == 0 {
        return (false, 0.0);
    }
    let period = cfg.period();
    let first_ts = chunk_ts[0];
    let last_ts = first_ts + (m - 1) as f64 * period;
    for (slot, v) in chunk_ts.iter_mut().zip(linspace(first_ts, last_ts, m)) {
        *slot = v;
    }

    let short = (m as f64) < cfg.short_chunk_limit();
    let prev = match prev_last {
        Some(prev) if short => prev,
        _ => return (short, 0.0),
    };

    // chunk_ts[0] is still first_ts here: extrapolation never moves the anchor.
    let overlap = chunk_ts[0] - prev;
    for v in chunk_ts.iter_mut() {
        *v = *v - overlap + period;
    }
    (short, period - overlap)
}

fn check_input(time_stamps: &[f64], cfg: &DejitterConfig) -> Result<()> {
    cfg.validate()?;
    if time_stamps.is_empty() {
        return Err(PrepError::InvalidInput("timestamp sequence is empty".into()));
    }
    if let Some(i) = time_stamps.iter().position(|t| !t.is_finite()) {
        return Err(PrepError::InvalidInput(format!(
            "timestamp {i} is not finite ({})",
            time_stamps[i]
        )));
    }
    Ok(())
}

fn run(time_stamps: &mut [f64], cfg: &DejitterConfig) -> Vec<ChunkReport> {
    let chunks = segment_chunks(time_stamps, cfg.chunk_gap_sec);
    let mut reports = Vec::with_capacity(chunks.len());
    let mut prev_last: Option<f64> = None;
    for chunk in chunks {
        let seg = &mut time_stamps[chunk.start..=chunk.stop];
        let (short, shift) = correct_chunk(seg, prev_last, cfg);
        prev_last = seg.last().copied();
        reports.push(ChunkReport { chunk, short, shift });
    }
    reports
}

/// Dejitter `time_stamps`, returning a new corrected sequence.
///
/// The input is left untouched.  Short chunks are a data-quality finding
/// reported through [`Dejittered::n_short_chunks`], never an error.
///
/// # Errors
///
/// * [`PrepError::InvalidParameter`] when `cfg` fails
///   [`DejitterConfig::validate`].
/// * [`PrepError::InvalidInput`] when `time_stamps` is empty or contains a
///   non-finite value.
///
/// # Examples
///
/// ```
/// use xdfprep::{dejitter, DejitterConfig};
///
/// // 8-sample chunk at t=0, then a 5-sample (short) chunk at t=0.033.
/// let mut ts: Vec<f64> = (0..8).map(|k| k as f64 * 1e-4).collect();
/// ts.extend((0..5).map(|k| 0.033 + k as f64 * 1e-4));
///
/// let out = dejitter(&ts, &DejitterConfig::new(250.0, 8)).unwrap();
/// assert_eq!(out.n_short_chunks, 1);
/// assert!((out.time_stamps[7] - 0.028).abs() < 1e-12);
/// assert!((out.time_stamps[8] - 0.032).abs() < 1e-12);
/// ```
pub fn dejitter(time_stamps: &[f64], cfg: &DejitterConfig) -> Result<Dejittered> {
    check_input(time_stamps, cfg)?;
    let mut out = time_stamps.to_vec();
    let chunks = run(&mut out, cfg);
    let n_short_chunks = chunks.iter().filter(|c| c.short).count();
    Ok(Dejittered { time_stamps: out, n_short_chunks, chunks })
}

/// In-place variant of [`dejitter`].  Returns the number of short chunks.
///
/// On error `time_stamps` is left unmodified.
pub fn dejitter_inplace(time_stamps: &mut [f64], cfg: &DejitterConfig) -> Result<usize> {
    check_input(time_stamps, cfg)?;
    Ok(run(time_stamps, cfg).iter().filter(|c| c.short).count())
}

/// Replace the timestamps of `stream` with their dejittered version.
///
/// The stream's payload must have one row per timestamp.  Returns the
/// updated stream together with the number of short chunks.
pub fn chunk_jitter_removal(mut stream: Stream, cfg: &DejitterConfig) -> Result<(Stream, usize)> {
    if stream.is_empty() {
        return Err(PrepError::InvalidInput(format!(
            "stream '{}' has no timestamps",
            stream.info.name
        )));
    }
    stream.check_lengths()?;
    let n_short = dejitter_inplace(&mut stream.time_stamps, cfg)?;
    Ok((stream, n_short))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> DejitterConfig {
        DejitterConfig::new(250.0, 8)
    }

    #[test]
    fn single_sample_is_one_chunk() {
        assert_eq!(segment_chunks(&[3.0], 0.02), vec![Chunk { start: 0, stop: 0 }]);
        let out = dejitter(&[3.0], &cfg()).unwrap();
        assert_eq!(out.time_stamps, vec![3.0]);
        // one sample < 7.6 → the first chunk is counted but not moved
        assert_eq!(out.n_short_chunks, 1);
    }

    #[test]
    fn segments_on_strict_gap() {
        let ts = [0.0, 0.001, 0.05, 0.051, 0.071, 0.2];
        // 0.051 → 0.071 is exactly 0.02 (within fp error) and must not split
        let chunks = segment_chunks(&ts, 0.0200001);
        assert_eq!(
            chunks,
            vec![
                Chunk { start: 0, stop: 1 },
                Chunk { start: 2, stop: 4 },
                Chunk { start: 5, stop: 5 },
            ]
        );
    }

    #[test]
    fn linspace_pins_endpoints() {
        let v: Vec<f64> = linspace(1.0, 2.0, 5).collect();
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[4], 2.0);
        approx::assert_abs_diff_eq!(v[2], 1.5, epsilon = 1e-15);
        assert_eq!(linspace(7.0, 7.0, 1).collect::<Vec<_>>(), vec![7.0]);
    }

    #[test]
    fn first_chunk_never_shifted() {
        let mut seg = vec![10.0, 10.0001, 10.0002];
        let (short, shift) = correct_chunk(&mut seg, None, &cfg());
        assert!(short);
        assert_eq!(shift, 0.0);
        assert_eq!(seg[0], 10.0);
        approx::assert_abs_diff_eq!(seg[2], 10.008, epsilon = 1e-12);
    }

    #[test]
    fn short_chunk_reanchored_after_predecessor() {
        let mut seg = vec![5.0, 5.0001];
        let (short, shift) = correct_chunk(&mut seg, Some(4.9), &cfg());
        assert!(short);
        approx::assert_abs_diff_eq!(shift, 0.004 - 0.1, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(seg[0], 4.904, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(seg[1], 4.908, epsilon = 1e-12);
    }

    #[test]
    fn full_chunk_keeps_its_anchor() {
        let mut seg: Vec<f64> = (0..8).map(|k| 2.0 + k as f64 * 1e-5).collect();
        let (short, shift) = correct_chunk(&mut seg, Some(1.5), &cfg());
        assert!(!short);
        assert_eq!(shift, 0.0);
        assert_eq!(seg[0], 2.0);
        approx::assert_abs_diff_eq!(seg[7], 2.028, epsilon = 1e-12);
    }

    #[test]
    fn empty_and_non_finite_input_rejected() {
        assert!(matches!(dejitter(&[], &cfg()), Err(PrepError::InvalidInput(_))));
        assert!(matches!(dejitter(&[0.0, f64::NAN], &cfg()), Err(PrepError::InvalidInput(_))));
    }

    #[test]
    fn bad_parameters_rejected_before_touching_input() {
        let mut ts = vec![0.0, 0.0001, 0.0002];
        let bad = DejitterConfig::new(0.0, 8);
        assert!(matches!(dejitter_inplace(&mut ts, &bad), Err(PrepError::InvalidParameter(_))));
        assert_eq!(ts, vec![0.0, 0.0001, 0.0002]);
    }

    #[test]
    fn inplace_matches_value_returning() {
        let mut ts: Vec<f64> = Vec::new();
        for (c, n) in [8usize, 8, 3, 8, 5].iter().enumerate() {
            let t0 = c as f64 * 0.032 + 0.001 * (c % 2) as f64;
            ts.extend((0..*n).map(|k| t0 + k as f64 * 1e-5));
        }
        let out = dejitter(&ts, &cfg()).unwrap();
        let mut inplace = ts.clone();
        let n_short = dejitter_inplace(&mut inplace, &cfg()).unwrap();
        assert_eq!(n_short, out.n_short_chunks);
        assert_eq!(inplace, out.time_stamps);
    }
}
