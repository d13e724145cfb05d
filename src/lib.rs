//! # xdfprep — chunk-aware timestamp dejittering for EEG recordings
//!
//! `xdfprep` prepares multi-stream recordings (one continuous amplifier
//! stream plus discrete marker streams, as produced by LSL/XDF) for
//! analysis.  Its core is [`dejitter::dejitter`]: amplifiers that deliver
//! samples in packets stamp only the first sample of a packet correctly,
//! and this step rebuilds an evenly spaced time axis per packet while
//! moving undersized packets back into place.
//!
//! ## Pipeline overview
//!
//! ```text
//! recording.json  (list of streams: info / time_series / time_stamps)
//!   │
//!   ├─ stream::find_stream_by_type("EEG")   amplifier stream
//!   ├─ dejitter::chunk_jitter_removal()     per-chunk extrapolation,
//!   │                                       short-chunk repositioning
//!   ├─ frame::make_signal_frame()           [T, C] + time column
//!   ├─ frame::make_marker_frame()           experiment phases (optional)
//!   └─ frame::make_erp_event_frame()        <ecode> sound events (optional)
//!        │
//!        └─→ Prepared { eeg, signal, n_short_chunks, markers, events }
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use xdfprep::{preprocess, PrepConfig};
//! use xdfprep::io::load_streams;
//! use std::path::Path;
//!
//! let streams = load_streams(Path::new("data/recording.json")).unwrap();
//! let cfg = PrepConfig {
//!     chunk_size: Some(8),
//!     marker_stream_name: Some("ExpMarkers".into()),
//!     ..PrepConfig::default()
//! };
//! let prepared = preprocess(&streams, &cfg).unwrap();
//! println!("{} samples, {} short chunks",
//!     prepared.signal.n_rows(), prepared.n_short_chunks);
//! ```
//!
//! ## Dejittering a bare timestamp vector
//!
//! ```
//! use xdfprep::{dejitter, DejitterConfig};
//!
//! let ts = vec![0.0, 0.0001, 0.0002, 0.0003];
//! let out = dejitter(&ts, &DejitterConfig::new(250.0, 4)).unwrap();
//! assert!((out.time_stamps[3] - 0.012).abs() < 1e-12);
//! assert_eq!(out.n_short_chunks, 0);
//! ```

pub mod config;
pub mod dejitter;
pub mod error;
pub mod frame;
pub mod io;
pub mod stream;

use log::{debug, warn};

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::{DejitterConfig, PrepConfig, DEFAULT_CHUNK_GAP_SEC, DEFAULT_CHUNK_SIZE_THRESHOLD};

// dejitter
pub use dejitter::{
    chunk_jitter_removal, correct_chunk, dejitter, dejitter_inplace, segment_chunks,
    Chunk, ChunkReport, Dejittered,
};

// error
pub use error::{PrepError, Result};

// frame
pub use frame::{
    make_erp_event_frame, make_marker_frame, make_signal_frame, strip_ecode,
    EventRecord, MarkerFrame, SignalFrame,
};

// stream
pub use stream::{
    find_stream_by_name, find_stream_by_type, position_stream_by_type,
    ChannelDesc, Stream, StreamInfo, TimeSeries,
};

/// Result of [`preprocess`].
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Position of the amplifier stream in the input recording.
    pub eeg_index: usize,
    /// The amplifier stream with its (possibly dejittered) timestamps.
    pub eeg: Stream,
    /// Amplifier samples with (possibly dejittered) timestamps.
    pub signal: SignalFrame,
    /// Short chunks found while dejittering; `0` when dejittering is off.
    pub n_short_chunks: usize,
    /// Experiment-phase markers, when a marker stream name is configured.
    pub markers: Option<MarkerFrame>,
    /// Sound presentation events, when a presentation stream name is configured.
    pub events: Option<Vec<EventRecord>>,
}

impl Prepared {
    /// Copy of `streams` with the amplifier stream replaced by the corrected
    /// one.  `streams` must be the recording passed to [`preprocess`].
    pub fn corrected_streams(&self, streams: &[Stream]) -> Vec<Stream> {
        let mut out = streams.to_vec();
        out[self.eeg_index] = self.eeg.clone();
        out
    }
}

/// Run the **full preparation pipeline** on one recording.
///
/// # Pipeline steps
///
/// 1. Select the amplifier stream by [`PrepConfig::eeg_stream_type`].
/// 2. If [`PrepConfig::chunk_size`] is set, dejitter its timestamps
///    (sampling rate from [`PrepConfig::sampling_freq`] or the stream's
///    nominal rate).
/// 3. Build the signal table.
/// 4. Build the marker table and the sound event list from the configured
///    stream names.
///
/// # Errors
///
/// * [`PrepError::StreamNotFound`] if the amplifier stream or a configured
///   marker/presentation stream is missing.
/// * Any error of [`chunk_jitter_removal`], [`make_signal_frame`],
///   [`make_marker_frame`] or [`make_erp_event_frame`].
pub fn preprocess(streams: &[Stream], cfg: &PrepConfig) -> Result<Prepared> {
    // 1. Amplifier stream.
    let eeg_index = position_stream_by_type(streams, &cfg.eeg_stream_type)
        .ok_or_else(|| PrepError::StreamNotFound(format!("type '{}'", cfg.eeg_stream_type)))?;
    let eeg = streams[eeg_index].clone();
    debug!(
        "amplifier stream '{}': {} samples @ {} Hz",
        eeg.info.name,
        eeg.len(),
        eeg.info.nominal_srate
    );

    // 2. Dejitter.
    let (eeg, n_short_chunks) = match cfg.dejitter_config(eeg.info.nominal_srate) {
        Some(dcfg) => {
            let (eeg, n_short) = chunk_jitter_removal(eeg, &dcfg)?;
            if n_short > 0 {
                warn!(
                    "stream '{}': {n_short} short chunk(s) (< {:.2} samples)",
                    eeg.info.name,
                    dcfg.short_chunk_limit()
                );
            }
            (eeg, n_short)
        }
        None => (eeg, 0),
    };

    // 3. Signal table.
    let signal = make_signal_frame(&eeg, cfg.use_channel_labels)?;

    // 4. Markers and events.
    let markers = match &cfg.marker_stream_name {
        Some(name) => Some(make_marker_frame(named(streams, name)?)?),
        None => None,
    };
    let events = match &cfg.presentation_stream_name {
        Some(name) => {
            let events = make_erp_event_frame(named(streams, name)?)?;
            debug!("presentation stream '{name}': {} sound events", events.len());
            Some(events)
        }
        None => None,
    };

    Ok(Prepared { eeg_index, eeg, signal, n_short_chunks, markers, events })
}

fn named<'a>(streams: &'a [Stream], name: &str) -> Result<&'a Stream> {
    find_stream_by_name(streams, name).ok_or_else(|| PrepError::StreamNotFound(format!("name '{name}'")))
}
