//! Tabular views of recording streams.
//!
//! * [`make_signal_frame`]     — continuous stream → `[T, C]` matrix + time column
//! * [`make_marker_frame`]     — marker stream → (label, time) pairs
//! * [`make_erp_event_frame`]  — presentation stream → structured sound events
//!
//! Presentation events are annotation strings such as
//!
//! ```text
//! <etype>Sound</etype><ecode>12;B1;1;4;7;tone_1000.wav;standard</ecode>
//! ```
//!
//! whose `<ecode>` body holds seven `;`-separated fields.
use ndarray::Array2;

use crate::error::{PrepError, Result};
use crate::stream::{Stream, TimeSeries};

const ECODE_OPEN: &str = "<ecode>";
const ECODE_CLOSE: &str = "</ecode>";
const SOUND_TAG: &str = "<etype>Sound</etype>";
const N_EVENT_FIELDS: usize = 7;

/// Continuous samples with one time value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    /// One name per data column.
    pub columns: Vec<String>,
    /// `[T]` sample times in seconds.
    pub time: Vec<f64>,
    /// `[T, C]` samples.
    pub data: Array2<f64>,
}

impl SignalFrame {
    /// Column names including the leading `"time"` column.
    pub fn header(&self) -> Vec<String> {
        std::iter::once("time".to_string()).chain(self.columns.iter().cloned()).collect()
    }

    pub fn n_rows(&self) -> usize {
        self.time.len()
    }
}

/// Marker labels paired with their timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerFrame {
    pub labels: Vec<String>,
    pub time: Vec<f64>,
}

/// One sound presentation event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub block: String,
    pub block_nr: String,
    pub trial: String,
    pub stim_nr: String,
    pub stimulus: String,
    pub stimulus_type: String,
    pub time: f64,
}

/// Build a [`SignalFrame`] from a continuous stream.
///
/// With `use_labels` the channel labels of the stream header name the
/// columns; without them, or when the header has no channel description,
/// columns are named `"0".."C-1"`.
pub fn make_signal_frame(stream: &Stream, use_labels: bool) -> Result<SignalFrame> {
    let rows = match &stream.time_series {
        TimeSeries::Numeric(rows) => rows,
        TimeSeries::Markers(_) => {
            return Err(PrepError::InvalidInput(format!(
                "stream '{}' carries markers, not continuous samples",
                stream.info.name
            )))
        }
    };
    stream.check_lengths()?;

    let n_t = rows.len();
    let n_ch = rows.first().map_or(0, Vec::len);
    if let Some(t) = rows.iter().position(|r| r.len() != n_ch) {
        return Err(PrepError::InvalidInput(format!(
            "stream '{}': sample {t} has {} channels, expected {n_ch}",
            stream.info.name,
            rows[t].len()
        )));
    }

    let columns = match stream.channel_labels().filter(|_| use_labels) {
        Some(labels) if labels.len() == n_ch => labels,
        Some(labels) => {
            return Err(PrepError::InvalidInput(format!(
                "stream '{}': {} channel labels for {n_ch} channels",
                stream.info.name,
                labels.len()
            )))
        }
        None => (0..n_ch).map(|c| c.to_string()).collect(),
    };

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let data = Array2::from_shape_vec((n_t, n_ch), flat)
        .map_err(|e| PrepError::InvalidInput(e.to_string()))?;

    Ok(SignalFrame { columns, time: stream.time_stamps.clone(), data })
}

/// Flatten a marker stream's payload into one label per timestamp.
fn flatten_markers(stream: &Stream) -> Result<Vec<String>> {
    // An empty marker stream deserialises as an empty numeric payload.
    let labels: Vec<String> = match &stream.time_series {
        TimeSeries::Markers(rows) => rows.iter().flatten().cloned().collect(),
        TimeSeries::Numeric(rows) if rows.is_empty() => vec![],
        TimeSeries::Numeric(_) => {
            return Err(PrepError::InvalidInput(format!(
                "stream '{}' carries numeric samples, not markers",
                stream.info.name
            )))
        }
    };
    if labels.len() != stream.time_stamps.len() {
        return Err(PrepError::InvalidInput(format!(
            "stream '{}': {} marker values but {} timestamps",
            stream.info.name,
            labels.len(),
            stream.time_stamps.len()
        )));
    }
    Ok(labels)
}

/// Build a [`MarkerFrame`] (e.g. experiment phases) from a marker stream.
pub fn make_marker_frame(stream: &Stream) -> Result<MarkerFrame> {
    let labels = flatten_markers(stream)?;
    Ok(MarkerFrame { labels, time: stream.time_stamps.clone() })
}

/// Text between the first `<ecode>` and the first `</ecode>`.
///
/// ```
/// use xdfprep::frame::strip_ecode;
/// assert_eq!(strip_ecode("<x/><ecode>a;b</ecode>").unwrap(), "a;b");
/// assert!(strip_ecode("no tags").is_err());
/// ```
pub fn strip_ecode(event: &str) -> Result<&str> {
    let open = event
        .find(ECODE_OPEN)
        .ok_or_else(|| PrepError::MalformedEvent(format!("missing {ECODE_OPEN} in '{event}'")))?;
    let close = event
        .find(ECODE_CLOSE)
        .ok_or_else(|| PrepError::MalformedEvent(format!("missing {ECODE_CLOSE} in '{event}'")))?;
    let body_start = open + ECODE_OPEN.len();
    if close < body_start {
        return Err(PrepError::MalformedEvent(format!("{ECODE_CLOSE} precedes {ECODE_OPEN} in '{event}'")));
    }
    Ok(&event[body_start..close])
}

fn parse_event(event: &str, time: f64) -> Result<EventRecord> {
    let body = strip_ecode(event)?;
    let fields: Vec<&str> = body.split(';').collect();
    if fields.len() != N_EVENT_FIELDS {
        return Err(PrepError::MalformedEvent(format!(
            "expected {N_EVENT_FIELDS} ';'-separated fields, got {} in '{body}'",
            fields.len()
        )));
    }
    // fields[0] is the event code, which is not kept.
    Ok(EventRecord {
        block: fields[1].to_string(),
        block_nr: fields[2].to_string(),
        trial: fields[3].to_string(),
        stim_nr: fields[4].to_string(),
        stimulus: fields[5].to_string(),
        stimulus_type: fields[6].to_string(),
        time,
    })
}

/// Extract sound presentation events from a presentation marker stream.
///
/// Only markers containing `<etype>Sound</etype>` are kept; the order of
/// the stream is preserved.
pub fn make_erp_event_frame(stream: &Stream) -> Result<Vec<EventRecord>> {
    let labels = flatten_markers(stream)?;
    labels
        .iter()
        .zip(&stream.time_stamps)
        .filter(|(label, _)| label.contains(SOUND_TAG))
        .map(|(label, &time)| parse_event(label, time))
        .collect()
}
