//! Multi-stream recording container.
//!
//! Mirrors the layout of an XDF recording loaded into memory: a list of
//! streams, each with an `info` header, a per-sample payload
//! (`time_series`) and a parallel `time_stamps` vector in seconds.  The
//! types derive `serde` so a JSON export of such a recording can be read
//! directly (see [`crate::io::load_streams`]).
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Per-channel description from the stream header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDesc {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,
}

/// Stream header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub stream_type: String,
    /// Declared sampling rate in Hz (`0` for irregular marker streams).
    #[serde(default)]
    pub nominal_srate: f64,
    /// Channel descriptions; empty when the header carries none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ChannelDesc>,
}

/// Per-sample payload: one row per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeSeries {
    /// Continuous samples, `[T][C]`.
    Numeric(Vec<Vec<f64>>),
    /// Discrete marker samples, usually one string per sample.
    Markers(Vec<Vec<String>>),
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        match self {
            TimeSeries::Numeric(rows) => rows.len(),
            TimeSeries::Markers(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub info: StreamInfo,
    pub time_series: TimeSeries,
    pub time_stamps: Vec<f64>,
}

impl Stream {
    /// Number of samples (timestamps) in the stream.
    pub fn len(&self) -> usize {
        self.time_stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_stamps.is_empty()
    }

    /// Channel labels from the header, or `None` if it has no channel
    /// description.
    pub fn channel_labels(&self) -> Option<Vec<String>> {
        if self.info.channels.is_empty() {
            return None;
        }
        Some(self.info.channels.iter().map(|c| c.label.clone()).collect())
    }

    /// Payload and timestamps must describe the same number of samples.
    pub fn check_lengths(&self) -> Result<()> {
        let n_payload = self.time_series.len();
        if n_payload != self.time_stamps.len() {
            return Err(PrepError::InvalidInput(format!(
                "stream '{}': {} payload samples but {} timestamps",
                self.info.name,
                n_payload,
                self.time_stamps.len()
            )));
        }
        Ok(())
    }
}

/// Index of the stream whose declared type equals `stream_type`.
///
/// When several streams match, the last one in recording order wins.
pub fn position_stream_by_type(streams: &[Stream], stream_type: &str) -> Option<usize> {
    streams.iter().rposition(|s| s.info.stream_type == stream_type)
}

/// Stream whose declared type equals `stream_type`.
///
/// Same selection rule as [`position_stream_by_type`].
pub fn find_stream_by_type<'a>(streams: &'a [Stream], stream_type: &str) -> Option<&'a Stream> {
    position_stream_by_type(streams, stream_type).map(|i| &streams[i])
}

/// Stream whose declared name equals `name`.
///
/// When several streams match, the last one in recording order is returned.
pub fn find_stream_by_name<'a>(streams: &'a [Stream], name: &str) -> Option<&'a Stream> {
    streams.iter().rev().find(|s| s.info.name == name)
}
