//! File I/O for the preparation pipeline.
//!
//! Reader/writer: a JSON export of a multi-stream recording (a list of
//! [`Stream`] objects).  Table writers: tab-separated text with a header row.
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::frame::{EventRecord, MarkerFrame, SignalFrame};
use crate::stream::Stream;

/// Load every stream of a JSON recording export.
pub fn load_streams(path: &Path) -> Result<Vec<Stream>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let streams: Vec<Stream> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing stream container {}", path.display()))?;
    Ok(streams)
}

/// Write `streams` back out as a JSON recording export.
pub fn save_streams(path: &Path, streams: &[Stream]) -> Result<()> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, streams).context("serialising streams")?;
    w.flush()?;
    Ok(())
}

fn tsv_writer(path: &Path) -> Result<csv::Writer<File>> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(csv::WriterBuilder::new().delimiter(b'\t').from_writer(f))
}

/// Write a [`SignalFrame`] as `time<TAB>ch0<TAB>ch1…`, one row per sample.
pub fn write_signal_tsv(frame: &SignalFrame, path: &Path) -> Result<()> {
    let mut w = tsv_writer(path)?;
    w.write_record(frame.header())?;
    for (t, row) in frame.time.iter().zip(frame.data.rows()) {
        let record = std::iter::once(t).chain(row.iter()).map(|v| v.to_string());
        w.write_record(record)?;
    }
    w.flush()?;
    Ok(())
}

/// Write a [`MarkerFrame`] as `label<TAB>time`.  Labels containing tabs,
/// quotes or newlines are quoted.
pub fn write_markers_tsv(frame: &MarkerFrame, path: &Path) -> Result<()> {
    let mut w = tsv_writer(path)?;
    w.write_record(["label", "time"])?;
    for (label, t) in frame.labels.iter().zip(&frame.time) {
        w.write_record([label.as_str(), t.to_string().as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// Write sound events, one per row.
pub fn write_events_tsv(events: &[EventRecord], path: &Path) -> Result<()> {
    let mut w = tsv_writer(path)?;
    w.write_record(["time", "block", "block_nr", "trial", "stim_nr", "stimulus", "stimulus_type"])?;
    for e in events {
        w.write_record([
            e.time.to_string().as_str(),
            e.block.as_str(),
            e.block_nr.as_str(),
            e.trial.as_str(),
            e.stim_nr.as_str(),
            e.stimulus.as_str(),
            e.stimulus_type.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
