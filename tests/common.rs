/// Shared helpers: synthetic packetised timestamp streams.
use xdfprep::{ChannelDesc, Stream, StreamInfo, TimeSeries};

/// Spacing of the squeezed (jittered) stamps inside one packet.
#[allow(unused)]
pub const SQUEEZE: f64 = 1e-5;

#[allow(unused)]
/// Timestamps for packets given as `(first_ts, n_samples)`: the first sample
/// of each packet is exact, the rest follow `SQUEEZE` seconds apart.
pub fn packets(layout: &[(f64, usize)]) -> Vec<f64> {
    layout.iter()
        .flat_map(|&(t0, n)| (0..n).map(move |k| t0 + k as f64 * SQUEEZE))
        .collect()
}

#[allow(unused)]
/// `n_chunks` full packets of `chunk_size` samples delivered on time.
pub fn regular_packets(t0: f64, sfreq: f64, chunk_size: usize, n_chunks: usize) -> Vec<f64> {
    let layout: Vec<(f64, usize)> = (0..n_chunks)
        .map(|c| (t0 + (c * chunk_size) as f64 / sfreq, chunk_size))
        .collect();
    packets(&layout)
}

#[allow(unused)]
/// Perfect grid `t0 + i / sfreq`.
pub fn grid(t0: f64, sfreq: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| t0 + i as f64 / sfreq).collect()
}

#[allow(unused)]
/// Maximum absolute difference between two sequences.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0_f64, f64::max)
}

#[allow(unused)]
/// Continuous stream with `n_ch` channels over the given timestamps.
pub fn eeg_stream(name: &str, labels: &[&str], time_stamps: Vec<f64>) -> Stream {
    let n_ch = labels.len();
    let rows = (0..time_stamps.len())
        .map(|t| (0..n_ch).map(|c| (t * 10 + c) as f64).collect())
        .collect();
    Stream {
        info: StreamInfo {
            name: name.into(),
            stream_type: "EEG".into(),
            nominal_srate: 250.0,
            channels: labels
                .iter()
                .map(|l| ChannelDesc { label: l.to_string(), unit: Some("uV".into()), channel_type: None })
                .collect(),
        },
        time_series: TimeSeries::Numeric(rows),
        time_stamps,
    }
}

#[allow(unused)]
/// Marker stream with one string per sample.
pub fn marker_stream(name: &str, markers: &[(&str, f64)]) -> Stream {
    Stream {
        info: StreamInfo {
            name: name.into(),
            stream_type: "Markers".into(),
            nominal_srate: 0.0,
            channels: vec![],
        },
        time_series: TimeSeries::Markers(markers.iter().map(|(m, _)| vec![m.to_string()]).collect()),
        time_stamps: markers.iter().map(|&(_, t)| t).collect(),
    }
}
