use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use xdfprep::{
    preprocess,
    io::{load_streams, save_streams, write_events_tsv, write_markers_tsv, write_signal_tsv},
    PrepConfig, DEFAULT_CHUNK_GAP_SEC, DEFAULT_CHUNK_SIZE_THRESHOLD,
};

#[derive(Parser)]
#[command(name = "preproc", about = "Dejitter and tabulate a multi-stream EEG recording")]
struct Args {
    /// Recording exported as JSON (list of streams)
    #[arg(long)]
    input: PathBuf,

    /// Directory for signal.tsv / markers.tsv / events.tsv
    #[arg(long)]
    output_dir: PathBuf,

    /// Declared type of the amplifier stream
    #[arg(long, default_value = "EEG")]
    eeg_type: String,

    /// Nominal samples per packet; dejittering is skipped when omitted
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Amplifier sampling rate in Hz (default: the stream's nominal rate)
    #[arg(long)]
    sfreq: Option<f64>,

    /// Timestamp gap (s) that starts a new chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_GAP_SEC)]
    chunk_gap_sec: f64,

    /// Fraction of chunk_size below which a chunk is short
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE_THRESHOLD)]
    chunk_size_threshold: f64,

    /// Name of the experiment-phase marker stream
    #[arg(long)]
    marker_stream: Option<String>,

    /// Name of the stimulus presentation stream (<ecode> events)
    #[arg(long)]
    presentation_stream: Option<String>,

    /// Number signal columns instead of using channel labels
    #[arg(long)]
    no_labels: bool,

    /// Also write the recording with corrected amplifier timestamps
    #[arg(long)]
    dejittered_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let streams = load_streams(&args.input)?;
    info!("Loaded {} stream(s) from {}", streams.len(), args.input.display());

    let cfg = PrepConfig {
        eeg_stream_type: args.eeg_type,
        chunk_size: args.chunk_size,
        sampling_freq: args.sfreq,
        chunk_gap_sec: args.chunk_gap_sec,
        chunk_size_threshold: args.chunk_size_threshold,
        use_channel_labels: !args.no_labels,
        marker_stream_name: args.marker_stream,
        presentation_stream_name: args.presentation_stream,
    };

    let prepared = preprocess(&streams, &cfg)?;
    info!(
        "Signal: {} samples × {} channels, {} short chunk(s)",
        prepared.signal.n_rows(),
        prepared.signal.columns.len(),
        prepared.n_short_chunks
    );

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let signal_path = args.output_dir.join("signal.tsv");
    write_signal_tsv(&prepared.signal, &signal_path)?;
    info!("Written → {}", signal_path.display());

    if let Some(markers) = &prepared.markers {
        let path = args.output_dir.join("markers.tsv");
        write_markers_tsv(markers, &path)?;
        info!("{} markers → {}", markers.labels.len(), path.display());
    }

    if let Some(events) = &prepared.events {
        let path = args.output_dir.join("events.tsv");
        write_events_tsv(events, &path)?;
        info!("{} sound events → {}", events.len(), path.display());
    }

    if let Some(path) = &args.dejittered_json {
        save_streams(path, &prepared.corrected_streams(&streams))?;
        info!("Written → {}", path.display());
    }

    Ok(())
}
