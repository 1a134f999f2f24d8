use clap::{Parser, Subcommand, ValueEnum};
use hound::WavSpec;
use serde::Serialize;
use sonolink_core::framing::FrameEncoder;
use sonolink_core::pips::{generate_init_pips, DEFAULT_PIP_SWITCHES};
use sonolink_core::waveform::WaveShape;
use sonolink_core::{
    Decoder, Encoder, EncoderFsk, FskConfig, PreambleScanner, SignalConfig, DEFAULT_CARRIER_FREQ,
    DEFAULT_SIGNAL_FREQ, FSK_CARRIER_FREQ,
};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sonolink")]
#[command(about = "Acoustic data link: Hamming-framed messages as PWM/SSB or FSK audio")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode binary data to a WAV audio file
    Encode {
        /// Input binary file
        #[arg(value_name = "INPUT.BIN")]
        input: PathBuf,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Use continuous-phase FSK instead of PWM sub-carriers
        #[arg(long)]
        fsk: bool,

        /// Omit the magic preamble
        #[arg(long)]
        no_preamble: bool,

        /// Play two-tone init pips before the data
        #[arg(long)]
        pips: bool,

        /// Output sample rate in Hz
        #[arg(long, default_value = "44100")]
        sample_rate: u32,

        /// Carrier frequency in Hz (PWM default: 14700, FSK default: 18750)
        #[arg(long)]
        carrier: Option<f64>,

        /// PWM signal frequency in Hz (two bits per period)
        #[arg(long, default_value_t = DEFAULT_SIGNAL_FREQ)]
        signal_freq: f64,

        /// PWM sub-carrier wave shape
        #[arg(long, value_enum, default_value = "triangle")]
        shape: ShapeArg,
    },

    /// Hamming-code a file into a codeword byte stream
    Frame {
        #[arg(value_name = "INPUT.BIN")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT.BIN")]
        output: PathBuf,

        /// Omit the magic preamble
        #[arg(long)]
        no_preamble: bool,
    },

    /// Synchronize on the preamble and decode a captured codeword stream
    Unframe {
        #[arg(value_name = "INPUT.BIN")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT.BIN")]
        output: PathBuf,
    },

    /// Report the preamble position in a captured stream as JSON
    Scan {
        #[arg(value_name = "INPUT.BIN")]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Square,
    Triangle,
}

impl From<ShapeArg> for WaveShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Square => WaveShape::Square,
            ShapeArg::Triangle => WaveShape::Triangle,
        }
    }
}

#[derive(Serialize)]
struct ScanReport {
    /// -1 when no magic codeword was seen
    bit_offset: i64,
    match_count: u32,
    locked: bool,
    payload_offset: Option<usize>,
}

struct EncodeOptions {
    fsk: bool,
    include_preamble: bool,
    pips: bool,
    sample_rate: u32,
    carrier: Option<f64>,
    signal_freq: f64,
    shape: WaveShape,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            fsk,
            no_preamble,
            pips,
            sample_rate,
            carrier,
            signal_freq,
            shape,
        } => {
            let options = EncodeOptions {
                fsk,
                include_preamble: !no_preamble,
                pips,
                sample_rate,
                carrier,
                signal_freq,
                shape: shape.into(),
            };
            encode_command(&input, &output, &options)?
        }
        Commands::Frame {
            input,
            output,
            no_preamble,
        } => frame_command(&input, &output, !no_preamble)?,
        Commands::Unframe { input, output } => unframe_command(&input, &output)?,
        Commands::Scan { input } => scan_command(&input)?,
    }

    Ok(())
}

fn encode_command(
    input_path: &Path,
    output_path: &Path,
    options: &EncodeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input_path)?;
    println!("Read {} bytes from {}", data.len(), input_path.display());

    let data_samples = if options.fsk {
        let config = FskConfig {
            sample_rate: options.sample_rate as f64,
            carrier_freq: options.carrier.unwrap_or(FSK_CARRIER_FREQ),
            ..FskConfig::default()
        };
        let mut encoder = EncoderFsk::new(config)?;
        encoder.set_include_preamble(options.include_preamble);
        println!(
            "Encoding with FSK: {} Hz / {} Hz at {} baud",
            config.space_freq(),
            config.mark_freq(),
            config.symbol_rate
        );
        encoder.encode(&data)
    } else {
        let config = SignalConfig {
            sample_rate: options.sample_rate as f64,
            carrier_freq: options.carrier.unwrap_or(DEFAULT_CARRIER_FREQ),
            signal_freq: options.signal_freq,
            shape: options.shape,
            ..SignalConfig::default()
        };
        let mut encoder = Encoder::new(config)?;
        encoder.set_include_preamble(options.include_preamble);
        println!(
            "Encoding with PWM sub-carriers: {:?} wave, carrier {} Hz",
            config.shape, config.carrier_freq
        );
        let clamped = encoder.clamped_pairs(&data);
        if clamped > 0 {
            println!("Warning: {} run pairs clamped to the stable duty range", clamped);
        }
        encoder.encode(&data)
    };

    let mut samples = Vec::new();
    if options.pips {
        samples = generate_init_pips(options.sample_rate as f64, DEFAULT_PIP_SWITCHES, 1.0)?;
        println!("Prepended {} samples of init pips", samples.len());
    }
    samples.extend(data_samples);
    println!("Encoded to {} audio samples", samples.len());

    write_wav(output_path, &samples, options.sample_rate)?;
    println!("Wrote {}", output_path.display());
    Ok(())
}

/// Write mono 16-bit PCM
fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), Box<dyn std::error::Error>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let file = File::create(path)?;
    let mut writer = hound::WavWriter::new(file, spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

fn frame_command(
    input_path: &Path,
    output_path: &Path,
    include_preamble: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input_path)?;
    let framed = FrameEncoder::encode(&data, include_preamble);
    std::fs::write(output_path, &framed)?;
    println!(
        "Framed {} bytes into {} codeword bytes",
        data.len(),
        framed.len()
    );
    Ok(())
}

fn unframe_command(input_path: &Path, output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let received = std::fs::read(input_path)?;
    let frame = Decoder::new().decode(&received)?;

    println!(
        "Preamble at bit {} ({} copies)",
        frame.lock.bit_offset, frame.lock.match_count
    );
    if frame.truncated {
        println!("Stopped at an uncorrectable codeword");
    }

    std::fs::write(output_path, &frame.payload)?;
    println!("Decoded {} bytes to {}", frame.payload.len(), output_path.display());
    Ok(())
}

fn scan_command(input_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let received = std::fs::read(input_path)?;
    let scanner = PreambleScanner::default();

    let report = match scanner.scan(&received) {
        Some(found) => ScanReport {
            bit_offset: found.bit_offset as i64,
            match_count: found.match_count,
            locked: scanner.is_locked(&found),
            payload_offset: Some(found.payload_offset()),
        },
        None => ScanReport {
            bit_offset: -1,
            match_count: 0,
            locked: false,
            payload_offset: None,
        },
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
