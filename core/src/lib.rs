//! Acoustic data link for short messages
//!
//! Hamming(32,26) SECDED codewords behind a repeated magic preamble, sent as
//! run-length PWM sub-carriers on a single-sideband carrier or as
//! continuous-phase FSK near the top of the audible band

pub mod error;
pub mod hamming;
pub mod framing;
pub mod sync;
pub mod waveform;
pub mod mixer;
pub mod symbol;
pub mod signal;
pub mod fsk;
pub mod filters;
pub mod pips;
pub mod encoder;
pub mod encoder_fsk;
pub mod decoder;

pub use decoder::{Decoder, ReceivedFrame};
pub use encoder::Encoder;
pub use encoder_fsk::EncoderFsk;
pub use error::{LinkError, Result};
pub use fsk::FskConfig;
pub use signal::SignalConfig;
pub use sync::{PreambleMatch, PreambleScanner};

// Codeword framing
pub const CODEWORD_BYTES: usize = 4;
pub const GROUP_BYTES: usize = 3; // payload bytes per codeword

// Preamble
pub const MAGIC_PAYLOAD: u32 = 24_826_601;
pub const MAGIC_CODEWORD: u32 = hamming::encode(MAGIC_PAYLOAD);
pub const PREAMBLE_CODEWORDS: usize = 6;
pub const SYNC_LOCK_THRESHOLD: u32 = 5;

// PWM sub-carrier signal
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0; // Hz
pub const DEFAULT_SIGNAL_FREQ: f64 = 1050.0; // Hz, two bits per period
pub const DEFAULT_CARRIER_FREQ: f64 = 14700.0; // Hz
pub const DEFAULT_MAGNITUDE: f64 = 0.2;
pub const DEFAULT_SERIES_LENGTH: usize = 5;

// FSK
pub const FSK_CARRIER_FREQ: f64 = 18750.0; // Hz, tones at 18500 and 19000
pub const FSK_SYMBOL_RATE: f64 = 1000.0; // baud
pub const FSK_DEVIATION: f64 = 500.0; // Hz between mark and space
