//! GNSS position fix acquisition from NMEA-0183
//!
//! Bytes from a receiver's serial link are reassembled into sentences,
//! checksum-verified, and the GGA (position, quality, height) and RMC (date,
//! magnetic variation) sentences are paired into a single [`CombinedFix`].
//! Everything from byte stream to combined fix is synchronous and owned by
//! one acquisition attempt; waiting on the transport is left to
//! [`GnssReader`].

pub mod cli;
pub mod config;
pub mod devices;
pub mod nmea;
pub mod output;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use devices::gps::{FixCombiner, PairingState};
pub use devices::{CombinedFix, GnssReader, NmeaFixParser, PowerControl, SerialTransport, Transport};
pub use nmea::{GgaFix, GpsQuality, RmcFix, Sentence, StreamReassembler};
pub use output::{ConsoleFormatter, CsvFormatter, DataFormatter, DataSender, JsonFormatter};
pub use utils::error::{GnssError, NmeaError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
