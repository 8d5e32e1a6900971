pub mod gps;

pub use gps::{CombinedFix, GnssReader, NmeaFixParser, PowerControl, SerialTransport, Transport};
