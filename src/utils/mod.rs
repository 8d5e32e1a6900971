pub mod error;

pub use error::{GnssError, NmeaError};
