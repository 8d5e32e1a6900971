use thiserror::Error;

/// Caller-visible failures. Malformed NMEA content never ends up here,
/// see [`NmeaError`] for that.
#[derive(Error, Debug)]
pub enum GnssError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Communication error: {0}")]
    CommunicationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Power control error: {0}")]
    PowerControlError(String),
}

/// Reasons a candidate sentence is dropped. Recoverable by definition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NmeaError {
    #[error("sentence does not start with '$'")]
    MissingStartMarker,

    #[error("sentence has no *CRC suffix")]
    MissingChecksum,

    #[error("checksum mismatch: received {received}, computed {computed:02x}")]
    ChecksumMismatch { received: String, computed: u8 },

    #[error("unsupported sentence type: {0}")]
    UnsupportedSentence(String),

    #[error("missing field {0}")]
    MissingField(usize),

    #[error("invalid number in field {field}: '{value}'")]
    InvalidNumber { field: usize, value: String },

    #[error("invalid hemisphere '{0}'")]
    InvalidHemisphere(String),

    #[error("invalid UTC time '{0}'")]
    InvalidTime(String),

    #[error("invalid UTC date '{0}'")]
    InvalidDate(String),

    #[error("GGA quality indicator reports no fix")]
    NoFix,
}

impl From<std::io::Error> for GnssError {
    fn from(err: std::io::Error) -> Self {
        GnssError::CommunicationError(format!("IO error: {}", err))
    }
}

impl From<serialport::Error> for GnssError {
    fn from(err: serialport::Error) -> Self {
        GnssError::ConnectionError(format!("Serial port error: {}", err))
    }
}

impl From<serde_json::Error> for GnssError {
    fn from(err: serde_json::Error) -> Self {
        GnssError::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for GnssError {
    fn from(err: toml::de::Error) -> Self {
        GnssError::ConfigError(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for GnssError {
    fn from(err: toml::ser::Error) -> Self {
        GnssError::SerializationError(format!("TOML error: {}", err))
    }
}
