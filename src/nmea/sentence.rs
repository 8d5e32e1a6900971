use serde::{Deserialize, Serialize};

use super::checksum::{split_checksum, verify_checksum};
use super::fields::{
    magnetic_variation, parse_number, parse_utc_date, parse_utc_time, to_decimal_degrees,
    GpsQuality,
};
use crate::utils::error::NmeaError;

const GGA_FIELD_COUNT: usize = 10;
const RMC_FIELD_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceKind {
    Gga,
    Rmc,
    Unsupported,
}

/// Talker (2 letters) + type (3 letters) right after `$`. Only the type
/// matters, so `$GPGGA`, `$GNGGA` and `$GLGGA` are all GGA.
pub fn classify(sentence: &str) -> SentenceKind {
    let address = sentence
        .strip_prefix('$')
        .and_then(|rest| rest.split([',', '*']).next())
        .unwrap_or_default();

    if address.len() != 5 {
        return SentenceKind::Unsupported;
    }

    match address.get(2..) {
        Some("GGA") => SentenceKind::Gga,
        Some("RMC") => SentenceKind::Rmc,
        _ => SentenceKind::Unsupported,
    }
}

/// Comma separated payload of a checksum-verified sentence, address first.
fn verified_fields(sentence: &str) -> Result<Vec<&str>, NmeaError> {
    verify_checksum(sentence)?;
    let (payload, _) = split_checksum(sentence)?;
    Ok(payload.split(',').collect())
}

/// Position part of a fix, from a GGA sentence with a usable quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GgaFix {
    /// `HHMMSS`, fractional seconds already dropped
    pub time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub quality: GpsQuality,
    /// Orthometric height above MSL, meters
    pub height: f64,
}

impl GgaFix {
    /// Example: `$GPGGA,133933.000,5114.16147,N,00255.70634,E,1,09,1.0,011.91,M,47.1,M,,*66`
    ///
    /// | field | meaning |
    /// |---|---|
    /// | 1 | UTC time of fix |
    /// | 2, 3 | latitude `DDMM.mmmm`, N/S |
    /// | 4, 5 | longitude `DDDMM.mmmm`, E/W |
    /// | 6 | quality indicator, 0 = no fix |
    /// | 9 | orthometric height |
    pub fn parse(sentence: &str) -> Result<Self, NmeaError> {
        if classify(sentence) != SentenceKind::Gga {
            return Err(NmeaError::UnsupportedSentence(sentence.to_string()));
        }
        let fields = verified_fields(sentence)?;
        if fields.len() < GGA_FIELD_COUNT {
            return Err(NmeaError::MissingField(fields.len()));
        }

        let quality = GpsQuality::from_field(fields[6]);
        if !quality.is_valid() {
            return Err(NmeaError::NoFix);
        }

        Ok(Self {
            time: parse_utc_time(fields[1])?,
            latitude: to_decimal_degrees(fields[2], fields[3])?,
            longitude: to_decimal_degrees(fields[4], fields[5])?,
            quality,
            height: parse_number(&fields, 9)?,
        })
    }
}

/// Date and magnetic variation part of a fix, from an RMC sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmcFix {
    /// `DDMMYY`
    pub date: String,
    /// Degrees, east positive
    pub magnetic_variation: Option<f64>,
}

impl RmcFix {
    /// Example: `$GPRMC,204804.000,V,4520.254,N,07554.206,W,0.0,0.0,200608,0.0,W*7E`
    ///
    /// Field 9 is the date, 10/11 the magnetic variation and its hemisphere.
    /// NMEA 2.3 receivers append a mode indicator as field 12, which is ignored.
    pub fn parse(sentence: &str) -> Result<Self, NmeaError> {
        if classify(sentence) != SentenceKind::Rmc {
            return Err(NmeaError::UnsupportedSentence(sentence.to_string()));
        }
        let fields = verified_fields(sentence)?;
        if fields.len() < RMC_FIELD_COUNT {
            return Err(NmeaError::MissingField(fields.len()));
        }

        Ok(Self {
            date: parse_utc_date(fields[9])?,
            magnetic_variation: magnetic_variation(
                fields.get(10).copied(),
                fields.get(11).copied(),
            )?,
        })
    }
}
