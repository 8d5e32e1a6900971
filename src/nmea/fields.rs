//! Pure decoders for the individual GGA/RMC fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::NmeaError;

/// GGA field 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpsQuality {
    /// 0, or anything that is not a number in 0..=5
    Invalid,
    GpsFix,
    DifferentialFix,
    PpsFix,
    RtkFixed,
    RtkFloat,
}

impl GpsQuality {
    pub fn from_field(field: &str) -> Self {
        match field.trim().parse::<u8>() {
            Ok(1) => GpsQuality::GpsFix,
            Ok(2) => GpsQuality::DifferentialFix,
            Ok(3) => GpsQuality::PpsFix,
            Ok(4) => GpsQuality::RtkFixed,
            Ok(5) => GpsQuality::RtkFloat,
            _ => GpsQuality::Invalid,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            GpsQuality::Invalid => 0,
            GpsQuality::GpsFix => 1,
            GpsQuality::DifferentialFix => 2,
            GpsQuality::PpsFix => 3,
            GpsQuality::RtkFixed => 4,
            GpsQuality::RtkFloat => 5,
        }
    }

    pub fn is_valid(self) -> bool {
        self != GpsQuality::Invalid
    }
}

impl fmt::Display for GpsQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GpsQuality::Invalid => "Fix not valid",
            GpsQuality::GpsFix => "GPS fix",
            GpsQuality::DifferentialFix => "Differential GPS fix",
            GpsQuality::PpsFix => "PPS fix",
            GpsQuality::RtkFixed => "RTK fixed",
            GpsQuality::RtkFloat => "RTK float",
        };
        write!(f, "{} ({})", name, self.as_u8())
    }
}

pub(crate) fn parse_number(fields: &[&str], index: usize) -> Result<f64, NmeaError> {
    let value = fields.get(index).ok_or(NmeaError::MissingField(index))?;
    value.trim().parse::<f64>().map_err(|_| NmeaError::InvalidNumber {
        field: index,
        value: value.to_string(),
    })
}

/// Convert `DDMM.mmmm` / `DDDMM.mmmm` plus hemisphere to signed decimal degrees.
pub fn to_decimal_degrees(degrees_minutes: &str, hemisphere: &str) -> Result<f64, NmeaError> {
    let value: f64 = degrees_minutes
        .trim()
        .parse()
        .map_err(|_| NmeaError::InvalidNumber {
            field: 0,
            value: degrees_minutes.to_string(),
        })?;

    let degrees = (value / 100.0).trunc();
    let minutes = value % 100.0;
    let decimal_degrees = degrees + minutes / 60.0;

    match hemisphere.trim() {
        "N" | "E" => Ok(decimal_degrees),
        "S" | "W" => Ok(-decimal_degrees),
        other => Err(NmeaError::InvalidHemisphere(other.to_string())),
    }
}

/// Drop the `.sss` suffix of a GGA time field and check it is a valid `HHMMSS`.
pub fn parse_utc_time(field: &str) -> Result<String, NmeaError> {
    let hhmmss = field.split_once('.').map_or(field, |(whole, _)| whole);

    if hhmmss.len() != 6 || !hhmmss.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NmeaError::InvalidTime(field.to_string()));
    }
    NaiveTime::parse_from_str(hhmmss, "%H%M%S")
        .map_err(|_| NmeaError::InvalidTime(field.to_string()))?;

    Ok(hhmmss.to_string())
}

/// Check an RMC `DDMMYY` date field.
pub fn parse_utc_date(field: &str) -> Result<String, NmeaError> {
    if field.len() != 6 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NmeaError::InvalidDate(field.to_string()));
    }
    NaiveDate::parse_from_str(field, "%d%m%y")
        .map_err(|_| NmeaError::InvalidDate(field.to_string()))?;

    Ok(field.to_string())
}

/// Concatenate GGA `HHMMSS[.sss]` and RMC `DDMMYY` into one UTC timestamp.
pub fn merge_utc(time: &str, date: &str) -> Result<DateTime<Utc>, NmeaError> {
    let hhmmss = parse_utc_time(time)?;
    let ddmmyy = parse_utc_date(date)?;

    NaiveDateTime::parse_from_str(&format!("{}{}", hhmmss, ddmmyy), "%H%M%S%d%m%y")
        .map(|naive| naive.and_utc())
        .map_err(|_| NmeaError::InvalidDate(format!("{} {}", time, date)))
}

/// RMC fields 10/11. East is positive, west negative; either field empty
/// means the receiver did not report a variation.
pub fn magnetic_variation(magnitude: Option<&str>, hemisphere: Option<&str>) -> Result<Option<f64>, NmeaError> {
    let (magnitude, hemisphere) = match (magnitude.map(str::trim), hemisphere.map(str::trim)) {
        (Some(m), Some(h)) if !m.is_empty() && !h.is_empty() => (m, h),
        _ => return Ok(None),
    };

    let value: f64 = magnitude.parse().map_err(|_| NmeaError::InvalidNumber {
        field: 10,
        value: magnitude.to_string(),
    })?;

    match hemisphere {
        "E" => Ok(Some(value)),
        "W" => Ok(Some(-value)),
        other => Err(NmeaError::InvalidHemisphere(other.to_string())),
    }
}
