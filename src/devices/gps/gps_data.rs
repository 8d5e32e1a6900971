use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::nmea::fields::merge_utc;
use crate::nmea::{GgaFix, RmcFix};
use crate::utils::error::NmeaError;

/// A paired GGA + RMC fix. The only record handed out to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedFix {
    pub utc: DateTime<Utc>,
    /// Decimal degrees, positive is north
    pub latitude: f64,
    /// Decimal degrees, positive is east
    pub longitude: f64,
    /// GGA quality indicator, 1..=5
    pub quality: u8,
    /// Meters above MSL
    pub height: f64,
    /// Degrees, positive is east. `None` when the receiver reports none.
    pub magnetic_variation: Option<f64>,
}

impl CombinedFix {
    pub fn combine(gga: &GgaFix, rmc: &RmcFix) -> Result<Self, NmeaError> {
        Ok(Self {
            utc: merge_utc(&gga.time, &rmc.date)?,
            latitude: gga.latitude,
            longitude: gga.longitude,
            quality: gga.quality.as_u8(),
            height: gga.height,
            magnetic_variation: rmc.magnetic_variation,
        })
    }

    pub fn unix_timestamp(&self) -> i64 {
        self.utc.timestamp()
    }
}

impl fmt::Display for CombinedFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GNSS Fix:")?;
        writeln!(f, "  Date/Time: {}", self.utc.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "  Latitude: {:.7}°", self.latitude)?;
        writeln!(f, "  Longitude: {:.7}°", self.longitude)?;
        writeln!(f, "  Height: {:.2}m", self.height)?;
        writeln!(f, "  Quality: {}", self.quality)?;
        match self.magnetic_variation {
            Some(var) => writeln!(f, "  Magnetic Variation: {:.1}°", var)?,
            None => writeln!(f, "  Magnetic Variation: not reported")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea::GpsQuality;

    fn gga() -> GgaFix {
        GgaFix {
            time: "133933".to_string(),
            latitude: 51.2360245,
            longitude: 2.928439,
            quality: GpsQuality::DifferentialFix,
            height: 11.91,
        }
    }

    #[test]
    fn test_combine() {
        let rmc = RmcFix { date: "200608".to_string(), magnetic_variation: None };
        let fix = CombinedFix::combine(&gga(), &rmc).unwrap();

        assert_eq!(fix.utc.format("%Y-%m-%d %H:%M:%S").to_string(), "2008-06-20 13:39:33");
        assert_eq!(fix.quality, 2);
        assert_eq!(fix.magnetic_variation, None);
        assert_eq!(fix.unix_timestamp(), 1213969173);
    }

    #[test]
    fn test_combine_with_bad_date_fails() {
        let rmc = RmcFix { date: "2006".to_string(), magnetic_variation: None };
        assert!(CombinedFix::combine(&gga(), &rmc).is_err());
    }

    #[test]
    fn test_display() {
        let rmc = RmcFix { date: "200608".to_string(), magnetic_variation: Some(-1.5) };
        let text = CombinedFix::combine(&gga(), &rmc).unwrap().to_string();
        assert!(text.contains("2008-06-20 13:39:33 UTC"));
        assert!(text.contains("Latitude: 51.2360245°"));
        assert!(text.contains("Magnetic Variation: -1.5°"));
    }
}
