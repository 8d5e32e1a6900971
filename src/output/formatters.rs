use chrono::Utc;

use crate::config::OutputFormat;
use crate::devices::CombinedFix;

pub trait DataFormatter: Send + Sync {
    fn format_fix(&self, fix: &CombinedFix) -> String;
    fn format_no_fix(&self, timeout_seconds: u64) -> String;
    fn format_header(&self) -> String;
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn DataFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub struct ConsoleFormatter;

impl DataFormatter for ConsoleFormatter {
    fn format_fix(&self, fix: &CombinedFix) -> String {
        fix.to_string()
    }

    fn format_no_fix(&self, timeout_seconds: u64) -> String {
        format!("No full RMC and GGA strings received within {}s", timeout_seconds)
    }

    fn format_header(&self) -> String {
        format!("🛰️ GNSS fixes - {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

pub struct JsonFormatter;

impl DataFormatter for JsonFormatter {
    fn format_fix(&self, fix: &CombinedFix) -> String {
        let json_data = serde_json::json!({
            "utc": fix.utc.to_rfc3339(),
            "timestamp": fix.unix_timestamp(),
            "lat": fix.latitude,
            "lon": fix.longitude,
            "qual": fix.quality,
            "height": fix.height,
            "mag_var": fix.magnetic_variation,
        });

        serde_json::to_string(&json_data).unwrap_or_default()
    }

    fn format_no_fix(&self, timeout_seconds: u64) -> String {
        let json_data = serde_json::json!({
            "fix": null,
            "timeout_seconds": timeout_seconds,
            "checked_at": Utc::now().to_rfc3339(),
        });

        serde_json::to_string(&json_data).unwrap_or_default()
    }

    fn format_header(&self) -> String {
        String::new() // JSON doesn't need headers
    }
}

pub struct CsvFormatter;

impl DataFormatter for CsvFormatter {
    fn format_fix(&self, fix: &CombinedFix) -> String {
        format!(
            "{},{:.7},{:.7},{},{:.2},{}",
            fix.utc.to_rfc3339(),
            fix.latitude,
            fix.longitude,
            fix.quality,
            fix.height,
            fix.magnetic_variation.map(|v| format!("{:.1}", v)).unwrap_or_default()
        )
    }

    fn format_no_fix(&self, _timeout_seconds: u64) -> String {
        format!("{},,,0,,", Utc::now().to_rfc3339())
    }

    fn format_header(&self) -> String {
        "Utc,Latitude,Longitude,Quality,Height,MagneticVariation\n".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fix(magnetic_variation: Option<f64>) -> CombinedFix {
        CombinedFix {
            utc: Utc.with_ymd_and_hms(2008, 6, 20, 13, 39, 33).unwrap(),
            latitude: 51.2360245,
            longitude: 2.928439,
            quality: 1,
            height: 11.91,
            magnetic_variation,
        }
    }

    #[test]
    fn test_json_formatter() {
        let text = JsonFormatter.format_fix(&fix(None));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["qual"], 1);
        assert_eq!(value["timestamp"], 1213969173);
        assert!(value["mag_var"].is_null());
        assert_eq!(value["utc"], "2008-06-20T13:39:33+00:00");
    }

    #[test]
    fn test_csv_formatter() {
        assert_eq!(
            CsvFormatter.format_fix(&fix(Some(-1.5))),
            "2008-06-20T13:39:33+00:00,51.2360245,2.9284390,1,11.91,-1.5"
        );
        assert!(CsvFormatter.format_fix(&fix(None)).ends_with(",11.91,"));
        assert_eq!(CsvFormatter.format_header().trim_end().split(',').count(), 6);
    }

    #[test]
    fn test_console_no_fix() {
        assert!(formatter_for(OutputFormat::Console)
            .format_no_fix(45)
            .contains("No full RMC and GGA strings received"));
    }
}
