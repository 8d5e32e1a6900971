use log::{debug, info, warn};
use std::time::Duration;

use super::fix_combiner::{FixCombiner, PairingState};
use super::gps_data::CombinedFix;
use super::transport::Transport;
use crate::nmea::{StreamReassembler, DEFAULT_MAX_SENTENCE_LENGTH};
use crate::utils::error::GnssError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Byte-level pipeline: reassembler feeding the pairing combiner.
/// One instance per acquisition attempt.
#[derive(Debug)]
pub struct NmeaFixParser {
    reassembler: StreamReassembler,
    combiner: FixCombiner,
}

impl Default for NmeaFixParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SENTENCE_LENGTH)
    }
}

impl NmeaFixParser {
    pub fn new(max_sentence_length: usize) -> Self {
        Self {
            reassembler: StreamReassembler::new(max_sentence_length),
            combiner: FixCombiner::new(),
        }
    }

    pub fn push(&mut self, byte: u8) -> Option<CombinedFix> {
        let sentence = self.reassembler.push(byte)?;
        self.combiner.process(&sentence)
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<CombinedFix> {
        bytes.iter().filter_map(|&byte| self.push(byte)).collect()
    }

    pub fn state(&self) -> PairingState {
        self.combiner.state()
    }
}

/// Polls made by one attempt: whole intervals in `timeout`, at least one.
pub fn poll_ticks(timeout: Duration, poll_interval: Duration) -> u64 {
    let poll_ms = poll_interval.as_millis().max(1);
    ((timeout.as_millis() / poll_ms) as u64).max(1)
}

/// Polls a transport on a fixed tick until a GGA/RMC pair is complete.
pub struct GnssReader<T: Transport> {
    transport: T,
    poll_interval: Duration,
    max_sentence_length: usize,
}

impl<T: Transport> GnssReader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_sentence_length: DEFAULT_MAX_SENTENCE_LENGTH,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_sentence_length(mut self, max_sentence_length: usize) -> Self {
        self.max_sentence_length = max_sentence_length;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Number of poll ticks that fit in `timeout`, at least one.
    pub fn ticks_for(&self, timeout: Duration) -> u64 {
        poll_ticks(timeout, self.poll_interval)
    }

    /// One acquisition attempt.
    ///
    /// `Ok(None)` means no pair was completed within `timeout`; only
    /// transport failures are returned as errors.
    pub async fn get_fix(&mut self, timeout: Duration) -> Result<Option<CombinedFix>, GnssError> {
        let ticks = self.ticks_for(timeout);
        let mut parser = NmeaFixParser::new(self.max_sentence_length);
        let mut interval = tokio::time::interval(self.poll_interval);

        debug!("Waiting up to {} ticks of {:?} for GGA and RMC", ticks, self.poll_interval);

        for _ in 0..ticks {
            interval.tick().await;

            let available = self.transport.bytes_available()?;
            for _ in 0..available {
                let byte = self.transport.read_one()?;
                if let Some(fix) = parser.push(byte) {
                    info!("✅ Fix acquired: {}", fix.utc.format("%Y-%m-%d %H:%M:%S UTC"));
                    return Ok(Some(fix));
                }
            }
        }

        warn!("⏱️ No valid GGA and RMC pair within {:?} (state: {:?})", timeout, parser.state());
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::gps::transport::mock::MockTransport;

    const STREAM: &str = "garbage\r\n$GPGGA,133933.000,5114.16147,N,00255.70634,E,1,09,1.0,011.91,M,47.1,M,,*66\r\n$GPRMC,204804.000,V,4520.254,N,07554.206,W,0.0,0.0,200608,0.0,W*7E\r\ngarbage";
    const GGA_NO_FIX: &str = "$GPGGA,133933.000,5114.16147,N,00255.70634,E,0,09,1.0,011.91,M,47.1,M,,*67\r\n";
    const RMC: &str = "$GPRMC,204804.000,V,4520.254,N,07554.206,W,0.0,0.0,200608,0.0,W*7E\r\n";

    #[test]
    fn test_parser_yields_one_fix_from_stream() {
        let mut parser = NmeaFixParser::default();
        let fixes: Vec<CombinedFix> = STREAM.bytes().filter_map(|b| parser.push(b)).collect();

        assert_eq!(fixes.len(), 1);
        let fix = &fixes[0];
        assert_eq!(fix.utc.format("%Y-%m-%d %H:%M:%S").to_string(), "2008-06-20 13:39:33");
        assert_eq!(fix.quality, 1);
        assert!((fix.latitude - 51.2360245).abs() < 1e-7);
        assert!((fix.longitude - 2.9284390).abs() < 1e-7);
        assert!((fix.height - 11.91).abs() < 1e-9);
        assert_eq!(fix.magnetic_variation, Some(0.0));
        assert_eq!(parser.state(), PairingState::Empty);
    }

    #[test]
    fn test_parser_second_pair_gives_second_fix() {
        let mut parser = NmeaFixParser::default();
        let mut stream = STREAM.as_bytes().to_vec();
        stream.extend_from_slice(STREAM.as_bytes());
        assert_eq!(parser.feed(&stream).len(), 2);
    }

    #[test]
    fn test_ticks_for() {
        let reader = GnssReader::new(MockTransport::default());
        assert_eq!(reader.ticks_for(Duration::from_secs(45)), 180);
        assert_eq!(reader.ticks_for(Duration::from_millis(10)), 1);
        assert_eq!(reader.ticks_for(Duration::ZERO), 1);

        let config = crate::config::Config::default();
        let reader = GnssReader::new(MockTransport::default()).with_poll_interval(config.poll_interval());
        assert_eq!(reader.ticks_for(config.nmea_timeout()), config.timeout_ticks());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_fix_across_ticks() {
        let bytes = STREAM.as_bytes();
        let transport = MockTransport::new(bytes.chunks(24));
        let mut reader = GnssReader::new(transport);

        let fix = reader.get_fix(Duration::from_secs(45)).await.unwrap().expect("fix");
        assert_eq!(fix.quality, 1);
        assert_eq!(fix.utc.format("%H:%M:%S").to_string(), "13:39:33");
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_fix_times_out_without_valid_gga() {
        let transport = MockTransport::new([GGA_NO_FIX, RMC, GGA_NO_FIX, RMC]);
        let mut reader = GnssReader::new(transport).with_poll_interval(Duration::from_millis(500));

        let result = reader.get_fix(Duration::from_secs(5)).await.unwrap();
        assert!(result.is_none());
        assert_eq!(reader.transport().polls, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_surfaced() {
        let mut transport = MockTransport::new(["$GPGGA,13"]);
        transport.fail_after_chunks = Some(1);
        let mut reader = GnssReader::new(transport);

        let result = reader.get_fix(Duration::from_secs(5)).await;
        assert!(matches!(result, Err(GnssError::CommunicationError(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_starts_fresh() {
        // The GGA of the first attempt must not pair with the RMC of the second
        let gga = "$GPGGA,133933.000,5114.16147,N,00255.70634,E,1,09,1.0,011.91,M,47.1,M,,*66\r\n";
        let transport = MockTransport::new([gga, "", "", "", RMC]);
        let mut reader = GnssReader::new(transport);

        assert!(reader.get_fix(Duration::from_secs(1)).await.unwrap().is_none());
        assert_eq!(reader.transport().polls, 4);
        assert!(reader.get_fix(Duration::from_secs(1)).await.unwrap().is_none());
    }
}
