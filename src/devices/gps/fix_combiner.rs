use log::{debug, info};

use super::gps_data::CombinedFix;
use crate::nmea::{classify, GgaFix, RmcFix, Sentence, SentenceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    Empty,
    HaveGga,
    HaveRmc,
}

/// Pairs the latest valid GGA with the latest valid RMC.
///
/// Malformed, checksum-failing or no-fix sentences are dropped without
/// touching the held fixes. RMC sentences are ignored until a GGA with a
/// usable quality has been seen in this acquisition attempt, so a GGA always
/// opens the pairing. Once both sides are held they are combined, handed
/// out and the held fixes are cleared.
#[derive(Debug, Default)]
pub struct FixCombiner {
    gga: Option<GgaFix>,
    rmc: Option<RmcFix>,
    gga_seen: bool,
}

impl FixCombiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PairingState {
        match (&self.gga, &self.rmc) {
            (Some(_), None) => PairingState::HaveGga,
            (None, Some(_)) => PairingState::HaveRmc,
            // Both held never survives a call to process()
            _ => PairingState::Empty,
        }
    }

    /// Forget held fixes and the GGA-seen flag; starts a new attempt.
    pub fn reset(&mut self) {
        self.gga = None;
        self.rmc = None;
        self.gga_seen = false;
    }

    pub fn process(&mut self, sentence: &Sentence) -> Option<CombinedFix> {
        let text = sentence.as_str();

        match classify(text) {
            SentenceKind::Gga => match GgaFix::parse(text) {
                Ok(gga) => {
                    debug!("Valid GGA: {}", text);
                    let previous = self.gga.replace(gga);
                    self.gga_seen = true;
                    let fix = self.try_pair();
                    if fix.is_none() && self.rmc.is_some() {
                        // Pairing failed, the new GGA is the offender
                        self.gga = previous;
                    }
                    fix
                }
                Err(e) => {
                    debug!("Dropping GGA ({}): {}", e, text);
                    None
                }
            },
            SentenceKind::Rmc if !self.gga_seen => {
                debug!("Ignoring RMC before any valid GGA: {}", text);
                None
            }
            SentenceKind::Rmc => match RmcFix::parse(text) {
                Ok(rmc) => {
                    debug!("Valid RMC: {}", text);
                    let previous = self.rmc.replace(rmc);
                    let fix = self.try_pair();
                    if fix.is_none() && self.gga.is_some() {
                        self.rmc = previous;
                    }
                    fix
                }
                Err(e) => {
                    debug!("Dropping RMC ({}): {}", e, text);
                    None
                }
            },
            SentenceKind::Unsupported => None,
        }
    }

    /// Combine when both sides are held. On success both are consumed.
    fn try_pair(&mut self) -> Option<CombinedFix> {
        let (gga, rmc) = match (&self.gga, &self.rmc) {
            (Some(gga), Some(rmc)) => (gga, rmc),
            _ => return None,
        };

        match CombinedFix::combine(gga, rmc) {
            Ok(fix) => {
                info!("📍 Fix paired: {} lat={:.6} lon={:.6}", fix.utc, fix.latitude, fix.longitude);
                self.gga = None;
                self.rmc = None;
                Some(fix)
            }
            Err(e) => {
                debug!("Could not combine GGA and RMC: {}", e);
                None
            }
        }
    }
}
