use crate::utils::error::NmeaError;

/// XOR of every byte between the leading `$` and the `*`.
pub fn nmea_checksum(payload: &str) -> u8 {
    payload.bytes().fold(0u8, |crc, byte| crc ^ byte)
}

/// Split a sentence (terminator already removed) into the payload between
/// `$` and `*` and the two received checksum characters.
pub fn split_checksum(sentence: &str) -> Result<(&str, &str), NmeaError> {
    let body = sentence
        .strip_prefix('$')
        .ok_or(NmeaError::MissingStartMarker)?;
    let (payload, received) = body.rsplit_once('*').ok_or(NmeaError::MissingChecksum)?;

    if received.len() != 2 || !received.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(NmeaError::MissingChecksum);
    }

    Ok((payload, received))
}

/// Verify the `*CRC` suffix of a sentence, case-insensitively.
pub fn verify_checksum(sentence: &str) -> Result<(), NmeaError> {
    let (payload, received) = split_checksum(sentence)?;
    let computed = nmea_checksum(payload);

    match u8::from_str_radix(received, 16) {
        Ok(value) if value == computed => Ok(()),
        _ => Err(NmeaError::ChecksumMismatch {
            received: received.to_string(),
            computed,
        }),
    }
}

pub fn validate(sentence: &str) -> bool {
    verify_checksum(sentence).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA: &str = "$GPGGA,133933.000,5114.16147,N,00255.70634,E,1,09,1.0,011.91,M,47.1,M,,*66";
    const RMC: &str = "$GPRMC,204804.000,V,4520.254,N,07554.206,W,0.0,0.0,200608,0.0,W*7E";

    #[test]
    fn test_nmea_checksum() {
        assert_eq!(nmea_checksum("GPGGA,133933.000,5114.16147,N,00255.70634,E,1,09,1.0,011.91,M,47.1,M,,"), 0x66);
        assert_eq!(nmea_checksum(""), 0);
    }

    #[test]
    fn test_validate_known_sentences() {
        assert!(validate(GGA));
        assert!(validate(RMC));
    }

    #[test]
    fn test_validate_is_case_insensitive() {
        assert!(validate(&RMC.replace("*7E", "*7e")));
    }

    #[test]
    fn test_missing_checksum_is_invalid() {
        let stripped = &GGA[..GGA.len() - 3];
        assert_eq!(verify_checksum(stripped), Err(NmeaError::MissingChecksum));
        assert!(!validate("$GPGGA,1,2*6"));
        assert!(!validate("$GPGGA,1,2*zz"));
        assert_eq!(verify_checksum("GPGGA*66"), Err(NmeaError::MissingStartMarker));
    }

    #[test]
    fn test_small_checksum_is_zero_padded() {
        // "A" ^ "A" ^ "B" == 0x42, "AA" == 0x00
        assert!(validate("$AA*00"));
        assert!(validate("$AAB*42"));
        assert!(!validate("$AA*0"));
    }

    #[test]
    fn test_wrong_checksum_is_rejected() {
        let tampered = GGA.replace("*66", "*67");
        match verify_checksum(&tampered) {
            Err(NmeaError::ChecksumMismatch { computed, .. }) => assert_eq!(computed, 0x66),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_every_single_bit_flip_is_detected() {
        for sentence in [GGA, RMC] {
            let star = sentence.rfind('*').unwrap();
            for pos in 1..star {
                for bit in 0..7 {
                    let mut bytes = sentence.as_bytes().to_vec();
                    bytes[pos] ^= 1 << bit;
                    let mutated = String::from_utf8(bytes).unwrap();
                    assert!(!validate(&mutated), "flip of bit {} at {} went unnoticed", bit, pos);
                }
            }
        }
    }

    #[test]
    fn test_two_compensating_flips_can_pass() {
        // Same bit flipped in two characters cancels out in the XOR.
        let mutated = GGA.replacen("133933", "123923", 1);
        assert!(validate(&mutated));
    }
}
