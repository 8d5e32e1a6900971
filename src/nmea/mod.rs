pub mod checksum;
pub mod fields;
pub mod reassembler;
pub mod sentence;

pub use checksum::{nmea_checksum, split_checksum, validate, verify_checksum};
pub use fields::{merge_utc, to_decimal_degrees, GpsQuality};
pub use reassembler::{Sentence, StreamReassembler, DEFAULT_MAX_SENTENCE_LENGTH};
pub use sentence::{classify, GgaFix, RmcFix, SentenceKind};
