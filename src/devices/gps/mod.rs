pub mod fix_combiner;
pub mod gps_data;
pub mod gps_reader;
pub mod power;
pub mod transport;

pub use fix_combiner::{FixCombiner, PairingState};
pub use gps_data::CombinedFix;
pub use gps_reader::{poll_ticks, GnssReader, NmeaFixParser, DEFAULT_POLL_INTERVAL};
pub use power::{NoPowerControl, PowerControl, SysfsGpio};
pub use transport::{list_ports, PortInfo, SerialTransport, Transport};
