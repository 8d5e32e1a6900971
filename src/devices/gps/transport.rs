use log::{error, info};
use serialport::{ClearBuffer, SerialPort};
use std::io::Read;
use std::time::Duration;

use crate::utils::error::GnssError;

/// Byte source polled by the acquisition loop.
pub trait Transport {
    fn bytes_available(&mut self) -> Result<usize, GnssError>;
    fn read_one(&mut self) -> Result<u8, GnssError>;
}

/// 8N1 serial link without flow control.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    port_name: String,
}

impl SerialTransport {
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, GnssError> {
        info!("🧭 Opening GNSS port {} at {} baud", port_name, baud_rate);

        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(500))
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| {
                error!("❌ Error while setting up GNSS port {} (permissions?): {}", port_name, e);
                GnssError::ConnectionError(format!("Failed to open GNSS port {}: {}", port_name, e))
            })?;

        let mut transport = Self {
            port,
            port_name: port_name.to_string(),
        };
        transport.flush_input()?;
        Ok(transport)
    }

    /// Drop whatever the receiver sent before we started listening.
    pub fn flush_input(&mut self) -> Result<(), GnssError> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(|e| GnssError::CommunicationError(format!("Failed to flush {}: {}", self.port_name, e)))
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn close(self) {
        info!("🔌 Closing GNSS port {}", self.port_name);
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> Result<usize, GnssError> {
        let count = self
            .port
            .bytes_to_read()
            .map_err(|e| GnssError::CommunicationError(format!("Failed to query {}: {}", self.port_name, e)))?;
        Ok(count as usize)
    }

    fn read_one(&mut self) -> Result<u8, GnssError> {
        let mut byte = [0u8; 1];
        self.port
            .read_exact(&mut byte)
            .map_err(|e| GnssError::CommunicationError(format!("Read from {} failed: {}", self.port_name, e)))?;
        Ok(byte[0])
    }
}

#[derive(Debug, Clone)]
pub struct PortInfo {
    pub name: String,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
}

pub fn list_ports() -> Result<Vec<PortInfo>, GnssError> {
    let ports = serialport::available_ports()?;

    Ok(ports
        .into_iter()
        .map(|port| match port.port_type {
            serialport::SerialPortType::UsbPort(usb_info) => PortInfo {
                name: port.port_name,
                manufacturer: usb_info.manufacturer,
                serial_number: usb_info.serial_number,
            },
            _ => PortInfo {
                name: port.port_name,
                manufacturer: None,
                serial_number: None,
            },
        })
        .collect())
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;

    /// Transport fed from memory; each `bytes_available` call releases the
    /// next scripted chunk, like a UART filling up between poll ticks.
    #[derive(Default)]
    pub struct MockTransport {
        chunks: VecDeque<Vec<u8>>,
        pending: VecDeque<u8>,
        pub fail_after_chunks: Option<usize>,
        pub polls: usize,
    }

    impl MockTransport {
        pub fn new<I, C>(chunks: I) -> Self
        where
            I: IntoIterator<Item = C>,
            C: AsRef<[u8]>,
        {
            Self {
                chunks: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
                ..Default::default()
            }
        }
    }

    impl Transport for MockTransport {
        fn bytes_available(&mut self) -> Result<usize, GnssError> {
            if self.pending.is_empty() {
                if Some(self.polls) == self.fail_after_chunks {
                    return Err(GnssError::CommunicationError("device unplugged".to_string()));
                }
                if let Some(chunk) = self.chunks.pop_front() {
                    self.pending.extend(chunk);
                }
                self.polls += 1;
            }
            Ok(self.pending.len())
        }

        fn read_one(&mut self) -> Result<u8, GnssError> {
            self.pending
                .pop_front()
                .ok_or_else(|| GnssError::CommunicationError("read with no data".to_string()))
        }
    }
}
