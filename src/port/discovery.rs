//! Serial port enumeration.

use super::error::PortError;
use serde::Serialize;
use serialport::SerialPortType;

/// A serial port visible on this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vid_pid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

impl From<serialport::SerialPortInfo> for PortInfo {
    fn from(info: serialport::SerialPortInfo) -> Self {
        match info.port_type {
            SerialPortType::UsbPort(usb) => Self {
                name: info.port_name,
                kind: "usb",
                vid_pid: Some(format!("{:04x}:{:04x}", usb.vid, usb.pid)),
                manufacturer: usb.manufacturer,
                product: usb.product,
            },
            other => Self {
                name: info.port_name,
                kind: match other {
                    SerialPortType::BluetoothPort => "bluetooth",
                    SerialPortType::PciPort => "pci",
                    _ => "unknown",
                },
                vid_pid: None,
                manufacturer: None,
                product: None,
            },
        }
    }
}

/// List the serial ports present on this host.
pub fn list_ports() -> Result<Vec<PortInfo>, PortError> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(PortInfo::from).collect())
}
