//! Vendor/product identifier handling.

use crate::Error;
use std::fmt;

/// The vendor/product pair a device reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsbIds {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl UsbIds {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for UsbIds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Formats an identifier as `0x` followed by four uppercase hex digits.
pub fn format_hex_id(id: u16) -> String {
    format!("0x{id:04X}")
}

/// Extracts the ids from a Windows hardware id such as
/// `USB\VID_18D1&PID_4EE7&REV_0440`.
pub fn parse_hardware_id(hardware_id: &str) -> Option<UsbIds> {
    let vendor_id = hex_after_marker(hardware_id, "VID_")?;
    let product_id = hex_after_marker(hardware_id, "PID_")?;
    Some(UsbIds::new(vendor_id, product_id))
}

fn hex_after_marker(haystack: &str, marker: &str) -> Option<u16> {
    let bytes = haystack.as_bytes();
    let start = bytes
        .windows(marker.len())
        .position(|window| window.eq_ignore_ascii_case(marker.as_bytes()))?
        + marker.len();
    let digits: &str = {
        let rest = &haystack[start..];
        let len = rest
            .bytes()
            .take(4)
            .take_while(u8::is_ascii_hexdigit)
            .count();
        &rest[..len]
    };
    if digits.is_empty() {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

/// The last `\`-separated component of a device instance id, e.g. the
/// serial in `USB\VID_05AC&PID_12A8\00008110000A1B2C3D`.
pub fn serial_from_instance_id(instance_id: &str) -> Option<String> {
    let (_, tail) = instance_id.rsplit_once('\\')?;
    let tail = tail.trim_end_matches('\0');
    if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    }
}

pub fn parse_hex_u8(value: &str) -> Result<u8, Error> {
    parse_hex(value, u8::from_str_radix)
}

pub fn parse_hex_u16(value: &str) -> Result<u16, Error> {
    parse_hex(value, u16::from_str_radix)
}

fn parse_hex<T>(
    value: &str,
    parser: fn(&str, u32) -> Result<T, std::num::ParseIntError>,
) -> Result<T, Error> {
    let trimmed = value.trim();
    let without_prefix = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    parser(without_prefix, 16).map_err(|_| Error::Unknown)
}
