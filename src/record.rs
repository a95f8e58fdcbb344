//! The per-device result of a scan.

use crate::ids::format_hex_id;
use crate::util::or_unknown;
use serde::Serialize;
use std::fmt;

/// Mobile platform a device was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceFamily {
    Android,
    Ios,
    #[serde(rename = "harmony")]
    HarmonyOs,
}

impl DeviceFamily {
    /// Numeric tag used by the C-compatible record layout.
    pub fn tag(self) -> i32 {
        match self {
            DeviceFamily::Android => 0,
            DeviceFamily::Ios => 1,
            DeviceFamily::HarmonyOs => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceFamily::Android => "android",
            DeviceFamily::Ios => "ios",
            DeviceFamily::HarmonyOs => "harmony",
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A phone found during one scan. Records are not tracked across scans.
///
/// Only the flag matching `family` carries meaning: `debug_bridge_exposed`
/// for Android/HarmonyOS, `trusted` for iOS. Both report that the interface
/// is present, not that an adb authorization or iOS pairing has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub family: DeviceFamily,
    pub name: Option<String>,
    pub serial: Option<String>,
    pub brand: Option<String>,
    pub vendor_id: u16,
    pub product_id: u16,
    pub debug_bridge_exposed: bool,
    pub trusted: bool,
}

impl DeviceRecord {
    pub fn vendor_id_hex(&self) -> String {
        format_hex_id(self.vendor_id)
    }

    pub fn product_id_hex(&self) -> String {
        format_hex_id(self.product_id)
    }

    pub fn display_name(&self) -> &str {
        or_unknown(self.name.as_deref())
    }

    pub fn display_serial(&self) -> &str {
        or_unknown(self.serial.as_deref())
    }

    pub fn display_brand(&self) -> &str {
        or_unknown(self.brand.as_deref())
    }

    /// The serializable view handed to JSON consumers.
    pub fn report(&self) -> DeviceReport {
        let is_ios = self.family == DeviceFamily::Ios;
        DeviceReport {
            family: self.family,
            name: self.display_name().to_string(),
            serial: self.display_serial().to_string(),
            brand: self.display_brand().to_string(),
            vendor_id: self.vendor_id_hex(),
            product_id: self.product_id_hex(),
            usb_debugging: (!is_ios).then_some(self.debug_bridge_exposed),
            trusted: is_ios.then_some(self.trusted),
        }
    }
}

/// JSON shape of a [`DeviceRecord`]: sentinel strings, hex ids, and only the
/// flag relevant to the family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceReport {
    #[serde(rename = "type")]
    pub family: DeviceFamily,
    pub name: String,
    pub serial: String,
    pub brand: String,
    pub vendor_id: String,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb_debugging: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusted: Option<bool>,
}
