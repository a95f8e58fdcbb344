//! C-compatible export of the scan for hosts that link the static library.
//!
//! The layout matches the `CDeviceInfo` struct the host side declares:
//! fixed-size, NUL-terminated text fields and a numeric family tag.

use crate::record::DeviceRecord;
use crate::util::{UNKNOWN, truncate_to_boundary};
use std::ffi::{c_char, c_int};

pub const TEXT_FIELD_LEN: usize = 256;
pub const ID_FIELD_LEN: usize = 8;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawDeviceRecord {
    pub family: i32,
    pub name: [c_char; TEXT_FIELD_LEN],
    pub serial: [c_char; TEXT_FIELD_LEN],
    pub brand: [c_char; TEXT_FIELD_LEN],
    pub vendor_id: [c_char; ID_FIELD_LEN],
    pub product_id: [c_char; ID_FIELD_LEN],
    pub usb_debugging: bool,
    pub trusted: bool,
}

impl Default for RawDeviceRecord {
    fn default() -> Self {
        Self {
            family: 0,
            name: [0; TEXT_FIELD_LEN],
            serial: [0; TEXT_FIELD_LEN],
            brand: [0; TEXT_FIELD_LEN],
            vendor_id: [0; ID_FIELD_LEN],
            product_id: [0; ID_FIELD_LEN],
            usb_debugging: false,
            trusted: false,
        }
    }
}

impl From<&DeviceRecord> for RawDeviceRecord {
    fn from(record: &DeviceRecord) -> Self {
        let mut raw = RawDeviceRecord {
            family: record.family.tag(),
            usb_debugging: record.debug_bridge_exposed,
            trusted: record.trusted,
            ..Default::default()
        };
        write_text(&mut raw.name, record.name.as_deref());
        write_text(&mut raw.serial, record.serial.as_deref());
        write_text(&mut raw.brand, record.brand.as_deref());
        write_text(&mut raw.vendor_id, Some(record.vendor_id_hex().as_str()));
        write_text(&mut raw.product_id, Some(record.product_id_hex().as_str()));
        raw
    }
}

/// Copies `value` (or the unknown sentinel) into `field`, always leaving a
/// terminating NUL.
fn write_text(field: &mut [c_char], value: Option<&str>) {
    let text = truncate_to_boundary(value.unwrap_or(UNKNOWN), field.len() - 1);
    field.fill(0);
    for (slot, byte) in field.iter_mut().zip(text.bytes()) {
        *slot = byte as c_char;
    }
}

/// Writes `records` into the front of `output`, returning how many fit.
pub fn fill_slots(output: &mut [RawDeviceRecord], records: &[DeviceRecord]) -> usize {
    let count = output.len().min(records.len());
    for (slot, record) in output.iter_mut().zip(records) {
        *slot = RawDeviceRecord::from(record);
    }
    count
}

/// Scans for phones and writes at most `capacity` records into `output`.
///
/// Returns the number of records written. Zero means either no phone is
/// attached or enumeration was unavailable.
///
/// # Safety
/// `output` must be null or point to at least `capacity` writable
/// `RawDeviceRecord` slots.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn scan_usb_devices(output: *mut RawDeviceRecord, capacity: c_int) -> c_int {
    let capacity = match usize::try_from(capacity) {
        Ok(capacity) if capacity > 0 && !output.is_null() => capacity,
        _ => return 0,
    };

    let records = crate::scan_usb_devices(capacity);
    // SAFETY: caller guarantees `capacity` writable slots behind `output`.
    let slots = unsafe { std::slice::from_raw_parts_mut(output, capacity) };
    let written = fill_slots(slots, &records);
    c_int::try_from(written).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DeviceFamily;
    use std::ffi::CStr;

    fn text(field: &[c_char]) -> String {
        unsafe { CStr::from_ptr(field.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    fn iphone() -> DeviceRecord {
        DeviceRecord {
            family: DeviceFamily::Ios,
            name: Some("iPhone".into()),
            serial: None,
            brand: Some("Apple".into()),
            vendor_id: 0x05AC,
            product_id: 0x12A8,
            debug_bridge_exposed: false,
            trusted: true,
        }
    }

    #[test]
    fn converts_to_fixed_layout() {
        let raw = RawDeviceRecord::from(&iphone());
        assert_eq!(raw.family, 1);
        assert_eq!(text(&raw.name), "iPhone");
        assert_eq!(text(&raw.serial), "Unknown");
        assert_eq!(text(&raw.brand), "Apple");
        assert_eq!(text(&raw.vendor_id), "0x05AC");
        assert_eq!(text(&raw.product_id), "0x12A8");
        assert!(raw.trusted);
        assert!(!raw.usb_debugging);
    }

    #[test]
    fn long_text_is_truncated_with_terminator() {
        let mut record = iphone();
        record.name = Some("x".repeat(400));
        let raw = RawDeviceRecord::from(&record);
        assert_eq!(text(&raw.name).len(), TEXT_FIELD_LEN - 1);
        assert_eq!(raw.name[TEXT_FIELD_LEN - 1], 0);
    }

    #[test]
    fn fill_never_exceeds_slots() {
        let records = vec![iphone(), iphone(), iphone()];
        let mut slots = vec![RawDeviceRecord::default(); 2];
        assert_eq!(fill_slots(&mut slots, &records), 2);

        let mut roomy = vec![RawDeviceRecord::default(); 5];
        assert_eq!(fill_slots(&mut roomy, &records), 3);
        assert_eq!(roomy[3].family, 0);
        assert_eq!(roomy[3].name[0], 0);
    }

    #[test]
    fn rejects_null_or_empty_output() {
        assert_eq!(unsafe { scan_usb_devices(std::ptr::null_mut(), 4) }, 0);
        let mut slot = RawDeviceRecord::default();
        assert_eq!(unsafe { scan_usb_devices(&mut slot, 0) }, 0);
        assert_eq!(unsafe { scan_usb_devices(&mut slot, -3) }, 0);
    }
}
