//! Finds Android, iOS and HarmonyOS phones attached over USB.
//!
//! Each scan walks the OS device registry once, classifies devices by
//! vendor/product id, and inspects their interfaces for an exposed debug
//! bridge (Android/HarmonyOS) or a trusted-host interface (iOS). Nothing is
//! opened, no handshake is attempted and nothing is cached between scans.
//!
//! ```no_run
//! for device in usbmobile::scan_usb_devices(16) {
//!     println!("{} {} {}", device.family, device.vendor_id_hex(), device.display_name());
//! }
//! ```

pub mod classify;
pub mod descriptor;
pub mod ffi;
pub mod ids;
mod platform;
pub mod record;
pub mod scan;
pub mod util;

pub use descriptor::{Capability, InterfaceClass};
pub use ids::UsbIds;
pub use platform::NativeSource;
#[cfg(target_os = "linux")]
pub use platform::linux::SysfsSource;
pub use record::{DeviceFamily, DeviceRecord, DeviceReport};
pub use scan::{DeviceProperties, DeviceSource, ScanOptions, scan_or_empty, scan_with};

/// An error from the device enumeration layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An OS-level error.
    #[error("OS error {0}")]
    Os(i32),
    /// Enumeration is not available on this platform.
    #[error("Operation not supported")]
    NotSupported,
    /// A filesystem read failed while enumerating.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// An unknown error.
    #[error("Unknown error")]
    Unknown,
}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for Error {
    fn from(err: windows::core::Error) -> Self {
        Error::Os(err.code().0)
    }
}

/// Scans the native device registry, surfacing enumeration failures.
pub fn try_scan(options: &ScanOptions) -> Result<Vec<DeviceRecord>, Error> {
    scan_with(&NativeSource::new(), options)
}

/// Scans the native device registry. An unavailable enumeration yields an
/// empty list, the same as having no phones attached.
pub fn scan(options: &ScanOptions) -> Vec<DeviceRecord> {
    scan_or_empty(&NativeSource::new(), options)
}

/// Returns at most `capacity` phones in enumeration order.
pub fn scan_usb_devices(capacity: usize) -> Vec<DeviceRecord> {
    scan(&ScanOptions::with_limit(capacity))
}
