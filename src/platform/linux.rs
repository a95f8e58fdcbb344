#![cfg(target_os = "linux")]

//! Linux backend built on the sysfs metadata the kernel exports for every
//! USB device and interface. Nothing is opened under `/dev/bus/usb`.

use crate::descriptor::InterfaceClass;
use crate::ids::{UsbIds, parse_hex_u8, parse_hex_u16};
use crate::scan::{DeviceProperties, DeviceSource};
use crate::util::non_empty;
use crate::Error;
use log::trace;
use std::fs;
use std::io::ErrorKind;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

const SYSFS_USB_DEVICES: &str = "/sys/bus/usb/devices";

/// A USB device directory such as `/sys/bus/usb/devices/1-4`.
pub struct SysfsDevice {
    sysfs_path: PathBuf,
}

/// Enumerates devices below a sysfs `usb/devices` directory.
#[derive(Debug, Clone)]
pub struct SysfsSource {
    root: PathBuf,
}

impl SysfsSource {
    pub fn new() -> Self {
        Self::with_root(SYSFS_USB_DEVICES)
    }

    /// Reads from an alternative directory laid out like `/sys/bus/usb/devices`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSource for SysfsSource {
    type Device = SysfsDevice;

    fn for_each_device(
        &self,
        visit: &mut dyn FnMut(&SysfsDevice) -> ControlFlow<()>,
    ) -> Result<(), Error> {
        for entry in fs::read_dir(&self.root)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    trace!("skipping unreadable sysfs entry: {err}");
                    continue;
                }
            };

            // Interfaces are listed alongside devices but lack idVendor.
            if !path.join("idVendor").exists() {
                continue;
            }

            let device = SysfsDevice { sysfs_path: path };
            if visit(&device).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn identifiers(&self, device: &SysfsDevice) -> Option<UsbIds> {
        let path = &device.sysfs_path;
        let vendor_id = read_hex_u16(path, "idVendor").ok()?;
        let product_id = read_hex_u16(path, "idProduct").ok()?;
        Some(UsbIds::new(vendor_id, product_id))
    }

    fn properties(&self, device: &SysfsDevice) -> DeviceProperties {
        let path = &device.sysfs_path;
        DeviceProperties {
            name: read_string(path, "product"),
            manufacturer: read_string(path, "manufacturer"),
            serial: read_string(path, "serial"),
        }
    }

    fn has_interface(&self, device: &SysfsDevice, target: InterfaceClass) -> bool {
        let entries = match fs::read_dir(&device.sysfs_path) {
            Ok(entries) => entries,
            Err(err) => {
                trace!("cannot list {}: {err}", device.sysfs_path.display());
                return false;
            }
        };

        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.join("bInterfaceClass").exists())
            .any(|path| read_interface_class(&path).is_ok_and(|class| class == target))
    }
}

fn read_interface_class(path: &Path) -> Result<InterfaceClass, Error> {
    Ok(InterfaceClass::new(
        read_hex_u8(path, "bInterfaceClass")?,
        read_hex_u8(path, "bInterfaceSubClass")?,
        read_hex_u8(path, "bInterfaceProtocol")?,
    ))
}

fn read_attr(path: &Path, attr: &str) -> Result<String, Error> {
    let contents = fs::read_to_string(path.join(attr))?;
    Ok(contents.trim().to_string())
}

fn read_attr_optional(path: &Path, attr: &str) -> Result<Option<String>, Error> {
    match fs::read_to_string(path.join(attr)) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// String attributes are missing for devices without the descriptor and
/// unreadable when the device stalls; both mean "absent".
fn read_string(path: &Path, attr: &str) -> Option<String> {
    match read_attr_optional(path, attr) {
        Ok(value) => value.as_deref().and_then(non_empty),
        Err(err) => {
            trace!("cannot read {attr} under {}: {err}", path.display());
            None
        }
    }
}

fn read_hex_u8(path: &Path, attr: &str) -> Result<u8, Error> {
    parse_hex_u8(&read_attr(path, attr)?)
}

fn read_hex_u16(path: &Path, attr: &str) -> Result<u16, Error> {
    parse_hex_u16(&read_attr(path, attr)?)
}
