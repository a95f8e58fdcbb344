#![cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]

//! Fallback for platforms without a device registry backend.

use crate::descriptor::InterfaceClass;
use crate::ids::UsbIds;
use crate::scan::{DeviceProperties, DeviceSource};
use crate::Error;
use std::ops::ControlFlow;

/// A placeholder for the device structure.
pub struct NotSupportedDevice;

/// Source that never produces devices.
#[derive(Debug, Default)]
pub struct NotSupportedSource;

impl NotSupportedSource {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceSource for NotSupportedSource {
    type Device = NotSupportedDevice;

    fn for_each_device(
        &self,
        _visit: &mut dyn FnMut(&NotSupportedDevice) -> ControlFlow<()>,
    ) -> Result<(), Error> {
        Err(Error::NotSupported)
    }

    fn identifiers(&self, _device: &NotSupportedDevice) -> Option<UsbIds> {
        None
    }

    fn properties(&self, _device: &NotSupportedDevice) -> DeviceProperties {
        DeviceProperties::default()
    }

    fn has_interface(&self, _device: &NotSupportedDevice, _target: InterfaceClass) -> bool {
        false
    }
}
