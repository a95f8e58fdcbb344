//! Windows backend: SetupAPI for enumeration and properties, the
//! configuration manager for walking a device's child nodes.

use crate::descriptor::{InterfaceClass, any_descendant};
use crate::ids::{UsbIds, parse_hardware_id, serial_from_instance_id};
use crate::scan::{DeviceProperties, DeviceSource};
use crate::util::{name_or_description, non_empty};
use crate::Error;
use log::trace;
use std::ops::ControlFlow;
use windows::Win32::Devices::DeviceAndDriverInstallation::{
    CM_DRP_COMPATIBLEIDS, CM_DRP_HARDWAREID, CM_Get_Child, CM_Get_DevNode_Registry_PropertyW,
    CM_Get_Sibling, CR_BUFFER_SMALL, CR_SUCCESS, DIGCF_DEVICEINTERFACE, DIGCF_PRESENT, HDEVINFO,
    SETUP_DI_REGISTRY_PROPERTY, SP_DEVINFO_DATA, SPDRP_DEVICEDESC, SPDRP_FRIENDLYNAME,
    SPDRP_HARDWAREID, SPDRP_MFG, SetupDiDestroyDeviceInfoList, SetupDiEnumDeviceInfo,
    SetupDiGetClassDevsW, SetupDiGetDeviceInstanceIdW, SetupDiGetDeviceRegistryPropertyW,
};
use windows::Win32::Foundation::HWND;
use windows::core::{GUID, PCWSTR};

// Same GUID as in libusb's windows_winusb.c
const GUID_DEVINTERFACE_USB_DEVICE: GUID = GUID::from_u128(0xA5DCBF10_6530_11D2_901F_00C04FB951ED);

/// A member of the device information set being enumerated.
pub struct WindowsDevice {
    set: HDEVINFO,
    data: SP_DEVINFO_DATA,
}

/// Owns a device information set and destroys it on drop.
struct DeviceInfoSet(HDEVINFO);

impl Drop for DeviceInfoSet {
    fn drop(&mut self) {
        unsafe {
            let _ = SetupDiDestroyDeviceInfoList(self.0);
        }
    }
}

/// Enumerates present devices exposing the USB device interface.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetupApiSource;

impl SetupApiSource {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceSource for SetupApiSource {
    type Device = WindowsDevice;

    fn for_each_device(
        &self,
        visit: &mut dyn FnMut(&WindowsDevice) -> ControlFlow<()>,
    ) -> Result<(), Error> {
        let handle = unsafe {
            SetupDiGetClassDevsW(
                Some(&GUID_DEVINTERFACE_USB_DEVICE),
                PCWSTR::null(),
                HWND::default(),
                DIGCF_PRESENT | DIGCF_DEVICEINTERFACE,
            )
        }?;

        if handle.is_invalid() {
            return Err(Error::from(windows::core::Error::from_win32()));
        }
        let set = DeviceInfoSet(handle);

        for index in 0.. {
            let mut data = SP_DEVINFO_DATA {
                cbSize: std::mem::size_of::<SP_DEVINFO_DATA>() as u32,
                ..Default::default()
            };
            if unsafe { SetupDiEnumDeviceInfo(set.0, index, &mut data) }.is_err() {
                break;
            }

            let device = WindowsDevice { set: set.0, data };
            if visit(&device).is_break() {
                break;
            }
        }

        Ok(())
    }

    fn identifiers(&self, device: &WindowsDevice) -> Option<UsbIds> {
        registry_strings(device, SPDRP_HARDWAREID)
            .iter()
            .find_map(|id| parse_hardware_id(id))
    }

    fn properties(&self, device: &WindowsDevice) -> DeviceProperties {
        let name = name_or_description(registry_string(device, SPDRP_FRIENDLYNAME), || {
            registry_string(device, SPDRP_DEVICEDESC)
        });

        DeviceProperties {
            name,
            manufacturer: registry_string(device, SPDRP_MFG),
            serial: instance_id(device).and_then(|id| serial_from_instance_id(&id)),
        }
    }

    fn has_interface(&self, device: &WindowsDevice, target: InterfaceClass) -> bool {
        any_descendant(device.data.DevInst, first_child, next_sibling, |node| {
            let exposed = node_exposes(node, target);
            if exposed {
                trace!("devnode {node} exposes {target}");
            }
            exposed
        })
    }
}

fn registry_string(device: &WindowsDevice, property: SETUP_DI_REGISTRY_PROPERTY) -> Option<String> {
    registry_strings(device, property)
        .into_iter()
        .find_map(|value| non_empty(&value))
}

/// Reads a REG_SZ or REG_MULTI_SZ device property as its list of strings.
fn registry_strings(device: &WindowsDevice, property: SETUP_DI_REGISTRY_PROPERTY) -> Vec<String> {
    let mut required_size = 0u32;

    // First call to get the required buffer size
    unsafe {
        let _ = SetupDiGetDeviceRegistryPropertyW(
            device.set,
            &device.data,
            property,
            None,
            None,
            Some(&mut required_size),
        );
    }
    if required_size == 0 {
        return Vec::new();
    }

    let mut buffer = vec![0u8; required_size as usize];
    if unsafe {
        SetupDiGetDeviceRegistryPropertyW(
            device.set,
            &device.data,
            property,
            None,
            Some(buffer.as_mut_slice()),
            None,
        )
    }
    .is_err()
    {
        return Vec::new();
    }

    let wide: Vec<u16> = buffer
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    split_multi_sz(&wide)
}

fn instance_id(device: &WindowsDevice) -> Option<String> {
    let mut required_size = 0u32;
    unsafe {
        let _ = SetupDiGetDeviceInstanceIdW(
            device.set,
            &device.data,
            None,
            Some(&mut required_size),
        );
    }
    if required_size == 0 {
        return None;
    }

    let mut buffer = vec![0u16; required_size as usize];
    unsafe {
        SetupDiGetDeviceInstanceIdW(device.set, &device.data, Some(buffer.as_mut_slice()), None)
    }
    .ok()?;

    split_multi_sz(&buffer).into_iter().next()
}

fn first_child(node: u32) -> Option<u32> {
    let mut child = 0u32;
    (unsafe { CM_Get_Child(&mut child, node, 0) } == CR_SUCCESS).then_some(child)
}

fn next_sibling(node: u32) -> Option<u32> {
    let mut sibling = 0u32;
    (unsafe { CM_Get_Sibling(&mut sibling, node, 0) } == CR_SUCCESS).then_some(sibling)
}

fn node_exposes(node: u32, target: InterfaceClass) -> bool {
    [CM_DRP_COMPATIBLEIDS, CM_DRP_HARDWAREID]
        .into_iter()
        .flat_map(|property| devnode_strings(node, property))
        .any(|id| InterfaceClass::from_compatible_id(&id) == Some(target))
}

fn devnode_strings(node: u32, property: u32) -> Vec<String> {
    let mut length = 0u32;
    let status =
        unsafe { CM_Get_DevNode_Registry_PropertyW(node, property, None, None, &mut length, 0) };
    if (status != CR_SUCCESS && status != CR_BUFFER_SMALL) || length == 0 {
        return Vec::new();
    }

    let mut buffer = vec![0u16; (length as usize).div_ceil(2)];
    let status = unsafe {
        CM_Get_DevNode_Registry_PropertyW(
            node,
            property,
            None,
            Some(buffer.as_mut_ptr().cast()),
            &mut length,
            0,
        )
    };
    if status != CR_SUCCESS {
        return Vec::new();
    }

    split_multi_sz(&buffer)
}

/// Splits a NUL-separated, double-NUL-terminated UTF-16 list.
fn split_multi_sz(wide: &[u16]) -> Vec<String> {
    wide.split(|&c| c == 0)
        .take_while(|item| !item.is_empty())
        .map(String::from_utf16_lossy)
        .collect()
}
