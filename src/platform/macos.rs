//! macOS backend: IOKit matching for enumeration, registry properties for
//! identity, and a recursive service-plane iterator for interfaces.

use crate::descriptor::InterfaceClass;
use crate::ids::UsbIds;
use crate::scan::{DeviceProperties, DeviceSource};
use crate::util::non_empty;
use crate::Error;
use core_foundation_sys::base::{CFGetTypeID, CFRelease, CFTypeRef, kCFAllocatorDefault};
use core_foundation_sys::number::{
    CFNumberGetTypeID, CFNumberGetValue, CFNumberRef, kCFNumberSInt64Type,
};
use core_foundation_sys::string::{
    CFStringCreateWithCString, CFStringGetCString, CFStringGetLength,
    CFStringGetMaximumSizeForEncoding, CFStringGetTypeID, CFStringRef, kCFStringEncodingUTF8,
};
use io_kit_sys::types::{io_iterator_t, io_object_t};
use io_kit_sys::{
    IOIteratorNext, IOObjectRelease, IORegistryEntryCreateCFProperty,
    IORegistryEntryCreateIterator, IOServiceGetMatchingServices, IOServiceMatching,
    kIOMasterPortDefault,
};
use log::trace;
use std::ffi::{CStr, c_char, c_void};
use std::ops::ControlFlow;

const USB_DEVICE_CLASS_NAME: &CStr = c"IOUSBDevice";
const SERVICE_PLANE: &CStr = c"IOService";
const REGISTRY_ITERATE_RECURSIVELY: u32 = 0x0000_0001;

const PRODUCT_STRING: &CStr = c"USB Product Name";
const VENDOR_STRING: &CStr = c"USB Vendor Name";
const SERIAL_NUMBER_STRING: &CStr = c"USB Serial Number";
const INTERFACE_CLASS: &CStr = c"bInterfaceClass";
const INTERFACE_SUBCLASS: &CStr = c"bInterfaceSubClass";
const INTERFACE_PROTOCOL: &CStr = c"bInterfaceProtocol";

/// An IOKit object reference, released exactly once on drop.
pub struct IoObject(io_object_t);

impl IoObject {
    /// Takes the next object from an iterator, if any.
    fn next_from(iterator: &IoObject) -> Option<IoObject> {
        let object = unsafe { IOIteratorNext(iterator.0 as io_iterator_t) };
        (object != 0).then_some(IoObject(object))
    }
}

impl Drop for IoObject {
    fn drop(&mut self) {
        unsafe {
            IOObjectRelease(self.0);
        }
    }
}

/// An owned Core Foundation reference.
struct CfObject(CFTypeRef);

impl CfObject {
    fn wrap(value: CFTypeRef) -> Option<Self> {
        (!value.is_null()).then_some(CfObject(value))
    }

    fn string(value: &CStr) -> Option<Self> {
        let string = unsafe {
            CFStringCreateWithCString(kCFAllocatorDefault, value.as_ptr(), kCFStringEncodingUTF8)
        };
        Self::wrap(string as CFTypeRef)
    }
}

impl Drop for CfObject {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0) };
    }
}

/// Enumerates `IOUSBDevice` services from the IOKit registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct IoKitSource;

impl IoKitSource {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceSource for IoKitSource {
    type Device = IoObject;

    fn for_each_device(
        &self,
        visit: &mut dyn FnMut(&IoObject) -> ControlFlow<()>,
    ) -> Result<(), Error> {
        let mut iterator: io_iterator_t = 0;

        unsafe {
            let matching_dict = IOServiceMatching(USB_DEVICE_CLASS_NAME.as_ptr());
            if matching_dict.is_null() {
                return Err(Error::Os(-1));
            }

            // Consumes the matching dictionary.
            let result =
                IOServiceGetMatchingServices(kIOMasterPortDefault, matching_dict as _, &mut iterator);
            if result != 0 {
                return Err(Error::Os(result));
            }
        }
        let iterator = IoObject(iterator);

        while let Some(device) = IoObject::next_from(&iterator) {
            if visit(&device).is_break() {
                break;
            }
        }

        Ok(())
    }

    fn identifiers(&self, device: &IoObject) -> Option<UsbIds> {
        let vendor_id = int_property(device.0, c"idVendor")?;
        let product_id = int_property(device.0, c"idProduct")?;
        Some(UsbIds::new(
            u16::try_from(vendor_id).ok()?,
            u16::try_from(product_id).ok()?,
        ))
    }

    fn properties(&self, device: &IoObject) -> DeviceProperties {
        DeviceProperties {
            name: string_property(device.0, PRODUCT_STRING),
            manufacturer: string_property(device.0, VENDOR_STRING),
            serial: string_property(device.0, SERIAL_NUMBER_STRING),
        }
    }

    fn has_interface(&self, device: &IoObject, target: InterfaceClass) -> bool {
        let mut iterator: io_iterator_t = 0;
        let result = unsafe {
            IORegistryEntryCreateIterator(
                device.0,
                SERVICE_PLANE.as_ptr().cast(),
                REGISTRY_ITERATE_RECURSIVELY,
                &mut iterator,
            )
        };
        if result != 0 {
            trace!("registry iterator unavailable: {result}");
            return false;
        }
        let iterator = IoObject(iterator);

        while let Some(entry) = IoObject::next_from(&iterator) {
            if interface_class(&entry) == Some(target) {
                return true;
            }
        }
        false
    }
}

fn interface_class(entry: &IoObject) -> Option<InterfaceClass> {
    let byte = |key| int_property(entry.0, key).and_then(|value| u8::try_from(value).ok());
    Some(InterfaceClass::new(
        byte(INTERFACE_CLASS)?,
        byte(INTERFACE_SUBCLASS)?,
        byte(INTERFACE_PROTOCOL)?,
    ))
}

fn property(entry: io_object_t, key: &CStr) -> Option<CfObject> {
    let key = CfObject::string(key)?;
    let value = unsafe {
        IORegistryEntryCreateCFProperty(entry, key.0 as CFStringRef, kCFAllocatorDefault, 0)
    };
    CfObject::wrap(value)
}

fn int_property(entry: io_object_t, key: &CStr) -> Option<i64> {
    let value = property(entry, key)?;
    if unsafe { CFGetTypeID(value.0) != CFNumberGetTypeID() } {
        return None;
    }

    let mut number: i64 = 0;
    let ok = unsafe {
        CFNumberGetValue(
            value.0 as CFNumberRef,
            kCFNumberSInt64Type,
            &mut number as *mut i64 as *mut c_void,
        )
    };
    (u8::from(ok) != 0).then_some(number)
}

fn string_property(entry: io_object_t, key: &CStr) -> Option<String> {
    let value = property(entry, key)?;
    if unsafe { CFGetTypeID(value.0) != CFStringGetTypeID() } {
        return None;
    }

    let string = value.0 as CFStringRef;
    let capacity = unsafe {
        CFStringGetMaximumSizeForEncoding(CFStringGetLength(string), kCFStringEncodingUTF8)
    } + 1;
    let mut buffer = vec![0 as c_char; usize::try_from(capacity).ok()?];
    let ok = unsafe {
        CFStringGetCString(string, buffer.as_mut_ptr(), capacity, kCFStringEncodingUTF8)
    };
    if u8::from(ok) == 0 {
        return None;
    }

    let text = unsafe { CStr::from_ptr(buffer.as_ptr()) };
    non_empty(&text.to_string_lossy())
}
