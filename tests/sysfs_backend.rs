#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use usbmobile::descriptor::{DEBUG_BRIDGE, TRUST};
use usbmobile::{DeviceFamily, InterfaceClass, ScanOptions, SysfsSource, scan_with};

struct FakeDevice<'a> {
    name: &'a str,
    vendor: &'a str,
    product: &'a str,
    attrs: &'a [(&'a str, &'a str)],
    interfaces: &'a [InterfaceClass],
}

fn write_device(root: &Path, device: &FakeDevice) {
    let dir = root.join(device.name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("idVendor"), format!("{}\n", device.vendor)).unwrap();
    fs::write(dir.join("idProduct"), format!("{}\n", device.product)).unwrap();
    for (attr, value) in device.attrs {
        fs::write(dir.join(attr), format!("{value}\n")).unwrap();
    }
    for (index, class) in device.interfaces.iter().enumerate() {
        let iface = dir.join(format!("{}:1.{index}", device.name));
        fs::create_dir_all(&iface).unwrap();
        fs::write(iface.join("bInterfaceClass"), format!("{:02x}\n", class.class)).unwrap();
        fs::write(iface.join("bInterfaceSubClass"), format!("{:02x}\n", class.subclass)).unwrap();
        fs::write(iface.join("bInterfaceProtocol"), format!("{:02x}\n", class.protocol)).unwrap();
    }
}

fn tree(devices: &[FakeDevice]) -> TempDir {
    let root = tempfile::tempdir().unwrap();
    for device in devices {
        write_device(root.path(), device);
    }
    root
}

#[test]
fn reads_android_device_with_debug_bridge() {
    let root = tree(&[FakeDevice {
        name: "1-4",
        vendor: "18d1",
        product: "4ee7",
        attrs: &[("product", "Pixel 8"), ("manufacturer", "Google"), ("serial", "3A281FDJH00ABC")],
        interfaces: &[InterfaceClass::new(0x06, 0x01, 0x01), DEBUG_BRIDGE],
    }]);

    let records = scan_with(&SysfsSource::with_root(root.path()), &ScanOptions::default()).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.family, DeviceFamily::Android);
    assert_eq!(record.vendor_id_hex(), "0x18D1");
    assert_eq!(record.product_id_hex(), "0x4EE7");
    assert_eq!(record.name.as_deref(), Some("Pixel 8"));
    assert_eq!(record.brand.as_deref(), Some("Google"));
    assert_eq!(record.serial.as_deref(), Some("3A281FDJH00ABC"));
    assert!(record.debug_bridge_exposed);
}

#[test]
fn xiaomi_ids_are_read_as_hex() {
    // "2717" also parses as decimal; it must not be read that way.
    let root = tree(&[FakeDevice {
        name: "3-1",
        vendor: "2717",
        product: "ff48",
        attrs: &[],
        interfaces: &[],
    }]);

    let records = scan_with(&SysfsSource::with_root(root.path()), &ScanOptions::default()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].vendor_id, 0x2717);
    assert_eq!(records[0].display_name(), "Unknown");
    assert!(!records[0].debug_bridge_exposed);
}

#[test]
fn iphone_trust_interface_and_forced_brand() {
    let root = tree(&[FakeDevice {
        name: "2-1",
        vendor: "05ac",
        product: "12a8",
        attrs: &[("product", "iPhone"), ("manufacturer", "Apple Inc.")],
        interfaces: &[TRUST, InterfaceClass::new(0xFF, 0xFE, 0x02)],
    }]);

    let records = scan_with(&SysfsSource::with_root(root.path()), &ScanOptions::default()).unwrap();
    assert_eq!(records[0].family, DeviceFamily::Ios);
    assert_eq!(records[0].brand.as_deref(), Some("Apple"));
    assert!(records[0].trusted);
}

#[test]
fn ignores_hubs_interfaces_and_other_vendors() {
    let root = tree(&[
        FakeDevice {
            name: "usb1",
            vendor: "1d6b",
            product: "0002",
            attrs: &[("product", "xHCI Host Controller")],
            interfaces: &[InterfaceClass::new(0x09, 0x00, 0x00)],
        },
        FakeDevice {
            name: "1-2",
            vendor: "0001",
            product: "0001",
            attrs: &[],
            interfaces: &[DEBUG_BRIDGE],
        },
    ]);
    // Top-level interface entries carry no idVendor.
    let iface = root.path().join("1-2:1.0");
    fs::create_dir_all(&iface).unwrap();
    fs::write(iface.join("bInterfaceClass"), "ff\n").unwrap();

    let records = scan_with(&SysfsSource::with_root(root.path()), &ScanOptions::default()).unwrap();
    assert!(records.is_empty());
}

#[test]
fn limit_caps_sysfs_scan() {
    let root = tree(&[
        FakeDevice {
            name: "1-1",
            vendor: "04e8",
            product: "6860",
            attrs: &[],
            interfaces: &[],
        },
        FakeDevice {
            name: "1-2",
            vendor: "2a70",
            product: "4ee7",
            attrs: &[],
            interfaces: &[],
        },
    ]);

    let records = scan_with(&SysfsSource::with_root(root.path()), &ScanOptions::with_limit(1)).unwrap();
    assert_eq!(records.len(), 1);
    assert!(matches!(records[0].vendor_id, 0x04E8 | 0x2A70));
}

#[test]
fn huawei_hdc_name_is_harmony() {
    let root = tree(&[FakeDevice {
        name: "1-3",
        vendor: "12d1",
        product: "5000",
        attrs: &[("product", "HUAWEI hdc"), ("manufacturer", "HUAWEI")],
        interfaces: &[DEBUG_BRIDGE],
    }]);

    let records = scan_with(&SysfsSource::with_root(root.path()), &ScanOptions::default()).unwrap();
    assert_eq!(records[0].family, DeviceFamily::HarmonyOs);
    assert!(records[0].debug_bridge_exposed);
}
