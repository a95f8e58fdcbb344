//! Turns raw vendor/product ids plus the reported strings into a device family.

use crate::ids::UsbIds;
use crate::record::DeviceFamily;
use crate::util::contains_ignore_case;

pub const GOOGLE_VENDOR_ID: u16 = 0x18D1;
pub const SAMSUNG_VENDOR_ID: u16 = 0x04E8;
pub const HUAWEI_VENDOR_ID: u16 = 0x12D1;
pub const XIAOMI_VENDOR_ID: u16 = 0x2717;
pub const ONEPLUS_VENDOR_ID: u16 = 0x2A70;
pub const APPLE_VENDOR_ID: u16 = 0x05AC;

/// Vendors whose phones are treated as Android (or HarmonyOS, for Huawei).
pub const ANDROID_VENDORS: [u16; 5] = [
    GOOGLE_VENDOR_ID,
    SAMSUNG_VENDOR_ID,
    HUAWEI_VENDOR_ID,
    XIAOMI_VENDOR_ID,
    ONEPLUS_VENDOR_ID,
];

/// Apple product ids: normal (usbmux), recovery, DFU, diagnostics.
pub const IOS_PRODUCTS: [u16; 4] = [0x12A8, 0x12A7, 0x12AB, 0x12AD];

pub fn is_android_vendor(vendor_id: u16) -> bool {
    ANDROID_VENDORS.contains(&vendor_id)
}

pub fn is_ios_product(product_id: u16) -> bool {
    IOS_PRODUCTS.contains(&product_id)
}

/// Whether a device with these ids can classify at all. Lets backends skip
/// string reads for everything else on the bus.
pub fn is_candidate(ids: UsbIds) -> bool {
    is_android_vendor(ids.vendor_id)
        || (ids.vendor_id == APPLE_VENDOR_ID && is_ios_product(ids.product_id))
}

/// Returns the device family, or `None` when the device is not a phone we
/// recognise.
///
/// Huawei shares one vendor id between Android and HarmonyOS devices; the
/// only observable hint is a HiSilicon manufacturer string or an `hdc`
/// token in the product name.
pub fn classify(ids: UsbIds, brand: Option<&str>, name: Option<&str>) -> Option<DeviceFamily> {
    if is_android_vendor(ids.vendor_id) {
        if ids.vendor_id == HUAWEI_VENDOR_ID && looks_like_harmony(brand, name) {
            return Some(DeviceFamily::HarmonyOs);
        }
        return Some(DeviceFamily::Android);
    }

    if ids.vendor_id == APPLE_VENDOR_ID && is_ios_product(ids.product_id) {
        return Some(DeviceFamily::Ios);
    }

    None
}

fn looks_like_harmony(brand: Option<&str>, name: Option<&str>) -> bool {
    brand.is_some_and(|brand| contains_ignore_case(brand, "hisilicon"))
        || name.is_some_and(|name| contains_ignore_case(name, "hdc"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn android_vendors_other_than_huawei_are_never_harmony() {
        for vendor in ANDROID_VENDORS.iter().copied().filter(|v| *v != HUAWEI_VENDOR_ID) {
            let ids = UsbIds::new(vendor, 0x0001);
            assert_eq!(
                classify(ids, Some("HiSilicon"), Some("hdc bridge")),
                Some(DeviceFamily::Android)
            );
        }
    }

    #[test]
    fn huawei_is_harmony_only_with_hint() {
        let ids = UsbIds::new(HUAWEI_VENDOR_ID, 0x107E);
        assert_eq!(
            classify(ids, Some("HISILICON"), Some("Mate 60")),
            Some(DeviceFamily::HarmonyOs)
        );
        assert_eq!(
            classify(ids, Some("HUAWEI"), Some("HDC Interface")),
            Some(DeviceFamily::HarmonyOs)
        );
        assert_eq!(
            classify(ids, Some("HUAWEI"), Some("P30 Pro")),
            Some(DeviceFamily::Android)
        );
        assert_eq!(classify(ids, None, None), Some(DeviceFamily::Android));
    }

    #[test]
    fn apple_needs_a_known_product_id() {
        for product in IOS_PRODUCTS {
            assert_eq!(
                classify(UsbIds::new(APPLE_VENDOR_ID, product), None, None),
                Some(DeviceFamily::Ios)
            );
        }
        // Apple keyboard, not a phone.
        assert_eq!(classify(UsbIds::new(APPLE_VENDOR_ID, 0x024F), None, None), None);
    }

    #[test]
    fn unknown_vendors_do_not_qualify() {
        assert_eq!(classify(UsbIds::new(0x0001, 0x12A8), Some("HiSilicon"), None), None);
        assert!(!is_candidate(UsbIds::new(0x8087, 0x0029)));
        assert!(is_candidate(UsbIds::new(XIAOMI_VENDOR_ID, 0xFF48)));
    }
}
