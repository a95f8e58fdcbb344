//! The platform-independent scan driver.

use crate::classify::{classify, is_candidate};
use crate::descriptor::{Capability, InterfaceClass};
use crate::ids::UsbIds;
use crate::record::{DeviceFamily, DeviceRecord};
use crate::Error;
use log::{debug, trace, warn};
use std::ops::ControlFlow;

/// Textual properties read from the OS device registry. Each one is
/// independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceProperties {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub serial: Option<String>,
}

/// One OS device-enumeration subsystem.
///
/// Devices are only lent to the visitor, so a source can tie every
/// per-device handle to the enumeration that produced it and release all of
/// it before `for_each_device` returns, whether the visitor ran to the end
/// or broke out early.
pub trait DeviceSource {
    type Device;

    /// Visits every present USB device in the order the OS yields them.
    /// Fails only when the enumeration itself could not be started.
    fn for_each_device(
        &self,
        visit: &mut dyn FnMut(&Self::Device) -> ControlFlow<()>,
    ) -> Result<(), Error>;

    /// Vendor/product ids, or `None` when they cannot be determined.
    fn identifiers(&self, device: &Self::Device) -> Option<UsbIds>;

    fn properties(&self, device: &Self::Device) -> DeviceProperties;

    /// Whether any interface below the device exposes exactly `target`.
    /// Traversal errors count as "not found".
    fn has_interface(&self, device: &Self::Device, target: InterfaceClass) -> bool;
}

/// Knobs for a single scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Hard ceiling on the number of records produced.
    pub limit: Option<usize>,
}

impl ScanOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }

    fn is_full(&self, count: usize) -> bool {
        self.limit.is_some_and(|limit| count >= limit)
    }
}

/// Runs one scan over `source`, producing records in enumeration order.
pub fn scan_with<S: DeviceSource>(
    source: &S,
    options: &ScanOptions,
) -> Result<Vec<DeviceRecord>, Error> {
    let mut records = Vec::new();
    if options.is_full(0) {
        return Ok(records);
    }

    source.for_each_device(&mut |device| {
        if let Some(record) = inspect(source, device) {
            records.push(record);
        }
        if options.is_full(records.len()) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    Ok(records)
}

/// Like [`scan_with`], but an unavailable enumeration yields an empty list,
/// the same as having no phones attached.
pub fn scan_or_empty<S: DeviceSource>(source: &S, options: &ScanOptions) -> Vec<DeviceRecord> {
    match scan_with(source, options) {
        Ok(records) => records,
        Err(err) => {
            warn!("USB enumeration unavailable: {err}");
            Vec::new()
        }
    }
}

fn inspect<S: DeviceSource>(source: &S, device: &S::Device) -> Option<DeviceRecord> {
    let ids = match source.identifiers(device) {
        Some(ids) => ids,
        None => {
            trace!("skipping device without vendor/product ids");
            return None;
        }
    };

    if !is_candidate(ids) {
        trace!("skipping {ids}: not a phone vendor");
        return None;
    }

    let properties = source.properties(device);
    let family = match classify(
        ids,
        properties.manufacturer.as_deref(),
        properties.name.as_deref(),
    ) {
        Some(family) => family,
        None => {
            debug!("skipping {ids}: not classified");
            return None;
        }
    };

    let brand = match family {
        DeviceFamily::Ios => Some("Apple".to_string()),
        _ => properties.manufacturer,
    };

    let capability = Capability::for_family(family);
    let present = source.has_interface(device, capability.interface());
    debug!("{ids} is {family}, {capability:?} interface present: {present}");

    Some(DeviceRecord {
        family,
        name: properties.name,
        serial: properties.serial,
        brand,
        vendor_id: ids.vendor_id,
        product_id: ids.product_id,
        debug_bridge_exposed: capability == Capability::DebugBridge && present,
        trusted: capability == Capability::Trust && present,
    })
}
