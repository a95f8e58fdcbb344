//! Interface class triples used to detect exposed capabilities.

use crate::record::DeviceFamily;
use std::fmt;

/// An interface's `(class, subclass, protocol)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceClass {
    pub class: u8,
    pub subclass: u8,
    pub protocol: u8,
}

/// Vendor-specific interface used by adb and hdc.
pub const DEBUG_BRIDGE: InterfaceClass = InterfaceClass::new(0xFF, 0x42, 0x01);

/// Still-image interface an iOS device exposes once it trusts the host.
pub const TRUST: InterfaceClass = InterfaceClass::new(0x06, 0x01, 0x01);

impl InterfaceClass {
    pub const fn new(class: u8, subclass: u8, protocol: u8) -> Self {
        Self {
            class,
            subclass,
            protocol,
        }
    }

    /// Parses the class triple out of a Windows compatible/hardware id such
    /// as `USB\Class_ff&SubClass_42&Prot_01`.
    pub fn from_compatible_id(id: &str) -> Option<Self> {
        let lower = id.to_ascii_lowercase();
        let start = lower
            .match_indices("class_")
            .map(|(index, _)| index)
            .find(|&index| index == 0 || matches!(lower.as_bytes()[index - 1], b'\\' | b'&'))?;
        let mut class = None;
        let mut subclass = None;
        let mut protocol = None;

        for field in lower[start..].split('&') {
            let (key, value) = match field.split_once('_') {
                Some(pair) => pair,
                None => continue,
            };
            let value = u8::from_str_radix(value.trim_end_matches('\0'), 16).ok();
            match key {
                "class" => class = value,
                "subclass" => subclass = value,
                "prot" => protocol = value,
                _ => {}
            }
        }

        Some(Self::new(class?, subclass?, protocol?))
    }
}

impl fmt::Display for InterfaceClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02x}/{:02x}/{:02x}",
            self.class, self.subclass, self.protocol
        )
    }
}

/// Depth-first search below `root` for a node satisfying `hit`, following
/// first-child/next-sibling links. `root` itself is not tested and the walk
/// stops at the first hit.
pub fn any_descendant<N: Copy>(
    root: N,
    first_child: impl Fn(N) -> Option<N>,
    next_sibling: impl Fn(N) -> Option<N>,
    mut hit: impl FnMut(N) -> bool,
) -> bool {
    let mut pending = Vec::new();
    pending.extend(first_child(root));

    while let Some(node) = pending.pop() {
        if hit(node) {
            return true;
        }
        pending.extend(next_sibling(node));
        pending.extend(first_child(node));
    }

    false
}

/// The capability check a device family gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    DebugBridge,
    Trust,
}

impl Capability {
    pub fn for_family(family: DeviceFamily) -> Self {
        match family {
            DeviceFamily::Android | DeviceFamily::HarmonyOs => Capability::DebugBridge,
            DeviceFamily::Ios => Capability::Trust,
        }
    }

    pub fn interface(self) -> InterfaceClass {
        match self {
            Capability::DebugBridge => DEBUG_BRIDGE,
            Capability::Trust => TRUST,
        }
    }
}
