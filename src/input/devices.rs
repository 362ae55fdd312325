//! Mapping physical devices onto device classes.

use std::collections::{BTreeMap, BTreeSet};

use log::info;

use super::events::{DeviceClass, InputSource};
use crate::config::DeviceClassOption;

/// Source-to-class lookup keyed by device name, with configured overrides.
#[derive(Debug, Clone, Default)]
pub struct DeviceClassMap {
    overrides: BTreeMap<String, DeviceClassOption>,
    known: BTreeSet<String>,
}

impl DeviceClassMap {
    pub fn new(overrides: BTreeMap<String, DeviceClassOption>) -> Self {
        Self {
            overrides,
            known: BTreeSet::new(),
        }
    }

    /// Replaces the overrides, keeping the devices seen so far.
    pub fn set_overrides(&mut self, overrides: BTreeMap<String, DeviceClassOption>) {
        self.overrides = overrides;
    }

    /// Class for events of `device_name`, remembering the device.
    pub fn classify(&mut self, device_name: &str, source: InputSource) -> DeviceClass {
        if !device_name.is_empty() && self.known.insert(device_name.to_string()) {
            info!("New input device \"{}\" ({:?})", device_name, source);
        }
        self.lookup(device_name, source)
    }

    /// Class for events of `device_name` without recording it.
    pub fn lookup(&self, device_name: &str, source: InputSource) -> DeviceClass {
        self.overrides
            .get(device_name)
            .copied()
            .unwrap_or_else(|| DeviceClassOption::for_source(source))
            .device_class(source)
    }

    /// Names of every device seen so far, for building configuration UIs.
    pub fn known_devices(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_map_to_default_classes() {
        let map = DeviceClassMap::default();
        assert_eq!(map.lookup("", InputSource::Touchpad), DeviceClass::Mouse);
        assert_eq!(map.lookup("", InputSource::Eraser), DeviceClass::Eraser);
        assert_eq!(map.lookup("", InputSource::Keyboard), DeviceClass::Keyboard);
        assert_eq!(map.lookup("", InputSource::TabletPad), DeviceClass::Ignore);
    }

    #[test]
    fn overrides_win_by_device_name() {
        let mut overrides = BTreeMap::new();
        overrides.insert("Presenter".to_string(), DeviceClassOption::MouseKeyboardCombo);
        overrides.insert("Broken Touch".to_string(), DeviceClassOption::Disabled);
        let map = DeviceClassMap::new(overrides);

        assert_eq!(
            map.lookup("Presenter", InputSource::Mouse),
            DeviceClass::MouseKeyboardCombo
        );
        assert_eq!(
            map.lookup("Broken Touch", InputSource::Touchscreen),
            DeviceClass::Ignore
        );
        assert_eq!(map.lookup("Other", InputSource::Touchscreen), DeviceClass::Touchscreen);
    }

    #[test]
    fn classify_records_devices_once() {
        let mut map = DeviceClassMap::default();
        map.classify("Pen A", InputSource::Pen);
        map.classify("Pen A", InputSource::Pen);
        map.classify("", InputSource::Mouse);
        map.classify("Mouse B", InputSource::Mouse);
        assert_eq!(map.known_devices().collect::<Vec<_>>(), vec!["Mouse B", "Pen A"]);
    }
}
