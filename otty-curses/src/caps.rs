//! Runtime capability table.
//!
//! Optional curses features (italic, the fourth mouse button, motion
//! reports) are resolved once, on first access, into a table that maps each
//! feature to either its platform value or a documented fallback:
//! [`AttrFlags::NORMAL`] for attributes and [`MouseMask::NONE`] for masks.
//! Absence of a feature is never an error.

use std::sync::OnceLock;

use log::debug;
use serde::Serialize;

use crate::Result;
use crate::attr::{AttrFlags, Attribute};
use crate::mouse::{MAX_BUTTON, MouseEvent, MouseMask};
use crate::platform::{
    self, BUTTON_PRESSED, BUTTON_RELEASED, Backend, BackendKind, mouse_bits,
    report_position_bits,
};

/// Outcome of probing one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<T> {
    Supported(T),
    Unsupported,
}

impl<T: Copy + Default> Resolution<T> {
    /// Platform value, or the fallback (`T::default()`, i.e. zero).
    pub fn value(self) -> T {
        match self {
            Resolution::Supported(value) => value,
            Resolution::Unsupported => T::default(),
        }
    }

    pub fn is_supported(self) -> bool {
        matches!(self, Resolution::Supported(_))
    }
}

/// A queryable feature name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Attribute(Attribute),
    Mouse { button: u8, event: MouseEvent },
    ReportMousePosition,
}

impl Feature {
    /// Name used in exported tables, e.g. `attr_bold` or `button4_pressed`.
    pub fn name(self) -> String {
        match self {
            Feature::Attribute(attr) => attr.name().to_owned(),
            Feature::Mouse { button, event } => {
                format!("button{button}_{}", event.name())
            },
            Feature::ReportMousePosition => "report_mouse_position".to_owned(),
        }
    }
}

/// Resolved values for every feature of the active backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    backend: BackendKind,
    attributes: [Resolution<AttrFlags>; 8],
    buttons: [[Resolution<MouseMask>; 2]; MAX_BUTTON as usize],
    report_position: Resolution<MouseMask>,
}

#[derive(Serialize)]
struct FeatureEntry {
    name: String,
    supported: bool,
    value: u64,
}

#[derive(Serialize)]
struct CapabilityExport<'a> {
    backend: &'a str,
    features: Vec<FeatureEntry>,
}

impl Capabilities {
    pub(crate) fn resolve(backend: &Backend) -> Self {
        let attributes = Attribute::ALL.map(|attr| {
            if backend.has_attribute(attr) {
                Resolution::Supported(attr.flag())
            } else {
                Resolution::Unsupported
            }
        });

        let mut buttons = [[Resolution::Unsupported; 2]; MAX_BUTTON as usize];
        for (slot, events) in (1..=MAX_BUTTON).zip(buttons.iter_mut()) {
            if slot > backend.buttons {
                continue;
            }
            for event in MouseEvent::ALL {
                let bits = match event {
                    MouseEvent::Pressed => BUTTON_PRESSED,
                    MouseEvent::Released => BUTTON_RELEASED,
                };
                let mask = mouse_bits(slot, bits);
                events[event.index()] =
                    Resolution::Supported(MouseMask::from_bits(mask));
            }
        }

        let report_position = if backend.report_position {
            let mask = report_position_bits();
            Resolution::Supported(MouseMask::from_bits(mask))
        } else {
            Resolution::Unsupported
        };

        Self {
            backend: backend.kind,
            attributes,
            buttons,
            report_position,
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn attribute(&self, attribute: Attribute) -> AttrFlags {
        self.attributes[attribute.index()].value()
    }

    pub fn mouse(&self, button: u8, event: MouseEvent) -> MouseMask {
        self.mouse_resolution(button, event)
            .map(Resolution::value)
            .unwrap_or(MouseMask::NONE)
    }

    pub fn report_position(&self) -> MouseMask {
        self.report_position.value()
    }

    /// Whether the platform defines `feature` at all. A supported feature
    /// always has a non-zero value.
    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::Attribute(attr) => {
                self.attributes[attr.index()].is_supported()
            },
            Feature::Mouse { button, event } => self
                .mouse_resolution(button, event)
                .is_some_and(Resolution::is_supported),
            Feature::ReportMousePosition => self.report_position.is_supported(),
        }
    }

    /// Every feature with its resolved value, attributes first.
    pub fn features(&self) -> impl Iterator<Item = (Feature, u64)> + '_ {
        let attributes = Attribute::ALL.into_iter().map(|attr| {
            (Feature::Attribute(attr), u64::from(self.attribute(attr).bits()))
        });
        let buttons = (1..=MAX_BUTTON).flat_map(move |button| {
            MouseEvent::ALL.into_iter().map(move |event| {
                let mask = self.mouse(button, event);
                (Feature::Mouse { button, event }, mask.bits())
            })
        });
        let position = std::iter::once((
            Feature::ReportMousePosition,
            self.report_position().bits(),
        ));

        attributes.chain(buttons).chain(position)
    }

    /// Export the table as JSON for binding generators.
    pub fn to_json(&self) -> Result<String> {
        let export = CapabilityExport {
            backend: self.backend.name(),
            features: self
                .features()
                .map(|(feature, value)| FeatureEntry {
                    name: feature.name(),
                    supported: self.supports(feature),
                    value,
                })
                .collect(),
        };

        Ok(serde_json::to_string(&export)?)
    }

    fn mouse_resolution(
        &self,
        button: u8,
        event: MouseEvent,
    ) -> Option<Resolution<MouseMask>> {
        let index = usize::from(button.checked_sub(1)?);
        self.buttons
            .get(index)
            .map(|events| events[event.index()])
    }
}

/// The process-wide table for the backend this crate was built for.
pub fn capabilities() -> &'static Capabilities {
    static TABLE: OnceLock<Capabilities> = OnceLock::new();

    TABLE.get_or_init(|| {
        let backend = platform::native();
        let table = Capabilities::resolve(backend);
        debug!(
            "resolved curses capabilities for {} (italic: {}, button4: {}, position: {})",
            backend.kind.name(),
            table.supports(Feature::Attribute(Attribute::Italic)),
            table.supports(Feature::Mouse {
                button: 4,
                event: MouseEvent::Pressed
            }),
            table.supports(Feature::ReportMousePosition),
        );
        table
    })
}
