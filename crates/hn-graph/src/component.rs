//! Common component shape shared by every variant.

use std::fmt;

/// Sentinel input id for components fed from outside the network.
pub const SOURCE_SENTINEL: &str = "source";

/// Sentinel output id for components discharging outside the network.
pub const DRAIN_SENTINEL: &str = "drain";

/// Category tag of a component.
///
/// The order of variants here is incidental; the resolver imposes its own
/// fixed evaluation order (see `hn-sim`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Feed,
    Drain,
    Tank,
    Pump,
    Valve,
    Pipe,
    Sensor,
}

impl Category {
    /// Boundary components exchange flow with the outside world and are
    /// exempt from the symmetric input/output validation rule.
    pub fn is_boundary(self) -> bool {
        matches!(self, Category::Feed | Category::Drain)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Feed => "feed",
            Category::Drain => "drain",
            Category::Tank => "tank",
            Category::Pump => "pump",
            Category::Valve => "valve",
            Category::Pipe => "pipe",
            Category::Sensor => "sensor",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and wiring shared by all component variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub id: String,
    pub category: Category,
    /// Upstream component ids (or `SOURCE_SENTINEL`), in declared order.
    pub inputs: Vec<String>,
    /// Downstream component ids (or `DRAIN_SENTINEL`), in declared order.
    pub outputs: Vec<String>,
    pub enabled: bool,
}

impl Meta {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        inputs: Vec<String>,
        outputs: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            inputs,
            outputs,
            enabled: true,
        }
    }
}

/// Access to the common shape, so the registry stays generic over the
/// concrete component representation.
pub trait HasMeta {
    fn meta(&self) -> &Meta;
    fn meta_mut(&mut self) -> &mut Meta;

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn category(&self) -> Category {
        self.meta().category
    }

    fn is_enabled(&self) -> bool {
        self.meta().enabled
    }
}

impl HasMeta for Meta {
    fn meta(&self) -> &Meta {
        self
    }

    fn meta_mut(&mut self) -> &mut Meta {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_categories() {
        assert!(Category::Feed.is_boundary());
        assert!(Category::Drain.is_boundary());
        assert!(!Category::Tank.is_boundary());
        assert!(!Category::Sensor.is_boundary());
    }

    #[test]
    fn meta_defaults_enabled() {
        let meta = Meta::new("t1", Category::Tank, vec!["v1".into()], vec![]);
        assert!(meta.enabled);
        assert_eq!(meta.id(), "t1");
        assert_eq!(meta.category(), Category::Tank);
    }
}
