pub mod snapshot;
pub mod state;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A controllable motion axis and its addressing on the primary fieldbus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub id: String,
    pub display_name: String,
    pub address_prefix: String,
}

impl Axis {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        address_prefix: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            address_prefix: address_prefix.into(),
        }
    }
}

/// The fixed set of axes known to a gateway. Built once at startup and
/// only read afterwards.
#[derive(Debug, Clone)]
pub struct AxisRegistry {
    axes: Vec<Axis>,
}

impl AxisRegistry {
    pub fn new(axes: Vec<Axis>) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        for axis in &axes {
            if axis.id.trim().is_empty() {
                return Err(anyhow::anyhow!("Axis id must not be empty"));
            }
            if !seen.insert(axis.id.as_str()) {
                return Err(anyhow::anyhow!("Duplicate axis id: {}", axis.id));
            }
        }
        Ok(Self { axes })
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn get(&self, id: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

pub fn default_axes() -> Vec<Axis> {
    vec![
        Axis::new("axis1", "X Axis", "GVL.Axis1"),
        Axis::new("axis2", "Y Axis", "GVL.Axis2"),
        Axis::new("axis3", "Z Axis", "GVL.Axis3"),
    ]
}

impl Default for AxisRegistry {
    fn default() -> Self {
        Self {
            axes: default_axes(),
        }
    }
}
