//! Generation metrics and report.

use serde::{Deserialize, Serialize};

use crate::session::SessionStats;

/// Counts describing one generated rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RigMetrics {
    /// Number of source bones.
    pub chain_length: usize,
    /// Whether spring properties were unified.
    pub unified: bool,

    // ========== Edit phase ==========
    /// Bones created by duplication.
    pub bones_created: usize,
    /// Parent assignments.
    pub parents_set: usize,
    /// Roll assignments.
    pub rolls_set: usize,

    // ========== Pose phase ==========
    /// Constraints added.
    pub constraints: usize,
    /// Drivers attached.
    pub drivers: usize,
    /// Custom properties declared.
    pub properties: usize,
    /// Widget, lock and collection assignments.
    pub display_changes: usize,
}

impl RigMetrics {
    /// Builds metrics from the final session counters.
    pub fn from_stats(chain_length: usize, unified: bool, stats: SessionStats) -> Self {
        Self {
            chain_length,
            unified,
            bones_created: stats.bones_created,
            parents_set: stats.parents_set,
            rolls_set: stats.rolls_set,
            constraints: stats.constraints,
            drivers: stats.drivers,
            properties: stats.properties,
            display_changes: stats.display_changes,
        }
    }

    /// Total number of host mutations.
    pub fn total_mutations(&self) -> usize {
        self.bones_created
            + self.parents_set
            + self.rolls_set
            + self.constraints
            + self.drivers
            + self.properties
            + self.display_changes
    }
}

/// Output of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigReport {
    /// UI scripts, exactly one per rig.
    pub scripts: Vec<String>,
    /// Generation counts.
    pub metrics: RigMetrics,
}

impl RigReport {
    pub fn new(script: String, metrics: RigMetrics) -> Self {
        Self {
            scripts: vec![script],
            metrics,
        }
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
