//! Aggregate view of a framework: component counts, agent relationships and
//! template/data usage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkInsights {
    pub component_counts: ComponentCounts,
    pub relationships: Vec<ComponentRelationship>,
    pub usage_statistics: UsageStatistics,
    /// Template and data references summed over all relationships.
    pub total_references: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCounts {
    pub agents: usize,
    pub tasks: usize,
    pub templates: usize,
    pub data: usize,
}

/// What one agent reaches: its tasks and, through them, templates and data.
///
/// Names are file names (`review.md`), deduplicated in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRelationship {
    pub agent: String,
    pub tasks: Vec<String>,
    pub local_tasks: Vec<String>,
    pub templates: Vec<String>,
    pub data_files: Vec<String>,
}

impl ComponentRelationship {
    #[must_use]
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            ..Self::default()
        }
    }

    /// Standard and local tasks together.
    #[must_use]
    pub fn total_tasks(&self) -> usize {
        self.tasks.len() + self.local_tasks.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStatistics {
    pub most_used_template: String,
    pub most_used_data: String,
    pub template_usage_count: usize,
    pub data_usage_count: usize,
}
