//! Component counts, agent relationships and usage statistics.

use std::collections::BTreeMap;
use std::path::Path;

use lintel_core::{
    ComponentCounts, ComponentRelationship, FileType, FrameworkInsights, FrameworkLayout,
    UsageStatistics,
};

use crate::discovery::FrameworkFiles;
use crate::references::{Reference, ReferenceKind, classify};

/// Build insights from one pass worth of discovery and references.
///
/// With `scope`, only agents whose file stem is listed get a relationship;
/// counts always cover the whole framework.
#[must_use]
pub fn build_insights(
    files: &FrameworkFiles,
    references: &[Reference],
    layout: &FrameworkLayout,
    scope: Option<&[&str]>,
) -> FrameworkInsights {
    let component_counts = ComponentCounts {
        agents: files.agent_documents().count(),
        tasks: files.tasks.len() + files.local_tasks.len(),
        templates: files.templates.len(),
        data: files.data.len(),
    };

    let relationships: Vec<ComponentRelationship> = files
        .agent_documents()
        .filter_map(|path| {
            let name = file_stem(path);
            if scope.is_some_and(|names| !names.contains(&name.as_str())) {
                return None;
            }
            Some(relationship(name, &layout.relative(path), references, layout))
        })
        .collect();

    let usage_statistics = usage(&relationships);
    let total_references = relationships
        .iter()
        .map(|relationship| relationship.templates.len() + relationship.data_files.len())
        .sum();

    FrameworkInsights {
        component_counts,
        relationships,
        usage_statistics,
        total_references,
    }
}

fn relationship(
    name: String,
    agent_id: &str,
    references: &[Reference],
    layout: &FrameworkLayout,
) -> ComponentRelationship {
    let mut relationship = ComponentRelationship::new(name);
    let tasks: Vec<&Reference> = references
        .iter()
        .filter(|r| r.kind == ReferenceKind::AgentTask && r.exists && r.source == agent_id)
        .collect();

    for task in &tasks {
        let list = if layout.is_local_task_reference(&task.target) {
            &mut relationship.local_tasks
        } else {
            &mut relationship.tasks
        };
        push_unique(list, file_name(&task.target_id));

        for asset in references
            .iter()
            .filter(|r| r.exists && r.source == task.target_id && r.kind != ReferenceKind::AgentTask)
        {
            match classify(layout, &asset.target_id) {
                Some(FileType::Template) => {
                    push_unique(&mut relationship.templates, file_name(&asset.target_id));
                }
                Some(FileType::Data) => {
                    push_unique(&mut relationship.data_files, file_name(&asset.target_id));
                }
                _ => {}
            }
        }
    }
    relationship
}

/// Most-used template and data file. Ties go to the smallest name.
fn usage(relationships: &[ComponentRelationship]) -> UsageStatistics {
    let mut templates: BTreeMap<&str, usize> = BTreeMap::new();
    let mut data: BTreeMap<&str, usize> = BTreeMap::new();
    for relationship in relationships {
        for template in &relationship.templates {
            *templates.entry(template).or_default() += 1;
        }
        for file in &relationship.data_files {
            *data.entry(file).or_default() += 1;
        }
    }
    let (most_used_template, template_usage_count) = most_used(&templates);
    let (most_used_data, data_usage_count) = most_used(&data);
    UsageStatistics {
        most_used_template,
        most_used_data,
        template_usage_count,
        data_usage_count,
    }
}

fn most_used(counts: &BTreeMap<&str, usize>) -> (String, usize) {
    // BTreeMap iterates names in order; strict `>` keeps the first on ties
    counts
        .iter()
        .fold((String::new(), 0), |(best, best_count), (name, &count)| {
            if count > best_count {
                ((*name).to_string(), count)
            } else {
                (best, best_count)
            }
        })
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn file_name(id: &str) -> String {
    id.rsplit('/').next().unwrap_or(id).to_string()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
