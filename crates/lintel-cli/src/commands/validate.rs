use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;

use lintel_analysis::{FrameworkAnalyzer, ValidationReport};
use lintel_config::LintelConfig;
use lintel_core::FrameworkLayout;
use lintel_schema::{DirectorySchemas, EmbeddedSchemas, SchemaRegistry};

use crate::cli::{GlobalFlags, OutputFormat, ValidateArgs};

/// Handle `lintel validate`. Returns the process exit code.
pub fn handle(args: &ValidateArgs, flags: &GlobalFlags, project_root: &Path) -> anyhow::Result<i32> {
    let config = LintelConfig::load_for_with_dotenv(project_root)
        .context("failed to load lintel configuration")?;

    let report = build_report(args, &config, project_root)?;
    let verbose = flags.verbose || config.report.verbose;
    match flags.format {
        OutputFormat::Text => print!("{}", report.format_report(verbose)),
        OutputFormat::Json => println!(
            "{}",
            report.to_json().context("failed to serialize report")?
        ),
    }
    Ok(report.exit_code())
}

fn build_report(
    args: &ValidateArgs,
    config: &LintelConfig,
    project_root: &Path,
) -> anyhow::Result<ValidationReport> {
    let schemas = load_schemas(config)?;
    let layout = FrameworkLayout::new(project_root, config.analysis.framework_dir.as_str());
    let mut analyzer = FrameworkAnalyzer::new(layout, Arc::new(schemas));

    let started = Instant::now();
    let analysis = if config.analysis.use_cache && !args.no_cache {
        analyzer.optimized_analyze_framework()
    } else {
        analyzer.analyze_framework()
    }
    .context("framework analysis failed")?;

    let insights = if args.agents.is_empty() {
        analysis.insights
    } else {
        let names: Vec<&str> = args.agents.iter().map(String::as_str).collect();
        analyzer
            .insights_for_agents(&names)
            .context("failed to compute scoped insights")?
    };

    tracing::debug!(
        files = analysis.files_processed,
        from_cache = analysis.from_cache,
        "analysis finished"
    );
    Ok(ValidationReport::new(
        analysis.issues,
        Some(insights),
        started.elapsed(),
    ))
}

fn load_schemas(config: &LintelConfig) -> anyhow::Result<SchemaRegistry> {
    match &config.schemas.dir {
        Some(dir) => SchemaRegistry::from_source(&DirectorySchemas::new(dir))
            .with_context(|| format!("failed to load schemas from {}", dir.display())),
        None => SchemaRegistry::from_source(&EmbeddedSchemas).context("failed to load embedded schemas"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_framework_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = build_report(&ValidateArgs::default(), &LintelConfig::default(), dir.path())
            .unwrap_err();
        assert!(format!("{error:#}").contains("framework directory not found"));
    }

    #[test]
    fn broken_link_fails_the_report() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".agentkit/tasks/a.md", "[x](./.agentkit/templates/x.md)\n");

        let report =
            build_report(&ValidateArgs::default(), &LintelConfig::default(), dir.path()).unwrap();
        assert_eq!(report.exit_code(), 1);
        assert!(report.has_critical());
    }

    #[test]
    fn configured_framework_dir_is_used() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".kit/templates/t.md", "# T\n");
        let mut config = LintelConfig::default();
        config.analysis.framework_dir = ".kit".into();

        let report = build_report(&ValidateArgs::default(), &config, dir.path()).unwrap();
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.insights.unwrap().component_counts.templates, 1);
    }

    #[test]
    fn schema_directory_must_contain_schemas() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".agentkit")).unwrap();
        let mut config = LintelConfig::default();
        config.schemas.dir = Some(dir.path().join("no-schemas"));

        let error = build_report(&ValidateArgs::default(), &config, dir.path()).unwrap_err();
        assert!(format!("{error:#}").contains("failed to load schemas"));
    }
}
