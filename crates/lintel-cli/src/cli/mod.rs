use clap::{Args, Parser, Subcommand};

pub mod global;

pub use global::{GlobalFlags, OutputFormat};

/// Top-level CLI parser for the `lintel` binary.
#[derive(Debug, Parser)]
#[command(name = "lintel", version, about = "Lint agent framework repositories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: text, json
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Quiet mode (errors only in logs)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging, full warning and info lists)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate framework integrity
    Validate(ValidateArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ValidateArgs {
    /// Always run the full analysis, ignoring `analysis.use_cache`
    #[arg(long)]
    pub no_cache: bool,

    /// Limit insights to these agents (repeatable)
    #[arg(long = "agent", value_name = "NAME")]
    pub agents: Vec<String>,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_text() {
        let cli = Cli::try_parse_from(["lintel", "validate"]).expect("cli should parse");
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.verbose);
        assert!(cli.project.is_none());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lintel", "validate", "-v", "--format", "json", "--project", "/tmp/repo",
        ])
        .expect("cli should parse");

        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.global_flags().project.as_deref(), Some("/tmp/repo"));
    }

    #[test]
    fn validate_args() {
        let cli = Cli::try_parse_from([
            "lintel", "validate", "--no-cache", "--agent", "dev", "--agent", "qa",
        ])
        .expect("cli should parse");
        let Commands::Validate(args) = cli.command;
        assert!(args.no_cache);
        assert_eq!(args.agents, vec!["dev".to_string(), "qa".to_string()]);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["lintel", "validate", "--format", "yaml"]).is_err());
    }
}
