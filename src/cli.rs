use bomgraph::ports::outbound::{AnalyzerOption, OptionKind, OptionResolver};
use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, Parser};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Build one dependency graph across .NET, npm and Poetry projects
#[derive(Parser, Debug)]
#[command(name = "bomgraph")]
#[command(about = "Build one dependency graph across .NET, npm and Poetry projects", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Args {
    /// Project directory or single manifest file (defaults to current directory)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file path; `-` writes to stdout (defaults to <root>/<name>.bomgraph.json)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Name recorded in the BOM
    #[arg(long)]
    pub name: Option<String>,

    /// Version recorded in the BOM
    #[arg(long = "version", value_name = "VERSION")]
    pub bom_version: Option<String>,

    /// Extra metadata entry, repeatable: --metadata team=payments
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,

    /// Skip paths matching patterns, relative to the input directory
    /// Can be specified multiple times: -e "vendor" -e "**/fixtures"
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Configuration file (defaults to bomgraph.config.yml in the input directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Static arguments plus one argument per analyzer option.
    pub fn command_with(options: &[AnalyzerOption]) -> Command {
        options.iter().fold(Args::command(), |command, option| {
            let arg = Arg::new(option.name).long(option.name).help(option.help);
            let arg = match option.kind {
                OptionKind::Flag => arg.action(ArgAction::SetTrue),
                OptionKind::Value => arg.action(ArgAction::Set).value_name("VALUE"),
            };
            command.arg(arg)
        })
    }

    /// Parses the process arguments; exits with code 2 on invalid input.
    pub fn parse_with(options: &[AnalyzerOption]) -> (Self, CliOptions) {
        let matches = Self::command_with(options).get_matches();
        Self::from_matches(&matches, options).unwrap_or_else(|e| e.exit())
    }

    pub fn from_matches(
        matches: &ArgMatches,
        options: &[AnalyzerOption],
    ) -> Result<(Self, CliOptions), clap::Error> {
        let args = Args::from_arg_matches(matches)?;
        Ok((args, CliOptions::from_matches(matches, options)))
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Invalid metadata '{}': expected KEY=VALUE", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid metadata '{}': key cannot be empty", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Analyzer option values resolved from the command line
#[derive(Debug, Default, Clone)]
pub struct CliOptions {
    flags: HashSet<String>,
    values: HashMap<String, String>,
}

impl CliOptions {
    fn from_matches(matches: &ArgMatches, options: &[AnalyzerOption]) -> Self {
        let mut resolved = CliOptions::default();
        for option in options {
            match option.kind {
                OptionKind::Flag => {
                    if matches.get_flag(option.name) {
                        resolved.flags.insert(option.name.to_string());
                    }
                }
                OptionKind::Value => {
                    if let Some(value) = matches.get_one::<String>(option.name) {
                        resolved.values.insert(option.name.to_string(), value.clone());
                    }
                }
            }
        }
        resolved
    }
}

impl OptionResolver for CliOptions {
    fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    fn value(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
