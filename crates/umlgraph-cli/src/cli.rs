//! Command-line interface for the umlgraph utility
//!
//! Validates, converts and lays out class diagrams stored as JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use umlgraph::core::logging::init_logging;
use umlgraph::hierarchy::Hierarchy;
use umlgraph::layout::{LayoutConfig, LayoutKind};
use umlgraph::model::{Diagram, RelationPolicy};
use umlgraph::render::edge_descriptors;
use umlgraph::store::{DiagramStore, StoreConfig};
use umlgraph::wire::{self, DiagramFormat};

use tracing::{debug, info, info_span};

/// umlgraph - Edit and auto-layout UML class diagrams
#[derive(Parser)]
#[command(name = "umlgraph")]
#[command(about = "Validate, convert and auto-layout UML class diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Accept relations from a class to itself
    #[arg(long, global = true)]
    pub allow_self_relations: bool,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute positions for every class and write the diagram back
    Layout {
        /// Input diagram, native or legacy JSON (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout strategy
        #[arg(long, value_enum, default_value_t = StrategyChoice::Hierarchical)]
        strategy: StrategyChoice,

        /// Width of a class box
        #[arg(long)]
        node_width: Option<f64>,

        /// Height of a class box
        #[arg(long)]
        node_height: Option<f64>,
    },

    /// Convert between the native and legacy formats
    Convert {
        /// Input diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target format
        #[arg(long, value_enum, default_value_t = FormatChoice::Native)]
        to: FormatChoice,
    },

    /// Check a diagram for dangling references and duplicate ids
    Validate {
        /// Input diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the inheritance levels of a diagram
    Levels {
        /// Input diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the edges a canvas would draw
    Edges {
        /// Input diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Subcommand name, for log spans
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Layout { .. } => "layout",
            Commands::Convert { .. } => "convert",
            Commands::Validate { .. } => "validate",
            Commands::Levels { .. } => "levels",
            Commands::Edges { .. } => "edges",
        }
    }
}

/// Layout strategies
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum StrategyChoice {
    /// Inheritance levels as rows
    #[default]
    Hierarchical,
    /// Weighted layered layout over every relation
    General,
}

impl From<StrategyChoice> for LayoutKind {
    fn from(value: StrategyChoice) -> Self {
        match value {
            StrategyChoice::Hierarchical => LayoutKind::Hierarchical,
            StrategyChoice::General => LayoutKind::General,
        }
    }
}

/// Serialized formats
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum FormatChoice {
    /// String enums with positions
    #[default]
    Native,
    /// Integer enums, no positions
    Legacy,
}

impl From<FormatChoice> for DiagramFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Native => DiagramFormat::Native,
            FormatChoice::Legacy => DiagramFormat::Legacy,
        }
    }
}

/// Main CLI application
pub struct UmlgraphApp {
    config: LayoutConfig,
    policy: RelationPolicy,
}

impl UmlgraphApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Create a new application instance with a layout config
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            policy: RelationPolicy::default(),
        }
    }

    /// Relation policy every input diagram is checked against
    pub fn with_policy(mut self, policy: RelationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Flags win; otherwise init_logging falls back to the environment
        if let Err(e) = init_logging(
            cli.log_level.map(|l| l.as_str()),
            cli.log_format.map(|f| f.as_str()),
        ) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("umlgraph v{}", env!("CARGO_PKG_VERSION"));
        }

        if cli.allow_self_relations {
            self.policy.allow_self_relations = true;
        }
        let _span = info_span!("command", name = cli.command.name()).entered();
        debug!(policy = ?self.policy, "Running command");

        match cli.command {
            Commands::Layout {
                input,
                output,
                strategy,
                node_width,
                node_height,
            } => {
                let width = node_width.unwrap_or(self.config.node_width);
                let height = node_height.unwrap_or(self.config.node_height);
                self.config = self.config.clone().with_node_size(width, height);
                self.layout_command(input, output, strategy, cli.verbose)
            }
            Commands::Convert { input, output, to } => {
                self.convert_command(input, output, to, cli.verbose)
            }
            Commands::Validate { input } => self.validate_command(input, cli.verbose),
            Commands::Levels { input } => self.levels_command(input, cli.verbose),
            Commands::Edges { input, json } => self.edges_command(input, json, cli.verbose),
        }
    }

    /// Handle the layout command
    fn layout_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        strategy: StrategyChoice,
        verbose: bool,
    ) -> Result<()> {
        let (diagram, _) = self.read_diagram(input, verbose)?;
        let laid_out = self.layout_diagram(diagram, strategy.into());
        info!(classes = laid_out.len(), strategy = ?strategy, "Layout complete");

        if verbose {
            eprintln!("Laid out {} classes ({})", laid_out.len(), LayoutKind::from(strategy));
        }

        // Legacy records have no positions, so layout output is always native
        let json = wire::to_json(&laid_out).context("Failed to write diagram")?;
        self.write_output(output, &json)
    }

    /// Run a layout strategy over a diagram
    pub fn layout_diagram(&self, diagram: Diagram, kind: LayoutKind) -> Diagram {
        let config = StoreConfig {
            layout: self.config.clone(),
            policy: diagram.policy(),
            default_layout: kind,
        };
        let mut store = DiagramStore::with_config(diagram, config);
        store.apply_layout(kind);
        store.into_diagram()
    }

    /// Handle the convert command
    fn convert_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        to: FormatChoice,
        verbose: bool,
    ) -> Result<()> {
        let (diagram, from) = self.read_diagram(input, verbose)?;
        let target = DiagramFormat::from(to);

        if verbose {
            eprintln!("Converting {} diagram to {}", from, target);
        }

        let converted = wire::write(&diagram, target)
            .with_context(|| format!("Failed to write {} diagram", target))?;
        info!(%from, to = %target, classes = diagram.len(), "Converted diagram");
        self.write_output(output, &converted)
    }

    /// Handle the validate command
    fn validate_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match wire::read_any_with(&content, self.policy) {
            Ok((diagram, format)) => {
                println!("✓ Valid {} diagram ({} classes)", format, diagram.len());
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "Validation failed");
                println!("✗ Invalid diagram: {}", e);
                Err(anyhow!(e))
            }
        }
    }

    /// Handle the levels command
    fn levels_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let (diagram, _) = self.read_diagram(input, verbose)?;
        print!("{}", Self::format_levels(&diagram));
        io::stdout().flush()?;
        Ok(())
    }

    /// One line per level: `level N: Name, Name`
    pub fn format_levels(diagram: &Diagram) -> String {
        let hierarchy = Hierarchy::analyze(diagram.classes());
        let mut out = String::new();
        for (level, ids) in hierarchy.levels().iter().enumerate() {
            let names: Vec<&str> = ids
                .iter()
                .filter_map(|id| diagram.class(id.as_str()))
                .map(|class| class.name.as_str())
                .collect();
            out.push_str(&format!("level {}: {}\n", level, names.join(", ")));
        }
        out
    }

    /// Handle the edges command
    fn edges_command(&self, input: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
        let (diagram, _) = self.read_diagram(input, verbose)?;
        println!("{}", Self::format_edges(&diagram, json)?);
        Ok(())
    }

    /// Edge listing as pretty JSON or one `source -kind-> target` line per edge
    pub fn format_edges(diagram: &Diagram, json: bool) -> Result<String> {
        let edges = edge_descriptors(diagram);
        if json {
            return Ok(serde_json::to_string_pretty(&edges)?);
        }

        let lines: Vec<String> = edges
            .iter()
            .map(|edge| {
                format!(
                    "{} -{}-> {}",
                    edge.source_id,
                    edge.label.replace('\n', " "),
                    edge.target_id
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn read_diagram(
        &self,
        input: Option<PathBuf>,
        verbose: bool,
    ) -> Result<(Diagram, DiagramFormat)> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let (diagram, format) =
            wire::read_any_with(&content, self.policy).context("Failed to read diagram")?;
        debug!(%format, classes = diagram.len(), "Read diagram");
        Ok((diagram, format))
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .with_context(|| format!("Failed to read input file '{}'", path.display())),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).with_context(|| {
                    format!("Failed to write output file '{}'", path.display())
                })?;
            }
            _ => {
                if content.is_empty() || content.ends_with('\n') {
                    print!("{}", content);
                } else {
                    println!("{}", content);
                }
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for UmlgraphApp {
    fn default() -> Self {
        Self::new()
    }
}
