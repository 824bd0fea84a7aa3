use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "devroute",
    version,
    about = "Devroute - route code problems to the right handler",
    long_about = "Devroute classifies a piece of code, ranks the registered handlers against the problem it shows, and learns from the outcomes handlers report back."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the problem a file presents
    #[command(about = "Classify the problem a source file presents")]
    Classify(SourceArgs),

    /// Classify and pick handlers
    #[command(about = "Classify a source file and rank handlers for it")]
    Route(SourceArgs),

    /// Report how a handler did
    #[command(about = "Report the outcome of a handler action so it can be learned from")]
    Outcome(OutcomeArgs),

    /// Suggestions from learned patterns
    #[command(about = "Show suggestions learned for a scenario")]
    Suggest(SuggestArgs),

    /// Show decision and learning statistics
    Stats,

    /// List registered handlers
    Handlers,

    /// Turn learning on or off
    #[command(name = "toggle-learning")]
    ToggleLearning,

    /// Turn orchestration on or off
    #[command(name = "toggle-orchestration")]
    ToggleOrchestration,

    /// Set the learning mode (adaptive, static, training)
    Mode {
        #[arg(help = "Learning mode: adaptive, static or training")]
        mode: String,
    },

    /// Learn patterns from workspace files (training mode only)
    #[command(about = "Harvest patterns from workspace files; requires training mode")]
    Harvest(HarvestArgs),

    /// Forget all learned patterns and counters
    #[command(name = "reset-learning")]
    ResetLearning,
}

#[derive(Parser, Debug)]
pub struct SourceArgs {
    /// Source file to examine; a missing file is treated as empty
    #[arg(help = "Path to the source file")]
    pub file: PathBuf,

    /// Requested action, e.g. create-component
    #[arg(short, long)]
    pub action: Option<String>,

    /// Component type passed as context
    #[arg(long)]
    pub component: Option<String>,

    /// Free-form description passed as context
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("result").required(true).args(["success", "failure"])))]
pub struct OutcomeArgs {
    /// Handler that performed the action
    pub handler: String,

    /// Action type, e.g. auto-fix, component-creation, music-analysis, orchestration
    pub action_type: String,

    #[arg(long)]
    pub success: bool,

    #[arg(long)]
    pub failure: bool,

    #[arg(long)]
    pub file: Option<String>,

    #[arg(long)]
    pub component: Option<String>,

    /// Code before the change
    #[arg(long)]
    pub before: Option<String>,

    /// Code after the change
    #[arg(long)]
    pub after: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Problem type the handler was routed for
    #[arg(long)]
    pub problem_type: Option<String>,

    #[arg(long)]
    pub confidence: Option<f32>,
}

#[derive(Parser, Debug)]
pub struct SuggestArgs {
    /// Scenario tag or source to match, e.g. auto-fix
    pub scenario: String,

    /// Code the suggestions are for
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct HarvestArgs {
    /// Workspace root
    pub root: PathBuf,

    /// Glob relative to the root, e.g. "src/**/*.tsx"
    pub glob: String,
}
