pub mod config;
pub mod error;
pub mod gate;
pub mod git;
pub mod history;
pub mod hook;
pub mod meta;
pub mod orchestrator;
pub mod report;
pub mod repo;
pub mod rules;
pub mod util;

use crate::config::Config;
use crate::orchestrator::{Interaction, Mode, Orchestrator};
use crate::report::model::{Report, ToolInfo};
use crate::repo::classify::RepoContext;

pub const TOOL_NAME: &str = "metagate";

/// JSON schema version of metagate reports.
/// Bump only when the report shape changes semantically.
pub const SCHEMA_VERSION: &str = "0.1.0";

pub const RULE_CATALOG_VERSION: &str = "0.1.0";

/// Run one mode against a repository and build its report.
pub fn run(
    ctx: &RepoContext,
    config: &Config,
    mode: &Mode,
    interaction: Option<&mut Interaction<'_>>,
    tool: ToolInfo,
) -> Report {
    let outcome = Orchestrator::new(ctx, config).run(mode, interaction);
    Report::new(tool, ctx, outcome)
}
