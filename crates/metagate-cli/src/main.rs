use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use metagate_core::config::Config;
use metagate_core::gate::console::ConsoleSurface;
use metagate_core::gate::surface::{PresentationSurface, select_surface};
use metagate_core::git::GitRepo;
use metagate_core::history::annotate::{CommitMessageStore, InMemoryCommitStore, audit_block};
use metagate_core::hook::{self, PushUpdate, is_zero_sha};
use metagate_core::orchestrator::{Interaction, Mode};
use metagate_core::report::model::{Report, ToolInfo};
use metagate_core::report::render::{self, OutputFormat};
use metagate_core::repo::classify::RepoContext;
use metagate_core::rules::catalog::reference_text;
use metagate_core::{TOOL_NAME, run};

mod args;

use args::Command;

const LOG_ENV: &str = "METAGATE_LOG";

fn main() -> Result<()> {
    let args = args::Args::parse();
    init_tracing(args.verbose);

    let cwd = std::env::current_dir().unwrap_or_else(|err| {
        warn!(error = %err, "cannot read current directory");
        PathBuf::from(".")
    });
    let git = match &args.repo {
        Some(root) => GitRepo::new(cwd.join(root)),
        None => GitRepo::discover(&cwd).unwrap_or_else(|err| {
            info!(error = %err, "not inside a git work tree, using current directory");
            GitRepo::new(&cwd)
        }),
    };
    let name = args.name.clone().unwrap_or_else(|| git.name());
    let ctx = RepoContext::new(git.root(), name);
    let config = Config::load(args.config.as_deref(), git.root());
    let in_scope = ctx.category.in_scope();

    let tool = ToolInfo {
        name: TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let report = match &args.command {
        Command::PrintConfig => return emit(args.out.as_deref(), &config.to_yaml()?),
        Command::Rules => return emit(args.out.as_deref(), &reference_text()),
        Command::Identify => run(&ctx, &config, &Mode::IdentifyOnly, None, tool),
        Command::FindMeta => run(&ctx, &config, &Mode::FindMeta, None, tool),
        Command::Check => run(&ctx, &config, &Mode::ComplianceOnly, None, tool),
        Command::Files { paths, interactive } => {
            let files = paths.iter().map(|p| ctx.root.join(p)).collect();
            let mode = Mode::Files {
                files,
                interactive: *interactive,
            };
            enforce(&args, &ctx, &config, &git, &mode, false, tool)
        }
        Command::Staged | Command::PreCommit => {
            // Advisory: a git failure leaves nothing to check, never a blocked commit.
            let files = if in_scope {
                git.staged_files().unwrap_or_else(|err| {
                    warn!(error = %err, "cannot list staged files");
                    Vec::new()
                })
            } else {
                Vec::new()
            };
            run(&ctx, &config, &Mode::StagedFiles { files }, None, tool)
        }
        Command::Range {
            from,
            to,
            interactive,
            dry_run,
        } => {
            let files = if in_scope {
                git.changed_between(from, to)
                    .with_context(|| format!("cannot diff {from}..{to}"))?
            } else {
                Vec::new()
            };
            let mode = Mode::CommitRange {
                files,
                interactive: *interactive,
            };
            enforce(&args, &ctx, &config, &git, &mode, *dry_run, tool)
        }
        Command::PrePush {
            remote,
            url,
            dry_run,
        } => {
            info!(
                remote = remote.as_deref().unwrap_or(""),
                url = url.as_deref().unwrap_or(""),
                "pre-push hook"
            );
            let mut input = String::new();
            if let Err(err) = std::io::stdin().read_to_string(&mut input) {
                warn!(error = %err, "cannot read push lines from stdin");
            }
            let updates = hook::parse_push_lines(&input);
            let files = if in_scope {
                warn_if_not_head(&git, &updates);
                hook::changed_files(&git, &updates)
            } else {
                Vec::new()
            };
            let mode = Mode::CommitRange {
                files,
                interactive: true,
            };
            let report = enforce(&args, &ctx, &config, &git, &mode, *dry_run, tool);
            if report.verdict.annotated && !*dry_run {
                warn!("override note amended onto a new HEAD commit; push again to publish it");
            }
            report
        }
    };

    let format = match args.format {
        Some(args::OutputFormat::Json) => OutputFormat::Json,
        Some(args::OutputFormat::Text) => OutputFormat::Text,
        None => config.output.format,
    };
    let output = match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text if config.output.verbose => {
            format!("{}\nRules:\n{}", render::render_text(&report), reference_text())
        }
        OutputFormat::Text => render::render_text(&report),
    };
    if let Err(err) = emit(args.out.as_deref(), &output) {
        warn!(error = %err, "cannot write report");
    }

    std::process::exit(report.verdict.exit_code);
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run an enforcing mode, wiring a prompt and commit store when it is interactive.
fn enforce(
    args: &args::Args,
    ctx: &RepoContext,
    config: &Config,
    git: &GitRepo,
    mode: &Mode,
    dry_run: bool,
    tool: ToolInfo,
) -> Report {
    let interactive = matches!(
        mode,
        Mode::Files {
            interactive: true,
            ..
        } | Mode::CommitRange {
            interactive: true,
            ..
        }
    );
    if !interactive || !ctx.category.in_scope() {
        return run(ctx, config, mode, None, tool);
    }

    let mut surface: Box<dyn PresentationSurface> = if args.stdin_prompt {
        Box::new(ConsoleSurface::stdio())
    } else {
        select_surface(!args.no_gui)
    };
    let report = if dry_run {
        let mut store = InMemoryCommitStore::new(git.head_message().unwrap_or_default());
        let mut interaction = Interaction {
            surface: surface.as_mut(),
            store: &mut store,
        };
        let report = run(ctx, config, mode, Some(&mut interaction), tool);
        if store.amendments > 0 {
            eprintln!("{}", store.message);
        }
        report
    } else {
        let mut store = git.clone();
        let mut interaction = Interaction {
            surface: surface.as_mut(),
            store: &mut store,
        };
        run(ctx, config, mode, Some(&mut interaction), tool)
    };

    if let Some(justification) = &report.verdict.justification {
        if !report.verdict.annotated {
            warn!("override not recorded in the commit message; add this note manually");
            eprintln!("{}", audit_block(justification, &report.findings));
        }
    }
    report
}

/// The audit note is amended onto HEAD after git has fixed the ids being
/// pushed, so it never travels with the current push. Pushes of commits
/// other than HEAD are flagged as well, since the note describes HEAD.
fn warn_if_not_head(git: &GitRepo, updates: &[PushUpdate]) {
    let Ok(head) = git.head_commit() else {
        return;
    };
    for update in updates.iter().filter(|u| !is_zero_sha(&u.local_sha)) {
        if update.local_sha != head {
            warn!(
                local_ref = %update.local_ref,
                "pushed commit is not HEAD; an override note is amended onto HEAD, not the pushed commit"
            );
        }
    }
}

fn emit(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?
        }
        None => print!("{text}"),
    }
    Ok(())
}
