//! tierup - dependency sync and tiered release orchestrator CLI
//!
//! Keeps the livetemplate repositories pinned to each other's latest
//! releases and drives their release tier by tier.

use clap::error::ErrorKind;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tierup::applier::{ApplyOutcome, ChangeApplier};
use tierup::cli::{CliArgs, Command, ReleaseArgs, SyncArgs};
use tierup::config::Config;
use tierup::console::Console;
use tierup::oracle::{create_source, VersionOracle};
use tierup::output::{create_formatter, OutputConfig};
use tierup::sequencer::ReleaseSequencer;
use tierup::tools::{
    check_prerequisites, AutoConfirm, Confirm, GhPullRequests, Prerequisite, ScriptRelease,
    SystemGit, SystemGo, TerminalConfirm, Toolbox,
};
use tierup::update::UpdatePlanner;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if args.no_color {
        Console::set_color(false);
    }
    let console = Console::new(args.verbosity());

    match run(args, console).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            console.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs, console: Console) -> anyhow::Result<ExitCode> {
    let config = Config::load(args.config.as_deref(), args.root.as_deref())?;

    if args.verbose {
        eprintln!("tierup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Root: {}", config.workspace.root().display());
    }

    if args.needs_tools() {
        check_prerequisites(&Prerequisite::ALL)?;
    }

    let source_kind = args.source.unwrap_or(config.source);
    match &args.command {
        Command::Tiers(tiers_args) => {
            let tiers = config.registry.tiers()?;
            let formatter = create_formatter(OutputConfig::from_cli(
                tiers_args.json,
                args.verbose,
                args.quiet,
                false,
            ));
            let mut stdout = io::stdout().lock();
            formatter.format_tiers(&tiers, &mut stdout)?;
            stdout.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Sync(sync_args) => {
            let oracle = VersionOracle::new(
                create_source(source_kind)?,
                config.workspace.clone(),
                config.registry.org(),
            );
            sync(&args, sync_args, &config, &oracle, console).await
        }
        Command::Release(release_args) => {
            let oracle = VersionOracle::new(
                create_source(source_kind)?,
                config.workspace.clone(),
                config.registry.org(),
            );
            release(release_args, &config, &oracle, console).await
        }
    }
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(TerminalConfirm)
    }
}

async fn sync(
    args: &CliArgs,
    sync_args: &SyncArgs,
    config: &Config,
    oracle: &VersionOracle,
    console: Console,
) -> anyhow::Result<ExitCode> {
    let report = UpdatePlanner::new(&config.registry, oracle)
        .with_progress(console.show_progress() && !sync_args.json)
        .plan()
        .await;

    let formatter = create_formatter(OutputConfig::from_cli(
        sync_args.json,
        args.verbose,
        args.quiet,
        sync_args.dry_run,
    ));
    {
        let mut stdout = io::stdout().lock();
        formatter.format_plan(&report, &mut stdout)?;
        stdout.flush()?;
    }

    if report.plan.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let (git, go, host, release) = (
        SystemGit::new(),
        SystemGo::new(),
        GhPullRequests::new(),
        ScriptRelease::new(),
    );
    let confirm = confirmer(sync_args.yes);
    let tools = Toolbox {
        vcs: &git,
        go: &go,
        host: &host,
        release: &release,
        confirm: confirm.as_ref(),
    };

    if sync_args.dry_run {
        if !sync_args.json {
            ChangeApplier::new(tools, &config.workspace, console, true).apply_plan(&report.plan);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let prompt = format!(
        "Open pull requests for {} repositories?",
        report.plan.entries().len()
    );
    if !tools.confirm.confirm(&prompt) {
        console.info("Cancelled");
        return Ok(ExitCode::SUCCESS);
    }

    let results =
        ChangeApplier::new(tools, &config.workspace, console, false).apply_plan(&report.plan);
    let opened = results.iter().filter(|r| r.outcome.is_opened()).count();
    let unchanged = results
        .iter()
        .filter(|r| r.outcome == ApplyOutcome::NoChanges)
        .count();
    let abandoned = results.iter().filter(|r| r.outcome.is_abandoned()).count();

    console.step("Summary");
    console.info(&format!(
        "{} pull request(s), {} without changes, {} failed",
        opened, unchanged, abandoned
    ));
    Ok(ExitCode::SUCCESS)
}

async fn release(
    release_args: &ReleaseArgs,
    config: &Config,
    oracle: &VersionOracle,
    console: Console,
) -> anyhow::Result<ExitCode> {
    let (git, go, host, script) = (
        SystemGit::new(),
        SystemGo::new(),
        GhPullRequests::new(),
        ScriptRelease::new(),
    );
    let confirm = confirmer(release_args.yes);
    let tools = Toolbox {
        vcs: &git,
        go: &go,
        host: &host,
        release: &script,
        confirm: confirm.as_ref(),
    };

    let report = ReleaseSequencer::new(&config.registry, oracle, tools, console)
        .with_dry_run(release_args.dry_run)
        .run()
        .await?;

    if !report.completed {
        console.info(&format!(
            "Release stopped after {} of {} tiers",
            report.tiers.len(),
            config.registry.tiers()?.len()
        ));
    }
    Ok(ExitCode::SUCCESS)
}
