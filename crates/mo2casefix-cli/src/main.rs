use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use mo2casefix::diagnose::{CaseDiagnosis, PluginSetting, PluginSettings};
use mo2casefix::instance::{resolve_instance_root, Instance};
use mo2casefix::{first_inconsistency, FixSummary, Organizer};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mo2-casefix",
    version,
    about = "Find and fix inconsistent path capitalization in MO2 mods"
)]
struct Cli {
    /// Instance directory or global instance name (defaults to the last-used instance).
    #[arg(short, long)]
    instance: Option<String>,

    /// Game data directory, if it differs from `<gamePath>/Data`.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Check mods and game data for inconsistent capitalization.
    Check,
    /// Rename paths in every mod to lower case or to the game's casing.
    Fix,
    /// Fix a single mod.
    FixMod(ModArgs),
    /// Run the post-install hook for a mod (honours the auto-rename setting).
    Installed(ModArgs),
    /// Run the pre-launch check. Exits with 1 if launch should be blocked.
    PreLaunch(PreLaunchArgs),
    /// List active problems.
    Problems(JsonArgs),
    /// Show plugin settings and their current values.
    Settings(JsonArgs),
}

#[derive(Parser)]
struct ModArgs {
    /// Mod name (case-insensitive).
    name: String,
}

#[derive(Parser)]
struct PreLaunchArgs {
    /// Executable about to be launched.
    #[arg(default_value = "")]
    executable: String,
}

#[derive(Parser)]
struct JsonArgs {
    /// Print as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SettingsReport {
    settings: Vec<PluginSetting>,
    current: PluginSettings,
}

#[derive(Serialize)]
struct ProblemReport {
    key: u32,
    short_description: &'static str,
    full_description: &'static str,
    has_guided_fix: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let root = resolve_instance_root(cli.instance.as_deref())?;
    let instance = Instance::load(&root, cli.data_dir)?;
    tracing::debug!(
        "Loaded instance {:?} ({}), data directory {:?}",
        instance.root,
        instance.game_name().unwrap_or("unknown game"),
        instance.data_dir
    );
    let diagnosis = CaseDiagnosis::new(instance);

    match cli.command {
        SubCommand::Check => check(&diagnosis),
        SubCommand::Fix => Ok(report_fix(&diagnosis.fix_inconsistent_paths()?)),
        SubCommand::FixMod(args) => fix_mod(&diagnosis, &args.name),
        SubCommand::Installed(args) => installed(&diagnosis, &args.name),
        SubCommand::PreLaunch(args) => {
            if diagnosis.on_about_to_run(&args.executable) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        SubCommand::Problems(args) => problems(&diagnosis, args.json),
        SubCommand::Settings(args) => settings(&diagnosis, args.json),
    }
}

fn settings(diagnosis: &CaseDiagnosis<Instance>, json: bool) -> Result<ExitCode> {
    let report = SettingsReport {
        settings: diagnosis.settings(),
        current: diagnosis.organizer().plugin_settings(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    for setting in &report.settings {
        let Some(value) = report.current.value(setting.key) else {
            continue;
        };
        println!(
            "{} = {} (default {})\n    {}",
            setting.key, value, setting.default_value, setting.description
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn check(diagnosis: &CaseDiagnosis<Instance>) -> Result<ExitCode> {
    let organizer = diagnosis.organizer();
    match first_inconsistency(&organizer.mods()?, &organizer.game_data_directory()) {
        Some(found) => {
            println!(
                "Inconsistent capitalization: {} and {} (in {})",
                found.first_seen,
                found.conflicting,
                found.root.display()
            );
            Ok(ExitCode::FAILURE)
        }
        None => {
            println!("No inconsistent paths found.");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn report_fix(summary: &FixSummary) -> ExitCode {
    println!("Renamed {} path(s).", summary.renamed);
    for (name, e) in &summary.failed {
        eprintln!("{name}: {e}");
    }
    if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn fix_mod(diagnosis: &CaseDiagnosis<Instance>, name: &str) -> Result<ExitCode> {
    let Some(mod_tree) = diagnosis.organizer().find_mod(name)? else {
        bail!("Mod '{name}' not found");
    };
    let renamed = diagnosis.rename_mod_paths(&mod_tree)?;
    println!("Renamed {renamed} path(s) in '{}'.", mod_tree.name);
    Ok(ExitCode::SUCCESS)
}

fn installed(diagnosis: &CaseDiagnosis<Instance>, name: &str) -> Result<ExitCode> {
    let Some(mod_tree) = diagnosis.organizer().find_mod(name)? else {
        bail!("Mod '{name}' not found");
    };
    match diagnosis.on_mod_installed(&mod_tree) {
        None => println!("Automatic renaming is disabled in plugin settings."),
        Some(result) => {
            let renamed = result?;
            println!("Renamed {renamed} path(s) in '{}'.", mod_tree.name);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn problems(diagnosis: &CaseDiagnosis<Instance>, json: bool) -> Result<ExitCode> {
    let mut reports = Vec::new();
    for key in diagnosis.active_problems() {
        reports.push(ProblemReport {
            key,
            short_description: diagnosis.short_description(key)?,
            full_description: diagnosis.full_description(key)?,
            has_guided_fix: diagnosis.has_guided_fix(key)?,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if reports.is_empty() {
        println!("No problems found.");
    } else {
        for report in &reports {
            println!("[{}] {}", report.key, report.short_description);
            println!("    {}", report.full_description);
            if report.has_guided_fix {
                println!("    Run `mo2-casefix fix` to fix automatically.");
            }
        }
    }

    Ok(if reports.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
