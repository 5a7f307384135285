mod commands;

use anyhow::{anyhow, Context as _};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Parser;
use commands::{Cli, Commands, PolecatCommands, RigCommands, SwarmCommands};
use gastown::config::{validate_config_result, GastownConfig};
use gastown::polecat::{Polecat, PolecatManager, PolecatState};
use gastown::rig::Rig;
use gastown::swarm::SwarmManager;
use std::path::{Path, PathBuf};
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD: &str = match option_env!("GT_BUILD") {
    Some(build) => build,
    None => "dev",
};

fn main() {
    // Initialize logging
    if let Err(e) = gastown::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> gastown::Result<()> {
    let config_file = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(GastownConfig::default_path);

    match cli.command {
        Commands::Version { short, verbose } => {
            print_version(short, verbose);
            Ok(())
        }
        Commands::Rig(cmd) => handle_rig_command(cmd, &config_file),
        Commands::Polecat(cmd) => {
            let config = GastownConfig::load_or_default(Some(config_file.as_path()))?;
            let rig = resolve_rig(&config, cli.rig.as_deref())?;
            let manager = PolecatManager::with_git2(rig)
                .with_strict_delete(config.swarm.strict_delete);
            handle_polecat_command(cmd, &manager)
        }
        Commands::Swarm(cmd) => {
            let config = GastownConfig::load_or_default(Some(config_file.as_path()))?;
            let rig = resolve_rig(&config, cli.rig.as_deref())?;
            let manager = PolecatManager::with_git2(rig)
                .with_strict_delete(config.swarm.strict_delete);
            handle_swarm_command(cmd, &SwarmManager::from_manager(manager))
        }
    }
}

/// Pick the rig named on the command line, or the only configured rig
fn resolve_rig(config: &GastownConfig, name: Option<&str>) -> anyhow::Result<Rig> {
    match name {
        Some(name) => config.get_rig(name).cloned().ok_or_else(|| {
            anyhow!(
                "Rig '{}' is not configured. Add it with:\n  gt rig add {} <path> <url>",
                name,
                name
            )
        }),
        None => match config.rigs.as_slice() {
            [rig] => Ok(rig.clone()),
            [] => Err(anyhow!(
                "No rigs configured. Add one with:\n  gt rig add <name> <path> <url>"
            )),
            rigs => Err(anyhow!(
                "Several rigs configured ({}). Choose one with --rig or GT_RIG",
                rigs.iter()
                    .map(|r| r.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        },
    }
}

fn handle_rig_command(cmd: RigCommands, config_file: &Path) -> gastown::Result<()> {
    let mut config = GastownConfig::load_or_default(Some(config_file))?;

    match cmd {
        RigCommands::Add { name, path, url } => {
            if config.get_rig(&name).is_some() {
                return Err(gastown::GastownError::Config(format!(
                    "Rig '{}' already exists",
                    name
                )));
            }

            let mut path = PathBuf::from(path);
            if path.is_relative() {
                path = std::env::current_dir()
                    .context("resolving rig path")?
                    .join(path);
            }

            let rig = Rig::builder().name(&name).path(path).git_url(url).build()?;
            config.add_rig(rig);
            validate_config_result(&config)?;
            config.save(config_file)?;

            println!("Added rig '{}'", name);
        }
        RigCommands::List => {
            if config.rigs.is_empty() {
                println!("No rigs configured.");
                return Ok(());
            }
            for rig in &config.rigs {
                println!("{:<16} {}  ({})", rig.name, rig.path.display(), rig.git_url);
            }
        }
        RigCommands::Remove { name } => {
            if config.remove_rig(&name).is_none() {
                return Err(gastown::GastownError::Config(format!(
                    "Rig '{}' not found",
                    name
                )));
            }
            config.save(config_file)?;
            println!("Removed rig '{}'", name);
        }
    }

    Ok(())
}

fn handle_polecat_command(cmd: PolecatCommands, manager: &PolecatManager) -> gastown::Result<()> {
    match cmd {
        PolecatCommands::Add { name } => {
            let polecat = manager.create(&name)?;
            println!(
                "Created polecat '{}' on branch {} at {}",
                polecat.name,
                polecat.branch,
                polecat.clone_path.display()
            );
        }
        PolecatCommands::Remove { name } => {
            manager.delete(&name)?;
            println!("Removed polecat '{}'", name);
        }
        PolecatCommands::List { json } => {
            let polecats = manager.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&polecats)?);
            } else if polecats.is_empty() {
                println!("No polecats in rig '{}'.", manager.rig().name);
            } else {
                for polecat in &polecats {
                    print_polecat_summary(polecat);
                }
            }
        }
        PolecatCommands::Show { name, json } => {
            let polecat = manager.get(&name)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&polecat)?);
            } else {
                print_polecat_detailed(&polecat);
            }
        }
        PolecatCommands::Wake { name } => print_transition(&manager.wake(&name)?),
        PolecatCommands::Sleep { name } => print_transition(&manager.sleep(&name)?),
        PolecatCommands::Assign { name, issue } => {
            print_transition(&manager.assign_issue(&name, &issue)?)
        }
        PolecatCommands::Clear { name } => print_transition(&manager.clear_issue(&name)?),
        PolecatCommands::State { name, state } => {
            print_transition(&manager.set_state(&name, state)?)
        }
    }

    Ok(())
}

fn handle_swarm_command(cmd: SwarmCommands, swarm: &SwarmManager) -> gastown::Result<()> {
    match cmd {
        SwarmCommands::Assign { issue } => {
            let polecat = swarm.assign_next(&issue)?;
            println!("Assigned {} to polecat '{}'", issue, polecat.name);
        }
        SwarmCommands::Release { name } => print_transition(&swarm.release(&name)?),
        SwarmCommands::Stuck { name } => print_transition(&swarm.mark_stuck(&name)?),
        SwarmCommands::Done { name } => print_transition(&swarm.mark_done(&name)?),
        SwarmCommands::Status { json } => {
            let status = swarm.status()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
                return Ok(());
            }

            println!("Rig:        {}", status.rig);
            println!("Polecats:   {}", status.total);
            println!("Available:  {}", status.available());
            for state in PolecatState::ALL {
                println!("  {:<9} {}", state.as_str(), status.count(state));
            }
            if !status.polecats.is_empty() {
                println!();
                for summary in &status.polecats {
                    println!(
                        "{:<16} {:<8} {}",
                        summary.name,
                        summary.state.as_str(),
                        summary.issue.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_transition(polecat: &Polecat) {
    match polecat.issue {
        Some(ref issue) => println!("{} is now {} ({})", polecat.name, polecat.state, issue),
        None => println!("{} is now {}", polecat.name, polecat.state),
    }
}

fn print_polecat_summary(polecat: &Polecat) {
    println!(
        "{:<16} {:<8} {}",
        polecat.name,
        polecat.state.as_str(),
        polecat.issue.as_deref().unwrap_or("-")
    );
}

fn print_polecat_detailed(polecat: &Polecat) {
    println!("{}", polecat.name);
    println!("Rig:          {}", polecat.rig);
    println!("State:        {}", polecat.state);
    println!("Branch:       {}", polecat.branch);
    println!("Workspace:    {}", polecat.clone_path.display());
    if let Some(ref issue) = polecat.issue {
        println!("Issue:        {}", issue);
    }
    if let Some(created) = polecat.created_at {
        println!("Created:      {}", created.to_rfc3339());
    }
    if let Some(updated) = polecat.updated_at {
        println!("Updated:      {}", updated.to_rfc3339());
    }
}

fn print_version(short: bool, verbose: bool) {
    for line in version_lines(short, verbose, Utc::now()) {
        println!("{}", line);
    }
}

fn version_lines(short: bool, verbose: bool, now: DateTime<Utc>) -> Vec<String> {
    if short {
        return vec![format!("{}-{}", VERSION, BUILD)];
    }

    let mut lines = vec![format!("gt version {} ({})", VERSION, BUILD)];
    if !verbose {
        return lines;
    }

    if let Some(commit) = option_env!("GT_COMMIT") {
        lines.push(format!("Commit: {}", commit));
    }
    if let Some(branch) = option_env!("GT_BRANCH") {
        lines.push(format!("Branch: {}", branch));
    }
    lines.push(format!(
        "Timestamp: {}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    if let Some(target) = option_env!("GT_TARGET") {
        lines.push(format!("Target: {}", target));
    }
    lines
}
