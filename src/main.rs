use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use dialoguer::Input;
use sharesync::reconciliation::{
    build_reconciliation_plan, execute_reconciliation, ConsolePrompt, FollowUpLog,
    ReconcileOptions,
};
use sharesync::utils::FOLLOW_UP_FILE;
use sharesync::{ClassificationCounts, ConfigStore, SyncProfile};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Sharesync - reconcile two mirrored directory trees
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Logging verbosity
    #[arg(long, value_enum, default_value_t = Verbosity::Info)]
    verbosity: Verbosity,

    /// Path to the config file (defaults to ~/.sharesync/config.json)
    #[arg(long, env = "SHARESYNC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or replace a sync profile
    Setup {
        /// Profile name (e.g. client name)
        #[arg(long)]
        name: Option<String>,
        /// Root directory of the left tree
        #[arg(long)]
        left_dir: Option<PathBuf>,
        /// Root directory of the right tree
        #[arg(long)]
        right_dir: Option<PathBuf>,
        /// Name shown for the left tree
        #[arg(long, default_value = "left")]
        left_label: String,
        /// Name shown for the right tree (defaults to the profile name)
        #[arg(long)]
        right_label: Option<String>,
    },
    /// Reconcile the two trees of a profile
    Sync {
        profile: String,
        /// Where declined and failed items are recorded
        #[arg(long)]
        follow_up_file: Option<PathBuf>,
        /// Only print the summary, do not prompt or change anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List configured profiles and exclusions
    Profiles,
    /// Remove a profile
    RemoveProfile { name: String },
    /// Exclude a directory name from every sync
    ExcludeDir { dir_name: String },
    /// Exclude a file name from every sync
    ExcludeFile { file_name: String },
    /// Stop excluding a directory name
    IncludeDir { dir_name: String },
    /// Stop excluding a file name
    IncludeFile { file_name: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Verbosity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Verbosity {
    fn directive(self) -> &'static str {
        match self {
            Verbosity::Debug => "debug",
            Verbosity::Info => "info",
            Verbosity::Warning => "warn",
            Verbosity::Error => "error",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_env("SHARESYNC_LOG")
        .unwrap_or_else(|_| EnvFilter::new(args.verbosity.directive()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = match args.config {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::default_location()?,
    };
    debug!("Using config {}", store.path().display());

    match args.command {
        Command::Setup {
            name,
            left_dir,
            right_dir,
            left_label,
            right_label,
        } => {
            let name = match name {
                Some(name) => name,
                None => ask("Profile name (e.g. client name)")?,
            };
            let left_dir = match left_dir {
                Some(dir) => dir,
                None => PathBuf::from(ask("Root directory of the left tree")?),
            };
            let right_dir = match right_dir {
                Some(dir) => dir,
                None => PathBuf::from(ask("Root directory of the right tree")?),
            };
            let right_label = right_label.unwrap_or_else(|| name.clone());

            let profile = SyncProfile::new(left_dir, right_dir).with_labels(left_label, right_label);
            store.save_profile(&name, profile).await?;
            println!("Profile '{}' saved successfully.", name);
        }
        Command::Sync {
            profile,
            follow_up_file,
            dry_run,
        } => sync(&store, &profile, follow_up_file, dry_run).await?,
        Command::Profiles => {
            let profiles = store.list_profiles().await?;
            if profiles.is_empty() {
                println!("No profiles configured. Run 'setup' first.");
            }
            for (name, profile) in &profiles {
                println!(
                    "{}: {} ({}) <-> {} ({})",
                    style(name).bold(),
                    profile.left_dir.display(),
                    profile.left_label,
                    profile.right_dir.display(),
                    profile.right_label
                );
            }
            let exclusions = store.load_exclusion_set().await?;
            if !exclusions.is_empty() {
                println!("Excluded directories: {:?}", exclusions.excluded_dirs);
                println!("Excluded files: {:?}", exclusions.excluded_files);
            }
        }
        Command::RemoveProfile { name } => {
            store.remove_profile(&name).await?;
            println!("Profile '{}' removed.", name);
        }
        Command::ExcludeDir { dir_name } => {
            if store.exclude_dir(&dir_name).await? {
                println!("Directory '{}' added to exclusion list.", dir_name);
            } else {
                println!("Directory '{}' is already excluded.", dir_name);
            }
        }
        Command::ExcludeFile { file_name } => {
            if store.exclude_file(&file_name).await? {
                println!("File '{}' added to exclusion list.", file_name);
            } else {
                println!("File '{}' is already excluded.", file_name);
            }
        }
        Command::IncludeDir { dir_name } => {
            if store.include_dir(&dir_name).await? {
                println!("Directory '{}' removed from exclusion list.", dir_name);
            } else {
                println!("Directory '{}' was not excluded.", dir_name);
            }
        }
        Command::IncludeFile { file_name } => {
            if store.include_file(&file_name).await? {
                println!("File '{}' removed from exclusion list.", file_name);
            } else {
                println!("File '{}' was not excluded.", file_name);
            }
        }
    }

    Ok(())
}

async fn sync(
    store: &ConfigStore,
    profile_name: &str,
    follow_up_file: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let config = store.read().await?;
    let profile = store.load_profile(profile_name).await?;
    let roots = profile.roots();
    let options = ReconcileOptions {
        fingerprint_workers: config.fingerprint_workers,
    };

    let plan = build_reconciliation_plan(&roots, &config.exclusions, &options)
        .await
        .with_context(|| format!("Cannot sync profile '{}'", profile_name))?;

    let counts = plan.counts();
    print_summary(&counts, &roots.left.label, &roots.right.label);

    if plan.is_in_sync() {
        info!("{} and {} are already in sync.", roots.left.label, roots.right.label);
        return Ok(());
    }
    if dry_run {
        let skipped = plan.warnings().count();
        if skipped > 0 {
            warn!("- {} entries were skipped during the scan.", skipped);
        }
        return Ok(());
    }

    let follow_up_path = follow_up_file
        .or(config.follow_up_file)
        .unwrap_or_else(|| PathBuf::from(FOLLOW_UP_FILE));
    let follow_up = FollowUpLog::new(follow_up_path);

    let summary = execute_reconciliation(&plan, &ConsolePrompt, &follow_up).await;

    separator();
    info!(
        "Applied {}, declined {}, failed {}.",
        summary.applied, summary.declined, summary.failed
    );
    if summary.interrupted {
        warn!("The run was interrupted; re-run the sync to continue.");
    }
    if !summary.follow_ups.is_empty() {
        info!(
            "{} item(s) need manual follow-up, see {}",
            summary.follow_ups.len(),
            follow_up.path().display()
        );
    }
    Ok(())
}

fn print_summary(counts: &ClassificationCounts, left: &str, right: &str) {
    separator();
    info!("Sync Summary:");
    info!("- {} files to be created on {}.", counts.only_left, right);
    info!("- {} files to be created on {}.", counts.only_right, left);
    info!("- {} files have been moved.", counts.moved);
    info!("- {} files have been updated.", counts.modified);
    info!("- {} files are unchanged.", counts.unchanged);
    if counts.ambiguous > 0 {
        warn!("- {} groups of identical files could not be matched.", counts.ambiguous);
    }
    separator();
}

fn separator() {
    println!("{}", style("-".repeat(50)).cyan());
}

fn ask(prompt: &str) -> Result<String> {
    let answer: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(answer)
}
