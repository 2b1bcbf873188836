use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use label_release::analyzer::next::version_from_ref;
use label_release::analyzer::{check_pull, next, NextRequest};
use label_release::cli::{publish_release, ReleaseWorkflowArgs};
use label_release::config::{self, Config};
use label_release::domain::ChangeLevel;
use label_release::git::{locate_previous_tag, Git2Repository, Repository};
use label_release::github::{HttpGitHubClient, RepoId};
use label_release::ui;

#[derive(Parser)]
#[command(
    name = "label-release",
    version,
    about = "Compute and publish the next semantic version from pull request labels"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "GitHub repository as owner/name (default: from remote URL)")]
    repo: Option<String>,

    #[arg(long, global = true, default_value = "HEAD", help = "Revision to release")]
    head: String,

    #[arg(long, global = true, help = "Tag to compute from instead of the latest version tag")]
    previous_ref: Option<String>,

    #[arg(long, global = true, help = "Lowest change level to apply")]
    min_bump: Option<ChangeLevel>,

    #[arg(long, global = true, help = "Highest change level to apply")]
    max_bump: Option<ChangeLevel>,

    #[arg(long, global = true, conflicts_with = "stable", help = "Force a pre-release")]
    prerelease: bool,

    #[arg(long, global = true, help = "Force a stable release")]
    stable: bool,

    #[arg(
        long = "label",
        global = true,
        value_name = "ALIAS=TARGET",
        help = "Extra label alias (repeatable)"
    )]
    labels: Vec<String>,

    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the next version without changing anything
    Next {
        #[arg(long, help = "Print the result as JSON")]
        json: bool,
    },
    /// Tag the next version, push it and optionally publish a release
    Release {
        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,

        #[arg(long, help = "Create the tag locally without pushing it")]
        no_push: bool,

        #[arg(short, long, help = "Skip confirmation prompts")]
        yes: bool,
    },
    /// Validate the labels of a pull request
    CheckPr {
        number: u64,

        #[arg(long, help = "Also resolve the version the pull would release")]
        resolve: bool,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Apply command-line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(min) = args.min_bump {
        config.release.min_bump = min;
    }
    if let Some(max) = args.max_bump {
        config.release.max_bump = max;
    }
    if args.prerelease {
        config.release.force_prerelease = true;
        config.release.force_stable = false;
    }
    if args.stable {
        config.release.force_stable = true;
        config.release.force_prerelease = false;
    }
    for label in &args.labels {
        let Some((alias, target)) = label.split_once('=') else {
            bail!("invalid --label '{}': expected alias=target", label);
        };
        config
            .labels
            .insert(alias.trim().to_string(), target.trim().to_string());
    }
    config.validate()?;
    Ok(())
}

fn resolve_repo_id(args: &Args, repo: &Git2Repository, remote: &str) -> Result<RepoId> {
    if let Some(id) = &args.repo {
        return Ok(id.parse()?);
    }
    let url = repo
        .remote_url(remote)?
        .with_context(|| format!("remote '{}' not found; pass --repo owner/name", remote))?;
    Ok(RepoId::from_remote_url(&url)?)
}

fn build_request(config: &Config, args: &Args, repo_id: RepoId) -> Result<NextRequest> {
    Ok(NextRequest {
        repo: repo_id,
        head: args.head.clone(),
        previous_ref: args.previous_ref.clone(),
        prefixes: config.tag_prefixes(),
        initial_version: config.initial_version()?,
        classifier: config.label_classifier()?,
        min_bump: config.release.min_bump,
        max_bump: config.release.max_bump,
        force_prerelease: config.release.force_prerelease,
        force_stable: config.release.force_stable,
        max_concurrency: config.release.max_concurrency,
    })
}

async fn run(args: Args) -> Result<()> {
    let mut config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    apply_overrides(&mut config, &args)?;

    let token = args
        .github_token
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| config.github.token_from_env());
    let github = HttpGitHubClient::new(&config.github.api_url, token.clone())?;

    let repo = Git2Repository::open(".")
        .context("Not a git repository")?
        .with_push_token(token);
    let repo_id = resolve_repo_id(&args, &repo, &config.release.remote)?;
    let request = build_request(&config, &args, repo_id)?;

    match args.command {
        Command::Next { json } => {
            let result = next(&request, &repo, &github).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for warning in &result.warnings {
                    ui::display_warning(warning);
                }
                ui::display_next(&result);
            }
        }
        Command::Release {
            dry_run,
            no_push,
            yes,
        } => {
            let workflow = ReleaseWorkflowArgs {
                remote: config.release.remote.clone(),
                push: !no_push,
                create_release: config.github.create_release,
                dry_run,
                hooks: config.hooks.clone(),
                request,
            };

            let computed = next(&workflow.request, &repo, &github).await?;
            for warning in &computed.warnings {
                ui::display_warning(warning);
            }
            ui::display_next(&computed);

            if let Some(tag) = computed.next_tag.as_deref() {
                if dry_run {
                    ui::display_status("Dry run: no tag created");
                    return Ok(());
                }
                let prompt = format!("Create tag {}?", tag);
                if !yes && ui::is_interactive() && !ui::confirm_action(&prompt)? {
                    ui::display_status("Cancelled");
                    return Ok(());
                }
            }

            let result = publish_release(&workflow, computed, &repo, &github).await?;
            for warning in &result.warnings {
                ui::display_warning(warning);
            }
            ui::display_workflow_result(&result);
        }
        Command::CheckPr { number, resolve } => {
            let resolver = config.resolver()?;
            let previous = if resolve {
                Some(match &request.previous_ref {
                    Some(tag) => version_from_ref(tag, &request.prefixes)?,
                    None => {
                        let head = repo.resolve_commit(&request.head)?;
                        locate_previous_tag(&repo, &head, &request.prefixes, &request.initial_version)?
                            .version
                    }
                })
            } else {
                None
            };

            let check = check_pull(
                &github,
                &request.repo,
                number,
                &request.classifier,
                &resolver,
                previous.as_ref(),
            )
            .await?;
            ui::display_pull_check(&check);
        }
    }

    Ok(())
}
