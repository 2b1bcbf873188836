//! Main workflow orchestration logic
//!
//! Separates CLI argument parsing from the release steps so the workflow can
//! be driven programmatically (and tested) without clap.

use anyhow::{Context, Result};
use tracing::info;

use crate::analyzer::{next, NextRequest, NextResult};
use crate::boundary::ReleaseWarning;
use crate::config::HooksConfig;
use crate::git::Repository;
use crate::github::{GitHubClient, NewRelease};
use crate::hooks::{HookContext, HookExecutor, HookType};

/// Arguments for the release workflow
///
/// Mirrors the CLI arguments and configuration in a format that does not
/// depend on clap.
#[derive(Debug, Clone)]
pub struct ReleaseWorkflowArgs {
    pub request: NextRequest,

    /// Remote the tag is pushed to
    pub remote: String,

    /// Push the tag after creating it
    pub push: bool,

    /// Publish a GitHub release for the new tag
    pub create_release: bool,

    /// Preview mode - compute the version but change nothing
    pub dry_run: bool,

    pub hooks: HooksConfig,
}

/// Result of a release workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub next: NextResult,

    /// The tag that was created, `None` for dry runs or nothing to release
    pub tag: Option<String>,

    pub remote: String,

    pub pushed: bool,

    /// URL of the published release
    pub release_url: Option<String>,

    /// Warnings from post-tag hooks
    pub warnings: Vec<ReleaseWarning>,
}

/// Main release workflow
///
/// Computes the next version with [next] and hands it to [publish_release].
pub async fn run_release_workflow<R, G>(
    args: &ReleaseWorkflowArgs,
    repo: &R,
    github: &G,
) -> Result<WorkflowResult>
where
    R: Repository + ?Sized,
    G: GitHubClient + ?Sized,
{
    let computed = next(&args.request, repo, github)
        .await
        .context("Failed to compute next version")?;
    publish_release(args, computed, repo, github).await
}

/// Publish an already computed release
///
/// 1. Run the pre-tag hook (failure aborts)
/// 2. Create the tag at the head commit and push it
/// 3. Run the post-tag hook
/// 4. Optionally publish a GitHub release, then run the post-release hook
///
/// Nothing happens for dry runs or when there is nothing to release.
pub async fn publish_release<R, G>(
    args: &ReleaseWorkflowArgs,
    computed: NextResult,
    repo: &R,
    github: &G,
) -> Result<WorkflowResult>
where
    R: Repository + ?Sized,
    G: GitHubClient + ?Sized,
{
    let mut result = WorkflowResult {
        next: computed,
        tag: None,
        remote: args.remote.clone(),
        pushed: false,
        release_url: None,
        warnings: Vec::new(),
    };

    let Some(tag) = result.next.next_tag.clone() else {
        info!("nothing to release");
        return Ok(result);
    };
    if args.dry_run {
        info!(tag = %tag, "dry run, not tagging");
        return Ok(result);
    }

    let mut context = HookContext {
        hook_type: HookType::PreTag,
        tag: tag.clone(),
        previous_version: result.next.previous_version.to_string(),
        next_version: result.next.next_version.to_string(),
        change_level: result.next.change_level.to_string(),
        remote: args.remote.clone(),
        release_url: None,
    };

    if let Some(script) = &args.hooks.pre_tag {
        run_hook(script, &context)?;
    }

    repo.create_tag(&tag, &result.next.head_sha)
        .with_context(|| format!("Failed to create tag {}", tag))?;
    info!(tag = %tag, sha = %result.next.head_sha, "created tag");
    result.tag = Some(tag.clone());

    if args.push {
        repo.push_tags(&args.remote, &[tag.as_str()])
            .with_context(|| format!("Failed to push tag {} to {}", tag, args.remote))?;
        info!(tag = %tag, remote = %args.remote, "pushed tag");
        result.pushed = true;
    }

    if let Some(script) = &args.hooks.post_tag {
        context.hook_type = HookType::PostTag;
        result.warnings.extend(run_hook(script, &context)?);
    }

    if args.create_release {
        let release = NewRelease {
            tag_name: tag.clone(),
            name: tag.clone(),
            target_commitish: result.next.head_sha.clone(),
            prerelease: result.next.is_prerelease(),
            generate_release_notes: true,
        };
        let url = github
            .create_release(&args.request.repo, &release)
            .await
            .with_context(|| format!("Failed to create release for {}", tag))?;
        info!(url = %url, "published release");

        if let Some(script) = &args.hooks.post_release {
            context.hook_type = HookType::PostRelease;
            context.release_url = Some(url.clone());
            result.warnings.extend(run_hook(script, &context)?);
        }
        result.release_url = Some(url);
    }

    Ok(result)
}

/// Blocking hooks fail the release; the others only produce a warning
fn run_hook(script: &str, context: &HookContext) -> Result<Option<ReleaseWarning>> {
    if context.hook_type.is_blocking() {
        HookExecutor::execute(script, context)
            .with_context(|| format!("{} hook failed", context.hook_type.name()))?;
        return Ok(None);
    }
    Ok(HookExecutor::execute_permissive(script, context))
}
