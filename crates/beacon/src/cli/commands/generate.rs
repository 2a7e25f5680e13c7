//! Generate command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{info, warn};

use beacon_changelog::{ReleaseNotesBuilder, ReleaseNotesResult};
use beacon_core::config::{resolve_config, validate_config};
use beacon_core::{Platform, RunOptions};
use beacon_forge::{ClientRegistry, ForgeOptions};

use crate::cli::output::{self, ActionOutputs};
use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Generate release notes for a tag range
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Hosting platform (github, gitea)
    #[arg(long, env = "BEACON_PLATFORM", default_value = "github")]
    pub platform: String,

    /// Access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    /// Start of the range (default: the tag before --to-tag)
    #[arg(long)]
    pub from_tag: Option<String>,

    /// End of the range (default: the latest tag)
    #[arg(long)]
    pub to_tag: Option<String>,

    /// Web root of a self-hosted instance
    #[arg(long)]
    pub base_url: Option<String>,

    /// API root, when it is not derived from --base-url
    #[arg(long)]
    pub api_url: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "PATH")]
    pub configuration: Option<PathBuf>,

    /// Inline configuration JSON, wins over --configuration
    #[arg(long, value_name = "JSON")]
    pub configuration_json: Option<String>,

    /// Write the release notes to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List open pull requests in the OPEN placeholder
    #[arg(long)]
    pub include_open: bool,

    /// Skip pre-release tags when resolving the range
    #[arg(long)]
    pub ignore_pre_releases: bool,

    /// Find pull requests through the merge commits of the range
    #[arg(long)]
    pub fetch_via_commits: bool,

    /// Build entries from commits instead of pull requests
    #[arg(long)]
    pub commit_mode: bool,

    /// Fail instead of degrading when fetching fails
    #[arg(long)]
    pub fail_on_error: bool,

    /// Upper bound on fetched pull requests (overrides the configuration)
    #[arg(long)]
    pub max_pull_requests: Option<usize>,
}

impl GenerateCommand {
    /// Execute the generate command, returning the exit code
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<i32> {
        let cwd = std::env::current_dir()?;
        let (owner, repo) = self.repository_name()?;
        info!(platform = %self.platform, owner = %owner, repo = %repo, "executing generate command");

        let mut config = resolve_config(
            self.configuration_json.as_deref(),
            self.configuration.as_deref(),
            &cwd,
        )?;
        if let Some(max) = self.max_pull_requests {
            config.max_pull_requests = max;
            validate_config(&config)?;
        }

        let options = RunOptions::new(&owner, &repo)
            .with_range(self.from_tag.clone(), self.to_tag.clone())
            .with_include_open(self.include_open)
            .with_ignore_pre_releases(self.ignore_pre_releases)
            .with_fetch_via_commits(self.fetch_via_commits)
            .with_commit_mode(self.commit_mode)
            .with_fail_on_error(self.fail_on_error);

        let client = ClientRegistry::new().create(&self.platform, self.forge_options(&owner, &repo))?;
        let result = ReleaseNotesBuilder::new(client, config, options).build().await?;

        if let Some(path) = &self.output {
            std::fs::write(path, &result.changelog)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }

        if let Some(path) = std::env::var_os("GITHUB_OUTPUT") {
            action_outputs(&result)
                .append_to(path.as_ref())
                .context("failed to write GITHUB_OUTPUT")?;
        }

        print_result(cli, &result, self.output.as_deref())?;
        Ok(exit_code(&result))
    }

    /// Owner and repo from the explicit flags, falling back to `owner/repo`
    fn repository_name(&self) -> anyhow::Result<(String, String)> {
        let (slug_owner, slug_repo) = match self.repository.as_deref() {
            Some(slug) => {
                let (owner, repo) = slug
                    .split_once('/')
                    .with_context(|| format!("--repository must be owner/repo, got '{}'", slug))?;
                (Some(owner.to_string()), Some(repo.to_string()))
            }
            None => (None, None),
        };

        let owner = self.owner.clone().or(slug_owner);
        let repo = self.repo.clone().or(slug_repo);
        match (owner, repo) {
            (Some(owner), Some(repo)) => Ok((owner, repo)),
            _ => anyhow::bail!("repository not set: pass --owner and --repo or --repository"),
        }
    }

    fn forge_options(&self, owner: &str, repo: &str) -> ForgeOptions {
        let mut options = ForgeOptions::new(owner, repo);
        if let Some(token) = &self.token {
            options = options.with_token(token.as_str());
        }

        if let Some(base) = &self.base_url {
            let base = base.trim_end_matches('/');
            options = options.with_web_url(base);

            let github = self.platform.parse::<Platform>().ok() == Some(Platform::GitHub);
            if github && self.api_url.is_none() && base != Platform::GitHub.default_web_url() {
                options = options.with_api_url(format!("{}/api/v3", base));
            }
        }

        if let Some(api) = &self.api_url {
            options = options.with_api_url(api.trim_end_matches('/'));
        }
        options
    }
}

fn exit_code(result: &ReleaseNotesResult) -> i32 {
    if result.failed {
        exit_codes::ERROR
    } else {
        exit_codes::SUCCESS
    }
}

fn action_outputs(result: &ReleaseNotesResult) -> ActionOutputs {
    let mut outputs = ActionOutputs::new();
    outputs
        .set("changelog", &result.changelog)
        .set("failed", result.failed)
        .set("owner", &result.owner)
        .set("repo", &result.repo)
        .set("fromTag", result.from_tag.as_deref().unwrap_or_default())
        .set("toTag", result.to_tag.as_deref().unwrap_or_default())
        .set("categorized_prs", result.categorized_prs)
        .set("uncategorized_prs", result.uncategorized_prs)
        .set("open_prs", result.open_prs)
        .set("ignored_prs", result.ignored_prs);
    outputs
}

fn print_result(
    cli: &Cli,
    result: &ReleaseNotesResult,
    written_to: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    if cli.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if let Some(error) = &result.error {
        if result.failed {
            output::error(error);
        } else {
            warn!(error = %error, "run finished with errors");
        }
    }

    match written_to {
        Some(path) if !cli.quiet => {
            output::success(&format!(
                "Release notes written to {}",
                output::path_style().apply_to(path.display())
            ));
            eprintln!(
                "{}",
                output::key_value(
                    "range",
                    &format!(
                        "{} → {}",
                        output::tag_style().apply_to(result.from_tag.as_deref().unwrap_or("-")),
                        output::tag_style().apply_to(result.to_tag.as_deref().unwrap_or("-")),
                    )
                )
            );
            eprintln!(
                "{}",
                output::key_value(
                    "pull requests",
                    &format!(
                        "{} categorized, {} uncategorized, {} ignored, {} open",
                        result.categorized_prs,
                        result.uncategorized_prs,
                        result.ignored_prs,
                        result.open_prs
                    )
                )
            );
        }
        Some(_) => {}
        None => {
            if result.changelog.is_empty() && !cli.quiet {
                output::warning(&style("No release notes generated.").yellow().to_string());
            }
            println!("{}", result.changelog);
        }
    }
    Ok(())
}
