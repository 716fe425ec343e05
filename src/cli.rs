use crate::aggregate::Aggregator;
use crate::cache::{Cache, SqliteStore};
use crate::config::RunConfig;
use crate::gerrit::{GerritClient, HttpTransport, DEFAULT_GERRIT_URL};
use crate::report::{self, Mode};
use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "count-changes")]
#[command(about = "Contributor leaderboards and release summaries from Gerrit")]
#[command(version)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["reviews", "commits", "summary"])
))]
pub struct Cli {
    #[arg(help = "YAML file describing the release and its repositories")]
    pub input: PathBuf,

    #[arg(long, help = "Rank contributors by review comments")]
    pub reviews: bool,

    #[arg(long, help = "Rank contributors by merged patches")]
    pub commits: bool,

    #[arg(long, help = "Print release totals")]
    pub summary: bool,

    #[arg(long, help = "Path to cache directory")]
    pub cache: Option<PathBuf>,

    #[arg(long, help = "Gerrit base URL", default_value = DEFAULT_GERRIT_URL)]
    pub gerrit: String,

    #[arg(
        long,
        help = "How long cached responses stay fresh",
        default_value = "7days",
        value_parser = humantime::parse_duration
    )]
    pub cache_ttl: Duration,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn mode(&self) -> Mode {
        if self.reviews {
            Mode::Reviews
        } else if self.commits {
            Mode::Commits
        } else {
            Mode::Summary
        }
    }

    pub fn execute(self) -> Result<()> {
        crate::logging::init_tracing(self.verbose);

        let config = RunConfig::load(&self.input).context("Failed to load input file")?;
        let store = SqliteStore::open(self.cache.as_deref()).context("Failed to initialize cache")?;
        let cache = Cache::new(store, self.cache_ttl).context("Failed to initialize cache")?;
        let transport = HttpTransport::new().context("Failed to build HTTP client")?;
        let mut client = GerritClient::new(&self.gerrit, transport, cache);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        let mut aggregator = Aggregator::new(&config);
        for repo in &config.repositories {
            pb.set_message(format!("Fetching {}...", repo.name));
            aggregator
                .add_repository(&mut client, repo)
                .with_context(|| format!("Failed to collect changes for {}", repo.name))?;
            pb.inc(1);
        }
        pb.finish_and_clear();

        let summary = aggregator.finish();
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if self.json {
            report::write_json(&mut out, &summary, self.mode())?;
        } else {
            report::write_report(&mut out, &summary, self.mode(), console::colors_enabled())?;
        }
        out.flush()?;
        Ok(())
    }
}
