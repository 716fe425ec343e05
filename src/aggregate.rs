use crate::config::{RepositoryConfig, RunConfig};
use crate::error::Result;
use crate::gerrit::ReviewSource;
use crate::model::{Change, Contributor, RepositoryTotals, Summary, Totals};
use std::collections::HashMap;
use tracing::{debug, info};

/// Accumulates contributor activity across repositories.
///
/// Contributors are kept in creation order; `index` maps an account id to its
/// position in `contributors`.
pub struct Aggregator<'a> {
    config: &'a RunConfig,
    contributors: Vec<Contributor>,
    index: HashMap<u64, usize>,
    totals: Totals,
    repositories: Vec<RepositoryTotals>,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            contributors: Vec::new(),
            index: HashMap::new(),
            totals: Totals::default(),
            repositories: Vec::new(),
        }
    }

    pub fn contributors(&self) -> &[Contributor] {
        &self.contributors
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn add_repository<S: ReviewSource>(
        &mut self,
        source: &mut S,
        repo: &RepositoryConfig,
    ) -> Result<()> {
        let changes = source.merged_changes(repo, &self.config.release_name)?;
        let mut repo_totals = RepositoryTotals::new(repo.name.clone());

        for change in &changes {
            repo_totals.changes += 1;
            repo_totals.additions += change.insertions;
            repo_totals.deletions += change.deletions;
            self.add_change(source, change)?;
        }

        self.totals.additions += repo_totals.additions;
        self.totals.deletions += repo_totals.deletions;
        info!(
            repository = %repo_totals.name,
            changes = repo_totals.changes,
            additions = repo_totals.additions,
            deletions = repo_totals.deletions,
            "repository processed"
        );
        self.repositories.push(repo_totals);
        Ok(())
    }

    fn add_change<S: ReviewSource>(&mut self, source: &mut S, change: &Change) -> Result<()> {
        let owner_id = change.owner.account_id;
        if !self.config.is_ignored(owner_id) {
            let owner = self.contributor_mut(source, owner_id)?;
            owner.commits += 1;
            self.totals.commits += 1;
        }

        let detail = source.change_detail(change.number)?;
        debug!(change = change.number, messages = detail.messages.len(), "change detail");
        for author in detail.messages.iter().filter_map(|m| m.author) {
            let author_id = author.account_id;
            if author_id == owner_id || self.config.is_ignored(author_id) {
                continue;
            }
            self.contributor_mut(source, author_id)?.review_count += 1;
        }
        Ok(())
    }

    fn contributor_mut<S: ReviewSource>(
        &mut self,
        source: &mut S,
        account_id: u64,
    ) -> Result<&mut Contributor> {
        let idx = match self.index.get(&account_id) {
            Some(&idx) => idx,
            None => {
                let account = source.account(account_id)?;
                self.contributors
                    .push(Contributor::new(account_id, account.display_name()));
                let idx = self.contributors.len() - 1;
                self.index.insert(account_id, idx);
                idx
            }
        };
        Ok(&mut self.contributors[idx])
    }

    /// Derive the review total and keep only contributors with activity.
    pub fn finish(self) -> Summary {
        let mut totals = self.totals;
        totals.reviews = self.contributors.iter().map(|c| c.review_count).sum();
        let contributors = self
            .contributors
            .into_iter()
            .filter(Contributor::is_active)
            .collect();

        Summary {
            contributors,
            totals,
            repositories: self.repositories,
        }
    }
}

/// Run every configured repository through a fresh [`Aggregator`].
pub fn aggregate<S: ReviewSource>(source: &mut S, config: &RunConfig) -> Result<Summary> {
    let mut aggregator = Aggregator::new(config);
    for repo in &config.repositories {
        aggregator.add_repository(source, repo)?;
    }
    Ok(aggregator.finish())
}
