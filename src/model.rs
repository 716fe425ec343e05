use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    #[serde(rename = "_account_id")]
    pub account_id: u64,
}

/// A merged change as returned by the `/changes/` query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "_number")]
    pub number: u64,
    pub owner: AccountRef,
    pub insertions: u64,
    pub deletions: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AccountRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDetail {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_account_id")]
    pub account_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Account {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| format!("Anonymous {}", self.account_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub account_id: u64,
    pub name: String,
    pub commits: u64,
    pub review_count: u64,
}

impl Contributor {
    pub fn new(account_id: u64, name: String) -> Self {
        Self {
            account_id,
            name,
            commits: 0,
            review_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.commits > 0 || self.review_count > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub commits: u64,
    pub reviews: u64,
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryTotals {
    pub name: String,
    pub changes: u64,
    pub additions: u64,
    pub deletions: u64,
}

impl RepositoryTotals {
    pub fn new(name: String) -> Self {
        Self {
            name,
            changes: 0,
            additions: 0,
            deletions: 0,
        }
    }
}

/// Final aggregation result handed to the reporter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Reportable contributors in creation order.
    pub contributors: Vec<Contributor>,
    pub totals: Totals,
    pub repositories: Vec<RepositoryTotals>,
}
