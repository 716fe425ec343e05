use crate::cache::{Cache, CacheStore};
use crate::config::RepositoryConfig;
use crate::error::{CountError, Result};
use crate::model::{Account, Change, ChangeDetail};
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_GERRIT_URL: &str = "https://review.openstack.org";

/// Gerrit prepends this to every JSON body to defeat script inclusion.
pub const XSSI_PREFIX: &str = ")]}'";

pub trait Transport {
    fn get(&self, url: &str) -> Result<String>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CountError::Network(format!("GET {url} returned {status}")));
        }
        Ok(resp.text()?)
    }
}

/// The three read operations the aggregator needs from a review server.
pub trait ReviewSource {
    fn merged_changes(&mut self, repo: &RepositoryConfig, release_name: &str) -> Result<Vec<Change>>;
    fn account(&mut self, account_id: u64) -> Result<Account>;
    fn change_detail(&mut self, number: u64) -> Result<ChangeDetail>;
}

/// Strip the anti-XSSI prefix and decode the JSON payload behind it.
pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let payload = body.strip_prefix(XSSI_PREFIX).ok_or_else(|| {
        let head: String = body.chars().take(16).collect();
        CountError::ResponseParse(format!("missing {XSSI_PREFIX:?} prefix, body starts with {head:?}"))
    })?;
    serde_json::from_str(payload).map_err(|e| CountError::ResponseParse(e.to_string()))
}

pub fn merged_query_url(base: &str, repo: &RepositoryConfig) -> String {
    format!(
        "{}/changes/?q=status:merged+before:{}+after:{}+project:{}",
        base, repo.release_date, repo.start_date, repo.name
    )
}

pub fn stable_query_url(base: &str, repo: &RepositoryConfig, release_name: &str) -> String {
    format!(
        "{}/changes/?q=status:merged+project:{}+branch:stable/{}",
        base, repo.name, release_name
    )
}

pub fn account_url(base: &str, account_id: u64) -> String {
    format!("{base}/accounts/{account_id}")
}

pub fn change_detail_url(base: &str, number: u64) -> String {
    format!("{base}/changes/{number}/detail")
}

pub struct GerritClient<T, S> {
    base_url: String,
    transport: T,
    cache: Cache<S>,
}

impl<T: Transport, S: CacheStore> GerritClient<T, S> {
    pub fn new(base_url: &str, transport: T, cache: Cache<S>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            cache,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_cache(self) -> Cache<S> {
        self.cache
    }

    fn cached_get<V>(&mut self, operation: &str, arg: &str, url: String) -> Result<V>
    where
        V: serde::Serialize + DeserializeOwned,
    {
        let key = format!("{operation}|{}|{arg}", self.base_url);
        let transport = &self.transport;
        self.cache.get_or_compute(&key, || {
            let body = transport.get(&url)?;
            parse_response(&body)
        })
    }

    fn query(&mut self, url: String) -> Result<Vec<Change>> {
        let arg = url.clone();
        self.cached_get("query", &arg, url)
    }
}

impl<T: Transport, S: CacheStore> ReviewSource for GerritClient<T, S> {
    /// Default-branch changes in the release window, followed by the stable
    /// branch ones when the repository has a stable branch. No deduplication.
    fn merged_changes(&mut self, repo: &RepositoryConfig, release_name: &str) -> Result<Vec<Change>> {
        let url = merged_query_url(&self.base_url, repo);
        let mut changes = self.query(url)?;
        if repo.stable_branch {
            let url = stable_query_url(&self.base_url, repo, release_name);
            changes.extend(self.query(url)?);
        }
        Ok(changes)
    }

    fn account(&mut self, account_id: u64) -> Result<Account> {
        let url = account_url(&self.base_url, account_id);
        self.cached_get("account", &account_id.to_string(), url)
    }

    fn change_detail(&mut self, number: u64) -> Result<ChangeDetail> {
        let url = change_detail_url(&self.base_url, number);
        self.cached_get("change_detail", &number.to_string(), url)
    }
}
