//! First-run seeding from a remote placeholder API.
//!
//! When the persisted list is empty the seed loader fetches a few demo
//! records, one request at a time, and appends them as `Other` tasks.
//! All records are fetched before anything is appended, so a failed run
//! leaves the list untouched.

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::TodoError;
use crate::fields::Category;
use crate::task::Task;
use crate::todos::TodoList;

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/todos";
pub const DEFAULT_COUNT: u32 = 3;

/// A record as returned by the placeholder API. Other fields are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RemoteTodo {
    pub title: String,
}

/// Source of seed records, numbered from 1.
pub trait SeedSource {
    fn fetch(&self, n: u32) -> Result<RemoteTodo, TodoError>;
}

/// Blocking HTTP source: `GET {endpoint}/{n}`.
pub struct HttpSeedSource {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpSeedSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("todo-list/", env!("CARGO_PKG_VERSION")))
            .build();
        HttpSeedSource {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn url_for(&self, n: u32) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), n)
    }
}

impl SeedSource for HttpSeedSource {
    fn fetch(&self, n: u32) -> Result<RemoteTodo, TodoError> {
        let url = self.url_for(n);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| TodoError::network(url.clone(), e))?;
        response
            .into_json::<RemoteTodo>()
            .map_err(|e| TodoError::network(url, e))
    }
}

/// Fetch records `1..=count` in order, stopping at the first failure.
pub fn fetch_all(source: &dyn SeedSource, count: u32) -> Result<Vec<RemoteTodo>, TodoError> {
    let mut records = Vec::new();
    for n in 1..=count {
        records.push(source.fetch(n)?);
    }
    Ok(records)
}

/// Seed `list` if it is empty. Returns the tasks that were added.
pub fn seed_if_empty(
    list: &mut TodoList,
    source: &dyn SeedSource,
    count: u32,
) -> Result<Vec<Task>, TodoError> {
    if !list.is_empty() {
        return Ok(Vec::new());
    }
    let records = fetch_all(source, count).map_err(|e| {
        warn!(error = %e, "seed fetch failed");
        e
    })?;
    let items = records
        .into_iter()
        .filter_map(|r| {
            if r.title.trim().is_empty() {
                warn!("skipping seed record with blank title");
                None
            } else {
                Some((r.title, Category::Other))
            }
        })
        .collect();
    let added = list.add_many(items)?;
    info!(count = added.len(), "seeded task list");
    Ok(added)
}
