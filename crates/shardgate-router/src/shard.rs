//! Backend shard records and environment discovery.

use std::fmt;

use tracing::info;

/// A backend the router can forward to.
///
/// Only `url` ever reaches the ring; `id` and `name` exist for logs and
/// ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub id: u32,
    pub name: String,
    pub url: String,
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

/// Collect shards from `SHARD_<N>_URL=<url>` variables.
///
/// `N` must be a non-negative decimal integer; other names are ignored, as are
/// matching names with an empty value. The result is sorted by id so that logs
/// and ring construction are reproducible regardless of environment order.
pub fn discover_shards<I, K, V>(vars: I) -> Vec<Shard>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut shards: Vec<Shard> = vars
        .into_iter()
        .filter_map(|(key, value)| {
            let digits = key.as_ref().strip_prefix("SHARD_")?.strip_suffix("_URL")?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let id = digits.parse::<u32>().ok()?;
            let url = value.as_ref().trim();
            if url.is_empty() {
                return None;
            }
            Some(Shard {
                id,
                name: format!("SHARD_{digits}"),
                url: url.to_string(),
            })
        })
        .collect();

    shards.sort_by_key(|s| s.id);
    for shard in &shards {
        info!(id = shard.id, url = %shard.url, "discovered shard");
    }
    shards
}
