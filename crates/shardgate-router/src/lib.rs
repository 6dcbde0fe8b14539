//! Shard selection for inbound requests.
//!
//! [`ShardRouter`] reads the routing key from a configured request header and
//! resolves it to a shard host through the consistent hash ring it owns.
//! [`discover_shards`] turns `SHARD_<N>_URL` variables into [`Shard`] records
//! at startup.

mod error;
mod router;
mod shard;

pub use error::RouterError;
pub use router::ShardRouter;
pub use shard::{Shard, discover_shards};
