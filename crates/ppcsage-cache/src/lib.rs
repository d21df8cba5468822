//! PPCSage Cache: expiring, namespaced cache for processed content and
//! model blobs.
//!
//! `ExpiringCache` sits on top of any `KvStore`. Two stores ship here:
//! `MemoryStore` (in-process) and `SqliteStore` (rusqlite, blocking calls on
//! the tokio blocking pool). Expired entries are removed lazily when read,
//! and by `clear_expired`, which the optional sweeper task runs periodically.

pub mod cache;
pub mod clock;
pub mod entry;
pub mod sqlite;
pub mod store;

pub use cache::{CacheStats, ExpiringCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, Namespace};
pub use sqlite::SqliteStore;
pub use store::{KvStore, MemoryStore};
