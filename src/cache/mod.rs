//! Persistent cache volumes
//!
//! The Go module and build caches are shared across all sessions by fixed
//! name. The Docker-in-Docker data directory is kept per daemon version.
//!
//! | Volume | Mount | Sharing |
//! |--------|-------|---------|
//! | `gomodcache` | `/go/pkg/mod` | shared |
//! | `gobuildcache` | `/root/.cache/go-build` | shared |
//! | `<version>-docker-lib` | `/var/lib/docker` | private |

pub mod volume;

pub use volume::{labels, CacheEntry, CacheKind, CacheSharing, CacheVolume};
