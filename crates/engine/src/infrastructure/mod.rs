//! Infrastructure adapters: the atlas HTTP client, its retry and cache
//! wrappers, and clock/random implementations.

pub mod atlas;
pub mod cache;
pub mod clock;
pub mod ports;
pub mod retry;

pub use atlas::AtlasClient;
pub use cache::{AtlasCache, TtlCache, DEFAULT_ATLAS_TTL_SECS};
pub use clock::{SystemClock, SystemRandom};
pub use ports::{AtlasError, AtlasPort, ClockPort};
pub use retry::{ResilientAtlasClient, RetryConfig};
