// Service exports
pub mod cache;
pub mod process;
pub mod remote;
pub mod scorer;

pub use cache::{CacheError, CacheKey, CacheStats, ScoreCache};
pub use process::ProcessScorer;
pub use remote::RemoteScorer;
pub use scorer::{parse_candidates, Scorer, ScorerError};
