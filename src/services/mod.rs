pub mod cache;
pub mod classifier;
pub mod file_cache;
pub mod history;
pub mod indicators;
pub mod ranking;
pub mod report;
pub mod scheduler;
pub mod scoring;
pub mod sentiment;
pub mod technical;

pub use cache::Cache;
pub use classifier::{ClassifierInput, SignalClassifier};
pub use file_cache::FileCache;
pub use history::{HistoryStore, LastRunCheck};
pub use ranking::{with_retry, PipelineConfig, RankingPipeline, RankingReport, RetryPolicy};
pub use scheduler::Scheduler;
pub use scoring::{validate_signal, ScoringConfig, ScoringEngine, SignalValidation};
pub use sentiment::{SentimentAggregator, SnapshotMap};
pub use technical::TechnicalAnalyzer;
