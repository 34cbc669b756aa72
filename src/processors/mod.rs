pub mod accumulator;
pub mod aggregator;
pub mod bucketizer;
pub mod parallel_processor;

pub use accumulator::Accumulator;
pub use aggregator::{aggregate, StationAggregator, StationOutput};
pub use bucketizer::{BucketStats, Bucketizer, DayBucket, DayBuckets};
pub use parallel_processor::{ParallelProcessor, ProcessingSummary};
