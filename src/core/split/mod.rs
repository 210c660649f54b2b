mod partitioner;
mod ratio;

pub use partitioner::{
    partition, partition_with_rng, plan_class_split, ClassSplit, PartitionOptions,
    PartitionSummary,
};
pub use ratio::SplitRatio;
