// Label-side preprocessing: turning ordinal labels into the targets the losses consume.

pub mod levels;

pub use levels::{
    check_labels, label_to_levels, levels_from_labelbatch, num_tasks, task_importance_weights,
};
