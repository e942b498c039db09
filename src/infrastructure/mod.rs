pub mod dataset_loader;
pub mod mock;

pub use dataset_loader::{load_dataset, parse_timestamp, read_dataset};
