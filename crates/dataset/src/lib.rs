pub mod load;
pub mod table;

pub use load::{load_filtered, write_cache, DatasetError};
pub use table::Dataset;
