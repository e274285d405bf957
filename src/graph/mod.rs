//! CSV identity rows into a User/Phone/Email property graph

pub mod bolt;
pub mod loader;
pub mod memory;
pub mod records;
pub mod store;

pub use bolt::BoltStore;
pub use loader::GraphLoader;
pub use memory::MemoryGraph;
pub use records::{load_csv, PersonRecord};
pub use store::{GraphCounts, GraphStore};
