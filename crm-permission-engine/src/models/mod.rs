pub mod hierarchy;
pub mod record;
pub mod settings;

pub use hierarchy::{Bounds, HierarchyNode, TreeKind};
pub use record::{Record, RecordSchema};
pub use settings::{AccessSettings, PRIVILEGED_ROLE};
