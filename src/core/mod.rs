pub mod depend;
pub mod package;
pub mod version;

pub use depend::{normalize_dependency, split_depends};
pub use package::PackageRecord;
pub use version::{find_package, select_version};
