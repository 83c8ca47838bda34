pub mod ops;

pub use ops::clone_repo;
