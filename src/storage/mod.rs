pub mod mvcc;
pub mod version;

pub use mvcc::{KeyGuard, MvccStorage};
pub use version::{Version, VersionChain};
