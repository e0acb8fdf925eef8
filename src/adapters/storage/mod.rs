//! Durable local storage
//!
//! The offline queue and the device identity persist through the
//! [`Storage`] capability, injected at construction time.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::Storage;
