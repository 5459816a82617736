//! Memory region providers
//!
//! - **Heap**: zero-filled buffer standing in for device memory (tests, replay)
//! - **Mmap**: shared mapping of a device node or file (`/dev/uio*`, BAR resource)

pub mod heap;
pub mod mmap;

pub use heap::HeapRegion;
pub use mmap::MmapRegion;
