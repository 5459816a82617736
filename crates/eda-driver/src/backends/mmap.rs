//! Memory-mapped device region
//!
//! Maps a device node (`/dev/uio*`, `/dev/mem` window, sysfs BAR
//! `resource*`) or a plain file shared into the process, read/write or
//! read-only, and
//! exposes it as a [`MemoryRegion`].

use crate::error::{RegionError, Result};
use crate::region::{MemoryRegion, RegionBytes};
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsFd;
use std::path::Path;
use std::ptr::NonNull;

/// Shared mapping of a device address window.
///
/// Read/write by default; [`open_read_only`](Self::open_read_only) maps
/// status-only windows with `PROT_READ`, and views refuse to bind to those.
#[derive(Debug)]
pub struct MmapRegion {
    ptr: NonNull<u8>,
    size: usize,
    offset: u64,
    writable: bool,
    _file: File,
}

impl MmapRegion {
    /// Open `path` read/write and map `len` bytes from its start.
    ///
    /// A `len` of 0 maps the whole file as reported by its metadata (device
    /// nodes usually report 0 and need an explicit length).
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The file cannot be opened
    /// - The resulting length is 0
    /// - mmap fails
    pub fn open(path: impl AsRef<Path>, len: usize) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening device window: {}", path.display());

        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::map(file, 0, len)
    }

    /// Open `path` read-only and map `len` bytes from its start.
    ///
    /// Same length rules as [`open`](Self::open). Writes through the region
    /// fail with [`RegionError::ReadOnly`].
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened, the length is 0, or mmap
    /// fails.
    pub fn open_read_only(path: impl AsRef<Path>, len: usize) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening read-only device window: {}", path.display());

        let file = OpenOptions::new().read(true).open(path)?;
        Self::map_read_only(file, 0, len)
    }

    /// Map `len` bytes of `file` starting at byte `offset`.
    ///
    /// `offset` must be page-aligned. The file is kept open for the life of
    /// the mapping.
    ///
    /// # Errors
    ///
    /// Returns error if the length is 0, a regular file is shorter than
    /// `offset + len`, or mmap fails.
    pub fn map(file: File, offset: u64, len: usize) -> Result<Self> {
        Self::map_with(file, offset, len, true)
    }

    /// Map `len` bytes of `file` read-only, starting at byte `offset`.
    ///
    /// # Errors
    ///
    /// As for [`map`](Self::map).
    pub fn map_read_only(file: File, offset: u64, len: usize) -> Result<Self> {
        Self::map_with(file, offset, len, false)
    }

    fn map_with(file: File, offset: u64, len: usize, writable: bool) -> Result<Self> {
        let meta = file
            .metadata()
            .map_err(|e| RegionError::map_failed(format!("Cannot stat backing file: {e}")))?;

        let size = if len == 0 {
            usize::try_from(meta.len().saturating_sub(offset))
                .map_err(|_| RegionError::map_failed("Backing file too large to map"))?
        } else {
            len
        };

        if size == 0 {
            return Err(RegionError::EmptyRegion);
        }

        // Touching pages past EOF of a regular file raises SIGBUS.
        if meta.is_file() {
            let end = offset.saturating_add(size as u64);
            if end > meta.len() {
                return Err(RegionError::map_failed(format!(
                    "Mapping {size:#x} bytes at {offset:#x} exceeds file length {:#x}",
                    meta.len()
                )));
            }
        }

        let prot = if writable {
            ProtFlags::READ | ProtFlags::WRITE
        } else {
            ProtFlags::READ
        };

        // SAFETY: mmap with a null hint creates a fresh mapping.
        // - fd is valid (owned File, kept alive in the struct)
        // - size is non-zero (checked above)
        // - MAP_SHARED so stores reach the device; PROT_WRITE only when the
        //   file was opened for writing
        // - The mapping is released exactly once in Drop
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                size,
                prot,
                MapFlags::SHARED,
                file.as_fd(),
                offset,
            )
            .map_err(|e| RegionError::map_failed(format!("mmap failed: {e}")))?
        };

        let ptr = NonNull::new(ptr.cast::<u8>())
            .ok_or_else(|| RegionError::map_failed("mmap returned a null pointer"))?;

        tracing::info!(
            "Mapped device window at {ptr:p}, offset={offset:#x}, size={size:#x}, writable={writable}"
        );

        Ok(Self {
            ptr,
            size,
            offset,
            writable,
            _file: file,
        })
    }

    /// Offset of the mapping within the backing file.
    #[must_use]
    pub const fn file_offset(&self) -> u64 {
        self.offset
    }
}

impl MemoryRegion for MmapRegion {
    fn len(&self) -> usize {
        self.size
    }

    fn as_bytes(&self) -> RegionBytes<'_> {
        // SAFETY: ptr is valid for size bytes until Drop unmaps it, which
        // cannot happen while &self is borrowed. No Rust reference points
        // into the mapping. Read-only mappings hand out a read-only handle,
        // so no write reaches a PROT_READ page.
        let bytes = unsafe { RegionBytes::from_raw_parts(self.ptr, self.size) };
        if self.writable {
            bytes
        } else {
            bytes.read_only()
        }
    }
}

impl Drop for MmapRegion {
    fn drop(&mut self) {
        tracing::debug!("Unmapping device window ({:#x} bytes)", self.size);

        // SAFETY: ptr and size are exactly those returned by / passed to
        // mmap in map(); Drop runs once and no views can outlive &self.
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.size) {
                tracing::error!("munmap failed during drop: {e}");
            }
        }
    }
}

// SAFETY: MmapRegion owns its mapping; moving it to another thread does not
// invalidate the mapping. It is not Sync: accesses go through &self and the
// layer performs no synchronization.
unsafe impl Send for MmapRegion {}
