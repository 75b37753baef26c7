//! Detection of CPU-written pages inside mapped regions.

use std::collections::HashMap;
use std::ops::Range;

use parking_lot::Mutex;

use crate::{CaptureResult, DEFAULT_PAGE_SIZE};

/// Reports which bytes of a mapped region were written since the previous
/// query. Returned ranges are relative to `base`, page granular and merged.
pub trait DirtyPageTracker: Send + Sync {
    /// Collects and resets the dirty state of `[base, base + size)`.
    ///
    /// # Safety
    /// `base..base + size` must be a live mapping for the duration of the
    /// call.
    unsafe fn collect(&self, base: usize, size: usize) -> CaptureResult<Vec<Range<usize>>>;

    /// Drops any state kept for the region starting at `base`.
    fn forget(&self, _base: usize) {}
}

/// Pushes the page `[start, end)` onto `ranges`, extending the last range
/// when they touch.
fn push_merged(ranges: &mut Vec<Range<usize>>, start: usize, end: usize) {
    match ranges.last_mut() {
        Some(last) if last.end == start => last.end = end,
        _ => ranges.push(start..end),
    }
}

/// Portable tracker: keeps a snapshot of every region and diffs it page by
/// page. The first query of a region reports all of it.
#[derive(Debug)]
pub struct ShadowCopyTracker {
    page_size: usize,
    snapshots: Mutex<HashMap<usize, Vec<u8>>>,
}

impl Default for ShadowCopyTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE.into())
    }
}

impl ShadowCopyTracker {
    pub fn new(page_size: usize) -> Self {
        assert!(page_size.is_power_of_two());
        Self {
            page_size,
            snapshots: Mutex::new(HashMap::new()),
        }
    }
}

impl DirtyPageTracker for ShadowCopyTracker {
    unsafe fn collect(&self, base: usize, size: usize) -> CaptureResult<Vec<Range<usize>>> {
        if size == 0 {
            return Ok(Vec::new());
        }
        let current = std::slice::from_raw_parts(base as *const u8, size);
        let mut snapshots = self.snapshots.lock();

        let mut ranges = Vec::new();
        match snapshots.get_mut(&base) {
            Some(snapshot) if snapshot.len() == size => {
                for start in (0..size).step_by(self.page_size) {
                    let end = (start + self.page_size).min(size);
                    if current[start..end] != snapshot[start..end] {
                        snapshot[start..end].copy_from_slice(&current[start..end]);
                        push_merged(&mut ranges, start, end);
                    }
                }
            }
            _ => {
                snapshots.insert(base, current.to_vec());
                ranges.push(0..size);
            }
        }
        Ok(ranges)
    }

    fn forget(&self, base: usize) {
        self.snapshots.lock().remove(&base);
    }
}

#[cfg(windows)]
pub use self::os::WriteWatchTracker;

#[cfg(windows)]
mod os {
    use std::ops::Range;
    use std::ptr;

    use winapi::shared::basetsd::ULONG_PTR;
    use winapi::shared::minwindef::DWORD;
    use winapi::um::memoryapi::GetWriteWatch;
    use winapi::um::sysinfoapi::{GetSystemInfo, SYSTEM_INFO};
    use winapi::um::winnt::PVOID;

    use super::{push_merged, DirtyPageTracker};
    use crate::{align_down, align_to_multiple, CaptureError, CaptureResult};

    const WRITE_WATCH_FLAG_RESET: DWORD = 0x01;

    /// Asks the OS for pages written since the last reset. Only works for
    /// memory of heaps created with `D3D12_HEAP_FLAG_ALLOW_WRITE_WATCH`.
    #[derive(Debug)]
    pub struct WriteWatchTracker {
        page_size: usize,
    }

    impl Default for WriteWatchTracker {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WriteWatchTracker {
        pub fn new() -> Self {
            let page_size = unsafe {
                let mut info: SYSTEM_INFO = std::mem::zeroed();
                GetSystemInfo(&mut info);
                info.dwPageSize as usize
            };
            Self { page_size }
        }
    }

    impl DirtyPageTracker for WriteWatchTracker {
        unsafe fn collect(&self, base: usize, size: usize) -> CaptureResult<Vec<Range<usize>>> {
            if size == 0 {
                return Ok(Vec::new());
            }
            // Mapped subresources need not start on a page boundary.
            let page_size = self.page_size as u64;
            let region_start = align_down(base as u64, page_size) as usize;
            let region_end = align_to_multiple((base + size) as u64, page_size) as usize;
            let region_size = region_end - region_start;

            let capacity = region_size / self.page_size;
            let mut addresses: Vec<PVOID> = vec![ptr::null_mut(); capacity];
            let mut count = capacity as ULONG_PTR;
            let mut granularity: DWORD = 0;

            let result = GetWriteWatch(
                WRITE_WATCH_FLAG_RESET,
                region_start as PVOID,
                region_size,
                addresses.as_mut_ptr(),
                &mut count,
                &mut granularity,
            );
            if result != 0 {
                return Err(CaptureError::WriteWatch { base, size });
            }

            let page = granularity as usize;
            let mut ranges = Vec::new();
            for address in &addresses[..count as usize] {
                let page_start = *address as usize;
                let start = page_start.saturating_sub(base);
                let end = (page_start + page).saturating_sub(base).min(size);
                if start < end {
                    push_merged(&mut ranges, start, end);
                }
            }
            Ok(ranges)
        }
    }
}

/// Write-watch when asked for and available, otherwise shadow copies.
pub fn default_tracker(use_write_watch: bool) -> Box<dyn DirtyPageTracker> {
    #[cfg(windows)]
    {
        if use_write_watch {
            return Box::new(WriteWatchTracker::new());
        }
    }
    #[cfg(not(windows))]
    {
        if use_write_watch {
            log_once!(
                warn,
                "Write watch is unavailable on this platform, falling back to shadow copies"
            );
        }
    }
    Box::new(ShadowCopyTracker::default())
}
