#![allow(non_upper_case_globals)]

use crate::raw_bindings::d3d12::*;
use crate::utils::*;

pub const DEFAULT_RESOURCE_ALIGNMENT: Bytes =
    Bytes(D3D12_DEFAULT_RESOURCE_PLACEMENT_ALIGNMENT as u64);

// Granularity used by the portable dirty-page tracker; the write-watch
// tracker asks the OS instead.
pub const DEFAULT_PAGE_SIZE: Bytes = Bytes(4096);

const_assert!(DEFAULT_PAGE_SIZE.0.is_power_of_two());
const_assert!(DEFAULT_RESOURCE_ALIGNMENT.0 % DEFAULT_PAGE_SIZE.0 == 0);
