//! Root-signature slot tables, deserialized from the serialized blob handed to
//! `CreateRootSignature`.
//!
//! The blob is a `DXBC` container; the layout lives in its `RTS0` chunk:
//!
//! ```text
//! RTS0:  version, num_parameters, parameters_offset,
//!        num_static_samplers, static_samplers_offset, flags
//! param: parameter_type, shader_visibility, payload_offset
//! table: num_ranges, ranges_offset
//! range: range_type, num_descriptors, base_register, register_space,
//!        [flags (1.1 and later)], offset_from_table_start
//! ```
//!
//! All offsets are relative to the start of the chunk payload.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::key_registry::Key;
use crate::{
    CaptureError, CaptureResult, DescriptorHeapType, DescriptorRangeType, RootParameterType,
    RootSignatureVersion,
};

const DXBC_MAGIC: [u8; 4] = *b"DXBC";
const RTS0_FOURCC: [u8; 4] = *b"RTS0";
// magic + checksum + reserved + total_size + chunk_count
const DXBC_HEADER_LEN: usize = 4 + 16 + 4 + 4 + 4;
const MAX_CHUNK_COUNT: u32 = 4096;
const MAX_ROOT_PARAMETERS: u32 = 64;

const RTS0_HEADER_LEN: usize = 6 * 4;
const ROOT_PARAMETER_LEN: usize = 3 * 4;
const RANGE_LEN_1_0: usize = 5 * 4;
const RANGE_LEN_1_1: usize = 6 * 4;

fn malformed(message: impl Into<String>) -> CaptureError {
    CaptureError::MalformedRootSignature(message.into())
}

fn read_u32_le(bytes: &[u8], offset: usize) -> CaptureResult<u32> {
    let end = offset
        .checked_add(4)
        .ok_or_else(|| malformed(format!("offset {} overflows", offset)))?;
    let slice = bytes.get(offset..end).ok_or_else(|| {
        malformed(format!(
            "read of 4 bytes at {} is outside {} byte(s)",
            offset,
            bytes.len()
        ))
    })?;
    Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

fn read_fourcc(bytes: &[u8], offset: usize) -> CaptureResult<[u8; 4]> {
    read_u32_le(bytes, offset).map(u32::to_le_bytes)
}

/// Finds the payload of the first chunk tagged `fourcc` in a `DXBC` container.
fn find_chunk<'a>(bytes: &'a [u8], fourcc: [u8; 4]) -> CaptureResult<&'a [u8]> {
    if bytes.len() < DXBC_HEADER_LEN {
        return Err(malformed(format!(
            "need at least {} bytes, got {}",
            DXBC_HEADER_LEN,
            bytes.len()
        )));
    }
    if read_fourcc(bytes, 0)? != DXBC_MAGIC {
        return Err(malformed("missing DXBC magic"));
    }

    let total_size = read_u32_le(bytes, 24)? as usize;
    if total_size < DXBC_HEADER_LEN || total_size > bytes.len() {
        return Err(malformed(format!(
            "total_size {} does not fit buffer of {} byte(s)",
            total_size,
            bytes.len()
        )));
    }
    let bytes = &bytes[..total_size];

    let chunk_count = read_u32_le(bytes, 28)?;
    if chunk_count > MAX_CHUNK_COUNT {
        return Err(malformed(format!("chunk_count {} is implausible", chunk_count)));
    }

    for i in 0..chunk_count as usize {
        let chunk_offset = read_u32_le(bytes, DXBC_HEADER_LEN + i * 4)? as usize;
        if chunk_offset < DXBC_HEADER_LEN {
            return Err(malformed(format!(
                "chunk {} offset {} points into the header",
                i, chunk_offset
            )));
        }
        let tag = read_fourcc(bytes, chunk_offset)?;
        let size = read_u32_le(bytes, chunk_offset + 4)? as usize;
        let data_start = chunk_offset + 8;
        let data_end = data_start
            .checked_add(size)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| malformed(format!("chunk {} data is out of bounds", i)))?;

        if tag == fourcc {
            return Ok(&bytes[data_start..data_end]);
        }
    }

    Err(malformed(format!("no {} chunk", String::from_utf8_lossy(&fourcc))))
}

/// Descriptor heap type each root parameter expects, by parameter index.
/// Non-table parameters and empty tables map to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSignatureRecord {
    pub key: Key,
    slots: Vec<Option<DescriptorHeapType>>,
}

impl RootSignatureRecord {
    pub fn new(key: Key, slots: Vec<Option<DescriptorHeapType>>) -> Self {
        Self { key, slots }
    }

    pub fn parse(key: Key, blob: &[u8]) -> CaptureResult<Self> {
        let chunk = find_chunk(blob, RTS0_FOURCC)?;
        if chunk.len() < RTS0_HEADER_LEN {
            return Err(malformed("RTS0 chunk is shorter than its header"));
        }

        let raw_version = read_u32_le(chunk, 0)? as i32;
        let range_len = match RootSignatureVersion::from_raw(raw_version) {
            Some(RootSignatureVersion::V1_0) => RANGE_LEN_1_0,
            // 1.2 only adds static sampler fields; ranges keep the 1.1 layout.
            Some(RootSignatureVersion::V1_1) | Some(RootSignatureVersion::V1_2) => RANGE_LEN_1_1,
            None => {
                return Err(malformed(format!("unsupported RTS0 version {:#x}", raw_version)));
            }
        };

        let num_parameters = read_u32_le(chunk, 4)?;
        if num_parameters > MAX_ROOT_PARAMETERS {
            return Err(malformed(format!(
                "{} root parameters exceed the API limit",
                num_parameters
            )));
        }
        let parameters_offset = read_u32_le(chunk, 8)? as usize;

        let mut slots = Vec::with_capacity(num_parameters as usize);
        for index in 0..num_parameters as usize {
            let entry = parameters_offset + index * ROOT_PARAMETER_LEN;
            let raw_type = read_u32_le(chunk, entry)? as i32;
            let parameter_type = RootParameterType::from_raw(raw_type).ok_or_else(|| {
                malformed(format!("parameter {} has unknown type {}", index, raw_type))
            })?;

            if parameter_type != RootParameterType::DescriptorTable {
                slots.push(None);
                continue;
            }

            let payload = read_u32_le(chunk, entry + 8)? as usize;
            let num_ranges = read_u32_le(chunk, payload)?;
            let ranges_offset = read_u32_le(chunk, payload + 4)? as usize;
            if num_ranges == 0 {
                slots.push(None);
                continue;
            }

            // Tables may not mix samplers with other views, so the first
            // range decides the heap type.
            let ranges_end = (num_ranges as usize)
                .checked_mul(range_len)
                .and_then(|len| len.checked_add(ranges_offset))
                .ok_or_else(|| malformed(format!("parameter {} ranges overflow", index)))?;
            if ranges_end > chunk.len() {
                return Err(malformed(format!(
                    "parameter {} ranges end at {} past chunk of {} byte(s)",
                    index,
                    ranges_end,
                    chunk.len()
                )));
            }
            let raw_range_type = read_u32_le(chunk, ranges_offset)? as i32;
            let range_type = DescriptorRangeType::from_raw(raw_range_type).ok_or_else(|| {
                malformed(format!(
                    "parameter {} has unknown range type {}",
                    index, raw_range_type
                ))
            })?;
            slots.push(Some(range_type.heap_type()));
        }

        Ok(Self { key, slots })
    }

    pub fn descriptor_table_heap_type(&self, slot: u32) -> Option<DescriptorHeapType> {
        self.slots.get(slot as usize).copied().flatten()
    }

    pub fn num_parameters(&self) -> usize {
        self.slots.len()
    }
}

/// Published root-signature records. Records are immutable once created and
/// shared by `Arc`, so readers need no lock after the lookup.
#[derive(Debug, Default)]
pub struct RootSignatureService {
    records: Mutex<HashMap<Key, Arc<RootSignatureRecord>>>,
}

impl RootSignatureService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_root_signature(
        &self,
        key: Key,
        blob: &[u8],
    ) -> CaptureResult<Arc<RootSignatureRecord>> {
        let record = Arc::new(RootSignatureRecord::parse(key, blob)?);
        debug!(
            "Root signature {} has {} parameter(s)",
            key,
            record.num_parameters()
        );
        self.records.lock().insert(key, Arc::clone(&record));
        Ok(record)
    }

    pub fn get(&self, key: Key) -> Option<Arc<RootSignatureRecord>> {
        self.records.lock().get(&key).cloned()
    }

    pub fn destroy(&self, key: Key) -> bool {
        self.records.lock().remove(&key).is_some()
    }
}
