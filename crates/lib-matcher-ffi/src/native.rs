//! Fixed-layout records exchanged with the matcher engine.
//!
//! These mirror `IBScanMatcherApi_defs.h` field for field. Widths are part of
//! the engine's ABI and must not change.

use crate::error::{MatcherError, MatcherResult};
use lib_types::SdkVersion;
use std::ffi::{c_char, c_int, c_uint, c_void, CStr};
use std::ptr;

/// Length of each string in `IBSM_SDKVersion`, terminator included.
pub const IBSM_MAX_STR_LEN: usize = 128;

/// Number of 32-bit words in a template's minutiae buffer.
pub const IBSM_MAX_MINUTIAE_SIZE: usize = 255 + 2;

/// Size in bytes of a template's minutiae buffer.
pub const MINUTIAE_BYTES: usize = IBSM_MAX_MINUTIAE_SIZE * std::mem::size_of::<c_uint>();

/// Handle value stored when the engine has not produced one.
pub const INVALID_HANDLE: c_int = -1;

/// `IBSM_ImageData`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct IbsmImageData {
    pub image_format: c_int,
    pub impression_type: c_int,
    pub finger_position: c_int,
    pub capture_device_tech_id: c_int,
    pub capture_device_vendor_id: u16,
    pub capture_device_type_id: u16,
    pub scan_sampling_x: u16,
    pub scan_sampling_y: u16,
    pub image_sampling_x: u16,
    pub image_sampling_y: u16,
    pub image_size_x: u16,
    pub image_size_y: u16,
    pub scale_unit: u8,
    pub bit_depth: u8,
    pub image_data_length: c_uint,
    pub image_data: *mut c_void,
}

impl IbsmImageData {
    /// All fields zero, no pixel buffer.
    pub fn zeroed() -> Self {
        Self {
            image_format: 0,
            impression_type: 0,
            finger_position: 0,
            capture_device_tech_id: 0,
            capture_device_vendor_id: 0,
            capture_device_type_id: 0,
            scan_sampling_x: 0,
            scan_sampling_y: 0,
            image_sampling_x: 0,
            image_sampling_y: 0,
            image_size_x: 0,
            image_size_y: 0,
            scale_unit: 0,
            bit_depth: 0,
            image_data_length: 0,
            image_data: ptr::null_mut(),
        }
    }

    /// Borrow the pixel buffer this record points at.
    ///
    /// # Safety
    ///
    /// `image_data` must be null or point to at least `image_data_length`
    /// readable bytes that stay valid for the returned lifetime.
    pub unsafe fn pixels(&self) -> MatcherResult<&[u8]> {
        let length = self.image_data_length as usize;
        if length == 0 {
            return Ok(&[]);
        }
        if self.image_data.is_null() {
            return Err(MatcherError::field_access(
                "imageData",
                format!("null buffer with length {length}"),
            ));
        }
        // SAFETY: non-null and sized by the caller's contract
        Ok(unsafe { std::slice::from_raw_parts(self.image_data as *const u8, length) })
    }
}

/// `IBSM_Template`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IbsmTemplate {
    pub version: c_int,
    pub finger_position: c_int,
    pub impression_type: c_int,
    pub capture_device_tech_id: c_int,
    pub capture_device_vendor_id: u16,
    pub capture_device_type_id: u16,
    pub image_sampling_x: u16,
    pub image_sampling_y: u16,
    pub image_size_x: u16,
    pub image_size_y: u16,
    pub minutiae: [c_uint; IBSM_MAX_MINUTIAE_SIZE],
    pub reserved: c_uint,
}

impl IbsmTemplate {
    pub fn zeroed() -> Self {
        Self {
            version: 0,
            finger_position: 0,
            impression_type: 0,
            capture_device_tech_id: 0,
            capture_device_vendor_id: 0,
            capture_device_type_id: 0,
            image_sampling_x: 0,
            image_sampling_y: 0,
            image_size_x: 0,
            image_size_y: 0,
            minutiae: [0; IBSM_MAX_MINUTIAE_SIZE],
            reserved: 0,
        }
    }
}

/// `IBSM_SDKVersion`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct IbsmSdkVersion {
    pub product: [c_char; IBSM_MAX_STR_LEN],
    pub file: [c_char; IBSM_MAX_STR_LEN],
}

impl IbsmSdkVersion {
    pub fn zeroed() -> Self {
        Self {
            product: [0; IBSM_MAX_STR_LEN],
            file: [0; IBSM_MAX_STR_LEN],
        }
    }

    /// Copy both strings out of the engine record.
    pub fn to_managed(&self) -> MatcherResult<SdkVersion> {
        Ok(SdkVersion {
            product: fixed_c_string("product", &self.product)?,
            file: fixed_c_string("file", &self.file)?,
        })
    }
}

/// Read a NUL-terminated string from a fixed-size field.
fn fixed_c_string(field: &'static str, raw: &[c_char]) -> MatcherResult<String> {
    // SAFETY: c_char and u8 have identical size and alignment
    let bytes = unsafe { std::slice::from_raw_parts(raw.as_ptr() as *const u8, raw.len()) };
    let text = CStr::from_bytes_until_nul(bytes)
        .map_err(|_| MatcherError::field_access(field, "missing terminator"))?;
    Ok(text.to_string_lossy().into_owned())
}

/// Storage words reserved for an ISO interchange record header.
pub const ISO_RECORD_WORDS: usize = 64;

/// `ISO_FIR`: fingerprint image record container (ISO/IEC 19794-4).
///
/// The layout belongs to the engine; this layer only zero-initialises it and
/// hands it back.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct IsoFir {
    #[allow(dead_code)]
    storage: [u64; ISO_RECORD_WORDS],
}

impl Default for IsoFir {
    fn default() -> Self {
        Self {
            storage: [0; ISO_RECORD_WORDS],
        }
    }
}

/// `ISO_FMR`: fingerprint minutiae record container (ISO/IEC 19794-2).
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct IsoFmr {
    #[allow(dead_code)]
    storage: [u64; ISO_RECORD_WORDS],
}

impl Default for IsoFmr {
    fn default() -> Self {
        Self {
            storage: [0; ISO_RECORD_WORDS],
        }
    }
}

/// Engine-owned array returned through a pointer/count out-parameter pair.
///
/// The memory stays with the engine and is only valid until the next call on
/// the same handle.
#[derive(Debug)]
pub struct EngineArray<T> {
    pub items: *mut T,
    pub count: c_int,
}

impl<T> EngineArray<T> {
    pub fn empty() -> Self {
        Self {
            items: ptr::null_mut(),
            count: 0,
        }
    }

    /// View the array.
    ///
    /// # Safety
    ///
    /// `items` must be null or point to `count` initialised elements owned by
    /// the engine for the returned lifetime.
    pub unsafe fn as_slice(&self) -> MatcherResult<&[T]> {
        if self.count <= 0 {
            return Ok(&[]);
        }
        if self.items.is_null() {
            return Err(MatcherError::field_access(
                "records",
                format!("null array with count {}", self.count),
            ));
        }
        // SAFETY: non-null and sized by the caller's contract
        Ok(unsafe { std::slice::from_raw_parts(self.items, self.count as usize) })
    }
}
