//! Conversion between caller records and native engine records.
//!
//! Conversions are all-or-nothing. Every field is read or decoded before the
//! result is built, so a failure never leaves a partly populated record.

use crate::buffer::NativeBuffer;
use crate::error::{MatcherError, MatcherResult};
use crate::native::{IbsmImageData, IbsmTemplate, IBSM_MAX_MINUTIAE_SIZE, MINUTIAE_BYTES};
use lib_types::{decode, ImageRecord, NativeCode, TemplateRecord};
use std::ffi::c_uint;
use std::mem;

/// A native image record together with the pixel buffer it points into.
///
/// The buffer is released exactly once, when this value is dropped.
#[derive(Debug)]
pub struct NativeImage {
    raw: IbsmImageData,
    _pixels: NativeBuffer,
}

impl NativeImage {
    /// The record handed to the engine.
    pub fn raw(&self) -> &IbsmImageData {
        &self.raw
    }
}

/// Build a native image from a caller record, copying the pixels into a
/// freshly allocated buffer.
pub fn image_to_native(record: &ImageRecord) -> MatcherResult<NativeImage> {
    let length = c_uint::try_from(record.image_data.len()).map_err(|_| {
        MatcherError::field_access(
            "imageDataLength",
            format!("{} bytes exceed the native length field", record.image_data.len()),
        )
    })?;

    let mut pixels = NativeBuffer::copy_from(&record.image_data)?;
    let raw = IbsmImageData {
        image_format: record.image_format.to_code(),
        impression_type: record.impression_type.to_code(),
        finger_position: record.finger_position.to_code(),
        capture_device_tech_id: record.capture_device_tech_id.to_code(),
        capture_device_vendor_id: record.capture_device_vendor_id,
        capture_device_type_id: record.capture_device_type_id,
        scan_sampling_x: record.scan_sampling_x,
        scan_sampling_y: record.scan_sampling_y,
        image_sampling_x: record.image_sampling_x,
        image_sampling_y: record.image_sampling_y,
        image_size_x: record.image_size_x,
        image_size_y: record.image_size_y,
        scale_unit: record.scale_unit,
        bit_depth: record.bit_depth,
        image_data_length: length,
        image_data: pixels.as_mut_ptr(),
    };

    Ok(NativeImage {
        raw,
        _pixels: pixels,
    })
}

/// Build a caller record from a native image, copying the pixels out.
///
/// # Safety
///
/// `raw.image_data` must be null or point to `raw.image_data_length`
/// readable bytes for the duration of the call.
pub unsafe fn image_from_native(raw: &IbsmImageData) -> MatcherResult<ImageRecord> {
    let image_format = decode(raw.image_format)?;
    let impression_type = decode(raw.impression_type)?;
    let finger_position = decode(raw.finger_position)?;
    let capture_device_tech_id = decode(raw.capture_device_tech_id)?;

    // SAFETY: forwarded from this function's contract
    let pixels = unsafe { raw.pixels() }?;
    let mut image_data = Vec::new();
    image_data.try_reserve_exact(pixels.len()).map_err(|e| {
        MatcherError::AllocationFailed(format!("{} byte image record: {e}", pixels.len()))
    })?;
    image_data.extend_from_slice(pixels);

    Ok(ImageRecord {
        image_format,
        impression_type,
        finger_position,
        capture_device_tech_id,
        capture_device_vendor_id: raw.capture_device_vendor_id,
        capture_device_type_id: raw.capture_device_type_id,
        scan_sampling_x: raw.scan_sampling_x,
        scan_sampling_y: raw.scan_sampling_y,
        image_sampling_x: raw.image_sampling_x,
        image_sampling_y: raw.image_sampling_y,
        image_size_x: raw.image_size_x,
        image_size_y: raw.image_size_y,
        scale_unit: raw.scale_unit,
        bit_depth: raw.bit_depth,
        image_data,
    })
}

/// Build a native template. Minutiae shorter than the fixed buffer are zero
/// padded; longer minutiae are rejected.
pub fn template_to_native(record: &TemplateRecord) -> MatcherResult<IbsmTemplate> {
    if record.minutiae.len() > MINUTIAE_BYTES {
        return Err(MatcherError::field_access(
            "minutiae",
            format!(
                "{} bytes exceed the {MINUTIAE_BYTES} byte buffer",
                record.minutiae.len()
            ),
        ));
    }

    let mut minutiae = [0 as c_uint; IBSM_MAX_MINUTIAE_SIZE];
    for (word, chunk) in minutiae
        .iter_mut()
        .zip(record.minutiae.chunks(mem::size_of::<c_uint>()))
    {
        let mut bytes = [0u8; 4];
        bytes[..chunk.len()].copy_from_slice(chunk);
        *word = c_uint::from_ne_bytes(bytes);
    }

    Ok(IbsmTemplate {
        version: record.version.to_code(),
        finger_position: record.finger_position.to_code(),
        impression_type: record.impression_type.to_code(),
        capture_device_tech_id: record.capture_device_tech_id.to_code(),
        capture_device_vendor_id: record.capture_device_vendor_id,
        capture_device_type_id: record.capture_device_type_id,
        image_sampling_x: record.image_sampling_x,
        image_sampling_y: record.image_sampling_y,
        image_size_x: record.image_size_x,
        image_size_y: record.image_size_y,
        minutiae,
        reserved: record.reserved,
    })
}

/// Build a caller template. The minutiae always carry the full fixed buffer.
pub fn template_from_native(raw: &IbsmTemplate) -> MatcherResult<TemplateRecord> {
    let version = decode(raw.version)?;
    let finger_position = decode(raw.finger_position)?;
    let impression_type = decode(raw.impression_type)?;
    let capture_device_tech_id = decode(raw.capture_device_tech_id)?;

    let mut minutiae = Vec::new();
    minutiae
        .try_reserve_exact(MINUTIAE_BYTES)
        .map_err(|e| MatcherError::AllocationFailed(format!("template minutiae: {e}")))?;
    for word in raw.minutiae {
        minutiae.extend_from_slice(&word.to_ne_bytes());
    }

    Ok(TemplateRecord {
        version,
        finger_position,
        impression_type,
        capture_device_tech_id,
        capture_device_vendor_id: raw.capture_device_vendor_id,
        capture_device_type_id: raw.capture_device_type_id,
        image_sampling_x: raw.image_sampling_x,
        image_sampling_y: raw.image_sampling_y,
        image_size_x: raw.image_size_x,
        image_size_y: raw.image_size_y,
        minutiae,
        reserved: raw.reserved,
    })
}

/// A fixed group of native images converted for one engine call.
///
/// Buffers are released in reverse order of acquisition, both on drop after
/// the call and when a later conversion in the group fails.
pub struct ImageSet<const N: usize> {
    images: Vec<NativeImage>,
}

impl<const N: usize> ImageSet<N> {
    /// Convert every record, stopping at the first failure.
    pub fn convert(records: [&ImageRecord; N]) -> MatcherResult<Self> {
        let mut set = Self {
            images: Vec::with_capacity(N),
        };
        for (index, record) in records.into_iter().enumerate() {
            let image = image_to_native(record).map_err(|e| {
                tracing::warn!(index, error = %e, "unable to convert image {} of {}", index + 1, N);
                e
            })?;
            set.images.push(image);
        }
        Ok(set)
    }

    /// The native records in input order.
    pub fn raws(&self) -> [&IbsmImageData; N] {
        std::array::from_fn(|i| self.images[i].raw())
    }
}

impl<const N: usize> Drop for ImageSet<N> {
    fn drop(&mut self) {
        while let Some(image) = self.images.pop() {
            drop(image);
        }
    }
}
