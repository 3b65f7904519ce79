//! Image and template records as seen by callers of the matcher.

use crate::codes::{CaptureDeviceTechId, FingerPosition, ImageFormat, ImpressionType, TemplateVersion};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capture device type IDs reported by Integrated Biometrics scanners.
pub mod device_type {
    pub const UNKNOWN: u16 = 0x0000;
    pub const CURVE: u16 = 0x1001;
    pub const WATSON: u16 = 0x1005;
    pub const SHERLOCK: u16 = 0x0010;
    pub const WATSON_MINI: u16 = 0x0020;
    pub const COLUMBO: u16 = 0x0030;
    pub const HOLMES: u16 = 0x0040;
}

/// Capture device vendor IDs.
pub mod vendor {
    pub const UNREPORTED: u16 = 0x0000;
    pub const INTEGRATED_BIOMETRICS: u16 = 0xABCD;
}

/// Units for the sampling rate fields.
pub mod scale_unit {
    pub const INCH: u8 = 0x01;
    pub const CENTIMETER: u8 = 0x02;
}

/// Product and file version strings of the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkVersion {
    pub product: String,
    pub file: String,
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Product: {}", self.product)?;
        writeln!(f, "File: {}", self.file)
    }
}

/// A fingerprint image with its capture metadata.
///
/// The pixel length is always `image_data.len()`; there is no separate
/// length field to drift out of sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_format: ImageFormat,
    pub impression_type: ImpressionType,
    pub finger_position: FingerPosition,
    pub capture_device_tech_id: CaptureDeviceTechId,
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
    pub image_data: Vec<u8>,
}

impl ImageRecord {
    /// Uncompressed 8-bit grayscale image at 500 ppi.
    pub fn grayscale(width: u16, height: u16, pixels: Vec<u8>) -> Self {
        Self {
            image_format: ImageFormat::NoBitPacking,
            impression_type: ImpressionType::LiveScanPlain,
            finger_position: FingerPosition::Unknown,
            capture_device_tech_id: CaptureDeviceTechId::UnknownOrUnspecified,
            capture_device_vendor_id: vendor::UNREPORTED,
            capture_device_type_id: device_type::UNKNOWN,
            scan_sampling_x: 500,
            scan_sampling_y: 500,
            image_sampling_x: 500,
            image_sampling_y: 500,
            image_size_x: width,
            image_size_y: height,
            scale_unit: scale_unit::INCH,
            bit_depth: 8,
            image_data: pixels,
        }
    }

    /// Length of the pixel buffer in bytes.
    pub fn image_data_length(&self) -> usize {
        self.image_data.len()
    }
}

impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image format = {}", self.image_format)?;
        writeln!(f, "Impression type = {}", self.impression_type)?;
        writeln!(f, "Finger position = {}", self.finger_position)?;
        writeln!(f, "Capture device technology = {}", self.capture_device_tech_id)?;
        writeln!(f, "Capture device vendor = {:#06x}", self.capture_device_vendor_id)?;
        writeln!(f, "Capture device type = {:#06x}", self.capture_device_type_id)?;
        writeln!(f, "Scan sampling = {} x {}", self.scan_sampling_x, self.scan_sampling_y)?;
        writeln!(f, "Image sampling = {} x {}", self.image_sampling_x, self.image_sampling_y)?;
        writeln!(f, "Image size = {} x {}", self.image_size_x, self.image_size_y)?;
        writeln!(f, "Bit depth = {}", self.bit_depth)?;
        writeln!(f, "Image data length = {}", self.image_data.len())
    }
}

/// A minutiae template with the metadata of the image it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub version: TemplateVersion,
    pub finger_position: FingerPosition,
    pub impression_type: ImpressionType,
    pub capture_device_tech_id: CaptureDeviceTechId,
    pub capture_device_vendor_id: u16,
    pub capture_device_type_id: u16,
    pub image_sampling_x: u16,
    pub image_sampling_y: u16,
    pub image_size_x: u16,
    pub image_size_y: u16,
    /// Encoded minutiae. Records produced by the engine always carry the
    /// full fixed-size buffer, zero padded past the last minutia.
    pub minutiae: Vec<u8>,
    pub reserved: u32,
}

impl fmt::Display for TemplateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Template version = {}", self.version)?;
        writeln!(f, "Impression type = {}", self.impression_type)?;
        writeln!(f, "Finger position = {}", self.finger_position)?;
        writeln!(f, "Capture device technology = {}", self.capture_device_tech_id)?;
        writeln!(f, "Capture device vendor = {:#06x}", self.capture_device_vendor_id)?;
        writeln!(f, "Capture device type = {:#06x}", self.capture_device_type_id)?;
        writeln!(f, "Image sampling = {} x {}", self.image_sampling_x, self.image_sampling_y)?;
        writeln!(f, "Image size = {} x {}", self.image_size_x, self.image_size_y)
    }
}
