//! Closed code enumerations for image and template metadata.
//!
//! Every enumeration here crosses the native boundary as a 32-bit integer.
//! The translation goes through [`NativeCode`] in both directions; raw
//! integers are never reinterpreted as variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-way mapping between a closed enumeration and its native integer code.
pub trait NativeCode: Sized + Copy {
    /// Name used in diagnostics when a code does not map to a variant.
    const NAME: &'static str;

    /// Native integer code for this variant.
    fn to_code(self) -> i32;

    /// Variant for a native code, if the code is known.
    fn from_code(code: i32) -> Option<Self>;
}

macro_rules! native_codes {
    (
        $(#[$meta:meta])*
        $name:ident : $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants in code order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];
        }

        impl NativeCode for $name {
            const NAME: &'static str = $label;

            fn to_code(self) -> i32 {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            fn from_code(code: i32) -> Option<Self> {
                match code {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

native_codes! {
    /// Encoding of the pixel buffer.
    ImageFormat: "imageFormat" {
        /// Uncompressed, one sample per byte.
        NoBitPacking = 0,
        /// Uncompressed, bit packed.
        BitPacked = 1,
        Wsq = 2,
        JpegLossy = 3,
        Jpeg2000Lossy = 4,
        Jpeg2000Lossless = 5,
        Png = 6,
        Unknown = 7,
    }
}

native_codes! {
    /// How the finger was presented to the sensor.
    ImpressionType: "impressionType" {
        LiveScanPlain = 0,
        LiveScanRolled = 1,
        NonliveScanPlain = 2,
        NonliveScanRolled = 3,
        LatentImpression = 4,
        LatentTracing = 5,
        LatentPhoto = 6,
        LatentLift = 7,
        LiveScanSwipe = 8,
        LiveScanVerticalSwipe = 9,
        LiveScanContactless = 24,
        Other = 28,
        Unknown = 29,
    }
}

native_codes! {
    /// Finger or finger group captured in the image.
    FingerPosition: "fingerPosition" {
        Unknown = 0,
        RightThumb = 1,
        RightIndexFinger = 2,
        RightMiddleFinger = 3,
        RightRingFinger = 4,
        RightLittleFinger = 5,
        LeftThumb = 6,
        LeftIndexFinger = 7,
        LeftMiddleFinger = 8,
        LeftRingFinger = 9,
        LeftLittleFinger = 10,
        PlainRightFourFingers = 13,
        PlainLeftFourFingers = 14,
        PlainThumbs = 15,
    }
}

native_codes! {
    /// Sensing technology of the capture device.
    CaptureDeviceTechId: "captureDeviceTechId" {
        UnknownOrUnspecified = 0,
        WhiteLightOpticalTir = 1,
        WhiteLightOpticalDirectViewOnPlaten = 2,
        WhiteLightOpticalTouchless = 3,
        MonochromaticVisibleOpticalTir = 4,
        MonochromaticVisibleOpticalDirectViewOnPlaten = 5,
        MonochromaticVisibleOpticalTouchless = 6,
        MonochromaticIrOpticalTir = 7,
        MonochromaticIrOpticalDirectViewOnPlaten = 8,
        MonochromaticIrOpticalTouchless = 9,
        MultispectralOpticalTir = 10,
        MultispectralOpticalDirectViewOnPlaten = 11,
        MultispectralOpticalTouchless = 12,
        ElectroLuminescent = 13,
        SemiconductorCapacitive = 14,
        SemiconductorRf = 15,
        SemiconductorThermal = 16,
        PressureSensitive = 17,
        Ultrasound = 18,
        Mechanical = 19,
        GlassFiber = 20,
    }
}

native_codes! {
    /// Template encoding revision produced by the engine.
    TemplateVersion: "version" {
        IbiSdk0 = 0,
        IbiSdk1 = 1,
        IbiSdk2 = 2,
        IbiSdk3 = 3,
        New0 = 16,
    }
}

/// Decode a native code, naming the field on failure.
pub fn decode<T: NativeCode>(code: i32) -> Result<T, UnknownCode> {
    T::from_code(code).ok_or(UnknownCode {
        field: T::NAME,
        code,
    })
}

/// A native code with no matching variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} code {code}")]
pub struct UnknownCode {
    pub field: &'static str,
    pub code: i32,
}
