//! The native engine primitives.
//!
//! [`MatcherEngine`] is the raw call surface of `IBScanMatcher`: native
//! records in, out-parameters filled, an `i32` status back. Nothing above this
//! trait touches a function pointer.

use crate::error::{MatcherError, MatcherResult};
use crate::native::{EngineArray, IbsmImageData, IbsmSdkVersion, IbsmTemplate, IsoFir, IsoFmr};
use crate::registry;
use crate::loader::Symbols;
use lib_types::StatusCode;
use std::ffi::{c_int, CStr};

/// Raw engine primitives.
///
/// Output records filled by the engine (compressed, decompressed, loaded or
/// converted images and the ISO record arrays) point into engine-owned memory
/// that stays valid only until the next call on the same handle.
pub trait MatcherEngine {
    /// Fingerprint image interchange container.
    type Fir: Default;
    /// Fingerprint minutiae interchange container.
    type Fmr: Default;

    fn get_sdk_version(&mut self, version: &mut IbsmSdkVersion) -> i32;
    fn open_matcher(&mut self, handle: &mut c_int) -> i32;
    fn close_matcher(&mut self, handle: c_int) -> i32;

    fn extract_template(
        &mut self,
        handle: c_int,
        image: &IbsmImageData,
        template: &mut IbsmTemplate,
    ) -> i32;
    fn compress_image(
        &mut self,
        handle: c_int,
        image: &IbsmImageData,
        output: &mut IbsmImageData,
        format: c_int,
    ) -> i32;
    fn decompress_image(
        &mut self,
        handle: c_int,
        image: &IbsmImageData,
        output: &mut IbsmImageData,
    ) -> i32;

    fn save_image(&mut self, handle: c_int, path: &CStr, image: &IbsmImageData) -> i32;
    fn open_image(&mut self, handle: c_int, path: &CStr, image: &mut IbsmImageData) -> i32;

    fn image_to_fir(&mut self, handle: c_int, image: &IbsmImageData, fir: &mut Self::Fir) -> i32;
    fn fir_to_images(
        &mut self,
        handle: c_int,
        fir: &Self::Fir,
        images: &mut EngineArray<IbsmImageData>,
    ) -> i32;
    fn save_fir(&mut self, handle: c_int, path: &CStr, fir: &Self::Fir) -> i32;
    fn open_fir(&mut self, handle: c_int, path: &CStr, fir: &mut Self::Fir) -> i32;

    fn save_template(&mut self, handle: c_int, path: &CStr, template: &IbsmTemplate) -> i32;
    fn open_template(&mut self, handle: c_int, path: &CStr, template: &mut IbsmTemplate) -> i32;

    fn template_to_fmr(&mut self, handle: c_int, template: &IbsmTemplate, fmr: &mut Self::Fmr)
        -> i32;
    fn fmr_to_templates(
        &mut self,
        handle: c_int,
        fmr: &Self::Fmr,
        templates: &mut EngineArray<IbsmTemplate>,
    ) -> i32;
    fn save_fmr(&mut self, handle: c_int, path: &CStr, fmr: &Self::Fmr) -> i32;
    fn open_fmr(&mut self, handle: c_int, path: &CStr, fmr: &mut Self::Fmr) -> i32;

    fn match_templates(
        &mut self,
        handle: c_int,
        first: &IbsmTemplate,
        second: &IbsmTemplate,
        score: &mut c_int,
    ) -> i32;
    fn set_matching_level(&mut self, handle: c_int, level: c_int) -> i32;
    fn get_matching_level(&mut self, handle: c_int, level: &mut c_int) -> i32;

    fn single_enrollment(
        &mut self,
        handle: c_int,
        images: [&IbsmImageData; 3],
        template: &mut IbsmTemplate,
    ) -> i32;
    fn multi_enrollment(
        &mut self,
        handle: c_int,
        images: [&IbsmImageData; 6],
        first: &mut IbsmTemplate,
        second: &mut IbsmTemplate,
    ) -> i32;
}

/// Engine backed by the entry points of the loaded library.
#[derive(Clone, Copy, Debug)]
pub struct LibraryEngine {
    symbols: &'static Symbols,
}

impl LibraryEngine {
    pub fn new(symbols: &'static Symbols) -> Self {
        Self { symbols }
    }

    /// Engine over the process-wide registry.
    ///
    /// Succeeds even when some entry points are missing; calling one of those
    /// reports `MissingResource` instead.
    pub fn from_registry() -> MatcherResult<Self> {
        let registry = registry::get().ok_or(MatcherError::NotInitialized)?;
        Ok(Self::new(registry.symbols()))
    }
}

fn unresolved(primitive: &'static str) -> i32 {
    tracing::warn!(primitive, "engine primitive unavailable");
    StatusCode::MissingResource.to_code()
}

macro_rules! invoke {
    ($self:ident . $field:ident ( $( $arg:expr ),* $(,)? )) => {
        match $self.symbols.$field {
            // SAFETY: the pointer was resolved under this entry point's
            // declared signature and every argument outlives the call
            Some(entry) => unsafe { entry($( $arg ),*) },
            None => unresolved(stringify!($field)),
        }
    };
}

impl MatcherEngine for LibraryEngine {
    type Fir = IsoFir;
    type Fmr = IsoFmr;

    fn get_sdk_version(&mut self, version: &mut IbsmSdkVersion) -> i32 {
        invoke!(self.get_sdk_version(version))
    }

    fn open_matcher(&mut self, handle: &mut c_int) -> i32 {
        invoke!(self.open_matcher(handle))
    }

    fn close_matcher(&mut self, handle: c_int) -> i32 {
        invoke!(self.close_matcher(handle))
    }

    fn extract_template(
        &mut self,
        handle: c_int,
        image: &IbsmImageData,
        template: &mut IbsmTemplate,
    ) -> i32 {
        invoke!(self.extract_template(handle, *image, template))
    }

    fn compress_image(
        &mut self,
        handle: c_int,
        image: &IbsmImageData,
        output: &mut IbsmImageData,
        format: c_int,
    ) -> i32 {
        invoke!(self.compress_image(handle, *image, output, format))
    }

    fn decompress_image(
        &mut self,
        handle: c_int,
        image: &IbsmImageData,
        output: &mut IbsmImageData,
    ) -> i32 {
        invoke!(self.decompress_image(handle, *image, output))
    }

    fn save_image(&mut self, handle: c_int, path: &CStr, image: &IbsmImageData) -> i32 {
        invoke!(self.save_image(handle, path.as_ptr(), *image))
    }

    fn open_image(&mut self, handle: c_int, path: &CStr, image: &mut IbsmImageData) -> i32 {
        invoke!(self.open_image(handle, path.as_ptr(), image))
    }

    fn image_to_fir(&mut self, handle: c_int, image: &IbsmImageData, fir: &mut IsoFir) -> i32 {
        invoke!(self.image_to_fir(handle, *image, fir))
    }

    fn fir_to_images(
        &mut self,
        handle: c_int,
        fir: &IsoFir,
        images: &mut EngineArray<IbsmImageData>,
    ) -> i32 {
        invoke!(self.fir_to_images(handle, *fir, &mut images.items, &mut images.count))
    }

    fn save_fir(&mut self, handle: c_int, path: &CStr, fir: &IsoFir) -> i32 {
        invoke!(self.save_fir(handle, path.as_ptr(), *fir))
    }

    fn open_fir(&mut self, handle: c_int, path: &CStr, fir: &mut IsoFir) -> i32 {
        invoke!(self.open_fir(handle, path.as_ptr(), fir))
    }

    fn save_template(&mut self, handle: c_int, path: &CStr, template: &IbsmTemplate) -> i32 {
        invoke!(self.save_template(handle, path.as_ptr(), *template))
    }

    fn open_template(&mut self, handle: c_int, path: &CStr, template: &mut IbsmTemplate) -> i32 {
        invoke!(self.open_template(handle, path.as_ptr(), template))
    }

    fn template_to_fmr(&mut self, handle: c_int, template: &IbsmTemplate, fmr: &mut IsoFmr) -> i32 {
        invoke!(self.template_to_fmr(handle, *template, fmr))
    }

    fn fmr_to_templates(
        &mut self,
        handle: c_int,
        fmr: &IsoFmr,
        templates: &mut EngineArray<IbsmTemplate>,
    ) -> i32 {
        invoke!(self.fmr_to_templates(handle, *fmr, &mut templates.items, &mut templates.count))
    }

    fn save_fmr(&mut self, handle: c_int, path: &CStr, fmr: &IsoFmr) -> i32 {
        invoke!(self.save_fmr(handle, path.as_ptr(), *fmr))
    }

    fn open_fmr(&mut self, handle: c_int, path: &CStr, fmr: &mut IsoFmr) -> i32 {
        invoke!(self.open_fmr(handle, path.as_ptr(), fmr))
    }

    fn match_templates(
        &mut self,
        handle: c_int,
        first: &IbsmTemplate,
        second: &IbsmTemplate,
        score: &mut c_int,
    ) -> i32 {
        invoke!(self.match_templates(handle, *first, *second, score))
    }

    fn set_matching_level(&mut self, handle: c_int, level: c_int) -> i32 {
        invoke!(self.set_matching_level(handle, level))
    }

    fn get_matching_level(&mut self, handle: c_int, level: &mut c_int) -> i32 {
        invoke!(self.get_matching_level(handle, level))
    }

    fn single_enrollment(
        &mut self,
        handle: c_int,
        images: [&IbsmImageData; 3],
        template: &mut IbsmTemplate,
    ) -> i32 {
        let [a, b, c] = images;
        invoke!(self.single_enrollment(handle, *a, *b, *c, template))
    }

    fn multi_enrollment(
        &mut self,
        handle: c_int,
        images: [&IbsmImageData; 6],
        first: &mut IbsmTemplate,
        second: &mut IbsmTemplate,
    ) -> i32 {
        let [a, b, c, d, e, f] = images;
        invoke!(self.multi_enrollment(handle, *a, *b, *c, *d, *e, *f, first, second))
    }
}
