//! Dynamic library loading for the matcher engine.
//!
//! This module loads the vendor-supplied `IBScanMatcher` shared library and
//! resolves its entry points. Resolution never stops at the first missing
//! symbol: every name is attempted and the failures are collected.

use crate::error::{MatcherError, MatcherResult};
use crate::native::{IbsmImageData, IbsmSdkVersion, IbsmTemplate, IsoFir, IsoFmr};
use libloading::Library;
use std::ffi::{c_char, c_int, c_void};
use std::mem;
use std::path::Path;

/// ```c
/// int IBSM_GetSDKVersion(IBSM_SDKVersion *pVerinfo);
/// ```
pub type GetSdkVersionFn = unsafe extern "C" fn(version: *mut IbsmSdkVersion) -> c_int;

/// ```c
/// int IBSM_OpenMatcher(int *pMatcherHandle);
/// ```
pub type OpenMatcherFn = unsafe extern "C" fn(handle: *mut c_int) -> c_int;

pub type CloseMatcherFn = unsafe extern "C" fn(handle: c_int) -> c_int;

/// ```c
/// int IBSM_ExtractTemplate(int handle, IBSM_ImageData image, IBSM_Template *pTemplate);
/// ```
pub type ExtractTemplateFn =
    unsafe extern "C" fn(handle: c_int, image: IbsmImageData, template: *mut IbsmTemplate) -> c_int;

/// ```c
/// int IBSM_CompressImage(int handle, IBSM_ImageData image, IBSM_ImageData *pOut,
///                        IBSM_ImageFormat format);
/// ```
pub type CompressImageFn = unsafe extern "C" fn(
    handle: c_int,
    image: IbsmImageData,
    output: *mut IbsmImageData,
    format: c_int,
) -> c_int;

pub type DecompressImageFn =
    unsafe extern "C" fn(handle: c_int, image: IbsmImageData, output: *mut IbsmImageData) -> c_int;

pub type SaveImageDataFn =
    unsafe extern "C" fn(handle: c_int, path: *const c_char, image: IbsmImageData) -> c_int;

pub type OpenImageDataFn =
    unsafe extern "C" fn(handle: c_int, path: *const c_char, image: *mut IbsmImageData) -> c_int;

pub type ImageToIsoFn =
    unsafe extern "C" fn(handle: c_int, image: IbsmImageData, fir: *mut IsoFir) -> c_int;

/// ```c
/// int IBSM_ConvertImage_ISOtoIBSM(int handle, ISO_FIR fir, IBSM_ImageData **ppImages,
///                                 int *pCount);
/// ```
pub type IsoToImagesFn = unsafe extern "C" fn(
    handle: c_int,
    fir: IsoFir,
    images: *mut *mut IbsmImageData,
    count: *mut c_int,
) -> c_int;

pub type SaveFirFn = unsafe extern "C" fn(handle: c_int, path: *const c_char, fir: IsoFir) -> c_int;

pub type OpenFirFn =
    unsafe extern "C" fn(handle: c_int, path: *const c_char, fir: *mut IsoFir) -> c_int;

pub type SaveTemplateFn =
    unsafe extern "C" fn(handle: c_int, path: *const c_char, template: IbsmTemplate) -> c_int;

pub type OpenTemplateFn =
    unsafe extern "C" fn(handle: c_int, path: *const c_char, template: *mut IbsmTemplate) -> c_int;

pub type TemplateToIsoFn =
    unsafe extern "C" fn(handle: c_int, template: IbsmTemplate, fmr: *mut IsoFmr) -> c_int;

pub type IsoToTemplatesFn = unsafe extern "C" fn(
    handle: c_int,
    fmr: IsoFmr,
    templates: *mut *mut IbsmTemplate,
    count: *mut c_int,
) -> c_int;

pub type SaveFmrFn = unsafe extern "C" fn(handle: c_int, path: *const c_char, fmr: IsoFmr) -> c_int;

pub type OpenFmrFn =
    unsafe extern "C" fn(handle: c_int, path: *const c_char, fmr: *mut IsoFmr) -> c_int;

/// ```c
/// int IBSM_MatchingTemplate(int handle, IBSM_Template t1, IBSM_Template t2, int *pScore);
/// ```
pub type MatchingTemplateFn = unsafe extern "C" fn(
    handle: c_int,
    first: IbsmTemplate,
    second: IbsmTemplate,
    score: *mut c_int,
) -> c_int;

pub type SetMatchingLevelFn = unsafe extern "C" fn(handle: c_int, level: c_int) -> c_int;

pub type GetMatchingLevelFn = unsafe extern "C" fn(handle: c_int, level: *mut c_int) -> c_int;

pub type SingleEnrollmentFn = unsafe extern "C" fn(
    handle: c_int,
    image1: IbsmImageData,
    image2: IbsmImageData,
    image3: IbsmImageData,
    template: *mut IbsmTemplate,
) -> c_int;

/// ```c
/// int IBSM_MultiEnrollment(int handle, IBSM_ImageData i1, ... IBSM_ImageData i6,
///                          IBSM_Template *pTemplate1, IBSM_Template *pTemplate2);
/// ```
pub type MultiEnrollmentFn = unsafe extern "C" fn(
    handle: c_int,
    image1: IbsmImageData,
    image2: IbsmImageData,
    image3: IbsmImageData,
    image4: IbsmImageData,
    image5: IbsmImageData,
    image6: IbsmImageData,
    first: *mut IbsmTemplate,
    second: *mut IbsmTemplate,
) -> c_int;

/// Something symbol addresses can be looked up in.
pub trait SymbolSource {
    /// Address of an exported symbol, or `None` when it is absent.
    fn address(&self, name: &str) -> Option<*const c_void>;
}

impl SymbolSource for Library {
    fn address(&self, name: &str) -> Option<*const c_void> {
        // SAFETY: the symbol is read as a plain address and never called here
        unsafe { self.get::<*const c_void>(name.as_bytes()) }
            .ok()
            .map(|symbol| *symbol)
    }
}

/// Resolve one entry point, recording its name when it is missing.
///
/// `T` must be the `extern "C"` function pointer type declared for `name`.
fn resolve<T: Copy>(
    source: &impl SymbolSource,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<T> {
    match source.address(name) {
        Some(address) if !address.is_null() => {
            debug_assert_eq!(mem::size_of::<T>(), mem::size_of::<*const c_void>());
            // SAFETY: function pointers and data pointers share a
            // representation on every supported target
            Some(unsafe { mem::transmute_copy::<*const c_void, T>(&address) })
        }
        _ => {
            tracing::warn!(symbol = name, "engine symbol not resolved");
            missing.push(name);
            None
        }
    }
}

macro_rules! engine_symbols {
    ( $( $field:ident : $ty:ty = $name:literal ),+ $(,)? ) => {
        /// Engine entry points. A field is `None` when its symbol failed to
        /// resolve; it is never called in that case.
        #[derive(Clone, Copy, Debug)]
        pub struct Symbols {
            $( pub $field: Option<$ty>, )+
        }

        impl Symbols {
            /// Every exported name the boundary needs.
            pub const NAMES: &'static [&'static str] = &[ $( $name ),+ ];

            /// No entry point resolved.
            pub const UNRESOLVED: Symbols = Symbols { $( $field: None, )+ };

            /// Attempt every entry point, returning the table and the names
            /// that failed.
            pub fn resolve(source: &impl SymbolSource) -> (Symbols, Vec<&'static str>) {
                let mut missing = Vec::new();
                let symbols = Symbols {
                    $( $field: resolve::<$ty>(source, $name, &mut missing), )+
                };
                (symbols, missing)
            }
        }
    };
}

engine_symbols! {
    get_sdk_version: GetSdkVersionFn = "IBSM_GetSDKVersion",
    open_matcher: OpenMatcherFn = "IBSM_OpenMatcher",
    close_matcher: CloseMatcherFn = "IBSM_CloseMatcher",
    extract_template: ExtractTemplateFn = "IBSM_ExtractTemplate",
    compress_image: CompressImageFn = "IBSM_CompressImage",
    decompress_image: DecompressImageFn = "IBSM_DecompressImage",
    save_image: SaveImageDataFn = "IBSM_SaveImageData",
    open_image: OpenImageDataFn = "IBSM_OpenImageData",
    image_to_fir: ImageToIsoFn = "IBSM_ConvertImage_IBSMtoISO",
    fir_to_images: IsoToImagesFn = "IBSM_ConvertImage_ISOtoIBSM",
    save_fir: SaveFirFn = "IBSM_SaveFIR",
    open_fir: OpenFirFn = "IBSM_OpenFIR",
    save_template: SaveTemplateFn = "IBSM_SaveTemplate",
    open_template: OpenTemplateFn = "IBSM_OpenTemplate",
    template_to_fmr: TemplateToIsoFn = "IBSM_ConvertTemplate_IBSMtoISO",
    fmr_to_templates: IsoToTemplatesFn = "IBSM_ConvertTemplate_ISOtoIBSM",
    save_fmr: SaveFmrFn = "IBSM_SaveFMR",
    open_fmr: OpenFmrFn = "IBSM_OpenFMR",
    match_templates: MatchingTemplateFn = "IBSM_MatchingTemplate",
    set_matching_level: SetMatchingLevelFn = "IBSM_SetMatchingLevel",
    get_matching_level: GetMatchingLevelFn = "IBSM_GetMatchingLevel",
    single_enrollment: SingleEnrollmentFn = "IBSM_SingleEnrollment",
    multi_enrollment: MultiEnrollmentFn = "IBSM_MultiEnrollment",
}

/// Loaded engine library with its resolved entry points.
pub struct MatcherLibrary {
    /// Keeps the resolved function pointers valid.
    #[allow(dead_code)]
    library: Library,

    /// Path to the library file.
    pub path: String,

    symbols: Symbols,

    missing: Vec<&'static str>,
}

impl MatcherLibrary {
    /// Load the engine from a shared library file.
    ///
    /// A missing entry point does not fail the load; it is listed in
    /// [`MatcherLibrary::missing`] and the library reports not ready.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the `.dll`, `.so` or `.dylib` file
    pub fn load<P: AsRef<Path>>(path: P) -> MatcherResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        // SAFETY: running the library's initialisers is inherent to loading it
        let library =
            unsafe { Library::new(path) }.map_err(|e| MatcherError::load_error(&path_str, e))?;

        let (symbols, missing) = Symbols::resolve(&library);

        tracing::info!(
            path = %path_str,
            resolved = Symbols::NAMES.len() - missing.len(),
            missing = missing.len(),
            "Loaded matcher library"
        );

        Ok(Self {
            library,
            path: path_str,
            symbols,
            missing,
        })
    }

    /// Whether every entry point resolved.
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Names of the entry points that failed to resolve.
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }
}
