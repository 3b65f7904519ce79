//! Scripted in-memory engine for tests.
//!
//! Behaves like the vendor engine where the boundary can observe it: outputs
//! live in engine-owned scratch memory that is overwritten by the next call,
//! files are kept in memory by path, and any primitive can be made to fail.

use crate::convert::{image_to_native, template_to_native};
use crate::engine::MatcherEngine;
use crate::native::{
    EngineArray, IbsmImageData, IbsmSdkVersion, IbsmTemplate, IBSM_MAX_MINUTIAE_SIZE,
};
use lib_types::{ImageRecord, NativeCode, StatusCode, TemplateRecord, TemplateVersion, STATUS_OK};
use std::collections::HashMap;
use std::ffi::{c_char, c_int, CStr};
use std::ptr;

pub(crate) const MOCK_HANDLE: c_int = 7;
pub(crate) const SAME_FINGER_SCORE: c_int = 100;

/// Image copied out of a native record, pixels included.
#[derive(Clone, Debug)]
pub(crate) struct StoredImage {
    header: IbsmImageData,
    pixels: Vec<u8>,
}

impl StoredImage {
    fn capture(image: &IbsmImageData) -> Self {
        // SAFETY: records handed to the engine point at live buffers
        let pixels = unsafe { image.pixels() }
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let mut header = *image;
        header.image_data = ptr::null_mut();
        Self { header, pixels }
    }

    pub(crate) fn from_record(record: &ImageRecord) -> Self {
        let native = image_to_native(record).unwrap();
        Self::capture(native.raw())
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct MockFir {
    images: Vec<StoredImage>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct MockFmr {
    templates: Vec<IbsmTemplate>,
}

pub(crate) struct MockEngine {
    handle: c_int,
    pub(crate) level: c_int,
    pub(crate) calls: Vec<&'static str>,
    failures: HashMap<&'static str, i32>,
    version_code: i32,
    images: HashMap<String, StoredImage>,
    templates: HashMap<String, IbsmTemplate>,
    firs: HashMap<String, MockFir>,
    fmrs: HashMap<String, MockFmr>,
    scratch_images: Vec<IbsmImageData>,
    scratch_pixels: Vec<Vec<u8>>,
    scratch_templates: Vec<IbsmTemplate>,
}

impl MockEngine {
    pub(crate) fn new() -> Self {
        Self {
            handle: MOCK_HANDLE,
            level: 4,
            calls: Vec::new(),
            failures: HashMap::new(),
            version_code: STATUS_OK,
            images: HashMap::new(),
            templates: HashMap::new(),
            firs: HashMap::new(),
            fmrs: HashMap::new(),
            scratch_images: Vec::new(),
            scratch_pixels: Vec::new(),
            scratch_templates: Vec::new(),
        }
    }

    /// Engine whose open call hands back `handle`.
    pub(crate) fn with_handle(handle: c_int) -> Self {
        Self {
            handle,
            ..Self::new()
        }
    }

    /// Make `primitive` return `code` from now on.
    pub(crate) fn fail(&mut self, primitive: &'static str, code: i32) {
        self.failures.insert(primitive, code);
    }

    /// Return `code` alongside a valid version record.
    pub(crate) fn warn_on_version(&mut self, code: i32) {
        self.version_code = code;
    }

    pub(crate) fn store_fir(&mut self, path: &str, images: &[ImageRecord]) {
        let fir = MockFir {
            images: images.iter().map(StoredImage::from_record).collect(),
        };
        self.firs.insert(path.to_string(), fir);
    }

    pub(crate) fn store_fmr(&mut self, path: &str, templates: &[TemplateRecord]) {
        let fmr = MockFmr {
            templates: templates
                .iter()
                .map(|t| template_to_native(t).unwrap())
                .collect(),
        };
        self.fmrs.insert(path.to_string(), fmr);
    }

    pub(crate) fn has_image_file(&self, path: &str) -> bool {
        self.images.contains_key(path)
    }

    pub(crate) fn fir_len(&self, path: &str) -> Option<usize> {
        self.firs.get(path).map(|fir| fir.images.len())
    }

    pub(crate) fn fmr_len(&self, path: &str) -> Option<usize> {
        self.fmrs.get(path).map(|fmr| fmr.templates.len())
    }

    fn enter(&mut self, primitive: &'static str, handle: Option<c_int>) -> Option<i32> {
        self.calls.push(primitive);
        if let Some(&code) = self.failures.get(primitive) {
            return Some(code);
        }
        match handle {
            Some(h) if h != self.handle => Some(StatusCode::InvalidHandle.to_code()),
            _ => None,
        }
    }

    /// Replace the scratch area with `images` and return its address.
    fn publish_images(&mut self, images: &[StoredImage]) -> *mut IbsmImageData {
        self.scratch_pixels = images.iter().map(|i| i.pixels.clone()).collect();
        self.scratch_images = images
            .iter()
            .zip(self.scratch_pixels.iter_mut())
            .map(|(image, pixels)| {
                let mut header = image.header;
                header.image_data = if pixels.is_empty() {
                    ptr::null_mut()
                } else {
                    pixels.as_mut_ptr().cast()
                };
                header
            })
            .collect();
        self.scratch_images.as_mut_ptr()
    }

    fn publish_image(&mut self, image: StoredImage, output: &mut IbsmImageData) {
        let address = self.publish_images(&[image]);
        // SAFETY: exactly one record was just published
        *output = unsafe { *address };
    }

    /// Deterministic template derived from the image pixels.
    fn template_for(image: &StoredImage) -> IbsmTemplate {
        let header = &image.header;
        let mut template = IbsmTemplate::zeroed();
        template.version = TemplateVersion::New0.to_code();
        template.finger_position = header.finger_position;
        template.impression_type = header.impression_type;
        template.capture_device_tech_id = header.capture_device_tech_id;
        template.capture_device_vendor_id = header.capture_device_vendor_id;
        template.capture_device_type_id = header.capture_device_type_id;
        template.image_sampling_x = header.image_sampling_x;
        template.image_sampling_y = header.image_sampling_y;
        template.image_size_x = header.image_size_x;
        template.image_size_y = header.image_size_y;

        template.minutiae[0] = image.pixels.len() as u32;
        for (i, chunk) in image.pixels.chunks(16).enumerate().take(IBSM_MAX_MINUTIAE_SIZE - 1) {
            template.minutiae[i + 1] = chunk
                .iter()
                .fold(0x811C_9DC5u32, |h, &b| (h ^ b as u32).wrapping_mul(0x0100_0193));
        }
        template
    }
}

fn key(path: &CStr) -> String {
    path.to_string_lossy().into_owned()
}

fn copy_str(dst: &mut [c_char], src: &str) {
    for (d, s) in dst.iter_mut().zip(src.bytes()) {
        *d = s as c_char;
    }
}

impl MatcherEngine for MockEngine {
    type Fir = MockFir;
    type Fmr = MockFmr;

    fn get_sdk_version(&mut self, version: &mut IbsmSdkVersion) -> i32 {
        if let Some(code) = self.enter("get_sdk_version", None) {
            return code;
        }
        copy_str(&mut version.product, "IBScanMatcher 1.7.3");
        copy_str(&mut version.file, "1.7.3.0");
        self.version_code
    }

    fn open_matcher(&mut self, handle: &mut c_int) -> i32 {
        if let Some(code) = self.enter("open_matcher", None) {
            return code;
        }
        *handle = self.handle;
        if self.handle < 0 {
            StatusCode::OpenMatcherFailed.to_code()
        } else {
            STATUS_OK
        }
    }

    fn close_matcher(&mut self, handle: c_int) -> i32 {
        self.enter("close_matcher", Some(handle)).unwrap_or(STATUS_OK)
    }

    fn extract_template(
        &mut self,
        handle: c_int,
        image: &IbsmImageData,
        template: &mut IbsmTemplate,
    ) -> i32 {
        if let Some(code) = self.enter("extract_template", Some(handle)) {
            return code;
        }
        *template = Self::template_for(&StoredImage::capture(image));
        STATUS_OK
    }

    fn compress_image(
        &mut self,
        handle: c_int,
        image: &IbsmImageData,
        output: &mut IbsmImageData,
        format: c_int,
    ) -> i32 {
        if let Some(code) = self.enter("compress_image", Some(handle)) {
            return code;
        }
        let mut stored = StoredImage::capture(image);
        stored.header.image_format = format;
        stored.pixels.reverse();
        stored.header.image_data_length = stored.pixels.len() as u32;
        self.publish_image(stored, output);
        STATUS_OK
    }

    fn decompress_image(
        &mut self,
        handle: c_int,
        image: &IbsmImageData,
        output: &mut IbsmImageData,
    ) -> i32 {
        if let Some(code) = self.enter("decompress_image", Some(handle)) {
            return code;
        }
        let mut stored = StoredImage::capture(image);
        stored.header.image_format = 0;
        stored.pixels.reverse();
        self.publish_image(stored, output);
        STATUS_OK
    }

    fn save_image(&mut self, handle: c_int, path: &CStr, image: &IbsmImageData) -> i32 {
        if let Some(code) = self.enter("save_image", Some(handle)) {
            return code;
        }
        self.images.insert(key(path), StoredImage::capture(image));
        STATUS_OK
    }

    fn open_image(&mut self, handle: c_int, path: &CStr, image: &mut IbsmImageData) -> i32 {
        if let Some(code) = self.enter("open_image", Some(handle)) {
            return code;
        }
        match self.images.get(&key(path)).cloned() {
            Some(stored) => {
                self.publish_image(stored, image);
                STATUS_OK
            }
            None => StatusCode::FileOpen.to_code(),
        }
    }

    fn image_to_fir(&mut self, handle: c_int, image: &IbsmImageData, fir: &mut MockFir) -> i32 {
        if let Some(code) = self.enter("image_to_fir", Some(handle)) {
            return code;
        }
        fir.images = vec![StoredImage::capture(image)];
        STATUS_OK
    }

    fn fir_to_images(
        &mut self,
        handle: c_int,
        fir: &MockFir,
        images: &mut EngineArray<IbsmImageData>,
    ) -> i32 {
        if let Some(code) = self.enter("fir_to_images", Some(handle)) {
            return code;
        }
        images.items = self.publish_images(&fir.images);
        images.count = fir.images.len() as c_int;
        STATUS_OK
    }

    fn save_fir(&mut self, handle: c_int, path: &CStr, fir: &MockFir) -> i32 {
        if let Some(code) = self.enter("save_fir", Some(handle)) {
            return code;
        }
        self.firs.insert(key(path), fir.clone());
        STATUS_OK
    }

    fn open_fir(&mut self, handle: c_int, path: &CStr, fir: &mut MockFir) -> i32 {
        if let Some(code) = self.enter("open_fir", Some(handle)) {
            return code;
        }
        match self.firs.get(&key(path)) {
            Some(stored) => {
                *fir = stored.clone();
                STATUS_OK
            }
            None => StatusCode::FileOpen.to_code(),
        }
    }

    fn save_template(&mut self, handle: c_int, path: &CStr, template: &IbsmTemplate) -> i32 {
        if let Some(code) = self.enter("save_template", Some(handle)) {
            return code;
        }
        self.templates.insert(key(path), *template);
        STATUS_OK
    }

    fn open_template(&mut self, handle: c_int, path: &CStr, template: &mut IbsmTemplate) -> i32 {
        if let Some(code) = self.enter("open_template", Some(handle)) {
            return code;
        }
        match self.templates.get(&key(path)) {
            Some(stored) => {
                *template = *stored;
                STATUS_OK
            }
            None => StatusCode::FileOpen.to_code(),
        }
    }

    fn template_to_fmr(&mut self, handle: c_int, template: &IbsmTemplate, fmr: &mut MockFmr) -> i32 {
        if let Some(code) = self.enter("template_to_fmr", Some(handle)) {
            return code;
        }
        fmr.templates = vec![*template];
        STATUS_OK
    }

    fn fmr_to_templates(
        &mut self,
        handle: c_int,
        fmr: &MockFmr,
        templates: &mut EngineArray<IbsmTemplate>,
    ) -> i32 {
        if let Some(code) = self.enter("fmr_to_templates", Some(handle)) {
            return code;
        }
        self.scratch_templates = fmr.templates.clone();
        templates.items = self.scratch_templates.as_mut_ptr();
        templates.count = self.scratch_templates.len() as c_int;
        STATUS_OK
    }

    fn save_fmr(&mut self, handle: c_int, path: &CStr, fmr: &MockFmr) -> i32 {
        if let Some(code) = self.enter("save_fmr", Some(handle)) {
            return code;
        }
        self.fmrs.insert(key(path), fmr.clone());
        STATUS_OK
    }

    fn open_fmr(&mut self, handle: c_int, path: &CStr, fmr: &mut MockFmr) -> i32 {
        if let Some(code) = self.enter("open_fmr", Some(handle)) {
            return code;
        }
        match self.fmrs.get(&key(path)) {
            Some(stored) => {
                *fmr = stored.clone();
                STATUS_OK
            }
            None => StatusCode::FileOpen.to_code(),
        }
    }

    fn match_templates(
        &mut self,
        handle: c_int,
        first: &IbsmTemplate,
        second: &IbsmTemplate,
        score: &mut c_int,
    ) -> i32 {
        if let Some(code) = self.enter("match_templates", Some(handle)) {
            return code;
        }
        *score = if first.minutiae == second.minutiae {
            SAME_FINGER_SCORE
        } else {
            0
        };
        STATUS_OK
    }

    fn set_matching_level(&mut self, handle: c_int, level: c_int) -> i32 {
        if let Some(code) = self.enter("set_matching_level", Some(handle)) {
            return code;
        }
        if !(1..=7).contains(&level) {
            return StatusCode::InvalidParamValue.to_code();
        }
        self.level = level;
        STATUS_OK
    }

    fn get_matching_level(&mut self, handle: c_int, level: &mut c_int) -> i32 {
        if let Some(code) = self.enter("get_matching_level", Some(handle)) {
            return code;
        }
        *level = self.level;
        STATUS_OK
    }

    fn single_enrollment(
        &mut self,
        handle: c_int,
        images: [&IbsmImageData; 3],
        template: &mut IbsmTemplate,
    ) -> i32 {
        if let Some(code) = self.enter("single_enrollment", Some(handle)) {
            return code;
        }
        *template = Self::template_for(&StoredImage::capture(images[0]));
        STATUS_OK
    }

    fn multi_enrollment(
        &mut self,
        handle: c_int,
        images: [&IbsmImageData; 6],
        first: &mut IbsmTemplate,
        second: &mut IbsmTemplate,
    ) -> i32 {
        if let Some(code) = self.enter("multi_enrollment", Some(handle)) {
            return code;
        }
        *first = Self::template_for(&StoredImage::capture(images[0]));
        *second = Self::template_for(&StoredImage::capture(images[3]));
        STATUS_OK
    }
}
