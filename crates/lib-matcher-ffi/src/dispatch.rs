//! Caller-facing matcher operations.
//!
//! Each operation converts its inbound records, marshals any path, calls one
//! engine primitive and converts the outbound records. Native buffers are
//! owned by scope and released on every exit path. The [`ErrorStatus`] passed
//! in receives exactly one code per call; a failed call returns an empty
//! result (`None`, `false` or `-1`).

use crate::convert::{
    image_from_native, image_to_native, template_from_native, template_to_native, ImageSet,
};
use crate::engine::MatcherEngine;
use crate::error::{MatcherError, MatcherResult};
use crate::interchange::{self, Recovered};
use crate::native::{IbsmImageData, IbsmSdkVersion, IbsmTemplate};
use crate::session::MatcherSession;
use crate::status::{check, ErrorStatus};
use lib_types::{ImageFormat, ImageRecord, NativeCode, SdkVersion, StatusCode, TemplateRecord};
use std::ffi::{c_int, CString};
use std::path::Path;

/// Marshal a path into the C string the engine expects.
fn c_path(path: &Path) -> MatcherResult<CString> {
    let text = path
        .to_str()
        .ok_or_else(|| MatcherError::invalid_path(path.display().to_string(), "not valid UTF-8"))?;
    CString::new(text).map_err(|_| MatcherError::invalid_path(text, "contains a NUL byte"))
}

impl<E: MatcherEngine> MatcherSession<E> {
    fn enter(&self, operation: &'static str) {
        tracing::debug!(operation, handle = self.handle(), "matcher operation");
    }

    /// Product and file version of the engine. Warning codes are accepted.
    pub fn get_sdk_version(&mut self, status: &mut ErrorStatus) -> Option<SdkVersion> {
        self.enter("get_sdk_version");
        let result = self.try_get_sdk_version();
        status.settle_coded("get_sdk_version", result)
    }

    fn try_get_sdk_version(&mut self) -> MatcherResult<(SdkVersion, i32)> {
        let mut version = IbsmSdkVersion::zeroed();
        let code = self.engine.get_sdk_version(&mut version);
        if StatusCode::is_error(code) {
            return Err(MatcherError::Native { code });
        }
        Ok((version.to_managed()?, code))
    }

    /// Extract a minutiae template from one image.
    pub fn extract_template(
        &mut self,
        image: &ImageRecord,
        status: &mut ErrorStatus,
    ) -> Option<TemplateRecord> {
        self.enter("extract_template");
        let result = self.try_extract_template(image);
        status.settle("extract_template", result)
    }

    fn try_extract_template(&mut self, image: &ImageRecord) -> MatcherResult<TemplateRecord> {
        let native = image_to_native(image)?;
        let mut template = IbsmTemplate::zeroed();
        check(self.engine.extract_template(self.handle(), native.raw(), &mut template))?;
        template_from_native(&template)
    }

    /// Compress an image into `format`.
    pub fn compress_image(
        &mut self,
        image: &ImageRecord,
        format: ImageFormat,
        status: &mut ErrorStatus,
    ) -> Option<ImageRecord> {
        self.enter("compress_image");
        let result = self.try_compress_image(image, format.to_code());
        status.settle("compress_image", result)
    }

    fn try_compress_image(&mut self, image: &ImageRecord, format: c_int) -> MatcherResult<ImageRecord> {
        let native = image_to_native(image)?;
        let mut output = IbsmImageData::zeroed();
        let handle = self.handle();
        check(self.engine.compress_image(handle, native.raw(), &mut output, format))?;
        // SAFETY: the engine owns `output` until its next call on this handle
        unsafe { image_from_native(&output) }
    }

    /// Decompress an image to raw pixels.
    pub fn decompress_image(
        &mut self,
        image: &ImageRecord,
        status: &mut ErrorStatus,
    ) -> Option<ImageRecord> {
        self.enter("decompress_image");
        let result = self.try_decompress_image(image);
        status.settle("decompress_image", result)
    }

    fn try_decompress_image(&mut self, image: &ImageRecord) -> MatcherResult<ImageRecord> {
        let native = image_to_native(image)?;
        let mut output = IbsmImageData::zeroed();
        check(self.engine.decompress_image(self.handle(), native.raw(), &mut output))?;
        // SAFETY: the engine owns `output` until its next call on this handle
        unsafe { image_from_native(&output) }
    }

    /// Save an image in the engine's native file format.
    pub fn save_image(
        &mut self,
        image: &ImageRecord,
        path: impl AsRef<Path>,
        status: &mut ErrorStatus,
    ) -> bool {
        self.enter("save_image");
        let result = self.try_save_image(image, path.as_ref());
        status.settle("save_image", result).is_some()
    }

    fn try_save_image(&mut self, image: &ImageRecord, path: &Path) -> MatcherResult<()> {
        let native = image_to_native(image)?;
        let path = c_path(path)?;
        check(self.engine.save_image(self.handle(), &path, native.raw()))
    }

    /// Load an image from the engine's native file format.
    pub fn load_image(
        &mut self,
        path: impl AsRef<Path>,
        status: &mut ErrorStatus,
    ) -> Option<ImageRecord> {
        self.enter("load_image");
        let result = self.try_load_image(path.as_ref());
        status.settle("load_image", result)
    }

    fn try_load_image(&mut self, path: &Path) -> MatcherResult<ImageRecord> {
        let path = c_path(path)?;
        let mut image = IbsmImageData::zeroed();
        check(self.engine.open_image(self.handle(), &path, &mut image))?;
        // SAFETY: the engine owns `image` until its next call on this handle
        unsafe { image_from_native(&image) }
    }

    /// Save an image as an ISO fingerprint image record (FIR).
    pub fn save_image_as_fir(
        &mut self,
        image: &ImageRecord,
        path: impl AsRef<Path>,
        status: &mut ErrorStatus,
    ) -> bool {
        self.enter("save_image_as_fir");
        let result = self.try_save_image_as_fir(image, path.as_ref());
        status.settle("save_image_as_fir", result).is_some()
    }

    fn try_save_image_as_fir(&mut self, image: &ImageRecord, path: &Path) -> MatcherResult<()> {
        let native = image_to_native(image)?;
        let handle = self.handle();
        let fir = interchange::image_to_fir(&mut self.engine, handle, native.raw())?;
        let path = c_path(path)?;
        check(self.engine.save_fir(handle, &path, &fir))
    }

    /// Load the first image of an ISO fingerprint image record.
    pub fn load_image_from_fir(
        &mut self,
        path: impl AsRef<Path>,
        status: &mut ErrorStatus,
    ) -> Option<Recovered<ImageRecord>> {
        self.enter("load_image_from_fir");
        let result = self.try_load_image_from_fir(path.as_ref());
        status.settle("load_image_from_fir", result)
    }

    fn try_load_image_from_fir(&mut self, path: &Path) -> MatcherResult<Recovered<ImageRecord>> {
        let path = c_path(path)?;
        let handle = self.handle();
        let mut fir = E::Fir::default();
        check(self.engine.open_fir(handle, &path, &mut fir))?;
        interchange::images_from_fir(&mut self.engine, handle, &fir)
    }

    /// Save a template in the engine's native file format.
    pub fn save_template(
        &mut self,
        template: &TemplateRecord,
        path: impl AsRef<Path>,
        status: &mut ErrorStatus,
    ) -> bool {
        self.enter("save_template");
        let result = self.try_save_template(template, path.as_ref());
        status.settle("save_template", result).is_some()
    }

    fn try_save_template(&mut self, template: &TemplateRecord, path: &Path) -> MatcherResult<()> {
        let native = template_to_native(template)?;
        let path = c_path(path)?;
        check(self.engine.save_template(self.handle(), &path, &native))
    }

    /// Load a template from the engine's native file format.
    pub fn load_template(
        &mut self,
        path: impl AsRef<Path>,
        status: &mut ErrorStatus,
    ) -> Option<TemplateRecord> {
        self.enter("load_template");
        let result = self.try_load_template(path.as_ref());
        status.settle("load_template", result)
    }

    fn try_load_template(&mut self, path: &Path) -> MatcherResult<TemplateRecord> {
        let path = c_path(path)?;
        let mut template = IbsmTemplate::zeroed();
        check(self.engine.open_template(self.handle(), &path, &mut template))?;
        template_from_native(&template)
    }

    /// Save a template as an ISO fingerprint minutiae record (FMR).
    pub fn save_template_as_fmr(
        &mut self,
        template: &TemplateRecord,
        path: impl AsRef<Path>,
        status: &mut ErrorStatus,
    ) -> bool {
        self.enter("save_template_as_fmr");
        let result = self.try_save_template_as_fmr(template, path.as_ref());
        status.settle("save_template_as_fmr", result).is_some()
    }

    fn try_save_template_as_fmr(&mut self, template: &TemplateRecord, path: &Path) -> MatcherResult<()> {
        let native = template_to_native(template)?;
        let handle = self.handle();
        let fmr = interchange::template_to_fmr(&mut self.engine, handle, &native)?;
        let path = c_path(path)?;
        check(self.engine.save_fmr(handle, &path, &fmr))
    }

    /// Load the first template of an ISO fingerprint minutiae record.
    pub fn load_template_from_fmr(
        &mut self,
        path: impl AsRef<Path>,
        status: &mut ErrorStatus,
    ) -> Option<Recovered<TemplateRecord>> {
        self.enter("load_template_from_fmr");
        let result = self.try_load_template_from_fmr(path.as_ref());
        status.settle("load_template_from_fmr", result)
    }

    fn try_load_template_from_fmr(&mut self, path: &Path) -> MatcherResult<Recovered<TemplateRecord>> {
        let path = c_path(path)?;
        let handle = self.handle();
        let mut fmr = E::Fmr::default();
        check(self.engine.open_fmr(handle, &path, &mut fmr))?;
        interchange::templates_from_fmr(&mut self.engine, handle, &fmr)
    }

    /// Score how well two templates match; `-1` on failure.
    pub fn match_templates(
        &mut self,
        first: &TemplateRecord,
        second: &TemplateRecord,
        status: &mut ErrorStatus,
    ) -> i32 {
        self.enter("match_templates");
        let result = self.try_match_templates(first, second);
        status.settle("match_templates", result).unwrap_or(-1)
    }

    fn try_match_templates(&mut self, first: &TemplateRecord, second: &TemplateRecord) -> MatcherResult<i32> {
        let first = template_to_native(first)?;
        let second = template_to_native(second)?;
        let mut score: c_int = -1;
        check(self.engine.match_templates(self.handle(), &first, &second, &mut score))?;
        Ok(score)
    }

    /// Set the matching strictness level.
    pub fn set_matching_level(&mut self, level: i32, status: &mut ErrorStatus) {
        self.enter("set_matching_level");
        let result = check(self.engine.set_matching_level(self.handle(), level));
        status.settle("set_matching_level", result);
    }

    /// Current matching strictness level; `-1` on failure.
    pub fn get_matching_level(&mut self, status: &mut ErrorStatus) -> i32 {
        self.enter("get_matching_level");
        let mut level: c_int = -1;
        let result = check(self.engine.get_matching_level(self.handle(), &mut level)).map(|()| level);
        status.settle("get_matching_level", result).unwrap_or(-1)
    }

    /// Enroll one template from three images of the same finger.
    pub fn single_enrollment(
        &mut self,
        images: [&ImageRecord; 3],
        status: &mut ErrorStatus,
    ) -> Option<TemplateRecord> {
        self.enter("single_enrollment");
        let result = self.try_single_enrollment(images);
        status.settle("single_enrollment", result)
    }

    fn try_single_enrollment(&mut self, images: [&ImageRecord; 3]) -> MatcherResult<TemplateRecord> {
        let set = ImageSet::convert(images)?;
        let mut template = IbsmTemplate::zeroed();
        check(self.engine.single_enrollment(self.handle(), set.raws(), &mut template))?;
        template_from_native(&template)
    }

    /// Enroll two templates from six images.
    pub fn multi_enrollment(
        &mut self,
        images: [&ImageRecord; 6],
        status: &mut ErrorStatus,
    ) -> Option<(TemplateRecord, TemplateRecord)> {
        self.enter("multi_enrollment");
        let result = self.try_multi_enrollment(images);
        status.settle("multi_enrollment", result)
    }

    fn try_multi_enrollment(
        &mut self,
        images: [&ImageRecord; 6],
    ) -> MatcherResult<(TemplateRecord, TemplateRecord)> {
        let set = ImageSet::convert(images)?;
        let mut first = IbsmTemplate::zeroed();
        let mut second = IbsmTemplate::zeroed();
        check(
            self.engine
                .multi_enrollment(self.handle(), set.raws(), &mut first, &mut second),
        )?;
        Ok((template_from_native(&first)?, template_from_native(&second)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{self, clear_allocation_failure, fail_allocation_after, BufferLedger};
    use crate::mock::{MockEngine, SAME_FINGER_SCORE};
    use crate::native::MINUTIAE_BYTES;
    use lib_types::{FingerPosition, STATUS_OK};

    fn session() -> MatcherSession<MockEngine> {
        MatcherSession::open(MockEngine::new())
    }

    fn image(seed: u8) -> ImageRecord {
        let mut image =
            ImageRecord::grayscale(8, 4, (0..32).map(|i| seed.wrapping_add(i * 3)).collect());
        image.finger_position = FingerPosition::RightIndexFinger;
        image
    }

    fn assert_balanced(before: BufferLedger) {
        let delta = buffer::ledger().since(before);
        assert_eq!(delta.allocated, delta.released, "leaked native buffers: {delta:?}");
    }

    #[test]
    fn test_sdk_version() {
        let mut session = session();
        let mut status = ErrorStatus::new();

        let version = session.get_sdk_version(&mut status).unwrap();
        assert_eq!(version.product, "IBScanMatcher 1.7.3");
        assert_eq!(version.file, "1.7.3.0");
        assert_eq!(status.code(), Some(STATUS_OK));
    }

    #[test]
    fn test_sdk_version_warning_accepted() {
        let mut engine = MockEngine::new();
        engine.warn_on_version(3);
        let mut session = MatcherSession::open(engine);
        let mut status = ErrorStatus::new();

        assert!(session.get_sdk_version(&mut status).is_some());
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn test_extract_template_copies_metadata() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let before = buffer::ledger();

        let template = session.extract_template(&image(1), &mut status).unwrap();
        assert_eq!(status.code(), Some(STATUS_OK));
        assert_eq!(template.finger_position, FingerPosition::RightIndexFinger);
        assert_eq!(template.image_size_x, 8);
        assert_eq!(template.minutiae.len(), MINUTIAE_BYTES);
        assert_balanced(before);
    }

    #[test]
    fn test_native_failure_passes_code_through() {
        let mut engine = MockEngine::new();
        engine.fail("extract_template", -604);
        let mut session = MatcherSession::open(engine);
        let mut status = ErrorStatus::new();
        let before = buffer::ledger();

        assert!(session.extract_template(&image(1), &mut status).is_none());
        assert_eq!(status.status(), Some(StatusCode::ExtractionFailed));
        assert_balanced(before);
    }

    #[test]
    fn test_allocation_failure_skips_engine() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let before = buffer::ledger();

        fail_allocation_after(0);
        let template = session.extract_template(&image(1), &mut status);
        clear_allocation_failure();

        assert!(template.is_none());
        assert_eq!(status.status(), Some(StatusCode::MemAlloc));
        assert!(!session.engine.calls.contains(&"extract_template"));
        assert_balanced(before);
    }

    #[test]
    fn test_compress_then_decompress() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let original = image(9);

        let compressed = session
            .compress_image(&original, ImageFormat::Wsq, &mut status)
            .unwrap();
        assert_eq!(compressed.image_format, ImageFormat::Wsq);

        let restored = session.decompress_image(&compressed, &mut status).unwrap();
        assert_eq!(status.code(), Some(STATUS_OK));
        assert_eq!(restored, original);
    }

    #[test]
    fn test_image_file_roundtrip() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let original = image(4);
        let before = buffer::ledger();

        assert!(session.save_image(&original, "/tmp/finger.ibsm", &mut status));
        assert!(session.engine.has_image_file("/tmp/finger.ibsm"));
        let loaded = session.load_image("/tmp/finger.ibsm", &mut status).unwrap();
        assert_eq!(loaded, original);
        assert_balanced(before);
    }

    #[test]
    fn test_empty_image_file_roundtrip() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let empty = ImageRecord::grayscale(0, 0, Vec::new());

        assert!(session.save_image(&empty, "empty.img", &mut status));
        let loaded = session.load_image("empty.img", &mut status).unwrap();
        assert!(loaded.image_data.is_empty());
        assert_eq!(loaded, empty);
    }

    #[test]
    fn test_missing_file_reports_engine_code() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        assert!(session.load_image("nowhere.img", &mut status).is_none());
        assert_eq!(status.status(), Some(StatusCode::FileOpen));
    }

    #[test]
    fn test_nul_in_path_reports_mem_alloc() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let before = buffer::ledger();

        assert!(!session.save_image(&image(1), "bad\0path", &mut status));
        assert_eq!(status.status(), Some(StatusCode::MemAlloc));
        assert!(!session.engine.calls.contains(&"save_image"));
        assert_balanced(before);
    }

    #[test]
    fn test_fir_save_converts_before_path() {
        let mut session = session();
        let mut status = ErrorStatus::new();

        assert!(!session.save_image_as_fir(&image(1), "bad\0.fir", &mut status));
        assert_eq!(status.status(), Some(StatusCode::MemAlloc));
        assert_eq!(session.engine.calls.last(), Some(&"image_to_fir"));
    }

    #[test]
    fn test_fir_roundtrip() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let original = image(2);
        let before = buffer::ledger();

        assert!(session.save_image_as_fir(&original, "finger.fir", &mut status));
        assert_eq!(session.engine.fir_len("finger.fir"), Some(1));

        let recovered = session.load_image_from_fir("finger.fir", &mut status).unwrap();
        assert_eq!(recovered.count, 1);
        assert_eq!(recovered.record, original);
        assert_balanced(before);
    }

    #[test]
    fn test_fir_without_images() {
        let mut session = session();
        session.engine.store_fir("empty.fir", &[]);
        let mut status = ErrorStatus::new();

        assert!(session.load_image_from_fir("empty.fir", &mut status).is_none());
        assert_eq!(status.status(), Some(StatusCode::ExtractionFailed));
    }

    #[test]
    fn test_fir_with_two_images_surfaces_first() {
        let mut session = session();
        let first = image(10);
        session.engine.store_fir("two.fir", &[first.clone(), image(20)]);
        let mut status = ErrorStatus::new();

        let recovered = session.load_image_from_fir("two.fir", &mut status).unwrap();
        assert_eq!(recovered.record, first);
        assert_eq!(recovered.count, 2);
        assert_eq!(status.code(), Some(STATUS_OK));
    }

    #[test]
    fn test_template_file_roundtrip() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let template = session.extract_template(&image(3), &mut status).unwrap();

        assert!(session.save_template(&template, "t.ibsm", &mut status));
        let loaded = session.load_template("t.ibsm", &mut status).unwrap();
        assert_eq!(loaded, template);
    }

    #[test]
    fn test_fmr_roundtrip_and_policy() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let template = session.extract_template(&image(5), &mut status).unwrap();

        assert!(session.save_template_as_fmr(&template, "t.fmr", &mut status));
        assert_eq!(session.engine.fmr_len("t.fmr"), Some(1));
        let recovered = session.load_template_from_fmr("t.fmr", &mut status).unwrap();
        assert_eq!(recovered.record, template);

        session.engine.store_fmr("none.fmr", &[]);
        assert!(session.load_template_from_fmr("none.fmr", &mut status).is_none());
        assert_eq!(status.status(), Some(StatusCode::ExtractionFailed));

        let other = session.extract_template(&image(6), &mut status).unwrap();
        session.engine.store_fmr("two.fmr", &[other.clone(), template]);
        let recovered = session.load_template_from_fmr("two.fmr", &mut status).unwrap();
        assert_eq!(recovered.record, other);
        assert!(recovered.truncated());
    }

    #[test]
    fn test_match_is_deterministic() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let a = session.extract_template(&image(1), &mut status).unwrap();
        let b = session.extract_template(&image(2), &mut status).unwrap();

        let first = session.match_templates(&a, &a, &mut status);
        let second = session.match_templates(&a, &a, &mut status);
        assert_eq!(first, second);
        assert_eq!(first, SAME_FINGER_SCORE);
        assert!(session.match_templates(&a, &b, &mut status) < first);
    }

    #[test]
    fn test_match_failure_returns_sentinel() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let a = session.extract_template(&image(1), &mut status).unwrap();
        let mut oversized = a.clone();
        oversized.minutiae.push(0);

        assert_eq!(session.match_templates(&a, &oversized, &mut status), -1);
        assert_eq!(status.status(), Some(StatusCode::MemAlloc));

        session.engine.fail("match_templates", -606);
        assert_eq!(session.match_templates(&a, &a, &mut status), -1);
        assert_eq!(status.code(), Some(-606));
    }

    #[test]
    fn test_matching_level() {
        let mut session = session();
        let mut status = ErrorStatus::new();

        session.set_matching_level(3, &mut status);
        assert_eq!(status.code(), Some(STATUS_OK));
        assert_eq!(session.get_matching_level(&mut status), 3);

        session.set_matching_level(42, &mut status);
        assert_eq!(status.status(), Some(StatusCode::InvalidParamValue));
        assert_eq!(session.get_matching_level(&mut status), 3);
    }

    #[test]
    fn test_single_enrollment() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let images = [image(1), image(2), image(3)];
        let before = buffer::ledger();

        let template = session
            .single_enrollment([&images[0], &images[1], &images[2]], &mut status)
            .unwrap();
        assert_eq!(status.code(), Some(STATUS_OK));
        assert_balanced(before);

        let direct = session.extract_template(&images[0], &mut status).unwrap();
        assert_eq!(session.match_templates(&template, &direct, &mut status), SAME_FINGER_SCORE);
    }

    #[test]
    fn test_multi_enrollment_pair() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let images: Vec<ImageRecord> = (0..6).map(|i| image(i * 11)).collect();
        let refs: [&ImageRecord; 6] = std::array::from_fn(|i| &images[i]);
        let before = buffer::ledger();

        let (first, second) = session.multi_enrollment(refs, &mut status).unwrap();
        assert_balanced(before);

        let expected_first = session.extract_template(&images[0], &mut status).unwrap();
        let expected_second = session.extract_template(&images[3], &mut status).unwrap();
        assert_eq!(first, expected_first);
        assert_eq!(second, expected_second);
    }

    #[test]
    fn test_enrollment_partial_conversion_failure() {
        let mut session = session();
        let mut status = ErrorStatus::new();
        let images = [image(1), image(2), image(3)];
        let before = buffer::ledger();

        fail_allocation_after(2);
        let template = session.single_enrollment([&images[0], &images[1], &images[2]], &mut status);
        clear_allocation_failure();

        assert!(template.is_none());
        assert_eq!(status.status(), Some(StatusCode::MemAlloc));
        assert!(!session.engine.calls.contains(&"single_enrollment"));
        let delta = buffer::ledger().since(before);
        assert_eq!(delta, BufferLedger { allocated: 2, released: 2 });
    }

    #[test]
    fn test_enrollment_engine_failure_releases_all() {
        let mut session = session();
        session.engine.fail("multi_enrollment", -605);
        let mut status = ErrorStatus::new();
        let images: Vec<ImageRecord> = (0..6).map(image).collect();
        let refs: [&ImageRecord; 6] = std::array::from_fn(|i| &images[i]);
        let before = buffer::ledger();

        assert!(session.multi_enrollment(refs, &mut status).is_none());
        assert_eq!(status.status(), Some(StatusCode::EnrollmentFailed));
        assert_eq!(buffer::ledger().since(before), BufferLedger { allocated: 6, released: 6 });
    }

    #[test]
    fn test_closed_session_handle_rejected_by_engine() {
        let mut session = session();
        session.close().unwrap();
        let mut status = ErrorStatus::new();

        assert_eq!(session.get_matching_level(&mut status), -1);
        assert_eq!(status.status(), Some(StatusCode::InvalidHandle));
    }
}
