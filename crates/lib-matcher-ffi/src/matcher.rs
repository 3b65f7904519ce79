//! Typed front over a matcher session.
//!
//! [`Matcher`] runs each dispatcher operation with its own [`ErrorStatus`]
//! and turns the reported code into a `Result`.

use crate::engine::{LibraryEngine, MatcherEngine};
use crate::error::{MatcherError, MatcherResult};
use crate::interchange::Recovered;
use crate::session::{MatcherSession, SessionState};
use crate::status::ErrorStatus;
use lib_types::{ImageFormat, ImageRecord, SdkVersion, StatusCode, TemplateRecord};
use std::path::Path;

/// Best gallery entry for a probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identification {
    /// Index into the gallery.
    pub index: usize,
    pub score: i32,
}

/// Result-returning wrapper around a [`MatcherSession`].
pub struct Matcher<E: MatcherEngine> {
    session: MatcherSession<E>,
}

/// Turn one dispatcher outcome into a result.
fn finish<T>(operation: &'static str, value: Option<T>, status: &ErrorStatus) -> MatcherResult<T> {
    let Some(code) = status.code() else {
        return Err(MatcherError::command_failed(operation, "no status reported"));
    };
    if let (Some(value), false) = (value, StatusCode::is_error(code)) {
        return Ok(value);
    }
    match StatusCode::from_code(code) {
        Some(StatusCode::Ok) => Err(MatcherError::command_failed(
            operation,
            "engine reported success without a result",
        )),
        Some(_) => Err(MatcherError::Native { code }),
        None if StatusCode::is_warning(code) => Err(MatcherError::Native { code }),
        None => {
            tracing::warn!(operation, code, "engine returned an unknown status code");
            Err(MatcherError::command_failed(
                operation,
                format!("unknown status code {code}"),
            ))
        }
    }
}

impl Matcher<LibraryEngine> {
    /// Open a session on the engine loaded by [`crate::registry::initialize`].
    pub fn from_registry() -> MatcherResult<Self> {
        Self::open(LibraryEngine::from_registry()?)
    }
}

impl<E: MatcherEngine> Matcher<E> {
    /// Open a session, failing when the engine hands back an invalid handle.
    pub fn open(engine: E) -> MatcherResult<Self> {
        let session = MatcherSession::open(engine);
        if session.state() == SessionState::Invalid {
            return Err(MatcherError::Native {
                code: StatusCode::OpenMatcherFailed.to_code(),
            });
        }
        Ok(Self { session })
    }

    pub fn session(&self) -> &MatcherSession<E> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut MatcherSession<E> {
        &mut self.session
    }

    pub fn close(&mut self) -> MatcherResult<()> {
        self.session.close()
    }

    pub fn sdk_version(&mut self) -> MatcherResult<SdkVersion> {
        let mut status = ErrorStatus::new();
        let value = self.session.get_sdk_version(&mut status);
        finish("get_sdk_version", value, &status)
    }

    pub fn extract_template(&mut self, image: &ImageRecord) -> MatcherResult<TemplateRecord> {
        let mut status = ErrorStatus::new();
        let value = self.session.extract_template(image, &mut status);
        finish("extract_template", value, &status)
    }

    pub fn compress_image(
        &mut self,
        image: &ImageRecord,
        format: ImageFormat,
    ) -> MatcherResult<ImageRecord> {
        let mut status = ErrorStatus::new();
        let value = self.session.compress_image(image, format, &mut status);
        finish("compress_image", value, &status)
    }

    pub fn decompress_image(&mut self, image: &ImageRecord) -> MatcherResult<ImageRecord> {
        let mut status = ErrorStatus::new();
        let value = self.session.decompress_image(image, &mut status);
        finish("decompress_image", value, &status)
    }

    pub fn save_image(&mut self, image: &ImageRecord, path: impl AsRef<Path>) -> MatcherResult<()> {
        let mut status = ErrorStatus::new();
        let saved = self.session.save_image(image, path, &mut status);
        finish("save_image", saved.then_some(()), &status)
    }

    pub fn load_image(&mut self, path: impl AsRef<Path>) -> MatcherResult<ImageRecord> {
        let mut status = ErrorStatus::new();
        let value = self.session.load_image(path, &mut status);
        finish("load_image", value, &status)
    }

    pub fn save_image_as_fir(
        &mut self,
        image: &ImageRecord,
        path: impl AsRef<Path>,
    ) -> MatcherResult<()> {
        let mut status = ErrorStatus::new();
        let saved = self.session.save_image_as_fir(image, path, &mut status);
        finish("save_image_as_fir", saved.then_some(()), &status)
    }

    pub fn load_image_from_fir(
        &mut self,
        path: impl AsRef<Path>,
    ) -> MatcherResult<Recovered<ImageRecord>> {
        let mut status = ErrorStatus::new();
        let value = self.session.load_image_from_fir(path, &mut status);
        finish("load_image_from_fir", value, &status)
    }

    pub fn save_template(
        &mut self,
        template: &TemplateRecord,
        path: impl AsRef<Path>,
    ) -> MatcherResult<()> {
        let mut status = ErrorStatus::new();
        let saved = self.session.save_template(template, path, &mut status);
        finish("save_template", saved.then_some(()), &status)
    }

    pub fn load_template(&mut self, path: impl AsRef<Path>) -> MatcherResult<TemplateRecord> {
        let mut status = ErrorStatus::new();
        let value = self.session.load_template(path, &mut status);
        finish("load_template", value, &status)
    }

    pub fn save_template_as_fmr(
        &mut self,
        template: &TemplateRecord,
        path: impl AsRef<Path>,
    ) -> MatcherResult<()> {
        let mut status = ErrorStatus::new();
        let saved = self.session.save_template_as_fmr(template, path, &mut status);
        finish("save_template_as_fmr", saved.then_some(()), &status)
    }

    pub fn load_template_from_fmr(
        &mut self,
        path: impl AsRef<Path>,
    ) -> MatcherResult<Recovered<TemplateRecord>> {
        let mut status = ErrorStatus::new();
        let value = self.session.load_template_from_fmr(path, &mut status);
        finish("load_template_from_fmr", value, &status)
    }

    pub fn match_templates(
        &mut self,
        first: &TemplateRecord,
        second: &TemplateRecord,
    ) -> MatcherResult<i32> {
        let mut status = ErrorStatus::new();
        let score = self.session.match_templates(first, second, &mut status);
        finish("match_templates", Some(score), &status)
    }

    pub fn set_matching_level(&mut self, level: i32) -> MatcherResult<()> {
        let mut status = ErrorStatus::new();
        self.session.set_matching_level(level, &mut status);
        finish("set_matching_level", Some(()), &status)
    }

    pub fn matching_level(&mut self) -> MatcherResult<i32> {
        let mut status = ErrorStatus::new();
        let level = self.session.get_matching_level(&mut status);
        finish("get_matching_level", Some(level), &status)
    }

    pub fn single_enrollment(&mut self, images: [&ImageRecord; 3]) -> MatcherResult<TemplateRecord> {
        let mut status = ErrorStatus::new();
        let value = self.session.single_enrollment(images, &mut status);
        finish("single_enrollment", value, &status)
    }

    pub fn multi_enrollment(
        &mut self,
        images: [&ImageRecord; 6],
    ) -> MatcherResult<(TemplateRecord, TemplateRecord)> {
        let mut status = ErrorStatus::new();
        let value = self.session.multi_enrollment(images, &mut status);
        finish("multi_enrollment", value, &status)
    }

    /// Extract a template from `image` and save it as an FMR file.
    pub fn export_fmr(
        &mut self,
        image: &ImageRecord,
        path: impl AsRef<Path>,
    ) -> MatcherResult<TemplateRecord> {
        let template = self.extract_template(image)?;
        self.save_template_as_fmr(&template, path)?;
        Ok(template)
    }

    /// Match a probe against every gallery template.
    ///
    /// Returns the highest positive score, first entry winning ties, or
    /// `None` when nothing scored above zero.
    pub fn identify(
        &mut self,
        probe: &TemplateRecord,
        gallery: &[TemplateRecord],
    ) -> MatcherResult<Option<Identification>> {
        let mut best: Option<Identification> = None;
        for (index, candidate) in gallery.iter().enumerate() {
            let score = self.match_templates(probe, candidate)?;
            tracing::trace!(index, score, "gallery score");
            if score > 0 && best.map_or(true, |b| score > b.score) {
                best = Some(Identification { index, score });
            }
        }
        Ok(best)
    }
}
