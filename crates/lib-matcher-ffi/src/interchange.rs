//! Bridge between native records and the ISO interchange containers.
//!
//! An interchange container may expand to any number of native records. Only
//! the first is surfaced; the total is reported alongside it.

use crate::convert::{image_from_native, template_from_native};
use crate::engine::MatcherEngine;
use crate::error::{MatcherError, MatcherResult};
use crate::native::{EngineArray, IbsmImageData, IbsmTemplate};
use crate::status::check;
use lib_types::{ImageRecord, TemplateRecord};
use serde::{Deserialize, Serialize};
use std::ffi::c_int;

/// The first record recovered from an interchange container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recovered<T> {
    pub record: T,
    /// Number of records the container held.
    pub count: usize,
}

impl<T> Recovered<T> {
    /// Whether records beyond the first were dropped.
    pub fn truncated(&self) -> bool {
        self.count > 1
    }

    pub fn into_record(self) -> T {
        self.record
    }
}

fn first_record<T, R>(
    kind: &'static str,
    records: &[T],
    convert: impl FnOnce(&T) -> MatcherResult<R>,
) -> MatcherResult<Recovered<R>> {
    let Some(first) = records.first() else {
        return Err(MatcherError::ExtractionFailed { kind });
    };
    if records.len() > 1 {
        tracing::warn!(kind, count = records.len(), "surfacing first interchange record only");
    }
    Ok(Recovered {
        record: convert(first)?,
        count: records.len(),
    })
}

/// Convert a native image into an image interchange record.
pub fn image_to_fir<E: MatcherEngine>(
    engine: &mut E,
    handle: c_int,
    image: &IbsmImageData,
) -> MatcherResult<E::Fir> {
    let mut fir = E::Fir::default();
    check(engine.image_to_fir(handle, image, &mut fir))?;
    Ok(fir)
}

/// Expand an image interchange record and copy out its first image.
pub fn images_from_fir<E: MatcherEngine>(
    engine: &mut E,
    handle: c_int,
    fir: &E::Fir,
) -> MatcherResult<Recovered<ImageRecord>> {
    let mut images = EngineArray::<IbsmImageData>::empty();
    check(engine.fir_to_images(handle, fir, &mut images))?;

    // SAFETY: the array is engine-owned and untouched until the next call on
    // this handle, which cannot happen while `engine` is borrowed here
    let images = unsafe { images.as_slice() }?;
    first_record("image", images, |raw| unsafe { image_from_native(raw) })
}

/// Convert a native template into a minutiae interchange record.
pub fn template_to_fmr<E: MatcherEngine>(
    engine: &mut E,
    handle: c_int,
    template: &IbsmTemplate,
) -> MatcherResult<E::Fmr> {
    let mut fmr = E::Fmr::default();
    check(engine.template_to_fmr(handle, template, &mut fmr))?;
    Ok(fmr)
}

/// Expand a minutiae interchange record and copy out its first template.
pub fn templates_from_fmr<E: MatcherEngine>(
    engine: &mut E,
    handle: c_int,
    fmr: &E::Fmr,
) -> MatcherResult<Recovered<TemplateRecord>> {
    let mut templates = EngineArray::<IbsmTemplate>::empty();
    check(engine.fmr_to_templates(handle, fmr, &mut templates))?;

    // SAFETY: as for images
    let templates = unsafe { templates.as_slice() }?;
    first_record("template", templates, template_from_native)
}
