//! Report formatting for command results.

use crate::OutputFormat;
use anyhow::Result;
use lib_matcher_ffi::{Identification, Recovered};
use lib_types::{
    CaptureDeviceTechId, FingerPosition, ImageFormat, ImageRecord, ImpressionType, TemplateRecord,
    TemplateVersion,
};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Print a report to stdout.
pub fn emit<T: Serialize + fmt::Display>(report: &T, format: OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    render(report, format, &mut stdout.lock())
}

pub fn render<T, W>(report: &T, format: OutputFormat, out: &mut W) -> Result<()>
where
    T: Serialize + fmt::Display,
    W: Write,
{
    match format {
        OutputFormat::Text => write!(out, "{}", report)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(report)?)?,
    }
    Ok(())
}

/// Image header plus how many records the source file held.
#[derive(Debug, Serialize)]
pub struct ImageSummary {
    pub source: PathBuf,
    pub records: usize,
    pub image_format: ImageFormat,
    pub impression_type: ImpressionType,
    pub finger_position: FingerPosition,
    pub capture_device_tech_id: CaptureDeviceTechId,
    pub capture_device_vendor_id: u16,
    pub capture_device_type_id: u16,
    pub scan_sampling: [u16; 2],
    pub image_sampling: [u16; 2],
    pub image_size: [u16; 2],
    pub scale_unit: u8,
    pub bit_depth: u8,
    pub image_data_length: usize,
}

impl ImageSummary {
    pub fn new(source: &Path, loaded: &Recovered<ImageRecord>) -> Self {
        let image = &loaded.record;
        Self {
            source: source.to_path_buf(),
            records: loaded.count,
            image_format: image.image_format,
            impression_type: image.impression_type,
            finger_position: image.finger_position,
            capture_device_tech_id: image.capture_device_tech_id,
            capture_device_vendor_id: image.capture_device_vendor_id,
            capture_device_type_id: image.capture_device_type_id,
            scan_sampling: [image.scan_sampling_x, image.scan_sampling_y],
            image_sampling: [image.image_sampling_x, image.image_sampling_y],
            image_size: [image.image_size_x, image.image_size_y],
            scale_unit: image.scale_unit,
            bit_depth: image.bit_depth,
            image_data_length: image.image_data_length(),
        }
    }
}

impl fmt::Display for ImageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image {:?} ({} record(s))", self.source, self.records)?;
        writeln!(f, "  Format:          {}", self.image_format)?;
        writeln!(f, "  Impression:      {}", self.impression_type)?;
        writeln!(f, "  Finger:          {}", self.finger_position)?;
        writeln!(f, "  Device tech:     {}", self.capture_device_tech_id)?;
        writeln!(f, "  Device vendor:   {:#06x}", self.capture_device_vendor_id)?;
        writeln!(f, "  Device type:     {:#06x}", self.capture_device_type_id)?;
        writeln!(f, "  Scan sampling:   {} x {}", self.scan_sampling[0], self.scan_sampling[1])?;
        writeln!(f, "  Image sampling:  {} x {}", self.image_sampling[0], self.image_sampling[1])?;
        writeln!(f, "  Size:            {} x {}", self.image_size[0], self.image_size[1])?;
        writeln!(f, "  Scale unit:      {}", self.scale_unit)?;
        writeln!(f, "  Bit depth:       {}", self.bit_depth)?;
        writeln!(f, "  Data length:     {}", self.image_data_length)
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub source: PathBuf,
    pub records: usize,
    pub version: TemplateVersion,
    pub impression_type: ImpressionType,
    pub finger_position: FingerPosition,
    pub capture_device_tech_id: CaptureDeviceTechId,
    pub capture_device_vendor_id: u16,
    pub capture_device_type_id: u16,
    pub image_sampling: [u16; 2],
    pub image_size: [u16; 2],
    /// Minutiae bytes up to the last non-zero one.
    pub minutiae_used: usize,
}

impl TemplateSummary {
    pub fn new(source: &Path, loaded: &Recovered<TemplateRecord>) -> Self {
        let template = &loaded.record;
        let minutiae_used = template
            .minutiae
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        Self {
            source: source.to_path_buf(),
            records: loaded.count,
            version: template.version,
            impression_type: template.impression_type,
            finger_position: template.finger_position,
            capture_device_tech_id: template.capture_device_tech_id,
            capture_device_vendor_id: template.capture_device_vendor_id,
            capture_device_type_id: template.capture_device_type_id,
            image_sampling: [template.image_sampling_x, template.image_sampling_y],
            image_size: [template.image_size_x, template.image_size_y],
            minutiae_used,
        }
    }
}

impl fmt::Display for TemplateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Template {:?} ({} record(s))", self.source, self.records)?;
        writeln!(f, "  Version:         {}", self.version)?;
        writeln!(f, "  Impression:      {}", self.impression_type)?;
        writeln!(f, "  Finger:          {}", self.finger_position)?;
        writeln!(f, "  Device tech:     {}", self.capture_device_tech_id)?;
        writeln!(f, "  Device vendor:   {:#06x}", self.capture_device_vendor_id)?;
        writeln!(f, "  Device type:     {:#06x}", self.capture_device_type_id)?;
        writeln!(f, "  Image sampling:  {} x {}", self.image_sampling[0], self.image_sampling[1])?;
        writeln!(f, "  Size:            {} x {}", self.image_size[0], self.image_size[1])?;
        writeln!(f, "  Minutiae bytes:  {}", self.minutiae_used)
    }
}

#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub first: PathBuf,
    pub second: PathBuf,
    pub score: i32,
}

impl MatchReport {
    pub fn new(first: &Path, second: &Path, score: i32) -> Self {
        Self {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
            score,
        }
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?} vs {:?}: score {}", self.first, self.second, self.score)
    }
}

#[derive(Debug, Serialize)]
pub struct IdentifyReport {
    pub probe: PathBuf,
    pub gallery_size: usize,
    /// Best gallery file, absent when nothing scored above zero.
    pub candidate: Option<PathBuf>,
    pub score: i32,
}

impl IdentifyReport {
    pub fn new(probe: &Path, gallery: &[PathBuf], best: Option<Identification>) -> Self {
        Self {
            probe: probe.to_path_buf(),
            gallery_size: gallery.len(),
            candidate: best.and_then(|b| gallery.get(b.index).cloned()),
            score: best.map_or(0, |b| b.score),
        }
    }
}

impl fmt::Display for IdentifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.candidate {
            Some(path) => writeln!(f, "{:?} matches {:?} (score {})", self.probe, path, self.score),
            None => writeln!(
                f,
                "{:?}: no match among {} template(s)",
                self.probe, self.gallery_size
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LevelReport {
    pub level: i32,
}

impl fmt::Display for LevelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matching level: {}", self.level)
    }
}

/// Files a command wrote.
#[derive(Debug, Serialize)]
pub struct Saved {
    pub kind: &'static str,
    pub paths: Vec<PathBuf>,
}

impl Saved {
    pub fn new(kind: &'static str, path: &Path) -> Self {
        Self {
            kind,
            paths: vec![path.to_path_buf()],
        }
    }

    pub fn many(kind: &'static str, paths: &[PathBuf]) -> Self {
        Self {
            kind,
            paths: paths.to_vec(),
        }
    }
}

impl fmt::Display for Saved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for path in &self.paths {
            writeln!(f, "Wrote {} {:?}", self.kind, path)?;
        }
        Ok(())
    }
}
