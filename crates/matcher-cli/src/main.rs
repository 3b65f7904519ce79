//! ibsm: command-line front-end for the IBScanMatcher fingerprint engine.
//!
//! Every subcommand opens one matcher session on the configured engine
//! library, runs one or more matcher operations and closes the session.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lib_matcher_ffi::{registry, Matcher, MatcherEngine, Recovered};
use lib_types::{ImageFormat, ImageRecord, TemplateRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ibsm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (overrides the config file)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Path to the engine shared library (overrides the config file)
    #[arg(short, long)]
    library: Option<PathBuf>,

    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Compressed encodings the engine can produce.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Compression {
    Wsq,
    Jpeg,
    Jpeg2000,
    Jpeg2000Lossless,
    Png,
}

impl From<Compression> for ImageFormat {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Wsq => ImageFormat::Wsq,
            Compression::Jpeg => ImageFormat::JpegLossy,
            Compression::Jpeg2000 => ImageFormat::Jpeg2000Lossy,
            Compression::Jpeg2000Lossless => ImageFormat::Jpeg2000Lossless,
            Compression::Png => ImageFormat::Png,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the engine version
    Version,

    /// Wrap raw 8-bit grayscale pixels into an image file
    Import {
        /// Raw pixel file, one byte per pixel, row major
        pixels: PathBuf,

        #[arg(long)]
        width: u16,

        #[arg(long)]
        height: u16,

        /// Output image (.fir for ISO, anything else for the native format)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Describe an image file
    InfoImage {
        /// Image file (.fir for ISO, anything else for the native format)
        file: PathBuf,
    },

    /// Describe a template file
    InfoTemplate {
        /// Template file (.fmr for ISO, anything else for the native format)
        file: PathBuf,
    },

    /// Extract a template from an image
    Extract {
        image: PathBuf,

        /// Output template (.fmr for ISO, anything else for the native format)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compress an image
    Compress {
        image: PathBuf,

        /// Target encoding
        #[arg(short, long, default_value = "wsq")]
        to: Compression,

        #[arg(short, long)]
        output: PathBuf,

        /// Write only the compressed stream (e.g. a plain .wsq file)
        #[arg(long)]
        raw: bool,
    },

    /// Decompress an image to raw pixels
    Decompress {
        image: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert an image between the native format and ISO FIR
    ConvertImage { input: PathBuf, output: PathBuf },

    /// Convert a template between the native format and ISO FMR
    ConvertTemplate { input: PathBuf, output: PathBuf },

    /// Match two templates
    Match { first: PathBuf, second: PathBuf },

    /// Find the best match for a probe template in a gallery
    Identify {
        probe: PathBuf,

        #[arg(required = true)]
        gallery: Vec<PathBuf>,
    },

    /// Enroll one template from three images of the same finger
    Enroll {
        #[arg(num_args = 3, required = true)]
        images: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Enroll two templates from six images
    EnrollMulti {
        #[arg(num_args = 6, required = true)]
        images: Vec<PathBuf>,

        /// The two output templates
        #[arg(short, long, num_args = 2, required = true)]
        output: Vec<PathBuf>,
    },

    /// Show the matching level, or set it first
    Level {
        /// New level (1 = loosest, 7 = strictest)
        value: Option<i32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let settings = config::resolve(cli.config.as_deref(), cli.library, cli.format)?;

    tracing::info!("Loading matcher library {:?}", settings.library);
    if !registry::initialize(&settings.library) {
        if let Some(registry) = registry::get() {
            if let Some(error) = registry.load_error() {
                anyhow::bail!("Failed to load matcher library: {error}");
            }
            tracing::warn!(missing = ?registry.missing(), "Matcher library is incomplete");
        }
    }

    let mut matcher = Matcher::from_registry().context("Failed to open matcher session")?;
    if let Some(level) = settings.matching_level {
        matcher
            .set_matching_level(level)
            .context("Failed to apply configured matching level")?;
    }

    let result = run(&mut matcher, cli.command, settings.format);

    if let Err(e) = matcher.close() {
        tracing::warn!("Failed to close matcher session: {e}");
    }
    result
}

fn run<E: MatcherEngine>(
    matcher: &mut Matcher<E>,
    command: Commands,
    format: OutputFormat,
) -> Result<()> {
    match command {
        Commands::Version => {
            let version = matcher.sdk_version()?;
            output::emit(&version, format)?;
        }
        Commands::Import {
            pixels,
            width,
            height,
            output,
        } => {
            let data = std::fs::read(&pixels)
                .with_context(|| format!("Failed to read pixel file {:?}", pixels))?;
            let expected = usize::from(width) * usize::from(height);
            if data.len() != expected {
                anyhow::bail!(
                    "{:?} holds {} bytes, expected {} for {}x{}",
                    pixels,
                    data.len(),
                    expected,
                    width,
                    height
                );
            }
            let image = ImageRecord::grayscale(width, height, data);
            save_image(matcher, &image, &output)?;
            output::emit(&output::Saved::new("image", &output), format)?;
        }
        Commands::InfoImage { file } => {
            let image = load_image(matcher, &file)?;
            output::emit(&output::ImageSummary::new(&file, &image), format)?;
        }
        Commands::InfoTemplate { file } => {
            let template = load_template(matcher, &file)?;
            output::emit(&output::TemplateSummary::new(&file, &template), format)?;
        }
        Commands::Extract { image, output } => {
            let image = load_image(matcher, &image)?.into_record();
            let template = matcher.extract_template(&image)?;
            save_template(matcher, &template, &output)?;
            output::emit(&output::Saved::new("template", &output), format)?;
        }
        Commands::Compress {
            image,
            to,
            output,
            raw,
        } => {
            let image = load_image(matcher, &image)?.into_record();
            let compressed = matcher.compress_image(&image, to.into())?;
            if raw {
                std::fs::write(&output, &compressed.image_data)
                    .with_context(|| format!("Failed to write {:?}", output))?;
            } else {
                save_image(matcher, &compressed, &output)?;
            }
            output::emit(&output::Saved::new("image", &output), format)?;
        }
        Commands::Decompress { image, output } => {
            let image = load_image(matcher, &image)?.into_record();
            let decompressed = matcher.decompress_image(&image)?;
            save_image(matcher, &decompressed, &output)?;
            output::emit(&output::Saved::new("image", &output), format)?;
        }
        Commands::ConvertImage { input, output } => {
            let image = load_image(matcher, &input)?.into_record();
            save_image(matcher, &image, &output)?;
            output::emit(&output::Saved::new("image", &output), format)?;
        }
        Commands::ConvertTemplate { input, output } => {
            let template = load_template(matcher, &input)?.into_record();
            save_template(matcher, &template, &output)?;
            output::emit(&output::Saved::new("template", &output), format)?;
        }
        Commands::Match { first, second } => {
            let a = load_template(matcher, &first)?.into_record();
            let b = load_template(matcher, &second)?.into_record();
            let score = matcher.match_templates(&a, &b)?;
            output::emit(&output::MatchReport::new(&first, &second, score), format)?;
        }
        Commands::Identify { probe, gallery } => {
            let probe_template = load_template(matcher, &probe)?.into_record();
            let templates = gallery
                .iter()
                .map(|path| load_template(matcher, path).map(Recovered::into_record))
                .collect::<Result<Vec<_>>>()?;
            let best = matcher.identify(&probe_template, &templates)?;
            let report = output::IdentifyReport::new(&probe, &gallery, best);
            output::emit(&report, format)?;
        }
        Commands::Enroll { images, output } => {
            let images = load_images(matcher, &images)?;
            let template = matcher.single_enrollment([&images[0], &images[1], &images[2]])?;
            save_template(matcher, &template, &output)?;
            output::emit(&output::Saved::new("template", &output), format)?;
        }
        Commands::EnrollMulti { images, output } => {
            let images = load_images(matcher, &images)?;
            let refs: [&ImageRecord; 6] = std::array::from_fn(|i| &images[i]);
            let (first, second) = matcher.multi_enrollment(refs)?;
            save_template(matcher, &first, &output[0])?;
            save_template(matcher, &second, &output[1])?;
            output::emit(&output::Saved::many("template", &output), format)?;
        }
        Commands::Level { value } => {
            if let Some(level) = value {
                config::validate_level(level)?;
                matcher.set_matching_level(level)?;
            }
            let level = matcher.matching_level()?;
            output::emit(&output::LevelReport { level }, format)?;
        }
    }

    Ok(())
}

/// Whether `path` carries `extension`, ignoring case.
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn load_image<E: MatcherEngine>(
    matcher: &mut Matcher<E>,
    path: &Path,
) -> Result<Recovered<ImageRecord>> {
    let loaded = if has_extension(path, "fir") {
        matcher.load_image_from_fir(path)
    } else {
        matcher.load_image(path).map(|record| Recovered { record, count: 1 })
    };
    let loaded = loaded.with_context(|| format!("Failed to load image {:?}", path))?;
    if loaded.truncated() {
        tracing::warn!("{:?} holds {} images; using the first", path, loaded.count);
    }
    Ok(loaded)
}

fn load_images<E: MatcherEngine>(matcher: &mut Matcher<E>, paths: &[PathBuf]) -> Result<Vec<ImageRecord>> {
    paths
        .iter()
        .map(|path| load_image(matcher, path).map(Recovered::into_record))
        .collect()
}

fn save_image<E: MatcherEngine>(matcher: &mut Matcher<E>, image: &ImageRecord, path: &Path) -> Result<()> {
    let saved = if has_extension(path, "fir") {
        matcher.save_image_as_fir(image, path)
    } else {
        matcher.save_image(image, path)
    };
    saved.with_context(|| format!("Failed to save image {:?}", path))
}

fn load_template<E: MatcherEngine>(
    matcher: &mut Matcher<E>,
    path: &Path,
) -> Result<Recovered<TemplateRecord>> {
    let loaded = if has_extension(path, "fmr") {
        matcher.load_template_from_fmr(path)
    } else {
        matcher.load_template(path).map(|record| Recovered { record, count: 1 })
    };
    let loaded = loaded.with_context(|| format!("Failed to load template {:?}", path))?;
    if loaded.truncated() {
        tracing::warn!("{:?} holds {} templates; using the first", path, loaded.count);
    }
    Ok(loaded)
}

fn save_template<E: MatcherEngine>(
    matcher: &mut Matcher<E>,
    template: &TemplateRecord,
    path: &Path,
) -> Result<()> {
    let saved = if has_extension(path, "fmr") {
        matcher.save_template_as_fmr(template, path)
    } else {
        matcher.save_template(template, path)
    };
    saved.with_context(|| format!("Failed to save template {:?}", path))
}
