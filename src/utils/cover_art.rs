//! Cover art embedding
//!
//! Writes a single front-cover picture into an audio file's tag, in place.
//! Other tag fields and the audio stream are left untouched. When a maximum
//! cover size is configured the image is downsized and re-encoded as JPEG
//! first; otherwise the downloaded bytes are embedded as-is.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use lofty::config::WriteOptions;
use lofty::error::LoftyError;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// JPEG quality used when re-encoding downsized covers
const JPEG_QUALITY: u8 = 85;

/// Errors from embedding cover art
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("failed to read image {path}: {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported cover image format: {0}")]
    UnsupportedImage(String),

    #[error("failed to process cover image: {0}")]
    ProcessImage(#[from] image::ImageError),

    #[error("failed to read audio container: {0}")]
    ReadAudio(#[source] LoftyError),

    #[error("audio container has no writable tag")]
    NoTag,

    #[error("failed to save audio container: {0}")]
    WriteAudio(#[source] LoftyError),

    #[error("cover embedding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Embeds a cover image into an audio file in place
#[async_trait]
pub trait TagEmbedder: Send + Sync {
    async fn embed(&self, audio_path: &Path, image_path: &Path) -> Result<(), EmbedError>;
}

/// lofty-backed tag embedder
#[derive(Debug, Clone, Default)]
pub struct LoftyEmbedder {
    /// Downsize covers to fit this many pixels per side (None keeps the original bytes)
    max_cover_size: Option<u32>,
}

impl LoftyEmbedder {
    pub fn new(max_cover_size: Option<u32>) -> Self {
        Self { max_cover_size }
    }
}

#[async_trait]
impl TagEmbedder for LoftyEmbedder {
    async fn embed(&self, audio_path: &Path, image_path: &Path) -> Result<(), EmbedError> {
        // lofty and image are blocking; keep them off the runtime threads
        let audio_path = audio_path.to_path_buf();
        let image_path = image_path.to_path_buf();
        let max_cover_size = self.max_cover_size;

        tokio::task::spawn_blocking(move || {
            embed_cover_art(&audio_path, &image_path, max_cover_size)
        })
        .await?
    }
}

/// Embed the image at `image_path` as the front cover of `audio_path`
///
/// Any existing front cover is replaced, so embedding twice leaves one picture.
pub fn embed_cover_art(
    audio_path: &Path,
    image_path: &Path,
    max_cover_size: Option<u32>,
) -> Result<(), EmbedError> {
    let image_data = std::fs::read(image_path).map_err(|source| EmbedError::ReadImage {
        path: image_path.to_path_buf(),
        source,
    })?;

    let (mime_type, cover) = prepare_cover(image_data, max_cover_size)?;

    let mut tagged_file = Probe::open(audio_path)
        .map_err(EmbedError::ReadAudio)?
        .read()
        .map_err(EmbedError::ReadAudio)?;

    let picture = Picture::new_unchecked(PictureType::CoverFront, Some(mime_type), None, cover);

    // Secondary tags such as ID3v1 cannot hold pictures, so the cover always
    // goes into the primary tag, created next to whatever tags already exist
    if tagged_file.primary_tag().is_none() {
        let tag_type = tagged_file.primary_tag_type();
        tagged_file.insert_tag(lofty::tag::Tag::new(tag_type));
    }
    let tag = tagged_file.primary_tag_mut().ok_or(EmbedError::NoTag)?;

    tag.remove_picture_type(PictureType::CoverFront);
    tag.push_picture(picture);

    tagged_file
        .save_to_path(audio_path, WriteOptions::default())
        .map_err(EmbedError::WriteAudio)?;

    debug!("Embedded cover art in: {}", audio_path.display());
    Ok(())
}

/// Validate the cover format and optionally downsize it
fn prepare_cover(
    data: Vec<u8>,
    max_cover_size: Option<u32>,
) -> Result<(MimeType, Vec<u8>), EmbedError> {
    let format = image::guess_format(&data)
        .map_err(|_| EmbedError::UnsupportedImage("unrecognized image data".to_string()))?;
    let mime_type = mime_for_format(format)?;

    match max_cover_size {
        Some(max) => Ok((MimeType::Jpeg, process_cover_art(&data, max)?)),
        None => Ok((mime_type, data)),
    }
}

fn mime_for_format(format: ImageFormat) -> Result<MimeType, EmbedError> {
    match format {
        ImageFormat::Jpeg => Ok(MimeType::Jpeg),
        ImageFormat::Png => Ok(MimeType::Png),
        ImageFormat::Gif => Ok(MimeType::Gif),
        ImageFormat::Bmp => Ok(MimeType::Bmp),
        ImageFormat::Tiff => Ok(MimeType::Tiff),
        other => Err(EmbedError::UnsupportedImage(format!("{:?}", other))),
    }
}

/// Decode, shrink to fit `max_size` and re-encode as baseline JPEG
pub fn process_cover_art(data: &[u8], max_size: u32) -> Result<Vec<u8>, image::ImageError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    let img = resize_to_fit(img, max_size);
    // JPEG has no alpha channel
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY).encode_image(&img)?;

    debug!(
        "Processed cover art: {}x{} -> {} bytes",
        img.width(),
        img.height(),
        output.len()
    );
    Ok(output)
}

/// Resize image to fit within `max_size` while maintaining aspect ratio
fn resize_to_fit(img: DynamicImage, max_size: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());

    if width <= max_size && height <= max_size {
        return img;
    }

    let (new_width, new_height) = if width > height {
        let ratio = max_size as f64 / width as f64;
        (max_size, ((height as f64 * ratio) as u32).max(1))
    } else {
        let ratio = max_size as f64 / height as f64;
        (((width as f64 * ratio) as u32).max(1), max_size)
    };

    debug!(
        "Resizing cover art: {}x{} -> {}x{}",
        width, height, new_width, new_height
    );

    img.resize(new_width, new_height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jpeg_bytes, png_bytes, silent_mp3};
    use lofty::tag::TagType;

    fn picture_count(path: &Path) -> usize {
        let tagged_file = Probe::open(path).unwrap().read().unwrap();
        tagged_file
            .tags()
            .iter()
            .map(|tag| tag.pictures().len())
            .sum()
    }

    fn write_fixtures(dir: &Path) -> (PathBuf, PathBuf) {
        let audio = dir.join("track.mp3");
        let image = dir.join("cover.jpg");
        std::fs::write(&audio, silent_mp3()).unwrap();
        std::fs::write(&image, jpeg_bytes(8, 8)).unwrap();
        (audio, image)
    }

    #[test]
    fn test_embed_adds_front_cover() {
        let dir = tempfile::tempdir().unwrap();
        let (audio, image) = write_fixtures(dir.path());

        embed_cover_art(&audio, &image, None).unwrap();

        let tagged_file = Probe::open(&audio).unwrap().read().unwrap();
        let tag = tagged_file.primary_tag().unwrap();
        assert_eq!(tag.pictures().len(), 1);
        assert_eq!(tag.pictures()[0].pic_type(), PictureType::CoverFront);
        assert_eq!(tag.pictures()[0].mime_type(), Some(&MimeType::Jpeg));
    }

    #[test]
    fn test_embed_twice_replaces_cover() {
        let dir = tempfile::tempdir().unwrap();
        let (audio, image) = write_fixtures(dir.path());

        embed_cover_art(&audio, &image, None).unwrap();
        embed_cover_art(&audio, &image, None).unwrap();

        assert_eq!(picture_count(&audio), 1);
    }

    #[test]
    fn test_embed_preserves_existing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let (audio, image) = write_fixtures(dir.path());

        let mut tagged_file = Probe::open(&audio).unwrap().read().unwrap();
        let mut tag = lofty::tag::Tag::new(tagged_file.primary_tag_type());
        tag.set_title("Existing Title".to_string());
        tagged_file.insert_tag(tag);
        tagged_file
            .save_to_path(&audio, WriteOptions::default())
            .unwrap();

        embed_cover_art(&audio, &image, None).unwrap();

        let tagged_file = Probe::open(&audio).unwrap().read().unwrap();
        let tag = tagged_file.primary_tag().unwrap();
        assert_eq!(tag.title().as_deref(), Some("Existing Title"));
        assert_eq!(tag.pictures().len(), 1);
    }

    #[test]
    fn test_embed_leaves_audio_frames_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (audio, image) = write_fixtures(dir.path());

        embed_cover_art(&audio, &image, None).unwrap();

        let frames = silent_mp3();
        let written = std::fs::read(&audio).unwrap();
        assert!(written.len() > frames.len());
        assert_eq!(&written[written.len() - frames.len()..], frames.as_slice());
    }

    #[test]
    fn test_embed_into_id3v1_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let (audio, image) = write_fixtures(dir.path());

        let mut tagged_file = Probe::open(&audio).unwrap().read().unwrap();
        let mut v1 = lofty::tag::Tag::new(TagType::Id3v1);
        v1.set_title("Old Title".to_string());
        tagged_file.insert_tag(v1);
        tagged_file
            .save_to_path(&audio, WriteOptions::default())
            .unwrap();

        let tagged_file = Probe::open(&audio).unwrap().read().unwrap();
        assert!(tagged_file.primary_tag().is_none());

        embed_cover_art(&audio, &image, None).unwrap();

        let tagged_file = Probe::open(&audio).unwrap().read().unwrap();
        let v2 = tagged_file.tag(TagType::Id3v2).unwrap();
        assert_eq!(v2.pictures().len(), 1);
        assert_eq!(v2.pictures()[0].pic_type(), PictureType::CoverFront);
        let v1 = tagged_file.tag(TagType::Id3v1).unwrap();
        assert_eq!(v1.title().as_deref(), Some("Old Title"));
    }

    #[test]
    fn test_embed_keeps_png_mime() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("track.mp3");
        let image = dir.path().join("cover.png");
        std::fs::write(&audio, silent_mp3()).unwrap();
        std::fs::write(&image, png_bytes(4, 4)).unwrap();

        embed_cover_art(&audio, &image, None).unwrap();

        let tagged_file = Probe::open(&audio).unwrap().read().unwrap();
        let tag = tagged_file.primary_tag().unwrap();
        assert_eq!(tag.pictures()[0].mime_type(), Some(&MimeType::Png));
    }

    #[test]
    fn test_embed_rejects_unknown_image() {
        let dir = tempfile::tempdir().unwrap();
        let (audio, image) = write_fixtures(dir.path());
        std::fs::write(&image, b"definitely not an image").unwrap();

        let err = embed_cover_art(&audio, &image, None).unwrap_err();
        assert!(matches!(err, EmbedError::UnsupportedImage(_)));
        assert_eq!(std::fs::read(&audio).unwrap(), silent_mp3());
    }

    #[test]
    fn test_embed_rejects_corrupt_audio() {
        let dir = tempfile::tempdir().unwrap();
        let (audio, image) = write_fixtures(dir.path());
        std::fs::write(&audio, b"garbage").unwrap();

        let err = embed_cover_art(&audio, &image, None).unwrap_err();
        assert!(matches!(err, EmbedError::ReadAudio(_)));
    }

    #[test]
    fn test_embed_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let (audio, _) = write_fixtures(dir.path());

        let err = embed_cover_art(&audio, &dir.path().join("nope.jpg"), None).unwrap_err();
        assert!(matches!(err, EmbedError::ReadImage { .. }));
    }

    #[test]
    fn test_process_cover_art_downsizes() {
        let processed = process_cover_art(&png_bytes(600, 300), 300).unwrap();
        let img = image::load_from_memory(&processed).unwrap();
        assert_eq!(img.width(), 300);
        assert_eq!(img.height(), 150);
        assert_eq!(image::guess_format(&processed).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_resize_small_image() {
        let img = DynamicImage::new_rgb8(100, 100);
        let resized = resize_to_fit(img, 300);
        assert_eq!(resized.width(), 100);
        assert_eq!(resized.height(), 100);
    }

    #[tokio::test]
    async fn test_lofty_embedder_with_downsizing() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("track.mp3");
        let image = dir.path().join("cover.png");
        std::fs::write(&audio, silent_mp3()).unwrap();
        std::fs::write(&image, png_bytes(64, 32)).unwrap();

        LoftyEmbedder::new(Some(16)).embed(&audio, &image).await.unwrap();

        let tagged_file = Probe::open(&audio).unwrap().read().unwrap();
        let tag = tagged_file.primary_tag().unwrap();
        assert_eq!(tag.pictures()[0].mime_type(), Some(&MimeType::Jpeg));
    }
}
