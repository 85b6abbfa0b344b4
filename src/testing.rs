//! Shared fixtures for unit tests

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use crate::download::fetcher::{AssetFetcher, FetchError};

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no CRC, no padding
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
const FRAME_LEN: usize = 417;
const FRAME_COUNT: usize = 16;

/// A short, untagged MP3 made of silent frames
pub fn silent_mp3() -> Vec<u8> {
    let mut data = Vec::with_capacity(FRAME_LEN * FRAME_COUNT);
    for _ in 0..FRAME_COUNT {
        data.extend_from_slice(&FRAME_HEADER);
        data.extend(std::iter::repeat_n(0u8, FRAME_LEN - FRAME_HEADER.len()));
    }
    data
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::new_rgb8(width, height);
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 80)
        .encode_image(&img)
        .unwrap();
    out
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::new_rgba8(width, height);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// In-memory fetcher: known URLs return their payload, anything else a 404
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, Result<Bytes, u16>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn ok(mut self, url: &str, body: impl Into<Bytes>) -> Self {
        self.responses.insert(url.to_string(), Ok(body.into()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Err(status));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
