//! Background image loading.
//!
//! Assets are read (local pages) or downloaded (remote pages) on worker
//! threads and decoded into RGBA buffers ready for egui textures. Every
//! failure is reported exactly once so the page can swap in its
//! placeholder.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use rayon::prelude::*;
use url::Url;

use crate::net::fetch::{http_client, resolve_asset};

/// Widest image kept in memory; larger ones are scaled down.
const MAX_WIDTH: u32 = 1280;

/// Decoded image data (RGBA).
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Manages background fetching and decoding of page assets, keyed by the
/// `src` string as written in the markup.
pub struct ImageLoader {
    base: Url,
    pending: HashSet<String>,
    loaded: HashMap<String, ImageData>,
    failed: HashSet<String>,
    tx: mpsc::Sender<(String, Option<ImageData>)>,
    rx: mpsc::Receiver<(String, Option<ImageData>)>,
}

impl ImageLoader {
    pub fn new(base: Url) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            base,
            pending: HashSet::new(),
            loaded: HashMap::new(),
            failed: HashSet::new(),
            tx,
            rx,
        }
    }

    fn is_known(&self, src: &str) -> bool {
        self.loaded.contains_key(src) || self.pending.contains(src) || self.failed.contains(src)
    }

    /// Request one image. Repeated requests are ignored.
    pub fn request(&mut self, src: &str) {
        if self.is_known(src) {
            return;
        }
        self.pending.insert(src.to_string());
        let tx = self.tx.clone();
        let src = src.to_string();
        let url = resolve_asset(&self.base, &src);
        std::thread::spawn(move || {
            let result = url.and_then(|u| load_and_decode(&u));
            let _ = tx.send((src, result));
        });
    }

    /// Request many images at once, decoded in parallel on one worker.
    pub fn request_batch(&mut self, srcs: &[String]) {
        let fresh: Vec<(String, Option<Url>)> = srcs
            .iter()
            .filter(|s| !self.is_known(s))
            .map(|s| (s.clone(), resolve_asset(&self.base, s)))
            .collect();
        if fresh.is_empty() {
            return;
        }
        for (src, _) in &fresh {
            self.pending.insert(src.clone());
        }
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            fresh.into_par_iter().for_each_with(tx, |tx, (src, url)| {
                let result = url.and_then(|u| load_and_decode(&u));
                let _ = tx.send((src, result));
            });
        });
    }

    /// Collect finished loads. Call every frame. Returns the sources that
    /// failed since the last poll.
    pub fn poll(&mut self) -> Vec<String> {
        let mut newly_failed = Vec::new();
        while let Ok((src, result)) = self.rx.try_recv() {
            if !self.pending.remove(&src) {
                continue;
            }
            match result {
                Some(data) => {
                    self.loaded.insert(src, data);
                }
                None => {
                    log::warn!("failed to load image: {}", src);
                    self.failed.insert(src.clone());
                    newly_failed.push(src);
                }
            }
        }
        newly_failed
    }

    pub fn get(&self, src: &str) -> Option<&ImageData> {
        self.loaded.get(src)
    }

    /// Number of successfully loaded images.
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Number of images still being fetched.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Decode local files in parallel.
pub fn decode_batch(paths: &[PathBuf]) -> Vec<(PathBuf, Option<ImageData>)> {
    paths
        .par_iter()
        .map(|p| (p.clone(), read_and_decode(p)))
        .collect()
}

fn load_and_decode(url: &Url) -> Option<ImageData> {
    match url.scheme() {
        "file" => read_and_decode(&url.to_file_path().ok()?),
        "http" | "https" => fetch_and_decode(url),
        other => {
            log::debug!("unsupported image scheme '{}' for {}", other, url);
            None
        }
    }
}

fn read_and_decode(path: &Path) -> Option<ImageData> {
    let bytes = std::fs::read(path).ok()?;
    decode(&bytes)
}

fn fetch_and_decode(url: &Url) -> Option<ImageData> {
    let resp = http_client(Duration::from_secs(10))
        .ok()?
        .get(url.as_str())
        .send()
        .ok()?;

    if !resp.status().is_success() {
        return None;
    }

    let bytes = resp.bytes().ok()?;
    decode(&bytes)
}

fn decode(bytes: &[u8]) -> Option<ImageData> {
    let img = image::load_from_memory(bytes).ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();

    let (w, h, pixels) = if w > MAX_WIDTH {
        let ratio = MAX_WIDTH as f32 / w as f32;
        let new_h = ((h as f32 * ratio) as u32).max(1);
        let resized = image::imageops::resize(
            &rgba,
            MAX_WIDTH,
            new_h,
            image::imageops::FilterType::Triangle,
        );
        let (rw, rh) = resized.dimensions();
        (rw, rh, resized.into_raw())
    } else {
        (w, h, rgba.into_raw())
    };

    Some(ImageData {
        width: w,
        height: h,
        rgba: pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(w, h, image::Rgba([45, 80, 22, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn poll_until_idle(loader: &mut ImageLoader) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut failed = Vec::new();
        while loader.pending_count() > 0 && Instant::now() < deadline {
            failed.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        failed
    }

    #[test]
    fn loads_local_assets_and_reports_failures_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        write_png(&dir.path().join("assets"), "logo.png", 4, 2);
        let base = Url::from_file_path(dir.path().join("index.html")).unwrap();

        let mut loader = ImageLoader::new(base);
        loader.request("assets/logo.png");
        loader.request("assets/logo.png");
        loader.request("assets/missing.jpg");
        assert_eq!(loader.pending_count(), 2);

        let failed = poll_until_idle(&mut loader);
        assert_eq!(failed, vec!["assets/missing.jpg".to_string()]);
        let logo = loader.get("assets/logo.png").unwrap();
        assert_eq!((logo.width, logo.height), (4, 2));
        assert_eq!(logo.rgba.len(), 4 * 2 * 4);

        loader.request("assets/missing.jpg");
        assert_eq!(loader.pending_count(), 0);
        assert!(loader.poll().is_empty());
        assert_eq!(loader.loaded_count(), 1);
    }

    #[test]
    fn batch_request_loads_everything() {
        let dir = tempfile::tempdir().unwrap();
        for i in 1..=4 {
            write_png(dir.path(), &format!("package{}.png", i), 3, 3);
        }
        let base = Url::from_file_path(dir.path().join("index.html")).unwrap();
        let mut loader = ImageLoader::new(base);
        let srcs: Vec<String> = (1..=4).map(|i| format!("package{}.png", i)).collect();
        loader.request_batch(&srcs);
        assert!(poll_until_idle(&mut loader).is_empty());
        assert_eq!(loader.loaded_count(), 4);
    }

    #[test]
    fn decode_batch_scales_wide_images() {
        let dir = tempfile::tempdir().unwrap();
        let wide = write_png(dir.path(), "wide.png", MAX_WIDTH * 2, 10);
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"not a png").unwrap();

        let results = decode_batch(&[wide.clone(), broken.clone()]);
        assert_eq!(results.len(), 2);
        let scaled = results[0].1.as_ref().unwrap();
        assert_eq!(results[0].0, wide);
        assert_eq!((scaled.width, scaled.height), (MAX_WIDTH, 5));
        assert!(results[1].1.is_none());
    }
}
