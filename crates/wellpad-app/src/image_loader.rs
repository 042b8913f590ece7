//! Background decoding of symbol images.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use wellpad_core::EntityId;
use wellpad_render::{decode_symbol, ImageLoadError};

/// One decoded source and the symbols that were waiting for it.
#[derive(Debug)]
pub struct LoadedImage {
    pub src: String,
    pub ids: Vec<EntityId>,
    pub image: Result<peniko::ImageData, ImageLoadError>,
}

/// Decodes symbol images on a worker thread so drops never block the UI.
///
/// Each source is decoded once; symbols requesting a source that is already
/// in flight are attached to that request. The decoded pixels go to the
/// renderer's cache and their size to the editor.
pub struct SymbolImageLoader {
    requests: Sender<String>,
    results: Receiver<(String, Result<peniko::ImageData, ImageLoadError>)>,
    pending: HashMap<String, Vec<EntityId>>,
}

impl SymbolImageLoader {
    pub fn spawn() -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<String>();
        let (result_tx, result_rx) = mpsc::channel();

        thread::Builder::new()
            .name("symbol-loader".to_string())
            .spawn(move || {
                for src in request_rx {
                    let image = decode_symbol(&src);
                    if result_tx.send((src, image)).is_err() {
                        break;
                    }
                }
                log::debug!("Symbol image loader stopped");
            })?;

        Ok(Self {
            requests: request_tx,
            results: result_rx,
            pending: HashMap::new(),
        })
    }

    /// Ask for `src` on behalf of symbol `id`.
    pub fn request(&mut self, id: EntityId, src: String) {
        if let Some(waiting) = self.pending.get_mut(&src) {
            waiting.push(id);
            return;
        }
        if self.requests.send(src.clone()).is_err() {
            log::warn!("Symbol image loader is not running");
            return;
        }
        self.pending.insert(src, vec![id]);
    }

    /// Decodes that finished since the last call.
    pub fn poll(&mut self) -> Vec<LoadedImage> {
        let finished: Vec<_> = self.results.try_iter().collect();
        finished
            .into_iter()
            .map(|(src, image)| LoadedImage {
                ids: self.pending.remove(&src).unwrap_or_default(),
                src,
                image,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(loader: &mut SymbolImageLoader) -> Vec<LoadedImage> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let loaded = loader.poll();
            if !loaded.is_empty() || Instant::now() > deadline {
                return loaded;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_missing_file_reports_error() {
        let mut loader = SymbolImageLoader::spawn().unwrap();
        let id = EntityId::new_v4();
        loader.request(id, "/no/such/symbol.png".to_string());

        let loaded = wait_for(&mut loader);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].ids, vec![id]);
        assert!(loaded[0].image.is_err());
    }

    #[test]
    fn test_same_source_decoded_once() {
        let path = std::env::temp_dir().join(format!("wellpad-loader-{}.png", std::process::id()));
        image::RgbaImage::new(200, 100).save(&path).unwrap();
        let src = path.to_string_lossy().into_owned();

        let mut loader = SymbolImageLoader::spawn().unwrap();
        let (a, b) = (EntityId::new_v4(), EntityId::new_v4());
        loader.request(a, src.clone());
        loader.request(b, src.clone());
        let loaded = wait_for(&mut loader);
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].ids, vec![a, b]);
        let image = loaded[0].image.as_ref().unwrap();
        assert_eq!((image.width, image.height), (200, 100));
        assert!(loader.poll().is_empty());
    }
}
