// Background decoding of uploads and sprite templates.
// Each `submit` gets a generation number and decodes on its own thread. Only
// the newest submission per target counts: if a second upload arrives before
// the first finishes, the first result is dropped when it lands.

use crate::error::Error;
use crate::types::OverlayKind;
use crossbeam_channel::{Receiver, Sender, unbounded};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::Path;
use std::thread;

/// What a decoded image is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeTarget {
    Background,
    Template(OverlayKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(pub u64);

/// One finished decode.
#[derive(Debug)]
pub struct Decoded {
    pub target: DecodeTarget,
    pub generation: Generation,
    pub result: Result<RgbaImage, Error>,
}

pub struct Loader {
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
    next: u64,
    latest: HashMap<DecodeTarget, Generation>,
}

impl Loader {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx, next: 1, latest: HashMap::new() }
    }

    /// Start decoding `bytes` for `target`. Supersedes any pending decode for the same target.
    pub fn submit(&mut self, target: DecodeTarget, bytes: Vec<u8>) -> Generation {
        let generation = self.bump(target);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = decode(&bytes);
            // Receiver gone means the editor is shutting down
            let _ = tx.send(Decoded { target, generation, result });
        });
        generation
    }

    /// Read the file, then decode it in the background.
    /// A read error is reported straight away and also cancels any older
    /// decode still in flight for the same target.
    pub fn submit_path(&mut self, target: DecodeTarget, path: &Path) -> Result<Generation, Error> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Some(cancelled) = self.latest.remove(&target) {
                    log::debug!("cancelled decode {cancelled:?} for {target:?}");
                }
                return Err(Error::DecodeFailure(format!("read {}: {e}", path.display())));
            }
        };
        log::info!("decoding {} for {:?}", path.display(), target);
        Ok(self.submit(target, bytes))
    }

    /// Finished decodes that are still current. Never blocks.
    pub fn poll(&mut self) -> Vec<Decoded> {
        let mut fresh = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            if self.latest.get(&done.target) == Some(&done.generation) {
                self.latest.remove(&done.target);
                fresh.push(done);
            } else {
                log::debug!("dropping stale decode {:?} for {:?}", done.generation, done.target);
            }
        }
        fresh
    }

    /// True while some submitted decode has not been delivered by `poll`.
    pub fn is_pending(&self) -> bool {
        !self.latest.is_empty()
    }

    fn bump(&mut self, target: DecodeTarget) -> Generation {
        let generation = Generation(self.next);
        self.next += 1;
        self.latest.insert(target, generation);
        generation
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode any format the `image` crate knows into RGBA8.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, Error> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::DecodeFailure(e.to_string()))?;
    let img = img.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::DecodeFailure("image has no pixels".into()));
    }
    Ok(img)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::export::encode_png;
    use image::Rgba;
    use std::time::{Duration, Instant};

    pub(crate) fn png(w: u32, h: u32, c: [u8; 4]) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(w, h, Rgba(c))).unwrap()
    }

    /// Poll until nothing is pending (or give up after a few seconds).
    pub(crate) fn drain(loader: &mut Loader) -> Vec<Decoded> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut out = Vec::new();
        while loader.is_pending() && Instant::now() < deadline {
            out.extend(loader.poll());
            thread::sleep(Duration::from_millis(5));
        }
        out
    }

    #[test]
    fn decodes_png_bytes() {
        let img = decode(&png(3, 2, [1, 2, 3, 255])).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [1, 2, 3, 255]);
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));
    }

    #[test]
    fn delivers_result_on_poll() {
        let mut loader = Loader::new();
        let generation = loader.submit(DecodeTarget::Background, png(4, 4, [9, 9, 9, 255]));
        let done = drain(&mut loader);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].generation, generation);
        assert_eq!(done[0].target, DecodeTarget::Background);
        assert!(done[0].result.is_ok());
        assert!(!loader.is_pending());
    }

    #[test]
    fn newer_submission_supersedes_older_one() {
        let mut loader = Loader::new();
        let _old = loader.submit(DecodeTarget::Background, png(50, 50, [1, 1, 1, 255]));
        let new = loader.submit(DecodeTarget::Background, png(2, 2, [2, 2, 2, 255]));

        let done = drain(&mut loader);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].generation, new);
        assert_eq!(done[0].result.as_ref().unwrap().dimensions(), (2, 2));

        // the stale one may land after the fresh one; it must still be ignored
        thread::sleep(Duration::from_millis(50));
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn targets_do_not_supersede_each_other() {
        let mut loader = Loader::new();
        loader.submit(DecodeTarget::Template(OverlayKind::Fist), png(2, 2, [0, 0, 0, 255]));
        loader.submit(DecodeTarget::Template(OverlayKind::Laser), png(3, 3, [0, 0, 0, 255]));
        loader.submit(DecodeTarget::Background, b"broken".to_vec());
        let done = drain(&mut loader);
        assert_eq!(done.len(), 3);
        let bg = done.iter().find(|d| d.target == DecodeTarget::Background).unwrap();
        assert!(bg.result.is_err());
    }

    #[test]
    fn unreadable_file_cancels_the_older_decode() {
        let mut loader = Loader::new();
        loader.submit(DecodeTarget::Background, png(30, 30, [5, 5, 5, 255]));
        let err = loader
            .submit_path(DecodeTarget::Background, Path::new("/no/such/meme/newer.png"))
            .unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));
        assert!(!loader.is_pending());

        thread::sleep(Duration::from_millis(100));
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn missing_file_fails_before_submitting() {
        let mut loader = Loader::new();
        let err = loader
            .submit_path(DecodeTarget::Background, Path::new("/no/such/meme/background.png"))
            .unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));
        assert!(!loader.is_pending());
    }
}
