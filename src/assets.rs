/// Asset loading.
///
/// Assets are read from a single directory by exact filename and fully
/// decoded: images through `image` (then rescaled to the size they are drawn
/// at), sounds through `rodio`'s decoder, which needs no output device.  Any
/// failure comes back as an `AssetError`; the caller decides whether to stop
/// the program.

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::imageops::FilterType;
use image::RgbaImage;
use rodio::{Decoder, Source};

use crate::entities::{BULLET_HEIGHT, BULLET_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::AssetError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Sound,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Sound => write!(f, "sound"),
        }
    }
}

/// A decoded image at the size it is drawn at.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub pixels: RgbaImage,
}

impl ImageAsset {
    /// Alpha-weighted mean colour, `None` when every pixel is transparent.
    pub fn average_rgb(&self) -> Option<(u8, u8, u8)> {
        let (mut r, mut g, mut b, mut weight) = (0u64, 0u64, 0u64, 0u64);
        for px in self.pixels.pixels() {
            let [pr, pg, pb, pa] = px.0;
            let a = pa as u64;
            r += pr as u64 * a;
            g += pg as u64 * a;
            b += pb as u64 * a;
            weight += a;
        }
        if weight == 0 {
            return None;
        }
        Some(((r / weight) as u8, (g / weight) as u8, (b / weight) as u8))
    }
}

/// A sound whose stream decoded to at least one sample.
#[derive(Clone, Debug)]
pub struct SoundAsset {
    pub path: PathBuf,
    pub channels: u16,
    pub sample_rate: u32,
    /// Known only for containers that record it.
    pub duration: Option<Duration>,
}

pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/Desktop/space_invader_asset`
    pub fn default_root() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join("Desktop").join("space_invader_asset")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, kind: AssetKind, filename: &str) -> Result<(PathBuf, Vec<u8>), AssetError> {
        let path = self.root.join(filename);
        log::info!("Loading asset: {}", path.display());

        let bytes = std::fs::read(&path).map_err(|source| AssetError::Io {
            kind,
            path: path.clone(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(AssetError::Corrupt {
                kind,
                path,
                reason: "file is empty".to_string(),
            });
        }
        Ok((path, bytes))
    }

    /// Decode an image, rescaling it to `size` when one is given.
    pub fn load_image(
        &self,
        filename: &str,
        size: Option<(u32, u32)>,
    ) -> Result<ImageAsset, AssetError> {
        let (path, bytes) = self.read(AssetKind::Image, filename)?;
        let decoded = match image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                return Err(AssetError::Corrupt {
                    kind: AssetKind::Image,
                    path,
                    reason: e.to_string(),
                })
            }
        };
        let pixels = match size {
            Some((w, h)) if (w, h) != (decoded.width(), decoded.height()) => {
                log::debug!(
                    "rescale {} {}x{} -> {}x{}",
                    path.display(),
                    decoded.width(),
                    decoded.height(),
                    w,
                    h
                );
                decoded.resize_exact(w, h, FilterType::Triangle).to_rgba8()
            }
            _ => decoded.to_rgba8(),
        };
        Ok(ImageAsset { path, pixels })
    }

    /// Decode a sound far enough to prove the stream is playable.
    pub fn load_sound(&self, filename: &str) -> Result<SoundAsset, AssetError> {
        let (path, bytes) = self.read(AssetKind::Sound, filename)?;
        let corrupt = |path: PathBuf, reason: String| AssetError::Corrupt {
            kind: AssetKind::Sound,
            path,
            reason,
        };

        let mut decoder = match Decoder::new(Cursor::new(bytes)) {
            Ok(d) => d,
            Err(e) => return Err(corrupt(path, e.to_string())),
        };
        let channels = u16::from(decoder.channels());
        let sample_rate = u32::from(decoder.sample_rate());
        let duration = decoder.total_duration();
        if decoder.next().is_none() {
            return Err(corrupt(path, "stream holds no audio samples".to_string()));
        }
        log::debug!("{}: {} ch @ {} Hz", path.display(), channels, sample_rate);
        Ok(SoundAsset {
            path,
            channels,
            sample_rate,
            duration,
        })
    }
}

// ── The game's asset set ──────────────────────────────────────────────────────

pub const BACKGROUND_FILE: &str = "background.png";
pub const SPACESHIP_FILE: &str = "spaceship.png";
pub const BULLET_FILE: &str = "bullet.png";
pub const HEART_FILE: &str = "heart.png";
pub const SWOOSH_FILE: &str = "swoosh.mp3";
pub const EXPLOSION_FILE: &str = "explosion.mp3";
pub const SHOOTING_FILE: &str = "shooting.mp3";
pub const MUSIC_FILE: &str = "background_music.mp3";

pub const HEART_SIZE: (u32, u32) = (30, 30);

#[derive(Clone, Debug)]
pub struct GameAssets {
    pub background: ImageAsset,
    pub spaceship: ImageAsset,
    pub bullet: ImageAsset,
    pub heart: ImageAsset,
    pub swoosh: SoundAsset,
    pub explosion: SoundAsset,
    pub shooting: SoundAsset,
    /// The game plays on without its music track.
    pub music: Option<SoundAsset>,
}

impl GameAssets {
    /// Load every required asset, stopping at the first failure.
    pub fn load_all(loader: &AssetLoader) -> Result<Self, AssetError> {
        let px = |w: i32, h: i32| Some((w as u32, h as u32));
        let music = match loader.load_sound(MUSIC_FILE) {
            Ok(track) => Some(track),
            Err(e) => {
                log::warn!("{e} - continuing without background music");
                None
            }
        };
        Ok(Self {
            background: loader.load_image(BACKGROUND_FILE, px(SCREEN_WIDTH, SCREEN_HEIGHT))?,
            spaceship: loader.load_image(SPACESHIP_FILE, px(PLAYER_WIDTH, PLAYER_HEIGHT))?,
            bullet: loader.load_image(BULLET_FILE, px(BULLET_WIDTH, BULLET_HEIGHT))?,
            heart: loader.load_image(HEART_FILE, Some(HEART_SIZE))?,
            swoosh: loader.load_sound(SWOOSH_FILE)?,
            explosion: loader.load_sound(EXPLOSION_FILE)?,
            shooting: loader.load_sound(SHOOTING_FILE)?,
            music,
        })
    }
}
