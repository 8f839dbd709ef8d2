use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use word_invaders::assets::*;
use word_invaders::audio::AudioManager;
use word_invaders::entities::SoundCue;
use word_invaders::error::AssetError;

fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(w, h, Rgba(rgba)))
}

/// Noisy enough that the compressed data spans most of the file.
fn gradient_png(w: u32, h: u32) -> Vec<u8> {
    encode_png(&RgbaImage::from_fn(w, h, |x, y| {
        Rgba([x as u8, y as u8, (x ^ y).wrapping_mul(31) as u8, 255])
    }))
}

/// 16-bit mono PCM at 8 kHz.
fn wav_bytes(samples: usize) -> Vec<u8> {
    let data_len = (samples * 2) as u32;
    let mut b = Vec::new();
    b.extend_from_slice(b"RIFF");
    b.extend_from_slice(&(36 + data_len).to_le_bytes());
    b.extend_from_slice(b"WAVEfmt ");
    b.extend_from_slice(&16u32.to_le_bytes());
    b.extend_from_slice(&1u16.to_le_bytes()); // PCM
    b.extend_from_slice(&1u16.to_le_bytes()); // mono
    b.extend_from_slice(&8000u32.to_le_bytes());
    b.extend_from_slice(&16000u32.to_le_bytes());
    b.extend_from_slice(&2u16.to_le_bytes());
    b.extend_from_slice(&16u16.to_le_bytes());
    b.extend_from_slice(b"data");
    b.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..samples {
        let v = ((i % 40) as i16 - 20) * 500;
        b.extend_from_slice(&v.to_le_bytes());
    }
    b
}

/// Write a complete, valid asset directory.
fn populate(dir: &Path) {
    for name in [BACKGROUND_FILE, SPACESHIP_FILE, BULLET_FILE, HEART_FILE] {
        fs::write(dir.join(name), gradient_png(64, 64)).unwrap();
    }
    for name in [SWOOSH_FILE, EXPLOSION_FILE, SHOOTING_FILE, MUSIC_FILE] {
        fs::write(dir.join(name), wav_bytes(800)).unwrap();
    }
}

// ── Images ────────────────────────────────────────────────────────────────────

#[test]
fn image_is_decoded_and_rescaled() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ship.png"), gradient_png(128, 96)).unwrap();
    let loader = AssetLoader::new(dir.path());

    let ship = loader.load_image("ship.png", Some((50, 50))).unwrap();
    assert_eq!(ship.pixels.dimensions(), (50, 50));
    assert!(ship.path.ends_with("ship.png"));

    let unscaled = loader.load_image("ship.png", None).unwrap();
    assert_eq!(unscaled.pixels.dimensions(), (128, 96));
}

#[test]
fn rescaled_solid_image_keeps_its_colour() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("heart.png"), solid_png(64, 64, [220, 20, 60, 255])).unwrap();
    let heart = AssetLoader::new(dir.path())
        .load_image("heart.png", Some(HEART_SIZE))
        .unwrap();
    assert_eq!(heart.pixels.dimensions(), HEART_SIZE);
    assert_eq!(heart.average_rgb(), Some((220, 20, 60)));
}

#[test]
fn transparent_image_has_no_tint() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("clear.png"), solid_png(8, 8, [255, 255, 255, 0])).unwrap();
    let img = AssetLoader::new(dir.path()).load_image("clear.png", None).unwrap();
    assert_eq!(img.average_rgb(), None);
}

#[test]
fn header_only_png_is_corrupt() {
    // signature + IHDR, no image data
    let mut b = b"\x89PNG\r\n\x1a\n".to_vec();
    b.extend_from_slice(&13u32.to_be_bytes());
    b.extend_from_slice(b"IHDR");
    b.extend_from_slice(&64u32.to_be_bytes());
    b.extend_from_slice(&64u32.to_be_bytes());

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("stub.png"), b).unwrap();
    let err = AssetLoader::new(dir.path()).load_image("stub.png", None).unwrap_err();
    assert!(matches!(err, AssetError::Corrupt { kind: AssetKind::Image, .. }));
}

#[test]
fn truncated_png_is_corrupt() {
    let full = gradient_png(64, 64);
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cut.png"), &full[..full.len() / 2]).unwrap();
    let err = AssetLoader::new(dir.path())
        .load_image("cut.png", Some((50, 50)))
        .unwrap_err();
    assert!(matches!(err, AssetError::Corrupt { kind: AssetKind::Image, .. }));
    assert!(err.path().ends_with("cut.png"));
}

// ── Sounds ────────────────────────────────────────────────────────────────────

#[test]
fn sound_stream_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    // the decoder goes by content, not by extension
    fs::write(dir.path().join("swoosh.mp3"), wav_bytes(800)).unwrap();
    let sound = AssetLoader::new(dir.path()).load_sound("swoosh.mp3").unwrap();
    assert_eq!(sound.channels, 1);
    assert_eq!(sound.sample_rate, 8000);
}

#[test]
fn bare_id3_tag_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tag.mp3"), b"ID3").unwrap();
    let err = AssetLoader::new(dir.path()).load_sound("tag.mp3").unwrap_err();
    assert!(matches!(err, AssetError::Corrupt { kind: AssetKind::Sound, .. }));
}

#[test]
fn stream_without_samples_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("silent.mp3"), wav_bytes(0)).unwrap();
    assert!(AssetLoader::new(dir.path()).load_sound("silent.mp3").is_err());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = AssetLoader::new(dir.path());
    let err = loader.load_sound("swoosh.mp3").unwrap_err();
    assert!(matches!(err, AssetError::Io { kind: AssetKind::Sound, .. }));
    assert!(err.path().ends_with("swoosh.mp3"));
    assert!(err.to_string().starts_with("error loading sound:"));
}

#[test]
fn empty_or_wrong_format_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("empty.png"), b"").unwrap();
    fs::write(dir.path().join("fake.png"), b"GIF89a not a png at all").unwrap();
    fs::write(dir.path().join("fake.mp3"), b"plain text, not audio").unwrap();
    let loader = AssetLoader::new(dir.path());

    for name in ["empty.png", "fake.png"] {
        let err = loader.load_image(name, None).unwrap_err();
        assert!(matches!(err, AssetError::Corrupt { .. }), "{name} accepted");
    }
    let err = loader.load_sound("fake.mp3").unwrap_err();
    assert!(matches!(err, AssetError::Corrupt { .. }));
}

// ── The game's asset set ──────────────────────────────────────────────────────

#[test]
fn load_all_applies_game_sizes() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let assets = GameAssets::load_all(&AssetLoader::new(dir.path())).unwrap();
    assert_eq!(assets.background.pixels.dimensions(), (800, 600));
    assert_eq!(assets.spaceship.pixels.dimensions(), (50, 50));
    assert_eq!(assets.bullet.pixels.dimensions(), (20, 40));
    assert_eq!(assets.heart.pixels.dimensions(), (30, 30));
    assert!(assets.music.is_some());
}

#[test]
fn load_all_stops_at_missing_asset() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    fs::remove_file(dir.path().join(EXPLOSION_FILE)).unwrap();
    let err = GameAssets::load_all(&AssetLoader::new(dir.path())).unwrap_err();
    assert!(err.path().ends_with(EXPLOSION_FILE));
}

#[test]
fn load_all_stops_at_corrupt_image() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let full = gradient_png(64, 64);
    fs::write(dir.path().join(SPACESHIP_FILE), &full[..full.len() / 2]).unwrap();
    let err = GameAssets::load_all(&AssetLoader::new(dir.path())).unwrap_err();
    assert!(matches!(err, AssetError::Corrupt { .. }));
    assert!(err.path().ends_with(SPACESHIP_FILE));
}

#[test]
fn missing_music_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    fs::remove_file(dir.path().join(MUSIC_FILE)).unwrap();
    let assets = GameAssets::load_all(&AssetLoader::new(dir.path())).unwrap();
    assert!(assets.music.is_none());

    fs::write(dir.path().join(MUSIC_FILE), b"ID3").unwrap();
    let assets = GameAssets::load_all(&AssetLoader::new(dir.path())).unwrap();
    assert!(assets.music.is_none());
}

#[test]
fn default_root_is_desktop_folder() {
    let root = AssetLoader::default_root();
    assert!(root.ends_with("Desktop/space_invader_asset"));
}

// ── Audio ─────────────────────────────────────────────────────────────────────

#[test]
fn audio_plays_loaded_cues() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let assets = GameAssets::load_all(&AssetLoader::new(dir.path())).unwrap();

    let mut audio = AudioManager::new(Some(&assets), false);
    assert!(audio.play(SoundCue::Reveal));
    assert!(audio.play(SoundCue::Explosion));
    assert!(audio.play(SoundCue::Shoot));
    assert!(audio.play(SoundCue::PowerUp));
    assert!(audio.start_music());
    assert!(audio.start_music());
    assert!(audio.music_playing());
}

#[test]
fn muting_silences_cues_and_stops_music() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let assets = GameAssets::load_all(&AssetLoader::new(dir.path())).unwrap();
    let mut audio = AudioManager::new(Some(&assets), false);
    audio.start_music();

    audio.set_muted(true);
    assert!(audio.is_muted());
    assert!(!audio.music_playing());
    assert!(!audio.play(SoundCue::Explosion));
    assert!(!audio.start_music());

    audio.set_muted(false);
    assert!(audio.start_music());
}

#[test]
fn audio_without_music_track_still_plays_cues() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    fs::remove_file(dir.path().join(MUSIC_FILE)).unwrap();
    let assets = GameAssets::load_all(&AssetLoader::new(dir.path())).unwrap();

    let mut audio = AudioManager::new(Some(&assets), false);
    assert!(!audio.start_music());
    assert!(audio.play(SoundCue::Reveal));
}

#[test]
fn audio_without_assets_is_silent() {
    let mut audio = AudioManager::new(None, false);
    assert!(!audio.play(SoundCue::Explosion));
    assert!(!audio.start_music());
}
