pub mod assets;
pub mod audio;
pub mod clock;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod words;
