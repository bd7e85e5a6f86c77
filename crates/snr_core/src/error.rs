use thiserror::Error;

/// Errors raised while building a tile map from a source bitmap.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bitmap decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("No start tile found in map bitmap")]
    StartTileMissing,

    #[error("Map bitmap is {found_w}x{found_h}, needs at least {want_w}x{want_h}")]
    BitmapTooSmall {
        found_w: u32,
        found_h: u32,
        want_w: u32,
        want_h: u32,
    },
}

/// Errors raised while loading sprite assets.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sprite decode error: {0}")]
    Decode(#[from] image::ImageError),
}

/// Top-level environment error.
///
/// Setup failures (`Map`, `Asset`, `InvalidConfig`) are unrecoverable and
/// surface at construction. `InvalidAction` and `EpisodeOver` are caller
/// contract violations signaled from `step`.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid action index {0}, expected 0..4")]
    InvalidAction(u8),

    #[error("Episode already terminated, call reset before stepping")]
    EpisodeOver,
}

pub type Result<T> = std::result::Result<T, EnvError>;
