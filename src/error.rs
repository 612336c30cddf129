use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown button name: {0:?}")]
    UnknownButton(String),
    #[error("input state used before init()")]
    InputNotInitialized,
    #[error("animation is not running")]
    AnimationNotRunning,
    #[error("animation callback panicked")]
    AnimationPanicked,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
