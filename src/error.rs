use std::io;
use thiserror::Error;

/// Errors raised while polling metrics or handling window events.
///
/// None of these are fatal: the event loop logs them and keeps running.
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("command failed: {0}")]
    Command(String),

    #[error("unparsable output: {0}")]
    Parse(String),

    #[cfg(feature = "nvidia")]
    #[error("NVML error: {0}")]
    Nvml(#[from] nvml_wrapper::error::NvmlError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, WidgetError>;

impl WidgetError {
    pub fn command<S: Into<String>>(msg: S) -> Self {
        WidgetError::Command(msg.into())
    }

    pub fn parse<S: Into<String>>(msg: S) -> Self {
        WidgetError::Parse(msg.into())
    }

    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        WidgetError::Unsupported(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        assert_eq!(WidgetError::command("exit status 9").to_string(), "command failed: exit status 9");
        assert_eq!(WidgetError::parse("abc").to_string(), "unparsable output: abc");
        let io: WidgetError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(io.to_string().starts_with("IO error"));
    }
}
