// One error type for the whole editor.
// Every variant states *where* things went wrong. None of them is fatal:
// the editor catches them at the command boundary and keeps running.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),
    /// Updating the window buffer failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),
    /// An upload or template could not be read or decoded
    #[error("Decode failure: {0}")]
    DecodeFailure(String),
    /// A resize/rotate/hue value outside its domain (e.g. scale <= 0)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Encoding or writing the exported picture failed
    #[error("Export failure: {0}")]
    ExportFailure(String),
    /// meme.toml could not be read, parsed or validated
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Short label shown in the HUD status line.
    pub fn label(&self) -> &'static str {
        match self {
            Error::WindowInit(_) | Error::WindowUpdate(_) => "WINDOW",
            Error::DecodeFailure(_) => "DECODE FAILED",
            Error::InvalidParameter(_) => "INVALID VALUE",
            Error::ExportFailure(_) => "EXPORT FAILED",
            Error::Config(_) => "CONFIG",
        }
    }
}
