use thiserror::Error;

/// Guidance shown when no Dropbox app key is configured.
pub const SETUP_GUIDANCE: &str = "Dropbox app key is not configured. \
Create an app at https://www.dropbox.com/developers/apps, add this app's URL \
as a redirect URI, then set DROPBOX_APP_KEY (or REACT_APP_DROPBOX_APP_KEY) \
in .env.local and restart.";

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed setting: bad URL, unknown log format, out-of-range limit.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No app key; the browser stays in setup mode.
    #[error("{}", SETUP_GUIDANCE)]
    MissingClientId,
}

pub type Result<T> = std::result::Result<T, Error>;
