//! Markup file uploads
//!
//! Only `.htm`/`.html` files are accepted (case-insensitive). Reading the
//! bytes is the only suspension point; the import that follows runs as one
//! synchronous transaction. A failed read never reaches the importer.
//!
//! Error messages are meant to be shown to the user as they are.

use thiserror::Error;

use crate::error::DocError;

/// Accepted file extensions, lower-case, without the dot.
pub const MARKUP_EXTENSIONS: &[&str] = &["html", "htm"];

/// Upload failures, displayed verbatim to the user.
#[derive(Debug, Error)]
pub enum UploadError {
    /// File name does not end in a markup extension
    #[error("\"{0}\" is not an HTML file; choose a .html or .htm file")]
    NotMarkup(String),

    /// The file could not be read
    #[error("could not read \"{name}\": {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The markup could not be imported
    #[error("could not import the document: {0}")]
    Import(#[from] DocError),
}

/// Check if `name` has a markup extension.
pub fn is_markup_file_name(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty()
            && MARKUP_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
    })
}

/// Reject names without a markup extension.
pub fn check_file_name(name: &str) -> Result<(), UploadError> {
    if is_markup_file_name(name) {
        Ok(())
    } else {
        Err(UploadError::NotMarkup(name.to_string()))
    }
}

#[cfg(feature = "async")]
pub use self::reading::{import_upload, read_upload};

#[cfg(feature = "async")]
mod reading {
    use futures_util::io::{AsyncRead, AsyncReadExt};

    use super::{UploadError, check_file_name};
    use crate::import::ImportStats;
    use crate::tree::Editor;

    /// Read an uploaded file to text (invalid UTF-8 replaced).
    pub async fn read_upload<R>(name: &str, reader: &mut R) -> Result<String, UploadError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        check_file_name(name)?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .await
            .map_err(|source| UploadError::Read {
                name: name.to_string(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read an uploaded file and replace the editor's document with it.
    pub async fn import_upload<R>(
        editor: &mut Editor,
        name: &str,
        reader: &mut R,
    ) -> Result<ImportStats, UploadError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let markup = read_upload(name, reader).await.inspect_err(|err| {
            tracing::warn!(file = name, error = %err, "upload rejected");
        })?;
        let stats = editor.import_markup(&markup)?;
        tracing::info!(file = name, nodes = stats.nodes, "upload imported");
        Ok(stats)
    }
}
