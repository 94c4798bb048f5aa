//! Fetch template sources from somewhere other than memory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// A source of template text, keyed by an identifier.
///
/// Loading is synchronous. Hosts that fetch templates asynchronously should
/// do so before compiling and pass the text as an ordinary dependency.
pub trait Loader {
    /// Returns the template source for the given identifier.
    fn load(&self, identifier: &str) -> Result<String>;
}

impl<F> Loader for F
where
    F: Fn(&str) -> Result<String>,
{
    fn load(&self, identifier: &str) -> Result<String> {
        self(identifier)
    }
}

/// Loads templates from files below a root directory.
///
/// # Examples
///
/// ```no_run
/// use forma::{Dependencies, FileLoader};
///
/// let loader = FileLoader::new("templates").with_extension("html");
/// let mut deps = Dependencies::new();
/// deps.load(&loader, &["card", "layout"])?;
/// # Ok::<(), forma::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
    extension: Option<String>,
}

impl FileLoader {
    /// Construct a loader that reads files relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: None,
        }
    }

    /// Append an extension to every identifier, e.g. `card` becomes
    /// `card.html`.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    fn path(&self, identifier: &str) -> Result<PathBuf> {
        let relative = Path::new(identifier);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if identifier.is_empty() || escapes {
            return Err(Error::load(
                identifier,
                "identifier must be a relative path inside the template root",
            ));
        }
        let mut path = self.root.join(relative);
        if let Some(ext) = &self.extension {
            let mut file = path.into_os_string();
            file.push(".");
            file.push(ext);
            path = PathBuf::from(file);
        }
        Ok(path)
    }
}

impl Loader for FileLoader {
    fn load(&self, identifier: &str) -> Result<String> {
        let path = self.path(identifier)?;
        trace!(identifier, path = %path.display(), "loading template");
        fs::read_to_string(&path).map_err(|err| Error::load(identifier, err))
    }
}
