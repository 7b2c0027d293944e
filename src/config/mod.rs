//! Configuration root resolution and structured-data file handling.
pub mod format;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use format::{Attributes, DataFormat, find_data_file, load_mapping};

/// Location of the connectables configuration tree.
///
/// ```text
/// <base>/kupfer/connectables/
/// ├── leafs/    one file per device
/// └── actions/  one file per action definition
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRoot {
    dir: PathBuf,
}

impl ConfigRoot {
    /// Name of the connectables directory.
    pub const DIR_NAME: &'static str = "connectables";

    /// Host application directory the connectables directory lives in.
    pub const HOST_DIR_NAME: &'static str = "kupfer";

    /// Use `dir` directly as the connectables directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the connectables directory from the environment.
    ///
    /// The base directory is `base_override` (the `--config-root` flag),
    /// otherwise `$XDG_CONFIG_HOME`, then `$HOME/.config`. Under it,
    /// `kupfer/connectables` is used unless a standalone `connectables`
    /// directory exists.
    #[must_use]
    pub fn resolve(base_override: Option<&Path>) -> Self {
        Self::resolve_from(
            base_override,
            std::env::var_os("XDG_CONFIG_HOME"),
            std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")),
        )
    }

    /// Environment-independent core of [`resolve`](Self::resolve).
    #[must_use]
    pub fn resolve_from(
        base_override: Option<&Path>,
        xdg_config_home: Option<OsString>,
        home: Option<OsString>,
    ) -> Self {
        let base = base_override.map_or_else(
            || {
                xdg_config_home
                    .filter(|v| !v.is_empty())
                    .map_or_else(
                        || {
                            home.map_or_else(|| PathBuf::from("."), PathBuf::from)
                                .join(".config")
                        },
                        PathBuf::from,
                    )
            },
            Path::to_path_buf,
        );
        Self::under(&base)
    }

    /// The connectables directory under `base`: `<base>/connectables` if it
    /// is a directory, else `<base>/kupfer/connectables`.
    #[must_use]
    pub fn under(base: &Path) -> Self {
        let standalone = base.join(Self::DIR_NAME);
        if standalone.is_dir() {
            return Self::new(standalone);
        }
        Self::new(base.join(Self::HOST_DIR_NAME).join(Self::DIR_NAME))
    }

    /// The connectables directory itself.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory holding device ("leaf") files.
    #[must_use]
    pub fn leafs_dir(&self) -> PathBuf {
        self.dir.join("leafs")
    }

    /// Directory holding action definition files.
    #[must_use]
    pub fn actions_dir(&self) -> PathBuf {
        self.dir.join("actions")
    }
}
