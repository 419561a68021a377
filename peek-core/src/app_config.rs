use std::{fs, io};

use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigError, File};

/// Errors that can occur while resolving application directories and settings.
#[derive(thiserror::Error, Debug)]
pub enum AppConfigError {
    /// The platform did not report a local data directory, or it is not valid UTF-8.
    #[error("Local data directory is unavailable")]
    NoDataDirectory,

    /// A configuration file could not be parsed or a key was missing.
    #[error("Error reading configuration")]
    Config(#[from] ConfigError),

    /// A configuration file or directory could not be created.
    #[error("Error interacting with path: {path}")]
    IO { path: Utf8PathBuf, #[source] source: io::Error },
}

/// Gets the default directory for on-disk object URLs.
///
/// This function reads `peek.toml` from the application data directory and replaces the
/// `%%AppDataDirectory%%` placeholder in `blob_directory` with the actual directory path. The
/// directory will be created if it doesn't already exist.
pub fn get_default_blob_directory() -> Result<Utf8PathBuf, AppConfigError> {
    let app_folder = get_app_folder()?;
    get_blob_directory_in(&app_folder)
}

/// Same as [`get_default_blob_directory`], but rooted at an explicit application folder.
///
/// A `peek.toml` with default values is written into `app_folder` if none exists yet.
pub fn get_blob_directory_in(app_folder: &Utf8Path) -> Result<Utf8PathBuf, AppConfigError> {
    let preview_config = get_preview_config(app_folder)?;

    let folder = Utf8PathBuf::from(preview_config.get_string("blob_directory")?
        .replace("%%AppDataDirectory%%", app_folder.as_str()));
    // create if doesn't exist
    create_dir_if_missing(&folder)?;

    Ok(folder)
}

fn get_preview_config(app_folder: &Utf8Path) -> Result<Config, AppConfigError> {
    create_dir_if_missing(app_folder)?;

    let config_file_path = app_folder.join("peek.toml");
    if !config_file_path.is_file() {
        // If the peek.toml file does not exist, create it with default values
        fs::write(&config_file_path, DEFAULT_PREVIEW_CONFIG_BYTES)
            .map_err(|e| AppConfigError::IO { path: config_file_path.clone(), source: e })?;
    }

    Ok(Config::builder()
        .add_source(File::with_name(config_file_path.as_str()))
        .build()?)
}

fn get_app_folder() -> Result<Utf8PathBuf, AppConfigError> {
    let data_dir = dirs::data_local_dir().ok_or(AppConfigError::NoDataDirectory)?;
    let data_dir = Utf8PathBuf::from_path_buf(data_dir).map_err(|_| AppConfigError::NoDataDirectory)?;
    Ok(data_dir.join("peek"))
}

fn create_dir_if_missing(folder: &Utf8Path) -> Result<(), AppConfigError> {
    if !folder.is_dir() {
        fs::create_dir_all(folder)
            .map_err(|e| AppConfigError::IO { path: folder.to_path_buf(), source: e })?;
    }
    Ok(())
}

// Private constants
#[cfg(target_family = "unix")]
const DEFAULT_PREVIEW_CONFIG_BYTES: &[u8] = include_bytes!("../artifacts/defaults/peek.toml");
#[cfg(target_family = "windows")]
const DEFAULT_PREVIEW_CONFIG_BYTES: &[u8] = include_bytes!("../artifacts/defaults/windows/peek.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_directory_is_created_under_app_folder() {
        let temp = tempfile::tempdir().unwrap();
        let app_folder = Utf8Path::from_path(temp.path()).unwrap().join("peek");

        let blobs = get_blob_directory_in(&app_folder).unwrap();

        assert!(blobs.starts_with(&app_folder));
        assert!(blobs.is_dir());
        assert!(app_folder.join("peek.toml").is_file());
    }

    #[test]
    fn existing_config_is_respected() {
        let temp = tempfile::tempdir().unwrap();
        let app_folder = Utf8Path::from_path(temp.path()).unwrap().to_path_buf();
        fs::write(app_folder.join("peek.toml"), "blob_directory = \"%%AppDataDirectory%%/elsewhere\"\n").unwrap();

        let blobs = get_blob_directory_in(&app_folder).unwrap();

        assert_eq!(blobs, app_folder.join("elsewhere"));
    }
}
