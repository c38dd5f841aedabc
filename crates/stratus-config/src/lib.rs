//! マニフェストの探索と設定ディレクトリ

pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// マニフェストのパスを直接指定する環境変数
pub const MANIFEST_PATH_ENV: &str = "STRATUS_MANIFEST_PATH";

const APP_DIR: &str = "stratus";
const PROJECT_DIR: &str = ".stratus";
const GLOBAL_MANIFEST: &str = "stratus.kdl";
const CANDIDATES: [&str; 4] = [
    "stratus.local.kdl",
    ".stratus.local.kdl",
    "stratus.kdl",
    ".stratus.kdl",
];

/// マニフェストがどこで見つかったか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSource {
    /// `STRATUS_MANIFEST_PATH`
    Env,
    /// 起点ディレクトリ直下
    CurrentDir,
    /// 起点ディレクトリの `.stratus/`
    ProjectDir,
    /// `~/.config/stratus/stratus.kdl`
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    pub path: PathBuf,
    pub source: ManifestSource,
}

/// Stratusの設定ディレクトリを取得（無ければ作成）
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join(APP_DIR);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// カレントディレクトリを起点にマニフェストを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 STRATUS_MANIFEST_PATH (直接パス指定)
/// 2. カレントディレクトリ: stratus.local.kdl, .stratus.local.kdl, stratus.kdl, .stratus.kdl
/// 3. ./.stratus/ ディレクトリ内: 同様の順序
/// 4. ~/.config/stratus/stratus.kdl (グローバル設定)
pub fn find_manifest_file() -> Result<PathBuf> {
    let current_dir = std::env::current_dir()?;
    locate_manifest(&current_dir).map(|location| location.path)
}

/// 指定ディレクトリを起点にマニフェストを探す
pub fn locate_manifest(start: &Path) -> Result<ManifestLocation> {
    // 1. 環境変数で直接指定（存在しなければ設定ミスとして扱う）
    if let Some(config_path) = std::env::var_os(MANIFEST_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if !path.is_file() {
            return Err(ConfigError::ManifestPathNotFound(path));
        }
        return Ok(found(path, ManifestSource::Env));
    }

    // 2. 起点ディレクトリ
    if let Some(path) = first_existing(start) {
        return Ok(found(path, ManifestSource::CurrentDir));
    }

    // 3. ./.stratus/
    let project_dir = start.join(PROJECT_DIR);
    if project_dir.is_dir()
        && let Some(path) = first_existing(&project_dir)
    {
        return Ok(found(path, ManifestSource::ProjectDir));
    }

    // 4. グローバル設定
    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join(APP_DIR).join(GLOBAL_MANIFEST);
        if global.is_file() {
            return Ok(found(global, ManifestSource::Global));
        }
    }

    Err(ConfigError::ManifestNotFound)
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn found(path: PathBuf, source: ManifestSource) -> ManifestLocation {
    tracing::debug!("Manifest found ({:?}): {}", source, path.display());
    ManifestLocation { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    fn without_env<F: FnOnce()>(f: F) {
        temp_env::with_var_unset(MANIFEST_PATH_ENV, f);
    }

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("stratus"));
        assert!(config_dir.exists());
    }

    #[test]
    #[serial]
    fn test_locate_manifest_in_start_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("stratus.kdl"), "// test").unwrap();

        without_env(|| {
            let location = locate_manifest(temp_dir.path()).unwrap();
            assert!(location.path.ends_with("stratus.kdl"));
            assert_eq!(location.source, ManifestSource::CurrentDir);
        });
    }

    #[test]
    #[serial]
    fn test_local_manifest_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("stratus.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join(".stratus.local.kdl"), "// hidden local").unwrap();

        without_env(|| {
            let location = locate_manifest(temp_dir.path()).unwrap();
            // .stratus.local.kdl が優先される
            assert!(location.path.ends_with(".stratus.local.kdl"));
        });
    }

    #[test]
    #[serial]
    fn test_locate_manifest_in_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project_dir = temp_dir.path().join(".stratus");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("stratus.kdl"), "// in project dir").unwrap();

        without_env(|| {
            let location = locate_manifest(temp_dir.path()).unwrap();
            assert!(location.path.ends_with(".stratus/stratus.kdl"));
            assert_eq!(location.source, ManifestSource::ProjectDir);
        });
    }

    #[test]
    #[serial]
    fn test_env_var_takes_precedence() {
        let temp_dir = tempfile::tempdir().unwrap();
        let custom = temp_dir.path().join("custom.kdl");
        fs::write(&custom, "// custom").unwrap();
        fs::write(temp_dir.path().join("stratus.kdl"), "// ignored").unwrap();

        temp_env::with_var(MANIFEST_PATH_ENV, Some(custom.as_os_str()), || {
            let location = locate_manifest(temp_dir.path()).unwrap();
            assert_eq!(location.path, custom);
            assert_eq!(location.source, ManifestSource::Env);
        });
    }

    #[test]
    #[serial]
    fn test_env_var_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.kdl");

        temp_env::with_var(MANIFEST_PATH_ENV, Some(missing.as_os_str()), || {
            let result = locate_manifest(temp_dir.path());
            assert!(matches!(result, Err(ConfigError::ManifestPathNotFound(_))));
        });
    }

    #[test]
    #[serial]
    fn test_find_manifest_file_uses_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("stratus.local.kdl"), "// local").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_var_unset(MANIFEST_PATH_ENV, find_manifest_file);
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("stratus.local.kdl"));
    }
}
