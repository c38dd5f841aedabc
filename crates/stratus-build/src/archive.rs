//! ZIPアーカイブの作成

use crate::assets;
use crate::error::{BuildError, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tempfile::TempPath;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// パッケージアーカイブの内容
#[derive(Debug, Clone, Copy)]
pub struct PackageContents<'a> {
    /// コンパイル済みバイナリ
    pub binary: &'a Path,
    /// アーカイブ内のバイナリ名
    pub binary_name: &'a str,
    /// 生成済みの index.js
    pub adapter_source: &'a str,
    /// 追加で展開するZIP（カスタムリソース用の node_modules など）
    pub support_bundle: Option<&'a Path>,
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// 作業ディレクトリに一時ZIPファイルを作成
pub fn temporary_archive(prefix: &str, work_dir: &Path) -> Result<(File, TempPath)> {
    let file = tempfile::Builder::new()
        .prefix(&format!("{}-", prefix))
        .suffix(".zip")
        .tempfile_in(work_dir)?;
    let (file, path) = file.into_parts();
    Ok((file, path))
}

/// パッケージアーカイブを書き出す
///
/// エントリ順: バイナリ、index.js、同梱スクリプト、サポートバンドルの中身
pub fn write_package<W: Write + io::Seek>(writer: W, contents: &PackageContents<'_>) -> Result<W> {
    let mut zip = ZipWriter::new(writer);

    zip.start_file(contents.binary_name, file_options().unix_permissions(0o755))?;
    let mut binary = File::open(contents.binary)?;
    io::copy(&mut binary, &mut zip)?;

    zip.start_file("index.js", file_options())?;
    zip.write_all(contents.adapter_source.as_bytes())?;

    tracing::debug!("Embedding CustomResource scripts");
    for (name, script) in assets::support_scripts() {
        tracing::debug!("Script name: {}", name);
        zip.start_file(name, file_options())?;
        zip.write_all(script.as_bytes())?;
    }

    match contents.support_bundle {
        Some(bundle) => copy_bundle(&mut zip, bundle)?,
        None => tracing::debug!("No support bundle configured"),
    }

    Ok(zip.finish()?)
}

fn copy_bundle<W: Write + io::Seek>(zip: &mut ZipWriter<W>, bundle: &Path) -> Result<()> {
    let bundle_error = |message: String| BuildError::SupportBundle {
        path: bundle.to_path_buf(),
        message,
    };

    let file = File::open(bundle).map_err(|e| bundle_error(e.to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| bundle_error(e.to_string()))?;
    tracing::debug!(
        "Embedding support bundle: {} ({} entries)",
        bundle.display(),
        archive.len()
    );

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        if entry.is_dir() {
            zip.add_directory(name, file_options())?;
        } else {
            tracing::trace!("Copying bundled file: {}", name);
            zip.start_file(name, file_options())?;
            io::copy(&mut entry, zip)?;
        }
    }
    Ok(())
}

/// サイトディレクトリを再帰的にZIP化
///
/// ディレクトリは末尾 `/` 付きのエントリ、ファイルはDeflate圧縮で格納します。
pub fn write_site<W: Write + io::Seek>(writer: W, site_dir: &Path) -> Result<W> {
    if !site_dir.is_dir() {
        return Err(BuildError::SiteNotFound(site_dir.to_path_buf()));
    }

    let mut zip = ZipWriter::new(writer);
    let walker = WalkDir::new(site_dir).sort_by_file_name().min_depth(1);
    for entry in walker {
        let entry = entry.map_err(|e| BuildError::Io(io::Error::other(e)))?;
        let relative = entry
            .path()
            .strip_prefix(site_dir)
            .map_err(|e| BuildError::InvalidConfig(e.to_string()))?;
        // ZIP内のパス区切りは常に '/'
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), file_options())?;
        } else if entry.file_type().is_file() {
            tracing::trace!("Adding site file: {}", name);
            zip.start_file(name, file_options())?;
            let mut file = File::open(entry.path())?;
            io::copy(&mut file, &mut zip)?;
        }
    }

    Ok(zip.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn entry_names<R: io::Read + io::Seek>(reader: R) -> Vec<String> {
        let mut archive = ZipArchive::new(reader).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_write_package_layout() {
        let temp_dir = tempdir().unwrap();
        let binary = temp_dir.path().join("demo.lambda.amd64");
        fs::write(&binary, b"\x7fELF").unwrap();

        let contents = PackageContents {
            binary: &binary,
            binary_name: "demo.lambda.amd64",
            adapter_source: "// adapter",
            support_bundle: None,
        };
        let cursor = write_package(Cursor::new(Vec::new()), &contents).unwrap();
        let names = entry_names(Cursor::new(cursor.into_inner()));

        assert_eq!(names[0], "demo.lambda.amd64");
        assert_eq!(names[1], "index.js");
        assert_eq!(names[2], "cfn-response.js");
        assert!(names.contains(&"apigateway/inputmapping_json.vtl".to_string()));
        assert_eq!(names.len(), 2 + assets::SUPPORT_SCRIPTS.len());
    }

    #[test]
    fn test_write_package_with_support_bundle() {
        let temp_dir = tempdir().unwrap();
        let binary = temp_dir.path().join("bin");
        fs::write(&binary, b"bin").unwrap();

        let bundle_path = temp_dir.path().join("node_modules.zip");
        {
            let mut bundle = ZipWriter::new(File::create(&bundle_path).unwrap());
            bundle
                .add_directory("node_modules/", SimpleFileOptions::default())
                .unwrap();
            bundle
                .start_file("node_modules/adm-zip/index.js", SimpleFileOptions::default())
                .unwrap();
            bundle.write_all(b"module.exports = {};").unwrap();
            bundle.finish().unwrap();
        }

        let contents = PackageContents {
            binary: &binary,
            binary_name: "bin",
            adapter_source: "",
            support_bundle: Some(&bundle_path),
        };
        let cursor = write_package(Cursor::new(Vec::new()), &contents).unwrap();
        let names = entry_names(Cursor::new(cursor.into_inner()));

        assert_eq!(names.last().unwrap(), "node_modules/adm-zip/index.js");
        assert!(names.contains(&"node_modules/".to_string()));
    }

    #[test]
    fn test_write_package_invalid_bundle() {
        let temp_dir = tempdir().unwrap();
        let binary = temp_dir.path().join("bin");
        fs::write(&binary, b"bin").unwrap();
        let bundle_path = temp_dir.path().join("broken.zip");
        fs::write(&bundle_path, b"not a zip").unwrap();

        let contents = PackageContents {
            binary: &binary,
            binary_name: "bin",
            adapter_source: "",
            support_bundle: Some(&bundle_path),
        };
        let result = write_package(Cursor::new(Vec::new()), &contents);
        assert!(matches!(result, Err(BuildError::SupportBundle { .. })));
    }

    #[test]
    fn test_write_site() {
        let temp_dir = tempdir().unwrap();
        let site = temp_dir.path().join("public");
        fs::create_dir_all(site.join("css")).unwrap();
        fs::write(site.join("index.html"), "<html></html>").unwrap();
        fs::write(site.join("css").join("site.css"), "body {}").unwrap();

        let cursor = write_site(Cursor::new(Vec::new()), &site).unwrap();
        let names = entry_names(Cursor::new(cursor.into_inner()));

        assert_eq!(names, vec!["css/", "css/site.css", "index.html"]);
    }

    #[test]
    fn test_write_site_missing_dir() {
        let result = write_site(Cursor::new(Vec::new()), Path::new("/nonexistent/site"));
        assert!(matches!(result, Err(BuildError::SiteNotFound(_))));
    }

    #[test]
    fn test_temporary_archive_is_removed_on_drop() {
        let temp_dir = tempdir().unwrap();
        let (_file, path) = temporary_archive("demo", temp_dir.path()).unwrap();
        let location = path.to_path_buf();
        assert!(location.exists());
        assert!(
            location
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("demo-")
        );
        drop(path);
        assert!(!location.exists());
    }
}
