use colored::Colorize;
use std::path::{Path, PathBuf};
use stratus_core::ServiceManifest;

/// マニフェストを読み込む
///
/// パスが指定されない場合は `stratus-config` の探索順で検出します。
pub fn load_manifest(path: Option<PathBuf>) -> anyhow::Result<(ServiceManifest, PathBuf)> {
    let path = match path {
        Some(path) => path,
        None => stratus_config::find_manifest_file()?,
    };
    tracing::debug!("Loading manifest: {}", path.display());

    let manifest = stratus_core::parse_manifest_file(&path)?;
    Ok((manifest, path))
}

/// 読み込んだマニフェストを表示
pub fn print_loaded_manifest(path: &Path) {
    println!("📄 マニフェスト: {}", path.display().to_string().cyan());
}

/// マニフェストの概要を表示
pub fn print_summary(manifest: &ServiceManifest) {
    println!("サマリー:");
    println!("  サービス: {}", manifest.name.cyan());
    if !manifest.description.is_empty() {
        println!("  説明: {}", manifest.description);
    }
    println!(
        "  バケット: {}",
        manifest.bucket.as_deref().unwrap_or("(未設定)")
    );

    println!("  関数: {}個", manifest.functions.len());
    for function in &manifest.functions {
        let role = match (&function.role, &function.role_definition) {
            (Some(name), _) => name.clone(),
            (None, Some(definition)) => format!("{} (新規)", definition.logical_id()),
            (None, None) => "(未設定)".to_string(),
        };
        println!(
            "    - {} (role: {}, {}MB, {}s)",
            function.name.cyan(),
            role,
            function.memory_size,
            function.timeout
        );
    }

    if let Some(api) = &manifest.api {
        println!("  API: {} (stage: {})", api.name.cyan(), api.stage);
        for resource in &api.resources {
            println!(
                "    - {} {} → {}",
                resource.effective_methods().join(","),
                resource.path,
                resource.function
            );
        }
    }

    if let Some(site) = &manifest.site {
        println!("  サイト: {}", site.resources_dir.display());
    }
}
