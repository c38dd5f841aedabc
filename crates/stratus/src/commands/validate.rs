use crate::utils;
use colored::Colorize;
use std::path::PathBuf;

pub fn handle(manifest: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{}", "マニフェストを検証中...".blue());

    let (manifest, path) = match utils::load_manifest(manifest) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ マニフェストを読み込めません".red().bold());
            eprintln!("  {}", e);
            eprintln!();
            eprintln!("stratus.kdl が存在するディレクトリで実行するか、-f で指定してください");
            std::process::exit(1);
        }
    };
    utils::print_loaded_manifest(&path);

    if let Err(e) = manifest.validate() {
        eprintln!();
        eprintln!("{}", "✗ 設定エラー".red().bold());
        eprintln!("  {}", e);
        std::process::exit(1);
    }

    println!("{}", "✓ マニフェストは正常です！".green().bold());
    println!();
    utils::print_summary(&manifest);

    Ok(())
}
