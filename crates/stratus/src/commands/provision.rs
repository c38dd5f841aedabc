use crate::utils;
use colored::Colorize;
use std::path::PathBuf;
use stratus_provision::{ProvisionOptions, provision};

pub struct ProvisionArgs {
    pub manifest: Option<PathBuf>,
    pub noop: bool,
    pub bucket: Option<String>,
    pub output: Option<PathBuf>,
    pub support_bundle: Option<PathBuf>,
    pub region: Option<String>,
}

pub async fn handle(args: ProvisionArgs) -> anyhow::Result<()> {
    let (manifest, path) = utils::load_manifest(args.manifest)?;
    utils::print_loaded_manifest(&path);
    manifest.validate()?;

    let bucket = args.bucket.or_else(|| manifest.bucket.clone()).ok_or_else(|| {
        anyhow::anyhow!(
            "S3バケットが指定されていません: --bucket または service {{ bucket \"...\" }} で指定してください"
        )
    })?;

    if args.noop {
        println!("{}", "no-op モード: AWSへの変更は行いません".yellow());
    }
    println!(
        "🚀 {} をプロビジョニング中 (bucket: {})",
        manifest.name.cyan(),
        bucket.cyan()
    );

    let session = stratus_cloud_aws::connect(args.region).await;
    let mut options =
        ProvisionOptions::from_manifest(&manifest, Some(bucket), session)?.with_noop(args.noop);

    if let Some(output) = &args.output {
        let file = std::fs::File::create(output)?;
        options = options.with_template_sink(Box::new(file));
    }
    if let Some(bundle) = args.support_bundle {
        options = options.with_support_bundle(bundle);
    }

    match provision(options).await {
        Ok(()) => {
            println!();
            println!("{}", "✓ プロビジョニングが完了しました！".green().bold());
            if let Some(output) = &args.output {
                println!("  テンプレート: {}", output.display().to_string().cyan());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ プロビジョニングに失敗しました".red().bold());
            eprintln!("  {}", e.user_message());
            std::process::exit(1);
        }
    }
}
