mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stratus")]
#[command(about = "RustのサービスをAWS Lambdaへ。ビルドからスタックの収束まで。", long_about = None)]
struct Cli {
    /// デバッグログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// サービスをビルドし、CloudFormationスタックを作成・更新
    Provision {
        /// マニフェストファイル（省略時は自動検出）
        #[arg(short = 'f', long = "file")]
        manifest: Option<PathBuf>,
        /// ビルドとテンプレート生成のみ行い、AWSへの変更を行わない
        #[arg(short, long)]
        noop: bool,
        /// アーティファクトをアップロードするS3バケット（マニフェストより優先）
        #[arg(short, long, env = "STRATUS_BUCKET")]
        bucket: Option<String>,
        /// 生成したテンプレートの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// コードバンドルに同梱するNode.jsモジュールのZIP
        #[arg(long)]
        support_bundle: Option<PathBuf>,
        /// AWSリージョン
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,
    },
    /// マニフェストを検証
    Validate {
        /// マニフェストファイル（省略時は自動検出）
        #[arg(short = 'f', long = "file")]
        manifest: Option<PathBuf>,
    },
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Version => {
            println!("stratus {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate { manifest } => {
            commands::validate::handle(manifest)?;
        }
        Commands::Provision {
            manifest,
            noop,
            bucket,
            output,
            support_bundle,
            region,
        } => {
            let args = commands::provision::ProvisionArgs {
                manifest,
                noop,
                bucket,
                output,
                support_bundle,
                region,
            };
            commands::provision::handle(args).await?;
        }
    }

    Ok(())
}
