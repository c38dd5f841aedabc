use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// コンパイル中のスピナー
///
/// 標準エラーが端末でない場合（CI、テスト）は何も表示しません。
pub struct BuildProgress {
    progress_bar: ProgressBar,
}

impl BuildProgress {
    pub fn new(binary_name: &str) -> Self {
        let pb = if std::io::stderr().is_terminal() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Compiling {}...", binary_name));
        pb.enable_steady_tick(Duration::from_millis(120));

        Self { progress_bar: pb }
    }

    pub fn finish_success(&self) {
        self.progress_bar
            .finish_with_message(format!("{}", "Compilation completed ✓".green()));
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .finish_with_message(format!("{} {}", "Compilation failed:".red(), error));
    }
}
