//! 失敗時の後始末（ロールバック）
//!
//! アップロードに成功したオブジェクトごとに削除アクションを登録しておき、
//! ワークフローが失敗した場合にまとめて並行実行します。

use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use stratus_cloud::ObjectStore;
use tokio::task::JoinSet;
use tracing::Instrument;

/// 一つのロールバック処理
pub struct RollbackAction {
    pub description: String,
    task: BoxFuture<'static, stratus_cloud::Result<()>>,
}

impl RollbackAction {
    pub fn new(
        description: impl Into<String>,
        task: BoxFuture<'static, stratus_cloud::Result<()>>,
    ) -> Self {
        Self {
            description: description.into(),
            task,
        }
    }

    /// アップロード済みオブジェクトの削除
    ///
    /// `noop` の場合は削除せずログのみ出力します。
    pub fn delete_object(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        key: impl Into<String>,
        noop: bool,
    ) -> Self {
        let bucket = bucket.into();
        let key = key.into();
        let description = format!("Delete s3://{}/{}", bucket, key);

        Self::new(
            description,
            Box::pin(async move {
                if noop {
                    tracing::info!("Bypassing S3 upload rollback: s3://{}/{}", bucket, key);
                    return Ok(());
                }
                tracing::info!("Deleting S3 object: s3://{}/{}", bucket, key);
                store.delete_object(&bucket, &key).await
            }),
        )
    }
}

impl std::fmt::Debug for RollbackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollbackAction")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// 登録済みロールバック処理の一覧
#[derive(Debug, Default)]
pub struct RollbackRegistry {
    actions: Vec<RollbackAction>,
}

/// ロールバックの実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    pub succeeded: usize,
    pub failed: usize,
    /// タイムアウトで打ち切られた件数
    pub abandoned: usize,
}

impl RollbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: RollbackAction) {
        tracing::debug!("Registered rollback: {}", action.description);
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// 全アクションを並行実行し、完了（または `timeout`）まで待つ
    ///
    /// 個々の失敗は警告ログのみで、呼び出し元の失敗理由は変わりません。
    pub async fn run(self, timeout: Duration) -> RollbackReport {
        let total = self.actions.len();
        let mut report = RollbackReport::default();
        if total == 0 {
            return report;
        }
        tracing::info!("Invoking {} rollback functions", total);

        let mut tasks = JoinSet::new();
        for action in self.actions {
            let description = action.description;
            let task = action.task;
            tasks.spawn(
                async move { (description, task.await) }.instrument(tracing::Span::current()),
            );
        }

        let drain = async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((_, Ok(()))) => report.succeeded += 1,
                    Ok((description, Err(e))) => {
                        tracing::warn!("Rollback function failed ({}): {}", description, e);
                        report.failed += 1;
                    }
                    Err(e) => {
                        tracing::warn!("Rollback task panicked: {}", e);
                        report.failed += 1;
                    }
                }
            }
        };

        if tokio::time::timeout(timeout, drain).await.is_err() {
            report.abandoned = total - report.succeeded - report.failed;
            tracing::warn!(
                "Rollback timed out after {:?}: {} functions did not complete",
                timeout,
                report.abandoned
            );
        }

        report
    }
}
