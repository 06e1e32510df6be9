//! 优雅退出：监听 SIGINT / SIGTERM（Windows 为 Ctrl+C），通知 HTTP 服务停止接收新请求，
//! 并在超时内完成资源清理（关闭组件实例 SQLite 连接池）。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info};

/// 退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
    /// 应用请求退出
    Application,
}

#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("信号设置失败: {0}")]
    SignalSetup(String),

    #[error("优雅退出超时")]
    Timeout,
}

#[derive(Debug)]
struct ShutdownInner {
    notify: Notify,
    reason: std::sync::Mutex<Option<ShutdownReason>>,
    shutting_down: AtomicBool,
}

/// 优雅退出管理器
#[derive(Debug, Clone)]
pub struct ShutdownManager {
    inner: Arc<ShutdownInner>,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ShutdownInner {
                notify: Notify::new(),
                reason: std::sync::Mutex::new(None),
                shutting_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::SeqCst)
    }

    /// 触发退出；只有第一次生效
    pub fn trigger_shutdown(&self, reason: ShutdownReason) {
        if self
            .inner
            .shutting_down
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("重复的退出信号被忽略: {:?}", reason);
            return;
        }
        info!("触发优雅退出: {:?}", reason);
        if let Ok(mut guard) = self.inner.reason.lock() {
            *guard = Some(reason);
        }
        self.inner.notify.notify_waiters();
    }

    fn last_reason(&self) -> ShutdownReason {
        self.inner
            .reason
            .lock()
            .ok()
            .and_then(|g| *g)
            .unwrap_or(ShutdownReason::Application)
    }

    /// 等待退出信号（已触发时立即返回）
    pub async fn wait_for_shutdown(&self) -> ShutdownReason {
        let notified = self.inner.notify.notified();
        if self.is_shutting_down() {
            return self.last_reason();
        }
        notified.await;
        self.last_reason()
    }

    /// 在超时内执行清理
    pub async fn cleanup_with_timeout<F, T>(cleanup: F, limit: Duration) -> Result<T, ShutdownError>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::time::timeout(limit, cleanup)
            .await
            .map_err(|_| ShutdownError::Timeout)
    }

    /// 启动信号监听任务
    pub fn start_signal_handler(&self) -> Result<(), ShutdownError> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigint = signal(SignalKind::interrupt())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;
            let mut sigterm = signal(SignalKind::terminate())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;
            let manager = self.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("接收到SIGINT信号 (Ctrl+C)");
                        manager.trigger_shutdown(ShutdownReason::Interrupt);
                    }
                    _ = sigterm.recv() => {
                        info!("接收到SIGTERM信号");
                        manager.trigger_shutdown(ShutdownReason::Terminate);
                    }
                }
            });
        }

        #[cfg(not(unix))]
        {
            let manager = self.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("监听Ctrl+C信号失败: {}", e);
                    return;
                }
                info!("接收到Ctrl+C信号");
                manager.trigger_shutdown(ShutdownReason::Interrupt);
            });
        }

        Ok(())
    }
}
