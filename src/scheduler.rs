use crate::sink::Sink;
use crate::status::Aggregator;
use anyhow::Result;
use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// 刷新循环的状态：空闲 → 采样 → 发布 → 空闲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    Idle,
    Sampling,
    Publishing,
}

/// 采样-格式化-发布循环，任一时刻最多只有一轮刷新在进行
pub struct Scheduler<S: Sink> {
    aggregator: Aggregator,
    sink: S,
    interval: Duration,
    state: TickState,
    ticks: u64,
}

impl<S: Sink> Scheduler<S> {
    #[inline]
    pub fn new(aggregator: Aggregator, sink: S, interval: Duration) -> Self {
        Self {
            aggregator,
            sink,
            interval,
            state: TickState::Idle,
            ticks: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> TickState {
        self.state
    }

    /// 已完成的刷新次数
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 执行一轮完整刷新，返回发布的状态行
    pub async fn tick(&mut self) -> Result<String> {
        self.state = TickState::Sampling;
        let line = match self.aggregator.collect().await {
            Ok(line) => line,
            Err(e) => {
                self.state = TickState::Idle;
                return Err(e.into());
            }
        };

        self.state = TickState::Publishing;
        let rendered = line.render();
        let published = self.sink.publish(&rendered);
        self.state = TickState::Idle;
        published?;

        self.ticks += 1;
        Ok(rendered)
    }

    /// 一直刷新，直到进程收到 SIGINT 或 SIGTERM
    pub async fn run(&mut self) -> Result<()> {
        // 第一轮刷新之前注册信号
        let shutdown = shutdown_signal();
        self.run_until(shutdown).await
    }

    /// 一直刷新，直到 `shutdown` 完成
    ///
    /// 终止请求只在两轮之间的休眠中生效，进行中的刷新不会被打断。
    /// 休眠从发布结束时开始计时，不与整秒对齐。
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) -> Result<()> {
        tokio::pin!(shutdown);

        loop {
            let line = self.tick().await?;
            debug!("状态栏已更新: {line}");

            tokio::select! {
                _ = &mut shutdown => {
                    info!("收到终止请求，共刷新 {} 次", self.ticks);
                    return Ok(());
                }
                _ = sleep(self.interval) => {}
            }
        }
    }
}

/// 返回在收到 SIGINT 或 SIGTERM 时完成的 future
///
/// 信号处理在调用时立即注册，此后到达的信号不会因为 future 尚未被轮询而丢失。
#[cfg(unix)]
pub fn shutdown_signal() -> impl Future<Output = ()> {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    fn listen(kind: SignalKind, name: &str) -> Option<Signal> {
        signal(kind)
            .map_err(|e| warn!("无法监听 {name}: {e}"))
            .ok()
    }

    async fn recv(signal: Option<Signal>) {
        match signal {
            Some(mut signal) => {
                signal.recv().await;
            }
            None => std::future::pending().await,
        }
    }

    let interrupt = listen(SignalKind::interrupt(), "SIGINT");
    let terminate = listen(SignalKind::terminate(), "SIGTERM");

    async move {
        tokio::select! {
            _ = recv(interrupt) => debug!("收到 SIGINT"),
            _ = recv(terminate) => debug!("收到 SIGTERM"),
        }
    }
}

#[cfg(not(unix))]
pub fn shutdown_signal() -> impl Future<Output = ()> {
    async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("无法监听 Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}
