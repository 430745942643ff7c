//! 极简状态栏库
//!
//! 每秒采样一组固定的本机指标（曲目、内存、CPU、交换分区、电池、时间），
//! 拼接成一行文本并写入窗口管理器的状态栏。

pub mod config;
pub mod format;
pub mod mpd;
pub mod sample;
pub mod scheduler;
pub mod sink;
pub mod sources;
pub mod stats;
pub mod status;

// 重新导出主要的公共类型
pub use config::Config;
pub use sample::{FailurePolicy, MetricSample, Reading, SourceKind};
pub use scheduler::{Scheduler, TickState};
pub use sink::{RootWindowSink, Sink, WriterSink};
pub use sources::{Source, create_registry};
pub use status::{Aggregator, SourceGroup, SourceRegistry, StatusLine};
