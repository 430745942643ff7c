//! 状态栏数据源
//!
//! 每个数据源独立采样、独立失败：所有错误都通过 [`MetricSample`] 返回，不会越过接口边界。

pub mod battery;
pub mod clock;
pub mod cpu;
pub mod fixed;
pub mod media;
pub mod memory;
pub mod swap;

use crate::config::Config;
use crate::sample::{FailurePolicy, MetricSample, SourceKind};
use crate::status::{SourceGroup, SourceRegistry};
use anyhow::Result;
use async_trait::async_trait;
use log::info;

pub use battery::BatterySource;
pub use clock::ClockSource;
pub use cpu::CpuSource;
pub use fixed::FixedSource;
pub use media::MediaSource;
pub use memory::MemorySource;
pub use swap::SwapSource;

/// 所有数据源的公共接口
#[async_trait]
pub trait Source: Send {
    fn kind(&self) -> SourceKind;

    /// 采样失败时聚合器的处理方式，默认跳过
    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Skip
    }

    /// 采样一次，每次刷新调用一次
    async fn sample(&mut self) -> MetricSample;
}

pub type BoxedSource = Box<dyn Source>;

/// 按固定顺序创建全部数据源：曲目、内存与 CPU、交换分区、电池、时间
///
/// CPU 核心数与时区在这里确定，失败即无法启动。
pub async fn create_registry(config: &Config) -> Result<SourceRegistry> {
    let cpu = CpuSource::new(&config.cpuinfo_path, &config.loadavg_path).await?;
    let clock = ClockSource::new(&config.timezone)?;

    let registry = SourceRegistry::new(vec![
        SourceGroup::single(Box::new(MediaSource::new(config.mpd.clone()))),
        SourceGroup::new(vec![
            Box::new(MemorySource::new(&config.meminfo_path)),
            Box::new(cpu),
        ]),
        SourceGroup::single(Box::new(SwapSource::new(&config.meminfo_path))),
        SourceGroup::single(Box::new(BatterySource::new(&config.battery_path))),
        SourceGroup::single(Box::new(clock)),
    ]);

    info!("已初始化 {} 个数据源", registry.source_count());
    Ok(registry)
}
