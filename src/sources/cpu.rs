use super::Source;
use crate::format;
use crate::sample::{MetricSample, SourceKind};
use crate::stats;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// 由 1 分钟平均负载推算的单核占用百分比，取值 0-99
///
/// 负载超过核心数时按 100 取模回绕。
#[inline]
pub fn load_percent(load_one: f64, core_count: usize) -> f64 {
    (load_one / core_count as f64 * 100.0).floor().rem_euclid(100.0)
}

/// CPU 负载数据源
pub struct CpuSource {
    loadavg_path: PathBuf,
    core_count: usize,
}

impl CpuSource {
    /// 读取一次核心数；运行期间核心数不会变化
    pub async fn new(cpuinfo_path: &Path, loadavg_path: &Path) -> Result<Self> {
        let core_count = stats::read_core_count(cpuinfo_path)
            .await
            .with_context(|| format!("无法确定 CPU 核心数: {}", cpuinfo_path.display()))?;
        info!("检测到 {core_count} 个 CPU 核心");
        Ok(Self::with_core_count(loadavg_path, core_count))
    }

    #[inline]
    pub fn with_core_count(loadavg_path: &Path, core_count: usize) -> Self {
        Self {
            loadavg_path: loadavg_path.to_path_buf(),
            core_count: core_count.max(1),
        }
    }

    #[inline]
    pub fn core_count(&self) -> usize {
        self.core_count
    }
}

#[async_trait]
impl Source for CpuSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Cpu
    }

    async fn sample(&mut self) -> MetricSample {
        match stats::read_loadavg(&self.loadavg_path).await {
            Ok(load) => {
                debug!("{}", format::load_average(&load));
                MetricSample::percent(load_percent(load.one, self.core_count))
            }
            Err(e) => MetricSample::failed(e),
        }
    }
}
