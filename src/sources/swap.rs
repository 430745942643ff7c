use super::Source;
use crate::sample::{MetricSample, SourceKind};
use crate::stats;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 低于该使用率时不显示交换分区
pub const SWAP_DISPLAY_THRESHOLD: f64 = 1.0;

/// 交换分区占用数据源
pub struct SwapSource {
    meminfo_path: PathBuf,
}

impl SwapSource {
    #[inline]
    pub fn new(meminfo_path: &Path) -> Self {
        Self {
            meminfo_path: meminfo_path.to_path_buf(),
        }
    }
}

#[async_trait]
impl Source for SwapSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Swap
    }

    async fn sample(&mut self) -> MetricSample {
        let info = match stats::read_meminfo(&self.meminfo_path).await {
            Ok(info) => info,
            Err(e) => return MetricSample::failed(e),
        };

        match info.swap_used_percent() {
            Some(percent) if percent >= SWAP_DISPLAY_THRESHOLD => MetricSample::percent(percent),
            _ => MetricSample::Absent,
        }
    }
}
