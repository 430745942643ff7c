use super::Source;
use crate::sample::{FailurePolicy, MetricSample, SourceKind};
use crate::stats;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 内存占用数据源；目标主机上 /proc/meminfo 总是存在，读取失败视为致命错误
pub struct MemorySource {
    meminfo_path: PathBuf,
}

impl MemorySource {
    #[inline]
    pub fn new(meminfo_path: &Path) -> Self {
        Self {
            meminfo_path: meminfo_path.to_path_buf(),
        }
    }
}

#[async_trait]
impl Source for MemorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Memory
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    async fn sample(&mut self) -> MetricSample {
        match stats::read_meminfo(&self.meminfo_path).await {
            Ok(info) => match info.used_percent() {
                Some(percent) => MetricSample::percent(percent),
                None => MetricSample::failed("MemTotal 为 0"),
            },
            Err(e) => MetricSample::failed(e),
        }
    }
}
