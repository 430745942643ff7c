use super::Source;
use crate::sample::{MetricSample, SourceKind};
use crate::stats::{self, BatteryReading};
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};

/// 电池电量数据源；没有电池是常态，任何读取问题都只会让它缺席
pub struct BatterySource {
    base: PathBuf,
}

impl BatterySource {
    #[inline]
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
        }
    }
}

#[async_trait]
impl Source for BatterySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Battery
    }

    async fn sample(&mut self) -> MetricSample {
        match stats::read_battery(&self.base).await {
            Ok(BatteryReading::Capacity(capacity)) => match capacity.percent() {
                Some(percent) => MetricSample::percent(percent),
                None => MetricSample::Absent,
            },
            Ok(BatteryReading::NotPresent) => MetricSample::Absent,
            Err(e) => {
                debug!("无法读取电池 {}: {e}", self.base.display());
                MetricSample::Absent
            }
        }
    }
}
