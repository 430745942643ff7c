use super::Source;
use crate::sample::{FailurePolicy, MetricSample, SourceKind};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt::Write;

/// 日-月-年 时:分
pub const CLOCK_FORMAT: &str = "%d-%m-%Y %H:%M";

/// 固定时区的时钟，与主机配置的时区无关
pub struct ClockSource {
    timezone: Tz,
}

impl ClockSource {
    /// 时区名无法解析时无法启动
    pub fn new(timezone: &str) -> Result<Self> {
        let timezone = timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("无效的时区 {timezone:?}: {e}"))?;
        Ok(Self { timezone })
    }

    #[inline]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// 按固定格式渲染给定时刻
    pub fn render_at(&self, instant: DateTime<Utc>) -> std::result::Result<String, std::fmt::Error> {
        let local = instant.with_timezone(&self.timezone);
        let mut rendered = String::with_capacity(16);
        write!(rendered, "{}", local.format(CLOCK_FORMAT))?;
        Ok(rendered)
    }
}

#[async_trait]
impl Source for ClockSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Clock
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Fatal
    }

    async fn sample(&mut self) -> MetricSample {
        match self.render_at(Utc::now()) {
            Ok(rendered) => MetricSample::text(rendered),
            Err(_) => MetricSample::failed(format!("无法按 {CLOCK_FORMAT} 格式化时间")),
        }
    }
}
