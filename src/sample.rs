use crate::stats::LoadAverage;
use std::fmt;

/// 数据源一次采样得到的原始值
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// 百分比，尚未取整
    Percent(f64),
    Load(LoadAverage),
    Text(String),
}

/// 单个数据源在一次刷新中的结果
///
/// `Absent` 表示数据源本轮合理地没有内容（没有电池、没有播放、交换分区未使用），
/// `Failed` 表示读取出错。两者都不会出现在状态栏上。
#[derive(Debug, Clone, PartialEq)]
pub enum MetricSample {
    Present(Reading),
    Absent,
    Failed(String),
}

impl MetricSample {
    #[inline]
    pub fn percent(value: f64) -> Self {
        MetricSample::Present(Reading::Percent(value))
    }

    #[inline]
    pub fn text(value: impl Into<String>) -> Self {
        MetricSample::Present(Reading::Text(value.into()))
    }

    #[inline]
    pub fn failed(reason: impl fmt::Display) -> Self {
        MetricSample::Failed(reason.to_string())
    }
}

/// 数据源种类，决定片段的标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Media,
    Memory,
    Cpu,
    Swap,
    Battery,
    Clock,
}

impl SourceKind {
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Media => "media",
            SourceKind::Memory => "memory",
            SourceKind::Cpu => "cpu",
            SourceKind::Swap => "swap",
            SourceKind::Battery => "battery",
            SourceKind::Clock => "clock",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 数据源报告 `Failed` 时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// 本轮跳过，下一轮自动重试
    #[default]
    Skip,
    /// 终止进程
    Fatal,
}
