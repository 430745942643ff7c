//! 状态行聚合
//!
//! 每次刷新按固定顺序采样全部数据源，只保留有值的片段，最后一次性拼接成
//! `[片段 • 片段 • ...]`。

use crate::format;
use crate::sample::{FailurePolicy, MetricSample, SourceKind};
use crate::sources::BoxedSource;
use log::{debug, error};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// 片段之间的分隔符
pub const SEPARATOR: &str = " • ";
pub const OPEN_DELIMITER: char = '[';
pub const CLOSE_DELIMITER: char = ']';

/// 致命策略的数据源采样失败，进程无法继续
#[derive(Debug, Error)]
#[error("数据源 {kind} 发生致命错误: {reason}")]
pub struct FatalSourceError {
    pub kind: SourceKind,
    pub reason: String,
}

/// 渲染为一个片段的一组数据源
///
/// 组内成员有值的部分用分隔符连接；全部缺席时整组不出现。
pub struct SourceGroup {
    sources: Vec<BoxedSource>,
}

impl SourceGroup {
    #[inline]
    pub fn new(sources: Vec<BoxedSource>) -> Self {
        Self { sources }
    }

    #[inline]
    pub fn single(source: BoxedSource) -> Self {
        Self::new(vec![source])
    }

    #[inline]
    pub fn kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|source| source.kind()).collect()
    }
}

/// 固定顺序的数据源列表，进程生命周期内不变
pub struct SourceRegistry {
    groups: Vec<SourceGroup>,
}

impl SourceRegistry {
    #[inline]
    pub fn new(groups: Vec<SourceGroup>) -> Self {
        Self { groups }
    }

    #[inline]
    pub fn groups(&self) -> &[SourceGroup] {
        &self.groups
    }

    pub fn source_count(&self) -> usize {
        self.groups.iter().map(|group| group.sources.len()).sum()
    }
}

/// 一次刷新得到的有序片段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    fragments: Vec<String>,
}

impl StatusLine {
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fragments: Vec::with_capacity(capacity),
        }
    }

    /// 追加片段，空片段被忽略以免出现多余的分隔符
    #[inline]
    pub fn push(&mut self, fragment: String) {
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
    }

    #[inline]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn render(&self) -> String {
        let inner_len: usize = self.fragments.iter().map(String::len).sum::<usize>()
            + SEPARATOR.len() * self.fragments.len().saturating_sub(1);

        let mut rendered = String::with_capacity(
            inner_len + OPEN_DELIMITER.len_utf8() + CLOSE_DELIMITER.len_utf8(),
        );
        rendered.push(OPEN_DELIMITER);
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 {
                rendered.push_str(SEPARATOR);
            }
            rendered.push_str(fragment);
        }
        rendered.push(CLOSE_DELIMITER);
        rendered
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// 对单个数据源采样，超时视为失败
async fn sample_bounded(source: &mut BoxedSource, limit: Duration) -> MetricSample {
    match timeout(limit, source.sample()).await {
        Ok(sample) => sample,
        Err(_) => MetricSample::failed(format!("采样超时（{} ms）", limit.as_millis())),
    }
}

/// 状态行聚合器
pub struct Aggregator {
    registry: SourceRegistry,
    source_timeout: Duration,
}

impl Aggregator {
    #[inline]
    pub fn new(registry: SourceRegistry, source_timeout: Duration) -> Self {
        Self {
            registry,
            source_timeout,
        }
    }

    #[inline]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// 执行一轮采样并组装状态行
    ///
    /// 缺席或失败的数据源被静默跳过；只有致命策略的数据源失败时返回错误。
    pub async fn collect(&mut self) -> Result<StatusLine, FatalSourceError> {
        let limit = self.source_timeout;
        let mut line = StatusLine::with_capacity(self.registry.groups.len());

        for group in &mut self.registry.groups {
            let mut parts = Vec::with_capacity(group.sources.len());

            for source in &mut group.sources {
                let kind = source.kind();
                match sample_bounded(source, limit).await {
                    MetricSample::Present(reading) => match format::fragment(kind, &reading) {
                        Some(fragment) => parts.push(fragment),
                        None => debug!("{kind} 的读数 {reading:?} 无法显示，本轮跳过"),
                    },
                    MetricSample::Absent => debug!("{kind} 本轮无数据"),
                    MetricSample::Failed(reason) => match source.failure_policy() {
                        FailurePolicy::Skip => debug!("{kind} 采样失败，本轮跳过: {reason}"),
                        FailurePolicy::Fatal => {
                            error!("{kind} 采样失败: {reason}");
                            return Err(FatalSourceError { kind, reason });
                        }
                    },
                }
            }

            if !parts.is_empty() {
                line.push(parts.join(SEPARATOR));
            }
        }

        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Reading;
    use crate::sources::{FixedSource, Source};
    use async_trait::async_trait;

    fn fixed(kind: SourceKind, sample: MetricSample) -> BoxedSource {
        Box::new(FixedSource::new(kind, sample))
    }

    fn fatal(kind: SourceKind, sample: MetricSample) -> BoxedSource {
        Box::new(FixedSource::new(kind, sample).with_policy(FailurePolicy::Fatal))
    }

    /// 按标准顺序组装注册表
    fn registry(
        media: MetricSample,
        memory: MetricSample,
        cpu: MetricSample,
        swap: MetricSample,
        battery: MetricSample,
        clock: MetricSample,
    ) -> SourceRegistry {
        SourceRegistry::new(vec![
            SourceGroup::single(fixed(SourceKind::Media, media)),
            SourceGroup::new(vec![
                fatal(SourceKind::Memory, memory),
                fixed(SourceKind::Cpu, cpu),
            ]),
            SourceGroup::single(fixed(SourceKind::Swap, swap)),
            SourceGroup::single(fixed(SourceKind::Battery, battery)),
            SourceGroup::single(fatal(SourceKind::Clock, clock)),
        ])
    }

    async fn collect(registry: SourceRegistry) -> Result<String, FatalSourceError> {
        let mut aggregator = Aggregator::new(registry, Duration::from_millis(200));
        aggregator.collect().await.map(|line| line.render())
    }

    fn assert_well_formed(line: &str) {
        assert!(line.starts_with('['), "{line}");
        assert!(line.ends_with(']'), "{line}");
        let inner = &line[1..line.len() - 1];
        assert!(!inner.starts_with(SEPARATOR.trim_end()), "{line}");
        assert!(!inner.ends_with(SEPARATOR.trim_start()), "{line}");
        assert!(!inner.contains(" •  • "), "{line}");
        assert!(!inner.contains("• •"), "{line}");
    }

    #[tokio::test]
    async fn test_full_line_in_declaration_order() {
        let line = collect(registry(
            MetricSample::text("A - T"),
            MetricSample::percent(30.0),
            MetricSample::percent(12.0),
            MetricSample::percent(5.4),
            MetricSample::percent(88.0),
            MetricSample::text("16-01-2024 00:30"),
        ))
        .await
        .unwrap();

        assert_eq!(
            line,
            "[A - T • ram: 30% • cpu: 12% • swap: 5% • bat: 88% • 16-01-2024 00:30]"
        );
    }

    #[tokio::test]
    async fn test_minimal_line() {
        let line = collect(registry(
            MetricSample::Absent,
            MetricSample::percent(30.0),
            MetricSample::percent(12.0),
            MetricSample::Absent,
            MetricSample::Absent,
            MetricSample::text("16-01-2024 00:30"),
        ))
        .await
        .unwrap();

        assert_eq!(line, "[ram: 30% • cpu: 12% • 16-01-2024 00:30]");
        assert_well_formed(&line);
    }

    #[tokio::test]
    async fn test_failed_cpu_degrades_pair() {
        let line = collect(registry(
            MetricSample::failed("connection refused"),
            MetricSample::percent(30.0),
            MetricSample::failed("loadavg unreadable"),
            MetricSample::Absent,
            MetricSample::percent(0.0),
            MetricSample::text("16-01-2024 00:30"),
        ))
        .await
        .unwrap();

        assert_eq!(line, "[ram: 30% • bat: 0% • 16-01-2024 00:30]");
        assert_well_formed(&line);
    }

    #[tokio::test]
    async fn test_every_optional_combination_is_well_formed() {
        let options = [
            MetricSample::Absent,
            MetricSample::failed("boom"),
            MetricSample::percent(42.0),
        ];

        for media in &options {
            for cpu in &options {
                for swap in &options {
                    for battery in &options {
                        let media = match media {
                            MetricSample::Present(_) => MetricSample::text("song"),
                            other => other.clone(),
                        };
                        let line = collect(registry(
                            media,
                            MetricSample::percent(30.0),
                            cpu.clone(),
                            swap.clone(),
                            battery.clone(),
                            MetricSample::text("01-01-2024 00:00"),
                        ))
                        .await
                        .unwrap();

                        assert_well_formed(&line);
                        assert_eq!(
                            line.matches("bat: ").count(),
                            usize::from(matches!(battery, MetricSample::Present(_)))
                        );
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_fatal_source_failure_stops_round() {
        let result = collect(registry(
            MetricSample::Absent,
            MetricSample::failed("/proc/meminfo missing"),
            MetricSample::percent(12.0),
            MetricSample::Absent,
            MetricSample::Absent,
            MetricSample::text("16-01-2024 00:30"),
        ))
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.kind, SourceKind::Memory);
        assert_eq!(error.reason, "/proc/meminfo missing");
    }

    #[tokio::test]
    async fn test_mismatched_reading_is_skipped() {
        let line = collect(registry(
            MetricSample::Present(Reading::Percent(3.0)),
            MetricSample::percent(30.0),
            MetricSample::percent(12.0),
            MetricSample::Absent,
            MetricSample::Absent,
            MetricSample::text("16-01-2024 00:30"),
        ))
        .await
        .unwrap();

        assert_eq!(line, "[ram: 30% • cpu: 12% • 16-01-2024 00:30]");
    }

    struct SlowSource;

    #[async_trait]
    impl Source for SlowSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Media
        }

        async fn sample(&mut self) -> MetricSample {
            tokio::time::sleep(Duration::from_secs(5)).await;
            MetricSample::text("too late")
        }
    }

    #[tokio::test]
    async fn test_slow_source_times_out_without_blocking_others() {
        let registry = SourceRegistry::new(vec![
            SourceGroup::single(Box::new(SlowSource)),
            SourceGroup::single(fixed(SourceKind::Clock, MetricSample::text("now"))),
        ]);

        let mut aggregator = Aggregator::new(registry, Duration::from_millis(20));
        let line = aggregator.collect().await.unwrap();
        assert_eq!(line.render(), "[now]");
    }

    #[test]
    fn test_empty_status_line_is_bracketed() {
        let line = StatusLine::default();
        assert_eq!(line.render(), "[]");
    }

    #[test]
    fn test_render_separates_fragments_exactly() {
        let mut line = StatusLine::with_capacity(3);
        line.push("A - T".to_string());
        line.push("ram: 42% • cpu: 23%".to_string());
        line.push("16-01-2024 00:30".to_string());

        let rendered = line.render();
        assert_eq!(rendered, "[A - T • ram: 42% • cpu: 23% • 16-01-2024 00:30]");
        assert_eq!(rendered.len(), rendered.capacity());
    }

    #[test]
    fn test_status_line_ignores_empty_fragments() {
        let mut line = StatusLine::with_capacity(2);
        line.push(String::new());
        line.push("ram: 1%".to_string());
        assert_eq!(line.fragments().len(), 1);
        assert_eq!(line.to_string(), "[ram: 1%]");
    }

    #[test]
    fn test_registry_order() {
        let registry = registry(
            MetricSample::Absent,
            MetricSample::Absent,
            MetricSample::Absent,
            MetricSample::Absent,
            MetricSample::Absent,
            MetricSample::Absent,
        );
        let kinds: Vec<Vec<SourceKind>> = registry.groups().iter().map(SourceGroup::kinds).collect();
        assert_eq!(
            kinds,
            vec![
                vec![SourceKind::Media],
                vec![SourceKind::Memory, SourceKind::Cpu],
                vec![SourceKind::Swap],
                vec![SourceKind::Battery],
                vec![SourceKind::Clock],
            ]
        );
        assert_eq!(registry.source_count(), 6);
    }
}
