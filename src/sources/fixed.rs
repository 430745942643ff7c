use super::Source;
use crate::sample::{FailurePolicy, MetricSample, SourceKind};
use async_trait::async_trait;

/// 每次都返回同一个采样结果的数据源，用于基准测试和聚合逻辑的测试
#[derive(Debug, Clone)]
pub struct FixedSource {
    kind: SourceKind,
    policy: FailurePolicy,
    sample: MetricSample,
}

impl FixedSource {
    #[inline]
    pub fn new(kind: SourceKind, sample: MetricSample) -> Self {
        Self {
            kind,
            policy: FailurePolicy::Skip,
            sample,
        }
    }

    #[inline]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl Source for FixedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    async fn sample(&mut self) -> MetricSample {
        self.sample.clone()
    }
}
