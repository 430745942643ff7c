use std::path::Path;
use thiserror::Error;

/// 主机遥测文件读取错误类型
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),
    #[error("解析错误: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// 内存与交换分区计数（单位 kB，与 /proc/meminfo 一致）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub buffers: u64,
    pub cached: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl MemoryInfo {
    /// 内存使用率 = (总量 - 空闲 - 缓冲 - 缓存) / 总量，限制在 [0, 100]
    pub fn used_percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }

        // 读取过程中计数可能短暂不一致，饱和减法避免下溢
        let used = self
            .total
            .saturating_sub(self.free)
            .saturating_sub(self.buffers)
            .saturating_sub(self.cached);

        Some((used as f64 / self.total as f64 * 100.0).clamp(0.0, 100.0))
    }

    /// 交换分区使用率；没有交换分区时返回 None
    pub fn swap_used_percent(&self) -> Option<f64> {
        if self.swap_total == 0 {
            return None;
        }

        let used = self.swap_total.saturating_sub(self.swap_free);
        Some((used as f64 / self.swap_total as f64 * 100.0).clamp(0.0, 100.0))
    }
}

/// 解析 /proc/meminfo 内容
pub fn parse_meminfo(content: &str) -> Result<MemoryInfo> {
    let mut info = MemoryInfo::default();
    let mut has_total = false;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(raw)) = (parts.next(), parts.next()) else {
            continue;
        };

        let slot = match key {
            "MemTotal:" => {
                has_total = true;
                &mut info.total
            }
            "MemFree:" => &mut info.free,
            "Buffers:" => &mut info.buffers,
            "Cached:" => &mut info.cached,
            "SwapTotal:" => &mut info.swap_total,
            "SwapFree:" => &mut info.swap_free,
            _ => continue,
        };

        // 只校验用到的字段，其余字段的格式与本程序无关
        *slot = raw
            .parse::<u64>()
            .map_err(|e| StatsError::ParseError(format!("无法解析 {key} 的值 {raw:?}: {e}")))?;
    }

    if !has_total {
        return Err(StatsError::ParseError(
            "/proc/meminfo 缺少 MemTotal 字段".to_string(),
        ));
    }

    Ok(info)
}

/// 读取并解析内存信息
pub async fn read_meminfo(path: &Path) -> Result<MemoryInfo> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_meminfo(&content)
}

/// 1、5、15 分钟平均负载
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// 解析 /proc/loadavg 的前三个字段
pub fn parse_loadavg(content: &str) -> Result<LoadAverage> {
    let mut fields = content.split_whitespace().map(|field| {
        field
            .parse::<f64>()
            .map_err(|e| StatsError::ParseError(format!("无法解析负载值 {field:?}: {e}")))
    });

    let mut next = || {
        fields
            .next()
            .unwrap_or_else(|| Err(StatsError::ParseError("/proc/loadavg 字段不足".to_string())))
    };

    Ok(LoadAverage {
        one: next()?,
        five: next()?,
        fifteen: next()?,
    })
}

/// 读取平均负载
pub async fn read_loadavg(path: &Path) -> Result<LoadAverage> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_loadavg(&content)
}

/// 统计 /proc/cpuinfo 中 processor 条目的数量
#[inline]
pub fn parse_core_count(content: &str) -> usize {
    content
        .lines()
        .filter(|line| line.starts_with("processor"))
        .count()
}

/// 读取 CPU 核心数，核心数为 0 视为错误
pub async fn read_core_count(path: &Path) -> Result<usize> {
    let content = tokio::fs::read_to_string(path).await?;
    match parse_core_count(&content) {
        0 => Err(StatsError::ParseError(format!(
            "{} 中没有 processor 条目",
            path.display()
        ))),
        count => Ok(count),
    }
}

/// 电池设计容量与剩余容量（单位由硬件决定，只用于求比值）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryCapacity {
    pub design: u64,
    pub remaining: u64,
}

impl BatteryCapacity {
    /// 剩余电量百分比；设计容量为 0 时无意义
    pub fn percent(&self) -> Option<f64> {
        if self.design == 0 {
            return None;
        }
        Some(self.remaining as f64 / self.design as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryReading {
    /// 硬件报告电池未安装
    NotPresent,
    Capacity(BatteryCapacity),
}

/// 解析旧式 ACPI 电池文件（info 或 state）中的某个容量字段
///
/// 返回 `Ok(None)` 表示文件声明 `present: no`。
pub fn parse_acpi_field(content: &str, key: &str) -> Result<Option<u64>> {
    for line in content.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name == "present" && value == "no" {
            return Ok(None);
        }

        if name == key {
            let number = value.split_whitespace().next().unwrap_or("");
            return number.parse::<u64>().map(Some).map_err(|e| {
                StatsError::ParseError(format!("无法解析 {key} 的值 {number:?}: {e}"))
            });
        }
    }

    Err(StatsError::ParseError(format!("缺少字段 {key}")))
}

/// 读取电池容量，自动识别 ACPI procfs 与 sysfs power_supply 两种目录布局
pub async fn read_battery(base: &Path) -> Result<BatteryReading> {
    if tokio::fs::try_exists(base.join("info")).await? {
        read_acpi_battery(base).await
    } else {
        read_sysfs_battery(base).await
    }
}

async fn read_acpi_battery(base: &Path) -> Result<BatteryReading> {
    let info = tokio::fs::read_to_string(base.join("info")).await?;
    let Some(design) = parse_acpi_field(&info, "design capacity")? else {
        return Ok(BatteryReading::NotPresent);
    };

    let state = tokio::fs::read_to_string(base.join("state")).await?;
    let Some(remaining) = parse_acpi_field(&state, "remaining capacity")? else {
        return Ok(BatteryReading::NotPresent);
    };

    Ok(BatteryReading::Capacity(BatteryCapacity { design, remaining }))
}

async fn read_sysfs_battery(base: &Path) -> Result<BatteryReading> {
    // present 文件可选，缺失时按已安装处理
    if let Ok(present) = tokio::fs::read_to_string(base.join("present")).await {
        if present.trim() == "0" {
            return Ok(BatteryReading::NotPresent);
        }
    }

    let capacity = match read_capacity_pair(base, "energy_full_design", "energy_now").await {
        Ok(capacity) => capacity,
        Err(_) => read_capacity_pair(base, "charge_full_design", "charge_now").await?,
    };

    Ok(BatteryReading::Capacity(capacity))
}

async fn read_capacity_pair(base: &Path, design: &str, remaining: &str) -> Result<BatteryCapacity> {
    Ok(BatteryCapacity {
        design: read_u64(&base.join(design)).await?,
        remaining: read_u64(&base.join(remaining)).await?,
    })
}

async fn read_u64(path: &Path) -> Result<u64> {
    let content = tokio::fs::read_to_string(path).await?;
    content
        .trim()
        .parse()
        .map_err(|e| StatsError::ParseError(format!("{}: {e}", path.display())))
}
