use crate::sample::{Reading, SourceKind};
use crate::stats::LoadAverage;

/// 曲目片段的最大字符数，其余片段长度天然有界
pub const MEDIA_MAX_CHARS: usize = 64;

/// 百分比取整显示，不带小数
#[inline]
pub fn percent(value: f64) -> String {
    // 先取整再转整数，避免出现 "-0"
    format!("{}", value.round() as i64)
}

/// 平均负载三元组，各保留两位小数
#[inline]
pub fn load_average(load: &LoadAverage) -> String {
    format!("load: {:.2} {:.2} {:.2}", load.one, load.five, load.fifteen)
}

/// 按字符截断，超长时以省略号结尾
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut result: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    result.push('…');
    result
}

/// 把一个数据源的读数转换为状态栏片段
///
/// 种类与读数不匹配或文本为空时返回 `None`，调用方直接跳过。
pub fn fragment(kind: SourceKind, reading: &Reading) -> Option<String> {
    match (kind, reading) {
        (SourceKind::Memory, Reading::Percent(value)) => Some(format!("ram: {}%", percent(*value))),
        (SourceKind::Cpu, Reading::Percent(value)) => Some(format!("cpu: {}%", percent(*value))),
        (SourceKind::Swap, Reading::Percent(value)) => Some(format!("swap: {}%", percent(*value))),
        (SourceKind::Battery, Reading::Percent(value)) => Some(format!("bat: {}%", percent(*value))),
        (SourceKind::Cpu, Reading::Load(load)) => Some(load_average(load)),
        (SourceKind::Media, Reading::Text(text)) => {
            let text = text.trim();
            (!text.is_empty()).then(|| truncate(text, MEDIA_MAX_CHARS))
        }
        (SourceKind::Clock, Reading::Text(text)) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        _ => None,
    }
}
