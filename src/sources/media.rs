use super::Source;
use crate::config::MpdConfig;
use crate::mpd::{MpdClient, NowPlaying, Song};
use crate::sample::{MetricSample, SourceKind};
use async_trait::async_trait;
use std::path::Path;

/// 暂停时显示的固定文本
pub const PAUSED_LABEL: &str = "paused";

fn tag(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// 曲目显示名：艺术家 - 标题 > 标题 > 名称 > 去掉扩展名的文件名
pub fn track_label(song: &Song) -> Option<String> {
    match (tag(&song.artist), tag(&song.title)) {
        (Some(artist), Some(title)) => return Some(format!("{artist} - {title}")),
        (None, Some(title)) => return Some(title.to_string()),
        _ => {}
    }

    if let Some(name) = tag(&song.name) {
        return Some(name.to_string());
    }

    tag(&song.file)
        .and_then(|file| Path::new(file).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// 正在播放的曲目
pub struct MediaSource {
    client: MpdClient,
}

impl MediaSource {
    #[inline]
    pub fn new(config: MpdConfig) -> Self {
        Self {
            client: MpdClient::new(config),
        }
    }
}

#[async_trait]
impl Source for MediaSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Media
    }

    async fn sample(&mut self) -> MetricSample {
        match self.client.now_playing().await {
            Ok(NowPlaying::Stopped) => MetricSample::Absent,
            Ok(NowPlaying::Paused) => MetricSample::text(PAUSED_LABEL),
            Ok(NowPlaying::Playing(song)) => match track_label(&song) {
                Some(label) => MetricSample::text(label),
                None => MetricSample::Absent,
            },
            Err(e) => MetricSample::failed(e),
        }
    }
}
