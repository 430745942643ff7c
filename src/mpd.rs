//! 音乐播放守护进程（MPD）文本协议的最小客户端
//!
//! 只实现状态栏需要的 `status` 与 `currentsong` 两条命令。连接在两次刷新之间保持，
//! 出错后丢弃，下一次查询时重新建立。

use crate::config::MpdConfig;
use log::debug;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum MpdError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("连接或读取超时")]
    Timeout,
    #[error("协议错误: {0}")]
    Protocol(String),
    #[error("服务端拒绝命令: {0}")]
    Ack(String),
}

pub type Result<T> = std::result::Result<T, MpdError>;

/// 播放器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Play,
    Pause,
    Stop,
    Unknown,
}

impl PlayerState {
    #[inline]
    pub fn parse(value: &str) -> Self {
        match value {
            "play" => PlayerState::Play,
            "pause" => PlayerState::Pause,
            "stop" => PlayerState::Stop,
            _ => PlayerState::Unknown,
        }
    }
}

/// 当前曲目的标签，只保留每种标签的第一个值
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Song {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    /// 曲目位置（相对音乐库的路径或 URL）
    pub file: Option<String>,
}

impl Song {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut song = Song::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "Artist" => &mut song.artist,
                "Title" => &mut song.title,
                "Name" => &mut song.name,
                "file" => &mut song.file,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.clone());
            }
        }
        song
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NowPlaying {
    /// 已停止或状态未知
    Stopped,
    Paused,
    Playing(Song),
}

trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

async fn with_timeout<T>(limit: Duration, future: impl Future<Output = T>) -> Result<T> {
    timeout(limit, future).await.map_err(|_| MpdError::Timeout)
}

struct Connection {
    reader: BufReader<Box<dyn Stream>>,
}

impl Connection {
    async fn open(config: &MpdConfig) -> Result<Self> {
        let stream: Box<dyn Stream> = if config.host.starts_with('/') {
            connect_unix(&config.host, config.timeout).await?
        } else {
            let address = (config.host.as_str(), config.port);
            Box::new(with_timeout(config.timeout, TcpStream::connect(address)).await??)
        };

        let mut connection = Self {
            reader: BufReader::new(stream),
        };

        let greeting = connection.read_line(config.timeout).await?;
        match greeting.strip_prefix("OK MPD ") {
            Some(version) => debug!("已连接 MPD {}:{}，协议版本 {version}", config.host, config.port),
            None => return Err(MpdError::Protocol(format!("意外的问候语: {greeting:?}"))),
        }

        Ok(connection)
    }

    async fn read_line(&mut self, limit: Duration) -> Result<String> {
        let mut line = String::new();
        let read = with_timeout(limit, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            return Err(MpdError::Protocol("连接已被服务端关闭".to_string()));
        }
        Ok(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
    }

    /// 发送一条命令并收集 `key: value` 响应，直到 `OK`
    async fn command(&mut self, command: &str, limit: Duration) -> Result<Vec<(String, String)>> {
        let request = format!("{command}\n");
        with_timeout(limit, self.reader.get_mut().write_all(request.as_bytes())).await??;

        let mut pairs = Vec::new();
        loop {
            let line = self.read_line(limit).await?;
            if line == "OK" {
                return Ok(pairs);
            }
            if let Some(reason) = line.strip_prefix("ACK ") {
                return Err(MpdError::Ack(reason.to_string()));
            }
            match line.split_once(": ") {
                Some((key, value)) => pairs.push((key.to_string(), value.to_string())),
                None => return Err(MpdError::Protocol(format!("无法解析的响应行: {line:?}"))),
            }
        }
    }
}

#[cfg(unix)]
async fn connect_unix(path: &str, limit: Duration) -> Result<Box<dyn Stream>> {
    let stream = with_timeout(limit, tokio::net::UnixStream::connect(path)).await??;
    Ok(Box::new(stream))
}

#[cfg(not(unix))]
async fn connect_unix(path: &str, _limit: Duration) -> Result<Box<dyn Stream>> {
    Err(MpdError::Protocol(format!("当前平台不支持 Unix 套接字: {path}")))
}

/// 持有一条私有连接的 MPD 客户端
pub struct MpdClient {
    config: MpdConfig,
    connection: Option<Connection>,
}

impl MpdClient {
    #[inline]
    pub fn new(config: MpdConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// 查询播放状态；复用的连接失效时在本次查询内重连一次
    pub async fn now_playing(&mut self) -> Result<NowPlaying> {
        let reused = self.connection.is_some();
        match self.query().await {
            Err(e) if reused => {
                debug!("复用的 MPD 连接失效（{e}），重新连接");
                self.query().await
            }
            result => result,
        }
    }

    /// 查询期间连接只存在于局部变量中，只有完整收到响应后才放回；
    /// 查询被取消时连接随之关闭，不会留下未读的响应
    async fn query(&mut self) -> Result<NowPlaying> {
        let mut connection = match self.connection.take() {
            Some(connection) => connection,
            None => Connection::open(&self.config).await?,
        };

        let result = Self::query_state(&mut connection, self.config.timeout).await;
        if result.is_ok() {
            self.connection = Some(connection);
        }
        result
    }

    async fn query_state(connection: &mut Connection, limit: Duration) -> Result<NowPlaying> {
        let status = connection.command("status", limit).await?;
        let state = status
            .iter()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| PlayerState::parse(value))
            .unwrap_or(PlayerState::Unknown);

        match state {
            PlayerState::Stop | PlayerState::Unknown => Ok(NowPlaying::Stopped),
            PlayerState::Pause => Ok(NowPlaying::Paused),
            PlayerState::Play => {
                let pairs = connection.command("currentsong", limit).await?;
                Ok(NowPlaying::Playing(Song::from_pairs(&pairs)))
            }
        }
    }
}
