//! 状态行输出端

use anyhow::{Context, Result, anyhow};
use log::info;
use std::io::{self, Write};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, PropMode, Window};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

/// 接收每次刷新得到的状态行
pub trait Sink {
    fn publish(&mut self, status: &str) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    #[inline]
    fn publish(&mut self, status: &str) -> Result<()> {
        (**self).publish(status)
    }
}

/// 把状态行写入 X 根窗口的 WM_NAME，dwm 以此作为状态栏文本
///
/// 连接在启动时打开一次，之后每次发布复用。
pub struct RootWindowSink {
    connection: RustConnection,
    root: Window,
}

impl RootWindowSink {
    /// 连接 `$DISPLAY` 指定的显示服务
    pub fn connect() -> Result<Self> {
        let (connection, screen_num) = x11rb::connect(None).context("无法打开 X 显示连接")?;
        let root = connection
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| anyhow!("X 显示中不存在屏幕 {screen_num}"))?;

        info!("已连接 X 显示，屏幕 {screen_num}，根窗口 0x{root:x}");
        Ok(Self { connection, root })
    }
}

impl Sink for RootWindowSink {
    fn publish(&mut self, status: &str) -> Result<()> {
        // 与 XStoreName 一致：STRING 类型，原样写入 UTF-8 字节
        self.connection
            .change_property8(
                PropMode::REPLACE,
                self.root,
                AtomEnum::WM_NAME,
                AtomEnum::STRING,
                status.as_bytes(),
            )
            .context("无法发送状态栏更新")?
            // 等待服务端确认，相当于一次同步
            .check()
            .context("X 服务端拒绝状态栏更新")?;
        Ok(())
    }
}

/// 每次发布写出一行，适用于管道输出或调试
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    #[inline]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl WriterSink<io::Stdout> {
    #[inline]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn publish(&mut self, status: &str) -> Result<()> {
        writeln!(self.out, "{status}").context("无法写出状态行")?;
        self.out.flush().context("无法刷新输出")?;
        Ok(())
    }
}
