use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;
use swb_status_line::config::{
    Config, DEFAULT_BATTERY_PATH, DEFAULT_MPD_HOST, DEFAULT_MPD_PORT, DEFAULT_TIMEZONE, MpdConfig,
};
use swb_status_line::{Aggregator, RootWindowSink, Scheduler, Sink, WriterSink, create_registry};

/// 极简状态栏
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 刷新间隔秒数 (默认: 1)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// 时钟使用的时区 (默认: Europe/Bucharest)
    #[arg(short, long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,

    /// 电池目录，支持 sysfs 与旧式 ACPI 布局
    #[arg(short, long, default_value = DEFAULT_BATTERY_PATH)]
    battery: PathBuf,

    /// MPD 主机名或 Unix 套接字路径
    #[arg(long, env = "MPD_HOST", default_value = DEFAULT_MPD_HOST)]
    mpd_host: String,

    /// MPD 端口
    #[arg(long, env = "MPD_PORT", default_value_t = DEFAULT_MPD_PORT)]
    mpd_port: u16,

    /// MPD 连接与读写超时毫秒数
    #[arg(long, default_value_t = 1000)]
    mpd_timeout_ms: u64,

    /// 单个数据源一次采样的超时毫秒数
    #[arg(long, default_value_t = 2000)]
    source_timeout_ms: u64,

    /// 输出到标准输出而不是 X 根窗口
    #[arg(long)]
    stdout: bool,

    /// 只刷新一次后退出
    #[arg(long)]
    once: bool,

    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn to_config(&self) -> Config {
        Config {
            interval: Duration::from_secs(self.interval),
            source_timeout: Duration::from_millis(self.source_timeout_ms),
            timezone: self.timezone.clone(),
            battery_path: self.battery.clone(),
            mpd: MpdConfig {
                host: self.mpd_host.clone(),
                port: self.mpd_port,
                timeout: Duration::from_millis(self.mpd_timeout_ms),
            },
            ..Config::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志系统
    init_logger(&args.log_level);

    info!("状态栏启动中...");

    let config = args.to_config();
    info!(
        "配置信息 - 间隔: {:?}, 时区: {}, 电池: {}, MPD: {}:{}",
        config.interval,
        config.timezone,
        config.battery_path.display(),
        config.mpd.host,
        config.mpd.port
    );

    // 先打开输出端，显示服务不可用时直接退出
    let sink: Box<dyn Sink> = if args.stdout {
        Box::new(WriterSink::stdout())
    } else {
        Box::new(RootWindowSink::connect()?)
    };

    let registry = create_registry(&config).await?;
    let aggregator = Aggregator::new(registry, config.source_timeout);
    let mut scheduler = Scheduler::new(aggregator, sink, config.interval);

    let result = if args.once {
        scheduler.tick().await.map(|_| ())
    } else {
        scheduler.run().await
    };

    if let Err(e) = &result {
        error!("状态栏异常退出: {e:#}");
        return result;
    }

    info!("状态栏正常退出");
    Ok(())
}

/// 初始化日志系统
fn init_logger(level: &str) {
    match env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .try_init()
    {
        Ok(_) => info!("日志系统初始化成功，级别: {level}"),
        Err(e) => eprintln!("日志系统初始化失败: {e}"),
    }
}
