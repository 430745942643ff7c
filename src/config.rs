use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEZONE: &str = "Europe/Bucharest";
pub const DEFAULT_BATTERY_PATH: &str = "/sys/class/power_supply/BAT0";
pub const DEFAULT_MPD_HOST: &str = "localhost";
pub const DEFAULT_MPD_PORT: u16 = 6600;

/// 音乐播放守护进程连接配置
#[derive(Debug, Clone)]
pub struct MpdConfig {
    /// 主机名，或以 `/` 开头的 Unix 套接字路径
    pub host: String,
    pub port: u16,
    /// 连接与每次读写的超时
    pub timeout: Duration,
}

impl Default for MpdConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MPD_HOST.to_string(),
            port: DEFAULT_MPD_PORT,
            timeout: Duration::from_millis(1000),
        }
    }
}

/// 状态栏配置，启动时确定，运行期间只读
#[derive(Debug, Clone)]
pub struct Config {
    /// 两次刷新之间的休眠时间，从上一次发布结束时开始计算
    pub interval: Duration,
    /// 单个数据源一次采样的最长耗时
    pub source_timeout: Duration,
    /// 时钟使用的 IANA 时区名，与主机时区无关
    pub timezone: String,
    pub battery_path: PathBuf,
    pub meminfo_path: PathBuf,
    pub loadavg_path: PathBuf,
    pub cpuinfo_path: PathBuf,
    pub mpd: MpdConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            source_timeout: Duration::from_millis(2000),
            timezone: DEFAULT_TIMEZONE.to_string(),
            battery_path: PathBuf::from(DEFAULT_BATTERY_PATH),
            meminfo_path: PathBuf::from("/proc/meminfo"),
            loadavg_path: PathBuf::from("/proc/loadavg"),
            cpuinfo_path: PathBuf::from("/proc/cpuinfo"),
            mpd: MpdConfig::default(),
        }
    }
}
