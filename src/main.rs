mod alert;
mod cli;
mod manifest;
mod score;
mod tag;
mod whitelist;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Static Analysis Benchmark Scorer
///
/// 把工具告警与基准真值标签按 (文件名, 行号) 关联，
/// 按缺陷类别输出每个工具的混淆矩阵 CSV
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// 基准真值 manifest (JSON)
    pub manifest: PathBuf,

    /// 告警准入规则 (YAML)
    pub whitelist: PathBuf,

    /// 告警文件 (CSV)，按给定顺序拼接
    #[arg(required = true)]
    pub alert_files: Vec<PathBuf>,

    /// 验证集文件：每行一个实例名，集合之外的实例不评分
    #[arg(long = "validation_set")]
    pub validation_set: Option<PathBuf>,

    /// sound 模式：标签序列在第一个 UNSAFE 标签处截断（含）
    #[arg(long = "sound_only")]
    pub sound_only: bool,

    /// 输出 DEBUG 级别日志
    #[arg(short = 'v')]
    pub verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 日志只走 stderr，stdout 留给 CSV 数据
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    cli::run(args)
}
