// ==========================================
// 预制构件日产组合排产 - 命令行入口
// ==========================================
// 用法:
//   precast-mix <构件清单.(csv|xlsx)> <序列表.(csv|xlsx)> [选项]
//
// 选项:
//   --capacity N        日均产能（m³/天）
//   --calendar-days     按自然日排产（默认仅工作日）
//   --view V            周期视图 daily | weekly | monthly
//   --locale L          输出语言 pt-BR | en | zh-CN
//   --out DIR           输出目录（默认 ./saida）
//   --config PATH       配置文件路径
// 命令行覆写只作用于本次运行，不写回配置文件
// ==========================================

use anyhow::{bail, Context};
use precast_mix::api::MixApi;
use precast_mix::config::{config_keys, ConfigManager};
use precast_mix::importer::PlanningImporterImpl;
use precast_mix::{i18n, logging};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_OUT_DIR: &str = "saida";

#[derive(Debug, Default)]
struct CliArgs {
    pieces: Option<PathBuf>,
    sequences: Option<PathBuf>,
    capacity: Option<String>,
    calendar_days: bool,
    view: Option<String>,
    locale: Option<String>,
    out_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

fn usage() -> String {
    format!(
        "{} v{}\n\n用法: precast-mix <pieces.(csv|xlsx)> <sequences.(csv|xlsx)> \
         [--capacity N] [--calendar-days] [--view daily|weekly|monthly] \
         [--locale pt-BR|en|zh-CN] [--out DIR] [--config PATH]",
        precast_mix::APP_NAME,
        precast_mix::VERSION
    )
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let mut value_of = |flag: &str| {
            args.next()
                .with_context(|| format!("参数 {} 缺少取值", flag))
        };
        match arg.as_str() {
            "--capacity" => parsed.capacity = Some(value_of("--capacity")?),
            "--calendar-days" => parsed.calendar_days = true,
            "--view" => parsed.view = Some(value_of("--view")?),
            "--locale" => parsed.locale = Some(value_of("--locale")?),
            "--out" => parsed.out_dir = Some(PathBuf::from(value_of("--out")?)),
            "--config" => parsed.config_path = Some(PathBuf::from(value_of("--config")?)),
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => bail!("未知参数: {}\n\n{}", flag, usage()),
            _ if parsed.pieces.is_none() => parsed.pieces = Some(PathBuf::from(&arg)),
            _ if parsed.sequences.is_none() => parsed.sequences = Some(PathBuf::from(&arg)),
            _ => bail!("多余的位置参数: {}\n\n{}", arg, usage()),
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args = parse_args()?;
    let (Some(pieces), Some(sequences)) = (args.pieces.clone(), args.sequences.clone()) else {
        bail!("{}", usage());
    };

    tracing::info!("==================================================");
    tracing::info!("{} v{}", precast_mix::APP_NAME, precast_mix::VERSION);
    tracing::info!("==================================================");

    // 配置：文件 → 命令行覆写（仅内存）
    let config = match &args.config_path {
        Some(path) => ConfigManager::new(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display()))?,
        None => ConfigManager::open_default().context("无法加载默认配置")?,
    };
    if let Some(capacity) = &args.capacity {
        config.set(config_keys::DAILY_CAPACITY_M3, capacity)?;
    }
    if args.calendar_days {
        config.set(config_keys::USE_BUSINESS_DAYS, "false")?;
    }
    if let Some(view) = &args.view {
        config.set(config_keys::VIEW_MODE, view)?;
    }
    if let Some(locale) = &args.locale {
        config.set(config_keys::LOCALE, locale)?;
    }

    let api = MixApi::new(Arc::new(config), Arc::new(PlanningImporterImpl::default()));
    let report = api
        .run_from_files(&pieces, &sequences)
        .await
        .context("排产运行失败")?;

    let out_dir = args
        .out_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
    let written = api.export(&report, &out_dir).context("结果导出失败")?;

    // 摘要
    let locale = report.config.locale.as_str();
    let summary = &report.summary;
    println!("{}", i18n::t_in("summary.title", locale));
    println!(
        "  {}: {}",
        i18n::t_in("summary.mix_rows", locale),
        summary.mix_rows
    );
    println!(
        "  {}: {:.3}",
        i18n::t_in("summary.total_volume", locale),
        summary.scheduled_m3
    );
    println!(
        "  {}: {} ({:.3} m³)",
        i18n::t_in("summary.pending", locale),
        summary.pending_items,
        summary.pending_m3
    );
    for message in &report.validation_messages {
        println!("  {}", message);
    }
    println!(
        "{}: {}",
        i18n::t_in("summary.output_dir", locale),
        out_dir.display()
    );
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}
