// ==========================================
// 恩施山区交通平台 - 指标计算命令行入口
// ==========================================
// 用法:
//   enshi-traffic-metrics <scenario.json> [--csv <samples.csv> --point <point_id>]
//                         [--now <YYYY-MM-DDTHH:MM:SS>] [--json-log]
// 输出: 每个路段的 DerivedMetrics (JSON 数组, stdout)
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

use enshi_traffic_metrics::importer::FlowSampleImporter;
use enshi_traffic_metrics::{
    logging, MetricsConfig, RoadRiskEngine, TrafficDataSource, TrafficMetricsApi, TrafficScenario,
};

#[derive(Debug, Default)]
struct CliArgs {
    scenario_path: String,
    csv_path: Option<String>,
    point_id: Option<String>,
    now: Option<NaiveDateTime>,
    json_log: bool,
}

fn parse_args() -> Result<CliArgs> {
    let mut args = std::env::args().skip(1);
    let mut cli = CliArgs::default();
    let mut scenario_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--csv" => cli.csv_path = Some(args.next().context("--csv 缺少文件路径")?),
            "--point" => cli.point_id = Some(args.next().context("--point 缺少监测点ID")?),
            "--now" => {
                let raw = args.next().context("--now 缺少时间")?;
                let now = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S")
                    .with_context(|| format!("--now 时间格式错误: {}", raw))?;
                cli.now = Some(now);
            }
            "--json-log" => cli.json_log = true,
            other if other.starts_with("--") => bail!("未知参数: {}", other),
            other => scenario_path = Some(other.to_string()),
        }
    }

    cli.scenario_path = scenario_path.ok_or_else(|| {
        anyhow!("用法: enshi-traffic-metrics <scenario.json> [--csv <file> --point <id>] [--now <time>]")
    })?;
    if cli.csv_path.is_some() != cli.point_id.is_some() {
        bail!("--csv 与 --point 必须同时提供");
    }
    Ok(cli)
}

fn main() -> Result<()> {
    let cli = parse_args()?;

    if cli.json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", enshi_traffic_metrics::APP_NAME, enshi_traffic_metrics::VERSION);
    tracing::info!("==================================================");

    let config = MetricsConfig::load().context("加载指标配置失败")?;

    let scenario = TrafficScenario::from_file(&cli.scenario_path)
        .with_context(|| format!("读取场景文件失败: {}", cli.scenario_path))?;
    let repo = Arc::new(scenario.into_repository().context("构建内存数据源失败")?);

    if let (Some(csv_path), Some(point_id)) = (&cli.csv_path, &cli.point_id) {
        let outcome = FlowSampleImporter::new()
            .import_file(csv_path, point_id)
            .with_context(|| format!("导入CSV失败: {}", csv_path))?;
        if !outcome.rejected.is_empty() {
            tracing::warn!(rejected = outcome.rejected.len(), "部分样本行被剔除");
        }
        let count = repo
            .add_samples(outcome.samples)
            .context("写入导入样本失败")?;
        tracing::info!(point_id = %point_id, count, "CSV样本已合并");
    }

    // 回写路段风险等级
    let risk_engine = RoadRiskEngine::new();
    let section_ids = repo.section_ids().context("读取路段列表失败")?;
    for section_id in &section_ids {
        let mut geometry = repo.section_geometry(section_id)?;
        risk_engine.refresh_risk_level(&mut geometry);
        repo.update_section_geometry(geometry)?;
    }

    let now = cli.now.unwrap_or_else(|| Local::now().naive_local());
    let api = TrafficMetricsApi::new(repo.clone(), config);

    let mut snapshots = Vec::with_capacity(section_ids.len());
    for section_id in &section_ids {
        let metrics = api
            .section_metrics(section_id, now)
            .with_context(|| format!("计算路段指标失败: {}", section_id))?;
        snapshots.push(metrics);
    }

    println!("{}", serde_json::to_string_pretty(&snapshots)?);
    Ok(())
}
