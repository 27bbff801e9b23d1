// ============================================================================
// CLI 编排 - 单趟流水线：标签 -> whitelist -> 告警 -> 索引 -> 评分 -> CSV
// ============================================================================

use std::io;

use anyhow::Result;
use tracing::debug;

use crate::alert::{self, AlertIndex};
use crate::manifest;
use crate::score::{self, ScoreRow};
use crate::whitelist::Whitelist;
use crate::Args;

/// 跑完整条评分流水线，结果 CSV 写到 stdout
pub fn run(args: Args) -> Result<()> {
    let validation_set = match &args.validation_set {
        Some(path) => Some(manifest::load_validation_set(path)?),
        None => None,
    };

    let instance_tags =
        manifest::load_tags(&args.manifest, validation_set.as_ref(), args.sound_only)?;
    debug!("loaded {} instances from manifest", instance_tags.len());

    let whitelist = Whitelist::load(&args.whitelist)?;

    // 多个告警文件按参数顺序拼接
    let mut alerts = Vec::new();
    for path in &args.alert_files {
        alerts.extend(alert::load_alerts(path, &whitelist)?);
    }

    let index = AlertIndex::build(&alerts);
    let table = score::score(&instance_tags, &index);
    let rows = score::confusion_rows(&table);

    write_rows(io::stdout().lock(), &rows)
}

/// CSV 输出：表头 + 每工具五个类别行 + all 行
fn write_rows<W: io::Write>(out: W, rows: &[ScoreRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["tool", "kind", "tp", "tn", "fp", "fn"])?;
    for row in rows {
        let m = row.matrix;
        let record = [
            row.tool.clone(),
            row.kind.to_string(),
            m.true_pos.to_string(),
            m.true_neg.to_string(),
            m.false_pos.to_string(),
            m.false_neg.to_string(),
        ];
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
