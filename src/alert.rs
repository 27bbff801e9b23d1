// ============================================================================
// 告警加载 - CSV 解析与 (文件名, 行号) 位置索引
// ============================================================================

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{anyhow, Result};
use csv::StringRecord;
use tracing::debug;

use crate::whitelist::Whitelist;

/// 静态分析工具输出的单条告警
///
/// CSV 定长五列：tool, checker, file, line, message（无表头）
#[derive(Debug, Clone)]
pub struct Alert {
    pub tool: String,
    pub checker: String,
    pub file: String,
    pub line: usize,
    pub message: String,
}

impl Alert {
    /// 从一行 CSV 记录构造，列数不符或行号非数字视为输入错误
    fn from_record(record: &StringRecord) -> Result<Self> {
        if record.len() != 5 {
            return Err(anyhow!("expected 5 fields, got {}", record.len()));
        }
        let line: usize = record[3]
            .parse()
            .map_err(|_| anyhow!("invalid line number {:?}", &record[3]))?;
        Ok(Alert {
            tool: record[0].to_string(),
            checker: record[1].to_string(),
            file: record[2].to_string(),
            line,
            message: record[4].to_string(),
        })
    }
}

/// 读取单个告警文件，仅保留 whitelist 命中的行，保持文件内顺序
///
/// 任何畸形行都让整个操作失败，不做部分恢复
pub fn load_alerts(path: &Path, whitelist: &Whitelist) -> Result<Vec<Alert>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| anyhow!("failed to open alert file {}: {e}", path.display()))?;

    let mut kept = Vec::new();
    let mut total = 0usize;
    for result in reader.records() {
        let record =
            result.map_err(|e| anyhow!("malformed alert row in {}: {e}", path.display()))?;
        let alert = Alert::from_record(&record)
            .map_err(|e| anyhow!("malformed alert row in {}: {e}", path.display()))?;
        total += 1;
        if whitelist.is_whitelisted(&alert) {
            kept.push(alert);
        }
    }
    debug!(
        "{}: kept {}/{} alerts after whitelist",
        path.display(),
        kept.len(),
        total
    );
    Ok(kept)
}

/// (文件名, 行号) -> 命中该位置的工具集合
///
/// 仅按文件 basename 关联：不同目录下的同名文件会合并到同一键，
/// 这是基准语料的刻意简化，保持原样
#[derive(Debug, Default)]
pub struct AlertIndex {
    hits: HashMap<String, HashMap<usize, BTreeSet<String>>>,
    tools: BTreeSet<String>,
}

impl AlertIndex {
    /// 由保留下来的告警构建索引
    ///
    /// 同一工具对同一位置的重复告警折叠为一次（集合语义）
    pub fn build(alerts: &[Alert]) -> Self {
        let mut index = AlertIndex::default();
        for alert in alerts {
            let name = Path::new(&alert.file)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            index
                .hits
                .entry(name)
                .or_default()
                .entry(alert.line)
                .or_default()
                .insert(alert.tool.clone());
            index.tools.insert(alert.tool.clone());
        }
        index
    }

    /// 某位置命中的工具集合，可能为空
    pub fn hits_at(&self, instance: &str, line: usize) -> Option<&BTreeSet<String>> {
        self.hits.get(instance).and_then(|lines| lines.get(&line))
    }

    /// 全部已知工具（字典序）
    pub fn tools(&self) -> &BTreeSet<String> {
        &self.tools
    }
}
