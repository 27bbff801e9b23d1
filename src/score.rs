// ============================================================================
// 评分 - 逐行响应累计与混淆矩阵导出
// ============================================================================

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::alert::AlertIndex;
use crate::tag::{Tag, CATEGORY_PAIRS};

/// 单个标签上的正/负响应计数
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// 工具在该标签的行上报了告警
    pub positive: u64,
    /// 工具在该标签的行上没有告警
    pub negative: u64,
}

/// 工具 -> 标签 -> 响应计数
///
/// 显式传入传出，不依赖任何进程级状态；BTreeMap 保证工具按字典序遍历
#[derive(Debug, Default)]
pub struct ScoreTable {
    counts: BTreeMap<String, HashMap<Tag, Response>>,
}

impl ScoreTable {
    /// 为每个已知工具把所有标签的计数置零
    fn with_tools<'a>(tools: impl Iterator<Item = &'a String>) -> Self {
        let zeroed: HashMap<Tag, Response> = Tag::ALL
            .iter()
            .map(|&tag| (tag, Response::default()))
            .collect();
        ScoreTable {
            counts: tools.map(|t| (t.clone(), zeroed.clone())).collect(),
        }
    }

    /// 某工具在某标签上的计数（未知组合为零）
    pub fn response(&self, tool: &str, tag: Tag) -> Response {
        self.counts
            .get(tool)
            .and_then(|tags| tags.get(&tag))
            .copied()
            .unwrap_or_default()
    }
}

/// 对每个基准真值行判定各工具的响应并累计
///
/// 每个已知工具在每一行恰好得到一次计数（正或负）：没报告警本身也是数据点。
/// 只遍历 manifest 中的实例，告警指向的未知实例自然不会被读到；
/// 行号严格限制在 1..=标签序列长度。
pub fn score(instance_tags: &HashMap<String, Vec<Tag>>, index: &AlertIndex) -> ScoreTable {
    let mut table = ScoreTable::with_tools(index.tools().iter());

    for (instance, tags) in instance_tags {
        for (offset, &tag) in tags.iter().enumerate() {
            let line = offset + 1;
            let hits = index.hits_at(instance, line);
            for (tool, tag_counts) in table.counts.iter_mut() {
                let response = tag_counts.entry(tag).or_default();
                if hits.is_some_and(|set| set.contains(tool)) {
                    response.positive += 1;
                    debug!("RESPONSE,{},{},{},{}", tag.name(), tool, instance, line);
                } else {
                    response.negative += 1;
                    debug!("NO_RESPONSE,{},{},{},{}", tag.name(), tool, instance, line);
                }
            }
        }
    }
    table
}

/// 单工具单类别的混淆矩阵
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Confusion {
    pub true_pos: u64,
    pub true_neg: u64,
    pub false_pos: u64,
    pub false_neg: u64,
}

impl Confusion {
    fn accumulate(&mut self, other: Confusion) {
        self.true_pos += other.true_pos;
        self.true_neg += other.true_neg;
        self.false_pos += other.false_pos;
        self.false_neg += other.false_neg;
    }

    /// 四格总和，等于该类别覆盖的基准真值行数
    pub fn total(self) -> u64 {
        self.true_pos + self.true_neg + self.false_pos + self.false_neg
    }
}

/// 输出的一行：工具 + 类别名 + 矩阵
#[derive(Debug)]
pub struct ScoreRow {
    pub tool: String,
    pub kind: &'static str,
    pub matrix: Confusion,
}

/// 按固定类别顺序为每个工具导出五个类别行，再加一个 all 汇总行
///
/// UNSAFE 标签的正响应是 tp，SAFE 标签的负响应是 tn，
/// SAFE 标签的正响应是 fp，UNSAFE 标签的负响应是 fn
pub fn confusion_rows(table: &ScoreTable) -> Vec<ScoreRow> {
    let mut rows = Vec::new();
    for (tool, tag_counts) in &table.counts {
        let mut combined = Confusion::default();
        for &(kind, unsafe_tag, safe_tag) in &CATEGORY_PAIRS {
            let unsafe_resp = tag_counts.get(&unsafe_tag).copied().unwrap_or_default();
            let safe_resp = tag_counts.get(&safe_tag).copied().unwrap_or_default();
            let matrix = Confusion {
                true_pos: unsafe_resp.positive,
                true_neg: safe_resp.negative,
                false_pos: safe_resp.positive,
                false_neg: unsafe_resp.negative,
            };
            combined.accumulate(matrix);
            rows.push(ScoreRow {
                tool: tool.clone(),
                kind,
                matrix,
            });
        }
        rows.push(ScoreRow {
            tool: tool.clone(),
            kind: "all",
            matrix: combined,
        });
    }
    rows
}
