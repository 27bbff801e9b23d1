// ============================================================================
// Whitelist 匹配 - 工具告警准入规则 (allow-list)
// ============================================================================
//
// v1.1: 规则在加载时一次性编译，匹配路径上无正则重编译
//

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use regex::Regex;
use serde::Deserialize;

use crate::alert::Alert;

/// YAML 中的单条规则：纯字符串或 {regex: ...} 映射
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RuleSpec {
    Literal(String),
    Pattern { regex: String },
}

/// 编译后的匹配规则
#[derive(Debug)]
pub enum MatchRule {
    /// 目标串完全相等
    Literal(String),
    /// 前缀锚定正则：模式必须从目标串开头匹配
    Pattern(Regex),
}

impl MatchRule {
    fn compile(spec: RuleSpec) -> Result<Self> {
        match spec {
            RuleSpec::Literal(s) => Ok(MatchRule::Literal(s)),
            RuleSpec::Pattern { regex } => {
                // 包一层非捕获组再加 ^，保证顶层 | 也锚定在串首
                let anchored = Regex::new(&format!("^(?:{regex})"))
                    .map_err(|e| anyhow!("invalid whitelist regex {regex:?}: {e}"))?;
                Ok(MatchRule::Pattern(anchored))
            }
        }
    }

    /// 规则是否命中目标串
    pub fn matches(&self, target: &str) -> bool {
        match self {
            MatchRule::Literal(s) => s == target,
            MatchRule::Pattern(re) => re.is_match(target),
        }
    }
}

/// YAML 原始结构：checkers / messages 任一可缺省
#[derive(Debug, Default, Deserialize)]
struct ToolRulesSpec {
    #[serde(default)]
    checkers: Vec<RuleSpec>,
    #[serde(default)]
    messages: Vec<RuleSpec>,
}

/// 单个工具编译后的规则集
#[derive(Debug, Default)]
struct ToolRules {
    checkers: Vec<MatchRule>,
    messages: Vec<MatchRule>,
}

/// 按工具划分的告警准入规则
///
/// 未配置的工具没有任何规则，其告警一律排除（默认拒绝）
#[derive(Debug, Default)]
pub struct Whitelist {
    tools: HashMap<String, ToolRules>,
}

impl Whitelist {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read whitelist {}: {e}", path.display()))?;
        Self::parse(&text)
    }

    /// YAML 文本解析，正则在此处编译一次
    pub fn parse(text: &str) -> Result<Self> {
        // 工具名 -> 规则块；规则块本身可为 null
        let raw: HashMap<String, Option<ToolRulesSpec>> =
            serde_yaml::from_str(text).map_err(|e| anyhow!("malformed whitelist: {e}"))?;

        let mut tools = HashMap::new();
        for (tool, spec) in raw {
            let spec = spec.unwrap_or_default();
            tools.insert(
                tool,
                ToolRules {
                    checkers: compile_rules(spec.checkers)?,
                    messages: compile_rules(spec.messages)?,
                },
            );
        }
        Ok(Self { tools })
    }

    /// 告警是否在评分范围内：checker 规则或 message 规则任一命中即可
    pub fn is_whitelisted(&self, alert: &Alert) -> bool {
        let Some(rules) = self.tools.get(&alert.tool) else {
            return false;
        };
        rules.checkers.iter().any(|r| r.matches(&alert.checker))
            || rules.messages.iter().any(|r| r.matches(&alert.message))
    }
}

fn compile_rules(specs: Vec<RuleSpec>) -> Result<Vec<MatchRule>> {
    specs.into_iter().map(MatchRule::compile).collect()
}
