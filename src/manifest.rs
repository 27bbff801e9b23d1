// ============================================================================
// Manifest 加载 - 逐实例的基准真值标签序列
// ============================================================================

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::tag::Tag;

/// manifest 顶层结构，`tags` 之外的键忽略
#[derive(Debug, Deserialize)]
struct Manifest {
    /// 实例名 -> 标签编码序列（每源码行一个，1 起始）
    tags: HashMap<String, Vec<u8>>,
}

/// 读取 manifest 并转换为标签序列
///
/// validation_set 给定时，不在集合内的实例整体丢弃（不参与评分）；
/// sound_only 模式下每个序列在第一个 UNSAFE 标签处截断（含该标签）
pub fn load_tags(
    path: &Path,
    validation_set: Option<&HashSet<String>>,
    sound_only: bool,
) -> Result<HashMap<String, Vec<Tag>>> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read manifest {}: {e}", path.display()))?;
    parse_tags(&text, validation_set, sound_only)
}

/// manifest 文本解析（与文件 IO 分离，便于测试）
pub fn parse_tags(
    text: &str,
    validation_set: Option<&HashSet<String>>,
    sound_only: bool,
) -> Result<HashMap<String, Vec<Tag>>> {
    let manifest: Manifest =
        serde_json::from_str(text).map_err(|e| anyhow!("malformed manifest: {e}"))?;

    let mut result = HashMap::new();
    for (instance, codes) in manifest.tags {
        if let Some(keep) = validation_set {
            if !keep.contains(&instance) {
                continue;
            }
        }

        let mut tags = codes
            .into_iter()
            .map(Tag::from_code)
            .collect::<Result<Vec<Tag>>>()
            .map_err(|e| anyhow!("instance {instance}: {e}"))?;

        if sound_only {
            truncate_at_first_unsafe(&mut tags);
        }
        result.insert(instance, tags);
    }
    Ok(result)
}

/// sound 截断：保留到第一个 UNSAFE 标签为止（含）
///
/// 首个真实缺陷行之后的标签不再是有意义的基准真值
fn truncate_at_first_unsafe(tags: &mut Vec<Tag>) {
    if let Some(i) = tags.iter().position(|t| t.is_unsafe()) {
        tags.truncate(i + 1);
    }
}

/// 验证集文件：每行一个实例名，去除首尾空白，空行忽略
pub fn load_validation_set(path: &Path) -> Result<HashSet<String>> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read validation set {}: {e}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic() {
        let tags = parse_tags(r#"{"tags": {"f.c": [0, 0, 3]}}"#, None, false).unwrap();
        assert_eq!(
            tags["f.c"],
            vec![Tag::Other, Tag::Other, Tag::MemoryManagementUnsafe]
        );
    }

    #[test]
    fn test_extra_toplevel_keys_ignored() {
        let tags = parse_tags(
            r#"{"tags": {"f.c": [1]}, "num_instances": 1}"#,
            None,
            false,
        )
        .unwrap();
        assert_eq!(tags["f.c"], vec![Tag::Body]);
    }

    #[test]
    fn test_missing_tags_key_is_error() {
        assert!(parse_tags(r#"{"instances": {}}"#, None, false).is_err());
        assert!(parse_tags("not json", None, false).is_err());
    }

    #[test]
    fn test_invalid_tag_code_is_error() {
        let err = parse_tags(r#"{"tags": {"f.c": [0, 99]}}"#, None, false).unwrap_err();
        assert!(err.to_string().contains("f.c"));
    }

    #[test]
    fn test_validation_set_filter() {
        // 不在验证集内的实例整体丢弃
        let keep: HashSet<String> = ["f.c".to_string()].into();
        let tags = parse_tags(
            r#"{"tags": {"f.c": [0], "g.c": [0, 3]}}"#,
            Some(&keep),
            false,
        )
        .unwrap();
        assert_eq!(tags.len(), 1);
        assert!(tags.contains_key("f.c"));
        assert!(!tags.contains_key("g.c"));
    }

    #[test]
    fn test_sound_only_truncation() {
        let tags = parse_tags(r#"{"tags": {"f.c": [0, 3, 0, 3]}}"#, None, true).unwrap();
        assert_eq!(tags["f.c"], vec![Tag::Other, Tag::MemoryManagementUnsafe]);
    }

    #[test]
    fn test_sound_only_no_unsafe_keeps_all() {
        let tags = parse_tags(r#"{"tags": {"f.c": [0, 2, 1]}}"#, None, true).unwrap();
        assert_eq!(tags["f.c"].len(), 3);
    }

    #[test]
    fn test_sound_truncation_idempotent() {
        let mut once = vec![
            Tag::Other,
            Tag::RaceCondUnsafe,
            Tag::Body,
            Tag::StrcpyUnsafe,
        ];
        truncate_at_first_unsafe(&mut once);
        let mut twice = once.clone();
        truncate_at_first_unsafe(&mut twice);
        assert_eq!(once, twice);
        assert_eq!(once, vec![Tag::Other, Tag::RaceCondUnsafe]);
    }

    #[test]
    fn test_load_validation_set_strips_whitespace() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "f.c  \n\n  g.c\n").unwrap();
        let set = load_validation_set(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("f.c"));
        assert!(set.contains("g.c"));
    }
}
