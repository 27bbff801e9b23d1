// ============================================================================
// 缺陷标签模块 - 基准真值分类
// ============================================================================

use anyhow::{anyhow, Result};

/// 单行代码的基准真值标签
///
/// 数值编码与基准生成器写入 manifest 的编码一致，不可改动。
/// 五个缺陷维度各有 SAFE/UNSAFE 一对，0/1 为中性标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Other = 0,
    Body = 1,
    MemoryManagementSafe = 2,
    MemoryManagementUnsafe = 3,
    RaceCondSafe = 4,
    RaceCondUnsafe = 5,
    CondWaitSafe = 6,
    CondWaitUnsafe = 7,
    CondSignalSafe = 8,
    CondSignalUnsafe = 9,
    StrcpySafe = 10,
    StrcpyUnsafe = 11,
}

impl Tag {
    /// 全部标签值（Score Table 初始化时逐一置零）
    pub const ALL: [Tag; 12] = [
        Tag::Other,
        Tag::Body,
        Tag::MemoryManagementSafe,
        Tag::MemoryManagementUnsafe,
        Tag::RaceCondSafe,
        Tag::RaceCondUnsafe,
        Tag::CondWaitSafe,
        Tag::CondWaitUnsafe,
        Tag::CondSignalSafe,
        Tag::CondSignalUnsafe,
        Tag::StrcpySafe,
        Tag::StrcpyUnsafe,
    ];

    /// 从 manifest 中的数值编码转换，编码越界视为输入错误
    pub fn from_code(code: u8) -> Result<Self> {
        let tag = match code {
            0 => Tag::Other,
            1 => Tag::Body,
            2 => Tag::MemoryManagementSafe,
            3 => Tag::MemoryManagementUnsafe,
            4 => Tag::RaceCondSafe,
            5 => Tag::RaceCondUnsafe,
            6 => Tag::CondWaitSafe,
            7 => Tag::CondWaitUnsafe,
            8 => Tag::CondSignalSafe,
            9 => Tag::CondSignalUnsafe,
            10 => Tag::StrcpySafe,
            11 => Tag::StrcpyUnsafe,
            _ => return Err(anyhow!("invalid tag code: {code}")),
        };
        Ok(tag)
    }

    /// 日志与诊断用名称
    pub fn name(self) -> &'static str {
        match self {
            Tag::Other => "OTHER",
            Tag::Body => "BODY",
            Tag::MemoryManagementSafe => "MEMORY_MANAGEMENT_SAFE",
            Tag::MemoryManagementUnsafe => "MEMORY_MANAGEMENT_UNSAFE",
            Tag::RaceCondSafe => "RACE_COND_SAFE",
            Tag::RaceCondUnsafe => "RACE_COND_UNSAFE",
            Tag::CondWaitSafe => "COND_WAIT_SAFE",
            Tag::CondWaitUnsafe => "COND_WAIT_UNSAFE",
            Tag::CondSignalSafe => "COND_SIGNAL_SAFE",
            Tag::CondSignalUnsafe => "COND_SIGNAL_UNSAFE",
            Tag::StrcpySafe => "STRCPY_SAFE",
            Tag::StrcpyUnsafe => "STRCPY_UNSAFE",
        }
    }

    /// 是否属于五类 UNSAFE 标签（sound 截断与 tp/fn 判定依据）
    pub fn is_unsafe(self) -> bool {
        matches!(
            self,
            Tag::MemoryManagementUnsafe
                | Tag::RaceCondUnsafe
                | Tag::CondWaitUnsafe
                | Tag::CondSignalUnsafe
                | Tag::StrcpyUnsafe
        )
    }
}

/// 混淆矩阵的类别配对 (kind 名称, UNSAFE 标签, SAFE 标签)
///
/// 数组顺序即每个工具的输出行顺序
pub const CATEGORY_PAIRS: [(&str, Tag, Tag); 5] = [
    (
        "MEMORY_MANAGEMENT",
        Tag::MemoryManagementUnsafe,
        Tag::MemoryManagementSafe,
    ),
    ("RACE_CONDITION", Tag::RaceCondUnsafe, Tag::RaceCondSafe),
    ("CONDITION_WAIT", Tag::CondWaitUnsafe, Tag::CondWaitSafe),
    ("CONDITION_SIGNAL", Tag::CondSignalUnsafe, Tag::CondSignalSafe),
    ("STRCPY", Tag::StrcpyUnsafe, Tag::StrcpySafe),
];
