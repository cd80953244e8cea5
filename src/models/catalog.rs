//! 题目类别与难度范围
//!
//! 远端工作流只认固定的几个选项，这里把它们收敛成枚举。

use crate::error::BusinessError;
use phf::phf_map;

/// 题目类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Category {
    /// 全部类别（固定 50 题）
    All,
    /// 이해
    Comprehension,
    /// 사고
    Thinking,
    /// 표현
    Expression,
    /// 논리적 사고
    LogicalThinking,
    /// 어휘
    Vocabulary,
}

static CATEGORY_ALIASES: phf::Map<&'static str, Category> = phf_map! {
    "all" => Category::All,
    "전체" => Category::All,
    "전체 (50문항)" => Category::All,
    "comprehension" => Category::Comprehension,
    "이해" => Category::Comprehension,
    "thinking" => Category::Thinking,
    "사고" => Category::Thinking,
    "expression" => Category::Expression,
    "표현" => Category::Expression,
    "logical" => Category::LogicalThinking,
    "logical_thinking" => Category::LogicalThinking,
    "논리적 사고" => Category::LogicalThinking,
    "논리적사고" => Category::LogicalThinking,
    "vocabulary" => Category::Vocabulary,
    "어휘" => Category::Vocabulary,
};

impl Category {
    /// 全部类别的固定题量
    pub const ALL_QUESTION_COUNT: u32 = 50;
    /// 单一类别的题量范围
    pub const MIN_QUESTION_COUNT: u32 = 1;
    pub const MAX_QUESTION_COUNT: u32 = 20;
    pub const DEFAULT_QUESTION_COUNT: u32 = 10;

    pub const VARIANTS: [Category; 6] = [
        Category::All,
        Category::Comprehension,
        Category::Thinking,
        Category::Expression,
        Category::LogicalThinking,
        Category::Vocabulary,
    ];

    /// 界面显示名称
    pub fn label(self) -> &'static str {
        match self {
            Category::All => "전체 (50문항)",
            Category::Comprehension => "이해",
            Category::Thinking => "사고",
            Category::Expression => "표현",
            Category::LogicalThinking => "논리적 사고",
            Category::Vocabulary => "어휘",
        }
    }

    /// 发送给 webhook 的取值
    pub fn wire_value(self) -> &'static str {
        match self {
            Category::All => "all",
            other => other.label(),
        }
    }

    /// 解析类别（支持韩文名、完整标签和英文别名）
    pub fn parse(s: &str) -> Result<Self, BusinessError> {
        let key = s.trim().to_lowercase();
        CATEGORY_ALIASES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| BusinessError::UnknownOption {
                kind: "题目类别",
                value: s.to_string(),
            })
    }

    /// 根据类别确定最终题量
    ///
    /// 全部类别忽略请求值，固定为 50；其余类别必须在 1..=20 之间，缺省为 10。
    pub fn resolve_count(self, requested: Option<u32>) -> Result<u32, BusinessError> {
        if self == Category::All {
            return Ok(Self::ALL_QUESTION_COUNT);
        }

        let count = requested.unwrap_or(Self::DEFAULT_QUESTION_COUNT);
        if !(Self::MIN_QUESTION_COUNT..=Self::MAX_QUESTION_COUNT).contains(&count) {
            return Err(BusinessError::InvalidQuestionCount {
                count,
                min: Self::MIN_QUESTION_COUNT,
                max: Self::MAX_QUESTION_COUNT,
            });
        }
        Ok(count)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 难度范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum DifficultyRange {
    #[default]
    All,
    Easy,
    Medium,
    Hard,
}

static DIFFICULTY_ALIASES: phf::Map<&'static str, DifficultyRange> = phf_map! {
    "all" => DifficultyRange::All,
    "전체" => DifficultyRange::All,
    "전체 (1-5점)" => DifficultyRange::All,
    "easy" => DifficultyRange::Easy,
    "쉬움" => DifficultyRange::Easy,
    "쉬움 (1-2점)" => DifficultyRange::Easy,
    "medium" => DifficultyRange::Medium,
    "보통" => DifficultyRange::Medium,
    "보통 (3점)" => DifficultyRange::Medium,
    "hard" => DifficultyRange::Hard,
    "어려움" => DifficultyRange::Hard,
    "어려움 (4-5점)" => DifficultyRange::Hard,
};

impl DifficultyRange {
    pub const VARIANTS: [DifficultyRange; 4] = [
        DifficultyRange::All,
        DifficultyRange::Easy,
        DifficultyRange::Medium,
        DifficultyRange::Hard,
    ];

    /// 显示名称，同时也是发送给 webhook 的取值
    pub fn label(self) -> &'static str {
        match self {
            DifficultyRange::All => "전체 (1-5점)",
            DifficultyRange::Easy => "쉬움 (1-2점)",
            DifficultyRange::Medium => "보통 (3점)",
            DifficultyRange::Hard => "어려움 (4-5점)",
        }
    }

    pub fn parse(s: &str) -> Result<Self, BusinessError> {
        let key = s.trim().to_lowercase();
        DIFFICULTY_ALIASES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| BusinessError::UnknownOption {
                kind: "难度范围",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for DifficultyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_aliases() {
        assert_eq!(Category::parse("이해").unwrap(), Category::Comprehension);
        assert_eq!(Category::parse(" ALL ").unwrap(), Category::All);
        assert_eq!(Category::parse("전체 (50문항)").unwrap(), Category::All);
        assert_eq!(
            Category::parse("논리적 사고").unwrap(),
            Category::LogicalThinking
        );
        assert!(Category::parse("수학").is_err());
    }

    #[test]
    fn test_every_label_round_trips() {
        for category in Category::VARIANTS {
            assert_eq!(Category::parse(category.label()).unwrap(), category);
        }
        for difficulty in DifficultyRange::VARIANTS {
            assert_eq!(DifficultyRange::parse(difficulty.label()).unwrap(), difficulty);
        }
    }

    #[test]
    fn test_wire_value_uses_all_sentinel() {
        assert_eq!(Category::All.wire_value(), "all");
        assert_eq!(Category::Vocabulary.wire_value(), "어휘");
    }

    #[test]
    fn test_resolve_count() {
        assert_eq!(Category::All.resolve_count(Some(3)).unwrap(), 50);
        assert_eq!(Category::Thinking.resolve_count(None).unwrap(), 10);
        assert_eq!(Category::Thinking.resolve_count(Some(20)).unwrap(), 20);
        assert!(Category::Thinking.resolve_count(Some(0)).is_err());
        assert!(Category::Thinking.resolve_count(Some(21)).is_err());
    }
}
