use crate::models::book::BookRef;
use crate::models::catalog::{Category, DifficultyRange};
use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// 难度中的第一个数字，只编译一次
static DIFFICULTY_DIGIT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d").ok());

/// 单道题目
///
/// 字段名与 webhook 返回的 JSON 保持一致。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub category: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub question: String,
    #[serde(rename = "choiceA", default, deserialize_with = "deserialize_text")]
    pub choice_a: String,
    #[serde(rename = "choiceB", default, deserialize_with = "deserialize_text")]
    pub choice_b: String,
    #[serde(rename = "choiceC", default, deserialize_with = "deserialize_text")]
    pub choice_c: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_text"
    )]
    pub explanation: Option<String>,
}

impl QuestionRecord {
    /// 导出时的列名（顺序固定）
    pub const COLUMNS: [&'static str; 7] = [
        "category",
        "difficulty",
        "question",
        "choiceA",
        "choiceB",
        "choiceC",
        "explanation",
    ];

    /// 按 `COLUMNS` 顺序返回各列的值
    pub fn row(&self) -> [&str; 7] {
        [
            self.category.as_str(),
            self.difficulty.as_str(),
            self.question.as_str(),
            self.choice_a.as_str(),
            self.choice_b.as_str(),
            self.choice_c.as_str(),
            self.explanation.as_deref().unwrap_or(""),
        ]
    }

    /// 难度字符串中的第一个数字（如 "3점" → 3）
    pub fn difficulty_score(&self) -> Option<u32> {
        DIFFICULTY_DIGIT
            .as_ref()?
            .find(&self.difficulty)?
            .as_str()
            .parse()
            .ok()
    }
}

// 远端有时把难度写成数字，有时写成字符串；统一转成字符串
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_optional_text(deserializer)?.unwrap_or_default())
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number, bool or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(TextVisitor)
}

/// 生成请求参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub category: Category,
    pub question_count: u32,
    pub difficulty: DifficultyRange,
}

/// 一次生成得到的题目集
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSet {
    pub book: BookRef,
    pub request: GenerationRequest,
    pub records: Vec<QuestionRecord>,
    pub generated_at: DateTime<Local>,
}

impl QuestionSet {
    pub fn new(book: BookRef, request: GenerationRequest, records: Vec<QuestionRecord>) -> Self {
        Self {
            book,
            request,
            records,
            generated_at: Local::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 统计信息
    pub fn stats(&self) -> QuestionStats {
        let categories: BTreeSet<&str> = self
            .records
            .iter()
            .map(|r| r.category.as_str())
            .collect();

        let scores: Vec<u32> = self
            .records
            .iter()
            .filter_map(QuestionRecord::difficulty_score)
            .collect();

        let average_difficulty = if scores.is_empty() {
            None
        } else {
            let mean = scores.iter().sum::<u32>() as f64 / scores.len() as f64;
            Some((mean * 10.0).round() / 10.0)
        };

        QuestionStats {
            total: self.records.len(),
            category_count: categories.len(),
            average_difficulty,
        }
    }
}

/// 题目集统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestionStats {
    pub total: usize,
    pub category_count: usize,
    pub average_difficulty: Option<f64>,
}
