//! 结果归一化 - 业务能力层
//!
//! webhook 返回的题目可能是以下任意一种形状：
//!
//! 1. `{ "success": true, "questions": [...] }`
//! 2. `[...]`
//! 3. `{ ...单道题... }`（至少带一个题目字段）
//! 4. 空值（`null` / `[]` / `{}` / `""` 等）
//!
//! 按顺序逐条尝试形状规则，命中即停；都不命中则返回 `ParseFailure`，保留原文。

use crate::clients::RawResponse;
use crate::models::QuestionRecord;
use serde_json::Value;
use tracing::{debug, warn};

/// 远端解析失败时写在 category 里的标记
pub const PARSE_ERROR_SENTINEL: &str = "parse_error";

/// 归一化结果
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// 有序题目列表（可能为空）
    Questions(Vec<QuestionRecord>),
    /// 无法识别或远端解析失败，附原始文本
    ParseFailure(String),
}

/// 单条形状规则的匹配结果
enum Shape {
    Records(Vec<Value>),
    Unrecognized,
}

type ShapeRule = fn(&Value) -> Option<Shape>;

/// 形状规则，按优先级排列
const SHAPE_RULES: [(&str, ShapeRule); 4] = [
    ("wrapped", wrapped_success),
    ("list", bare_list),
    ("single", single_object),
    ("empty", empty_value),
];

/// 归一化 webhook 的原始响应
pub fn normalize(raw: &RawResponse) -> Normalized {
    match raw {
        RawResponse::Json(value) => normalize_value(value),
        RawResponse::Text(text) if text.trim().is_empty() => Normalized::Questions(Vec::new()),
        RawResponse::Text(text) => {
            warn!("响应不是 JSON，按原文返回 ({} 字符)", text.chars().count());
            Normalized::ParseFailure(text.clone())
        }
    }
}

/// 归一化一个已解析的 JSON 值
pub fn normalize_value(value: &Value) -> Normalized {
    let items = SHAPE_RULES.iter().find_map(|(name, rule)| {
        let shape = rule(value)?;
        debug!("响应形状: {}", name);
        Some(shape)
    });

    match items {
        Some(Shape::Records(items)) => records_from_items(&items, value),
        Some(Shape::Unrecognized) | None => {
            warn!("无法识别的响应形状");
            Normalized::ParseFailure(raw_text(value))
        }
    }
}

fn records_from_items(items: &[Value], whole: &Value) -> Normalized {
    // 只检查第一条
    if let Some(first) = items.first() {
        let category = first.get("category").map(text_of).unwrap_or_default();
        if category.contains(PARSE_ERROR_SENTINEL) {
            warn!("远端题目解析失败，返回 explanation 原文");
            let explanation = first.get("explanation").map(text_of).unwrap_or_default();
            return Normalized::ParseFailure(explanation);
        }
    }

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            warn!("第 {} 条不是对象", index + 1);
            return Normalized::ParseFailure(raw_text(whole));
        }
        match serde_json::from_value::<QuestionRecord>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("第 {} 条无法转换为题目: {}", index + 1, e);
                return Normalized::ParseFailure(raw_text(whole));
            }
        }
    }

    Normalized::Questions(records)
}

// ========== 形状规则 ==========

fn wrapped_success(value: &Value) -> Option<Shape> {
    let object = value.as_object()?;
    if !object.get("success").is_some_and(|flag| !is_falsy(flag)) {
        return None;
    }
    Some(match object.get("questions") {
        None | Some(Value::Null) => Shape::Records(Vec::new()),
        Some(Value::Array(items)) => Shape::Records(items.clone()),
        Some(_) => Shape::Unrecognized,
    })
}

fn bare_list(value: &Value) -> Option<Shape> {
    value.as_array().map(|items| Shape::Records(items.clone()))
}

/// 单道题至少要带其中一个字段，否则视为无法识别（如 webhook 的确认消息）
const QUESTION_FIELDS: [&str; 6] = [
    "category",
    "difficulty",
    "question",
    "choiceA",
    "choiceB",
    "choiceC",
];

fn single_object(value: &Value) -> Option<Shape> {
    match value {
        Value::Object(map) if map.is_empty() => None,
        Value::Object(map) if QUESTION_FIELDS.iter().any(|field| map.contains_key(*field)) => {
            Some(Shape::Records(vec![value.clone()]))
        }
        Value::Object(_) => Some(Shape::Unrecognized),
        _ => None,
    }
}

fn empty_value(value: &Value) -> Option<Shape> {
    is_falsy(value).then(|| Shape::Records(Vec::new()))
}

// ========== 辅助函数 ==========

/// JSON 值是否为"假"：null、false、0、空字符串、空数组、空对象
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn q(n: u32) -> Value {
        json!({
            "category": "이해",
            "difficulty": format!("{}점", n),
            "question": format!("문제 {}", n),
            "choiceA": "가",
            "choiceB": "나",
            "choiceC": "다"
        })
    }

    fn questions(normalized: Normalized) -> Vec<QuestionRecord> {
        match normalized {
            Normalized::Questions(records) => records,
            other => panic!("expected questions, got {:?}", other),
        }
    }

    #[test]
    fn test_every_shape_yields_same_records() {
        let logical = vec![q(1), q(2)];

        let wrapped = json!({ "success": true, "questions": logical });
        let list = Value::Array(logical.clone());

        let from_wrapped = questions(normalize_value(&wrapped));
        let from_list = questions(normalize_value(&list));
        assert_eq!(from_wrapped, from_list);
        assert_eq!(from_list.len(), 2);
        assert_eq!(from_list[1].question, "문제 2");

        let single = questions(normalize_value(&q(1)));
        assert_eq!(single, vec![from_list[0].clone()]);
        let single_wrapped =
            questions(normalize_value(&json!({ "success": true, "questions": [q(1)] })));
        assert_eq!(single, single_wrapped);
    }

    #[test]
    fn test_empty_shapes() {
        for value in [
            Value::Null,
            json!([]),
            json!({}),
            json!(""),
            json!(false),
            json!({ "success": true }),
            json!({ "success": true, "questions": null }),
        ] {
            assert_eq!(normalize_value(&value), Normalized::Questions(Vec::new()), "{}", value);
        }
        assert_eq!(
            normalize(&RawResponse::Text("   ".to_string())),
            Normalized::Questions(Vec::new())
        );
    }

    #[test]
    fn test_success_false_is_treated_as_single_object() {
        let value = json!({ "success": false, "category": "사고", "question": "Q" });
        let records = questions(normalize_value(&value));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "사고");
    }

    #[test]
    fn test_sentinel_returns_explanation_text() {
        let value = json!([
            { "category": "parse_error", "explanation": "1. 주인공은?\n(A) ..." },
            q(2)
        ]);
        assert_eq!(
            normalize_value(&value),
            Normalized::ParseFailure("1. 주인공은?\n(A) ...".to_string())
        );

        let wrapped = json!({
            "success": true,
            "questions": [{ "category": "question parse_error", "explanation": "raw" }]
        });
        assert_eq!(
            normalize_value(&wrapped),
            Normalized::ParseFailure("raw".to_string())
        );
    }

    #[test]
    fn test_sentinel_only_checks_first_record() {
        let value = json!([q(1), { "category": "parse_error", "explanation": "x" }]);
        let records = questions(normalize_value(&value));
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].category, "parse_error");
    }

    #[test]
    fn test_unrecognized_shapes_keep_raw_text() {
        assert_eq!(
            normalize(&RawResponse::Text("<html>oops</html>".to_string())),
            Normalized::ParseFailure("<html>oops</html>".to_string())
        );
        assert_eq!(
            normalize_value(&json!("문제 1. ...")),
            Normalized::ParseFailure("문제 1. ...".to_string())
        );
        assert!(matches!(
            normalize_value(&json!({ "success": true, "questions": "not a list" })),
            Normalized::ParseFailure(_)
        ));
        assert!(matches!(
            normalize_value(&json!([q(1), "stray"])),
            Normalized::ParseFailure(_)
        ));
        assert!(matches!(normalize_value(&json!(7)), Normalized::ParseFailure(_)));
    }

    #[test]
    fn test_object_without_question_fields_is_not_a_question() {
        let ack = json!({ "message": "Workflow was started" });
        match normalize_value(&ack) {
            Normalized::ParseFailure(raw) => assert!(raw.contains("Workflow was started")),
            other => panic!("unexpected: {:?}", other),
        }

        let failed = json!({ "success": false, "error": "quota" });
        assert!(matches!(normalize_value(&failed), Normalized::ParseFailure(_)));
    }

    #[test]
    fn test_is_falsy() {
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!({})));
        assert!(!is_falsy(&json!([1])));
        assert!(!is_falsy(&json!("done")));
    }
}
