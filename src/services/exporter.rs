//! 题目导出 - 业务能力层
//!
//! 把当前题目集编码为 Excel / CSV 字节流，文件名由书名和类别推导。

use crate::error::{AppError, AppResult, BusinessError, ExportError};
use crate::models::{QuestionRecord, QuestionSet};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SHEET_NAME: &str = "문제";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => XLSX_CONTENT_TYPE,
            ExportFormat::Csv => CSV_CONTENT_TYPE,
        }
    }

    pub fn parse(s: &str) -> Result<Self, BusinessError> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(BusinessError::UnknownOption {
                kind: "导出格式",
                value: s.to_string(),
            }),
        }
    }
}

/// 导出结果
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// 按格式导出
pub fn export(set: &QuestionSet, format: ExportFormat) -> Result<ExportPayload, ExportError> {
    match format {
        ExportFormat::Xlsx => encode_xlsx(set),
        ExportFormat::Csv => encode_csv(set),
    }
}

/// 编码为 Excel（单个工作表，首行为表头）
pub fn encode_xlsx(set: &QuestionSet) -> Result<ExportPayload, ExportError> {
    if set.is_empty() {
        return Err(ExportError::EmptySet);
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in QuestionRecord::COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    for (index, record) in set.records.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in record.row().iter().enumerate() {
            worksheet.write_string(row, col as u16, *value)?;
        }
    }
    worksheet.autofit();

    let bytes = workbook.save_to_buffer()?;
    Ok(ExportPayload {
        bytes,
        content_type: XLSX_CONTENT_TYPE,
        filename: export_filename(set, ExportFormat::Xlsx),
    })
}

/// 编码为 CSV（UTF-8 带 BOM，方便 Excel 直接打开韩文）
pub fn encode_csv(set: &QuestionSet) -> Result<ExportPayload, ExportError> {
    if set.is_empty() {
        return Err(ExportError::EmptySet);
    }

    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(QuestionRecord::COLUMNS)?;
    for record in &set.records {
        writer.write_record(record.row())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;

    Ok(ExportPayload {
        bytes,
        content_type: CSV_CONTENT_TYPE,
        filename: export_filename(set, ExportFormat::Csv),
    })
}

/// 导出文件名：`문제_{书名}_{类别}.{扩展名}`
pub fn export_filename(set: &QuestionSet, format: ExportFormat) -> String {
    let stem = format!(
        "문제_{}_{}",
        set.book.display_name,
        set.request.category.label()
    );
    let safe: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();
    format!("{}.{}", safe, format.extension())
}

/// 把导出结果写入目录，返回完整路径
pub async fn save_payload(payload: &ExportPayload, dir: &Path) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))?;

    let path = dir.join(&payload.filename);
    tokio::fs::write(&path, &payload.bytes)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    info!(
        "📥 已导出 {} ({} 字节, {})",
        path.display(),
        payload.bytes.len(),
        payload.content_type
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookRef, Category, DifficultyRange, GenerationRequest};
    use calamine::{open_workbook_from_rs, Reader, Xlsx};
    use std::io::Cursor;

    fn sample_set(n: usize) -> QuestionSet {
        let records = (1..=n)
            .map(|i| QuestionRecord {
                category: "어휘".to_string(),
                difficulty: format!("{}점", i % 5 + 1),
                question: format!("\"{}\"번 문제, 쉼표 포함", i),
                choice_a: "가".to_string(),
                choice_b: "나".to_string(),
                choice_c: "다".to_string(),
                explanation: (i % 2 == 0).then(|| "해설\n두 줄".to_string()),
            })
            .collect();

        QuestionSet::new(
            BookRef::new("가방 들어주는 아이", Some("bag_carrying_child")),
            GenerationRequest {
                category: Category::Vocabulary,
                question_count: n as u32,
                difficulty: DifficultyRange::All,
            },
            records,
        )
    }

    #[test]
    fn test_csv_rows_and_columns_match_records() {
        let set = sample_set(5);
        let payload = encode_csv(&set).unwrap();

        assert_eq!(payload.content_type, "text/csv");
        assert_eq!(payload.filename, "문제_가방 들어주는 아이_어휘.csv");
        assert!(payload.bytes.starts_with(UTF8_BOM));

        let mut reader = csv::Reader::from_reader(&payload.bytes[UTF8_BOM.len()..]);
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, QuestionRecord::COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), set.len());
        assert_eq!(&rows[1][2], "\"2\"번 문제, 쉼표 포함");
        assert_eq!(&rows[1][6], "해설\n두 줄");
        assert_eq!(&rows[0][6], "");
    }

    #[test]
    fn test_xlsx_rows_and_columns_match_records() {
        let set = sample_set(4);
        let payload = encode_xlsx(&set).unwrap();
        assert_eq!(payload.content_type, XLSX_CONTENT_TYPE);
        assert!(payload.filename.ends_with("_어휘.xlsx"));

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(payload.bytes)).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();

        assert_eq!(range.height(), set.len() + 1);
        let header: Vec<String> = range
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        assert_eq!(header, QuestionRecord::COLUMNS);

        let second: Vec<String> = range.rows().nth(2).unwrap().iter().map(|c| c.to_string()).collect();
        assert_eq!(second[2], set.records[1].question);
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let set = sample_set(0);
        assert!(matches!(encode_csv(&set), Err(ExportError::EmptySet)));
        assert!(matches!(encode_xlsx(&set), Err(ExportError::EmptySet)));
    }

    #[test]
    fn test_filename_replaces_path_separators() {
        let mut set = sample_set(1);
        set.book = BookRef::new("A/B: C", None);
        assert_eq!(export_filename(&set, ExportFormat::Xlsx), "문제_A_B_ C_어휘.xlsx");
    }

    #[tokio::test]
    async fn test_save_payload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let payload = export(&sample_set(2), ExportFormat::Csv).unwrap();
        let path = save_payload(&payload, &dir.path().join("out")).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), payload.bytes);
    }
}
