//! 错误处理集成测试
//!
//! 校验失败不修改文档、写文件失败带原因、抓取失败与空结果/取消相互区分、
//! 引擎错误的分类

use specsheet::config::ScrapeConfig;
use specsheet::core::{export_bundle, SheetError};
use specsheet::document::{Document, DocumentSnapshot, Row};
use specsheet::scrape::{validate_url, ScrapeError, ScrapeMapper, ScrapeOutcome, ScrapedItem, CancelToken, NullProgress};
use specsheet::translation::{
    EngineRegistry, ErrorCategory, ErrorSeverity, IdentityTranslator, LabelTranslator, TranslationError,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{sample_snapshot, test_config, write_file};

#[test]
fn test_empty_key_is_rejected_without_mutation() {
    let mut document = Document::new();
    document.append(Row::entry("Typ", "CMOS"));
    let before = document.snapshot();

    assert!(matches!(document.append_entry("   ", "<b>x</b>"), Err(SheetError::Validation(_))));
    assert!(matches!(document.append_category(""), Err(SheetError::Validation(_))));
    assert!(matches!(document.append_section(" "), Err(SheetError::Validation(_))));
    assert_eq!(document.snapshot(), before);
}

#[test]
fn test_failed_write_reports_reason_and_keeps_document() {
    let dir = tempfile::tempdir().unwrap();
    // 父路径是一个普通文件，无法创建目录
    let blocker = write_file(dir.path(), "blocker", b"x");
    let path = blocker.join("Technische_Daten.txt");

    let document = Document::from_snapshot(sample_snapshot());
    let error = export_bundle(&document.snapshot(), &path, None, "_FR").unwrap_err();

    match error {
        SheetError::Io { reason, .. } => assert!(!reason.is_empty()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(document.snapshot(), sample_snapshot());
}

#[test]
fn test_failed_target_write_leaves_no_source_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daten.txt");
    // 译文文件的位置被一个目录占用
    std::fs::create_dir(dir.path().join("daten_FR.txt")).unwrap();

    let result = export_bundle(
        &sample_snapshot(),
        &path,
        Some(&IdentityTranslator as &dyn LabelTranslator),
        "_FR",
    );

    assert!(matches!(result, Err(SheetError::Io { .. })));
    assert!(!path.exists());
    let leftovers: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(leftovers, vec!["daten_FR.txt".to_string()]);
}

#[test]
fn test_failed_re_export_keeps_previous_source_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "daten.txt", b"alt");
    std::fs::create_dir(dir.path().join("daten_FR.txt")).unwrap();

    let result = export_bundle(
        &sample_snapshot(),
        &path,
        Some(&IdentityTranslator as &dyn LabelTranslator),
        "_FR",
    );

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "alt");
}

#[test]
fn test_scrape_outcomes_are_distinct() {
    let mapper = ScrapeMapper::from_config(&ScrapeConfig::default());

    let empty = mapper.map_items(&[], &CancelToken::new(), &mut NullProgress);
    assert_eq!(empty, ScrapeOutcome::Empty);
    assert!(!empty.is_error());

    let canceled = CancelToken::new();
    canceled.cancel();
    let outcome = mapper.map_items(&[ScrapedItem::entry("Typ", "CMOS")], &canceled, &mut NullProgress);
    assert_eq!(outcome, ScrapeOutcome::Canceled);
    assert!(!outcome.is_error());

    let failed = ScrapeOutcome::Failed(ScrapeError::Timeout("https://digitalkamera.de".to_string()));
    assert!(failed.is_error());
    assert_ne!(failed, ScrapeOutcome::Empty);
}

#[test]
fn test_url_validation_errors() {
    assert!(matches!(validate_url("", "digitalkamera.de"), Err(ScrapeError::InvalidUrl(_))));
    assert!(matches!(
        validate_url("file:///etc/passwd", "digitalkamera.de"),
        Err(ScrapeError::InvalidUrl(_))
    ));
    let error = validate_url("https://example.org/kamera", "digitalkamera.de").unwrap_err();
    assert!(error.to_string().contains("digitalkamera.de"));
}

#[test]
fn test_scrape_error_converts_into_sheet_error() {
    let error: SheetError = ScrapeError::MissingContainer("table.datenblatt".to_string()).into();
    assert!(matches!(error, SheetError::Scrape(ScrapeError::MissingContainer(_))));
}

#[test]
fn test_unavailable_engine_is_not_fatal() {
    let registry = EngineRegistry::new(test_config());
    assert!(!registry.is_ready());

    let error = registry.translate("Sucher").unwrap_err();
    assert!(matches!(error, TranslationError::EngineUnavailable(_)));
    assert!(!error.is_retryable());
}

#[test]
fn test_translation_error_classification() {
    assert!(TranslationError::NetworkError("reset".to_string()).is_retryable());
    assert!(TranslationError::TimeoutError("20s".to_string()).is_retryable());
    assert!(!TranslationError::ParseError("bad json".to_string()).is_retryable());
    assert_eq!(
        TranslationError::ConfigError("bad url".to_string()).severity(),
        ErrorSeverity::Critical
    );
    assert_eq!(
        TranslationError::EngineUnavailable("no engine".to_string()).category(),
        ErrorCategory::Service
    );
}

#[test]
fn test_export_of_empty_document_still_writes_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leer.txt");
    let report = export_bundle(&DocumentSnapshot::default(), &path, None, "_FR").unwrap();
    assert_eq!(report.rows_written, 0);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("<tbody>"));
    assert!(written.contains("SPECS_SNAPSHOT v2"));
}
