//! 翻译管线集成测试
//!
//! 词元保护、词典优先、无引擎降级、中转路由、失败降级，以及导出时的缺失翻译报告

use std::sync::Arc;

use specsheet::builders::export_table;
use specsheet::core::export_bundle;
use specsheet::document::{DocumentSnapshot, Row};
use specsheet::translation::{
    EngineRoute, IdentityTranslator, LabelTranslator, MachineTranslator, TranslationStatus,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{
    offline_translator, sample_snapshot, translator_with_engine, translator_with_route, FailingEngine,
    WordEngine,
};

#[test]
fn test_protected_range_survives_translation() {
    let engine = Arc::new(WordEngine::german_to_french());
    let translator = translator_with_engine(engine.clone());

    let translation = translator.translate_label("ISO 100-3200 Empfindlichkeit");
    assert_eq!(translation.text, "ISO 100-3200 Sensibilité");
    assert_eq!(translation.status, TranslationStatus::MachineTranslated);

    // 引擎只看到占位符
    for text in engine.call_texts() {
        assert!(!text.contains("ISO"), "engine saw protected token: {text}");
    }
}

#[test]
fn test_connectivity_acronym_survives_translation() {
    let engine = Arc::new(WordEngine::german_to_french());
    let translator = translator_with_engine(engine.clone());

    let translation = translator.translate_label("USB Type-C Anschluss");
    assert!(translation.text.starts_with("USB Type-C"));
    for text in engine.call_texts() {
        assert!(!text.contains("USB"));
    }
}

#[test]
fn test_dictionary_hit_without_engine() {
    let translation = offline_translator().translate_label("Blitzgerät");
    assert_eq!(translation.text, "Flash");
    assert!(translation.is_translated());
    assert!(!translation.is_missing());
}

#[test]
fn test_german_without_engine_is_flagged_missing() {
    let translation = offline_translator().translate_label("Irgendein Wort");
    assert_eq!(translation.text, "Irgendein Wort");
    assert_eq!(translation.status, TranslationStatus::EngineUnavailable);
    assert!(translation.is_missing());
}

#[test]
fn test_dictionary_bypasses_engine() {
    let engine = Arc::new(WordEngine::german_to_french());
    let translator = translator_with_engine(engine.clone());

    assert_eq!(translator.translate_label(" Sucher ").text, "Viseur");
    assert!(engine.call_texts().is_empty());
}

#[test]
fn test_pivot_route_translates_through_english() {
    let first = Arc::new(WordEngine::new(&[
        ("Der", "The"),
        ("Sucher", "viewfinder"),
        ("ist", "is"),
        ("hell", "bright"),
    ]));
    let second = Arc::new(WordEngine::new(&[
        ("The", "Le"),
        ("viewfinder", "viseur"),
        (" is ", " est "),
        ("bright", "lumineux"),
    ]));
    let translator = translator_with_route(EngineRoute::Pivot {
        first: first.clone() as Arc<dyn MachineTranslator>,
        second: second.clone() as Arc<dyn MachineTranslator>,
    });

    let translation = translator.translate_label("Der Sucher ist hell");
    assert_eq!(translation.text, "Le viseur est lumineux");

    let calls = first.calls.lock().unwrap();
    assert_eq!((calls[0].1.as_str(), calls[0].2.as_str()), ("de", "en"));
    let calls = second.calls.lock().unwrap();
    assert_eq!((calls[0].1.as_str(), calls[0].2.as_str()), ("en", "fr"));
}

#[test]
fn test_failing_engine_degrades_to_original() {
    let translator = translator_with_engine(Arc::new(FailingEngine));
    let translation = translator.translate_label("Irgendein Wort");
    assert_eq!(translation.text, "Irgendein Wort");
    assert_eq!(translation.status, TranslationStatus::Failed);
    assert!(translation.is_missing());
}

#[test]
fn test_fragment_translation_keeps_markup() {
    let translator = translator_with_engine(Arc::new(WordEngine::german_to_french()));
    let translation = translator.translate_fragment("<b>Kamera mit Sucher</b><br />Blitzgerät");
    assert_eq!(translation.text, "<b>Appareil avec Viseur</b><br>Flash");
}

#[test]
fn test_missing_report_lists_untranslated_labels() {
    let snapshot = DocumentSnapshot {
        rows: vec![
            Row::section("Sensor"),
            Row::entry("Gewicht", "650 g"),
            Row::entry("Irgendein Wort", ""),
        ],
        ..DocumentSnapshot::default()
    };

    let output = export_table(&snapshot, &offline_translator());
    assert!(output.html.contains("<th>Catégorie</th>"));
    assert!(output.html.contains("<th>Détails</th>"));
    assert!(output.html.contains(r#"<th class="section" colspan="2">Capteur</th>"#));
    assert!(output.html.contains("<th>Poids</th>"));
    assert!(output.html.contains("<td>650 g</td>"));
    assert_eq!(output.missing, vec!["Irgendein Wort".to_string()]);
}

#[test]
fn test_source_and_target_files_have_same_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Technische_Daten.txt");
    let translator = offline_translator();

    let report = export_bundle(
        &sample_snapshot(),
        &path,
        Some(&translator as &dyn LabelTranslator),
        "_FR",
    )
    .unwrap();

    let target_path = report.target_path.clone().unwrap();
    assert_eq!(target_path, dir.path().join("Technische_Daten_FR.txt"));

    let source = std::fs::read_to_string(&path).unwrap();
    let target = std::fs::read_to_string(&target_path).unwrap();
    assert_eq!(source.matches("<tr").count(), target.matches("<tr").count());
    assert_eq!(
        source,
        export_table(&sample_snapshot(), &IdentityTranslator).html
    );
}
