// 集成测试公共模块
//
// 提供测试辅助工具和共享功能：假的翻译引擎、示例文档和临时文件

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use specsheet::config::TranslationConfig;
use specsheet::document::{DocumentSnapshot, Row};
use specsheet::translation::{
    Dictionary, EngineRegistry, EngineRoute, MachineTranslator, PostEditor, TranslationError,
    TranslationResult, Translator,
};

/// 按单词表替换的假引擎，记录每次调用 `(text, source, target)`
pub struct WordEngine {
    words: Vec<(String, String)>,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl WordEngine {
    pub fn new(words: &[(&str, &str)]) -> Self {
        Self {
            words: words
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 德语到法语的常用词
    pub fn german_to_french() -> Self {
        Self::new(&[
            ("Empfindlichkeit", "Sensibilité"),
            ("Anschluss", "Connecteur"),
            ("Kamera", "Appareil"),
            ("Sucher", "Viseur"),
            (" mit ", " avec "),
        ])
    }

    pub fn call_texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _, _)| text.clone())
            .collect()
    }
}

impl MachineTranslator for WordEngine {
    fn name(&self) -> &str {
        "words"
    }

    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResult<String> {
        self.calls.lock().unwrap().push((
            text.to_string(),
            source_lang.to_string(),
            target_lang.to_string(),
        ));

        let mut translated = text.to_string();
        for (from, to) in &self.words {
            translated = translated.replace(from.as_str(), to.as_str());
        }
        Ok(translated)
    }
}

/// 总是失败的引擎
pub struct FailingEngine;

impl MachineTranslator for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    fn translate(&self, _text: &str, _source_lang: &str, _target_lang: &str) -> TranslationResult<String> {
        Err(TranslationError::NetworkError("connection refused".to_string()))
    }
}

/// 不依赖统计模型的翻译配置，测试结果可预测
pub fn test_config() -> TranslationConfig {
    TranslationConfig {
        use_statistical_detector: false,
        ..TranslationConfig::default()
    }
}

/// 没有机器翻译引擎的翻译器
pub fn offline_translator() -> Translator {
    Translator::from_config(test_config())
}

/// 使用指定路由的翻译器（内置词典，无译后编辑）
pub fn translator_with_route(route: EngineRoute) -> Translator {
    let registry = EngineRegistry::with_route(test_config(), route);
    Translator::with_parts(Arc::new(registry), Dictionary::builtin(), PostEditor::empty())
}

pub fn translator_with_engine(engine: Arc<dyn MachineTranslator>) -> Translator {
    translator_with_route(EngineRoute::Direct(engine))
}

/// 包含三种行和需要转义内容的示例文档
pub fn sample_snapshot() -> DocumentSnapshot {
    DocumentSnapshot {
        header_left: "Kategorie".to_string(),
        header_right: "Details".to_string(),
        rows: vec![
            Row::section("Sensor"),
            Row::category("Bild"),
            Row::entry("Auflösung", "<b>24</b> MP"),
            Row::entry("A & B <C>", "x &amp; y"),
            Row::entry("Besonderheiten", "<ul><li>Wetterfest</li><li>IBIS</li></ul>"),
            Row::section("Video"),
            Row::entry("Formate", "MP4<br />MOV"),
        ],
    }
}

/// 表格部分（样式块 + 表格），不含快照注释
pub fn table_part(html: &str) -> &str {
    match html.find("<!-- SPECS_SNAPSHOT") {
        Some(index) => &html[..index],
        None => html,
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
