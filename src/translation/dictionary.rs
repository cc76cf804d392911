//! 标签词典
//!
//! 内置的德法对照表加上可选的外部覆盖文件（扁平的 JSON 字符串映射）。
//! 外部条目优先于内置条目。

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use super::error::{TranslationError, TranslationResult};

/// 内置德法对照表
const BUILTIN_LABELS: &[(&str, &str)] = &[
    ("Kategorie", "Catégorie"),
    ("Details", "Détails"),
    ("Technische Daten", "Caractéristiques techniques"),
    ("Allgemein", "Général"),
    ("Hersteller", "Fabricant"),
    ("Modell", "Modèle"),
    ("Farbe", "Couleur"),
    ("Sensor", "Capteur"),
    ("Bildsensor", "Capteur d'image"),
    ("Sensorgröße", "Taille du capteur"),
    ("Auflösung", "Résolution"),
    ("Effektive Auflösung", "Résolution effective"),
    ("Videoauflösung", "Résolution vidéo"),
    ("Bildformate", "Formats d'image"),
    ("Videoformate", "Formats vidéo"),
    ("Seitenverhältnis", "Format d'image"),
    ("Objektiv", "Objectif"),
    ("Objektivanschluss", "Monture d'objectif"),
    ("Brennweite", "Focale"),
    ("Blende", "Ouverture"),
    ("Optik", "Optique"),
    ("Fokussierung", "Mise au point"),
    ("Autofokus", "Autofocus"),
    ("Belichtung", "Exposition"),
    ("Belichtungsmessung", "Mesure de l'exposition"),
    ("Belichtungskorrektur", "Correction d'exposition"),
    ("Verschlusszeit", "Vitesse d'obturation"),
    ("Verschlusszeiten", "Vitesses d'obturation"),
    ("Empfindlichkeit", "Sensibilité"),
    ("Weißabgleich", "Balance des blancs"),
    ("Bildstabilisator", "Stabilisateur d'image"),
    ("Serienbildfunktion", "Prise de vue en rafale"),
    ("Selbstauslöser", "Retardateur"),
    ("Sucher", "Viseur"),
    ("Monitor", "Écran"),
    ("Bildschirm", "Écran"),
    ("Blitz", "Flash"),
    ("Blitzgerät", "Flash"),
    ("Blitzschuh", "Griffe flash"),
    ("Gesichtserkennung", "Détection des visages"),
    ("Video", "Vidéo"),
    ("Foto", "Photo"),
    ("Audio", "Audio"),
    ("Mikrofon", "Microphone"),
    ("Lautsprecher", "Haut-parleur"),
    ("Speicherkarte", "Carte mémoire"),
    ("Speichermedien", "Supports de stockage"),
    ("Anschlüsse", "Connectique"),
    ("Schnittstellen", "Interfaces"),
    ("Drahtlos", "Sans fil"),
    ("Stromversorgung", "Alimentation"),
    ("Akku", "Batterie"),
    ("Akkulaufzeit", "Autonomie de la batterie"),
    ("Gehäuse", "Boîtier"),
    ("Abmessungen", "Dimensions"),
    ("Gewicht", "Poids"),
    ("Wetterschutz", "Protection contre les intempéries"),
    ("Ausstattung", "Équipement"),
    ("Besonderheiten", "Particularités"),
    ("Lieferumfang", "Contenu de la livraison"),
    ("Sonstiges", "Divers"),
    ("Ja", "Oui"),
    ("Nein", "Non"),
];

/// 合并后的标签词典
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Dictionary {
    /// 只包含内置条目的词典
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_LABELS
                .iter()
                .map(|(source, target)| (source.to_string(), target.to_string()))
                .collect(),
        }
    }

    /// 内置条目加上外部覆盖文件；文件缺失或无效时只记录警告
    pub fn with_overrides(path: Option<&Path>) -> Self {
        let mut dictionary = Self::builtin();
        if let Some(path) = path {
            match load_string_map(path) {
                Ok(overrides) => {
                    tracing::info!("已加载 {} 条词典覆盖: {}", overrides.len(), path.display());
                    dictionary.extend(overrides);
                }
                Err(e) => tracing::warn!("词典覆盖文件不可用，仅使用内置词典: {}", e),
            }
        }
        dictionary
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        for (source, target) in entries {
            let source = source.trim().to_string();
            if source.is_empty() {
                continue;
            }
            self.entries.insert(source, target);
        }
    }

    /// 精确查找（忽略首尾空白）
    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.entries.get(text.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 读取扁平的 JSON 字符串映射，非字符串值被跳过
pub(crate) fn load_string_map(path: &Path) -> TranslationResult<Vec<(String, String)>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TranslationError::ConfigError(format!("读取 {} 失败: {}", path.display(), e))
    })?;

    let value: Value = serde_json::from_str(&content)
        .map_err(|e| TranslationError::from(e).with_context(path.display()))?;

    let Value::Object(map) = value else {
        return Err(TranslationError::ParseError(format!(
            "{} 不是 JSON 对象",
            path.display()
        )));
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(target) => Some((key, target)),
            other => {
                tracing::warn!("忽略非字符串条目 {:?}: {}", key, other);
                None
            }
        })
        .collect())
}
