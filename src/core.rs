use chrono::{SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::builders::table::{export_table, ExportOutput};
use crate::document::{Document, DocumentSnapshot};
use crate::parsers::html::decode_document_bytes;
use crate::parsers::import::import_document;
use crate::scrape::ScrapeError;
use crate::translation::{IdentityTranslator, LabelTranslator, TranslationError};

/// Represents errors that can occur while editing, exporting or importing a sheet
#[derive(Debug, Error)]
pub enum SheetError {
    /// A required field was empty on a manual add; nothing was mutated
    #[error("validation failed: {0}")]
    Validation(String),

    /// The input file could not be understood at all
    #[error("could not load document: {0}")]
    Parse(String),

    /// Reading or writing a file failed
    #[error("I/O error on \"{path}\": {reason}")]
    Io { path: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    /// A background job could not start or ended without reporting a result
    #[error("background job failed: {0}")]
    Job(String),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

impl SheetError {
    pub fn io(path: &Path, error: std::io::Error) -> Self {
        SheetError::Io {
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }
}

pub type SheetResult<T> = Result<T, SheetError>;

/// Result of writing an export bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub source_path: PathBuf,
    pub target_path: Option<PathBuf>,
    pub rows_written: usize,
    /// Labels that should have been translated but were not
    pub missing_translations: Vec<String>,
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_GREEN: &str = "\x1b[32m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Writes the source-language file and, when a translator is given, its
/// translated counterpart next to it.
///
/// Both files are rendered and staged as hidden `.part` files first, and are
/// only moved into place once every write has succeeded. A failure leaves the
/// previous files (if any) untouched and no staged files behind.
pub fn export_bundle(
    snapshot: &DocumentSnapshot,
    source_path: &Path,
    translator: Option<&dyn LabelTranslator>,
    target_suffix: &str,
) -> SheetResult<ExportReport> {
    let source: ExportOutput = export_table(snapshot, &IdentityTranslator);
    let target: Option<(PathBuf, ExportOutput)> = translator.map(|translator| {
        (
            target_path_for(source_path, target_suffix),
            export_table(snapshot, translator),
        )
    });

    let mut staged = vec![stage_text_file(source_path, &source.html)?];
    if let Some((target_path, target)) = &target {
        match stage_text_file(target_path, &target.html) {
            Ok(file) => staged.push(file),
            Err(e) => {
                discard_staged(&staged);
                return Err(e);
            }
        }
    }

    // Target first, so a source file on disk means the whole bundle landed
    for (index, file) in staged.iter().enumerate().rev() {
        if let Err(e) = fs::rename(&file.staging, &file.path) {
            discard_staged(&staged[..=index]);
            for committed in &staged[index + 1..] {
                let _ = fs::remove_file(&committed.path);
            }
            return Err(SheetError::io(&file.path, e));
        }
    }
    tracing::info!("已写入导出文件: {}", source_path.display());

    let mut report = ExportReport {
        source_path: source_path.to_path_buf(),
        target_path: None,
        rows_written: source.rows_written,
        missing_translations: Vec::new(),
    };

    if let Some((target_path, target)) = target {
        tracing::info!(
            "已写入翻译文件: {} ({} 条未翻译)",
            target_path.display(),
            target.missing.len()
        );
        report.target_path = Some(target_path);
        report.missing_translations = target.missing;
    }

    Ok(report)
}

struct StagedFile {
    path: PathBuf,
    staging: PathBuf,
}

fn staging_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.part"))
}

fn stage_text_file(path: &Path, contents: &str) -> SheetResult<StagedFile> {
    let staging = staging_path_for(path);
    if let Err(e) = write_text_file(&staging, contents) {
        let _ = fs::remove_file(&staging);
        return Err(match e {
            SheetError::Io { reason, .. } => SheetError::Io {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        });
    }
    Ok(StagedFile {
        path: path.to_path_buf(),
        staging,
    })
}

fn discard_staged(files: &[StagedFile]) {
    for file in files {
        if let Err(e) = fs::remove_file(&file.staging) {
            tracing::debug!("无法删除临时文件 {}: {}", file.staging.display(), e);
        }
    }
}

/// Reads a previously exported (or hand-written legacy) file into a document
pub fn load_document_file(path: &Path) -> SheetResult<Document> {
    let data = fs::read(path).map_err(|e| SheetError::io(path, e))?;
    let text = decode_document_bytes(&data);
    let snapshot = import_document(&text)?;
    Ok(Document::from_snapshot(snapshot))
}

fn write_text_file(path: &Path, contents: &str) -> SheetResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| SheetError::io(parent, e))?;
        }
    }
    fs::write(path, contents).map_err(|e| SheetError::io(path, e))
}

/// Derives the translated counterpart's path: `Daten.txt` becomes `Daten_FR.txt`
pub fn target_path_for(source_path: &Path, suffix: &str) -> PathBuf {
    let stem = source_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match source_path.extension() {
        Some(extension) => format!("{stem}{suffix}.{}", extension.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    source_path.with_file_name(file_name)
}

/// Turns a free-form title into a safe file stem
///
/// Anything other than alphanumerics, space, `-` and `_` becomes `_`, runs of
/// whitespace collapse into a single `_`, and an empty result falls back to
/// `default_title`.
pub fn sanitize_file_stem(title: &str, default_title: &str) -> String {
    let replaced: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = replaced.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        default_title.to_string()
    } else {
        stem
    }
}

/// Expands `%title%`, `%timestamp%` and `%lang%` in an output path template
pub fn format_output_path(path: &str, title: &str, default_title: &str, lang: &str) -> String {
    let datetime: &str = &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    path.replace("%timestamp%", &datetime.replace(':', "_"))
        .replace("%title%", &sanitize_file_stem(title, default_title))
        .replace("%lang%", lang)
}

pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}

pub fn print_info_message(msg: &str) {
    eprintln!("{ANSI_COLOR_GREEN}{msg}{ANSI_COLOR_RESET}");
}
