use anyhow::{Context, Result};
use glob::Pattern;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::fs::FileSystem;
use crate::logging;
use crate::markup::{self, FragmentKind, ScriptFragment};
use crate::recognizer::{recognize, ExtractedUnit, FunctionRoles};
use crate::syntax::{self, Dialect, SyntaxFailure};

/// How a source unit is scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// JavaScript / TypeScript, recognized directly
    Script,
    /// HTML-like, scanned for embedded script and `translate` markers
    Markup,
}

/// Error encountered while reading a source unit
#[derive(Debug, Clone)]
pub struct ExtractionError {
    pub file_path: String,
    pub message: String,
}

/// A source unit that was skipped because it does not parse
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub file_path: String,
    pub failure: SyntaxFailure,
}

/// Result of extraction from multiple files, in processing order
#[derive(Debug, Default)]
pub struct ExtractionResult {
    pub files: Vec<(String, Vec<ExtractedUnit>)>,
    pub skipped: Vec<SkippedFile>,
    pub errors: Vec<ExtractionError>,
}

impl ExtractionResult {
    pub fn skip_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Result type for a single file extraction (used internally for lock-free processing)
enum FileExtractionResult {
    Success {
        file_path: String,
        units: Vec<ExtractedUnit>,
    },
    Skipped(SkippedFile),
    Error(ExtractionError),
}

/// Turns source units into extracted messages
#[derive(Debug, Clone)]
pub struct Extractor {
    roles: FunctionRoles,
    markup_extensions: Vec<String>,
}

impl Extractor {
    pub fn new(roles: FunctionRoles, markup_extensions: Vec<String>) -> Self {
        Self {
            roles,
            markup_extensions,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let roles = config.function_roles()?;
        Ok(Self::new(roles, config.markup_extensions.clone()))
    }

    pub fn content_type(&self, path: &Path) -> ContentType {
        let is_markup = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.markup_extensions
                    .iter()
                    .any(|m| m.trim_start_matches('.').eq_ignore_ascii_case(ext))
            });
        if is_markup {
            ContentType::Markup
        } else {
            ContentType::Script
        }
    }

    /// Extract messages from one source unit.
    ///
    /// Units that fail to parse contribute nothing and return the failure
    /// so the caller can count the skip. For markup this covers its
    /// `<script>` blocks.
    pub fn extract_source(
        &self,
        source: &str,
        path: &Path,
        content_type: ContentType,
    ) -> Result<Vec<ExtractedUnit>, SyntaxFailure> {
        match content_type {
            ContentType::Script => {
                let tokens = syntax::tokenize(source, Dialect::from_path(path))?;
                Ok(recognize(&tokens, &self.roles))
            }
            ContentType::Markup => self.extract_markup(source),
        }
    }

    fn extract_markup(&self, source: &str) -> Result<Vec<ExtractedUnit>, SyntaxFailure> {
        let scan = markup::scan(source);
        let mut units = scan.messages;
        for fragment in &scan.fragments {
            let offset = fragment.line - 1;
            let fragment_units = self.extract_fragment(fragment).map_err(|mut failure| {
                failure.line += offset;
                failure
            })?;
            units.extend(fragment_units.into_iter().map(|mut unit| {
                unit.line += offset;
                unit
            }));
        }
        // markup messages and fragments interleave by position
        units.sort_by_key(|unit| unit.line);
        Ok(units)
    }

    /// Units of one embedded fragment, with fragment-relative lines.
    ///
    /// `<script>` blocks must parse. Attribute values and interpolations are
    /// tried as an expression, then as statements; ones that are neither
    /// (`v-for="item of items"`, slot props) are dropped.
    fn extract_fragment(
        &self,
        fragment: &ScriptFragment<'_>,
    ) -> Result<Vec<ExtractedUnit>, SyntaxFailure> {
        match fragment.kind {
            FragmentKind::Script(dialect) => {
                let tokens = syntax::tokenize(fragment.text, dialect)?;
                Ok(recognize(&tokens, &self.roles))
            }
            FragmentKind::Expression => {
                let wrapped = format!("({})", fragment.text);
                let tokens = syntax::tokenize(&wrapped, Dialect::JavaScript)
                    .or_else(|_| syntax::tokenize(fragment.text, Dialect::JavaScript));
                match tokens {
                    Ok(tokens) => Ok(recognize(&tokens, &self.roles)),
                    Err(failure) => {
                        logging::debug(format_args!(
                            "line {}: skipping markup expression: {}",
                            fragment.line, failure
                        ));
                        Ok(Vec::new())
                    }
                }
            }
        }
    }

    fn extract_file<F: FileSystem>(&self, path: &Path, fs: &F) -> FileExtractionResult {
        let file_path = reference_path(path);
        let source = match fs
            .read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
        {
            Ok(source) => source,
            Err(e) => {
                return FileExtractionResult::Error(ExtractionError {
                    file_path,
                    message: format!("{:#}", e),
                })
            }
        };

        match self.extract_source(&source, path, self.content_type(path)) {
            Ok(units) => {
                logging::debug(format_args!("{}: {} message(s)", file_path, units.len()));
                FileExtractionResult::Success { file_path, units }
            }
            Err(failure) => FileExtractionResult::Skipped(SkippedFile { file_path, failure }),
        }
    }

    /// Extract from an explicit list of files.
    ///
    /// Files are recognized in parallel; results keep the order of `paths`.
    pub fn extract_paths<F: FileSystem>(&self, paths: &[PathBuf], fs: &F) -> ExtractionResult {
        let file_results: Vec<FileExtractionResult> = paths
            .par_iter()
            .map(|path| self.extract_file(path, fs))
            .collect();

        let mut result = ExtractionResult::default();
        for file_result in file_results {
            match file_result {
                FileExtractionResult::Success { file_path, units } => {
                    result.files.push((file_path, units));
                }
                FileExtractionResult::Skipped(skipped) => result.skipped.push(skipped),
                FileExtractionResult::Error(err) => result.errors.push(err),
            }
        }
        result
    }

    /// Extract from every file matched by `patterns` and not by `ignore_patterns`.
    pub fn extract_from_glob<F: FileSystem>(
        &self,
        patterns: &[String],
        ignore_patterns: &[String],
        fs: &F,
    ) -> Result<ExtractionResult> {
        let mut glob_errors = Vec::new();
        let paths = collect_paths(patterns, ignore_patterns, &mut glob_errors)?;
        logging::debug(format_args!("{} file(s) matched", paths.len()));

        let mut result = self.extract_paths(&paths, fs);
        result.errors.extend(glob_errors);
        Ok(result)
    }
}

/// Expand input globs into a sorted, de-duplicated file list.
fn collect_paths(
    patterns: &[String],
    ignore_patterns: &[String],
    errors: &mut Vec<ExtractionError>,
) -> Result<Vec<PathBuf>> {
    let ignore_matchers = compile_ignore_patterns(ignore_patterns)?;
    let mut paths = Vec::new();

    for pattern in patterns.iter().flat_map(|p| expand_braces(p)) {
        let matches =
            glob::glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        for entry in matches {
            match entry {
                Ok(path) => {
                    if path.is_file() && !matches_ignore_path(&path, &ignore_matchers) {
                        paths.push(path);
                    }
                }
                Err(e) => errors.push(ExtractionError {
                    file_path: pattern.clone(),
                    message: format!("Glob error: {}", e),
                }),
            }
        }
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Expand `{a,b}` alternatives, which `glob` does not support.
/// Nested groups are expanded from the innermost outwards.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(close) = pattern.find('}') else {
        return vec![pattern.to_string()];
    };
    let Some(open) = pattern[..close].rfind('{') else {
        return vec![pattern.to_string()];
    };
    let (prefix, suffix) = (&pattern[..open], &pattern[close + 1..]);
    pattern[open + 1..close]
        .split(',')
        .flat_map(|alternative| expand_braces(&format!("{}{}{}", prefix, alternative, suffix)))
        .collect()
}

/// Path as written in `#:` references: `/`-separated, without a leading `./`
pub fn reference_path(path: &Path) -> String {
    let display = path.to_string_lossy().replace('\\', "/");
    match display.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => display,
    }
}

fn matches_ignore_path(path: &Path, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|pattern| pattern.matches_path(path))
}

fn compile_ignore_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    let mut compiled = Vec::new();
    for pattern in patterns.iter().flat_map(|p| expand_braces(p)) {
        let matcher = Pattern::new(&pattern)
            .with_context(|| format!("Invalid ignore glob pattern: {}", pattern))?;
        compiled.push(matcher);
    }
    Ok(compiled)
}
