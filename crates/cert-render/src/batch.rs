//! Batch generation over a data source

use crate::config::EngineConfig;
use crate::export::Exporter;
use crate::glyphs::FontBook;
use crate::{RenderError, Result};
use cert_pdf::PdfDocument;
use cert_template::{substitute_with, DataSource, ImageResolver, Row, Template};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::rc::Rc;

/// Placeholder always available in filename templates (1-based row number)
const INDEX_FIELD: &str = "index";

/// Output layout of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// One document, one page per row
    Combined,
    /// One document per row
    Separate,
}

/// Reported after each row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

/// One row's document in [`BatchMode::Separate`]
#[derive(Debug)]
pub struct SeparateDocument {
    /// PDF bytes, or the error that stopped this row
    pub document: Result<Vec<u8>>,
    pub filename: String,
    /// 0-based position in the data source
    pub row_index: usize,
    pub row: Row,
}

#[derive(Debug)]
pub enum BatchOutput {
    Combined(Vec<u8>),
    Separate(Vec<SeparateDocument>),
}

impl BatchOutput {
    /// Number of documents produced (failed rows included)
    pub fn document_count(&self) -> usize {
        match self {
            BatchOutput::Combined(_) => 1,
            BatchOutput::Separate(documents) => documents.len(),
        }
    }
}

/// Build a filename from a `{{field}}` template
///
/// `{{index}}` is the 1-based row number. Path separators and control
/// characters become `_`, and `.extension` is appended when missing.
pub fn render_filename(template: &str, row: &Row, index: usize, extension: &str) -> String {
    let name = substitute_with(template, |field| {
        if field == INDEX_FIELD {
            Some(Cow::Owned(index.to_string()))
        } else {
            row.get(field).map(Cow::Borrowed)
        }
    });

    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    let stem = if sanitized.is_empty() {
        format!("certificate-{index}")
    } else {
        sanitized
    };

    let extension = extension.trim().trim_start_matches('.');
    if extension.is_empty() {
        return stem;
    }
    let suffix = format!(".{extension}");
    if stem.to_lowercase().ends_with(&suffix.to_lowercase()) {
        stem
    } else {
        format!("{stem}{suffix}")
    }
}

/// Make `filename` unique among `taken` with `-2`, `-3`, ... suffixes
fn dedupe(filename: String, extension: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(filename.clone()) {
        return filename;
    }

    let extension = extension.trim().trim_start_matches('.');
    let split = if extension.is_empty() {
        None
    } else {
        let suffix_len = extension.len() + 1;
        filename
            .len()
            .checked_sub(suffix_len)
            .filter(|&at| filename.is_char_boundary(at))
    };
    let (stem, suffix) = match split {
        Some(at) => filename.split_at(at),
        None => (filename.as_str(), ""),
    };

    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}{suffix}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Generates certificates for every row of a data source
#[derive(Clone)]
pub struct BatchController {
    config: EngineConfig,
    exporter: Exporter,
}

impl BatchController {
    pub fn new(config: EngineConfig) -> Self {
        let exporter = Exporter::new().with_raster_multiplier(config.raster_multiplier);
        Self { config, exporter }
    }

    pub fn with_resolver(mut self, resolver: Rc<dyn ImageResolver>) -> Self {
        self.exporter = self.exporter.with_resolver(resolver);
        self
    }

    pub fn with_fonts(mut self, fonts: Rc<FontBook>) -> Self {
        self.exporter = self.exporter.with_fonts(fonts);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn generate(&self, template: &Template, data: &DataSource, mode: BatchMode) -> Result<BatchOutput> {
        self.generate_with_progress(template, data, mode, |_| {})
    }

    /// Generate, calling `progress` after each row
    ///
    /// In combined mode any row failure aborts the batch. In separate mode
    /// a failing row keeps its error and later rows still run.
    pub fn generate_with_progress<F>(
        &self,
        template: &Template,
        data: &DataSource,
        mode: BatchMode,
        mut progress: F,
    ) -> Result<BatchOutput>
    where
        F: FnMut(BatchProgress),
    {
        if data.headers.is_empty() {
            return Err(RenderError::Input("Data source has no columns".to_string()));
        }
        if data.rows.is_empty() {
            return Err(RenderError::Input("Data source has no rows".to_string()));
        }

        let total = data.rows.len();
        log::debug!("Generating {total} certificates ({mode:?}) from '{}'", template.name);

        match mode {
            BatchMode::Combined => {
                let mut doc = PdfDocument::new();
                for (i, row) in data.rows.iter().enumerate() {
                    self.exporter.render_page(&mut doc, template, Some(row))?;
                    log::debug!("Row {}/{total} rendered", i + 1);
                    progress(BatchProgress {
                        completed: i + 1,
                        total,
                    });
                }
                Ok(BatchOutput::Combined(doc.to_bytes()?))
            }
            BatchMode::Separate => {
                let mut taken = HashSet::new();
                let mut documents = Vec::with_capacity(total);

                for (i, row) in data.rows.iter().enumerate() {
                    let document = self.exporter.render_single(template, Some(row));
                    if let Err(e) = &document {
                        log::warn!("Row {} failed: {e}", i + 1);
                    }

                    let filename = render_filename(
                        &self.config.filename_template,
                        row,
                        i + 1,
                        &self.config.file_extension,
                    );
                    documents.push(SeparateDocument {
                        document,
                        filename: dedupe(filename, &self.config.file_extension, &mut taken),
                        row_index: i,
                        row: row.clone(),
                    });

                    log::debug!("Row {}/{total} rendered", i + 1);
                    progress(BatchProgress {
                        completed: i + 1,
                        total,
                    });
                }
                Ok(BatchOutput::Separate(documents))
            }
        }
    }
}

/// Generate with a default controller for `config`
pub fn generate(
    template: &Template,
    data: &DataSource,
    mode: BatchMode,
    config: &EngineConfig,
) -> Result<BatchOutput> {
    BatchController::new(config.clone()).generate(template, data, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_filename_substitution() {
        let r = row(&[("name", "Ana Lima")]);
        assert_eq!(render_filename("{{name}}", &r, 1, "pdf"), "Ana Lima.pdf");
        assert_eq!(render_filename("cert-{{ index }}", &r, 7, "pdf"), "cert-7.pdf");
        assert_eq!(render_filename("{{name}}.PDF", &r, 1, "pdf"), "Ana Lima.PDF");
        assert_eq!(render_filename("{{missing}}", &r, 1, "pdf"), "{{missing}}.pdf");
    }

    #[test]
    fn test_filename_sanitizing() {
        let r = row(&[("name", "a/b\\c\td")]);
        assert_eq!(render_filename("{{name}}", &r, 1, "pdf"), "a_b_c_d.pdf");

        let blank = row(&[("name", "  ")]);
        assert_eq!(render_filename("{{name}}", &blank, 3, ".pdf"), "certificate-3.pdf");
    }

    #[test]
    fn test_dedupe_only_on_collision() {
        let mut taken = HashSet::new();
        assert_eq!(dedupe("a.pdf".into(), "pdf", &mut taken), "a.pdf");
        assert_eq!(dedupe("b.pdf".into(), "pdf", &mut taken), "b.pdf");
        assert_eq!(dedupe("a.pdf".into(), "pdf", &mut taken), "a-2.pdf");
        assert_eq!(dedupe("a.pdf".into(), "pdf", &mut taken), "a-3.pdf");
        assert_eq!(dedupe("noext".into(), "", &mut taken), "noext");
        assert_eq!(dedupe("noext".into(), "", &mut taken), "noext-2");
    }

    #[test]
    fn test_empty_data_is_rejected() {
        let template = Template::new("t");
        let data = DataSource {
            headers: vec!["name".to_string()],
            rows: Vec::new(),
        };
        for mode in [BatchMode::Combined, BatchMode::Separate] {
            assert!(matches!(
                generate(&template, &data, mode, &EngineConfig::default()),
                Err(RenderError::Input(_))
            ));
        }
    }

    #[test]
    fn test_progress_reports_every_row() {
        let template = Template::new("t");
        let data = DataSource::from_records(
            vec!["name".to_string()],
            vec![vec!["a".into()], vec!["b".into()], vec!["c".into()]],
        )
        .unwrap();

        let mut seen = Vec::new();
        let output = BatchController::new(EngineConfig::default())
            .generate_with_progress(&template, &data, BatchMode::Separate, |p| seen.push(p))
            .unwrap();

        assert_eq!(output.document_count(), 3);
        assert_eq!(seen.last(), Some(&BatchProgress { completed: 3, total: 3 }));
        assert_eq!(seen.len(), 3);
    }
}
