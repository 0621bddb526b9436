//! Slide deck loading.
//!
//! A `.pptx` file is a zip container; slide text lives in the `<a:t>` runs of
//! `ppt/slides/slideN.xml`. Layout, notes and images are ignored.

use super::{decode_entities, SourceDocument, SourceKind};
use crate::error::{CodeeError, Result};
use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Loads `.pptx` decks from disk.
pub struct SlideDeckLoader {
    slide_name: Regex,
    paragraph: Regex,
    text_run: Regex,
    core_title: Regex,
}

impl SlideDeckLoader {
    pub fn new() -> Self {
        Self {
            slide_name: Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("Invalid regex"),
            paragraph: Regex::new(r"(?s)<a:p>.*?</a:p>|<a:p/>").expect("Invalid regex"),
            text_run: Regex::new(r"(?s)<a:t(?:\s[^>]*)?>(.*?)</a:t>").expect("Invalid regex"),
            core_title: Regex::new(r"(?s)<dc:title>(.*?)</dc:title>").expect("Invalid regex"),
        }
    }

    /// Load every `.pptx` directly inside `dir`, sorted by file name.
    ///
    /// A missing directory or an unreadable deck aborts the whole load.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<SourceDocument>> {
        let entries = std::fs::read_dir(dir).map_err(|e| CodeeError::SourceLoad {
            source_id: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pptx"))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            warn!("No .pptx files found in {}", dir.display());
        }

        let docs = paths
            .iter()
            .map(|path| self.load_file(path))
            .collect::<Result<Vec<_>>>()?;

        info!("Loaded {} slide decks", docs.len());
        Ok(docs)
    }

    /// Load a single deck.
    pub fn load_file(&self, path: &Path) -> Result<SourceDocument> {
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let load_err = |reason: String| CodeeError::SourceLoad {
            source_id: source_id.clone(),
            reason,
        };

        let file = std::fs::File::open(path).map_err(|e| load_err(e.to_string()))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| load_err(e.to_string()))?;

        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| {
                let caps = self.slide_name.captures(name)?;
                let number = caps[1].parse::<u32>().ok()?;
                Some((number, name.to_string()))
            })
            .collect();
        slides.sort_by_key(|(number, _)| *number);

        let mut slide_texts = Vec::with_capacity(slides.len());
        for (_, name) in &slides {
            let xml = read_entry(&mut archive, name).map_err(|e| load_err(e.to_string()))?;
            let text = self.extract_text(&xml);
            if !text.is_empty() {
                slide_texts.push(text);
            }
        }

        let title = read_entry(&mut archive, "docProps/core.xml")
            .ok()
            .and_then(|xml| {
                self.core_title
                    .captures(&xml)
                    .map(|c| decode_entities(c[1].trim()))
            })
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| source_id.clone())
            });

        debug!("Deck {} has {} slides with text", source_id, slide_texts.len());

        Ok(SourceDocument {
            source_id,
            kind: SourceKind::Slide,
            title,
            origin: path.display().to_string(),
            text: slide_texts.join("\n\n"),
        })
    }

    /// Extract the text of one slide, one line per paragraph.
    fn extract_text(&self, xml: &str) -> String {
        self.paragraph
            .find_iter(xml)
            .map(|para| {
                self.text_run
                    .captures_iter(para.as_str())
                    .map(|run| decode_entities(&run[1]))
                    .collect::<String>()
            })
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for SlideDeckLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_entry(archive: &mut zip::ZipArchive<std::fs::File>, name: &str) -> Result<String> {
    let mut entry = archive.by_name(name)?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Build slide XML. Paragraphs are separated by `\n`, runs within a
    /// paragraph by `|`.
    fn slide_xml(slide: &str) -> String {
        let body: String = slide
            .split('\n')
            .map(|para| {
                let runs: String = para
                    .split('|')
                    .map(|r| format!("<a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r>", r))
                    .collect();
                format!("<a:p>{}</a:p>", runs)
            })
            .collect();
        format!(
            "<?xml version=\"1.0\"?><p:sld><p:cSld><p:spTree><p:sp><p:txBody>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>",
            body
        )
    }

    /// Write a minimal deck with one entry per slide.
    pub(crate) fn write_deck(path: &Path, title: Option<&str>, slides: &[&str]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();

        // Written out of order to check numeric sorting
        for (i, slide) in slides.iter().enumerate().rev() {
            zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(slide_xml(slide).as_bytes()).unwrap();
        }

        if let Some(title) = title {
            zip.start_file("docProps/core.xml", options).unwrap();
            zip.write_all(
                format!("<cp:coreProperties><dc:title>{}</dc:title></cp:coreProperties>", title)
                    .as_bytes(),
            )
            .unwrap();
        }

        zip.finish().unwrap();
    }

    #[test]
    fn test_load_deck_text_in_slide_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit1.pptx");
        let mut slides = vec!["Unit 1: |Binary\nBits &amp; bytes", "Overflow errors"];
        // Ten slides so slide10 must sort after slide2
        slides.extend(std::iter::repeat("filler").take(7));
        slides.push("Last slide");
        write_deck(&path, Some("Big Idea 2: Data"), &slides);

        let doc = SlideDeckLoader::new().load_file(&path).unwrap();
        assert_eq!(doc.kind, SourceKind::Slide);
        assert_eq!(doc.source_id, "unit1.pptx");
        assert_eq!(doc.title, "Big Idea 2: Data");
        assert!(doc.text.starts_with("Unit 1: Binary\nBits & bytes\n\nOverflow errors"));
        assert!(doc.text.ends_with("Last slide"));
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists.pptx");
        write_deck(&path, None, &["Lists store elements"]);

        let doc = SlideDeckLoader::new().load_file(&path).unwrap();
        assert_eq!(doc.title, "lists");
    }

    #[test]
    fn test_load_dir_only_takes_pptx() {
        let dir = tempfile::tempdir().unwrap();
        write_deck(&dir.path().join("b.pptx"), None, &["Second"]);
        write_deck(&dir.path().join("a.pptx"), None, &["First"]);
        std::fs::write(dir.path().join("notes.txt"), "not a deck").unwrap();

        let docs = SlideDeckLoader::new().load_dir(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "First");
        assert_eq!(docs[1].text, "Second");
    }

    #[test]
    fn test_corrupt_deck_aborts() {
        let dir = tempfile::tempdir().unwrap();
        write_deck(&dir.path().join("good.pptx"), None, &["ok"]);
        std::fs::write(dir.path().join("broken.pptx"), b"this is not a zip").unwrap();

        let err = SlideDeckLoader::new().load_dir(dir.path()).unwrap_err();
        assert!(
            matches!(err, CodeeError::SourceLoad { ref source_id, .. } if source_id == "broken.pptx")
        );
    }

    #[test]
    fn test_missing_dir_aborts() {
        let err = SlideDeckLoader::new()
            .load_dir(Path::new("/no/such/slides"))
            .unwrap_err();
        assert!(matches!(err, CodeeError::SourceLoad { .. }));
    }
}
