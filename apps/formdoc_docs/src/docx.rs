//! Word document templates.
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`.
//! Only paragraphs directly under `w:body` are scanned, the same set a
//! reader sees as "the document's paragraphs". Table cells, headers and
//! footers are left alone.

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const PLACEHOLDER: &str = "%items%";

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("cannot open template {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid document archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("document has no {0} part")]
    MissingPart(&'static str),

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document XML is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which matching paragraphs get the placeholder replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacePolicy {
    /// Every paragraph containing the token.
    AllMatches,
    /// The first paragraph containing the token, then stop.
    FirstMatch,
}

impl FromStr for ReplacePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "all_matches" => Ok(Self::AllMatches),
            "first" | "first_match" => Ok(Self::FirstMatch),
            other => Err(format!("unknown replace policy: {other}")),
        }
    }
}

/// Fills the on-disk template at `template` with a text block.
#[derive(Debug, Clone)]
pub struct TemplateFiller {
    template: PathBuf,
    policy: ReplacePolicy,
}

impl TemplateFiller {
    pub fn new(template: impl Into<PathBuf>, policy: ReplacePolicy) -> Self {
        Self {
            template: template.into(),
            policy,
        }
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn policy(&self) -> ReplacePolicy {
        self.policy
    }

    /// Load a fresh copy of the template and substitute `block.trim()` for
    /// the placeholder. The template file itself is never written.
    pub fn fill(&self, block: &str) -> Result<Document, DocxError> {
        let mut doc = Document::open(&self.template)?;
        let replaced = doc.replace_placeholder(PLACEHOLDER, block.trim(), self.policy)?;
        debug!(
            template = %self.template.display(),
            policy = ?self.policy,
            replaced,
            "template filled"
        );
        Ok(doc)
    }
}

struct Part {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// An in-memory `.docx` package.
pub struct Document {
    parts: Vec<Part>,
}

impl Document {
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let bytes = std::fs::read(path).map_err(|source| DocxError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data,
            });
        }

        if !parts.iter().any(|p| p.name == DOCUMENT_PART) {
            return Err(DocxError::MissingPart(DOCUMENT_PART));
        }
        Ok(Self { parts })
    }

    /// Smallest package Word opens: content types, root relationship and a
    /// body holding one plain run per paragraph.
    pub fn with_paragraphs(paragraphs: &[&str]) -> Self {
        let mut body = String::new();
        for text in paragraphs {
            body.push_str("<w:p><w:r><w:t xml:space=\"preserve\">");
            body.push_str(&quick_xml::escape::escape(*text));
            body.push_str("</w:t></w:r></w:p>");
        }
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}<w:sectPr/></w:body></w:document>"
        );

        let part = |name: &str, data: String| Part {
            name: name.to_string(),
            data: data.into_bytes(),
            compression: CompressionMethod::Deflated,
            is_dir: false,
        };
        Self {
            parts: vec![
                part("[Content_Types].xml", CONTENT_TYPES.to_string()),
                part("_rels/.rels", ROOT_RELS.to_string()),
                part(DOCUMENT_PART, document),
            ],
        }
    }

    /// Text of every body-level paragraph, in document order.
    pub fn paragraphs(&self) -> Result<Vec<String>, DocxError> {
        let mut texts = Vec::new();
        rewrite_paragraphs(self.document_xml()?, |text| {
            texts.push(text.to_string());
            None
        })?;
        Ok(texts)
    }

    /// Replace `token` with `replacement` inside matching paragraphs and
    /// return how many paragraphs were rewritten.
    pub fn replace_placeholder(
        &mut self,
        token: &str,
        replacement: &str,
        policy: ReplacePolicy,
    ) -> Result<usize, DocxError> {
        if token.is_empty() {
            return Ok(0);
        }

        let mut replaced = 0usize;
        let rewritten = rewrite_paragraphs(self.document_xml()?, |text| {
            if !text.contains(token) {
                return None;
            }
            if policy == ReplacePolicy::FirstMatch && replaced > 0 {
                return None;
            }
            replaced += 1;
            Some(text.replace(token, replacement))
        })?;

        if replaced > 0 {
            if let Some(part) = self.parts.iter_mut().find(|p| p.name == DOCUMENT_PART) {
                part.data = rewritten;
            }
        }
        Ok(replaced)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for part in &self.parts {
            let method = match part.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = FileOptions::default().compression_method(method);
            if part.is_dir {
                zip.add_directory(part.name.clone(), options)?;
                continue;
            }
            zip.start_file(part.name.clone(), options)?;
            zip.write_all(&part.data)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    fn document_xml(&self) -> Result<&str, DocxError> {
        let part = self
            .parts
            .iter()
            .find(|p| p.name == DOCUMENT_PART)
            .ok_or(DocxError::MissingPart(DOCUMENT_PART))?;
        Ok(std::str::from_utf8(&part.data)?)
    }
}

const CONTENT_TYPES: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/word/document.xml\" \
ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
</Types>";

const ROOT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" \
Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" \
Target=\"word/document.xml\"/>\
</Relationships>";

struct OpenParagraph<'a> {
    start: BytesStart<'a>,
    depth: usize,
    inner: Vec<Event<'a>>,
}

/// Stream `xml` through unchanged except for body paragraphs where `rewrite`
/// returns new text; those keep their `pPr` and get a single run instead.
fn rewrite_paragraphs<F>(xml: &str, mut rewrite: F) -> Result<Vec<u8>, DocxError>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));

    let mut depth = 0usize;
    let mut body_depth: Option<usize> = None;
    let mut open: Option<OpenParagraph<'_>> = None;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                depth += 1;
                if open.is_none() {
                    match e.local_name().as_ref() {
                        b"body" => body_depth = Some(depth),
                        b"p" if body_depth == Some(depth - 1) => {
                            open = Some(OpenParagraph {
                                start: e.clone(),
                                depth,
                                inner: Vec::new(),
                            });
                            continue;
                        }
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => {
                let closing = depth;
                depth = depth.saturating_sub(1);

                if let Some(para) = open.take_if(|p| p.depth == closing) {
                    let text = paragraph_text(&para.inner)?;
                    match rewrite(&text) {
                        Some(new_text) => write_replaced(&mut writer, para, e.clone(), &new_text)?,
                        None => {
                            writer.write_event(Event::Start(para.start))?;
                            for inner in para.inner {
                                writer.write_event(inner)?;
                            }
                            writer.write_event(Event::End(e.clone()))?;
                        }
                    }
                    continue;
                }
                if body_depth == Some(closing) && e.local_name().as_ref() == b"body" {
                    body_depth = None;
                }
            }
            _ => {}
        }

        match open.as_mut() {
            Some(para) => para.inner.push(event),
            None => writer.write_event(event)?,
        }
    }

    Ok(writer.into_inner())
}

/// Elements a paragraph's own runs may sit in. Runs nested anywhere else
/// (drawings, text boxes, VML, alternate content) belong to another paragraph.
const INLINE_CONTAINERS: [&[u8]; 5] = [b"hyperlink", b"sdt", b"sdtContent", b"smartTag", b"ins"];

/// What a reader sees: run text, tabs and line breaks. Tab stops declared in
/// `pPr` are not text.
fn paragraph_text(events: &[Event<'_>]) -> Result<String, DocxError> {
    let mut text = String::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut in_text = false;

    for event in events {
        match event {
            Event::Start(e) => {
                let name = e.local_name();
                if name.as_ref() == b"t" && in_own_run(&path) {
                    in_text = true;
                }
                path.push(name.as_ref().to_vec());
            }
            Event::End(_) => {
                path.pop();
                in_text = false;
            }
            Event::Empty(e) if in_own_run(&path) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => text.push_str(&t.unescape()?),
            Event::CData(c) if in_text => text.push_str(&String::from_utf8_lossy(c)),
            _ => {}
        }
    }
    Ok(text)
}

/// `path` ends in a `w:r` reached only through inline containers.
fn in_own_run(path: &[Vec<u8>]) -> bool {
    match path.split_last() {
        Some((last, containers)) => {
            last.as_slice() == b"r"
                && containers
                    .iter()
                    .all(|c| INLINE_CONTAINERS.contains(&c.as_slice()))
        }
        None => false,
    }
}

fn write_replaced(
    writer: &mut Writer<Vec<u8>>,
    para: OpenParagraph<'_>,
    end: BytesEnd<'_>,
    text: &str,
) -> Result<(), DocxError> {
    let prefix = para
        .start
        .name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
    let tag = |local: &str| match &prefix {
        Some(p) => format!("{p}:{local}"),
        None => local.to_string(),
    };

    writer.write_event(Event::Start(para.start.clone()))?;
    for event in paragraph_properties(para.inner) {
        writer.write_event(event)?;
    }

    let run = tag("r");
    writer.write_event(Event::Start(BytesStart::new(run.as_str())))?;
    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\n' | '\t' => {
                write_text(writer, &tag("t"), &segment)?;
                segment.clear();
                let name = if ch == '\n' { tag("br") } else { tag("tab") };
                writer.write_event(Event::Empty(BytesStart::new(name.as_str())))?;
            }
            '\r' => {}
            _ => segment.push(ch),
        }
    }
    write_text(writer, &tag("t"), &segment)?;
    writer.write_event(Event::End(BytesEnd::new(run.as_str())))?;

    writer.write_event(Event::End(end))?;
    Ok(())
}

fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, segment: &str) -> Result<(), DocxError> {
    if segment.is_empty() {
        return Ok(());
    }
    let mut start = BytesStart::new(name);
    start.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(segment)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// The `pPr` subtree (if any) among a paragraph's direct children.
fn paragraph_properties(inner: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut kept = Vec::new();
    let mut depth = 0usize;
    let mut keeping = false;

    for event in inner {
        let mut last = false;
        match &event {
            Event::Start(e) => {
                if depth == 0 && e.local_name().as_ref() == b"pPr" {
                    keeping = true;
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                last = keeping && depth == 0;
            }
            Event::Empty(e) => {
                if depth == 0 && e.local_name().as_ref() == b"pPr" {
                    keeping = true;
                    last = true;
                }
            }
            _ => {}
        }
        if keeping {
            kept.push(event);
        }
        if last {
            keeping = false;
        }
    }
    kept
}
