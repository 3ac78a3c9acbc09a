use crate::{FormatInfo, HeadingRecord, SourceRef};
use anyhow::{Context, Result};
use log::debug;
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Word's outline level 9 means "body text".
const BODY_TEXT_OUTLINE_LEVEL: u32 = 9;

/// Largest heading level a source will hand to the builder. Markdown spends one `#` per level.
pub const MAX_HEADING_LEVEL: i32 = 1024;

/// Supplies heading records in reading order. Deciding what counts as a heading is the
/// source's job, not the outline builder's.
pub trait HeadingSource {
    fn headings<P: AsRef<Path>>(&self, path: P) -> Result<Vec<HeadingRecord>>;
}

/// Picks a source by file extension.
#[derive(Debug, Default)]
pub struct UniversalSource {
    pub docx: DocxHeadingSource,
    pub json: JsonHeadingSource,
}

impl UniversalSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supports<P: AsRef<Path>>(path: P) -> bool {
        matches!(extension_of(path.as_ref()).as_deref(), Some("docx") | Some("json"))
    }
}

impl HeadingSource for UniversalSource {
    fn headings<P: AsRef<Path>>(&self, path: P) -> Result<Vec<HeadingRecord>> {
        let path = path.as_ref();
        match extension_of(path).as_deref() {
            Some("docx") => self.docx.headings(path),
            Some("json") => self.json.headings(path),
            _ => anyhow::bail!("Unsupported file format: {}", path.display()),
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Reads a JSON array of heading records.
#[derive(Debug, Default)]
pub struct JsonHeadingSource;

impl JsonHeadingSource {
    pub fn parse_str(&self, json: &str) -> Result<Vec<HeadingRecord>> {
        let records = serde_json::from_str(json).context("heading records must be a JSON array")?;
        check_levels(records)
    }
}

fn check_levels(records: Vec<HeadingRecord>) -> Result<Vec<HeadingRecord>> {
    if let Some((position, record)) = records
        .iter()
        .enumerate()
        .find(|(_, record)| record.level > MAX_HEADING_LEVEL)
    {
        anyhow::bail!(
            "heading record {} has level {}, above the maximum of {}",
            position,
            record.level,
            MAX_HEADING_LEVEL
        );
    }
    Ok(records)
}

impl HeadingSource for JsonHeadingSource {
    fn headings<P: AsRef<Path>>(&self, path: P) -> Result<Vec<HeadingRecord>> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let records: Vec<HeadingRecord> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read heading records from {}", path.display()))?;
        let records = check_levels(records).with_context(|| format!("Invalid heading records in {}", path.display()))?;
        debug!("read {} heading records from {}", records.len(), path.display());
        Ok(records)
    }
}

#[derive(Debug, Clone, Default)]
struct StyleDefinition {
    name: String,
    based_on: Option<String>,
    outline_level: Option<u32>,
    run_props: RunProperties,
}

#[derive(Debug, Clone, Default)]
struct RunProperties {
    font: Option<String>,
    /// Half-points, as stored in `w:sz`.
    sz: Option<u32>,
    bold: Option<bool>,
    italic: Option<bool>,
}

impl RunProperties {
    fn or(self, fallback: &RunProperties) -> RunProperties {
        RunProperties {
            font: self.font.or_else(|| fallback.font.clone()),
            sz: self.sz.or(fallback.sz),
            bold: self.bold.or(fallback.bold),
            italic: self.italic.or(fallback.italic),
        }
    }

    fn into_format(self) -> Option<FormatInfo> {
        let format = FormatInfo {
            font: self.font,
            size: self.sz.map(|sz| sz as f32 / 2.0),
            bold: self.bold,
            italic: self.italic,
        };
        if format.is_empty() {
            None
        } else {
            Some(format)
        }
    }
}

/// Extracts headings from `word/document.xml`, using `word/styles.xml` to resolve
/// style-based outline levels.
#[derive(Debug, Default)]
pub struct DocxHeadingSource;

impl HeadingSource for DocxHeadingSource {
    fn headings<P: AsRef<Path>>(&self, path: P) -> Result<Vec<HeadingRecord>> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let records = self
            .headings_from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read headings from {}", path.display()))?;
        debug!("found {} headings in {}", records.len(), path.display());
        Ok(records)
    }
}

impl DocxHeadingSource {
    pub fn headings_from_reader<R: Read + Seek>(&self, reader: R) -> Result<Vec<HeadingRecord>> {
        let mut archive = ZipArchive::new(reader)?;

        let mut styles = HashMap::new();
        let mut styles_xml = String::new();
        if let Ok(mut file) = archive.by_name("word/styles.xml") {
            file.read_to_string(&mut styles_xml)?;
            styles = parse_styles_xml(&styles_xml)?;
        }

        let mut doc_xml = String::new();
        archive
            .by_name("word/document.xml")
            .context("word/document.xml is missing")?
            .read_to_string(&mut doc_xml)?;

        self.headings_from_xml(&doc_xml, &styles)
    }

    fn headings_from_xml(
        &self,
        doc_xml: &str,
        styles: &HashMap<String, StyleDefinition>,
    ) -> Result<Vec<HeadingRecord>> {
        let doc = Document::parse(doc_xml)?;

        let mut records = Vec::new();
        let paragraphs = doc
            .descendants()
            .filter(|n| is_w(n, "p"));

        for (i, p_node) in paragraphs.enumerate() {
            let style_id = paragraph_style_id(p_node);
            let style_chain = style_id
                .map(|id| resolve_style(styles, id))
                .unwrap_or_default();

            let level = match heading_level(p_node, style_id, &style_chain) {
                Some(level) => level,
                None => continue,
            };

            let style_runs = style_chain
                .iter()
                .fold(RunProperties::default(), |acc, style| acc.or(&style.run_props));
            let format = first_run_properties(p_node).or(&style_runs).into_format();

            records.push(HeadingRecord {
                level,
                text: extract_text(p_node),
                source_ref: SourceRef::new(format!(
                    "word/document.xml#/w:document/w:body/w:p[{}]",
                    i + 1
                )),
                format_info: format,
            });
        }

        Ok(records)
    }
}

/// A WordprocessingML element named `name`. DrawingML text (`a:p`, `a:t`) does not match.
fn is_w(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NS)
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_w(child, name))
}

fn paragraph_style_id<'a>(p_node: Node<'a, '_>) -> Option<&'a str> {
    child_element(p_node, "pPr")
        .and_then(|ppr| child_element(ppr, "pStyle"))
        .and_then(|ps| ps.attribute((W_NS, "val")))
}

/// Direct `w:outlineLvl` wins, then the style chain's outline level, then a
/// "heading N" style name or id.
fn heading_level(p_node: Node, style_id: Option<&str>, style_chain: &[&StyleDefinition]) -> Option<i32> {
    let direct = child_element(p_node, "pPr")
        .and_then(|ppr| child_element(ppr, "outlineLvl"))
        .and_then(parse_outline_level);
    if let Some(level) = direct {
        return outline_level_to_heading(level);
    }

    if let Some(level) = style_chain.iter().find_map(|style| style.outline_level) {
        return outline_level_to_heading(level);
    }

    style_chain
        .iter()
        .find_map(|style| heading_number(&style.name))
        .or_else(|| style_id.and_then(heading_number))
}

fn parse_outline_level(node: Node) -> Option<u32> {
    node.attribute((W_NS, "val")).and_then(|v| v.parse::<u32>().ok())
}

fn outline_level_to_heading(outline_level: u32) -> Option<i32> {
    if outline_level >= BODY_TEXT_OUTLINE_LEVEL {
        None
    } else {
        i32::try_from(outline_level + 1).ok()
    }
}

/// `"heading 2"`, `"Heading2"` → 2.
fn heading_number(name: &str) -> Option<i32> {
    let lower = name.to_lowercase();
    let rest = lower.strip_prefix("heading")?.trim_start();
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse::<i32>().ok().filter(|level| *level <= MAX_HEADING_LEVEL)
}

fn extract_text(p_node: Node) -> String {
    p_node
        .descendants()
        .filter(|n| is_w(n, "t"))
        .filter_map(|t| t.text())
        .collect()
}

fn first_run_properties(p_node: Node) -> RunProperties {
    p_node
        .descendants()
        .filter(|n| is_w(n, "r"))
        .find_map(|run| child_element(run, "rPr"))
        .map(parse_run_properties)
        .unwrap_or_default()
}

fn parse_run_properties(rpr: Node) -> RunProperties {
    let mut props = RunProperties::default();

    for child in rpr.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "sz" => {
                props.sz = child.attribute((W_NS, "val")).and_then(|v| v.parse::<u32>().ok());
            }
            "rFonts" => {
                props.font = child
                    .attribute((W_NS, "ascii"))
                    .or_else(|| child.attribute((W_NS, "eastAsia")))
                    .map(|s| s.to_string());
            }
            "b" => props.bold = Some(toggle_value(child)),
            "i" => props.italic = Some(toggle_value(child)),
            _ => {}
        }
    }
    props
}

/// `<w:b/>` is on; `w:val="0"`/`"false"`/`"off"` turns it off.
fn toggle_value(node: Node) -> bool {
    !matches!(node.attribute((W_NS, "val")), Some("0") | Some("false") | Some("off"))
}

fn parse_styles_xml(xml: &str) -> Result<HashMap<String, StyleDefinition>> {
    let doc = Document::parse(xml)?;
    let mut styles = HashMap::new();

    for style_node in doc
        .root_element()
        .children()
        .filter(|n| is_w(n, "style"))
    {
        let Some(style_id) = style_node.attribute((W_NS, "styleId")) else {
            continue;
        };

        let name = child_element(style_node, "name")
            .and_then(|n| n.attribute((W_NS, "val")))
            .unwrap_or(style_id);
        let based_on = child_element(style_node, "basedOn")
            .and_then(|n| n.attribute((W_NS, "val")))
            .map(|s| s.to_string());
        let outline_level = child_element(style_node, "pPr")
            .and_then(|ppr| child_element(ppr, "outlineLvl"))
            .and_then(parse_outline_level);
        let run_props = child_element(style_node, "rPr")
            .map(parse_run_properties)
            .unwrap_or_default();

        styles.insert(
            style_id.to_string(),
            StyleDefinition {
                name: name.to_string(),
                based_on,
                outline_level,
                run_props,
            },
        );
    }
    Ok(styles)
}

/// The style followed by its `basedOn` ancestors, most specific first. Stops on cycles.
fn resolve_style<'s>(styles: &'s HashMap<String, StyleDefinition>, style_id: &str) -> Vec<&'s StyleDefinition> {
    let mut chain = Vec::new();
    let mut visited: Vec<&str> = Vec::new();
    let mut current = Some(style_id);

    while let Some(id) = current {
        if visited.contains(&id) {
            break;
        }
        let Some((key, style)) = styles.get_key_value(id) else {
            break;
        };
        visited.push(key.as_str());
        chain.push(style);
        current = style.based_on.as_deref();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC_HEAD: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;
    const DOC_TAIL: &str = "</w:body></w:document>";

    fn styles() -> HashMap<String, StyleDefinition> {
        parse_styles_xml(
            r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
                <w:style w:type="paragraph" w:styleId="Heading1">
                    <w:name w:val="heading 1"/>
                    <w:rPr><w:rFonts w:ascii="Cambria"/><w:sz w:val="32"/><w:b/></w:rPr>
                </w:style>
                <w:style w:type="paragraph" w:styleId="Chapter">
                    <w:name w:val="Chapter"/>
                    <w:basedOn w:val="Heading1"/>
                </w:style>
                <w:style w:type="paragraph" w:styleId="Deep">
                    <w:name w:val="Deep"/>
                    <w:pPr><w:outlineLvl w:val="3"/></w:pPr>
                </w:style>
                <w:style w:type="paragraph" w:styleId="LoopA"><w:name w:val="LoopA"/><w:basedOn w:val="LoopB"/></w:style>
                <w:style w:type="paragraph" w:styleId="LoopB"><w:name w:val="LoopB"/><w:basedOn w:val="LoopA"/></w:style>
            </w:styles>"#,
        )
        .unwrap()
    }

    fn para(style: Option<&str>, extra_ppr: &str, runs: &str) -> String {
        let pstyle = style
            .map(|s| format!(r#"<w:pStyle w:val="{}"/>"#, s))
            .unwrap_or_default();
        format!("<w:p><w:pPr>{}{}</w:pPr>{}</w:p>", pstyle, extra_ppr, runs)
    }

    fn headings(body: &str) -> Vec<HeadingRecord> {
        let xml = format!("{}{}{}", DOC_HEAD, body, DOC_TAIL);
        DocxHeadingSource.headings_from_xml(&xml, &styles()).unwrap()
    }

    #[test]
    fn test_heading_number() {
        assert_eq!(heading_number("heading 1"), Some(1));
        assert_eq!(heading_number("Heading12"), Some(12));
        assert_eq!(heading_number("Heading"), None);
        assert_eq!(heading_number("Heading 1 Char"), None);
        assert_eq!(heading_number("Normal"), None);
        assert_eq!(heading_number("heading 5000"), None);
        assert_eq!(heading_number("heading 2147483647"), None);
    }

    #[test]
    fn test_body_paragraphs_are_skipped() {
        let body = para(None, "", "<w:r><w:t>plain</w:t></w:r>")
            + &para(Some("Heading1"), "", "<w:r><w:t>Title</w:t></w:r>");
        let records = headings(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, 1);
        assert_eq!(records[0].text, "Title");
        assert_eq!(records[0].source_ref.as_str(), "word/document.xml#/w:document/w:body/w:p[2]");
    }

    #[test]
    fn test_direct_outline_level_wins() {
        let body = para(Some("Heading1"), r#"<w:outlineLvl w:val="2"/>"#, "<w:r><w:t>x</w:t></w:r>")
            + &para(None, r#"<w:outlineLvl w:val="9"/>"#, "<w:r><w:t>body</w:t></w:r>");
        let records = headings(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, 3);
    }

    #[test]
    fn test_style_inheritance_and_outline_level() {
        let body = para(Some("Chapter"), "", "<w:r><w:t>One</w:t></w:r>")
            + &para(Some("Deep"), "", "<w:r><w:t>Four</w:t></w:r>")
            + &para(Some("LoopA"), "", "<w:r><w:t>loop</w:t></w:r>");
        let records = headings(&body);
        let levels: Vec<i32> = records.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![1, 4]);

        let format = records[0].format_info.clone().unwrap();
        assert_eq!(format.font.as_deref(), Some("Cambria"));
        assert_eq!(format.size, Some(16.0));
        assert_eq!(format.bold, Some(true));
        assert_eq!(format.italic, None);
    }

    #[test]
    fn test_run_properties_override_style() {
        let runs = r#"<w:r><w:rPr><w:sz w:val="20"/><w:b w:val="0"/><w:i/></w:rPr><w:t>Split </w:t></w:r><w:r><w:t>title</w:t></w:r>"#;
        let records = headings(&para(Some("Heading1"), "", runs));
        assert_eq!(records[0].text, "Split title");
        let format = records[0].format_info.clone().unwrap();
        assert_eq!(format.size, Some(10.0));
        assert_eq!(format.bold, Some(false));
        assert_eq!(format.italic, Some(true));
        assert_eq!(format.font.as_deref(), Some("Cambria"));
    }

    #[test]
    fn test_unknown_style_id_falls_back_to_name() {
        let records = headings(&para(Some("Heading2"), "", ""));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, 2);
        assert_eq!(records[0].text, "");
        assert!(records[0].format_info.is_none());
    }

    #[test]
    fn test_json_source_parses_records() {
        let records = JsonHeadingSource
            .parse_str(r#"[{"level":1,"text":"A","sourceRef":"p1"},{"level":2,"text":"B","formatInfo":{"bold":true}}]"#)
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_ref.as_str(), "p1");
        assert_eq!(records[1].source_ref.as_str(), "");
        assert_eq!(records[1].format_info.as_ref().and_then(|f| f.bold), Some(true));
        assert!(JsonHeadingSource.parse_str(r#"{"level":1}"#).is_err());
    }

    #[test]
    fn test_json_source_rejects_absurd_levels() {
        let err = JsonHeadingSource
            .parse_str(r#"[{"level":1,"text":"ok"},{"level":2147483647,"text":"huge"}]"#)
            .unwrap_err();
        assert!(err.to_string().contains("heading record 1 has level 2147483647"));

        let at_cap = format!(r#"[{{"level":{},"text":"deep"}},{{"level":-3,"text":"odd"}}]"#, MAX_HEADING_LEVEL);
        assert_eq!(JsonHeadingSource.parse_str(&at_cap).unwrap().len(), 2);
    }

    #[test]
    fn test_json_file_with_absurd_level_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.json");
        std::fs::write(&path, r#"[{"level":2147483647,"text":"huge"}]"#).unwrap();
        let err = JsonHeadingSource.headings(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("above the maximum"));
    }

    #[test]
    fn test_universal_source_rejects_unknown_extension() {
        assert!(UniversalSource::supports("a.DOCX"));
        assert!(UniversalSource::supports("b.json"));
        assert!(!UniversalSource::supports("c.pdf"));
        assert!(UniversalSource::new().headings("c.pdf").is_err());
    }
}
