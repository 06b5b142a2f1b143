//! Parsing decoded XML into a navigable element tree.
//!
//! The tree is deliberately small: element local names, their text content
//! and their child elements. Attributes, comments and processing
//! instructions are dropped because nothing in the sitemaps.org schema needs
//! them. Names are compared without namespace prefixes, so
//! `<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">` and
//! `<sm:urlset>` are both a `urlset`.
//!
//! Parsing only checks well-formedness. Whether the root is something this
//! crate can traverse is reported by [`SitemapDocument::root_kind`] and
//! decided by the traversal step.

use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::sync::Arc;
use tracing::instrument;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One element of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    text: String,
    children: Vec<Arc<Element>>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Local name of the element (namespace prefix removed).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concatenated text of the element and its descendants, in document
    /// order, exactly as it appears (after unescaping).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// [`text`](Self::text) with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[Arc<Self>] {
        &self.children
    }

    /// First child element called `name`.
    pub fn find_child(&self, name: &str) -> Option<&Arc<Self>> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All child elements called `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<Self>> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Semantic kind of a document, decided by its root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// `<urlset>`: a list of `<url>` records.
    UrlSet,
    /// `<sitemapindex>`: a list of `<sitemap>` references.
    SitemapIndex,
    /// Anything else.
    Malformed,
}

/// A parsed sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    root: Arc<Element>,
}

impl SitemapDocument {
    /// Root element of the document.
    pub fn root(&self) -> &Arc<Element> {
        &self.root
    }

    /// Classify the document by its root element name.
    pub fn root_kind(&self) -> RootKind {
        match self.root.name() {
            "urlset" => RootKind::UrlSet,
            "sitemapindex" => RootKind::SitemapIndex,
            _ => RootKind::Malformed,
        }
    }
}

/// Parse XML bytes into a [`SitemapDocument`].
///
/// Fails with [`Error::Parse`] on malformed XML: mismatched or unclosed
/// tags, undefined entities, text or a second element outside the root, or
/// a document with no root element at all.
///
/// ```rust
/// use sitemap_core::document::{parse, RootKind};
///
/// let doc = parse(b"<foo>bar</foo>")?;
/// assert_eq!(doc.root_kind(), RootKind::Malformed);
/// assert!(parse(b"<urlset><url></urlset>").is_err());
/// # Ok::<(), sitemap_core::Error>(())
/// ```
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse(xml: &[u8]) -> Result<SitemapDocument> {
    let xml = xml.strip_prefix(UTF8_BOM).unwrap_or(xml);
    let mut reader = Reader::from_reader(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::Parse(format!(
                "XML parse error at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => {
                stack.push(Element::new(local_name(e.local_name().as_ref())));
            },
            Event::Empty(e) => {
                let element = Element::new(local_name(e.local_name().as_ref()));
                attach(&mut stack, &mut root, element)?;
            },
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Parse("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            },
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                append_text(&mut stack, &text)?;
            },
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e);
                append_text(&mut stack, &text)?;
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Parse(format!(
            "unexpected end of document: <{}> is not closed",
            open.name
        )));
    }

    root.map(|root| SitemapDocument {
        root: Arc::new(root),
    })
    .ok_or_else(|| Error::Parse("document has no root element".to_string()))
}

fn local_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Arc::new(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::Parse(format!(
            "unexpected element <{}> after the root element",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

// Text belongs to every open element so each one holds its full text content.
fn append_text(stack: &mut [Element], text: &str) -> Result<()> {
    if stack.is_empty() {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(Error::Parse("text outside of the root element".to_string()));
    }
    for element in stack.iter_mut() {
        element.text.push_str(text);
    }
    Ok(())
}
