// OPML module: reads a subscription export and walks it as
// body -> folder -> feed. Only the attributes the importer needs are
// looked at; everything else in the document is ignored.

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use roxmltree::{Document, Node, ParsingOptions};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading an outline. Parse errors surface before
/// any entry is produced; missing attributes surface lazily, when the
/// offending element is reached.
#[derive(Error, Debug)]
pub enum OpmlError {
    #[error("malformed OPML document: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("unsupported OPML encoding `{0}`")]
    UnknownEncoding(String),

    #[error("OPML document is not valid {0}")]
    Decode(&'static str),

    #[error("{element} element is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}

/// One subscription found in the outline, together with the title of the
/// folder it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub folder: String,
    pub url: String,
    pub title: Option<String>,
}

/// A well-formed OPML document borrowed from its source text.
pub struct Outline<'input> {
    doc: Document<'input>,
}

impl<'input> Outline<'input> {
    /// Parse the whole document. OPML exports commonly carry a DOCTYPE,
    /// so DTDs are accepted.
    pub fn parse(text: &'input str) -> Result<Self, OpmlError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(text, options)?;
        Ok(Outline { doc })
    }

    /// Iterate every feed under every folder of every `body`, in document
    /// order. Folders need a `title`, feeds need an `xmlUrl`.
    pub fn entries(&self) -> Box<dyn Iterator<Item = Result<FeedEntry, OpmlError>> + '_> {
        Box::new(
            self.doc
                .root_element()
                .children()
                .filter(|node| node.is_element() && node.tag_name().name() == "body")
                .flat_map(|body| body.children().filter(Node::is_element))
                .flat_map(folder_entries),
        )
    }
}

fn folder_entries<'a, 'input: 'a>(
    folder: Node<'a, 'input>,
) -> Box<dyn Iterator<Item = Result<FeedEntry, OpmlError>> + 'a> {
    let Some(title) = folder.attribute("title") else {
        return Box::new(std::iter::once(Err(OpmlError::MissingAttribute {
            element: "folder",
            attribute: "title",
        })));
    };
    let folder_title = title.to_string();

    Box::new(
        folder
            .children()
            .filter(Node::is_element)
            .map(move |feed| -> Result<FeedEntry, OpmlError> {
                let url = feed
                    .attribute("xmlUrl")
                    .ok_or(OpmlError::MissingAttribute {
                        element: "feed",
                        attribute: "xmlUrl",
                    })?;
                Ok(FeedEntry {
                    folder: folder_title.clone(),
                    url: url.to_string(),
                    title: feed.attribute("title").map(str::to_string),
                })
            }),
    )
}

/// Read an OPML file into memory so it can be handed to `Outline::parse`.
pub fn read_outline_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read OPML file {}", path.display()))?;
    let text = decode_outline(&bytes)
        .with_context(|| format!("Failed to decode OPML file {}", path.display()))?;
    Ok(text)
}

/// Decode raw OPML bytes to text. A byte order mark wins, then the
/// `encoding` of the XML declaration; anything else is UTF-8.
pub fn decode_outline(bytes: &[u8]) -> Result<String, OpmlError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?, bytes),
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or(OpmlError::Decode(encoding.name()))
}

fn declared_encoding(bytes: &[u8]) -> Result<&'static Encoding, OpmlError> {
    let Some(rest) = bytes.strip_prefix(b"<?xml") else {
        return Ok(UTF_8);
    };
    let Some(end) = rest.windows(2).position(|w| w == b"?>") else {
        return Ok(UTF_8);
    };
    let decl = String::from_utf8_lossy(&rest[..end]);
    let Some(label) = pseudo_attribute(&decl, "encoding") else {
        return Ok(UTF_8);
    };
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| OpmlError::UnknownEncoding(label.to_string()))?;
    // The declaration was readable as ASCII, so there is no UTF-16 here.
    if encoding == UTF_16LE || encoding == UTF_16BE {
        return Ok(UTF_8);
    }
    Ok(encoding)
}

fn pseudo_attribute<'a>(decl: &'a str, name: &str) -> Option<&'a str> {
    let after_name = &decl[decl.find(name)? + name.len()..];
    let after_eq = after_name.trim_start().strip_prefix('=')?.trim_start();
    let quote = after_eq.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after_eq[1..];
    Some(&value[..value.find(quote)?])
}
