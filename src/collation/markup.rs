use std::borrow::Cow;

use anyhow::{ensure, Context, Result};
use quick_xml::{
    events::{BytesStart, BytesText, Event},
    Reader,
};

// A small element tree for the inside of one element (an apparatus, a witness
// list). `text` holds only the character data that is a direct child of the
// element, nested elements keep their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    pub fn from_start(start: &BytesStart) -> Result<Self> {
        Ok(MarkupNode {
            name: local_name(start),
            attributes: attributes(start)?,
            text: String::new(),
            children: Vec::new(),
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MarkupNode> {
        self.children.iter().filter(move |child| child.name == name)
    }

    // Depth-first, self included
    pub fn descendants(&self) -> Vec<&MarkupNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.descendants());
        }
        nodes
    }
}

pub fn local_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

// Attribute keys are local names, so `xml:id` is found as `id`
pub fn attributes(start: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.context("Malformed attribute")?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .with_context(|| format!("Malformed attribute value of {}", key))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

// Unknown entities are common in TEI exports; keep them verbatim
pub fn text_content<'a>(text: &'a BytesText<'a>) -> Cow<'a, str> {
    match text.unescape() {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(%err, "keeping character data unescaped");
            String::from_utf8_lossy(&**text)
        }
    }
}

// Builds the tree of an element from its start tag and the markup between its
// start and end tags.
pub fn parse_element(start: &BytesStart, inner: &str) -> Result<MarkupNode> {
    let mut root = MarkupNode::from_start(start)?;
    root.children = parse_fragment_into(&mut root.text, inner)?;
    Ok(root)
}

pub fn parse_fragment(fragment: &str) -> Result<Vec<MarkupNode>> {
    let mut text = String::new();
    parse_fragment_into(&mut text, fragment)
}

fn parse_fragment_into(root_text: &mut String, fragment: &str) -> Result<Vec<MarkupNode>> {
    let mut reader = Reader::from_str(fragment);

    let mut stack: Vec<MarkupNode> = Vec::new();
    let mut roots = Vec::new();

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("Malformed markup at {}", reader.buffer_position()))?;

        match event {
            Event::Start(start) => stack.push(MarkupNode::from_start(&start)?),

            Event::Empty(start) => {
                let node = MarkupNode::from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => roots.push(node),
                }
            }

            Event::End(_) => {
                let node = stack.pop().context("Unbalanced end tag")?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => roots.push(node),
                }
            }

            Event::Text(text) => {
                let value = text_content(&text);
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&value),
                    None => root_text.push_str(&value),
                }
            }

            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&value),
                    None => root_text.push_str(&value),
                }
            }

            Event::Eof => break,

            _ => continue,
        }
    }

    ensure_closed(&stack)?;

    Ok(roots)
}

fn ensure_closed(stack: &[MarkupNode]) -> Result<()> {
    ensure!(
        stack.is_empty(),
        "Unclosed element: {:?}",
        stack.iter().map(|node| node.name.as_str()).collect::<Vec<_>>()
    );
    Ok(())
}

// Reads the rest of an element whose start tag was just returned by `reader`
pub fn read_element(
    reader: &mut Reader<&[u8]>,
    source: &str,
    start: &BytesStart,
    is_empty: bool,
) -> Result<MarkupNode> {
    if is_empty {
        return MarkupNode::from_start(start);
    }

    let end = start.to_end().into_owned();
    let span = reader
        .read_to_end(end.name())
        .with_context(|| format!("Element <{}> is not closed", local_name(start)))?;

    let inner = source
        .get(span.start as usize..span.end as usize)
        .context("Element span is out of the document")?;

    parse_element(start, inner)
}
