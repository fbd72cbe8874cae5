//! A small namespace-resolved element tree for reading WCS responses.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::{WcsError, WcsResult};

/// Namespaces an OWS `ExceptionReport` root may be bound to.
pub(crate) const OWS_EXCEPTION_NAMESPACES: [&str; 3] = [
    "http://www.opengis.net/ows",
    "http://www.opengis.net/ows/1.1",
    "http://www.opengis.net/ows/2.0",
];

#[derive(Debug, Clone, PartialEq)]
struct Attribute {
    namespace: Option<String>,
    name: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Local name, without prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Text content with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn attribute(&self, name: &str, namespace: Option<&str>) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    fn matches(&self, name: &str, namespace: Option<&str>) -> bool {
        self.name == name && self.namespace.as_deref() == namespace
    }

    /// All elements at `path` (`a/b/c`, each step a direct child), with
    /// every step in `namespace`.
    pub fn find_all<'a>(&'a self, path: &str, namespace: Option<&str>) -> Vec<&'a Element> {
        let mut current = vec![self];
        for step in path.split('/') {
            current = current
                .into_iter()
                .flat_map(|e| {
                    e.children
                        .iter()
                        .filter(move |c| c.matches(step, namespace))
                })
                .collect();
        }
        current
    }

    /// The single element at `path`; zero or several matches is an error.
    pub fn find_one<'a>(&'a self, path: &str, namespace: Option<&str>) -> WcsResult<&'a Element> {
        let found = self.find_all(path, namespace);
        match found.as_slice() {
            [one] => Ok(*one),
            _ => Err(WcsError::malformed(format!(
                "Expected to find exactly 1 {} element, but found {} instead.",
                display_path(path, namespace),
                found.len()
            ))),
        }
    }

    /// Trimmed text of every element at `path`.
    ///
    /// Fails if the elements exist but none carries text. Elements without
    /// text are dropped when only some of them are empty.
    pub fn texts(&self, path: &str, namespace: Option<&str>) -> WcsResult<Vec<String>> {
        let texts: Vec<&str> = self
            .find_all(path, namespace)
            .into_iter()
            .map(Element::text)
            .collect();
        collect_texts(texts, path, namespace)
    }

    /// Trimmed text of the single element at `path`.
    pub fn text_of(&self, path: &str, namespace: Option<&str>) -> WcsResult<String> {
        let elem = self.find_one(path, namespace)?;
        let mut texts = collect_texts(vec![elem.text()], path, namespace)?;
        Ok(texts.remove(0))
    }

    /// Value of a non-empty attribute.
    pub fn attr(&self, name: &str, namespace: Option<&str>) -> WcsResult<&str> {
        match self.attribute(name, namespace) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(WcsError::malformed(format!(
                "No attribute called {} found in element {}.",
                display_path(name, namespace),
                self.name
            ))),
        }
    }
}

fn display_path(path: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) => format!("{{{}}}{}", ns, path),
        None => path.to_string(),
    }
}

fn collect_texts(texts: Vec<&str>, path: &str, namespace: Option<&str>) -> WcsResult<Vec<String>> {
    let empty = texts.iter().filter(|t| t.is_empty()).count();
    if empty > 0 {
        if empty == texts.len() {
            return Err(WcsError::malformed(format!(
                "{} element(s) do not contain text.",
                display_path(path, namespace)
            )));
        }
        tracing::warn!(
            path,
            with_text = texts.len() - empty,
            total = texts.len(),
            "some elements contain no text and were skipped"
        );
    }
    Ok(texts
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect())
}

fn namespace_of(res: &ResolveResult) -> Option<String> {
    match res {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart,
) -> WcsResult<Element> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (res, local) = reader.resolve_attribute(attr.key);
        attributes.push(Attribute {
            namespace: namespace_of(&res),
            name: String::from_utf8_lossy(local.as_ref()).into_owned(),
            value: attr.unescape_value()?.into_owned(),
        });
    }

    Ok(Element {
        namespace,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        ..Element::default()
    })
}

fn close_element(
    elem: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> WcsResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(elem),
        None if root.is_none() => *root = Some(elem),
        None => return Err(WcsError::malformed("document has more than one root element")),
    }
    Ok(())
}

/// Parses `xml` into an element tree.
pub fn parse(xml: &str) -> WcsResult<Element> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (res, event) = reader.read_resolved_event()?;
        let namespace = namespace_of(&res);
        match event {
            Event::Start(start) => {
                let elem = open_element(&reader, namespace, &start)?;
                stack.push(elem);
            }
            Event::Empty(start) => {
                let elem = open_element(&reader, namespace, &start)?;
                close_element(elem, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let elem = stack
                    .pop()
                    .ok_or_else(|| WcsError::malformed("unbalanced closing tag"))?;
                close_element(elem, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(WcsError::malformed("document ended inside an element"));
    }
    root.ok_or_else(|| WcsError::malformed("document has no root element"))
}

/// Parses a WCS response, turning an OWS `ExceptionReport` into
/// [`WcsError::ExceptionReport`].
pub fn read_xml(xml: &str) -> WcsResult<Element> {
    let root = parse(xml)?;
    check_exception(&root)?;
    Ok(root)
}

fn check_exception(root: &Element) -> WcsResult<()> {
    if root.name() != "ExceptionReport" {
        return Ok(());
    }
    let Some(ns) = root
        .namespace()
        .filter(|ns| OWS_EXCEPTION_NAMESPACES.contains(ns))
    else {
        return Ok(());
    };
    let message = root.text_of("Exception/ExceptionText", Some(ns))?;
    Err(WcsError::ExceptionReport(message))
}
