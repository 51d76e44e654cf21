//! Parsed view of the vMix XML status snapshot.
//!
//! A snapshot looks like this (trimmed):
//!
//! ```xml
//! <vmix>
//!   <version>27.0.0.49</version>
//!   <inputs>
//!     <input key="3a0e..." number="1" type="GT" title="Draft" state="Paused">
//!       Draft
//!       <text index="0" name="Countdown.Text">30</text>
//!     </input>
//!     <input key="9b1c..." number="2" type="Colour" title="Black" state="Paused"/>
//!   </inputs>
//!   <overlays>...</overlays>
//! </vmix>
//! ```
//!
//! Only the `<inputs>` section is modelled.  The raw string is kept verbatim
//! by [`crate::DeviceState`] for clients that want the rest.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors produced by the well-formedness check and the snapshot parser.
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    /// The underlying XML reader rejected the document.
    #[error("malformed XML: {0}")]
    Xml(String),

    /// The document ended with elements still open.
    #[error("document ended with {0} unclosed element(s)")]
    Unclosed(usize),

    /// An end tag appeared with no matching start tag.
    #[error("unexpected closing tag")]
    UnbalancedClose,

    /// The document must contain exactly one root element.
    #[error("expected exactly one root element, found {0}")]
    RootCount(usize),

    /// Character data was found outside the root element.
    #[error("text content outside the root element")]
    TextOutsideRoot,
}

/// A `<text>` child of an input: one named field of a title template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextField {
    pub name: String,
    pub value: String,
}

/// One `<input>` element of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Input {
    /// The `number` attribute.  vMix numbers inputs from 1 in list order.
    pub number: Option<u32>,
    pub key: String,
    /// The `type` attribute (`GT`, `Colour`, `Video`, ...).
    pub kind: String,
    pub title: String,
    /// Playback state attribute (`Running`, `Paused`, `Completed`).
    pub state: String,
    /// Every other attribute, in document order.
    pub attributes: Vec<(String, String)>,
    /// Title-template text fields, in document order.
    pub texts: Vec<TextField>,
}

impl Input {
    /// Returns the value of the text field called `name`, if present.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    fn from_start(element: &BytesStart<'_>) -> Result<Self, SnapshotError> {
        let mut input = Input::default();
        for (name, value) in read_attributes(element)? {
            match name.as_str() {
                "number" => input.number = value.parse().ok(),
                "key" => input.key = value,
                "type" => input.kind = value,
                "title" => input.title = value,
                "state" => input.state = value,
                _ => input.attributes.push((name, value)),
            }
        }
        Ok(input)
    }
}

/// Returns `true` if `xml` is a well-formed document.
///
/// This is the validate half of the black-box XML capability: exactly one
/// root element, properly nested and matching tags, valid attributes and
/// entities, and nothing but whitespace, comments, or declarations outside
/// the root.
///
/// # Examples
///
/// ```rust
/// use vmix_core::is_well_formed;
///
/// assert!(is_well_formed("<vmix><inputs/></vmix>"));
/// assert!(!is_well_formed("<vmix><inputs></vmix>"));
/// ```
pub fn is_well_formed(xml: &str) -> bool {
    check_well_formed(xml).is_ok()
}

/// Like [`is_well_formed`] but reports why the document was rejected.
///
/// # Errors
///
/// Returns the first [`SnapshotError`] encountered.
pub fn check_well_formed(xml: &str) -> Result<(), SnapshotError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                read_attributes(&element)?;
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Ok(Event::Empty(element)) => {
                read_attributes(&element)?;
                if depth == 0 {
                    roots += 1;
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.checked_sub(1).ok_or(SnapshotError::UnbalancedClose)?;
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| SnapshotError::Xml(e.to_string()))?;
                if depth == 0 && !text.trim().is_empty() {
                    return Err(SnapshotError::TextOutsideRoot);
                }
            }
            Ok(Event::CData(_)) if depth == 0 => return Err(SnapshotError::TextOutsideRoot),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(SnapshotError::Xml(e.to_string())),
        }
    }

    if depth != 0 {
        return Err(SnapshotError::Unclosed(depth));
    }
    if roots != 1 {
        return Err(SnapshotError::RootCount(roots));
    }
    Ok(())
}

/// Parses every `<input>` under `<inputs>` in document order.
///
/// The document is validated first, so a malformed snapshot never yields a
/// partial input list.
///
/// # Errors
///
/// Returns [`SnapshotError`] if the document is not well-formed.
pub fn parse_snapshot(xml: &str) -> Result<Vec<Input>, SnapshotError> {
    check_well_formed(xml)?;

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut inputs = Vec::new();
    let mut current: Option<Input> = None;
    let mut current_text: Option<TextField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                let name = element_name(&element);
                if is_input_element(&name, &path) {
                    current = Some(Input::from_start(&element)?);
                } else if name == "text" && current.is_some() {
                    current_text = Some(text_field_from_start(&element)?);
                }
                path.push(name);
            }
            Ok(Event::Empty(element)) => {
                let name = element_name(&element);
                if is_input_element(&name, &path) {
                    inputs.push(Input::from_start(&element)?);
                } else if name == "text" {
                    if let Some(input) = current.as_mut() {
                        input.texts.push(text_field_from_start(&element)?);
                    }
                }
            }
            Ok(Event::Text(text)) => {
                if let Some(field) = current_text.as_mut() {
                    let value = text
                        .unescape()
                        .map_err(|e| SnapshotError::Xml(e.to_string()))?;
                    field.value.push_str(&value);
                }
            }
            Ok(Event::End(_)) => {
                let name = path.pop().unwrap_or_default();
                if name == "text" {
                    if let (Some(input), Some(field)) = (current.as_mut(), current_text.take()) {
                        input.texts.push(field);
                    }
                } else if is_input_element(&name, &path) {
                    if let Some(input) = current.take() {
                        inputs.push(input);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(SnapshotError::Xml(e.to_string())),
        }
    }

    Ok(inputs)
}

/// Returns the 1-based position of the first input titled `title`.
///
/// `None` means the input is not present in this snapshot.  A position is
/// never carried over from an earlier snapshot: callers recompute it every
/// time the input list is replaced.
pub fn designated_index(inputs: &[Input], title: &str) -> Option<u32> {
    inputs
        .iter()
        .position(|input| input.title == title)
        .and_then(|position| u32::try_from(position + 1).ok())
}

fn is_input_element(name: &str, parent_path: &[String]) -> bool {
    name == "input" && parent_path.last().map(String::as_str) == Some("inputs")
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn text_field_from_start(element: &BytesStart<'_>) -> Result<TextField, SnapshotError> {
    let name = read_attributes(element)?
        .into_iter()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value)
        .unwrap_or_default();
    Ok(TextField {
        name,
        value: String::new(),
    })
}

fn read_attributes(element: &BytesStart<'_>) -> Result<Vec<(String, String)>, SnapshotError> {
    element
        .attributes()
        .map(|attribute| {
            let attribute = attribute.map_err(|e| SnapshotError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| SnapshotError::Xml(e.to_string()))?
                .into_owned();
            Ok((key, value))
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
