use crate::error::{ParseError, Result};
use std::hash::{Hash, Hasher};

pub type NodeId = u32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Id(pub NodeId);

impl Id {
    /// Id of elements built outside the parser, until `assign_element_ids` runs.
    pub const UNASSIGNED: Id = Id(0);
}

/// Tag descriptor of bare text; never accepted from real input.
pub const TEXT_TAG: &str = "txt";
pub const PAR_TAG: &str = "p";
pub const BOLD_TAG: &str = "b";
pub const ITALIC_TAG: &str = "i";
pub const HTML_REF_TAG: &str = "a";
pub const REF_TAG: &str = "wikiref";
pub const IMG_TAG: &str = "img";
pub const ENTRY_TAG: &str = "li";
pub const ORD_LIST_TAG: &str = "ol";
pub const UNORD_LIST_TAG: &str = "ul";
pub const HEAD_TAG: &str = "h";

/// The closed set of element variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Unique top-level owner of a tree; never owned itself.
    Root,
    Text,
    Par,
    Bold,
    Italic,
    HtmlRef,
    Ref,
    Img,
    Entry,
    OrdList,
    UnordList,
    Head { level: u8 },
}

impl ElementKind {
    pub const MAX_HEADING_LEVEL: u8 = 6;

    /// Map a tag name to its variant.
    ///
    /// The name is trimmed, lower-cased and stripped of a leading `/`. Headings are `h1`..`h6`;
    /// anything outside the vocabulary fails with `UnrecognizedTag`. The root has no tag and
    /// cannot be produced here.
    pub fn from_tag(tag: &str) -> Result<Self> {
        let normalized = tag.trim().to_lowercase();
        let name = normalized.strip_prefix('/').unwrap_or(&normalized);

        let kind = match name {
            TEXT_TAG => ElementKind::Text,
            PAR_TAG => ElementKind::Par,
            BOLD_TAG => ElementKind::Bold,
            ITALIC_TAG => ElementKind::Italic,
            HTML_REF_TAG => ElementKind::HtmlRef,
            REF_TAG => ElementKind::Ref,
            IMG_TAG => ElementKind::Img,
            ENTRY_TAG => ElementKind::Entry,
            ORD_LIST_TAG => ElementKind::OrdList,
            UNORD_LIST_TAG => ElementKind::UnordList,
            _ => match heading_level(name) {
                Some(level) => ElementKind::Head { level },
                None => return Err(ParseError::unrecognized_tag(name)),
            },
        };
        Ok(kind)
    }

    /// Fixed tag descriptor; empty for the root.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Root => "",
            ElementKind::Text => TEXT_TAG,
            ElementKind::Par => PAR_TAG,
            ElementKind::Bold => BOLD_TAG,
            ElementKind::Italic => ITALIC_TAG,
            ElementKind::HtmlRef => HTML_REF_TAG,
            ElementKind::Ref => REF_TAG,
            ElementKind::Img => IMG_TAG,
            ElementKind::Entry => ENTRY_TAG,
            ElementKind::OrdList => ORD_LIST_TAG,
            ElementKind::UnordList => UNORD_LIST_TAG,
            ElementKind::Head { .. } => HEAD_TAG,
        }
    }
}

fn heading_level(name: &str) -> Option<u8> {
    let b = name.as_bytes();
    if b.len() == 2 && b[0] == b'h' && (b'1'..=b'0' + ElementKind::MAX_HEADING_LEVEL).contains(&b[1])
    {
        Some(b[1] - b'0')
    } else {
        None
    }
}

/// A node of the document tree.
///
/// `text` and `children` are mutually exclusive: attaching a child clears the text, so an element
/// is either a leaf carrying text or a composite carrying ordered children.
#[derive(Debug)]
pub struct Element {
    id: Id,
    kind: ElementKind,
    text: String,
    children: Vec<Element>,
    parent: Option<Id>,
    attributes: Vec<(String, Option<String>)>,
    closing: bool,
}

impl Element {
    pub fn new(kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            id: Id::UNASSIGNED,
            kind,
            text: text.into(),
            children: Vec::new(),
            parent: None,
            attributes: Vec::new(),
            closing: false,
        }
    }

    pub fn root() -> Self {
        Self::new(ElementKind::Root, "")
    }

    /// Element factory: the variant for `tag`, seeded with `text`.
    pub fn create_for(tag: &str, text: impl Into<String>) -> Result<Self> {
        Ok(Self::new(ElementKind::from_tag(tag)?, text))
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    /// Heading level, for `Head` elements only.
    pub fn level(&self) -> Option<u8> {
        match self.kind {
            ElementKind::Head { level } => Some(level),
            _ => None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.kind == ElementKind::Root
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn count(&self) -> usize {
        self.children.len()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.children.get(index)
    }

    pub fn last(&self) -> Option<&Element> {
        self.children.last()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether this is a traversal-only "end of element" marker.
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Id of the owning element, once attached.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Attach `child` as the last child, taking ownership of it. Clears this element's text.
    pub fn add(&mut self, mut child: Element) {
        child.parent = Some(self.id);
        self.children.push(child);
        self.text.clear();
    }

    pub fn attributes(&self) -> &[(String, Option<String>)] {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Vec<(String, Option<String>)>) {
        self.attributes = attributes;
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes
            .push((name.to_ascii_lowercase(), Some(value.to_string())));
        self
    }

    /// Value of attribute `name`; bare attributes yield `Some("")`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// A closing pseudo-node mirroring this element: same id, variant and attributes, no text and
    /// no children.
    pub fn copy_as_closing(&self) -> Element {
        Element {
            id: self.id,
            kind: self.kind,
            text: String::new(),
            children: Vec::new(),
            parent: self.parent,
            attributes: self.attributes.clone(),
            closing: true,
        }
    }

    /// This element without its children.
    fn shallow_copy(&self) -> Element {
        Element {
            id: self.id,
            kind: self.kind,
            text: self.text.clone(),
            children: Vec::with_capacity(self.children.len()),
            parent: self.parent,
            attributes: self.attributes.clone(),
            closing: self.closing,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Element] {
        &mut self.children
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Id>) {
        self.parent = parent;
    }
}

// Copies, comparisons and drops walk the tree with explicit stacks so very deep trees cannot
// overflow the call stack.
impl Drop for Element {
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut child) = stack.pop() {
            stack.append(&mut child.children);
        }
    }
}

impl Clone for Element {
    fn clone(&self) -> Self {
        let mut copy = self.shallow_copy();
        let mut pending = self.children.iter();
        let mut open = Vec::new();
        loop {
            match pending.next() {
                Some(child) => {
                    let parent = std::mem::replace(&mut copy, child.shallow_copy());
                    let siblings = std::mem::replace(&mut pending, child.children.iter());
                    open.push((siblings, parent));
                }
                None => match open.pop() {
                    Some((siblings, mut parent)) => {
                        parent.children.push(copy);
                        copy = parent;
                        pending = siblings;
                    }
                    None => return copy,
                },
            }
        }
    }
}

/// Structural equality: same text and pairwise-equal children, in order.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.text != b.text || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
        self.children.len().hash(state);
    }
}

/// A parsed note: the head title plus the root-owned tree of the body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub root: Element,
}

impl Document {
    /// Wrap a tree built by hand, giving ids to unnumbered elements and linking parents.
    pub fn new(title: impl Into<String>, mut root: Element) -> Self {
        crate::traverse::assign_element_ids(&mut root);
        Self {
            title: title.into(),
            root,
        }
    }

    pub fn find(&self, id: Id) -> Option<&Element> {
        crate::traverse::find_element_by_id(&self.root, id)
    }

    /// Resolve the non-owning parent back-reference of `element`.
    pub fn parent_of(&self, element: &Element) -> Option<&Element> {
        element.parent().and_then(|id| self.find(id))
    }
}
