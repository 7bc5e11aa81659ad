//! Core data model for page-builder documents.
//!
//! A document is a tree of `ComponentNode` values keyed by `NodeId`.
//! Each node carries its own ordered `children` list and a back-link to its
//! parent; the pair is kept consistent by `PageTree`, the only mutator.
//! `children` order is paint order.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Component props: string keys → JSON values, interpreted per type.
pub type Props = BTreeMap<String, Value>;

/// Inline styles: camelCase CSS property → value. Order is irrelevant.
pub type StyleMap = BTreeMap<String, String>;

/// Ordered child list. Most components hold only a handful of children.
pub type ChildList = SmallVec<[NodeId; 4]>;

// ─── Component types ─────────────────────────────────────────────────────

/// The closed set of component kinds a page can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    /// The page body. Exactly one per document, never inserted by users.
    Root,

    // Layout
    Section,
    #[default]
    Container,
    Grid,
    Flex,
    Columns,
    Card,
    Hero,
    Navbar,
    Footer,
    Form,
    List,

    // Content
    Heading,
    Paragraph,
    Text,
    Link,
    Button,
    Image,
    Video,
    Icon,
    Divider,
    Spacer,
    ListItem,
    Embed,

    // Form controls
    Input,
    Textarea,
    Select,
    Checkbox,
}

impl ComponentType {
    /// Every type, in palette order.
    pub const ALL: [ComponentType; 28] = [
        ComponentType::Root,
        ComponentType::Section,
        ComponentType::Container,
        ComponentType::Grid,
        ComponentType::Flex,
        ComponentType::Columns,
        ComponentType::Card,
        ComponentType::Hero,
        ComponentType::Navbar,
        ComponentType::Footer,
        ComponentType::Form,
        ComponentType::List,
        ComponentType::Heading,
        ComponentType::Paragraph,
        ComponentType::Text,
        ComponentType::Link,
        ComponentType::Button,
        ComponentType::Image,
        ComponentType::Video,
        ComponentType::Icon,
        ComponentType::Divider,
        ComponentType::Spacer,
        ComponentType::ListItem,
        ComponentType::Embed,
        ComponentType::Input,
        ComponentType::Textarea,
        ComponentType::Select,
        ComponentType::Checkbox,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Section => "section",
            Self::Container => "container",
            Self::Grid => "grid",
            Self::Flex => "flex",
            Self::Columns => "columns",
            Self::Card => "card",
            Self::Hero => "hero",
            Self::Navbar => "navbar",
            Self::Footer => "footer",
            Self::Form => "form",
            Self::List => "list",
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::Text => "text",
            Self::Link => "link",
            Self::Button => "button",
            Self::Image => "image",
            Self::Video => "video",
            Self::Icon => "icon",
            Self::Divider => "divider",
            Self::Spacer => "spacer",
            Self::ListItem => "list-item",
            Self::Embed => "embed",
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
        }
    }

    /// Whether this type's contract accepts and displays children.
    ///
    /// This is the single capability flag consulted by inserts, moves and
    /// drop resolution.
    pub fn accepts_children(self) -> bool {
        matches!(
            self,
            Self::Root
                | Self::Section
                | Self::Container
                | Self::Grid
                | Self::Flex
                | Self::Columns
                | Self::Card
                | Self::Hero
                | Self::Navbar
                | Self::Footer
                | Self::Form
                | Self::List
                | Self::ListItem
        )
    }

    /// Label shown in the layers panel for freshly inserted nodes.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Root => "Page",
            Self::Section => "Section",
            Self::Container => "Container",
            Self::Grid => "Grid",
            Self::Flex => "Flex Row",
            Self::Columns => "Columns",
            Self::Card => "Card",
            Self::Hero => "Hero",
            Self::Navbar => "Navbar",
            Self::Footer => "Footer",
            Self::Form => "Form",
            Self::List => "List",
            Self::Heading => "Heading",
            Self::Paragraph => "Paragraph",
            Self::Text => "Text",
            Self::Link => "Link",
            Self::Button => "Button",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Icon => "Icon",
            Self::Divider => "Divider",
            Self::Spacer => "Spacer",
            Self::ListItem => "List Item",
            Self::Embed => "Embed",
            Self::Input => "Input",
            Self::Textarea => "Text Area",
            Self::Select => "Select",
            Self::Checkbox => "Checkbox",
        }
    }

    /// HTML element the renderer uses for this type.
    pub fn html_tag(self) -> &'static str {
        match self {
            Self::Root => "main",
            Self::Section | Self::Hero => "section",
            Self::Container | Self::Grid | Self::Flex | Self::Columns | Self::Card => "div",
            Self::Navbar => "nav",
            Self::Footer => "footer",
            Self::Form => "form",
            Self::List => "ul",
            Self::ListItem => "li",
            Self::Heading => "h2",
            Self::Paragraph => "p",
            Self::Text | Self::Icon => "span",
            Self::Link => "a",
            Self::Button => "button",
            Self::Image => "img",
            Self::Video => "video",
            Self::Divider => "hr",
            Self::Spacer | Self::Embed => "div",
            Self::Input | Self::Checkbox => "input",
            Self::Textarea => "textarea",
            Self::Select => "select",
        }
    }

    /// Props a new node of this type starts with.
    pub fn default_props(self) -> Props {
        let value = match self {
            Self::Heading => json!({ "text": "Heading", "level": 2 }),
            Self::Paragraph => json!({ "text": "Write something here." }),
            Self::Text => json!({ "text": "Text" }),
            Self::Link => json!({ "text": "Link", "href": "#" }),
            Self::Button => json!({ "text": "Button", "href": "" }),
            Self::Image => json!({ "src": "", "alt": "" }),
            Self::Video => json!({ "src": "", "autoplay": false, "controls": true }),
            Self::Icon => json!({ "name": "star" }),
            Self::Embed => json!({ "html": "" }),
            Self::Input => json!({ "placeholder": "Enter text", "inputType": "text" }),
            Self::Textarea => json!({ "placeholder": "Enter text", "rows": 4 }),
            Self::Select => json!({ "options": ["Option 1", "Option 2"] }),
            Self::Checkbox => json!({ "label": "Checkbox", "checked": false }),
            Self::Grid => json!({ "columns": 3 }),
            Self::Columns => json!({ "count": 2 }),
            Self::Hero => json!({ "title": "Hero title", "subtitle": "" }),
            Self::Navbar => json!({ "brand": "Brand" }),
            Self::Form => json!({ "action": "" }),
            Self::List => json!({ "ordered": false }),
            _ => json!({}),
        };
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => Props::new(),
        }
    }

    /// Inline styles a new node of this type starts with.
    pub fn default_styles(self) -> StyleMap {
        let pairs: &[(&str, &str)] = match self {
            Self::Section => &[("padding", "48px 24px"), ("width", "100%")],
            Self::Container => &[("padding", "16px"), ("maxWidth", "1200px"), ("margin", "0 auto")],
            Self::Grid => &[
                ("display", "grid"),
                ("gridTemplateColumns", "repeat(3, 1fr)"),
                ("gap", "16px"),
            ],
            Self::Flex => &[("display", "flex"), ("gap", "16px"), ("alignItems", "center")],
            Self::Columns => &[
                ("display", "grid"),
                ("gridTemplateColumns", "1fr 1fr"),
                ("gap", "24px"),
            ],
            Self::Card => &[
                ("padding", "24px"),
                ("borderRadius", "8px"),
                ("boxShadow", "0 1px 3px rgba(0,0,0,0.12)"),
            ],
            Self::Hero => &[("padding", "96px 24px"), ("textAlign", "center")],
            Self::Navbar => &[
                ("display", "flex"),
                ("justifyContent", "space-between"),
                ("padding", "16px 24px"),
            ],
            Self::Footer => &[("padding", "32px 24px")],
            Self::Button => &[
                ("padding", "10px 20px"),
                ("borderRadius", "6px"),
                ("cursor", "pointer"),
            ],
            Self::Image => &[("maxWidth", "100%"), ("height", "auto")],
            Self::Divider => &[("borderTop", "1px solid #e5e7eb"), ("margin", "16px 0")],
            Self::Spacer => &[("height", "32px")],
            Self::Input | Self::Textarea | Self::Select => &[
                ("padding", "8px 12px"),
                ("border", "1px solid #d1d5db"),
                ("borderRadius", "4px"),
            ],
            _ => &[],
        };
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| format!("unknown component type `{s}`"))
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A single component in the page tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    pub id: NodeId,

    #[serde(rename = "type")]
    pub ty: ComponentType,

    /// Mutable, non-unique label for the layers panel.
    pub name: String,

    #[serde(default)]
    pub props: Props,

    #[serde(default)]
    pub styles: StyleMap,

    /// Child IDs in paint order.
    #[serde(default)]
    pub children: ChildList,

    /// `None` only for the root.
    #[serde(default)]
    pub parent_id: Option<NodeId>,

    #[serde(default)]
    pub is_hidden: bool,

    #[serde(default)]
    pub is_locked: bool,
}

impl ComponentNode {
    /// A detached node with the type's default name, props and styles.
    pub fn new(id: NodeId, ty: ComponentType) -> Self {
        Self {
            id,
            ty,
            name: ty.default_name().to_string(),
            props: ty.default_props(),
            styles: ty.default_styles(),
            children: ChildList::new(),
            parent_id: None,
            is_hidden: false,
            is_locked: false,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Container-capable: the type accepts children, or the node already
    /// holds some (documents from older builders may nest under leaves).
    pub fn can_host_children(&self) -> bool {
        self.ty.accepts_children() || !self.children.is_empty()
    }

    /// Read a string prop, e.g. a button's `text`.
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }
}

/// Description of a node to insert. `PageTree::insert` assigns the ID when
/// absent and fills unspecified fields from the type's defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    #[serde(default)]
    pub id: Option<NodeId>,
    #[serde(rename = "type")]
    pub ty: ComponentType,
    #[serde(default)]
    pub name: Option<String>,
    /// Merged over the type's default props.
    #[serde(default)]
    pub props: Props,
    /// Merged over the type's default styles.
    #[serde(default)]
    pub styles: StyleMap,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub is_locked: bool,
}

impl NewNode {
    pub fn new(ty: ComponentType) -> Self {
        Self {
            ty,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }

    /// Materialize into a detached node with the given ID.
    pub(crate) fn into_node(self, id: NodeId) -> ComponentNode {
        let mut node = ComponentNode::new(id, self.ty);
        if let Some(name) = self.name {
            node.name = name;
        }
        node.props.extend(self.props);
        node.styles.extend(self.styles);
        node.is_hidden = self.is_hidden;
        node.is_locked = self.is_locked;
        node
    }
}
