// src/core/tree.rs

//! The element tree of a bucket.
//!
//! Elements live in an arena owned by [`Tree`] and are addressed through
//! [`ElemId`] handles. A node keeps its raw YAML mapping until its children are
//! first requested; only then are child slots created. Parents are plain
//! handles, so `path()` and `level()` are walks up the arena.

use crate::constants::{PLACEHOLDER_NAME, ROOT_NODE_NAME};
use crate::core::commons::key_name;
use crate::core::sorting::SortKey;
use serde_yaml::{Mapping, Value};
use std::collections::{HashSet, VecDeque};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("element \"{name}\" does not exist in this {kind}")]
    ElementNotFound { name: String, kind: &'static str },
    #[error("element index out of range (1-{count})")]
    IndexOutOfRange { count: usize },
    #[error("item index out of range (1-{count})")]
    ItemIndexOutOfRange { count: usize },
    #[error("too many names or numbers")]
    TooManyNames,
    #[error("invalid content format")]
    InvalidContent,
    #[error("\"{0}\" is not a node")]
    NotANode(String),
    #[error("\"{0}\" is not an attribute")]
    NotAnAttribute(String),
    #[error("cannot list non-list-type attribute")]
    NotListAttribute,
    #[error("must use an integer to index list-type attribute")]
    ItemIndexNotNumber,
    #[error("unknown element type \"{0}\"")]
    UnknownElementType(String),
    #[error("unsupported element name {0}")]
    UnsupportedKey(String),
    #[error("unknown type for attribute content")]
    UnknownAttributeContent,
    #[error("element \"{name}\" already exists in this {kind}")]
    AlreadyExists { name: String, kind: &'static str },
    #[error("cannot add dict-type content to list-type attribute")]
    DictIntoList,
    #[error("cannot add contents to non-list-type attribute")]
    NotListForAdd,
}

/// Opaque handle to an element of a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElemId(usize);

/// What a node looks like from its children.
///
/// A node is directory-like when at least one child is a node and file-like
/// when at least one child is an attribute. Mixed nodes are both; empty nodes
/// are neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeKind {
    pub directory: bool,
    pub file: bool,
}

impl NodeKind {
    /// Classifies a node from the shapes of its children, where each item
    /// tells whether that child is mapping-valued.
    pub fn classify<I: IntoIterator<Item = bool>>(child_is_mapping: I) -> Self {
        child_is_mapping
            .into_iter()
            .fold(Self::default(), |kind, is_mapping| Self {
                directory: kind.directory || is_mapping,
                file: kind.file || !is_mapping,
            })
    }

    pub fn initial(self) -> char {
        if self.directory {
            'D'
        } else if self.file {
            'F'
        } else {
            'N'
        }
    }

    pub fn label(self) -> &'static str {
        if self.directory {
            "directory"
        } else if self.file {
            "file"
        } else {
            "node"
        }
    }
}

/// Element filter accepted by `--type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemType {
    File,
    Directory,
    Node,
    Attribute,
}

impl FromStr for ElemType {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "directory" => Ok(Self::Directory),
            "node" => Ok(Self::Node),
            "attribute" => Ok(Self::Attribute),
            _ => Err(TreeError::UnknownElementType(s.to_string())),
        }
    }
}

/// How the children of a node are presented and numbered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Sort by the content of this attribute instead of by name.
    pub sort_by: Option<String>,
    /// Keep document order. Overrides `sort_by`.
    pub unordered: bool,
    pub elem_type: Option<ElemType>,
}

#[derive(Debug)]
enum NodeState {
    Pending(Value),
    Expanded { children: Vec<ElemId>, kind: NodeKind },
}

#[derive(Debug)]
enum Body {
    Node(NodeState),
    Attribute(Value),
}

#[derive(Debug)]
struct Slot {
    name: String,
    key: Value,
    parent: Option<ElemId>,
    body: Body,
}

#[derive(Debug)]
pub struct Tree {
    slots: Vec<Slot>,
}

impl Tree {
    /// Builds a tree whose root node wraps `content`. Nothing is expanded yet.
    pub fn new(content: Value) -> Self {
        let root = Slot {
            name: ROOT_NODE_NAME.to_string(),
            key: Value::String(ROOT_NODE_NAME.to_string()),
            parent: None,
            body: Body::Node(NodeState::Pending(content)),
        };
        Self { slots: vec![root] }
    }

    pub fn root(&self) -> ElemId {
        ElemId(0)
    }

    fn slot(&self, id: ElemId) -> &Slot {
        self.slots
            .get(id.0)
            .expect("element handles are only created by their own tree")
    }

    fn slot_mut(&mut self, id: ElemId) -> &mut Slot {
        self.slots
            .get_mut(id.0)
            .expect("element handles are only created by their own tree")
    }

    fn push_slot(&mut self, name: String, key: Value, parent: ElemId, content: Value) -> ElemId {
        let body = if content.is_mapping() {
            Body::Node(NodeState::Pending(content))
        } else {
            Body::Attribute(content)
        };
        self.slots.push(Slot {
            name,
            key,
            parent: Some(parent),
            body,
        });
        ElemId(self.slots.len() - 1)
    }

    // --- Element properties ---

    pub fn name(&self, id: ElemId) -> &str {
        &self.slot(id).name
    }

    pub fn parent(&self, id: ElemId) -> Option<ElemId> {
        self.slot(id).parent
    }

    pub fn is_root(&self, id: ElemId) -> bool {
        self.slot(id).parent.is_none()
    }

    pub fn is_node(&self, id: ElemId) -> bool {
        matches!(self.slot(id).body, Body::Node(_))
    }

    pub fn is_attribute(&self, id: ElemId) -> bool {
        matches!(self.slot(id).body, Body::Attribute(_))
    }

    /// Depth of the element; the root is at level 0.
    pub fn level(&self, id: ElemId) -> usize {
        let mut level = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            level += 1;
            current = self.parent(parent);
        }
        level
    }

    /// Names from the first level down to `id`. The root's path is empty.
    pub fn path(&self, id: ElemId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(elem) = current {
            if self.is_root(elem) {
                break;
            }
            names.push(self.name(elem).to_string());
            current = self.parent(elem);
        }
        names.reverse();
        names
    }

    /// The kind of a node, or `None` for attributes.
    ///
    /// Unexpanded nodes are classified from their stored mapping without
    /// materializing children.
    pub fn kind(&self, id: ElemId) -> Option<NodeKind> {
        match &self.slot(id).body {
            Body::Attribute(_) => None,
            Body::Node(NodeState::Expanded { kind, .. }) => Some(*kind),
            Body::Node(NodeState::Pending(content)) => Some(match content.as_mapping() {
                Some(mapping) => NodeKind::classify(mapping.values().map(Value::is_mapping)),
                None => NodeKind::default(),
            }),
        }
    }

    /// The letter shown in listings: `D`, `F` or `N` for nodes, `A` for attributes.
    pub fn kind_initial(&self, id: ElemId) -> char {
        self.kind(id).map_or('A', NodeKind::initial)
    }

    fn kind_label(&self, id: ElemId) -> &'static str {
        self.kind(id).map_or("attribute", NodeKind::label)
    }

    pub fn matches_type(&self, id: ElemId, elem_type: ElemType) -> bool {
        match (elem_type, self.kind(id)) {
            (ElemType::Attribute, kind) => kind.is_none(),
            (ElemType::Node, kind) => kind.is_some(),
            (ElemType::File, Some(kind)) => kind.file,
            (ElemType::Directory, Some(kind)) => kind.directory,
            (_, None) => false,
        }
    }

    // --- Children ---

    fn cached_children(&self, id: ElemId) -> Option<&[ElemId]> {
        match &self.slot(id).body {
            Body::Node(NodeState::Expanded { children, .. }) => Some(children),
            _ => None,
        }
    }

    fn cached_children_mut(&mut self, id: ElemId) -> Option<&mut Vec<ElemId>> {
        match &mut self.slot_mut(id).body {
            Body::Node(NodeState::Expanded { children, .. }) => Some(children),
            _ => None,
        }
    }

    fn refresh_kind(&mut self, id: ElemId) {
        let Some(children) = self.cached_children(id) else {
            return;
        };
        let new_kind = NodeKind::classify(children.iter().map(|child| self.is_node(*child)));
        if let Body::Node(NodeState::Expanded { kind, .. }) = &mut self.slot_mut(id).body {
            *kind = new_kind;
        }
    }

    /// Materializes the children of a node from its stored mapping.
    fn expand(&mut self, id: ElemId) -> Result<(), TreeError> {
        let mapping = match &self.slot(id).body {
            Body::Attribute(_) => return Err(TreeError::NotANode(self.name(id).to_string())),
            Body::Node(NodeState::Expanded { .. }) => return Ok(()),
            Body::Node(NodeState::Pending(content)) => {
                content.as_mapping().ok_or(TreeError::InvalidContent)?
            }
        };

        // Validate every key before touching the arena.
        let mut seen = HashSet::new();
        for key in mapping.keys() {
            let name = key_name(key).ok_or_else(|| TreeError::UnsupportedKey(describe_key(key)))?;
            if !seen.insert(name.clone()) {
                return Err(TreeError::AlreadyExists {
                    name,
                    kind: self.kind_label(id),
                });
            }
        }

        let state = match &mut self.slot_mut(id).body {
            Body::Node(state) => std::mem::replace(
                state,
                NodeState::Expanded {
                    children: Vec::new(),
                    kind: NodeKind::default(),
                },
            ),
            Body::Attribute(_) => return Ok(()),
        };
        let NodeState::Pending(Value::Mapping(mapping)) = state else {
            return Err(TreeError::InvalidContent);
        };

        let mut children = Vec::with_capacity(mapping.len());
        for (key, content) in mapping {
            let name = key_name(&key).unwrap_or_default();
            children.push(self.push_slot(name, key, id, content));
        }
        log::trace!(
            "Expanded '{}' into {} children.",
            self.name(id),
            children.len()
        );
        if let Some(cached) = self.cached_children_mut(id) {
            *cached = children;
        }
        self.refresh_kind(id);
        Ok(())
    }

    /// Children of a node in document order, materializing them on first call.
    pub fn children_of(&mut self, id: ElemId) -> Result<&[ElemId], TreeError> {
        self.expand(id)?;
        self.cached_children(id).ok_or(TreeError::InvalidContent)
    }

    /// Looks up a child by its exact name.
    pub fn find_child(&mut self, id: ElemId, name: &str) -> Result<Option<ElemId>, TreeError> {
        self.expand(id)?;
        Ok(self
            .cached_children(id)
            .unwrap_or_default()
            .iter()
            .copied()
            .find(|child| self.name(*child) == name))
    }

    pub fn get_by_name(&mut self, id: ElemId, name: &str) -> Result<ElemId, TreeError> {
        self.find_child(id, name)?
            .ok_or_else(|| TreeError::ElementNotFound {
                name: name.to_string(),
                kind: self.kind_label(id),
            })
    }

    /// The children of a node filtered and ordered by `view`.
    pub fn list_view(&mut self, id: ElemId, view: &ViewOptions) -> Result<Vec<ElemId>, TreeError> {
        let mut children = self.children_of(id)?.to_vec();
        if let Some(elem_type) = view.elem_type {
            children.retain(|child| self.matches_type(*child, elem_type));
        }
        if view.unordered {
            return Ok(children);
        }
        match &view.sort_by {
            None => children.sort_by(|a, b| self.name(*a).cmp(self.name(*b))),
            Some(attr) => {
                let mut keyed = Vec::with_capacity(children.len());
                for child in children {
                    keyed.push((self.sort_key(child, attr)?, child));
                }
                keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
                children = keyed.into_iter().map(|(_, child)| child).collect();
            }
        }
        Ok(children)
    }

    /// The sort key of an element for the attribute `attr`. Attributes and
    /// nodes without that attribute yield [`SortKey::Missing`].
    pub fn sort_key(&mut self, id: ElemId, attr: &str) -> Result<SortKey, TreeError> {
        if self.is_attribute(id) {
            return Ok(SortKey::Missing);
        }
        Ok(match self.attribute(id, attr)? {
            Some(found) => self
                .content(found)
                .map_or(SortKey::Missing, SortKey::from_value),
            None => SortKey::Missing,
        })
    }

    /// Looks up the `n`-th (1-based) element of `list_view(id, view)`.
    pub fn get_by_number(
        &mut self,
        id: ElemId,
        n: usize,
        view: &ViewOptions,
    ) -> Result<ElemId, TreeError> {
        let elems = self.list_view(id, view)?;
        n.checked_sub(1)
            .and_then(|index| elems.get(index))
            .copied()
            .ok_or(TreeError::IndexOutOfRange { count: elems.len() })
    }

    /// Resolves a user token against the children of a node.
    ///
    /// A token made of digits names a child literally when such a child
    /// exists; otherwise it is an ordinal into the view.
    pub fn resolve(&mut self, id: ElemId, token: &str, view: &ViewOptions) -> Result<ElemId, TreeError> {
        if !is_ordinal(token) {
            return self.get_by_name(id, token);
        }
        if let Some(child) = self.find_child(id, token)? {
            return Ok(child);
        }
        let n = token.parse().unwrap_or(usize::MAX);
        self.get_by_number(id, n, view)
    }

    // --- Attributes ---

    /// Content of an attribute, or `None` for nodes.
    pub fn content(&self, id: ElemId) -> Option<&Value> {
        match &self.slot(id).body {
            Body::Attribute(content) => Some(content),
            Body::Node(_) => None,
        }
    }

    /// The attribute child of a node named `name`, if any.
    pub fn attribute(&mut self, id: ElemId, name: &str) -> Result<Option<ElemId>, TreeError> {
        Ok(self
            .find_child(id, name)?
            .filter(|child| self.is_attribute(*child)))
    }

    /// Attribute children of a node as `(name, content)` pairs in document order.
    pub fn attributes(&mut self, id: ElemId) -> Result<Vec<(String, Value)>, TreeError> {
        let children = self.children_of(id)?.to_vec();
        Ok(children
            .into_iter()
            .filter_map(|child| {
                self.content(child)
                    .map(|content| (self.name(child).to_string(), content.clone()))
            })
            .collect())
    }

    pub fn has_items(&self, id: ElemId) -> bool {
        matches!(self.content(id), Some(Value::Sequence(_)))
    }

    fn items(&self, id: ElemId) -> Result<&Vec<Value>, TreeError> {
        match &self.slot(id).body {
            Body::Attribute(Value::Sequence(items)) => Ok(items),
            Body::Attribute(_) => Err(TreeError::NotListAttribute),
            Body::Node(_) => Err(TreeError::NotAnAttribute(self.name(id).to_string())),
        }
    }

    /// The `n`-th (1-based) item of a list attribute.
    pub fn item(&self, id: ElemId, n: usize) -> Result<&Value, TreeError> {
        let items = self.items(id)?;
        n.checked_sub(1)
            .and_then(|index| items.get(index))
            .ok_or(TreeError::ItemIndexOutOfRange { count: items.len() })
    }

    // --- Mutation ---

    /// Adds a child named `name` to a node. Mapping content becomes a node,
    /// anything else an attribute.
    pub fn add(&mut self, id: ElemId, name: &str, content: Value) -> Result<ElemId, TreeError> {
        if self.find_child(id, name)?.is_some() {
            return Err(TreeError::AlreadyExists {
                name: name.to_string(),
                kind: self.kind_label(id),
            });
        }

        let placeholder = match self.cached_children(id) {
            Some(&[only]) if self.is_attribute(only) && self.name(only) == PLACEHOLDER_NAME => {
                Some(only)
            }
            _ => None,
        };

        let child = self.push_slot(name.to_string(), Value::String(name.to_string()), id, content);
        if let Some(children) = self.cached_children_mut(id) {
            if let Some(placeholder) = placeholder {
                children.retain(|c| *c != placeholder);
            }
            children.push(child);
        }
        self.refresh_kind(id);
        log::debug!("Added '{}' to '{}'.", name, self.name(id));
        Ok(child)
    }

    /// Removes the child `name` from a node. A node left without children
    /// receives the placeholder attribute.
    pub fn delete(&mut self, id: ElemId, name: &str) -> Result<(), TreeError> {
        let child = self.get_by_name(id, name)?;
        let emptied = match self.cached_children_mut(id) {
            Some(children) => {
                children.retain(|c| *c != child);
                children.is_empty()
            }
            None => false,
        };
        if emptied {
            let placeholder = self.push_slot(
                PLACEHOLDER_NAME.to_string(),
                Value::String(PLACEHOLDER_NAME.to_string()),
                id,
                Value::String(String::new()),
            );
            if let Some(children) = self.cached_children_mut(id) {
                children.push(placeholder);
            }
        }
        self.refresh_kind(id);
        log::debug!("Deleted '{}' from '{}'.", name, self.name(id));
        Ok(())
    }

    /// Appends an item to a list attribute.
    pub fn add_item(&mut self, id: ElemId, content: Value) -> Result<(), TreeError> {
        let name = self.name(id).to_string();
        match &mut self.slot_mut(id).body {
            Body::Node(_) => Err(TreeError::NotAnAttribute(name)),
            Body::Attribute(Value::Sequence(items)) => {
                if content.is_mapping() {
                    return Err(TreeError::DictIntoList);
                }
                items.push(content);
                Ok(())
            }
            Body::Attribute(_) => Err(TreeError::NotListForAdd),
        }
    }

    /// Removes and returns the `n`-th (1-based) item of a list attribute.
    pub fn delete_item(&mut self, id: ElemId, n: usize) -> Result<Value, TreeError> {
        let count = self.items(id)?.len();
        match &mut self.slot_mut(id).body {
            Body::Attribute(Value::Sequence(items)) if (1..=count).contains(&n) => {
                Ok(items.remove(n - 1))
            }
            _ => Err(TreeError::ItemIndexOutOfRange { count }),
        }
    }

    // --- Whole-tree operations ---

    /// Rebuilds the YAML value of an element. Unexpanded nodes contribute
    /// their stored mapping as is.
    pub fn node_value(&self, id: ElemId) -> Value {
        match &self.slot(id).body {
            Body::Attribute(content) => content.clone(),
            Body::Node(NodeState::Pending(content)) => content.clone(),
            Body::Node(NodeState::Expanded { children, .. }) => {
                let mut mapping = Mapping::with_capacity(children.len());
                for child in children {
                    mapping.insert(self.slot(*child).key.clone(), self.node_value(*child));
                }
                Value::Mapping(mapping)
            }
        }
    }

    pub fn to_value(&self) -> Value {
        self.node_value(self.root())
    }

    /// Materializes every node of the tree.
    pub fn expand_all(&mut self) -> Result<(), TreeError> {
        let mut queue = VecDeque::from([self.root()]);
        while let Some(id) = queue.pop_front() {
            let children = self.children_of(id)?.to_vec();
            queue.extend(children.into_iter().filter(|child| self.is_node(*child)));
        }
        Ok(())
    }

    /// Every node below the root in breadth-first order.
    pub fn descendant_nodes(&mut self) -> Result<Vec<ElemId>, TreeError> {
        let mut found = Vec::new();
        let mut queue = VecDeque::from([self.root()]);
        while let Some(id) = queue.pop_front() {
            let children = self.children_of(id)?.to_vec();
            for child in children.into_iter().filter(|child| self.is_node(*child)) {
                found.push(child);
                queue.push_back(child);
            }
        }
        Ok(found)
    }
}

/// True for non-empty tokens made only of ASCII digits.
pub fn is_ordinal(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn describe_key(key: &Value) -> String {
    serde_yaml::to_string(key)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{:?}", key))
}
