// src/core/indexer.rs

//! Resolves a sequence of user tokens to an element of the tree.
//!
//! Tokens are consumed left to right starting at the root. A node resolves a
//! token by name or by ordinal, a list attribute by item number. Once an item
//! is reached the target is pinned and further tokens are an error.

use crate::constants::DEFAULT_ATTR_NAME;
use crate::core::commons::render_value;
use crate::core::listing::{ListOptions, ListingError, Lines, indent, path_header};
use crate::core::template::expand_attribute;
use crate::core::tree::{ElemId, Tree, TreeError, is_ordinal};

/// What a path resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Element(ElemId),
    /// The `index`-th (1-based) item of a list attribute.
    Item { attr: ElemId, index: usize },
}

impl Target {
    /// The element the target lives in: the element itself, or the list
    /// attribute holding the item.
    pub fn elem(self) -> ElemId {
        match self {
            Self::Element(id) => id,
            Self::Item { attr, .. } => attr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub target: Target,
    /// The element the last token was resolved against; `None` when no token
    /// was given.
    pub parent: Option<ElemId>,
}

/// Resolves `tokens` from the root, emitting path lines into `lines` as it goes.
pub fn locate<S: AsRef<str>>(
    tree: &mut Tree,
    tokens: &[S],
    options: &ListOptions,
    lines: &mut Lines,
) -> Result<Resolution, ListingError> {
    let mut current = Target::Element(tree.root());
    let mut parent = None;

    for token in tokens {
        let token = token.as_ref();
        log::trace!("Resolving token '{}' from {:?}.", token, current);
        let id = match current {
            Target::Item { .. } => return Err(TreeError::TooManyNames.into()),
            Target::Element(id) => id,
        };
        parent = Some(id);

        current = if tree.is_node(id) {
            if options.show_path {
                path_header(tree, id, lines);
            }
            Target::Element(tree.resolve(id, token, &options.view)?)
        } else {
            pin_item(tree, id, token, options, lines)?
        };
    }

    Ok(Resolution {
        target: current,
        parent,
    })
}

fn pin_item(
    tree: &mut Tree,
    attr: ElemId,
    token: &str,
    options: &ListOptions,
    lines: &mut Lines,
) -> Result<Target, ListingError> {
    if !tree.has_items(attr) {
        return Err(TreeError::NotListAttribute.into());
    }
    if !is_ordinal(token) {
        return Err(TreeError::ItemIndexNotNumber.into());
    }
    let index = token.parse().unwrap_or(usize::MAX);

    let item = if options.expand {
        let expanded = expand_attribute(tree, attr, DEFAULT_ATTR_NAME)?;
        let items = expanded.as_sequence().map(Vec::as_slice).unwrap_or_default();
        index
            .checked_sub(1)
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or(TreeError::ItemIndexOutOfRange { count: items.len() })?
    } else {
        tree.item(attr, index)?.clone()
    };

    let prefix = if options.show_path {
        indent(tree.level(attr) + 1)
    } else {
        String::new()
    };
    lines.push(format!(
        "{}{}[{}]: {}",
        prefix,
        tree.name(attr),
        index,
        render_value(&item)
    ));
    Ok(Target::Item { attr, index })
}
