//! Synthetic names for anonymous types.
//!
//! A [`NameSeed`] records the structural path from a named owner down to
//! the position currently being extracted. The type name derived from it is
//! `<path>Type`, so the same position always yields the same name.
//!
//! Segments are joined without a separator, so two positions can meet on one
//! name (member `items` with an inline element type and a sibling
//! `itemsElement`). Such collisions are rejected when the named types are
//! collected, see [`NamedTypeRegistry`](crate::registry::NamedTypeRegistry).

/// Structural path of the position being extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSeed {
    path: String,

    /// Set when the position carries an explicit name (alias, override).
    exact: Option<String>,
}

impl NameSeed {
    /// A root path such as a module name.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            path: root.into(),
            exact: None,
        }
    }

    /// A position whose type takes `name` verbatim. Nested positions
    /// continue the path from `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            exact: Some(name),
        }
    }

    /// Inline return type of `method` on `module`.
    pub fn method_return(module: &str, method: &str) -> Self {
        Self::new(format!("{}{}Return", module, capitalize(method)))
    }

    /// Parameter fields of `method` on `module`.
    pub fn method_parameters(module: &str, method: &str) -> Self {
        Self::new(format!("{}{}", module, capitalize(method)))
    }

    pub fn member(&self, name: &str) -> Self {
        self.descend(&capitalize(name))
    }

    pub fn element(&self) -> Self {
        self.descend("Element")
    }

    /// Value position of an index signature or `Record`.
    pub fn value(&self) -> Self {
        self.descend("Value")
    }

    pub fn union_member(&self, index: usize) -> Self {
        self.descend(&format!("Members{}", index))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name given to an anonymous type at this position.
    pub fn type_name(&self) -> String {
        match &self.exact {
            Some(name) => name.clone(),
            None => format!("{}Type", self.path),
        }
    }

    fn descend(&self, segment: &str) -> Self {
        Self::new(format!("{}{}", self.path, segment))
    }
}

/// Upper-case the first letter of every identifier segment and drop the
/// characters that cannot appear in a type name (`quoted-name` → `QuotedName`).
pub fn capitalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if c.is_alphanumeric() || c == '_' {
            if upper_next {
                out.extend(c.to_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        } else {
            upper_next = true;
        }
    }
    out
}
