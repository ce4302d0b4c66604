//! Documentation model — format-agnostic, consumed by external renderers.
//!
//! A [`DocumentationModel`] is built once per validation pass and never
//! mutated afterwards. Re-extracting produces a new model.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

/// What kind of element an entity documents.
///
/// The set is open: any `@codeType` value without a dedicated variant is kept
/// verbatim in [`EntityKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Type,
    Struct,
    Interface,
    Method,
    Function,
    Constant,
    Class,
    Enum,
    Trait,
    Protocol,
    Property,
    Module,
    Extension,
    Other(String),
}

impl EntityKind {
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        match lower.as_str() {
            "type" => EntityKind::Type,
            "struct" => EntityKind::Struct,
            "interface" => EntityKind::Interface,
            "method" => EntityKind::Method,
            "function" => EntityKind::Function,
            "constant" | "const" => EntityKind::Constant,
            "class" => EntityKind::Class,
            "enum" => EntityKind::Enum,
            "trait" => EntityKind::Trait,
            "protocol" => EntityKind::Protocol,
            "property" => EntityKind::Property,
            "module" => EntityKind::Module,
            "extension" => EntityKind::Extension,
            _ => EntityKind::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Type => "type",
            EntityKind::Struct => "struct",
            EntityKind::Interface => "interface",
            EntityKind::Method => "method",
            EntityKind::Function => "function",
            EntityKind::Constant => "constant",
            EntityKind::Class => "class",
            EntityKind::Enum => "enum",
            EntityKind::Trait => "trait",
            EntityKind::Protocol => "protocol",
            EntityKind::Property => "property",
            EntityKind::Module => "module",
            EntityKind::Extension => "extension",
            EntityKind::Other(s) => s,
        }
    }

    /// Kinds that expose a capability contract to implementors.
    pub fn is_interface_like(&self) -> bool {
        matches!(
            self,
            EntityKind::Interface | EntityKind::Trait | EntityKind::Protocol
        )
    }

    /// Kinds whose signature carries a parameter list.
    pub fn is_callable(&self) -> bool {
        matches!(self, EntityKind::Function | EntityKind::Method)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Source position of an entity or issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub path: PathBuf,
    /// 1-based line.
    pub line: usize,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Location {
            path: path.into(),
            line,
        }
    }
}

/// `(group, name)` key identifying an entity across the whole model.
/// Entities without `@codeGroup` live in the empty group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityRef {
    pub group: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        EntityRef {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.group, self.name)
        }
    }
}

/// `@codeParam {type} name description`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub description: String,
    /// Declared as `[name]` or `[name=default]`.
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// `@codeReturn {type} description`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Return {
    #[serde(rename = "type")]
    pub ty: String,
    pub description: String,
}

/// `@codeThrows {ErrorName} condition`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Throws {
    pub name: String,
    pub condition: String,
}

/// `@codeGeneric {T: Constraint} description`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generic {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    pub description: String,
}

/// `@codeExample {lang} title` followed by a verbatim body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Example {
    pub title: String,
    pub language: String,
    pub body: String,
}

/// `@codeSee reference description`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeeRef {
    pub reference: String,
    pub description: String,
}

/// One documented code element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocEntity {
    pub kind: EntityKind,
    pub name: String,
    pub group: String,
    pub language: String,
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    pub is_async: bool,
    pub is_static: bool,
    pub annotations: Vec<String>,
    pub generics: Vec<Generic>,
    pub params: Vec<Param>,
    pub returns: Vec<Return>,
    pub throws: Vec<Throws>,
    pub examples: Vec<Example>,
    pub see: Vec<SeeRef>,
    pub location: Location,
}

impl DocEntity {
    /// An empty entity of `kind` named `name`, declared at `location`.
    pub fn new(
        kind: EntityKind,
        name: impl Into<String>,
        language: impl Into<String>,
        location: Location,
    ) -> Self {
        DocEntity {
            kind,
            name: name.into(),
            group: String::new(),
            language: language.into(),
            platforms: Vec::new(),
            signature: None,
            description: None,
            version: None,
            since: None,
            access: None,
            deprecated: None,
            is_async: false,
            is_static: false,
            annotations: Vec::new(),
            generics: Vec::new(),
            params: Vec::new(),
            returns: Vec::new(),
            throws: Vec::new(),
            examples: Vec::new(),
            see: Vec::new(),
            location,
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.group.clone(), self.name.clone())
    }

    pub fn declares_generic(&self, name: &str) -> bool {
        self.generics.iter().any(|g| g.name == name)
    }
}

/// Index into [`DocumentationModel::entities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub usize);

/// Derived grouping of entities sharing a `@codeGroup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocGroup {
    pub name: String,
    pub members: Vec<EntityId>,
}

/// The finished, immutable documentation graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentationModel {
    entities: Vec<DocEntity>,
    groups: BTreeMap<String, DocGroup>,
    #[serde(skip)]
    symbols: BTreeMap<EntityRef, EntityId>,
    #[serde(skip)]
    by_name: HashMap<String, Vec<EntityId>>,
}

impl DocumentationModel {
    /// Assemble a model. Only the validator calls this; the symbol table keeps
    /// the first declaration of each `(group, name)`.
    pub(crate) fn new(
        entities: Vec<DocEntity>,
        groups: BTreeMap<String, DocGroup>,
        symbols: BTreeMap<EntityRef, EntityId>,
    ) -> Self {
        let mut by_name: HashMap<String, Vec<EntityId>> = HashMap::new();
        for (idx, entity) in entities.iter().enumerate() {
            by_name
                .entry(entity.name.clone())
                .or_default()
                .push(EntityId(idx));
        }
        DocumentationModel {
            entities,
            groups,
            symbols,
            by_name,
        }
    }

    pub fn entities(&self) -> &[DocEntity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&DocEntity> {
        self.entities.get(id.0)
    }

    pub fn groups(&self) -> impl Iterator<Item = &DocGroup> {
        self.groups.values()
    }

    pub fn group(&self, name: &str) -> Option<&DocGroup> {
        self.groups.get(name)
    }

    /// Symbol table lookup.
    pub fn lookup(&self, group: &str, name: &str) -> Option<EntityId> {
        self.symbols
            .get(&EntityRef::new(group, name))
            .copied()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&EntityRef, EntityId)> {
        self.symbols.iter().map(|(k, v)| (k, *v))
    }

    /// All entities carrying `name`, in declaration order.
    pub fn named(&self, name: &str) -> &[EntityId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a cross-reference written inside `from_group`.
    ///
    /// Tries, in order: `name` in the same group, `Group.name` / `Group::name`,
    /// `Owner.member` where the owner entity shares a group with the member,
    /// and finally any entity with that name.
    pub fn resolve(&self, reference: &str, from_group: &str) -> Option<EntityId> {
        let reference = reference.trim();
        if let Some(id) = self.lookup(from_group, reference) {
            return Some(id);
        }

        if let Some((qualifier, member)) = split_qualified(reference) {
            if let Some(id) = self.lookup(qualifier, member) {
                return Some(id);
            }
            for owner in self.named(qualifier) {
                if let Some(owner) = self.entity(*owner) {
                    if let Some(id) = self.lookup(&owner.group, member) {
                        return Some(id);
                    }
                }
            }
        }

        self.named(reference).first().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Split `A.b` or `A::b` at the last separator.
fn split_qualified(reference: &str) -> Option<(&str, &str)> {
    let colons = reference.rfind("::").map(|i| (i, 2));
    let dot = reference.rfind('.').map(|i| (i, 1));
    let (idx, width) = match (colons, dot) {
        (Some(c), Some(d)) => {
            if c.0 > d.0 {
                c
            } else {
                d
            }
        }
        (Some(c), None) => c,
        (None, Some(d)) => d,
        (None, None) => return None,
    };
    let (qualifier, member) = (&reference[..idx], &reference[idx + width..]);
    if qualifier.is_empty() || member.is_empty() {
        return None;
    }
    Some((qualifier, member))
}
