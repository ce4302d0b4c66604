//! Cross-reference validator — batch-global checks over every entity.
//!
//! Pure: the same entities always give the same model and issues. Entities
//! with errors stay in the model; whether an error fails the run is the
//! caller's decision.

use crate::config::Config;
use crate::error::{IssueKind, ValidationIssue};
use crate::model::{DocEntity, DocGroup, DocumentationModel, EntityId, EntityRef};
use crate::tokenizer::split_balanced;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;
use tracing::debug;

/// Generic placeholder tokens: `T`, `K`, `V`, `T1`.
static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z][0-9]*\b").unwrap());

/// Build the model for a batch and check it.
pub fn validate(
    entities: Vec<DocEntity>,
    config: &Config,
) -> (DocumentationModel, Vec<ValidationIssue>) {
    let mut issues = Vec::new();
    let mut symbols: BTreeMap<EntityRef, EntityId> = BTreeMap::new();
    let mut groups: BTreeMap<String, DocGroup> = BTreeMap::new();

    for (idx, entity) in entities.iter().enumerate() {
        let id = EntityId(idx);
        let key = entity.entity_ref();
        if let Some(first) = symbols.get(&key) {
            let first = &entities[first.0].location;
            issues.push(
                issue_for(
                    entity,
                    ValidationIssue::error(
                        IssueKind::DuplicateSymbol,
                        format!(
                            "`{}` is already declared at {}:{}",
                            key,
                            first.path.display(),
                            first.line
                        ),
                    ),
                ),
            );
        } else {
            symbols.insert(key, id);
        }

        if !entity.group.is_empty() {
            groups
                .entry(entity.group.clone())
                .or_insert_with(|| DocGroup {
                    name: entity.group.clone(),
                    members: Vec::new(),
                })
                .members
                .push(id);
        }
    }

    let model = DocumentationModel::new(entities, groups, symbols);

    for entity in model.entities() {
        check_unique_members(entity, &mut issues);
        check_generics(&model, entity, &mut issues);
        check_contract(entity, &mut issues);
        if config.check_signatures {
            check_param_order(entity, &mut issues);
        }
        check_see(&model, entity, &mut issues);
    }

    debug!(
        "validated {} entities in {} groups: {} issues",
        model.len(),
        model.groups().count(),
        issues.len()
    );
    (model, issues)
}

fn issue_for(entity: &DocEntity, issue: ValidationIssue) -> ValidationIssue {
    issue
        .at(entity.location.clone())
        .for_entity(entity.entity_ref())
}

fn check_unique_members(entity: &DocEntity, issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for param in &entity.params {
        if !seen.insert(param.name.as_str()) {
            issues.push(issue_for(
                entity,
                ValidationIssue::error(
                    IssueKind::DuplicateParam,
                    format!("parameter `{}` is documented twice", param.name),
                ),
            ));
        }
    }

    let mut seen = HashSet::new();
    for throws in &entity.throws {
        if !seen.insert(throws.name.as_str()) {
            issues.push(issue_for(
                entity,
                ValidationIssue::error(
                    IssueKind::DuplicateThrows,
                    format!("error `{}` is documented twice", throws.name),
                ),
            ));
        }
    }
}

/// Placeholders used in the signature, parameter types and return types.
/// The entity's own name in its signature is not a placeholder, even when it
/// is a single capital letter.
fn used_placeholders(entity: &DocEntity) -> BTreeSet<&str> {
    let mut used = BTreeSet::new();
    if let Some(signature) = entity.signature.as_deref() {
        let own = declared_name_at(signature, &entity.name);
        used.extend(
            RE_PLACEHOLDER
                .find_iter(signature)
                .filter(|m| Some(m.start()) != own)
                .map(|m| m.as_str()),
        );
    }
    let types = entity
        .params
        .iter()
        .map(|p| p.ty.as_str())
        .chain(entity.returns.iter().map(|r| r.ty.as_str()));
    used.extend(types.flat_map(|text| RE_PLACEHOLDER.find_iter(text).map(|m| m.as_str())));
    used
}

/// Offset of `name` where the signature declares it: the occurrence followed
/// by a parameter list, else the first whole-word occurrence.
fn declared_name_at(signature: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let whole_word = |idx: usize| {
        let before = signature[..idx].chars().next_back();
        let after = signature[idx + name.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    };
    let mut words = signature
        .match_indices(name)
        .map(|(idx, _)| idx)
        .filter(|&idx| whole_word(idx));
    let first = words.next()?;
    std::iter::once(first)
        .chain(words)
        .find(|&idx| params_start(&signature[idx + name.len()..]).is_some())
        .or(Some(first))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn check_generics(
    model: &DocumentationModel,
    entity: &DocEntity,
    issues: &mut Vec<ValidationIssue>,
) {
    for placeholder in used_placeholders(entity) {
        if entity.declares_generic(placeholder) {
            continue;
        }
        let owner = model
            .group(&entity.group)
            .into_iter()
            .flat_map(|g| g.members.iter())
            .filter_map(|id| model.entity(*id))
            .find(|other| other.name != entity.name && other.declares_generic(placeholder));

        let issue = match owner {
            Some(owner) => ValidationIssue::warning(
                IssueKind::InheritedGeneric,
                format!("placeholder `{}` is declared by `{}`, not here", placeholder, owner.name),
            ),
            None => ValidationIssue::error(
                IssueKind::UndeclaredGeneric,
                format!("placeholder `{}` is used but not declared with @codeGeneric", placeholder),
            ),
        };
        issues.push(issue_for(entity, issue));
    }
}

fn check_contract(entity: &DocEntity, issues: &mut Vec<ValidationIssue>) {
    if !entity.kind.is_interface_like() {
        return;
    }
    if entity.description.is_none() && entity.signature.is_none() && entity.examples.is_empty() {
        issues.push(issue_for(
            entity,
            ValidationIssue::warning(
                IssueKind::MissingContract,
                format!("{} has no description, signature or example", entity.kind),
            ),
        ));
    }
}

fn check_param_order(entity: &DocEntity, issues: &mut Vec<ValidationIssue>) {
    if !entity.kind.is_callable() || entity.params.is_empty() {
        return;
    }
    let Some(slots) = entity
        .signature
        .as_deref()
        .and_then(|sig| signature_params(sig, &entity.name))
    else {
        return;
    };

    let mut positions = Vec::new();
    for param in &entity.params {
        let word = bare_word(&param.name);
        match slots.iter().position(|slot| slot.iter().any(|w| w == word)) {
            Some(pos) => positions.push(pos),
            None => issues.push(issue_for(
                entity,
                ValidationIssue::warning(
                    IssueKind::SignatureMismatch,
                    format!("parameter `{}` does not appear in the signature", param.name),
                ),
            )),
        }
    }

    if positions.windows(2).any(|w| w[0] >= w[1]) {
        let documented: Vec<&str> = entity.params.iter().map(|p| p.name.as_str()).collect();
        issues.push(issue_for(
            entity,
            ValidationIssue::warning(
                IssueKind::SignatureMismatch,
                format!(
                    "documented parameter order ({}) does not match the signature",
                    documented.join(", ")
                ),
            ),
        ));
    }
}

/// Words of each top-level parameter in the parenthesized list that follows
/// `name` in `signature` (or the first list, when `name` does not appear).
fn signature_params(signature: &str, name: &str) -> Option<Vec<Vec<String>>> {
    let start = signature
        .match_indices(name)
        .find_map(|(idx, _)| {
            params_start(&signature[idx + name.len()..]).map(|off| idx + name.len() + off)
        })
        .or_else(|| signature.find('('))?;
    let (inner, _) = split_balanced(&signature[start..], '(', ')')?;

    let mut slots = Vec::new();
    let mut depth = 0usize;
    let mut from = 0;
    for (idx, ch) in inner.char_indices() {
        match ch {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                slots.push(&inner[from..idx]);
                from = idx + 1;
            }
            _ => {}
        }
    }
    slots.push(&inner[from..]);

    Some(
        slots
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.split(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .filter(|w| !w.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect(),
    )
}

/// Offset of the `(` right after a name, skipping `<…>` / `[…]` type parameters.
fn params_start(after_name: &str) -> Option<usize> {
    let trimmed = after_name.trim_start();
    let mut off = after_name.len() - trimmed.len();
    let rest = &after_name[off..];
    for (open, close) in [('<', '>'), ('[', ']')] {
        if rest.starts_with(open) {
            let (inner, _) = split_balanced(rest, open, close)?;
            off += inner.len() + 2;
            let tail = &after_name[off..];
            off += tail.len() - tail.trim_start().len();
            break;
        }
    }
    after_name[off..].starts_with('(').then_some(off)
}

fn bare_word(name: &str) -> &str {
    name.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
}

fn check_see(model: &DocumentationModel, entity: &DocEntity, issues: &mut Vec<ValidationIssue>) {
    for see in &entity.see {
        if see.reference.contains("://") {
            continue;
        }
        if model.resolve(&see.reference, &entity.group).is_none() {
            issues.push(issue_for(
                entity,
                ValidationIssue::warning(
                    IssueKind::UnresolvedReference,
                    format!("@codeSee `{}` does not match any documented entity", see.reference),
                ),
            ));
        }
    }
}
