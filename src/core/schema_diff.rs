use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use similar::TextDiff;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::core::changes::{SchemaChange, SchemaDiffReport};

static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(type|interface|input|enum|union|scalar)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});
static FIELD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(\([^)]*\))?\s*:\s*([^@]+)").unwrap()
});
static IDENT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Object,
    Interface,
    Input,
    Enum,
    Union,
    Scalar,
}

impl TypeKind {
    fn label(self) -> &'static str {
        match self {
            TypeKind::Object => "object",
            TypeKind::Interface => "interface",
            TypeKind::Input => "input object",
            TypeKind::Enum => "enum",
            TypeKind::Union => "union",
            TypeKind::Scalar => "scalar",
        }
    }
}

#[derive(Debug)]
struct TypeDef {
    kind: TypeKind,
    fields: BTreeMap<String, String>,
    values: BTreeSet<String>,
    members: BTreeSet<String>,
}

impl TypeDef {
    fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
            values: BTreeSet::new(),
            members: BTreeSet::new(),
        }
    }
}

/// Computes the structural diff between two SDL schema files. Returns `None`
/// when the files are identical, otherwise a report with breaking/dangerous
/// classification and the raw unified diff.
pub struct SdlDiffProvider;

impl SdlDiffProvider {
    pub async fn diff(old_path: &Path, new_path: &Path) -> Result<Option<SchemaDiffReport>> {
        let old = tokio::fs::read_to_string(old_path)
            .await
            .with_context(|| format!("Failed to read schema {}", old_path.display()))?;
        let new = tokio::fs::read_to_string(new_path)
            .await
            .with_context(|| format!("Failed to read schema {}", new_path.display()))?;

        Ok(Self::diff_source(
            &old_path.display().to_string(),
            &new_path.display().to_string(),
            &old,
            &new,
        ))
    }

    pub fn diff_source(
        old_label: &str,
        new_label: &str,
        old: &str,
        new: &str,
    ) -> Option<SchemaDiffReport> {
        if old == new {
            return None;
        }

        let (breaking_changes, dangerous_changes) = classify(&parse_sdl(old), &parse_sdl(new));
        let diff_no_color = TextDiff::from_lines(old, new)
            .unified_diff()
            .context_radius(3)
            .header(old_label, new_label)
            .to_string();

        Some(SchemaDiffReport {
            breaking_changes,
            dangerous_changes,
            diff: colorize(&diff_no_color),
            diff_no_color,
        })
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn normalize_type(raw: &str) -> String {
    raw.split_whitespace().collect()
}

fn parse_sdl(source: &str) -> BTreeMap<String, TypeDef> {
    let mut types = BTreeMap::new();
    let mut current: Option<(String, TypeDef)> = None;

    for raw in source.lines() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = TYPE_PATTERN.captures(line) {
            if let Some((name, def)) = current.take() {
                types.insert(name, def);
            }

            let kind = match &caps[1] {
                "type" => TypeKind::Object,
                "interface" => TypeKind::Interface,
                "input" => TypeKind::Input,
                "enum" => TypeKind::Enum,
                "union" => TypeKind::Union,
                _ => TypeKind::Scalar,
            };
            let name = caps[2].to_string();
            let mut def = TypeDef::new(kind);

            match kind {
                TypeKind::Union => {
                    if let Some(eq) = line.find('=') {
                        def.members = line[eq + 1..]
                            .split('|')
                            .map(str::trim)
                            .filter(|m| !m.is_empty())
                            .map(str::to_string)
                            .collect();
                    }
                    types.insert(name, def);
                }
                TypeKind::Scalar => {
                    types.insert(name, def);
                }
                _ => {
                    current = Some((name, def));
                }
            }
            continue;
        }

        if line.starts_with('}') {
            if let Some((name, def)) = current.take() {
                types.insert(name, def);
            }
            continue;
        }

        if let Some((_, def)) = current.as_mut() {
            match def.kind {
                TypeKind::Enum => {
                    if let Some(caps) = IDENT_PATTERN.captures(line) {
                        def.values.insert(caps[1].to_string());
                    }
                }
                TypeKind::Object | TypeKind::Interface | TypeKind::Input => {
                    if let Some(caps) = FIELD_PATTERN.captures(line) {
                        def.fields
                            .insert(caps[1].to_string(), normalize_type(&caps[3]));
                    }
                }
                _ => {}
            }
        }
    }

    if let Some((name, def)) = current.take() {
        types.insert(name, def);
    }

    types
}

fn classify(
    old: &BTreeMap<String, TypeDef>,
    new: &BTreeMap<String, TypeDef>,
) -> (Vec<SchemaChange>, Vec<SchemaChange>) {
    let mut breaking = Vec::new();
    let mut dangerous = Vec::new();

    for (name, old_def) in old {
        let new_def = match new.get(name) {
            Some(def) => def,
            None => {
                breaking.push(SchemaChange::new(format!("Type `{name}` was removed")));
                continue;
            }
        };

        if new_def.kind != old_def.kind {
            breaking.push(SchemaChange::new(format!(
                "Type `{name}` changed kind from {} to {}",
                old_def.kind.label(),
                new_def.kind.label()
            )));
            continue;
        }

        for (field, old_ty) in &old_def.fields {
            match new_def.fields.get(field) {
                None => breaking.push(SchemaChange::new(format!(
                    "Field `{field}` was removed from type `{name}`"
                ))),
                Some(new_ty) if new_ty != old_ty => breaking.push(SchemaChange::new(format!(
                    "Field `{name}.{field}` changed type from `{old_ty}` to `{new_ty}`"
                ))),
                _ => {}
            }
        }

        if old_def.kind == TypeKind::Input {
            for (field, new_ty) in &new_def.fields {
                if old_def.fields.contains_key(field) {
                    continue;
                }
                if new_ty.ends_with('!') {
                    breaking.push(SchemaChange::new(format!(
                        "Required input field `{name}.{field}` was added"
                    )));
                } else {
                    dangerous.push(SchemaChange::new(format!(
                        "Input field `{name}.{field}` was added"
                    )));
                }
            }
        }

        for value in &old_def.values {
            if !new_def.values.contains(value) {
                breaking.push(SchemaChange::new(format!(
                    "Enum value `{value}` was removed from enum `{name}`"
                )));
            }
        }
        for value in &new_def.values {
            if !old_def.values.contains(value) {
                dangerous.push(SchemaChange::new(format!(
                    "Enum value `{value}` was added to enum `{name}`"
                )));
            }
        }

        for member in &old_def.members {
            if !new_def.members.contains(member) {
                breaking.push(SchemaChange::new(format!(
                    "Member `{member}` was removed from union `{name}`"
                )));
            }
        }
        for member in &new_def.members {
            if !old_def.members.contains(member) {
                dangerous.push(SchemaChange::new(format!(
                    "Member `{member}` was added to union `{name}`"
                )));
            }
        }
    }

    (breaking, dangerous)
}

fn colorize(diff: &str) -> String {
    let mut out = String::with_capacity(diff.len());
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            out.push_str(line);
        } else if line.starts_with('+') {
            out.push_str("\x1b[32m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if line.starts_with('-') {
            out.push_str("\x1b[31m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if line.starts_with("@@") {
            out.push_str("\x1b[36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    if !diff.ends_with('\n') {
        out.pop();
    }
    out
}
