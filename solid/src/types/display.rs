//! Type syntax rendering.
//!
//! Output is valid type syntax, so `parse(display(T))` gives back `T`.

use std::fmt;

use super::{Scalar, SolidType, TypeEntry};

/// Binding strength of a rendered type form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Union,
    Intersection,
    Mutable,
    Postfix,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Boolean(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{}", format_float(*x)),
            Scalar::String(s) => write!(f, "{}", quote_string(s)),
        }
    }
}

/// Render a float so that it always reads back as a float literal
pub(crate) fn format_float(x: f64) -> String {
    let text = format!("{x}");
    if x.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{text}.0")
    } else {
        text
    }
}

/// Single-quoted string literal with the escapes the lexer accepts
pub(crate) fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

impl fmt::Display for SolidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self, Level::Union)
    }
}

fn write_type(f: &mut fmt::Formatter<'_>, ty: &SolidType, min: Level) -> fmt::Result {
    let level = level_of(ty);
    if level < min {
        write!(f, "(")?;
        write_bare(f, ty)?;
        write!(f, ")")
    } else {
        write_bare(f, ty)
    }
}

fn level_of(ty: &SolidType) -> Level {
    match ty {
        SolidType::Union(_) => Level::Union,
        SolidType::Intersection(_) => Level::Intersection,
        t if t.is_mutable() => Level::Mutable,
        _ => Level::Postfix,
    }
}

fn write_bare(f: &mut fmt::Formatter<'_>, ty: &SolidType) -> fmt::Result {
    use SolidType as T;

    if ty.is_mutable() {
        write!(f, "mutable ")?;
        return write_collection(f, ty);
    }

    match ty {
        T::Never => write!(f, "never"),
        T::Unknown => write!(f, "unknown"),
        T::Void => write!(f, "void"),
        T::Object => write!(f, "obj"),
        T::Boolean => write!(f, "bool"),
        T::Integer => write!(f, "int"),
        T::Float => write!(f, "float"),
        T::String => write!(f, "str"),
        T::Unit(scalar) => write!(f, "{scalar}"),
        T::Alias { name, .. } => write!(f, "{name}"),
        T::Union(members) => write_joined(f, members, " | ", Level::Intersection),
        T::Intersection(members) => write_joined(f, members, " & ", Level::Mutable),
        collection => write_collection(f, collection),
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    members: &[SolidType],
    separator: &str,
    min: Level,
) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        write_type(f, member, min)?;
    }
    Ok(())
}

/// Collection syntax without the `mutable` prefix
fn write_collection(f: &mut fmt::Formatter<'_>, ty: &SolidType) -> fmt::Result {
    use SolidType as T;

    match ty {
        T::Tuple { items, .. } => {
            write!(f, "[")?;
            for (i, entry) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                if entry.optional {
                    write!(f, "?: ")?;
                }
                write_type(f, &entry.ty, Level::Union)?;
            }
            write!(f, "]")
        }
        T::Record { fields, .. } => {
            write!(f, "[")?;
            for (i, (key, TypeEntry { ty, optional })) in fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}{}", if *optional { "?: " } else { ": " })?;
                write_type(f, ty, Level::Union)?;
            }
            write!(f, "]")
        }
        T::List { item, .. } => {
            write_type(f, item, Level::Postfix)?;
            write!(f, "[]")
        }
        T::Dict { item, .. } => {
            write!(f, "[:")?;
            write_type(f, item, Level::Union)?;
            write!(f, "]")
        }
        T::Set { item, .. } => {
            write_type(f, item, Level::Postfix)?;
            write!(f, "{{}}")
        }
        T::Map { key, value, .. } => {
            write!(f, "{{")?;
            write_type(f, key, Level::Union)?;
            write!(f, " -> ")?;
            write_type(f, value, Level::Union)?;
            write!(f, "}}")
        }
        _ => Ok(()),
    }
}
