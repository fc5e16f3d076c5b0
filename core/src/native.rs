//! Host-facing entry points.
//!
//! An embedding host (parser, evaluator, REPL) calls into the value layer
//! with untyped argument lists: positional arguments plus named arguments.
//! These wrappers check arity and named arguments, then delegate to the
//! typed API.

use crate::error::ValueError;
use crate::interner::{Atom, gensym as make_gensym, keyword_of, symbol_of};
use crate::language::{self, Value, list};

/// Named arguments, in call order.
pub type NamedArgs<'a> = [(&'a str, Value)];

/// Native function type - callable by the host with positional and named
/// arguments.
pub type NativeFn = fn(&[Value], &NamedArgs<'_>) -> Result<Value, ValueError>;

const NATIVES: &[(&str, NativeFn)] = &[
    ("symbol", symbol),
    ("keyword", keyword),
    ("gensym", gensym),
    ("split", split),
    ("rsplit", rsplit),
    ("pair", pair),
    ("nil", nil),
    ("cons", cons),
    ("car", car),
    ("cdr", cdr),
    ("setcar", setcar),
    ("setcdr", setcdr),
];

/// Look up a native function by the name the host exposes it under.
pub fn lookup(name: &str) -> Option<NativeFn> {
    NATIVES
        .iter()
        .find(|(native, _)| *native == name)
        .map(|(_, f)| *f)
}

/// Names of every native function, in registration order.
pub fn names() -> impl Iterator<Item = &'static str> {
    NATIVES.iter().map(|(name, _)| *name)
}

// ============================================================================
// Argument Helpers
// ============================================================================

fn no_named(name: &str, named: &NamedArgs<'_>) -> Result<(), ValueError> {
    if named.is_empty() {
        Ok(())
    } else {
        Err(ValueError::usage(format!("{name} takes no named arguments")))
    }
}

fn exactly<'a, const N: usize>(
    name: &str,
    args: &'a [Value],
) -> Result<&'a [Value; N], ValueError> {
    args.try_into().map_err(|_| {
        ValueError::usage(format!(
            "{name}: expected {N} argument{}, got {}",
            if N == 1 { "" } else { "s" },
            args.len()
        ))
    })
}

fn extract_atom<'a>(name: &str, value: &'a Value) -> Result<&'a Atom, ValueError> {
    value.as_atom().ok_or_else(|| {
        ValueError::type_error(format!(
            "{name}: expected symbol or keyword, got {}",
            value.type_name()
        ))
    })
}

fn extract_separator<'a>(name: &str, value: &'a Value) -> Result<Option<&'a str>, ValueError> {
    match value {
        Value::Nil => Ok(None),
        Value::Str(sep) => Ok(Some(&**sep)),
        other => Err(ValueError::type_error(format!(
            "{name}: separator must be a string or nil, got {}",
            other.type_name()
        ))),
    }
}

// Negative counts mean unlimited.
fn extract_maxsplit(name: &str, value: &Value) -> Result<Option<usize>, ValueError> {
    match value {
        Value::Nil => Ok(None),
        Value::Int(n) => Ok(usize::try_from(*n).ok()),
        other => Err(ValueError::type_error(format!(
            "{name}: maxsplit must be an integer, got {}",
            other.type_name()
        ))),
    }
}

// ============================================================================
// Atoms
// ============================================================================

/// (symbol name) => interned symbol
pub fn symbol(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    no_named("symbol", named)?;
    match args {
        [] => Err(ValueError::usage("interned atom requires a name")),
        [name] => Ok(Value::Atom(symbol_of(name))),
        _ => Err(ValueError::usage(format!(
            "symbol: expected 1 argument, got {}",
            args.len()
        ))),
    }
}

/// (keyword name) => interned keyword, colons stripped
pub fn keyword(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    no_named("keyword", named)?;
    match args {
        [] => Err(ValueError::usage("keyword requires a name")),
        [name] => Ok(Value::Atom(keyword_of(name))),
        _ => Err(ValueError::usage(format!(
            "keyword: expected 1 argument, got {}",
            args.len()
        ))),
    }
}

/// (gensym [prefix]) => fresh symbol
pub fn gensym(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    no_named("gensym", named)?;
    let prefix = match args {
        [] | [Value::Nil] => None,
        [prefix] => Some(prefix.to_string()),
        _ => {
            return Err(ValueError::usage(format!(
                "gensym: expected at most 1 argument, got {}",
                args.len()
            )));
        }
    };
    Ok(Value::Atom(make_gensym(prefix.as_deref())))
}

/// (split atom [sep [maxsplit]]) => list of atoms of the same kind
pub fn split(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    split_impl("split", args, named, Atom::split)
}

/// (rsplit atom [sep [maxsplit]]) => list of atoms of the same kind
pub fn rsplit(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    split_impl("rsplit", args, named, Atom::rsplit)
}

type SplitFn = fn(&Atom, Option<&str>, Option<usize>) -> Result<Vec<Atom>, ValueError>;

fn split_impl(
    name: &str,
    args: &[Value],
    named: &NamedArgs<'_>,
    split: SplitFn,
) -> Result<Value, ValueError> {
    let (atom, rest) = match args {
        [atom, rest @ ..] if rest.len() <= 2 => (extract_atom(name, atom)?, rest),
        [] => return Err(ValueError::usage(format!("{name}: expected an atom"))),
        _ => {
            return Err(ValueError::usage(format!(
                "{name}: expected at most 3 arguments, got {}",
                args.len()
            )));
        }
    };

    let mut sep = rest.first().cloned().unwrap_or(Value::Nil);
    let mut maxsplit = rest.get(1).cloned().unwrap_or(Value::Nil);
    for (key, value) in named {
        match *key {
            "sep" if rest.is_empty() => sep = value.clone(),
            "maxsplit" if rest.len() < 2 => maxsplit = value.clone(),
            "sep" | "maxsplit" => {
                return Err(ValueError::usage(format!(
                    "{name}: argument '{key}' given by name and position"
                )));
            }
            other => {
                return Err(ValueError::usage(format!(
                    "{name}: unexpected named argument '{other}'"
                )));
            }
        }
    }

    let sep = extract_separator(name, &sep)?;
    let maxsplit = extract_maxsplit(name, &maxsplit)?;
    let pieces = split(atom, sep, maxsplit)?;
    Ok(list(pieces.into_iter().map(Value::Atom).collect::<Vec<_>>()))
}

// ============================================================================
// Pairs
// ============================================================================

/// (pair head tail) => new pair
pub fn pair(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    no_named("pair", named)?;
    match args {
        [head, tail] => Ok(language::pair(head.clone(), tail.clone())),
        [] | [_] => Err(ValueError::usage("pair requires a head and a tail")),
        _ => Err(ValueError::usage(format!(
            "pair: expected 2 arguments, got {}",
            args.len()
        ))),
    }
}

/// (nil) => the nil singleton
pub fn nil(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    if args.is_empty() && named.is_empty() {
        Ok(Value::Nil)
    } else {
        Err(ValueError::usage("nil takes no arguments"))
    }
}

/// (cons a b ... [recursive: bool]) => chain, see [`language::cons`]
pub fn cons(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    let recursive = match named {
        [] => false,
        [("recursive", flag)] => flag.is_truthy(),
        _ => {
            return Err(ValueError::usage(
                "cons accepts one named argument: recursive",
            ));
        }
    };
    Ok(language::cons(args.iter().cloned(), recursive))
}

/// (car pair) => head
pub fn car(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    no_named("car", named)?;
    let [value] = exactly::<1>("car", args)?;
    language::car(value)
}

/// (cdr pair) => tail
pub fn cdr(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    no_named("cdr", named)?;
    let [value] = exactly::<1>("cdr", args)?;
    language::cdr(value)
}

/// (setcar pair value) => nil
pub fn setcar(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    no_named("setcar", named)?;
    let [target, value] = exactly::<2>("setcar", args)?;
    language::setcar(target, value.clone())?;
    Ok(Value::Nil)
}

/// (setcdr pair value) => nil
pub fn setcdr(args: &[Value], named: &NamedArgs<'_>) -> Result<Value, ValueError> {
    no_named("setcdr", named)?;
    let [target, value] = exactly::<2>("setcdr", args)?;
    language::setcdr(target, value.clone())?;
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        assert!(lookup("car").is_some());
        assert!(lookup("length").is_none());
        assert_eq!(names().count(), 12);
    }

    #[test]
    fn test_exactly_reports_arity() {
        let err = car(&[], &[]).unwrap_err();
        assert!(err.is_usage());
        assert_eq!(err.message, "car: expected 1 argument, got 0");
    }

    #[test]
    fn test_setcar_reports_plural_arity() {
        let err = setcar(&[Value::Nil], &[]).unwrap_err();
        assert_eq!(err.message, "setcar: expected 2 arguments, got 1");
    }
}
