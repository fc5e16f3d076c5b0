//! Interned atoms: symbols and keywords.
//!
//! Each atom kind has its own table mapping a normalized name to a weak
//! handle on the one live atom with that name. The table never keeps an atom
//! alive; when the last strong [`Atom`] handle is dropped the atom removes its
//! own entry under the table lock, so a later request for the same name
//! allocates a fresh atom.

use log::trace;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::error::ValueError;
use crate::language::Value;
use crate::split;

static SYMBOLS: Lazy<InternTable> = Lazy::new(InternTable::default);
static KEYWORDS: Lazy<InternTable> = Lazy::new(InternTable::default);

const GENSYM_SEED: u64 = 97531;
const GENSYM_MULTIPLIER: u64 = 1_000_003;
const GENSYM_PREFIX: &str = "<gensym>";

static GENSYM_COUNTER: AtomicU64 = AtomicU64::new(GENSYM_SEED);

/// The two flavors of interned atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomKind {
    Symbol,
    Keyword,
}

impl AtomKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AtomKind::Symbol => "symbol",
            AtomKind::Keyword => "keyword",
        }
    }

    /// Normalize a raw name for this kind. Keywords lose surrounding colons.
    pub fn normalize(self, raw: &str) -> &str {
        match self {
            AtomKind::Symbol => raw,
            AtomKind::Keyword => raw.trim_matches(':'),
        }
    }

    fn table(self) -> &'static InternTable {
        match self {
            AtomKind::Symbol => &SYMBOLS,
            AtomKind::Keyword => &KEYWORDS,
        }
    }
}

#[derive(Default)]
struct InternTable {
    entries: Mutex<FxHashMap<Arc<str>, Weak<AtomData>>>,
}

impl InternTable {
    fn lock(&self) -> MutexGuard<'_, FxHashMap<Arc<str>, Weak<AtomData>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct AtomData {
    kind: AtomKind,
    name: Arc<str>,
}

impl Drop for AtomData {
    fn drop(&mut self) {
        let mut entries = self.kind.table().lock();
        let this: *const AtomData = self;

        // A concurrent lookup may already have replaced our dead entry with
        // a fresh atom of the same name; only our own entry is removed.
        let ours = entries
            .get(&*self.name)
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), this));
        if ours {
            entries.remove(&*self.name);
            trace!(
                "event=atom_evict module=interner kind={} name={}",
                self.kind.as_str(),
                self.name
            );
        }
    }
}

/// A symbol or keyword. Cloning shares the same interned instance.
///
/// Equality and hashing are by identity. While two atoms of the same kind and
/// name are alive they are the same instance, so identity and name equality
/// coincide.
#[derive(Clone)]
pub struct Atom(Arc<AtomData>);

/// A non-owning handle on an [`Atom`].
#[derive(Clone)]
pub struct WeakAtom(Weak<AtomData>);

impl Atom {
    /// Get or create the atom of `kind` named `raw` (normalized first).
    pub fn intern(kind: AtomKind, raw: &str) -> Atom {
        let name = kind.normalize(raw);
        let mut entries = kind.table().lock();

        if let Some(data) = entries.get(name).and_then(Weak::upgrade) {
            return Atom(data);
        }

        let name: Arc<str> = Arc::from(name);
        let data = Arc::new(AtomData {
            kind,
            name: Arc::clone(&name),
        });
        trace!(
            "event=atom_intern module=interner kind={} name={}",
            kind.as_str(),
            name
        );
        entries.insert(name, Arc::downgrade(&data));
        Atom(data)
    }

    /// Create the atom only if no live atom of that name exists yet.
    fn intern_fresh(kind: AtomKind, name: &str) -> Option<Atom> {
        let mut entries = kind.table().lock();

        // Checked by count rather than upgrade: an upgraded handle dropped
        // while the table lock is held could run the eviction path and
        // deadlock on the same lock.
        if entries.get(name).is_some_and(|weak| weak.strong_count() > 0) {
            return None;
        }

        let name: Arc<str> = Arc::from(name);
        let data = Arc::new(AtomData {
            kind,
            name: Arc::clone(&name),
        });
        entries.insert(name, Arc::downgrade(&data));
        Some(Atom(data))
    }

    pub fn kind(&self) -> AtomKind {
        self.0.kind
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_symbol(&self) -> bool {
        self.kind() == AtomKind::Symbol
    }

    pub fn is_keyword(&self) -> bool {
        self.kind() == AtomKind::Keyword
    }

    pub fn ptr_eq(&self, other: &Atom) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakAtom {
        WeakAtom(Arc::downgrade(&self.0))
    }

    /// Split the name and re-intern every piece as an atom of the same kind.
    ///
    /// See [`crate::split`] for the splitting rules.
    pub fn split(
        &self,
        sep: Option<&str>,
        maxsplit: Option<usize>,
    ) -> Result<Vec<Atom>, ValueError> {
        let pieces = split::split(self.name(), sep, maxsplit)?;
        Ok(self.rewrap(pieces))
    }

    /// Like [`Atom::split`], but splits starting from the right.
    pub fn rsplit(
        &self,
        sep: Option<&str>,
        maxsplit: Option<usize>,
    ) -> Result<Vec<Atom>, ValueError> {
        let pieces = split::rsplit(self.name(), sep, maxsplit)?;
        Ok(self.rewrap(pieces))
    }

    fn rewrap(&self, pieces: Vec<&str>) -> Vec<Atom> {
        let kind = self.kind();
        pieces
            .into_iter()
            .map(|piece| Atom::intern(kind, piece))
            .collect()
    }
}

impl WeakAtom {
    pub fn upgrade(&self) -> Option<Atom> {
        self.0.upgrade().map(Atom)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.kind().as_str(), quote_name(self.name()))
    }
}

// Single quotes unless the name holds a single quote and no double quote.
fn quote_name(name: &str) -> String {
    let quote = if name.contains('\'') && !name.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for c in name.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.extend(c.escape_unicode()),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

impl fmt::Debug for WeakAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(atom) => write!(f, "(weak) {atom:?}"),
            None => write!(f, "(weak) <dead>"),
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Intern a symbol.
pub fn symbol(name: &str) -> Atom {
    Atom::intern(AtomKind::Symbol, name)
}

/// Intern a keyword. Leading and trailing colons are stripped.
pub fn keyword(name: &str) -> Atom {
    Atom::intern(AtomKind::Keyword, name)
}

/// Intern a symbol named after any value; text is used as-is, everything
/// else is converted through its display form.
pub fn symbol_of(name: &Value) -> Atom {
    atom_of(AtomKind::Symbol, name)
}

/// Intern a keyword named after any value (see [`symbol_of`]).
pub fn keyword_of(name: &Value) -> Atom {
    atom_of(AtomKind::Keyword, name)
}

fn atom_of(kind: AtomKind, name: &Value) -> Atom {
    match name {
        Value::Str(text) => Atom::intern(kind, text),
        Value::Atom(atom) => Atom::intern(kind, atom.name()),
        other => Atom::intern(kind, &other.to_string()),
    }
}

/// Whether a live atom of `kind` is currently interned under `raw`.
pub fn is_interned(kind: AtomKind, raw: &str) -> bool {
    let entries = kind.table().lock();
    entries
        .get(kind.normalize(raw))
        .is_some_and(|weak| weak.strong_count() > 0)
}

// ============================================================================
// Gensym
// ============================================================================

fn next_gensym_number() -> u64 {
    let step = |n: u64| {
        let next = n.wrapping_add(0x9e37_79b9).wrapping_mul(GENSYM_MULTIPLIER);
        Some(if next == 0 { GENSYM_SEED } else { next })
    };
    // The closure always returns Some, so both arms carry the previous value.
    match GENSYM_COUNTER.fetch_update(Ordering::Relaxed, Ordering::Relaxed, step) {
        Ok(previous) | Err(previous) => previous,
    }
}

/// Produce a symbol whose name was not interned at the time of the call.
///
/// Names look like `prefix#1a2b3c`; the prefix defaults to `<gensym>`.
pub fn gensym(prefix: Option<&str>) -> Atom {
    gensym_where(prefix, |_| true)
}

/// Like [`gensym`], but keeps drawing names until `accept` approves one.
pub fn gensym_where<F>(prefix: Option<&str>, mut accept: F) -> Atom
where
    F: FnMut(&Atom) -> bool,
{
    let prefix = prefix.unwrap_or(GENSYM_PREFIX);
    loop {
        let name = format!("{prefix}#{:x}", next_gensym_number());
        if let Some(atom) = Atom::intern_fresh(AtomKind::Symbol, &name) {
            if accept(&atom) {
                return atom;
            }
        }
    }
}
