use std::mem;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use rustc_hash::FxHashSet;

use crate::error::ValueError;
use crate::gc;
use crate::interner::Atom;
use crate::iter::PairIter;

// ============================================================================
// Core Type System
// ============================================================================

/// Any value a pair slot can hold.
///
/// `Nil` is the single empty-chain terminator. It is a distinct variant
/// rather than a degenerate pair, so everything that touches slots branches
/// on it explicitly.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Atom(Atom),
    Pair(Pair),
}

/// The empty list.
pub const NIL: Value = Value::Nil;

/// Source location attached to a pair by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

pub(crate) struct Slots {
    pub(crate) head: Value,
    pub(crate) tail: Value,
    position: Option<Position>,
}

pub(crate) struct PairCell {
    slots: RwLock<Slots>,
}

impl PairCell {
    pub(crate) fn new(head: Value, tail: Value) -> Self {
        PairCell {
            slots: RwLock::new(Slots {
                head,
                tail,
                position: None,
            }),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// Tear down uniquely owned sub-pairs from a worklist so that dropping deep
// structure, through tails or heads, does not recurse once per cell.
impl Drop for PairCell {
    fn drop(&mut self) {
        let mut pending: Vec<Arc<PairCell>> = Vec::new();
        take_pairs(self.slots.get_mut().unwrap_or_else(PoisonError::into_inner), &mut pending);

        while let Some(cell) = pending.pop() {
            if let Ok(mut cell) = Arc::try_unwrap(cell) {
                let slots = cell.slots.get_mut().unwrap_or_else(PoisonError::into_inner);
                take_pairs(slots, &mut pending);
            }
        }
    }
}

fn take_pairs(slots: &mut Slots, pending: &mut Vec<Arc<PairCell>>) {
    for slot in [&mut slots.head, &mut slots.tail] {
        if let Value::Pair(Pair(cell)) = slot {
            pending.push(Arc::clone(cell));
            *slot = Value::Nil;
        }
    }
}

/// A mutable two-slot cell.
///
/// Cloning a `Pair` shares the cell. Slot access is internally locked only
/// far enough to stay memory safe; sequences of reads and writes from
/// several threads need the caller's own synchronization.
#[derive(Clone)]
pub struct Pair(pub(crate) Arc<PairCell>);

/// A non-owning handle on a [`Pair`].
#[derive(Clone)]
pub struct WeakPair(Weak<PairCell>);

impl Pair {
    pub fn new(head: Value, tail: Value) -> Pair {
        let cell = Arc::new(PairCell::new(head, tail));
        gc::track(&cell);
        Pair(cell)
    }

    pub fn head(&self) -> Value {
        self.0.read().head.clone()
    }

    pub fn tail(&self) -> Value {
        self.0.read().tail.clone()
    }

    /// Both slots, read under a single lock acquisition.
    pub fn slots(&self) -> (Value, Value) {
        let slots = self.0.read();
        (slots.head.clone(), slots.tail.clone())
    }

    pub fn set_head(&self, value: Value) {
        let previous = mem::replace(&mut self.0.write().head, value);
        drop(previous);
    }

    pub fn set_tail(&self, value: Value) {
        let previous = mem::replace(&mut self.0.write().tail, value);
        drop(previous);
    }

    /// Slot 0 is the head, slot 1 the tail.
    pub fn get(&self, index: usize) -> Result<Value, ValueError> {
        match index {
            0 => Ok(self.head()),
            1 => Ok(self.tail()),
            _ => Err(ValueError::range("pair index out of range")),
        }
    }

    /// Replace slot 0 or 1. Any other index fails without touching the pair.
    pub fn set(&self, index: usize, value: Value) -> Result<(), ValueError> {
        match index {
            0 => self.set_head(value),
            1 => self.set_tail(value),
            _ => return Err(ValueError::range("pair index out of range")),
        }
        Ok(())
    }

    /// Iterate over the two slots (not along the chain).
    pub fn iter(&self) -> PairIter {
        PairIter::new(self.clone())
    }

    /// Stable identity of the underlying cell while it is alive.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &Pair) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakPair {
        WeakPair(Arc::downgrade(&self.0))
    }

    /// Whether following tails from this pair ever revisits a pair.
    pub fn is_recursive(&self) -> bool {
        let mut seen = PairSet::default();
        let mut current = Value::Pair(self.clone());
        while let Value::Pair(pair) = current {
            if !seen.insert(&pair) {
                return true;
            }
            current = pair.tail();
        }
        false
    }

    // ------------------------------------------------------------------------
    // Source positions
    // ------------------------------------------------------------------------

    pub fn position(&self) -> Option<Position> {
        self.0.read().position
    }

    /// Assign `position`. With `follow`, every pair reachable through tails
    /// and pair heads gets the same position.
    pub fn set_position(&self, position: Position, follow: bool) {
        self.assign_position(Some(position), follow);
    }

    /// Remove the position, optionally from all reachable pairs.
    pub fn clear_position(&self, follow: bool) {
        self.assign_position(None, follow);
    }

    fn assign_position(&self, position: Option<Position>, follow: bool) {
        if follow {
            walk_set_position(self, &mut PairSet::default(), position);
        } else {
            self.0.write().position = position;
        }
    }

    /// Assign `position` only where none is present. While following, a
    /// pair that already has a position passes it on to its unpositioned
    /// heads and tails instead.
    pub fn fill_position(&self, position: Position, follow: bool) {
        if follow {
            walk_fill_position(self, &mut PairSet::default(), position);
        } else {
            self.0.write().position.get_or_insert(position);
        }
    }
}

// Both walks follow tails in a loop and descend into pair heads through an
// explicit stack, visiting a head before the rest of its chain.
fn walk_set_position(pair: &Pair, seen: &mut PairSet, position: Option<Position>) {
    let mut stack = vec![Value::Pair(pair.clone())];
    while let Some(current) = stack.last_mut() {
        let Value::Pair(pair) = mem::replace(current, Value::Nil) else {
            stack.pop();
            continue;
        };
        if !seen.insert(&pair) {
            stack.pop();
            continue;
        }
        let (head, tail) = {
            let mut slots = pair.0.write();
            slots.position = position;
            (slots.head.clone(), slots.tail.clone())
        };
        *current = tail;
        if head.is_pair() {
            stack.push(head);
        }
    }
}

fn walk_fill_position(pair: &Pair, seen: &mut PairSet, position: Position) {
    let mut stack = vec![(Value::Pair(pair.clone()), position)];
    while let Some((current, inherited)) = stack.last_mut() {
        let Value::Pair(pair) = mem::replace(current, Value::Nil) else {
            stack.pop();
            continue;
        };
        if !seen.insert(&pair) {
            stack.pop();
            continue;
        }
        let (head, tail) = {
            let mut slots = pair.0.write();
            *inherited = *slots.position.get_or_insert(*inherited);
            (slots.head.clone(), slots.tail.clone())
        };
        *current = tail;
        let inherited = *inherited;
        if head.is_pair() {
            stack.push((head, inherited));
        }
    }
}

impl WeakPair {
    pub fn upgrade(&self) -> Option<Pair> {
        self.0.upgrade().map(Pair)
    }
}

impl<'a> IntoIterator for &'a Pair {
    type Item = Value;
    type IntoIter = PairIter;

    fn into_iter(self) -> PairIter {
        self.iter()
    }
}

impl IntoIterator for Pair {
    type Item = Value;
    type IntoIter = PairIter;

    fn into_iter(self) -> PairIter {
        PairIter::new(self)
    }
}

/// Identity set over pairs. Members are kept alive so their addresses
/// cannot be reused while the set exists.
#[derive(Default)]
pub(crate) struct PairSet {
    ids: FxHashSet<usize>,
    members: Vec<Pair>,
}

impl PairSet {
    /// Returns false when the pair was already present.
    pub(crate) fn insert(&mut self, pair: &Pair) -> bool {
        if self.ids.insert(pair.id()) {
            self.members.push(pair.clone());
            true
        } else {
            false
        }
    }
}

// ============================================================================
// Value Operations
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Atom(atom) => atom.kind().as_str(),
            Value::Pair(_) => "pair",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Value::Pair(_))
    }

    pub fn as_pair(&self) -> Option<&Pair> {
        match self {
            Value::Pair(pair) => Some(pair),
            _ => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Value::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    /// Nil and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Sequence length: 2 for a pair, 0 for nil.
    pub fn len(&self) -> Result<usize, ValueError> {
        match self {
            Value::Pair(_) => Ok(2),
            Value::Nil => Ok(0),
            other => Err(ValueError::type_error(format!(
                "object of type '{}' has no len",
                other.type_name()
            ))),
        }
    }

    pub fn is_empty(&self) -> Result<bool, ValueError> {
        Ok(self.len()? == 0)
    }

    pub fn get_item(&self, index: i64) -> Result<Value, ValueError> {
        match self {
            Value::Pair(pair) => pair.get(slot_index(index)?),
            Value::Nil => Err(ValueError::range("nil has no items")),
            other => Err(not_a_sequence(other)),
        }
    }

    pub fn set_item(&self, index: i64, value: Value) -> Result<(), ValueError> {
        match self {
            Value::Pair(pair) => pair.set(slot_index(index)?, value),
            Value::Nil => Err(ValueError::range("nil has no items")),
            other => Err(not_a_sequence(other)),
        }
    }

    /// Iterate a pair's two slots; nil yields nothing.
    pub fn iter(&self) -> Result<PairIter, ValueError> {
        match self {
            Value::Pair(pair) => Ok(pair.iter()),
            Value::Nil => Ok(PairIter::empty()),
            other => Err(ValueError::type_error(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }
}

fn slot_index(index: i64) -> Result<usize, ValueError> {
    match index {
        0 | 1 => Ok(index as usize),
        _ => Err(ValueError::range("pair index out of range")),
    }
}

fn not_a_sequence(value: &Value) -> ValueError {
    ValueError::type_error(format!(
        "'{}' object is not subscriptable",
        value.type_name()
    ))
}

// Pairs and atoms compare by identity; there is no structural equality.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Atom(a), Value::Atom(b)) => a == b,
            (Value::Pair(a), Value::Pair(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Atom> for Value {
    fn from(atom: Atom) -> Self {
        Value::Atom(atom)
    }
}

impl From<Pair> for Value {
    fn from(pair: Pair) -> Self {
        Value::Pair(pair)
    }
}

// ============================================================================
// Primitive Operations
// ============================================================================

/// Make a new pair value.
pub fn pair(head: Value, tail: Value) -> Value {
    Value::Pair(Pair::new(head, tail))
}

fn expect_pair<'a>(op: &str, slot: &str, value: &'a Value) -> Result<&'a Pair, ValueError> {
    match value {
        Value::Pair(pair) => Ok(pair),
        Value::Nil => Err(ValueError::type_error(format!("cannot {op} {slot} of nil"))),
        other => Err(ValueError::type_error(format!(
            "{slot}: expected pair, got {}",
            other.type_name()
        ))),
    }
}

pub fn car(value: &Value) -> Result<Value, ValueError> {
    Ok(expect_pair("get", "car", value)?.head())
}

pub fn cdr(value: &Value) -> Result<Value, ValueError> {
    Ok(expect_pair("get", "cdr", value)?.tail())
}

pub fn setcar(value: &Value, head: Value) -> Result<(), ValueError> {
    expect_pair("set", "car", value)?.set_head(head);
    Ok(())
}

pub fn setcdr(value: &Value, tail: Value) -> Result<(), ValueError> {
    expect_pair("set", "cdr", value)?.set_tail(tail);
    Ok(())
}

/// Build a chain from `members`.
///
/// No members gives nil. Otherwise every member but the last becomes a head
/// and the last member is the final tail, so `[1, 2, 3]` builds `(1 2 . 3)`
/// and a single member builds `(a)`. With `recursive`, every member becomes
/// a head and the last tail points back at the first pair.
pub fn cons<I>(members: I, recursive: bool) -> Value
where
    I: IntoIterator<Item = Value>,
{
    let mut members = members.into_iter();
    let Some(head) = members.next() else {
        return Value::Nil;
    };

    let first = Pair::new(head, Value::Nil);
    let mut rest: Vec<Value> = members.collect();

    let mut work = if recursive {
        Value::Pair(first.clone())
    } else {
        rest.pop().unwrap_or(Value::Nil)
    };
    for item in rest.into_iter().rev() {
        work = pair(item, work);
    }

    first.set_tail(work);
    Value::Pair(first)
}

/// Build a proper list (terminated by nil) from `items`.
pub fn list<I>(items: I) -> Value
where
    I: IntoIterator<Item = Value>,
    I::IntoIter: DoubleEndedIterator,
{
    items
        .into_iter()
        .rev()
        .fold(Value::Nil, |acc, item| pair(item, acc))
}
