//! Textual renderings of values.
//!
//! `Debug` gives the structural form, which exposes how a chain re-enters
//! itself: `cons(1, 2, nil)`, `cons(1, recursive=True)`. `Display` gives the
//! list form, `(1 2 . 3)`, which only marks a revisit with ` ...`.
//!
//! Both walk a chain along its tails, keyed on pair identity, so each pair of
//! a chain is expanded at most once. Heads are rendered as chains of their
//! own, nested through a frame stack rather than native recursion. A head
//! that points at a pair whose rendering is still in progress higher up
//! renders as `...`.

use std::fmt;
use std::mem;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::language::{Pair, PairSet, Value};

const CONS_OPEN: &str = "cons(";
const CLOSE: &str = ")";
const COMMA_SPACE: &str = ", ";
const RECURSIVE: &str = "recursive=True";
const BACK_EDGE: &str = "...";

/// Structural rendering of `value`.
pub fn repr(value: &Value) -> String {
    Printer::default().repr(value)
}

/// List-style rendering of `value`.
pub fn display(value: &Value) -> String {
    Printer::default().display(value)
}

#[derive(Default)]
struct Printer {
    // pairs of every chain currently being rendered
    active: FxHashSet<usize>,
}

/// What a chain frame needs next.
enum Step {
    /// Render this head as a chain of its own, then resume.
    Descend(Pair),
    /// The chain is complete.
    Done(String),
}

// Heads nest through an explicit stack of frames, so depth is bounded by
// memory rather than by the native stack.
impl Printer {
    fn repr(&mut self, value: &Value) -> String {
        match value {
            Value::Pair(pair) => self.repr_chain(pair),
            other => repr_scalar(other),
        }
    }

    fn repr_chain(&mut self, start: &Pair) -> String {
        let mut stack = vec![ReprFrame::new(start)];
        loop {
            let Some(frame) = stack.last_mut() else {
                return String::new();
            };
            match frame.step(&mut self.active) {
                Step::Descend(head) => stack.push(ReprFrame::new(&head)),
                Step::Done(text) => {
                    if let Some(done) = stack.pop() {
                        done.release(&mut self.active);
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.push_head(text),
                        None => return text,
                    }
                }
            }
        }
    }

    fn display(&mut self, value: &Value) -> String {
        match value {
            Value::Pair(pair) => self.display_chain(pair),
            other => display_scalar(other),
        }
    }

    fn display_chain(&mut self, start: &Pair) -> String {
        let mut stack = vec![DisplayFrame::new(start)];
        loop {
            let Some(frame) = stack.last_mut() else {
                return String::new();
            };
            match frame.step(&mut self.active) {
                Step::Descend(head) => stack.push(DisplayFrame::new(&head)),
                Step::Done(text) => {
                    if let Some(done) = stack.pop() {
                        done.release(&mut self.active);
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.parts.push(text),
                        None => return text,
                    }
                }
            }
        }
    }
}

// ============================================================================
// Structural frames
// ============================================================================

struct ReprFrame {
    start: Pair,
    tokens: Vec<String>,
    // pair identity -> index of that pair's head token
    found: FxHashMap<usize, usize>,
    chain: Vec<Pair>,
    current: Value,
}

impl ReprFrame {
    fn new(start: &Pair) -> Self {
        ReprFrame {
            start: start.clone(),
            tokens: vec![CONS_OPEN.to_string()],
            found: FxHashMap::default(),
            chain: Vec::new(),
            current: Value::Pair(start.clone()),
        }
    }

    fn push_head(&mut self, rendered: String) {
        self.tokens.push(rendered);
        self.tokens.push(COMMA_SPACE.to_string());
    }

    fn step(&mut self, active: &mut FxHashSet<usize>) -> Step {
        loop {
            let node = match mem::replace(&mut self.current, Value::Nil) {
                Value::Pair(node) => node,
                rest => {
                    self.tokens.push(repr_scalar(&rest));
                    return self.finish();
                }
            };

            if let Some(&at) = self.found.get(&node.id()) {
                self.tokens.push(RECURSIVE.to_string());
                if !node.ptr_eq(&self.start) {
                    // reopen at the re-entered pair so the loop shows as its
                    // own nested form
                    self.tokens.insert(at, CONS_OPEN.to_string());
                    self.tokens.push(CLOSE.to_string());
                }
                return self.finish();
            }

            self.found.insert(node.id(), self.tokens.len());
            active.insert(node.id());

            let (head, tail) = node.slots();
            self.chain.push(node);
            self.current = tail;

            match head {
                Value::Pair(pair) if active.contains(&pair.id()) => {
                    self.push_head(BACK_EDGE.to_string());
                }
                Value::Pair(pair) => return Step::Descend(pair),
                other => self.push_head(repr_scalar(&other)),
            }
        }
    }

    fn finish(&mut self) -> Step {
        self.tokens.push(CLOSE.to_string());
        Step::Done(self.tokens.concat())
    }

    fn release(self, active: &mut FxHashSet<usize>) {
        for node in &self.chain {
            active.remove(&node.id());
        }
    }
}

// ============================================================================
// Display frames
// ============================================================================

struct DisplayFrame {
    parts: Vec<String>,
    visited: PairSet,
    chain: Vec<usize>,
    current: Value,
}

impl DisplayFrame {
    fn new(start: &Pair) -> Self {
        DisplayFrame {
            parts: Vec::new(),
            visited: PairSet::default(),
            chain: Vec::new(),
            current: Value::Pair(start.clone()),
        }
    }

    fn step(&mut self, active: &mut FxHashSet<usize>) -> Step {
        loop {
            match mem::replace(&mut self.current, Value::Nil) {
                Value::Nil => return self.finish(),
                Value::Pair(node) => {
                    if !self.visited.insert(&node) {
                        self.parts.push(" ...".to_string());
                        return self.finish();
                    }
                    active.insert(node.id());
                    self.chain.push(node.id());

                    let (head, tail) = node.slots();
                    self.parts.push(" ".to_string());
                    self.current = tail;

                    match head {
                        Value::Str(text) => self.parts.push(quoted(&text)),
                        Value::Pair(pair) if active.contains(&pair.id()) => {
                            self.parts.push(BACK_EDGE.to_string());
                        }
                        Value::Pair(pair) => return Step::Descend(pair),
                        other => self.parts.push(display_scalar(&other)),
                    }
                }
                other => {
                    // improper list
                    self.parts.push(" . ".to_string());
                    self.parts.push(display_scalar(&other));
                    return self.finish();
                }
            }
        }
    }

    fn finish(&mut self) -> Step {
        // the leading separator becomes the opening paren
        self.parts[0] = "(".to_string();
        self.parts.push(CLOSE.to_string());
        Step::Done(self.parts.concat())
    }

    fn release(self, active: &mut FxHashSet<usize>) {
        for id in &self.chain {
            active.remove(id);
        }
    }
}

fn repr_scalar(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(x) => format!("{x:?}"),
        Value::Str(s) => format!("{:?}", &**s),
        Value::Atom(atom) => format!("{atom:?}"),
        Value::Pair(pair) => Printer::default().repr_chain(pair),
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(x) => format!("{x:?}"),
        Value::Str(s) => s.to_string(),
        Value::Atom(atom) => atom.name().to_string(),
        Value::Pair(pair) => Printer::default().display_chain(pair),
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\\\""))
}

// ============================================================================
// Formatting hooks
// ============================================================================

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&repr(self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display(self))
    }
}

impl fmt::Debug for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Printer::default().repr_chain(self))
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Printer::default().display_chain(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::{keyword, symbol};
    use crate::language::{NIL, pair, setcar, setcdr};

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[test]
    fn test_display_proper_and_improper() {
        assert_eq!(display(&pair(int(1), pair(int(2), NIL))), "(1 2)");
        assert_eq!(display(&pair(int(1), int(2))), "(1 . 2)");
    }

    #[test]
    fn test_display_quotes_strings() {
        let l = pair(Value::from("say \"hi\""), pair(symbol("x").into(), NIL));
        assert_eq!(display(&l), "(\"say \\\"hi\\\"\" x)");
    }

    #[test]
    fn test_display_improper_terminator_is_unquoted() {
        assert_eq!(display(&pair(int(1), Value::from("end"))), "(1 . end)");
    }

    #[test]
    fn test_repr_flat_form() {
        assert_eq!(repr(&pair(int(1), pair(int(2), NIL))), "cons(1, 2, nil)");
        assert_eq!(repr(&pair(int(1), int(2))), "cons(1, 2)");
        assert_eq!(repr(&NIL), "nil");
    }

    #[test]
    fn test_repr_atoms_and_strings() {
        let l = pair(symbol("a").into(), pair(keyword("b").into(), Value::from("c")));
        assert_eq!(repr(&l), "cons(<symbol 'a'>, <keyword 'b'>, \"c\")");
    }

    #[test]
    fn test_self_cycle() {
        let p = pair(int(1), NIL);
        setcdr(&p, p.clone()).unwrap();
        assert_eq!(display(&p), "(1 ...)");
        assert_eq!(repr(&p), "cons(1, recursive=True)");
        setcdr(&p, NIL).unwrap();
    }

    #[test]
    fn test_repr_reenters_middle_of_chain() {
        let c = pair(int(3), NIL);
        let b = pair(int(2), c.clone());
        let a = pair(int(1), b.clone());
        setcdr(&c, b.clone()).unwrap();

        assert_eq!(repr(&a), "cons(1, cons(2, 3, recursive=True))");
        assert_eq!(display(&a), "(1 2 3 ...)");
        setcdr(&c, NIL).unwrap();
    }

    #[test]
    fn test_nested_heads_render_recursively() {
        let inner = pair(int(1), pair(int(2), NIL));
        let outer = pair(inner.clone(), pair(inner, NIL));
        assert_eq!(display(&outer), "((1 2) (1 2))");
        assert_eq!(repr(&outer), "cons(cons(1, 2, nil), cons(1, 2, nil), nil)");
    }

    #[test]
    fn test_head_back_edge_terminates() {
        let p = pair(NIL, NIL);
        setcar(&p, p.clone()).unwrap();
        assert_eq!(display(&p), "(...)");
        assert_eq!(repr(&p), "cons(..., nil)");
        setcar(&p, NIL).unwrap();
    }

    #[test]
    fn test_formatting_hooks() {
        let l = pair(int(1), pair(Value::Float(2.5), NIL));
        assert_eq!(format!("{l}"), "(1 2.5)");
        assert_eq!(format!("{l:?}"), "cons(1, 2.5, nil)");
        let p = l.as_pair().unwrap();
        assert_eq!(format!("{p}"), "(1 2.5)");
    }
}
