//! Binding table for a single script.
//!
//! Scripts have one flat scope and single assignment: a name is either a
//! caller-supplied input image or a binding introduced exactly once.

use std::collections::HashMap;

use coocoo_types::{Handle, InputImage, Span, ValueKind};

/// What a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// An input image registered with the store.
    Input(Handle),
    /// A binding, by index into the resolved program's bindings.
    Local { index: u32, kind: ValueKind },
    /// A binding whose value failed to resolve. Uses are not reported again.
    Poisoned,
}

impl Symbol {
    /// Value kind, or `None` for poisoned bindings.
    pub fn kind(self) -> Option<ValueKind> {
        match self {
            Symbol::Input(_) => Some(ValueKind::Image),
            Symbol::Local { kind, .. } => Some(kind),
            Symbol::Poisoned => None,
        }
    }
}

#[derive(Debug)]
struct Entry {
    symbol: Symbol,
    /// Where the binding was introduced; `None` for inputs.
    span: Option<Span>,
}

/// Why a definition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// The name belongs to an input image.
    Input,
    /// The name was already bound at this span.
    Binding(Span),
}

#[derive(Debug, Default)]
pub struct BindingTable {
    entries: HashMap<String, Entry>,
}

impl BindingTable {
    /// Create a table pre-populated with the input images. A later input with
    /// the same name replaces an earlier one.
    pub fn with_inputs(inputs: &[InputImage]) -> Self {
        let mut table = Self::default();
        for input in inputs {
            table.entries.insert(
                input.name.clone(),
                Entry {
                    symbol: Symbol::Input(input.handle),
                    span: None,
                },
            );
        }
        table
    }

    /// Bind `name`, refusing any rebinding.
    pub fn define(&mut self, name: &str, symbol: Symbol, span: Span) -> Result<(), Conflict> {
        if let Some(existing) = self.entries.get(name) {
            return Err(match existing.span {
                None => Conflict::Input,
                Some(span) => Conflict::Binding(span),
            });
        }
        self.entries.insert(
            name.to_string(),
            Entry {
                symbol,
                span: Some(span),
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.entries.get(name).map(|e| e.symbol)
    }

    /// Every visible name, sorted for stable suggestions.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_are_visible() {
        let table = BindingTable::with_inputs(&[InputImage::new("sky", Handle(4))]);
        assert_eq!(table.lookup("sky"), Some(Symbol::Input(Handle(4))));
        assert_eq!(table.lookup("sky").and_then(Symbol::kind), Some(ValueKind::Image));
        assert_eq!(table.lookup("ground"), None);
    }

    #[test]
    fn test_single_assignment() {
        let mut table = BindingTable::with_inputs(&[InputImage::new("sky", Handle(0))]);
        let local = Symbol::Local {
            index: 0,
            kind: ValueKind::Number,
        };
        let first = Span::point(1, 1);
        assert_eq!(table.define("level", local, first), Ok(()));
        assert_eq!(
            table.define("level", local, Span::point(2, 1)),
            Err(Conflict::Binding(first))
        );
        assert_eq!(
            table.define("sky", local, Span::point(3, 1)),
            Err(Conflict::Input)
        );
    }

    #[test]
    fn test_later_input_wins() {
        let table = BindingTable::with_inputs(&[
            InputImage::new("sky", Handle(0)),
            InputImage::new("sky", Handle(1)),
        ]);
        assert_eq!(table.lookup("sky"), Some(Symbol::Input(Handle(1))));
    }

    #[test]
    fn test_names_sorted() {
        let mut table = BindingTable::with_inputs(&[InputImage::new("b", Handle(0))]);
        table.define("a", Symbol::Poisoned, Span::point(1, 1)).unwrap();
        assert_eq!(table.names(), ["a", "b"]);
    }
}
