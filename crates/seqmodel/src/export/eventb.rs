//! Event-B text rendering.
//!
//! The output follows the layout Rodin's text import accepts: one `CONTEXT`
//! block followed by one `MACHINE` block, with every labelled item on its own
//! indented line.
//!
//! # Notation
//!
//! [`Notation::Ascii`] uses the keyboard syntax (`/:`, `\/`, `|->`, `<:`,
//! `<->`, `{}`, `INT`); [`Notation::Unicode`] uses the mathematical symbols
//! (`∉`, `∪`, `↦`, `⊆`, `↔`, `∅`, `ℤ`).
//!
//! # Example
//!
//! ```
//! # use seqmodel::export::eventb::Notation;
//! let notation: Notation = "unicode".parse().unwrap();
//! assert_eq!(notation, Notation::Unicode);
//! assert_eq!(Notation::default().to_string(), "ascii");
//! ```

use std::{
    fmt::{self, Write},
    str::FromStr,
    sync::OnceLock,
};

use log::debug;
use regex::Regex;
use serde::Deserialize;

use super::{Error, Exporter};
use crate::formal::{Action, Event, Expr, FormalModel, Labelled, Predicate};

const INDENT: &str = "    ";

/// Symbol set used for operators in the generated text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notation {
    /// Keyboard syntax (default)
    #[default]
    Ascii,
    /// Mathematical symbols
    Unicode,
}

impl Notation {
    fn symbols(self) -> &'static Symbols {
        match self {
            Notation::Ascii => &ASCII,
            Notation::Unicode => &UNICODE,
        }
    }
}

impl FromStr for Notation {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascii" => Ok(Self::Ascii),
            "unicode" => Ok(Self::Unicode),
            _ => Err("Unsupported notation, expected `ascii` or `unicode`"),
        }
    }
}

impl From<Notation> for &'static str {
    fn from(val: Notation) -> Self {
        match val {
            Notation::Ascii => "ascii",
            Notation::Unicode => "unicode",
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

struct Symbols {
    member: &'static str,
    not_member: &'static str,
    subset: &'static str,
    union: &'static str,
    maplet: &'static str,
    relation: &'static str,
    empty_set: &'static str,
    integers: &'static str,
    assign: &'static str,
    becomes_in: &'static str,
    range: &'static str,
    not_equal: &'static str,
    less_equal: &'static str,
    greater_equal: &'static str,
}

const ASCII: Symbols = Symbols {
    member: ":",
    not_member: "/:",
    subset: "<:",
    union: "\\/",
    maplet: "|->",
    relation: "<->",
    empty_set: "{}",
    integers: "INT",
    assign: ":=",
    becomes_in: "::",
    range: "..",
    not_equal: "/=",
    less_equal: "<=",
    greater_equal: ">=",
};

const UNICODE: Symbols = Symbols {
    member: "∈",
    not_member: "∉",
    subset: "⊆",
    union: "∪",
    maplet: "↦",
    relation: "↔",
    empty_set: "∅",
    integers: "ℤ",
    assign: "≔",
    becomes_in: ":∈",
    range: "‥",
    not_equal: "≠",
    less_equal: "≤",
    greater_equal: "≥",
};

fn comparison_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!=|/=|≠|<=|≤|>=|≥").expect("valid regex"))
}

/// Writes a [`FormalModel`] as Event-B text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBWriter {
    notation: Notation,
}

impl EventBWriter {
    pub fn new(notation: Notation) -> Self {
        Self { notation }
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    fn write_context(&self, out: &mut String, model: &FormalModel) -> fmt::Result {
        writeln!(out, "CONTEXT {}", model.context_name())?;
        writeln!(out, "SETS")?;
        for set in model.sets() {
            writeln!(out, "{INDENT}{set}")?;
        }

        let constants = model.constants();
        if !constants.is_empty() {
            writeln!(out, "CONSTANTS")?;
            for constant in constants {
                writeln!(out, "{INDENT}{constant}")?;
            }
        }

        if !model.axioms().is_empty() {
            writeln!(out, "AXIOMS")?;
            self.write_predicates(out, model.axioms(), INDENT)?;
        }
        writeln!(out, "END")
    }

    fn write_machine(&self, out: &mut String, model: &FormalModel) -> fmt::Result {
        writeln!(out, "MACHINE {}", model.machine_name())?;
        writeln!(out, "SEES")?;
        writeln!(out, "{INDENT}{}", model.context_name())?;

        writeln!(out, "VARIABLES")?;
        for variable in model.variables() {
            writeln!(out, "{INDENT}{variable}")?;
        }

        writeln!(out, "INVARIANTS")?;
        self.write_predicates(out, model.invariants(), INDENT)?;

        writeln!(out, "EVENTS")?;
        let init = model.initialisation();
        writeln!(out, "{INDENT}{}", init.name())?;
        writeln!(out, "{INDENT}BEGIN")?;
        self.write_actions(out, init.actions())?;
        writeln!(out, "{INDENT}END")?;

        for event in model.events() {
            writeln!(out)?;
            self.write_event(out, event)?;
        }
        writeln!(out, "END")
    }

    fn write_event(&self, out: &mut String, event: &Event) -> fmt::Result {
        writeln!(out, "{INDENT}EVENT {}", event.name())?;
        if !event.guards().is_empty() {
            writeln!(out, "{INDENT}WHEN")?;
            self.write_predicates(out, event.guards(), &INDENT.repeat(2))?;
        }
        writeln!(out, "{INDENT}THEN")?;
        self.write_actions(out, event.actions())?;
        writeln!(out, "{INDENT}END")
    }

    fn write_predicates(
        &self,
        out: &mut String,
        predicates: &[Labelled<Predicate>],
        indent: &str,
    ) -> fmt::Result {
        for predicate in predicates {
            writeln!(
                out,
                "{indent}{}: {}",
                predicate.label(),
                self.predicate(predicate.item())
            )?;
        }
        Ok(())
    }

    fn write_actions(&self, out: &mut String, actions: &[Labelled<Action>]) -> fmt::Result {
        for action in actions {
            writeln!(
                out,
                "{INDENT}{INDENT}{}: {}",
                action.label(),
                self.action(action.item())
            )?;
        }
        Ok(())
    }

    fn predicate(&self, predicate: &Predicate) -> String {
        let sym = self.notation.symbols();
        match predicate {
            Predicate::Equal(left, right) => {
                format!("{} = {}", self.expr(left), self.expr(right))
            }
            Predicate::Member(left, right) => {
                format!("{} {} {}", self.expr(left), sym.member, self.expr(right))
            }
            Predicate::NotMember(left, right) => {
                format!("{} {} {}", self.expr(left), sym.not_member, self.expr(right))
            }
            Predicate::Subset(left, right) => {
                format!("{} {} {}", self.expr(left), sym.subset, self.expr(right))
            }
            Predicate::Condition(text) => self.condition(text),
        }
    }

    fn action(&self, action: &Action) -> String {
        let sym = self.notation.symbols();
        match action {
            Action::Assign(variable, value) => {
                format!("{variable} {} {}", sym.assign, self.expr(value))
            }
            Action::BecomesIn(variable, set) => {
                format!("{variable} {} {}", sym.becomes_in, self.expr(set))
            }
        }
    }

    fn expr(&self, expr: &Expr) -> String {
        let sym = self.notation.symbols();
        match expr {
            Expr::Ident(name) => name.clone(),
            Expr::Int(value) => value.to_string(),
            Expr::EmptySet => sym.empty_set.to_string(),
            Expr::Integers => sym.integers.to_string(),
            Expr::Singleton(element) => format!("{{{}}}", self.expr(element)),
            Expr::Enumeration(members) => format!("{{ {} }}", members.join(", ")),
            Expr::Maplet(left, right) => {
                format!("{} {} {}", self.expr(left), sym.maplet, self.expr(right))
            }
            Expr::Union(left, right) => {
                format!("{} {} {}", self.expr(left), sym.union, self.expr(right))
            }
            Expr::Relation(left, right) => {
                format!("{} {} {}", self.expr(left), sym.relation, self.expr(right))
            }
            Expr::Range(low, high) => format!("{low}{}{high}", sym.range),
        }
    }

    /// Rewrite the comparison operators of a frame guard into this notation.
    fn condition(&self, text: &str) -> String {
        let sym = self.notation.symbols();
        comparison_regex()
            .replace_all(text, |caps: &regex::Captures<'_>| match &caps[0] {
                "<=" | "≤" => sym.less_equal,
                ">=" | "≥" => sym.greater_equal,
                _ => sym.not_equal,
            })
            .into_owned()
    }
}

impl Exporter for EventBWriter {
    fn export_model(&self, model: &FormalModel) -> Result<String, Error> {
        debug!(notation:% = self.notation, machine = model.machine_name(); "Rendering Event-B text");

        let mut out = String::new();
        self.write_context(&mut out, model)?;
        writeln!(out)?;
        self.write_machine(&mut out, model)?;
        Ok(out)
    }
}
