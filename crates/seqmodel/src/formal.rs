//! The synthesized Event-B model.
//!
//! [`FormalModel`] is a notation-independent description of one context and
//! one machine. It is produced by [`synthesize`] from an
//! [`InteractionModel`](seqmodel_core::model::InteractionModel) and turned
//! into text by an [`Exporter`](crate::export::Exporter).
//!
//! Expressions and predicates are kept as small trees rather than strings so
//! that the same model can be rendered in ASCII or Unicode notation.

mod synthesize;

pub use synthesize::synthesize;

use seqmodel_drawio::error::Diagnostic;

/// Carrier set of participants.
pub const OBJECTS_SET: &str = "Objects";
/// Carrier set of message instances.
pub const MESSAGES_SET: &str = "Messages";
/// Carrier set of data parameters.
pub const DATA_SET: &str = "DataMessages";

pub const SENT_MESSAGES: &str = "sentMessages";
pub const SENDER: &str = "sender";
pub const RECEIVER: &str = "receiver";
pub const RECEIVED_MESSAGES: &str = "receivedMessages";
pub const SENDER_DATA: &str = "senderdataMessages";
pub const CURRENT_MESSAGE: &str = "currentMessage";
pub const RECEIVER_DATA: &str = "receiverdataMessages";

/// The protocol variables every machine declares, in declaration order.
pub const PROTOCOL_VARIABLES: [&str; 7] = [
    SENT_MESSAGES,
    SENDER,
    RECEIVER,
    RECEIVED_MESSAGES,
    SENDER_DATA,
    CURRENT_MESSAGE,
    RECEIVER_DATA,
];

/// A set-theoretic expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    Int(i64),
    /// The empty set.
    EmptySet,
    /// The set of all integers.
    Integers,
    /// `{e}`
    Singleton(Box<Expr>),
    /// `{ a, b, c }` over identifiers, as used in axioms.
    Enumeration(Vec<String>),
    Maplet(Box<Expr>, Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    /// The set of relations between two sets.
    Relation(Box<Expr>, Box<Expr>),
    /// Inclusive integer range.
    Range(i64, i64),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn singleton(element: Expr) -> Self {
        Expr::Singleton(Box::new(element))
    }

    pub fn maplet(left: Expr, right: Expr) -> Self {
        Expr::Maplet(Box::new(left), Box::new(right))
    }

    pub fn union(left: Expr, right: Expr) -> Self {
        Expr::Union(Box::new(left), Box::new(right))
    }

    pub fn relation(left: Expr, right: Expr) -> Self {
        Expr::Relation(Box::new(left), Box::new(right))
    }
}

/// A predicate used as an axiom, invariant or guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Equal(Expr, Expr),
    Member(Expr, Expr),
    NotMember(Expr, Expr),
    Subset(Expr, Expr),
    /// A guard condition taken verbatim from a diagram frame.
    ///
    /// Only its comparison operators are adapted to the output notation.
    Condition(String),
}

/// A state update inside an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `v := e`
    Assign(String, Expr),
    /// `v :∈ e`
    BecomesIn(String, Expr),
}

impl Action {
    /// The variable the action updates.
    pub fn variable(&self) -> &str {
        match self {
            Action::Assign(variable, _) | Action::BecomesIn(variable, _) => variable,
        }
    }
}

/// An item carrying its Event-B label (`axm1`, `inv3`, `grd2`, `act4`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labelled<T> {
    label: String,
    item: T,
}

impl<T> Labelled<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn item(&self) -> &T {
        &self.item
    }
}

/// Number `items` as `<prefix>1`, `<prefix>2`, ...
pub(crate) fn number<T>(prefix: &str, items: Vec<T>) -> Vec<Labelled<T>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| Labelled {
            label: format!("{prefix}{}", index + 1),
            item,
        })
        .collect()
}

/// A guarded event.
///
/// `INITIALISATION` is represented as an event without guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
    guards: Vec<Labelled<Predicate>>,
    actions: Vec<Labelled<Action>>,
}

impl Event {
    /// Create an event, labelling guards `grdN` and actions `actN`.
    pub fn new(name: impl Into<String>, guards: Vec<Predicate>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            guards: number("grd", guards),
            actions: number("act", actions),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guards(&self) -> &[Labelled<Predicate>] {
        &self.guards
    }

    pub fn actions(&self) -> &[Labelled<Action>] {
        &self.actions
    }

    /// Returns true if any guard equals `predicate`.
    pub fn has_guard(&self, predicate: &Predicate) -> bool {
        self.guards.iter().any(|guard| guard.item() == predicate)
    }
}

/// One Event-B context and the machine that sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalModel {
    pub(crate) context_name: String,
    pub(crate) machine_name: String,
    pub(crate) participants: Vec<String>,
    pub(crate) messages: Vec<String>,
    pub(crate) data: Vec<String>,
    pub(crate) axioms: Vec<Labelled<Predicate>>,
    pub(crate) variables: Vec<String>,
    pub(crate) invariants: Vec<Labelled<Predicate>>,
    pub(crate) initialisation: Event,
    pub(crate) events: Vec<Event>,
    pub(crate) warnings: Vec<Diagnostic>,
}

impl FormalModel {
    /// `<Base>Context`
    pub fn context_name(&self) -> &str {
        &self.context_name
    }

    /// `<Base>InteractionMachine_<version>`
    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    /// The carrier sets, which are always declared.
    pub fn sets(&self) -> [&'static str; 3] {
        [OBJECTS_SET, MESSAGES_SET, DATA_SET]
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn data(&self) -> &[String] {
        &self.data
    }

    /// Every constant: participants, then message instances, then data
    /// parameters. Names are distinct across the three groups.
    pub fn constants(&self) -> Vec<&str> {
        self.participants
            .iter()
            .chain(&self.messages)
            .chain(&self.data)
            .map(String::as_str)
            .collect()
    }

    pub fn axioms(&self) -> &[Labelled<Predicate>] {
        &self.axioms
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn invariants(&self) -> &[Labelled<Predicate>] {
        &self.invariants
    }

    pub fn initialisation(&self) -> &Event {
        &self.initialisation
    }

    /// Send and receive events, in flow order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Find an event by name.
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.name() == name)
    }

    /// Renames made while synthesizing, one warning per clashing identifier.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}
