//! Interaction model types.
//!
//! This module contains the logical interaction model recovered from a
//! diagram document. These types are the hand-off point between extraction
//! and synthesis: the extractors build them, the synthesizer only reads them.
//!
//! # Pipeline Position
//!
//! ```text
//! Diagram document (XML, possibly with a compressed payload)
//!     ↓ load
//! Node tree + absolute geometry
//!     ↓ extract
//! Interaction Model (these types)
//!     ↓ synthesize
//! Event-B context + machine text
//! ```
//!
//! # Organization
//!
//! - [`lifeline`] - Participants: [`Lifeline`]
//! - [`scope`] - Combined fragments: [`Scope`], [`ScopeKind`]
//! - [`flow`] - Ordered messages: [`MessageFlow`]
//! - [`guard`] - Guard variables: [`GuardTable`], [`GuardMode`]

pub mod flow;
pub mod guard;
pub mod lifeline;
pub mod scope;

pub use flow::*;
pub use guard::*;
pub use lifeline::*;
pub use scope::*;

/// The complete interaction model recovered from one diagram.
///
/// All tables are rebuilt from scratch for every compilation request and
/// are never mutated once synthesis begins.
#[derive(Debug, Clone, Default)]
pub struct InteractionModel {
    base_name: String,
    lifelines: Vec<Lifeline>,
    scopes: Vec<Scope>,
    flows: Vec<MessageFlow>,
    guard_variables: GuardTable,
}

impl InteractionModel {
    /// Assemble a model from the derived tables.
    ///
    /// `flows` must already be sorted and numbered; see
    /// [`flow::order_flows`].
    pub fn new(
        base_name: String,
        lifelines: Vec<Lifeline>,
        scopes: Vec<Scope>,
        flows: Vec<MessageFlow>,
        guard_variables: GuardTable,
    ) -> Self {
        Self {
            base_name,
            lifelines,
            scopes,
            flows,
            guard_variables,
        }
    }

    /// The PascalCase system name used for the context and machine names.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Participants in registry (discovery) order.
    pub fn lifelines(&self) -> &[Lifeline] {
        &self.lifelines
    }

    /// Scopes in discovery order.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Message flows in vertical order.
    pub fn flows(&self) -> &[MessageFlow] {
        &self.flows
    }

    pub fn guard_variables(&self) -> &GuardTable {
        &self.guard_variables
    }

    /// Look up the scope a flow was attributed to.
    pub fn scope_of(&self, flow: &MessageFlow) -> Option<&Scope> {
        flow.scope().and_then(|index| self.scopes.get(index))
    }
}
