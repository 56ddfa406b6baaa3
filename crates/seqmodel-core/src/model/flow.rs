//! Ordered message flows between participants.

use std::fmt;

use log::trace;

use super::scope::{Scope, innermost_scope};

/// A directed message between two participants.
///
/// Flows are created unnumbered by the extractor and receive their 1-based
/// ordinal and scope attribution from [`order_flows`].
#[derive(Debug, Clone, PartialEq)]
pub struct MessageFlow {
    ordinal: usize,
    call: String,
    data: Option<String>,
    sender: String,
    receiver: String,
    y: f32,
    scope: Option<usize>,
}

impl MessageFlow {
    /// Create an unnumbered flow.
    pub fn new(
        call: impl Into<String>,
        data: Option<String>,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        y: f32,
    ) -> Self {
        Self {
            ordinal: 0,
            call: call.into(),
            data,
            sender: sender.into(),
            receiver: receiver.into(),
            y,
            scope: None,
        }
    }

    /// 1-based position in vertical order; 0 until [`order_flows`] runs.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The call name (label prefix before any argument list).
    pub fn call(&self) -> &str {
        &self.call
    }

    /// The first argument of the call, if any.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    /// Absolute vertical position used for ordering.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Index of the enclosing scope in the model's scope table.
    pub fn scope(&self) -> Option<usize> {
        self.scope
    }

    /// The message instance identifier, `<call>_<ordinal>`.
    pub fn instance_id(&self) -> String {
        format!("{}_{}", self.call, self.ordinal)
    }
}

impl fmt::Display for MessageFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.instance_id(), self.sender, self.receiver)
    }
}

/// Sort flows by vertical position, number them, and attribute scopes.
///
/// The sort is stable, so flows at the same height keep their discovery
/// order. Ordinals are assigned 1..=N after sorting, and each flow is
/// attributed to its innermost enclosing scope (see [`innermost_scope`]).
pub fn order_flows(mut flows: Vec<MessageFlow>, scopes: &[Scope]) -> Vec<MessageFlow> {
    flows.sort_by(|a, b| a.y.total_cmp(&b.y));
    for (index, flow) in flows.iter_mut().enumerate() {
        flow.ordinal = index + 1;
        flow.scope = innermost_scope(scopes, flow.y);
        trace!(
            instance = flow.instance_id(),
            y = flow.y,
            scope:? = flow.scope;
            "Ordered message flow"
        );
    }
    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{Bounds, Point, Size},
        model::ScopeKind,
    };

    fn flow(call: &str, y: f32) -> MessageFlow {
        MessageFlow::new(call, None, "A", "B", y)
    }

    #[test]
    fn test_instance_id() {
        let flows = order_flows(vec![flow("login", 10.0)], &[]);
        assert_eq!(flows[0].instance_id(), "login_1");
        assert_eq!(flows[0].to_string(), "login_1: A -> B");
    }

    #[test]
    fn test_order_by_y_assigns_ordinals() {
        let flows = order_flows(
            vec![flow("c", 300.0), flow("a", 100.0), flow("b", 200.0)],
            &[],
        );
        let ids: Vec<_> = flows.iter().map(MessageFlow::instance_id).collect();
        assert_eq!(ids, ["a_1", "b_2", "c_3"]);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let flows = order_flows(
            vec![flow("first", 50.0), flow("second", 50.0), flow("zero", 10.0)],
            &[],
        );
        let calls: Vec<_> = flows.iter().map(MessageFlow::call).collect();
        assert_eq!(calls, ["zero", "first", "second"]);
    }

    #[test]
    fn test_scope_attribution() {
        let scopes = [Scope::new(
            "frame",
            ScopeKind::Optional,
            1,
            Bounds::new_from_top_left(Point::new(0.0, 60.0), Size::new(300.0, 60.0)),
        )];
        let flows = order_flows(vec![flow("login", 40.0), flow("ack", 80.0)], &scopes);
        assert_eq!(flows[0].scope(), None);
        assert_eq!(flows[1].scope(), Some(0));
    }
}
