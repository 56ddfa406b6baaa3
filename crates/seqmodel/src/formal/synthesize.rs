//! Interaction model to Event-B synthesis.

use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
    num::NonZeroU32,
};

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, warn};
use regex::Regex;

use seqmodel_core::model::{GuardMode, InteractionModel, MessageFlow, UNKNOWN_PARTICIPANT};
use seqmodel_drawio::error::{Diagnostic, ErrorCode};

use super::{
    Action, CURRENT_MESSAGE, DATA_SET, Event, Expr, FormalModel, MESSAGES_SET, OBJECTS_SET,
    PROTOCOL_VARIABLES, Predicate, RECEIVED_MESSAGES, RECEIVER, RECEIVER_DATA, SENDER,
    SENDER_DATA, SENT_MESSAGES, number,
};

/// Build the Event-B context and machine for an interaction.
///
/// Every flow becomes a `send` and a `receive` event, in flow order. Each
/// send after the first waits for the previous message to be received, and
/// flows inside a guarded frame carry the frame's condition.
///
/// Synthesis never fails: an interaction without flows yields a machine
/// with only the initialisation, and empty constant groups simply have no
/// axiom. Diagram names that clash with an identifier already declared are
/// renamed, with a [`ErrorCode::W300`] warning on the result.
pub fn synthesize(model: &InteractionModel, version: NonZeroU32) -> FormalModel {
    let base = model.base_name();
    let mut names = Namespace::new();

    let participants = names.declare_all(&participants(model), "participant", "obj");
    let message_ids: Vec<String> = model.flows().iter().map(MessageFlow::instance_id).collect();
    let messages = names.declare_all(&message_ids, "message", "msg");
    let data_names: Vec<String> = model
        .flows()
        .iter()
        .filter_map(MessageFlow::data)
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let data = names.declare_all(&data_names, "data parameter", "data");

    let axioms = number(
        "axm",
        [
            (OBJECTS_SET, participants.values()),
            (MESSAGES_SET, messages.values()),
            (DATA_SET, data.values()),
        ]
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(set, members)| Predicate::Equal(Expr::ident(set), Expr::Enumeration(members)))
        .collect(),
    );

    let guard_variables = model.guard_variables();
    let guard_names: Vec<String> = guard_variables
        .iter()
        .map(|var| var.name().to_owned())
        .collect();
    let guards = names.declare_all(&guard_names, "guard variable", "g");
    let conditions = ConditionRewriter::new(&guards);

    let variables: Vec<String> = PROTOCOL_VARIABLES
        .iter()
        .map(|name| (*name).to_owned())
        .chain(guards.values())
        .collect();

    let mut invariants = protocol_invariants();
    invariants.extend(
        guard_variables
            .iter()
            .map(|var| Predicate::Member(Expr::ident(guards.get(var.name())), Expr::Integers)),
    );

    let mut init_actions: Vec<Action> = PROTOCOL_VARIABLES
        .iter()
        .map(|name| Action::Assign((*name).to_owned(), Expr::EmptySet))
        .collect();
    init_actions.extend(guard_variables.iter().map(|var| {
        let name = guards.get(var.name()).to_owned();
        match var.mode() {
            GuardMode::NonDeterministic { low, high } => {
                Action::BecomesIn(name, Expr::Range(low, high))
            }
            mode => Action::Assign(name, Expr::Int(mode.initial_value().unwrap_or(0))),
        }
    }));

    let mut events = Vec::with_capacity(model.flows().len() * 2);
    let mut previous: Option<String> = None;
    for flow in model.flows() {
        let instance_id = flow.instance_id();
        let instance = messages.get(&instance_id);
        let scope = model.scope_of(flow);
        let suffix = scope.map(|scope| scope.suffix()).unwrap_or_default();
        let condition = scope
            .and_then(|scope| scope.guard())
            .map(|condition| conditions.rewrite(condition));

        debug!(
            instance = instance,
            suffix = suffix,
            condition:? = condition;
            "Synthesizing flow events"
        );

        let message = FlowNames {
            instance,
            sender: participants.get(flow.sender()),
            receiver: participants.get(flow.receiver()),
            data: flow.data().map(|name| data.get(name)),
        };
        events.push(send_event(&message, &suffix, previous.as_deref(), condition.as_deref()));
        events.push(receive_event(&message, &suffix));
        previous = Some(instance.to_owned());
    }

    let formal = FormalModel {
        context_name: format!("{base}Context"),
        machine_name: format!("{base}InteractionMachine_{version}"),
        participants: participants.values(),
        messages: messages.values(),
        data: data.values(),
        axioms,
        variables,
        invariants: number("inv", invariants),
        initialisation: Event::new("INITIALISATION", Vec::new(), init_actions),
        events,
        warnings: names.into_warnings(),
    };

    info!(
        machine = formal.machine_name(),
        constants = formal.constants().len(),
        events = formal.events().len(),
        warnings = formal.warnings().len();
        "Synthesized formal model"
    );

    formal
}

/// Identifiers declared so far in the context and machine.
///
/// Carrier sets and protocol variables are taken up front. A later
/// declaration that clashes is renamed to `<name>_<suffix>`, followed by a
/// counter if that is taken too.
struct Namespace {
    owners: HashMap<String, &'static str>,
    warnings: Vec<Diagnostic>,
}

impl Namespace {
    fn new() -> Self {
        let owners = [OBJECTS_SET, MESSAGES_SET, DATA_SET]
            .into_iter()
            .map(|set| (set.to_owned(), "carrier set"))
            .chain(
                PROTOCOL_VARIABLES
                    .into_iter()
                    .map(|variable| (variable.to_owned(), "protocol variable")),
            )
            .collect();
        Self {
            owners,
            warnings: Vec::new(),
        }
    }

    fn declare_all(&mut self, names: &[String], kind: &'static str, suffix: &str) -> Declared {
        Declared(
            names
                .iter()
                .map(|name| (name.clone(), self.declare(name, kind, suffix)))
                .collect(),
        )
    }

    fn declare(&mut self, name: &str, kind: &'static str, suffix: &str) -> String {
        let Some(owner) = self.owners.get(name).copied() else {
            self.owners.insert(name.to_owned(), kind);
            return name.to_owned();
        };

        let stem = format!("{name}_{suffix}");
        let mut renamed = stem.clone();
        let mut counter = 2;
        while self.owners.contains_key(&renamed) {
            renamed = format!("{stem}{counter}");
            counter += 1;
        }

        warn!(name, kind, owner, renamed = renamed.as_str(); "Renamed clashing identifier");
        self.warnings.push(
            Diagnostic::warning(format!("{kind} `{name}` clashes with the {owner} `{name}`"))
                .with_code(ErrorCode::W300)
                .with_help(format!("declared as `{renamed}` instead")),
        );
        self.owners.insert(renamed.clone(), kind);
        renamed
    }

    fn into_warnings(self) -> Vec<Diagnostic> {
        self.warnings
    }
}

/// Diagram names paired with the identifiers they were declared as.
struct Declared(IndexMap<String, String>);

impl Declared {
    /// The declared identifier for `name`; names never declared map to themselves.
    fn get<'a>(&'a self, name: &'a str) -> &'a str {
        self.0.get(name).map_or(name, String::as_str)
    }

    fn values(&self) -> Vec<String> {
        self.0.values().cloned().collect()
    }

    fn renamed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(name, declared)| name != declared)
            .map(|(name, declared)| (name.as_str(), declared.as_str()))
    }
}

/// Applies guard variable renames to frame conditions.
struct ConditionRewriter {
    pattern: Option<Regex>,
    renames: HashMap<String, String>,
}

impl ConditionRewriter {
    fn new(guards: &Declared) -> Self {
        let renames: HashMap<String, String> = guards
            .renamed()
            .map(|(name, declared)| (name.to_owned(), declared.to_owned()))
            .collect();
        let pattern = (!renames.is_empty())
            .then(|| {
                let alternatives: Vec<String> = renames.keys().map(|name| regex::escape(name)).collect();
                Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).ok()
            })
            .flatten();
        Self { pattern, renames }
    }

    fn rewrite<'a>(&self, condition: &'a str) -> Cow<'a, str> {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(condition, |caps: &regex::Captures<'_>| {
                self.renames
                    .get(&caps[0])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_owned())
            }),
            None => Cow::Borrowed(condition),
        }
    }
}

/// The identifiers one flow's events refer to.
struct FlowNames<'a> {
    instance: &'a str,
    sender: &'a str,
    receiver: &'a str,
    data: Option<&'a str>,
}

/// Participants that take part in at least one flow.
///
/// Registry order is kept; the placeholder for unresolved receivers comes
/// last when it is used.
fn participants(model: &InteractionModel) -> Vec<String> {
    let used: HashSet<&str> = model
        .flows()
        .iter()
        .flat_map(|flow| [flow.sender(), flow.receiver()])
        .collect();

    let mut names: IndexSet<&str> = model
        .lifelines()
        .iter()
        .map(|lifeline| lifeline.name())
        .filter(|name| used.contains(name))
        .collect();
    if used.contains(UNKNOWN_PARTICIPANT) {
        names.insert(UNKNOWN_PARTICIPANT);
    }
    names.into_iter().map(str::to_owned).collect()
}

fn protocol_invariants() -> Vec<Predicate> {
    let messages_to = |set: &str| Expr::relation(Expr::ident(MESSAGES_SET), Expr::ident(set));
    vec![
        Predicate::Subset(Expr::ident(SENT_MESSAGES), Expr::ident(MESSAGES_SET)),
        Predicate::Subset(Expr::ident(CURRENT_MESSAGE), Expr::ident(MESSAGES_SET)),
        Predicate::Member(Expr::ident(SENDER), messages_to(OBJECTS_SET)),
        Predicate::Member(Expr::ident(RECEIVER), messages_to(OBJECTS_SET)),
        Predicate::Subset(Expr::ident(RECEIVED_MESSAGES), Expr::ident(SENT_MESSAGES)),
        Predicate::Member(Expr::ident(SENDER_DATA), messages_to(DATA_SET)),
        Predicate::Member(Expr::ident(RECEIVER_DATA), messages_to(DATA_SET)),
    ]
}

/// `variable := variable ∪ {element}`
fn extend(variable: &str, element: Expr) -> Action {
    Action::Assign(
        variable.to_owned(),
        Expr::union(Expr::ident(variable), Expr::singleton(element)),
    )
}

fn pair(instance: &str, other: &str) -> Expr {
    Expr::maplet(Expr::ident(instance), Expr::ident(other))
}

fn send_event(
    flow: &FlowNames<'_>,
    suffix: &str,
    previous: Option<&str>,
    condition: Option<&str>,
) -> Event {
    let instance = flow.instance;
    let message = || Expr::ident(instance);

    let mut guards = vec![
        Predicate::NotMember(message(), Expr::ident(SENT_MESSAGES)),
        Predicate::Equal(Expr::ident(CURRENT_MESSAGE), Expr::EmptySet),
    ];
    if let Some(previous) = previous {
        guards.push(Predicate::Member(
            Expr::ident(previous),
            Expr::ident(RECEIVED_MESSAGES),
        ));
    }
    if let Some(condition) = condition {
        guards.push(Predicate::Condition(condition.to_owned()));
    }

    let mut actions = vec![
        extend(SENT_MESSAGES, message()),
        extend(SENDER, pair(instance, flow.sender)),
        extend(RECEIVER, pair(instance, flow.receiver)),
        Action::Assign(RECEIVED_MESSAGES.to_owned(), Expr::EmptySet),
    ];
    if let Some(data) = flow.data {
        actions.push(extend(SENDER_DATA, pair(instance, data)));
    }
    actions.push(Action::Assign(
        CURRENT_MESSAGE.to_owned(),
        Expr::singleton(message()),
    ));

    Event::new(format!("send{instance}{suffix}"), guards, actions)
}

fn receive_event(flow: &FlowNames<'_>, suffix: &str) -> Event {
    let instance = flow.instance;
    let message = || Expr::ident(instance);

    let guards = vec![
        Predicate::Member(message(), Expr::ident(SENT_MESSAGES)),
        Predicate::Member(pair(instance, flow.sender), Expr::ident(SENDER)),
        Predicate::Member(pair(instance, flow.receiver), Expr::ident(RECEIVER)),
        Predicate::NotMember(message(), Expr::ident(RECEIVED_MESSAGES)),
        Predicate::Equal(Expr::ident(CURRENT_MESSAGE), Expr::singleton(message())),
    ];

    let mut actions = vec![extend(RECEIVED_MESSAGES, message())];
    if let Some(data) = flow.data {
        actions.push(extend(RECEIVER_DATA, pair(instance, data)));
    }
    actions.push(Action::Assign(CURRENT_MESSAGE.to_owned(), Expr::EmptySet));

    Event::new(format!("receive{instance}{suffix}"), guards, actions)
}

#[cfg(test)]
mod tests {
    use seqmodel_core::{
        geometry::{Bounds, Point, Size},
        model::{GuardTable, Lifeline, Scope, ScopeKind, order_flows},
    };

    use super::*;

    fn lifelines(names: &[&str]) -> Vec<Lifeline> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Lifeline::new(*name, i as f32 * 200.0, format!("n{i}")))
            .collect()
    }

    fn version(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn login_model() -> InteractionModel {
        let mut scope = Scope::new(
            "frame",
            ScopeKind::Optional,
            1,
            Bounds::new_from_top_left(Point::new(0.0, 60.0), Size::new(350.0, 60.0)),
        );
        scope.try_set_guard("valid=1");
        let scopes = vec![scope];

        let flows = order_flows(
            vec![
                MessageFlow::new("ack", None, "B", "A", 80.0),
                MessageFlow::new("login", Some("user".to_string()), "A", "B", 40.0),
            ],
            &scopes,
        );

        let mut guards = GuardTable::new();
        guards.try_insert("valid", GuardMode::Deterministic(1));

        InteractionModel::new(
            "LoginFlow".to_string(),
            lifelines(&["A", "B", "C"]),
            scopes,
            flows,
            guards,
        )
    }

    #[test]
    fn test_names_and_constants() {
        let formal = synthesize(&login_model(), version(2));

        assert_eq!(formal.context_name(), "LoginFlowContext");
        assert_eq!(formal.machine_name(), "LoginFlowInteractionMachine_2");
        assert_eq!(formal.participants(), ["A", "B"]);
        assert_eq!(formal.messages(), ["login_1", "ack_2"]);
        assert_eq!(formal.data(), ["user"]);
        assert_eq!(
            formal.constants(),
            ["A", "B", "login_1", "ack_2", "user"]
        );
        assert_eq!(formal.axioms().len(), 3);
        assert_eq!(formal.axioms()[2].label(), "axm3");
    }

    #[test]
    fn test_guard_variable_declarations() {
        let formal = synthesize(&login_model(), version(1));

        assert_eq!(formal.variables().len(), 8);
        assert_eq!(formal.variables()[7], "valid");
        assert_eq!(formal.invariants().len(), 8);
        assert_eq!(formal.invariants()[7].label(), "inv8");
        assert_eq!(
            formal.invariants()[7].item(),
            &Predicate::Member(Expr::ident("valid"), Expr::Integers)
        );

        let init = formal.initialisation().actions();
        assert_eq!(init.len(), 8);
        assert_eq!(
            init[7].item(),
            &Action::Assign("valid".to_string(), Expr::Int(1))
        );
    }

    #[test]
    fn test_scenario_events() {
        let formal = synthesize(&login_model(), version(1));
        let names: Vec<_> = formal.events().iter().map(Event::name).collect();
        assert_eq!(
            names,
            [
                "sendlogin_1",
                "receivelogin_1",
                "sendack_2_opt1",
                "receiveack_2_opt1"
            ]
        );

        let send_ack = formal.event("sendack_2_opt1").unwrap();
        assert!(send_ack.has_guard(&Predicate::Member(
            Expr::ident("login_1"),
            Expr::ident(RECEIVED_MESSAGES)
        )));
        assert!(send_ack.has_guard(&Predicate::Condition("valid=1".to_string())));
        assert_eq!(send_ack.guards().len(), 4);

        let send_login = formal.event("sendlogin_1").unwrap();
        assert_eq!(send_login.guards().len(), 2);
    }

    #[test]
    fn test_data_adds_actions() {
        let formal = synthesize(&login_model(), version(1));

        let send_login = formal.event("sendlogin_1").unwrap();
        let variables: Vec<_> = send_login
            .actions()
            .iter()
            .map(|action| action.item().variable())
            .collect();
        assert_eq!(
            variables,
            [
                SENT_MESSAGES,
                SENDER,
                RECEIVER,
                RECEIVED_MESSAGES,
                SENDER_DATA,
                CURRENT_MESSAGE
            ]
        );

        let receive_ack = formal.event("receiveack_2_opt1").unwrap();
        assert_eq!(receive_ack.actions().len(), 2);
        let receive_login = formal.event("receivelogin_1").unwrap();
        assert_eq!(receive_login.actions()[1].item().variable(), RECEIVER_DATA);
    }

    #[test]
    fn test_unknown_receiver_is_listed_last() {
        let flows = order_flows(
            vec![MessageFlow::new("ping", None, "B", UNKNOWN_PARTICIPANT, 10.0)],
            &[],
        );
        let model = InteractionModel::new(
            "Sys".to_string(),
            lifelines(&["A", "B"]),
            Vec::new(),
            flows,
            GuardTable::new(),
        );

        let formal = synthesize(&model, version(1));
        assert_eq!(formal.participants(), ["B", UNKNOWN_PARTICIPANT]);
    }

    #[test]
    fn test_empty_model() {
        let model = InteractionModel::new(
            "Empty".to_string(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            GuardTable::new(),
        );

        let formal = synthesize(&model, version(1));
        assert!(formal.events().is_empty());
        assert!(formal.axioms().is_empty());
        assert!(formal.constants().is_empty());
        assert_eq!(formal.initialisation().actions().len(), 7);
    }

    #[test]
    fn test_non_deterministic_initialisation() {
        let mut guards = GuardTable::new();
        guards.try_insert("amount", GuardMode::NonDeterministic { low: 0, high: 10 });
        guards.try_insert("retries", GuardMode::Default);
        let model = InteractionModel::new(
            "Shop".to_string(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            guards,
        );

        let formal = synthesize(&model, version(1));
        let init = formal.initialisation().actions();
        assert_eq!(
            init[7].item(),
            &Action::BecomesIn("amount".to_string(), Expr::Range(0, 10))
        );
        assert_eq!(
            init[8].item(),
            &Action::Assign("retries".to_string(), Expr::Int(0))
        );
    }

    fn clashing_model() -> InteractionModel {
        let mut scope = Scope::new(
            "frame",
            ScopeKind::Optional,
            1,
            Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(350.0, 100.0)),
        );
        scope.try_set_guard("sender = 1");
        let scopes = vec![scope];

        let flows = order_flows(
            vec![MessageFlow::new("login", Some("A".to_string()), "A", "B", 40.0)],
            &scopes,
        );

        let mut guards = GuardTable::new();
        guards.try_insert("sender", GuardMode::Deterministic(1));

        InteractionModel::new(
            "Clash".to_string(),
            lifelines(&["A", "B"]),
            scopes,
            flows,
            guards,
        )
    }

    #[test]
    fn test_guard_variable_clashing_with_protocol_variable_is_renamed() {
        let formal = synthesize(&clashing_model(), version(1));

        let senders = formal
            .variables()
            .iter()
            .filter(|name| name.as_str() == SENDER)
            .count();
        assert_eq!(senders, 1);
        assert_eq!(formal.variables()[7], "sender_g");
        assert_eq!(
            formal.invariants()[7].item(),
            &Predicate::Member(Expr::ident("sender_g"), Expr::Integers)
        );
        assert_eq!(
            formal.initialisation().actions()[7].item(),
            &Action::Assign("sender_g".to_string(), Expr::Int(1))
        );

        let send = formal.event("sendlogin_1_opt1").unwrap();
        assert!(send.has_guard(&Predicate::Condition("sender_g = 1".to_string())));
    }

    #[test]
    fn test_data_clashing_with_participant_is_renamed() {
        let formal = synthesize(&clashing_model(), version(1));

        assert_eq!(formal.participants(), ["A", "B"]);
        assert_eq!(formal.data(), ["A_data"]);

        let send = formal.event("sendlogin_1_opt1").unwrap();
        let sender_data = send
            .actions()
            .iter()
            .find(|action| action.item().variable() == SENDER_DATA)
            .unwrap();
        assert_eq!(
            sender_data.item(),
            &Action::Assign(
                SENDER_DATA.to_string(),
                Expr::union(
                    Expr::ident(SENDER_DATA),
                    Expr::singleton(Expr::maplet(Expr::ident("login_1"), Expr::ident("A_data")))
                )
            )
        );
        let sender = send
            .actions()
            .iter()
            .find(|action| action.item().variable() == SENDER)
            .unwrap();
        assert_eq!(
            sender.item(),
            &Action::Assign(
                SENDER.to_string(),
                Expr::union(
                    Expr::ident(SENDER),
                    Expr::singleton(Expr::maplet(Expr::ident("login_1"), Expr::ident("A")))
                )
            )
        );
    }

    #[test]
    fn test_clashes_are_reported() {
        let formal = synthesize(&clashing_model(), version(1));

        let codes: Vec<_> = formal.warnings().iter().map(|w| w.code()).collect();
        assert_eq!(codes, [Some(ErrorCode::W300), Some(ErrorCode::W300)]);
        assert_eq!(
            formal.warnings()[0].message(),
            "data parameter `A` clashes with the participant `A`"
        );
        assert_eq!(formal.warnings()[0].help(), Some("declared as `A_data` instead"));
        assert!(formal.warnings()[1].message().starts_with("guard variable `sender`"));

        let constants = formal.constants();
        let distinct: HashSet<_> = constants.iter().collect();
        assert_eq!(distinct.len(), constants.len());
    }

    #[test]
    fn test_renames_skip_taken_names() {
        let flows = order_flows(
            vec![
                MessageFlow::new("a", Some("Objects".to_string()), "Objects_data", "B", 10.0),
            ],
            &[],
        );
        let model = InteractionModel::new(
            "Sys".to_string(),
            lifelines(&["Objects_data", "B"]),
            Vec::new(),
            flows,
            GuardTable::new(),
        );

        let formal = synthesize(&model, version(1));
        assert_eq!(formal.participants(), ["Objects_data", "B"]);
        assert_eq!(formal.data(), ["Objects_data2"]);
    }

    #[test]
    fn test_clean_model_has_no_warnings() {
        assert!(synthesize(&login_model(), version(1)).warnings().is_empty());
    }

    #[test]
    fn test_condition_rewrite_matches_whole_words() {
        let mut names = Namespace::new();
        let guards = names.declare_all(
            &["sender".to_string(), "senders".to_string()],
            "guard variable",
            "g",
        );
        let rewriter = ConditionRewriter::new(&guards);
        assert_eq!(rewriter.rewrite("sender>1 & senders<2"), "sender_g>1 & senders<2");
        assert_eq!(rewriter.rewrite("x=1"), "x=1");
    }

    #[test]
    fn test_repeated_data_is_declared_once() {
        let flows = order_flows(
            vec![
                MessageFlow::new("a", Some("token".to_string()), "A", "B", 10.0),
                MessageFlow::new("b", Some("token".to_string()), "B", "A", 20.0),
            ],
            &[],
        );
        let model = InteractionModel::new(
            "Sys".to_string(),
            lifelines(&["A", "B"]),
            Vec::new(),
            flows,
            GuardTable::new(),
        );

        let formal = synthesize(&model, version(1));
        assert_eq!(formal.data(), ["token"]);
    }
}
