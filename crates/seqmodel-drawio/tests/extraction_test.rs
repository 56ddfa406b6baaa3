use seqmodel_core::model::{GuardMode, ScopeKind, UNKNOWN_PARTICIPANT};
use seqmodel_drawio::{ExtractConfig, NameHints, error::ErrorCode, parse};

fn lifeline(id: &str, name: &str, x: u32) -> String {
    format!(
        r#"<mxCell id="{id}" value="{name}" style="shape=umlLifeline;perimeter=lifelinePerimeter;" vertex="1" parent="1">
             <mxGeometry x="{x}" y="0" width="100" height="300" as="geometry"/>
           </mxCell>"#
    )
}

fn message(id: &str, label: &str, from_x: u32, to_x: u32, y: u32) -> String {
    format!(
        r#"<mxCell id="{id}" value="{label}" style="html=1;endArrow=block;" edge="1" parent="1">
             <mxGeometry width="80" relative="1" as="geometry">
               <mxPoint x="{from_x}" y="{y}" as="sourcePoint"/>
               <mxPoint x="{to_x}" y="{y}" as="targetPoint"/>
             </mxGeometry>
           </mxCell>"#
    )
}

fn frame(id: &str, label: &str, x: u32, y: u32, width: u32, height: u32) -> String {
    format!(
        r#"<mxCell id="{id}" value="{label}" style="shape=umlFrame;whiteSpace=wrap;html=1;" vertex="1" parent="1">
             <mxGeometry x="{x}" y="{y}" width="{width}" height="{height}" as="geometry"/>
           </mxCell>"#
    )
}

fn text(id: &str, label: &str, x: u32, y: u32) -> String {
    format!(
        r#"<mxCell id="{id}" value="{label}" style="text;html=1;" vertex="1" parent="1">
             <mxGeometry x="{x}" y="{y}" width="60" height="20" as="geometry"/>
           </mxCell>"#
    )
}

fn diagram(cells: &[String]) -> String {
    format!(
        r#"<mxfile><diagram name="Login Flow"><mxGraphModel><root>
             <mxCell id="0"/><mxCell id="1" parent="0"/>
             {}
           </root></mxGraphModel></diagram></mxfile>"#,
        cells.join("\n")
    )
}

#[test]
fn test_login_scenario() {
    let xml = diagram(&[
        lifeline("a", "A", 0),
        lifeline("b", "B", 200),
        lifeline("c", "C", 400),
        message("m1", "login(user)", 50, 250, 40),
        frame("f", "opt", 0, 60, 350, 60),
        text("g", "[valid=1]", 10, 45),
        message("m2", "ack", 250, 50, 80),
    ]);

    let parsed = parse(&xml, &ExtractConfig::default(), NameHints::default()).unwrap();
    let model = parsed.model();
    assert!(parsed.warnings().is_empty(), "{:?}", parsed.warnings());

    assert_eq!(model.base_name(), "LoginFlow");
    assert_eq!(model.lifelines().len(), 3);

    let guards: Vec<_> = model
        .guard_variables()
        .iter()
        .map(|v| (v.name(), v.mode()))
        .collect();
    assert_eq!(guards, [("valid", GuardMode::Deterministic(1))]);

    let flows = model.flows();
    assert_eq!(flows.len(), 2);
    assert_eq!(flows[0].instance_id(), "login_1");
    assert_eq!(flows[0].data(), Some("user"));
    assert_eq!((flows[0].sender(), flows[0].receiver()), ("A", "B"));
    assert!(model.scope_of(&flows[0]).is_none());

    assert_eq!(flows[1].instance_id(), "ack_2");
    assert_eq!((flows[1].sender(), flows[1].receiver()), ("B", "A"));
    let scope = model.scope_of(&flows[1]).unwrap();
    assert_eq!(scope.kind(), ScopeKind::Optional);
    assert_eq!(scope.suffix(), "_opt1");
    assert_eq!(scope.guard(), Some("valid=1"));
}

#[test]
fn test_innermost_scope_wins() {
    let xml = diagram(&[
        lifeline("a", "A", 0),
        lifeline("b", "B", 200),
        frame("outer", "loop [n : 1..3]", 0, 0, 400, 300),
        frame("inner", "alt [ok = 1]", 10, 100, 380, 80),
        message("m1", "step", 50, 250, 50),
        message("m2", "check", 50, 250, 140),
    ]);

    let parsed = parse(&xml, &ExtractConfig::default(), NameHints::default()).unwrap();
    let model = parsed.model();

    let first = model.scope_of(&model.flows()[0]).unwrap();
    let second = model.scope_of(&model.flows()[1]).unwrap();
    assert_eq!(first.suffix(), "_loop1");
    assert_eq!(second.suffix(), "_alt1");

    assert_eq!(
        model.guard_variables().get("n"),
        Some(GuardMode::NonDeterministic { low: 1, high: 3 })
    );
}

#[test]
fn test_own_guard_not_overwritten_by_floating_label() {
    let xml = diagram(&[
        lifeline("a", "A", 0),
        frame("f", "opt [x = 1]", 0, 100, 300, 100),
        text("t", "[x = 2]", 20, 80),
    ]);

    let parsed = parse(&xml, &ExtractConfig::default(), NameHints::default()).unwrap();
    assert_eq!(parsed.model().scopes()[0].guard(), Some("x = 1"));
    assert_eq!(parsed.warnings()[0].code(), Some(ErrorCode::W202));
}

#[test]
fn test_threshold_is_configurable() {
    let xml = diagram(&[
        lifeline("a", "A", 0),
        lifeline("b", "B", 200),
        message("m1", "far", 120, 250, 10),
        message("m2", "drift", 50, 420, 20),
    ]);

    let strict = ExtractConfig::new(60.0, 40.0);
    let parsed = parse(&xml, &strict, NameHints::default()).unwrap();
    let flows = parsed.model().flows();
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0].call(), "drift");
    assert_eq!(flows[0].receiver(), UNKNOWN_PARTICIPANT);

    let codes: Vec<_> = parsed.warnings().iter().filter_map(|w| w.code()).collect();
    assert_eq!(codes, [ErrorCode::W200, ErrorCode::W201]);

    let lenient = parse(&xml, &ExtractConfig::default(), NameHints::default()).unwrap();
    assert_eq!(lenient.model().flows().len(), 2);
}

#[test]
fn test_malformed_input_is_fatal() {
    let err = parse("<mxfile><diagram>", &ExtractConfig::default(), NameHints::default())
        .unwrap_err();
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
}
