use enrollflow::shared::ids::StepId;
use enrollflow::workflow::error::EngineError;
use enrollflow::workflow::registry::{
    onboarding_catalog, FieldRule, RequiredWhen, StepDefinition, StepDefinitionRegistry,
    FIELD_BILLING_MODEL, FIELD_REMITTANCE_ADDRESS, STEP_ACCESS_REVIEW, STEP_BILLING_SETUP,
    STEP_PAYMENT_CAPTURE,
};
use serde_json::{json, Map};

#[test]
fn catalog_lookup_by_unknown_id_is_a_configuration_error() {
    let registry = onboarding_catalog();
    let bogus = StepId::parse("no_such_step").expect("step id");
    match registry.definition_for(&bogus) {
        Err(EngineError::UnknownStep { step_id }) => assert_eq!(step_id, "no_such_step"),
        other => panic!("unexpected lookup result: {other:?}"),
    }
}

#[test]
fn catalog_declares_three_ordered_steps() {
    let registry = onboarding_catalog();
    let orders: Vec<u32> = registry.steps().iter().map(|step| step.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(registry.first_step().step_id.as_str(), STEP_BILLING_SETUP);
    let payment = StepId::parse(STEP_PAYMENT_CAPTURE).expect("step id");
    assert_eq!(registry.position_of(&payment), Some(1));
}

#[test]
fn only_access_review_is_skippable() {
    let registry = onboarding_catalog();
    for definition in registry.steps() {
        let expected = definition.step_id.as_str() == STEP_ACCESS_REVIEW;
        assert_eq!(definition.skippable, expected, "{}", definition.step_id);
    }
}

#[test]
fn self_admin_rules_are_conditional_and_clearing() {
    let registry = onboarding_catalog();
    let billing = registry
        .definition_for(&StepId::parse(STEP_BILLING_SETUP).expect("step id"))
        .expect("billing step");
    let remittance = billing
        .field_rules
        .iter()
        .find(|rule| rule.field == FIELD_REMITTANCE_ADDRESS)
        .expect("remittance rule");
    assert!(remittance.clear_on_deactivate);

    let mut self_admin = Map::new();
    self_admin.insert(FIELD_BILLING_MODEL.to_string(), json!("self_administered"));
    assert!(remittance.required_when.is_met(&self_admin));

    let mut list_bill = Map::new();
    list_bill.insert(FIELD_BILLING_MODEL.to_string(), json!("list_bill"));
    assert!(!remittance.required_when.is_met(&list_bill));
    assert!(!remittance.required_when.is_met(&Map::new()));
}

#[test]
fn compound_predicates_combine_siblings() {
    let both = RequiredWhen::AllOf(vec![
        RequiredWhen::field_equals("a", "1"),
        RequiredWhen::field_equals("b", "2"),
    ]);
    let either = RequiredWhen::AnyOf(vec![
        RequiredWhen::field_equals("a", "1"),
        RequiredWhen::field_equals("b", "2"),
    ]);
    let mut data = Map::new();
    data.insert("a".to_string(), json!("1"));
    assert!(!both.is_met(&data));
    assert!(either.is_met(&data));
    data.insert("b".to_string(), json!("2"));
    assert!(both.is_met(&data));
}

#[test]
fn registry_construction_rejects_empty_catalog() {
    match StepDefinitionRegistry::new(Vec::new()) {
        Err(EngineError::Registry(reason)) => assert!(reason.contains("at least one step")),
        other => panic!("unexpected construction result: {other:?}"),
    }
}

#[test]
fn registry_sorts_definitions_by_order() {
    let late = StepDefinition::new("late", 5)
        .expect("step")
        .with_rules(vec![FieldRule::required("x")]);
    let early = StepDefinition::new("early", 1).expect("step");
    let registry = StepDefinitionRegistry::new(vec![late, early]).expect("registry");
    assert_eq!(registry.first_step().step_id.as_str(), "early");
}
