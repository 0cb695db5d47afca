//! End-to-end behavior of the system facade.

use std::sync::Arc;
use std::time::Duration;

use parametric_core::{
    ComponentSchema, Dispatch, EventKind, MemoryProvider, ParamValue, ParameterConfig,
    ParametricError, ParametricSystem, PersistenceProvider, PresetConfig, StateEvent,
    SystemConfig,
};

fn card_schema() -> ComponentSchema {
    ComponentSchema::new("card", "Card")
        .with_category("surface")
        .with_parameter("opacity", ParameterConfig::slider(1.0, 0.0, 1.0))
        .with_parameter("accent", ParameterConfig::color("#3366ff"))
        .with_parameter("bordered", ParameterConfig::toggle(false))
        .with_parameter(
            "variant",
            ParameterConfig::dropdown("flat", ["flat", "raised", "outlined"]),
        )
        .with_parameter("title", ParameterConfig::text("Untitled"))
        .with_group("appearance", ["opacity", "accent", "bordered"])
        .with_preset(
            PresetConfig::new("ghost", "Ghost", "card")
                .with_parameter("opacity", 0.2)
                .with_parameter("variant", "outlined"),
        )
}

fn system_with(config: SystemConfig) -> (ParametricSystem<MemoryProvider>, Arc<MemoryProvider>) {
    let provider = Arc::new(MemoryProvider::new());
    let system = ParametricSystem::with_shared_provider(config, Arc::clone(&provider));
    system.register_schema(card_schema()).unwrap();
    (system, provider)
}

fn quiet_system() -> (ParametricSystem<MemoryProvider>, Arc<MemoryProvider>) {
    system_with(SystemConfig {
        auto_persist: false,
        ..Default::default()
    })
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test(start_paused = true)]
async fn card_scenario() {
    let (system, _) = quiet_system();

    let card = system.create_component("card", None).await.unwrap();
    assert_eq!(card.parameters["opacity"], ParamValue::from(1.0));

    system
        .update_parameter(&card.id, "opacity", 0.4.into(), Dispatch::Debounced)
        .unwrap();
    assert_eq!(
        system.get_component(&card.id).unwrap().parameters["opacity"],
        ParamValue::from(0.4)
    );

    let err = system
        .update_parameter(&card.id, "opacity", 2.0.into(), Dispatch::Debounced)
        .unwrap_err();
    assert!(matches!(err, ParametricError::Validation { .. }));
    assert_eq!(
        system.get_component(&card.id).unwrap().parameters["opacity"],
        ParamValue::from(0.4)
    );
}

#[tokio::test(start_paused = true)]
async fn creation_fills_every_default() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", None).await.unwrap();

    assert_eq!(card.parameters, card_schema().defaults());
    assert!(card.id.starts_with("card_"));
    assert_eq!(card.preset, None);
}

#[tokio::test(start_paused = true)]
async fn unknown_type_is_rejected() {
    let (system, _) = quiet_system();
    let err = system.create_component("slider", None).await.unwrap_err();
    assert!(matches!(err, ParametricError::SchemaNotFound { .. }));
}

#[tokio::test(start_paused = true)]
async fn bundled_preset_overlays_defaults() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", Some("ghost")).await.unwrap();

    assert_eq!(card.parameters["opacity"], ParamValue::from(0.2));
    assert_eq!(card.parameters["variant"], ParamValue::from("outlined"));
    assert_eq!(card.parameters["title"], ParamValue::from("Untitled"));
    assert_eq!(card.preset.as_deref(), Some("ghost"));
}

#[tokio::test(start_paused = true)]
async fn created_event_follows_registration() {
    let (system, _) = quiet_system();
    let (_, created) = system.channel(EventKind::ComponentCreated);
    let (_, registered) = system.channel(EventKind::ComponentRegistered);

    let card = system.create_component("card", None).await.unwrap();

    assert!(registered.try_recv().is_ok());
    match created.try_recv().unwrap() {
        StateEvent::ComponentCreated { instance } => assert_eq!(instance.id, card.id),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn invalid_values_fail_fast_per_type() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", None).await.unwrap();
    let before = system.get_component(&card.id).unwrap();

    for (key, value) in [
        ("opacity", ParamValue::from("0.5")),
        ("accent", ParamValue::from(3.0)),
        ("bordered", ParamValue::from("yes")),
        ("variant", ParamValue::from("sunken")),
        ("title", ParamValue::from(true)),
        ("shadow", ParamValue::from(1.0)),
    ] {
        let err = system
            .update_parameter(&card.id, key, value, Dispatch::Immediate)
            .unwrap_err();
        assert!(matches!(err, ParametricError::Validation { .. }), "{key}");
    }
    assert_eq!(
        system.get_component(&card.id).unwrap().parameters,
        before.parameters
    );
}

#[tokio::test(start_paused = true)]
async fn batch_update_validates_before_writing() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", None).await.unwrap();

    let mut updates = parametric_core::ParameterMap::new();
    updates.insert("opacity".into(), 0.5.into());
    updates.insert("variant".into(), "sunken".into());
    let err = system
        .update_parameters(&card.id, updates, Dispatch::Immediate)
        .unwrap_err();

    match err {
        ParametricError::Validation { report, .. } => {
            assert!(report.has_issue_for("variant"));
            assert!(!report.has_issue_for("opacity"));
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(
        system.get_component(&card.id).unwrap().parameters["opacity"],
        ParamValue::from(1.0)
    );
}

#[tokio::test(start_paused = true)]
async fn same_value_twice_reports_unchanged_old_value() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", None).await.unwrap();

    system
        .update_parameter(&card.id, "opacity", 0.3.into(), Dispatch::Immediate)
        .unwrap();
    let second = system
        .update_parameter(&card.id, "opacity", 0.3.into(), Dispatch::Immediate)
        .unwrap();
    assert_eq!(second.old_value, second.new_value);
}

#[tokio::test(start_paused = true)]
async fn undo_after_flushes_restores_prior_maps() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", None).await.unwrap();
    system.set_global_parameter("theme", "dark".into());

    system
        .update_parameter(&card.id, "opacity", 0.6.into(), Dispatch::Debounced)
        .unwrap();
    settle().await;
    let after_first = system.snapshot();

    system.set_global_parameter("theme", "light".into());
    system
        .update_parameter(&card.id, "opacity", 0.9.into(), Dispatch::Debounced)
        .unwrap();
    settle().await;

    system.undo().unwrap();
    assert!(system.snapshot().same_state(&after_first));
    assert!(matches!(
        system.undo(),
        Err(ParametricError::NothingToUndo { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn reset_returns_to_preset_values() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", Some("ghost")).await.unwrap();
    system
        .update_parameter(&card.id, "opacity", 0.9.into(), Dispatch::Immediate)
        .unwrap();
    system
        .update_parameter(&card.id, "title", "Changed".into(), Dispatch::Immediate)
        .unwrap();

    system
        .reset_component(&card.id, Dispatch::Immediate)
        .await
        .unwrap();

    let reset = system.get_component(&card.id).unwrap();
    assert_eq!(reset.parameters["opacity"], ParamValue::from(0.2));
    assert_eq!(reset.parameters["title"], ParamValue::from("Untitled"));
}

#[tokio::test(start_paused = true)]
async fn saved_preset_round_trips_through_provider() {
    let (system, provider) = quiet_system();
    let preset = PresetConfig::new("faded", "Faded", "card").with_parameter("opacity", 0.5);
    system.save_preset(preset.clone()).await.unwrap();
    assert!(provider.contains("preset_faded"));

    // A second system sharing the provider only sees the stored copy.
    let other = ParametricSystem::with_shared_provider(SystemConfig::default(), provider);
    other.register_schema(card_schema()).unwrap();
    assert_eq!(other.load_preset("faded").await.unwrap(), preset);

    let card = other.create_component("card", Some("faded")).await.unwrap();
    assert_eq!(card.parameters["opacity"], ParamValue::from(0.5));

    let ids: Vec<String> = other
        .list_presets("card")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["faded", "ghost"]);
}

#[tokio::test(start_paused = true)]
async fn invalid_or_missing_presets_are_rejected() {
    let (system, _) = quiet_system();

    let bad = PresetConfig::new("loud", "Loud", "card").with_parameter("opacity", 4.0);
    assert!(matches!(
        system.save_preset(bad).await,
        Err(ParametricError::Validation { .. })
    ));
    assert!(matches!(
        system.load_preset("nope").await,
        Err(ParametricError::PresetNotFound { .. })
    ));
    assert!(matches!(
        system.create_component("card", Some("nope")).await,
        Err(ParametricError::PresetNotFound { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn storage_failures_surface_on_explicit_calls() {
    let (system, provider) = quiet_system();
    provider.set_fail_writes(true);

    let err = system
        .save_preset(PresetConfig::new("faded", "Faded", "card"))
        .await
        .unwrap_err();
    assert!(err.is_storage());
    assert!(system.persist().await.unwrap_err().is_storage());

    provider.set_fail_reads(true);
    assert!(system.load_state().await.unwrap_err().is_storage());
}

#[tokio::test(start_paused = true)]
async fn auto_persist_failure_does_not_fail_updates() {
    let (system, provider) = system_with(SystemConfig::default());
    provider.set_fail_writes(true);

    let card = system.create_component("card", None).await.unwrap();
    system
        .update_parameter(&card.id, "opacity", 0.7.into(), Dispatch::Debounced)
        .unwrap();
    settle().await;

    assert_eq!(
        system.get_component(&card.id).unwrap().parameters["opacity"],
        ParamValue::from(0.7)
    );
    assert!(provider.is_empty());
}

#[tokio::test(start_paused = true)]
async fn export_import_round_trip() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", Some("ghost")).await.unwrap();
    system
        .update_parameter(&card.id, "title", "Hello".into(), Dispatch::Immediate)
        .unwrap();
    let json = system.export_configuration(None).unwrap();

    let (target, _) = quiet_system();
    let imported = target.import_configuration(&json).unwrap();

    assert_eq!(imported.len(), 1);
    let copy = &imported[0];
    assert_ne!(copy.id, card.id);
    assert_eq!(copy.component_type, "card");
    assert_eq!(
        copy.parameters,
        system.get_component(&card.id).unwrap().parameters
    );
    assert_eq!(copy.preset.as_deref(), Some("ghost"));
    assert!(target.get_component(&copy.id).is_some());
}

#[tokio::test(start_paused = true)]
async fn import_fills_missing_keys_and_rejects_bad_entries() {
    let (system, _) = quiet_system();

    let partial = r#"{
        "version": "1.0.0",
        "timestamp": "2026-01-01T00:00:00Z",
        "components": [{
            "id": "card_old",
            "type": "card",
            "parameters": {"opacity": 0.25},
            "metadata": {"createdAt": "2026-01-01T00:00:00Z", "updatedAt": "2026-01-01T00:00:00Z"}
        }]
    }"#;
    let imported = system.import_configuration(partial).unwrap();
    assert_eq!(imported[0].parameters["opacity"], ParamValue::from(0.25));
    assert_eq!(imported[0].parameters["title"], ParamValue::from("Untitled"));

    let count = system.components().len();
    let mixed = partial.replace("\"parameters\": {\"opacity\": 0.25}", "\"parameters\": {\"opacity\": 9}");
    assert!(matches!(
        system.import_configuration(&mixed),
        Err(ParametricError::Validation { .. })
    ));
    let future = partial.replace("\"1.0.0\"", "\"2.0.0\"");
    assert!(matches!(
        system.import_configuration(&future),
        Err(ParametricError::InvalidEnvelope { .. })
    ));
    let unknown = partial.replace("\"type\": \"card\"", "\"type\": \"gauge\"");
    assert!(matches!(
        system.import_configuration(&unknown),
        Err(ParametricError::SchemaNotFound { .. })
    ));
    assert!(matches!(
        system.import_configuration("not json"),
        Err(ParametricError::EnvelopeFormat { .. })
    ));
    assert_eq!(system.components().len(), count);
}

#[tokio::test(start_paused = true)]
async fn persisted_state_loads_into_new_system() {
    let (system, provider) = system_with(SystemConfig::default());
    let card = system.create_component("card", None).await.unwrap();
    system
        .update_parameter(&card.id, "opacity", 0.35.into(), Dispatch::Debounced)
        .unwrap();
    settle().await;

    let restored = ParametricSystem::with_shared_provider(SystemConfig::default(), provider);
    restored.register_schema(card_schema()).unwrap();
    assert!(restored.load_state().await.unwrap());
    assert_eq!(
        restored.get_component(&card.id).unwrap().parameters["opacity"],
        ParamValue::from(0.35)
    );
}

#[tokio::test(start_paused = true)]
async fn clear_removes_persisted_state() {
    let (system, provider) = system_with(SystemConfig::default());
    system.create_component("card", None).await.unwrap();
    system.persist().await.unwrap();

    system.clear();
    settle().await;

    assert!(system.components().is_empty());
    assert!(provider.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn change_handler_routes_through_validation() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", None).await.unwrap();
    let on_change = system.change_handler(&card.id);

    on_change("opacity", 0.45.into()).unwrap();
    assert!(on_change("opacity", (-1.0).into()).is_err());
    settle().await;

    let props = system.render_props(&card.id).unwrap();
    assert_eq!(props.number("opacity"), Some(0.45));
}

#[tokio::test(start_paused = true)]
async fn restore_rejects_unknown_types() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", None).await.unwrap();
    let mut snapshot = system.snapshot();
    if let Some(instance) = snapshot.components.get_mut(&card.id) {
        instance.component_type = "gauge".into();
    }

    assert!(matches!(
        system.restore(snapshot),
        Err(ParametricError::SchemaNotFound { .. })
    ));
    assert_eq!(
        system.get_component(&card.id).unwrap().component_type,
        "card"
    );
}

#[tokio::test(start_paused = true)]
async fn restore_fills_keys_missing_from_snapshot() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", None).await.unwrap();
    let mut snapshot = system.snapshot();
    snapshot
        .components
        .get_mut(&card.id)
        .unwrap()
        .parameters
        .remove("title");

    system.restore(snapshot).unwrap();
    let stored = system.get_component(&card.id).unwrap();
    assert_eq!(stored.parameters.len(), 5);
    assert_eq!(stored.parameters["title"], ParamValue::from("Untitled"));
    system
        .update_parameter(&card.id, "title", "Hi".into(), Dispatch::Immediate)
        .unwrap();

    let mut out_of_range = system.snapshot();
    out_of_range
        .components
        .get_mut(&card.id)
        .unwrap()
        .parameters
        .insert("opacity".into(), 5.0.into());
    assert!(matches!(
        system.restore(out_of_range),
        Err(ParametricError::Validation { .. })
    ));
    assert_eq!(
        system.get_component(&card.id).unwrap().parameters["title"],
        ParamValue::from("Hi")
    );
}

fn reopen(provider: &Arc<MemoryProvider>, config: SystemConfig) -> ParametricSystem<MemoryProvider> {
    let system = ParametricSystem::with_shared_provider(config, Arc::clone(provider));
    system.register_schema(card_schema()).unwrap();
    system
}

#[tokio::test(start_paused = true)]
async fn corrupted_persisted_state_is_rejected() {
    let (source, provider) = quiet_system();
    let card = source.create_component("card", None).await.unwrap();
    let key = source.config().persistence_key.clone();

    let mut corrupted = source.snapshot();
    let instance = corrupted.components.get_mut(&card.id).unwrap();
    instance.parameters.insert("opacity".into(), 5.0.into());
    instance.parameters.insert("bogus".into(), true.into());
    let json = serde_json::to_string(&corrupted).unwrap();
    provider.save(&key, json.clone()).await.unwrap();

    let fresh = reopen(&provider, SystemConfig::default());
    match fresh.load_state().await {
        Err(ParametricError::Validation {
            component_type,
            report,
        }) => {
            assert_eq!(component_type, "card");
            assert!(report.has_issue_for("opacity"));
            assert!(report.has_issue_for("bogus"));
        }
        other => panic!("unexpected load result: {other:?}"),
    }
    assert!(fresh.components().is_empty());
    settle().await;
    assert_eq!(provider.get(&key), Some(json));

    let mut unknown_type = source.snapshot();
    unknown_type.components.get_mut(&card.id).unwrap().component_type = "gauge".into();
    provider
        .save(&key, serde_json::to_string(&unknown_type).unwrap())
        .await
        .unwrap();
    assert!(matches!(
        fresh.load_state().await,
        Err(ParametricError::SchemaNotFound { .. })
    ));
    assert!(fresh.components().is_empty());
}

#[tokio::test(start_paused = true)]
async fn partial_persisted_state_loads_with_defaults() {
    let (source, provider) = quiet_system();
    let card = source.create_component("card", None).await.unwrap();
    let key = source.config().persistence_key.clone();

    let mut partial = source.snapshot();
    let parameters = &mut partial.components.get_mut(&card.id).unwrap().parameters;
    parameters.remove("title");
    parameters.insert("opacity".into(), 0.25.into());
    let json = serde_json::to_string(&partial).unwrap();
    provider.save(&key, json.clone()).await.unwrap();

    let fresh = reopen(&provider, SystemConfig::default());
    assert!(fresh.load_state().await.unwrap());
    let stored = fresh.get_component(&card.id).unwrap();
    assert_eq!(stored.parameters["opacity"], ParamValue::from(0.25));
    assert_eq!(stored.parameters["title"], ParamValue::from("Untitled"));

    settle().await;
    assert_eq!(provider.get(&key), Some(json));
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_one_event_per_burst() {
    let (system, _) = quiet_system();
    let card = system.create_component("card", None).await.unwrap();
    let (id, updates) = system.channel(EventKind::ParameterUpdated);

    for n in 1..=5 {
        system
            .update_parameter(&card.id, "opacity", (f64::from(n) / 10.0).into(), Dispatch::Debounced)
            .unwrap();
    }
    settle().await;

    let received: Vec<StateEvent> = updates.try_iter().collect();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0].as_parameter_update().unwrap().new_value,
        ParamValue::from(0.5)
    );
    assert!(system.unsubscribe(EventKind::ParameterUpdated, id));
}
