use std::sync::Arc;

use super::common::*;
use crate::config::EngineSettings;
use crate::diet::domain::{ConfidenceLevel, MenuItem, RestaurantId};
use crate::diet::evidence::ENGINE_VERSION;
use crate::diet::repository::{InferenceRepository, RepositoryError};
use crate::diet::service::{DietSuitabilityService, SuitabilityServiceError};
use crate::diet::suitability::SuitabilitySource;

#[test]
fn compute_stores_one_row_per_tag() {
    let store = Arc::new(seeded_store());
    let service = build_service(store.clone());

    let records = service
        .compute_for_restaurant(&restaurant())
        .expect("compute succeeds");

    assert_eq!(records.len(), 5);
    assert!(records
        .iter()
        .all(|record| record.engine_version == ENGINE_VERSION));
    let stored = store
        .inference_results(&restaurant(), ENGINE_VERSION)
        .expect("rows readable");
    assert_eq!(stored.len(), 5);
}

#[test]
fn repeated_compute_upserts_instead_of_duplicating() {
    let store = Arc::new(seeded_store());
    let service = build_service(store.clone());

    service.compute_for_restaurant(&restaurant()).expect("first run");
    store
        .put_menu(&restaurant(), vec![MenuItem::new("item-9", "Vegan Ramen")])
        .expect("menu replaced");
    service.compute_for_restaurant(&restaurant()).expect("second run");

    let stored = store.stored_inferences(&restaurant()).expect("rows readable");
    assert_eq!(stored.len(), 5);
    let vegan = stored
        .iter()
        .find(|record| record.inference.diet_tag_key == "VEGAN")
        .expect("vegan row");
    assert_eq!(vegan.inference.reasons.total_menu_items, 1);
    assert_eq!(vegan.inference.reasons.matched_items[0].item_id, item_id("item-9"));
}

#[test]
fn insert_conflict_is_resolved_as_update() {
    let inner = seeded_store();
    let service = build_service(Arc::new(StaleReadStore {
        inner: inner.clone(),
    }));

    service.compute_for_restaurant(&restaurant()).expect("first run");
    service
        .compute_for_restaurant(&restaurant())
        .expect("second run merges on conflict");

    assert_eq!(inner.stored_inferences(&restaurant()).expect("rows").len(), 5);
}

#[test]
fn failed_write_rolls_back_the_whole_restaurant() {
    let inner = seeded_store();
    build_service(Arc::new(inner.clone()))
        .compute_for_restaurant(&restaurant())
        .expect("initial run");
    let before = inner.stored_inferences(&restaurant()).expect("rows");

    inner
        .put_menu(&restaurant(), vec![MenuItem::new("item-9", "Vegan Ramen")])
        .expect("menu replaced");
    let flaky = build_service(Arc::new(FlakyWriteStore {
        inner: inner.clone(),
        allowed_writes: 2,
    }));

    match flaky.compute_for_restaurant(&restaurant()) {
        Err(SuitabilityServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable error, got {other:?}"),
    }
    assert_eq!(inner.stored_inferences(&restaurant()).expect("rows"), before);
}

#[test]
fn collaborator_failure_propagates() {
    let service = build_service(Arc::new(UnavailableStore));

    match service.compute_for_restaurant(&restaurant()) {
        Err(SuitabilityServiceError::Repository(RepositoryError::Unavailable(message))) => {
            assert_eq!(message, "database offline");
        }
        other => panic!("expected unavailable error, got {other:?}"),
    }
    match service.compute_effective_suitability(&restaurant()) {
        Err(SuitabilityServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable error, got {other:?}"),
    }
}

#[test]
fn one_restaurant_failing_leaves_others_untouched() {
    let store = seeded_store();
    let other = RestaurantId("rest-002".to_string());
    store
        .put_menu(&other, vec![MenuItem::new("item-x", "Falafel Plate")])
        .expect("menu stored");
    build_service(Arc::new(store.clone()))
        .compute_for_restaurant(&other)
        .expect("other restaurant computed");

    let flaky = build_service(Arc::new(FlakyWriteStore {
        inner: store.clone(),
        allowed_writes: 0,
    }));
    assert!(flaky.compute_for_restaurant(&restaurant()).is_err());

    assert_eq!(store.stored_inferences(&other).expect("rows").len(), 5);
    assert!(store.stored_inferences(&restaurant()).expect("rows").is_empty());
}

#[test]
fn effective_suitability_after_compute_uses_inference() {
    let store = Arc::new(seeded_store());
    let service = build_service(store.clone());
    service.compute_for_restaurant(&restaurant()).expect("compute");

    let resolved = service
        .compute_effective_suitability(&restaurant())
        .expect("resolve");

    let keys: Vec<&str> = resolved.iter().map(|entry| entry.diet_tag_key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["GLUTEN_FREE", "HALAL", "LACTOSE_FREE", "VEGAN", "VEGETARIAN"]
    );
    let vegan = &resolved[3];
    assert_eq!(vegan.source, SuitabilitySource::Inference);
    assert_eq!(vegan.supported, Some(true));
    let halal = &resolved[1];
    assert_eq!(halal.source, SuitabilitySource::Inference);
    assert_eq!(halal.supported, Some(false));
}

#[test]
fn manual_override_beats_confident_inference() {
    let store = Arc::new(seeded_store());
    store
        .put_inference(current_record("VEGAN", 80, ConfidenceLevel::High))
        .expect("row stored");
    store
        .put_manual_override(manual_override("VEGAN", false))
        .expect("override stored");
    let service = build_service(store.clone());

    let resolved = service
        .compute_effective_suitability(&restaurant())
        .expect("resolve");
    let vegan = resolved
        .iter()
        .find(|entry| entry.diet_tag_key == "VEGAN")
        .expect("vegan verdict");

    assert_eq!(vegan.supported, Some(false));
    assert_eq!(vegan.source, SuitabilitySource::Override);
    assert_eq!(
        vegan.inference.as_ref().map(|summary| summary.score),
        Some(80)
    );
    assert_eq!(
        vegan.manual_override.as_ref().map(|entry| entry.author.as_str()),
        Some("ops@menu.example")
    );
}

#[test]
fn rows_from_older_engine_versions_are_not_read() {
    let store = Arc::new(seeded_store());
    store
        .put_inference(inference_record(
            "VEGAN",
            90,
            ConfidenceLevel::High,
            "3.2.0",
            at(2025, 1, 1),
        ))
        .expect("row stored");
    let service = build_service(store.clone());

    let resolved = service
        .compute_effective_suitability(&restaurant())
        .expect("resolve");

    assert!(resolved.iter().all(|entry| {
        entry.source == SuitabilitySource::None && entry.supported.is_none()
    }));
    assert_eq!(store.stored_inferences(&restaurant()).expect("rows").len(), 1);
}

#[test]
fn inheritance_setting_is_honoured() {
    let store = Arc::new(seeded_store());
    let service = DietSuitabilityService::new(
        store.clone(),
        Arc::new(scorer()),
        EngineSettings {
            inherit_subdiets: false,
        },
    );

    let records = service
        .compute_for_restaurant(&restaurant())
        .expect("compute");
    let vegetarian = records
        .iter()
        .find(|record| record.inference.diet_tag_key == "VEGETARIAN")
        .expect("vegetarian row");

    assert!(vegetarian
        .inference
        .reasons
        .matched_items
        .iter()
        .all(|entry| entry.inherited_from.is_none()));
    assert_eq!(vegetarian.inference.score, 26);
}

#[test]
fn item_overrides_for_the_restaurant_reach_the_scorer() {
    let store = Arc::new(seeded_store());
    store
        .put_item_override(item_override("item-5", "GLUTEN_FREE", true))
        .expect("override stored");
    let service = build_service(store.clone());

    let records = service
        .compute_for_restaurant(&restaurant())
        .expect("compute");
    let gluten_free = records
        .iter()
        .find(|record| record.inference.diet_tag_key == "GLUTEN_FREE")
        .expect("gluten-free row");

    assert_eq!(gluten_free.inference.matched_item_count(), 1);
    assert_eq!(gluten_free.inference.reasons.score_breakdown.manual_overrides, 1);
}
