//! # Default-Field Flattener Tests

mod common;

use anyhow::Result;
use common::{CollectingSink, MockCatalog};
use deskrep::diag::DiagnosticEvent;
use deskrep::flatten::{flatten_default_fields, missing_property};
use deskrep::{NameCache, ReferenceKind, ServiceItem};
use serde_json::json;

fn sample_item() -> ServiceItem {
    ServiceItem::try_from(json!({
        "id": 1001,
        "category_id": 17,
        "category_name": "Hardware",
        "name": "MacBook Pro",
        "display_id": 42,
        "short_description": "Laptop request",
        "description": "<p>Order a laptop</p>",
        "visibility": 2,
        "delivery_time": 48,
        "delivery_time_visibility": true,
        "cost": "1500",
        "agent_group_visibility": 2,
        "agent_workspace_visibilities_workspace_id": [3],
        "agent_group_visibilities_group_id": [5, 6],
        "group_visibility": 1,
        "group_visibilities_group_id": [],
        "allow_attachments": true,
        "icon_url": "https://cdn.example/icon.png",
        "workspace_id": 3,
        "workspace_name": "IT",
        "child_items": [
            {"id": 1, "name": "A", "mandatory": 1},
            {"id": 2, "name": "B", "mandatory": 0}
        ],
        "create_child": false,
        "configs": {"subject": "Need a laptop", "attachment_mandatory": true}
    }))
    .expect("sample item should deserialize")
}

fn sample_catalog() -> MockCatalog {
    let catalog = MockCatalog::new();
    catalog.add_name("workspace", 3, "IT");
    catalog.add_name("agent_group", 5, "Service Desk");
    catalog.add_name("agent_group", 6, "Field Ops");
    catalog
}

#[tokio::test]
async fn emits_one_row_per_key_in_declared_order() -> Result<()> {
    let catalog = sample_catalog();
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let rows = flatten_default_fields(&sample_item(), &catalog, &mut cache, &sink).await;

    let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "id",
            "category_id",
            "category_name",
            "name",
            "display_id",
            "short_description",
            "description",
            "visibility",
            "delivery_time",
            "delivery_time_visibility",
            "cost",
            "agent_group_visibility",
            "agent_workspace_visibilities_workspace_id",
            "agent_workspace_visibilities_workspace_idname",
            "agent_group_visibilities_group_id",
            "agent_group_visibilities_group_idname",
            "group_visibility",
            "group_visibilities_group_id",
            "allow_attachments",
            "icon_url",
            "workspace_id",
            "workspace_name",
            "child_items",
            "create_child",
            "subject",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn formats_scalars_enums_and_child_items() -> Result<()> {
    let catalog = sample_catalog();
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let rows = flatten_default_fields(&sample_item(), &catalog, &mut cache, &sink).await;
    let value_of = |id: &str| {
        rows.iter()
            .find(|row| row.id == id)
            .map(|row| row.value.clone())
            .unwrap_or_else(|| panic!("row {id} missing"))
    };

    assert_eq!(value_of("id"), "1001");
    assert_eq!(value_of("delivery_time_visibility"), "true");
    assert_eq!(value_of("visibility"), "Published");
    assert_eq!(value_of("agent_group_visibility"), "Selected agent groups");
    assert_eq!(value_of("group_visibility"), "All requesters");
    assert_eq!(
        value_of("child_items"),
        "1 - A - mandatory - true\n2 - B - mandatory - false"
    );
    Ok(())
}

#[tokio::test]
async fn visibility_enums_cover_all_branches() -> Result<()> {
    for (agent_group_visibility, expected) in [
        (1, "All agents"),
        (2, "Selected agent groups"),
        (3, "Selected workspace"),
    ] {
        let item = ServiceItem::try_from(json!({
            "agent_group_visibility": agent_group_visibility,
            "visibility": 1,
        }))?;
        let catalog = MockCatalog::new();
        let mut cache = NameCache::new();
        let sink = CollectingSink::new();

        let rows = flatten_default_fields(&item, &catalog, &mut cache, &sink).await;
        let row = rows
            .iter()
            .find(|row| row.id == "agent_group_visibility")
            .expect("visibility row");
        assert_eq!(row.value, expected);

        let draft = rows.iter().find(|row| row.id == "visibility").expect("row");
        assert_eq!(draft.value, "Draft");
    }
    Ok(())
}

#[tokio::test]
async fn resolves_foreign_keys_into_synthetic_name_rows() -> Result<()> {
    let catalog = sample_catalog();
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let rows = flatten_default_fields(&sample_item(), &catalog, &mut cache, &sink).await;

    let primary = rows
        .iter()
        .find(|row| row.id == "agent_group_visibilities_group_id")
        .expect("primary row");
    assert_eq!(primary.value, "5, 6");
    assert_eq!(
        primary.api_name.as_deref(),
        Some("agent_group_visibilities_group_id")
    );

    let companion = rows
        .iter()
        .find(|row| row.id == "agent_group_visibilities_group_idname")
        .expect("companion row");
    assert_eq!(companion.label, "Agent Visibilities Group Name");
    assert_eq!(companion.value, "Service Desk, Field Ops");
    assert_eq!(companion.api_name, None);
    assert_eq!(companion.mandatory, None);

    let workspace_companion = rows
        .iter()
        .find(|row| row.id == "agent_workspace_visibilities_workspace_idname")
        .expect("workspace companion row");
    assert_eq!(workspace_companion.label, "Agent Workspace Visibilities Name");
    assert_eq!(workspace_companion.value, "IT");
    Ok(())
}

#[tokio::test]
async fn empty_foreign_key_list_renders_dash_without_companion_row() -> Result<()> {
    let catalog = sample_catalog();
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let rows = flatten_default_fields(&sample_item(), &catalog, &mut cache, &sink).await;

    let primary = rows
        .iter()
        .find(|row| row.id == "group_visibilities_group_id")
        .expect("primary row");
    assert_eq!(primary.value, "-");
    assert!(!rows
        .iter()
        .any(|row| row.id == "group_visibilities_group_idname"));
    Ok(())
}

#[tokio::test]
async fn failed_resolution_degrades_to_partial_join() -> Result<()> {
    let catalog = MockCatalog::new();
    catalog.add_name("agent_group", 5, "Service Desk");
    catalog.fail_id(9);
    let item = ServiceItem::try_from(json!({
        "agent_group_visibilities_group_id": [5, 9],
    }))?;
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let rows = flatten_default_fields(&item, &catalog, &mut cache, &sink).await;

    let companion = rows
        .iter()
        .find(|row| row.id == "agent_group_visibilities_group_idname")
        .expect("companion row");
    assert_eq!(companion.value, "Service Desk");
    assert!(sink.events().contains(&DiagnosticEvent::UnresolvedReference {
        kind: ReferenceKind::AgentGroup,
        id: 9,
    }));
    Ok(())
}

#[tokio::test]
async fn missing_key_emits_sentinel_row() -> Result<()> {
    let item = ServiceItem::try_from(json!({ "id": 1 }))?;
    let catalog = MockCatalog::new();
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let rows = flatten_default_fields(&item, &catalog, &mut cache, &sink).await;

    let row = rows.iter().find(|row| row.id == "cost").expect("cost row");
    assert_eq!(row.value, missing_property("cost"));
    assert_eq!(row.value, "Err: Property not found 'cost'");
    assert_eq!(row.api_name.as_deref(), Some("cost"));
    assert_eq!(row.mandatory, None);
    Ok(())
}

#[tokio::test]
async fn subject_is_sourced_from_configs_and_always_mandatory() -> Result<()> {
    let catalog = MockCatalog::new();
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let with_subject = ServiceItem::try_from(json!({
        "configs": {"subject": "Need a laptop"}
    }))?;
    let rows = flatten_default_fields(&with_subject, &catalog, &mut cache, &sink).await;
    let subject = rows.iter().find(|row| row.id == "subject").expect("row");
    assert_eq!(subject.value, "Need a laptop");
    assert_eq!(subject.mandatory, Some(true));
    assert_eq!(subject.api_name.as_deref(), Some("subject"));

    let without_subject = ServiceItem::try_from(json!({}))?;
    let rows = flatten_default_fields(&without_subject, &catalog, &mut cache, &sink).await;
    let subject = rows.iter().find(|row| row.id == "subject").expect("row");
    assert_eq!(subject.value, missing_property("subject"));
    assert_eq!(subject.mandatory, Some(true));
    Ok(())
}

#[tokio::test]
async fn allow_attachments_mandatory_comes_from_configs() -> Result<()> {
    let catalog = MockCatalog::new();
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let mandatory = ServiceItem::try_from(json!({
        "allow_attachments": true,
        "configs": {"attachment_mandatory": true}
    }))?;
    let rows = flatten_default_fields(&mandatory, &catalog, &mut cache, &sink).await;
    let row = rows
        .iter()
        .find(|row| row.id == "allow_attachments")
        .expect("row");
    assert_eq!(row.value, "true");
    assert_eq!(row.mandatory, Some(true));

    let optional = ServiceItem::try_from(json!({ "allow_attachments": false }))?;
    let rows = flatten_default_fields(&optional, &catalog, &mut cache, &sink).await;
    let row = rows
        .iter()
        .find(|row| row.id == "allow_attachments")
        .expect("row");
    assert_eq!(row.value, "false");
    assert_eq!(row.mandatory, Some(false));
    Ok(())
}

#[tokio::test]
async fn derived_name_rows_have_no_api_name() -> Result<()> {
    let catalog = sample_catalog();
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let rows = flatten_default_fields(&sample_item(), &catalog, &mut cache, &sink).await;

    for id in ["category_name", "workspace_name"] {
        let row = rows.iter().find(|row| row.id == id).expect("derived row");
        assert_eq!(row.api_name, None, "{id} should not expose an api name");
    }
    Ok(())
}

#[tokio::test]
async fn generic_objects_keep_their_json_serialization() -> Result<()> {
    let item = ServiceItem::try_from(json!({
        "cost": {"currency": "USD", "amount": 1500}
    }))?;
    let catalog = MockCatalog::new();
    let mut cache = NameCache::new();
    let sink = CollectingSink::new();

    let rows = flatten_default_fields(&item, &catalog, &mut cache, &sink).await;
    let row = rows.iter().find(|row| row.id == "cost").expect("cost row");
    // serde_json's default map keeps keys sorted.
    assert_eq!(row.value, r#"{"amount":1500,"currency":"USD"}"#);
    Ok(())
}
