mod common;

use std::sync::Arc;

use facet_lists::entity::FieldItem;
use facet_lists::filter::{Operator, PresetFilter};
use facet_lists::plugins::{
    EntityLabels, FieldTypePlugin, FormWidget, PluginContext, PluginRegistry, PluginTier, ValueForm,
};
use facet_lists::types::FilterValue;

use common::{article_source, schema, strings};

/// Plugin that only reports which registration produced it.
struct Named(&'static str);

impl FieldTypePlugin for Named {
    fn id(&self) -> &'static str {
        self.0
    }

    fn value_form(&self, _ctx: &PluginContext<'_>) -> ValueForm {
        ValueForm {
            title: self.0.to_string(),
            widget: FormWidget::Textfield,
            default_values: Vec::new(),
        }
    }

    fn entity_values(&self, _ctx: &PluginContext<'_>, _items: &[FieldItem]) -> Vec<FilterValue> {
        Vec::new()
    }
}

struct Labels;

impl EntityLabels for Labels {
    fn label(&self, id: &str) -> Option<String> {
        match id {
            "1" => Some("Economy".to_string()),
            _ => None,
        }
    }
}

fn conflicting_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register_for_facet("tags", Arc::new(Named("facet")));
    registry.register_for_field_type("list_string", Arc::new(Named("field_type")));
    registry.register_for_data_type("string", Arc::new(Named("data_type")));
    registry
}

#[test]
fn invariant_facet_registration_outranks_field_type() {
    let resolved = conflicting_registry()
        .resolve("tags", &article_source(), &schema())
        .expect("plugin");

    assert_eq!(resolved.id(), "facet");
    assert_eq!(resolved.tier, PluginTier::Facet);
    // The backing field is still known to the plugin.
    assert_eq!(resolved.field.as_ref().map(|f| f.name.as_str()), Some("field_tags"));
}

#[test]
fn invariant_field_type_outranks_data_type() {
    let mut registry = PluginRegistry::new();
    registry.register_for_field_type("list_string", Arc::new(Named("field_type")));
    registry.register_for_data_type("string", Arc::new(Named("data_type")));

    let resolved = registry.resolve("tags", &article_source(), &schema()).expect("plugin");
    assert_eq!(resolved.id(), "field_type");
    assert_eq!(resolved.tier, PluginTier::FieldType);
}

#[test]
fn data_type_is_the_fallback_for_processor_fields() {
    let resolved = conflicting_registry()
        .resolve("parents", &article_source(), &schema())
        .expect("plugin");

    assert_eq!(resolved.id(), "data_type");
    assert_eq!(resolved.tier, PluginTier::DataType);
    assert!(resolved.field.is_none());
}

#[test]
fn unmatched_facet_is_a_miss_and_left_out_of_editable_filters() {
    let registry = conflicting_registry();
    let source = article_source();

    let miss = registry
        .resolve("created", &source, &schema())
        .err()
        .expect("no plugin for created");
    assert_eq!(miss.facet_id, "created");

    assert!(registry.resolve("unknown", &source, &schema()).is_err());

    let editable = registry.editable_filters(&source, &schema());
    assert!(editable.contains_key("tags"));
    assert!(editable.contains_key("parents"));
    assert!(!editable.contains_key("created"));
}

#[test]
fn default_registry_covers_fixture_facets() {
    let registry = PluginRegistry::with_defaults();
    let source = article_source();

    let id = |facet: &str| registry.resolve(facet, &source, &schema()).expect("plugin").id();
    assert_eq!(id("topic"), "entity_reference");
    assert_eq!(id("tags"), "list");
    assert_eq!(id("created"), "date");
    assert_eq!(id("parents"), "fulltext");
    assert_eq!(registry.editable_filters(&source, &schema()).len(), 4);
}

#[test]
fn list_plugin_labels_and_form_use_allowed_values() {
    let registry = PluginRegistry::with_defaults();
    let source = article_source();
    let preset = PresetFilter::new("tags", Operator::Or, strings(&["red"]));
    let resolved = registry.resolve("tags", &source, &schema()).expect("plugin");
    let plugin = resolved
        .configure("tags", &source, Some(&preset), None)
        .expect("configured");

    assert_eq!(plugin.label(&strings(&["red", "blue", "green"])), "Red, Blue, green");
    assert_eq!(plugin.default_values(), strings(&["red"]));

    let form = plugin.value_form();
    assert_eq!(form.title, "Tags");
    assert_eq!(
        form.widget,
        FormWidget::Select {
            options: vec![
                ("blue".to_string(), "Blue".to_string()),
                ("red".to_string(), "Red".to_string()),
            ],
            multiple: true,
        }
    );

    let items = vec![FieldItem::with("value", "red"), FieldItem::new()];
    assert_eq!(plugin.entity_values(&items), strings(&["red"]));
}

#[test]
fn entity_reference_plugin_reads_target_ids_and_labels() {
    let registry = PluginRegistry::with_defaults();
    let source = article_source();
    let resolved = registry.resolve("topic", &source, &schema()).expect("plugin");
    let plugin = resolved
        .configure("topic", &source, None, Some(&Labels))
        .expect("configured");

    let items = vec![FieldItem::with("target_id", 1i64), FieldItem::with("target_id", 7i64)];
    assert_eq!(
        plugin.entity_values(&items),
        vec![FilterValue::Integer(1), FilterValue::Integer(7)]
    );
    assert_eq!(plugin.label(&[FilterValue::Integer(1), FilterValue::Integer(7)]), "Economy, 7");
    assert!(plugin.default_values().is_empty());
}

#[test]
fn date_plugin_normalizes_and_formats() {
    let registry = PluginRegistry::with_defaults();
    let source = article_source();
    let resolved = registry.resolve("created", &source, &schema()).expect("plugin");
    let plugin = resolved
        .configure("created", &source, None, None)
        .expect("configured");

    let items = vec![
        FieldItem::with("value", "2024-03-05"),
        FieldItem::with("value", "2024-03-06T10:00:00+00:00"),
        FieldItem::with("value", "not a date"),
    ];
    assert_eq!(plugin.entity_values(&items), strings(&["2024-03-05", "2024-03-06"]));
    assert_eq!(plugin.label(&strings(&["2024-03-05"])), "05 March 2024");
    assert_eq!(plugin.value_form().widget, FormWidget::Date);
}

#[test]
fn boolean_plugin_labels_yes_and_no() {
    let mut registry = PluginRegistry::with_defaults();
    registry.register_for_facet("tags", registry_boolean());
    let source = article_source();
    let resolved = registry.resolve("tags", &source, &schema()).expect("plugin");
    let plugin = resolved.configure("tags", &source, None, None).expect("configured");

    assert_eq!(
        plugin.label(&[FilterValue::Boolean(true), FilterValue::from("0")]),
        "Yes, No"
    );
    assert_eq!(
        plugin.entity_values(&[FieldItem::with("value", 1i64)]),
        vec![FilterValue::Boolean(true)]
    );
}

fn registry_boolean() -> Arc<dyn FieldTypePlugin> {
    Arc::new(facet_lists::plugins::BooleanPlugin)
}
