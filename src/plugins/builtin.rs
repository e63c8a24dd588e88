use chrono::{DateTime, NaiveDate};

use crate::entity::FieldItem;
use crate::plugins::{FieldTypePlugin, FormWidget, PluginContext, ValueForm};
use crate::types::FilterValue;

fn property_values(items: &[FieldItem], property: &str) -> Vec<FilterValue> {
    items
        .iter()
        .filter_map(|item| item.get(property).cloned())
        .collect()
}

fn form(ctx: &PluginContext<'_>, plugin: &dyn FieldTypePlugin, widget: FormWidget) -> ValueForm {
    ValueForm {
        title: ctx.facet.label.clone(),
        widget,
        default_values: plugin.default_values(ctx),
    }
}

/// References to other entities, stored as `target_id`.
#[derive(Debug, Default)]
pub struct EntityReferencePlugin;

impl FieldTypePlugin for EntityReferencePlugin {
    fn id(&self) -> &'static str {
        "entity_reference"
    }

    fn value_form(&self, ctx: &PluginContext<'_>) -> ValueForm {
        form(
            ctx,
            self,
            FormWidget::Autocomplete {
                target_facet: ctx.facet.id.clone(),
            },
        )
    }

    fn label(&self, ctx: &PluginContext<'_>, values: &[FilterValue]) -> String {
        values
            .iter()
            .map(|v| {
                let id = v.canonical();
                ctx.labels.and_then(|l| l.label(&id)).unwrap_or(id)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn entity_values(&self, _ctx: &PluginContext<'_>, items: &[FieldItem]) -> Vec<FilterValue> {
        property_values(items, "target_id")
    }
}

/// Fields restricted to a list of allowed values.
#[derive(Debug, Default)]
pub struct ListPlugin;

impl FieldTypePlugin for ListPlugin {
    fn id(&self) -> &'static str {
        "list"
    }

    fn value_form(&self, ctx: &PluginContext<'_>) -> ValueForm {
        let options: Vec<(String, String)> = ctx
            .field
            .map(|f| {
                f.allowed_values
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        form(ctx, self, FormWidget::Select { options, multiple: true })
    }

    fn label(&self, ctx: &PluginContext<'_>, values: &[FilterValue]) -> String {
        values
            .iter()
            .map(|v| {
                let key = v.canonical();
                ctx.field
                    .and_then(|f| f.allowed_values.get(&key).cloned())
                    .unwrap_or(key)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn entity_values(&self, _ctx: &PluginContext<'_>, items: &[FieldItem]) -> Vec<FilterValue> {
        property_values(items, "value")
    }
}

#[derive(Debug, Default)]
pub struct BooleanPlugin;

impl BooleanPlugin {
    fn normalize(value: &FilterValue) -> Option<bool> {
        match value {
            FilterValue::Boolean(b) => Some(*b),
            FilterValue::Integer(i) => Some(*i != 0),
            FilterValue::String(s) => match s.as_str() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            },
        }
    }
}

impl FieldTypePlugin for BooleanPlugin {
    fn id(&self) -> &'static str {
        "boolean"
    }

    fn default_values(&self, ctx: &PluginContext<'_>) -> Vec<FilterValue> {
        ctx.preset_filter
            .map(|f| {
                f.values
                    .iter()
                    .filter_map(Self::normalize)
                    .map(FilterValue::Boolean)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn value_form(&self, ctx: &PluginContext<'_>) -> ValueForm {
        form(ctx, self, FormWidget::Checkbox)
    }

    fn label(&self, _ctx: &PluginContext<'_>, values: &[FilterValue]) -> String {
        values
            .iter()
            .map(|v| match Self::normalize(v) {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => v.canonical(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn entity_values(&self, _ctx: &PluginContext<'_>, items: &[FieldItem]) -> Vec<FilterValue> {
        property_values(items, "value")
            .iter()
            .filter_map(Self::normalize)
            .map(FilterValue::Boolean)
            .collect()
    }
}

/// Dates as ISO 8601 strings, either plain dates or RFC 3339 timestamps.
#[derive(Debug, Default)]
pub struct DatePlugin;

impl DatePlugin {
    fn parse(value: &FilterValue) -> Option<NaiveDate> {
        match value {
            FilterValue::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())),
            FilterValue::Integer(ts) => DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()),
            FilterValue::Boolean(_) => None,
        }
    }
}

impl FieldTypePlugin for DatePlugin {
    fn id(&self) -> &'static str {
        "date"
    }

    fn value_form(&self, ctx: &PluginContext<'_>) -> ValueForm {
        form(ctx, self, FormWidget::Date)
    }

    fn label(&self, _ctx: &PluginContext<'_>, values: &[FilterValue]) -> String {
        values
            .iter()
            .map(|v| match Self::parse(v) {
                Some(date) => date.format("%d %B %Y").to_string(),
                None => v.canonical(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn entity_values(&self, _ctx: &PluginContext<'_>, items: &[FieldItem]) -> Vec<FilterValue> {
        property_values(items, "value")
            .iter()
            .filter_map(Self::parse)
            .map(|d| FilterValue::String(d.format("%Y-%m-%d").to_string()))
            .collect()
    }
}

/// Fallback for plain indexed strings and numbers.
#[derive(Debug, Default)]
pub struct FulltextPlugin;

impl FieldTypePlugin for FulltextPlugin {
    fn id(&self) -> &'static str {
        "fulltext"
    }

    fn value_form(&self, ctx: &PluginContext<'_>) -> ValueForm {
        form(ctx, self, FormWidget::Textfield)
    }

    fn entity_values(&self, _ctx: &PluginContext<'_>, items: &[FieldItem]) -> Vec<FilterValue> {
        property_values(items, "value")
    }
}
