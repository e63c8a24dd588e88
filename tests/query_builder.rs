mod common;

use std::sync::Arc;

use facet_lists::backend::{
    ConditionOperator, DatasourceDescriptor, IndexDescriptor, SortClause, SortDirection,
    DATASOURCE_FIELD,
};
use facet_lists::filter::{Operator, PresetFilter};
use facet_lists::source::options::{
    OPTION_EXPOSED_FILTERS, OPTION_EXTRA, OPTION_IGNORED_FILTERS, OPTION_PRESET_FILTERS,
};
use facet_lists::source::{ConfigurationError, ListSource, QueryOptions};
use facet_lists::types::FilterValue;
use serde_json::json;

use common::{article_source, strings, LANGUAGE_FIELD};

#[test]
fn invariant_query_restricts_to_entity_type_and_bundle() {
    let source = article_source();
    let query = source.get_query(&QueryOptions::default());

    let datasource: Vec<_> = query.conditions_on(DATASOURCE_FIELD).collect();
    assert_eq!(datasource.len(), 1);
    assert_eq!(datasource[0].values, strings(&["entity:node"]));
    assert_eq!(datasource[0].operator, ConditionOperator::Eq);

    let bundle: Vec<_> = query.conditions_on("type").collect();
    assert_eq!(bundle.len(), 1);
    assert_eq!(bundle[0].values, strings(&["article"]));
}

#[test]
fn bundleless_source_only_restricts_datasource() {
    let index = Arc::new(IndexDescriptor::new("users").with_datasource(DatasourceDescriptor {
        entity_type: "user".to_string(),
        bundles: Vec::new(),
        bundle_key: None,
    }));
    let source = ListSource::new("user", "user", None, index);
    let query = source.get_query(&QueryOptions::default());

    assert_eq!(query.conditions.len(), 1);
    assert_eq!(query.conditions[0].field, DATASOURCE_FIELD);
    assert_eq!(query.conditions[0].values, strings(&["entity:user"]));
}

#[test]
fn paging_uses_limit_times_page() {
    let options = QueryOptions {
        limit: 20,
        page: 3,
        ..QueryOptions::default()
    };
    let query = article_source().get_query(&options);

    assert_eq!(query.offset, 60);
    assert_eq!(query.limit, Some(20));
}

#[test]
fn defaults_apply_to_empty_options() {
    let options = QueryOptions::from_raw(&json!({})).expect("valid options");
    assert_eq!(options, QueryOptions::default());
    assert_eq!(options.limit, 10);
    assert_eq!(options.page, 0);

    let query = article_source().get_query(&options);
    assert_eq!(query.offset, 0);
    assert_eq!(query.limit, Some(10));
    assert!(query.sorts.is_empty());
}

#[test]
fn single_language_adds_equality_on_fallback_field() {
    let options = QueryOptions {
        languages: vec!["fr".to_string()],
        ..QueryOptions::default()
    };
    let query = article_source().get_query(&options);

    let language: Vec<_> = query.conditions_on(LANGUAGE_FIELD).collect();
    assert_eq!(language.len(), 1);
    assert_eq!(language[0].operator, ConditionOperator::Eq);
    assert_eq!(language[0].values, strings(&["fr"]));
    assert_eq!(query.languages, vec!["fr".to_string()]);
}

#[test]
fn several_languages_use_in_condition() {
    let options = QueryOptions::from_raw(&json!({ "language": ["fr", "de"] })).expect("valid options");
    let query = article_source().get_query(&options);

    let language: Vec<_> = query.conditions_on(LANGUAGE_FIELD).collect();
    assert_eq!(language[0].operator, ConditionOperator::In);
    assert_eq!(language[0].values, strings(&["fr", "de"]));
}

#[test]
fn no_language_condition_without_fallback_field() {
    let index = Arc::new(IndexDescriptor::new("plain"));
    let source = ListSource::new("node", "article", Some("type".into()), index);
    let options = QueryOptions {
        languages: vec!["fr".to_string()],
        ..QueryOptions::default()
    };
    let query = source.get_query(&options);

    assert_eq!(query.conditions.len(), 2);
    assert_eq!(query.languages, vec!["fr".to_string()]);
}

#[test]
fn sorts_apply_in_given_order() {
    let options = QueryOptions::from_raw(&json!({
        "sort": [
            { "field": "title", "direction": "ASC" },
            { "field": "created", "direction": "DESC" },
        ]
    }))
    .expect("valid options");
    let query = article_source().get_query(&options);

    assert_eq!(
        query.sorts,
        vec![
            SortClause::new("title", SortDirection::Asc),
            SortClause::new("created", SortDirection::Desc),
        ]
    );
}

#[test]
fn sort_map_applies_in_key_order() {
    let options = QueryOptions::from_raw(&json!({ "sort": {} })).expect("empty sort map");
    assert!(options.sort.is_empty());
    assert!(article_source().get_query(&options).sorts.is_empty());

    // Key order is kept, not alphabetized.
    let query = article_source()
        .get_query_raw(&json!({ "sort": { "title": "ASC", "created": "DESC" } }))
        .expect("valid options");
    assert_eq!(
        query.sorts,
        vec![
            SortClause::new("title", SortDirection::Asc),
            SortClause::new("created", SortDirection::Desc),
        ]
    );
}

#[test]
fn filters_travel_as_side_channel_options() {
    let mut options = QueryOptions::default();
    let id = options
        .preset_filters
        .add(PresetFilter::new("tags", Operator::And, strings(&["red"])));
    options.ignored_filters.insert("created".to_string());
    options
        .exposed_filters
        .insert("topic".to_string(), vec![FilterValue::Integer(1)]);
    options.extra.insert("marker".to_string(), json!(true));

    let query = article_source().get_query(&options);

    assert_eq!(query.option(OPTION_IGNORED_FILTERS), Some(&json!(["created"])));
    assert_eq!(query.option(OPTION_EXPOSED_FILTERS), Some(&json!({ "topic": [1] })));
    assert_eq!(query.option(OPTION_EXTRA), Some(&json!({ "marker": true })));

    let presets = query.option(OPTION_PRESET_FILTERS).expect("preset option");
    assert_eq!(
        presets[id.as_str()],
        json!({ "facet_id": "tags", "operator": "and", "values": ["red"] })
    );

    // Filters are not turned into conditions by the builder.
    assert!(query.conditions_on("tags").next().is_none());
}

#[test]
fn malformed_options_are_configuration_errors() {
    let cases = [
        (json!({ "limit": "ten" }), "limit"),
        (json!({ "page": -1 }), "page"),
        (json!({ "language": 5 }), "language"),
        (json!({ "sort": "title" }), "sort"),
        (json!({ "sort": { "title": "UP" } }), "sort"),
        (json!({ "ignored_filters": "tags" }), "ignored_filters"),
        (json!({ "preset_filters": [1, 2] }), "preset_filters"),
        (json!({ "extra": 1 }), "extra"),
    ];

    for (raw, option) in cases {
        match QueryOptions::from_raw(&raw) {
            Err(ConfigurationError::InvalidType { option: got, .. }) => assert_eq!(got, option),
            other => panic!("expected invalid type for {option}, got {other:?}"),
        }
    }
}

#[test]
fn unknown_option_and_non_map_are_rejected() {
    assert_eq!(
        QueryOptions::from_raw(&json!({ "limt": 5 })),
        Err(ConfigurationError::UnknownOption("limt".to_string()))
    );
    assert_eq!(QueryOptions::from_raw(&json!([1])), Err(ConfigurationError::NotAMap));

    let source = article_source();
    assert!(source.get_query_raw(&json!({ "limit": true })).is_err());
}
