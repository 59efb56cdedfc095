//! Unit tests for flowmap-core module

use crate::entity::{entity_id, flow_of, location_of, process_of};
use crate::matching::{category_score, location_matches, match_length, name_score};
use crate::test_utils::{category, sample_categories, sample_units};
use crate::*;

fn carbon_dioxide() -> FlowQuery {
    FlowQuery::elementary("Carbon dioxide")
        .with_unit("g")
        .with_category("air/unspecified")
}

#[test]
fn test_flow_id_is_deterministic() {
    let a = carbon_dioxide();
    let b = carbon_dioxide();
    assert_eq!(a.flow_id(), b.flow_id());
    assert_eq!(a, b);

    // memoized value is stable across calls
    let first = a.flow_id().to_string();
    assert_eq!(a.flow_id(), first);
}

#[test]
fn test_flow_id_changes_with_every_field() {
    let base = carbon_dioxide();
    let variants = vec![
        FlowQuery::product("Carbon dioxide").with_unit("g").with_category("air/unspecified"),
        FlowQuery::elementary("Carbon monoxide").with_unit("g").with_category("air/unspecified"),
        carbon_dioxide().with_unit("kg"),
        carbon_dioxide().with_category("air/urban"),
        carbon_dioxide().with_location("DE"),
    ];
    for variant in variants {
        assert_ne!(base.flow_id(), variant.flow_id(), "{}", variant);
    }
}

#[test]
fn test_flow_id_matches_stored_guids() {
    // MD5 of the canonical string, first three groups little-endian
    let query = FlowQuery::elementary("Carbon dioxide").with_unit("kg");
    assert_eq!(query.flow_id(), "c72e319f-d00c-cd10-345c-12d055686238");

    let query = FlowQuery::product("Steel, low-alloyed").with_unit("t").with_location("GLO");
    assert_eq!(query.flow_id(), "0b18e249-f401-ad94-cc66-5e59a6a5d9d0");
}

#[test]
fn test_setters_reset_memoized_id() {
    let query = FlowQuery::elementary("Methane");
    let before = query.flow_id().to_string();
    let query = query.with_unit("kg");
    assert_ne!(before, query.flow_id());
    assert_eq!(query.flow_id(), FlowQuery::elementary("Methane").with_unit("kg").flow_id());
}

#[test]
fn test_canonical_string_omits_empty_fields() {
    let query = FlowQuery::product("Steel").with_location("FI");
    assert_eq!(query.to_string(), "ProductFlow - Steel - FI");

    let query = carbon_dioxide().with_location("DE");
    assert_eq!(
        query.to_string(),
        "ElementaryFlow - Carbon dioxide - g - DE - air/unspecified"
    );
}

#[test]
fn test_setters_normalize_input() {
    let query = FlowQuery::waste(None::<&str>)
        .with_unit("  kg ")
        .with_category(None::<&str>)
        .with_location(Some(" FI"));
    assert_eq!(query.name(), "");
    assert_eq!(query.unit(), "kg");
    assert_eq!(query.category(), "");
    assert_eq!(query.location(), "FI");
    assert_eq!(query, FlowQuery::waste("").with_unit("kg").with_location("FI"));
}

#[test]
fn test_mapping_ref_projection() {
    let mapping_ref = carbon_dioxide().to_mapping_ref();
    let flow = mapping_ref.flow.as_ref().unwrap();
    assert_eq!(flow.id, carbon_dioxide().flow_id());
    assert_eq!(flow.flow_type, Some(FlowType::Elementary));
    assert_eq!(flow.ref_unit.as_deref(), Some("g"));
    assert_eq!(flow.category_path, vec!["air", "unspecified"]);
    assert_eq!(flow.location, None);
    assert_eq!(mapping_ref.unit.as_ref().map(|u| u.name.as_str()), Some("g"));

    let bare = FlowQuery::product("Coke").to_mapping_ref();
    let flow = bare.flow.as_ref().unwrap();
    assert!(flow.ref_unit.is_none());
    assert!(flow.category_path.is_empty());
    assert!(bare.unit.is_none());

    let restored = FlowQuery::from_mapping_ref(&carbon_dioxide().to_mapping_ref()).unwrap();
    assert_eq!(restored, carbon_dioxide());
}

#[test]
fn test_find_entry_skips_malformed_entries() {
    let query = carbon_dioxide();
    let mut map = FlowMap::new("test");

    // no `to` side
    map.push(MappingEntry {
        from: Some(query.to_mapping_ref()),
        to: None,
        conversion_factor: 1.0,
    });
    // no `from` side
    map.push(MappingEntry {
        from: None,
        to: Some(FlowMapRef {
            flow: Some(Ref::new("x", "X")),
            ..Default::default()
        }),
        conversion_factor: 1.0,
    });
    assert!(query.find_entry_in(&map).is_none());
    assert_eq!(map.malformed_count(), 2);

    let target = FlowMapRef {
        flow: Some(Ref::new("co2", "Carbon dioxide")),
        ..Default::default()
    };
    map.push(MappingEntry::new(query.to_mapping_ref(), target, 0.001));
    let entry = query.find_entry_in(&map).unwrap();
    assert_eq!(entry.target_flow().unwrap().id, "co2");
    assert_eq!(map.entries_for(query.flow_id()).count(), 1);
    assert!(FlowQuery::elementary("Methane").find_entry_in(&map).is_none());
}

#[test]
fn test_stored_document_with_gaps_loads() {
    let json = r#"{
        "id": "m-1",
        "name": "Imported",
        "mappings": [
            { "from": { "flow": { "id": "" } }, "to": { "flow": { "id": "co2" } } },
            { "to": { "flow": { "id": "ch4", "name": "Methane" } }, "conversionFactor": 2.0 },
            { "from": { "flow": { "id": "q-1", "flowType": "ElementaryFlow" } },
              "to": { "flow": { "id": "co2", "categoryPath": ["emission", "air"] } } }
        ]
    }"#;
    let map: FlowMap = serde_json::from_str(json).unwrap();

    assert_eq!(map.len(), 3);
    assert_eq!(map.malformed_count(), 2);
    assert_eq!(map.mappings[0].conversion_factor, 1.0);
    let entry = map.entries_for("q-1").next().unwrap();
    assert_eq!(entry.target_flow().unwrap().category(), "emission/air");
}

#[test]
fn test_flow_map_ids_and_conversion() {
    assert_eq!(FlowMap::new("demo").id, FlowMap::new("demo").id);
    assert_ne!(FlowMap::new("demo").id, FlowMap::new("other").id);
    assert!(FlowMap::new("demo").is_empty());

    let entry = MappingEntry::new(FlowMapRef::default(), FlowMapRef::default(), 1000.0);
    assert_eq!(entry.convert(2.5), 2500.0);
}

#[test]
fn test_unit_index_convertibility() {
    let (groups, props) = sample_units();
    let index = UnitIndex::build(groups, props);

    assert!(index.are_convertible("g", "kg"));
    assert!(index.are_convertible("kWh", "MJ"));
    assert!(index.are_convertible("t", "t"));
    assert!(!index.are_convertible("kg", "MJ"));
    assert!(!index.are_convertible("lb", "kg"));
    assert!(!index.are_convertible("lb", "lb"));
    assert!(!index.are_convertible("", "kg"));
    assert!(index.entry_of("furlong").is_none());
}

#[test]
fn test_unit_index_entries_and_factors() {
    let (groups, props) = sample_units();
    let index = UnitIndex::build(groups, props);

    let g = index.entry_of("g").unwrap();
    assert_eq!(g.flow_property.name, "Mass");
    assert_eq!(g.unit_group.name, "Units of mass");
    assert_eq!(g.conversion_factor, 0.001);
    assert_eq!(g.reference_unit, "kg");
    assert_eq!(index.reference_unit_of("kWh"), Some("MJ"));
    assert_eq!(index.factor_of("t"), Some(1000.0));
    assert_eq!(index.property_of("MJ").map(|p| p.name.as_str()), Some("Energy"));

    assert_eq!(index.conversion_factor("g", "kg"), Some(0.001));
    assert_eq!(index.conversion_factor("t", "kg"), Some(1000.0));
    let g_to_t = index.conversion_factor("g", "t").unwrap();
    assert!((g_to_t - 1e-6).abs() < 1e-12);
    assert_eq!(index.conversion_factor("g", "MJ"), None);

    // synonyms resolve to the primary unit
    let tonne = index.entry_of("tonne").unwrap();
    assert_eq!(tonne.unit, "t");
    assert!(index.are_convertible("tonne", "g"));
    assert_eq!(index.len(), 6);
}

#[test]
fn test_unit_index_first_registration_wins() {
    let (mut groups, props) = sample_units();
    // the energy group also declares a unit called "g"
    groups[1].units.push(entity::unit_of("g", 42.0));
    let index = UnitIndex::build(groups, props);

    assert_eq!(index.duplicates(), 1);
    let g = index.entry_of("g").unwrap();
    assert_eq!(g.unit_group.name, "Units of mass");
    assert_eq!(g.conversion_factor, 0.001);
}

#[test]
fn test_unit_index_skips_groups_without_default_property() {
    let (mut groups, props) = sample_units();
    groups[1].default_flow_property = None;
    let index = UnitIndex::build(groups, props);

    assert!(index.contains("kg"));
    assert!(!index.contains("MJ"));
    assert!(!index.contains("kWh"));
}

#[test]
fn test_category_tree_roots_are_sorted() {
    let tree = CategoryTree::build(sample_categories());

    let roots = tree.roots_of(ModelType::Flow);
    assert_eq!(roots.len(), 1);
    let root = &roots[0];
    assert_eq!(root.name, "Elementary flows");
    assert!(root.parent.is_none());

    let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["emission", "Resource"]);

    let emission = &root.children[0];
    let names: Vec<&str> = emission.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Air", "water"]);
    assert_eq!(emission.children[0].parent.as_deref(), Some("c-emission"));

    // blank parent id is a root
    assert_eq!(tree.roots_of(ModelType::Process).len(), 1);
    assert!(tree.roots_of(ModelType::Location).is_empty());
    assert_eq!(tree.model_types(), vec![ModelType::Flow, ModelType::Process]);
}

#[test]
fn test_category_tree_paths_and_walk() {
    let tree = CategoryTree::build(sample_categories());

    assert_eq!(
        tree.path_of("c-air"),
        Some(vec!["Elementary flows".to_string(), "emission".to_string(), "Air".to_string()])
    );
    assert_eq!(tree.find("c-water").map(|n| n.name.as_str()), Some("water"));
    assert!(tree.path_of("missing").is_none());

    let walk: Vec<(usize, &str)> = tree
        .walk(ModelType::Flow)
        .into_iter()
        .map(|(depth, n)| (depth, n.name.as_str()))
        .collect();
    assert_eq!(
        walk,
        vec![
            (0, "Elementary flows"),
            (1, "emission"),
            (2, "Air"),
            (2, "water"),
            (1, "Resource"),
        ]
    );
}

#[test]
fn test_category_tree_orphans_and_duplicates() {
    let mut categories = sample_categories();
    categories.push(category("c-orphan", "Orphan", ModelType::Flow, Some("gone")));
    categories.push(category("c-air", "Duplicate air", ModelType::Flow, None));
    categories.push(category("c-loop", "Loop", ModelType::Flow, Some("c-loop")));
    let tree = CategoryTree::build(categories);

    let names: Vec<&str> = tree
        .roots_of(ModelType::Flow)
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(names, vec!["Elementary flows", "Orphan"]);
    assert_eq!(tree.find("c-air").map(|n| n.name.as_str()), Some("Air"));
    assert!(tree.find("c-loop").is_none());
}

#[test]
fn test_word_overlap_scoring() {
    assert_eq!(name_score("Carbon dioxide", "Carbon dioxide, fossil"), 13);
    assert_eq!(name_score("carbon DIOXIDE", "Carbon dioxide"), 13);
    assert_eq!(name_score("dioxide carbon", "Carbon dioxide"), 13);
    assert_eq!(name_score("Carbon monoxide", "Carbon dioxide"), 6);
    assert_eq!(name_score("SARS-CoV-2 viruses", "Carbon dioxide"), 0);
    assert_eq!(match_length("anything", ["", "  "]), 0);

    let path = vec!["emission".to_string(), "air".to_string(), "unspecified".to_string()];
    assert_eq!(category_score("air/unspecified", &path), 14);
    assert_eq!(category_score("air/urban", &path), 3);
    assert_eq!(category_score("", &path), 0);

    assert!(location_matches("FI", Some("fi")));
    assert!(!location_matches("FI", Some("SE")));
    assert!(!location_matches("", Some("")));
    assert!(!location_matches("FI", None));
}

#[test]
fn test_scoring_is_monotonic_in_shared_words() {
    let query = "Sulfur dioxide gas";
    let base = name_score(query, "dioxide");
    let extended = name_score(query, "Sulfur dioxide");
    let more = name_score(query, "Sulfur dioxide gas");
    assert!(base <= extended);
    assert!(extended <= more);
    assert_eq!(more, 16);
}

#[test]
fn test_match_score_tie_breaks() {
    let best = MatchScore { name: 10, location: false, category: 0 };
    let worse_name = MatchScore { name: 9, location: true, category: 99 };
    assert!(best.is_better_than(&worse_name));
    assert!(!worse_name.is_better_than(&best));

    let located = MatchScore { name: 10, location: true, category: 0 };
    assert!(located.is_better_than(&best));
    let categorized = MatchScore { name: 10, location: false, category: 5 };
    assert!(located.is_better_than(&categorized));
    assert!(categorized.is_better_than(&best));

    // full tie keeps the current candidate
    assert!(!best.is_better_than(&best));
}

#[test]
fn test_match_score_of_candidate() {
    let query = carbon_dioxide().with_location("DE");
    let candidate = Ref {
        id: "co2".to_string(),
        name: "Carbon dioxide".to_string(),
        flow_type: Some(FlowType::Elementary),
        ref_unit: Some("kg".to_string()),
        category_path: vec!["emission".into(), "air".into(), "unspecified".into()],
        location: Some("DE".to_string()),
        ..Default::default()
    };
    let score = MatchScore::of(&query, &candidate);
    assert_eq!(score, MatchScore { name: 13, location: true, category: 14 });
}

#[test]
fn test_entity_factory() {
    let (groups, props) = sample_units();
    assert_eq!(groups[0].reference_unit().map(|u| u.name.as_str()), Some("kg"));
    assert_eq!(props[0].unit_group_id(), Some(groups[0].id.as_str()));

    let mass = props[0].to_ref();
    let flow = flow_of("Steel", FlowType::Product, Some(&mass));
    assert_eq!(flow.id, entity_id(ModelType::Flow, "Steel"));
    assert_eq!(flow.version, entity::INITIAL_VERSION);
    assert_eq!(flow.reference_property().map(|p| p.id.as_str()), Some(mass.id.as_str()));

    let flow = flow.with_id("fixed");
    assert_eq!(flow.id, "fixed");

    let fi = location_of("Finland", Some("FI"));
    let process = process_of("Steel production", Some(&fi));
    let r = DataSet::Process(process).to_ref();
    assert_eq!(r.model_type, Some(ModelType::Process));
    assert_eq!(r.location.as_deref(), Some("FI"));
}

#[test]
fn test_type_parsing() {
    assert_eq!("elementary".parse::<FlowType>(), Ok(FlowType::Elementary));
    assert_eq!("Product_Flow".parse::<FlowType>(), Ok(FlowType::Product));
    assert_eq!("w".parse::<FlowType>(), Ok(FlowType::Waste));
    assert!("gas".parse::<FlowType>().is_err());
    assert_eq!("unit-group".parse::<ModelType>(), Ok(ModelType::UnitGroup));
    assert!(FlowType::Waste.has_providers());
    assert!(!FlowType::Elementary.has_providers());
}
