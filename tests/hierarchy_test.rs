//! Integration tests for hierarchy construction and leaf linking

use std::collections::HashSet;

use rstest::rstest;

use edgebundle::domain::{
    bilink, resolved_links, DomainError, Hierarchy, HierarchyBuilder, MalformedHierarchy, Record,
};
use edgebundle::tree_traits::TreeNodeConvert;
use edgebundle::util::testing;

fn load_fields() -> Vec<Record> {
    let content = std::fs::read_to_string("tests/resources/fields.json").expect("read fields.json");
    serde_json::from_str(&content).expect("parse fields.json")
}

fn linked(builder: HierarchyBuilder, records: &[Record]) -> Hierarchy {
    let mut h = builder.build(records).expect("build hierarchy");
    bilink(&mut h);
    h
}

#[test]
fn given_two_leaves_with_reference_when_linking_then_edge_is_visible_from_both_ends() {
    testing::init_test_setup();
    // Arrange
    let records = vec![
        Record::new("x.A"),
        Record::new("x.B").with_references(["x.A"]),
    ];

    // Act
    let h = linked(HierarchyBuilder::new(), &records);

    // Assert
    let root = h.get_node(h.root()).unwrap();
    assert_eq!(root.segment(), "x");
    let a = h.find("x.A").unwrap();
    let b = h.find("x.B").unwrap();
    assert_eq!(h.leaves(), vec![a, b]);

    let b_node = h.get_node(b).unwrap();
    assert_eq!(b_node.links.outgoing.len(), 1);
    assert_eq!(b_node.links.outgoing[0].endpoints(), Some((b, a)));
    let a_node = h.get_node(a).unwrap();
    assert_eq!(a_node.links.incoming.len(), 1);
    assert_eq!(a_node.links.incoming[0].endpoints(), Some((b, a)));
}

#[test]
fn given_sample_records_when_building_then_full_names_reconstruct_input() {
    // Arrange
    let records = load_fields();

    // Act
    let h = HierarchyBuilder::new()
        .implicit_root(Some("flare".into()))
        .build(&records)
        .unwrap();

    // Assert
    let names: HashSet<String> = h.leaves().into_iter().map(|l| h.full_name(l)).collect();
    let expected: HashSet<String> = records.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, expected);
    assert_eq!(h.len(), 1 + 3 + records.len());
    assert_eq!(h.depth(), 3);
}

#[test]
fn given_sample_records_when_linking_then_every_outgoing_has_matching_incoming() {
    // Arrange
    let records = load_fields();

    // Act
    let h = linked(HierarchyBuilder::new().implicit_root(Some("flare".into())), &records);

    // Assert
    let mut outgoing = Vec::new();
    let mut incoming = Vec::new();
    for leaf in h.leaves() {
        let node = h.get_node(leaf).unwrap();
        outgoing.extend(node.links.outgoing.iter().filter_map(|l| l.endpoints()));
        incoming.extend(node.links.incoming.iter().filter_map(|l| l.endpoints()));
    }
    outgoing.sort();
    incoming.sort();
    assert_eq!(outgoing.len(), 15);
    assert_eq!(outgoing, incoming);
    assert_eq!(resolved_links(&h).len(), 15);
}

#[test]
fn given_group_record_declared_after_children_when_building_then_root_carries_its_data() {
    // Arrange
    let records = vec![
        Record::new("a.b"),
        Record::new("a.c"),
        Record::new("a").with_references(["a.b"]),
    ];

    // Act
    let h = HierarchyBuilder::new().build(&records).unwrap();

    // Assert
    let root = h.get_node(h.root()).unwrap();
    assert_eq!(root.segment(), "a");
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.references(), ["a.b".to_string()]);
    assert_eq!(h.leaves().len(), 2);
}

#[test]
fn given_reference_to_missing_or_group_node_when_linking_then_it_is_dangling() {
    // Arrange
    let records = vec![
        Record::new("x.g.a"),
        Record::new("x.b").with_references(["x.nope", "x.g", "x.g.a"]),
    ];

    // Act
    let h = linked(HierarchyBuilder::new(), &records);

    // Assert
    let b = h.get_node(h.find("x.b").unwrap()).unwrap();
    let dangling: Vec<&str> = b.links.dangling().map(|l| l.reference.as_str()).collect();
    assert_eq!(dangling, vec!["x.nope", "x.g"]);
    assert_eq!(b.links.outgoing.len(), 3);
    assert_eq!(resolved_links(&h).len(), 1);
}

#[test]
fn given_linked_hierarchy_when_linking_again_then_lists_do_not_grow() {
    // Arrange
    let records = load_fields();
    let mut h = linked(HierarchyBuilder::new().implicit_root(Some("flare".into())), &records);
    let before = resolved_links(&h);

    // Act
    bilink(&mut h);

    // Assert
    assert_eq!(resolved_links(&h), before);
    let linear = h.find("scale.LinearScale").unwrap();
    assert_eq!(h.get_node(linear).unwrap().links.incoming.len(), 5);
}

#[rstest]
#[case::empty(vec![], MalformedHierarchy::NoRoot)]
#[case::two_roots(
    vec![Record::new("a.x"), Record::new("b.y")],
    MalformedHierarchy::MultipleRoots { first: "a".into(), second: "b".into() }
)]
#[case::empty_name(vec![Record::new("")], MalformedHierarchy::EmptyName)]
#[case::leading_delimiter(
    vec![Record::new(".a")],
    MalformedHierarchy::EmptySegment { name: ".a".into() }
)]
#[case::duplicate(
    vec![Record::new("a.b"), Record::new("a.b")],
    MalformedHierarchy::DuplicateRecord { name: "a.b".into() }
)]
fn given_malformed_records_when_building_then_reports_cause(
    #[case] records: Vec<Record>,
    #[case] expected: MalformedHierarchy,
) {
    let err = HierarchyBuilder::new().build(&records).unwrap_err();
    assert_eq!(err, DomainError::MalformedHierarchy(expected));
}

#[rstest]
#[case("/", "root/a/b", "root/a/b")]
#[case("::", "root::a::b", "root::a::b")]
#[case(".", "root.a.b", "root.a.b")]
fn given_delimiter_when_building_then_full_name_round_trips(
    #[case] delimiter: &str,
    #[case] name: &str,
    #[case] expected: &str,
) {
    let h = HierarchyBuilder::new()
        .delimiter(delimiter)
        .build(&[Record::new(name)])
        .unwrap();
    let leaf = h.leaves()[0];
    assert_eq!(h.full_name(leaf), expected);
    assert_eq!(h.level(leaf), 2);
}

#[test]
fn given_sorted_hierarchy_when_rendering_tree_then_groups_follow_name_order() {
    // Arrange
    let records = load_fields();
    let mut h = linked(HierarchyBuilder::new().implicit_root(Some("flare".into())), &records);
    h.sort_children();

    // Act
    let rendered = h.to_tree_string().to_string();

    // Assert
    let data = rendered.find("data").unwrap();
    let scale = rendered.find("scale").unwrap();
    let vis = rendered.find("vis").unwrap();
    assert!(data < scale && scale < vis);
    assert!(rendered.contains("LinearScale (out: 0, in: 5)"));
}
