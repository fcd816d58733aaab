use sqlyte::storage::node::{self, NodeType};
use sqlyte::types::{PageBuf, INVALID_PAGE_NUM, NO_SIBLING, PAGE_SIZE};

fn blank_page() -> PageBuf {
    [0u8; PAGE_SIZE]
}

#[test]
fn leaf_initialization_defaults() {
    let mut page = blank_page();
    node::init_leaf(&mut page);

    assert_eq!(node::node_type(&page).unwrap(), NodeType::Leaf);
    assert!(!node::is_root(&page));
    assert_eq!(node::leaf_num_cells(&page), 0);
    assert_eq!(node::leaf_next(&page), NO_SIBLING);
}

#[test]
fn internal_initialization_defaults() {
    let mut page = blank_page();
    node::init_internal(&mut page);

    assert_eq!(node::node_type(&page).unwrap(), NodeType::Internal);
    assert!(!node::is_root(&page));
    assert_eq!(node::internal_num_keys(&page), 0);
    // A zeroed right child would alias the root page, so init must mark
    // it unassigned.
    assert_eq!(node::internal_right_child(&page), INVALID_PAGE_NUM);
}

#[test]
fn header_fields_round_trip() {
    let mut page = blank_page();
    node::init_leaf(&mut page);

    node::set_root(&mut page, true);
    node::set_parent(&mut page, 17);
    node::set_leaf_next(&mut page, 5);

    assert!(node::is_root(&page));
    assert_eq!(node::parent(&page), 17);
    assert_eq!(node::leaf_next(&page), 5);
}

#[test]
fn unknown_node_type_tag_is_an_error() {
    let mut page = blank_page();
    page[0] = 9;
    assert!(node::node_type(&page).is_err());
}

#[test]
fn leaf_find_slot_returns_match_or_insertion_point() {
    let mut page = blank_page();
    node::init_leaf(&mut page);
    for (i, key) in [10u32, 20, 30].iter().enumerate() {
        node::set_leaf_key(&mut page, i as u32, *key);
    }
    node::set_leaf_num_cells(&mut page, 3);

    assert_eq!(node::leaf_find_slot(&page, 10), 0);
    assert_eq!(node::leaf_find_slot(&page, 20), 1);
    assert_eq!(node::leaf_find_slot(&page, 30), 2);

    assert_eq!(node::leaf_find_slot(&page, 5), 0);
    assert_eq!(node::leaf_find_slot(&page, 15), 1);
    assert_eq!(node::leaf_find_slot(&page, 25), 2);
    assert_eq!(node::leaf_find_slot(&page, 35), 3);
}

#[test]
fn internal_find_child_sends_exact_matches_left() {
    let mut page = blank_page();
    node::init_internal(&mut page);
    node::set_internal_num_keys(&mut page, 2);
    node::set_internal_left_child(&mut page, 0, 1);
    node::set_internal_key(&mut page, 0, 10);
    node::set_internal_left_child(&mut page, 1, 2);
    node::set_internal_key(&mut page, 1, 20);
    node::set_internal_right_child(&mut page, 3);

    // A separator owns the "<=" range of its left child.
    assert_eq!(node::internal_find_child(&page, 10), 0);
    assert_eq!(node::internal_find_child(&page, 20), 1);

    assert_eq!(node::internal_find_child(&page, 3), 0);
    assert_eq!(node::internal_find_child(&page, 15), 1);
    assert_eq!(node::internal_find_child(&page, 99), 2);
}

#[test]
fn internal_child_resolves_positions_and_rejects_invalid() {
    let mut page = blank_page();
    node::init_internal(&mut page);
    node::set_internal_num_keys(&mut page, 1);
    node::set_internal_left_child(&mut page, 0, 4);
    node::set_internal_key(&mut page, 0, 10);

    // Right child still unassigned: dereferencing it must fail.
    assert!(node::internal_child(&page, 0, 1).is_err());

    node::set_internal_right_child(&mut page, 9);
    assert_eq!(node::internal_child(&page, 0, 0).unwrap(), 4);
    assert_eq!(node::internal_child(&page, 0, 1).unwrap(), 9);
}
