//! Testing utilities for the precinct cross-reference workspace
//!
//! Shared fixtures, builders and assertions.

#![allow(missing_docs)]

use serde_json::{json, Map, Value};
use xref_core::{CrossReferenceRow, GroupKey, MemberEntity, MemberKey};

pub fn xref_rows(pairs: &[(&str, &str)]) -> Vec<CrossReferenceRow> {
    pairs
        .iter()
        .map(|(group, members)| CrossReferenceRow::new(*group, *members))
        .collect()
}

pub fn members(keys: &[&str]) -> Vec<MemberEntity> {
    keys.iter().copied().map(MemberEntity::new).collect()
}

/// Member carrying a couple of attribute columns, as loaded from a precinct table
pub fn member_with_attributes(key: &str, area: f64) -> MemberEntity {
    let mut attributes = Map::new();
    attributes.insert("Area".to_string(), json!(area));
    attributes.insert("County".to_string(), json!("Santa Cruz"));
    MemberEntity::new(key).with_attributes(attributes)
}

/// Cross-reference from the worked example: two voting precincts, four regular precincts
pub fn sample_xref() -> Vec<CrossReferenceRow> {
    xref_rows(&[("V1", "P1 P2"), ("V2", "P3")])
}

pub fn sample_members() -> Vec<MemberEntity> {
    members(&["P1", "P2", "P3", "P4"])
}

/// Cross-reference table records as they appear in a JSON export
pub fn sample_xref_records() -> Vec<Value> {
    vec![
        json!({"VotePrec": "V1", "_Precincts": "P1 P2"}),
        json!({"VotePrec": "V2", "_Precincts": "P3"}),
    ]
}

pub fn sample_member_records() -> Vec<Value> {
    vec![
        json!({"Precinct": "P1", "Area": 1.5}),
        json!({"Precinct": "P2", "Area": 2.0}),
        json!({"Precinct": "P3", "Area": 0.5}),
        json!({"Precinct": "P4", "Area": 3.25}),
    ]
}

pub fn group_of<'a>(members: &'a [MemberEntity], key: &str) -> Option<&'a GroupKey> {
    members
        .iter()
        .find(|m| m.member_key == MemberKey::from(key))
        .and_then(|m| m.group_key.as_ref())
}

/// Assert every member has the expected group, keyed by member
pub fn assert_groups(members: &[MemberEntity], expected: &[(&str, &str)]) {
    for (member, group) in expected {
        assert_eq!(
            group_of(members, member).map(GroupKey::as_str),
            Some(*group),
            "group of member {member}"
        );
    }
}
