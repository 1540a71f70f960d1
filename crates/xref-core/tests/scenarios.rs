use pretty_assertions::assert_eq;
use xref_core::{
    CrossReferenceRow, GroupKey, KeyMappingResolver, KeyedDissolve, MemberEntity, MemberKey,
    Pipeline, XrefError,
};
use xref_test_utils::{assert_groups, member_with_attributes, members, sample_members, sample_xref, xref_rows};

#[test]
fn test_worked_example() {
    let output = Pipeline::default()
        .run(&sample_xref(), sample_members(), &KeyedDissolve)
        .unwrap();

    assert_groups(
        &output.members,
        &[("P1", "V1"), ("P2", "V1"), ("P3", "V2"), ("P4", "P4")],
    );
    let units: Vec<_> = output
        .units
        .iter()
        .map(|u| (u.group_key.to_string(), u.size()))
        .collect();
    assert_eq!(
        units,
        vec![
            ("V1".to_string(), 2),
            ("V2".to_string(), 1),
            ("P4".to_string(), 1),
        ]
    );
}

#[test]
fn test_conflicting_assignment_last_row_wins() {
    let output = Pipeline::default()
        .run(&xref_rows(&[("V1", "P1"), ("V2", "P1")]), members(&["P1"]), &KeyedDissolve)
        .unwrap();

    assert_groups(&output.members, &[("P1", "V2")]);
    assert_eq!(output.summary.conflicts, 1);
}

#[test]
fn test_empty_member_list_adds_nothing() {
    let mapping = KeyMappingResolver::new()
        .resolve(&xref_rows(&[("V1", "")]))
        .unwrap();

    assert!(mapping.is_empty());
}

#[test]
fn test_duplicate_member_key_leaves_input_untouched() {
    let input = members(&["P1", "P2", "P1"]);
    let err = Pipeline::default()
        .run(&sample_xref(), input.clone(), &KeyedDissolve)
        .unwrap_err();

    assert!(matches!(
        err,
        XrefError::DuplicateMemberKey { ref member_key, .. } if *member_key == MemberKey::from("P1")
    ));
    assert!(input.iter().all(|m| m.group_key.is_none()));
}

#[test]
fn test_null_member_list_aborts_resolution() {
    let rows = vec![
        CrossReferenceRow::new("V1", "P1"),
        CrossReferenceRow::new("V2", "P2"),
        CrossReferenceRow::null_members("V3"),
    ];
    let err = KeyMappingResolver::new().resolve(&rows).unwrap_err();

    assert_eq!(err.records_processed(), 2);
    assert!(err.is_input_error());
}

#[test]
fn test_attributes_survive_pipeline() {
    let input = vec![member_with_attributes("P1", 1.5), member_with_attributes("P9", 2.0)];
    let output = Pipeline::default()
        .run(&sample_xref(), input.clone(), &KeyedDissolve)
        .unwrap();

    for (before, after) in input.iter().zip(&output.members) {
        assert_eq!(before.attributes, after.attributes);
    }
    assert_eq!(output.members[1].group_key, Some(GroupKey::from("P9")));
}

#[test]
fn test_stale_group_from_input_is_recomputed() {
    let input = vec![
        MemberEntity::new("P1").with_group("STALE"),
        MemberEntity::new("P4").with_group("STALE"),
    ];
    let output = Pipeline::default()
        .run(&sample_xref(), input, &KeyedDissolve)
        .unwrap();

    assert_groups(&output.members, &[("P1", "V1"), ("P4", "P4")]);
    assert_eq!(output.units.len(), 2);
}
