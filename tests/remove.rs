mod common;

use common::{ints, layout, path, sample_frame};
use nested_frame::{
    FrameError, Value, group_columns, move_columns, remove_columns, rename_column, ungroup,
};

#[test]
fn removed_columns_carry_their_reference_nodes() {
    let result = remove_columns(sample_frame(), &[path("b"), path("g.y")]).unwrap();
    assert_eq!(layout(&result.frame), "a,g(x),c");
    let removed = result
        .removed
        .iter()
        .map(|removed| removed.path.to_string())
        .collect::<Vec<_>>();
    assert_eq!(removed, ["b", "g.y"]);
    for removed in &result.removed {
        assert!(result.tree.data(removed.node).was_removed);
    }
}

#[test]
fn rename_keeps_slot() {
    let renamed = rename_column(sample_frame(), &path("b"), "bee").unwrap();
    assert_eq!(layout(&renamed), "a,bee,g(x,y),c");
    assert_eq!(renamed.column("bee").unwrap().cell(0), Some(Value::Int(2)));

    let nested = rename_column(sample_frame(), &path("g.x"), "ex").unwrap();
    assert_eq!(layout(&nested), "a,b,g(ex,y),c");
}

#[test]
fn rename_to_same_name_is_a_noop() {
    assert_eq!(
        rename_column(sample_frame(), &path("a"), "a").unwrap(),
        sample_frame()
    );
    assert!(matches!(
        rename_column(sample_frame(), &path("zz"), "zz"),
        Err(FrameError::ColumnNotFound { .. })
    ));
}

#[test]
fn grouping_takes_the_first_moved_slot() {
    let grouped = group_columns(sample_frame(), &[path("b"), path("c")], "pair").unwrap();
    assert_eq!(layout(&grouped), "a,pair(b,c),g(x,y)");
}

#[test]
fn ungroup_lifts_children_into_the_group_slot() {
    let flat = ungroup(sample_frame(), &path("g")).unwrap();
    assert_eq!(layout(&flat), "a,b,x,y,c");
    assert!(matches!(
        ungroup(sample_frame(), &path("a")),
        Err(FrameError::NotAColumnGroup { .. })
    ));
}

#[test]
fn moving_into_a_group_appends_to_it() {
    let moved = move_columns(sample_frame(), &[path("a")], |old| path("g").child(old.last())).unwrap();
    assert_eq!(layout(&moved), "b,g(x,y,a),c");
}

#[test]
fn emptied_nested_groups_are_dropped() {
    let frame = sample_frame()
        .insert(path("g.h.deep"), ints("deep", &[1]))
        .unwrap();
    let result = remove_columns(frame, &[path("g.h.deep")]).unwrap();
    assert_eq!(layout(&result.frame), "a,b,g(x,y),c");
}
