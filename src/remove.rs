use log::debug;

use crate::{
    column::{Column, ColumnGroup},
    error::{FrameError, FrameResult},
    frame::Frame,
    insert::{ColumnToInsert, insert_columns},
    path::ColumnPath,
    reference::{NodeId, ReferenceTree},
};

#[derive(Debug, Clone)]
pub struct RemovedColumn {
    pub path: ColumnPath,
    pub column: Column,
    /// The column's node in [`RemovalResult::tree`].
    pub node: NodeId,
}

#[derive(Debug, Clone)]
pub struct RemovalResult {
    pub frame: Frame,
    pub removed: Vec<RemovedColumn>,
    pub tree: ReferenceTree,
}

/// Removes `paths` from `frame`. Groups left without children are removed
/// as well; the top-level frame is kept even when it ends up empty.
pub fn remove_columns(frame: Frame, paths: &[ColumnPath]) -> FrameResult<RemovalResult> {
    for path in paths {
        frame.get(path)?;
    }
    let mut tree = ReferenceTree::snapshot(&frame);
    let mut removed = Vec::new();
    let targets = paths.iter().collect::<Vec<_>>();
    let root = tree.root();
    let frame = strip(frame, &targets, 0, root, &mut tree, &mut removed)?;
    debug!("Removed {} column(s)", removed.len());
    Ok(RemovalResult {
        frame,
        removed,
        tree,
    })
}

fn strip(
    frame: Frame,
    paths: &[&ColumnPath],
    depth: usize,
    node: NodeId,
    tree: &mut ReferenceTree,
    removed: &mut Vec<RemovedColumn>,
) -> FrameResult<Frame> {
    let row_count = frame.row_count();
    let mut kept = Vec::with_capacity(frame.column_count());
    for column in frame.into_columns() {
        let targeted = paths
            .iter()
            .copied()
            .filter(|path| path.segment(depth) == Some(column.name()))
            .collect::<Vec<_>>();
        if targeted.is_empty() {
            kept.push(column);
            continue;
        }
        let child = tree
            .child(node, column.name())
            .ok_or_else(|| FrameError::ColumnNotFound {
                path: targeted[0].prefix(depth + 1),
            })?;
        if targeted.iter().any(|path| path.len() == depth + 1) {
            tree.mark_removed(child);
            let path = tree
                .path_of(child)
                .ok_or_else(|| FrameError::ColumnNotFound {
                    path: targeted[0].prefix(depth + 1),
                })?;
            removed.push(RemovedColumn {
                path,
                column,
                node: child,
            });
            continue;
        }
        let Column::Group(group) = column else {
            return Err(FrameError::NotAColumnGroup {
                path: targeted[0].prefix(depth + 1),
            });
        };
        let name = group.name().to_string();
        let inner = strip(group.into_frame(), &targeted, depth + 1, child, tree, removed)?;
        if inner.is_empty() {
            tree.mark_removed(child);
        } else {
            kept.push(Column::Group(ColumnGroup::new(name, inner)));
        }
    }
    Frame::with_row_count(kept, row_count)
}

/// Moves every column in `paths` to `to(path)`.
pub fn move_columns<F>(frame: Frame, paths: &[ColumnPath], to: F) -> FrameResult<Frame>
where
    F: Fn(&ColumnPath) -> ColumnPath,
{
    let RemovalResult {
        frame,
        removed,
        tree,
    } = remove_columns(frame, paths)?;
    let requests = removed
        .into_iter()
        .map(|removed| {
            ColumnToInsert::with_reference(to(&removed.path), removed.column, removed.node)
        })
        .collect();
    insert_columns(Some(frame), requests, Some(&tree))
}

/// Renames the column at `path`, keeping its position.
pub fn rename_column(frame: Frame, path: &ColumnPath, name: &str) -> FrameResult<Frame> {
    if path.last() == name {
        frame.get(path)?;
        return Ok(frame);
    }
    move_columns(frame, std::slice::from_ref(path), |old| old.with_last(name))
}

/// Moves `paths` under the top-level group `group`, which takes the slot of
/// the first moved column.
pub fn group_columns(frame: Frame, paths: &[ColumnPath], group: &str) -> FrameResult<Frame> {
    move_columns(frame, paths, |old| ColumnPath::single(group).child(old.last()))
}

/// Replaces the group at `path` by its children.
pub fn ungroup(frame: Frame, path: &ColumnPath) -> FrameResult<Frame> {
    let group = frame
        .get(path)?
        .as_group()
        .ok_or_else(|| FrameError::NotAColumnGroup {
            path: path.to_string(),
        })?;
    let children = group
        .frame()
        .names()
        .into_iter()
        .map(|name| path.child(name))
        .collect::<Vec<_>>();
    let parent = path.parent();
    move_columns(frame, &children, |old| match &parent {
        Some(parent) => parent.child(old.last()),
        None => ColumnPath::single(old.last()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        column::ValueColumn,
        data::{ColumnType, Value},
    };

    fn ints(name: &str) -> Column {
        Column::Value(ValueColumn::new(name, ColumnType::Int, vec![Some(Value::Int(1))]))
    }

    #[test]
    fn removing_every_child_drops_the_group() {
        let inner = Frame::new(vec![ints("x")]).unwrap();
        let frame =
            Frame::new(vec![ints("a"), Column::Group(ColumnGroup::new("g", inner))]).unwrap();
        let result = remove_columns(frame, &[ColumnPath::new(["g", "x"]).unwrap()]).unwrap();
        assert_eq!(result.frame.names(), ["a"]);
        let g = result.tree.child(result.tree.root(), "g").unwrap();
        assert!(result.tree.data(g).was_removed);
        assert_eq!(result.removed[0].path.to_string(), "g.x");
    }

    #[test]
    fn removing_unknown_path_fails() {
        let frame = Frame::new(vec![ints("a")]).unwrap();
        assert!(matches!(
            remove_columns(frame, &[ColumnPath::single("b")]),
            Err(FrameError::ColumnNotFound { .. })
        ));
    }
}
