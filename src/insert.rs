//! Splices columns into a possibly nested frame.
//!
//! Requests are partitioned by their path segment at each depth. Requests
//! that target an existing column group are merged into it recursively;
//! the others become new columns, placed by the original positions recorded
//! in a [`ReferenceTree`] when one is supplied and appended otherwise.

use std::collections::HashMap;

use log::trace;

use crate::{
    column::{Column, ColumnGroup},
    error::{FrameError, FrameResult},
    frame::Frame,
    path::ColumnPath,
    reference::{NodeId, ReferenceTree},
};

/// A column to insert at `path`.
#[derive(Debug, Clone)]
pub struct ColumnToInsert {
    pub path: ColumnPath,
    pub column: Column,
    /// Node of the reference tree the column was taken from, if any.
    pub reference: Option<NodeId>,
}

impl ColumnToInsert {
    pub fn new(path: ColumnPath, column: Column) -> Self {
        Self {
            path,
            column,
            reference: None,
        }
    }

    pub fn with_reference(path: ColumnPath, column: Column, reference: NodeId) -> Self {
        Self {
            path,
            column,
            reference: Some(reference),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum InsertionIndex {
    At(usize),
    End,
}

#[derive(Clone, Copy)]
struct TreeCursor<'a> {
    tree: &'a ReferenceTree,
    node: NodeId,
}

impl<'a> TreeCursor<'a> {
    fn child(self, name: &str) -> Option<TreeCursor<'a>> {
        self.tree.child(self.node, name).map(|node| TreeCursor {
            tree: self.tree,
            node,
        })
    }
}

struct Partition {
    name: String,
    requests: Vec<ColumnToInsert>,
}

/// Inserts `requests` into `frame` (or into an empty frame).
///
/// `tree` must be the reference tree the requests' reference nodes point
/// into; without it every new column is appended after its siblings.
pub fn insert_columns(
    frame: Option<Frame>,
    requests: Vec<ColumnToInsert>,
    tree: Option<&ReferenceTree>,
) -> FrameResult<Frame> {
    let cursor = tree.map(|tree| TreeCursor {
        tree,
        node: tree.root(),
    });
    insert_at_depth(frame, requests, cursor, 0)
}

fn insert_at_depth(
    frame: Option<Frame>,
    requests: Vec<ColumnToInsert>,
    cursor: Option<TreeCursor<'_>>,
    depth: usize,
) -> FrameResult<Frame> {
    if requests.is_empty() {
        return Ok(frame.unwrap_or_default());
    }
    trace!("Merging {} column(s) at depth {depth}", requests.len());
    let child_depth = depth + 1;
    let (mut slots, lookup) = partition(requests, depth)?;

    let existing_rows = frame
        .as_ref()
        .filter(|frame| !frame.is_empty())
        .map(Frame::row_count);
    let mut output: Vec<Column> = Vec::new();

    for column in frame.map(Frame::into_columns).unwrap_or_default() {
        let Some(partition) = lookup
            .get(column.name())
            .and_then(|slot| slots[*slot].take())
        else {
            output.push(column);
            continue;
        };
        if let Some(clash) = partition
            .requests
            .iter()
            .find(|request| request.path.len() == child_depth)
        {
            return Err(FrameError::PathAlreadyExists {
                path: clash.path.to_string(),
            });
        }
        let Column::Group(group) = column else {
            return Err(FrameError::NotAColumnGroup {
                path: partition.requests[0].path.prefix(child_depth),
            });
        };
        let child_cursor = cursor.and_then(|cursor| cursor.child(&partition.name));
        let inner = insert_at_depth(
            Some(group.into_frame()),
            partition.requests,
            child_cursor,
            child_depth,
        )?;
        output.push(Column::Group(ColumnGroup::new(partition.name, inner)));
    }

    let mut additions = slots
        .into_iter()
        .flatten()
        .map(|partition| (insertion_index(&partition, cursor, child_depth), partition))
        .collect::<Vec<_>>();
    additions.sort_by_key(|(index, _)| *index);

    let siblings = cursor
        .map(|cursor| {
            let mut children = cursor.tree.children(cursor.node).to_vec();
            children.sort_by_key(|child| cursor.tree.data(*child).original_index);
            children
        })
        .unwrap_or_default();
    let mut sibling_cursor = 0;
    let mut offset: isize = 0;

    for (index, partition) in additions {
        let column = build_new_column(partition, cursor, child_depth)?;
        match index {
            InsertionIndex::End => output.push(column),
            InsertionIndex::At(index) => {
                if let Some(cursor) = cursor {
                    while let Some(sibling) = siblings.get(sibling_cursor) {
                        let data = cursor.tree.data(*sibling);
                        if data.original_index >= index {
                            break;
                        }
                        if data.was_removed {
                            offset -= 1;
                        }
                        sibling_cursor += 1;
                    }
                }
                let position = (index as isize + offset).clamp(0, output.len() as isize) as usize;
                output.insert(position, column);
                offset += 1;
            }
        }
    }

    let row_count = existing_rows
        .or_else(|| output.first().map(Column::len))
        .unwrap_or(0);
    Frame::with_row_count(output, row_count)
}

/// Groups requests by their segment at `depth`, keeping first-seen order.
fn partition(
    requests: Vec<ColumnToInsert>,
    depth: usize,
) -> FrameResult<(Vec<Option<Partition>>, HashMap<String, usize>)> {
    let mut slots: Vec<Option<Partition>> = Vec::new();
    let mut lookup: HashMap<String, usize> = HashMap::new();
    for request in requests {
        let name = request
            .path
            .segment(depth)
            .ok_or(FrameError::EmptyPath)?
            .to_string();
        match lookup.get(&name) {
            Some(slot) => {
                if let Some(partition) = slots[*slot].as_mut() {
                    partition.requests.push(request);
                }
            }
            None => {
                lookup.insert(name.clone(), slots.len());
                slots.push(Some(Partition {
                    name,
                    requests: vec![request],
                }));
            }
        }
    }
    Ok((slots, lookup))
}

/// Smallest original position claimed by any request of the partition.
fn insertion_index(
    partition: &Partition,
    cursor: Option<TreeCursor<'_>>,
    child_depth: usize,
) -> InsertionIndex {
    let Some(cursor) = cursor else {
        return InsertionIndex::End;
    };
    partition
        .requests
        .iter()
        .map(|request| {
            request
                .reference
                .and_then(|node| cursor.tree.ancestor_at_depth(node, child_depth))
                .filter(|ancestor| cursor.tree.parent(*ancestor) == Some(cursor.node))
                .map(|ancestor| {
                    let data = cursor.tree.data(ancestor);
                    if data.was_removed {
                        InsertionIndex::At(data.original_index)
                    } else {
                        InsertionIndex::At(data.original_index + 1)
                    }
                })
                .unwrap_or(InsertionIndex::End)
        })
        .min()
        .unwrap_or(InsertionIndex::End)
}

fn build_new_column(
    partition: Partition,
    cursor: Option<TreeCursor<'_>>,
    child_depth: usize,
) -> FrameResult<Column> {
    let Partition { name, requests } = partition;
    let child_cursor = cursor.and_then(|cursor| cursor.child(&name));
    let (terminal, deeper): (Vec<_>, Vec<_>) = requests
        .into_iter()
        .partition(|request| request.path.len() == child_depth);

    let mut terminal = terminal.into_iter();
    match (terminal.next(), terminal.next()) {
        (Some(_), Some(second)) => Err(FrameError::MultipleColumnsAtPath {
            path: second.path.to_string(),
        }),
        (Some(request), None) => {
            let column = request.column.rename(name.as_str());
            if deeper.is_empty() {
                return Ok(column);
            }
            let Column::Group(group) = column else {
                return Err(FrameError::NotAColumnGroup {
                    path: request.path.to_string(),
                });
            };
            let inner = insert_at_depth(Some(group.into_frame()), deeper, child_cursor, child_depth)?;
            Ok(Column::Group(ColumnGroup::new(name, inner)))
        }
        (None, _) => {
            let inner = insert_at_depth(None, deeper, child_cursor, child_depth)?;
            Ok(Column::Group(ColumnGroup::new(name, inner)))
        }
    }
}
