//! Run detection over flattened rows
//!
//! Each mergeable column is scanned top to bottom. A run of equal cells closes
//! when the value changes or when the column's parent has a boundary on the
//! same row; boundaries therefore propagate down a dependency chain of any
//! depth. Columns are evaluated ancestors first.

use crate::error::MergeError;
use crate::merge::region::{ColumnGroup, MergeRegion};
use crate::types::FlattenedRow;
use serde_json::Value;
use std::collections::HashMap;
use std::mem;

#[derive(Debug, Clone, Copy)]
struct Node {
    parent: Option<usize>,
    emit_regions: bool,
    /// Listed in a group, as opposed to only named as someone's parent
    declared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Column dependency edges in first-appearance order
struct DependencyGraph {
    nodes: HashMap<usize, Node>,
    order: Vec<usize>,
}

impl DependencyGraph {
    fn build(groups: &[ColumnGroup], width: Option<usize>) -> Result<Self, MergeError> {
        let mut graph = DependencyGraph {
            nodes: HashMap::new(),
            order: Vec::new(),
        };

        for group in groups {
            check_range(group.column, width)?;
            if let Some(parent) = group.parent {
                check_range(parent, width)?;
                if parent == group.column {
                    return Err(MergeError::SelfDependency(parent));
                }
            }

            match graph.nodes.get_mut(&group.column) {
                Some(node) if node.declared => {
                    match (node.parent, group.parent) {
                        (Some(first), Some(second)) if first != second => {
                            return Err(MergeError::ConflictingParent {
                                column: group.column,
                                first,
                                second,
                            });
                        }
                        (None, Some(parent)) => node.parent = Some(parent),
                        _ => {}
                    }
                    node.emit_regions |= group.emit_regions;
                }
                Some(node) => {
                    node.parent = group.parent;
                    node.emit_regions = group.emit_regions;
                    node.declared = true;
                }
                None => {
                    graph.nodes.insert(
                        group.column,
                        Node {
                            parent: group.parent,
                            emit_regions: group.emit_regions,
                            declared: true,
                        },
                    );
                    graph.order.push(group.column);
                }
            }

            if let Some(parent) = group.parent {
                if !graph.nodes.contains_key(&parent) {
                    graph.nodes.insert(
                        parent,
                        Node {
                            parent: None,
                            emit_regions: false,
                            declared: false,
                        },
                    );
                    graph.order.push(parent);
                }
            }
        }

        Ok(graph)
    }

    /// Every column after all of its ancestors, otherwise first-appearance order
    fn evaluation_order(&self) -> Result<Vec<(usize, Node)>, MergeError> {
        let mut marks: HashMap<usize, Mark> = HashMap::with_capacity(self.order.len());
        let mut sorted = Vec::with_capacity(self.order.len());

        for &column in &self.order {
            let mut chain = Vec::new();
            let mut current = Some(column);

            while let Some(c) = current {
                match marks.get(&c) {
                    Some(Mark::Done) => break,
                    Some(Mark::Visiting) => return Err(MergeError::CyclicDependency(c)),
                    None => {
                        marks.insert(c, Mark::Visiting);
                        chain.push(c);
                        current = self.nodes.get(&c).and_then(|node| node.parent);
                    }
                }
            }

            for c in chain.into_iter().rev() {
                marks.insert(c, Mark::Done);
                if let Some(node) = self.nodes.get(&c) {
                    sorted.push((c, *node));
                }
            }
        }

        Ok(sorted)
    }
}

fn check_range(column: usize, width: Option<usize>) -> Result<(), MergeError> {
    match width {
        Some(width) if column >= width => Err(MergeError::ColumnOutOfRange { column, width }),
        _ => Ok(()),
    }
}

/// Cell equality for run detection: numbers compare by value, so `1` and `1.0` match
fn same_cell(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        _ => a == b,
    }
}

enum ScanState<'r> {
    NoRun,
    InRun { start: usize, value: &'r Value },
}

/// Single-column run tracker
struct ColumnScan<'r> {
    column: usize,
    state: ScanState<'r>,
    regions: Vec<MergeRegion>,
}

impl<'r> ColumnScan<'r> {
    fn new(column: usize) -> Self {
        ColumnScan {
            column,
            state: ScanState::NoRun,
            regions: Vec::new(),
        }
    }

    /// Feed the next row; returns whether a run starts on it
    fn advance(&mut self, row: usize, value: &'r Value, parent_boundary: bool) -> bool {
        match self.state {
            ScanState::InRun { value: current, .. }
                if same_cell(current, value) && !parent_boundary =>
            {
                false
            }
            _ => {
                self.close(row);
                self.state = ScanState::InRun { start: row, value };
                true
            }
        }
    }

    /// Close the open run before row `end`
    fn close(&mut self, end: usize) {
        if let ScanState::InRun { start, .. } = mem::replace(&mut self.state, ScanState::NoRun) {
            if end - start >= 2 {
                self.regions
                    .push(MergeRegion::vertical(self.column, start, end - 1));
            }
        }
    }

    fn finish(mut self, row_count: usize) -> Vec<MergeRegion> {
        self.close(row_count);
        self.regions
    }
}

/// Merge regions for the given column groups.
///
/// Cells are compared as JSON values, except that numbers compare by numeric
/// value (`2` and `2.0` share a run). Nulls merge with nulls; values of
/// different types never merge.
///
/// Regions are ordered by column, then by first row.
pub fn compute_merge_regions(
    rows: &[FlattenedRow],
    groups: &[ColumnGroup],
) -> Result<Vec<MergeRegion>, MergeError> {
    let width = rows.iter().map(Vec::len).min();
    let graph = DependencyGraph::build(groups, width)?;
    let order = graph.evaluation_order()?;

    // Row indexes where a run of the column starts
    let mut boundaries: HashMap<usize, Vec<bool>> = HashMap::with_capacity(order.len());
    let mut regions = Vec::new();

    for (column, node) in order {
        let parent_boundaries = node.parent.and_then(|parent| boundaries.get(&parent));
        let mut scan = ColumnScan::new(column);
        let mut starts = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let parent_boundary = parent_boundaries.map_or(false, |b| b[index]);
            starts.push(scan.advance(index, &row[column], parent_boundary));
        }

        if node.emit_regions {
            regions.extend(scan.finish(rows.len()));
        }
        boundaries.insert(column, starts);
    }

    regions.sort_by_key(|region| (region.first_column, region.first_row));

    tracing::debug!(
        columns = groups.len(),
        rows = rows.len(),
        regions = regions.len(),
        "computed merge regions"
    );

    Ok(regions)
}
