//! Grid search: BFS movement range and A* routing.
//!
//! Both functions are pure with respect to the board: they read passability,
//! occupancy and annotations but never write them. The engine annotates
//! `Movable` from the BFS result, and `find_path` deliberately routes only
//! through cells annotated `Movable` by that prior pass. The coupling is
//! intentional: paths exist only within the highlighted range.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

use crate::state::{BoardState, CellState, EntityId, MapOracle, Position};

/// Cells reachable from `origin` within `budget` steps of 4-neighbour BFS.
///
/// A neighbour is only traversed if passable and unoccupied, so a single
/// occupied cell can wall off everything behind it even inside the nominal
/// radius. The origin unit's own cell counts as reachable. Distance is the
/// raw BFS depth; there is no separate shortest-path refinement.
pub fn reachable(
    map: &(impl MapOracle + ?Sized),
    board: &BoardState,
    origin: Position,
    mover: EntityId,
    budget: u32,
) -> BTreeSet<Position> {
    let mut result = BTreeSet::new();
    if !map.is_passable(origin) {
        return result;
    }

    let mut frontier = VecDeque::new();
    let mut visited: BTreeMap<Position, u32> = BTreeMap::new();
    frontier.push_back(origin);
    visited.insert(origin, 0);

    while let Some(cell) = frontier.pop_front() {
        let depth = visited[&cell];
        if depth > budget {
            continue;
        }
        let occupant = board.occupant(cell);
        if map.is_passable(cell) && (occupant.is_none() || occupant == Some(mover)) {
            result.insert(cell);
        }
        for neighbor in cell.neighbors() {
            if visited.contains_key(&neighbor) {
                continue;
            }
            if map.is_passable(neighbor) && !board.is_occupied(neighbor) {
                visited.insert(neighbor, depth + 1);
                frontier.push_back(neighbor);
            }
        }
    }

    result
}

/// A* route from `start` to `goal`, inclusive of both endpoints.
///
/// Expands only neighbours currently annotated [`CellState::Movable`] that
/// are unoccupied or are the goal itself. Manhattan heuristic, unit edge
/// cost; ties on `f = g + h` break toward the lower `h`. `None` means no
/// route exists, which is a normal outcome rather than an error.
pub fn find_path(
    map: &(impl MapOracle + ?Sized),
    board: &BoardState,
    start: Position,
    goal: Position,
) -> Option<Vec<Position>> {
    if !map.contains(start) || !map.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let heuristic = |cell: Position| cell.manhattan_distance(goal);

    // Ordered by (f, h) so equal-f ties prefer the node closer to the goal.
    let mut open: BinaryHeap<Reverse<(u32, u32, Position)>> = BinaryHeap::new();
    let mut g_cost: BTreeMap<Position, u32> = BTreeMap::new();
    let mut parent: BTreeMap<Position, Position> = BTreeMap::new();
    let mut closed: BTreeSet<Position> = BTreeSet::new();

    g_cost.insert(start, 0);
    open.push(Reverse((heuristic(start), heuristic(start), start)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if !closed.insert(current) {
            continue;
        }
        if current == goal {
            return Some(retrace(&parent, goal));
        }
        let next_cost = g_cost[&current] + 1;

        for neighbor in current.neighbors() {
            if board.annotation(neighbor) != CellState::Movable {
                continue;
            }
            if board.is_occupied(neighbor) && neighbor != goal {
                continue;
            }
            if closed.contains(&neighbor) {
                continue;
            }
            let known = g_cost.get(&neighbor).copied();
            if known.is_none_or(|cost| next_cost < cost) {
                g_cost.insert(neighbor, next_cost);
                parent.insert(neighbor, current);
                let h = heuristic(neighbor);
                open.push(Reverse((next_cost + h, h, neighbor)));
            }
        }
    }

    None
}

fn retrace(parent: &BTreeMap<Position, Position>, goal: Position) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(previous) = parent.get(&current) {
        path.push(*previous);
        current = *previous;
    }
    path.reverse();
    path
}
