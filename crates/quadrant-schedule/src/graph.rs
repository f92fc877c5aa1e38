//! Precedence graph over tasks.
//!
//! Edges always point from predecessor to successor, whichever end the
//! `DependencyEdge` was stored on. The graph is kept acyclic: an insert
//! that would close a cycle is refused.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use quadrant_models::{DependencyEdge, Task, TaskId};

use crate::error::{Result, ScheduleError};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Directed acyclic graph of precedence constraints.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    successors: BTreeMap<TaskId, BTreeSet<TaskId>>,
    predecessors: BTreeMap<TaskId, BTreeSet<TaskId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from every edge stored on `tasks`.
    ///
    /// Stored data is not trusted to be acyclic; use [`find_cycle`] to check.
    ///
    /// [`find_cycle`]: DependencyGraph::find_cycle
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut graph = Self::new();
        for task in tasks {
            graph.add_node(&task.id);
            for edge in &task.dependencies {
                graph.link(edge.predecessor(), edge.successor());
            }
        }
        graph
    }

    fn add_node(&mut self, id: &TaskId) {
        self.successors.entry(id.clone()).or_default();
        self.predecessors.entry(id.clone()).or_default();
    }

    fn link(&mut self, before: &TaskId, after: &TaskId) {
        self.add_node(before);
        self.add_node(after);
        self.successors
            .entry(before.clone())
            .or_default()
            .insert(after.clone());
        self.predecessors
            .entry(after.clone())
            .or_default()
            .insert(before.clone());
    }

    pub fn contains(&self, edge: &DependencyEdge) -> bool {
        self.successors
            .get(edge.predecessor())
            .is_some_and(|s| s.contains(edge.successor()))
    }

    /// Adds an edge, refusing duplicates and edges that would close a cycle.
    pub fn insert(&mut self, edge: &DependencyEdge) -> Result<()> {
        let (before, after) = (edge.predecessor(), edge.successor());

        if self.contains(edge) {
            return Err(ScheduleError::DuplicateDependency(format!(
                "{} already precedes {}",
                before, after
            )));
        }

        if let Some(path) = self.path(after, before) {
            let mut cycle: Vec<String> = path.iter().map(|id| id.to_string()).collect();
            cycle.push(after.to_string());
            return Err(ScheduleError::DependencyCycle(cycle.join(" -> ")));
        }

        self.link(before, after);
        Ok(())
    }

    /// Direct predecessors of `task`.
    pub fn predecessors(&self, task: &TaskId) -> impl Iterator<Item = &TaskId> {
        self.predecessors.get(task).into_iter().flatten()
    }

    /// Direct successors of `task`.
    pub fn successors(&self, task: &TaskId) -> impl Iterator<Item = &TaskId> {
        self.successors.get(task).into_iter().flatten()
    }

    /// A path `from -> ... -> to` following precedence, if one exists.
    pub fn path(&self, from: &TaskId, to: &TaskId) -> Option<Vec<TaskId>> {
        let mut parent: HashMap<&TaskId, &TaskId> = HashMap::new();
        let mut stack = vec![from];
        let mut seen: BTreeSet<&TaskId> = BTreeSet::from([from]);

        while let Some(current) = stack.pop() {
            if current == to {
                let mut path = vec![current.clone()];
                let mut cursor = current;
                while let Some(prev) = parent.get(cursor) {
                    path.push((*prev).clone());
                    cursor = *prev;
                }
                path.reverse();
                return Some(path);
            }
            for next in self.successors(current) {
                if seen.insert(next) {
                    parent.insert(next, current);
                    stack.push(next);
                }
            }
        }
        None
    }

    /// Finds a cycle with a three-colour depth-first search.
    pub fn find_cycle(&self) -> Option<Vec<TaskId>> {
        let mut color: HashMap<&TaskId, Color> =
            self.successors.keys().map(|id| (id, Color::White)).collect();

        for root in self.successors.keys() {
            if color[root] != Color::White {
                continue;
            }

            // Explicit stack of (node, remaining successors) to avoid recursion.
            let mut trail: Vec<&TaskId> = vec![root];
            let mut frames = vec![(root, self.successors(root).collect::<Vec<_>>())];
            color.insert(root, Color::Gray);

            while let Some((node, pending)) = frames.last_mut() {
                match pending.pop() {
                    Some(next) => match color[next] {
                        Color::White => {
                            color.insert(next, Color::Gray);
                            trail.push(next);
                            frames.push((next, self.successors(next).collect()));
                        }
                        Color::Gray => {
                            let start = trail.iter().position(|id| *id == next).unwrap_or(0);
                            let mut cycle: Vec<TaskId> =
                                trail[start..].iter().map(|id| (*id).clone()).collect();
                            cycle.push(next.clone());
                            return Some(cycle);
                        }
                        Color::Black => {}
                    },
                    None => {
                        color.insert(*node, Color::Black);
                        trail.pop();
                        frames.pop();
                    }
                }
            }
        }
        None
    }

    /// Tasks ordered so every predecessor comes before its successors.
    ///
    /// Ties are broken by id. Fails if the graph contains a cycle.
    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        let mut indegree: BTreeMap<&TaskId, usize> = self
            .predecessors
            .iter()
            .map(|(id, preds)| (id, preds.len()))
            .collect();
        let mut ready: BTreeSet<&TaskId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut order = Vec::with_capacity(indegree.len());
        while let Some(id) = ready.pop_first() {
            order.push(id.clone());
            for next in self.successors(id) {
                if let Some(d) = indegree.get_mut(next) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(next);
                    }
                }
            }
        }

        if order.len() != indegree.len() {
            let cycle = self
                .find_cycle()
                .map(|c| {
                    c.iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(" -> ")
                })
                .unwrap_or_default();
            return Err(ScheduleError::DependencyCycle(cycle));
        }
        Ok(order)
    }
}
