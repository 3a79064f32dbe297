//! Uniform-grid spatial index over agent positions.
//!
//! The index is rebuilt from scratch at the start of every tick and is
//! read-only for the rest of it, so every agent update observes the same
//! snapshot of its neighbours.

use ahash::AHashMap;
use glam::Vec2;
use townsfolk_common::AgentId;

use crate::agent::{Agent, Faction, Job};

/// Default cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f32 = 128.0;

/// Snapshot of an agent stored in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedAgent {
    /// Agent id
    pub id: AgentId,
    /// Position at insertion time
    pub position: Vec2,
    /// Occupation
    pub job: Job,
    /// Allegiance
    pub faction: Faction,
    /// Whether the agent was fighting at insertion time
    pub fighting: bool,
    /// Whether the agent was asleep at insertion time
    pub sleeping: bool,
}

impl IndexedAgent {
    fn from_agent(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            position: agent.position,
            job: agent.job,
            faction: agent.faction.clone(),
            fighting: agent.is_fighting(),
            sleeping: agent.is_sleeping(),
        }
    }
}

/// Grid of buckets keyed by integer cell coordinates.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<IndexedAgent>>,
    len: usize,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: AHashMap::new(),
            len: 0,
        }
    }

    /// Cell edge length.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }

    /// Inserts a living agent. Dead agents are ignored.
    pub fn insert(&mut self, agent: &Agent) {
        if !agent.alive {
            return;
        }
        let cell = self.cell_of(agent.position);
        self.cells
            .entry(cell)
            .or_default()
            .push(IndexedAgent::from_agent(agent));
        self.len += 1;
    }

    /// Clears the index and inserts every living agent.
    pub fn rebuild(&mut self, agents: &[Agent]) {
        self.clear();
        for agent in agents {
            self.insert(agent);
        }
    }

    /// Number of indexed agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All entries within `radius` of `center` (inclusive), ordered by id.
    ///
    /// Radii spanning more cells than are occupied scan the occupied
    /// buckets instead of the covered cell range.
    #[must_use]
    pub fn query(&self, center: Vec2, radius: f32) -> Vec<&IndexedAgent> {
        if self.cells.is_empty() || radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let (min_x, min_y) = self.cell_of(center - Vec2::splat(radius));
        let (max_x, max_y) = self.cell_of(center + Vec2::splat(radius));
        let radius_sq = radius * radius;
        let within = |entry: &&IndexedAgent| entry.position.distance_squared(center) <= radius_sq;

        let span_x = i64::from(max_x) - i64::from(min_x) + 1;
        let span_y = i64::from(max_y) - i64::from(min_y) + 1;
        let span = span_x.saturating_mul(span_y);
        let mut found: Vec<&IndexedAgent> = Vec::new();
        if span > self.cells.len() as i64 {
            for ((cx, cy), bucket) in &self.cells {
                if (min_x..=max_x).contains(cx) && (min_y..=max_y).contains(cy) {
                    found.extend(bucket.iter().filter(within));
                }
            }
        } else {
            for cy in min_y..=max_y {
                for cx in min_x..=max_x {
                    if let Some(bucket) = self.cells.get(&(cx, cy)) {
                        found.extend(bucket.iter().filter(within));
                    }
                }
            }
        }
        found.sort_by_key(|entry| entry.id);
        found
    }

    /// Ids of entries within `radius` of `center`.
    #[must_use]
    pub fn query_ids(&self, center: Vec2, radius: f32) -> Vec<AgentId> {
        self.query(center, radius).into_iter().map(|e| e.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tests::test_agent;

    fn agent_at(index: usize, pos: Vec2) -> Agent {
        let mut agent = test_agent(Job::Villager, pos);
        agent.id = AgentId::from_index(index);
        agent
    }

    #[test]
    fn test_empty_query() {
        let index = SpatialIndex::default();
        assert!(index.query(Vec2::ZERO, 500.0).is_empty());
    }

    #[test]
    fn test_query_radius_inclusive_and_across_cells() {
        let mut index = SpatialIndex::new(128.0);
        index.insert(&agent_at(0, Vec2::new(100.0, 100.0)));
        index.insert(&agent_at(1, Vec2::new(200.0, 100.0)));
        index.insert(&agent_at(2, Vec2::new(1000.0, 1000.0)));

        let mut ids = index.query_ids(Vec2::new(100.0, 100.0), 100.0);
        ids.sort();
        assert_eq!(ids, vec![AgentId::from_index(0), AgentId::from_index(1)]);
    }

    #[test]
    fn test_negative_coordinates() {
        let mut index = SpatialIndex::new(128.0);
        index.insert(&agent_at(0, Vec2::new(-10.0, -10.0)));
        assert_eq!(index.query_ids(Vec2::new(5.0, 5.0), 30.0).len(), 1);
    }

    #[test]
    fn test_huge_radius_returns_everyone() {
        let mut index = SpatialIndex::new(128.0);
        index.insert(&agent_at(0, Vec2::new(100.0, 100.0)));
        index.insert(&agent_at(1, Vec2::new(-5000.0, 9000.0)));

        assert_eq!(index.query_ids(Vec2::ZERO, 1.0e7).len(), 2);
        assert_eq!(index.query_ids(Vec2::ZERO, f32::INFINITY).len(), 2);
        assert_eq!(index.query_ids(Vec2::ZERO, f32::MAX).len(), 2);
        assert!(index.query_ids(Vec2::ZERO, f32::NAN).is_empty());
    }

    #[test]
    fn test_wide_query_still_filters_by_distance() {
        let mut index = SpatialIndex::new(1.0);
        index.insert(&agent_at(0, Vec2::new(10.0, 0.0)));
        index.insert(&agent_at(1, Vec2::new(500.0, 0.0)));
        assert_eq!(index.query_ids(Vec2::ZERO, 100.0), vec![AgentId::from_index(0)]);
    }

    #[test]
    fn test_dead_agents_skipped() {
        let mut index = SpatialIndex::default();
        let mut agent = agent_at(0, Vec2::ZERO);
        agent.kill();
        index.insert(&agent);
        assert!(index.is_empty());
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut index = SpatialIndex::default();
        let agents = vec![agent_at(0, Vec2::ZERO), agent_at(1, Vec2::new(50.0, 0.0))];
        index.rebuild(&agents);
        assert_eq!(index.len(), 2);
        index.rebuild(&agents[..1]);
        assert_eq!(index.len(), 1);
    }
}
