//! Rank issuance and priority-ordered listings.

use std::cmp::Ordering;
use std::sync::Arc;

use quadrant_models::{Entity, EntityType, PrioritizedEntity, PriorityQuadrant, ProjectId};
use quadrant_persistence::{EntityFilter, EntityStore};
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;

/// Entities of one quadrant in priority order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadrantLane {
    pub quadrant: PriorityQuadrant,
    pub entities: Vec<Entity>,
}

/// All four quadrants for one entity type, empty lanes included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadrantBoard {
    pub entity_type: EntityType,
    pub lanes: Vec<QuadrantLane>,
}

impl QuadrantBoard {
    /// Entities in `quadrant`, in priority order.
    pub fn lane(&self, quadrant: PriorityQuadrant) -> &[Entity] {
        self.lanes
            .iter()
            .find(|l| l.quadrant == quadrant)
            .map(|l| l.entities.as_slice())
            .unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.lanes.iter().map(|l| l.entities.len()).sum()
    }
}

/// Rank first (unranked last), then creation time, then id.
fn priority_order(a: &Entity, b: &Entity) -> Ordering {
    (a.rank().is_none(), a.rank(), a.created_at())
        .cmp(&(b.rank().is_none(), b.rank(), b.created_at()))
        .then_with(|| a.entity_id().cmp(b.entity_id()))
}

/// Issues ranks and lists entities by quadrant.
pub struct PriorityOrdering {
    store: Arc<dyn EntityStore>,
    clock: Arc<dyn Clock>,
}

impl PriorityOrdering {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Next free rank in a bucket. Never issues the same rank twice, even
    /// after the holder is deleted.
    pub fn next_rank(&self, entity_type: EntityType, quadrant: PriorityQuadrant) -> Result<u32> {
        Ok(self.store.issue_rank(entity_type, quadrant)?)
    }

    /// Saves a new entity, giving it the next rank in its quadrant unless
    /// it already has one.
    pub fn place(&self, mut entity: Entity) -> Result<Entity> {
        if entity.rank().is_none() {
            let quadrant = entity.quadrant();
            let rank = self.next_rank(entity.entity_type(), quadrant)?;
            entity.set_priority(quadrant, rank, self.clock.now());
        }
        self.store.save(&entity)?;

        info!(
            entity_type = %entity.entity_type(),
            entity_id = %entity.entity_id(),
            quadrant = %entity.quadrant(),
            rank = entity.rank(),
            "entity placed"
        );
        Ok(entity)
    }

    /// Lists entities of one type grouped by quadrant, optionally limited
    /// to one project.
    pub fn list_by_quadrant(
        &self,
        entity_type: EntityType,
        project_scope: Option<&ProjectId>,
    ) -> Result<QuadrantBoard> {
        let mut filter = EntityFilter::new();
        if let Some(project_id) = project_scope {
            filter = filter.with_project_id(project_id.clone());
        }
        let entities = self.store.list(entity_type, &filter)?;

        let mut lanes: Vec<QuadrantLane> = PriorityQuadrant::ALL
            .into_iter()
            .map(|quadrant| QuadrantLane {
                quadrant,
                entities: Vec::new(),
            })
            .collect();

        for entity in entities {
            if let Some(lane) = lanes.iter_mut().find(|l| l.quadrant == entity.quadrant()) {
                lane.entities.push(entity);
            }
        }
        for lane in &mut lanes {
            lane.entities.sort_by(priority_order);
        }

        let board = QuadrantBoard { entity_type, lanes };
        debug!(entity_type = %entity_type, total = board.total(), "board listed");
        Ok(board)
    }
}
