//! Building areas
//!
//! The building is a tree of partitions (building, floors) whose leaves are
//! spaces (rooms, halls, stairs). Each space records the doors that give
//! access into it. Lookups are plain recursion over the tree.

use crate::types::{AreaId, DoorId};
use serde::{Deserialize, Serialize};

/// A node of the area tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Area {
    /// An area made of other areas
    Partition {
        /// Area identifier
        id: AreaId,
        /// Human-readable description
        description: String,
        /// Child areas
        children: Vec<Area>,
    },
    /// A leaf area reachable through doors
    Space {
        /// Area identifier
        id: AreaId,
        /// Human-readable description
        description: String,
        /// Doors giving access into this space
        doors: Vec<DoorId>,
    },
}

impl Area {
    /// Create an empty partition
    pub fn partition(id: impl Into<AreaId>, description: impl Into<String>) -> Self {
        Area::Partition { id: id.into(), description: description.into(), children: Vec::new() }
    }

    /// Create a space with no doors
    pub fn space(id: impl Into<AreaId>, description: impl Into<String>) -> Self {
        Area::Space { id: id.into(), description: description.into(), doors: Vec::new() }
    }

    /// Builder helper: add a child to a partition. Spaces ignore children.
    pub fn with_child(mut self, child: Area) -> Self {
        if let Area::Partition { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Area identifier
    pub fn id(&self) -> &AreaId {
        match self {
            Area::Partition { id, .. } | Area::Space { id, .. } => id,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        match self {
            Area::Partition { description, .. } | Area::Space { description, .. } => description,
        }
    }

    /// Whether this node is a space
    pub fn is_space(&self) -> bool {
        matches!(self, Area::Space { .. })
    }

    /// Find an area by id in this subtree
    pub fn find(&self, target: &AreaId) -> Option<&Area> {
        if self.id() == target {
            return Some(self);
        }
        match self {
            Area::Partition { children, .. } => children.iter().find_map(|c| c.find(target)),
            Area::Space { .. } => None,
        }
    }

    fn find_mut(&mut self, target: &AreaId) -> Option<&mut Area> {
        if self.id() == target {
            return Some(self);
        }
        match self {
            Area::Partition { children, .. } => {
                children.iter_mut().find_map(|c| c.find_mut(target))
            }
            Area::Space { .. } => None,
        }
    }

    /// Every door giving access to a space of this subtree, in tree order
    pub fn doors(&self) -> Vec<DoorId> {
        let mut out = Vec::new();
        self.collect_doors(&mut out);
        out
    }

    fn collect_doors(&self, out: &mut Vec<DoorId>) {
        match self {
            Area::Partition { children, .. } => {
                for child in children {
                    child.collect_doors(out);
                }
            }
            Area::Space { doors, .. } => {
                for door in doors {
                    if !out.contains(door) {
                        out.push(door.clone());
                    }
                }
            }
        }
    }

    /// Every space of this subtree, in tree order
    pub fn spaces(&self) -> Vec<&AreaId> {
        match self {
            Area::Partition { children, .. } => children.iter().flat_map(|c| c.spaces()).collect(),
            Area::Space { id, .. } => vec![id],
        }
    }
}

/// The building's area tree with lookup by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDirectory {
    root: Area,
}

impl AreaDirectory {
    /// Wrap an area tree
    pub fn new(root: Area) -> Self {
        Self { root }
    }

    /// The root of the tree
    pub fn root(&self) -> &Area {
        &self.root
    }

    /// Find an area by id
    pub fn find(&self, id: &AreaId) -> Option<&Area> {
        self.root.find(id)
    }

    /// Doors giving access to any space under `id`; `None` when the area is unknown
    pub fn doors_in(&self, id: &AreaId) -> Option<Vec<DoorId>> {
        self.find(id).map(Area::doors)
    }

    /// Spaces under `id`; `None` when the area is unknown
    pub fn spaces_in(&self, id: &AreaId) -> Option<Vec<&AreaId>> {
        self.find(id).map(Area::spaces)
    }

    /// Record that `door` gives access into `space`.
    ///
    /// Returns `false` if `space` is unknown or not a space.
    pub fn add_door_to_space(&mut self, space: &AreaId, door: DoorId) -> bool {
        match self.root.find_mut(space) {
            Some(Area::Space { doors, .. }) => {
                if !doors.contains(&door) {
                    doors.push(door);
                }
                true
            }
            _ => false,
        }
    }
}
