use std::collections::{BTreeMap, BTreeSet};

use crate::host::ObjectKind;

/// Engine-side state of one host object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObjectState {
    /// Never pushed to the engine.
    #[default]
    Unknown,
    /// Engine holds the current geometry and transform.
    Loaded,
    /// Only the transform is stale.
    TransformDirty,
    /// Geometry is stale; needs a rebuild.
    GeometryDirty,
}

/// What was last pushed to the engine for a host object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneObjectRecord {
    /// Host object id.
    pub id: String,
    /// Object kind at last sighting.
    pub kind: ObjectKind,
    /// Number of times geometry was uploaded.
    pub geometry_version: u64,
    /// Number of times the transform was pushed.
    pub transform_version: u64,
    /// Sync state.
    pub state: ObjectState,
}

impl SceneObjectRecord {
    fn new(id: &str, kind: ObjectKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            geometry_version: 0,
            transform_version: 0,
            state: ObjectState::Unknown,
        }
    }
}

/// Records keyed by object id.
///
/// Records are created on first sight and only removed by [`ObjectRecords::retain_live`] at the
/// end of a full rebuild.
#[derive(Clone, Debug, Default)]
pub struct ObjectRecords {
    by_id: BTreeMap<String, SceneObjectRecord>,
}

impl ObjectRecords {
    /// No records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `id`, if tracked.
    pub fn get(&self, id: &str) -> Option<&SceneObjectRecord> {
        self.by_id.get(id)
    }

    /// State of `id`, `Unknown` when never seen.
    pub fn state(&self, id: &str) -> ObjectState {
        self.by_id.get(id).map_or(ObjectState::Unknown, |r| r.state)
    }

    /// Number of tracked objects.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// `true` when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObjectRecord> {
        self.by_id.values()
    }

    fn entry(&mut self, id: &str, kind: ObjectKind) -> &mut SceneObjectRecord {
        let record = self
            .by_id
            .entry(id.to_string())
            .or_insert_with(|| SceneObjectRecord::new(id, kind));
        record.kind = kind;
        record
    }

    /// Flag a transform change; geometry-dirty records stay geometry-dirty.
    pub fn mark_transform_dirty(&mut self, id: &str, kind: ObjectKind) {
        let record = self.entry(id, kind);
        if record.state != ObjectState::GeometryDirty {
            record.state = ObjectState::TransformDirty;
        }
    }

    /// Geometry changed; the object needs a reload.
    pub fn mark_geometry_dirty(&mut self, id: &str, kind: ObjectKind) {
        self.entry(id, kind).state = ObjectState::GeometryDirty;
    }

    /// Transform pushed on its own.
    pub fn mark_transform_applied(&mut self, id: &str, kind: ObjectKind) {
        let record = self.entry(id, kind);
        record.transform_version += 1;
        record.state = ObjectState::Loaded;
    }

    /// Object fully (re)loaded during a rebuild.
    pub fn mark_loaded(&mut self, id: &str, kind: ObjectKind) {
        let record = self.entry(id, kind);
        record.geometry_version += 1;
        record.transform_version += 1;
        record.state = ObjectState::Loaded;
    }

    /// Drop every record whose id is not in `live`.
    pub fn retain_live(&mut self, live: &BTreeSet<String>) {
        self.by_id.retain(|id, _| live.contains(id));
    }

    /// Forget every record.
    pub fn clear(&mut self) {
        self.by_id.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/records.rs"]
mod tests;
