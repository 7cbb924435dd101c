use crate::error::{MigrateError, Result};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Entity kinds moved by the pipeline. Each remapped kind gets its own
/// namespace in the registry, so numeric ids never collide across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Guild,
    InternalUser,
    DiscordUser,
    Transaction,
    Pump,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Guild => write!(f, "discord guild"),
            EntityKind::InternalUser => write!(f, "internal user"),
            EntityKind::DiscordUser => write!(f, "discord user"),
            EntityKind::Transaction => write!(f, "transaction"),
            EntityKind::Pump => write!(f, "pump"),
        }
    }
}

/// Old-id to new-id tables, one namespace per entity kind. Lives for exactly
/// one orchestrator run and is discarded after.
#[derive(Debug, Default)]
pub struct MappingRegistry {
    tables: HashMap<EntityKind, HashMap<i64, i64>>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the new id assigned to `old_id`. Each (kind, old id) pair is
    /// written at most once per run; no entity is migrated twice.
    pub fn record(&mut self, kind: EntityKind, old_id: i64, new_id: i64) {
        let prev = self.tables.entry(kind).or_default().insert(old_id, new_id);
        debug_assert!(prev.is_none(), "{kind} id {old_id} recorded twice");
    }

    /// Look up the new id for `old_id`. A miss is fatal: a dangling reference
    /// means the legacy store is inconsistent.
    pub fn resolve(&self, kind: EntityKind, old_id: i64) -> Result<i64> {
        self.tables
            .get(&kind)
            .and_then(|table| table.get(&old_id))
            .copied()
            .ok_or(MigrateError::MissingMapping { kind, old_id })
    }

    /// Number of pairs recorded for a kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.tables.get(&kind).map(|t| t.len()).unwrap_or(0)
    }
}
