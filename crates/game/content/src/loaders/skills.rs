//! Skill catalog loader.
//!
//! Loads [`SkillDef`]s from RON data and serves them to the core through
//! [`SkillOracle`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::{SkillDef, SkillId, SkillOracle};

use crate::loaders::{LoadResult, read_file};

/// Skill catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SkillCatalog {
    skills: Vec<SkillDef>,
}

/// Registry of configured skills, looked up by id.
#[derive(Debug, Clone, Default)]
pub struct SkillRegistry {
    skills: BTreeMap<SkillId, SkillDef>,
}

impl SkillRegistry {
    /// Loads the builtin skill catalog from embedded RON data.
    pub fn builtin() -> LoadResult<Self> {
        let basic_ron = include_str!("../../data/skills/basic.ron");
        Self::from_str(basic_ron)
    }

    /// Loads a skill catalog from a RON file on disk.
    pub fn load(path: &Path) -> LoadResult<Self> {
        let content = read_file(path)?;
        Self::from_str(&content)
    }

    /// Parses a skill catalog from RON text.
    pub fn from_str(content: &str) -> LoadResult<Self> {
        let catalog: SkillCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill catalog RON: {}", e))?;
        let mut skills = BTreeMap::new();
        for skill in catalog.skills {
            if skills.insert(skill.id, skill.clone()).is_some() {
                anyhow::bail!("Duplicate skill id {} ({})", skill.id, skill.name);
            }
        }
        Ok(Self { skills })
    }

    /// Merges another catalog file into this registry; later files may
    /// override earlier ids.
    pub fn extend_from(&mut self, path: &Path) -> LoadResult<()> {
        let other = Self::load(path)?;
        self.skills.extend(other.skills);
        Ok(())
    }

    pub fn by_name(&self, name: &str) -> Option<&SkillDef> {
        self.skills.values().find(|skill| skill.name == name)
    }

    pub fn ids(&self) -> impl Iterator<Item = SkillId> + '_ {
        self.skills.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl SkillOracle for SkillRegistry {
    fn skill(&self, id: SkillId) -> Option<&SkillDef> {
        self.skills.get(&id)
    }
}
