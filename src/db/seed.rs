//! Initial taxonomy loaded from a YAML file.
//!
//! ```yaml
//! subjects:
//!   - name: Mathematics
//!     topics:
//!       - name: Algebra
//!         subtopics: [Linear equations, Quadratics]
//!       - name: Geometry
//! ```

use std::path::Path;

use anyhow::Result;
use log::info;
use serde::Deserialize;

use crate::{
    db::app_storage::AppStorage,
    error::AppResult,
    models::{Subject, Topic},
    utils::{required_text, time_sortable_uid},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub subjects: Vec<SeedSubject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSubject {
    pub name: String,
    #[serde(default)]
    pub topics: Vec<SeedTopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedTopic {
    pub name: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

impl SeedFile {
    pub fn from_yaml(raw: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        info!("Loading seed file {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }
}

/// Inserts the seed taxonomy when no subject exists yet. Returns the number
/// of topics created (subtopics included). Blank names are skipped.
pub fn apply_seed(storage: &AppStorage, seed: &SeedFile) -> Result<usize> {
    if !storage.subjects.is_empty() {
        info!("Subjects already present, skipping seed");
        return Ok(0);
    }

    let mut created = 0;
    for seed_subject in &seed.subjects {
        let Some(name) = required_text(&seed_subject.name) else {
            continue;
        };
        let subject = Subject {
            id: time_sortable_uid(),
            name,
        };
        storage.subjects.insert(&subject)?;

        for seed_topic in &seed_subject.topics {
            let Some(name) = required_text(&seed_topic.name) else {
                continue;
            };
            let parent = Topic {
                id: time_sortable_uid(),
                name,
                subject_id: subject.id.clone(),
                parent_id: None,
            };
            storage.topics.insert(&parent)?;
            created += 1;

            for sub_name in seed_topic.subtopics.iter().filter_map(|n| required_text(n)) {
                storage.topics.insert(&Topic {
                    id: time_sortable_uid(),
                    name: sub_name,
                    subject_id: subject.id.clone(),
                    parent_id: Some(parent.id.clone()),
                })?;
                created += 1;
            }
        }
    }

    info!(
        "Seeded {} subjects and {} topics",
        seed.subjects.len(),
        created
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, hierarchy::build_topic_hierarchy};

    const SEED: &str = r#"
subjects:
  - name: Mathematics
    topics:
      - name: Algebra
        subtopics: [Linear equations, Quadratics, "  "]
      - name: Geometry
  - name: Physics
"#;

    #[test]
    fn seeds_once_and_builds_tree() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::new(dir.path().to_str().unwrap(), 1000).unwrap();
        let seed = SeedFile::from_yaml(SEED).unwrap();

        assert_eq!(apply_seed(&storage, &seed).unwrap(), 4);
        assert_eq!(apply_seed(&storage, &seed).unwrap(), 0);

        let snapshot = storage.snapshot().unwrap();
        let tree = build_topic_hierarchy(&snapshot.subjects, &snapshot.topics);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].subject.name, "Mathematics");
        assert_eq!(tree[0].topics[0].topic.name, "Algebra");
        assert_eq!(tree[0].topics[0].subtopics.len(), 2);
        assert!(tree[1].topics.is_empty());
    }

    #[test]
    fn invalid_yaml_is_a_seed_error() {
        assert!(matches!(
            SeedFile::from_yaml("subjects: [name: ]]"),
            Err(AppError::Seed(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SeedFile::load(dir.path().join("absent.yaml")),
            Err(AppError::Io(_))
        ));
    }
}
