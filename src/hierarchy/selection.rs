use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::tree::SubjectTopics;

/// Selection state of one top-level topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionState {
    Unselected,
    Partial,
    Full,
}

/// A user action on the topic selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "topicId", rename_all = "camelCase")]
pub enum SelectionEvent {
    Select(String),
    Deselect(String),
    Toggle(String),
    Clear,
}

/// Set of selected topic ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicSelection {
    ids: BTreeSet<String>,
}

impl TopicSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ids.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TopicSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-parent state reported back to the selector UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSelection {
    pub topic_id: String,
    pub state: SelectionState,
}

/// Selection transitions over one topic hierarchy snapshot.
///
/// # Invariants
/// - A parent with subtopics is selected exactly when all of its subtopics
///   are; the parent id in the set is derived, never independent.
/// - A parent without subtopics is `Full` when its own id is selected.
/// - Ids outside the hierarchy are dropped.
pub struct TopicSelector {
    parents: Vec<String>,
    children: HashMap<String, Vec<String>>,
    parent_of: HashMap<String, String>,
}

impl TopicSelector {
    pub fn from_hierarchy(tree: &[SubjectTopics]) -> Self {
        let mut parents = Vec::new();
        let mut children = HashMap::new();
        let mut parent_of = HashMap::new();

        for node in tree.iter().flat_map(|subject| subject.topics.iter()) {
            let parent_id = node.topic.id.clone();
            let subtopics: Vec<String> = node.subtopic_ids().map(str::to_string).collect();
            for sub in &subtopics {
                parent_of.insert(sub.clone(), parent_id.clone());
            }
            parents.push(parent_id.clone());
            children.insert(parent_id, subtopics);
        }

        Self {
            parents,
            children,
            parent_of,
        }
    }

    /// Drops unknown ids and recomputes derived parent flags.
    pub fn normalize(&self, selection: &TopicSelection) -> TopicSelection {
        let mut ids: BTreeSet<String> = selection
            .iter()
            .filter(|id| self.children.contains_key(*id) || self.parent_of.contains_key(*id))
            .map(str::to_string)
            .collect();
        for parent in &self.parents {
            self.sync_parent(&mut ids, parent);
        }
        TopicSelection { ids }
    }

    /// Applies `event` to `selection` and returns the next selection.
    pub fn apply(&self, selection: &TopicSelection, event: &SelectionEvent) -> TopicSelection {
        let mut next = self.normalize(selection);
        match event {
            SelectionEvent::Select(id) => self.select(&mut next.ids, id),
            SelectionEvent::Deselect(id) => self.deselect(&mut next.ids, id),
            SelectionEvent::Toggle(id) => {
                let selected = match self.children.get(id) {
                    Some(_) => self.state_in(&next.ids, id) == Some(SelectionState::Full),
                    None => next.ids.contains(id),
                };
                if selected {
                    self.deselect(&mut next.ids, id);
                } else {
                    self.select(&mut next.ids, id);
                }
            }
            SelectionEvent::Clear => next.ids.clear(),
        }
        next
    }

    /// State of the top-level topic `parent_id`; `None` when it is not a
    /// top-level topic of this hierarchy.
    pub fn state_of(&self, selection: &TopicSelection, parent_id: &str) -> Option<SelectionState> {
        self.state_in(&selection.ids, parent_id)
    }

    /// States of every top-level topic, in hierarchy order.
    pub fn parent_states(&self, selection: &TopicSelection) -> Vec<ParentSelection> {
        self.parents
            .iter()
            .filter_map(|parent| {
                self.state_in(&selection.ids, parent).map(|state| ParentSelection {
                    topic_id: parent.clone(),
                    state,
                })
            })
            .collect()
    }

    fn select(&self, ids: &mut BTreeSet<String>, id: &str) {
        if let Some(subtopics) = self.children.get(id) {
            ids.insert(id.to_string());
            ids.extend(subtopics.iter().cloned());
        } else if let Some(parent) = self.parent_of.get(id) {
            ids.insert(id.to_string());
            self.sync_parent(ids, parent);
        }
    }

    fn deselect(&self, ids: &mut BTreeSet<String>, id: &str) {
        if let Some(subtopics) = self.children.get(id) {
            ids.remove(id);
            for sub in subtopics {
                ids.remove(sub);
            }
        } else if let Some(parent) = self.parent_of.get(id) {
            ids.remove(id);
            ids.remove(parent);
        }
    }

    fn sync_parent(&self, ids: &mut BTreeSet<String>, parent: &str) {
        let Some(subtopics) = self.children.get(parent) else {
            return;
        };
        if subtopics.is_empty() {
            return;
        }
        if subtopics.iter().all(|sub| ids.contains(sub)) {
            ids.insert(parent.to_string());
        } else {
            ids.remove(parent);
        }
    }

    fn state_in(&self, ids: &BTreeSet<String>, parent: &str) -> Option<SelectionState> {
        let subtopics = self.children.get(parent)?;
        if subtopics.is_empty() {
            return Some(if ids.contains(parent) {
                SelectionState::Full
            } else {
                SelectionState::Unselected
            });
        }
        let selected = subtopics.iter().filter(|sub| ids.contains(*sub)).count();
        Some(match selected {
            0 => SelectionState::Unselected,
            n if n == subtopics.len() => SelectionState::Full,
            _ => SelectionState::Partial,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build_topic_hierarchy;
    use crate::models::{Subject, Topic};

    fn selector() -> TopicSelector {
        let subjects = vec![Subject {
            id: "s1".into(),
            name: "Maths".into(),
        }];
        let topic = |id: &str, parent: Option<&str>| Topic {
            id: id.into(),
            name: id.to_uppercase(),
            subject_id: "s1".into(),
            parent_id: parent.map(Into::into),
        };
        let topics = vec![
            topic("algebra", None),
            topic("linear", Some("algebra")),
            topic("quadratic", Some("algebra")),
            topic("geometry", None),
        ];
        TopicSelector::from_hierarchy(&build_topic_hierarchy(&subjects, &topics))
    }

    fn ids(selection: &TopicSelection) -> Vec<&str> {
        selection.iter().collect()
    }

    #[test]
    fn selecting_parent_selects_all_subtopics() {
        let selector = selector();
        let next = selector.apply(
            &TopicSelection::new(),
            &SelectionEvent::Select("algebra".into()),
        );
        assert_eq!(ids(&next), vec!["algebra", "linear", "quadratic"]);
        assert_eq!(selector.state_of(&next, "algebra"), Some(SelectionState::Full));
    }

    #[test]
    fn deselecting_subtopic_deselects_parent() {
        let selector = selector();
        let full = selector.apply(
            &TopicSelection::new(),
            &SelectionEvent::Select("algebra".into()),
        );
        let next = selector.apply(&full, &SelectionEvent::Deselect("linear".into()));
        assert_eq!(ids(&next), vec!["quadratic"]);
        assert_eq!(selector.state_of(&next, "algebra"), Some(SelectionState::Partial));
    }

    #[test]
    fn selecting_last_subtopic_completes_parent() {
        let selector = selector();
        let one = selector.apply(
            &TopicSelection::new(),
            &SelectionEvent::Select("linear".into()),
        );
        assert_eq!(selector.state_of(&one, "algebra"), Some(SelectionState::Partial));
        let both = selector.apply(&one, &SelectionEvent::Select("quadratic".into()));
        assert!(both.contains("algebra"));
        assert_eq!(selector.state_of(&both, "algebra"), Some(SelectionState::Full));
    }

    #[test]
    fn toggle_flips_parent_and_leaf() {
        let selector = selector();
        let on = selector.apply(
            &TopicSelection::new(),
            &SelectionEvent::Toggle("geometry".into()),
        );
        assert_eq!(selector.state_of(&on, "geometry"), Some(SelectionState::Full));
        let off = selector.apply(&on, &SelectionEvent::Toggle("geometry".into()));
        assert_eq!(selector.state_of(&off, "geometry"), Some(SelectionState::Unselected));

        let partial = selector.apply(
            &TopicSelection::new(),
            &SelectionEvent::Select("linear".into()),
        );
        let full = selector.apply(&partial, &SelectionEvent::Toggle("algebra".into()));
        assert_eq!(selector.state_of(&full, "algebra"), Some(SelectionState::Full));
    }

    #[test]
    fn normalize_drops_unknown_ids_and_stale_parent_flags() {
        let selector = selector();
        let raw: TopicSelection = ["algebra", "linear", "unknown"].into_iter().collect();
        let normalized = selector.normalize(&raw);
        assert_eq!(ids(&normalized), vec!["linear"]);
    }

    #[test]
    fn parent_states_follow_hierarchy_order() {
        let selector = selector();
        let selection = selector.apply(
            &TopicSelection::new(),
            &SelectionEvent::Select("quadratic".into()),
        );
        let states = selector.parent_states(&selection);
        assert_eq!(
            states,
            vec![
                ParentSelection {
                    topic_id: "algebra".into(),
                    state: SelectionState::Partial
                },
                ParentSelection {
                    topic_id: "geometry".into(),
                    state: SelectionState::Unselected
                },
            ]
        );
    }

    #[test]
    fn clear_and_unknown_events() {
        let selector = selector();
        let selected = selector.apply(
            &TopicSelection::new(),
            &SelectionEvent::Select("algebra".into()),
        );
        let unchanged = selector.apply(&selected, &SelectionEvent::Select("nope".into()));
        assert_eq!(unchanged, selected);
        let cleared = selector.apply(&selected, &SelectionEvent::Clear);
        assert!(cleared.is_empty());
    }

    #[test]
    fn event_json_shape() {
        let event: SelectionEvent =
            serde_json::from_str(r#"{"action":"toggle","topicId":"algebra"}"#).unwrap();
        assert_eq!(event, SelectionEvent::Toggle("algebra".into()));
        let clear: SelectionEvent = serde_json::from_str(r#"{"action":"clear"}"#).unwrap();
        assert_eq!(clear, SelectionEvent::Clear);
    }
}
