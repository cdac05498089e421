use std::{cmp::Ordering, collections::HashMap};

use serde::Serialize;

use crate::models::{Subject, Topic};

/// A top-level topic with its direct subtopics, ordered by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicNode {
    pub topic: Topic,
    pub subtopics: Vec<Topic>,
}

impl TopicNode {
    pub fn subtopic_ids(&self) -> impl Iterator<Item = &str> {
        self.subtopics.iter().map(|topic| topic.id.as_str())
    }
}

/// One subject with its top-level topics, ordered by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTopics {
    pub subject: Subject,
    pub topics: Vec<TopicNode>,
}

/// Rebuilds the subject → topic → subtopic tree from flat collections.
///
/// Topics whose subject is absent are ignored. A subtopic only appears
/// under a top-level topic of its own subject; cross-subject, dangling and
/// nested (subtopic of a subtopic) references are dropped.
pub fn build_topic_hierarchy(subjects: &[Subject], topics: &[Topic]) -> Vec<SubjectTopics> {
    let mut by_subject: HashMap<&str, Vec<&Topic>> = HashMap::new();
    for topic in topics {
        by_subject
            .entry(topic.subject_id.as_str())
            .or_default()
            .push(topic);
    }

    let mut ordered: Vec<&Subject> = subjects.iter().collect();
    ordered.sort_by(|a, b| by_name(&a.name, &a.id, &b.name, &b.id));

    ordered
        .into_iter()
        .map(|subject| {
            let members = by_subject
                .get(subject.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            SubjectTopics {
                subject: subject.clone(),
                topics: build_subject_topics(members),
            }
        })
        .collect()
}

/// The tree of a single subject, if the subject exists.
pub fn subject_tree(subjects: &[Subject], topics: &[Topic], subject_id: &str) -> Option<SubjectTopics> {
    let subject = subjects.iter().find(|subject| subject.id == subject_id)?;
    build_topic_hierarchy(std::slice::from_ref(subject), topics)
        .into_iter()
        .next()
}

fn build_subject_topics(members: &[&Topic]) -> Vec<TopicNode> {
    let (mut parents, candidates): (Vec<&Topic>, Vec<&Topic>) =
        members.iter().copied().partition(|topic| topic.is_top_level());
    parents.sort_by(|a, b| compare_topics(a, b));

    parents
        .into_iter()
        .map(|parent| {
            let mut subtopics: Vec<Topic> = candidates
                .iter()
                .filter(|candidate| candidate.parent_id.as_deref() == Some(parent.id.as_str()))
                .map(|candidate| (*candidate).clone())
                .collect();
            subtopics.sort_by(compare_topics);
            TopicNode {
                topic: parent.clone(),
                subtopics,
            }
        })
        .collect()
}

fn compare_topics(a: &Topic, b: &Topic) -> Ordering {
    by_name(&a.name, &a.id, &b.name, &b.id)
}

fn by_name(a_name: &str, a_id: &str, b_name: &str, b_id: &str) -> Ordering {
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then_with(|| a_name.cmp(b_name))
        .then_with(|| a_id.cmp(b_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str, name: &str) -> Subject {
        Subject {
            id: id.into(),
            name: name.into(),
        }
    }

    fn topic(id: &str, name: &str, subject_id: &str, parent_id: Option<&str>) -> Topic {
        Topic {
            id: id.into(),
            name: name.into(),
            subject_id: subject_id.into(),
            parent_id: parent_id.map(Into::into),
        }
    }

    fn names(topics: &[Topic]) -> Vec<&str> {
        topics.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn groups_subtopics_under_parents_sorted_by_name() {
        let subjects = vec![subject("s2", "Physics"), subject("s1", "Maths")];
        let topics = vec![
            topic("t2", "Geometry", "s1", None),
            topic("t1", "Algebra", "s1", None),
            topic("t4", "Quadratics", "s1", Some("t1")),
            topic("t3", "Linear equations", "s1", Some("t1")),
            topic("t5", "Mechanics", "s2", None),
        ];

        let tree = build_topic_hierarchy(&subjects, &topics);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].subject.name, "Maths");
        assert_eq!(tree[1].subject.name, "Physics");

        let maths = &tree[0].topics;
        assert_eq!(maths.len(), 2);
        assert_eq!(maths[0].topic.name, "Algebra");
        assert_eq!(names(&maths[0].subtopics), vec!["Linear equations", "Quadratics"]);
        assert_eq!(maths[1].topic.name, "Geometry");
        assert!(maths[1].subtopics.is_empty());
        assert_eq!(tree[1].topics[0].topic.name, "Mechanics");
    }

    #[test]
    fn drops_cross_subject_dangling_and_nested_subtopics() {
        let subjects = vec![subject("s1", "Maths"), subject("s2", "Physics")];
        let topics = vec![
            topic("t1", "Algebra", "s1", None),
            topic("t2", "Mechanics", "s2", None),
            // parent lives in another subject
            topic("t3", "Forces in algebra", "s1", Some("t2")),
            // parent does not exist
            topic("t4", "Ghost", "s1", Some("missing")),
            topic("t5", "Linear", "s1", Some("t1")),
            // parent is itself a subtopic
            topic("t6", "Deep", "s1", Some("t5")),
        ];

        let tree = build_topic_hierarchy(&subjects, &topics);
        let all_subtopics: Vec<&str> = tree
            .iter()
            .flat_map(|s| s.topics.iter())
            .flat_map(|node| node.subtopic_ids())
            .collect();

        assert_eq!(all_subtopics, vec!["t5"]);
    }

    #[test]
    fn ignores_topics_of_unknown_subjects_and_keeps_empty_subjects() {
        let subjects = vec![subject("s1", "Maths")];
        let topics = vec![topic("t1", "Optics", "s9", None)];

        let tree = build_topic_hierarchy(&subjects, &topics);

        assert_eq!(tree.len(), 1);
        assert!(tree[0].topics.is_empty());
    }

    #[test]
    fn subject_tree_selects_one_subject() {
        let subjects = vec![subject("s1", "Maths"), subject("s2", "Physics")];
        let topics = vec![
            topic("t1", "Algebra", "s1", None),
            topic("t2", "Mechanics", "s2", None),
        ];

        let physics = subject_tree(&subjects, &topics, "s2").unwrap();
        assert_eq!(physics.subject.id, "s2");
        assert_eq!(physics.topics.len(), 1);
        assert!(subject_tree(&subjects, &topics, "nope").is_none());
    }

    #[test]
    fn equal_names_order_by_id() {
        let subjects = vec![subject("s1", "Maths")];
        let topics = vec![
            topic("b", "Review", "s1", None),
            topic("a", "Review", "s1", None),
        ];

        let tree = build_topic_hierarchy(&subjects, &topics);
        let ids: Vec<&str> = tree[0].topics.iter().map(|n| n.topic.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
