//! Subject → topic → subtopic taxonomy.
//!
//! # Responsibility
//! - Rebuild the two-level topic tree from flat collections.
//! - Track topic selection over that tree as an explicit state machine.
//!
//! # Invariants
//! - Both operations are pure and total; malformed parent references drop
//!   the affected subtopic instead of failing.

pub mod selection;
pub mod tree;

pub use selection::{ParentSelection, SelectionEvent, SelectionState, TopicSelection, TopicSelector};
pub use tree::{SubjectTopics, TopicNode, build_topic_hierarchy, subject_tree};
