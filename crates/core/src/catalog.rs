//! Static study taxonomy: subject → group → topic.
//!
//! The catalog is an immutable value handed to whoever needs it, so tests can
//! swap in a smaller taxonomy.

use std::collections::HashMap;

use crate::model::{Subject, TopicId};

/// A leaf topic with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEntry {
    pub id: TopicId,
    pub name: String,
}

/// A named group of topics inside a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicGroup {
    pub id: TopicId,
    pub name: String,
    pub topics: Vec<TopicEntry>,
}

impl TopicGroup {
    #[must_use]
    pub fn new(id: &str, name: &str, topics: &[(&str, &str)]) -> Self {
        Self {
            id: TopicId::new(id),
            name: name.to_string(),
            topics: topics
                .iter()
                .map(|(id, name)| TopicEntry {
                    id: TopicId::new(*id),
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectEntry {
    pub subject: Subject,
    pub groups: Vec<TopicGroup>,
}

/// Read-only taxonomy used for classification, discovery, and display names.
#[derive(Debug, Clone)]
pub struct Catalog {
    subjects: Vec<SubjectEntry>,
    index: HashMap<TopicId, Subject>,
}

impl Catalog {
    /// Build a catalog. Both group ids and topic ids classify to their subject;
    /// when an id is listed twice the first subject wins.
    #[must_use]
    pub fn new(subjects: Vec<SubjectEntry>) -> Self {
        let mut index = HashMap::new();
        for entry in &subjects {
            for group in &entry.groups {
                index.entry(group.id.clone()).or_insert(entry.subject);
                for topic in &group.topics {
                    index.entry(topic.id.clone()).or_insert(entry.subject);
                }
            }
        }
        Self { subjects, index }
    }

    /// The built-in medical exam taxonomy.
    #[must_use]
    pub fn medical() -> Self {
        Self::new(vec![
            SubjectEntry {
                subject: Subject::Anatomy,
                groups: vec![
                    TopicGroup::new(
                        "gross-anatomy",
                        "Gross Anatomy",
                        &[
                            ("upper-limb", "Upper Limb"),
                            ("lower-limb", "Lower Limb"),
                            ("thorax", "Thorax"),
                            ("abdomen", "Abdomen"),
                            ("head-neck", "Head & Neck"),
                            ("neuroanatomy", "Neuroanatomy"),
                        ],
                    ),
                    TopicGroup::new(
                        "embryology",
                        "Embryology",
                        &[
                            ("general-embryology", "General Embryology"),
                            ("system-embryology", "System Embryology"),
                        ],
                    ),
                    TopicGroup::new(
                        "histology",
                        "Histology",
                        &[
                            ("epithelial-tissue", "Epithelial Tissue"),
                            ("connective-tissue", "Connective Tissue"),
                            ("muscle-tissue", "Muscle Tissue"),
                            ("nervous-tissue", "Nervous Tissue"),
                            ("organ-histology", "Organ Histology"),
                        ],
                    ),
                ],
            },
            SubjectEntry {
                subject: Subject::Physiology,
                groups: vec![
                    TopicGroup::new(
                        "cardiovascular",
                        "Cardiovascular",
                        &[
                            ("cardiac-physiology", "Cardiac Physiology"),
                            ("vascular-physiology", "Vascular Physiology"),
                        ],
                    ),
                    TopicGroup::new(
                        "renal",
                        "Renal",
                        &[
                            ("glomerular-function", "Glomerular Function"),
                            ("tubular-function", "Tubular Function"),
                        ],
                    ),
                    TopicGroup::new(
                        "respiratory",
                        "Respiratory",
                        &[("ventilation", "Ventilation"), ("gas-exchange", "Gas Exchange")],
                    ),
                    TopicGroup::new(
                        "neurophysiology",
                        "Neurophysiology",
                        &[
                            ("cns-physiology", "CNS Physiology"),
                            ("pns-physiology", "PNS Physiology"),
                        ],
                    ),
                    TopicGroup::new(
                        "endocrine",
                        "Endocrine",
                        &[("hormones", "Hormones"), ("endocrine-organs", "Endocrine Organs")],
                    ),
                    TopicGroup::new(
                        "gastrointestinal",
                        "Gastrointestinal",
                        &[("digestion", "Digestion"), ("absorption", "Absorption")],
                    ),
                    TopicGroup::new(
                        "special-senses",
                        "Special Senses",
                        &[("special-senses", "Special Senses")],
                    ),
                ],
            },
            SubjectEntry {
                subject: Subject::Biochemistry,
                groups: vec![
                    TopicGroup::new(
                        "metabolism",
                        "Metabolism",
                        &[
                            ("carbohydrate-met", "Carbohydrate Metabolism"),
                            ("lipid-metabolism", "Lipid Metabolism"),
                            ("protein-metabolism", "Protein Metabolism"),
                            ("nucleic-acid-met", "Nucleic Acid Metabolism"),
                        ],
                    ),
                    TopicGroup::new(
                        "molecular-biology",
                        "Molecular Biology",
                        &[
                            ("dna-replication", "DNA Replication"),
                            ("transcription", "Transcription"),
                            ("translation", "Translation"),
                            ("genetic-regulation", "Genetic Regulation"),
                        ],
                    ),
                    TopicGroup::new(
                        "clinical-biochem",
                        "Clinical Biochemistry",
                        &[
                            ("lab-values", "Lab Values"),
                            ("disease-markers", "Disease Markers"),
                            ("metabolic-disorders", "Metabolic Disorders"),
                        ],
                    ),
                    TopicGroup::new(
                        "enzymology",
                        "Enzymology",
                        &[
                            ("enzyme-kinetics", "Enzyme Kinetics"),
                            ("enzyme-regulation", "Enzyme Regulation"),
                        ],
                    ),
                    TopicGroup::new(
                        "nutrition",
                        "Nutrition",
                        &[("vitamins-minerals", "Vitamins & Minerals")],
                    ),
                ],
            },
        ])
    }

    #[must_use]
    pub fn subjects(&self) -> &[SubjectEntry] {
        &self.subjects
    }

    /// Classify a topic or group id by exact membership. Unknown ids return `None`.
    #[must_use]
    pub fn subject_of(&self, topic: &str) -> Option<Subject> {
        self.index.get(topic).copied()
    }

    /// Leaf topics in catalog order.
    pub fn topics(&self) -> impl Iterator<Item = &TopicEntry> {
        self.subjects
            .iter()
            .flat_map(|entry| entry.groups.iter())
            .flat_map(|group| group.topics.iter())
    }

    #[must_use]
    pub fn contains_topic(&self, topic: &str) -> bool {
        self.topics().any(|entry| entry.id.as_str() == topic)
    }

    /// Catalog display name, falling back to title-casing the id.
    #[must_use]
    pub fn topic_name(&self, topic: &str) -> String {
        self.topics()
            .find(|entry| entry.id.as_str() == topic)
            .map_or_else(|| format_topic_name(topic), |entry| entry.name.clone())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::medical()
    }
}

/// `upper-limb` → `Upper Limb`.
#[must_use]
pub fn format_topic_name(topic: &str) -> String {
    topic
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hyphenated_ids_as_title_case() {
        assert_eq!(format_topic_name("upper-limb"), "Upper Limb");
        assert_eq!(format_topic_name("thorax"), "Thorax");
        assert_eq!(format_topic_name("cns-physiology"), "Cns Physiology");
    }

    #[test]
    fn classifies_by_exact_membership() {
        let catalog = Catalog::medical();
        assert_eq!(catalog.subject_of("upper-limb"), Some(Subject::Anatomy));
        assert_eq!(catalog.subject_of("embryology"), Some(Subject::Anatomy));
        assert_eq!(catalog.subject_of("gas-exchange"), Some(Subject::Physiology));
        assert_eq!(catalog.subject_of("hormones"), Some(Subject::Physiology));
        assert_eq!(catalog.subject_of("vitamins-minerals"), Some(Subject::Biochemistry));
    }

    #[test]
    fn substring_lookalikes_are_unknown() {
        let catalog = Catalog::medical();
        assert_eq!(catalog.subject_of("advanced-embryology"), None);
        assert_eq!(catalog.subject_of("exercise-physiology"), None);
    }

    #[test]
    fn topics_follow_catalog_order() {
        let catalog = Catalog::medical();
        let first: Vec<&str> = catalog.topics().take(3).map(|t| t.id.as_str()).collect();
        assert_eq!(first, ["upper-limb", "lower-limb", "thorax"]);
        assert!(!catalog.contains_topic("gross-anatomy"));
    }

    #[test]
    fn topic_name_prefers_catalog_entry() {
        let catalog = Catalog::medical();
        assert_eq!(catalog.topic_name("head-neck"), "Head & Neck");
        assert_eq!(catalog.topic_name("made-up-topic"), "Made Up Topic");
    }

    #[test]
    fn custom_catalog_can_be_small() {
        let catalog = Catalog::new(vec![SubjectEntry {
            subject: Subject::Physiology,
            groups: vec![TopicGroup::new("renal", "Renal", &[("gfr", "GFR")])],
        }]);
        assert_eq!(catalog.topics().count(), 1);
        assert_eq!(catalog.subject_of("gfr"), Some(Subject::Physiology));
        assert_eq!(catalog.subject_of("thorax"), None);
    }
}
