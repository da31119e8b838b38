//! Curated "related topics" suggestions keyed by the loaded topic.

pub type TopicFamily = (&'static str, &'static [&'static str]);

/// Keys are matched exactly and case-sensitively.
pub const CURATED_FAMILIES: &[TopicFamily] = &[
    (
        "Artificial Intelligence",
        &[
            "Machine Learning",
            "Deep Learning",
            "Neural Networks",
            "Computer Vision",
            "Natural Language Processing",
            "Robotics",
            "Reinforcement Learning",
            "Expert System",
            "Ethics of Artificial Intelligence",
        ],
    ),
    (
        "Quantum Computing",
        &[
            "Qubit",
            "Quantum Entanglement",
            "Quantum Superposition",
            "Shor's Algorithm",
            "Quantum Cryptography",
            "Quantum Supremacy",
        ],
    ),
    (
        "Climate Change",
        &[
            "Global Warming",
            "Greenhouse Effect",
            "Renewable Energy",
            "Carbon Footprint",
            "Paris Agreement",
            "Sea Level Rise",
        ],
    ),
    (
        "Space Exploration",
        &[
            "NASA",
            "International Space Station",
            "Apollo Program",
            "Mars Rover",
            "SpaceX",
            "James Webb Space Telescope",
        ],
    ),
    (
        "Renaissance",
        &[
            "Leonardo da Vinci",
            "Michelangelo",
            "Humanism",
            "Printing Press",
            "Florence",
            "Protestant Reformation",
        ],
    ),
];

pub const GENERIC_TOPICS: &[&str] = &[
    "Science",
    "Technology",
    "History",
    "Philosophy",
    "Mathematics",
];

#[derive(Debug, Clone, Copy)]
pub struct RelatedTopics {
    families: &'static [TopicFamily],
    fallback: &'static [&'static str],
}

impl Default for RelatedTopics {
    fn default() -> Self {
        Self::curated()
    }
}

impl RelatedTopics {
    pub fn new(families: &'static [TopicFamily], fallback: &'static [&'static str]) -> Self {
        Self { families, fallback }
    }

    pub fn curated() -> Self {
        Self::new(CURATED_FAMILIES, GENERIC_TOPICS)
    }

    /// Exact lookup; anything else, including a differently cased key, gets the fallback list.
    pub fn resolve(&self, topic: &str) -> &'static [&'static str] {
        self.families
            .iter()
            .find(|(key, _)| *key == topic)
            .map(|(_, related)| *related)
            .unwrap_or(self.fallback)
    }

    pub fn families(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.families.iter().map(|(key, _)| *key)
    }
}
