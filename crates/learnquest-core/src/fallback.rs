//! Offline question bank used when the generator is unavailable.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::model::{QuizQuestion, TestType};

/// Fixed, deterministic questions per test type.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackBank {
    questions: BTreeMap<TestType, Vec<QuizQuestion>>,
}

impl FallbackBank {
    /// Build a bank from explicit entries. Every test type must be covered and
    /// every question must be valid.
    pub fn new(questions: BTreeMap<TestType, Vec<QuizQuestion>>) -> Result<Self, ConfigError> {
        for test_type in TestType::ALL {
            let Some(entries) = questions.get(&test_type).filter(|q| !q.is_empty()) else {
                return Err(ConfigError::EmptyFallbackBank(test_type));
            };
            for (index, question) in entries.iter().enumerate() {
                question
                    .validate(index)
                    .map_err(|source| ConfigError::InvalidFallbackQuestion { test_type, source })?;
            }
        }
        Ok(Self { questions })
    }

    /// The built-in bank, overridden per test type by `overrides`.
    pub fn with_overrides(
        overrides: BTreeMap<TestType, Vec<QuizQuestion>>,
    ) -> Result<Self, ConfigError> {
        let mut questions = builtin_questions();
        questions.extend(overrides);
        Self::new(questions)
    }

    /// Questions for a test type, in bank order.
    pub fn questions_for(&self, test_type: TestType) -> Vec<QuizQuestion> {
        self.questions.get(&test_type).cloned().unwrap_or_default()
    }

    pub fn len(&self, test_type: TestType) -> usize {
        self.questions.get(&test_type).map_or(0, Vec::len)
    }
}

impl Default for FallbackBank {
    fn default() -> Self {
        Self {
            questions: builtin_questions(),
        }
    }
}

fn q(prompt: &str, options: [&str; 4], correct: &str) -> QuizQuestion {
    QuizQuestion {
        prompt: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct.to_string(),
    }
}

fn builtin_questions() -> BTreeMap<TestType, Vec<QuizQuestion>> {
    let mut bank = BTreeMap::new();

    bank.insert(
        TestType::Math,
        vec![
            q("What is 12 x 8?", ["86", "96", "104", "92"], "96"),
            q("What is 3/4 written as a decimal?", ["0.34", "0.75", "0.7", "1.25"], "0.75"),
            q(
                "A rectangle is 6 cm long and 4 cm wide. What is its area?",
                ["10 cm²", "20 cm²", "24 cm²", "28 cm²"],
                "24 cm²",
            ),
        ],
    );

    bank.insert(
        TestType::Reading,
        vec![
            q(
                "\"The old lighthouse stood silent, its lamp dark for decades.\" What does 'decades' tell us?",
                ["It was dark briefly", "It was dark for many years", "It was never lit", "It was broken yesterday"],
                "It was dark for many years",
            ),
            q(
                "Which word is closest in meaning to 'enormous'?",
                ["tiny", "huge", "quiet", "ancient"],
                "huge",
            ),
            q(
                "The main idea of a paragraph is usually found in its…",
                ["topic sentence", "last word", "title page", "footnote"],
                "topic sentence",
            ),
        ],
    );

    bank.insert(
        TestType::Writing,
        vec![
            q(
                "Choose the correct sentence.",
                ["She don't like apples.", "She doesn't like apples.", "She not like apples.", "She doesn't likes apples."],
                "She doesn't like apples.",
            ),
            q("What is the plural of 'child'?", ["childs", "childes", "children", "childrens"], "children"),
            q(
                "Which word is an adverb in: 'He ran quickly home'?",
                ["He", "ran", "quickly", "home"],
                "quickly",
            ),
        ],
    );

    bank.insert(
        TestType::Internal1,
        vec![
            q(
                "Which gas do plants absorb from the air?",
                ["Oxygen", "Nitrogen", "Carbon dioxide", "Helium"],
                "Carbon dioxide",
            ),
            q("Water boils at what temperature at sea level?", ["50°C", "90°C", "100°C", "120°C"], "100°C"),
            q(
                "Which planet is closest to the Sun?",
                ["Venus", "Mercury", "Earth", "Mars"],
                "Mercury",
            ),
        ],
    );

    bank.insert(
        TestType::Internal2,
        vec![
            q(
                "Which is the longest river in the world?",
                ["Amazon", "Nile", "Yangtze", "Mississippi"],
                "Nile",
            ),
            q(
                "How many continents are there?",
                ["Five", "Six", "Seven", "Eight"],
                "Seven",
            ),
            q(
                "Which body makes the laws in a parliamentary democracy?",
                ["The courts", "The legislature", "The police", "The army"],
                "The legislature",
            ),
        ],
    );

    bank.insert(
        TestType::Assignment,
        vec![
            q("What comes next: 2, 4, 8, 16, …?", ["18", "24", "32", "64"], "32"),
            q(
                "If all cats are animals and Tom is a cat, then Tom is…",
                ["a dog", "an animal", "a plant", "unknown"],
                "an animal",
            ),
            q(
                "Which one does not belong: apple, banana, carrot, mango?",
                ["apple", "banana", "carrot", "mango"],
                "carrot",
            ),
        ],
    );

    bank
}
