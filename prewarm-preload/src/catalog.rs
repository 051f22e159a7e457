//! Built-in module catalog.

use prewarm_core::traits::ModuleCatalog;

const PROFESSOR: &[&str] = &[
    "How do I create a lesson?",
    "What materials can I use?",
    "How do I grade students?",
    "I need help with lesson planning",
];

const TI: &[&str] = &[
    "How do I fix technical problems?",
    "I need technical support",
    "How do I configure the system?",
    "Connectivity problems",
];

const RH: &[&str] = &[
    "How do I manage employees?",
    "I need help with documents",
    "How do I build reports?",
    "Hiring questions",
];

const ATENDIMENTO: &[&str] = &[
    "I need help",
    "How can I get assistance?",
    "What services are available?",
    "General information",
];

/// Fixed common-question bundles for the built-in modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticModuleCatalog;

impl StaticModuleCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleCatalog for StaticModuleCatalog {
    fn common_questions(&self, module_id: &str) -> Vec<String> {
        let questions: &[&str] = match module_id {
            "professor" => PROFESSOR,
            "ti" => TI,
            "rh" => RH,
            "atendimento" => ATENDIMENTO,
            _ => &[],
        };
        questions.iter().map(|q| q.to_string()).collect()
    }

    fn module_ids(&self) -> Vec<String> {
        ["professor", "ti", "rh", "atendimento"]
            .iter()
            .map(|id| id.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_modules_have_question_bundles() {
        let catalog = StaticModuleCatalog::new();
        for id in catalog.module_ids() {
            assert_eq!(catalog.common_questions(&id).len(), 4);
        }
    }

    #[test]
    fn unknown_module_is_empty() {
        let catalog = StaticModuleCatalog::new();
        assert!(catalog.common_questions("finance").is_empty());
    }
}
