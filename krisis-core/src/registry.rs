//! Judge registry: registration, lookup, and iteration order
//!
//! The registry holds the configured set of judges. Registration order
//! is authoritative: the assessment report lists judgments in the
//! order judges were registered, regardless of completion order. There
//! is no removal operation; judges are immutable for the lifetime of
//! an assessment run.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::judge::{
    default_guidelines, EvaluatorModel, Guideline, GuidelineCatalog, GuidelineJudge,
    HeuristicJudge, Judge, RuleBasedJudge,
};

/// Error type for registry operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// A judge with this name already exists
    #[error("Judge '{0}' is already registered")]
    DuplicateJudge(String),

    /// Judge not found
    #[error("Judge '{0}' not found")]
    NotFound(String),
}

/// Registry of judges for assessment runs
///
/// Registration requires exclusive access (`&mut self`), so concurrent
/// duplicate registration cannot occur; reads during concurrent runs
/// need no locking.
pub struct JudgeRegistry {
    judges: Vec<Arc<dyn Judge>>,
    names: HashSet<String>,
}

impl JudgeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            judges: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Register a judge
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateJudge`] if a judge with the
    /// same name is already registered. The registry is unchanged in
    /// that case.
    pub fn register(&mut self, judge: Arc<dyn Judge>) -> Result<(), RegistryError> {
        let name = judge.name().to_string();
        if self.names.contains(&name) {
            return Err(RegistryError::DuplicateJudge(name));
        }
        self.names.insert(name);
        self.judges.push(judge);
        Ok(())
    }

    /// Register multiple judges, stopping at the first duplicate
    pub fn register_all(
        &mut self,
        judges: impl IntoIterator<Item = Arc<dyn Judge>>,
    ) -> Result<(), RegistryError> {
        for judge in judges {
            self.register(judge)?;
        }
        Ok(())
    }

    /// Judges in registration order
    pub fn list(&self) -> &[Arc<dyn Judge>] {
        &self.judges
    }

    /// Look up a judge by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Judge>> {
        self.judges.iter().find(|j| j.name() == name)
    }

    /// Judge names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.judges.iter().map(|j| j.name()).collect()
    }

    /// Number of registered judges
    pub fn len(&self) -> usize {
        self.judges.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.judges.is_empty()
    }

    /// Create a registry with the built-in heuristic judges and the
    /// standard hard requirements
    pub fn with_default_suite() -> Self {
        let mut registry = Self::new();
        // Built at construction time, so these names cannot collide
        registry
            .register_all([
                Arc::new(HeuristicJudge::relevance()) as Arc<dyn Judge>,
                Arc::new(HeuristicJudge::safety()),
                Arc::new(RuleBasedJudge::non_empty()),
                Arc::new(RuleBasedJudge::min_length_default()),
                Arc::new(RuleBasedJudge::no_placeholders()),
            ])
            .expect("default suite names are unique");
        registry
    }

    /// Create a registry with the default suite plus guideline judges
    /// backed by the given evaluator model
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateJudge`] if the catalog
    /// contains a name that collides with the default suite or with
    /// another catalog entry.
    pub fn with_guideline_suite(
        evaluator: Arc<dyn EvaluatorModel>,
        catalog: GuidelineCatalog,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::with_default_suite();
        for guideline in catalog {
            registry.register(Arc::new(GuidelineJudge::new(guideline, evaluator.clone())))?;
        }
        Ok(registry)
    }

    /// Create a registry with the default suite plus the standard
    /// guideline catalog
    pub fn with_standard_guidelines(
        evaluator: Arc<dyn EvaluatorModel>,
    ) -> Result<Self, RegistryError> {
        Self::with_guideline_suite(evaluator, default_guidelines())
    }
}

impl Default for JudgeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Trait objects carry no Debug bound, so print the registered names
impl fmt::Debug for JudgeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JudgeRegistry")
            .field("judges", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::judge::{EvaluatorVerdict, JudgeCategory};
    use crate::trace::TraceRecord;
    use async_trait::async_trait;

    struct StubEvaluator;

    #[async_trait]
    impl EvaluatorModel for StubEvaluator {
        async fn judge(
            &self,
            _guideline: &str,
            _trace: &TraceRecord,
        ) -> Result<EvaluatorVerdict> {
            Ok(EvaluatorVerdict::new(1.0, "stub"))
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    #[test]
    fn test_register_and_order() {
        let mut registry = JudgeRegistry::new();
        registry
            .register(Arc::new(RuleBasedJudge::non_empty()))
            .unwrap();
        registry
            .register(Arc::new(HeuristicJudge::relevance()))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.names(),
            vec!["non_empty_response", "relevance_to_query"]
        );
        assert!(registry.get("safety").is_none());
        assert_eq!(
            registry.get("non_empty_response").unwrap().category(),
            JudgeCategory::HardRequirement
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = JudgeRegistry::new();
        registry
            .register(Arc::new(RuleBasedJudge::non_empty()))
            .unwrap();

        let err = registry
            .register(Arc::new(RuleBasedJudge::non_empty()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateJudge(name) if name == "non_empty_response"));

        // Failed registration leaves the registry unchanged
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_default_suite() {
        let registry = JudgeRegistry::with_default_suite();
        assert_eq!(registry.len(), 5);
        assert!(registry.get("relevance_to_query").is_some());
        assert!(registry.get("no_placeholders").is_some());
    }

    #[test]
    fn test_standard_guideline_suite() {
        let registry = JudgeRegistry::with_standard_guidelines(Arc::new(StubEvaluator)).unwrap();
        // 5 defaults + 6 guidelines
        assert_eq!(registry.len(), 11);
        assert_eq!(
            registry.get("regulatory_compliance").unwrap().category(),
            JudgeCategory::CustomGuideline
        );
    }

    #[test]
    fn test_guideline_catalog_collision() {
        let catalog = vec![Guideline::new("safety", "collides with built-in")];
        let err =
            JudgeRegistry::with_guideline_suite(Arc::new(StubEvaluator), catalog).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateJudge(name) if name == "safety"));
    }

    #[test]
    fn test_debug_lists_registered_names() {
        let registry = JudgeRegistry::with_default_suite();
        let rendered = format!("{:?}", registry);
        assert!(rendered.contains("JudgeRegistry"));
        assert!(rendered.contains("relevance_to_query"));
        assert!(rendered.contains("no_placeholders"));
    }
}
