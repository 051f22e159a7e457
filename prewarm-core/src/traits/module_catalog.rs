/// Static catalog of common questions per module id.
pub trait ModuleCatalog: Send + Sync {
    /// Common-question bundle for one module; empty for unknown modules.
    fn common_questions(&self, module_id: &str) -> Vec<String>;

    /// All module ids the catalog covers.
    fn module_ids(&self) -> Vec<String>;
}
