use std::collections::HashSet;

/// Container wide settings
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Injection points setter injection never invokes, by name
    pub skipped_injection_points: HashSet<String>,
    /// Whether [ContainerBuilder::build](crate::builder::ContainerBuilder::build)
    /// checks the dependency graph
    pub validate_on_build: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            skipped_injection_points: HashSet::new(),
            validate_on_build: true,
        }
    }
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_injection_point(mut self, name: impl Into<String>) -> Self {
        self.skipped_injection_points.insert(name.into());
        self
    }

    pub fn validate_on_build(mut self, validate: bool) -> Self {
        self.validate_on_build = validate;
        self
    }
}
