//! Bundled stack templates

/// Job stack template: task definition, log group and log stream
pub const TASK_DEFINITION: &str = include_str!("../templates/task-def.yml");

/// Failsafe stack template: deletes the job stack after a time to live
pub const STACK_TTL: &str = include_str!("../templates/stack-ttl.yml");

/// Templates submitted for each job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    /// Base template of the job stack, rendered per job
    pub main: String,
    /// Failsafe template, submitted as is
    pub failsafe: String,
}

impl Templates {
    /// Replaces the job stack template
    pub fn with_main(mut self, main: impl Into<String>) -> Self {
        self.main = main.into();
        self
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            main: TASK_DEFINITION.to_string(),
            failsafe: STACK_TTL.to_string(),
        }
    }
}
