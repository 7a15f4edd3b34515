// Tool Probe Port
// Availability of the external programs a task drives

/// Tool probe trait
pub trait ToolProbe: Send + Sync {
    /// Whether `program` can be launched from this process
    fn is_available(&self, program: &str) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;

    /// Probe answering from a fixed set of installed programs
    pub struct StaticToolProbe {
        installed: Option<HashSet<String>>,
    }

    impl StaticToolProbe {
        /// Every program is reported as installed
        pub fn all_available() -> Self {
            Self { installed: None }
        }

        pub fn only<I, S>(programs: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                installed: Some(programs.into_iter().map(Into::into).collect()),
            }
        }
    }

    impl ToolProbe for StaticToolProbe {
        fn is_available(&self, program: &str) -> bool {
            match &self.installed {
                None => true,
                Some(set) => set.contains(program),
            }
        }
    }
}
