// PATH lookup for the external programs a task drives

use jetsite_core::port::ToolProbe;
use tracing::debug;

/// Probe backed by the `which` crate
#[derive(Debug, Default, Clone)]
pub struct WhichToolProbe;

impl WhichToolProbe {
    pub fn new() -> Self {
        Self
    }
}

impl ToolProbe for WhichToolProbe {
    fn is_available(&self, program: &str) -> bool {
        match which::which(program) {
            Ok(path) => {
                debug!(program, path = %path.display(), "Tool found");
                true
            }
            Err(_) => false,
        }
    }
}
