//! Relocation stage
//!
//! Plans where each leading qualifier group moves and records refusals as diagnostics.

use crate::classify::ClassifiedStream;
use crate::options::RewriteOptions;
use crate::relocate::{relocate, PlannedStream};
use crate::transforms::{Runnable, TransformError};

pub struct Relocation {
    options: RewriteOptions,
}

impl Relocation {
    pub fn new(options: RewriteOptions) -> Self {
        Self { options }
    }
}

impl Default for Relocation {
    fn default() -> Self {
        Self::new(RewriteOptions::default())
    }
}

impl Runnable<ClassifiedStream, PlannedStream> for Relocation {
    fn run(&self, input: ClassifiedStream) -> Result<PlannedStream, TransformError> {
        Ok(relocate(input, &self.options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::lexing::tokenize;

    #[test]
    fn test_plan_and_diagnostics() {
        let options = RewriteOptions::default();
        let classified = classify(tokenize("const int a;\nconst b = 1;\n"), &options);
        let planned = Relocation::new(options).run(classified).unwrap();
        assert_eq!(planned.plan.edits.len(), 1);
        assert_eq!(planned.diagnostics.len(), 1);
        assert_eq!(planned.diagnostics[0].code(), Some("implicit-int"));
    }
}
