//! The module-pass trait and analysis preservation.

use memtrace_ir::Module;

/// Analyses a pass can invalidate or preserve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Analysis {
    /// Block structure and branch targets.
    ControlFlow,
    /// Dominator information derived from control flow.
    Dominance,
    /// Points-to and aliasing facts.
    Alias,
}

impl Analysis {
    /// Every analysis, in bit order.
    pub const ALL: [Self; 3] = [Self::ControlFlow, Self::Dominance, Self::Alias];

    const fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// Set of analyses a pass run left intact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreservedAnalyses {
    bits: u8,
}

impl PreservedAnalyses {
    /// Nothing preserved. The conservative default.
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    /// Every analysis preserved.
    pub const fn all() -> Self {
        Self {
            bits: (1 << Analysis::ALL.len()) - 1,
        }
    }

    /// Mark one analysis as preserved.
    #[must_use]
    pub const fn preserve(mut self, analysis: Analysis) -> Self {
        self.bits |= analysis.mask();
        self
    }

    /// Check if one analysis is preserved.
    pub const fn preserves(self, analysis: Analysis) -> bool {
        self.bits & analysis.mask() != 0
    }

    /// Check if every analysis is preserved.
    pub const fn preserves_all(self) -> bool {
        self.bits == Self::all().bits
    }
}

/// A whole-module transformation.
pub trait ModulePass {
    /// Rewrite the module in place. Returns true if anything changed.
    fn run(&mut self, module: &mut Module) -> bool;

    /// Analyses this pass leaves intact.
    fn preserved(&self) -> PreservedAnalyses {
        PreservedAnalyses::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserved_sets() {
        let none = PreservedAnalyses::none();
        assert!(!none.preserves(Analysis::ControlFlow));
        assert!(!none.preserves_all());

        let partial = PreservedAnalyses::none().preserve(Analysis::Dominance);
        assert!(partial.preserves(Analysis::Dominance));
        assert!(!partial.preserves(Analysis::Alias));
        assert!(!partial.preserves_all());

        let all = PreservedAnalyses::all();
        for analysis in Analysis::ALL {
            assert!(all.preserves(analysis));
        }
        assert!(all.preserves_all());
    }
}
