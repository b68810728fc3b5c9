//! Phantom regions: calls to designated functions whose execution is left out
//! of the trace. Only the value they return is visible to the caller.
//!
//! A function becomes phantom when its name matches one of the configured
//! patterns. Matching happens against the guest's function table when the
//! guest is registered, so an inlined function that matches a pattern is
//! rejected before anything runs.

use crate::errors::{ExecutionError, PhantomTargetError};
use crate::trace::{HostOp, TraceCheckpoint};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Entry of a guest's function table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionDesc {
    pub name: String,
    /// Inlined functions have no call boundary and can never be phantom.
    pub inlined: bool,
}

impl FunctionDesc {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inlined: false,
        }
    }

    pub fn inlined(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inlined: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PhantomRegistry {
    phantom_regex: Vec<Regex>,
    functions: HashMap<String, FunctionDesc>,
    phantom_functions: HashSet<String>,
}

impl PhantomRegistry {
    pub fn new(patterns: &[String]) -> Result<Self, regex::Error> {
        let phantom_regex = patterns
            .iter()
            .map(|s| Regex::new(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            phantom_regex,
            ..Default::default()
        })
    }

    fn is_marked(&self, name: &str) -> bool {
        self.phantom_regex.iter().any(|re| re.is_match(name))
    }

    /// Loads a guest's function table and designates the phantom functions.
    pub fn register(&mut self, functions: &[FunctionDesc]) -> Result<(), ExecutionError> {
        for func in functions {
            if self.is_marked(&func.name) {
                if func.inlined {
                    return Err(ExecutionError::InvalidPhantomTarget {
                        function: func.name.clone(),
                        reason: PhantomTargetError::Inlined,
                    });
                }
                log::debug!("phantom function: {}", func.name);
                self.phantom_functions.insert(func.name.clone());
            }
            self.functions.insert(func.name.clone(), func.clone());
        }
        Ok(())
    }

    pub fn is_phantom_function(&self, name: &str) -> bool {
        self.phantom_functions.contains(name)
    }

    /// Checks that a call site may open a phantom region.
    pub fn check_target(&self, name: &str) -> Result<(), ExecutionError> {
        let reason = match self.functions.get(name) {
            None => PhantomTargetError::Unknown,
            Some(func) if func.inlined => PhantomTargetError::Inlined,
            Some(_) if !self.is_phantom_function(name) => PhantomTargetError::NotDesignated,
            Some(_) => return Ok(()),
        };
        Err(ExecutionError::InvalidPhantomTarget {
            function: name.to_string(),
            reason,
        })
    }
}

#[derive(Debug, Clone)]
struct PhantomFrame {
    region: String,
    checkpoint: TraceCheckpoint,
}

/// Stack of the phantom regions currently executing.
#[derive(Debug, Clone, Default)]
pub struct PhantomSandbox {
    frames: Vec<PhantomFrame>,
}

impl PhantomSandbox {
    pub fn is_in_phantom_function(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self, region: &str, checkpoint: TraceCheckpoint) {
        self.frames.push(PhantomFrame {
            region: region.to_string(),
            checkpoint,
        })
    }

    pub fn pop_frame(&mut self) -> Option<TraceCheckpoint> {
        self.frames.pop().map(|frame| frame.checkpoint)
    }

    /// Trace position before the outermost active region was entered.
    pub fn entry_checkpoint(&self) -> Option<TraceCheckpoint> {
        self.frames.first().map(|frame| frame.checkpoint)
    }

    /// Rejects `op` when a region is active.
    pub fn check(&self, op: HostOp) -> Result<(), ExecutionError> {
        match self.frames.last() {
            Some(frame) => Err(ExecutionError::PhantomViolation {
                region: frame.region.clone(),
                op,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Trace;

    fn registry() -> PhantomRegistry {
        let mut registry = PhantomRegistry::new(&["^search.*".to_string()]).unwrap();
        registry
            .register(&[FunctionDesc::new("search"), FunctionDesc::new("zkmain")])
            .unwrap();
        registry
    }

    #[test]
    fn only_designated_functions_are_targets() {
        let registry = registry();
        assert!(registry.check_target("search").is_ok());
        assert_eq!(
            registry.check_target("zkmain"),
            Err(ExecutionError::InvalidPhantomTarget {
                function: "zkmain".to_string(),
                reason: PhantomTargetError::NotDesignated
            })
        );
        assert!(matches!(
            registry.check_target("missing"),
            Err(ExecutionError::InvalidPhantomTarget {
                reason: PhantomTargetError::Unknown,
                ..
            })
        ));
    }

    #[test]
    fn inlined_phantom_is_rejected_at_registration() {
        let mut registry = PhantomRegistry::new(&["search".to_string()]).unwrap();
        let err = registry
            .register(&[FunctionDesc::inlined("search_inline")])
            .unwrap_err();
        assert_eq!(
            err,
            ExecutionError::InvalidPhantomTarget {
                function: "search_inline".to_string(),
                reason: PhantomTargetError::Inlined
            }
        );
    }

    #[test]
    fn bad_pattern() {
        assert!(PhantomRegistry::new(&["(".to_string()]).is_err());
    }

    #[test]
    fn sandbox_rejects_ops_inside_frames() {
        let trace = Trace::new();
        let mut sandbox = PhantomSandbox::default();
        assert!(sandbox.check(HostOp::Require).is_ok());

        sandbox.push_frame("outer", trace.checkpoint());
        sandbox.push_frame("inner", trace.checkpoint());
        assert_eq!(sandbox.depth(), 2);
        assert_eq!(
            sandbox.check(HostOp::WriteContext),
            Err(ExecutionError::PhantomViolation {
                region: "inner".to_string(),
                op: HostOp::WriteContext
            })
        );

        sandbox.pop_frame();
        sandbox.pop_frame();
        assert!(!sandbox.is_in_phantom_function());
        assert!(sandbox.check(HostOp::WasmInput).is_ok());
    }
}
