//! Method table
//!
//! Lazily resolves methods through a [`BytecodeProvider`] and caches the
//! result, so each method's instruction sequence is fetched at most once per
//! run and never changes afterwards.

use std::sync::Arc;

use jstep_bytecode::{BytecodeError, BytecodeProvider, Instruction, MethodId};
use rustc_hash::FxHashMap;

use crate::error::{VmError, VmResult};

/// Package prefixes treated as built-in when the provider has no class file
pub const DEFAULT_BUILTIN_PACKAGES: &[&str] = &["java.", "javax.", "jdk."];

/// A resolved method body
#[derive(Debug, Clone, PartialEq)]
pub enum MethodBody {
    /// Instructions to execute
    Bytecode(Arc<[Instruction]>),
    /// A platform method with no bytecode on the class path
    Builtin,
}

/// Cached method resolution
#[derive(Debug)]
pub struct MethodTable<P> {
    provider: P,
    cache: FxHashMap<MethodId, MethodBody>,
    builtin_packages: Vec<String>,
}

impl<P: BytecodeProvider> MethodTable<P> {
    /// Create a table over `provider` with the default built-in packages
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cache: FxHashMap::default(),
            builtin_packages: DEFAULT_BUILTIN_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    /// Replace the built-in package prefixes
    pub fn with_builtin_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtin_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `class` lives in a built-in package
    pub fn is_builtin_class(&self, class: &str) -> bool {
        self.builtin_packages.iter().any(|p| class.starts_with(p.as_str()))
    }

    /// Resolve a method, consulting the provider on first use
    ///
    /// A class the provider cannot find resolves to [`MethodBody::Builtin`]
    /// when it is in a built-in package; every other provider failure is
    /// [`VmError::UnresolvedMethod`].
    pub fn lookup(&mut self, method: &MethodId) -> VmResult<MethodBody> {
        if let Some(body) = self.cache.get(method) {
            return Ok(body.clone());
        }

        let body = match self.provider.resolve(method) {
            Ok(code) => {
                tracing::debug!(method = %method, len = code.len(), "resolved method");
                MethodBody::Bytecode(code.into())
            }
            Err(BytecodeError::ClassNotFound(_)) if self.is_builtin_class(&method.class) => {
                tracing::debug!(method = %method, "treating method as built-in");
                MethodBody::Builtin
            }
            Err(source) => {
                return Err(VmError::UnresolvedMethod {
                    method: method.to_string(),
                    source,
                });
            }
        };

        self.cache.insert(method.clone(), body.clone());
        Ok(body)
    }

    /// Resolve a method that must have bytecode
    pub fn code(&mut self, method: &MethodId) -> VmResult<Arc<[Instruction]>> {
        match self.lookup(method)? {
            MethodBody::Bytecode(code) => Ok(code),
            MethodBody::Builtin => Err(VmError::UnmodeledMethod(method.to_string())),
        }
    }

    /// Number of methods resolved so far
    pub fn resolved_count(&self) -> usize {
        self.cache.len()
    }

    /// Underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }
}
