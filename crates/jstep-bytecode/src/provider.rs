//! Bytecode providers
//!
//! A provider turns a [`MethodId`] into the method's instruction sequence.
//! [`Suite`] reads JSON class files from a class-path directory;
//! [`MemoryProvider`] holds classes built in memory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::class::ClassFile;
use crate::error::{BytecodeError, Result};
use crate::instruction::Instruction;
use crate::method::MethodId;

/// File extension of class files on the class path
pub const CLASS_FILE_EXTENSION: &str = "json";

/// Resolves method identifiers to instruction sequences
pub trait BytecodeProvider {
    /// Resolve the body of `method`
    ///
    /// Fails with [`BytecodeError::ClassNotFound`] when the class is unknown
    /// and [`BytecodeError::MethodNotFound`] when the class lacks the method.
    fn resolve(&self, method: &MethodId) -> Result<Vec<Instruction>>;
}

impl<P: BytecodeProvider + ?Sized> BytecodeProvider for &P {
    fn resolve(&self, method: &MethodId) -> Result<Vec<Instruction>> {
        (**self).resolve(method)
    }
}

impl<P: BytecodeProvider + ?Sized> BytecodeProvider for Box<P> {
    fn resolve(&self, method: &MethodId) -> Result<Vec<Instruction>> {
        (**self).resolve(method)
    }
}

fn method_body(class: &ClassFile, method: &MethodId) -> Result<Vec<Instruction>> {
    class
        .method(&method.name, &method.descriptor)
        .map(|m| m.code.clone())
        .ok_or_else(|| BytecodeError::MethodNotFound(method.to_string()))
}

/// Class-path directory of JSON class files
///
/// Class `pkg.sub.C` is read from `<root>/pkg/sub/C.json`.
#[derive(Debug, Clone)]
pub struct Suite {
    root: PathBuf,
}

impl Suite {
    /// Create a suite rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Class-path root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the class file for a dotted class name
    pub fn class_path(&self, class: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(class.split('.'));
        path.set_extension(CLASS_FILE_EXTENSION);
        path
    }

    /// Read and decode a class file
    pub fn load_class(&self, class: &str) -> Result<ClassFile> {
        let path = self.class_path(class);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BytecodeError::ClassNotFound(class.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), "loading class file");
        serde_json::from_slice(&bytes).map_err(|source| BytecodeError::Malformed { path, source })
    }

    /// Write a class file under the root, creating package directories
    pub fn write_class(&self, class: &ClassFile) -> Result<PathBuf> {
        let path = self.class_path(&class.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(class).map_err(|source| BytecodeError::Malformed {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

impl BytecodeProvider for Suite {
    fn resolve(&self, method: &MethodId) -> Result<Vec<Instruction>> {
        let class = self.load_class(&method.class)?;
        method_body(&class, method)
    }
}

/// In-memory class store
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    classes: FxHashMap<String, ClassFile>,
}

impl MemoryProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class, replacing any class of the same name
    pub fn add_class(&mut self, class: ClassFile) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Add a class, builder style
    pub fn with_class(mut self, class: ClassFile) -> Self {
        self.add_class(class);
        self
    }

    /// Look up a class by dotted name
    pub fn class(&self, name: &str) -> Option<&ClassFile> {
        self.classes.get(name)
    }
}

impl BytecodeProvider for MemoryProvider {
    fn resolve(&self, method: &MethodId) -> Result<Vec<Instruction>> {
        let class = self
            .classes
            .get(&method.class)
            .ok_or_else(|| BytecodeError::ClassNotFound(method.class.clone()))?;
        method_body(class, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::MethodDef;
    use crate::constant::Literal;
    use crate::descriptor::TypeCode;

    fn five_class() -> ClassFile {
        ClassFile::builder("pkg.sub.C")
            .method(
                MethodDef::builder("five", "()I".parse().unwrap())
                    .instruction(Instruction::Push {
                        value: Literal::int(5),
                    })
                    .instruction(Instruction::Return {
                        ty: Some(TypeCode::Int),
                    })
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_class_path_layout() {
        let suite = Suite::new("/cp");
        assert_eq!(
            suite.class_path("pkg.sub.C"),
            PathBuf::from("/cp/pkg/sub/C.json")
        );
    }

    #[test]
    fn test_suite_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let suite = Suite::new(dir.path());
        suite.write_class(&five_class()).unwrap();

        let id: MethodId = "pkg.sub.C.five:()I".parse().unwrap();
        let code = suite.resolve(&id).unwrap();
        assert_eq!(code.len(), 2);
    }

    #[test]
    fn test_suite_missing_class_and_method() {
        let dir = tempfile::tempdir().unwrap();
        let suite = Suite::new(dir.path());
        suite.write_class(&five_class()).unwrap();

        let missing_class: MethodId = "pkg.Other.five:()I".parse().unwrap();
        assert!(matches!(
            suite.resolve(&missing_class),
            Err(BytecodeError::ClassNotFound(_))
        ));

        let missing_method: MethodId = "pkg.sub.C.six:()I".parse().unwrap();
        assert!(matches!(
            suite.resolve(&missing_method),
            Err(BytecodeError::MethodNotFound(_))
        ));
    }

    #[test]
    fn test_suite_malformed_class_file() {
        let dir = tempfile::tempdir().unwrap();
        let suite = Suite::new(dir.path());
        std::fs::write(dir.path().join("Broken.json"), b"{ not json").unwrap();

        let id: MethodId = "Broken.m:()V".parse().unwrap();
        assert!(matches!(
            suite.resolve(&id),
            Err(BytecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_memory_provider() {
        let provider = MemoryProvider::new().with_class(five_class());
        let id: MethodId = "pkg.sub.C.five:()I".parse().unwrap();
        assert_eq!(provider.resolve(&id).unwrap().len(), 2);
        assert!(provider.class("pkg.sub.C").is_some());
    }
}
