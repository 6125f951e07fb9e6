//! Class and method bytecode representation

use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::instruction::Instruction;
use crate::method::MethodId;

/// A decoded class: its name and method bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassFile {
    /// Dotted class name
    pub name: String,
    /// Declared methods
    #[serde(default)]
    pub methods: Vec<MethodDef>,
}

impl ClassFile {
    /// Create a new class builder
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    /// Find a method by name and descriptor
    pub fn method(&self, name: &str, descriptor: &Descriptor) -> Option<&MethodDef> {
        self.methods
            .iter()
            .find(|m| m.name == name && &m.descriptor == descriptor)
    }

    /// Identifiers of every method in this class
    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.methods
            .iter()
            .map(|m| MethodId::new(self.name.clone(), m.name.clone(), m.descriptor.clone()))
    }
}

/// A method and its instruction sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Parameter and return types
    pub descriptor: Descriptor,
    /// Whether the method is static
    ///
    /// Informational only: receiver binding at a call site follows the
    /// invoke kind, and entry points bind arguments from local 0 either way.
    #[serde(rename = "static", default)]
    pub is_static: bool,
    /// Instructions
    pub code: Vec<Instruction>,
}

impl MethodDef {
    /// Create a new method builder
    pub fn builder(name: impl Into<String>, descriptor: Descriptor) -> MethodBuilder {
        MethodBuilder::new(name, descriptor)
    }
}

/// Builder for method definitions
#[derive(Debug)]
pub struct MethodBuilder {
    name: String,
    descriptor: Descriptor,
    is_static: bool,
    code: Vec<Instruction>,
}

impl MethodBuilder {
    /// Create a new method builder
    pub fn new(name: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
            is_static: true,
            code: Vec::new(),
        }
    }

    /// Set static flag
    pub fn is_static(mut self, value: bool) -> Self {
        self.is_static = value;
        self
    }

    /// Set all instructions
    pub fn instructions(mut self, instructions: Vec<Instruction>) -> Self {
        self.code = instructions;
        self
    }

    /// Add an instruction
    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.code.push(instruction);
        self
    }

    /// Build the method
    pub fn build(self) -> MethodDef {
        MethodDef {
            name: self.name,
            descriptor: self.descriptor,
            is_static: self.is_static,
            code: self.code,
        }
    }
}

/// Builder for class files
#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    methods: Vec<MethodDef>,
}

impl ClassBuilder {
    /// Create a new class builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Add a method
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Build the class
    pub fn build(self) -> ClassFile {
        ClassFile {
            name: self.name,
            methods: self.methods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::Literal;
    use crate::descriptor::TypeCode;

    #[test]
    fn test_static_flag_defaults_to_instance() {
        let json = r#"{"name": "m", "descriptor": "()V", "code": [{"opr": "return"}]}"#;
        let method: MethodDef = serde_json::from_str(json).unwrap();
        assert!(!method.is_static);

        let json = r#"{"name": "m", "descriptor": "()V", "static": true, "code": []}"#;
        let method: MethodDef = serde_json::from_str(json).unwrap();
        assert!(method.is_static);
    }

    #[test]
    fn test_class_builder() {
        let class = ClassFile::builder("pkg.C")
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
            .build();

        let five = class.method("five", &"()I".parse().unwrap()).unwrap();
        assert_eq!(five.code.len(), 2);
        assert!(five.is_static);
        assert!(class.method("five", &"()V".parse().unwrap()).is_none());

        let ids: Vec<String> = class.method_ids().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["pkg.C.five:()I"]);
    }

    #[test]
    fn test_class_file_json() {
        let json = r#"{
            "name": "pkg.C",
            "methods": [
                {"name": "id", "descriptor": "(I)I", "static": true,
                 "code": [{"opr": "load", "type": "I", "index": 0}, {"opr": "return", "type": "I"}]}
            ]
        }"#;
        let class: ClassFile = serde_json::from_str(json).unwrap();
        assert_eq!(class.methods[0].descriptor.arity(), 1);
        assert_eq!(class.methods[0].code.len(), 2);
    }
}
