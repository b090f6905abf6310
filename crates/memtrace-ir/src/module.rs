//! Modules and external declarations.

use crate::function::Function;
use crate::layout::DataLayout;
use crate::types::Type;

/// An external function declaration. All declarations have external linkage;
/// the definition lives in another translation unit or in the runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    /// Symbol name, without the leading `@`.
    pub name: String,
    /// Parameter types.
    pub params: Vec<Type>,
    /// Return type.
    pub ret: Type,
}

impl FuncDecl {
    /// Create a declaration.
    pub fn new(name: &str, params: Vec<Type>, ret: Type) -> Self {
        Self {
            name: name.to_string(),
            params,
            ret,
        }
    }
}

/// A whole translation unit: data layout, external declarations, function
/// definitions. Passes mutate it in place.
#[derive(Clone, Debug, Default)]
pub struct Module {
    /// Target data layout.
    pub layout: DataLayout,
    /// External declarations, in declaration order.
    pub declarations: Vec<FuncDecl>,
    /// Function definitions, in definition order.
    pub functions: Vec<Function>,
}

impl Module {
    /// Create an empty module for the given target.
    pub const fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            declarations: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Append an external declaration.
    pub fn declare(&mut self, decl: FuncDecl) {
        self.declarations.push(decl);
    }

    /// Find a declaration by symbol name. First match wins when a name is
    /// declared more than once.
    pub fn declaration(&self, name: &str) -> Option<&FuncDecl> {
        self.declarations.iter().find(|decl| decl.name == name)
    }

    /// Count declarations carrying the given symbol name.
    pub fn declaration_count(&self, name: &str) -> usize {
        self.declarations
            .iter()
            .filter(|decl| decl.name == name)
            .count()
    }

    /// Append a function definition.
    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    /// Find a function definition by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}
