//! Whole-program symbol tables for the Jack compiler.
//!
//! A `ProjectSymbolTable` holds one `ClassEntry` per class in the project;
//! each class owns its static/field variables and one `SubroutineEntry`
//! per subroutine, which owns the arguments and locals. Parent identity is
//! always the class-name key, never a pointer. Index assignment is a
//! monotonic counter per kind per scope, and lookup is subroutine-first so
//! locals shadow class-level names.

use std::collections::HashMap;

use crate::ast::{ReturnType, SubroutineKind, Type};
use crate::error::{CompileError, Result};
use crate::token::Span;

/// The kind of a variable, determining its VM segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Static,
    Field,
    Argument,
    Local,
}

impl VarKind {
    #[inline]
    pub fn segment(self) -> &'static str {
        match self {
            VarKind::Static => "static",
            VarKind::Field => "this",
            VarKind::Argument => "argument",
            VarKind::Local => "local",
        }
    }

    #[inline]
    pub fn is_class_level(self) -> bool {
        matches!(self, VarKind::Static | VarKind::Field)
    }
}

/// One declared variable with its resolved segment slot.
#[derive(Debug, Clone, PartialEq)]
pub struct VarSymbol {
    pub name: String,
    pub var_type: Type,
    pub kind: VarKind,
    pub index: u16,
}

impl VarSymbol {
    #[inline]
    pub fn segment(&self) -> &'static str {
        self.kind.segment()
    }
}

/// Symbol scope of one subroutine: arguments and locals.
#[derive(Debug)]
pub struct SubroutineEntry {
    pub kind: SubroutineKind,
    pub return_type: ReturnType,
    vars: HashMap<String, VarSymbol>,
    argument_count: u16,
    local_count: u16,
}

impl SubroutineEntry {
    pub fn new(kind: SubroutineKind, return_type: ReturnType) -> Self {
        Self {
            kind,
            return_type,
            vars: HashMap::new(),
            argument_count: 0,
            local_count: 0,
        }
    }

    /// Define an argument or local, assigning the next index of its kind.
    pub fn define(&mut self, name: &str, var_type: Type, kind: VarKind, span: &Span) -> Result<()> {
        debug_assert!(!kind.is_class_level());
        if self.vars.contains_key(name) {
            return Err(CompileError::DuplicateDefinition {
                name: name.to_string(),
                span: span.clone(),
            });
        }
        let index = match kind {
            VarKind::Argument => {
                let i = self.argument_count;
                self.argument_count += 1;
                i
            }
            _ => {
                let i = self.local_count;
                self.local_count += 1;
                i
            }
        };
        self.vars.insert(
            name.to_string(),
            VarSymbol {
                name: name.to_string(),
                var_type,
                kind,
                index,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&VarSymbol> {
        self.vars.get(name)
    }

    pub fn local_count(&self) -> u16 {
        self.local_count
    }

    pub fn argument_count(&self) -> u16 {
        self.argument_count
    }
}

/// Symbol scope of one class: statics, fields, and subroutines.
#[derive(Debug)]
pub struct ClassEntry {
    pub name: String,
    vars: HashMap<String, VarSymbol>,
    static_count: u16,
    field_count: u16,
    subroutines: HashMap<String, SubroutineEntry>,
}

impl ClassEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vars: HashMap::new(),
            static_count: 0,
            field_count: 0,
            subroutines: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: &str, var_type: Type, kind: VarKind, span: &Span) -> Result<()> {
        debug_assert!(kind.is_class_level());
        if self.vars.contains_key(name) {
            return Err(CompileError::DuplicateDefinition {
                name: name.to_string(),
                span: span.clone(),
            });
        }
        let index = match kind {
            VarKind::Static => {
                let i = self.static_count;
                self.static_count += 1;
                i
            }
            _ => {
                let i = self.field_count;
                self.field_count += 1;
                i
            }
        };
        self.vars.insert(
            name.to_string(),
            VarSymbol {
                name: name.to_string(),
                var_type,
                kind,
                index,
            },
        );
        Ok(())
    }

    pub fn add_subroutine(
        &mut self,
        name: &str,
        entry: SubroutineEntry,
        span: &Span,
    ) -> Result<()> {
        if self.subroutines.contains_key(name) {
            return Err(CompileError::DuplicateDefinition {
                name: name.to_string(),
                span: span.clone(),
            });
        }
        self.subroutines.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn var(&self, name: &str) -> Option<&VarSymbol> {
        self.vars.get(name)
    }

    pub fn subroutine(&self, name: &str) -> Option<&SubroutineEntry> {
        self.subroutines.get(name)
    }

    pub fn subroutine_mut(&mut self, name: &str) -> Option<&mut SubroutineEntry> {
        self.subroutines.get_mut(name)
    }

    /// Number of fields; a constructor allocates this many heap words.
    pub fn field_count(&self) -> u16 {
        self.field_count
    }

    pub fn static_count(&self) -> u16 {
        self.static_count
    }
}

/// All classes of one compilation run, keyed by class name.
#[derive(Debug, Default)]
pub struct ProjectSymbolTable {
    classes: HashMap<String, ClassEntry>,
}

impl ProjectSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, name: &str, span: &Span) -> Result<()> {
        if self.classes.contains_key(name) {
            return Err(CompileError::DuplicateClass {
                name: name.to_string(),
                span: span.clone(),
            });
        }
        self.classes.insert(name.to_string(), ClassEntry::new(name));
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(name)
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassEntry> {
        self.classes.get_mut(name)
    }

    /// Resolve a name inside a subroutine: subroutine scope first, then the
    /// enclosing class's static/field scope.
    pub fn lookup(&self, class: &str, subroutine: &str, name: &str) -> Option<&VarSymbol> {
        let entry = self.classes.get(class)?;
        entry
            .subroutine(subroutine)
            .and_then(|s| s.get(name))
            .or_else(|| entry.var(name))
    }
}
