use phf::phf_map;
use std::collections::HashMap;

/// Predefined symbols (compile-time perfect hash map).
pub static PREDEFINED: phf::Map<&'static str, u16> = phf_map! {
    "R0" => 0, "R1" => 1, "R2" => 2, "R3" => 3,
    "R4" => 4, "R5" => 5, "R6" => 6, "R7" => 7,
    "R8" => 8, "R9" => 9, "R10" => 10, "R11" => 11,
    "R12" => 12, "R13" => 13, "R14" => 14, "R15" => 15,
    "SP" => 0, "LCL" => 1, "ARG" => 2, "THIS" => 3, "THAT" => 4,
    "SCREEN" => 16384, "KBD" => 24576,
};

/// First RAM address handed out to user-defined variables.
pub const VARIABLE_BASE: u16 = 16;

pub struct SymbolTable {
    labels: HashMap<String, u16>,
    variables: HashMap<String, u16>,
    next_var_address: u16,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            labels: HashMap::with_capacity(32),
            variables: HashMap::with_capacity(32),
            next_var_address: VARIABLE_BASE,
        }
    }

    /// Records a label's ROM address during pass 1. Returns the label back
    /// on a duplicate so the caller can attach line context.
    pub fn add_label(&mut self, label: String, address: u16) -> Result<(), String> {
        if self.labels.contains_key(&label) || PREDEFINED.contains_key(label.as_str()) {
            return Err(label);
        }
        self.labels.insert(label, address);
        Ok(())
    }

    /// Resolves a symbol during pass 2, allocating the next free variable
    /// address on first use of an unknown name.
    pub fn get_or_allocate(&mut self, symbol: &str) -> u16 {
        if let Some(addr) = self.get(symbol) {
            return addr;
        }
        let addr = self.next_var_address;
        self.variables.insert(symbol.to_string(), addr);
        self.next_var_address += 1;
        addr
    }

    /// Read-only lookup across predefined symbols, labels and variables.
    pub fn get(&self, symbol: &str) -> Option<u16> {
        PREDEFINED
            .get(symbol)
            .or_else(|| self.labels.get(symbol))
            .or_else(|| self.variables.get(symbol))
            .copied()
    }

    /// True when the symbol names a label collected in pass 1.
    pub fn is_label(&self, symbol: &str) -> bool {
        self.labels.contains_key(symbol)
    }
}
