//! Shell environment variable table (§4.5), grounded in the original
//! `DynamicEnvironmentVariable` / `StaticEnvironmentVariable<LENGTH>` split:
//! a variable is either growable or capped at a fixed byte capacity.

/// A single variable. Fixed-capacity variables truncate writes to
/// `capacity - 1` bytes, leaving room for the implied NUL terminator.
pub struct EnvironmentVariable {
    name: String,
    value: Vec<u8>,
    capacity: Option<usize>,
}

impl EnvironmentVariable {
    fn new_dynamic(name: impl Into<String>) -> Self {
        EnvironmentVariable { name: name.into(), value: Vec::new(), capacity: None }
    }

    fn new_fixed(name: impl Into<String>, capacity: usize) -> Self {
        EnvironmentVariable { name: name.into(), value: Vec::new(), capacity: Some(capacity) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn value_str(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }

    pub fn set(&mut self, bytes: &[u8]) {
        match self.capacity {
            None => self.value = bytes.to_vec(),
            Some(capacity) => {
                let max = capacity.saturating_sub(1);
                self.value = bytes[..bytes.len().min(max)].to_vec();
            }
        }
    }
}

/// Insertion-ordered variable table. Lookup by subscript lazily inserts a
/// fresh growable variable when the name is unknown (§4.5).
#[derive(Default)]
pub struct Environment {
    variables: Vec<EnvironmentVariable>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// Subscript access: returns the existing variable or inserts a fresh
    /// growable empty one.
    pub fn get_or_insert(&mut self, name: &str) -> &mut EnvironmentVariable {
        if self.find(name).is_none() {
            self.variables.push(EnvironmentVariable::new_dynamic(name));
        }
        let idx = self.find(name).unwrap();
        &mut self.variables[idx]
    }

    pub fn get(&self, name: &str) -> Option<&EnvironmentVariable> {
        self.find(name).map(|i| &self.variables[i])
    }

    /// Returns the existing variable if the name matches; otherwise
    /// allocates one of the requested variant (`capacity = Some(n)` for a
    /// fixed-size variable, `None` for growable) and inserts it.
    pub fn make(&mut self, name: &str, capacity: Option<usize>) -> &mut EnvironmentVariable {
        if self.find(name).is_none() {
            let variable = match capacity {
                Some(n) => EnvironmentVariable::new_fixed(name, n),
                None => EnvironmentVariable::new_dynamic(name),
            };
            self.variables.push(variable);
        }
        let idx = self.find(name).unwrap();
        &mut self.variables[idx]
    }

    /// Yields `(name, value)` pairs in insertion order.
    pub fn iterate(&self, mut f: impl FnMut(&str, &str)) {
        for variable in &self.variables {
            f(variable.name(), &variable.value_str());
        }
    }

    pub fn purge(&mut self, name: &str) {
        self.variables.retain(|v| v.name != name);
    }
}
