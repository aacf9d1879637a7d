use std::fmt;

/// Fully-qualified name of an exported symbol.
///
/// The managed runtime addresses native entry points as `package.Class.method`;
/// the last segment is the method, everything before it is the namespace.
///
/// # Examples
///
/// ```
/// use ecu_bridge_core::SymbolName;
///
/// let status = SymbolName::from_qualified_string("id.xms.ecucamera.bridge.NativeBridge.getEngineStatus");
/// assert_eq!(status.simple_name(), "getEngineStatus");
/// assert_eq!(status.namespace_string(), "id.xms.ecucamera.bridge.NativeBridge");
/// assert_eq!(
///     status.jni_export_name(),
///     "Java_id_xms_ecucamera_bridge_NativeBridge_getEngineStatus"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolName {
    /// Namespace path (e.g., ["id", "xms", "ecucamera", "bridge", "NativeBridge"])
    /// Empty for global symbols
    pub namespace: Vec<String>,
    /// Simple name (e.g., "getEngineStatus")
    pub name: String,
}

impl SymbolName {
    /// Create a new symbol name with namespace.
    pub fn new(name: impl Into<String>, namespace: Vec<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    /// Create a symbol name without a namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            namespace: Vec::new(),
            name: name.into(),
        }
    }

    /// Create from a dotted string (e.g., "a.b.Class.method").
    ///
    /// Empty segments are dropped, so ".a..b." is the same as "a.b".
    pub fn from_qualified_string(s: &str) -> Self {
        let mut parts: Vec<String> = s
            .split('.')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        match parts.pop() {
            Some(name) => Self {
                namespace: parts,
                name,
            },
            None => Self::global(""),
        }
    }

    /// Check if this symbol has no namespace.
    pub fn is_global(&self) -> bool {
        self.namespace.is_empty()
    }

    /// Get the simple (unqualified) name.
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Get the namespace path.
    pub fn namespace_path(&self) -> &[String] {
        &self.namespace
    }

    /// Get the namespace as a dotted string.
    pub fn namespace_string(&self) -> String {
        self.namespace.join(".")
    }

    /// Create a child name within this name.
    ///
    /// Example: `a.NativeBridge` + `getEngineStatus` = `a.NativeBridge.getEngineStatus`
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut namespace = self.namespace.clone();
        namespace.push(self.name.clone());
        Self {
            namespace,
            name: name.into(),
        }
    }

    /// Get the enclosing name (if any).
    pub fn parent(&self) -> Option<Self> {
        let (name, namespace) = self.namespace.split_last()?;
        Some(Self {
            namespace: namespace.to_vec(),
            name: name.clone(),
        })
    }

    /// The JNI short name the JVM looks up for this native method.
    ///
    /// Follows the JNI name mangling rules: segments are joined by `_`, and
    /// `_`, `;`, `[` and any character that is not an ASCII letter or digit are
    /// escaped.
    pub fn jni_export_name(&self) -> String {
        let mut out = String::from("Java");
        for segment in self.namespace.iter().chain(std::iter::once(&self.name)) {
            out.push('_');
            mangle_jni_segment(segment, &mut out);
        }
        out
    }
}

fn mangle_jni_segment(segment: &str, out: &mut String) {
    for ch in segment.chars() {
        match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' => out.push(ch),
            '/' => out.push('_'),
            '_' => out.push_str("_1"),
            ';' => out.push_str("_2"),
            '[' => out.push_str("_3"),
            other => {
                let mut units = [0u16; 2];
                for unit in other.encode_utf16(&mut units) {
                    out.push_str(&format!("_0{:04x}", unit));
                }
            }
        }
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace.join("."), self.name)
        }
    }
}

impl From<&str> for SymbolName {
    fn from(s: &str) -> Self {
        Self::from_qualified_string(s)
    }
}

impl From<String> for SymbolName {
    fn from(s: String) -> Self {
        Self::from_qualified_string(&s)
    }
}
