//! Registry mapping file extensions to tree-sitter grammars.
//!
//! The registry is an explicitly constructed object rather than a
//! process-wide table: tests build small registries in isolation, and new
//! languages are added by registering another grammar, not by branching.

use std::collections::HashMap;
use std::path::Path;

use tree_sitter::Language;

/// In-memory registry of tree-sitter grammars keyed by file extension.
#[derive(Default, Clone)]
pub struct LanguageRegistry {
    by_extension: HashMap<String, Registration>,
}

#[derive(Clone)]
struct Registration {
    name: &'static str,
    language: Language,
}

impl LanguageRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every grammar this crate ships.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("bash", &["sh", "bash"], tree_sitter_bash::LANGUAGE.into());
        registry.register("c", &["c", "h"], tree_sitter_c::LANGUAGE.into());
        registry.register(
            "cpp",
            &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
            tree_sitter_cpp::LANGUAGE.into(),
        );
        registry.register("css", &["css"], tree_sitter_css::LANGUAGE.into());
        registry.register("go", &["go"], tree_sitter_go::LANGUAGE.into());
        registry.register("html", &["html", "htm"], tree_sitter_html::LANGUAGE.into());
        registry.register("java", &["java"], tree_sitter_java::LANGUAGE.into());
        registry.register(
            "javascript",
            &["js", "jsx", "mjs", "cjs"],
            tree_sitter_javascript::LANGUAGE.into(),
        );
        registry.register("python", &["py"], tree_sitter_python::LANGUAGE.into());
        registry.register("ruby", &["rb"], tree_sitter_ruby::LANGUAGE.into());
        registry.register("rust", &["rs"], tree_sitter_rust::LANGUAGE.into());
        registry.register(
            "typescript",
            &["ts"],
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        );
        registry.register(
            "tsx",
            &["tsx"],
            tree_sitter_typescript::LANGUAGE_TSX.into(),
        );
        registry
    }

    /// Register a grammar under the given extensions (without the dot).
    pub fn register(&mut self, name: &'static str, extensions: &[&str], language: Language) {
        for extension in extensions {
            self.by_extension.insert(
                extension.to_ascii_lowercase(),
                Registration {
                    name,
                    language: language.clone(),
                },
            );
        }
    }

    /// Resolve the grammar for a file path by its extension.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> Option<&Language> {
        self.lookup(path).map(|registration| &registration.language)
    }

    /// Name of the language registered for a file path, if any.
    #[must_use]
    pub fn language_name(&self, path: &Path) -> Option<&'static str> {
        self.lookup(path).map(|registration| registration.name)
    }

    /// Whether any grammar is registered for the file's extension.
    #[must_use]
    pub fn supports(&self, path: &Path) -> bool {
        self.lookup(path).is_some()
    }

    fn lookup(&self, path: &Path) -> Option<&Registration> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        self.by_extension.get(&extension)
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self
            .by_extension
            .values()
            .map(|registration| registration.name)
            .collect();
        names.sort_unstable();
        names.dedup();
        f.debug_struct("LanguageRegistry")
            .field("languages", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_common_extensions() {
        let registry = LanguageRegistry::builtin();
        for path in ["a.rs", "b.py", "c.go", "d.ts", "e.tsx", "f.cc", "g.sh"] {
            assert!(registry.supports(Path::new(path)), "missing {path}");
        }
    }

    #[test]
    fn unknown_extensions_do_not_resolve() {
        let registry = LanguageRegistry::builtin();
        assert!(!registry.supports(Path::new("notes.txt")));
        assert!(!registry.supports(Path::new("Makefile")));
        assert!(registry.resolve(Path::new("data.bin")).is_none());
    }

    #[test]
    fn extension_matching_ignores_case() {
        let registry = LanguageRegistry::builtin();
        assert!(registry.supports(Path::new("Main.RS")));
        assert_eq!(registry.language_name(Path::new("Main.RS")), Some("rust"));
    }

    #[test]
    fn custom_registration_is_isolated() {
        let mut registry = LanguageRegistry::new();
        assert!(!registry.supports(Path::new("script.py")));

        registry.register("python", &["py"], tree_sitter_python::LANGUAGE.into());
        assert!(registry.supports(Path::new("script.py")));
        assert!(!registry.supports(Path::new("main.rs")));
    }
}
