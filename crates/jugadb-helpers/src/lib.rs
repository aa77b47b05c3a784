use std::hash::BuildHasherDefault;

/// `IndexMap` keyed on `ahash` rather than the default `RandomState` — table
/// directories and schema lookups are small and hot enough that the default
/// hasher's setup cost is visible.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<ahash::AHasher>>;
pub type IndexSet<V> = indexmap::IndexSet<V, BuildHasherDefault<ahash::AHasher>>;

/// Small builder-style helper: `Thing::default().config(|t| t.field = x)`.
pub trait Config: Sized {
    fn config(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }
}

impl<T> Config for T {}

/// Unifies `jugadb_core::LexError`/`ParseError`, `jugadb_types::CastError`,
/// and `jugadb_exec::ExecError` so the executor can surface any of them as
/// `ExecutionResult.message` without matching on which crate raised it.
pub trait Diagnostic: std::fmt::Display {
    /// Template code, e.g. `"SYE_E_CDTYPE"`. Fatal/internal variants with no
    /// fixed code return `"????"`, mirroring the teacher's `rule_code()`
    /// fallback for errors that predate the rule system.
    fn code(&self) -> &'static str;
    fn line(&self) -> u32;
    fn col(&self) -> u32;
}
