//! Keyword tables for C and C++.
//!
//!     The lexer produces a single `Word` lexeme for every identifier-shaped run; this module
//!     decides which of them are reserved words and, for the ones the classifier and the
//!     relocator care about, which role they play in a declaration.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// C++20 keywords plus the C11 underscore keywords.
static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alignas",
        "alignof",
        "and",
        "and_eq",
        "asm",
        "auto",
        "bitand",
        "bitor",
        "bool",
        "break",
        "case",
        "catch",
        "char",
        "char8_t",
        "char16_t",
        "char32_t",
        "class",
        "compl",
        "concept",
        "const",
        "consteval",
        "constexpr",
        "constinit",
        "const_cast",
        "continue",
        "co_await",
        "co_return",
        "co_yield",
        "decltype",
        "default",
        "delete",
        "do",
        "double",
        "dynamic_cast",
        "else",
        "enum",
        "explicit",
        "export",
        "extern",
        "false",
        "float",
        "for",
        "friend",
        "goto",
        "if",
        "inline",
        "int",
        "long",
        "mutable",
        "namespace",
        "new",
        "noexcept",
        "not",
        "not_eq",
        "nullptr",
        "operator",
        "or",
        "or_eq",
        "private",
        "protected",
        "public",
        "register",
        "reinterpret_cast",
        "requires",
        "restrict",
        "return",
        "short",
        "signed",
        "sizeof",
        "static",
        "static_assert",
        "static_cast",
        "struct",
        "switch",
        "template",
        "this",
        "thread_local",
        "throw",
        "true",
        "try",
        "typedef",
        "typeid",
        "typename",
        "union",
        "unsigned",
        "using",
        "virtual",
        "void",
        "volatile",
        "wchar_t",
        "while",
        "xor",
        "xor_eq",
        "_Alignas",
        "_Alignof",
        "_Atomic",
        "_Bool",
        "_Complex",
        "_Generic",
        "_Noreturn",
        "_Static_assert",
        "_Thread_local",
    ]
    .into_iter()
    .collect()
});

/// Words that can make up a fundamental type, alone or in runs like `unsigned long long`.
static BUILTIN_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "void", "bool", "char", "char8_t", "char16_t", "char32_t", "wchar_t", "short", "int",
        "long", "signed", "unsigned", "float", "double", "auto", "_Bool", "_Complex", "__int128",
    ]
    .into_iter()
    .collect()
});

/// Declaration specifiers that may sit between a leading qualifier and its type.
static DECL_SPECIFIERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "static",
        "extern",
        "mutable",
        "inline",
        "constexpr",
        "consteval",
        "constinit",
        "thread_local",
        "_Thread_local",
        "register",
        "typedef",
        "friend",
        "virtual",
        "explicit",
        "_Noreturn",
    ]
    .into_iter()
    .collect()
});

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

pub fn is_builtin_type(word: &str) -> bool {
    BUILTIN_TYPES.contains(word)
}

pub fn is_decl_specifier(word: &str) -> bool {
    DECL_SPECIFIERS.contains(word)
}

/// Keywords that introduce a type name: `struct S`, `typename T::type`, ...
pub fn is_elaborated_prefix(word: &str) -> bool {
    matches!(word, "struct" | "class" | "union" | "enum" | "typename")
}

pub fn is_cast(word: &str) -> bool {
    matches!(
        word,
        "static_cast" | "const_cast" | "reinterpret_cast" | "dynamic_cast"
    )
}

/// `const` and `volatile`, plus the qualifiers the relocator steps over but never moves.
pub fn is_cv_like(word: &str) -> bool {
    matches!(word, "const" | "volatile" | "restrict" | "_Atomic")
}
