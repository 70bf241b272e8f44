//! Type extent scanning.
//!
//!     Given the index of the first token after a qualifier group's prefix, find the span
//!     of the base type: a builtin run, an elaborated or qualified name with balanced
//!     template arguments, or a `decltype(...)`. The scan only ever looks at significant
//!     tokens, never crosses the occurrence boundary, and gives up after a fixed number of
//!     significant tokens.

use crate::token::keywords;
use crate::token::{Token, TokenKind};
use serde::Serialize;

/// Inclusive token indices naming a base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeExtent {
    pub start_index: usize,
    pub end_index: usize,
}

/// Why no extent could be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    MissingType,
    ImplicitInt,
    UnbalancedTemplate,
    SplitAngle,
    ExtentTooLong,
}

impl Refusal {
    pub fn code(self) -> &'static str {
        match self {
            Refusal::MissingType => "missing-type",
            Refusal::ImplicitInt => "implicit-int",
            Refusal::UnbalancedTemplate => "unbalanced-template",
            Refusal::SplitAngle => "split-angle",
            Refusal::ExtentTooLong => "extent-too-long",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Refusal::MissingType => "no type follows the qualifier",
            Refusal::ImplicitInt => "declaration without a type (implicit int)",
            Refusal::UnbalancedTemplate => "template argument list is not closed",
            Refusal::SplitAngle => {
                "closing `>>` is shared with an enclosing template argument list"
            }
            Refusal::ExtentTooLong => "type is too long to scan",
        }
    }
}

/// Significant-token cursor bounded by a boundary index and a token budget.
pub struct ExtentScanner<'a> {
    tokens: &'a [Token],
    boundary: usize,
    budget: usize,
}

impl<'a> ExtentScanner<'a> {
    pub fn new(tokens: &'a [Token], boundary: usize, budget: usize) -> Self {
        Self {
            tokens,
            boundary: boundary.min(tokens.len()),
            budget,
        }
    }

    /// Next significant token index at or after `from`, without spending budget.
    pub fn peek(&self, from: usize) -> Option<usize> {
        (from..self.boundary).find(|&i| {
            let token = &self.tokens[i];
            !token.is_trivia() && token.kind != TokenKind::EndOfInput
        })
    }

    fn next(&mut self, from: usize) -> Result<Option<usize>, Refusal> {
        let next = self.peek(from);
        if next.is_some() {
            if self.budget == 0 {
                return Err(Refusal::ExtentTooLong);
            }
            self.budget -= 1;
        }
        Ok(next)
    }

    fn token(&self, index: usize) -> &'a Token {
        &self.tokens[index]
    }

    /// Scan the base type beginning at the significant token `start`.
    pub fn scan(&mut self, start: usize) -> Result<TypeExtent, Refusal> {
        let first = self.next(start)?.ok_or(Refusal::MissingType)?;
        let token = self.token(first);

        let end = if token.kind == TokenKind::Keyword && keywords::is_elaborated_prefix(&token.text)
        {
            let name = self.next(first + 1)?.ok_or(Refusal::MissingType)?;
            self.qualified_name(name)?.ok_or(Refusal::MissingType)?.0
        } else if keywords::is_builtin_type(&token.text) && token.is_word() {
            self.builtin_run(first)
        } else if token.is_keyword("decltype") {
            self.decltype(first)?
        } else {
            let (end, simple) = self.qualified_name(first)?.ok_or(Refusal::MissingType)?;
            if simple && self.implicit_int_follows(end) {
                return Err(Refusal::ImplicitInt);
            }
            end
        };

        Ok(TypeExtent {
            start_index: first,
            end_index: end,
        })
    }

    fn builtin_run(&self, first: usize) -> usize {
        let mut end = first;
        while let Some(next) = self.peek(end + 1) {
            let token = self.token(next);
            if token.is_word() && keywords::is_builtin_type(&token.text) {
                end = next;
            } else {
                break;
            }
        }
        end
    }

    fn decltype(&mut self, keyword: usize) -> Result<usize, Refusal> {
        let open = self.next(keyword + 1)?.ok_or(Refusal::MissingType)?;
        if !self.token(open).is_punct("(") {
            return Err(Refusal::MissingType);
        }
        let mut depth = 1usize;
        let mut at = open;
        while let Some(next) = self.next(at + 1)? {
            at = next;
            let token = self.token(at);
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    return Ok(at);
                }
            } else if token.is_punct(";") || token.is_punct("{") || token.is_punct("}") {
                break;
            }
        }
        Err(Refusal::MissingType)
    }

    /// `::`? name (<args>)? (`::` template? name (<args>)?)*
    ///
    /// Returns the last index of the name and whether it was a lone identifier, or `None`
    /// if no name starts at `first`.
    fn qualified_name(&mut self, first: usize) -> Result<Option<(usize, bool)>, Refusal> {
        let mut at = first;
        let mut end: Option<usize> = None;
        let mut simple = true;

        if self.token(at).is_punct("::") {
            simple = false;
            at = match self.next(at + 1)? {
                Some(next) => next,
                None => return Ok(None),
            };
        }

        loop {
            if self.token(at).is_keyword("template") {
                at = match self.next(at + 1)? {
                    Some(next) => next,
                    None => return Ok(end.map(|e| (e, false))),
                };
            }
            if self.token(at).kind != TokenKind::Identifier {
                // `Foo::*` is a pointer-to-member declarator, not part of the type
                return Ok(end.map(|e| (e, false)));
            }
            end = Some(at);

            let Some(next) = self.peek(at + 1) else { break };
            if self.token(next).is_punct("<") {
                self.next(at + 1)?;
                end = Some(self.template_arguments(next)?);
                simple = false;
            }

            let last = end.unwrap_or(at);
            match self.peek(last + 1) {
                Some(sep) if self.token(sep).is_punct("::") => {
                    self.next(last + 1)?;
                    simple = false;
                    at = match self.next(sep + 1)? {
                        Some(next) => next,
                        None => break,
                    };
                }
                _ => break,
            }
        }
        Ok(end.map(|e| (e, simple)))
    }

    /// Index of the `>` closing the list opened at `open`.
    fn template_arguments(&mut self, open: usize) -> Result<usize, Refusal> {
        let mut angles = 1usize;
        let mut parens = 0usize;
        let mut squares = 0usize;
        let mut at = open;

        while let Some(next) = self.next(at + 1)? {
            at = next;
            let token = self.token(at);
            if token.kind != TokenKind::Punctuation {
                continue;
            }
            match token.text.as_str() {
                ";" | "{" | "}" => return Err(Refusal::UnbalancedTemplate),
                "(" => parens += 1,
                "[" => squares += 1,
                ")" => match parens.checked_sub(1) {
                    Some(p) => parens = p,
                    None => return Err(Refusal::UnbalancedTemplate),
                },
                "]" => match squares.checked_sub(1) {
                    Some(s) => squares = s,
                    None => return Err(Refusal::UnbalancedTemplate),
                },
                _ if parens > 0 || squares > 0 => {}
                "<" => angles += 1,
                ">" => {
                    angles -= 1;
                    if angles == 0 {
                        return Ok(at);
                    }
                }
                ">>" => match angles {
                    1 => return Err(Refusal::SplitAngle),
                    2 => return Ok(at),
                    _ => angles -= 2,
                },
                _ => {}
            }
        }
        Err(Refusal::UnbalancedTemplate)
    }

    fn implicit_int_follows(&self, end: usize) -> bool {
        self.peek(end + 1)
            .map(|next| self.token(next))
            .is_some_and(|token| token.is_punct("=") || token.is_punct(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::tokenize;

    /// Scan the type starting at the first significant token; return its text.
    fn extent_text(source: &str) -> Result<String, Refusal> {
        extent_text_with_budget(source, 256)
    }

    fn extent_text_with_budget(source: &str, budget: usize) -> Result<String, Refusal> {
        let stream = tokenize(source);
        let mut scanner = ExtentScanner::new(&stream.tokens, stream.end_index(), budget);
        let extent = scanner.scan(0)?;
        Ok(stream.tokens[extent.start_index..=extent.end_index]
            .iter()
            .map(|t| t.text.as_str())
            .collect())
    }

    #[test]
    fn test_builtin_runs() {
        assert_eq!(extent_text("int x;").unwrap(), "int");
        assert_eq!(
            extent_text("unsigned long long n = 0;").unwrap(),
            "unsigned long long"
        );
        assert_eq!(extent_text("char* p;").unwrap(), "char");
        assert_eq!(extent_text("int[3] a;").unwrap(), "int");
    }

    #[test]
    fn test_qualified_names() {
        assert_eq!(extent_text("std::string& s").unwrap(), "std::string");
        assert_eq!(extent_text("::std::string s").unwrap(), "::std::string");
        assert_eq!(extent_text("T x").unwrap(), "T");
        assert_eq!(extent_text("Foo::Bar* p").unwrap(), "Foo::Bar");
    }

    #[test]
    fn test_template_arguments() {
        assert_eq!(extent_text("std::vector<int> v;").unwrap(), "std::vector<int>");
        assert_eq!(
            extent_text("std::map<K, std::vector<V>> m;").unwrap(),
            "std::map<K, std::vector<V>>"
        );
        assert_eq!(
            extent_text("std::array<int, (1 > 0) ? 2 : 3> a;").unwrap(),
            "std::array<int, (1 > 0) ? 2 : 3>"
        );
        assert_eq!(
            extent_text("Outer<int>::Inner<char>::type x;").unwrap(),
            "Outer<int>::Inner<char>::type"
        );
    }

    #[test]
    fn test_elaborated_names() {
        assert_eq!(extent_text("struct stat* st;").unwrap(), "struct stat");
        assert_eq!(
            extent_text("typename T::template rebind<U>::other x;").unwrap(),
            "typename T::template rebind<U>::other"
        );
    }

    #[test]
    fn test_decltype_is_atomic() {
        assert_eq!(extent_text("decltype(a + b)& r").unwrap(), "decltype(a + b)");
    }

    #[test]
    fn test_pointer_to_member_stops_before_scope() {
        assert_eq!(extent_text("Foo::* pm;").unwrap(), "Foo");
    }

    #[test]
    fn test_refusals() {
        assert_eq!(extent_text(");"), Err(Refusal::MissingType));
        assert_eq!(extent_text(""), Err(Refusal::MissingType));
        assert_eq!(extent_text("x = 5;"), Err(Refusal::ImplicitInt));
        assert_eq!(extent_text("x;"), Err(Refusal::ImplicitInt));
        assert_eq!(extent_text("Foo<int;"), Err(Refusal::UnbalancedTemplate));
        assert_eq!(extent_text("Bar<int>> x;"), Err(Refusal::SplitAngle));
        assert_eq!(extent_text("struct { int a; } s;"), Err(Refusal::MissingType));
    }

    #[test]
    fn test_lone_identifier_before_declarator_is_a_type() {
        assert_eq!(extent_text("T, int").unwrap(), "T");
        assert_eq!(extent_text("T)").unwrap(), "T");
    }

    #[test]
    fn test_budget() {
        let long = format!("Foo<{}> x;", vec!["int"; 200].join(", "));
        assert_eq!(extent_text_with_budget(&long, 256), Err(Refusal::ExtentTooLong));
        assert!(extent_text_with_budget("Foo<int, int> x;", 256).is_ok());
        assert_eq!(
            extent_text_with_budget("Foo<int, int> x;", 3),
            Err(Refusal::ExtentTooLong)
        );
    }

    #[test]
    fn test_boundary_is_respected() {
        let stream = tokenize("Foo<int> x;");
        // Boundary at the `<`: the list can never close
        let mut scanner = ExtentScanner::new(&stream.tokens, 1, 256);
        assert_eq!(scanner.scan(0), Ok(TypeExtent { start_index: 0, end_index: 0 }));
        let mut scanner = ExtentScanner::new(&stream.tokens, 3, 256);
        assert_eq!(scanner.scan(0), Err(Refusal::UnbalancedTemplate));
    }
}
