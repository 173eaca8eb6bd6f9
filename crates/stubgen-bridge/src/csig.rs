//! C function prototype parser.
//!
//! Covers what bridge declarations need: builtin and stdint types, `const`,
//! `struct` tags, typedef names, pointers, `(void)` lists and trailing `...`.
//! Function pointers, arrays and attributes are rejected.

use crate::error::{BridgeError, Result};

/// Width class of a builtin C integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntRank {
    Char,
    Short,
    Int,
    Long,
    LongLong,
}

/// A C type as written in a prototype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CType {
    Void,
    Bool,
    /// Builtin integer; `char` without a sign keyword is `unsigned: false`.
    Integer { rank: IntRank, unsigned: bool },
    /// `intN_t` / `uintN_t`.
    Fixed { bits: u8, unsigned: bool },
    SizeT,
    Float,
    Double,
    LongDouble,
    Pointer(Box<CType>),
    Const(Box<CType>),
    /// `struct tag`.
    Struct(String),
    /// A typedef name the parser cannot see through.
    Named(String),
}

impl CType {
    pub fn is_void(&self) -> bool {
        matches!(self.unqualified(), CType::Void)
    }

    /// The type with outer `const` qualifiers removed.
    pub fn unqualified(&self) -> &CType {
        match self {
            CType::Const(inner) => inner.unqualified(),
            other => other,
        }
    }

    fn int(rank: IntRank, unsigned: bool) -> Self {
        CType::Integer { rank, unsigned }
    }
}

impl std::fmt::Display for CType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CType::Void => write!(f, "void"),
            CType::Bool => write!(f, "_Bool"),
            CType::Integer { rank, unsigned } => {
                if *unsigned {
                    write!(f, "unsigned ")?;
                }
                let name = match rank {
                    IntRank::Char => "char",
                    IntRank::Short => "short",
                    IntRank::Int => "int",
                    IntRank::Long => "long",
                    IntRank::LongLong => "long long",
                };
                write!(f, "{name}")
            }
            CType::Fixed { bits, unsigned } => {
                write!(f, "{}int{bits}_t", if *unsigned { "u" } else { "" })
            }
            CType::SizeT => write!(f, "size_t"),
            CType::Float => write!(f, "float"),
            CType::Double => write!(f, "double"),
            CType::LongDouble => write!(f, "long double"),
            CType::Pointer(inner) => write!(f, "{inner}*"),
            CType::Const(inner) => write!(f, "const {inner}"),
            CType::Struct(tag) => write!(f, "struct {tag}"),
            CType::Named(name) => write!(f, "{name}"),
        }
    }
}

/// One parameter of a prototype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CParam {
    pub ty: CType,
    /// Empty when the prototype leaves the parameter unnamed.
    pub name: String,
}

/// A parsed C function prototype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSignature {
    pub return_type: CType,
    pub name: String,
    pub params: Vec<CParam>,
    pub variadic: bool,
}

impl CSignature {
    /// Parse a prototype such as `"double fma(double x, double y, double z)"`.
    ///
    /// A trailing `;` is tolerated.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim().trim_end_matches(';').trim_end();
        if input.is_empty() {
            return Err(invalid("empty signature"));
        }
        let open = input.find('(').ok_or_else(|| invalid("missing '('"))?;
        let inner = input[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| invalid("missing closing ')'"))?;
        if inner.contains('(') {
            return Err(invalid("function pointer parameters are not supported"));
        }

        let (return_type, name) = parse_declarator(&input[..open])?;
        if name.is_empty() {
            return Err(invalid("missing function name"));
        }
        let (params, variadic) = parse_param_list(inner)?;

        Ok(CSignature {
            return_type,
            name,
            params,
            variadic,
        })
    }

    /// Parameter names, with `arg{i}` filling in unnamed ones.
    pub fn param_names(&self) -> Vec<String> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.name.is_empty() {
                    format!("arg{i}")
                } else {
                    p.name.clone()
                }
            })
            .collect()
    }
}

impl std::fmt::Display for CSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        let mut parts: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                if p.name.is_empty() {
                    p.ty.to_string()
                } else {
                    format!("{} {}", p.ty, p.name)
                }
            })
            .collect();
        if self.variadic {
            parts.push("...".to_string());
        }
        if parts.is_empty() {
            write!(f, "void")?;
        } else {
            write!(f, "{}", parts.join(", "))?;
        }
        write!(f, ")")
    }
}

fn invalid(detail: impl Into<String>) -> BridgeError {
    BridgeError::InvalidCSignature {
        detail: detail.into(),
    }
}

/// Split on whitespace, with every `*` as its own token.
fn tokenize(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for word in s.split_whitespace() {
        let mut rest = word;
        while let Some(star) = rest.find('*') {
            if star > 0 {
                tokens.push(&rest[..star]);
            }
            tokens.push("*");
            rest = &rest[star + 1..];
        }
        if !rest.is_empty() {
            tokens.push(rest);
        }
    }
    tokens
}

/// Parse `type [*...] [name]`. The name is empty when absent.
fn parse_declarator(s: &str) -> Result<(CType, String)> {
    let tokens = tokenize(s);
    let mut cursor = Cursor { tokens: &tokens, pos: 0 };
    let mut ty = cursor.base_type()?;
    let mut name = String::new();

    while let Some(tok) = cursor.next() {
        match tok {
            "*" => ty = CType::Pointer(Box::new(ty)),
            // `char* const p`: constness of the pointer itself does not change the ABI.
            "const" | "restrict" | "volatile" => {}
            ident if name.is_empty() && is_identifier(ident) => name = ident.to_string(),
            other => return Err(invalid(format!("unexpected token '{other}'"))),
        }
    }
    Ok((ty, name))
}

fn parse_param_list(s: &str) -> Result<(Vec<CParam>, bool)> {
    let s = s.trim();
    if s.is_empty() || s == "void" {
        return Ok((Vec::new(), false));
    }

    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let mut params = Vec::with_capacity(parts.len());
    let mut variadic = false;
    for (i, part) in parts.iter().enumerate() {
        if *part == "..." {
            if i + 1 != parts.len() {
                return Err(invalid("'...' must be the last parameter"));
            }
            if params.is_empty() {
                return Err(invalid("'...' needs at least one named parameter"));
            }
            variadic = true;
            continue;
        }
        if part.contains('[') {
            return Err(invalid(format!("array parameter '{part}' is not supported")));
        }
        let (ty, name) = parse_declarator(part)?;
        if ty.is_void() {
            return Err(invalid("'void' can only appear alone in a parameter list"));
        }
        params.push(CParam { ty, name });
    }
    Ok((params, variadic))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Cursor<'a> {
    tokens: &'a [&'a str],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    fn eat(&mut self, word: &str) -> bool {
        if self.peek() == Some(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Base type with leading qualifiers, before any `*`.
    fn base_type(&mut self) -> Result<CType> {
        let mut is_const = false;
        loop {
            if self.eat("const") {
                is_const = true;
            } else if !(self.eat("volatile") || self.eat("extern") || self.eat("static")) {
                break;
            }
        }

        let ty = self.specifier()?;
        if self.eat("const") {
            is_const = true;
        }
        Ok(if is_const { CType::Const(Box::new(ty)) } else { ty })
    }

    fn specifier(&mut self) -> Result<CType> {
        let first = self.next().ok_or_else(|| invalid("expected a type"))?;

        if first == "struct" {
            let tag = self.next().ok_or_else(|| invalid("expected struct tag"))?;
            return Ok(CType::Struct(tag.to_string()));
        }

        if first == "unsigned" || first == "signed" {
            let unsigned = first == "unsigned";
            let rank = self.int_rank()?.unwrap_or(IntRank::Int);
            return Ok(CType::int(rank, unsigned));
        }

        if first == "long" && self.eat("double") {
            return Ok(CType::LongDouble);
        }

        if let Some(rank) = rank_of(first) {
            self.pos -= 1;
            let rank = self.int_rank()?.unwrap_or(rank);
            return Ok(CType::int(rank, false));
        }

        let ty = match first {
            "void" => CType::Void,
            "_Bool" | "bool" => CType::Bool,
            "float" => CType::Float,
            "double" => CType::Double,
            "size_t" => CType::SizeT,
            other => match fixed_width(other) {
                Some((bits, unsigned)) => CType::Fixed { bits, unsigned },
                None if is_identifier(other) => CType::Named(other.to_string()),
                None => return Err(invalid(format!("unknown type '{other}'"))),
            },
        };
        Ok(ty)
    }

    /// `char | short [int] | int | long [int] | long long [int]`, or `None` if absent.
    fn int_rank(&mut self) -> Result<Option<IntRank>> {
        let rank = match self.peek() {
            Some("char") => IntRank::Char,
            Some("short") => IntRank::Short,
            Some("int") => IntRank::Int,
            Some("long") => {
                self.pos += 1;
                let rank = if self.eat("long") { IntRank::LongLong } else { IntRank::Long };
                self.eat("int");
                return Ok(Some(rank));
            }
            _ => return Ok(None),
        };
        self.pos += 1;
        if rank == IntRank::Short {
            self.eat("int");
        }
        Ok(Some(rank))
    }
}

fn rank_of(word: &str) -> Option<IntRank> {
    match word {
        "char" => Some(IntRank::Char),
        "short" => Some(IntRank::Short),
        "int" => Some(IntRank::Int),
        "long" => Some(IntRank::Long),
        _ => None,
    }
}

fn fixed_width(word: &str) -> Option<(u8, bool)> {
    let (unsigned, rest) = match word.strip_prefix('u') {
        Some(rest) => (true, rest),
        None => (false, word),
    };
    let bits = rest.strip_prefix("int")?.strip_suffix("_t")?;
    match bits {
        "8" => Some((8, unsigned)),
        "16" => Some((16, unsigned)),
        "32" => Some((32, unsigned)),
        "64" => Some((64, unsigned)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_function() {
        let sig = CSignature::parse("double sin(double x)").unwrap();
        assert_eq!(sig.name, "sin");
        assert_eq!(sig.return_type, CType::Double);
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].ty, CType::Double);
        assert_eq!(sig.params[0].name, "x");
        assert!(!sig.variadic);
    }

    #[test]
    fn parse_pointer_return_and_size_t() {
        let sig = CSignature::parse("void* malloc(size_t size);").unwrap();
        assert_eq!(sig.name, "malloc");
        assert_eq!(sig.return_type, CType::Pointer(Box::new(CType::Void)));
        assert_eq!(sig.params[0].ty, CType::SizeT);
    }

    #[test]
    fn parse_const_char_pointer() {
        let sig = CSignature::parse("int puts(const char *s)").unwrap();
        assert_eq!(
            sig.params[0].ty,
            CType::Pointer(Box::new(CType::Const(Box::new(CType::int(IntRank::Char, false)))))
        );
    }

    #[test]
    fn parse_multiword_integers() {
        let sig = CSignature::parse(
            "unsigned long long f(long long a, unsigned b, short int c, signed char d, long int e)",
        )
        .unwrap();
        assert_eq!(sig.return_type, CType::int(IntRank::LongLong, true));
        assert_eq!(sig.params[0].ty, CType::int(IntRank::LongLong, false));
        assert_eq!(sig.params[1].ty, CType::int(IntRank::Int, true));
        assert_eq!(sig.params[2].ty, CType::int(IntRank::Short, false));
        assert_eq!(sig.params[3].ty, CType::int(IntRank::Char, false));
        assert_eq!(sig.params[4].ty, CType::int(IntRank::Long, false));
    }

    #[test]
    fn parse_stdint_types() {
        let sig = CSignature::parse("int32_t foo(uint8_t a, int64_t b)").unwrap();
        assert_eq!(sig.return_type, CType::Fixed { bits: 32, unsigned: false });
        assert_eq!(sig.params[0].ty, CType::Fixed { bits: 8, unsigned: true });
        assert_eq!(sig.params[1].ty, CType::Fixed { bits: 64, unsigned: false });
    }

    #[test]
    fn parse_long_double() {
        let sig = CSignature::parse("long double sinl(long double x)").unwrap();
        assert_eq!(sig.return_type, CType::LongDouble);
    }

    #[test]
    fn parse_struct_and_typedef_pointers() {
        let sig = CSignature::parse("struct tm* localtime(FILE* f, struct tm t)").unwrap();
        assert_eq!(sig.return_type, CType::Pointer(Box::new(CType::Struct("tm".into()))));
        assert_eq!(sig.params[0].ty, CType::Pointer(Box::new(CType::Named("FILE".into()))));
        assert_eq!(sig.params[1].ty, CType::Struct("tm".into()));
    }

    #[test]
    fn parse_variadic() {
        let sig = CSignature::parse("int printf(const char* fmt, ...)").unwrap();
        assert!(sig.variadic);
        assert_eq!(sig.params.len(), 1);
        assert!(CSignature::parse("int f(..., int x)").is_err());
        assert!(CSignature::parse("int f(...)").is_err());
    }

    #[test]
    fn parse_void_and_unnamed_params() {
        let sig = CSignature::parse("int getpid(void)").unwrap();
        assert!(sig.params.is_empty());
        let sig = CSignature::parse("float sqrtf(float)").unwrap();
        assert!(sig.params[0].name.is_empty());
        assert_eq!(sig.param_names(), vec!["arg0"]);
        assert!(CSignature::parse("int f(void, int)").is_err());
    }

    #[test]
    fn rejects_malformed() {
        assert!(CSignature::parse("").is_err());
        assert!(CSignature::parse("double sin double x").is_err());
        assert!(CSignature::parse("double sin(double x").is_err());
        assert!(CSignature::parse("int (void)").is_err());
        assert!(CSignature::parse("void qsort(void* b, int (*cmp)(void*, void*))").is_err());
        assert!(CSignature::parse("int sum(int xs[4])").is_err());
    }

    #[test]
    fn display_normalizes() {
        let sig = CSignature::parse("const char *getenv(const char *name)").unwrap();
        assert_eq!(sig.to_string(), "const char* getenv(const char* name)");
        let sig = CSignature::parse("int rand(void)").unwrap();
        assert_eq!(sig.to_string(), "int rand(void)");
    }
}
