//! Token definitions for the Solid lexer

mod precedence;


use logos::Logos;

pub use precedence::{Associativity, Precedence};

/// Solid tokens
///
/// Whitespace and `%` line comments are skipped by the generated lexer.
/// A lone [`Token::Quote`] is only produced when no closing quote follows;
/// [`crate::lexer::Lexer`] reports it as an unterminated string.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"%[^\n]*")]
pub enum Token {
    // ==================== Keywords ====================
    #[token("let")]
    KwLet,
    #[token("unfixed")]
    KwUnfixed,
    #[token("type")]
    KwType,
    #[token("if")]
    KwIf,
    #[token("then")]
    KwThen,
    #[token("else")]
    KwElse,
    #[token("mutable")]
    KwMutable,

    // ==================== Type Keywords ====================
    #[token("void")]
    KwVoid,
    #[token("bool")]
    KwBool,
    #[token("int")]
    KwInt,
    #[token("float")]
    KwFloat,
    #[token("str")]
    KwStr,
    #[token("obj")]
    KwObj,
    #[token("unknown")]
    KwUnknown,
    #[token("never")]
    KwNever,

    // ==================== Literals ====================
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[regex(r"[0-9][0-9_]*")]
    Integer,
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9_]*)?")]
    Float,
    /// An unmatched `'`
    #[token("'")]
    Quote,
    /// A complete string literal including both quotes
    #[regex(r"'([^'\\]|\\(.|\n))*'")]
    String,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // ==================== Delimiters ====================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // ==================== Punctuation ====================
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("?:")]
    QuestionColon,
    #[token(".")]
    Dot,
    #[token("?.")]
    QuestionDot,
    #[token("!.")]
    BangDot,
    #[token("=")]
    Eq,
    #[token("->")]
    Arrow,

    // ==================== Operators ====================
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("!<")]
    NotLt,
    #[token("!>")]
    NotGt,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("&&")]
    AndAnd,
    #[token("!&")]
    Nand,
    #[token("||")]
    OrOr,
    #[token("!|")]
    Nor,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
}

impl Token {
    /// Check if this token is a keyword naming a built-in type
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            Token::KwVoid
                | Token::KwBool
                | Token::KwInt
                | Token::KwFloat
                | Token::KwStr
                | Token::KwObj
                | Token::KwUnknown
                | Token::KwNever
        )
    }

    /// Check if this token can start a literal (usable as an expression or a unit type)
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::Null
                | Token::True
                | Token::False
                | Token::Integer
                | Token::Float
                | Token::String
        )
    }

    /// Check if this token is a prefix (unary) operator
    pub fn is_prefix_operator(&self) -> bool {
        matches!(
            self,
            Token::Bang | Token::Question | Token::Plus | Token::Minus
        )
    }

    /// Check if this token introduces a member access
    pub fn is_access_operator(&self) -> bool {
        matches!(self, Token::Dot | Token::QuestionDot | Token::BangDot)
    }

    /// Human-readable description used in parse errors
    pub fn describe(&self) -> &'static str {
        match self {
            Token::KwLet => "'let'",
            Token::KwUnfixed => "'unfixed'",
            Token::KwType => "'type'",
            Token::KwIf => "'if'",
            Token::KwThen => "'then'",
            Token::KwElse => "'else'",
            Token::KwMutable => "'mutable'",
            Token::KwVoid
            | Token::KwBool
            | Token::KwInt
            | Token::KwFloat
            | Token::KwStr
            | Token::KwObj
            | Token::KwUnknown
            | Token::KwNever => "type keyword",
            Token::Null | Token::True | Token::False => "literal",
            Token::Integer => "integer",
            Token::Float => "float",
            Token::Quote | Token::String => "string",
            Token::Identifier => "identifier",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::Comma => "','",
            Token::Semicolon => "';'",
            Token::Colon => "':'",
            Token::QuestionColon => "'?:'",
            Token::Dot => "'.'",
            Token::QuestionDot => "'?.'",
            Token::BangDot => "'!.'",
            Token::Eq => "'='",
            Token::Arrow => "'->'",
            Token::Bang => "'!'",
            Token::Question => "'?'",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::Caret => "'^'",
            Token::Lt => "'<'",
            Token::Gt => "'>'",
            Token::LtEq => "'<='",
            Token::GtEq => "'>='",
            Token::NotLt => "'!<'",
            Token::NotGt => "'!>'",
            Token::EqEq => "'=='",
            Token::NotEq => "'!='",
            Token::EqEqEq => "'==='",
            Token::NotEqEq => "'!=='",
            Token::AndAnd => "'&&'",
            Token::Nand => "'!&'",
            Token::OrOr => "'||'",
            Token::Nor => "'!|'",
            Token::Amp => "'&'",
            Token::Pipe => "'|'",
        }
    }
}
