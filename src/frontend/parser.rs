//! # Parser
//!
//! Hand-written recursive descent over the token vector, one function per
//! grammar production. The parser fails on the first syntax error with
//! the source position attached; recovery is the caller's problem (the
//! driver just reports and exits).

use super::ast::*;
use super::lexer::{tokenize, SpannedToken, Token};
use super::ParseError;
use crate::vm::{Opcode, Type};

/// Parse a whole source file into a [`Program`].
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source)?;
    Parser {
        source,
        tokens,
        pos: 0,
    }
    .parse_program()
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek2(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Byte offset of the current token, or end of input.
    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.span.start)
            .unwrap_or(self.source.len())
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(self.source, self.offset(), message)
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {}, got {}", what, self.describe())))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        if let Some(Token::Ident(name)) = self.peek() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(format!("expected {}, got {}", what, self.describe())))
        }
    }

    fn describe(&self) -> String {
        match self.peek() {
            Some(tok) => format!("{:?}", tok),
            None => "end of input".to_string(),
        }
    }

    // program := "program" id ";" vars? func* "main" body "end"
    fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.expect(&Token::Program, "'program'")?;
        let name = self.expect_ident("program name")?;
        self.expect(&Token::Semicolon, "';'")?;

        let globals = if self.peek() == Some(&Token::Var) {
            self.parse_vars()?
        } else {
            Vec::new()
        };

        let mut functions = Vec::new();
        while self.peek() == Some(&Token::Void) {
            functions.push(self.parse_func()?);
        }

        self.expect(&Token::Main, "'main'")?;
        let main = self.parse_body()?;
        self.expect(&Token::End, "'end'")?;

        if self.peek().is_some() {
            return Err(self.error(format!("unexpected {} after 'end'", self.describe())));
        }

        Ok(Program {
            name,
            globals,
            functions,
            main,
        })
    }

    // vars := "var" (id ("," id)* ":" type ";")+
    fn parse_vars(&mut self) -> Result<Vec<VarDecl>, ParseError> {
        self.expect(&Token::Var, "'var'")?;
        let mut decls = Vec::new();
        loop {
            let mut names = vec![self.expect_ident("variable name")?];
            while self.peek() == Some(&Token::Comma) {
                self.advance();
                names.push(self.expect_ident("variable name")?);
            }
            self.expect(&Token::Colon, "':'")?;
            let ty = self.parse_type()?;
            self.expect(&Token::Semicolon, "';'")?;
            decls.extend(names.into_iter().map(|name| VarDecl { name, ty }));

            if !matches!(self.peek(), Some(Token::Ident(_))) {
                break;
            }
        }
        Ok(decls)
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        match self.peek() {
            Some(Token::Int) => {
                self.advance();
                Ok(Type::Int)
            }
            Some(Token::Float) => {
                self.advance();
                Ok(Type::Float)
            }
            _ => Err(self.error(format!("expected type, got {}", self.describe()))),
        }
    }

    // func := "void" id "(" params? ")" "[" vars? body "]" ";"
    fn parse_func(&mut self) -> Result<FuncDecl, ParseError> {
        self.expect(&Token::Void, "'void'")?;
        let name = self.expect_ident("function name")?;
        self.expect(&Token::LParen, "'('")?;

        let mut params = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            loop {
                let pname = self.expect_ident("parameter name")?;
                self.expect(&Token::Colon, "':'")?;
                let ty = self.parse_type()?;
                params.push(VarDecl { name: pname, ty });
                if self.peek() == Some(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')'")?;

        self.expect(&Token::LBracket, "'['")?;
        let locals = if self.peek() == Some(&Token::Var) {
            self.parse_vars()?
        } else {
            Vec::new()
        };
        let body = self.parse_body()?;
        self.expect(&Token::RBracket, "']'")?;
        self.expect(&Token::Semicolon, "';'")?;

        Ok(FuncDecl {
            name,
            params,
            locals,
            body,
        })
    }

    // body := "{" stmt* "}"
    fn parse_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while self.peek() != Some(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(self.error("unterminated block, expected '}'"));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.advance();
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Some(Token::If) => self.parse_if(),
            Some(Token::While) => self.parse_while(),
            Some(Token::Print) => self.parse_print(),
            Some(Token::Ident(_)) => {
                if self.peek2() == Some(&Token::LParen) {
                    self.parse_call()
                } else {
                    self.parse_assign()
                }
            }
            _ => Err(self.error(format!("expected statement, got {}", self.describe()))),
        }
    }

    // assign := id "=" expr ";"
    fn parse_assign(&mut self) -> Result<Stmt, ParseError> {
        let target = self.expect_ident("variable name")?;
        self.expect(&Token::Assign, "'='")?;
        let value = self.parse_expr()?;
        self.expect(&Token::Semicolon, "';'")?;
        Ok(Stmt::Assign { target, value })
    }

    // cond := "if" "(" expr ")" body ("else" body)? ";"
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::If, "'if'")?;
        self.expect(&Token::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(&Token::RParen, "')'")?;
        let then_block = self.parse_body()?;
        let else_block = if self.peek() == Some(&Token::Else) {
            self.advance();
            self.parse_body()?
        } else {
            Vec::new()
        };
        self.expect(&Token::Semicolon, "';'")?;
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    // loop := "while" "(" expr ")" "do" body ";"
    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::While, "'while'")?;
        self.expect(&Token::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(&Token::RParen, "')'")?;
        self.expect(&Token::Do, "'do'")?;
        let body = self.parse_body()?;
        self.expect(&Token::Semicolon, "';'")?;
        Ok(Stmt::While { cond, body })
    }

    // print := "print" "(" printItem ("," printItem)* ")" ";"
    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::Print, "'print'")?;
        self.expect(&Token::LParen, "'('")?;
        let mut items = vec![self.parse_print_item()?];
        while self.peek() == Some(&Token::Comma) {
            self.advance();
            items.push(self.parse_print_item()?);
        }
        self.expect(&Token::RParen, "')'")?;
        self.expect(&Token::Semicolon, "';'")?;
        Ok(Stmt::Print(items))
    }

    fn parse_print_item(&mut self) -> Result<PrintItem, ParseError> {
        if let Some(Token::CteString(s)) = self.peek() {
            let s = s.clone();
            self.advance();
            Ok(PrintItem::Str(s))
        } else {
            Ok(PrintItem::Expr(self.parse_expr()?))
        }
    }

    // f_call := id "(" (expr ("," expr)*)? ")" ";"
    fn parse_call(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect_ident("function name")?;
        self.expect(&Token::LParen, "'('")?;
        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            args.push(self.parse_expr()?);
            while self.peek() == Some(&Token::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(&Token::RParen, "')'")?;
        self.expect(&Token::Semicolon, "';'")?;
        Ok(Stmt::Call { name, args })
    }

    // expr := exp (("<"|">"|"!=") exp)?
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_exp()?;
        let op = match self.peek() {
            Some(Token::Less) => Opcode::Lt,
            Some(Token::Greater) => Opcode::Gt,
            Some(Token::NotEqual) => Opcode::Neq,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_exp()?;
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    // exp := term (("+"|"-") term)*
    fn parse_exp(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => Opcode::Plus,
                Some(Token::Minus) => Opcode::Minus,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    // term := factor (("*"|"/") factor)*
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => Opcode::Times,
                Some(Token::Slash) => Opcode::Divide,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    // factor := "(" expr ")" | ("-"|"+")? (id | cte)
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        if self.peek() == Some(&Token::LParen) {
            self.advance();
            let inner = self.parse_expr()?;
            self.expect(&Token::RParen, "')'")?;
            return Ok(inner);
        }

        let negated = match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                true
            }
            Some(Token::Plus) => {
                self.advance();
                false
            }
            _ => false,
        };

        match self.peek().cloned() {
            Some(Token::Ident(name)) => {
                self.advance();
                let expr = Expr::Ident(name);
                Ok(if negated {
                    Expr::Neg(Box::new(expr))
                } else {
                    expr
                })
            }
            // A sign on a literal folds right here; the generator only
            // ever sees the folded constant.
            Some(Token::CteInt(text)) => {
                self.advance();
                let value: i64 = text
                    .parse()
                    .map_err(|_| self.error(format!("integer literal '{}' out of range", text)))?;
                Ok(Expr::IntLit(if negated { -value } else { value }))
            }
            Some(Token::CteFloat(text)) => {
                self.advance();
                let value: f64 = text
                    .parse()
                    .map_err(|_| self.error(format!("malformed float literal '{}'", text)))?;
                Ok(Expr::FloatLit(if negated { -value } else { value }))
            }
            _ => Err(self.error(format!("expected operand, got {}", self.describe()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_full_program_shape() {
        let program = parse(
            "program patito;
             var x, y: int; z: float;
             void f(n: int) [ var m: int; { m = n; } ];
             main { x = 1; f(x); } end",
        )
        .unwrap();
        assert_eq!(program.name, "patito");
        assert_eq!(program.globals.len(), 3);
        assert_eq!(program.globals[2].ty, Type::Float);
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].params.len(), 1);
        assert_eq!(program.functions[0].locals.len(), 1);
        assert_eq!(program.main.len(), 2);
    }

    #[test]
    fn precedence_binds_times_before_plus() {
        let program = parse("program p; main { x = 2 + 3 * 4; } end").unwrap();
        let Stmt::Assign { value, .. } = &program.main[0] else {
            panic!("expected assignment");
        };
        let Expr::Binary { op, right, .. } = value else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, Opcode::Plus);
        assert!(matches!(
            **right,
            Expr::Binary {
                op: Opcode::Times,
                ..
            }
        ));
    }

    #[test]
    fn relational_operator_is_single_and_optional() {
        let program = parse("program p; main { x = a + 1 < b; } end").unwrap();
        let Stmt::Assign { value, .. } = &program.main[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(value, Expr::Binary { op: Opcode::Lt, .. }));
    }

    #[test]
    fn negative_literals_fold_in_the_parser() {
        let program = parse("program p; main { x = -5; y = -2.5; z = -w; } end").unwrap();
        let values: Vec<_> = program
            .main
            .iter()
            .map(|s| match s {
                Stmt::Assign { value, .. } => value.clone(),
                _ => panic!("expected assignment"),
            })
            .collect();
        assert_eq!(values[0], Expr::IntLit(-5));
        assert_eq!(values[1], Expr::FloatLit(-2.5));
        assert_eq!(values[2], Expr::Neg(Box::new(Expr::Ident("w".into()))));
    }

    #[test]
    fn call_statements_need_the_lookahead() {
        let program = parse("program p; main { f(1, 2.0); } end").unwrap();
        assert!(matches!(
            &program.main[0],
            Stmt::Call { name, args } if name == "f" && args.len() == 2
        ));
    }

    #[test]
    fn if_and_while_require_their_trailing_semicolon() {
        assert!(parse("program p; main { if (a > 1) { x = 1; } } end").is_err());
        assert!(parse("program p; main { if (a > 1) { x = 1; }; } end").is_ok());
        assert!(parse("program p; main { while (a > 1) do { x = 1; }; } end").is_ok());
    }

    #[test]
    fn print_mixes_strings_and_expressions() {
        let program = parse(r#"program p; main { print("x =", x + 1); } end"#).unwrap();
        let Stmt::Print(items) = &program.main[0] else {
            panic!("expected print");
        };
        assert_eq!(items[0], PrintItem::Str("x =".into()));
        assert!(matches!(items[1], PrintItem::Expr(_)));
    }

    #[test]
    fn syntax_errors_carry_a_position() {
        let err = parse("program p; main { x = ; } end").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.to_string().contains("expected operand"));
    }
}
