//! Assertion-snippet evaluator.
//!
//! Author-supplied assertion bodies are small expressions evaluated against
//! the sandbox scope — never against the host's own globals. The scope is
//! handed in explicitly: `document` queries run over the sandbox's rendered
//! DOM, `getComputedStyle` consults its stylesheet cascade, and nothing else
//! is reachable.
//!
//! Evaluation is a gas-limited tree walk, so a runaway snippet exhausts its
//! budget instead of hanging the host. Asynchronous assertions are modeled
//! as explicit thenable values (`resolveAfter(ms, expr)`, `never()`); the
//! grading engine awaits those under its own per-case timeout.
//!
//! Supported surface:
//! - literals: numbers, strings, `true`/`false`/`null`
//! - `document.querySelector(sel)`, `document.querySelectorAll(sel)`,
//!   `document.title`
//! - node `textContent`, `innerHTML`, `tagName`, `getAttribute(name)`
//! - node-list and string `length`, string `includes`/`trim`/
//!   `toLowerCase`/`toUpperCase`
//! - `getComputedStyle(node).<property>` (camelCase property names map to
//!   their kebab-case CSS form)
//! - `===`, `==`, `!==`, `!=`, `<`, `<=`, `>`, `>=`, `&&`, `||`, `!`, `+`

pub mod lexer;
pub mod parser;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::Sandbox;
use crate::stylesheet::Stylesheet;
use parser::{BinaryOp, Expr};

/// Errors raised while evaluating a snippet. Every variant is a per-test
/// diagnostic, never a run-fatal condition.
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("unexpected character `{0}` at byte {1}")]
    UnexpectedChar(char, usize),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    #[error("unknown member `{0}`")]
    UnknownMember(String),

    #[error("`{0}` is not callable")]
    NotCallable(String),

    #[error("`{function}` expects {expected} argument(s)")]
    WrongArity { function: String, expected: usize },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("cannot read `{0}` of null")]
    NullAccess(String),

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("expression nesting too deep")]
    NestingTooDeep,

    #[error("snippet too large")]
    SnippetTooLarge,

    #[error("evaluation budget exhausted")]
    GasExhausted,
}

/// Result of evaluating one snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The snippet settled synchronously.
    Settled(bool),
    /// The snippet produced a thenable. `delay_ms` of `None` never resolves;
    /// otherwise the value settles to `settled` after the delay.
    Pending {
        delay_ms: Option<u64>,
        settled: bool,
    },
}

/// Evaluate a snippet against a sandbox scope under a gas budget.
pub fn evaluate(snippet: &str, sandbox: &Sandbox, gas_limit: u64) -> Result<Outcome, EvalError> {
    let tokens = lexer::tokenize(snippet)?;
    let expr = parser::parse(&tokens)?;
    let dom = Html::parse_document(sandbox.document_html());
    let mut interp = Interp {
        dom: &dom,
        stylesheet: sandbox.stylesheet(),
        gas: 0,
        gas_limit,
        depth: 0,
    };
    match interp.eval(&expr)? {
        Value::Thenable { delay_ms, settled } => Ok(Outcome::Pending { delay_ms, settled }),
        value => Ok(Outcome::Settled(truthy(&value)?)),
    }
}

#[derive(Debug, Clone)]
enum Value<'a> {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Document,
    Node(ElementRef<'a>),
    NodeList(Vec<ElementRef<'a>>),
    Style(ElementRef<'a>),
    Thenable { delay_ms: Option<u64>, settled: bool },
}

impl Value<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Document => "document",
            Value::Node(_) => "node",
            Value::NodeList(_) => "node list",
            Value::Style(_) => "style",
            Value::Thenable { .. } => "thenable",
        }
    }
}

/// Cap on evaluation recursion. The parser already bounds grouping depth,
/// but a long left-leaning operator chain still builds a deep tree, so the
/// walk carries its own limit.
const MAX_EVAL_DEPTH: usize = 128;

struct Interp<'a> {
    dom: &'a Html,
    stylesheet: &'a Stylesheet,
    gas: u64,
    gas_limit: u64,
    depth: usize,
}

impl<'a> Interp<'a> {
    fn tick(&mut self) -> Result<(), EvalError> {
        self.gas += 1;
        if self.gas > self.gas_limit {
            Err(EvalError::GasExhausted)
        } else {
            Ok(())
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value<'a>, EvalError> {
        self.tick()?;
        self.depth += 1;
        if self.depth > MAX_EVAL_DEPTH {
            return Err(EvalError::NestingTooDeep);
        }
        let value = self.eval_inner(expr);
        self.depth -= 1;
        value
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value<'a>, EvalError> {
        match expr {
            Expr::Str(value) => Ok(Value::Str(value.clone())),
            Expr::Num(value) => Ok(Value::Num(*value)),
            Expr::Bool(value) => Ok(Value::Bool(*value)),
            Expr::Null => Ok(Value::Null),
            Expr::Ident(name) => match name.as_str() {
                "document" => Ok(Value::Document),
                other => Err(EvalError::UnknownIdentifier(other.to_string())),
            },
            Expr::Member { object, name } => {
                let object = self.eval(object)?;
                self.member(object, name)
            }
            Expr::Call { callee, args } => {
                let mut evaluated = Vec::with_capacity(args.len());
                match callee.as_ref() {
                    Expr::Member { object, name } => {
                        let object = self.eval(object)?;
                        for arg in args {
                            evaluated.push(self.eval(arg)?);
                        }
                        self.method(object, name, evaluated)
                    }
                    Expr::Ident(name) => {
                        for arg in args {
                            evaluated.push(self.eval(arg)?);
                        }
                        self.builtin(name, evaluated)
                    }
                    other => Err(EvalError::NotCallable(format!("{other:?}"))),
                }
            }
            Expr::Not(operand) => {
                let value = self.eval(operand)?;
                Ok(Value::Bool(!truthy(&value)?))
            }
            Expr::Binary { left, op, right } => self.binary(left, *op, right),
        }
    }

    fn binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<Value<'a>, EvalError> {
        // Short-circuit forms first.
        match op {
            BinaryOp::And => {
                let left = self.eval(left)?;
                if !truthy(&left)? {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval(right)?;
                return Ok(Value::Bool(truthy(&right)?));
            }
            BinaryOp::Or => {
                let left = self.eval(left)?;
                if truthy(&left)? {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval(right)?;
                return Ok(Value::Bool(truthy(&right)?));
            }
            _ => {}
        }

        let left = self.eval(left)?;
        let right = self.eval(right)?;
        match op {
            BinaryOp::Eq => Ok(Value::Bool(equals(&left, &right))),
            BinaryOp::Ne => Ok(Value::Bool(!equals(&left, &right))),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ordering = match (&left, &right) {
                    (Value::Num(a), Value::Num(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => {
                        return Err(EvalError::TypeMismatch(format!(
                            "cannot compare {} with {}",
                            left.kind(),
                            right.kind()
                        )));
                    }
                };
                let Some(ordering) = ordering else {
                    return Ok(Value::Bool(false));
                };
                let result = match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::Le => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                };
                Ok(Value::Bool(result))
            }
            BinaryOp::Add => match (&left, &right) {
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
                (Value::Str(_), _) | (_, Value::Str(_)) => {
                    Ok(Value::Str(format!("{}{}", stringify(&left)?, stringify(&right)?)))
                }
                _ => Err(EvalError::TypeMismatch(format!(
                    "cannot add {} and {}",
                    left.kind(),
                    right.kind()
                ))),
            },
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn member(&mut self, object: Value<'a>, name: &str) -> Result<Value<'a>, EvalError> {
        match (object, name) {
            (Value::Null, name) => Err(EvalError::NullAccess(name.to_string())),
            (Value::Document, "title") => {
                let selector = Selector::parse("title").expect("static selector");
                let title = self
                    .dom
                    .select(&selector)
                    .next()
                    .map(|el| el.text().collect::<String>())
                    .unwrap_or_default();
                Ok(Value::Str(title))
            }
            (Value::Node(el), "textContent") => Ok(Value::Str(el.text().collect())),
            (Value::Node(el), "innerHTML") => Ok(Value::Str(el.inner_html())),
            (Value::Node(el), "tagName") => {
                Ok(Value::Str(el.value().name().to_ascii_uppercase()))
            }
            (Value::NodeList(nodes), "length") => Ok(Value::Num(nodes.len() as f64)),
            (Value::Str(s), "length") => Ok(Value::Num(s.chars().count() as f64)),
            (Value::Style(el), property) => {
                let value = self
                    .stylesheet
                    .computed_of(self.dom, el, &kebab_case(property))
                    .unwrap_or_default();
                Ok(Value::Str(value))
            }
            (_, name) => Err(EvalError::UnknownMember(name.to_string())),
        }
    }

    fn method(
        &mut self,
        object: Value<'a>,
        name: &str,
        args: Vec<Value<'a>>,
    ) -> Result<Value<'a>, EvalError> {
        match (object, name) {
            (Value::Null, name) => Err(EvalError::NullAccess(name.to_string())),
            (Value::Document, "querySelector") => {
                let selector = self.selector_arg("querySelector", &args)?;
                Ok(self
                    .dom
                    .select(&selector)
                    .next()
                    .map(Value::Node)
                    .unwrap_or(Value::Null))
            }
            (Value::Document, "querySelectorAll") => {
                let selector = self.selector_arg("querySelectorAll", &args)?;
                Ok(Value::NodeList(self.dom.select(&selector).collect()))
            }
            (Value::Node(el), "getAttribute") => {
                let [Value::Str(attr)] = args.as_slice() else {
                    return Err(EvalError::WrongArity {
                        function: "getAttribute".to_string(),
                        expected: 1,
                    });
                };
                Ok(el
                    .value()
                    .attr(attr)
                    .map(|v| Value::Str(v.to_string()))
                    .unwrap_or(Value::Null))
            }
            (Value::Str(s), "includes") => {
                let [Value::Str(needle)] = args.as_slice() else {
                    return Err(EvalError::WrongArity {
                        function: "includes".to_string(),
                        expected: 1,
                    });
                };
                Ok(Value::Bool(s.contains(needle.as_str())))
            }
            (Value::Str(s), "trim") => Ok(Value::Str(s.trim().to_string())),
            (Value::Str(s), "toLowerCase") => Ok(Value::Str(s.to_lowercase())),
            (Value::Str(s), "toUpperCase") => Ok(Value::Str(s.to_uppercase())),
            (_, name) => Err(EvalError::NotCallable(name.to_string())),
        }
    }

    fn builtin(&mut self, name: &str, args: Vec<Value<'a>>) -> Result<Value<'a>, EvalError> {
        match name {
            "getComputedStyle" => match args.as_slice() {
                [Value::Node(el)] => Ok(Value::Style(*el)),
                [Value::Null] => Err(EvalError::NullAccess("getComputedStyle".to_string())),
                _ => Err(EvalError::WrongArity {
                    function: "getComputedStyle".to_string(),
                    expected: 1,
                }),
            },
            "resolveAfter" => match args.as_slice() {
                [Value::Num(ms), value] => Ok(Value::Thenable {
                    delay_ms: Some(ms.max(0.0) as u64),
                    settled: truthy(value)?,
                }),
                _ => Err(EvalError::WrongArity {
                    function: "resolveAfter".to_string(),
                    expected: 2,
                }),
            },
            "never" => {
                if args.is_empty() {
                    Ok(Value::Thenable {
                        delay_ms: None,
                        settled: false,
                    })
                } else {
                    Err(EvalError::WrongArity {
                        function: "never".to_string(),
                        expected: 0,
                    })
                }
            }
            other => Err(EvalError::UnknownIdentifier(other.to_string())),
        }
    }

    fn selector_arg(&self, function: &str, args: &[Value<'a>]) -> Result<Selector, EvalError> {
        let [Value::Str(text)] = args else {
            return Err(EvalError::WrongArity {
                function: function.to_string(),
                expected: 1,
            });
        };
        Selector::parse(text).map_err(|_| EvalError::InvalidSelector(text.clone()))
    }
}

fn truthy(value: &Value<'_>) -> Result<bool, EvalError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Num(n) => Ok(*n != 0.0 && !n.is_nan()),
        Value::Str(s) => Ok(!s.is_empty()),
        Value::Document | Value::Node(_) | Value::NodeList(_) | Value::Style(_) => Ok(true),
        Value::Thenable { .. } => Err(EvalError::TypeMismatch(
            "a thenable can only be the whole assertion result".to_string(),
        )),
    }
}

fn equals(left: &Value<'_>, right: &Value<'_>) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Num(a), Value::Num(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Node(a), Value::Node(b)) => a.id() == b.id(),
        _ => false,
    }
}

fn stringify(value: &Value<'_>) -> Result<String, EvalError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Num(n) => {
            if n.fract() == 0.0 {
                Ok(format!("{}", *n as i64))
            } else {
                Ok(n.to_string())
            }
        }
        Value::Str(s) => Ok(s.clone()),
        other => Err(EvalError::TypeMismatch(format!(
            "cannot convert {} to a string",
            other.kind()
        ))),
    }
}

/// `backgroundColor` → `background-color`.
fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sandbox;

    const GAS: u64 = 10_000;

    fn sandbox(body: &str, css: &str) -> Sandbox {
        let markup = format!(
            "<html><head><title>Demo</title><style>{css}</style></head><body>{body}</body></html>"
        );
        Sandbox::new(&assembler::bridge::instrument(&markup)).unwrap()
    }

    fn eval(snippet: &str, sandbox: &Sandbox) -> Result<Outcome, EvalError> {
        evaluate(snippet, sandbox, GAS)
    }

    #[test]
    fn test_literals_and_operators() {
        let sb = sandbox("", "");
        assert_eq!(eval("1 + 1 === 2", &sb), Ok(Outcome::Settled(true)));
        assert_eq!(eval("'a' + 'b' === 'ab'", &sb), Ok(Outcome::Settled(true)));
        assert_eq!(eval("!(2 < 1) && true", &sb), Ok(Outcome::Settled(true)));
        assert_eq!(eval("null == null", &sb), Ok(Outcome::Settled(true)));
    }

    #[test]
    fn test_query_selector_presence() {
        let sb = sandbox("<nav><ul><li>1</li></ul></nav>", "");
        assert_eq!(
            eval("document.querySelector('nav ul') !== null", &sb),
            Ok(Outcome::Settled(true))
        );
        assert_eq!(
            eval("document.querySelector('.missing') !== null", &sb),
            Ok(Outcome::Settled(false))
        );
    }

    #[test]
    fn test_text_content_and_includes() {
        let sb = sandbox("<h1 id=\"t\">Hello World</h1>", "");
        assert_eq!(
            eval("document.querySelector('#t').textContent.includes('World')", &sb),
            Ok(Outcome::Settled(true))
        );
        assert_eq!(
            eval("document.querySelector('#t').textContent === 'Hello World'", &sb),
            Ok(Outcome::Settled(true))
        );
    }

    #[test]
    fn test_query_selector_all_length() {
        let sb = sandbox("<ul><li>a</li><li>b</li><li>c</li></ul>", "");
        assert_eq!(
            eval("document.querySelectorAll('li').length >= 3", &sb),
            Ok(Outcome::Settled(true))
        );
    }

    #[test]
    fn test_document_title() {
        let sb = sandbox("", "");
        assert_eq!(
            eval("document.title === 'Demo'", &sb),
            Ok(Outcome::Settled(true))
        );
    }

    #[test]
    fn test_get_attribute() {
        let sb = sandbox("<a id=\"l\" href=\"/about.html\">go</a>", "");
        assert_eq!(
            eval("document.querySelector('#l').getAttribute('href') === '/about.html'", &sb),
            Ok(Outcome::Settled(true))
        );
        assert_eq!(
            eval("document.querySelector('#l').getAttribute('rel') === null", &sb),
            Ok(Outcome::Settled(true))
        );
    }

    #[test]
    fn test_computed_style_builtin() {
        let sb = sandbox(
            "<div class=\"gallery\"></div>",
            ".gallery { display: flex; background-color: rgb(0, 0, 0); }",
        );
        assert_eq!(
            eval(
                "getComputedStyle(document.querySelector('.gallery')).display === 'flex'",
                &sb
            ),
            Ok(Outcome::Settled(true))
        );
        // camelCase property names map onto the CSS form.
        assert_eq!(
            eval(
                "getComputedStyle(document.querySelector('.gallery')).backgroundColor === 'rgb(0, 0, 0)'",
                &sb
            ),
            Ok(Outcome::Settled(true))
        );
    }

    #[test]
    fn test_null_access_is_diagnostic() {
        let sb = sandbox("", "");
        assert_eq!(
            eval("document.querySelector('.missing').textContent === 'x'", &sb),
            Err(EvalError::NullAccess("textContent".to_string()))
        );
    }

    #[test]
    fn test_unknown_identifier() {
        let sb = sandbox("", "");
        assert_eq!(
            eval("window.alert", &sb),
            Err(EvalError::UnknownIdentifier("window".to_string()))
        );
    }

    #[test]
    fn test_invalid_selector_is_diagnostic() {
        let sb = sandbox("", "");
        assert_eq!(
            eval("document.querySelector('::::') !== null", &sb),
            Err(EvalError::InvalidSelector("::::".to_string()))
        );
    }

    #[test]
    fn test_gas_exhaustion() {
        let sb = sandbox("", "");
        assert_eq!(
            evaluate("1 + 1 + 1 + 1 + 1 + 1 + 1 + 1", &sb, 3),
            Err(EvalError::GasExhausted)
        );
    }

    #[test]
    fn test_hostile_nesting_is_diagnostic_not_fatal() {
        let sb = sandbox("", "");
        let depth = 200_000;
        let snippet = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            sb.eval_snippet(&snippet, GAS),
            Err(EvalError::SnippetTooLarge)
        );
        // A long flat operator chain builds a deep left-leaning tree without
        // any deep parens; the walk carries its own limit.
        let chain = vec!["1"; 2_000].join(" + ");
        assert_eq!(
            sb.eval_snippet(&chain, u64::MAX),
            Err(EvalError::NestingTooDeep)
        );
    }

    #[test]
    fn test_thenables() {
        let sb = sandbox("", "");
        assert_eq!(
            eval("resolveAfter(50, true)", &sb),
            Ok(Outcome::Pending {
                delay_ms: Some(50),
                settled: true
            })
        );
        assert_eq!(
            eval("never()", &sb),
            Ok(Outcome::Pending {
                delay_ms: None,
                settled: false
            })
        );
        assert_eq!(
            eval("never() && true", &sb),
            Err(EvalError::TypeMismatch(
                "a thenable can only be the whole assertion result".to_string()
            ))
        );
    }
}
