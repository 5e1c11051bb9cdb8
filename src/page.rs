//! Page snapshot
//!
//! A read-only view of one rendered page: its DOM, its address, and the
//! object graph the page exposes on `window`. Strategies take a snapshot as
//! input instead of reaching for ambient page state, so they can be run
//! against fixtures.
//!
//! Page globals are recovered from the HTML in two ways:
//! - JSON data scripts: `<script id="__NEXT_DATA__" type="application/json">`
//! - script assignments: `window.X = {...}`, `var X = {...}`, `X = JSON.parse('...')`

use scraper::{Html, Selector};
use serde_json::{Map, Value};
use swc_common::{sync::Lrc, FileName, SourceMap};
use swc_ecma_ast::*;
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};
use tracing::{debug, warn};

/// Objects a script can hang globals off
const GLOBAL_OBJECTS: [&str; 3] = ["window", "self", "globalThis"];

pub struct PageSnapshot {
    url: String,
    document: Html,
    globals: Map<String, Value>,
}

impl PageSnapshot {
    /// Snapshot with no page globals
    pub fn new(document: Html, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            document,
            globals: Map::new(),
        }
    }

    /// Parse HTML and recover the globals its scripts expose
    pub fn from_html(html: &str, url: impl Into<String>) -> Self {
        let document = Html::parse_document(html);
        let mut globals = extract_json_scripts(&document);

        // Script assignments run after data scripts are in place
        for (name, value) in extract_script_globals(&document) {
            globals.insert(name, value);
        }

        debug!(globals = globals.len(), "page snapshot parsed");

        Self {
            url: url.into(),
            document,
            globals,
        }
    }

    /// Set (or replace) a page global
    pub fn with_global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.globals.insert(name.into(), value);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Trimmed text of the first element matching `selector`
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    /// Trimmed texts of at most `limit` matching elements, in document order
    pub fn texts(&self, selector: &Selector, limit: usize) -> Vec<String> {
        self.document
            .select(selector)
            .take(limit)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect()
    }
}

/// JSON data scripts keyed by their id
fn extract_json_scripts(document: &Html) -> Map<String, Value> {
    let mut result = Map::new();
    let selector = match Selector::parse(r#"script[id][type="application/json"]"#) {
        Ok(s) => s,
        Err(_) => return result,
    };

    for element in document.select(&selector) {
        let Some(id) = element.value().attr("id") else {
            continue;
        };
        let text = element.text().collect::<String>();
        if text.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                result.insert(id.to_string(), value);
            }
            Err(e) => warn!(id, error = %e, "skipping unparseable JSON data script"),
        }
    }

    result
}

/// Globals assigned by inline scripts
fn extract_script_globals(document: &Html) -> Vec<(String, Value)> {
    let mut result = Vec::new();
    let selector = match Selector::parse("script:not([type]), script[type='text/javascript']") {
        Ok(s) => s,
        Err(_) => return result,
    };

    for element in document.select(&selector) {
        let script_text = element.text().collect::<String>();
        if script_text.trim().is_empty() {
            continue;
        }

        match parse_script_globals(&script_text) {
            Some(vars) => result.extend(vars),
            None => debug!("inline script did not parse, skipped"),
        }
    }

    result
}

/// Parse one script and collect top-level global assignments
fn parse_script_globals(source: &str) -> Option<Vec<(String, Value)>> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Anon.into(), source.to_string());

    let lexer = Lexer::new(
        Syntax::Es(Default::default()),
        Default::default(),
        StringInput::from(&*fm),
        None,
    );

    let mut parser = Parser::new_from(lexer);
    let script = parser.parse_script().ok()?;

    let mut result = Vec::new();
    for stmt in &script.body {
        collect_globals_from_stmt(stmt, &mut result);
    }

    Some(result)
}

fn collect_globals_from_stmt(stmt: &Stmt, result: &mut Vec<(String, Value)>) {
    match stmt {
        Stmt::Decl(Decl::Var(var_decl)) => {
            for decl in &var_decl.decls {
                if let (Pat::Ident(ident), Some(init)) = (&decl.name, &decl.init) {
                    if let Some(value) = expr_to_json(init) {
                        result.push((ident.sym.as_str().to_string(), value));
                    }
                }
            }
        }
        Stmt::Expr(expr_stmt) => {
            if let Expr::Assign(assign) = &*expr_stmt.expr {
                if let Some(name) = assign_target_name(&assign.left) {
                    if let Some(value) = expr_to_json(&assign.right) {
                        result.push((name, value));
                    }
                }
            }
        }
        _ => {}
    }
}

/// `X = ...`, `window.X = ...` or `window["X"] = ...`
fn assign_target_name(target: &AssignTarget) -> Option<String> {
    match target {
        AssignTarget::Simple(SimpleAssignTarget::Ident(ident)) => {
            Some(ident.sym.as_str().to_string())
        }
        AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
            let Expr::Ident(obj) = &*member.obj else {
                return None;
            };
            let obj_name: &str = obj.sym.as_ref();
            if !GLOBAL_OBJECTS.contains(&obj_name) {
                return None;
            }

            match &member.prop {
                MemberProp::Ident(prop) => Some(prop.sym.as_str().to_string()),
                MemberProp::Computed(computed) => match &*computed.expr {
                    Expr::Lit(Lit::Str(s)) => s.value.as_str().map(String::from),
                    _ => None,
                },
                _ => None,
            }
        }
        _ => None,
    }
}

fn number_to_json(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(Value::Number(serde_json::Number::from(n as i64)))
    } else {
        serde_json::Number::from_f64(n).map(Value::Number)
    }
}

/// Convert a literal-only JavaScript expression to JSON
fn expr_to_json(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Lit(Lit::Str(s)) => Some(Value::String(s.value.as_str().unwrap_or("").to_string())),
        Expr::Lit(Lit::Num(n)) => number_to_json(n.value),
        Expr::Lit(Lit::Bool(b)) => Some(Value::Bool(b.value)),
        Expr::Lit(Lit::Null(_)) => Some(Value::Null),

        Expr::Object(obj) => {
            let mut map = Map::new();
            for prop in &obj.props {
                if let PropOrSpread::Prop(prop) = prop {
                    if let Prop::KeyValue(kv) = &**prop {
                        let key = prop_name_to_string(&kv.key)?;
                        let value = expr_to_json(&kv.value)?;
                        map.insert(key, value);
                    }
                }
            }
            Some(Value::Object(map))
        }

        Expr::Array(arr) => {
            let values = arr
                .elems
                .iter()
                .map(|elem| match elem {
                    Some(ExprOrSpread { expr, .. }) => expr_to_json(expr).unwrap_or(Value::Null),
                    None => Value::Null,
                })
                .collect();
            Some(Value::Array(values))
        }

        // JSON.parse('...')
        Expr::Call(call) if is_json_parse_call(call) => {
            let ExprOrSpread { expr: arg, .. } = call.args.first()?;
            let Expr::Lit(Lit::Str(s)) = &**arg else {
                return None;
            };
            serde_json::from_str(s.value.as_str()?).ok()
        }

        Expr::Unary(unary) if unary.op == UnaryOp::Minus => match &*unary.arg {
            Expr::Lit(Lit::Num(n)) => number_to_json(-n.value),
            _ => None,
        },

        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
            .quasis
            .first()
            .map(|quasi| Value::String(quasi.raw.as_str().to_string())),

        Expr::Paren(paren) => expr_to_json(&paren.expr),

        _ => None,
    }
}

fn is_json_parse_call(call: &CallExpr) -> bool {
    let Callee::Expr(expr) = &call.callee else {
        return false;
    };
    let Expr::Member(member) = &**expr else {
        return false;
    };
    let Expr::Ident(obj) = &*member.obj else {
        return false;
    };
    match &member.prop {
        MemberProp::Ident(prop) => obj.sym.as_ref() == "JSON" && prop.sym.as_ref() == "parse",
        _ => false,
    }
}

fn prop_name_to_string(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.as_str().to_string()),
        PropName::Str(s) => s.value.as_str().map(|v| v.to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}
