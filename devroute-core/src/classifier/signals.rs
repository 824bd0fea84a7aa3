//! Evidence extracted from source text before rules run

use super::RequestContext;
use regex_utils::{constructs, definitions, hooks, imports, keywords};

/// Action name that requests a new component
pub const CREATE_COMPONENT_ACTION: &str = "create-component";

/// Short inputs mentioning `undefined` count as a simple fix
const SHORT_CODE_LIMIT: usize = 200;

/// Counts and flags computed once per classification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signals {
    pub code_length: usize,
    pub is_blank: bool,
    pub create_component_requested: bool,

    pub conditional_with_state: bool,
    pub empty_import: bool,

    pub open_braces: usize,
    pub close_braces: usize,
    pub open_parens: usize,
    pub close_parens: usize,

    pub music_terms: Vec<String>,
    pub performance_findings: Vec<&'static str>,

    pub routing_in_path: bool,
    pub routing_in_content: bool,

    pub function_defs: usize,
    pub type_defs: usize,
    pub imports: usize,
    pub max_class_methods: usize,

    pub double_terminator: bool,
    pub mentions_missing: bool,
    pub short_with_undefined: bool,
}

impl Signals {
    pub fn extract(code: &str, file_path: &str, context: &RequestContext) -> Self {
        let mut signals = Signals {
            code_length: code.len(),
            is_blank: code.trim().is_empty(),
            create_component_requested: context.action.as_deref() == Some(CREATE_COMPONENT_ACTION),
            conditional_with_state: constructs::conditional_with_state(code),
            empty_import: imports::EMPTY_TARGET.is_match(code),
            ..Default::default()
        };

        for c in code.chars() {
            match c {
                '{' => signals.open_braces += 1,
                '}' => signals.close_braces += 1,
                '(' => signals.open_parens += 1,
                ')' => signals.close_parens += 1,
                _ => {}
            }
        }

        signals.music_terms = keywords::music_terms(code);
        signals.performance_findings = performance_findings(code);
        signals.routing_in_path = keywords::ROUTING_PATH.is_match(file_path);
        signals.routing_in_content = keywords::ROUTING_CONTENT.is_match(code);

        signals.function_defs = definitions::FUNCTION.find_iter(code).count();
        signals.type_defs = definitions::TYPE.find_iter(code).count();
        signals.imports = imports::count(code);
        signals.max_class_methods = max_class_methods(code);

        signals.double_terminator = code.contains(";;");
        signals.mentions_missing = code.contains("missing");
        signals.short_with_undefined = code.len() < SHORT_CODE_LIMIT && code.contains("undefined");

        signals
    }

    pub fn delimiters_balanced(&self) -> bool {
        self.open_braces == self.close_braces && self.open_parens == self.close_parens
    }
}

fn performance_findings(code: &str) -> Vec<&'static str> {
    let mut findings = Vec::new();

    if hooks::MAP_CALL.is_match(code) && !hooks::USE_MEMO.is_match(code) {
        findings.push("list rendering without useMemo");
    }

    if hooks::EVENT_HANDLER.is_match(code) && !hooks::USE_CALLBACK.is_match(code) {
        findings.push("inline event handler without useCallback");
    }

    let state_hooks = hooks::USE_STATE.find_iter(code).count();
    let large_stateful = state_hooks >= 3 || (state_hooks > 0 && code.len() > 2000);
    if large_stateful && !hooks::MEMO_WRAPPER.is_match(code) {
        findings.push("large stateful component without memo");
    }

    if hooks::USE_EFFECT.find_iter(code).count() > 2 {
        findings.push("more than two useEffect hooks");
    }

    findings
}

/// Largest method count over all class bodies
fn max_class_methods(code: &str) -> usize {
    definitions::CLASS
        .find_iter(code)
        .map(|m| {
            let open = m.end() - 1;
            definitions::count_methods(block_body(code, open))
        })
        .max()
        .unwrap_or(0)
}

/// Text between the brace at `open` and its matching close (or end of input)
fn block_body(code: &str, open: usize) -> &str {
    let mut depth = 0usize;
    for (offset, c) in code[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &code[open + 1..open + offset];
                }
            }
            _ => {}
        }
    }
    &code[open + 1..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_counts() {
        let signals = Signals::extract("fn(a, (b)) { {", "a.js", &RequestContext::default());
        assert_eq!(signals.open_parens, 2);
        assert_eq!(signals.close_parens, 2);
        assert_eq!(signals.open_braces, 2);
        assert_eq!(signals.close_braces, 0);
        assert!(!signals.delimiters_balanced());
    }

    #[test]
    fn test_class_method_count() {
        let code = "class Store {\n  a() {\n  }\n  b() {\n  }\n  c() {\n  }\n  d() {\n  }\n  e() {\n  }\n  f() {\n  }\n}\nclass Tiny {\n  only() {\n  }\n}";
        let signals = Signals::extract(code, "store.js", &RequestContext::default());
        assert_eq!(signals.max_class_methods, 6);
    }

    #[test]
    fn test_effect_heavy_component() {
        let code = "useEffect(() => {}); useEffect(() => {}); useEffect(() => {});";
        assert_eq!(performance_findings(code), vec!["more than two useEffect hooks"]);
    }

    #[test]
    fn test_memo_wrapper_suppresses_large_state_finding() {
        let code = "export default memo(function C() { const [a] = useState(); const [b] = useState(); const [c] = useState(); })";
        assert!(performance_findings(code).is_empty());
    }

    #[test]
    fn test_create_component_action() {
        let ctx = RequestContext::with_action(CREATE_COMPONENT_ACTION);
        assert!(Signals::extract("x", "a.tsx", &ctx).create_component_requested);
        assert!(!Signals::extract("x", "a.tsx", &RequestContext::default()).create_component_requested);
    }
}
