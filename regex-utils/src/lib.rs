//! Regex utilities for devroute
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Control-flow and stateful constructs
pub mod constructs {
    use super::*;

    pub static CONDITIONAL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:if|switch)\s*\(").expect("Invalid regex pattern")
    });

    pub static STATEFUL_HOOK: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\buse(?:State|Effect|Reducer|LayoutEffect|Ref)\s*\(")
            .expect("Invalid regex pattern")
    });

    /// True when the source branches and also touches state or effects
    pub fn conditional_with_state(code: &str) -> bool {
        CONDITIONAL.is_match(code) && STATEFUL_HOOK.is_match(code)
    }
}

/// Import statements
pub mod imports {
    use super::*;

    pub static EMPTY_TARGET: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"(?:\bimport\s+(?:[\w*{}\s,$]+\s+from\s+)?|\brequire\s*\(\s*)["']\s*["']"#)
            .expect("Invalid regex pattern")
    });

    pub static STATEMENT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?m)^\s*import\s").expect("Invalid regex pattern"));

    /// Count top-level import statements
    pub fn count(code: &str) -> usize {
        STATEMENT.find_iter(code).count()
    }
}

/// Hook usage patterns relevant to render performance
pub mod hooks {
    use super::*;

    pub static USE_STATE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\buseState\s*\(").expect("Invalid regex pattern"));

    pub static USE_EFFECT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\buseEffect\s*\(").expect("Invalid regex pattern"));

    pub static USE_MEMO: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\buseMemo\s*\(").expect("Invalid regex pattern"));

    pub static USE_CALLBACK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\buseCallback\s*\(").expect("Invalid regex pattern"));

    pub static MEMO_WRAPPER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:React\.)?memo\s*\(").expect("Invalid regex pattern")
    });

    pub static MAP_CALL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\.map\s*\(").expect("Invalid regex pattern"));

    pub static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\bon[A-Z]\w*\s*=\s*\{").expect("Invalid regex pattern")
    });
}

/// Definition counts used to size a file
pub mod definitions {
    use super::*;

    pub static FUNCTION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"\bfunction\s+\w+\s*\(|\b(?:const|let|var)\s+\w+\s*=\s*(?:async\s*)?\([^)]*\)\s*=>",
        )
        .expect("Invalid regex pattern")
    });

    pub static TYPE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^\s*(?:export\s+)?(?:interface|type|enum)\s+\w+")
            .expect("Invalid regex pattern")
    });

    pub static CLASS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\bclass\s+\w+[^{]*\{").expect("Invalid regex pattern"));

    pub static METHOD: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?m)^\s*(?:(?:public|private|protected|static|async|get|set)\s+)*([A-Za-z_$][\w$]*)\s*\([^)]*\)\s*(?::\s*[^{]+)?\{",
        )
        .expect("Invalid regex pattern")
    });

    const NOT_METHODS: &[&str] = &["if", "for", "while", "switch", "catch", "function"];

    /// Count method-like definitions in a class body
    pub fn count_methods(body: &str) -> usize {
        METHOD
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .filter(|name| !NOT_METHODS.contains(&name.as_str()))
            .count()
    }
}

/// Keyword sets for specialised domains
pub mod keywords {
    use super::*;

    pub static MUSIC: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)\b(?:tempo|chord|chords|melody|harmony|midi|rhythm|synth|oscillator|notation|bpm|tonejs|metronome)\b",
        )
        .expect("Invalid regex pattern")
    });

    pub static ROUTING_CONTENT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"\b(?:useNavigate|useRouter|useParams|useLocation|BrowserRouter|Routes|Route|Navigate|navigate|router|redirect)\b",
        )
        .expect("Invalid regex pattern")
    });

    pub static ROUTING_PATH: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)(?:^|[/\\])(?:routes?|pages|router|navigation)(?:[/\\.]|$)")
            .expect("Invalid regex pattern")
    });

    /// Distinct music keywords present, lowercased, in first-seen order
    pub fn music_terms(text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for m in MUSIC.find_iter(text) {
            let term = m.as_str().to_lowercase();
            if !found.contains(&term) {
                found.push(term);
            }
        }
        found
    }
}
