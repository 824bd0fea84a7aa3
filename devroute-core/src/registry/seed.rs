//! Built-in handler table

use super::{Capability as C, HandlerCapability, HandlerCategory, HandlerComplexity};

pub fn default_handlers() -> Vec<HandlerCapability> {
    vec![
        // Anchors
        HandlerCapability::new("file-analyzer", HandlerCategory::Core, HandlerComplexity::Moderate, 0.92, 120)
            .with_capabilities([C::FileAnalysis, C::CodeQuality, C::PatternMatching])
            .with_strengths(&["file structure analysis", "dependency scanning"])
            .with_limitations(&["read-only, never edits code"]),
        HandlerCapability::new("auto-fixer", HandlerCategory::Core, HandlerComplexity::Simple, 0.85, 300)
            .with_capabilities([C::AutoFix, C::SyntaxRepair, C::QuickFix, C::PatternMatching])
            .with_strengths(&["syntax repair", "import fixes", "bracket balancing"])
            .with_limitations(&["single-file scope"]),
        HandlerCapability::new("quick-fixer", HandlerCategory::Utilities, HandlerComplexity::Simple, 0.90, 80)
            .with_capabilities([C::QuickFix, C::AutoFix])
            .with_strengths(&["one-line fix", "typo correction"])
            .with_limitations(&["no structural changes"]),
        // Structure and learned fixes
        HandlerCapability::new("structural-rebuilder", HandlerCategory::Core, HandlerComplexity::Complex, 0.88, 900)
            .with_capabilities([C::StructuralRefactor, C::HookRules, C::Refactoring, C::FileAnalysis])
            .with_strengths(&["hook ordering", "component structure", "refactor planning"])
            .with_limitations(&["slow on very large files"]),
        HandlerCapability::new("pattern-fixer", HandlerCategory::Intelligence, HandlerComplexity::Moderate, 0.78, 200)
            .with_capabilities([C::PatternMatching, C::AutoFix, C::Training])
            .with_strengths(&["learned fix patterns"])
            .with_limitations(&["needs prior training data"]),
        HandlerCapability::new("pattern-trainer", HandlerCategory::Intelligence, HandlerComplexity::Complex, 0.70, 1500)
            .with_capabilities([C::Training, C::PatternMatching, C::FileAnalysis])
            .with_strengths(&["pattern harvesting across the workspace"])
            .with_limitations(&["does not fix code directly"]),
        HandlerCapability::new("component-generator", HandlerCategory::Core, HandlerComplexity::Moderate, 0.87, 400)
            .with_capabilities([C::ComponentGeneration, C::Templates])
            .with_strengths(&["component scaffold", "prop typing"])
            .with_limitations(&["template-bound output"]),
        // Music domain
        HandlerCapability::new("music-analyzer", HandlerCategory::Music, HandlerComplexity::Moderate, 0.82, 600)
            .with_capabilities([C::MusicAnalysis, C::DomainAnalysis, C::AudioProcessing])
            .with_strengths(&["music theory analysis", "tempo detection"])
            .with_limitations(&["western notation only"]),
        HandlerCapability::new("music-generator", HandlerCategory::Music, HandlerComplexity::Complex, 0.75, 1200)
            .with_capabilities([C::MusicGeneration, C::ComponentGeneration, C::DomainAnalysis])
            .with_strengths(&["melody generation", "chord progression"])
            .with_limitations(&["generated output needs review"]),
        // Routes
        HandlerCapability::new("route-analyzer", HandlerCategory::Routes, HandlerComplexity::Moderate, 0.86, 350)
            .with_capabilities([C::RouteAnalysis, C::Navigation, C::FileAnalysis])
            .with_strengths(&["route mapping", "navigation analysis"])
            .with_limitations(&["file-system routers only"]),
        HandlerCapability::new("route-visualizer", HandlerCategory::Routes, HandlerComplexity::Simple, 0.80, 500)
            .with_capabilities([C::RouteVisualization, C::RouteAnalysis])
            .with_strengths(&["route graph rendering"])
            .with_limitations(&["read-only"]),
        HandlerCapability::new("route-fixer", HandlerCategory::Routes, HandlerComplexity::Moderate, 0.83, 450)
            .with_capabilities([C::RouteRepair, C::Navigation, C::AutoFix])
            .with_strengths(&["broken link repair", "navigation fixes"])
            .with_limitations(&["cannot create missing pages"]),
        // Utilities
        HandlerCapability::new("performance-optimizer", HandlerCategory::Utilities, HandlerComplexity::Complex, 0.84, 700)
            .with_capabilities([C::PerformanceOptimization, C::Memoization, C::Refactoring])
            .with_strengths(&["memoization", "render optimization"])
            .with_limitations(&["needs representative inputs to verify gains"]),
        HandlerCapability::new("test-generator", HandlerCategory::Utilities, HandlerComplexity::Moderate, 0.80, 800)
            .with_capabilities([C::TestGeneration, C::Templates])
            .with_strengths(&["unit test scaffold"])
            .with_limitations(&["no end-to-end tests"]),
        HandlerCapability::new("deployment-handler", HandlerCategory::Deployment, HandlerComplexity::Complex, 0.79, 2000)
            .with_capabilities([C::Deployment, C::Build])
            .with_strengths(&["build configuration", "release packaging"])
            .with_limitations(&["requires configured targets"]),
        HandlerCapability::new("import-export-handler", HandlerCategory::ImportExport, HandlerComplexity::Moderate, 0.77, 600)
            .with_capabilities([C::ImportExport, C::FileAnalysis])
            .with_strengths(&["project import", "export bundle"])
            .with_limitations(&["json and zip formats only"]),
    ]
}
