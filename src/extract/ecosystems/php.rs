//! Routing idioms for PHP: Laravel facades, Symfony annotations, Slim.

use crate::extract::rules::{Ecosystem, MethodSpec, PathSpec, RouteRule};

pub fn rules() -> Vec<RouteRule> {
    vec![
        RouteRule {
            framework: "Laravel",
            ecosystem: Ecosystem::Php,
            pattern: r#"Route::(get|post|put|delete|patch)\s*\(\s*["']([^"']+)["']"#,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
        // Symfony annotation with an explicit methods list.
        RouteRule {
            framework: "Symfony",
            ecosystem: Ecosystem::Php,
            pattern: r#"@Route\s*\(\s*["']([^"']+)["'][^)]*methods\s*=\s*\{?\s*["'](\w+)["']"#,
            method: MethodSpec::Capture(2),
            path: PathSpec::Capture(1),
        },
        // Symfony annotation without methods defaults to GET.
        RouteRule {
            framework: "Symfony",
            ecosystem: Ecosystem::Php,
            pattern: r#"@Route\s*\(\s*["']([^"']+)["']\s*\)"#,
            method: MethodSpec::Fixed("GET"),
            path: PathSpec::Capture(1),
        },
        RouteRule {
            framework: "Slim",
            ecosystem: Ecosystem::Php,
            pattern: r#"\$app->(get|post|put|delete|patch)\s*\(\s*["']([^"']+)["']"#,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
    ]
}
