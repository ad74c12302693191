//! Routing idioms for Rust web frameworks: attribute macros and fluent
//! router builders.

use crate::extract::rules::{Ecosystem, MethodSpec, PathSpec, RouteRule};

pub fn rules() -> Vec<RouteRule> {
    vec![
        // Attribute macros shared by Rocket and actix-web: #[get("/path")].
        RouteRule {
            framework: "Rocket",
            ecosystem: Ecosystem::Rust,
            pattern: r##"#\[(get|post|put|delete|patch)\s*\(\s*"([^"]+)"\s*\)\]"##,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
        // actix-web fluent registration with a method guard.
        RouteRule {
            framework: "Actix",
            ecosystem: Ecosystem::Rust,
            pattern: r#"\.route\s*\(\s*"([^"]+)"\s*,\s*web::(get|post|put|delete|patch)\s*\(\s*\)"#,
            method: MethodSpec::Capture(2),
            path: PathSpec::Capture(1),
        },
        // Axum routers pair a path with a method-router function.
        RouteRule {
            framework: "Axum",
            ecosystem: Ecosystem::Rust,
            pattern: r#"\.route\s*\(\s*"([^"]+)"\s*,\s*(get|post|put|delete|patch)\s*\("#,
            method: MethodSpec::Capture(2),
            path: PathSpec::Capture(1),
        },
    ]
}
