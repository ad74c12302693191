//! Routing idioms for .NET: ASP.NET attribute-routed controllers and
//! minimal APIs.
//!
//! Attribute-routed controllers compose a class-level base route with each
//! method-level suffix; the binding below resolves the base, including the
//! `[controller]` token and the conventional `/api/<name>` default.

use crate::extract::rules::{ControllerBinding, Ecosystem, MethodSpec, PathSpec, RouteRule};

pub fn rules() -> Vec<RouteRule> {
    vec![
        // Verb attribute with a route template: [HttpGet("{id}")].
        RouteRule {
            framework: "ASP.NET",
            ecosystem: Ecosystem::CSharp,
            pattern: r#"\[Http(Get|Post|Put|Delete|Patch)\s*\(\s*"([^"]+)"\s*\)\]"#,
            method: MethodSpec::Capture(1),
            path: PathSpec::ControllerRelative(2),
        },
        // Bare verb attribute routes to the controller base itself.
        RouteRule {
            framework: "ASP.NET",
            ecosystem: Ecosystem::CSharp,
            pattern: r#"\[Http(Get|Post|Put|Delete|Patch)\s*\]"#,
            method: MethodSpec::Capture(1),
            path: PathSpec::ControllerRoot,
        },
        // Minimal API registrations carry the full path inline.
        RouteRule {
            framework: "ASP.NET Minimal",
            ecosystem: Ecosystem::CSharp,
            pattern: r#"app\.Map(Get|Post|Put|Delete|Patch)\s*\(\s*"([^"]+)""#,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
    ]
}

pub fn bindings() -> Vec<ControllerBinding> {
    vec![ControllerBinding {
        ecosystem: Ecosystem::CSharp,
        class_pattern: r#"(?m)^\s*public\s+(?:partial\s+)?class\s+(\w+)Controller\b"#,
        route_pattern: r#"\[Route\s*\(\s*"([^"]+)"\s*\)\]"#,
        token: "[controller]",
        default_template: "/api/{name}",
    }]
}
